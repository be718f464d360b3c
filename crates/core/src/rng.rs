//! RNG module - random sources for piece selection
//!
//! Pieces are picked uniformly at random: every spawn is an independent draw
//! over the seven kinds. The random source is a small seeded LCG so that a
//! game is fully reproducible from its seed.
//!
//! [`PieceSource`] is the seam the piece factory draws from. Besides the
//! uniform source there is [`ScriptedPieces`], which replays a fixed sequence
//! (useful for replays, demos and tests).

use crate::types::PieceKind;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // A zero state works for an LCG with c != 0, but keep seeds distinct from "unset".
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod 2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate a value in `[0, max)`.
    ///
    /// Uses the high bits and a widening multiply; the low bits of a power-of-two
    /// LCG cycle with a very short period.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Current internal state (for restarting with the same sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Where new piece kinds come from.
pub trait PieceSource {
    /// Produce the kind of the next piece to spawn.
    fn next_kind(&mut self) -> PieceKind;
}

/// Uniform random piece source (each kind with probability 1/7)
#[derive(Debug, Clone)]
pub struct UniformPieces {
    rng: SimpleRng,
}

impl UniformPieces {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    /// Current RNG state; feeding it back into `new` continues the same sequence.
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

impl Default for UniformPieces {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PieceSource for UniformPieces {
    fn next_kind(&mut self) -> PieceKind {
        let idx = self.rng.next_range(PieceKind::ALL.len() as u32) as usize;
        PieceKind::ALL[idx]
    }
}

/// Replays a fixed sequence of kinds, cycling when exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedPieces {
    kinds: Vec<PieceKind>,
    next: usize,
}

impl ScriptedPieces {
    /// Create a scripted source. An empty script yields `O` pieces.
    pub fn new(kinds: impl Into<Vec<PieceKind>>) -> Self {
        Self {
            kinds: kinds.into(),
            next: 0,
        }
    }

    /// Source that always yields the same kind
    pub fn repeat(kind: PieceKind) -> Self {
        Self::new(vec![kind])
    }
}

impl PieceSource for ScriptedPieces {
    fn next_kind(&mut self) -> PieceKind {
        if self.kinds.is_empty() {
            return PieceKind::O;
        }
        let kind = self.kinds[self.next % self.kinds.len()];
        self.next = (self.next + 1) % self.kinds.len();
        kind
    }
}

impl<S: PieceSource + ?Sized> PieceSource for Box<S> {
    fn next_kind(&mut self) -> PieceKind {
        (**self).next_kind()
    }
}
