//! Piece factory - spawns new pieces at the top-center of the board

use tracing::trace;

use crate::game_state::Tetromino;
use crate::pieces::template;
use crate::rng::{PieceSource, UniformPieces};

/// Produces freshly spawned pieces for a board of a given width.
#[derive(Debug, Clone)]
pub struct PieceFactory<S = UniformPieces> {
    source: S,
    board_width: u16,
}

impl<S: PieceSource> PieceFactory<S> {
    pub fn new(source: S, board_width: u16) -> Self {
        Self {
            source,
            board_width,
        }
    }

    /// Draw a kind from the source and place its template at the spawn position.
    ///
    /// `x = floor(board_width / 2) - floor(shape_width / 2)`, `y = 0`.
    pub fn spawn(&mut self) -> Tetromino {
        let kind = self.source.next_kind();
        let shape = template(kind);
        let x = spawn_x(self.board_width, shape.width());
        trace!(kind = kind.as_str(), x, "spawn");
        Tetromino {
            kind,
            shape,
            x,
            y: 0,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

/// Spawn column for a shape of `shape_width` columns; even widths bias left.
pub fn spawn_x(board_width: u16, shape_width: u8) -> i32 {
    (board_width / 2) as i32 - (shape_width / 2) as i32
}
