//! Game state module - the board engine
//!
//! Ties together the board, the piece factory and scoring, and owns the game
//! phase. All mutation goes through this type: translation, rotation, gravity
//! steps, locking, line clears, spawning and the lifecycle commands.
//!
//! Illegal moves are not errors. Every player operation reports whether it
//! took effect and leaves the state untouched when it did not.

use tracing::{debug, trace};

use crate::board::Board;
use crate::factory::PieceFactory;
use crate::pieces::{template, Shape};
use crate::rng::{PieceSource, UniformPieces};
use crate::scoring::{add_score, line_clear_score};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::types::*;

/// Pending events kept when nobody drains them.
const MAX_PENDING_EVENTS: usize = 256;

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tetromino {
    pub kind: PieceKind,
    pub shape: Shape,
    /// Board column of the shape's left edge
    pub x: i32,
    /// Board row of the shape's top edge (may be negative)
    pub y: i32,
}

impl Tetromino {
    /// A piece of `kind` in its spawn orientation at (x, y)
    pub fn new(kind: PieceKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            shape: template(kind),
            x,
            y,
        }
    }

    /// Cell value this piece writes when it locks
    pub fn color(&self) -> u8 {
        self.kind.color_id()
    }

    /// Board coordinates (x, y) of every filled cell, shifted by an offset.
    pub fn cells_offset(&self, row_offset: i32, col_offset: i32) -> impl Iterator<Item = (i32, i32)> {
        let (x, y) = (self.x + col_offset, self.y + row_offset);
        self.shape
            .filled()
            .into_iter()
            .map(move |(dx, dy)| (x + dx, y + dy))
    }

    /// Board coordinates (x, y) of every filled cell
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        self.cells_offset(0, 0)
    }

    /// Whether the piece, shifted by the offsets, fits on `board`.
    pub fn fits(&self, board: &Board, row_offset: i32, col_offset: i32) -> bool {
        self.cells_offset(row_offset, col_offset)
            .all(|(x, y)| board.is_clear(x, y))
    }
}

/// Something observers may want to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A new active piece entered the board
    Spawned { kind: PieceKind },
    /// The active piece became board cells
    Locked {
        kind: PieceKind,
        cells_written: usize,
        lines_cleared: usize,
    },
    /// Emitted after every line-clear scan, even when nothing cleared
    ScoreChanged { score: u32, lines_cleared: usize },
    /// A freshly spawned piece did not fit; the board has been wiped
    GameOver { final_score: u32 },
    /// Board, score and piece were reinitialized
    Reset,
}

/// Result of one gravity step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Not running, or no active piece
    Ignored,
    /// The piece moved down one row
    Moved,
    /// The piece locked and the next one spawned
    Locked { lines_cleared: usize },
    /// The piece locked and the next spawn collided
    GameOver { lines_cleared: usize },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState<S = UniformPieces> {
    board: Board,
    active: Option<Tetromino>,
    factory: PieceFactory<S>,
    score: u32,
    phase: GamePhase,
    /// Increments on every start/restart.
    episode_id: u32,
    events: Vec<GameEvent>,
}

impl GameState<UniformPieces> {
    /// Create an idle game with uniform random pieces
    pub fn new(width: u16, height: u16, seed: u32) -> Result<Self, ConfigError> {
        Self::with_source(width, height, UniformPieces::new(seed))
    }

    /// Current RNG state of the piece source
    pub fn seed(&self) -> u32 {
        self.factory.source().seed()
    }
}

impl Default for GameState<UniformPieces> {
    fn default() -> Self {
        Self::from_board(Board::default(), UniformPieces::default())
    }
}

impl<S: PieceSource> GameState<S> {
    /// Create an idle game drawing pieces from `source`
    pub fn with_source(width: u16, height: u16, source: S) -> Result<Self, ConfigError> {
        Ok(Self::from_board(Board::new(width, height)?, source))
    }

    /// Create an idle game around an existing board
    pub fn from_board(board: Board, source: S) -> Self {
        let factory = PieceFactory::new(source, board.width());
        Self {
            board,
            active: None,
            factory,
            score: 0,
            phase: GamePhase::Idle,
            episode_id: 0,
            events: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct board access for setting up positions.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn active(&self) -> Option<Tetromino> {
        self.active
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn source(&self) -> &S {
        self.factory.source()
    }

    /// Placement legality check (pure).
    ///
    /// For every filled cell of `piece`, the candidate position is the cell's
    /// board coordinate shifted by the offsets. It must be inside the columns,
    /// above the floor, and either above the top edge or on an empty cell.
    pub fn can_place(&self, piece: &Tetromino, row_offset: i32, col_offset: i32) -> bool {
        piece.fits(&self.board, row_offset, col_offset)
    }

    /// Replace the active piece, e.g. to set up a position.
    ///
    /// Only accepted while running and when `piece` fits where it is.
    pub fn replace_active(&mut self, piece: Tetromino) -> bool {
        if !self.phase.accepts_input() || !self.can_place(&piece, 0, 0) {
            return false;
        }
        self.active = Some(piece);
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.try_shift(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.try_shift(1)
    }

    fn try_shift(&mut self, dx: i32) -> bool {
        if !self.phase.accepts_input() {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };
        if !self.can_place(&active, 0, dx) {
            return false;
        }
        self.active = Some(Tetromino {
            x: active.x + dx,
            ..active
        });
        true
    }

    /// Rotate the active piece 90° clockwise in place.
    ///
    /// The rotated shape is tested at the current position only; when it does
    /// not fit, shape and position stay exactly as they were.
    pub fn rotate(&mut self) -> bool {
        if !self.phase.accepts_input() {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };
        let candidate = Tetromino {
            shape: active.shape.rotated(),
            ..active
        };
        if !self.can_place(&candidate, 0, 0) {
            return false;
        }
        self.active = Some(candidate);
        true
    }

    /// Soft drop: one immediate gravity step.
    pub fn soft_drop(&mut self) -> StepOutcome {
        self.step()
    }

    /// Gravity step: move down one row, or lock, clear and respawn.
    pub fn step(&mut self) -> StepOutcome {
        if !self.phase.accepts_input() {
            return StepOutcome::Ignored;
        }
        let Some(active) = self.active else {
            return StepOutcome::Ignored;
        };

        if self.can_place(&active, 1, 0) {
            self.active = Some(Tetromino {
                y: active.y + 1,
                ..active
            });
            return StepOutcome::Moved;
        }

        let lines_cleared = self.lock_piece();
        if self.spawn_piece() {
            StepOutcome::Locked { lines_cleared }
        } else {
            StepOutcome::GameOver { lines_cleared }
        }
    }

    /// Lock the active piece into the board and clear full rows.
    ///
    /// Cells above the top edge are dropped. Returns the number of rows cleared.
    /// Does not spawn the next piece.
    pub fn lock_piece(&mut self) -> usize {
        let Some(active) = self.active.take() else {
            return 0;
        };

        let cells_written = self.board.lock_cells(active.cells(), active.kind);
        let lines_cleared = self.clear_lines();

        debug!(
            kind = active.kind.as_str(),
            x = active.x,
            y = active.y,
            cells_written,
            lines_cleared,
            "piece locked"
        );
        self.push_event(GameEvent::Locked {
            kind: active.kind,
            cells_written,
            lines_cleared,
        });
        lines_cleared
    }

    fn clear_lines(&mut self) -> usize {
        let lines_cleared = self.board.clear_full_rows();
        self.score = add_score(self.score, line_clear_score(lines_cleared));
        if lines_cleared > 0 {
            debug!(lines_cleared, score = self.score, "lines cleared");
        }
        self.push_event(GameEvent::ScoreChanged {
            score: self.score,
            lines_cleared,
        });
        lines_cleared
    }

    /// Spawn the next piece. On collision at the spawn position the game is
    /// over: the phase becomes `GameOver` and board and score are wiped.
    ///
    /// Returns false on game over.
    pub fn spawn_piece(&mut self) -> bool {
        let piece = self.factory.spawn();
        if !self.can_place(&piece, 0, 0) {
            self.game_over();
            return false;
        }
        self.active = Some(piece);
        self.push_event(GameEvent::Spawned { kind: piece.kind });
        true
    }

    fn game_over(&mut self) {
        let final_score = self.score;
        debug!(final_score, episode = self.episode_id, "game over");
        self.wipe();
        self.phase = GamePhase::GameOver;
        self.push_event(GameEvent::GameOver { final_score });
    }

    fn wipe(&mut self) {
        self.board.clear();
        self.score = 0;
        self.active = None;
    }

    /// Reinitialize board, score and piece and go back to `Idle`.
    pub fn reset(&mut self) {
        self.wipe();
        self.phase = GamePhase::Idle;
        self.push_event(GameEvent::Reset);
    }

    /// Reset, then spawn the first piece and enter `Running`.
    ///
    /// Works from any phase. Returns false if even the first spawn collides.
    pub fn start(&mut self) -> bool {
        self.reset();
        self.episode_id = self.episode_id.wrapping_add(1);
        self.phase = GamePhase::Running;
        trace!(episode = self.episode_id, "game started");
        self.spawn_piece()
    }

    /// Same as [`GameState::start`]: reset, then spawn.
    pub fn restart(&mut self) -> bool {
        self.start()
    }

    /// `Running → Paused`. Returns false from any other phase.
    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        self.phase = GamePhase::Paused;
        true
    }

    /// `Paused → Running`. Returns false from any other phase.
    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.phase = GamePhase::Running;
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            GamePhase::Running => self.pause(),
            GamePhase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Apply a game action. Returns whether it changed anything.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.move_left(),
            GameAction::MoveRight => self.move_right(),
            GameAction::Rotate => self.rotate(),
            GameAction::SoftDrop => self.soft_drop() != StepOutcome::Ignored,
            GameAction::Start => {
                self.start();
                true
            }
            GameAction::Restart => {
                self.restart();
                true
            }
            GameAction::Pause => self.pause(),
            GameAction::Resume => self.resume(),
            GameAction::TogglePause => self.toggle_pause(),
        }
    }

    /// Take all events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn push_event(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    /// Write a read-only view of the state into `out`, reusing its buffers.
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.width = self.board.width();
        out.height = self.board.height();
        self.board.write_values(&mut out.board);
        out.active = self.active.map(ActiveSnapshot::from);
        out.score = self.score;
        out.phase = self.phase;
        out.episode_id = self.episode_id;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedPieces;

    fn scripted(kinds: &[PieceKind]) -> GameState<ScriptedPieces> {
        GameState::with_source(10, 20, ScriptedPieces::new(kinds.to_vec())).unwrap()
    }

    #[test]
    fn test_new_game_state() {
        let state = GameState::new(10, 20, 12345).unwrap();

        assert_eq!(state.phase(), GamePhase::Idle);
        assert_eq!(state.score(), 0);
        assert_eq!(state.episode_id(), 0);
        assert!(state.active().is_none());
        assert_eq!(state.board().filled_count(), 0);
    }

    #[test]
    fn test_new_rejects_zero_dimension() {
        assert!(GameState::new(0, 20, 1).is_err());
        assert!(GameState::new(10, 0, 1).is_err());
    }

    #[test]
    fn test_game_start() {
        let mut state = scripted(&[PieceKind::T]);
        assert!(state.start());
        assert_eq!(state.phase(), GamePhase::Running);
        assert_eq!(state.episode_id(), 1);

        let active = state.active().unwrap();
        assert_eq!((active.kind, active.x, active.y), (PieceKind::T, 4, 0));
    }

    #[test]
    fn test_inputs_ignored_unless_running() {
        let mut state = scripted(&[PieceKind::T]);
        assert!(!state.move_left());
        assert!(!state.rotate());
        assert_eq!(state.step(), StepOutcome::Ignored);

        state.start();
        assert!(state.pause());
        let before = state.active();
        assert!(!state.move_left());
        assert!(!state.move_right());
        assert!(!state.rotate());
        assert_eq!(state.soft_drop(), StepOutcome::Ignored);
        assert_eq!(state.active(), before);
    }

    #[test]
    fn test_move_until_wall() {
        let mut state = scripted(&[PieceKind::O]);
        state.start();

        let mut moved = 0;
        for _ in 0..10 {
            if state.move_left() {
                moved += 1;
            }
        }
        assert_eq!(moved, 4);
        assert_eq!(state.active().unwrap().x, 0);

        let mut moved = 0;
        for _ in 0..10 {
            if state.move_right() {
                moved += 1;
            }
        }
        assert_eq!(moved, 8);
        assert_eq!(state.active().unwrap().x, 8);
    }

    #[test]
    fn test_move_blocked_by_locked_cell() {
        let mut state = scripted(&[PieceKind::O]);
        state.start();
        // O spawns at columns 4..=5 on rows 0..=1.
        state.board_mut().set(3, 1, Some(PieceKind::I));
        assert!(!state.move_left());
        assert_eq!(state.active().unwrap().x, 4);
    }

    #[test]
    fn test_rotate_commits_when_clear() {
        let mut state = scripted(&[PieceKind::T]);
        state.start();
        assert!(state.rotate());
        let active = state.active().unwrap();
        assert_eq!(active.shape, template(PieceKind::T).rotated());
        assert_eq!((active.x, active.y), (4, 0));
    }

    #[test]
    fn test_rotate_rejected_against_wall() {
        let mut state = scripted(&[PieceKind::I]);
        state.start();
        assert!(state.rotate()); // vertical bar at x=3
        while state.move_right() {}
        let before = state.active().unwrap();
        assert_eq!(before.x, 9);

        // Back to horizontal would need columns 9..=12.
        assert!(!state.rotate());
        assert_eq!(state.active().unwrap(), before);
    }

    #[test]
    fn test_step_moves_down_then_locks() {
        let mut state = scripted(&[PieceKind::O, PieceKind::T]);
        state.start();

        for expected_y in 1..=18 {
            assert_eq!(state.step(), StepOutcome::Moved);
            assert_eq!(state.active().unwrap().y, expected_y);
        }
        assert_eq!(state.step(), StepOutcome::Locked { lines_cleared: 0 });
        assert_eq!(state.board().get(4, 18), Some(Some(PieceKind::O)));
        assert_eq!(state.board().get(5, 19), Some(Some(PieceKind::O)));
        assert_eq!(state.active().unwrap().kind, PieceKind::T);
    }

    #[test]
    fn test_lock_drops_cells_above_top() {
        let mut state = scripted(&[PieceKind::I]);
        state.start();
        assert!(state.rotate());
        let piece = Tetromino {
            y: -2,
            ..state.active().unwrap()
        };
        assert!(state.replace_active(piece));

        state.lock_piece();
        assert_eq!(state.board().filled_count(), 2);
        assert!(state.active().is_none());
    }

    #[test]
    fn test_line_clear_awards_ten_per_row() {
        let mut state = scripted(&[PieceKind::I, PieceKind::O]);
        state.start();
        for y in 18..20 {
            for x in 0..10 {
                if x != 0 {
                    state.board_mut().set(x, y, Some(PieceKind::Z));
                }
            }
        }
        // Vertical I in column 0 covers rows 16..=19.
        assert!(state.rotate());
        while state.move_left() {}
        let mut outcome = state.step();
        while outcome == StepOutcome::Moved {
            outcome = state.step();
        }
        assert_eq!(outcome, StepOutcome::Locked { lines_cleared: 2 });
        assert_eq!(state.score(), 20);
        assert_eq!(state.board().filled_count(), 2);
        assert_eq!(state.board().get(0, 18), Some(Some(PieceKind::I)));
        assert_eq!(state.board().get(0, 19), Some(Some(PieceKind::I)));
    }

    #[test]
    fn test_score_event_emitted_without_clears() {
        let mut state = scripted(&[PieceKind::O]);
        state.start();
        state.take_events();
        state.lock_piece();
        let events = state.take_events();
        assert!(events.contains(&GameEvent::ScoreChanged {
            score: 0,
            lines_cleared: 0
        }));
    }

    #[test]
    fn test_spawn_collision_is_game_over() {
        let mut state = scripted(&[PieceKind::O]);
        state.start();
        state.board_mut().set(0, 19, Some(PieceKind::S));
        // Lock the O where it spawned; the next O lands on top of it.
        state.lock_piece();
        assert!(!state.spawn_piece());

        assert_eq!(state.phase(), GamePhase::GameOver);
        assert_eq!(state.board().filled_count(), 0);
        assert_eq!(state.score(), 0);
        assert!(state.active().is_none());
        assert!(state
            .take_events()
            .iter()
            .any(|e| matches!(e, GameEvent::GameOver { .. })));
    }

    #[test]
    fn test_pause_resume_cycle() {
        let mut state = scripted(&[PieceKind::T]);
        assert!(!state.pause());
        state.start();
        assert!(state.toggle_pause());
        assert_eq!(state.phase(), GamePhase::Paused);
        assert!(!state.pause());
        assert!(state.apply_action(GameAction::Resume));
        assert_eq!(state.phase(), GamePhase::Running);
    }

    #[test]
    fn test_restart_wipes_and_respawns() {
        let mut state = scripted(&[PieceKind::T]);
        state.start();
        state.board_mut().set(0, 19, Some(PieceKind::L));
        state.pause();

        assert!(state.apply_action(GameAction::Restart));
        assert_eq!(state.phase(), GamePhase::Running);
        assert_eq!(state.board().filled_count(), 0);
        assert_eq!(state.episode_id(), 2);
        assert!(state.active().is_some());
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut state = scripted(&[PieceKind::T]);
        state.start();
        state.reset();
        assert_eq!(state.phase(), GamePhase::Idle);
        assert!(state.active().is_none());
    }

    #[test]
    fn test_snapshot_mirrors_state() {
        let mut state = scripted(&[PieceKind::J]);
        state.start();
        state.board_mut().set(2, 19, Some(PieceKind::Z));

        let snap = state.snapshot();
        assert_eq!((snap.width, snap.height), (10, 20));
        assert_eq!(snap.cell(2, 19), 5);
        assert_eq!(snap.phase, GamePhase::Running);
        let active = snap.active.unwrap();
        assert_eq!(active.color, 7);
        assert_eq!((active.x, active.y), (4, 0));
    }

    #[test]
    fn test_pending_events_are_capped() {
        let mut state = scripted(&[PieceKind::T]);
        for _ in 0..MAX_PENDING_EVENTS {
            state.reset();
        }
        state.start();
        assert_eq!(state.take_events().len(), MAX_PENDING_EVENTS);
    }
}
