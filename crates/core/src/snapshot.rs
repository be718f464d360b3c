use crate::game_state::Tetromino;
use crate::pieces::Shape;
use crate::types::{GamePhase, PieceKind, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub color: u8,
    pub x: i32,
    pub y: i32,
    pub shape: Shape,
}

impl ActiveSnapshot {
    /// Board coordinates (x, y) of every filled cell
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let (x, y) = (self.x, self.y);
        self.shape
            .filled()
            .into_iter()
            .map(move |(dx, dy)| (x + dx, y + dy))
    }
}

impl From<Tetromino> for ActiveSnapshot {
    fn from(value: Tetromino) -> Self {
        Self {
            kind: value.kind,
            color: value.color(),
            x: value.x,
            y: value.y,
            shape: value.shape,
        }
    }
}

/// Read-only view of a game, cheap to diff and to render.
///
/// `board` holds cell values (0 empty, 1..=7 piece color) row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub width: u16,
    pub height: u16,
    pub board: Vec<u8>,
    pub active: Option<ActiveSnapshot>,
    pub score: u32,
    pub phase: GamePhase,
    pub episode_id: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.board.iter_mut().for_each(|v| *v = 0);
        self.active = None;
        self.score = 0;
        self.phase = GamePhase::Idle;
        self.episode_id = 0;
    }

    /// Cell value at (x, y); 0 when out of range.
    pub fn cell(&self, x: usize, y: usize) -> u8 {
        if x >= self.width as usize || y >= self.height as usize {
            return 0;
        }
        self.board
            .get(y * self.width as usize + x)
            .copied()
            .unwrap_or(0)
    }

    /// Board rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.board.chunks(self.width.max(1) as usize)
    }

    pub fn playable(&self) -> bool {
        self.phase.accepts_input()
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            board: vec![0; DEFAULT_BOARD_WIDTH as usize * DEFAULT_BOARD_HEIGHT as usize],
            active: None,
            score: 0,
            phase: GamePhase::Idle,
            episode_id: 0,
        }
    }
}
