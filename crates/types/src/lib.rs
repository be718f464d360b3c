//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no external dependencies, so they can be used
//! from the engine, the terminal view and the remote-control protocol alike.
//!
//! # Board Dimensions
//!
//! The playfield defaults to 10 columns by 20 rows. Dimensions are chosen once
//! per game (see [`ConfigError`] for the accepted range) and never change
//! afterwards.
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Game loop poll interval (~60 FPS) |
//! | `GRAVITY_INTERVAL_MS` | 1000 | One gravity step per second |
//!
//! # Examples
//!
//! ```
//! use tui_blockfall_types::{GameAction, GamePhase, PieceKind};
//!
//! let kind = PieceKind::from_str("t").unwrap();
//! assert_eq!(kind, PieceKind::T);
//! assert_eq!(kind.color_id(), 2);
//!
//! let action = GameAction::from_str("softDrop").unwrap();
//! assert_eq!(action, GameAction::SoftDrop);
//!
//! assert!(GamePhase::Running.accepts_input());
//! assert!(!GamePhase::Paused.accepts_input());
//! ```

use std::fmt;

/// Default board width in cells
pub const DEFAULT_BOARD_WIDTH: u16 = 10;

/// Default board height in cells
pub const DEFAULT_BOARD_HEIGHT: u16 = 20;

/// Largest accepted board dimension on either axis
pub const MAX_BOARD_DIMENSION: u16 = 1024;

/// Game loop poll interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Gravity interval in milliseconds (one row per second)
pub const GRAVITY_INTERVAL_MS: u32 = 1000;

/// Score awarded for every cleared row
pub const LINE_CLEAR_BONUS: u32 = 10;

/// Default TCP port of the remote-control adapter
pub const DEFAULT_AI_PORT: u16 = 7777;

/// The seven piece kinds
///
/// Each kind carries a fixed color id (1..=7) that is stored in board cells:
/// - **I**: 1, cyan bar
/// - **T**: 2, magenta
/// - **O**: 3, yellow square
/// - **S**: 4, green
/// - **Z**: 5, red
/// - **L**: 6, blue
/// - **J**: 7, orange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    T,
    O,
    S,
    Z,
    L,
    J,
}

impl PieceKind {
    /// All kinds in color id order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::T,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::L,
        PieceKind::J,
    ];

    /// Cell value written into the board when this kind locks (1..=7).
    pub const fn color_id(self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::T => 2,
            PieceKind::O => 3,
            PieceKind::S => 4,
            PieceKind::Z => 5,
            PieceKind::L => 6,
            PieceKind::J => 7,
        }
    }

    /// Inverse of [`PieceKind::color_id`]. Returns `None` for 0 and for values above 7.
    ///
    /// ```
    /// use tui_blockfall_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_color_id(3), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_color_id(0), None);
    /// assert_eq!(PieceKind::from_color_id(8), None);
    /// ```
    pub const fn from_color_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(PieceKind::I),
            2 => Some(PieceKind::T),
            3 => Some(PieceKind::O),
            4 => Some(PieceKind::S),
            5 => Some(PieceKind::Z),
            6 => Some(PieceKind::L),
            7 => Some(PieceKind::J),
            _ => None,
        }
    }

    /// Parse piece kind from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "t" => Some(PieceKind::T),
            "o" => Some(PieceKind::O),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "l" => Some(PieceKind::L),
            "j" => Some(PieceKind::J),
            _ => None,
        }
    }

    /// Lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::T => "t",
            PieceKind::O => "o",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::L => "l",
            PieceKind::J => "j",
        }
    }
}

/// A cell on the game board
///
/// - `None`: empty (value 0)
/// - `Some(kind)`: locked block with value `kind.color_id()`
pub type Cell = Option<PieceKind>;

/// Numeric value of a cell (0 for empty, 1..=7 otherwise).
#[inline]
pub fn cell_value(cell: Cell) -> u8 {
    cell.map(PieceKind::color_id).unwrap_or(0)
}

/// Commands that can be applied to a game
///
/// The first four are player inputs and are ignored unless the game is running.
/// The rest are lifecycle commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    /// Move piece one column left
    MoveLeft,
    /// Move piece one column right
    MoveRight,
    /// Rotate piece 90° clockwise (no wall kicks)
    Rotate,
    /// Apply one gravity step immediately
    SoftDrop,
    /// Reset, spawn and begin ticking
    Start,
    /// Suspend ticking, keep state
    Pause,
    /// Resume ticking with a fresh schedule
    Resume,
    /// Pause when running, resume when paused
    TogglePause,
    /// Reset and spawn a new game
    Restart,
}

impl GameAction {
    /// Parse action from string (camelCase, case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_blockfall_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("ROTATE"), Some(GameAction::Rotate));
    /// assert_eq!(GameAction::from_str("hardDrop"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "rotate" => Some(GameAction::Rotate),
            "softdrop" => Some(GameAction::SoftDrop),
            "start" => Some(GameAction::Start),
            "pause" => Some(GameAction::Pause),
            "resume" => Some(GameAction::Resume),
            "togglepause" => Some(GameAction::TogglePause),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    /// camelCase name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::Rotate => "rotate",
            GameAction::SoftDrop => "softDrop",
            GameAction::Start => "start",
            GameAction::Pause => "pause",
            GameAction::Resume => "resume",
            GameAction::TogglePause => "togglePause",
            GameAction::Restart => "restart",
        }
    }

    /// True for the player inputs that only apply while running.
    pub fn is_player_input(&self) -> bool {
        matches!(
            self,
            GameAction::MoveLeft | GameAction::MoveRight | GameAction::Rotate | GameAction::SoftDrop
        )
    }
}

/// Game lifecycle phase
///
/// `Idle → Running → Paused ⇄ Running → GameOver → (reset) → Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GamePhase {
    #[default]
    Idle,
    Running,
    Paused,
    GameOver,
}

impl GamePhase {
    /// Player input and gravity only apply while running.
    pub fn accepts_input(&self) -> bool {
        matches!(self, GamePhase::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Running => "running",
            GamePhase::Paused => "paused",
            GamePhase::GameOver => "game_over",
        }
    }
}

/// Invalid game configuration, rejected at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Width or height is zero or above [`MAX_BOARD_DIMENSION`].
    InvalidBoardSize { width: u16, height: u16 },
    /// Gravity interval must be at least one millisecond.
    ZeroGravityInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBoardSize { width, height } => write!(
                f,
                "invalid board size {}x{} (each side must be 1..={})",
                width, height, MAX_BOARD_DIMENSION
            ),
            ConfigError::ZeroGravityInterval => write!(f, "gravity interval must be at least 1ms"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_ids_cover_one_through_seven() {
        let ids: Vec<u8> = PieceKind::ALL.iter().map(|k| k.color_id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_color_id(kind.color_id()), Some(kind));
        }
    }

    #[test]
    fn cell_value_maps_empty_to_zero() {
        assert_eq!(cell_value(None), 0);
        assert_eq!(cell_value(Some(PieceKind::J)), 7);
    }

    #[test]
    fn action_names_parse_back() {
        for action in [
            GameAction::MoveLeft,
            GameAction::MoveRight,
            GameAction::Rotate,
            GameAction::SoftDrop,
            GameAction::Start,
            GameAction::Pause,
            GameAction::Resume,
            GameAction::TogglePause,
            GameAction::Restart,
        ] {
            assert_eq!(GameAction::from_str(action.as_str()), Some(action));
        }
    }

    #[test]
    fn only_movement_is_player_input() {
        assert!(GameAction::SoftDrop.is_player_input());
        assert!(!GameAction::Pause.is_player_input());
        assert!(!GameAction::Restart.is_player_input());
    }

    #[test]
    fn config_error_message_names_dimensions() {
        let err = ConfigError::InvalidBoardSize {
            width: 0,
            height: 20,
        };
        assert!(err.to_string().contains("0x20"));
    }
}
