//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains all the game rules, state management, and simulation logic.
//! It has **no dependencies** on UI, networking, timers or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical games
//! - **Testable**: Unit tests for every rule
//! - **Portable**: Can run in any environment (terminal, headless, remote-controlled)
//!
//! # Module Structure
//!
//! - [`board`]: Rectangular grid with placement checks and line clearing
//! - [`pieces`]: The seven shape templates and clockwise matrix rotation
//! - [`factory`]: Uniform random spawning at the top-center
//! - [`game_state`]: Active piece, gravity, locking, scoring and the phase lifecycle
//! - [`rng`]: Seeded LCG and the [`PieceSource`](rng::PieceSource) seam
//! - [`scoring`]: Flat bonus per cleared row
//! - [`snapshot`]: Read-only view for renderers and remote clients
//!
//! # Game Rules
//!
//! - **Uniform random**: every spawn is an independent draw over seven kinds
//! - **Plain rotation**: 90° clockwise matrix rotation; no wall kicks, rejected if blocked
//! - **Immediate lock**: a piece that cannot fall locks on that gravity step
//! - **Scoring**: 10 points per cleared row, nothing else
//! - **Game over**: a spawn that collides wipes board and score
//!
//! # Example
//!
//! ```
//! use tui_blockfall_core::GameState;
//! use tui_blockfall_types::{GameAction, GamePhase};
//!
//! let mut game = GameState::new(10, 20, 12345).unwrap();
//! game.start();
//!
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::Rotate);
//! game.apply_action(GameAction::SoftDrop);
//!
//! assert_eq!(game.phase(), GamePhase::Running);
//! assert!(game.active().is_some());
//! ```
//!
//! Gravity timing lives outside this crate: call
//! [`GameState::step`](game_state::GameState::step) whenever a gravity tick is due.

pub mod board;
pub mod factory;
pub mod game_state;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use tui_blockfall_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use factory::PieceFactory;
pub use game_state::{GameEvent, GameState, StepOutcome, Tetromino};
pub use pieces::{template, Shape};
pub use rng::{PieceSource, ScriptedPieces, SimpleRng, UniformPieces};
pub use scoring::line_clear_score;
pub use snapshot::{ActiveSnapshot, GameSnapshot};
