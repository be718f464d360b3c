//! Engine crate - drives a game over time.
//!
//! The core crate knows nothing about clocks. This crate adds the gravity
//! schedule ([`GravityTimer`]) and a [`Session`] that keeps the schedule in
//! step with the game phase: started on start/restart/resume, cancelled on
//! pause and game over. There is never more than one schedule.

pub mod session;
pub mod timer;

pub use session::{GameOverNotice, Session, SessionConfig};
pub use timer::GravityTimer;
