//! Adapter module - remote control via TCP socket with a JSON line protocol
//!
//! Lets an external program (a bot, a test harness, a second terminal) drive
//! the game and watch it.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: Client connects to the TCP socket (default: 127.0.0.1:7777)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Commanding**: The controller sends batches of actions; each batch is acked
//!    once the game loop has applied it
//! 5. **Observation Streaming**: Clients that asked for it receive an
//!    `observation` whenever the game changes
//!
//! Errors carry a code: `handshake_required`, `protocol_mismatch`,
//! `not_controller`, `invalid_command` (also used for non-increasing `seq`)
//! and `backpressure`. When the controller disconnects, the remaining client
//! with the lowest id takes over.
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1700000000000,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1700000000001,"protocol_version":"1.0.0","client_id":1,"role":"controller","controller_id":1}
//! Server -> Client: {"type":"observation","seq":1,"ts":1700000000002,"phase":"idle","playable":false,...}
//! Client -> Server: {"type":"command","seq":2,"ts":1700000000003,"actions":["start","moveLeft","rotate"]}
//! Server -> Client: {"type":"ack","seq":2,"ts":1700000000004,"status":"ok"}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7777
//! ```

pub mod bridge;
pub mod protocol;
pub mod runtime;
pub mod server;

pub use tui_blockfall_core as core;
pub use tui_blockfall_engine as engine;
pub use tui_blockfall_types as types;

pub use bridge::GameLink;
pub use protocol::*;
pub use runtime::{Adapter, AdapterStatus, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{run_server, ServerConfig};
