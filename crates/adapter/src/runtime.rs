//! Adapter runtime integration.
//!
//! Bridges the synchronous game loop with the async TCP server: the server
//! runs on its own tokio runtime, and the game loop polls commands and pushes
//! replies through channels without ever blocking.

use std::net::SocketAddr;

use anyhow::{anyhow, Result};
use arrayvec::ArrayVec;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::error;

use crate::protocol::{AckMessage, ErrorMessage, ObservationMessage, MAX_ACTIONS_PER_COMMAND};
use crate::server::{run_server, ServerConfig};
use crate::types::GameAction;

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    /// A freshly handshaken client wants the current state right away.
    SnapshotRequest,
    Actions(ArrayVec<GameAction, MAX_ACTIONS_PER_COMMAND>),
}

/// Message for the server to deliver.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientAck { client_id: usize, ack: AckMessage },
    ToClientError { client_id: usize, err: ErrorMessage },
    ToClientObservation { client_id: usize, obs: ObservationMessage },
    /// Sent to every client that asked for streamed observations
    BroadcastObservation { obs: ObservationMessage },
}

/// Connection summary published by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdapterStatus {
    pub client_count: usize,
    pub controller_id: Option<usize>,
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    local_addr: SocketAddr,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status_rx: watch::Receiver<AdapterStatus>,
}

impl Adapter {
    /// Start the server on a dedicated runtime and wait until it is listening.
    pub fn start(config: ServerConfig) -> Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (status_tx, status_rx) = watch::channel(AdapterStatus::default());
        let (ready_tx, ready_rx) = oneshot::channel();

        let rt = Runtime::new()?;
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, status_tx, Some(ready_tx)).await {
                error!(error = %e, "adapter server stopped");
            }
        });

        let local_addr = rt
            .block_on(ready_rx)
            .map_err(|_| anyhow!("adapter server failed to start"))?;

        Ok(Self {
            _rt: rt,
            local_addr,
            cmd_rx,
            out_tx,
            status_rx,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    pub fn status(&self) -> AdapterStatus {
        *self.status_rx.borrow()
    }
}
