//! TCP server for the remote-control adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;

use arrayvec::ArrayVec;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, watch, RwLock};
use tracing::{debug, info, warn};

use crate::protocol::*;
use crate::runtime::{AdapterStatus, InboundCommand, InboundPayload, OutboundMessage};
use crate::types::{GameAction, DEFAULT_AI_PORT};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Capacity of the queue between the server and the game loop
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_AI_PORT,
            max_pending_commands: 16,
        }
    }
}

/// Handle to a connected client
#[derive(Debug)]
struct ClientHandle {
    id: usize,
    addr: SocketAddr,
    handshaken: bool,
    stream_observations: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Default)]
struct Registry {
    clients: Vec<ClientHandle>,
    controller: Option<usize>,
}

impl Registry {
    fn get_mut(&mut self, client_id: usize) -> Option<&mut ClientHandle> {
        self.clients.iter_mut().find(|c| c.id == client_id)
    }

    fn status(&self) -> AdapterStatus {
        AdapterStatus {
            client_count: self.clients.len(),
            controller_id: self.controller,
        }
    }

    /// Record `seq` for a client. False if it does not strictly increase.
    fn accept_seq(&mut self, client_id: usize, seq: u64) -> bool {
        let Some(client) = self.get_mut(client_id) else {
            return false;
        };
        if client.last_seq.is_some_and(|prev| seq <= prev) {
            return false;
        }
        client.last_seq = Some(seq);
        true
    }
}

struct ServerState {
    registry: RwLock<Registry>,
    status_tx: watch::Sender<AdapterStatus>,
}

impl ServerState {
    async fn publish_status(&self) {
        let status = self.registry.read().await.status();
        self.status_tx.send_replace(status);
    }

    async fn send_to(&self, client_id: usize, msg: ClientOutbound) {
        let registry = self.registry.read().await;
        if let Some(c) = registry.clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(msg);
        }
    }
}

#[derive(Debug, Clone)]
enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

/// Start the TCP server
///
/// `ready_tx` receives the bound address once the listener is up (port 0
/// picks a free port).
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    status_tx: watch::Sender<AdapterStatus>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState {
        registry: RwLock::new(Registry::default()),
        status_tx,
    });

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        state.send_to(client_id, ClientOutbound::Ack(ack)).await;
                    }
                    OutboundMessage::ToClientError { client_id, err } => {
                        state.send_to(client_id, ClientOutbound::Error(err)).await;
                    }
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        state.send_to(client_id, ClientOutbound::Observation(obs)).await;
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        let registry = state.registry.read().await;
                        for c in registry.clients.iter().filter(|c| c.stream_observations) {
                            let _ = c.tx.send(ClientOutbound::Observation(obs.clone()));
                        }
                    }
                }
            }
        });
    }

    let mut client_id_counter = 0usize;
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, Arc::clone(&state), command_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            remove_client(&state, client_id).await;
            info!(client_id, "client disconnected");
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let (tx, rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let mut registry = state.registry.write().await;
        registry.clients.push(ClientHandle {
            id: client_id,
            addr,
            handshaken: false,
            stream_observations: false,
            last_seq: None,
            tx: tx.clone(),
        });
    }
    state.publish_status().await;

    let write_task = tokio::spawn(write_loop(writer, rx));

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        debug!(client_id, line = trimmed, "recv");

        let reply = match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                match on_hello(&state, client_id, &hello, &command_tx).await {
                    HelloOutcome::Welcome(w) => ClientOutbound::Welcome(w),
                    HelloOutcome::Reject(err) => ClientOutbound::Error(err),
                    HelloOutcome::Close(err) => {
                        let _ = tx.send(ClientOutbound::Error(err));
                        break;
                    }
                }
            }
            Ok(ParsedMessage::Command(cmd)) => {
                match on_command(&state, client_id, &cmd, &command_tx).await {
                    // Acked by the game loop once applied.
                    Ok(()) => continue,
                    Err(err) => ClientOutbound::Error(err),
                }
            }
            Ok(ParsedMessage::Unknown(unknown)) => {
                warn!(client_id, seq = unknown.seq, "unknown message type");
                ClientOutbound::Error(create_error(
                    unknown.seq,
                    ErrorCode::InvalidCommand,
                    "unknown message type",
                ))
            }
            Err(e) => {
                warn!(client_id, error = %e, "invalid message");
                ClientOutbound::Error(create_error(
                    extract_seq(trimmed),
                    ErrorCode::InvalidCommand,
                    &format!("invalid message: {}", e),
                ))
            }
        };
        let _ = tx.send(reply);
    }

    drop(tx);
    // The registry still holds a sender; remove it so the writer can finish.
    remove_client(&state, client_id).await;
    let _ = write_task.await;
    Ok(())
}

async fn write_loop(
    mut writer: tokio::net::tcp::OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<ClientOutbound>,
) {
    let mut buf: Vec<u8> = Vec::with_capacity(4096);
    while let Some(msg) = rx.recv().await {
        buf.clear();
        let encoded = match &msg {
            ClientOutbound::Welcome(m) => serde_json::to_writer(&mut buf, m),
            ClientOutbound::Ack(m) => serde_json::to_writer(&mut buf, m),
            ClientOutbound::Error(m) => serde_json::to_writer(&mut buf, m),
            ClientOutbound::Observation(m) => serde_json::to_writer(&mut buf, m),
        };
        if encoded.is_err() {
            continue;
        }
        buf.push(b'\n');
        if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
            break;
        }
    }
}

enum HelloOutcome {
    Welcome(WelcomeMessage),
    Reject(ErrorMessage),
    Close(ErrorMessage),
}

async fn on_hello(
    state: &ServerState,
    client_id: usize,
    hello: &HelloMessage,
    command_tx: &mpsc::Sender<InboundCommand>,
) -> HelloOutcome {
    if !is_compatible_version(&hello.protocol_version) {
        warn!(client_id, version = %hello.protocol_version, "protocol mismatch");
        return HelloOutcome::Close(create_error(
            hello.seq,
            ErrorCode::ProtocolMismatch,
            &format!(
                "protocol version {} not supported (server speaks {})",
                hello.protocol_version, PROTOCOL_VERSION
            ),
        ));
    }

    let welcome = {
        let mut registry = state.registry.write().await;
        if !registry.accept_seq(client_id, hello.seq) {
            return HelloOutcome::Reject(create_error(
                hello.seq,
                ErrorCode::InvalidCommand,
                "seq must be strictly increasing",
            ));
        }
        if registry.controller.is_none() {
            registry.controller = Some(client_id);
            info!(client_id, "client is now controller");
        }
        let controller = registry.controller;
        if let Some(client) = registry.get_mut(client_id) {
            client.handshaken = true;
            client.stream_observations = hello.requested.stream_observations;
        }
        let role = if controller == Some(client_id) {
            AssignedRole::Controller
        } else {
            AssignedRole::Observer
        };
        create_welcome(hello.seq, client_id, role, controller)
    };
    info!(client_id, name = %hello.client.name, role = ?welcome.role, "hello");
    state.publish_status().await;

    if hello.requested.stream_observations {
        let _ = command_tx.try_send(InboundCommand {
            client_id,
            seq: hello.seq,
            payload: InboundPayload::SnapshotRequest,
        });
    }
    HelloOutcome::Welcome(welcome)
}

async fn on_command(
    state: &ServerState,
    client_id: usize,
    cmd: &CommandMessage,
    command_tx: &mpsc::Sender<InboundCommand>,
) -> Result<(), ErrorMessage> {
    {
        let mut registry = state.registry.write().await;
        let handshaken = registry
            .get_mut(client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false);
        if !handshaken {
            return Err(create_error(
                cmd.seq,
                ErrorCode::HandshakeRequired,
                "send hello before command",
            ));
        }
        if !registry.accept_seq(client_id, cmd.seq) {
            return Err(create_error(
                cmd.seq,
                ErrorCode::InvalidCommand,
                "seq must be strictly increasing",
            ));
        }
        if registry.controller != Some(client_id) {
            return Err(create_error(
                cmd.seq,
                ErrorCode::NotController,
                "only the controller may send commands",
            ));
        }
    }

    let actions = map_actions(&cmd.actions)
        .map_err(|message| create_error(cmd.seq, ErrorCode::InvalidCommand, &message))?;

    command_tx
        .try_send(InboundCommand {
            client_id,
            seq: cmd.seq,
            payload: InboundPayload::Actions(actions),
        })
        .map_err(|_| create_error(cmd.seq, ErrorCode::Backpressure, "command queue is full"))
}

/// Map wire action names to game actions.
fn map_actions(names: &[String]) -> Result<ArrayVec<GameAction, MAX_ACTIONS_PER_COMMAND>, String> {
    let mut actions = ArrayVec::new();
    for name in names {
        let action = GameAction::from_str(name).ok_or_else(|| format!("unknown action: {}", name))?;
        actions
            .try_push(action)
            .map_err(|_| format!("at most {} actions per command", MAX_ACTIONS_PER_COMMAND))?;
    }
    Ok(actions)
}

/// Remove a client; if it was the controller, promote the lowest remaining id.
async fn remove_client(state: &ServerState, client_id: usize) {
    {
        let mut registry = state.registry.write().await;
        let Some(pos) = registry.clients.iter().position(|c| c.id == client_id) else {
            return;
        };
        let removed = registry.clients.remove(pos);
        debug!(client_id, addr = %removed.addr, "client removed");
        if registry.controller == Some(client_id) {
            registry.controller = registry.clients.iter().map(|c| c.id).min();
            match registry.controller {
                Some(new_id) => info!(from = client_id, to = new_id, "controller promoted"),
                None => info!(client_id, "controller released"),
            }
        }
    }
    state.publish_status().await;
}
