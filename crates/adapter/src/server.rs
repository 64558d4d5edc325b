//! TCP server for remote players
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, watch, RwLock};
use tracing::{debug, info, warn};

use tui_2048_types::GameAction;

use crate::protocol::*;
use crate::runtime::{InboundCommand, InboundPayload, OutboundMessage};

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_pending_commands: usize,
    pub disabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7777,
            max_pending_commands: 10,
            disabled: false,
        }
    }
}

impl ServerConfig {
    /// Read `TUI_2048_AI_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] over any key lookup; unparsable
    /// values fall back to the defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = lookup("TUI_2048_AI_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = lookup("TUI_2048_AI_PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = lookup("TUI_2048_AI_MAX_PENDING")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);
        let disabled = lookup("TUI_2048_AI_DISABLED")
            .map(|v| {
                let v = v.trim();
                v == "1" || v.eq_ignore_ascii_case("true")
            })
            .unwrap_or(false);

        Self {
            host,
            port,
            max_pending_commands,
            disabled,
        }
    }

    /// Loopback on an OS-assigned port
    pub fn ephemeral() -> Self {
        Self {
            port: 0,
            ..Self::default()
        }
    }
}

/// Connection summary published to the game loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterStatus {
    pub client_count: usize,
    pub controller_id: Option<u64>,
}

/// Handle to a connected client
struct ClientHandle {
    id: u64,
    is_controller: bool,
    stream_observations: bool,
    handshaken: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
enum ClientOutbound {
    Line(String),
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

impl ClientOutbound {
    fn encode(self) -> serde_json::Result<Vec<u8>> {
        match self {
            ClientOutbound::Line(line) => Ok(line.into_bytes()),
            ClientOutbound::Welcome(m) => serde_json::to_vec(&m),
            ClientOutbound::Ack(m) => serde_json::to_vec(&m),
            ClientOutbound::Error(m) => serde_json::to_vec(&m),
            ClientOutbound::Observation(m) => serde_json::to_vec(&m),
        }
    }
}

/// Shared server state
#[derive(Default)]
struct ServerState {
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<u64>>,
    status_tx: Option<watch::Sender<AdapterStatus>>,
}

impl ServerState {
    fn publish_status(&self, clients: &[ClientHandle], controller: Option<u64>) {
        if let Some(tx) = &self.status_tx {
            tx.send_replace(AdapterStatus {
                client_count: clients.len(),
                controller_id: controller,
            });
        }
    }

    async fn add(&self, handle: ClientHandle) {
        let controller = self.controller.read().await;
        let mut clients = self.clients.write().await;
        clients.push(handle);
        self.publish_status(&clients, *controller);
    }

    async fn send_to(&self, client_id: u64, msg: ClientOutbound) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(msg);
        }
    }

    async fn broadcast(&self, msg: ClientOutbound) {
        let clients = self.clients.read().await;
        for c in clients.iter().filter(|c| c.handshaken && c.stream_observations) {
            let _ = c.tx.send(msg.clone());
        }
    }

    async fn is_handshaken(&self, client_id: u64) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    async fn is_controller(&self, client_id: u64) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.is_controller)
            .unwrap_or(false)
    }

    /// Enforce a strictly increasing `seq` per sender
    async fn check_and_update_seq(&self, client_id: u64, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    /// Mark the client handshaken; the first one becomes controller.
    /// Returns the assigned role and the current controller id.
    async fn register_hello(
        &self,
        client_id: u64,
        seq: u64,
        stream_observations: bool,
    ) -> (AssignedRole, Option<u64>) {
        let mut controller = self.controller.write().await;
        let mut clients = self.clients.write().await;

        let promote = controller.is_none();
        if promote {
            *controller = Some(client_id);
        }
        if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
            client.handshaken = true;
            client.last_seq = Some(seq);
            client.stream_observations = stream_observations;
            if promote {
                client.is_controller = true;
            }
        }

        self.publish_status(&clients, *controller);
        let role = if *controller == Some(client_id) {
            AssignedRole::Controller
        } else {
            AssignedRole::Observer
        };
        (role, *controller)
    }

    /// Drop the client; a departing controller hands over to the oldest
    /// remaining handshaken client
    async fn remove(&self, client_id: u64) {
        let mut controller = self.controller.write().await;
        let mut clients = self.clients.write().await;
        clients.retain(|c| c.id != client_id);

        if *controller == Some(client_id) {
            let next_id = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
            *controller = next_id;
            match next_id {
                Some(new_id) => {
                    if let Some(c) = clients.iter_mut().find(|c| c.id == new_id) {
                        c.is_controller = true;
                    }
                    info!(client_id = new_id, "controller promoted");
                }
                None => info!(client_id, "controller released"),
            }
        }
        self.publish_status(&clients, *controller);
    }
}

/// Start the TCP server.
///
/// Sends the bound address through `ready_tx` once the listener is up, then
/// accepts connections until the task is dropped. Connection changes are
/// published on `status_tx`.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
    status_tx: Option<watch::Sender<AdapterStatus>>,
) -> anyhow::Result<()> {
    if config.disabled {
        info!("remote play disabled via TUI_2048_AI_DISABLED");
        return Ok(());
    }

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    info!(%bound, "tcp server listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState {
        status_tx,
        ..ServerState::default()
    });
    let mut client_id_counter = 0u64;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClient { client_id, line } => {
                        state.send_to(client_id, ClientOutbound::Line(line)).await;
                    }
                    OutboundMessage::Broadcast { line } => {
                        state.broadcast(ClientOutbound::Line(line)).await;
                    }
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        state.send_to(client_id, ClientOutbound::Observation(obs)).await;
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        state.broadcast(ClientOutbound::Observation(obs)).await;
                    }
                    OutboundMessage::Ack { client_id, seq } => {
                        state.send_to(client_id, ClientOutbound::Ack(create_ack(seq))).await;
                    }
                    OutboundMessage::Error {
                        client_id,
                        seq,
                        code,
                        message,
                    } => {
                        let error = create_error(seq, code, &message);
                        state.send_to(client_id, ClientOutbound::Error(error)).await;
                    }
                }
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, &state, command_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            state.remove(client_id).await;
            info!(client_id, "client disconnected");
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: u64,
    state: &ServerState,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    // Channel to send messages to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    state
        .add(ClientHandle {
            id: client_id,
            is_controller: false,
            stream_observations: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        })
        .await;

    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Ok(bytes) = msg.encode() else {
                continue;
            };
            if writer.write_all(&bytes).await.is_err()
                || writer.write_all(b"\n").await.is_err()
                || writer.flush().await.is_err()
            {
                break;
            }
        }
    });

    let reply = |msg: ClientOutbound| {
        let _ = tx.send(msg);
    };

    // Handle incoming messages
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

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, hello.seq).await
                {
                    reply(ClientOutbound::Error(create_error(
                        hello.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    )));
                    continue;
                }

                if !hello.protocol_version.starts_with(PROTOCOL_MAJOR) {
                    reply(ClientOutbound::Error(create_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    )));
                    break;
                }

                let stream = hello.requested.stream_observations;
                let (role, controller_id) = state.register_hello(client_id, hello.seq, stream).await;
                info!(client_id, name = %hello.client.name, ?role, "hello");
                reply(ClientOutbound::Welcome(create_welcome(
                    hello.seq,
                    client_id,
                    role,
                    controller_id,
                )));

                if stream {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !state.is_handshaken(client_id).await {
                    reply(ClientOutbound::Error(create_error(
                        cmd.seq,
                        ErrorCode::HandshakeRequired,
                        "Send hello before command",
                    )));
                    continue;
                }

                if !state.check_and_update_seq(client_id, cmd.seq).await {
                    reply(ClientOutbound::Error(create_error(
                        cmd.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    )));
                    continue;
                }

                if !state.is_controller(client_id).await {
                    reply(ClientOutbound::Error(create_error(
                        cmd.seq,
                        ErrorCode::NotController,
                        "Only controller may send commands",
                    )));
                    continue;
                }

                let Some(action) = GameAction::from_str(cmd.action.trim()) else {
                    reply(ClientOutbound::Error(create_error(
                        cmd.seq,
                        ErrorCode::InvalidCommand,
                        &format!("Unknown action: {}", cmd.action),
                    )));
                    continue;
                };

                debug!(client_id, seq = cmd.seq, action = action.as_str(), "command");
                // Acked by the game loop once applied.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        payload: InboundPayload::Action(action),
                    })
                    .is_err()
                {
                    reply(ClientOutbound::Error(create_error(
                        cmd.seq,
                        ErrorCode::Backpressure,
                        "Command queue is full",
                    )));
                }
            }

            Ok(ParsedMessage::Unknown { seq }) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, seq).await
                {
                    reply(ClientOutbound::Error(create_error(
                        seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    )));
                    continue;
                }
                reply(ClientOutbound::Error(create_error(
                    seq,
                    ErrorCode::InvalidCommand,
                    "Unknown message type",
                )));
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                reply(ClientOutbound::Error(create_error(
                    seq,
                    ErrorCode::InvalidCommand,
                    &format!("JSON parse error: {}", e),
                )));
            }
        }
    }

    // The write task flushes what is queued and exits once the caller
    // removes this client, which drops the last sender.
    drop(tx);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 7777);
        assert!(!config.disabled);
    }

    #[test]
    fn test_server_config_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("TUI_2048_AI_HOST", "0.0.0.0"),
            ("TUI_2048_AI_PORT", "9000"),
            ("TUI_2048_AI_MAX_PENDING", "3"),
            ("TUI_2048_AI_DISABLED", "TRUE"),
        ]));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_pending_commands, 3);
        assert!(config.disabled);
    }

    #[test]
    fn test_server_config_ignores_garbage() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("TUI_2048_AI_HOST", "  "),
            ("TUI_2048_AI_PORT", "seven"),
            ("TUI_2048_AI_DISABLED", "no"),
        ]));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 7777);
        assert!(!config.disabled);
    }

    #[test]
    fn test_server_config_from_env() {
        // This test just ensures it doesn't panic
        let _config = ServerConfig::from_env();
    }

    #[tokio::test]
    async fn test_controller_handover() {
        let (status_tx, status_rx) = watch::channel(AdapterStatus::default());
        let state = ServerState {
            status_tx: Some(status_tx),
            ..ServerState::default()
        };
        let (tx, _rx) = mpsc::unbounded_channel();
        for id in 1..=3 {
            state
                .add(ClientHandle {
                    id,
                    is_controller: false,
                    stream_observations: false,
                    handshaken: false,
                    last_seq: None,
                    tx: tx.clone(),
                })
                .await;
        }
        assert_eq!(status_rx.borrow().client_count, 3);

        assert_eq!(
            state.register_hello(2, 1, false).await,
            (AssignedRole::Controller, Some(2))
        );
        assert_eq!(
            state.register_hello(3, 1, true).await,
            (AssignedRole::Observer, Some(2))
        );

        // Client 1 never said hello, so it is skipped.
        state.remove(2).await;
        assert!(state.is_controller(3).await);
        assert_eq!(
            *status_rx.borrow(),
            AdapterStatus {
                client_count: 2,
                controller_id: Some(3)
            }
        );
        assert!(!state.check_and_update_seq(3, 1).await);
        assert!(state.check_and_update_seq(3, 2).await);
    }
}
