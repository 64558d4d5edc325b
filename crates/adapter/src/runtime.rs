//! Adapter runtime integration.
//!
//! Bridges the sync game loop with the async TCP server. The server runs on
//! its own tokio runtime; the game loop polls [`Adapter::try_recv`] once per
//! frame and answers through [`Adapter::send`].

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot, watch};

use tui_2048_types::GameAction;

use crate::protocol::{ErrorCode, ObservationMessage};
use crate::server::{run_server, AdapterStatus, ServerConfig};

/// Command delivered to the game loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub client_id: u64,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundPayload {
    /// Controller action; answered with an ack once applied
    Action(GameAction),
    /// A streaming client just joined and wants the current board
    SnapshotRequest,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClient { client_id: u64, line: String },
    Broadcast { line: String },
    ToClientObservation { client_id: u64, obs: ObservationMessage },
    BroadcastObservation { obs: ObservationMessage },
    Ack { client_id: u64, seq: u64 },
    Error {
        client_id: u64,
        seq: u64,
        code: ErrorCode,
        message: String,
    },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status_rx: watch::Receiver<AdapterStatus>,
    local_addr: SocketAddr,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `TUI_2048_AI_DISABLED` is set.
    pub fn start_from_env() -> Result<Option<Self>> {
        let config = ServerConfig::from_env();
        if config.disabled {
            return Ok(None);
        }
        Self::start(config).map(Some)
    }

    /// Bind the listener and wait until it accepts connections
    pub fn start(config: ServerConfig) -> Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (ready_tx, ready_rx) = oneshot::channel::<SocketAddr>();
        let (status_tx, status_rx) = watch::channel(AdapterStatus::default());

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let server = rt.spawn(run_server(config, cmd_tx, out_rx, Some(ready_tx), Some(status_tx)));

        let local_addr = match rt.block_on(ready_rx) {
            Ok(addr) => addr,
            Err(_) => {
                // The server dropped the ready channel, so it failed to bind.
                let err = match rt.block_on(server) {
                    Ok(Err(e)) => e,
                    Ok(Ok(())) => anyhow::anyhow!("server exited before binding"),
                    Err(join) => anyhow::Error::new(join),
                };
                return Err(err.context("failed to start adapter"));
            }
        };

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            status_rx,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Connected clients and the current controller
    pub fn status(&self) -> AdapterStatus {
        *self.status_rx.borrow()
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    /// Sender half for sinks that publish on their own
    pub fn sender(&self) -> mpsc::UnboundedSender<OutboundMessage> {
        self.out_tx.clone()
    }
}
