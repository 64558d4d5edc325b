//! Adapter module - remote play via TCP socket with JSON protocol
//!
//! This crate lets external agents watch and drive a running game over a
//! TCP socket, and persists the best score to disk.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7777)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Observation Streaming**: Clients that asked for it get an observation
//!    after every drawn turn and on game over
//! 5. **Commanding**: The controller sends one action per `command`
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info and requested capabilities
//! - **command**: `left`, `right`, `up`, `down` or `restart`
//!
//! ## Server → Client
//!
//! - **welcome**: Assigned role and accepted actions
//! - **observation**: Turn, score, best, grid powers and per-tile moves
//! - **ack**: The command was applied
//! - **error**: `handshake_required`, `protocol_mismatch`, `not_controller`,
//!   `invalid_command` or `backpressure`
//!
//! Sequence numbers must strictly increase per client.
//!
//! # Environment Variables
//!
//! - `TUI_2048_AI_HOST`: Bind address (default: "127.0.0.1")
//! - `TUI_2048_AI_PORT`: Port number (default: 7777)
//! - `TUI_2048_AI_MAX_PENDING`: Command queue depth (default: 10)
//! - `TUI_2048_AI_DISABLED`: Set to "1" or "true" to disable the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1700000000000,"protocol_version":"1.0.0","game_id":"tui-2048","client_id":1,"role":"controller",...}
//! Server -> Client: {"type":"observation","seq":1,"ts":1700000000001,"turn":0,"score":2,"best":2,"game_over":false,"grid":[[0,0,0,0],...],...}
//! Client -> Server: {"type":"command","seq":2,"ts":0,"action":"left"}
//! Server -> Client: {"type":"ack","seq":2,"ts":1700000000002,"status":"ok"}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7777
//! {"type":"hello","seq":1,"client":{"name":"nc"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! ```

pub mod observer;
pub mod protocol;
pub mod runtime;
pub mod server;
pub mod store;

pub use tui_2048_core as core;
pub use tui_2048_types as types;

pub use observer::ObservationSink;
pub use protocol::*;
pub use runtime::{Adapter, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{run_server, AdapterStatus, ServerConfig};
pub use store::FileScoreStore;
