//! Protocol module - JSON message types for remote players
//!
//! Every message is one JSON object per line carrying `type`, `seq`
//! (sender-side sequence number) and `ts` (milliseconds since the epoch).

use serde::{Deserialize, Serialize};

use tui_2048_core::{FrameTile, TurnFrame};

/// Protocol version spoken by this server
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Major version prefix a client must announce
pub const PROTOCOL_MAJOR: &str = "1.";

pub const GAME_ID: &str = "tui-2048";

// ============== Client -> Game Messages ==============

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    /// Receive an observation after every drawn turn
    #[serde(default)]
    pub stream_observations: bool,
}

/// Controller command: one action per message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    /// `left`, `right`, `up`, `down` or `restart`
    pub action: String,
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Hello,
    Command,
    Welcome,
    Ack,
    Error,
    Observation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignedRole {
    Controller,
    Observer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: MessageType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub game_id: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
    /// Action names accepted by `command`
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Ok,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: MessageType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    NotController,
    InvalidCommand,
    Backpressure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: MessageType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// Where one tile came from this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMoveSnapshot {
    pub to: [u8; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<[u8; 2]>,
    /// Second half of a merge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_from: Option<[u8; 2]>,
    pub power: u8,
    pub merged: bool,
    pub spawned: bool,
}

impl From<&FrameTile> for TileMoveSnapshot {
    fn from(tile: &FrameTile) -> Self {
        Self {
            to: [tile.x, tile.y],
            from: tile.from.map(|(x, y)| [x, y]),
            partner_from: tile.partner_from.map(|(x, y)| [x, y]),
            power: tile.power,
            merged: tile.merged,
            spawned: tile.spawned,
        }
    }
}

/// Stable 64-bit state fingerprint (serialized as hex)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format!("{:016x}", self.0))
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        u64::from_str_radix(s, 16)
            .map(StateHash)
            .map_err(serde::de::Error::custom)
    }
}

/// Board state after a drawn turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: MessageType,
    pub seq: u64,
    pub ts: u64,
    pub turn: u32,
    pub score: u64,
    pub best: u64,
    pub game_over: bool,
    pub grid_size: usize,
    /// Row-major tile powers, 0 for an empty cell
    pub grid: Vec<Vec<u8>>,
    pub moves: Vec<TileMoveSnapshot>,
    pub state_hash: StateHash,
}

impl ObservationMessage {
    /// Build from a drawn frame plus the score state around it
    pub fn from_frame(frame: &TurnFrame, seq: u64, best: u64, game_over: bool) -> Self {
        let size = frame.grid_size;
        let mut grid = vec![vec![0u8; size]; size];
        for tile in &frame.tiles {
            if let Some(row) = grid.get_mut(tile.y as usize) {
                if let Some(cell) = row.get_mut(tile.x as usize) {
                    *cell = tile.power;
                }
            }
        }

        let state_hash = state_hash(&grid, frame.turn, frame.score, game_over);
        Self {
            msg_type: MessageType::Observation,
            seq,
            ts: current_timestamp_ms(),
            turn: frame.turn,
            score: frame.score,
            best,
            game_over,
            grid_size: size,
            grid,
            moves: frame.tiles.iter().map(TileMoveSnapshot::from).collect(),
            state_hash,
        }
    }
}

/// FNV-1a over the visible state; stable across platforms and toolchains
fn state_hash(grid: &[Vec<u8>], turn: u32, score: u64, game_over: bool) -> StateHash {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut state = OFFSET_BASIS;
    let mut write = |bytes: &[u8]| {
        for &b in bytes {
            state ^= b as u64;
            state = state.wrapping_mul(PRIME);
        }
    };
    for row in grid {
        write(row);
    }
    write(&turn.to_le_bytes());
    write(&score.to_le_bytes());
    write(&[game_over as u8]);
    StateHash(state)
}

// ============== Parsing ==============

/// Parse an inbound line
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Err(e) => {
            // An unknown type is answered with a protocol error, not dropped.
            #[derive(Debug, Deserialize)]
            struct Envelope {
                #[serde(rename = "type")]
                msg_type: Option<String>,
                seq: Option<u64>,
            }
            let envelope = serde_json::from_str::<Envelope>(json)?;
            match envelope.msg_type.as_deref() {
                Some("hello") | Some("command") => Err(e),
                _ => Ok(ParsedMessage::Unknown {
                    seq: envelope.seq.unwrap_or(0),
                }),
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Unknown { seq: u64 },
}

/// Best-effort `seq` lookup in a line that failed to parse
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse().ok()
}

// ============== Constructors ==============

pub fn create_hello(seq: u64, client_name: &str, stream_observations: bool) -> HelloMessage {
    HelloMessage {
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: PROTOCOL_VERSION.to_string(),
        requested: RequestedCapabilities {
            stream_observations,
        },
    }
}

pub fn create_welcome(
    seq: u64,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: MessageType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        game_id: GAME_ID.to_string(),
        client_id,
        role,
        controller_id,
        actions: ["left", "right", "up", "down", "restart"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: MessageType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: MessageType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Current timestamp in milliseconds
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
