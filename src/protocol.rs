//! JSON wire format exchanged with the broker.
//!
//! Inbound (command topic):
//!
//! ```json
//! { "d": { "motor": "on" } }
//! ```
//!
//! Outbound (status topic):
//!
//! ```json
//! { "d": { "relay": "on", "manual_override": "off" } }
//! ```
//!
//! Decoding is deliberately lenient: unknown keys are skipped and a
//! `motor` value of the wrong JSON type decodes as "no intent" rather
//! than an error.  Only payloads that are not JSON objects at all are
//! reported as [`ProtocolError::Malformed`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

/// A two-state switch value as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn is_on(self) -> bool {
        self == Self::On
    }

    fn parse(value: &Value) -> Option<Self> {
        match value.as_str()? {
            "on" => Some(Self::On),
            "off" => Some(Self::Off),
            _ => None,
        }
    }
}

impl From<bool> for Switch {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

// ── Inbound ───────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct CommandEnvelope {
    #[serde(default)]
    d: Option<Value>,
}

/// The semantic content of one inbound command payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandIntent {
    /// Requested motor state, if the payload carried a recognised one.
    pub motor: Option<Switch>,
}

/// Decode a command payload.
pub fn decode_command(payload: &[u8]) -> Result<CommandIntent, ProtocolError> {
    let envelope: CommandEnvelope =
        serde_json::from_slice(payload).map_err(|_| ProtocolError::Malformed)?;

    let motor = envelope
        .d
        .as_ref()
        .and_then(|d| d.get("motor"))
        .and_then(Switch::parse);

    Ok(CommandIntent { motor })
}

// ── Outbound ──────────────────────────────────────────────────

/// Reported node state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBody {
    pub relay: Switch,
    pub manual_override: Switch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub d: StatusBody,
}

/// Encode a status snapshot for publishing.
pub fn encode_status(relay: bool, manual_override: bool) -> Result<Vec<u8>, ProtocolError> {
    let msg = StatusMessage {
        d: StatusBody {
            relay: relay.into(),
            manual_override: manual_override.into(),
        },
    };
    serde_json::to_vec(&msg).map_err(|_| ProtocolError::EncodeFailed)
}
