//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MotorService (domain)
//! ```
//!
//! Driven adapters (motor outputs, button input, broker link, event sinks,
//! config storage) implement these traits.  The
//! [`MotorService`](super::service::MotorService) consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::config::NodeConfig;
use crate::drivers::button::Level;
use crate::error::{ActuatorError, CommsError};

use super::resolver::DriveDirective;

// ───────────────────────────────────────────────────────────────
// Motor port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this every tick with the resolved
/// directive.
pub trait MotorPort {
    /// Drive the outputs to match `directive`.
    fn drive(&mut self, directive: DriveDirective) -> Result<(), ActuatorError>;

    /// Drop the enable line unconditionally.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Button port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: one raw sample of the manual button per tick.
pub trait ButtonPort {
    fn read_level(&mut self) -> Level;
}

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain ↔ broker)
// ───────────────────────────────────────────────────────────────

/// Largest inbound payload the queue will carry.
pub const MAX_INBOUND_PAYLOAD: usize = 256;
/// Largest inbound topic the queue will carry.
pub const MAX_INBOUND_TOPIC: usize = 96;

/// One message received on the command topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: heapless::String<MAX_INBOUND_TOPIC>,
    pub payload: heapless::Vec<u8, MAX_INBOUND_PAYLOAD>,
}

impl InboundMessage {
    /// Copy a received message into fixed-capacity buffers.
    /// Returns `None` if either part does not fit.
    pub fn new(topic: &str, payload: &[u8]) -> Option<Self> {
        let mut t = heapless::String::new();
        t.push_str(topic).ok()?;
        let p = heapless::Vec::from_slice(payload).ok()?;
        Some(Self {
            topic: t,
            payload: p,
        })
    }
}

/// The publish/subscribe link.  Delivery, ordering and security are the
/// adapter's business; the domain only asks "connected?", "send this",
/// and "anything new?".
pub trait TransportPort {
    fn is_connected(&self) -> bool;

    /// Publish a status payload on the node's status topic.
    fn publish(&mut self, payload: &[u8]) -> Result<(), CommsError>;

    /// Take the next queued inbound command, oldest first.
    fn poll_inbound(&mut self) -> Option<InboundMessage>;

    /// Connection housekeeping (resubscribe after reconnect, etc.).
    fn service(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists node configuration.
///
/// Implementations MUST validate config values before persisting and
/// when reading them back, rejecting invalid ranges with
/// [`ConfigError::ValidationFailed`].
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`NodeConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<NodeConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &NodeConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::error::Error for ConfigError {}
