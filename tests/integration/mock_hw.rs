//! Mock adapters for integration tests.
//!
//! Records every motor directive, publish and event so tests can assert
//! on the full history without touching real GPIO or a broker.

use std::cell::RefCell;
use std::collections::VecDeque;

use motornode::adapters::nvs::validate_config;
use motornode::app::events::AppEvent;
use motornode::app::ports::{
    ButtonPort, ConfigError, ConfigPort, EventSink, InboundMessage, MotorPort, TransportPort,
};
use motornode::app::resolver::DriveDirective;
use motornode::config::NodeConfig;
use motornode::drivers::button::Level;
use motornode::error::{ActuatorError, CommsError};
use motornode::protocol::StatusMessage;

// ── MockHardware ──────────────────────────────────────────────

/// Button levels are consumed one per tick; once the script runs out the
/// button reads as released.
pub struct MockHardware {
    pub levels: VecDeque<Level>,
    pub drives: Vec<DriveDirective>,
    pub all_off_calls: usize,
    pub fail_drive: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            levels: VecDeque::new(),
            drives: Vec::new(),
            all_off_calls: 0,
            fail_drive: false,
        }
    }

    /// Queue one press: pressed for the next tick, released after.
    pub fn press(&mut self) {
        self.levels.push_back(Level::Low);
        self.levels.push_back(Level::High);
    }

    pub fn motor_running(&self) -> bool {
        self.drives.last().is_some_and(|d| d.forward)
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonPort for MockHardware {
    fn read_level(&mut self) -> Level {
        self.levels.pop_front().unwrap_or(Level::High)
    }
}

impl MotorPort for MockHardware {
    fn drive(&mut self, directive: DriveDirective) -> Result<(), ActuatorError> {
        if self.fail_drive {
            return Err(ActuatorError::EnableWriteFailed);
        }
        self.drives.push(directive);
        Ok(())
    }

    fn all_off(&mut self) {
        self.all_off_calls += 1;
    }
}

// ── MockTransport ─────────────────────────────────────────────

pub const COMMAND_TOPIC: &str = "iot3/IOT_DC_Motor/cmd/motor/fmt/json";

pub struct MockTransport {
    pub connected: bool,
    pub fail_publish: bool,
    pub inbox: VecDeque<InboundMessage>,
    pub published: Vec<Vec<u8>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn connected() -> Self {
        Self {
            connected: true,
            fail_publish: false,
            inbox: VecDeque::new(),
            published: Vec::new(),
        }
    }

    pub fn disconnected() -> Self {
        Self {
            connected: false,
            ..Self::connected()
        }
    }

    pub fn deliver(&mut self, payload: &[u8]) {
        let msg = InboundMessage::new(COMMAND_TOPIC, payload).expect("payload fits");
        self.inbox.push_back(msg);
    }

    /// Decoded status messages, oldest first.
    pub fn statuses(&self) -> Vec<StatusMessage> {
        self.published
            .iter()
            .map(|p| serde_json::from_slice(p).expect("valid status JSON"))
            .collect()
    }
}

impl TransportPort for MockTransport {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn publish(&mut self, payload: &[u8]) -> Result<(), CommsError> {
        if !self.connected {
            return Err(CommsError::BrokerDisconnected);
        }
        if self.fail_publish {
            return Err(CommsError::MqttPublishFailed);
        }
        self.published.push(payload.to_vec());
        Ok(())
    }

    fn poll_inbound(&mut self) -> Option<InboundMessage> {
        self.inbox.pop_front()
    }

    fn service(&mut self) {}
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|&e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── MockNvs ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockNvs {
    stored: RefCell<Option<Vec<u8>>>,
}

#[allow(dead_code)]
impl MockNvs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigPort for MockNvs {
    fn load(&self) -> Result<NodeConfig, ConfigError> {
        match self.stored.borrow().as_deref() {
            Some(bytes) => {
                let cfg: NodeConfig =
                    postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
                validate_config(&cfg)?;
                Ok(cfg)
            }
            None => Ok(NodeConfig::default()),
        }
    }

    fn save(&self, config: &NodeConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        *self.stored.borrow_mut() = Some(bytes);
        Ok(())
    }
}
