//! MQTT transport adapter.
//!
//! Implements [`TransportPort`] on top of the ESP-IDF MQTT client.
//!
//! The client delivers events on its own task.  The callback never
//! touches the state store: it copies each received command into a
//! bounded `embassy-sync` channel, and the control loop drains that
//! channel at a fixed point in its tick.
//!
//! ```text
//! ┌──────────────┐ InboundMessage ┌──────────────┐
//! │ MQTT client  │───────────────▶│ Control Loop │
//! │ task (cb)    │   (bounded)    │ poll_inbound │
//! └──────────────┘                └──────────────┘
//! ```
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real `EspMqttClient`.  Reconnection is done
//!   by the client itself; the adapter resubscribes after every connect.
//! - **all other targets**: an in-memory broker for host-side tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};

use crate::app::ports::{InboundMessage, TransportPort};
use crate::config::NodeConfig;
use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{
    Details, EspMqttClient, EventPayload, MqttClientConfiguration, QoS,
};

/// Inbound queue depth.  Commands beyond this are dropped with a warning.
pub const INBOUND_DEPTH: usize = 8;

// ───────────────────────────────────────────────────────────────
// State shared with the client task
// ───────────────────────────────────────────────────────────────

struct Shared {
    inbox: Channel<CriticalSectionRawMutex, InboundMessage, INBOUND_DEPTH>,
    connected: AtomicBool,
    resubscribe: AtomicBool,
}

impl Shared {
    fn new() -> Self {
        Self {
            inbox: Channel::new(),
            connected: AtomicBool::new(false),
            resubscribe: AtomicBool::new(false),
        }
    }

    fn on_connected(&self) {
        self.connected.store(true, Ordering::Release);
        self.resubscribe.store(true, Ordering::Release);
        info!("MQTT: connected");
    }

    fn on_disconnected(&self) {
        if self.connected.swap(false, Ordering::AcqRel) {
            warn!("MQTT: disconnected");
        }
    }

    /// Queue a received command.  Returns `false` if it was dropped.
    fn push(&self, topic: &str, payload: &[u8]) -> bool {
        let Some(msg) = InboundMessage::new(topic, payload) else {
            warn!("MQTT: dropped oversized message on '{}' ({} bytes)", topic, payload.len());
            return false;
        };
        if self.inbox.try_send(msg).is_err() {
            warn!("MQTT: inbound queue full, dropped message on '{}'", topic);
            return false;
        }
        true
    }
}

// ───────────────────────────────────────────────────────────────
// MQTT adapter
// ───────────────────────────────────────────────────────────────

pub struct MqttTransport {
    status_topic: String,
    command_topic: String,
    shared: Arc<Shared>,
    #[cfg(target_os = "espidf")]
    client: EspMqttClient<'static>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimBroker,
}

#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
struct SimBroker {
    published: Vec<Vec<u8>>,
    subscriptions: Vec<String>,
}

impl MqttTransport {
    pub fn status_topic(&self) -> &str {
        &self.status_topic
    }

    pub fn command_topic(&self) -> &str {
        &self.command_topic
    }

    /// Start the client.  The connection completes asynchronously;
    /// [`is_connected`](TransportPort::is_connected) turns true once the
    /// broker acknowledges.
    #[cfg(target_os = "espidf")]
    pub fn connect(config: &NodeConfig) -> Result<Self, esp_idf_svc::sys::EspError> {
        let shared = Arc::new(Shared::new());
        let cb_shared = Arc::clone(&shared);

        let url = config.broker_url();
        let conf = MqttClientConfiguration {
            client_id: Some(config.device_id.as_str()),
            username: Some(config.device_id.as_str()),
            password: (!config.device_token.is_empty()).then_some(config.device_token.as_str()),
            ..Default::default()
        };

        let client = EspMqttClient::new_cb(&url, &conf, move |event| match event.payload() {
            EventPayload::Connected(_) => cb_shared.on_connected(),
            EventPayload::Disconnected => cb_shared.on_disconnected(),
            EventPayload::Received {
                topic,
                data,
                details: Details::Complete,
                ..
            } => {
                cb_shared.push(topic.unwrap_or(""), data);
            }
            EventPayload::Received { .. } => {
                warn!("MQTT: chunked message ignored");
            }
            EventPayload::Error(e) => warn!("MQTT: client error {:?}", e),
            _ => {}
        })?;

        info!("MQTT: client started for {}", url);
        Ok(Self {
            status_topic: config.status_topic(),
            command_topic: config.command_topic(),
            shared,
            client,
        })
    }

    /// In-memory broker link for host-side runs.  Starts disconnected.
    #[cfg(not(target_os = "espidf"))]
    pub fn simulated(config: &NodeConfig) -> Self {
        info!("MQTT(sim): in-memory broker for {}", config.broker_url());
        Self {
            status_topic: config.status_topic(),
            command_topic: config.command_topic(),
            shared: Arc::new(Shared::new()),
            sim: SimBroker::default(),
        }
    }

    /// Simulate the broker connection coming up or dropping.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_connected(&mut self, connected: bool) {
        if connected {
            self.shared.on_connected();
        } else {
            self.shared.on_disconnected();
        }
    }

    /// Simulate the broker delivering a message on the command topic.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_deliver(&self, payload: &[u8]) -> bool {
        self.shared.push(&self.command_topic, payload)
    }

    /// Payloads published so far, oldest first.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_published(&self) -> &[Vec<u8>] {
        &self.sim.published
    }

    /// Topic filters subscribed so far (one entry per (re)subscribe).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_subscriptions(&self) -> &[String] {
        &self.sim.subscriptions
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(&mut self, payload: &[u8]) -> Result<(), CommsError> {
        self.client
            .publish(&self.status_topic, QoS::AtMostOnce, false, payload)
            .map(|_| ())
            .map_err(|e| {
                warn!("MQTT: publish failed: {}", e);
                CommsError::MqttPublishFailed
            })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(&mut self, payload: &[u8]) -> Result<(), CommsError> {
        self.sim.published.push(payload.to_vec());
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_subscribe(&mut self) -> Result<(), CommsError> {
        self.client
            .subscribe(&self.command_topic, QoS::AtLeastOnce)
            .map(|_| ())
            .map_err(|e| {
                warn!("MQTT: subscribe failed: {}", e);
                CommsError::MqttSubscribeFailed
            })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_subscribe(&mut self) -> Result<(), CommsError> {
        self.sim.subscriptions.push(self.command_topic.clone());
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// TransportPort
// ───────────────────────────────────────────────────────────────

impl TransportPort for MqttTransport {
    fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }

    fn publish(&mut self, payload: &[u8]) -> Result<(), CommsError> {
        if !self.is_connected() {
            return Err(CommsError::BrokerDisconnected);
        }
        self.platform_publish(payload)
    }

    fn poll_inbound(&mut self) -> Option<InboundMessage> {
        self.shared.inbox.try_receive().ok()
    }

    fn service(&mut self) {
        if !self.is_connected() || !self.shared.resubscribe.swap(false, Ordering::AcqRel) {
            return;
        }
        match self.platform_subscribe() {
            Ok(()) => info!("MQTT: subscribed to '{}'", self.command_topic),
            // Retry on the next loop iteration.
            Err(_) => self.shared.resubscribe.store(true, Ordering::Release),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
