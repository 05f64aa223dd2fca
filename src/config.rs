//! Node configuration parameters
//!
//! All tunable parameters for the MotorNode.
//! Values are loaded from NVS at boot; missing or corrupted blobs fall
//! back to [`NodeConfig::default()`].

use serde::{Deserialize, Serialize};

/// Core node configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- Network ---
    /// WiFi station SSID
    pub wifi_ssid: String,
    /// WiFi station password (empty for open networks)
    pub wifi_password: String,

    // --- Broker ---
    /// MQTT broker host name or address
    pub broker_host: String,
    /// MQTT broker TCP port
    pub broker_port: u16,
    /// Device identifier, also used to build the topic names
    pub device_id: String,
    /// Broker password for this device
    pub device_token: String,

    // --- Timing ---
    /// Periodic status publish interval (milliseconds, 0 = change-only)
    pub pub_interval_ms: u32,
    /// Button debounce window (milliseconds)
    pub debounce_ms: u32,
    /// Control loop period (milliseconds)
    pub control_loop_interval_ms: u32,
}

impl NodeConfig {
    /// Topic the node publishes its status snapshot on.
    pub fn status_topic(&self) -> String {
        format!("iot3/{}/evt/status/fmt/json", self.device_id)
    }

    /// Topic filter the node subscribes to for commands.
    pub fn command_topic(&self) -> String {
        format!("iot3/{}/cmd/+/fmt/+", self.device_id)
    }

    /// Broker URL in the form the MQTT client expects.
    pub fn broker_url(&self) -> String {
        format!("mqtt://{}:{}", self.broker_host, self.broker_port)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // Network
            wifi_ssid: String::new(),
            wifi_password: String::new(),

            // Broker
            broker_host: String::from("192.168.0.1"),
            broker_port: 1883,
            device_id: String::from("IOT_DC_Motor"),
            device_token: String::new(),

            // Timing
            pub_interval_ms: 0,           // change-only
            debounce_ms: 200,
            control_loop_interval_ms: 10, // 100 Hz
        }
    }
}
