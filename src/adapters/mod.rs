//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to              |
//! |------------|--------------------|--------------------------|
//! | `hardware` | MotorPort          | Motor driver GPIO        |
//! |            | ButtonPort         | Button GPIO              |
//! | `log_sink` | EventSink          | Serial log output        |
//! | `mqtt`     | TransportPort      | ESP-IDF MQTT client      |
//! | `nvs`      | ConfigPort         | NVS / in-memory store    |
//! | `time`     | (clock)            | ESP32 system timer       |
//! | `wifi`     | ConnectivityPort   | ESP-IDF WiFi STA         |

pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod nvs;
pub mod time;
pub(super) mod utils;
pub mod wifi;
