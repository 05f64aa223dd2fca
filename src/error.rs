//! Unified error types for the MotorNode firmware.
//!
//! `Error` is what boot-time failures funnel into before `main` hands
//! them to `anyhow`.  The per-subsystem enums travel through the port
//! calls on their own.  All variants are `Copy`, so none of them
//! allocate.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Boot-time failure that stops the firmware from starting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A motor output could not be driven.
    Actuator(ActuatorError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// Setting a direction output failed.
    DirectionWriteFailed,
    /// Setting the enable output failed.
    EnableWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectionWriteFailed => write!(f, "direction GPIO write failed"),
            Self::EnableWriteFailed => write!(f, "enable GPIO write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    BrokerDisconnected,
    MqttPublishFailed,
    MqttSubscribeFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrokerDisconnected => write!(f, "broker not connected"),
            Self::MqttPublishFailed => write!(f, "MQTT publish failed"),
            Self::MqttSubscribeFailed => write!(f, "MQTT subscribe failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Protocol errors
// ---------------------------------------------------------------------------

/// Decode failures on inbound payloads.  These never reach the state
/// store: the interpreter turns them into "nothing to do".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Payload is not valid JSON or not an object.
    Malformed,
    /// Outbound snapshot could not be serialised.
    EncodeFailed,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed JSON payload"),
            Self::EncodeFailed => write!(f, "snapshot encode failed"),
        }
    }
}
