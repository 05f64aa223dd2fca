//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the motor node: state
//! arbitration between the broker and the manual button, actuator
//! resolution, and command interpretation.  All interaction with hardware
//! and the network happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod resolver;
pub mod service;
pub mod state;
