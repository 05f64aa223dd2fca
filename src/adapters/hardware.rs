//! Hardware adapter: bridges the motor driver and button pin to domain ports.
//!
//! Owns the [`MotorDriver`] and the button input, exposing them through
//! [`MotorPort`] and [`ButtonPort`].  Generic over `embedded-hal` pins so
//! the same adapter runs on [`RawGpio`](crate::drivers::hw_init::RawGpio)
//! handles on target and on mocks in tests.

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::{ButtonPort, MotorPort};
use crate::app::resolver::DriveDirective;
use crate::drivers::button::Level;
use crate::drivers::motor::MotorDriver;
use crate::error::ActuatorError;

/// Concrete adapter that combines all node hardware behind port traits.
pub struct HardwareAdapter<O, I> {
    motor: MotorDriver<O>,
    button: I,
}

impl<O: OutputPin, I: InputPin> HardwareAdapter<O, I> {
    pub fn new(motor: MotorDriver<O>, button: I) -> Self {
        Self { motor, button }
    }

    pub fn motor(&self) -> &MotorDriver<O> {
        &self.motor
    }
}

// ── ButtonPort implementation ─────────────────────────────────

impl<O: OutputPin, I: InputPin> ButtonPort for HardwareAdapter<O, I> {
    fn read_level(&mut self) -> Level {
        // A failed read reports the idle level: no phantom press.
        match self.button.is_high() {
            Ok(high) => Level::from_high(high),
            Err(_) => Level::High,
        }
    }
}

// ── MotorPort implementation ──────────────────────────────────

impl<O: OutputPin, I: InputPin> MotorPort for HardwareAdapter<O, I> {
    fn drive(&mut self, directive: DriveDirective) -> Result<(), ActuatorError> {
        self.motor.apply(directive)
    }

    fn all_off(&mut self) {
        if let Err(e) = self.motor.stop() {
            warn!("all_off: {}", e);
        }
    }
}
