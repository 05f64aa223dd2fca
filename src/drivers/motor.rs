//! DC motor driver (L293D half-H bridge, one channel).
//!
//! Two direction inputs plus one enable.  The node only ever drives the
//! fixed forward pattern; stopping drops the enable line and leaves the
//! direction lines where they are.
//!
//! ## Dual-target design
//!
//! Generic over `embedded-hal` output pins.  On ESP-IDF the pins are
//! [`RawGpio`](super::hw_init::RawGpio) handles; in tests they are
//! recording mocks.

use embedded_hal::digital::OutputPin;

use crate::app::resolver::DriveDirective;
use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Stopped,
    Forward,
}

pub struct MotorDriver<P> {
    in1: P,
    in2: P,
    enable: P,
    state: MotorState,
}

impl<P: OutputPin> MotorDriver<P> {
    /// Take ownership of the pins and force the motor off.
    pub fn new(in1: P, in2: P, enable: P) -> Result<Self, ActuatorError> {
        let mut driver = Self {
            in1,
            in2,
            enable,
            state: MotorState::Stopped,
        };
        driver.stop()?;
        Ok(driver)
    }

    /// Apply a resolved directive.
    pub fn apply(&mut self, directive: DriveDirective) -> Result<(), ActuatorError> {
        if directive.forward {
            self.forward()
        } else {
            self.stop()
        }
    }

    pub fn forward(&mut self) -> Result<(), ActuatorError> {
        self.in1
            .set_high()
            .map_err(|_| ActuatorError::DirectionWriteFailed)?;
        self.in2
            .set_low()
            .map_err(|_| ActuatorError::DirectionWriteFailed)?;
        self.enable
            .set_high()
            .map_err(|_| ActuatorError::EnableWriteFailed)?;
        self.state = MotorState::Forward;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), ActuatorError> {
        self.enable
            .set_low()
            .map_err(|_| ActuatorError::EnableWriteFailed)?;
        self.state = MotorState::Stopped;
        Ok(())
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == MotorState::Forward
    }
}
