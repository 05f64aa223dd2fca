//! Actuator resolver: state store contents → motor directive.

use super::state::MotorState;

/// What the motor outputs should be doing this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveDirective {
    pub forward: bool,
}

impl DriveDirective {
    pub const STOP: Self = Self { forward: false };
}

/// Manual override wins; otherwise follow the broker.
pub fn resolve(state: &MotorState) -> DriveDirective {
    DriveDirective {
        forward: state.manual_override() || state.remote_on(),
    }
}
