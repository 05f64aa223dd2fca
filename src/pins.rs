//! GPIO pin assignments for the MotorNode board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Motor driver (L293D half-H bridge, channel 1)
// ---------------------------------------------------------------------------

/// Digital output: L293D IN1.  HIGH while driving forward.
pub const MOTOR_IN1_GPIO: i32 = 22;
/// Digital output: L293D IN2.  LOW while driving forward.
pub const MOTOR_IN2_GPIO: i32 = 23;
/// Digital output: L293D ENA.  HIGH = driving, LOW = coasting.
pub const MOTOR_ENA_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// User button (active-low with internal pull-up)
// ---------------------------------------------------------------------------

/// Momentary push-button for the manual override.
pub const BUTTON_GPIO: i32 = 4;
