//! Outbound application events.
//!
//! The [`MotorService`](super::service::MotorService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::error::{ActuatorError, CommsError};
use crate::scheduler::PublishTrigger;

use super::state::StateSnapshot;

/// Which input changed the state store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    Remote,
    Manual,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries initial state).
    Started(StateSnapshot),

    /// Remote or manual input changed the state store.
    StateChanged {
        source: ChangeSource,
        snapshot: StateSnapshot,
    },

    /// A status snapshot reached the transport.
    Published {
        trigger: PublishTrigger,
        snapshot: StateSnapshot,
    },

    /// A due publish could not be delivered; it stays pending.
    /// Emitted once per outage, not once per tick.
    PublishDeferred {
        trigger: PublishTrigger,
        reason: CommsError,
    },

    /// Driving the motor outputs failed.
    ActuatorFault(ActuatorError),
}
