//! Inbound commands to the application service.
//!
//! Two sources produce them: the broker (via [`interpret`]) and the
//! manual button.  The [`MotorService`](super::service::MotorService)
//! applies them to the state store in arrival order.

use log::debug;

use crate::protocol;

use super::state::MotorState;

/// Commands that adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Set the broker-requested motor state.
    SetRemote(bool),

    /// Flip the manual override (debounced button press).
    ToggleManual,
}

/// A broker command that would actually change the state store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChangeRequest {
    pub remote_on: bool,
}

impl From<StateChangeRequest> for AppCommand {
    fn from(req: StateChangeRequest) -> Self {
        Self::SetRemote(req.remote_on)
    }
}

/// Turn a command payload into a state change, if it asks for one.
///
/// Malformed payloads, unknown values and requests matching the current
/// `remote_on` all yield `None`.  Reads `state` only, so it can run at
/// any point in a tick.
pub fn interpret(payload: &[u8], state: &MotorState) -> Option<StateChangeRequest> {
    let intent = match protocol::decode_command(payload) {
        Ok(intent) => intent,
        Err(e) => {
            debug!("Command ignored: {}", e);
            return None;
        }
    };

    let requested = intent.motor?.is_on();
    if requested == state.remote_on() {
        debug!("Command ignored: motor already {}", if requested { "on" } else { "off" });
        return None;
    }
    Some(StateChangeRequest {
        remote_on: requested,
    })
}
