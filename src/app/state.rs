//! State store: the single source of truth for the node.
//!
//! Two inputs feed it (the broker and the button); one flag tracks
//! whether the reported state is stale.  Only [`MotorState::mark_published`]
//! ever clears that flag.

/// Arbitration state, derived from the two input booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arbitration {
    Off,
    RemoteOn,
    ManualOn,
    Both,
}

/// Point-in-time copy of the reported fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSnapshot {
    pub remote_on: bool,
    pub manual_override: bool,
}

impl StateSnapshot {
    pub fn effective_on(&self) -> bool {
        self.manual_override || self.remote_on
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MotorState {
    remote_on: bool,
    manual_override: bool,
    dirty: bool,
    /// `None` until the first successful publish.
    last_publish_ms: Option<u32>,
}

impl MotorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the broker's requested state.  Returns `true` if it changed.
    pub fn apply_remote(&mut self, on: bool) -> bool {
        if self.remote_on == on {
            return false;
        }
        self.remote_on = on;
        self.dirty = true;
        true
    }

    /// Flip the manual override.  Always a reportable change.
    pub fn toggle_manual(&mut self) {
        self.manual_override = !self.manual_override;
        self.dirty = true;
    }

    /// Clear the pending-publish flag after a confirmed publish.
    pub fn mark_published(&mut self, now_ms: u32) {
        self.dirty = false;
        self.last_publish_ms = Some(now_ms);
    }

    pub fn remote_on(&self) -> bool {
        self.remote_on
    }

    pub fn manual_override(&self) -> bool {
        self.manual_override
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn last_publish_ms(&self) -> Option<u32> {
        self.last_publish_ms
    }

    pub fn effective_on(&self) -> bool {
        self.manual_override || self.remote_on
    }

    pub fn arbitration(&self) -> Arbitration {
        match (self.remote_on, self.manual_override) {
            (false, false) => Arbitration::Off,
            (true, false) => Arbitration::RemoteOn,
            (false, true) => Arbitration::ManualOn,
            (true, true) => Arbitration::Both,
        }
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            remote_on: self.remote_on,
            manual_override: self.manual_override,
        }
    }
}
