//! Publish scheduler.
//!
//! Decides, once per control tick, whether a status snapshot must go out.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     Trigger Sources                       │
//! │                                                           │
//! │   ┌──────────────────┐         ┌──────────────────────┐   │
//! │   │ state.dirty      │         │ now - last_publish   │   │
//! │   │ (remote / button)│         │   > interval_ms      │   │
//! │   └────────┬─────────┘         └──────────┬───────────┘   │
//! │            │  Changed                     │  Periodic     │
//! │            ▼                              ▼               │
//! │   ┌───────────────────────────────────────────────────┐   │
//! │   │       PublishScheduler::trigger (at most one)     │   │
//! │   └───────────────────────┬───────────────────────────┘   │
//! │                           ▼                               │
//! │          MotorService publishes, then on_published()      │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! `interval_ms == 0` disables the periodic path.  A node that has never
//! published counts as overdue, so periodic nodes report at boot.

use crate::app::state::MotorState;

/// Why a publish is due.  A changed state takes precedence when both hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishTrigger {
    Changed,
    Periodic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishScheduler {
    interval_ms: u32,
}

impl PublishScheduler {
    pub fn new(interval_ms: u32) -> Self {
        Self { interval_ms }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn periodic_enabled(&self) -> bool {
        self.interval_ms != 0
    }

    /// The reason a publish is due at `now_ms`, if any.
    pub fn trigger(&self, now_ms: u32, state: &MotorState) -> Option<PublishTrigger> {
        if state.is_dirty() {
            return Some(PublishTrigger::Changed);
        }
        if !self.periodic_enabled() {
            return None;
        }
        match state.last_publish_ms() {
            None => Some(PublishTrigger::Periodic),
            Some(last) if now_ms.wrapping_sub(last) > self.interval_ms => {
                Some(PublishTrigger::Periodic)
            }
            Some(_) => None,
        }
    }

    pub fn should_publish(&self, now_ms: u32, state: &MotorState) -> bool {
        self.trigger(now_ms, state).is_some()
    }

    /// Record a confirmed publish.  Restarts the periodic cadence.
    pub fn on_published(&self, now_ms: u32, state: &mut MotorState) {
        state.mark_published(now_ms);
    }
}
