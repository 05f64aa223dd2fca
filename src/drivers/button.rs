//! Polled, timestamp-debounced button reader.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up.  Idle level is HIGH; a press
//! pulls the line LOW.  The main loop samples the raw level once per tick
//! and feeds it to [`ButtonDebouncer::poll`] together with the current
//! monotonic time.
//!
//! ## Edge policy
//!
//! | Transition | Outside lockout | Inside lockout |
//! |------------|-----------------|----------------|
//! | HIGH → LOW | `ToggleEvent`   | ignored        |
//! | LOW → HIGH | ignored         | ignored        |
//! | unchanged  | ignored         | ignored        |
//!
//! The lockout starts at every emitted event and lasts `debounce_ms`.
//! It is a timestamp comparison, never a sleep, so the control loop keeps
//! servicing the broker and the motor outputs while contacts settle.

/// Raw electrical level of a digital input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    High,
    Low,
}

impl Level {
    pub fn from_high(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

/// A debounced press: the manual override should flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleEvent {
    /// Timestamp of the accepted edge.
    pub at_ms: u32,
}

pub const DEFAULT_DEBOUNCE_MS: u32 = 200;

pub struct ButtonDebouncer {
    debounce_ms: u32,
    previous: Level,
    last_edge_ms: Option<u32>,
}

impl ButtonDebouncer {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            debounce_ms,
            previous: Level::High,
            last_edge_ms: None,
        }
    }

    pub fn debounce_ms(&self) -> u32 {
        self.debounce_ms
    }

    /// Feed one raw sample.  Returns an event on an accepted press edge.
    pub fn poll(&mut self, now_ms: u32, level: Level) -> Option<ToggleEvent> {
        let previous = core::mem::replace(&mut self.previous, level);
        if previous != Level::High || level != Level::Low {
            return None;
        }

        if let Some(last) = self.last_edge_ms {
            if now_ms.wrapping_sub(last) < self.debounce_ms {
                return None;
            }
        }

        self.last_edge_ms = Some(now_ms);
        Some(ToggleEvent { at_ms: now_ms })
    }

    /// Whether an edge at `now_ms` would currently be suppressed.
    pub fn in_lockout(&self, now_ms: u32) -> bool {
        self.last_edge_ms
            .is_some_and(|last| now_ms.wrapping_sub(last) < self.debounce_ms)
    }
}

impl Default for ButtonDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}
