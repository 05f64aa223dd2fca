//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::protocol::Switch;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn on_off(b: bool) -> &'static str {
    if Switch::from(b).is_on() { "on" } else { "off" }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(s) => {
                info!(
                    "START | relay={} manual_override={}",
                    on_off(s.remote_on),
                    on_off(s.manual_override)
                );
            }
            AppEvent::StateChanged { source, snapshot } => {
                info!(
                    "STATE | {:?} | relay={} manual_override={} | motor={}",
                    source,
                    on_off(snapshot.remote_on),
                    on_off(snapshot.manual_override),
                    on_off(snapshot.effective_on()),
                );
            }
            AppEvent::Published { trigger, snapshot } => {
                info!(
                    "PUB   | {:?} | relay={} manual_override={}",
                    trigger,
                    on_off(snapshot.remote_on),
                    on_off(snapshot.manual_override),
                );
            }
            AppEvent::PublishDeferred { trigger, reason } => {
                warn!("PUB   | {:?} deferred: {}", trigger, reason);
            }
            AppEvent::ActuatorFault(e) => {
                warn!("FAULT | motor: {}", e);
            }
        }
    }
}
