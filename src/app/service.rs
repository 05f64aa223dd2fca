//! Application service: the control loop core.
//!
//! [`MotorService`] owns the state store, the button debouncer and the
//! publish scheduler.  All I/O flows through port traits injected at call
//! sites, making the whole service testable with mock adapters.
//!
//! ```text
//!   ButtonPort ──▶ ┌─────────────────────────┐ ──▶ MotorPort
//!                  │       MotorService       │
//! TransportPort ◀─▶│ Debounce · State · Sched │ ──▶ EventSink
//!                  └─────────────────────────┘
//! ```
//!
//! Every [`tick`](MotorService::tick) runs the same fixed sequence:
//! button → inbound commands → motor outputs → publish decision.  A
//! command and a press landing in the same tick both reach that tick's
//! outputs and share a single publish.

use log::{debug, info, warn};

use crate::config::NodeConfig;
use crate::drivers::button::ButtonDebouncer;
use crate::error::CommsError;
use crate::protocol;
use crate::scheduler::{PublishScheduler, PublishTrigger};

use super::commands::{AppCommand, interpret};
use super::events::{AppEvent, ChangeSource};
use super::ports::{ButtonPort, EventSink, MotorPort, TransportPort};
use super::resolver::{DriveDirective, resolve};
use super::state::{MotorState, StateSnapshot};

// ───────────────────────────────────────────────────────────────
// MotorService
// ───────────────────────────────────────────────────────────────

pub struct MotorService {
    state: MotorState,
    button: ButtonDebouncer,
    scheduler: PublishScheduler,
    last_directive: Option<DriveDirective>,
    tick_count: u64,
    /// Set while a due publish is being held back; cleared on success.
    publish_deferred: bool,
    actuator_faulted: bool,
}

impl MotorService {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            state: MotorState::new(),
            button: ButtonDebouncer::new(config.debounce_ms),
            scheduler: PublishScheduler::new(config.pub_interval_ms),
            last_directive: None,
            tick_count: 0,
            publish_deferred: false,
            actuator_faulted: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        let snapshot = self.state.snapshot();
        sink.emit(&AppEvent::Started(snapshot));
        info!(
            "MotorService started (pub_interval={}ms, debounce={}ms)",
            self.scheduler.interval_ms(),
            self.button.debounce_ms()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle at monotonic time `now_ms`.
    ///
    /// The `hw` parameter satisfies **both** [`ButtonPort`] and
    /// [`MotorPort`], avoiding a double mutable borrow while keeping the
    /// port boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u32,
        hw: &mut (impl ButtonPort + MotorPort),
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Manual input
        let level = hw.read_level();
        if let Some(edge) = self.button.poll(now_ms, level) {
            debug!("Button press accepted at {}ms", edge.at_ms);
            self.handle_command(AppCommand::ToggleManual, sink);
        }

        // 2. Remote commands, in arrival order, until the queue is empty
        while let Some(msg) = transport.poll_inbound() {
            debug!("Inbound on '{}' ({} bytes)", msg.topic, msg.payload.len());
            self.handle_inbound(&msg.payload, sink);
        }

        // 3. Motor outputs track state every tick
        self.apply_directive(hw, sink);

        // 4. Publish decision
        self.publish_if_due(now_ms, transport, sink);
    }

    // ── Command handling ──────────────────────────────────────

    /// Interpret a raw command payload and apply it.
    /// Returns `true` if the state store changed.
    pub fn handle_inbound(&mut self, payload: &[u8], sink: &mut impl EventSink) -> bool {
        match interpret(payload, &self.state) {
            Some(request) => self.handle_command(request.into(), sink),
            None => false,
        }
    }

    /// Apply a command to the state store.
    /// Returns `true` if the state store changed.
    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) -> bool {
        let source = match cmd {
            AppCommand::SetRemote(on) => {
                if !self.state.apply_remote(on) {
                    return false;
                }
                ChangeSource::Remote
            }
            AppCommand::ToggleManual => {
                self.state.toggle_manual();
                ChangeSource::Manual
            }
        };

        let snapshot = self.state.snapshot();
        info!(
            "State: remote={} manual={} -> motor {} ({:?})",
            snapshot.remote_on,
            snapshot.manual_override,
            if snapshot.effective_on() { "ON" } else { "OFF" },
            source
        );
        sink.emit(&AppEvent::StateChanged { source, snapshot });
        true
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &MotorState {
        &self.state
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    /// Directive the resolver produces for the current state.
    pub fn directive(&self) -> DriveDirective {
        resolve(&self.state)
    }

    /// Directive most recently handed to the motor port.
    pub fn last_directive(&self) -> Option<DriveDirective> {
        self.last_directive
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn scheduler(&self) -> &PublishScheduler {
        &self.scheduler
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply_directive(&mut self, hw: &mut impl MotorPort, sink: &mut impl EventSink) {
        let directive = resolve(&self.state);
        match hw.drive(directive) {
            Ok(()) => {
                if self.actuator_faulted {
                    info!("Motor outputs recovered");
                    self.actuator_faulted = false;
                }
            }
            Err(e) => {
                // Outputs may be half-written; drop the enable line.
                hw.all_off();
                if !self.actuator_faulted {
                    warn!("Motor drive failed: {}, outputs forced off", e);
                    sink.emit(&AppEvent::ActuatorFault(e));
                    self.actuator_faulted = true;
                }
            }
        }
        self.last_directive = Some(directive);
    }

    fn publish_if_due(
        &mut self,
        now_ms: u32,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        let Some(trigger) = self.scheduler.trigger(now_ms, &self.state) else {
            return;
        };

        if !transport.is_connected() {
            self.defer_publish(trigger, CommsError::BrokerDisconnected, sink);
            return;
        }

        let snapshot = self.state.snapshot();
        let payload = match protocol::encode_status(snapshot.remote_on, snapshot.manual_override) {
            Ok(p) => p,
            Err(e) => {
                warn!("Status encode failed: {}", e);
                return;
            }
        };

        match transport.publish(&payload) {
            Ok(()) => {
                self.scheduler.on_published(now_ms, &mut self.state);
                if self.publish_deferred {
                    info!("Publish resumed");
                    self.publish_deferred = false;
                }
                debug!("Published {:?} snapshot at {}ms", trigger, now_ms);
                sink.emit(&AppEvent::Published { trigger, snapshot });
            }
            Err(e) => self.defer_publish(trigger, e, sink),
        }
    }

    fn defer_publish(&mut self, trigger: PublishTrigger, reason: CommsError, sink: &mut impl EventSink) {
        if self.publish_deferred {
            return;
        }
        warn!("Publish deferred ({:?}): {}", trigger, reason);
        self.publish_deferred = true;
        sink.emit(&AppEvent::PublishDeferred { trigger, reason });
    }
}
