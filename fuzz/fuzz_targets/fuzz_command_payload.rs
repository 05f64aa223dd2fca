//! Fuzz target: inbound command payloads
//!
//! Feeds arbitrary bytes through the decoder and the interpreter, then
//! through a full control tick, and asserts that nothing panics and the
//! motor output still matches the state store.
//!
//! cargo fuzz run fuzz_command_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use motornode::app::commands::interpret;
use motornode::app::events::AppEvent;
use motornode::app::ports::{ButtonPort, EventSink, InboundMessage, MotorPort, TransportPort};
use motornode::app::resolver::DriveDirective;
use motornode::app::service::MotorService;
use motornode::app::state::MotorState;
use motornode::config::NodeConfig;
use motornode::drivers::button::Level;
use motornode::error::{ActuatorError, CommsError};
use motornode::protocol::decode_command;

struct Hw(Option<DriveDirective>);

impl ButtonPort for Hw {
    fn read_level(&mut self) -> Level {
        Level::High
    }
}

impl MotorPort for Hw {
    fn drive(&mut self, directive: DriveDirective) -> Result<(), ActuatorError> {
        self.0 = Some(directive);
        Ok(())
    }

    fn all_off(&mut self) {}
}

struct Link(Option<InboundMessage>);

impl TransportPort for Link {
    fn is_connected(&self) -> bool {
        true
    }

    fn publish(&mut self, _payload: &[u8]) -> Result<(), CommsError> {
        Ok(())
    }

    fn poll_inbound(&mut self) -> Option<InboundMessage> {
        self.0.take()
    }

    fn service(&mut self) {}
}

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let _ = decode_command(data);

    let idle = MotorState::new();
    if let Some(req) = interpret(data, &idle) {
        // From an idle state only "on" can be a change.
        assert!(req.remote_on);
    }

    let Some(msg) = InboundMessage::new("iot3/fuzz/cmd/motor/fmt/json", data) else {
        return;
    };
    let mut app = MotorService::new(&NodeConfig::default());
    let mut hw = Hw(None);
    app.tick(0, &mut hw, &mut Link(Some(msg)), &mut NullSink);

    let expected = app.state().remote_on() || app.state().manual_override();
    assert_eq!(hw.0, Some(DriveDirective { forward: expected }));
});
