//! End-to-end tests over the simulated broker link and raw GPIO handles.
//!
//! Same wiring as `main()`, with the in-memory MQTT backend standing in
//! for the ESP-IDF client.

use super::mock_hw::RecordingSink;

use motornode::adapters::hardware::HardwareAdapter;
use motornode::adapters::mqtt::{INBOUND_DEPTH, MqttTransport};
use motornode::app::ports::TransportPort;
use motornode::app::service::MotorService;
use motornode::config::NodeConfig;
use motornode::drivers::hw_init::RawGpio;
use motornode::drivers::motor::MotorDriver;
use motornode::pins;
use motornode::protocol::{StatusMessage, Switch};

fn hardware() -> HardwareAdapter<RawGpio, RawGpio> {
    let motor = MotorDriver::new(
        RawGpio(pins::MOTOR_IN1_GPIO),
        RawGpio(pins::MOTOR_IN2_GPIO),
        RawGpio(pins::MOTOR_ENA_GPIO),
    )
    .unwrap();
    HardwareAdapter::new(motor, RawGpio(pins::BUTTON_GPIO))
}

fn last_status(transport: &MqttTransport) -> StatusMessage {
    let payload = transport.sim_published().last().expect("something was published");
    serde_json::from_slice(payload).unwrap()
}

#[test]
fn broker_command_reaches_motor_and_status_goes_back() {
    let config = NodeConfig::default();
    let mut transport = MqttTransport::simulated(&config);
    let mut hw = hardware();
    let mut sink = RecordingSink::new();
    let mut app = MotorService::new(&config);
    app.start(&mut sink);

    transport.sim_set_connected(true);
    transport.service();
    assert_eq!(transport.sim_subscriptions(), ["iot3/IOT_DC_Motor/cmd/+/fmt/+"]);

    assert!(transport.sim_deliver(br#"{"d":{"motor":"on"}}"#));
    app.tick(0, &mut hw, &mut transport, &mut sink);

    assert!(hw.motor().is_running());
    let status = last_status(&transport);
    assert_eq!(status.d.relay, Switch::On);
    assert_eq!(status.d.manual_override, Switch::Off);

    assert!(transport.sim_deliver(br#"{"d":{"motor":"off"}}"#));
    app.tick(10, &mut hw, &mut transport, &mut sink);
    assert!(!hw.motor().is_running());
    assert_eq!(last_status(&transport).d.relay, Switch::Off);
    assert_eq!(transport.sim_published().len(), 2);
}

#[test]
fn commands_queued_during_outage_apply_and_publish_after_reconnect() {
    let config = NodeConfig::default();
    let mut transport = MqttTransport::simulated(&config);
    let mut hw = hardware();
    let mut sink = RecordingSink::new();
    let mut app = MotorService::new(&config);

    // Queued but the link dropped before the loop ran.
    assert!(transport.sim_deliver(br#"{"d":{"motor":"on"}}"#));
    app.tick(0, &mut hw, &mut transport, &mut sink);

    assert!(hw.motor().is_running());
    assert!(transport.sim_published().is_empty());
    assert!(app.state().is_dirty());

    transport.sim_set_connected(true);
    transport.service();
    app.tick(10, &mut hw, &mut transport, &mut sink);

    assert_eq!(transport.sim_published().len(), 1);
    assert_eq!(last_status(&transport).d.relay, Switch::On);
}

#[test]
fn burst_beyond_queue_depth_is_dropped_not_blocked() {
    let config = NodeConfig::default();
    let mut transport = MqttTransport::simulated(&config);
    let mut hw = hardware();
    let mut sink = RecordingSink::new();
    let mut app = MotorService::new(&config);
    transport.sim_set_connected(true);

    let accepted = (0..INBOUND_DEPTH + 4)
        .filter(|i| {
            let payload: &[u8] = if i % 2 == 0 {
                br#"{"d":{"motor":"on"}}"#
            } else {
                br#"{"d":{"motor":"off"}}"#
            };
            transport.sim_deliver(payload)
        })
        .count();
    assert_eq!(accepted, INBOUND_DEPTH);

    app.tick(0, &mut hw, &mut transport, &mut sink);
    assert!(transport.poll_inbound().is_none());
    // Eight alternating commands end on "off".
    assert!(!app.state().remote_on());
    assert_eq!(transport.sim_published().len(), 1);
}
