//! Integration tests for the button → commands → motor → publish pipeline.
//!
//! Drives [`MotorService`] tick by tick against the recording mocks and
//! checks what reaches the motor outputs and the broker.

use super::mock_hw::{MockHardware, MockNvs, MockTransport, RecordingSink};

use motornode::app::events::{AppEvent, ChangeSource};
use motornode::app::ports::ConfigPort;
use motornode::app::resolver::DriveDirective;
use motornode::app::service::MotorService;
use motornode::config::NodeConfig;
use motornode::error::CommsError;
use motornode::protocol::Switch;
use motornode::scheduler::PublishTrigger;

const ON: &[u8] = br#"{"d":{"motor":"on"}}"#;
const OFF: &[u8] = br#"{"d":{"motor":"off"}}"#;

fn make_app(config: &NodeConfig) -> (MotorService, MockHardware, MockTransport, RecordingSink) {
    let mut app = MotorService::new(config);
    let mut sink = RecordingSink::new();
    app.start(&mut sink);
    (app, MockHardware::new(), MockTransport::connected(), sink)
}

fn periodic(interval_ms: u32) -> NodeConfig {
    NodeConfig {
        pub_interval_ms: interval_ms,
        ..Default::default()
    }
}

// ── Reference scenarios ───────────────────────────────────────

#[test]
fn remote_on_publishes_status_and_runs_motor() {
    let (mut app, mut hw, mut link, mut sink) = make_app(&NodeConfig::default());

    link.deliver(ON);
    app.tick(10, &mut hw, &mut link, &mut sink);

    assert!(app.state().remote_on());
    assert_eq!(hw.drives.last(), Some(&DriveDirective { forward: true }));
    assert_eq!(link.published.len(), 1);
    assert_eq!(
        link.published[0].as_slice(),
        br#"{"d":{"relay":"on","manual_override":"off"}}"#
    );
    assert!(!app.state().is_dirty(), "successful publish clears dirty");
}

#[test]
fn manual_press_while_remote_on_still_publishes() {
    let (mut app, mut hw, mut link, mut sink) = make_app(&NodeConfig::default());
    link.deliver(ON);
    app.tick(0, &mut hw, &mut link, &mut sink);
    let drives_before = hw.drives.clone();

    hw.press();
    app.tick(10, &mut hw, &mut link, &mut sink);

    assert!(app.state().manual_override());
    // Effective output is unchanged: the motor was already running.
    assert_eq!(hw.drives.last(), drives_before.last());

    let statuses = link.statuses();
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[1].d.relay, Switch::On);
    assert_eq!(statuses[1].d.manual_override, Switch::On);
}

// ── Arbitration ───────────────────────────────────────────────

#[test]
fn manual_override_wins_over_remote_off() {
    let (mut app, mut hw, mut link, mut sink) = make_app(&NodeConfig::default());

    hw.press();
    app.tick(0, &mut hw, &mut link, &mut sink);
    assert!(hw.motor_running());

    link.deliver(ON);
    app.tick(10, &mut hw, &mut link, &mut sink);
    link.deliver(OFF);
    app.tick(20, &mut hw, &mut link, &mut sink);

    assert!(!app.state().remote_on());
    assert!(hw.motor_running(), "manual override keeps the motor on");

    // Second press releases the override; motor stops.
    hw.press();
    app.tick(500, &mut hw, &mut link, &mut sink);
    assert!(!hw.motor_running());
    assert_eq!(app.directive(), DriveDirective::STOP);
}

#[test]
fn motor_outputs_are_driven_every_tick() {
    let (mut app, mut hw, mut link, mut sink) = make_app(&NodeConfig::default());
    for t in 0..5 {
        app.tick(t * 10, &mut hw, &mut link, &mut sink);
    }
    assert_eq!(hw.drives.len(), 5);
    assert!(hw.drives.iter().all(|d| *d == DriveDirective::STOP));
    assert_eq!(app.tick_count(), 5);
}

// ── Idempotence ───────────────────────────────────────────────

#[test]
fn repeated_command_publishes_once() {
    let (mut app, mut hw, mut link, mut sink) = make_app(&NodeConfig::default());

    link.deliver(ON);
    app.tick(0, &mut hw, &mut link, &mut sink);
    link.deliver(ON);
    app.tick(10, &mut hw, &mut link, &mut sink);
    link.deliver(ON);
    app.tick(20, &mut hw, &mut link, &mut sink);

    assert_eq!(link.published.len(), 1);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::StateChanged { .. })),
        1
    );
}

#[test]
fn malformed_and_unknown_payloads_are_ignored() {
    let (mut app, mut hw, mut link, mut sink) = make_app(&NodeConfig::default());

    let payloads: [&[u8]; 5] = [
        b"not json",
        br#"{"d":{"motor":"maybe"}}"#,
        br#"{"d":{"speed":10}}"#,
        br#"{"motor":"on"}"#,
        b"",
    ];
    for payload in payloads {
        link.deliver(payload);
    }
    app.tick(0, &mut hw, &mut link, &mut sink);

    assert!(!app.state().remote_on());
    assert!(!app.state().is_dirty());
    assert!(link.published.is_empty());
}

// ── Inbound ordering ──────────────────────────────────────────

#[test]
fn commands_apply_in_arrival_order_within_a_tick() {
    let (mut app, mut hw, mut link, mut sink) = make_app(&NodeConfig::default());

    link.deliver(ON);
    link.deliver(OFF);
    app.tick(0, &mut hw, &mut link, &mut sink);

    assert!(!app.state().remote_on());
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::StateChanged { source: ChangeSource::Remote, .. })),
        2
    );
    // Both changes coalesce into one publish of the final state.
    let statuses = link.statuses();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].d.relay, Switch::Off);
}

#[test]
fn whole_inbound_backlog_is_applied_in_one_tick() {
    let (mut app, mut hw, mut link, mut sink) = make_app(&NodeConfig::default());

    for i in 0..11 {
        link.deliver(if i % 2 == 0 { ON } else { OFF });
    }
    app.tick(0, &mut hw, &mut link, &mut sink);

    assert!(link.inbox.is_empty());
    // Eleven alternating commands end on "on"; one publish carries it.
    assert!(hw.motor_running());
    let statuses = link.statuses();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].d.relay, Switch::On);
}

#[test]
fn command_and_press_in_same_tick_share_one_publish() {
    let (mut app, mut hw, mut link, mut sink) = make_app(&NodeConfig::default());

    link.deliver(ON);
    hw.press();
    app.tick(0, &mut hw, &mut link, &mut sink);

    let statuses = link.statuses();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].d.relay, Switch::On);
    assert_eq!(statuses[0].d.manual_override, Switch::On);
}

// ── Debounce ──────────────────────────────────────────────────

#[test]
fn bouncing_contact_toggles_once() {
    let (mut app, mut hw, mut link, mut sink) = make_app(&NodeConfig::default());

    // Press with contact bounce, sampled every 10 ms.
    hw.press();
    hw.press();
    hw.press();
    for i in 0..6 {
        app.tick(i * 10, &mut hw, &mut link, &mut sink);
    }

    assert!(app.state().manual_override());
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::StateChanged { source: ChangeSource::Manual, .. })),
        1
    );
}

#[test]
fn presses_outside_window_each_toggle() {
    let (mut app, mut hw, mut link, mut sink) = make_app(&NodeConfig::default());

    hw.press();
    app.tick(0, &mut hw, &mut link, &mut sink);
    app.tick(10, &mut hw, &mut link, &mut sink);

    hw.press();
    app.tick(250, &mut hw, &mut link, &mut sink);
    app.tick(260, &mut hw, &mut link, &mut sink);

    assert!(!app.state().manual_override());
    assert_eq!(link.published.len(), 2);
}

#[test]
fn held_button_toggles_once() {
    let (mut app, mut hw, mut link, mut sink) = make_app(&NodeConfig::default());

    hw.levels.extend([motornode::drivers::button::Level::Low; 50]);
    for i in 0..50 {
        app.tick(i * 10, &mut hw, &mut link, &mut sink);
    }
    assert!(app.state().manual_override());
    assert_eq!(link.published.len(), 1);
}

// ── Periodic publish ──────────────────────────────────────────

#[test]
fn disabled_periodic_publishes_only_on_change() {
    let (mut app, mut hw, mut link, mut sink) = make_app(&NodeConfig::default());

    for i in 0..1000 {
        app.tick(i * 10, &mut hw, &mut link, &mut sink);
    }
    assert!(link.published.is_empty());
}

#[test]
fn periodic_publish_fires_on_boot_then_strictly_after_interval() {
    let (mut app, mut hw, mut link, mut sink) = make_app(&periodic(1000));

    app.tick(0, &mut hw, &mut link, &mut sink);
    assert_eq!(link.published.len(), 1, "first tick publishes");

    app.tick(500, &mut hw, &mut link, &mut sink);
    app.tick(1000, &mut hw, &mut link, &mut sink);
    assert_eq!(link.published.len(), 1, "exactly one interval is not enough");

    app.tick(1010, &mut hw, &mut link, &mut sink);
    assert_eq!(link.published.len(), 2);

    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::Published {
            trigger: PublishTrigger::Periodic,
            ..
        }
    )));
}

#[test]
fn change_publish_restarts_periodic_cadence() {
    let (mut app, mut hw, mut link, mut sink) = make_app(&periodic(1000));

    app.tick(0, &mut hw, &mut link, &mut sink);
    link.deliver(ON);
    app.tick(600, &mut hw, &mut link, &mut sink);
    assert_eq!(link.published.len(), 2);

    // Next periodic is measured from the change publish at 600.
    app.tick(1010, &mut hw, &mut link, &mut sink);
    assert_eq!(link.published.len(), 2);
    app.tick(1610, &mut hw, &mut link, &mut sink);
    assert_eq!(link.published.len(), 3);
}

// ── Broker outages ────────────────────────────────────────────

#[test]
fn change_while_disconnected_is_published_after_reconnect() {
    let (mut app, mut hw, _, mut sink) = make_app(&NodeConfig::default());
    let mut link = MockTransport::disconnected();

    hw.press();
    app.tick(0, &mut hw, &mut link, &mut sink);
    app.tick(10, &mut hw, &mut link, &mut sink);
    app.tick(20, &mut hw, &mut link, &mut sink);

    assert!(hw.motor_running(), "button works without the broker");
    assert!(app.state().is_dirty(), "dirty survives the outage");
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::PublishDeferred {
                reason: CommsError::BrokerDisconnected,
                ..
            }
        )),
        1,
        "deferral is reported once per outage"
    );

    link.connected = true;
    app.tick(30, &mut hw, &mut link, &mut sink);

    let statuses = link.statuses();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].d.manual_override, Switch::On);
    assert!(!app.state().is_dirty());
}

#[test]
fn failed_publish_keeps_dirty_and_retries() {
    let (mut app, mut hw, mut link, mut sink) = make_app(&NodeConfig::default());
    link.fail_publish = true;

    link.deliver(ON);
    app.tick(0, &mut hw, &mut link, &mut sink);
    assert!(app.state().is_dirty());
    assert!(app.state().last_publish_ms().is_none());

    link.fail_publish = false;
    app.tick(10, &mut hw, &mut link, &mut sink);
    assert!(!app.state().is_dirty());
    assert_eq!(app.state().last_publish_ms(), Some(10));
    assert_eq!(link.published.len(), 1);
}

// ── Actuator faults ───────────────────────────────────────────

#[test]
fn actuator_fault_is_reported_once_per_episode() {
    let (mut app, mut hw, mut link, mut sink) = make_app(&NodeConfig::default());
    hw.fail_drive = true;

    for i in 0..5 {
        app.tick(i * 10, &mut hw, &mut link, &mut sink);
    }
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ActuatorFault(_))), 1);
    // Every failed drive falls back to all outputs off.
    assert_eq!(hw.all_off_calls, 5);

    hw.fail_drive = false;
    app.tick(100, &mut hw, &mut link, &mut sink);
    assert_eq!(hw.all_off_calls, 5);
    hw.fail_drive = true;
    app.tick(110, &mut hw, &mut link, &mut sink);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ActuatorFault(_))), 2);
}

// ── Configuration ─────────────────────────────────────────────

#[test]
fn stored_config_sets_publish_interval() {
    let nvs = MockNvs::new();
    assert_eq!(nvs.load().unwrap(), NodeConfig::default());

    nvs.save(&periodic(500)).unwrap();
    let config = nvs.load().unwrap();
    let (mut app, mut hw, mut link, mut sink) = make_app(&config);

    assert_eq!(app.scheduler().interval_ms(), 500);
    for t in (0..=2000).step_by(10) {
        app.tick(t, &mut hw, &mut link, &mut sink);
    }
    // Boot publish at 0, then every 510 ms on a 10 ms tick grid.
    assert_eq!(link.published.len(), 4);
}

#[test]
fn invalid_config_is_rejected_before_save() {
    let nvs = MockNvs::new();
    let bad = NodeConfig {
        debounce_ms: 0,
        ..Default::default()
    };
    assert!(nvs.save(&bad).is_err());
    assert_eq!(nvs.load().unwrap(), NodeConfig::default());
}
