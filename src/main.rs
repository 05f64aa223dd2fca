//! MotorNode firmware entry point.
//!
//! Hexagonal architecture with a fixed-period control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   Esp32Time       │
//! │  (Motor+Button)    (EventSink)    (Config)     (clock)         │
//! │  WifiAdapter       MqttTransport                               │
//! │  (Connectivity)    (TransportPort)                             │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              MotorService (pure logic)                 │    │
//! │  │  Debounce · Commands · State · Resolver · Scheduler    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Result;
use log::{info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::wifi::EspWifi;

use motornode::adapters::hardware::HardwareAdapter;
use motornode::adapters::log_sink::LogEventSink;
use motornode::adapters::mqtt::MqttTransport;
use motornode::adapters::nvs::NvsAdapter;
use motornode::adapters::time::Esp32TimeAdapter;
use motornode::adapters::wifi::{ConnectivityPort, WifiAdapter};
use motornode::app::ports::TransportPort;
use motornode::app::service::MotorService;
use motornode::drivers::hw_init::{self, RawGpio};
use motornode::drivers::motor::MotorDriver;
use motornode::drivers::watchdog::Watchdog;
use motornode::error::Error;
use motornode::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("MotorNode v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Safe boot: motor enable LOW before anything else ───
    hw_init::init_peripherals().map_err(Error::from)?;
    let time = Esp32TimeAdapter::new();

    // ── 3. Configuration ──────────────────────────────────────
    let nvs = NvsAdapter::new().map_err(|_| Error::Config("NVS unavailable"))?;
    let config = nvs.load_or_default();
    info!(
        "Config: device_id={} broker={} pub_interval={}ms debounce={}ms loop={}ms",
        config.device_id,
        config.broker_url(),
        config.pub_interval_ms,
        config.debounce_ms,
        config.control_loop_interval_ms
    );

    // ── 4. Network ────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let mut wifi = WifiAdapter::new(EspWifi::new(peripherals.modem, sysloop, None)?);

    match wifi.set_credentials(&config.wifi_ssid, &config.wifi_password) {
        Ok(()) => {
            // Only requests association; `poll` in the loop completes it
            // or falls back to the backoff cycle.
            if let Err(e) = wifi.connect(time.now_ms()) {
                warn!("WiFi: initial connect failed ({}), will retry", e);
            }
        }
        Err(e) => warn!("WiFi: {}, running offline", e),
    }

    let mut transport = MqttTransport::connect(&config)?;
    info!(
        "MQTT: status on '{}', commands on '{}'",
        transport.status_topic(),
        transport.command_topic()
    );

    // ── 5. Hardware + app service ─────────────────────────────
    let motor = MotorDriver::new(
        RawGpio(pins::MOTOR_IN1_GPIO),
        RawGpio(pins::MOTOR_IN2_GPIO),
        RawGpio(pins::MOTOR_ENA_GPIO),
    )
    .map_err(Error::from)?;
    let mut hw = HardwareAdapter::new(motor, RawGpio(pins::BUTTON_GPIO));
    let mut sink = LogEventSink::new();

    let mut app = MotorService::new(&config);
    app.start(&mut sink);

    // Subscribed just before the loop, the only place that feeds it.
    let watchdog = Watchdog::default();

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        let now_ms = time.now_ms();

        app.tick(now_ms, &mut hw, &mut transport, &mut sink);

        transport.service();
        wifi.poll(now_ms);

        watchdog.feed();

        FreeRtos::delay_ms(config.control_loop_interval_ms);
    }
}
