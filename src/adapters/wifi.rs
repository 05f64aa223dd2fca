//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`]: the boundary for network bring-up.
//! The broker client rides on top of this link; the control loop keeps
//! running (and the button keeps working) while it is down.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspWifi` from `esp-idf-svc`, driven
//!   without the blocking wrapper.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Connection policy
//!
//! Nothing here waits on the driver.  [`ConnectivityPort::connect`] only
//! starts an association; [`ConnectivityPort::poll`] watches for the
//! interface to come up and abandons the attempt after
//! [`CONNECT_TIMEOUT_MS`].  A failed attempt or a lost link waits an
//! exponential backoff (2 s → 4 s → 8 s … capped at 60 s) before the next
//! attempt.

use core::fmt;
use log::{info, warn};

use super::utils::is_printable_ascii;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
    AlreadyConnected,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
            Self::AlreadyConnected => write!(f, "already connected to AP"),
        }
    }
}

pub trait ConnectivityPort {
    /// Start associating with the configured AP.  Returns as soon as the
    /// driver has accepted the request; completion is observed by `poll`.
    fn connect(&mut self, now_ms: u32) -> Result<(), ConnectivityError>;
    fn is_connected(&self) -> bool;
    /// Drive the connection state machine.  `now_ms` is the loop's
    /// monotonic clock.  Never blocks.
    fn poll(&mut self, now_ms: u32);
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError>;
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    /// Association requested at `since_ms`.  `attempt` is 0 for the
    /// first connect and counts retries after that.
    Connecting { attempt: u32, since_ms: u32 },
    Connected,
    Reconnecting { attempt: u32, since_ms: u32 },
}

const INITIAL_BACKOFF_SECS: u32 = 2;
const MAX_BACKOFF_SECS: u32 = 60;

/// How long an association may stay pending before it is abandoned.
pub const CONNECT_TIMEOUT_MS: u32 = 10_000;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    backoff_secs: u32,
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    /// Simulation: whether the access point answers.
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
    /// Simulation: associations requested from the "driver".
    #[cfg(not(target_os = "espidf"))]
    sim_attempts: u32,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: EspWifi<'static>) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            backoff_secs: INITIAL_BACKOFF_SECS,
            wifi,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            backoff_secs: INITIAL_BACKOFF_SECS,
            sim_link_up: true,
            sim_attempts: 0,
        }
    }

    /// Simulation: make the access point reachable or not.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_link(&mut self, up: bool) {
        self.sim_link_up = up;
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_attempts(&self) -> u32 {
        self.sim_attempts
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn backoff_secs(&self) -> u32 {
        self.backoff_secs
    }

    fn start_attempt(&mut self, attempt: u32, now_ms: u32) -> Result<(), ConnectivityError> {
        self.state = WifiState::Connecting {
            attempt,
            since_ms: now_ms,
        };
        let result = self.platform_begin_connect();
        if result.is_err() {
            self.attempt_failed(attempt, now_ms);
        }
        result
    }

    fn attempt_failed(&mut self, attempt: u32, now_ms: u32) {
        if attempt > 0 {
            self.backoff_secs = (self.backoff_secs * 2).min(MAX_BACKOFF_SECS);
        }
        self.state = WifiState::Reconnecting {
            attempt,
            since_ms: now_ms,
        };
    }

    // ── Platform-specific ─────────────────────────────────────

    /// Hand the credentials to the driver and request association.
    /// `EspWifi::start`/`connect` only post to the WiFi task.
    #[cfg(target_os = "espidf")]
    fn platform_begin_connect(&mut self) -> Result<(), ConnectivityError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let client = ClientConfiguration {
            ssid: self.ssid.as_str().try_into().map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        };

        let result = self
            .wifi
            .set_configuration(&Configuration::Client(client))
            .and_then(|()| {
                if !self.wifi.is_started()? {
                    self.wifi.start()?;
                }
                self.wifi.connect()
            });

        result.map_err(|e| {
            warn!("WiFi(espidf): connect request rejected: {}", e);
            ConnectivityError::ConnectionFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin_connect(&mut self) -> Result<(), ConnectivityError> {
        self.sim_attempts += 1;
        Ok(())
    }

    /// Abort a pending association so the next attempt starts clean.
    #[cfg(target_os = "espidf")]
    fn platform_abort(&mut self) {
        if let Err(e) = self.wifi.disconnect() {
            warn!("WiFi(espidf): abort failed: {}", e);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_abort(&mut self) {}

    /// Associated and the station interface has an address.
    #[cfg(target_os = "espidf")]
    fn platform_link_up(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false) && self.wifi.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_link_up(&self) -> bool {
        self.sim_link_up
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self, now_ms: u32) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        if self.state == WifiState::Connected {
            return Err(ConnectivityError::AlreadyConnected);
        }

        info!("WiFi: connecting to '{}'", self.ssid);
        self.start_attempt(0, now_ms)
    }

    fn is_connected(&self) -> bool {
        self.state == WifiState::Connected && self.platform_link_up()
    }

    fn poll(&mut self, now_ms: u32) {
        match self.state {
            WifiState::Connecting { attempt, since_ms } => {
                if self.platform_link_up() {
                    self.state = WifiState::Connected;
                    self.backoff_secs = INITIAL_BACKOFF_SECS;
                    info!("WiFi: connected");
                } else if now_ms.wrapping_sub(since_ms) >= CONNECT_TIMEOUT_MS {
                    warn!("WiFi: no link after {}ms, giving up on attempt {}", CONNECT_TIMEOUT_MS, attempt);
                    self.platform_abort();
                    self.attempt_failed(attempt, now_ms);
                }
            }
            WifiState::Reconnecting { attempt, since_ms } => {
                if now_ms.wrapping_sub(since_ms) < self.backoff_secs * 1000 {
                    return;
                }
                info!("WiFi: reconnect attempt {} (backoff {}s)", attempt + 1, self.backoff_secs);
                // A rejected request has already rescheduled itself.
                let _ = self.start_attempt(attempt + 1, now_ms);
            }
            WifiState::Connected => {
                if !self.platform_link_up() {
                    warn!("WiFi: connection lost, entering reconnect");
                    self.state = WifiState::Reconnecting {
                        attempt: 0,
                        since_ms: now_ms,
                    };
                }
            }
            WifiState::Disconnected => {}
        }
    }

    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|()| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password
            .push_str(password)
            .map_err(|()| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
