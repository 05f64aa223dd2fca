//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the node if the control loop stops iterating, so a wedged
//! broker call can never leave the motor latched in its last state.
//! The loop calls [`Watchdog::feed`] once per iteration.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

pub const DEFAULT_TIMEOUT_MS: u32 = 10_000;

pub struct Watchdog {
    timeout_ms: u32,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS)
    }
}

impl Watchdog {
    /// Configure the TWDT and subscribe the calling task.
    #[cfg(target_os = "espidf")]
    pub fn new(timeout_ms: u32) -> Self {
        // SAFETY: TWDT configuration is called once from the main task
        // before the loop starts.
        unsafe {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK {
                log::warn!("Watchdog: reconfigure returned {} (may already be configured)", ret);
            }

            let ret = esp_task_wdt_add(core::ptr::null_mut());
            let subscribed = ret == ESP_OK;
            if subscribed {
                info!("Watchdog: subscribed ({} ms timeout)", timeout_ms);
            } else {
                log::warn!("Watchdog: failed to subscribe ({})", ret);
            }

            Self {
                timeout_ms,
                subscribed,
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(timeout_ms: u32) -> Self {
        info!("Watchdog(sim): no-op ({} ms)", timeout_ms);
        Self { timeout_ms }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Feed the watchdog.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: resets the TWDT entry of the current, subscribed task.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}
