//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] for the node.  The whole [`NodeConfig`] is
//! stored as one `postcard` blob under `motornode/nodecfg`.
//!
//! - Validation: every field is range-checked before persistence and
//!   again when a stored blob is read back.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//! - Missing, unreadable or out-of-range blobs load as
//!   [`NodeConfig::default()`].

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::NodeConfig;
use log::info;

use super::utils::is_printable_ascii;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::warn;

const CONFIG_NAMESPACE: &str = "motornode";
#[cfg(not(target_os = "espidf"))]
const CONFIG_KEY: &str = "nodecfg";
#[cfg(target_os = "espidf")]
const CONFIG_KEY_CSTR: &[u8] = b"nodecfg\0";

#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 1024;

/// Longest device id that still fits the inbound topic buffer.
pub const MAX_DEVICE_ID_LEN: usize = 32;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
                || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t
            {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    /// Load the stored config, falling back to defaults on any error.
    pub fn load_or_default(&self) -> NodeConfig {
        match self.load() {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("NvsAdapter: {}, using defaults", e);
                NodeConfig::default()
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key() -> String {
        format!("{}::{}", CONFIG_NAMESPACE, CONFIG_KEY)
    }

    /// Simulation: overwrite the stored blob without validation.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_write_raw(&self, bytes: &[u8]) {
        self.store.borrow_mut().insert(Self::composite_key(), bytes.to_vec());
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = namespace.as_bytes();
        let len = ns_bytes.len().min(15);
        ns_buf[..len].copy_from_slice(&ns_bytes[..len]);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        // SAFETY: ns_buf is NUL-terminated and outlives the call.
        let ret = unsafe { nvs_open(ns_buf.as_ptr().cast(), mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        // SAFETY: handle was opened above and is not used afterwards.
        unsafe {
            nvs_close(handle);
        }
        result
    }
}

pub fn validate_config(cfg: &NodeConfig) -> Result<(), ConfigError> {
    if !is_printable_ascii(&cfg.wifi_ssid) || cfg.wifi_ssid.len() > 32 {
        return Err(ConfigError::ValidationFailed(
            "wifi_ssid must be at most 32 printable ASCII bytes",
        ));
    }
    if !cfg.wifi_password.is_empty() && !(8..=64).contains(&cfg.wifi_password.len()) {
        return Err(ConfigError::ValidationFailed(
            "wifi_password must be empty or 8-64 bytes",
        ));
    }
    if cfg.broker_host.is_empty() || !is_printable_ascii(&cfg.broker_host) {
        return Err(ConfigError::ValidationFailed(
            "broker_host must be non-empty printable ASCII",
        ));
    }
    if cfg.broker_port == 0 {
        return Err(ConfigError::ValidationFailed("broker_port must be non-zero"));
    }
    // Topic names are built from the device id; '+', '#' and '/' would
    // change their meaning.
    if cfg.device_id.is_empty()
        || cfg.device_id.len() > MAX_DEVICE_ID_LEN
        || !is_printable_ascii(&cfg.device_id)
        || cfg.device_id.contains(['+', '#', '/'])
    {
        return Err(ConfigError::ValidationFailed(
            "device_id must be 1-32 printable ASCII bytes without '+', '#' or '/'",
        ));
    }
    if cfg.pub_interval_ms != 0 && !(100..=86_400_000).contains(&cfg.pub_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "pub_interval_ms must be 0 or 100-86400000",
        ));
    }
    if !(10..=2000).contains(&cfg.debounce_ms) {
        return Err(ConfigError::ValidationFailed("debounce_ms must be 10-2000"));
    }
    if !(1..=1000).contains(&cfg.control_loop_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "control_loop_interval_ms must be 1-1000",
        ));
    }
    if cfg.control_loop_interval_ms >= cfg.debounce_ms {
        return Err(ConfigError::ValidationFailed(
            "control_loop_interval_ms must be < debounce_ms",
        ));
    }
    Ok(())
}

/// Decode a stored blob and reject values the firmware cannot run with.
fn decode_stored(bytes: &[u8]) -> Result<NodeConfig, ConfigError> {
    let cfg: NodeConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
    validate_config(&cfg)?;
    Ok(cfg)
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<NodeConfig, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            if let Some(bytes) = self.store.borrow().get(&Self::composite_key()) {
                let cfg = decode_stored(bytes)?;
                info!("NvsAdapter: loaded config from store");
                Ok(cfg)
            } else {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(NodeConfig::default())
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(CONFIG_NAMESPACE, false, |handle| {
                let mut size: usize = 0;

                // First call: get size
                // SAFETY: key is NUL-terminated; a null buffer queries the length.
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        CONFIG_KEY_CSTR.as_ptr().cast(),
                        core::ptr::null_mut(),
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                if size == 0 || size > MAX_BLOB_SIZE {
                    return Err(ESP_ERR_NVS_INVALID_LENGTH as esp_err_t);
                }

                let mut buf = vec![0u8; size];
                // SAFETY: buf holds exactly `size` bytes.
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        CONFIG_KEY_CSTR.as_ptr().cast(),
                        buf.as_mut_ptr().cast(),
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(buf)
            });

            match result {
                Ok(bytes) => {
                    let cfg = decode_stored(&bytes)?;
                    info!("NvsAdapter: loaded config from NVS ({} bytes)", bytes.len());
                    Ok(cfg)
                }
                // A fresh device has neither the namespace nor the key.
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND as esp_err_t => {
                    info!("NvsAdapter: no stored config, using defaults");
                    Ok(NodeConfig::default())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS read error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }

    fn save(&self, config: &NodeConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;

        #[cfg(not(target_os = "espidf"))]
        {
            self.store.borrow_mut().insert(Self::composite_key(), bytes);
            info!("NvsAdapter: config saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(CONFIG_NAMESPACE, true, |handle| {
                // SAFETY: key is NUL-terminated; bytes outlives the call.
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        CONFIG_KEY_CSTR.as_ptr().cast(),
                        bytes.as_ptr().cast(),
                        bytes.len(),
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                // SAFETY: handle is open for writing.
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    info!("NvsAdapter: config saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}
