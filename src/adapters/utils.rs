//! Shared utilities for adapter-layer validation.
//!
//! Used by the WiFi credential checks and by config validation.

/// Returns `true` if every byte of `s` is in the printable ASCII range
/// `0x20..=0x7E` (space through tilde, inclusive).
///
/// Applied to SSIDs, broker hosts and device ids before they reach
/// the radio or the topic names.
pub(super) fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}
