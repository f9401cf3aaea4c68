//! Behavioral configuration for the analyzer.
//!
//! Everything here is decided once at startup and passed down by value;
//! nothing in the core reads ambient/global configuration.

use serde::{Deserialize, Serialize};

/// What happens to the history cursor when the history screen is re-entered.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPolicy {
    /// Start at the newest entry every time the screen is entered.
    ResetOnEntry,
    /// Keep the offset from the previous visit.
    Preserve,
}

/// Device behavior knobs with their shipped defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DeviceConfig {
    /// History entries shown per page. Must be at least 1. Default: 5.
    pub page_size: usize,
    /// Entries requested from the gas source to seed the log when no
    /// persisted history is available. Default: 24.
    pub boot_history_depth: usize,
    /// Cursor behavior on history re-entry. Default: [`CursorPolicy::ResetOnEntry`].
    pub cursor_policy: CursorPolicy,
    /// Uninterruptible settle time after entering the calibration screen,
    /// in milliseconds. Default: 2000.
    pub calibration_dwell_ms: u32,
    /// Delay between button poll cycles, in milliseconds. The core itself
    /// never sleeps on this; the outer loop does. Default: 100.
    pub poll_interval_ms: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            page_size: 5,
            boot_history_depth: 24,
            cursor_policy: CursorPolicy::ResetOnEntry,
            calibration_dwell_ms: 2000,
            poll_interval_ms: 100,
        }
    }
}
