//! Gas readings and maximum operating depth (MOD) math.
//!
//! The MOD of a mixture is the deepest depth at which its oxygen partial
//! pressure stays at or below a chosen limit. Recreational limits are
//! ppO2 1.4 bar (working) and 1.6 bar (contingency); the analyzer shows
//! both side by side.

use heapless::Vec;

use crate::error::UiError;
use crate::history::{HISTORY_CAPACITY, HistoryEntry};

/// A single validated oxygen measurement, in percent of one atmosphere.
///
/// Construction enforces the open interval (0, 100): a zero or negative
/// fraction has no defined MOD, and a sensor cannot report a mixture that
/// is more than pure oxygen. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasReading {
    o2_percent: f32,
}

impl GasReading {
    pub fn new(o2_percent: f32) -> Result<Self, UiError> {
        if !o2_percent.is_finite() || o2_percent <= 0.0 || o2_percent >= 100.0 {
            return Err(UiError::InvalidGasReading(o2_percent));
        }
        Ok(Self { o2_percent })
    }

    pub fn o2_percent(self) -> f32 {
        self.o2_percent
    }

    /// MOD in whole meters at the given ppO2 limit.
    ///
    /// Infallible: the constructor already guaranteed a usable fraction.
    pub fn max_operating_depth(self, ppo2_max: f32) -> i32 {
        ceil_meters(mod_exact(self.o2_percent, ppo2_max))
    }
}

/// Display-only voltages shown on the analysis screen. Neither value feeds
/// any computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telemetry {
    pub battery_volts: f32,
    pub sensor_volts: f32,
}

/// Un-rounded MOD in meters: `10 * (ppo2_max / fraction - 1)`.
///
/// Negative and extreme results are returned as-is; what to do with a MOD
/// of -2m for pure O2 at ppO2 0.5 is the caller's display problem.
pub fn mod_exact(o2_percent: f32, ppo2_max: f32) -> f32 {
    let fraction = o2_percent / 100.0;
    10.0 * (ppo2_max / fraction - 1.0)
}

/// Checked MOD in whole meters (ceiling of [`mod_exact`]).
///
/// Rejects a zero, negative, or non-finite oxygen percentage before the
/// division. This is the entry point for unvalidated values; prefer
/// [`GasReading::max_operating_depth`] once a reading exists.
pub fn compute_mod(o2_percent: f32, ppo2_max: f32) -> Result<i32, UiError> {
    if !o2_percent.is_finite() || o2_percent <= 0.0 {
        return Err(UiError::InvalidGasReading(o2_percent));
    }
    Ok(ceil_meters(mod_exact(o2_percent, ppo2_max)))
}

fn ceil_meters(meters: f32) -> i32 {
    libm::ceilf(meters) as i32
}

/// Capability seam through which readings, telemetry, and seed history
/// enter the core.
///
/// The shipped simulator implements this with a seeded PRNG; firmware would
/// implement it over a galvanic O2 cell and its persisted log; tests use
/// deterministic fakes. The control logic never touches a random number
/// generator directly.
pub trait GasSource {
    /// Take one fresh measurement.
    fn produce_reading(&mut self) -> GasReading;

    /// Sample the display-only voltages.
    fn sample_telemetry(&mut self) -> Telemetry;

    /// Produce `count` past readings, newest-first, sequence numbers
    /// running from `count` down to 1.
    fn fetch_history(&mut self, count: usize) -> Vec<HistoryEntry, HISTORY_CAPACITY>;
}
