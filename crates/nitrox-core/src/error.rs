//! Application-wide error types for the analyzer core.

use thiserror_no_std::Error;

/// Errors the core control logic can surface.
///
/// Pagination past the end of the history log is deliberately NOT here: an
/// out-of-range page is a defined, recoverable condition (an empty page, see
/// [`HistoryLog::page`](crate::history::HistoryLog::page)), never an error.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum UiError {
    /// A screen was requested with a button-label set that does not match
    /// the three physical button slots. The device has exactly 3 buttons;
    /// padding or truncating a label set could leave a button with the
    /// wrong meaning, so the request fails instead.
    #[error("screen requires exactly 3 button labels, got {0}")]
    MalformedScreenRequest(usize),

    /// An oxygen percentage at or below zero (or non-finite) reached the
    /// MOD calculator. The formula divides by the oxygen fraction, so this
    /// is rejected before any arithmetic happens.
    #[error("invalid oxygen percentage: {0}")]
    InvalidGasReading(f32),

    /// A formatted screen line or button label exceeded its bounded string
    /// capacity. Surfaced rather than truncated; a clipped depth figure is
    /// worse than no frame.
    #[error("screen line exceeds display capacity")]
    LineOverflow,

    /// The history wire codec failed to encode or decode the log.
    #[error("history wire codec failed")]
    HistoryCodec,
}
