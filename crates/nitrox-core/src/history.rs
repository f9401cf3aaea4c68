//! Bounded reading history and pagination.
//!
//! The log is a stable, append-only store: scrolling only moves a cursor
//! over it and never regenerates entries. Entries are kept newest-first
//! with strictly decreasing sequence numbers, so the history screen reads
//! top-down from the most recent measurement.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::error::UiError;
use crate::gas::GasReading;

/// Maximum entries the device retains. Recording past this drops the oldest.
pub const HISTORY_CAPACITY: usize = 64;

/// One remembered measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Monotonic measurement number; higher = newer. Never zero.
    pub sequence: u32,
    /// Oxygen percentage, stored at 1-decimal precision.
    pub o2_percent: f32,
    /// MOD at the ppO2 1.6 contingency limit, whole meters.
    pub mod_1_6_m: i32,
}

/// Append-only measurement log, newest entry first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry, HISTORY_CAPACITY>,
}

impl HistoryLog {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a log from entries already ordered newest-first (for example
    /// a decoded persisted log or a seed batch from a
    /// [`GasSource`](crate::gas::GasSource)). Entries beyond capacity are
    /// dropped from the old end.
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        let mut log = Self::new();
        for entry in entries.iter().take(HISTORY_CAPACITY) {
            // Cannot fail: bounded by the take() above.
            let _ = log.entries.push(*entry);
        }
        log
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Append a fresh measurement at the newest end, assigning the next
    /// sequence number. At capacity the oldest entry is evicted.
    pub fn record(&mut self, reading: GasReading) -> HistoryEntry {
        let sequence = self.entries.first().map_or(1, |e| e.sequence + 1);
        let entry = HistoryEntry {
            sequence,
            o2_percent: round_to_tenth(reading.o2_percent()),
            mod_1_6_m: reading.max_operating_depth(1.6),
        };
        if self.entries.is_full() {
            self.entries.pop();
        }
        // Shift everything down one slot; newest lives at index 0.
        self.entries.insert(0, entry).ok();
        entry
    }

    /// A window of up to `page_size` entries starting at `offset`.
    ///
    /// Short near the end, empty when `offset` is at or past the end —
    /// an out-of-range page is a display condition, not an error.
    pub fn page(&self, offset: usize, page_size: usize) -> &[HistoryEntry] {
        if offset >= self.entries.len() {
            return &[];
        }
        let end = (offset + page_size).min(self.entries.len());
        &self.entries[offset..end]
    }

    /// Serialize the log into `buf` (postcard wire format) for an outer
    /// persistence layer. Returns the written prefix of `buf`.
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a [u8], UiError> {
        postcard::to_slice(&self.entries, buf)
            .map(|written| &*written)
            .map_err(|_| UiError::HistoryCodec)
    }

    /// Rebuild a log from persisted bytes. Malformed input is an error,
    /// never a panic.
    pub fn decode(bytes: &[u8]) -> Result<Self, UiError> {
        let entries: Vec<HistoryEntry, HISTORY_CAPACITY> =
            postcard::from_bytes(bytes).map_err(|_| UiError::HistoryCodec)?;
        Ok(Self { entries })
    }
}

/// Upper bound for [`HistoryLog::encode`] scratch buffers.
pub const HISTORY_WIRE_MAX: usize = 16 * HISTORY_CAPACITY;

fn round_to_tenth(value: f32) -> f32 {
    libm::roundf(value * 10.0) / 10.0
}

/// Index of the first visible history entry.
///
/// Invariant: `0 <= offset <= max(0, entry_count - page_size)`. Both scroll
/// directions clamp silently at their boundary; a refused scroll leaves the
/// cursor untouched and reports `false` so no redraw is issued for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryCursor {
    offset: usize,
}

impl HistoryCursor {
    pub const fn new() -> Self {
        Self { offset: 0 }
    }

    pub fn offset(self) -> usize {
        self.offset
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }

    pub fn can_scroll_up(self) -> bool {
        self.offset > 0
    }

    pub fn can_scroll_down(self, entry_count: usize, page_size: usize) -> bool {
        self.offset + page_size < entry_count
    }

    /// Move one entry toward the newest. Returns whether the cursor moved.
    pub fn scroll_up(&mut self) -> bool {
        if self.can_scroll_up() {
            self.offset -= 1;
            true
        } else {
            false
        }
    }

    /// Move one entry toward the oldest, bounded so a full page remains
    /// visible. Returns whether the cursor moved.
    pub fn scroll_down(&mut self, entry_count: usize, page_size: usize) -> bool {
        if self.can_scroll_down(entry_count, page_size) {
            self.offset += 1;
            true
        } else {
            false
        }
    }
}
