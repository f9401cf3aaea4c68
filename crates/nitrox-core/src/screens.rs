//! Declarative screen content for each UI state.
//!
//! A screen is just text: an ordered set of display lines plus one label
//! per physical button slot (empty label = inactive button). Builders here
//! are pure; putting pixels on glass is the renderer's problem.

use core::fmt::Write;

use heapless::{String, Vec};

use crate::error::UiError;
use crate::gas::{GasReading, Telemetry};
use crate::history::{HistoryCursor, HistoryLog};

/// Physical button slots on the device. Exactly this many labels per screen.
pub const BUTTON_SLOTS: usize = 3;

/// Most lines any screen produces (history header + page of 5, with slack).
pub const MAX_LINES: usize = 8;

pub type Line = String<24>;
pub type Label = String<12>;

/// Everything the renderer needs for one full-screen redraw. Produced
/// fresh on every state entry or scroll, never retained.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenContent {
    pub lines: Vec<Line, MAX_LINES>,
    pub button_labels: [Label; BUTTON_SLOTS],
}

impl ScreenContent {
    /// Assemble content from prepared lines and a label set.
    ///
    /// A label set that is not exactly [`BUTTON_SLOTS`] wide is a
    /// malformed request: padding or truncating would re-map physical
    /// buttons, so the screen is refused instead.
    pub fn assemble(lines: Vec<Line, MAX_LINES>, labels: &[&str]) -> Result<Self, UiError> {
        if labels.len() != BUTTON_SLOTS {
            return Err(UiError::MalformedScreenRequest(labels.len()));
        }
        let mut button_labels = [Label::new(), Label::new(), Label::new()];
        for (slot, label) in button_labels.iter_mut().zip(labels) {
            slot.push_str(label).map_err(|_| UiError::LineOverflow)?;
        }
        Ok(Self {
            lines,
            button_labels,
        })
    }

    /// Convenience for fixed-text screens.
    pub fn from_static(lines: &[&str], labels: &[&str]) -> Result<Self, UiError> {
        let mut owned: Vec<Line, MAX_LINES> = Vec::new();
        for text in lines {
            owned
                .push(make_line(text)?)
                .map_err(|_| UiError::LineOverflow)?;
        }
        Self::assemble(owned, labels)
    }
}

fn make_line(text: &str) -> Result<Line, UiError> {
    let mut line = Line::new();
    line.push_str(text).map_err(|_| UiError::LineOverflow)?;
    Ok(line)
}

/// Sleep screen: only the wake button does anything.
pub fn sleeping() -> Result<ScreenContent, UiError> {
    ScreenContent::from_static(&["SLEEPING", "zzzzzzzzzz"], &["wake", "", ""])
}

/// Analysis screen: the measurement, MOD at both ppO2 limits, and the
/// display-only voltages. The trailing marker line flags the reading as
/// synthetic placeholder data and must stay until a real cell is wired in.
pub fn analysing(reading: GasReading, telemetry: Telemetry) -> Result<ScreenContent, UiError> {
    let mut lines: Vec<Line, MAX_LINES> = Vec::new();
    let mut push = |line: Line| lines.push(line).map_err(|_| UiError::LineOverflow);

    push(fmt_line(format_args!("O2: {:.1}%", reading.o2_percent()))?)?;
    push(fmt_line(format_args!(
        "MOD 1.4: {}m",
        reading.max_operating_depth(1.4)
    ))?)?;
    push(fmt_line(format_args!(
        "MOD 1.6: {}m",
        reading.max_operating_depth(1.6)
    ))?)?;
    push(fmt_line(format_args!(
        "Battery: {:.1}V",
        telemetry.battery_volts
    ))?)?;
    push(fmt_line(format_args!(
        "Sensor: {:.2}V",
        telemetry.sensor_volts
    ))?)?;
    push(make_line("FAKE!!!!")?)?;

    ScreenContent::assemble(lines, &["Cali", "Hist", "Zzzz"])
}

/// Calibration screen: every button is inert while the sensor settles.
pub fn calibrating() -> Result<ScreenContent, UiError> {
    ScreenContent::from_static(&["CALIBRATING", "Please wait"], &["", "", ""])
}

/// History screen: header plus the page under the cursor. Scroll labels
/// appear only when that direction can actually move.
pub fn viewing_history(
    log: &HistoryLog,
    cursor: HistoryCursor,
    page_size: usize,
) -> Result<ScreenContent, UiError> {
    let mut lines: Vec<Line, MAX_LINES> = Vec::new();
    lines
        .push(make_line("Num  O2%  MOD")?)
        .map_err(|_| UiError::LineOverflow)?;

    for entry in log.page(cursor.offset(), page_size) {
        let line = fmt_line(format_args!(
            "{:>3}  {:.1}%  {:>3}m",
            entry.sequence, entry.o2_percent, entry.mod_1_6_m
        ))?;
        lines.push(line).map_err(|_| UiError::LineOverflow)?;
    }

    let up = if cursor.can_scroll_up() { "up" } else { "" };
    let down = if cursor.can_scroll_down(log.len(), page_size) {
        "dn"
    } else {
        ""
    };
    ScreenContent::assemble(lines, &[up, "bk", down])
}

fn fmt_line(args: core::fmt::Arguments<'_>) -> Result<Line, UiError> {
    let mut line = Line::new();
    line.write_fmt(args).map_err(|_| UiError::LineOverflow)?;
    Ok(line)
}
