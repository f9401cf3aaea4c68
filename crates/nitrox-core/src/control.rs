//! The poll-cycle driver.
//!
//! [`Controller`] owns every piece of mutable UI process state — the state
//! machine (current screen + history cursor), the history log, the last
//! reading, and the configuration — and exposes one
//! [`poll_cycle`](Controller::poll_cycle) the outer loop calls per tick.
//! The loop itself stays a pure driver: sample buttons, feed events,
//! sleep, repeat.
//!
//! Rendering happens synchronously inside the cycle, exactly once per
//! accepted action: a state change redraws the new screen, a scroll
//! redraws the history page, everything else draws nothing.

use embedded_hal::delay::DelayNs;
use log::{debug, info};
use thiserror_no_std::Error;

use crate::config::DeviceConfig;
use crate::error::UiError;
use crate::gas::{GasReading, GasSource, Telemetry};
use crate::history::{HistoryCursor, HistoryLog};
use crate::input::InputPort;
use crate::render::{RenderStyle, Renderer};
use crate::screens;
use crate::state_machine::{Action, UiState, UiStateMachine};

/// Failures a poll cycle can surface. Content errors halt only the frame
/// that caused them; the controller state stays consistent.
#[derive(Error, Debug, PartialEq)]
pub enum ControlError<E> {
    #[error("screen content failed: {0}")]
    Screen(UiError),
    #[error("renderer failed")]
    Render(E),
}

impl<E> From<UiError> for ControlError<E> {
    fn from(err: UiError) -> Self {
        ControlError::Screen(err)
    }
}

/// Owns the analyzer's UI process state and drives it from button edges.
///
/// Generic over the hardware seams the way the rest of the core is tested:
/// real debouncers/display/sensor in firmware, fakes on a desktop.
pub struct Controller<I, S, R, D>
where
    I: InputPort,
    S: GasSource,
    R: Renderer,
    D: DelayNs,
{
    inputs: I,
    source: S,
    renderer: R,
    delay: D,
    machine: UiStateMachine,
    history: HistoryLog,
    reading: GasReading,
    telemetry: Telemetry,
    config: DeviceConfig,
    style: RenderStyle,
}

impl<I, S, R, D> Controller<I, S, R, D>
where
    I: InputPort,
    S: GasSource,
    R: Renderer,
    D: DelayNs,
{
    /// Assemble the controller around an already-loaded history log (decoded
    /// from persistence, or freshly fetched from the source by the caller).
    pub fn new(
        inputs: I,
        mut source: S,
        renderer: R,
        delay: D,
        history: HistoryLog,
        config: DeviceConfig,
        style: RenderStyle,
    ) -> Self {
        // Prime the displayable values so Analysing always has something
        // to show; entry into Analysing replaces them anyway.
        let reading = source.produce_reading();
        let telemetry = source.sample_telemetry();
        Self {
            inputs,
            source,
            renderer,
            delay,
            machine: UiStateMachine::new(config.cursor_policy, config.page_size),
            history,
            reading,
            telemetry,
            config,
            style,
        }
    }

    /// Draw the initial (sleep) screen. Call once before the poll loop.
    pub fn start(&mut self) -> Result<(), ControlError<R::Error>> {
        info!("UI starting in {:?}", self.machine.state());
        self.draw_current()
    }

    /// Run one poll cycle: sample all buttons (at most one edge each),
    /// feed the edges through the state machine in button order, and
    /// redraw for every accepted action.
    pub fn poll_cycle(&mut self) -> Result<(), ControlError<R::Error>> {
        for event in self.inputs.poll() {
            debug!("{:?}", event);
            let Some(action) = self.machine.on_event(event, self.history.len()) else {
                continue;
            };
            match action {
                Action::Navigate(state) => self.enter(state)?,
                Action::Refresh => self.draw_current()?,
            }
        }
        Ok(())
    }

    /// Run a state's entry effects, then draw it.
    ///
    /// Entering Calibrating blocks for the configured dwell AFTER the
    /// screen is up: the hold is the sensor settle time, and no input is
    /// sampled until it passes.
    fn enter(&mut self, state: UiState) -> Result<(), ControlError<R::Error>> {
        if state == UiState::Analysing {
            self.reading = self.source.produce_reading();
            self.telemetry = self.source.sample_telemetry();
            let entry = self.history.record(self.reading);
            debug!("recorded #{} at {:.1}%", entry.sequence, entry.o2_percent);
        }
        self.draw_current()?;
        if state == UiState::Calibrating {
            debug!("calibration dwell {}ms", self.config.calibration_dwell_ms);
            self.delay.delay_ms(self.config.calibration_dwell_ms);
        }
        Ok(())
    }

    fn draw_current(&mut self) -> Result<(), ControlError<R::Error>> {
        let content = match self.machine.state() {
            UiState::Sleeping => screens::sleeping()?,
            UiState::Analysing => screens::analysing(self.reading, self.telemetry)?,
            UiState::Calibrating => screens::calibrating()?,
            UiState::ViewingHistory => {
                screens::viewing_history(&self.history, self.machine.cursor(), self.config.page_size)?
            }
        };
        self.renderer
            .draw(&content, &self.style)
            .map_err(ControlError::Render)
    }

    pub fn state(&self) -> UiState {
        self.machine.state()
    }

    pub fn cursor(&self) -> HistoryCursor {
        self.machine.cursor()
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Borrow the renderer (simulators and tests inspect what was drawn).
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Borrow the delay provider.
    pub fn delay(&self) -> &D {
        &self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{HISTORY_CAPACITY, HistoryEntry};
    use crate::input::{ButtonEvent, ButtonId};
    use crate::screens::ScreenContent;

    struct ScriptInputs {
        events: heapless::Vec<ButtonEvent, 16>,
        next: usize,
    }

    impl ScriptInputs {
        fn of(buttons: &[ButtonId]) -> Self {
            let mut events = heapless::Vec::new();
            for b in buttons {
                let _ = events.push(ButtonEvent::Press(*b));
            }
            Self { events, next: 0 }
        }
    }

    impl InputPort for ScriptInputs {
        fn poll(&mut self) -> heapless::Vec<ButtonEvent, 3> {
            let mut out = heapless::Vec::new();
            if let Some(event) = self.events.get(self.next) {
                self.next += 1;
                let _ = out.push(*event);
            }
            out
        }
    }

    /// Readings count up from 30.0 so freshness is observable.
    struct CountingSource {
        produced: u32,
    }

    impl GasSource for CountingSource {
        fn produce_reading(&mut self) -> GasReading {
            self.produced += 1;
            GasReading::new(30.0 + self.produced as f32).unwrap()
        }

        fn sample_telemetry(&mut self) -> Telemetry {
            Telemetry {
                battery_volts: 3.8,
                sensor_volts: 2.1,
            }
        }

        fn fetch_history(&mut self, count: usize) -> heapless::Vec<HistoryEntry, HISTORY_CAPACITY> {
            let mut entries = heapless::Vec::new();
            for seq in (1..=count as u32).rev() {
                let _ = entries.push(HistoryEntry {
                    sequence: seq,
                    o2_percent: 21.0,
                    mod_1_6_m: 66,
                });
            }
            entries
        }
    }

    struct RecordingRenderer {
        frames: usize,
        last: Option<ScreenContent>,
    }

    impl Renderer for RecordingRenderer {
        type Error = core::convert::Infallible;

        fn draw(&mut self, content: &ScreenContent, _style: &RenderStyle) -> Result<(), Self::Error> {
            self.frames += 1;
            self.last = Some(content.clone());
            Ok(())
        }
    }

    struct AccumulatingDelay {
        total_ns: u64,
    }

    impl DelayNs for AccumulatingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += ns as u64;
        }
    }

    fn controller_with(
        buttons: &[ButtonId],
        history_len: usize,
    ) -> Controller<ScriptInputs, CountingSource, RecordingRenderer, AccumulatingDelay> {
        let mut source = CountingSource { produced: 0 };
        let history = HistoryLog::from_entries(&source.fetch_history(history_len));
        Controller::new(
            ScriptInputs::of(buttons),
            source,
            RecordingRenderer {
                frames: 0,
                last: None,
            },
            AccumulatingDelay { total_ns: 0 },
            history,
            DeviceConfig::default(),
            RenderStyle::default(),
        )
    }

    fn run_cycles(
        controller: &mut Controller<
            ScriptInputs,
            CountingSource,
            RecordingRenderer,
            AccumulatingDelay,
        >,
        cycles: usize,
    ) {
        for _ in 0..cycles {
            controller.poll_cycle().unwrap();
        }
    }

    #[test]
    fn test_start_draws_sleep_screen_once() {
        let mut controller = controller_with(&[], 0);
        controller.start().unwrap();
        assert_eq!(controller.renderer.frames, 1);
        assert_eq!(
            controller.renderer.last.as_ref().unwrap().lines[0].as_str(),
            "SLEEPING"
        );
    }

    #[test]
    fn test_idle_cycles_draw_nothing() {
        let mut controller = controller_with(&[], 0);
        controller.start().unwrap();
        run_cycles(&mut controller, 10);
        assert_eq!(controller.renderer.frames, 1);
    }

    #[test]
    fn test_calibration_dwell_blocks_once_then_any_button_returns() {
        // Sleep -> Analyse -> Calibrate -> (dwell) -> any button -> Analyse
        let mut controller = controller_with(
            &[ButtonId::Primary, ButtonId::Primary, ButtonId::Tertiary],
            0,
        );
        controller.start().unwrap();
        run_cycles(&mut controller, 2);
        assert_eq!(controller.state(), UiState::Calibrating);
        assert_eq!(controller.delay.total_ns, 2_000u64 * 1_000_000);

        run_cycles(&mut controller, 1);
        assert_eq!(controller.state(), UiState::Analysing);
        // Dwell ran exactly once.
        assert_eq!(controller.delay.total_ns, 2_000u64 * 1_000_000);
    }

    #[test]
    fn test_each_analyse_entry_records_a_fresh_reading() {
        // Wake, sleep, wake again: two distinct analyse entries.
        let mut controller = controller_with(
            &[ButtonId::Primary, ButtonId::Tertiary, ButtonId::Primary],
            0,
        );
        controller.start().unwrap();
        run_cycles(&mut controller, 3);

        assert_eq!(controller.history().len(), 2);
        let newest = controller.history().entries()[0];
        let older = controller.history().entries()[1];
        assert_eq!(newest.sequence, 2);
        assert!(newest.o2_percent > older.o2_percent);
    }

    #[test]
    fn test_boundary_scroll_does_not_redraw() {
        // Wake, open history (single short page), then try scrolling both ways.
        let mut controller = controller_with(
            &[
                ButtonId::Primary,
                ButtonId::Secondary,
                ButtonId::Primary,
                ButtonId::Tertiary,
            ],
            2,
        );
        controller.start().unwrap();
        run_cycles(&mut controller, 2);
        assert_eq!(controller.state(), UiState::ViewingHistory);
        let frames_after_entry = controller.renderer.frames;

        run_cycles(&mut controller, 2);
        assert_eq!(controller.renderer.frames, frames_after_entry);
        assert_eq!(controller.cursor().offset(), 0);
    }
}
