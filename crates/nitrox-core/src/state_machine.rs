//! The UI state machine.
//!
//! Four screens, three buttons, and a press means something different on
//! every screen:
//!
//! | State          | Primary          | Secondary        | Tertiary          |
//! |----------------|------------------|------------------|-------------------|
//! | Sleeping       | wake → Analysing | —                | —                 |
//! | Analysing      | → Calibrating    | → ViewingHistory | → Sleeping        |
//! | Calibrating    | → Analysing      | → Analysing      | → Analysing       |
//! | ViewingHistory | scroll up (stay) | back → Analysing | scroll down (stay)|
//!
//! Unlisted presses are no-ops. The machine owns the current state and the
//! history cursor; it never builds or draws content itself. Instead each
//! accepted event yields an [`Action`] telling the driver what to redraw,
//! which keeps "content is stale" explicit even for scrolls where the state
//! identity does not change.

use log::debug;

use crate::config::CursorPolicy;
use crate::history::HistoryCursor;
use crate::input::{ButtonEvent, ButtonId};

/// Which screen is active. Exactly one at a time; the machine starts
/// asleep and runs until power-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    Sleeping,
    Analysing,
    Calibrating,
    ViewingHistory,
}

/// What the control loop must do after an accepted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The state changed; build and draw the new screen (running any
    /// entry effects: fresh reading, calibration dwell).
    Navigate(UiState),
    /// Same state, stale content: the history page moved under the cursor.
    Refresh,
}

pub struct UiStateMachine {
    state: UiState,
    cursor: HistoryCursor,
    cursor_policy: CursorPolicy,
    page_size: usize,
}

impl UiStateMachine {
    pub fn new(cursor_policy: CursorPolicy, page_size: usize) -> Self {
        Self {
            state: UiState::Sleeping,
            cursor: HistoryCursor::new(),
            cursor_policy,
            page_size,
        }
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn cursor(&self) -> HistoryCursor {
        self.cursor
    }

    /// Feed one debounced press. `history_len` bounds the scroll-down
    /// clamp; it is the only fact about the log the machine needs.
    ///
    /// Returns `None` for every no-op: unlisted buttons, and scrolls
    /// refused at a boundary (those must not trigger regeneration).
    pub fn on_event(&mut self, event: ButtonEvent, history_len: usize) -> Option<Action> {
        let ButtonEvent::Press(button) = event;

        match (self.state, button) {
            (UiState::Sleeping, ButtonId::Primary) => self.navigate(UiState::Analysing),

            (UiState::Analysing, ButtonId::Primary) => self.navigate(UiState::Calibrating),
            (UiState::Analysing, ButtonId::Secondary) => self.navigate(UiState::ViewingHistory),
            (UiState::Analysing, ButtonId::Tertiary) => self.navigate(UiState::Sleeping),

            // Any button ends calibration once the dwell has passed.
            (UiState::Calibrating, _) => self.navigate(UiState::Analysing),

            (UiState::ViewingHistory, ButtonId::Primary) => {
                self.cursor.scroll_up().then_some(Action::Refresh)
            }
            (UiState::ViewingHistory, ButtonId::Secondary) => self.navigate(UiState::Analysing),
            (UiState::ViewingHistory, ButtonId::Tertiary) => self
                .cursor
                .scroll_down(history_len, self.page_size)
                .then_some(Action::Refresh),

            _ => None,
        }
    }

    fn navigate(&mut self, next: UiState) -> Option<Action> {
        debug!("state {:?} -> {:?}", self.state, next);
        if next == UiState::ViewingHistory && self.cursor_policy == CursorPolicy::ResetOnEntry {
            self.cursor.reset();
        }
        self.state = next;
        Some(Action::Navigate(next))
    }
}
