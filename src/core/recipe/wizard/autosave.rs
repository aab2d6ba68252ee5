//! Auto-save debounce timer.
//!
//! Every change re-arms the timer, so a draft is written only after a quiet
//! window with no further edits. Only the latest snapshot is persisted.

use std::time::Duration;

use tokio::time::Instant;

/// Default quiet window before an autosave fires.
pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_millis(2_500);

/// Auto-save status, for hosts that display it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoSaveStatus {
    /// Nothing pending
    Idle,
    /// Waiting for the quiet window to elapse
    Pending,
    /// Last save succeeded
    Saved,
    /// Last save failed (storage unavailable)
    Failed,
}

/// Cancellable, re-armable deadline.
#[derive(Debug, Clone)]
pub struct AutoSaveTimer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl AutoSaveTimer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn quiet_window(&self) -> Duration {
        self.quiet
    }

    /// (Re)start the quiet window from now.
    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.quiet);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_due(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Disarm and return true if the deadline has passed.
    pub fn take_due(&mut self) -> bool {
        if self.is_due() {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}

impl Default for AutoSaveTimer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_WINDOW)
    }
}
