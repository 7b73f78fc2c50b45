//! Debounced trigger button.
//!
//! The button pulls its line low when pressed. Debouncing is purely time based:
//! after an accepted read, further reads are ignored for the debounce window.
//! A button held down therefore fires again once per window, not once per press.

use log::debug;

/// Electrical level read from the trigger line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Active-low: the button is pressed while the line reads low
    #[must_use]
    pub const fn is_pressed(self) -> bool {
        matches!(self, Self::Low)
    }
}

#[derive(Debug, Clone)]
pub struct InputWatcher {
    debounce_ms: u32,
    /// Reads before this timestamp are ignored
    next_check_at: u64,
}

impl InputWatcher {
    #[must_use]
    pub const fn new(debounce_ms: u32) -> Self {
        Self {
            debounce_ms,
            next_check_at: 0,
        }
    }

    /// Feed one line read taken at `now_ms`. Returns true when the read triggers.
    pub fn poll(&mut self, now_ms: u64, level: Level) -> bool {
        if now_ms < self.next_check_at || !level.is_pressed() {
            return false;
        }
        self.next_check_at = now_ms + u64::from(self.debounce_ms);
        debug!("Button: trigger at {now_ms} ms, next check at {} ms", self.next_check_at);
        true
    }

    /// Earliest time the next read is considered
    #[must_use]
    pub const fn next_check_at(&self) -> u64 {
        self.next_check_at
    }
}
