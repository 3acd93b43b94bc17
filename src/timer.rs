use std::time::Duration;

use tracing::debug;

use crate::prelude::*;

/// Handle for one scheduled debounce fire.
///
/// Tokens are never reused within a timer, so a handle that outlived a
/// reschedule can always be told apart from the live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "timer#{_0}")]
pub struct TimerToken(u64);

/// Cancel-and-replace timer: at most one token is live at a time.
///
/// The timer does not sleep by itself. Whoever drives the event loop waits
/// [`DebounceTimer::delay`] after scheduling and then hands the token back
/// through [`DebounceTimer::fire`], which only succeeds for the live token.
#[derive(Debug, Clone)]
pub struct DebounceTimer {
    delay: Duration,
    generation: u64,
    live: Option<TimerToken>,
}

impl DebounceTimer {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            live: None,
        }
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }

    pub const fn live(&self) -> Option<TimerToken> {
        self.live
    }

    pub const fn is_pending(&self) -> bool {
        self.live.is_some()
    }

    /// Invalidates any live token and issues a new one.
    pub fn schedule(&mut self) -> TimerToken {
        self.generation += 1;
        let token = TimerToken(self.generation);
        if let Some(previous) = self.live.replace(token) {
            debug!(%previous, %token, "debounce timer replaced");
        }
        token
    }

    /// Invalidates the live token, if any.
    pub fn cancel(&mut self) -> Option<TimerToken> {
        self.live.take()
    }

    pub fn is_live(&self, token: TimerToken) -> bool {
        self.live == Some(token)
    }

    /// Consumes `token` if it is the live one. Returns false for cancelled or
    /// superseded tokens, and for a token that already fired.
    pub fn fire(&mut self, token: TimerToken) -> bool {
        if self.is_live(token) {
            self.live = None;
            true
        } else {
            false
        }
    }
}
