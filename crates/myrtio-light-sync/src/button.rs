//! Debounced button input
//!
//! The interrupt handler feeds every falling edge into [`ButtonInput`], which
//! forwards at most one press per debounce window to the registered
//! [`PressHandler`].

use embassy_time::{Duration, Instant};

use crate::ports::PressHandler;

/// Minimum spacing between accepted button triggers
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(50);

/// Edge filter accepting triggers spaced at least `window` apart.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last_trigger: Option<Instant>,
}

impl Debouncer {
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            last_trigger: None,
        }
    }

    /// Returns `true` if the trigger at `now` is accepted.
    ///
    /// Rejected triggers do not move the window.
    pub fn accept(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_trigger {
            if now.saturating_duration_since(last) < self.window {
                return false;
            }
        }
        self.last_trigger = Some(now);
        true
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

pub struct ButtonInput<'a> {
    debouncer: Debouncer,
    handler: Option<&'a dyn PressHandler>,
}

impl<'a> ButtonInput<'a> {
    pub const fn new(window: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(window),
            handler: None,
        }
    }

    /// Bind the handler invoked on a qualifying press
    pub fn register(&mut self, handler: &'a dyn PressHandler) {
        self.handler = Some(handler);
    }

    /// Feed a falling edge observed at `now`.
    ///
    /// Returns `true` if the press passed the debounce filter.
    pub fn on_falling_edge(&mut self, now: Instant) -> bool {
        if !self.debouncer.accept(now) {
            return false;
        }
        match self.handler {
            Some(handler) => handler.on_press(),
            None => log::debug!("button: pressed, no handler registered"),
        }
        true
    }
}

impl Default for ButtonInput<'_> {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}
