#![forbid(unsafe_code)]

//! Hand-off state for the full picker overlay.
//!
//! The strip does not render the overlay's content. It only tracks whether
//! the overlay is up and drives the crossfade, so the embedder knows when
//! to stop painting the inline strip and at what alpha to blend.

use std::time::Duration;

use emopick_core::animation::{Transition, ease_in_out};
use web_time::Instant;

pub const CROSSFADE_DURATION: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Closed,
    Opening,
    Open,
    Closing,
}

/// Crossfade-driving overlay controller.
#[derive(Debug, Clone)]
pub struct OverlayController {
    state: OverlayState,
    fade: Transition,
}

impl Default for OverlayController {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: OverlayState::Closed,
            fade: Transition::new(CROSSFADE_DURATION),
        }
    }

    /// Begin opening. A no-op while already opening or open.
    pub fn open(&mut self, now: Instant) {
        match self.state {
            OverlayState::Closed | OverlayState::Closing => {
                tracing::debug!("overlay opening");
                self.state = OverlayState::Opening;
                self.fade.start(now);
            }
            OverlayState::Opening | OverlayState::Open => {}
        }
    }

    /// Begin closing, or snap shut when `animated` is false.
    pub fn dismiss(&mut self, animated: bool, now: Instant) {
        match self.state {
            OverlayState::Open | OverlayState::Opening => {
                if animated {
                    self.state = OverlayState::Closing;
                    self.fade.start(now);
                } else {
                    self.state = OverlayState::Closed;
                    self.fade.reset();
                }
            }
            OverlayState::Closed | OverlayState::Closing => {}
        }
    }

    /// Settle transitional states whose crossfade has finished.
    pub fn tick(&mut self, now: Instant) {
        match self.state {
            OverlayState::Opening if self.fade.is_complete(now) => {
                self.state = OverlayState::Open;
            }
            OverlayState::Closing if self.fade.is_complete(now) => {
                self.state = OverlayState::Closed;
                self.fade.reset();
            }
            _ => {}
        }
    }

    /// Overlay alpha in [0, 1].
    #[must_use]
    pub fn alpha(&self, now: Instant) -> f32 {
        match self.state {
            OverlayState::Closed => 0.0,
            OverlayState::Open => 1.0,
            OverlayState::Opening => ease_in_out(self.fade.fraction(now)),
            OverlayState::Closing => 1.0 - ease_in_out(self.fade.fraction(now)),
        }
    }

    /// Whether inline strip painting should be skipped (crossfade past its
    /// midpoint or overlay fully up).
    #[must_use]
    pub fn suppresses_strip(&self, now: Instant) -> bool {
        self.alpha(now) > 0.5
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Snap shut without animating. Used by `reset()`.
    pub fn force_close(&mut self) {
        self.state = OverlayState::Closed;
        self.fade.reset();
    }
}
