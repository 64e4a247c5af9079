#![forbid(unsafe_code)]

//! Easing curves and wall-clock transitions.
//!
//! Everything here is driven by an explicit `now: Instant`, never a hidden
//! clock, so callers stay deterministic under test.

use std::time::Duration;

use web_time::Instant;

/// Accelerate-then-decelerate ease, C¹ at both ends. Used for cancel-back
/// and pull spring-back.
#[inline]
#[must_use]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Overshoot ease: briefly exceeds 1.0 before settling, scaled by
/// `tension`. `tension == 0` degenerates to plain ease-out.
#[inline]
#[must_use]
pub fn overshoot(t: f32, tension: f32) -> f32 {
    let t = t.clamp(0.0, 1.0) - 1.0;
    t * t * ((tension + 1.0) * t + tension) + 1.0
}

/// A one-shot timed transition from 0 to 1. Holds at 0 until started and
/// at 1 once elapsed.
#[derive(Debug, Clone)]
pub struct Transition {
    duration: Duration,
    started: Option<Instant>,
}

impl Transition {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started: None,
        }
    }

    /// Arm the transition. Restarting an armed transition rewinds it.
    pub fn start(&mut self, now: Instant) {
        self.started = Some(now);
    }

    /// Linear fraction in [0, 1]; apply an easing curve on top.
    #[must_use]
    pub fn fraction(&self, now: Instant) -> f32 {
        let Some(started) = self.started else {
            return 0.0;
        };
        if self.duration.is_zero() {
            return 1.0;
        }
        (now.saturating_duration_since(started).as_secs_f32() / self.duration.as_secs_f32())
            .min(1.0)
    }

    /// Fraction with a per-item stagger delay subtracted, holding at 0
    /// until the delay elapses.
    #[must_use]
    pub fn staggered_fraction(&self, now: Instant, delay: Duration) -> f32 {
        let Some(started) = self.started else {
            return 0.0;
        };
        let elapsed = now.saturating_duration_since(started);
        if elapsed < delay {
            return 0.0;
        }
        if self.duration.is_zero() {
            return 1.0;
        }
        ((elapsed - delay).as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    #[inline]
    #[must_use]
    pub fn is_running(&self, now: Instant) -> bool {
        self.started.is_some() && self.fraction(now) < 1.0
    }

    #[inline]
    #[must_use]
    pub fn is_complete(&self, now: Instant) -> bool {
        self.started.is_some() && self.fraction(now) >= 1.0
    }

    pub fn reset(&mut self) {
        self.started = None;
    }
}
