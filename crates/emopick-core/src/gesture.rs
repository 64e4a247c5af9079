#![forbid(unsafe_code)]

//! Press and pull gesture state machine.
//!
//! [`GestureStateMachine`] converts raw pointer events plus a per-frame tick
//! into semantic [`GestureEvent`]s. It owns two concurrent pieces of state:
//!
//! - **Press**: at most one live press over a reaction item, walking
//!   `Idle → Pressed → Confirming → Confirmed` (press-and-hold
//!   "super react") or bailing out through `Cancelling` back to `Idle`.
//! - **Pull**: the horizontal rubber-band overscroll that hands the strip
//!   off to the full picker overlay once a threshold is crossed.
//!
//! # State Machine
//!
//! ```text
//! Down ──────────────▶ Pressed ── hold delay ──▶ Confirming ── fill=1 ──▶ Confirmed
//!                        │  │                      │      │
//!                        │  └─ Up in slop ─▶ tap   │      └─ Up, fill>grace ─▶ Confirmed
//!                        │                         │
//!                        └─ slop/cancel ─▶ Idle    └─ Up/slop/cancel ─▶ Cancelling ─▶ Idle
//! ```
//!
//! # Invariants
//!
//! 1. At most one `Selected` event per discrete gesture; tap and long-press
//!    are mutually exclusive outcomes of one pointer-down.
//! 2. Fill progress is monotonically non-decreasing while `Confirming` and
//!    non-increasing while `Cancelling`; always within [0, 1].
//! 3. A second pointer-down while a press is live is ignored.
//! 4. Pull progress is clamped to [0, 2]; the haptic pulse on crossing 1.0
//!    is edge-triggered, once per crossing, in either direction.
//! 5. `reset()` and a catalog rebuild clear all state without emitting.
//!
//! # Failure Modes
//!
//! - Up/Move/Cancel with no live press: ignored (the tap candidate was
//!   already consumed or never existed).
//! - Release with zero pull offset: no-op.

use std::time::Duration;

use web_time::Instant;

use crate::animation::ease_in_out;
use crate::item::ReactionItem;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds and timings. The grace and hand-off thresholds are
/// empirically chosen UI constants, deliberately configuration rather than
/// hard-coded invariants.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Stationary hold before the confirm fill starts (default: 500ms).
    pub long_press_delay: Duration,
    /// Wall-clock duration of the confirm fill, 0 → 1 (default: 1500ms).
    pub hold_duration: Duration,
    /// Duration of the cancel-back animation (default: 150ms).
    pub cancel_duration: Duration,
    /// Fill progress above which an early release still confirms
    /// (default: 0.8).
    pub grace_threshold: f32,
    /// Per-axis movement tolerance before a press cancels (default: 16.0).
    pub slop: f32,
    /// Pull distance corresponding to progress 1.0 (default: 42.0).
    pub pull_unit: f32,
    /// Pull progress at or above which a release triggers hand-off
    /// (default: 0.95).
    pub handoff_threshold: f32,
    /// Overscroll damping below the unit threshold (default: 0.6).
    pub pull_damping: f32,
    /// Overscroll damping past the unit threshold (default: 0.05).
    pub pull_overdamping: f32,
    /// Duration of the pull-release spring-back (default: 150ms).
    pub pull_release_duration: Duration,
    /// Minimum spacing between two `Selected` emissions (default: 300ms).
    pub selection_debounce: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press_delay: Duration::from_millis(500),
            hold_duration: Duration::from_millis(1500),
            cancel_duration: Duration::from_millis(150),
            grace_threshold: 0.8,
            slop: 16.0,
            pull_unit: 42.0,
            handoff_threshold: 0.95,
            pull_damping: 0.6,
            pull_overdamping: 0.05,
            pull_release_duration: Duration::from_millis(150),
            selection_debounce: Duration::from_millis(300),
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Raw pointer input. `Down` carries the hit-tested target because hit
/// testing (against unscaled bounds) belongs to the container.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Down {
        item: ReactionItem,
        index: usize,
        x: f32,
        y: f32,
    },
    Move {
        x: f32,
        y: f32,
    },
    Up {
        x: f32,
        y: f32,
    },
    Cancel,
}

/// Haptic pulse kinds surfaced to the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticKind {
    /// The long-press recognizer fired.
    LongPress,
    /// Pull progress crossed 1.0 (either direction).
    Threshold,
}

/// Semantic output of the machine. The container is the only consumer and
/// the only place user callbacks fire.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    /// A reaction was chosen, by tap (`long_press: false`) or by confirmed
    /// hold (`long_press: true`). At most one per gesture.
    Selected {
        item: ReactionItem,
        long_press: bool,
    },
    /// The pull hand-off threshold was crossed on release.
    ExpandRequested,
    /// Fire a haptic pulse.
    Haptic(HapticKind),
}

// ---------------------------------------------------------------------------
// Press state
// ---------------------------------------------------------------------------

/// Phase of the live press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressPhase {
    /// Pointer is down; the long-press recognizer has not fired yet.
    Pressed,
    /// Recognizer fired; the confirm fill is integrating toward 1.
    Confirming,
    /// Fill completed (terminal; the press clears immediately after).
    Confirmed,
    /// Early release: the fill is animating back to 0.
    Cancelling,
}

/// The single live press. Created on pointer-down, destroyed on
/// up/cancel/confirm; never survives a catalog rebuild.
#[derive(Debug, Clone)]
pub struct PressState {
    pub item: ReactionItem,
    /// Index of the item in the current catalog.
    pub index: usize,
    pub phase: PressPhase,
    /// Confirm fill in [0, 1].
    pub progress: f32,
    origin: (f32, f32),
    down_at: Instant,
    /// Whether the long-press recognizer was armed at all (not for locked
    /// items or tap-only mode).
    armed: bool,
    /// Fill value captured when cancelling began.
    cancel_from: f32,
    cancel_started: Option<Instant>,
}

// ---------------------------------------------------------------------------
// Pull state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
struct PullState {
    /// Accumulated overscroll distance, clamped ≥ 0.
    offset: f32,
    /// Spring-back animation, if running.
    release: Option<PullRelease>,
}

#[derive(Debug, Clone)]
struct PullRelease {
    from: f32,
    started: Instant,
}

// ---------------------------------------------------------------------------
// GestureStateMachine
// ---------------------------------------------------------------------------

/// Stateful press + pull recognizer. Feed it pointer events via
/// [`process`](Self::process) and call [`tick`](Self::tick) once per frame;
/// both return the semantic events produced.
pub struct GestureStateMachine {
    config: GestureConfig,
    press: Option<PressState>,
    pull: PullState,
    /// Tap-only mode (tags context): long-press confirmation disabled.
    tap_only: bool,
    /// Whether the expand escape hatch exists; gates the pull gesture.
    pull_enabled: bool,
    last_selected_at: Option<Instant>,
    last_tick: Option<Instant>,
}

impl std::fmt::Debug for GestureStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureStateMachine")
            .field("press", &self.press.as_ref().map(|p| p.phase))
            .field("pull_offset", &self.pull.offset)
            .finish()
    }
}

impl GestureStateMachine {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            press: None,
            pull: PullState::default(),
            tap_only: false,
            pull_enabled: false,
            last_selected_at: None,
            last_tick: None,
        }
    }

    /// Process a raw pointer event.
    pub fn process(&mut self, event: &PointerEvent, now: Instant) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        match event {
            PointerEvent::Down {
                item,
                index,
                x,
                y,
            } => self.on_down(item, *index, (*x, *y), now),
            PointerEvent::Move { x, y } => self.on_move((*x, *y), now),
            PointerEvent::Up { x, y } => self.on_up((*x, *y), now, &mut out),
            PointerEvent::Cancel => self.cancel_press(now),
        }
        out
    }

    /// Advance time-based state: recognizer arming, confirm fill,
    /// cancel-back, and pull spring-back. Call once per frame, before
    /// reading state for layout.
    pub fn tick(&mut self, now: Instant) -> Vec<GestureEvent> {
        let dt = match self.last_tick.replace(now) {
            Some(prev) => now.saturating_duration_since(prev),
            None => Duration::ZERO,
        };
        let mut out = Vec::new();

        let mut clear = false;
        if let Some(press) = self.press.as_mut() {
            match press.phase {
                PressPhase::Pressed => {
                    if press.armed
                        && now.saturating_duration_since(press.down_at)
                            >= self.config.long_press_delay
                    {
                        press.phase = PressPhase::Confirming;
                        tracing::trace!(index = press.index, "press confirming");
                        out.push(GestureEvent::Haptic(HapticKind::LongPress));
                    }
                }
                PressPhase::Confirming => {
                    let step =
                        dt.as_secs_f32() / self.config.hold_duration.as_secs_f32().max(f32::EPSILON);
                    press.progress = (press.progress + step).min(1.0);
                    if press.progress >= 1.0 {
                        press.phase = PressPhase::Confirmed;
                        let item = press.item.clone();
                        clear = true;
                        self.emit_selected(item, true, now, &mut out);
                    }
                }
                PressPhase::Cancelling => {
                    let started = press.cancel_started.unwrap_or(now);
                    let t = duration_fraction(
                        now.saturating_duration_since(started),
                        self.config.cancel_duration,
                    );
                    press.progress = press.cancel_from * (1.0 - ease_in_out(t));
                    if t >= 1.0 {
                        press.progress = 0.0;
                        clear = true;
                    }
                }
                PressPhase::Confirmed => clear = true,
            }
        }
        if clear {
            self.press = None;
        }

        if let Some(release) = self.pull.release.clone() {
            let t = duration_fraction(
                now.saturating_duration_since(release.started),
                self.config.pull_release_duration,
            );
            self.pull.offset = release.from * (1.0 - ease_in_out(t));
            if t >= 1.0 {
                self.pull.offset = 0.0;
                self.pull.release = None;
            }
        }

        out
    }

    // -- press -------------------------------------------------------------

    fn on_down(&mut self, item: &ReactionItem, index: usize, pos: (f32, f32), now: Instant) {
        if self.press.is_some() {
            // One live press at a time; concurrent downs are ignored.
            return;
        }
        let armed = !item.locked && !self.tap_only;
        self.press = Some(PressState {
            item: item.clone(),
            index,
            phase: PressPhase::Pressed,
            progress: 0.0,
            origin: pos,
            down_at: now,
            armed,
            cancel_from: 0.0,
            cancel_started: None,
        });
    }

    fn on_move(&mut self, pos: (f32, f32), now: Instant) {
        let Some(press) = self.press.as_ref() else {
            return;
        };
        let slop = self.config.slop;
        let outside = (pos.0 - press.origin.0).abs() > slop || (pos.1 - press.origin.1).abs() > slop;
        if outside {
            self.cancel_press(now);
        }
    }

    fn on_up(&mut self, _pos: (f32, f32), now: Instant, out: &mut Vec<GestureEvent>) {
        let Some(press) = self.press.as_ref() else {
            return;
        };
        match press.phase {
            PressPhase::Pressed => {
                // Recognizer never fired: a plain tap.
                let item = press.item.clone();
                self.press = None;
                self.emit_selected(item, false, now, out);
            }
            PressPhase::Confirming => {
                if press.progress > self.config.grace_threshold {
                    // Grace window: slightly-early release still confirms.
                    let item = press.item.clone();
                    self.press = None;
                    self.emit_selected(item, true, now, out);
                } else {
                    self.begin_cancel(now);
                }
            }
            // Already resolving; the up is inert.
            PressPhase::Confirmed | PressPhase::Cancelling => {}
        }
    }

    /// Cancel the live press without emitting. Pressed clears immediately;
    /// Confirming animates its fill back down first.
    fn cancel_press(&mut self, now: Instant) {
        match self.press.as_ref().map(|p| p.phase) {
            Some(PressPhase::Pressed) => self.press = None,
            Some(PressPhase::Confirming) => self.begin_cancel(now),
            _ => {}
        }
    }

    fn begin_cancel(&mut self, now: Instant) {
        if let Some(press) = self.press.as_mut() {
            press.phase = PressPhase::Cancelling;
            press.cancel_from = press.progress;
            press.cancel_started = Some(now);
        }
    }

    fn emit_selected(
        &mut self,
        item: ReactionItem,
        long_press: bool,
        now: Instant,
        out: &mut Vec<GestureEvent>,
    ) {
        if let Some(last) = self.last_selected_at
            && now.saturating_duration_since(last) < self.config.selection_debounce
        {
            return;
        }
        self.last_selected_at = Some(now);
        tracing::trace!(long_press, "reaction selected");
        out.push(GestureEvent::Selected { item, long_press });
    }

    // -- pull --------------------------------------------------------------

    /// Feed an overscroll delta (positive = past the trailing edge).
    /// Returns the undamped remainder the caller should apply as ordinary
    /// scrolling, plus any events (threshold haptic).
    pub fn overscroll(&mut self, dx: f32) -> (f32, Vec<GestureEvent>) {
        if !self.pull_enabled {
            return (dx, Vec::new());
        }
        let mut out = Vec::new();
        if dx > 0.0 {
            // A new drag supersedes any spring-back in flight.
            self.pull.release = None;
            let old = self.pull_progress();
            let k = if old > 1.0 {
                self.config.pull_overdamping
            } else {
                self.config.pull_damping
            };
            self.pull.offset += dx * k;
            self.check_threshold_crossing(old, &mut out);
            (0.0, out)
        } else if dx < 0.0 && self.pull.offset > 0.0 {
            // Drain the pull first; leftover goes back to list scrolling.
            let old = self.pull_progress();
            self.pull.offset += dx;
            let remainder = if self.pull.offset < 0.0 {
                let r = self.pull.offset;
                self.pull.offset = 0.0;
                r
            } else {
                0.0
            };
            self.check_threshold_crossing(old, &mut out);
            (remainder, out)
        } else {
            (dx, out)
        }
    }

    /// Pointer released: either hand off to the full picker or spring back.
    pub fn release_pull(&mut self, now: Instant) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        if !self.pull_enabled || self.pull.offset == 0.0 {
            return out;
        }
        if self.pull_progress() >= self.config.handoff_threshold {
            // Hand-off boundary: snap, the overlay's enter transition
            // substitutes for any spring-back.
            self.pull.offset = 0.0;
            self.pull.release = None;
            out.push(GestureEvent::ExpandRequested);
        } else if self.pull.release.is_none() {
            self.pull.release = Some(PullRelease {
                from: self.pull.offset,
                started: now,
            });
        }
        out
    }

    fn check_threshold_crossing(&self, old_progress: f32, out: &mut Vec<GestureEvent>) {
        // Reaching the bar exactly counts as past it, so a drag that lands
        // on progress 1.0 pulses immediately.
        let crossed = (old_progress >= 1.0) != (self.pull_progress() >= 1.0);
        if crossed {
            out.push(GestureEvent::Haptic(HapticKind::Threshold));
        }
    }

    // -- lifecycle and accessors -------------------------------------------

    /// The catalog was rebuilt under a live press: implicit cancellation,
    /// no callback, no animation.
    pub fn notify_rebuild(&mut self) {
        self.press = None;
    }

    /// Forcibly clear press and pull without emitting.
    pub fn reset(&mut self) {
        self.press = None;
        self.pull = PullState::default();
    }

    /// Enable/disable tap-only (tags) mode. Affects future presses only.
    pub fn set_tap_only(&mut self, tap_only: bool) {
        self.tap_only = tap_only;
    }

    /// Enable/disable the pull gesture (expand escape hatch present).
    pub fn set_pull_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.pull = PullState::default();
        }
        self.pull_enabled = enabled;
    }

    #[inline]
    #[must_use]
    pub fn press(&self) -> Option<&PressState> {
        self.press.as_ref()
    }

    /// Confirm fill of the live press, 0.0 when idle.
    #[inline]
    #[must_use]
    pub fn press_progress(&self) -> f32 {
        self.press.as_ref().map_or(0.0, |p| p.progress)
    }

    #[inline]
    #[must_use]
    pub fn pull_offset(&self) -> f32 {
        self.pull.offset
    }

    /// Pull progress, clamped to [0, 2].
    #[inline]
    #[must_use]
    pub fn pull_progress(&self) -> f32 {
        (self.pull.offset / self.config.pull_unit).clamp(0.0, 2.0)
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }
}

fn duration_fraction(elapsed: Duration, total: Duration) -> f32 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / total.as_secs_f32()).min(1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ReactionKey;

    const MS_100: Duration = Duration::from_millis(100);
    const MS_600: Duration = Duration::from_millis(600);

    fn item(sym: &str) -> ReactionItem {
        ReactionItem::new(ReactionKey::standard(sym))
    }

    fn down(it: &ReactionItem, index: usize) -> PointerEvent {
        PointerEvent::Down {
            item: it.clone(),
            index,
            x: 10.0,
            y: 10.0,
        }
    }

    fn up() -> PointerEvent {
        PointerEvent::Up { x: 10.0, y: 10.0 }
    }

    fn machine() -> GestureStateMachine {
        GestureStateMachine::new(GestureConfig::default())
    }

    /// Drive ticks at a fixed cadence from `start` until `end`, collecting
    /// every event.
    fn run_ticks(
        gm: &mut GestureStateMachine,
        start: Instant,
        end: Instant,
        step: Duration,
    ) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        let mut t = start;
        while t <= end {
            out.extend(gm.tick(t));
            t += step;
        }
        out
    }

    fn selected_count(events: &[GestureEvent]) -> (usize, usize) {
        let taps = events
            .iter()
            .filter(|e| matches!(e, GestureEvent::Selected { long_press: false, .. }))
            .count();
        let longs = events
            .iter()
            .filter(|e| matches!(e, GestureEvent::Selected { long_press: true, .. }))
            .count();
        (taps, longs)
    }

    // --- Tap ---

    #[test]
    fn plain_tap_fires_once_without_long_press() {
        let mut gm = machine();
        let t = Instant::now();
        let a = item("A");

        assert!(gm.process(&down(&a, 0), t).is_empty());
        let events = gm.process(&up(), t + MS_100);
        assert_eq!(
            events,
            vec![GestureEvent::Selected {
                item: a,
                long_press: false,
            }]
        );
        assert!(gm.press().is_none());
    }

    #[test]
    fn second_down_while_live_is_ignored() {
        let mut gm = machine();
        let t = Instant::now();
        gm.process(&down(&item("A"), 0), t);
        gm.process(&down(&item("B"), 1), t + MS_100);
        assert_eq!(gm.press().unwrap().item, item("A"));
    }

    #[test]
    fn move_beyond_slop_cancels_tap_silently() {
        let mut gm = machine();
        let t = Instant::now();
        gm.process(&down(&item("A"), 0), t);
        gm.process(&PointerEvent::Move { x: 40.0, y: 10.0 }, t + MS_100);
        assert!(gm.press().is_none());
        let events = gm.process(&up(), t + MS_600);
        assert!(events.is_empty());
    }

    #[test]
    fn move_within_slop_keeps_press() {
        let mut gm = machine();
        let t = Instant::now();
        gm.process(&down(&item("A"), 0), t);
        gm.process(&PointerEvent::Move { x: 14.0, y: 12.0 }, t + MS_100);
        assert!(gm.press().is_some());
    }

    // --- Long press ---

    #[test]
    fn full_hold_confirms_exactly_once() {
        let mut gm = machine();
        let t = Instant::now();
        let a = item("A");
        gm.process(&down(&a, 0), t);

        // 500ms arming + 1500ms fill, 16ms cadence with headroom.
        let events = run_ticks(
            &mut gm,
            t,
            t + Duration::from_millis(2200),
            Duration::from_millis(16),
        );
        let (taps, longs) = selected_count(&events);
        assert_eq!((taps, longs), (0, 1));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GestureEvent::Haptic(HapticKind::LongPress)))
        );
        assert!(gm.press().is_none(), "press clears after confirmation");

        // A late up emits nothing more.
        assert!(gm.process(&up(), t + Duration::from_millis(2300)).is_empty());
    }

    #[test]
    fn fill_is_monotonic_and_bounded() {
        let mut gm = machine();
        let t = Instant::now();
        gm.process(&down(&item("A"), 0), t);

        let mut last = 0.0f32;
        let mut clock = t;
        for _ in 0..200 {
            clock += Duration::from_millis(16);
            gm.tick(clock);
            if gm.press().is_none() {
                break;
            }
            let p = gm.press_progress();
            assert!(p >= last, "fill must not decrease while confirming");
            assert!((0.0..=1.0).contains(&p));
            last = p;
        }
    }

    #[test]
    fn release_in_grace_window_confirms() {
        let mut gm = machine();
        let t = Instant::now();
        let a = item("A");
        gm.process(&down(&a, 0), t);

        // Arm, then fill to ~0.9: 500ms + 1350ms.
        let events = run_ticks(
            &mut gm,
            t,
            t + Duration::from_millis(1850),
            Duration::from_millis(10),
        );
        assert_eq!(selected_count(&events), (0, 0));
        let p = gm.press_progress();
        assert!(p > 0.8 && p < 1.0, "fill should sit in the grace window, got {p}");

        let events = gm.process(&up(), t + Duration::from_millis(1860));
        assert_eq!(
            events,
            vec![GestureEvent::Selected {
                item: a,
                long_press: true,
            }]
        );
    }

    #[test]
    fn release_below_grace_cancels_without_callback() {
        let mut gm = machine();
        let t = Instant::now();
        gm.process(&down(&item("A"), 0), t);

        // Arm, then fill to ~0.4: 500ms + 600ms.
        run_ticks(
            &mut gm,
            t,
            t + Duration::from_millis(1100),
            Duration::from_millis(10),
        );
        let p = gm.press_progress();
        assert!(p > 0.2 && p < 0.8, "fill below grace, got {p}");

        let events = gm.process(&up(), t + Duration::from_millis(1110));
        assert!(events.is_empty());
        assert_eq!(gm.press().unwrap().phase, PressPhase::Cancelling);

        // Cancel-back is monotonically non-increasing and ends cleared.
        let mut last = gm.press_progress();
        let mut clock = t + Duration::from_millis(1110);
        for _ in 0..30 {
            clock += Duration::from_millis(10);
            let events = gm.tick(clock);
            assert!(events.is_empty());
            let p = gm.press_progress();
            assert!(p <= last, "cancel fill must not increase");
            last = p;
        }
        assert!(gm.press().is_none());
    }

    #[test]
    fn locked_item_never_confirms() {
        let mut gm = machine();
        let t = Instant::now();
        let locked = item("L").locked();
        gm.process(&down(&locked, 0), t);

        let events = run_ticks(
            &mut gm,
            t,
            t + Duration::from_millis(2500),
            Duration::from_millis(16),
        );
        assert!(events.is_empty(), "no recognizer, no fill, no haptic");
        assert_eq!(gm.press().unwrap().phase, PressPhase::Pressed);

        // Tap still works.
        let events = gm.process(&up(), t + Duration::from_millis(2510));
        assert_eq!(selected_count(&events), (1, 0));
    }

    #[test]
    fn tap_only_mode_disables_confirmation() {
        let mut gm = machine();
        gm.set_tap_only(true);
        let t = Instant::now();
        gm.process(&down(&item("A"), 0), t);
        let events = run_ticks(
            &mut gm,
            t,
            t + Duration::from_millis(2500),
            Duration::from_millis(16),
        );
        assert!(events.is_empty());
        let events = gm.process(&up(), t + Duration::from_millis(2510));
        assert_eq!(selected_count(&events), (1, 0));
    }

    #[test]
    fn rebuild_mid_press_is_implicit_cancel() {
        let mut gm = machine();
        let t = Instant::now();
        gm.process(&down(&item("A"), 0), t);
        run_ticks(
            &mut gm,
            t,
            t + Duration::from_millis(1100),
            Duration::from_millis(16),
        );
        assert!(gm.press_progress() > 0.0);

        gm.notify_rebuild();
        assert!(gm.press().is_none());
        let events = gm.process(&up(), t + Duration::from_millis(1200));
        assert!(events.is_empty(), "no tap after implicit cancel");
    }

    #[test]
    fn reset_clears_press_without_callback() {
        let mut gm = machine();
        let t = Instant::now();
        gm.process(&down(&item("A"), 0), t);
        run_ticks(
            &mut gm,
            t,
            t + Duration::from_millis(1100),
            Duration::from_millis(16),
        );
        gm.reset();
        assert!(gm.press().is_none());
        assert_eq!(gm.pull_offset(), 0.0);
    }

    #[test]
    fn selection_debounce_swallows_rapid_second_tap() {
        let mut gm = machine();
        let t = Instant::now();
        gm.process(&down(&item("A"), 0), t);
        let first = gm.process(&up(), t + Duration::from_millis(50));
        assert_eq!(selected_count(&first), (1, 0));

        gm.process(&down(&item("B"), 1), t + MS_100);
        let second = gm.process(&up(), t + Duration::from_millis(150));
        assert!(second.is_empty(), "within 300ms debounce");

        gm.process(&down(&item("B"), 1), t + MS_600);
        let third = gm.process(&up(), t + Duration::from_millis(700));
        assert_eq!(selected_count(&third), (1, 0));
    }

    // --- Pull ---

    fn pull_machine() -> GestureStateMachine {
        let mut gm = machine();
        gm.set_pull_enabled(true);
        gm
    }

    #[test]
    fn pull_disabled_passes_delta_through() {
        let mut gm = machine();
        let (remainder, events) = gm.overscroll(30.0);
        assert_eq!(remainder, 30.0);
        assert!(events.is_empty());
        assert_eq!(gm.pull_offset(), 0.0);
    }

    #[test]
    fn pull_damps_and_clamps_progress() {
        let mut gm = pull_machine();
        let (remainder, _) = gm.overscroll(30.0);
        assert_eq!(remainder, 0.0);
        assert!((gm.pull_offset() - 18.0).abs() < 1e-4); // 30 * 0.6

        for _ in 0..100 {
            gm.overscroll(50.0);
        }
        assert!(gm.pull_progress() <= 2.0);
    }

    #[test]
    fn resistance_increases_past_unit() {
        let mut gm = pull_machine();
        gm.overscroll(80.0); // 48 > unit
        let before = gm.pull_offset();
        gm.overscroll(100.0); // overdamped: +5
        assert!((gm.pull_offset() - before - 5.0).abs() < 1e-3);
    }

    #[test]
    fn threshold_haptic_is_edge_triggered_both_directions() {
        let mut gm = pull_machine();
        let (_, events) = gm.overscroll(60.0); // 36 < 42, no pulse
        assert!(events.is_empty());
        let (_, events) = gm.overscroll(20.0); // 48 > 42 → pulse
        assert_eq!(events, vec![GestureEvent::Haptic(HapticKind::Threshold)]);
        let (_, events) = gm.overscroll(20.0); // still past → no pulse
        assert!(events.is_empty());
        let (_, events) = gm.overscroll(-10.0); // back below → pulse
        assert_eq!(events, vec![GestureEvent::Haptic(HapticKind::Threshold)]);
    }

    #[test]
    fn threshold_pulse_fires_landing_exactly_on_unit() {
        // 0.5 damping keeps the arithmetic exact: 84 * 0.5 = 42.0 = unit.
        let mut gm = GestureStateMachine::new(GestureConfig {
            pull_damping: 0.5,
            ..GestureConfig::default()
        });
        gm.set_pull_enabled(true);

        let (_, events) = gm.overscroll(84.0);
        assert_eq!(gm.pull_progress(), 1.0);
        assert_eq!(events, vec![GestureEvent::Haptic(HapticKind::Threshold)]);

        // Already at the bar: pushing further must not repeat the pulse.
        let (_, events) = gm.overscroll(1.0);
        assert!(events.is_empty());
    }

    #[test]
    fn negative_delta_drains_before_scrolling() {
        let mut gm = pull_machine();
        gm.overscroll(20.0); // offset 12
        let (remainder, _) = gm.overscroll(-5.0);
        assert_eq!(remainder, 0.0);
        assert!((gm.pull_offset() - 7.0).abs() < 1e-4);

        let (remainder, _) = gm.overscroll(-10.0);
        assert!((remainder + 3.0).abs() < 1e-4, "leftover scrolls the list");
        assert_eq!(gm.pull_offset(), 0.0);
    }

    #[test]
    fn release_past_handoff_expands_and_snaps() {
        let mut gm = pull_machine();
        // 0.6 damping: 70 * 0.6 = 42 → progress 1.0 ≥ 0.95.
        gm.overscroll(70.0);
        assert!(gm.pull_progress() >= 0.95);

        let events = gm.release_pull(Instant::now());
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GestureEvent::ExpandRequested))
                .count(),
            1
        );
        assert_eq!(gm.pull_offset(), 0.0, "snaps synchronously");
    }

    #[test]
    fn release_below_handoff_springs_back() {
        let mut gm = pull_machine();
        gm.overscroll(30.0); // progress ~0.43
        let t = Instant::now();
        let events = gm.release_pull(t);
        assert!(events.is_empty());
        assert!(gm.pull_offset() > 0.0);

        let mut last = gm.pull_offset();
        let mut clock = t;
        for _ in 0..30 {
            clock += Duration::from_millis(10);
            gm.tick(clock);
            assert!(gm.pull_offset() <= last);
            last = gm.pull_offset();
        }
        assert_eq!(gm.pull_offset(), 0.0);
    }

    #[test]
    fn new_drag_supersedes_spring_back() {
        let mut gm = pull_machine();
        gm.overscroll(30.0);
        let t = Instant::now();
        gm.release_pull(t);
        gm.tick(t + Duration::from_millis(50));
        let mid = gm.pull_offset();
        assert!(mid > 0.0 && mid < 18.0);

        gm.overscroll(10.0);
        let held = gm.pull_offset();
        gm.tick(t + Duration::from_millis(120));
        assert_eq!(gm.pull_offset(), held, "release animation discarded");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Under arbitrary frame cadence the fill never decreases
            /// while held and never leaves [0, 1].
            #[test]
            fn fill_monotone_under_any_cadence(steps in proptest::collection::vec(1u64..120, 1..80)) {
                let mut gm = machine();
                let t = Instant::now();
                gm.process(&down(&item("A"), 0), t);
                let mut clock = t;
                let mut last = 0.0f32;
                for ms in steps {
                    clock += Duration::from_millis(ms);
                    gm.tick(clock);
                    let p = gm.press_progress();
                    prop_assert!((0.0..=1.0).contains(&p));
                    if gm.press().is_some() {
                        prop_assert!(p >= last);
                        last = p;
                    }
                }
            }

            /// Pull progress stays clamped for any overscroll sequence.
            #[test]
            fn pull_progress_clamped(deltas in proptest::collection::vec(-200.0f32..200.0, 0..60)) {
                let mut gm = pull_machine();
                for dx in deltas {
                    gm.overscroll(dx);
                    let p = gm.pull_progress();
                    prop_assert!((0.0..=2.0).contains(&p));
                    prop_assert!(gm.pull_offset() >= 0.0);
                }
            }
        }
    }
}
