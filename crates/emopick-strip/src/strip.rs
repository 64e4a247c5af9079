#![forbid(unsafe_code)]

//! The inline picker container.
//!
//! [`PickerStrip`] composes the core pieces (catalog, reconciler, gesture
//! machine, scale model) into one stateful widget: raw pointer and scroll
//! input goes in, [`StripEvent`]s and a per-frame [`StripFrame`] scene
//! snapshot come out. The embedder owns rendering, haptics, and the overlay
//! content; the strip owns every interaction decision.
//!
//! Per-frame ordering inside [`frame`](PickerStrip::frame): gesture and
//! animation resolution first, then visibility and scale, then the
//! snapshot. Events surface only from transitions resolved in that call.
//!
//! # Invariants
//!
//! 1. Hit testing uses unscaled slot bounds, even mid-animation.
//! 2. A context rebuild under a live press cancels it with no callback.
//! 3. The pull gesture exists only while the expand hand-off is available.
//!
//! # Failure Modes
//!
//! - Pointer events outside any slot are ignored.
//! - `frame` before any `set_context` yields an empty snapshot.

use std::time::Duration;

use emopick_core::animation::Transition;
use emopick_core::catalog::{
    AvailabilityPolicy, CatalogConfig, CatalogSources, OrderedCatalog, capacity_for_width,
};
use emopick_core::gesture::{
    GestureConfig, GestureEvent, GestureStateMachine, HapticKind, PointerEvent,
};
use emopick_core::reconcile::diff;
use emopick_core::scale::{EdgeScaleModel, Span, neighbor_scale, pressed_scale};
use emopick_core::{ReactionItem, ReactionKey, SelectionSet};
use web_time::Instant;

use crate::overlay::{OverlayController, OverlayState};
use crate::slot::{AssetReadiness, EnterPhase, SlotPool};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Geometry and animation tuning for the strip.
#[derive(Debug, Clone)]
pub struct StripConfig {
    pub gesture: GestureConfig,
    pub edge: EdgeScaleModel,
    /// Horizontal space one item occupies (default: 34.0).
    pub item_pitch: f32,
    /// Total horizontal padding reserved by the capsule ends (default: 36.0).
    pub inset: f32,
    /// Pop-in duration per item (default: 400ms).
    pub enter_duration: Duration,
    /// Extra delay per successive item (default: 30ms).
    pub enter_stagger: Duration,
    /// Overshoot tension for the pop-in.
    pub overshoot_tension: f32,
    /// Vertical capsule inflation per unit of pull progress (default: 6.0).
    pub expand_unit: f32,
    /// Tail bubble radii, big and small (defaults: 8.0 and 4.0).
    pub bubble_radii: [f32; 2],
    /// Enter fraction below which the bubbles stay at zero scale
    /// (default: 0.25).
    pub bubble_clip: f32,
    /// Cap on items sourced from the popularity list (default: 16).
    pub max_top: usize,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            edge: EdgeScaleModel::default(),
            item_pitch: 34.0,
            inset: 36.0,
            enter_duration: Duration::from_millis(400),
            enter_stagger: Duration::from_millis(30),
            overshoot_tension: 1.004,
            expand_unit: 6.0,
            bubble_radii: [8.0, 4.0],
            bubble_clip: 0.25,
            max_top: 16,
        }
    }
}

/// Per-context capabilities supplied alongside the sources.
#[derive(Debug, Clone)]
pub struct ContextCaps {
    /// Available strip width in px.
    pub width: f32,
    /// Whether the full-picker hand-off exists in this context.
    pub expand_available: bool,
    /// Whether custom reactions may appear at all.
    pub allow_custom: bool,
    /// Tags contexts are tap-only: no press-and-hold confirmation.
    pub tags_mode: bool,
}

impl Default for ContextCaps {
    fn default() -> Self {
        Self {
            width: 300.0,
            expand_available: true,
            allow_custom: true,
            tags_mode: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Interaction outcomes the embedder reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum StripEvent {
    /// The user chose a reaction.
    Selected { item: ReactionItem, long_press: bool },
    /// Hand off to the full picker overlay (already transitioned to
    /// `Opening` internally).
    ExpandRequested,
    /// Fire a haptic pulse.
    Haptic(HapticKind),
}

/// One slot, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotVisual {
    pub key: ReactionKey,
    /// Unscaled center in strip coordinates.
    pub center_x: f32,
    pub scale: f32,
    pub translation_x: f32,
    pub alpha: f32,
    pub selected: bool,
    /// Draw above every other slot (the held item mid-confirmation).
    pub on_top: bool,
    /// Asset not ready; render the placeholder visual.
    pub placeholder: bool,
}

/// The peeking next-item affordance shown while pulling.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewVisual {
    pub key: ReactionKey,
    pub scale: f32,
}

/// One of the two capsule-tail bubbles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleVisual {
    pub radius: f32,
    pub scale: f32,
}

/// Scene snapshot for one frame. Plain data; no platform drawing here.
#[derive(Debug, Clone, PartialEq)]
pub struct StripFrame {
    pub slots: Vec<SlotVisual>,
    pub preview: Option<PreviewVisual>,
    pub bubbles: [BubbleVisual; 2],
    pub overlay_alpha: f32,
    /// False once the overlay crossfade passes its midpoint.
    pub strip_visible: bool,
    pub pull_offset: f32,
    /// Vertical capsule inflation from the pull.
    pub expand_offset: f32,
}

// ---------------------------------------------------------------------------
// PickerStrip
// ---------------------------------------------------------------------------

pub struct PickerStrip {
    config: StripConfig,
    caps: ContextCaps,
    catalog: OrderedCatalog,
    slots: SlotPool,
    gesture: GestureStateMachine,
    selection: SelectionSet,
    overlay: OverlayController,
    /// Drives the capsule-bubble pop; armed on the first frame.
    bubble_enter: Transition,
    scroll: f32,
}

impl std::fmt::Debug for PickerStrip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickerStrip")
            .field("items", &self.catalog.len())
            .field("scroll", &self.scroll)
            .field("overlay", &self.overlay.state())
            .finish()
    }
}

impl PickerStrip {
    #[must_use]
    pub fn new(config: StripConfig) -> Self {
        let gesture = GestureStateMachine::new(config.gesture.clone());
        let bubble_enter = Transition::new(config.enter_duration);
        Self {
            config,
            caps: ContextCaps::default(),
            catalog: OrderedCatalog::default(),
            slots: SlotPool::new(),
            gesture,
            selection: SelectionSet::new(),
            overlay: OverlayController::new(),
            bubble_enter,
            scroll: 0.0,
        }
    }

    // -- context ----------------------------------------------------------

    /// Rebuild the catalog for a new message context. Surviving items keep
    /// their slot state; a live press is implicitly cancelled.
    pub fn set_context(
        &mut self,
        sources: &CatalogSources,
        policy: &AvailabilityPolicy,
        caps: ContextCaps,
    ) {
        let _span = tracing::debug_span!("rebuild_context", width = caps.width).entered();

        let capacity = caps
            .expand_available
            .then(|| capacity_for_width(caps.width, self.config.item_pitch, self.config.inset));
        let catalog_config = CatalogConfig {
            capacity,
            allow_custom: caps.allow_custom,
            max_top: self.config.max_top,
        };
        let new_catalog = OrderedCatalog::build(sources, policy, &catalog_config);

        let patch = diff(self.catalog.entries(), new_catalog.entries());
        tracing::debug!(
            items = new_catalog.len(),
            ops = patch.len(),
            "catalog rebuilt"
        );
        self.slots.apply_patch(&patch);
        self.slots.mark_selected(&self.selection);

        self.gesture.notify_rebuild();
        self.gesture.set_tap_only(caps.tags_mode);
        self.gesture.set_pull_enabled(caps.expand_available);

        self.catalog = new_catalog;
        self.caps = caps;
        self.scroll = self.scroll.clamp(0.0, self.max_scroll());
    }

    /// Replace the highlighted-selection set. Repaint only; never animates
    /// or reorders.
    pub fn set_selection(&mut self, selection: SelectionSet) {
        self.selection = selection;
        self.slots.mark_selected(&self.selection);
    }

    /// Clear press, pull, scroll, and overlay without emitting anything.
    pub fn reset(&mut self) {
        self.gesture.reset();
        self.overlay.force_close();
        self.scroll = 0.0;
    }

    // -- input ------------------------------------------------------------

    /// Pointer down in strip coordinates. Hit-tests against unscaled slot
    /// bounds; misses are ignored.
    pub fn pointer_down(&mut self, x: f32, y: f32, now: Instant) -> Vec<StripEvent> {
        let Some(index) = self.hit_test(x) else {
            return Vec::new();
        };
        let Some(item) = self.catalog.get(index).cloned() else {
            return Vec::new();
        };
        let events = self
            .gesture
            .process(&PointerEvent::Down { item, index, x, y }, now);
        self.dispatch(events, now)
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, now: Instant) -> Vec<StripEvent> {
        let events = self.gesture.process(&PointerEvent::Move { x, y }, now);
        self.dispatch(events, now)
    }

    /// Pointer up: resolves the press (tap, grace confirm, or cancel) and
    /// releases any pull in the same call.
    pub fn pointer_up(&mut self, x: f32, y: f32, now: Instant) -> Vec<StripEvent> {
        let mut events = self.gesture.process(&PointerEvent::Up { x, y }, now);
        events.extend(self.gesture.release_pull(now));
        self.dispatch(events, now)
    }

    /// Pointer grab lost (scroll takeover, window losing focus).
    pub fn pointer_cancel(&mut self, now: Instant) -> Vec<StripEvent> {
        let mut events = self.gesture.process(&PointerEvent::Cancel, now);
        events.extend(self.gesture.release_pull(now));
        self.dispatch(events, now)
    }

    /// Scroll by `dx` px (positive toward the trailing edge). Consumes
    /// ordinary scrolling first; overscroll past the end feeds the pull.
    pub fn scroll_by(&mut self, dx: f32, now: Instant) -> Vec<StripEvent> {
        let events = if dx > 0.0 {
            let room = (self.max_scroll() - self.scroll).max(0.0);
            let used = dx.min(room);
            self.scroll += used;
            let over = dx - used;
            if over > 0.0 {
                let (_, events) = self.gesture.overscroll(over);
                events
            } else {
                Vec::new()
            }
        } else {
            // Drain the pull first; the remainder scrolls the list back.
            let (remainder, events) = self.gesture.overscroll(dx);
            self.scroll = (self.scroll + remainder).max(0.0);
            events
        };
        self.dispatch(events, now)
    }

    /// Dismiss the full-picker overlay and return to the inline strip.
    pub fn dismiss_overlay(&mut self, animated: bool, now: Instant) {
        self.overlay.dismiss(animated, now);
    }

    // -- frame ------------------------------------------------------------

    /// Advance all time-based state and snapshot the scene. Call once per
    /// frame; events resolved by the passage of time (confirmed holds,
    /// finished cancels) are returned alongside.
    pub fn frame(
        &mut self,
        now: Instant,
        assets: &dyn AssetReadiness,
    ) -> (StripFrame, Vec<StripEvent>) {
        let events = self.gesture.tick(now);
        let events = self.dispatch(events, now);
        self.overlay.tick(now);
        if !self.slots.is_empty() && self.bubble_enter.fraction(now) == 0.0 {
            self.bubble_enter.start(now);
        }
        self.slots.poll_assets(assets);
        self.update_visibility(now);

        (self.snapshot(now), events)
    }

    fn update_visibility(&mut self, now: Instant) {
        let viewport = Span::new(0.0, self.caps.width);
        let stagger = self.config.enter_stagger;
        // Stagger counts slots becoming visible in this pass only, so a
        // slot scrolling back in after churn still pops in promptly.
        let mut appearing = 0u32;
        for index in 0..self.slots.len() {
            let span = self.slot_span(index);
            let visible = span.overlap(&viewport) > 0.0;
            let Some(slot) = self.slots.get_mut(index) else {
                continue;
            };
            if visible {
                if slot.enter == EnterPhase::Hidden {
                    slot.begin_enter(now, stagger * appearing);
                    appearing += 1;
                }
            } else {
                // Off-screen slots replay their pop-in when they return.
                slot.enter = EnterPhase::Hidden;
            }
        }
    }

    fn snapshot(&mut self, now: Instant) -> StripFrame {
        let pull_progress = self.gesture.pull_progress();
        let press = self
            .gesture
            .press()
            .map(|p| (p.index, p.progress))
            .filter(|(_, progress)| *progress > 0.0);
        let viewport = Span::new(0.0, self.caps.width);
        let enter_duration = self.config.enter_duration;
        let tension = self.config.overshoot_tension;

        let mut visuals = Vec::with_capacity(self.slots.len());
        for index in 0..self.slots.len() {
            let span = self.slot_span(index);
            let center_x = span.start + span.len / 2.0;
            let edge = self.config.edge.scale_for(span, viewport);

            let slot = match self.slots.get_mut(index) {
                Some(slot) => slot,
                None => continue,
            };
            let enter = slot.enter_scale(now, enter_duration, tension);
            let alpha = enter.min(1.0);

            let (press_mult, on_top) = match press {
                Some((held, progress)) if held == index => (pressed_scale(progress), true),
                Some((_, progress)) => (neighbor_scale(progress), false),
                None => (1.0, false),
            };
            let scale = edge * enter * press_mult;

            let translation_x = match press {
                // The held item stays fully on screen as it grows.
                Some((held, _)) if held == index => {
                    let half = self.config.item_pitch * scale / 2.0;
                    let clamped = center_x.clamp(half, (self.caps.width - half).max(half));
                    clamped - center_x
                }
                // Neighbors give way, pushed away from the held item.
                Some((held, progress)) => {
                    let side = if index < held { -1.0 } else { 1.0 };
                    side * self.config.item_pitch * 0.5 * progress
                }
                None => 0.0,
            };

            visuals.push(SlotVisual {
                key: slot.item().key.clone(),
                center_x,
                scale,
                translation_x,
                alpha,
                selected: slot.selected,
                on_top,
                placeholder: !slot.asset_ready,
            });
        }

        let preview = (pull_progress > 0.0)
            .then(|| self.catalog.next_preview().cloned())
            .flatten()
            .map(|item| PreviewVisual {
                key: item.key,
                scale: pull_progress.min(1.0),
            });

        let clip = self.config.bubble_clip;
        let t = self.bubble_enter.fraction(now);
        let bubble_scale = (t.min(1.0).max(clip) - clip) / (1.0 - clip);
        let bubbles = [
            BubbleVisual {
                radius: self.config.bubble_radii[0],
                scale: bubble_scale,
            },
            BubbleVisual {
                radius: self.config.bubble_radii[1],
                scale: bubble_scale,
            },
        ];

        StripFrame {
            slots: visuals,
            preview,
            bubbles,
            overlay_alpha: self.overlay.alpha(now),
            strip_visible: !self.overlay.suppresses_strip(now),
            pull_offset: self.gesture.pull_offset(),
            expand_offset: self.config.expand_unit * pull_progress,
        }
    }

    // -- geometry ---------------------------------------------------------

    /// Unscaled extent of slot `index` in strip coordinates.
    fn slot_span(&self, index: usize) -> Span {
        Span::new(
            self.config.inset / 2.0 + self.config.item_pitch * index as f32 - self.scroll,
            self.config.item_pitch,
        )
    }

    fn hit_test(&self, x: f32) -> Option<usize> {
        let local = x + self.scroll - self.config.inset / 2.0;
        if local < 0.0 {
            return None;
        }
        let index = (local / self.config.item_pitch) as usize;
        (index < self.catalog.len()).then_some(index)
    }

    fn content_width(&self) -> f32 {
        self.config.inset + self.config.item_pitch * self.catalog.len() as f32
    }

    fn max_scroll(&self) -> f32 {
        (self.content_width() - self.caps.width).max(0.0)
    }

    // -- events -----------------------------------------------------------

    fn dispatch(&mut self, events: Vec<GestureEvent>, now: Instant) -> Vec<StripEvent> {
        events
            .into_iter()
            .map(|event| match event {
                GestureEvent::Selected { item, long_press } => {
                    StripEvent::Selected { item, long_press }
                }
                GestureEvent::ExpandRequested => {
                    self.overlay.open(now);
                    StripEvent::ExpandRequested
                }
                GestureEvent::Haptic(kind) => StripEvent::Haptic(kind),
            })
            .collect()
    }

    // -- accessors --------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &OrderedCatalog {
        &self.catalog
    }

    #[inline]
    #[must_use]
    pub fn overlay_state(&self) -> OverlayState {
        self.overlay.state()
    }

    #[inline]
    #[must_use]
    pub fn scroll_offset(&self) -> f32 {
        self.scroll
    }

    #[inline]
    #[must_use]
    pub fn pull_progress(&self) -> f32 {
        self.gesture.pull_progress()
    }
}
