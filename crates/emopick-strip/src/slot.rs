#![forbid(unsafe_code)]

//! Slot pool: per-item presentation state that survives catalog rebuilds.
//!
//! A slot binds one catalog item plus the transient state a renderer needs
//! (selection highlight, enter animation phase, asset readiness). The pool
//! replays reconciler patches so surviving items keep their in-flight
//! animation instead of restarting on every rebuild.
//!
//! # Invariants
//!
//! 1. After `apply_patch(diff(old, new))`, slot items equal `new` in order.
//! 2. Rebinding a slot to the item it already holds is a no-op.
//! 3. Moves carry slot state; inserts get fresh slots.

use std::time::Duration;

use emopick_core::animation::{self, Transition};
use emopick_core::reconcile::{Patch, PatchOp};
use emopick_core::{ReactionItem, ReactionKey};
use web_time::Instant;

/// Asset availability seam. The embedder decides what "ready" means
/// (texture decoded, emoji font loaded); the pool only polls, never waits.
pub trait AssetReadiness {
    fn is_ready(&self, key: &ReactionKey) -> bool;
}

/// Everything is always ready. Useful for standard-emoji-only contexts
/// and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReady;

impl AssetReadiness for AlwaysReady {
    fn is_ready(&self, _key: &ReactionKey) -> bool {
        true
    }
}

/// Where a slot is in its pop-in animation.
#[derive(Debug, Clone, PartialEq)]
pub enum EnterPhase {
    /// Not yet visible; renders at zero scale.
    Hidden,
    /// Playing the staggered pop-in.
    Entering { started: Instant, delay: Duration },
    /// Fully entered.
    Shown,
}

/// One bound item plus its transient presentation state.
#[derive(Debug, Clone)]
pub struct ItemSlot {
    item: ReactionItem,
    pub selected: bool,
    pub enter: EnterPhase,
    pub asset_ready: bool,
}

impl ItemSlot {
    fn fresh(item: ReactionItem) -> Self {
        Self {
            item,
            selected: false,
            enter: EnterPhase::Hidden,
            asset_ready: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn item(&self) -> &ReactionItem {
        &self.item
    }

    /// Rebind to `item`. Binding the same item keeps all transient state
    /// (an in-flight enter animation survives); a different item resets it.
    pub fn bind(&mut self, item: ReactionItem) {
        if self.item == item {
            return;
        }
        *self = Self::fresh(item);
    }

    /// Begin the pop-in unless it already ran or is running.
    pub fn begin_enter(&mut self, now: Instant, delay: Duration) {
        if self.enter == EnterPhase::Hidden {
            self.enter = EnterPhase::Entering {
                started: now,
                delay,
            };
        }
    }

    /// Scale fraction of the pop-in with overshoot applied, promoting the
    /// phase to `Shown` when done.
    pub fn enter_scale(&mut self, now: Instant, duration: Duration, tension: f32) -> f32 {
        match self.enter {
            EnterPhase::Hidden => 0.0,
            EnterPhase::Shown => 1.0,
            EnterPhase::Entering { started, delay } => {
                let mut tr = Transition::new(duration);
                tr.start(started);
                let t = tr.staggered_fraction(now, delay);
                if t >= 1.0 {
                    self.enter = EnterPhase::Shown;
                    return 1.0;
                }
                animation::overshoot(t, tension)
            }
        }
    }
}

/// Ordered slots mirroring the catalog, patched rather than rebuilt.
#[derive(Debug, Clone, Default)]
pub struct SlotPool {
    slots: Vec<ItemSlot>,
}

impl SlotPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay a reconciler patch. Op indices are positional at application
    /// time, matching `emopick_core::reconcile::apply`.
    pub fn apply_patch(&mut self, patch: &Patch) {
        for op in patch.ops() {
            match op {
                PatchOp::Remove { index } => {
                    if *index < self.slots.len() {
                        self.slots.remove(*index);
                    }
                }
                PatchOp::Insert { index, item } => {
                    let index = (*index).min(self.slots.len());
                    self.slots.insert(index, ItemSlot::fresh(item.clone()));
                }
                PatchOp::Move { from, to } => {
                    if *from < self.slots.len() {
                        let slot = self.slots.remove(*from);
                        let to = (*to).min(self.slots.len());
                        self.slots.insert(to, slot);
                    }
                }
            }
        }
    }

    /// Update every slot's readiness flag from the embedder's seam.
    pub fn poll_assets(&mut self, assets: &dyn AssetReadiness) {
        for slot in &mut self.slots {
            slot.asset_ready = assets.is_ready(&slot.item.key);
        }
    }

    /// Repaint selection highlights from the authoritative set.
    pub fn mark_selected(&mut self, selected: &emopick_core::SelectionSet) {
        for slot in &mut self.slots {
            slot.selected = selected.contains(&slot.item.key);
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ItemSlot> {
        self.slots.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut ItemSlot> {
        self.slots.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemSlot> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ItemSlot> {
        self.slots.iter_mut()
    }

    #[cfg(test)]
    fn items(&self) -> Vec<ReactionItem> {
        self.slots.iter().map(|s| s.item.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emopick_core::reconcile::diff;

    fn item(sym: &str) -> ReactionItem {
        ReactionItem::new(ReactionKey::standard(sym))
    }

    fn list(syms: &[&str]) -> Vec<ReactionItem> {
        syms.iter().map(|s| item(s)).collect()
    }

    fn pool_of(syms: &[&str]) -> SlotPool {
        let mut pool = SlotPool::new();
        pool.apply_patch(&diff(&[], &list(syms)));
        pool
    }

    #[test]
    fn patch_replay_matches_target_list() {
        let old = list(&["A", "B", "C", "D"]);
        let new = list(&["B", "D", "A", "E"]);
        let mut pool = pool_of(&["A", "B", "C", "D"]);
        pool.apply_patch(&diff(&old, &new));
        assert_eq!(pool.items(), new);
    }

    #[test]
    fn surviving_slot_keeps_state_across_move() {
        let old = list(&["A", "B", "C"]);
        let new = list(&["C", "A", "B"]);
        let mut pool = pool_of(&["A", "B", "C"]);
        pool.get_mut(2).unwrap().selected = true; // C

        pool.apply_patch(&diff(&old, &new));
        assert_eq!(pool.items(), new);
        assert!(pool.get(0).unwrap().selected, "C carried its state");
        assert!(!pool.get(1).unwrap().selected);
    }

    #[test]
    fn inserted_slot_is_fresh() {
        let old = list(&["A", "B"]);
        let new = list(&["A", "X", "B"]);
        let mut pool = pool_of(&["A", "B"]);
        pool.get_mut(0).unwrap().enter = EnterPhase::Shown;

        pool.apply_patch(&diff(&old, &new));
        assert_eq!(pool.get(1).unwrap().enter, EnterPhase::Hidden);
        assert_eq!(pool.get(0).unwrap().enter, EnterPhase::Shown);
    }

    #[test]
    fn rebind_same_item_preserves_transient_state() {
        let mut slot = ItemSlot::fresh(item("A"));
        slot.selected = true;
        slot.enter = EnterPhase::Shown;
        slot.bind(item("A"));
        assert!(slot.selected);
        assert_eq!(slot.enter, EnterPhase::Shown);
    }

    #[test]
    fn rebind_new_item_resets_transient_state() {
        let mut slot = ItemSlot::fresh(item("A"));
        slot.selected = true;
        slot.enter = EnterPhase::Shown;
        slot.bind(item("B"));
        assert!(!slot.selected);
        assert_eq!(slot.enter, EnterPhase::Hidden);
        assert_eq!(slot.item(), &item("B"));
    }

    #[test]
    fn locked_variant_rebinds_without_reset() {
        // Identity is the key alone, so toggling `locked` is the same item.
        let mut slot = ItemSlot::fresh(item("A"));
        slot.selected = true;
        slot.bind(item("A").locked());
        assert!(slot.selected);
    }

    #[test]
    fn enter_scale_promotes_to_shown() {
        let t = Instant::now();
        let mut slot = ItemSlot::fresh(item("A"));
        slot.begin_enter(t, Duration::from_millis(30));
        assert_eq!(
            slot.enter_scale(t, Duration::from_millis(400), 1.004),
            0.0,
            "still inside the stagger delay"
        );
        let s = slot.enter_scale(t + Duration::from_millis(230), Duration::from_millis(400), 1.004);
        assert!(s > 0.0 && s < 1.2);
        let s = slot.enter_scale(t + Duration::from_secs(2), Duration::from_millis(400), 1.004);
        assert_eq!(s, 1.0);
        assert_eq!(slot.enter, EnterPhase::Shown);
    }

    #[test]
    fn begin_enter_does_not_restart() {
        let t = Instant::now();
        let mut slot = ItemSlot::fresh(item("A"));
        slot.begin_enter(t, Duration::ZERO);
        let first = slot.enter.clone();
        slot.begin_enter(t + Duration::from_millis(100), Duration::ZERO);
        assert_eq!(slot.enter, first);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn arb_list() -> impl Strategy<Value = Vec<ReactionItem>> {
            proptest::collection::vec(0u8..12, 0..12).prop_map(|ids| {
                let mut seen = std::collections::BTreeSet::new();
                ids.into_iter()
                    .filter(|id| seen.insert(*id))
                    .map(|id| ReactionItem::new(ReactionKey::custom(u64::from(id))))
                    .collect()
            })
        }

        proptest! {
            /// Replaying the diff of each successive rebuild keeps the
            /// pool in lockstep with the catalog, whatever the sequence.
            #[test]
            fn pool_tracks_any_rebuild_sequence(
                lists in proptest::collection::vec(arb_list(), 1..8),
            ) {
                let mut pool = SlotPool::new();
                let mut prev: Vec<ReactionItem> = Vec::new();
                for next in lists {
                    pool.apply_patch(&diff(&prev, &next));
                    prop_assert_eq!(pool.items(), next.clone());
                    prev = next;
                }
            }
        }
    }

    #[test]
    fn poll_assets_flags_unready_slots() {
        struct OnlyStandard;
        impl AssetReadiness for OnlyStandard {
            fn is_ready(&self, key: &ReactionKey) -> bool {
                !key.is_custom()
            }
        }

        let mut pool = SlotPool::new();
        let target = vec![item("A"), ReactionItem::new(ReactionKey::custom(7))];
        pool.apply_patch(&diff(&[], &target));
        pool.poll_assets(&OnlyStandard);
        assert!(pool.get(0).unwrap().asset_ready);
        assert!(!pool.get(1).unwrap().asset_ready);
    }
}
