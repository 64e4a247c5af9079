#![forbid(unsafe_code)]

//! Animated list reconciliation.
//!
//! [`diff`] compares two ordered catalogs and produces a [`Patch`] of
//! remove / insert / move operations such that unchanged items are neither
//! removed nor reinserted — their slots (and any in-flight enter/loop
//! animation) survive the rebuild.
//!
//! Ops are positional and applied sequentially, in patch order:
//!
//! - [`PatchOp::Remove`] indexes the list as it stands when the op runs
//!   (removes are emitted in descending index order, so they may equally be
//!   read against the old list).
//! - [`PatchOp::Insert`] and [`PatchOp::Move`] index the emerging list;
//!   `Move` removes from `from` and reinserts at `to`.
//!
//! [`apply`] is the executable definition of these semantics and guarantees
//! `apply(old, &diff(old, new)) == new`.
//!
//! # Invariants
//!
//! 1. `diff(x, x)` is empty.
//! 2. Items present in both lists appear in no `Remove` or `Insert` op.
//! 3. Moves are minimized via a longest-increasing-subsequence over the
//!    surviving items' target positions: O(n log n) for the scan, with a
//!    linear position lookup per emitted move (n is bounded by the picker
//!    capacity, ≤ ~20).
//!
//! # Failure Modes
//!
//! - Duplicate identities in an input list: first occurrence wins in the
//!   index map; the output still applies cleanly because catalogs are
//!   deduplicated upstream (catalog build guarantees uniqueness).

use ahash::AHashMap;

use crate::item::ReactionItem;

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

/// A single reconciliation operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOp {
    /// Remove the item at `index`.
    Remove { index: usize },
    /// Insert `item` at `index`.
    Insert { index: usize, item: ReactionItem },
    /// Relocate the item at `from` to `to`.
    Move { from: usize, to: usize },
}

/// Ordered list of operations transforming the old list into the new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    ops: Vec<PatchOp>,
}

impl Patch {
    #[inline]
    #[must_use]
    pub fn ops(&self) -> &[PatchOp] {
        &self.ops
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// Compute the minimal patch from `old` to `new`.
#[must_use]
pub fn diff(old: &[ReactionItem], new: &[ReactionItem]) -> Patch {
    let mut ops = Vec::new();

    let new_index: AHashMap<&ReactionItem, usize> = new
        .iter()
        .enumerate()
        .map(|(i, item)| (item, i))
        .collect();
    let old_set: AHashMap<&ReactionItem, usize> = old
        .iter()
        .enumerate()
        .map(|(i, item)| (item, i))
        .collect();

    // Removes, descending so earlier indices stay valid.
    for (i, item) in old.iter().enumerate().rev() {
        if !new_index.contains_key(item) {
            ops.push(PatchOp::Remove { index: i });
        }
    }

    // Survivors in old order, by their target position in `new`. The LIS of
    // those target positions is the set of items that stay put; everything
    // else is placed explicitly.
    let mut work: Vec<&ReactionItem> = old
        .iter()
        .filter(|item| new_index.contains_key(*item))
        .collect();
    let targets: Vec<usize> = work.iter().map(|item| new_index[*item]).collect();
    let stable = lis_membership(&targets);

    // Walk the new list right-to-left, placing each non-stable item
    // immediately before its (already final) right neighbor. Right-to-left
    // placement means every emitted index is final when the op runs.
    for ti in (0..new.len()).rev() {
        let item = &new[ti];
        let anchor = new.get(ti + 1);
        let anchor_pos = |work: &[&ReactionItem]| {
            anchor.map_or(work.len(), |a| {
                work.iter()
                    .position(|w| *w == a)
                    .expect("anchor already placed")
            })
        };
        if !old_set.contains_key(item) {
            let index = anchor_pos(&work);
            ops.push(PatchOp::Insert {
                index,
                item: item.clone(),
            });
            work.insert(index, item);
        } else if !stable.contains(&ti) {
            let from = work
                .iter()
                .position(|w| *w == item)
                .expect("survivor present in working list");
            let moved = work.remove(from);
            let to = anchor_pos(&work);
            work.insert(to, moved);
            if to != from {
                ops.push(PatchOp::Move { from, to });
            }
        }
    }

    Patch { ops }
}

/// Replay a patch against `old`.
#[must_use]
pub fn apply(old: &[ReactionItem], patch: &Patch) -> Vec<ReactionItem> {
    let mut list: Vec<ReactionItem> = old.to_vec();
    for op in patch.ops() {
        match op {
            PatchOp::Remove { index } => {
                list.remove(*index);
            }
            PatchOp::Insert { index, item } => {
                list.insert(*index, item.clone());
            }
            PatchOp::Move { from, to } => {
                let item = list.remove(*from);
                list.insert(*to, item);
            }
        }
    }
    list
}

/// Values of `seq` that belong to one longest strictly-increasing
/// subsequence (patience algorithm, O(n log n)).
fn lis_membership(seq: &[usize]) -> ahash::AHashSet<usize> {
    let n = seq.len();
    let mut tails: Vec<usize> = Vec::with_capacity(n); // indices into seq
    let mut prev: Vec<Option<usize>> = vec![None; n];

    for i in 0..n {
        let pos = tails.partition_point(|&t| seq[t] < seq[i]);
        if pos > 0 {
            prev[i] = Some(tails[pos - 1]);
        }
        if pos == tails.len() {
            tails.push(i);
        } else {
            tails[pos] = i;
        }
    }

    let mut members = ahash::AHashSet::new();
    let mut cur = tails.last().copied();
    while let Some(i) = cur {
        members.insert(seq[i]);
        cur = prev[i];
    }
    members
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
