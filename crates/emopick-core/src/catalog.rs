#![forbid(unsafe_code)]

//! Ordered reaction catalog construction.
//!
//! [`OrderedCatalog::build`] merges four source lists (tag reactions, top
//! reactions, recent reactions, and the fallback default set) into one
//! deduplicated, display-ordered list, honoring an availability policy and
//! an optional capacity.
//!
//! # Invariants
//!
//! 1. Output items are unique by identity (first-seen wins; the first
//!    occurrence also fixes display position).
//! 2. Output is deterministic for identical inputs — `build` is idempotent.
//! 3. Capacity truncation happens only when the full-picker escape hatch
//!    exists (`config.capacity` is `Some`); otherwise the complete
//!    deduplicated set is returned unbounded.
//! 4. When truncating, the first excluded item is remembered as
//!    `next_preview` (the peeking affordance shown during the pull gesture).
//! 5. The catalog is immutable after build; context changes replace it
//!    wholesale and the reconciler diffs old vs. new.
//!
//! # Failure Modes
//!
//! - Empty sources: empty catalog, no preview.
//! - Capacity of zero: clamped to 1 (a picker with no items is useless and
//!   the width heuristic never produces 0).

use ahash::AHashSet;

use crate::item::ReactionItem;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The four source lists, in priority order of their fields.
#[derive(Debug, Clone, Default)]
pub struct CatalogSources {
    /// Saved/tag reactions (highest priority, e.g. story tag context).
    pub tag: Vec<ReactionItem>,
    /// Top reactions ranked by global usage.
    pub top: Vec<ReactionItem>,
    /// The user's recent reactions.
    pub recent: Vec<ReactionItem>,
    /// Default reaction set, used to pad out the tail.
    pub fallback: Vec<ReactionItem>,
}

/// Which reactions the surrounding context permits.
#[derive(Debug, Clone)]
pub enum AvailabilityPolicy {
    /// Every reaction is permitted; all four sources are consulted.
    AllPermitted,
    /// Only the listed reactions are permitted (already bounded); no other
    /// source is consulted.
    AllowList(Vec<ReactionItem>),
}

/// Build-time knobs.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Display capacity. `Some` means the full-picker escape hatch exists
    /// and the inline strip truncates to this many items; `None` means the
    /// complete set is shown inline (default: `None`).
    pub capacity: Option<usize>,
    /// Whether custom (non-symbol) reactions are allowed at all. When
    /// false they are filtered out before merging (default: true).
    pub allow_custom: bool,
    /// Cap on items accepted from the top-reactions source (default: 16).
    pub max_top: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            capacity: None,
            allow_custom: true,
            max_top: 16,
        }
    }
}

/// Inline capacity derived from available display width.
///
/// `inset` is the horizontal space reserved for padding and the expand
/// affordance. Clamped to `1..=7` regardless of width.
#[must_use]
pub fn capacity_for_width(width: f32, item_pitch: f32, inset: f32) -> usize {
    if item_pitch <= 0.0 {
        return 1;
    }
    let n = ((width - inset) / item_pitch).floor();
    if n.is_nan() {
        return 1;
    }
    (n as isize).clamp(1, 7) as usize
}

// ---------------------------------------------------------------------------
// OrderedCatalog
// ---------------------------------------------------------------------------

/// Deduplicated, display-ordered reaction list. Replaced wholesale on every
/// context change; never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct OrderedCatalog {
    entries: Vec<ReactionItem>,
    next_preview: Option<ReactionItem>,
}

impl OrderedCatalog {
    /// Build a catalog from sources under a policy.
    #[must_use]
    pub fn build(
        sources: &CatalogSources,
        policy: &AvailabilityPolicy,
        config: &CatalogConfig,
    ) -> Self {
        let mut entries = Vec::new();
        let mut seen: AHashSet<&ReactionItem> = AHashSet::new();

        let permitted = |item: &ReactionItem| config.allow_custom || !item.key.is_custom();

        match policy {
            AvailabilityPolicy::AllowList(list) => {
                // Already bounded: emit the allow-list only, deduplicated.
                for item in list {
                    if permitted(item) && seen.insert(item) {
                        entries.push(item.clone());
                    }
                }
                return Self {
                    entries,
                    next_preview: None,
                };
            }
            AvailabilityPolicy::AllPermitted => {
                for item in &sources.tag {
                    if permitted(item) && seen.insert(item) {
                        entries.push(item.clone());
                    }
                }
                let mut from_top = 0usize;
                for item in &sources.top {
                    if from_top >= config.max_top {
                        break;
                    }
                    if permitted(item) && seen.insert(item) {
                        entries.push(item.clone());
                        from_top += 1;
                    }
                }
                for item in sources.recent.iter().chain(&sources.fallback) {
                    if permitted(item) && seen.insert(item) {
                        entries.push(item.clone());
                    }
                }
            }
        }

        let mut next_preview = None;
        if let Some(cap) = config.capacity {
            let cap = cap.max(1);
            if entries.len() > cap {
                next_preview = Some(entries[cap].clone());
                entries.truncate(cap);
            }
        }

        Self {
            entries,
            next_preview,
        }
    }

    /// The ordered entries.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[ReactionItem] {
        &self.entries
    }

    /// First item excluded by capacity truncation, if any.
    #[inline]
    #[must_use]
    pub fn next_preview(&self) -> Option<&ReactionItem> {
        self.next_preview.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, if in range.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ReactionItem> {
        self.entries.get(index)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
