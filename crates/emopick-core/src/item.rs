#![forbid(unsafe_code)]

//! Reaction identities and the externally-owned selection set.
//!
//! A [`ReactionKey`] is the stable identity of a reaction: either a standard
//! symbol reaction or a custom animated asset. [`ReactionItem`] pairs a key
//! with presentation metadata (currently just the `locked` flag for
//! premium-gated reactions). Equality and hashing go through the key only,
//! so two items that differ in metadata still reconcile as the same item.
//!
//! # Invariants
//!
//! 1. `ReactionItem` equality/hashing is identity-only (tag + key).
//! 2. Items are immutable once constructed.
//! 3. [`SelectionSet`] is owned and mutated by the embedder; the engine only
//!    reads it to paint selected state.

use ahash::AHashSet;

// ---------------------------------------------------------------------------
// ReactionKey
// ---------------------------------------------------------------------------

/// Stable identity of a reaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReactionKey {
    /// A standard reaction addressed by its symbol (e.g. an emoji string).
    Standard { symbol: String },
    /// A custom reaction addressed by the id of its animated asset.
    Custom { asset_id: u64 },
}

impl ReactionKey {
    /// Standard reaction from a symbol.
    #[must_use]
    pub fn standard(symbol: impl Into<String>) -> Self {
        Self::Standard {
            symbol: symbol.into(),
        }
    }

    /// Custom reaction from an asset id.
    #[must_use]
    pub fn custom(asset_id: u64) -> Self {
        Self::Custom { asset_id }
    }

    /// Whether this is a custom (non-symbol) reaction.
    #[inline]
    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom { .. })
    }
}

// ---------------------------------------------------------------------------
// ReactionItem
// ---------------------------------------------------------------------------

/// A selectable reaction: identity plus catalog metadata.
///
/// `locked` marks a reaction that needs a premium capability to send. Locked
/// items still appear in the catalog (a peek at what upgrading
/// unlocks) but never arm the long-press recognizer.
#[derive(Debug, Clone)]
pub struct ReactionItem {
    pub key: ReactionKey,
    pub locked: bool,
}

impl ReactionItem {
    #[must_use]
    pub fn new(key: ReactionKey) -> Self {
        Self { key, locked: false }
    }

    /// Same item, marked as premium-locked.
    #[must_use]
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }
}

// Identity is the key alone; `locked` is presentation metadata.
impl PartialEq for ReactionItem {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ReactionItem {}

impl std::hash::Hash for ReactionItem {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

// ---------------------------------------------------------------------------
// SelectionSet
// ---------------------------------------------------------------------------

/// The set of reaction identities currently chosen on the active message.
///
/// Externally supplied and externally mutated; the engine treats it as a
/// read-only input when painting selected state.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    keys: AHashSet<ReactionKey>,
}

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ReactionKey) -> bool {
        self.keys.insert(key)
    }

    pub fn remove(&mut self, key: &ReactionKey) -> bool {
        self.keys.remove(key)
    }

    #[must_use]
    pub fn contains(&self, key: &ReactionKey) -> bool {
        self.keys.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

impl FromIterator<ReactionKey> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = ReactionKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_ignores_locked_flag() {
        let a = ReactionItem::new(ReactionKey::standard("❤"));
        let b = ReactionItem::new(ReactionKey::standard("❤")).locked();
        assert_eq!(a, b);

        let mut set = AHashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn standard_and_custom_are_distinct() {
        let a = ReactionItem::new(ReactionKey::standard("👍"));
        let b = ReactionItem::new(ReactionKey::custom(42));
        assert_ne!(a, b);
        assert!(b.key.is_custom());
        assert!(!a.key.is_custom());
    }

    #[test]
    fn selection_set_round_trip() {
        let mut sel = SelectionSet::new();
        assert!(sel.is_empty());
        assert!(sel.insert(ReactionKey::standard("🔥")));
        assert!(!sel.insert(ReactionKey::standard("🔥")));
        assert!(sel.contains(&ReactionKey::standard("🔥")));
        assert_eq!(sel.len(), 1);
        assert!(sel.remove(&ReactionKey::standard("🔥")));
        assert!(sel.is_empty());
    }

    #[test]
    fn selection_set_from_iter() {
        let sel: SelectionSet = [ReactionKey::custom(1), ReactionKey::custom(2)]
            .into_iter()
            .collect();
        assert_eq!(sel.len(), 2);
        assert!(sel.contains(&ReactionKey::custom(1)));
    }
}
