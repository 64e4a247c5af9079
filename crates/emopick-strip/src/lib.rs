#![forbid(unsafe_code)]

//! Inline reaction picker container.
//!
//! Composes the `emopick-core` interaction engine into a stateful strip
//! widget: slot pool with patch-driven rebinds ([`slot`]), frame
//! orchestration and scene snapshots ([`strip`]), and the full-picker
//! overlay hand-off ([`overlay`]).
//!
//! The embedder feeds pointer and scroll input in strip-local px, calls
//! [`PickerStrip::frame`] once per frame, renders the returned
//! [`StripFrame`], and reacts to [`StripEvent`]s (selection callbacks,
//! haptics, the expand hand-off).

pub mod overlay;
pub mod slot;
pub mod strip;

pub use overlay::{OverlayController, OverlayState};
pub use slot::{AlwaysReady, AssetReadiness, EnterPhase, ItemSlot, SlotPool};
pub use strip::{
    BubbleVisual, ContextCaps, PickerStrip, PreviewVisual, SlotVisual, StripConfig, StripEvent,
    StripFrame,
};

// The core types flow through the public API; re-export them so embedders
// depend on one crate.
pub use emopick_core::{
    AvailabilityPolicy, CatalogConfig, CatalogSources, GestureConfig, HapticKind, OrderedCatalog,
    ReactionItem, ReactionKey, SelectionSet,
};
