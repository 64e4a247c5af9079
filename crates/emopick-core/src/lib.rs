#![forbid(unsafe_code)]

//! Interaction engine for an inline reaction picker.
//!
//! This crate holds the pure, render-agnostic pieces: reaction identities
//! and catalogs ([`catalog`]), animated list reconciliation ([`reconcile`]),
//! the press/pull gesture state machine ([`gesture`]), the decorative edge
//! scale model ([`scale`]), and the small animation primitives everything
//! else ticks with ([`animation`]).
//!
//! The companion `emopick-strip` crate composes these into the actual
//! picker container.

pub mod animation;
pub mod catalog;
pub mod gesture;
pub mod item;
pub mod reconcile;
pub mod scale;

pub use animation::Transition;
pub use catalog::{
    AvailabilityPolicy, CatalogConfig, CatalogSources, OrderedCatalog, capacity_for_width,
};
pub use gesture::{
    GestureConfig, GestureEvent, GestureStateMachine, HapticKind, PointerEvent, PressPhase,
    PressState,
};
pub use item::{ReactionItem, ReactionKey, SelectionSet};
pub use reconcile::{Patch, PatchOp, apply, diff};
pub use scale::{EdgeScaleModel, Span, neighbor_scale, pressed_scale};
