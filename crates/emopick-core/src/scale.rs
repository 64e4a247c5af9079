#![forbid(unsafe_code)]

//! Decorative scale math for the strip.
//!
//! The edge-scale model shrinks partially-clipped items toward a floor so
//! the strip reads as a rounded capsule; the press-scale helpers grow the
//! held item and shrink its neighbors. All of this is presentation only:
//! hit testing always uses unscaled bounds.

/// A half-open horizontal extent in strip-local px.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: f32,
    pub len: f32,
}

impl Span {
    #[must_use]
    pub fn new(start: f32, len: f32) -> Self {
        Self { start, len }
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> f32 {
        self.start + self.len
    }

    /// Length of the overlap with `other`, zero when disjoint.
    #[must_use]
    pub fn overlap(&self, other: &Span) -> f32 {
        (self.end().min(other.end()) - self.start.max(other.start)).max(0.0)
    }
}

/// Scales edge items down in proportion to how clipped they are.
#[derive(Debug, Clone, Copy)]
pub struct EdgeScaleModel {
    /// Scale of a fully-clipped item (default: 0.6).
    pub floor: f32,
}

impl Default for EdgeScaleModel {
    fn default() -> Self {
        Self { floor: 0.6 }
    }
}

impl EdgeScaleModel {
    /// Scale for an item occupying `item` within `viewport`: 1.0 when fully
    /// visible, `floor` when fully clipped, linear in the visible fraction
    /// between. Degenerate (zero-width) items are left at 1.0.
    #[must_use]
    pub fn scale_for(&self, item: Span, viewport: Span) -> f32 {
        if item.len <= 0.0 {
            return 1.0;
        }
        let visible = item.overlap(&viewport) / item.len;
        (self.floor + (1.0 - self.floor) * visible).clamp(self.floor, 1.0)
    }
}

/// Scale of the held item during the confirm fill, capped so a full fill
/// stays inside reasonable bounds.
#[inline]
#[must_use]
pub fn pressed_scale(progress: f32) -> f32 {
    (1.0 + 2.0 * progress.clamp(0.0, 1.0)).min(3.0)
}

/// Scale of every non-held item while another item is being confirmed.
#[inline]
#[must_use]
pub fn neighbor_scale(progress: f32) -> f32 {
    1.0 - 0.15 * progress.clamp(0.0, 1.0)
}
