//! Edge flipping when the requested edge lacks clearance

use tracing::debug;

use super::calculator::compute_against_anchor;
use crate::alignment::{Alignment, Edge};
use crate::geometry::{Rect, Size};

/// Offsets applied away from and along the anchor
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offsets {
    pub x: f64,
    pub y: f64,
}

impl Offsets {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Outcome of a placement attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub rect: Rect,
    /// The edge actually used, after any flip
    pub edge: Edge,
    pub flipped: bool,
}

/// Inputs shared by every placement attempt within one refresh
#[derive(Debug, Clone, Copy)]
pub struct FlipContext {
    /// Viewport size; its origin is (0, 0)
    pub viewport: Size,
    /// Bounds of the containing element
    pub containing: Rect,
    /// When true the viewport is the boundary, otherwise the containing bounds
    pub bleed: bool,
}

impl FlipContext {
    pub fn boundary(&self) -> Rect {
        if self.bleed {
            Rect::from_size(self.viewport)
        } else {
            self.containing
        }
    }
}

/// Room between an anchor side and the matching boundary side, less the offset
pub fn clearance(anchor: &Rect, boundary: &Rect, edge: Edge, offsets: Offsets) -> f64 {
    match edge {
        Edge::Top => anchor.top() - boundary.top() - offsets.y,
        Edge::Bottom => boundary.bottom() - anchor.bottom() - offsets.y,
        Edge::Left => anchor.left() - boundary.left() - offsets.x,
        Edge::Right => boundary.right() - anchor.right() - offsets.x,
        Edge::Center => f64::INFINITY,
    }
}

/// Place against the anchor, flipping to the mirrored edge at most once.
///
/// A flip happens only when the overlay does not fit on the requested edge,
/// the mirrored edge has strictly more room, and the overlay fits there.
/// When neither side fits the original placement is returned unchanged.
pub fn place_with_flip(
    anchor: &Rect,
    overlay: Size,
    alignment: &Alignment,
    offsets: Offsets,
    context: &FlipContext,
) -> Placement {
    let edge = alignment.edge();
    let original = Placement {
        rect: compute_against_anchor(anchor, overlay, alignment, offsets.x, offsets.y),
        edge,
        flipped: false,
    };

    let Some(axis) = edge.axis() else {
        return original;
    };

    let boundary = context.boundary();
    let extent = overlay.along(axis);
    let here = clearance(anchor, &boundary, edge, offsets);
    let mirror = edge.mirror();
    let there = clearance(anchor, &boundary, mirror, offsets);

    if extent <= here {
        return original;
    }
    if there > here && extent <= there {
        debug!(
            from = %edge,
            to = %mirror,
            extent,
            clearance = here,
            mirrored_clearance = there,
            "flipping overlay edge"
        );
        let flipped = alignment.with_edge(mirror);
        return Placement {
            rect: compute_against_anchor(anchor, overlay, &flipped, offsets.x, offsets.y),
            edge: mirror,
            flipped: true,
        };
    }

    debug!(
        edge = %edge,
        extent,
        clearance = here,
        mirrored_clearance = there,
        "no edge fits, keeping requested edge"
    );
    original
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn context(width: f64, height: f64) -> FlipContext {
        FlipContext {
            viewport: Size::new(width, height),
            containing: Rect::new(0.0, 0.0, width, height),
            bleed: false,
        }
    }

    #[test]
    fn test_fits_without_flip() {
        let anchor = Rect::new(100.0, 100.0, 50.0, 20.0);
        let p = place_with_flip(
            &anchor,
            Size::new(30.0, 10.0),
            &Alignment::parse("bottom"),
            Offsets::default(),
            &context(800.0, 600.0),
        );
        assert!(!p.flipped);
        assert_eq!(p.edge, Edge::Bottom);
        assert_eq!(p.rect, Rect::new(110.0, 120.0, 30.0, 10.0));
    }

    #[test]
    fn test_flips_to_top_near_bottom_of_viewport() {
        let anchor = Rect::new(50.0, 175.0, 40.0, 20.0);
        assert_eq!(anchor.bottom(), 195.0);
        let p = place_with_flip(
            &anchor,
            Size::new(60.0, 40.0),
            &Alignment::parse("bottom"),
            Offsets::default(),
            &context(400.0, 200.0),
        );
        assert!(p.flipped);
        assert_eq!(p.edge, Edge::Top);
        assert_eq!(p.rect.bottom(), 175.0);
    }

    #[test]
    fn test_no_flip_when_neither_side_fits() {
        let anchor = Rect::new(0.0, 20.0, 40.0, 60.0);
        let alignment = Alignment::parse("bottom");
        let overlay = Size::new(40.0, 50.0);
        let p = place_with_flip(&anchor, overlay, &alignment, Offsets::default(), &context(200.0, 100.0));
        assert!(!p.flipped);
        assert_eq!(p.edge, Edge::Bottom);
        assert_eq!(p.rect, compute_against_anchor(&anchor, overlay, &alignment, 0.0, 0.0));
    }

    #[test]
    fn test_no_flip_when_mirror_has_less_room() {
        // 10px below, 5px above: neither fits and the mirror is worse
        let anchor = Rect::new(0.0, 5.0, 10.0, 85.0);
        let p = place_with_flip(
            &anchor,
            Size::new(10.0, 30.0),
            &Alignment::parse("bottom"),
            Offsets::default(),
            &context(100.0, 100.0),
        );
        assert!(!p.flipped);
    }

    #[test]
    fn test_flip_right_to_left() {
        let anchor = Rect::new(750.0, 100.0, 20.0, 20.0);
        let p = place_with_flip(
            &anchor,
            Size::new(100.0, 40.0),
            &Alignment::parse("right"),
            Offsets::default(),
            &context(800.0, 600.0),
        );
        assert!(p.flipped);
        assert_eq!(p.edge, Edge::Left);
        assert_eq!(p.rect.right(), 750.0);
    }

    #[test]
    fn test_offset_reduces_clearance() {
        // 45px below the anchor, overlay 40px tall, but a 10px offset
        let anchor = Rect::new(0.0, 100.0, 10.0, 55.0);
        let p = place_with_flip(
            &anchor,
            Size::new(10.0, 40.0),
            &Alignment::parse("bottom"),
            Offsets::new(0.0, 10.0),
            &context(100.0, 200.0),
        );
        assert!(p.flipped);
        assert_eq!(p.rect.bottom(), 90.0);
    }

    #[test]
    fn test_bleed_measures_against_viewport() {
        let anchor = Rect::new(10.0, 60.0, 20.0, 20.0);
        let overlay = Size::new(20.0, 30.0);
        let mut ctx = FlipContext {
            viewport: Size::new(200.0, 400.0),
            containing: Rect::new(0.0, 0.0, 200.0, 100.0),
            bleed: false,
        };
        let alignment = Alignment::parse("bottom");
        let contained = place_with_flip(&anchor, overlay, &alignment, Offsets::default(), &ctx);
        assert!(contained.flipped);

        ctx.bleed = true;
        let bled = place_with_flip(&anchor, overlay, &alignment, Offsets::default(), &ctx);
        assert!(!bled.flipped);
    }

    #[test]
    fn test_center_edge_never_flips() {
        let anchor = Rect::new(0.0, 0.0, 10.0, 10.0);
        let p = place_with_flip(
            &anchor,
            Size::new(500.0, 500.0),
            &Alignment::centered(),
            Offsets::default(),
            &context(100.0, 100.0),
        );
        assert!(!p.flipped);
        assert_eq!(p.edge, Edge::Center);
    }
}
