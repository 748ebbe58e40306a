//! Nudging a rectangle back inside the viewport

use tracing::trace;

use crate::geometry::Rect;

/// Shift `rect` the minimum distance needed to sit inside
/// `[0, viewport_width] x [0, viewport_height]`.
///
/// Each axis is corrected independently. The trailing edge is pulled in
/// first, then the leading edge, so an overlay larger than the viewport ends
/// up flush with the left/top.
pub fn clamp_to_viewport(rect: Rect, viewport_width: f64, viewport_height: f64) -> Rect {
    let x = clamp_axis(rect.x, rect.width, viewport_width);
    let y = clamp_axis(rect.y, rect.height, viewport_height);
    if x != rect.x || y != rect.y {
        trace!(
            dx = x - rect.x,
            dy = y - rect.y,
            "nudged overlay into viewport"
        );
    }
    Rect::new(x, y, rect.width, rect.height)
}

fn clamp_axis(start: f64, extent: f64, limit: f64) -> f64 {
    let mut start = start;
    if start + extent > limit {
        start = limit - extent;
    }
    if start < 0.0 {
        start = 0.0;
    }
    start
}
