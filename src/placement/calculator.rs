//! Target rectangle computation for a single, fixed alignment

use crate::alignment::{Alignment, Edge, XAlign, YAlign};
use crate::geometry::{Point, Rect, Size};

/// Position an overlay so that `point` lands on the corner or center the
/// alignment selects. `x = Right` puts the overlay's right side on the point,
/// `x = Center` its horizontal center, and likewise vertically.
///
/// Because a resolved [`Alignment`] fixes the axis its edge sits on, this
/// agrees with [`compute_against_anchor`] against a zero-sized anchor.
pub fn compute_at_coordinates(point: Point, overlay: Size, alignment: &Alignment) -> Rect {
    let x = point.x - x_shift(alignment.x(), overlay.width);
    let y = point.y - y_shift(alignment.y(), overlay.height);
    Rect::new(x, y, overlay.width, overlay.height)
}

/// Position an overlay against an anchor rectangle.
///
/// The edge fixes one axis: `bottom` puts the overlay's top at the anchor's
/// bottom plus `offset_y`, `top` puts its bottom at the anchor's top minus
/// `offset_y`, and the X-edges mirror this with `offset_x`. The other axis
/// follows the alignment's cross-axis strategy over the anchor's extent,
/// shifted by the matching offset. A `center` edge centers both axes.
pub fn compute_against_anchor(
    anchor: &Rect,
    overlay: Size,
    alignment: &Alignment,
    offset_x: f64,
    offset_y: f64,
) -> Rect {
    let (x, y) = match alignment.edge() {
        Edge::Center => (
            anchor.center().x - overlay.width / 2.0 + offset_x,
            anchor.center().y - overlay.height / 2.0 + offset_y,
        ),
        Edge::Top => (
            along_x(anchor, overlay, alignment.x()) + offset_x,
            anchor.top() - overlay.height - offset_y,
        ),
        Edge::Bottom => (
            along_x(anchor, overlay, alignment.x()) + offset_x,
            anchor.bottom() + offset_y,
        ),
        Edge::Left => (
            anchor.left() - overlay.width - offset_x,
            along_y(anchor, overlay, alignment.y()) + offset_y,
        ),
        Edge::Right => (
            anchor.right() + offset_x,
            along_y(anchor, overlay, alignment.y()) + offset_y,
        ),
    };
    Rect::new(x, y, overlay.width, overlay.height)
}

fn x_shift(align: XAlign, width: f64) -> f64 {
    match align {
        XAlign::Left => 0.0,
        XAlign::Center => width / 2.0,
        XAlign::Right => width,
    }
}

fn y_shift(align: YAlign, height: f64) -> f64 {
    match align {
        YAlign::Top => 0.0,
        YAlign::Center => height / 2.0,
        YAlign::Bottom => height,
    }
}

// Left side of the overlay when aligned over the anchor's horizontal extent
fn along_x(anchor: &Rect, overlay: Size, align: XAlign) -> f64 {
    match align {
        XAlign::Left => anchor.left(),
        XAlign::Center => anchor.center().x - overlay.width / 2.0,
        XAlign::Right => anchor.right() - overlay.width,
    }
}

fn along_y(anchor: &Rect, overlay: Size, align: YAlign) -> f64 {
    match align {
        YAlign::Top => anchor.top(),
        YAlign::Center => anchor.center().y - overlay.height / 2.0,
        YAlign::Bottom => anchor.bottom() - overlay.height,
    }
}
