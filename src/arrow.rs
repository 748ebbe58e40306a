//! Arrow alignment
//!
//! Slides the overlay's pointer indicator along the attached edge so its
//! center lines up with a target element.

use std::fmt;

use tracing::trace;

use crate::alignment::Edge;
use crate::geometry::{Axis, Rect};

/// Where the arrow points, or `None` when no arrow is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArrowDirection {
    #[default]
    None,
    Top,
    Bottom,
    Left,
    Right,
}

impl ArrowDirection {
    /// Axis the arrow slides along: vertical for left/right arrows,
    /// horizontal for top/bottom ones
    pub fn slide_axis(self) -> Option<Axis> {
        match self {
            ArrowDirection::Left | ArrowDirection::Right => Some(Axis::Vertical),
            ArrowDirection::Top | ArrowDirection::Bottom => Some(Axis::Horizontal),
            ArrowDirection::None => None,
        }
    }

    pub fn mirror(self) -> ArrowDirection {
        match self {
            ArrowDirection::Top => ArrowDirection::Bottom,
            ArrowDirection::Bottom => ArrowDirection::Top,
            ArrowDirection::Left => ArrowDirection::Right,
            ArrowDirection::Right => ArrowDirection::Left,
            ArrowDirection::None => ArrowDirection::None,
        }
    }

    /// Lenient parse; unknown words yield `None`
    pub fn parse_lenient(word: &str) -> ArrowDirection {
        match Edge::parse_lenient(word) {
            Edge::Top => ArrowDirection::Top,
            Edge::Bottom => ArrowDirection::Bottom,
            Edge::Left => ArrowDirection::Left,
            Edge::Right => ArrowDirection::Right,
            Edge::Center => ArrowDirection::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArrowDirection::None => "none",
            ArrowDirection::Top => "top",
            ArrowDirection::Bottom => "bottom",
            ArrowDirection::Left => "left",
            ArrowDirection::Right => "right",
        }
    }
}

impl fmt::Display for ArrowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of aligning the arrow
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowAlignment {
    /// Axis the offset applies to
    pub axis: Axis,
    /// Margin to apply along `axis`, already rounded up
    pub offset: f64,
    pub hidden: bool,
}

impl ArrowAlignment {
    pub fn hidden(axis: Axis) -> Self {
        Self {
            axis,
            offset: 0.0,
            hidden: true,
        }
    }
}

/// Align the arrow's center with the target's center along the arrow's
/// slide axis.
///
/// `arrow` is the arrow's rest rectangle (no offset applied). The delta is
/// rounded toward positive infinity. If the shifted arrow would leave the
/// overlay's span on that axis the arrow is hidden and no offset is applied.
pub fn align_arrow(
    arrow: &Rect,
    overlay: &Rect,
    target: &Rect,
    direction: ArrowDirection,
) -> ArrowAlignment {
    let Some(axis) = direction.slide_axis() else {
        return ArrowAlignment::hidden(Axis::Vertical);
    };

    let offset = (target.center_along(axis) - arrow.center_along(axis)).ceil();
    let (start, end) = arrow.translate_along(axis, offset).span_along(axis);
    let (min, max) = overlay.span_along(axis);

    if start < min || end > max {
        trace!(%direction, offset, "arrow target outside overlay, hiding arrow");
        return ArrowAlignment::hidden(axis);
    }

    ArrowAlignment {
        axis,
        offset,
        hidden: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn overlay() -> Rect {
        Rect::new(100.0, 100.0, 200.0, 100.0)
    }

    #[test]
    fn test_left_arrow_slides_vertically() {
        let arrow = Rect::new(92.0, 100.0, 8.0, 10.0);
        let target = Rect::new(0.0, 140.0, 50.0, 20.0);
        let a = align_arrow(&arrow, &overlay(), &target, ArrowDirection::Left);
        assert_eq!(
            a,
            ArrowAlignment {
                axis: Axis::Vertical,
                offset: 45.0,
                hidden: false
            }
        );
    }

    #[test]
    fn test_offset_rounds_up() {
        let arrow = Rect::new(100.0, 192.0, 10.0, 8.0);
        let target = Rect::new(150.0, 250.0, 10.5, 10.0);
        let a = align_arrow(&arrow, &overlay(), &target, ArrowDirection::Bottom);
        assert_eq!(a.axis, Axis::Horizontal);
        // 155.25 - 105 = 50.25
        assert_eq!(a.offset, 51.0);

        let back = Rect::new(110.0, 250.0, 10.5, 10.0);
        // 115.25 - 125 = -9.75
        let a = align_arrow(&arrow.translate(20.0, 0.0), &overlay(), &back, ArrowDirection::Top);
        assert_eq!(a.offset, -9.0);
    }

    #[test]
    fn test_hidden_when_target_outside_overlay() {
        let arrow = Rect::new(92.0, 100.0, 8.0, 10.0);
        let target = Rect::new(0.0, 400.0, 50.0, 20.0);
        let a = align_arrow(&arrow, &overlay(), &target, ArrowDirection::Right);
        assert!(a.hidden);
        assert_eq!(a.offset, 0.0);
    }

    #[test]
    fn test_none_direction_is_hidden() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let a = align_arrow(&r, &r, &r, ArrowDirection::None);
        assert!(a.hidden);
        assert_eq!(a.offset, 0.0);
    }

    #[test]
    fn test_parse_and_mirror() {
        assert_eq!(ArrowDirection::parse_lenient("left"), ArrowDirection::Left);
        assert_eq!(ArrowDirection::parse_lenient("none"), ArrowDirection::None);
        assert_eq!(ArrowDirection::parse_lenient("center"), ArrowDirection::None);
        assert_eq!(ArrowDirection::Top.mirror(), ArrowDirection::Bottom);
    }
}
