//! Anchored Overlay - placement engine for popups, menus and tooltips
//!
//! This library computes where a floating overlay should appear relative to
//! fixed coordinates or an anchor element, keeps it inside the viewport,
//! flips its attachment edge when it would overflow, slides an optional
//! arrow toward a target, and sequences open/close transitions.
//!
//! The geometry stages are plain functions. The [`Overlay`] engine runs them
//! against a [`Host`] that provides measurements, timers and a render sink;
//! [`SimulatedHost`] is an in-memory host.
//!
//! # Example
//!
//! ```rust
//! use anchored_overlay::{place, Alignment, Edge, Offsets, Rect, Size};
//!
//! let anchor = Rect::new(750.0, 100.0, 20.0, 20.0);
//! let placement = place(
//!     &anchor,
//!     Size::new(100.0, 40.0),
//!     &Alignment::parse("right"),
//!     Offsets::default(),
//!     Size::new(800.0, 600.0),
//!     false,
//! );
//!
//! assert_eq!(placement.edge, Edge::Left);
//! assert_eq!(placement.rect.right(), 750.0);
//! ```

pub mod alignment;
pub mod arrow;
pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod overlay;
pub mod placement;
pub mod scenario;
pub mod sim;
pub mod transition;

pub use alignment::{Alignment, Edge, XAlign, YAlign};
pub use arrow::{align_arrow, ArrowAlignment, ArrowDirection};
pub use config::{ConfigError, EngineConfig};
pub use error::ScenarioError;
pub use geometry::{Axis, Point, Rect, Size};
pub use host::{ElementId, Host, SubscriptionId, TimerToken};
pub use overlay::{Overlay, OverlayElements, OverlayState};
pub use placement::{
    clamp_to_viewport, compute_against_anchor, compute_at_coordinates, place_with_flip,
    FlipContext, Offsets, Placement,
};
pub use scenario::{Scenario, ScenarioReport};
pub use sim::SimulatedHost;
pub use transition::{OverlayEvent, TransitionTag, VisualState, Visibility};

/// One-shot placement against an anchor inside a viewport: flip if needed,
/// then clamp unless `bleed` allows overflow. The viewport doubles as the
/// containing bounds.
pub fn place(
    anchor: &Rect,
    overlay: Size,
    alignment: &Alignment,
    offsets: Offsets,
    viewport: Size,
    bleed: bool,
) -> Placement {
    let context = FlipContext {
        viewport,
        containing: Rect::from_size(viewport),
        bleed,
    };
    let placement = place_with_flip(anchor, overlay, alignment, offsets, &context);
    if bleed {
        placement
    } else {
        Placement {
            rect: clamp_to_viewport(placement.rect, viewport.width, viewport.height),
            ..placement
        }
    }
}
