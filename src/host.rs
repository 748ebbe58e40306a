//! Collaborator interfaces the engine consumes
//!
//! The engine never touches a real element tree. Everything it needs from
//! the outside world (measurements, timers, mutation notifications and the
//! place to write results) goes through these traits. Callbacks are not
//! closures: the host hands the returned token back to the owning overlay
//! (`Overlay::fire_timer`, `Overlay::anchor_mutated`), and the overlay
//! ignores tokens it no longer holds.

use std::time::Duration;

use crate::arrow::ArrowAlignment;
use crate::geometry::{Point, Rect, Size};
use crate::transition::{TransitionTag, Visibility};

/// Opaque handle to some element owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Identifies one scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(pub u64);

/// Identifies one mutation subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Measures rendered boxes. Returns `None` when the element cannot be
/// measured (detached, not rendered).
pub trait RectProvider {
    fn measure(&self, element: ElementId) -> Option<Rect>;
}

pub trait ViewportProvider {
    fn viewport_size(&self) -> Size;
}

/// Position/size/attribute change notifications for an element
pub trait MutationSource {
    /// Start observing `target` on behalf of the overlay `owner`
    fn subscribe(&mut self, owner: ElementId, target: ElementId) -> SubscriptionId;

    /// Stop notifications. Unknown ids are ignored.
    fn unsubscribe(&mut self, subscription: SubscriptionId);
}

/// Deferred delivery of timer tokens
pub trait Scheduler {
    /// Deliver a token to `owner` once `delay` has elapsed
    fn after(&mut self, owner: ElementId, delay: Duration, tag: TransitionTag) -> TimerToken;

    /// Cancel a pending timer. Cancelling a fired or unknown token is a no-op.
    fn cancel(&mut self, token: TimerToken);
}

/// Where layout results are written
pub trait RenderSink {
    fn apply_position(&mut self, overlay: ElementId, position: Point);
    fn apply_visibility(&mut self, overlay: ElementId, visibility: Visibility);
    fn apply_arrow_offset(&mut self, arrow: ElementId, alignment: ArrowAlignment);
}

/// Everything an overlay needs from its environment
pub trait Host: RectProvider + ViewportProvider + MutationSource + Scheduler + RenderSink {}

impl<T> Host for T where T: RectProvider + ViewportProvider + MutationSource + Scheduler + RenderSink {}
