//! The overlay engine
//!
//! An [`Overlay`] owns one [`OverlayState`] and drives the placement
//! pipeline against a [`Host`]. Each refresh runs, in order:
//!
//! 1. snapshot every measurement it needs (viewport, panel, anchor, arrow)
//! 2. placement against the anchor with at most one flip, or at coordinates
//! 3. viewport clamp when bleed is disallowed
//! 4. arrow alignment
//! 5. visibility transitions
//!
//! Nothing in here returns an error. Bad configuration degrades to defaults
//! and failed measurements skip placement, leaving the last position alone.

use tracing::{debug, trace};

use crate::alignment::Alignment;
use crate::arrow::{align_arrow, ArrowAlignment, ArrowDirection};
use crate::config::EngineConfig;
use crate::geometry::{Point, Rect, Size};
use crate::host::{ElementId, Host, SubscriptionId, TimerToken};
use crate::placement::{
    clamp_to_viewport, compute_at_coordinates, place_with_flip, FlipContext, Offsets, Placement,
};
use crate::transition::{Fired, OverlayEvent, TransitionScheduler, VisualState};

/// Elements that make up one overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayElements {
    /// The panel that gets positioned
    pub panel: ElementId,
    /// Optional pointer indicator inside the panel
    pub arrow: Option<ElementId>,
}

impl OverlayElements {
    pub fn new(panel: ElementId) -> Self {
        Self { panel, arrow: None }
    }

    pub fn with_arrow(mut self, arrow: ElementId) -> Self {
        self.arrow = Some(arrow);
        self
    }
}

/// Complete configuration of one overlay.
///
/// Treated as an immutable record: setters on [`Overlay`] build the next
/// state with the `with_*` methods and commit it in one step.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayState {
    pub alignment: Alignment,
    pub anchor: Option<ElementId>,
    /// Used when there is no anchor
    pub coordinates: Option<Point>,
    pub offsets: Offsets,
    pub bleed: bool,
    pub visible: bool,
    pub arrow_direction: ArrowDirection,
    pub arrow_target: Option<ElementId>,
    /// `None` means the viewport
    pub containing_bounds: Option<Rect>,
}

impl OverlayState {
    pub fn new(alignment: Alignment) -> Self {
        Self {
            alignment,
            anchor: None,
            coordinates: None,
            offsets: Offsets::default(),
            bleed: false,
            visible: false,
            arrow_direction: ArrowDirection::None,
            arrow_target: None,
            containing_bounds: None,
        }
    }

    pub fn with_alignment(&self, alignment: Alignment) -> Self {
        Self {
            alignment,
            ..self.clone()
        }
    }

    pub fn with_anchor(&self, anchor: Option<ElementId>) -> Self {
        Self {
            anchor,
            ..self.clone()
        }
    }

    pub fn with_coordinates(&self, coordinates: Option<Point>) -> Self {
        Self {
            coordinates,
            ..self.clone()
        }
    }

    pub fn with_offsets(&self, offsets: Offsets) -> Self {
        Self {
            offsets,
            ..self.clone()
        }
    }

    pub fn with_bleed(&self, bleed: bool) -> Self {
        Self {
            bleed,
            ..self.clone()
        }
    }

    pub fn with_visible(&self, visible: bool) -> Self {
        Self {
            visible,
            ..self.clone()
        }
    }

    pub fn with_arrow(&self, direction: ArrowDirection, target: Option<ElementId>) -> Self {
        Self {
            arrow_direction: direction,
            arrow_target: target,
            ..self.clone()
        }
    }

    pub fn with_containing_bounds(&self, bounds: Option<Rect>) -> Self {
        Self {
            containing_bounds: bounds,
            ..self.clone()
        }
    }

    fn has_arrow(&self) -> bool {
        self.arrow_direction != ArrowDirection::None && self.arrow_target.is_some()
    }
}

impl Default for OverlayState {
    fn default() -> Self {
        Self::new(Alignment::centered())
    }
}

/// What the overlay is placed against in one refresh
#[derive(Debug, Clone, Copy)]
enum Target {
    Anchor(Rect),
    Point(Point),
}

/// Measurements captured once at the start of a refresh
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    viewport: Size,
    panel: Rect,
    target: Target,
    arrow: Option<ArrowSnapshot>,
}

#[derive(Debug, Clone, Copy)]
struct ArrowSnapshot {
    element: ElementId,
    arrow: Rect,
    target: Rect,
}

/// An anchored overlay
#[derive(Debug)]
pub struct Overlay {
    elements: OverlayElements,
    state: OverlayState,
    transitions: TransitionScheduler,
    subscription: Option<SubscriptionId>,
    placement: Option<Placement>,
    arrow_direction: ArrowDirection,
    arrow: Option<ArrowAlignment>,
    destroyed: bool,
}

impl Overlay {
    pub fn new(elements: OverlayElements, config: &EngineConfig) -> Self {
        Self {
            elements,
            state: OverlayState::new(config.default_alignment),
            transitions: TransitionScheduler::new(config.open_settle, config.close_animation),
            subscription: None,
            placement: None,
            arrow_direction: ArrowDirection::None,
            arrow: None,
            destroyed: false,
        }
    }

    pub fn panel(&self) -> ElementId {
        self.elements.panel
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    /// Last successful placement, after clamping
    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }

    /// Last arrow alignment applied to the render sink
    pub fn arrow_alignment(&self) -> Option<&ArrowAlignment> {
        self.arrow.as_ref()
    }

    /// Arrow direction in effect after flips
    pub fn effective_arrow_direction(&self) -> ArrowDirection {
        self.arrow_direction
    }

    pub fn visual_state(&self) -> VisualState {
        self.transitions.state()
    }

    pub fn is_rendered(&self) -> bool {
        self.transitions.rendered()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Resolve and apply an alignment from loosely-typed candidates
    pub fn set_alignment<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        edge: &str,
        x: &str,
        y: &str,
    ) {
        let next = self.state.with_alignment(Alignment::resolve(edge, x, y));
        self.commit(host, next);
    }

    pub fn set_alignment_spec<H: Host + ?Sized>(&mut self, host: &mut H, alignment: Alignment) {
        let next = self.state.with_alignment(alignment);
        self.commit(host, next);
    }

    /// Attach to an anchor element, or detach with `None`
    pub fn set_anchor<H: Host + ?Sized>(&mut self, host: &mut H, anchor: Option<ElementId>) {
        let next = self.state.with_anchor(anchor);
        self.commit(host, next);
    }

    /// Point used for placement while there is no anchor
    pub fn set_coordinates<H: Host + ?Sized>(&mut self, host: &mut H, x: f64, y: f64) {
        let next = self.state.with_coordinates(Some(Point::new(x, y)));
        self.commit(host, next);
    }

    pub fn set_offset<H: Host + ?Sized>(&mut self, host: &mut H, x: f64, y: f64) {
        let next = self.state.with_offsets(Offsets::new(x, y));
        self.commit(host, next);
    }

    pub fn set_bleed<H: Host + ?Sized>(&mut self, host: &mut H, bleed: bool) {
        let next = self.state.with_bleed(bleed);
        self.commit(host, next);
    }

    pub fn set_visible<H: Host + ?Sized>(&mut self, host: &mut H, visible: bool) {
        let next = self.state.with_visible(visible);
        self.commit(host, next);
    }

    /// Configure the arrow. `ArrowDirection::None` or a missing target hides it.
    pub fn set_arrow<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        direction: ArrowDirection,
        target: Option<ElementId>,
    ) {
        let next = self.state.with_arrow(direction, target);
        self.commit(host, next);
    }

    pub fn set_containing_bounds<H: Host + ?Sized>(&mut self, host: &mut H, bounds: Option<Rect>) {
        let next = self.state.with_containing_bounds(bounds);
        self.commit(host, next);
    }

    fn commit<H: Host + ?Sized>(&mut self, host: &mut H, next: OverlayState) {
        if self.destroyed || next == self.state {
            return;
        }
        let anchor_changed = next.anchor != self.state.anchor;
        let arrow_removed = self.state.has_arrow() && !next.has_arrow();
        self.state = next;

        if anchor_changed {
            self.resubscribe(host);
        }
        if arrow_removed {
            self.hide_arrow(host);
        }
        self.refresh(host);
    }

    // Drop the old anchor subscription before observing the new anchor
    fn resubscribe<H: Host + ?Sized>(&mut self, host: &mut H) {
        if let Some(old) = self.subscription.take() {
            host.unsubscribe(old);
        }
        if let Some(anchor) = self.state.anchor {
            self.subscription = Some(host.subscribe(self.elements.panel, anchor));
        }
        debug!(panel = ?self.elements.panel, anchor = ?self.state.anchor, "anchor subscription updated");
    }

    /// Recompute placement and re-arm the visibility transitions.
    /// Safe to call any number of times.
    pub fn refresh<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.destroyed {
            trace!("refresh after destroy ignored");
            return;
        }

        match self.capture(host) {
            Some(snapshot) => self.place(host, &snapshot),
            None => trace!(panel = ?self.elements.panel, "placement skipped"),
        }

        self.transitions
            .refresh(host, self.elements.panel, self.state.visible);
    }

    fn capture<H: Host + ?Sized>(&self, host: &H) -> Option<Snapshot> {
        let viewport = host.viewport_size();

        let Some(panel) = host.measure(self.elements.panel) else {
            debug!(panel = ?self.elements.panel, "overlay panel cannot be measured");
            return None;
        };

        let target = match (self.state.anchor, self.state.coordinates) {
            (Some(anchor), _) => match host.measure(anchor) {
                Some(rect) => Target::Anchor(rect),
                None => {
                    debug!(?anchor, "anchor cannot be measured");
                    return None;
                }
            },
            (None, Some(point)) => Target::Point(point),
            (None, None) => return None,
        };

        let arrow = self.capture_arrow(host);

        Some(Snapshot {
            viewport,
            panel,
            target,
            arrow,
        })
    }

    fn place<H: Host + ?Sized>(&mut self, host: &mut H, snapshot: &Snapshot) {
        let size = snapshot.panel.size();
        let alignment = self.state.alignment;

        let placement = match snapshot.target {
            Target::Anchor(anchor) => {
                if !anchor.intersects(&Rect::from_size(snapshot.viewport)) {
                    trace!(?anchor, "anchor is outside the viewport");
                }
                let context = FlipContext {
                    viewport: snapshot.viewport,
                    containing: self
                        .state
                        .containing_bounds
                        .unwrap_or_else(|| Rect::from_size(snapshot.viewport)),
                    bleed: self.state.bleed,
                };
                place_with_flip(&anchor, size, &alignment, self.state.offsets, &context)
            }
            Target::Point(point) => Placement {
                rect: compute_at_coordinates(point, size, &alignment),
                edge: alignment.edge(),
                flipped: false,
            },
        };

        let rect = if self.state.bleed {
            placement.rect
        } else {
            clamp_to_viewport(
                placement.rect,
                snapshot.viewport.width,
                snapshot.viewport.height,
            )
        };
        let placement = Placement { rect, ..placement };

        let viewport = Rect::from_size(snapshot.viewport);
        let overflow = rect.overflow(&viewport);
        if !overflow.is_none() {
            debug!(?overflow, "overlay extends past the viewport");
        }

        host.apply_position(self.elements.panel, rect.origin());
        debug!(
            x = rect.x,
            y = rect.y,
            edge = %placement.edge,
            flipped = placement.flipped,
            "overlay placed"
        );
        self.placement = Some(placement);

        self.arrow_direction = effective_arrow_direction(self.state.arrow_direction, &placement);
        if let Some(arrow) = snapshot.arrow {
            // The arrow was measured before the panel moved
            let displaced = arrow
                .arrow
                .translate(rect.x - snapshot.panel.x, rect.y - snapshot.panel.y);
            self.align(host, &arrow, displaced, &rect);
        } else if self.state.has_arrow() {
            self.hide_arrow(host);
        }
    }

    fn align<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        arrow: &ArrowSnapshot,
        measured: Rect,
        panel: &Rect,
    ) {
        let rest = match self.arrow {
            Some(applied) => measured.translate_along(applied.axis, -applied.offset),
            None => measured,
        };
        let alignment = align_arrow(&rest, panel, &arrow.target, self.arrow_direction);
        host.apply_arrow_offset(arrow.element, alignment);
        self.arrow = Some(alignment);
    }

    // Re-measure after layout has settled and align the arrow only
    fn realign_arrow<H: Host + ?Sized>(&mut self, host: &mut H) {
        let Some(panel) = host.measure(self.elements.panel) else {
            return;
        };
        let Some(snapshot) = self.capture_arrow(host) else {
            self.hide_arrow(host);
            return;
        };
        self.align(host, &snapshot, snapshot.arrow, &panel);
    }

    fn capture_arrow<H: Host + ?Sized>(&self, host: &H) -> Option<ArrowSnapshot> {
        if !self.state.has_arrow() {
            return None;
        }
        let element = self.elements.arrow?;
        let target = self.state.arrow_target?;
        match (host.measure(element), host.measure(target)) {
            (Some(arrow), Some(target)) => Some(ArrowSnapshot {
                element,
                arrow,
                target,
            }),
            _ => {
                debug!("arrow or arrow target cannot be measured");
                None
            }
        }
    }

    fn hide_arrow<H: Host + ?Sized>(&mut self, host: &mut H) {
        if let (Some(element), Some(applied)) = (self.elements.arrow, self.arrow.take()) {
            host.apply_arrow_offset(element, ArrowAlignment::hidden(applied.axis));
        }
        self.arrow_direction = ArrowDirection::None;
    }

    /// Deliver a timer token previously handed to the host's scheduler.
    /// Returns the terminal notification, if this timer produced one.
    pub fn fire_timer<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        token: TimerToken,
    ) -> Option<OverlayEvent> {
        if self.destroyed {
            trace!(?token, "timer delivered after destroy ignored");
            return None;
        }

        match self
            .transitions
            .fire(host, self.elements.panel, token, self.state.visible)
        {
            Fired::Stale => None,
            Fired::OpenSettled { opened } => {
                if self.state.has_arrow() {
                    self.realign_arrow(host);
                }
                if opened {
                    debug!(panel = ?self.elements.panel, "overlay opened");
                }
                opened.then_some(OverlayEvent::Opened)
            }
            Fired::CloseSettled { closed } => {
                if closed {
                    debug!(panel = ?self.elements.panel, "overlay closed");
                }
                closed.then_some(OverlayEvent::Closed)
            }
        }
    }

    /// Deliver an anchor mutation notification. Stale subscriptions are ignored.
    pub fn anchor_mutated<H: Host + ?Sized>(&mut self, host: &mut H, subscription: SubscriptionId) {
        if self.destroyed || self.subscription != Some(subscription) {
            trace!(?subscription, "ignoring mutation from stale subscription");
            return;
        }
        self.refresh(host);
    }

    /// Tear down: cancel pending transitions and the anchor subscription.
    /// Every later call on this overlay is a no-op.
    pub fn destroy<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.destroyed {
            return;
        }
        self.transitions.cancel_all(host);
        if let Some(subscription) = self.subscription.take() {
            host.unsubscribe(subscription);
        }
        self.destroyed = true;
        debug!(panel = ?self.elements.panel, "overlay destroyed");
    }
}

/// Mirror the arrow when the overlay flipped across the axis the arrow
/// points along
fn effective_arrow_direction(requested: ArrowDirection, placement: &Placement) -> ArrowDirection {
    let points_along = requested.slide_axis().map(|axis| axis.cross());
    if placement.flipped && points_along.is_some() && placement.edge.axis() == points_along {
        requested.mirror()
    } else {
        requested
    }
}
