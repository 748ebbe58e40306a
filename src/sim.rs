//! In-memory host
//!
//! [`SimulatedHost`] implements every collaborator trait without a real
//! element tree: elements are rectangles in a table, time is a virtual
//! clock, and render output is recorded as [`RenderCommand`]s. Child
//! elements (such as an arrow inside a panel) move with their parent.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use tracing::trace;

use crate::arrow::ArrowAlignment;
use crate::geometry::{Point, Rect, Size};
use crate::host::{
    ElementId, MutationSource, RectProvider, RenderSink, Scheduler, SubscriptionId, TimerToken,
    ViewportProvider,
};
use crate::overlay::Overlay;
use crate::transition::{OverlayEvent, TransitionTag, Visibility};

/// Something the host needs to hand back to an overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Timer {
        owner: ElementId,
        token: TimerToken,
        tag: TransitionTag,
    },
    Mutation {
        owner: ElementId,
        subscription: SubscriptionId,
    },
}

impl HostEvent {
    pub fn owner(&self) -> ElementId {
        match self {
            HostEvent::Timer { owner, .. } | HostEvent::Mutation { owner, .. } => *owner,
        }
    }
}

/// A recorded render sink call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderCommand {
    Position {
        overlay: ElementId,
        position: Point,
    },
    Visibility {
        overlay: ElementId,
        visibility: Visibility,
    },
    ArrowOffset {
        arrow: ElementId,
        alignment: ArrowAlignment,
    },
}

#[derive(Debug, Clone, Copy)]
struct Element {
    rect: Rect,
    parent: Option<ElementId>,
    attached: bool,
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    due: Duration,
    owner: ElementId,
    tag: TransitionTag,
}

#[derive(Debug, Clone, Copy)]
struct Subscription {
    owner: ElementId,
    target: ElementId,
}

#[derive(Debug)]
pub struct SimulatedHost {
    viewport: Size,
    elements: BTreeMap<ElementId, Element>,
    arrow_offsets: HashMap<ElementId, ArrowAlignment>,
    now: Duration,
    timers: BTreeMap<TimerToken, PendingTimer>,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
    queued: Vec<HostEvent>,
    commands: Vec<RenderCommand>,
    next_id: u64,
}

impl SimulatedHost {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            elements: BTreeMap::new(),
            arrow_offsets: HashMap::new(),
            now: Duration::ZERO,
            timers: BTreeMap::new(),
            subscriptions: BTreeMap::new(),
            queued: Vec::new(),
            commands: Vec::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Add a top-level element
    pub fn insert(&mut self, rect: Rect) -> ElementId {
        let id = ElementId(self.next_id());
        self.elements.insert(
            id,
            Element {
                rect,
                parent: None,
                attached: true,
            },
        );
        id
    }

    /// Add an element that moves with `parent`
    pub fn insert_child(&mut self, parent: ElementId, rect: Rect) -> ElementId {
        let id = self.insert(rect);
        if let Some(element) = self.elements.get_mut(&id) {
            element.parent = Some(parent);
        }
        id
    }

    /// Move or resize an element, notifying its observers
    pub fn set_rect(&mut self, id: ElementId, rect: Rect) {
        let Some(element) = self.elements.get_mut(&id) else {
            return;
        };
        let (dx, dy) = (rect.x - element.rect.x, rect.y - element.rect.y);
        element.rect = rect;
        self.move_children(id, dx, dy);
        self.notify(id);
    }

    /// Make an element unmeasurable, as if removed from the tree
    pub fn detach(&mut self, id: ElementId) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.attached = false;
        }
    }

    pub fn reattach(&mut self, id: ElementId) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.attached = true;
        }
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Number of live subscriptions observing `target`
    pub fn observers_of(&self, target: ElementId) -> usize {
        self.subscriptions
            .values()
            .filter(|s| s.target == target)
            .count()
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Queued mutation notifications, drained
    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.queued)
    }

    /// Move the clock forward and return every timer that came due, in
    /// due order. Returned timers are no longer pending.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<HostEvent> {
        self.now += elapsed;
        self.take_due(None)
    }

    /// Hand events addressed to `overlay` back to it. Events owned by other
    /// overlays are dropped, so route them before calling this.
    pub fn deliver(&mut self, overlay: &mut Overlay, events: Vec<HostEvent>) -> Vec<OverlayEvent> {
        let mut out = Vec::new();
        for event in events {
            if event.owner() != overlay.panel() {
                continue;
            }
            match event {
                HostEvent::Timer { token, .. } => out.extend(overlay.fire_timer(self, token)),
                HostEvent::Mutation { subscription, .. } => {
                    overlay.anchor_mutated(self, subscription)
                }
            }
        }
        out
    }

    /// Deliver the overlay's queued mutations, then let `elapsed` pass and
    /// deliver its timers. Events for other overlays stay queued.
    pub fn run_for(&mut self, overlay: &mut Overlay, elapsed: Duration) -> Vec<OverlayEvent> {
        let owner = overlay.panel();
        let (mutations, others): (Vec<HostEvent>, Vec<HostEvent>) = std::mem::take(&mut self.queued)
            .into_iter()
            .partition(|event| event.owner() == owner);
        self.queued = others;
        let mut out = self.deliver(overlay, mutations);

        self.now += elapsed;
        let timers = self.take_due(Some(owner));
        out.extend(self.deliver(overlay, timers));
        out
    }

    // Remove due timers, optionally only those of one owner
    fn take_due(&mut self, owner: Option<ElementId>) -> Vec<HostEvent> {
        let now = self.now;
        let mut due: Vec<(Duration, TimerToken, PendingTimer)> = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.due <= now)
            .filter(|(_, timer)| owner.map_or(true, |owner| timer.owner == owner))
            .map(|(token, timer)| (timer.due, *token, *timer))
            .collect();
        due.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        due.into_iter()
            .map(|(_, token, timer)| {
                self.timers.remove(&token);
                HostEvent::Timer {
                    owner: timer.owner,
                    token,
                    tag: timer.tag,
                }
            })
            .collect()
    }

    fn move_children(&mut self, parent: ElementId, dx: f64, dy: f64) {
        let children: Vec<ElementId> = self
            .elements
            .iter()
            .filter(|(_, e)| e.parent == Some(parent))
            .map(|(id, _)| *id)
            .collect();
        for child in children {
            if let Some(element) = self.elements.get_mut(&child) {
                element.rect = element.rect.translate(dx, dy);
            }
            self.move_children(child, dx, dy);
        }
    }

    fn notify(&mut self, target: ElementId) {
        let events: Vec<HostEvent> = self
            .subscriptions
            .iter()
            .filter(|(_, s)| s.target == target)
            .map(|(id, s)| HostEvent::Mutation {
                owner: s.owner,
                subscription: *id,
            })
            .collect();
        self.queued.extend(events);
    }
}

impl RectProvider for SimulatedHost {
    fn measure(&self, element: ElementId) -> Option<Rect> {
        self.elements
            .get(&element)
            .filter(|e| e.attached)
            .map(|e| e.rect)
    }
}

impl ViewportProvider for SimulatedHost {
    fn viewport_size(&self) -> Size {
        self.viewport
    }
}

impl MutationSource for SimulatedHost {
    fn subscribe(&mut self, owner: ElementId, target: ElementId) -> SubscriptionId {
        let id = SubscriptionId(self.next_id());
        self.subscriptions.insert(id, Subscription { owner, target });
        id
    }

    fn unsubscribe(&mut self, subscription: SubscriptionId) {
        self.subscriptions.remove(&subscription);
        self.queued.retain(|event| {
            !matches!(event, HostEvent::Mutation { subscription: s, .. } if *s == subscription)
        });
    }
}

impl Scheduler for SimulatedHost {
    fn after(&mut self, owner: ElementId, delay: Duration, tag: TransitionTag) -> TimerToken {
        let token = TimerToken(self.next_id());
        self.timers.insert(
            token,
            PendingTimer {
                due: self.now + delay,
                owner,
                tag,
            },
        );
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        if self.timers.remove(&token).is_none() {
            trace!(?token, "cancel of unknown or fired timer");
        }
    }
}

impl RenderSink for SimulatedHost {
    fn apply_position(&mut self, overlay: ElementId, position: Point) {
        if let Some(element) = self.elements.get_mut(&overlay) {
            let (dx, dy) = (position.x - element.rect.x, position.y - element.rect.y);
            element.rect = element.rect.with_origin(position);
            self.move_children(overlay, dx, dy);
        }
        self.commands.push(RenderCommand::Position { overlay, position });
    }

    fn apply_visibility(&mut self, overlay: ElementId, visibility: Visibility) {
        self.commands.push(RenderCommand::Visibility {
            overlay,
            visibility,
        });
    }

    fn apply_arrow_offset(&mut self, arrow: ElementId, alignment: ArrowAlignment) {
        let previous = self.arrow_offsets.insert(arrow, alignment);
        if let Some(element) = self.elements.get_mut(&arrow) {
            let mut rect = element.rect;
            if let Some(previous) = previous {
                rect = rect.translate_along(previous.axis, -previous.offset);
            }
            element.rect = rect.translate_along(alignment.axis, alignment.offset);
        }
        self.commands.push(RenderCommand::ArrowOffset { arrow, alignment });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::overlay::OverlayElements;
    use crate::transition::VisualState;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_children_follow_parent() {
        let mut host = SimulatedHost::new(Size::new(100.0, 100.0));
        let panel = host.insert(Rect::new(0.0, 0.0, 50.0, 20.0));
        let arrow = host.insert_child(panel, Rect::new(0.0, -5.0, 10.0, 5.0));

        host.apply_position(panel, Point::new(30.0, 40.0));
        assert_eq!(host.measure(arrow), Some(Rect::new(30.0, 35.0, 10.0, 5.0)));
    }

    #[test]
    fn test_timers_fire_in_due_order() {
        let mut host = SimulatedHost::new(Size::new(100.0, 100.0));
        let owner = host.insert(Rect::zero());
        let late = host.after(owner, Duration::from_millis(30), TransitionTag::Close);
        let early = host.after(owner, Duration::from_millis(10), TransitionTag::Open);

        assert!(host.advance(Duration::from_millis(5)).is_empty());
        let fired = host.advance(Duration::from_millis(30));
        let tokens: Vec<TimerToken> = fired
            .iter()
            .filter_map(|e| match e {
                HostEvent::Timer { token, .. } => Some(*token),
                _ => None,
            })
            .collect();
        assert_eq!(tokens, vec![early, late]);
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn test_cancel_fired_token_is_noop() {
        let mut host = SimulatedHost::new(Size::new(100.0, 100.0));
        let owner = host.insert(Rect::zero());
        let token = host.after(owner, Duration::from_millis(1), TransitionTag::Open);
        host.advance(Duration::from_millis(1));
        host.cancel(token);
        host.cancel(token);
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn test_mutations_reach_subscribers_only() {
        let mut host = SimulatedHost::new(Size::new(100.0, 100.0));
        let owner = host.insert(Rect::zero());
        let anchor = host.insert(Rect::new(1.0, 1.0, 1.0, 1.0));
        let other = host.insert(Rect::zero());
        let sub = host.subscribe(owner, anchor);

        host.set_rect(other, Rect::new(5.0, 5.0, 1.0, 1.0));
        assert!(host.take_events().is_empty());

        host.set_rect(anchor, Rect::new(2.0, 2.0, 1.0, 1.0));
        assert_eq!(
            host.take_events(),
            vec![HostEvent::Mutation {
                owner,
                subscription: sub
            }]
        );

        host.unsubscribe(sub);
        host.set_rect(anchor, Rect::new(3.0, 3.0, 1.0, 1.0));
        assert!(host.take_events().is_empty());
        assert_eq!(host.observers_of(anchor), 0);
    }

    #[test]
    fn test_detached_elements_cannot_be_measured() {
        let mut host = SimulatedHost::new(Size::new(100.0, 100.0));
        let id = host.insert(Rect::new(1.0, 2.0, 3.0, 4.0));
        host.detach(id);
        assert_eq!(host.measure(id), None);
        host.reattach(id);
        assert_eq!(host.measure(id), Some(Rect::new(1.0, 2.0, 3.0, 4.0)));
    }

    #[test]
    fn test_run_for_keeps_other_overlays_events() {
        let mut host = SimulatedHost::new(Size::new(400.0, 400.0));
        let config = EngineConfig::default();
        let anchor = host.insert(Rect::new(100.0, 100.0, 20.0, 20.0));
        let first_panel = host.insert(Rect::new(0.0, 0.0, 40.0, 10.0));
        let second_panel = host.insert(Rect::new(0.0, 0.0, 60.0, 10.0));
        let mut first = Overlay::new(OverlayElements::new(first_panel), &config);
        let mut second = Overlay::new(OverlayElements::new(second_panel), &config);
        for overlay in [&mut first, &mut second] {
            overlay.set_anchor(&mut host, Some(anchor));
            overlay.set_visible(&mut host, true);
        }

        let settle = Duration::from_millis(400);
        assert_eq!(host.run_for(&mut first, settle), vec![OverlayEvent::Opened]);
        assert_eq!(host.pending_timers(), 2);
        assert_eq!(second.visual_state(), VisualState::Opening);
        assert_eq!(host.run_for(&mut second, settle), vec![OverlayEvent::Opened]);
        assert_eq!(second.visual_state(), VisualState::Open);
        assert_eq!(host.pending_timers(), 0);

        // A shared anchor moving reaches both overlays
        host.set_rect(anchor, Rect::new(200.0, 100.0, 20.0, 20.0));
        host.run_for(&mut first, Duration::ZERO);
        assert_eq!(host.measure(first_panel).map(|r| r.x), Some(190.0));
        assert_eq!(host.measure(second_panel).map(|r| r.x), Some(80.0));
        host.run_for(&mut second, Duration::ZERO);
        assert_eq!(host.measure(second_panel).map(|r| r.x), Some(180.0));
    }

    #[test]
    fn test_arrow_offsets_replace_previous() {
        let mut host = SimulatedHost::new(Size::new(100.0, 100.0));
        let arrow = host.insert(Rect::new(0.0, 0.0, 4.0, 4.0));
        let axis = crate::geometry::Axis::Horizontal;
        host.apply_arrow_offset(
            arrow,
            ArrowAlignment {
                axis,
                offset: 10.0,
                hidden: false,
            },
        );
        host.apply_arrow_offset(
            arrow,
            ArrowAlignment {
                axis,
                offset: 3.0,
                hidden: false,
            },
        );
        assert_eq!(host.measure(arrow), Some(Rect::new(3.0, 0.0, 4.0, 4.0)));
    }
}
