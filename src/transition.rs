//! Visibility and transition sequencing
//!
//! The visual state cycles `Closed -> Opening -> Open -> Closing -> Closed`.
//! Every refresh re-arms two independent timers: a short `open` settle and a
//! longer `close` animation. Re-arming always cancels the previous timer of
//! the same tag, so a burst of refreshes settles into a single terminal
//! notification.

use std::fmt;
use std::time::Duration;

use tracing::trace;

use crate::host::{ElementId, RenderSink, Scheduler, TimerToken};

/// Which of the two deferred transitions a timer belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionTag {
    Open,
    Close,
}

/// Visual state of the overlay panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisualState {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl fmt::Display for VisualState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VisualState::Closed => "closed",
            VisualState::Opening => "opening",
            VisualState::Open => "open",
            VisualState::Closing => "closing",
        })
    }
}

/// What the render sink is told about the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub state: VisualState,
    /// Panel is in the layout flow and can be measured
    pub rendered: bool,
}

/// Terminal notifications emitted when a transition settles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEvent {
    Opened,
    Closed,
}

impl fmt::Display for OverlayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OverlayEvent::Opened => "opened",
            OverlayEvent::Closed => "closed",
        })
    }
}

/// Result of delivering a timer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fired {
    /// Token was cancelled, superseded or never ours
    Stale,
    /// The open timer elapsed; `opened` is set when the state entered `Open`
    OpenSettled { opened: bool },
    /// The close timer elapsed; `closed` is set when the state entered `Closed`
    CloseSettled { closed: bool },
}

#[derive(Debug)]
pub struct TransitionScheduler {
    state: VisualState,
    rendered: bool,
    pending_open: Option<TimerToken>,
    pending_close: Option<TimerToken>,
    open_settle: Duration,
    close_animation: Duration,
}

impl TransitionScheduler {
    pub fn new(open_settle: Duration, close_animation: Duration) -> Self {
        Self {
            state: VisualState::Closed,
            rendered: false,
            pending_open: None,
            pending_close: None,
            open_settle,
            close_animation,
        }
    }

    pub fn state(&self) -> VisualState {
        self.state
    }

    pub fn rendered(&self) -> bool {
        self.rendered
    }

    pub fn visibility(&self) -> Visibility {
        Visibility {
            state: self.state,
            rendered: self.rendered,
        }
    }

    pub fn is_pending(&self, tag: TransitionTag) -> bool {
        match tag {
            TransitionTag::Open => self.pending_open.is_some(),
            TransitionTag::Close => self.pending_close.is_some(),
        }
    }

    /// Re-derive the visual state for `visible` and re-arm both timers
    pub fn refresh<H>(&mut self, host: &mut H, owner: ElementId, visible: bool)
    where
        H: Scheduler + RenderSink + ?Sized,
    {
        let before = self.visibility();

        if visible {
            self.rendered = true;
        }
        self.state = match (visible, self.state) {
            (true, VisualState::Closed | VisualState::Closing) => VisualState::Opening,
            (false, VisualState::Open | VisualState::Opening) => VisualState::Closing,
            (_, state) => state,
        };

        if self.visibility() != before {
            host.apply_visibility(owner, self.visibility());
        }

        if let Some(token) = self.pending_open.take() {
            host.cancel(token);
        }
        self.pending_open = Some(host.after(owner, self.open_settle, TransitionTag::Open));

        if let Some(token) = self.pending_close.take() {
            host.cancel(token);
        }
        self.pending_close = Some(host.after(owner, self.close_animation, TransitionTag::Close));

        trace!(state = %self.state, visible, "transitions re-armed");
    }

    /// Handle a delivered timer token
    pub fn fire<H>(&mut self, host: &mut H, owner: ElementId, token: TimerToken, visible: bool) -> Fired
    where
        H: RenderSink + ?Sized,
    {
        if self.pending_open == Some(token) {
            self.pending_open = None;
            let opened = visible && self.state != VisualState::Open;
            if opened {
                self.state = VisualState::Open;
                host.apply_visibility(owner, self.visibility());
            }
            return Fired::OpenSettled { opened };
        }

        if self.pending_close == Some(token) {
            self.pending_close = None;
            let closed = !visible && self.state != VisualState::Closed;
            if closed {
                self.state = VisualState::Closed;
                self.rendered = false;
                host.apply_visibility(owner, self.visibility());
            }
            return Fired::CloseSettled { closed };
        }

        trace!(?token, "ignoring stale transition timer");
        Fired::Stale
    }

    /// Cancel both pending timers
    pub fn cancel_all<H>(&mut self, host: &mut H)
    where
        H: Scheduler + ?Sized,
    {
        for token in [self.pending_open.take(), self.pending_close.take()]
            .into_iter()
            .flatten()
        {
            host.cancel(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrow::ArrowAlignment;
    use crate::geometry::Point;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recorder {
        next: u64,
        armed: Vec<(TimerToken, TransitionTag, Duration)>,
        cancelled: Vec<TimerToken>,
        visibility: Vec<Visibility>,
    }

    impl Scheduler for Recorder {
        fn after(&mut self, _owner: ElementId, delay: Duration, tag: TransitionTag) -> TimerToken {
            self.next += 1;
            let token = TimerToken(self.next);
            self.armed.push((token, tag, delay));
            token
        }

        fn cancel(&mut self, token: TimerToken) {
            self.cancelled.push(token);
        }
    }

    impl RenderSink for Recorder {
        fn apply_position(&mut self, _overlay: ElementId, _position: Point) {}

        fn apply_visibility(&mut self, _overlay: ElementId, visibility: Visibility) {
            self.visibility.push(visibility);
        }

        fn apply_arrow_offset(&mut self, _arrow: ElementId, _alignment: ArrowAlignment) {}
    }

    const OWNER: ElementId = ElementId(1);

    fn scheduler() -> TransitionScheduler {
        TransitionScheduler::new(Duration::from_millis(16), Duration::from_millis(300))
    }

    #[test]
    fn test_refresh_arms_both_timers() {
        let mut host = Recorder::default();
        let mut t = scheduler();
        t.refresh(&mut host, OWNER, true);

        assert_eq!(t.state(), VisualState::Opening);
        assert!(t.rendered());
        assert!(t.is_pending(TransitionTag::Open));
        assert!(t.is_pending(TransitionTag::Close));
        assert_eq!(host.armed[0].1, TransitionTag::Open);
        assert_eq!(host.armed[0].2, Duration::from_millis(16));
        assert_eq!(host.armed[1].1, TransitionTag::Close);
        assert_eq!(host.armed[1].2, Duration::from_millis(300));
    }

    #[test]
    fn test_rearm_cancels_previous_of_same_tag() {
        let mut host = Recorder::default();
        let mut t = scheduler();
        t.refresh(&mut host, OWNER, true);
        t.refresh(&mut host, OWNER, true);

        assert_eq!(host.cancelled, vec![TimerToken(1), TimerToken(2)]);
        // the superseded open token no longer fires anything
        assert_eq!(t.fire(&mut host, OWNER, TimerToken(1), true), Fired::Stale);
        assert_eq!(
            t.fire(&mut host, OWNER, TimerToken(3), true),
            Fired::OpenSettled { opened: true }
        );
        assert_eq!(t.state(), VisualState::Open);
    }

    #[test]
    fn test_open_fires_once_when_already_open() {
        let mut host = Recorder::default();
        let mut t = scheduler();
        t.refresh(&mut host, OWNER, true);
        t.fire(&mut host, OWNER, TimerToken(1), true);

        t.refresh(&mut host, OWNER, true);
        assert_eq!(t.state(), VisualState::Open);
        assert_eq!(
            t.fire(&mut host, OWNER, TimerToken(3), true),
            Fired::OpenSettled { opened: false }
        );
    }

    #[test]
    fn test_close_sequence_clears_rendered() {
        let mut host = Recorder::default();
        let mut t = scheduler();
        t.refresh(&mut host, OWNER, true);
        t.fire(&mut host, OWNER, TimerToken(1), true);

        t.refresh(&mut host, OWNER, false);
        assert_eq!(t.state(), VisualState::Closing);
        assert!(t.rendered());

        // open timer elapses while hidden: nothing happens
        assert_eq!(
            t.fire(&mut host, OWNER, TimerToken(3), false),
            Fired::OpenSettled { opened: false }
        );
        assert_eq!(
            t.fire(&mut host, OWNER, TimerToken(4), false),
            Fired::CloseSettled { closed: true }
        );
        assert_eq!(t.state(), VisualState::Closed);
        assert!(!t.rendered());
        assert_eq!(
            host.visibility.last(),
            Some(&Visibility {
                state: VisualState::Closed,
                rendered: false
            })
        );
    }

    #[test]
    fn test_cancel_all() {
        let mut host = Recorder::default();
        let mut t = scheduler();
        t.refresh(&mut host, OWNER, true);
        t.cancel_all(&mut host);

        assert!(!t.is_pending(TransitionTag::Open));
        assert!(!t.is_pending(TransitionTag::Close));
        assert_eq!(t.fire(&mut host, OWNER, TimerToken(1), true), Fired::Stale);
        assert_eq!(t.fire(&mut host, OWNER, TimerToken(2), true), Fired::Stale);
    }
}
