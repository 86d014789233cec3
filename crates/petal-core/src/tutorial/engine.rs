//! Tutorial positioning and transition engine.
//!
//! Owns one tutorial session: the step sequencer, the highlight/tooltip
//! geometry, and the timers that choreograph step changes.
//!
//! ## Step change
//!
//! ```text
//! Idle ──step change──▶ FadingOut ──fade──▶ Repositioning ──move──▶ FadingIn ──frame──▶ Idle
//!                        content hidden      geometry swapped         content visible
//! ```
//!
//! The first layout after opening skips the fade and is applied on the
//! next frame. Resize and scroll events are debounced and re-measure the
//! current step in place. Navigation requests that arrive while a
//! transition is in flight are rejected.
//!
//! ## Driving the engine
//!
//! The host calls [`TutorialEngine::poll`] on every tick and
//! [`TutorialEngine::on_frame`] once per painted frame, passing a
//! [`LayoutProbe`] that measures the live screen. Anchors are always
//! measured at the moment geometry is applied, never cached.

use std::time::Instant;

use super::placement::{centered, highlight_rect, place_tooltip};
use super::sequencer::{SequencerOutcome, StepCommand, StepSequencer};
use super::steps::TutorialStep;
use crate::config::TutorialConfig;
use crate::error::DisplayFault;
use crate::geometry::{Placement, Rect, Viewport};
use crate::scheduler::{Deadline, FrameRequest, earliest};

/// Measures the live screen.
pub trait LayoutProbe {
    type Element;

    /// Finds the element registered under `selector`, if it is on screen.
    fn query_selector(&self, selector: &str) -> Option<Self::Element>;

    /// Current bounding box of `element` in viewport coordinates.
    fn bounding_box(&self, element: &Self::Element) -> Rect;

    fn viewport(&self) -> Viewport;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPhase {
    #[default]
    Idle,
    FadingOut,
    Repositioning,
    FadingIn,
}

impl TransitionPhase {
    /// True while a step change is in flight and navigation is blocked.
    pub fn is_transitioning(self) -> bool {
        matches!(self, TransitionPhase::FadingOut | TransitionPhase::Repositioning)
    }

    /// Whether the tooltip content should be drawn.
    pub fn content_visible(self) -> bool {
        !self.is_transitioning()
    }
}

/// Snapshot of the session for the view layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TutorialSession {
    pub current_index: usize,
    pub previous_index: usize,
    /// Padded anchor box, or `None` for centered steps.
    pub highlight: Option<Rect>,
    pub placement: Placement,
    pub phase: TransitionPhase,
    /// False until the first layout has been applied.
    pub initialized: bool,
}

impl TutorialSession {
    fn new(config: &TutorialConfig) -> Self {
        Self {
            current_index: 0,
            previous_index: 0,
            highlight: None,
            placement: Placement {
                width: config.tooltip_width,
                ..Placement::default()
            },
            phase: TransitionPhase::Idle,
            initialized: false,
        }
    }
}

/// Window-level side effects the host applies on the engine's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TutorialEffect {
    /// Stop the page behind the overlay from scrolling.
    LockScroll,
    UnlockScroll,
    /// Start forwarding resize/scroll events to [`TutorialEngine::on_viewport_change`].
    SubscribeLayout,
    UnsubscribeLayout,
    /// The session ended; notify whoever opened it.
    Closed,
}

/// Keys the tutorial reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TutorialKey {
    Right,
    Left,
    Enter,
    Escape,
    Tab,
    Other,
}

/// Response to a key press.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyResponse {
    /// The key was consumed and must not reach the page behind the overlay.
    pub consumed: bool,
    pub effects: Vec<TutorialEffect>,
}

/// Drives one tutorial session.
#[derive(Debug, Clone)]
pub struct TutorialEngine {
    steps: Vec<TutorialStep>,
    config: TutorialConfig,
    sequencer: StepSequencer,
    session: TutorialSession,
    open: bool,
    /// FadingOut -> Repositioning.
    fade: Deadline,
    /// Repositioning -> FadingIn.
    settle: Deadline,
    /// Debounced re-layout after resize/scroll.
    relayout: Deadline,
    first_layout: FrameRequest,
    fade_in_done: FrameRequest,
}

impl TutorialEngine {
    pub fn new(steps: Vec<TutorialStep>, config: TutorialConfig) -> Self {
        let sequencer = StepSequencer::new(steps.len());
        let session = TutorialSession::new(&config);
        Self {
            steps,
            config,
            sequencer,
            session,
            open: false,
            fade: Deadline::new(),
            settle: Deadline::new(),
            relayout: Deadline::new(),
            first_layout: FrameRequest::default(),
            fade_in_done: FrameRequest::default(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn session(&self) -> &TutorialSession {
        &self.session
    }

    pub fn steps(&self) -> &[TutorialStep] {
        &self.steps
    }

    pub fn config(&self) -> &TutorialConfig {
        &self.config
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn is_first_step(&self) -> bool {
        self.sequencer.is_first()
    }

    pub fn is_last_step(&self) -> bool {
        self.sequencer.is_last()
    }

    /// The step being shown.
    pub fn current_step(&self) -> Result<&TutorialStep, DisplayFault> {
        let index = self.session.current_index;
        self.steps.get(index).ok_or(DisplayFault::StepDataMissing {
            index,
            len: self.steps.len(),
        })
    }

    pub fn is_centered(&self) -> bool {
        self.current_step().is_ok_and(TutorialStep::is_centered)
    }

    /// Earliest pending timer, so the host knows when to poll next.
    pub fn next_deadline(&self) -> Option<Instant> {
        earliest(
            earliest(self.fade.due(), self.settle.due()),
            self.relayout.due(),
        )
    }

    /// True if the engine wants [`on_frame`](Self::on_frame) called.
    pub fn needs_frame(&self) -> bool {
        self.first_layout.is_pending() || self.fade_in_done.is_pending()
    }

    /// Opens a fresh session at the first step.
    pub fn open(&mut self) -> Vec<TutorialEffect> {
        if self.open {
            return Vec::new();
        }

        self.cancel_timers();
        self.open = true;
        self.sequencer.reset();
        self.session = TutorialSession::new(&self.config);
        self.first_layout.request();
        tracing::info!(steps = self.steps.len(), "tutorial opened");

        vec![TutorialEffect::LockScroll, TutorialEffect::SubscribeLayout]
    }

    /// Ends the session and cancels everything pending.
    pub fn close(&mut self) -> Vec<TutorialEffect> {
        if !self.open {
            return Vec::new();
        }

        self.cancel_timers();
        self.open = false;
        self.session.phase = TransitionPhase::Idle;
        self.session.initialized = false;
        tracing::info!(step = self.session.current_index, "tutorial closed");

        vec![
            TutorialEffect::UnlockScroll,
            TutorialEffect::UnsubscribeLayout,
            TutorialEffect::Closed,
        ]
    }

    /// Applies a navigation command.
    pub fn command(&mut self, command: StepCommand, now: Instant) -> Vec<TutorialEffect> {
        if !self.open {
            return Vec::new();
        }

        let busy = !self.session.initialized || self.session.phase.is_transitioning();
        match self.sequencer.apply(command, busy) {
            SequencerOutcome::Moved { from, to } => {
                self.session.previous_index = from;
                self.session.current_index = to;
                self.session.phase = TransitionPhase::FadingOut;
                self.settle.cancel();
                self.fade_in_done.cancel();
                self.fade.arm(now, self.config.content_fade());
                tracing::debug!(from, to, "tutorial step change");
                Vec::new()
            }
            SequencerOutcome::Closed => self.close(),
            SequencerOutcome::Ignored => Vec::new(),
        }
    }

    /// Maps a key press to a command while the session is open.
    pub fn handle_key(&mut self, key: TutorialKey, now: Instant) -> KeyResponse {
        if !self.open {
            return KeyResponse::default();
        }

        let command = match key {
            TutorialKey::Right | TutorialKey::Enter => StepCommand::Next,
            TutorialKey::Left => StepCommand::Prev,
            TutorialKey::Escape => StepCommand::Close,
            // Focus stays inside the tour.
            TutorialKey::Tab => {
                return KeyResponse {
                    consumed: true,
                    effects: Vec::new(),
                };
            }
            TutorialKey::Other => return KeyResponse::default(),
        };

        KeyResponse {
            consumed: true,
            effects: self.command(command, now),
        }
    }

    /// Records a resize or scroll; re-layout runs once events go quiet.
    pub fn on_viewport_change(&mut self, now: Instant) {
        if self.open {
            self.relayout.arm(now, self.config.debounce());
        }
    }

    /// Runs due timers. Returns true if the session snapshot changed.
    pub fn poll<P: LayoutProbe>(&mut self, now: Instant, probe: &P) -> bool {
        if !self.open {
            return false;
        }

        let mut changed = false;

        if self.fade.fire_if_due(now) {
            self.session.phase = TransitionPhase::Repositioning;
            self.apply_layout(probe);
            self.settle.arm(now, self.config.transition());
            changed = true;
        }

        if self.settle.fire_if_due(now) {
            self.session.phase = TransitionPhase::FadingIn;
            self.fade_in_done.request();
            changed = true;
        }

        // A pending swap re-measures anyway.
        if self.relayout.fire_if_due(now) && self.session.phase != TransitionPhase::FadingOut {
            self.apply_layout(probe);
            changed = true;
        }

        changed
    }

    /// Runs frame callbacks. Returns true if the session snapshot changed.
    pub fn on_frame<P: LayoutProbe>(&mut self, probe: &P) -> bool {
        if !self.open {
            return false;
        }

        let mut changed = false;

        if self.first_layout.take() {
            self.apply_layout(probe);
            self.session.phase = TransitionPhase::Idle;
            self.session.initialized = true;
            changed = true;
        }

        if self.fade_in_done.take() && self.session.phase == TransitionPhase::FadingIn {
            self.session.phase = TransitionPhase::Idle;
            changed = true;
        }

        changed
    }

    /// Computes highlight and tooltip for the step at `index`.
    pub fn layout_for<P: LayoutProbe>(&self, index: usize, probe: &P) -> (Option<Rect>, Placement) {
        let viewport = probe.viewport();
        let Some(step) = self.steps.get(index) else {
            return (None, centered(viewport, &self.config));
        };
        let Some(selector) = step.anchor.as_deref() else {
            return (None, centered(viewport, &self.config));
        };

        if let Some(element) = probe.query_selector(selector) {
            let anchor = probe.bounding_box(&element);
            (
                Some(highlight_rect(anchor, &self.config)),
                place_tooltip(anchor, step.side, viewport, &self.config),
            )
        } else {
            DisplayFault::AnchorNotFound {
                selector: selector.to_string(),
            }
            .report();
            (None, centered(viewport, &self.config))
        }
    }

    fn apply_layout<P: LayoutProbe>(&mut self, probe: &P) {
        let (highlight, placement) = self.layout_for(self.session.current_index, probe);
        self.session.highlight = highlight;
        self.session.placement = placement;
    }

    fn cancel_timers(&mut self) {
        self.fade.cancel();
        self.settle.cancel();
        self.relayout.cancel();
        self.first_layout.cancel();
        self.fade_in_done.cancel();
    }
}
