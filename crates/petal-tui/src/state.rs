//! Application state.
//!
//! Everything the reducer mutates and the renderer reads lives here. Engines
//! own their timers; [`AppState::next_deadline`] tells the runtime when the
//! next one is due so it can pick the poll cadence.

use std::time::{Duration, Instant};

use petal_core::clipboard::Notice;
use petal_core::config::Config;
use petal_core::message::{ChatMessage, Transcript};
use petal_core::reveal::RevealEngine;
use petal_core::scheduler::{Deadline, earliest};
use petal_core::tutorial::TutorialEngine;

use crate::layout::{LayoutRegistry, ScreenLayout};
use crate::stream::ScriptedStream;

/// Label shown in the model chip.
pub const DEFAULT_MODEL: &str = "openai";

/// How long a notice stays in the status line.
pub const NOTICE_DURATION: Duration = Duration::from_secs(2);

pub struct AppState {
    pub config: Config,
    pub messages: Vec<ChatMessage>,
    pub stream: ScriptedStream,
    /// Typewriter for the message being streamed.
    pub reveal: RevealEngine,
    /// Message index `reveal` is attached to.
    pub revealing: Option<usize>,
    pub tutorial: TutorialEngine,
    pub registry: LayoutRegistry,
    pub layout: ScreenLayout,
    pub model_label: String,
    pub notice: Option<Notice>,
    notice_clear: Deadline,
    /// Lines scrolled up from the bottom of the transcript.
    pub scroll_offset: usize,
    /// Set while the tutorial overlay is open.
    pub scroll_locked: bool,
    /// Viewport changes are forwarded to the tutorial while set.
    pub layout_subscribed: bool,
    pub spinner_frame: usize,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(config: Config, transcript: Transcript, now: Instant) -> Self {
        let mut messages = transcript.messages;
        let stream = ScriptedStream::from_messages(&mut messages, &config.stream, now);
        let tutorial = TutorialEngine::new(
            config.tutorial.tour_steps(),
            config.tutorial.for_terminal(),
        );

        Self {
            reveal: RevealEngine::new(config.typewriter.base_speed()),
            revealing: None,
            stream,
            messages,
            tutorial,
            registry: LayoutRegistry::default(),
            layout: ScreenLayout::default(),
            model_label: DEFAULT_MODEL.to_string(),
            notice: None,
            notice_clear: Deadline::new(),
            scroll_offset: 0,
            scroll_locked: false,
            layout_subscribed: false,
            spinner_frame: 0,
            should_quit: false,
            config,
        }
    }

    /// Messages on screen. Replies queued behind the one streaming are hidden.
    pub fn visible_messages(&self) -> &[ChatMessage] {
        match self.stream.current_index() {
            Some(index) => &self.messages[..=index.min(self.messages.len().saturating_sub(1))],
            None => &self.messages,
        }
    }

    /// The most recent finished assistant reply on screen.
    pub fn last_assistant(&self) -> Option<&ChatMessage> {
        self.visible_messages()
            .iter()
            .rev()
            .find(|m| m.is_finished_reply())
    }

    pub fn show_notice(&mut self, notice: Notice, now: Instant) {
        self.notice = Some(notice);
        self.notice_clear.arm(now, NOTICE_DURATION);
    }

    /// Clears the notice once its time is up.
    pub fn expire_notice(&mut self, now: Instant) {
        if self.notice_clear.fire_if_due(now) {
            self.notice = None;
        }
    }

    /// Earliest timer due across every engine.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.reveal.next_deadline(),
            self.tutorial.next_deadline(),
            self.notice_clear.due(),
        ]
        .into_iter()
        .fold(self.stream.next_deadline(), earliest)
    }

    /// True while something animates or waits on a timer.
    pub fn is_busy(&self) -> bool {
        self.stream.is_active()
            || self.reveal.is_typing()
            || self.tutorial.needs_frame()
            || self.next_deadline().is_some()
    }

    pub fn spinner(&self) -> &'static str {
        const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
        FRAMES[(self.spinner_frame / 4) % FRAMES.len()]
    }
}
