//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event, now)`
//! and executes the returned effects.

use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use petal_core::clipboard::Notice;
use petal_core::message::{ChatMessage, MessageView};
use petal_core::reveal::RevealEngine;
use petal_core::tutorial::TutorialKey;
use ratatui::layout::Rect;

use crate::effects::{self, UiEffect};
use crate::events::UiEvent;
use crate::layout;
use crate::render;
use crate::state::AppState;
use crate::stream::StreamChunk;

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent, now: Instant) -> Vec<UiEffect> {
    match event {
        UiEvent::Frame { width, height } => {
            handle_frame(app, width, height, now);
            vec![]
        }
        UiEvent::Tick => {
            handle_tick(app, now);
            vec![]
        }
        UiEvent::Terminal(Event::Key(key)) if key.kind == KeyEventKind::Press => {
            handle_key(app, key, now)
        }
        UiEvent::Terminal(_) => vec![],
        UiEvent::Notice(notice) => {
            app.show_notice(notice, now);
            vec![]
        }
    }
}

/// Re-measures the screen and lets the tutorial apply pending geometry.
fn handle_frame(app: &mut AppState, width: u16, height: u16, now: Instant) {
    let area = Rect::new(0, 0, width, height);
    if area != app.layout.area {
        let resized = app.layout.area != Rect::default();
        app.layout = layout::compute(area, &app.model_label);
        app.registry.refresh(&app.layout);
        if resized && app.layout_subscribed {
            app.tutorial.on_viewport_change(now);
        }
    }

    if app.scroll_offset > 0 {
        app.scroll_offset = app.scroll_offset.min(render::max_scroll(app));
    }

    app.tutorial.on_frame(&app.registry);
}

fn handle_tick(app: &mut AppState, now: Instant) {
    app.spinner_frame = app.spinner_frame.wrapping_add(1);

    if let Some(chunk) = app.stream.poll(now) {
        apply_chunk(app, chunk, now);
    }
    if app.reveal.poll(now).completed {
        app.scroll_offset = 0;
    }

    app.tutorial.poll(now, &app.registry);
    app.expire_notice(now);
}

/// Appends a streamed chunk and retargets the typewriter.
fn apply_chunk(app: &mut AppState, chunk: StreamChunk, now: Instant) {
    let Some(message) = app.messages.get_mut(chunk.index) else {
        return;
    };
    message.content.push_str(&chunk.text);
    if chunk.done {
        message.is_streaming = false;
        if let Some(fault) = message.malformed_tag() {
            fault.report();
        }
    }

    if app.revealing != Some(chunk.index) {
        app.reveal = RevealEngine::new(app.config.typewriter.base_speed());
        app.revealing = Some(chunk.index);
        app.scroll_offset = 0;
    }

    // Think tags are re-parsed from the whole content on every chunk.
    let view = MessageView::from_message(message);
    let update = app
        .reveal
        .set_target(view.display_content, message.is_streaming, now);
    if update.completed || chunk.done {
        app.scroll_offset = 0;
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent, now: Instant) -> Vec<UiEffect> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![UiEffect::Quit];
    }

    // The overlay sees keys first and swallows the ones it handles.
    if app.tutorial.is_open() {
        let response = app.tutorial.handle_key(tutorial_key(key.code), now);
        if response.consumed {
            return effects::from_tutorial(response.effects);
        }
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => vec![UiEffect::Quit],
        KeyCode::F(1) => open_tutorial(app),
        KeyCode::Char('y') => copy_last_reply(app, now),
        KeyCode::Up => scroll_by(app, 1, true),
        KeyCode::Down => scroll_by(app, 1, false),
        KeyCode::PageUp => scroll_by(app, page(app), true),
        KeyCode::PageDown => scroll_by(app, page(app), false),
        KeyCode::End => scroll_by(app, usize::MAX, false),
        _ => vec![],
    }
}

/// Opens the onboarding tour.
pub fn open_tutorial(app: &mut AppState) -> Vec<UiEffect> {
    let effects = effects::from_tutorial(app.tutorial.open());
    if let Err(fault) = app.tutorial.current_step() {
        fault.report();
    }
    effects
}

fn copy_last_reply(app: &mut AppState, now: Instant) -> Vec<UiEffect> {
    match app.last_assistant().map(ChatMessage::copy_text) {
        Some(text) if !text.is_empty() => vec![UiEffect::CopyToClipboard { text }],
        _ => {
            app.show_notice(Notice::info("Nothing to copy yet"), now);
            vec![]
        }
    }
}

fn scroll_by(app: &mut AppState, lines: usize, up: bool) -> Vec<UiEffect> {
    if app.scroll_locked {
        return vec![];
    }
    app.scroll_offset = if up {
        app.scroll_offset
            .saturating_add(lines)
            .min(render::max_scroll(app))
    } else {
        app.scroll_offset.saturating_sub(lines)
    };
    vec![]
}

fn page(app: &AppState) -> usize {
    usize::from(app.layout.transcript.height.saturating_sub(1)).max(1)
}

fn tutorial_key(code: KeyCode) -> TutorialKey {
    match code {
        KeyCode::Right => TutorialKey::Right,
        KeyCode::Left => TutorialKey::Left,
        KeyCode::Enter => TutorialKey::Enter,
        KeyCode::Esc => TutorialKey::Escape,
        KeyCode::Tab | KeyCode::BackTab => TutorialKey::Tab,
        _ => TutorialKey::Other,
    }
}
