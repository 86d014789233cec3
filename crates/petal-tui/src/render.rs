//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState` by immutable reference and draw to a
//! ratatui Frame. They never mutate state or return effects.

use petal_core::clipboard::NoticeLevel;
use petal_core::message::{Attachment, ChatMessage, GeneratedMedia, MediaKind, MessageView, Role};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::layout::{self, ATTACH_LABEL, TITLE};
use crate::markdown::{render_message, wrap_plain};
use crate::state::AppState;
use crate::tutorial_view;

/// Horizontal margin on each side of the transcript.
pub const TRANSCRIPT_MARGIN: u16 = 1;

const PLACEHOLDER: &str = "Message petal…";
const EMPTY_HINT: &str = "No messages yet. Press F1 for a quick tour.";
const KEY_HINTS: &str = "F1 tour · y copy · ↑↓ scroll · q quit";
const CURSOR: &str = "▌";

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let screen = if app.layout.area == frame.area() {
        app.layout
    } else {
        layout::compute(frame.area(), &app.model_label)
    };

    render_header(app, frame, screen.header, screen.model_chip);
    render_transcript(app, frame, screen.transcript);
    render_input(frame, &screen);
    render_status(app, frame, screen.status);

    if app.tutorial.is_open() && app.tutorial.session().initialized {
        tutorial_view::render(&app.tutorial, frame);
    }
}

fn render_header(app: &AppState, frame: &mut Frame, area: Rect, chip: Rect) {
    let title = Paragraph::new(Span::styled(
        TITLE,
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(title, area);

    let chip_text = Paragraph::new(Span::styled(
        layout::model_chip_text(&app.model_label),
        Style::default().fg(Color::White).bg(Color::DarkGray),
    ));
    frame.render_widget(chip_text, chip);
}

fn transcript_width(area: Rect) -> usize {
    usize::from(area.width.saturating_sub(TRANSCRIPT_MARGIN * 2)).max(1)
}

/// Lines the transcript can be scrolled up by.
pub fn max_scroll(app: &AppState) -> usize {
    let area = app.layout.transcript;
    transcript_lines(app, transcript_width(area))
        .len()
        .saturating_sub(usize::from(area.height))
}

fn render_transcript(app: &AppState, frame: &mut Frame, area: Rect) {
    let inner = Rect::new(
        area.x + TRANSCRIPT_MARGIN.min(area.width),
        area.y,
        area.width.saturating_sub(TRANSCRIPT_MARGIN * 2),
        area.height,
    );

    if app.visible_messages().is_empty() {
        let hint = Paragraph::new(Span::styled(EMPTY_HINT, dim()))
            .alignment(Alignment::Center);
        let middle = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1.min(inner.height));
        frame.render_widget(hint, middle);
        return;
    }

    let lines = transcript_lines(app, usize::from(inner.width).max(1));
    let height = usize::from(inner.height);
    let offset = app.scroll_offset.min(lines.len().saturating_sub(height));
    let end = lines.len() - offset;
    let start = end.saturating_sub(height);

    frame.render_widget(Paragraph::new(lines[start..end].to_vec()), inner);
}

/// Every transcript line at `width`, top to bottom.
pub fn transcript_lines(app: &AppState, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (index, message) in app.visible_messages().iter().enumerate() {
        if index > 0 {
            lines.push(Line::default());
        }
        message_lines(app, index, message, width, &mut lines);
    }
    lines
}

fn message_lines(
    app: &AppState,
    index: usize,
    message: &ChatMessage,
    width: usize,
    lines: &mut Vec<Line<'static>>,
) {
    let view = MessageView::from_message(message);
    lines.push(role_header(message.role));

    for attachment in &view.attachments {
        lines.push(attachment_line(attachment));
    }
    for media in message.generated_media() {
        media_lines(&media, width, lines);
    }

    if message.role != Role::Assistant {
        lines.extend(wrap_plain(&view.display_content, width, "", Style::default()));
        return;
    }

    if view.has_reasoning {
        reasoning_lines(app, &view, width, lines);
    }

    if message.is_error {
        let error = Style::default().fg(Color::Red);
        lines.extend(wrap_plain(&format!("⚠ {}", view.display_content), width, "", error));
        return;
    }

    if message.is_streaming {
        let shown = if app.revealing == Some(index) {
            app.reveal.displayed()
        } else {
            ""
        };
        if shown.is_empty() {
            if !view.has_reasoning {
                lines.push(Line::from(Span::styled(
                    format!("{} Thinking…", app.spinner()),
                    dim(),
                )));
            }
        } else {
            let body = render_message(shown, width, true);
            let typing = app.reveal.is_typing() && !body.is_empty();
            lines.extend(body);
            if typing && let Some(last) = lines.last_mut() {
                last.push_span(Span::styled(CURSOR, Style::default().fg(Color::Magenta)));
            }
        }
        return;
    }

    lines.extend(render_message(&view.display_content, width, false));
}

fn role_header(role: Role) -> Line<'static> {
    let (label, color) = match role {
        Role::User => ("You", Color::Cyan),
        Role::Assistant => ("petal", Color::Magenta),
        Role::System => ("system", Color::DarkGray),
    };
    Line::from(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn reasoning_lines(app: &AppState, view: &MessageView, width: usize, lines: &mut Vec<Line<'static>>) {
    let header = if view.is_thinking {
        format!("▾ Thinking {}", app.spinner())
    } else {
        "▸ Thought process".to_string()
    };
    lines.push(Line::from(Span::styled(
        header,
        dim().add_modifier(Modifier::ITALIC),
    )));
    lines.extend(wrap_plain(
        &view.display_reasoning,
        width,
        "│ ",
        dim().add_modifier(Modifier::ITALIC),
    ));
}

fn attachment_line(attachment: &Attachment) -> Line<'static> {
    let icon = if attachment.is_image() { "▣" } else { "▤" };
    let mime = attachment
        .mime_type
        .as_deref()
        .unwrap_or("application/octet-stream");

    let mut details = mime.to_string();
    if let Some(size) = attachment.decoded_len() {
        details.push_str(" · ");
        details.push_str(&format_size(size));
    }

    Line::from(vec![
        Span::styled(format!("{icon} "), Style::default().fg(Color::Cyan)),
        Span::raw(attachment.display_name().to_string()),
        Span::styled(format!("  {details}"), dim()),
    ])
}

/// Generated image or video: a labeled row, then the wrapped URL.
fn media_lines(media: &GeneratedMedia, width: usize, lines: &mut Vec<Line<'static>>) {
    let (icon, label) = match media.kind {
        MediaKind::Image => ("▣", "Generated image"),
        MediaKind::Video => ("▶", "Generated video"),
    };

    let mut spans = vec![
        Span::styled(format!("{icon} "), Style::default().fg(Color::Magenta)),
        Span::raw(label),
    ];
    if media.is_loading() {
        spans.push(Span::styled(" (loading)", dim()));
    }
    lines.push(Line::from(spans));

    if let Some(prompt) = &media.prompt {
        lines.extend(wrap_plain(&format!("Prompt: {prompt}"), width, "  ", Style::default()));
    }
    if let Some(model) = &media.model {
        lines.push(Line::from(Span::styled(format!("  Model: {model}"), dim())));
    }
    if !media.url.starts_with("data:") {
        lines.extend(wrap_plain(&media.url, width, "  ", dim().add_modifier(Modifier::UNDERLINED)));
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let value = bytes as f64;
    if value < KB {
        format!("{bytes} B")
    } else if value < KB * KB {
        format!("{:.1} KB", value / KB)
    } else {
        format!("{:.1} MB", value / (KB * KB))
    }
}

fn render_input(frame: &mut Frame, screen: &layout::ScreenLayout) {
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(dim());
    frame.render_widget(block, screen.input);

    frame.render_widget(
        Paragraph::new(Span::styled(
            ATTACH_LABEL,
            Style::default().fg(Color::Magenta),
        )),
        screen.attach_button,
    );
    frame.render_widget(
        Paragraph::new(Span::styled(PLACEHOLDER, dim())),
        screen.message_input,
    );
}

fn render_status(app: &AppState, frame: &mut Frame, area: Rect) {
    let left = match &app.notice {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => Color::Green,
                NoticeLevel::Error => Color::Red,
            };
            Span::styled(format!(" {}", notice.message), Style::default().fg(color))
        }
        None => Span::styled(format!(" {KEY_HINTS}"), dim()),
    };
    frame.render_widget(Paragraph::new(left), area);

    if app.stream.is_active() {
        let right = format!("{} streaming ", app.spinner());
        let width = (right.width() as u16).min(area.width);
        let spot = Rect::new(area.right() - width, area.y, width, area.height);
        frame.render_widget(
            Paragraph::new(Span::styled(right, Style::default().fg(Color::Magenta))),
            spot,
        );
    }
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}
