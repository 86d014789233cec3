//! Onboarding tour overlay.
//!
//! Draws a snapshot of the tutorial session: everything outside the
//! highlight is dimmed, the highlight gets a ring, and the tooltip sits at
//! the placement the engine computed. Step content is hidden while the
//! tooltip fades out and moves.

use petal_core::geometry::{ArrowDirection, Rect as ViewRect, Viewport};
use petal_core::tutorial::{TutorialEngine, TutorialSession, TutorialStep};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Paragraph};

use crate::layout::to_cells;
use crate::markdown::wrap_plain;

const ACCENT: Color = Color::Magenta;

pub fn render(engine: &TutorialEngine, frame: &mut Frame) {
    // Missing step data was reported when the tour opened.
    let Ok(step) = engine.current_step() else {
        return;
    };

    let area = frame.area();
    let session = engine.session();
    let viewport = Viewport::new(f64::from(area.width), f64::from(area.height));

    dim_backdrop(frame.buffer_mut(), area, session.highlight, viewport);
    if let Some(highlight) = session.highlight {
        draw_ring(frame, highlight, area);
    }

    let height = engine.config().tooltip_height;
    let placement = session.placement;
    let tooltip = to_cells(
        ViewRect::new(placement.y, placement.x, placement.width, height),
        area,
    );
    if tooltip.width < 4 || tooltip.height < 3 {
        return;
    }

    let visible = session.phase.content_visible();
    let mut block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT));
    if visible {
        block = block.title(Span::styled(
            format!(" {} {} ", step.icon, step.title),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ));
    }
    let inner = block.inner(tooltip);

    frame.render_widget(Clear, tooltip);
    frame.render_widget(block, tooltip);
    draw_arrow(frame.buffer_mut(), session, tooltip);

    if visible {
        render_content(frame, engine, step, inner);
    }
}

/// Dims every band around the highlight, or the whole screen without one.
fn dim_backdrop(buf: &mut Buffer, area: Rect, highlight: Option<ViewRect>, viewport: Viewport) {
    let style = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::DIM);
    match highlight {
        Some(hole) => {
            for band in hole.backdrop_bands(viewport) {
                let cells = to_cells(band, area);
                if !cells.is_empty() {
                    buf.set_style(cells, style);
                }
            }
        }
        None => buf.set_style(area, style),
    }
}

/// Rings the highlight. A ring that would leave the screen would cover the
/// anchor itself, so those anchors are emphasized in place instead.
fn draw_ring(frame: &mut Frame, highlight: ViewRect, area: Rect) {
    let cells = to_cells(highlight, area);
    if cells.is_empty() {
        return;
    }

    let on_screen = highlight.left >= f64::from(area.x)
        && highlight.top >= f64::from(area.y)
        && highlight.right() <= f64::from(area.right())
        && highlight.bottom() <= f64::from(area.bottom());

    if on_screen && cells.width >= 2 && cells.height >= 2 {
        let ring = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(ACCENT));
        frame.render_widget(ring, cells);
    } else {
        frame
            .buffer_mut()
            .set_style(cells, Style::default().add_modifier(Modifier::BOLD));
    }
}

fn draw_arrow(buf: &mut Buffer, session: &TutorialSession, tooltip: Rect) {
    let Some(highlight) = session.highlight else {
        return;
    };

    let inner_left = tooltip.x + 2;
    let inner_right = tooltip.right().saturating_sub(3).max(inner_left);
    let x = (highlight.center_x().round().max(0.0) as u16).clamp(inner_left, inner_right);

    let (symbol, y) = match session.placement.arrow {
        ArrowDirection::Top => ("▲", tooltip.y),
        ArrowDirection::Bottom => ("▼", tooltip.bottom().saturating_sub(1)),
        ArrowDirection::Left | ArrowDirection::Right | ArrowDirection::None => return,
    };

    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_symbol(symbol).set_style(Style::default().fg(ACCENT));
    }
}

fn render_content(frame: &mut Frame, engine: &TutorialEngine, step: &TutorialStep, inner: Rect) {
    let [body_area, progress_area, hints_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let width = usize::from(body_area.width).max(1);
    let mut lines = wrap_plain(&step.body, width, "", Style::default());

    if let Some(example) = &step.example {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Try:", dim())));
        lines.extend(wrap_plain(
            example,
            width,
            "  ",
            Style::default().fg(Color::Yellow),
        ));
    }

    if !step.shortcuts.is_empty() {
        lines.push(Line::default());
        for shortcut in &step.shortcuts {
            let keys = shortcut.keys.join("+");
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {keys:<8}"),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(shortcut.action.clone()),
            ]));
        }
    }

    frame.render_widget(Paragraph::new(lines), body_area);
    frame.render_widget(Paragraph::new(progress_line(engine)), progress_area);
    frame.render_widget(
        Paragraph::new(Span::styled(hints(engine), dim())),
        hints_area,
    );
}

/// Progress dots followed by `n/total`.
fn progress_line(engine: &TutorialEngine) -> Line<'static> {
    let current = engine.session().current_index;
    let total = engine.total_steps();

    let mut spans: Vec<Span<'static>> = (0..total)
        .map(|i| {
            if i == current {
                Span::styled("● ", Style::default().fg(ACCENT))
            } else {
                Span::styled("○ ", dim())
            }
        })
        .collect();
    spans.push(Span::styled(format!(" {}/{total}", current + 1), dim()));
    Line::from(spans)
}

fn hints(engine: &TutorialEngine) -> &'static str {
    match (engine.is_first_step(), engine.is_last_step()) {
        (_, true) => "← back · enter finish · esc close",
        (true, false) => "→ next · esc skip tour",
        (false, false) => "← back · → next · esc skip tour",
    }
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}
