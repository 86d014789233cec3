//! Screen regions and the registry the tutorial measures them through.
//!
//! The screen is split once per frame. Regions the onboarding tour points at
//! are registered under the same selectors the stock steps use, so the
//! tutorial engine can find them like it would find elements on a page.

use std::collections::HashMap;

use petal_core::geometry::{Rect as ViewRect, Viewport};
use petal_core::tutorial::LayoutProbe;
use petal_core::tutorial::steps::anchors;
use ratatui::layout::{Constraint, Layout, Rect};
use unicode_width::UnicodeWidthStr;

/// Height of the bordered input box.
pub const INPUT_HEIGHT: u16 = 3;

/// Title shown at the left of the header.
pub const TITLE: &str = " petal ";

/// Label of the attach button inside the input box.
pub const ATTACH_LABEL: &str = "[+]";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenLayout {
    pub area: Rect,
    pub header: Rect,
    pub model_chip: Rect,
    pub transcript: Rect,
    pub input: Rect,
    pub attach_button: Rect,
    pub message_input: Rect,
    pub status: Rect,
}

/// Splits `area` into the chat screen regions.
pub fn compute(area: Rect, model_label: &str) -> ScreenLayout {
    let [header, transcript, input, status] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(INPUT_HEIGHT),
        Constraint::Length(1),
    ])
    .areas(area);

    let title_width = TITLE.width() as u16 + 1;
    let chip_width = (model_chip_text(model_label).width() as u16)
        .min(header.width.saturating_sub(title_width));
    let model_chip = Rect::new(header.x + title_width, header.y, chip_width, header.height)
        .intersection(header);

    let inner = Rect::new(
        input.x + 1,
        input.y + 1,
        input.width.saturating_sub(2),
        input.height.saturating_sub(2),
    );
    let attach_width = (ATTACH_LABEL.width() as u16).min(inner.width);
    let attach_button = Rect::new(inner.x, inner.y, attach_width, inner.height.min(1));
    let gap = attach_width + 1;
    let message_input = Rect::new(
        inner.x + gap.min(inner.width),
        inner.y,
        inner.width.saturating_sub(gap),
        inner.height.min(1),
    );

    ScreenLayout {
        area,
        header,
        model_chip,
        transcript,
        input,
        attach_button,
        message_input,
        status,
    }
}

/// Text of the model chip, padded for the highlight.
pub fn model_chip_text(model_label: &str) -> String {
    format!(" ◆ {model_label} ")
}

/// Converts a terminal rect into viewport units (one cell per unit).
pub fn to_view(rect: Rect) -> ViewRect {
    ViewRect::new(
        f64::from(rect.y),
        f64::from(rect.x),
        f64::from(rect.width),
        f64::from(rect.height),
    )
}

/// Converts viewport units back to cells, clipped to `bounds`.
pub fn to_cells(rect: ViewRect, bounds: Rect) -> Rect {
    let left = rect.left.round().max(f64::from(bounds.x));
    let top = rect.top.round().max(f64::from(bounds.y));
    let right = rect.right().round().min(f64::from(bounds.right()));
    let bottom = rect.bottom().round().min(f64::from(bounds.bottom()));

    if right <= left || bottom <= top {
        return Rect::default();
    }

    Rect::new(
        left as u16,
        top as u16,
        (right - left) as u16,
        (bottom - top) as u16,
    )
}

/// Regions measured on the last frame, keyed by selector.
#[derive(Debug, Clone, Default)]
pub struct LayoutRegistry {
    viewport: Viewport,
    regions: HashMap<String, ViewRect>,
}

impl LayoutRegistry {
    /// Replaces every region with the ones in `layout`.
    pub fn refresh(&mut self, layout: &ScreenLayout) {
        self.viewport = Viewport::new(f64::from(layout.area.width), f64::from(layout.area.height));
        self.regions.clear();
        self.register(anchors::MODEL_CHIP, layout.model_chip);
        self.register(anchors::ATTACH_BUTTON, layout.attach_button);
        self.register(anchors::MESSAGE_INPUT, layout.message_input);
    }

    /// Registers `rect` under `selector`. Empty regions are not on screen.
    pub fn register(&mut self, selector: &str, rect: Rect) {
        if rect.is_empty() {
            self.regions.remove(selector);
        } else {
            self.regions.insert(selector.to_string(), to_view(rect));
        }
    }

    pub fn get(&self, selector: &str) -> Option<ViewRect> {
        self.regions.get(selector).copied()
    }
}

impl LayoutProbe for LayoutRegistry {
    type Element = ViewRect;

    fn query_selector(&self, selector: &str) -> Option<ViewRect> {
        self.get(selector)
    }

    fn bounding_box(&self, element: &ViewRect) -> ViewRect {
        *element
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_splits_screen() {
        let layout = compute(Rect::new(0, 0, 100, 30), "openai");

        assert_eq!(layout.header, Rect::new(0, 0, 100, 1));
        assert_eq!(layout.transcript, Rect::new(0, 1, 100, 25));
        assert_eq!(layout.input, Rect::new(0, 26, 100, 3));
        assert_eq!(layout.status, Rect::new(0, 29, 100, 1));
        assert_eq!(layout.model_chip, Rect::new(8, 0, 10, 1));
        assert_eq!(layout.attach_button, Rect::new(1, 27, 3, 1));
        assert_eq!(layout.message_input, Rect::new(5, 27, 94, 1));
    }

    #[test]
    fn test_registry_exposes_anchors() {
        let mut registry = LayoutRegistry::default();
        registry.refresh(&compute(Rect::new(0, 0, 100, 30), "openai"));

        assert_eq!(registry.viewport(), Viewport::new(100.0, 30.0));
        let input = registry.query_selector(anchors::MESSAGE_INPUT).unwrap();
        assert_eq!(registry.bounding_box(&input), ViewRect::new(27.0, 5.0, 94.0, 1.0));
        assert!(registry.query_selector(".nothing").is_none());
    }

    #[test]
    fn test_tiny_screen_drops_empty_regions() {
        let mut registry = LayoutRegistry::default();
        registry.refresh(&compute(Rect::new(0, 0, 2, 6), "openai"));
        assert!(registry.query_selector(anchors::MESSAGE_INPUT).is_none());
    }

    #[test]
    fn test_to_cells_clips_to_bounds() {
        let bounds = Rect::new(0, 0, 80, 24);
        assert_eq!(
            to_cells(ViewRect::new(-1.0, -1.0, 10.0, 3.0), bounds),
            Rect::new(0, 0, 9, 2)
        );
        assert_eq!(
            to_cells(ViewRect::new(2.0, 4.0, 5.0, 1.0), bounds),
            Rect::new(4, 2, 5, 1)
        );
        assert_eq!(to_cells(ViewRect::new(30.0, 0.0, 5.0, 5.0), bounds), Rect::default());
    }
}
