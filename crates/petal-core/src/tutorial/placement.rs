//! Tooltip placement around an anchor element.
//!
//! Preference order for anchored steps:
//! 1. above, if the step prefers the top and the tooltip fits there
//! 2. below, if the step prefers the bottom or the tooltip fits there
//! 3. above, if it fits there
//! 4. centered in the viewport with no arrow
//!
//! The result is always clamped into the viewport minus the margin. When
//! the viewport is too small to honor both edges, the top/left edge wins.

use super::steps::PreferredSide;
use crate::config::TutorialConfig;
use crate::geometry::{ArrowDirection, Placement, Rect, Viewport};

/// Clamps `value` into `[lo, hi]`, letting `lo` win if the interval is empty.
fn clamp_low_wins(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi).max(lo)
}

pub fn is_narrow(viewport: Viewport, config: &TutorialConfig) -> bool {
    viewport.width <= config.mobile_breakpoint
}

fn full_width(viewport: Viewport, config: &TutorialConfig) -> f64 {
    viewport.width - config.viewport_margin * 2.0
}

/// The anchor's bounding box inflated by the highlight padding.
pub fn highlight_rect(anchor: Rect, config: &TutorialConfig) -> Rect {
    anchor.inflate(config.highlight_padding)
}

/// Layout for steps without an anchor.
pub fn centered(viewport: Viewport, config: &TutorialConfig) -> Placement {
    let width = if is_narrow(viewport, config) {
        full_width(viewport, config)
    } else {
        config.tooltip_center_width
    };

    Placement {
        x: (viewport.width - width) / 2.0,
        y: viewport.height * 0.35,
        width,
        arrow: ArrowDirection::None,
    }
}

/// Places the tooltip for an anchored step.
pub fn place_tooltip(
    anchor: Rect,
    side: PreferredSide,
    viewport: Viewport,
    config: &TutorialConfig,
) -> Placement {
    let narrow = is_narrow(viewport, config);
    let margin = config.viewport_margin;
    let height = config.tooltip_height;
    let width = if narrow {
        full_width(viewport, config)
    } else {
        config.tooltip_width
    };

    let needed = height + config.gap;
    let space_above = anchor.top - margin;
    let space_below = viewport.height - anchor.bottom() - margin;

    let x_near_anchor = if narrow {
        margin
    } else {
        clamp_low_wins(
            anchor.center_x() - width / 2.0,
            margin,
            viewport.width - width - margin,
        )
    };
    let above = anchor.top - height - config.gap;
    let below = anchor.bottom() + config.gap;

    let (x, y, arrow) = if side == PreferredSide::Top && space_above >= needed {
        (x_near_anchor, above, ArrowDirection::Bottom)
    } else if side == PreferredSide::Bottom || space_below >= needed {
        (x_near_anchor, below, ArrowDirection::Top)
    } else if space_above >= needed {
        (x_near_anchor, above, ArrowDirection::Bottom)
    } else {
        (
            (viewport.width - width) / 2.0,
            (viewport.height - height) / 2.0,
            ArrowDirection::None,
        )
    };

    Placement {
        x: clamp_low_wins(x, margin, viewport.width - width - margin),
        y: clamp_low_wins(y, margin, viewport.height - height - margin),
        width,
        arrow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TutorialConfig {
        TutorialConfig::default()
    }

    #[test]
    fn test_prefers_top_when_it_fits() {
        let viewport = Viewport::new(1280.0, 800.0);
        let anchor = Rect::new(700.0, 600.0, 80.0, 40.0);
        let placement = place_tooltip(anchor, PreferredSide::Top, viewport, &config());

        assert_eq!(placement.arrow, ArrowDirection::Bottom);
        assert_eq!(placement.y, 700.0 - 320.0 - 20.0);
        assert_eq!(placement.x, 640.0 - 200.0);
        assert_eq!(placement.width, 400.0);
    }

    #[test]
    fn test_preferred_bottom_wins_even_without_space() {
        let viewport = Viewport::new(1280.0, 800.0);
        let anchor = Rect::new(700.0, 600.0, 80.0, 40.0);
        let placement = place_tooltip(anchor, PreferredSide::Bottom, viewport, &config());

        assert_eq!(placement.arrow, ArrowDirection::Top);
        // Clamped back inside the viewport.
        assert_eq!(placement.y, 800.0 - 320.0 - 20.0);
    }

    #[test]
    fn test_top_without_space_falls_to_below() {
        let viewport = Viewport::new(1280.0, 800.0);
        let anchor = Rect::new(40.0, 20.0, 120.0, 30.0);
        let placement = place_tooltip(anchor, PreferredSide::Top, viewport, &config());

        assert_eq!(placement.arrow, ArrowDirection::Top);
        assert_eq!(placement.y, 90.0);
        assert_eq!(placement.x, 20.0);
    }

    #[test]
    fn test_center_side_uses_above_when_below_is_short() {
        let viewport = Viewport::new(1280.0, 800.0);
        let anchor = Rect::new(600.0, 300.0, 100.0, 40.0);
        let placement = place_tooltip(anchor, PreferredSide::Center, viewport, &config());

        assert_eq!(placement.arrow, ArrowDirection::Bottom);
        assert_eq!(placement.y, 260.0);
    }

    #[test]
    fn test_no_space_anywhere_centers_without_arrow() {
        let viewport = Viewport::new(1280.0, 500.0);
        let anchor = Rect::new(330.0, 600.0, 80.0, 40.0);
        let placement = place_tooltip(anchor, PreferredSide::Top, viewport, &config());

        assert_eq!(placement.arrow, ArrowDirection::None);
        assert_eq!(placement.x, (1280.0 - 400.0) / 2.0);
        assert_eq!(placement.y, (500.0 - 320.0) / 2.0);
    }

    #[test]
    fn test_narrow_viewport_forces_full_width() {
        let viewport = Viewport::new(600.0, 900.0);
        let anchor = Rect::new(800.0, 500.0, 60.0, 40.0);
        let placement = place_tooltip(anchor, PreferredSide::Top, viewport, &config());

        assert_eq!(placement.width, 560.0);
        assert_eq!(placement.x, 20.0);
    }

    #[test]
    fn test_centered_layout() {
        let cfg = config();
        let wide = centered(Viewport::new(1280.0, 800.0), &cfg);
        assert_eq!(wide.width, 480.0);
        assert_eq!(wide.x, 400.0);
        assert_eq!(wide.y, 280.0);
        assert_eq!(wide.arrow, ArrowDirection::None);

        let narrow = centered(Viewport::new(400.0, 800.0), &cfg);
        assert_eq!(narrow.width, 360.0);
        assert_eq!(narrow.x, 20.0);
    }

    #[test]
    fn test_highlight_rect_is_padded() {
        let rect = highlight_rect(Rect::new(10.0, 10.0, 5.0, 5.0), &config());
        assert_eq!(rect, Rect::new(-2.0, -2.0, 29.0, 29.0));
    }

    #[test]
    fn test_placement_always_within_margins() {
        let cfg = config();
        let sides = [PreferredSide::Top, PreferredSide::Bottom, PreferredSide::Center];
        for (vw, vh) in [(1280.0, 800.0), (800.0, 700.0), (600.0, 400.0), (1920.0, 1080.0)] {
            let viewport = Viewport::new(vw, vh);
            for top in [-200.0, 0.0, 15.0, 200.0, vh / 2.0, vh - 10.0, vh + 300.0] {
                for left in [-100.0, 0.0, vw / 3.0, vw - 5.0, vw + 50.0] {
                    for side in sides {
                        let anchor = Rect::new(top, left, 120.0, 36.0);
                        let p = place_tooltip(anchor, side, viewport, &cfg);
                        let m = cfg.viewport_margin;
                        assert!(p.x >= m && p.x <= vw - p.width - m, "x {p:?} in {viewport:?}");
                        assert!(
                            p.y >= m && p.y <= vh - cfg.tooltip_height - m,
                            "y {p:?} in {viewport:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_terminal_cells() {
        let cfg = TutorialConfig::default().for_terminal();
        let viewport = Viewport::new(120.0, 40.0);
        let anchor = Rect::new(37.0, 1.0, 80.0, 1.0);
        let placement = place_tooltip(anchor, PreferredSide::Top, viewport, &cfg);

        assert_eq!(placement.arrow, ArrowDirection::Bottom);
        assert_eq!(placement.y, 37.0 - 12.0 - 1.0);
        assert_eq!(placement.width, 46.0);
    }
}
