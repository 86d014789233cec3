//! Viewport geometry shared by the tutorial engine and its hosts.
//!
//! All values are in viewport coordinates with the origin at the top-left.
//! A web host would feed CSS pixels; the terminal host feeds character cells.

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    /// Grows the rectangle by `padding` on every side.
    #[must_use]
    pub fn inflate(&self, padding: f64) -> Self {
        Self {
            top: self.top - padding,
            left: self.left - padding,
            width: self.width + padding * 2.0,
            height: self.height + padding * 2.0,
        }
    }

    /// Returns the four bands of `viewport` that surround this rectangle
    /// (above, below, left, right), clipped to the viewport.
    ///
    /// A backdrop painted over these bands leaves the rectangle uncovered.
    /// Empty bands have zero width or height.
    pub fn backdrop_bands(&self, viewport: Viewport) -> [Rect; 4] {
        let top = self.top.clamp(0.0, viewport.height);
        let bottom = self.bottom().clamp(top, viewport.height);
        let left = self.left.clamp(0.0, viewport.width);
        let right = self.right().clamp(left, viewport.width);

        [
            Rect::new(0.0, 0.0, viewport.width, top),
            Rect::new(bottom, 0.0, viewport.width, viewport.height - bottom),
            Rect::new(top, 0.0, left, bottom - top),
            Rect::new(top, right, viewport.width - right, bottom - top),
        ]
    }
}

/// Current size of the visible area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1024.0, 768.0)
    }
}

/// Which edge of the tooltip the pointer arrow sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrowDirection {
    Top,
    Bottom,
    Left,
    Right,
    #[default]
    None,
}

/// Tooltip position and width.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub arrow: ArrowDirection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inflate() {
        let rect = Rect::new(100.0, 50.0, 40.0, 20.0).inflate(12.0);
        assert_eq!(rect, Rect::new(88.0, 38.0, 64.0, 44.0));
    }

    #[test]
    fn test_backdrop_bands_cover_everything_but_hole() {
        let viewport = Viewport::new(100.0, 50.0);
        let hole = Rect::new(10.0, 20.0, 30.0, 5.0);
        let [above, below, left, right] = hole.backdrop_bands(viewport);

        assert_eq!(above, Rect::new(0.0, 0.0, 100.0, 10.0));
        assert_eq!(below, Rect::new(15.0, 0.0, 100.0, 35.0));
        assert_eq!(left, Rect::new(10.0, 0.0, 20.0, 5.0));
        assert_eq!(right, Rect::new(10.0, 50.0, 50.0, 5.0));

        let covered: f64 = [above, below, left, right]
            .iter()
            .map(|r| r.width * r.height)
            .sum();
        assert_eq!(covered, 100.0 * 50.0 - 30.0 * 5.0);
    }

    #[test]
    fn test_backdrop_bands_clip_offscreen_hole() {
        let viewport = Viewport::new(100.0, 50.0);
        let hole = Rect::new(-8.0, -8.0, 20.0, 20.0);
        let [above, below, left, right] = hole.backdrop_bands(viewport);

        assert_eq!(above.height, 0.0);
        assert_eq!(left.width, 0.0);
        assert_eq!(below.top, 12.0);
        assert_eq!(right.left, 12.0);
    }
}
