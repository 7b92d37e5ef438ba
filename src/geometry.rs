//! Axis-aligned regions of interest in pixel coordinates.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle `(x, y, width, height)`, top-left origin.
///
/// Coordinates are kept as `f64` so that filter estimates and visual tracker
/// outputs can carry sub-pixel values; rounding to whole pixels happens at
/// the boundaries that need it (`rounded`, depth sampling).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Roi {
    /// Sentinel box returned when no estimate exists.
    pub const INVALID: Roi = Roi {
        x: -1.0,
        y: -1.0,
        width: -1.0,
        height: -1.0,
    };

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build a box from two opposite corners, e.g. the start and end of a
    /// mouse drag. The result is always normalized.
    pub fn from_corners(p0: (f64, f64), p1: (f64, f64)) -> Self {
        Self::new(p0.0, p0.1, p1.0 - p0.0, p1.1 - p0.1).normalized()
    }

    /// `false` for the sentinel box.
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Whether every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Flip negative extents to positive magnitudes, moving the origin so
    /// the covered area is unchanged.
    pub fn normalized(&self) -> Self {
        let (x, width) = if self.width >= 0.0 {
            (self.x, self.width)
        } else {
            (self.x + self.width, -self.width)
        };
        let (y, height) = if self.height >= 0.0 {
            (self.y, self.height)
        } else {
            (self.y + self.height, -self.height)
        };
        Self { x, y, width, height }
    }

    /// Round every component to the nearest whole pixel (ties to even).
    pub fn rounded(&self) -> Self {
        Self {
            x: self.x.round_ties_even(),
            y: self.y.round_ties_even(),
            width: self.width.round_ties_even(),
            height: self.height.round_ties_even(),
        }
    }

    /// Centre point `(u, v)`.
    pub fn center(&self) -> (f64, f64) {
        (self.x + 0.5 * self.width, self.y + 0.5 * self.height)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Observation vector `[x, y, w, h]`.
    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.y, self.width, self.height]
    }
}

impl From<(f64, f64, f64, f64)> for Roi {
    fn from((x, y, width, height): (f64, f64, f64, f64)) -> Self {
        Self::new(x, y, width, height)
    }
}

/// Integer pixel window `[x0, x1) x [y0, y1)` clipped to an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PixelWindow {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelWindow {
    /// Clip integer box `(x, y, w, h)` against an image of the given size.
    /// Returns `None` when nothing of the box lies inside the image.
    ///
    /// Saturates instead of overflowing, so boxes built from huge or
    /// non-finite coordinates simply miss the image.
    pub fn clip(x: i64, y: i64, w: i64, h: i64, width: u32, height: u32) -> Option<Self> {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(width as i64);
        let y1 = y.saturating_add(h).min(height as i64);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(Self {
            x0: x0 as u32,
            y0: y0 as u32,
            x1: x1 as u32,
            y1: y1 as u32,
        })
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_flips_negative_extents() {
        let roi = Roi::new(50.0, 40.0, -20.0, -10.0).normalized();
        assert_eq!(roi, Roi::new(30.0, 30.0, 20.0, 10.0));

        let roi = Roi::new(50.0, 40.0, 20.0, -10.0).normalized();
        assert_eq!(roi, Roi::new(50.0, 30.0, 20.0, 10.0));

        // Covered area is unchanged
        assert_eq!(Roi::new(50.0, 40.0, -20.0, -10.0).normalized().area(), 200.0);
        assert_eq!(Roi::new(50.0, 40.0, -20.0, 10.0).area(), -200.0);
    }

    #[test]
    fn test_from_corners() {
        let roi = Roi::from_corners((80.0, 60.0), (20.0, 100.0));
        assert_eq!(roi, Roi::new(20.0, 60.0, 60.0, 40.0));
    }

    #[test]
    fn test_rounded_ties_to_even() {
        let roi = Roi::new(2.5, 3.5, 10.4, 10.6).rounded();
        assert_eq!(roi, Roi::new(2.0, 4.0, 10.0, 11.0));
    }

    #[test]
    fn test_invalid_sentinel() {
        assert!(!Roi::INVALID.is_valid());
        assert!(Roi::new(0.0, 0.0, 0.0, 0.0).is_valid());
    }

    #[test]
    fn test_center() {
        assert_eq!(Roi::new(10.0, 20.0, 30.0, 40.0).center(), (25.0, 40.0));
    }

    #[test]
    fn test_clip_window() {
        let w = PixelWindow::clip(-5, 10, 20, 20, 100, 100).unwrap();
        assert_eq!((w.x0, w.y0, w.x1, w.y1), (0, 10, 15, 30));

        let w = PixelWindow::clip(90, 90, 20, 20, 100, 100).unwrap();
        assert_eq!((w.width(), w.height()), (10, 10));

        assert!(PixelWindow::clip(120, 0, 10, 10, 100, 100).is_none());
        assert!(PixelWindow::clip(10, 10, 0, 10, 100, 100).is_none());
    }

    #[test]
    fn test_clip_window_saturates() {
        // Saturated casts of infinite coordinates must not overflow
        assert!(PixelWindow::clip(i64::MAX, 0, 10, 10, 100, 100).is_none());
        assert!(PixelWindow::clip(i64::MAX, i64::MAX, i64::MAX, i64::MAX, 100, 100).is_none());

        let w = PixelWindow::clip(0, 0, i64::MAX, i64::MAX, 100, 100).unwrap();
        assert_eq!((w.x0, w.y0, w.x1, w.y1), (0, 0, 100, 100));

        let w = PixelWindow::clip(i64::MIN, -5, i64::MAX, 10, 100, 100);
        assert!(w.is_none());
    }

    #[test]
    fn test_is_finite() {
        assert!(Roi::new(1.0, 2.0, 3.0, 4.0).is_finite());
        assert!(!Roi::new(f64::INFINITY, 0.0, 10.0, 10.0).is_finite());
        assert!(!Roi::new(0.0, 0.0, f64::NAN, 10.0).is_finite());
    }
}
