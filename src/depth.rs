//! Depth sampling over a region of interest.
//!
//! The distance to a box is the median of the depth samples inside the
//! circle inscribed in it. The circle keeps background pixels in the box
//! corners out of the sample, the median keeps sensor holes and spikes
//! from dragging the estimate.

use image::{ImageBuffer, Luma};
use serde::{Deserialize, Serialize};

use crate::geometry::{PixelWindow, Roi};
use crate::{Error, Result};

/// Depth frame in raw sensor units (z16), aligned to the colour frame.
pub type DepthImage = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Depth sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthSamplingConfig {
    /// Mask radius as a fraction of `w + h` (0.335 is roughly two thirds of
    /// the mean side length).
    pub mask_radius_factor: f64,

    /// Exclude zero-valued samples (sensor holes) from the median.
    pub ignore_zero_depth: bool,
}

impl Default for DepthSamplingConfig {
    fn default() -> Self {
        Self {
            mask_radius_factor: 0.335,
            ignore_zero_depth: false,
        }
    }
}

impl DepthSamplingConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.mask_radius_factor.is_finite() || self.mask_radius_factor <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "depth.mask_radius_factor must be positive, got {}",
                self.mask_radius_factor
            )));
        }
        Ok(())
    }
}

/// Median raw depth inside the circle inscribed in `roi`.
///
/// The box is rounded to whole pixels and clipped to the image. Returns
/// `None` when no sample survives (box outside the image, or every sample
/// excluded).
pub fn roi_depth_median(depth: &DepthImage, roi: &Roi, config: &DepthSamplingConfig) -> Option<f64> {
    let r = roi.rounded();
    let (x, y, w, h) = (r.x as i64, r.y as i64, r.width as i64, r.height as i64);

    let window = PixelWindow::clip(x, y, w, h, depth.width(), depth.height())?;

    let radius = ((w as f64 + h as f64) * config.mask_radius_factor).round_ties_even() as i64;
    let radius_sq = radius.saturating_mul(radius);
    let (cx, cy) = (x.saturating_add(w / 2), y.saturating_add(h / 2));

    let mut samples = Vec::with_capacity(window.width() as usize * window.height() as usize);
    for py in window.y0..window.y1 {
        let dy = (py as i64).saturating_sub(cy);
        let dy_sq = dy.saturating_mul(dy);
        for px in window.x0..window.x1 {
            let dx = (px as i64).saturating_sub(cx);
            if dx.saturating_mul(dx).saturating_add(dy_sq) > radius_sq {
                continue;
            }
            let value = depth.get_pixel(px, py)[0];
            if config.ignore_zero_depth && value == 0 {
                continue;
            }
            samples.push(value);
        }
    }

    median(&mut samples)
}

/// Median of the samples; mean of the two middle values for even counts.
pub(crate) fn median(samples: &mut [u16]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    samples.sort_unstable();

    let mid = samples.len() / 2;
    if samples.len() % 2 == 1 {
        Some(samples[mid] as f64)
    } else {
        Some((samples[mid - 1] as f64 + samples[mid] as f64) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn in_circle(px: u32, py: u32, cx: i64, cy: i64, r: i64) -> bool {
        let dx = px as i64 - cx;
        let dy = py as i64 - cy;
        dx * dx + dy * dy <= r * r
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [5, 1, 3]), Some(3.0));
        assert_eq!(median(&mut [4, 1, 3, 2]), Some(2.5));
    }

    #[test]
    fn test_uniform_depth() {
        let depth = DepthImage::from_pixel(64, 48, Luma([850]));
        let d = roi_depth_median(&depth, &Roi::new(10.0, 10.0, 20.0, 20.0), &DepthSamplingConfig::default());
        assert_eq!(d, Some(850.0));
    }

    #[test]
    fn test_outliers_outside_circle_are_ignored() {
        // Box (10, 10, 20, 20): centre (20, 20), radius round(0.335 * 40) = 13
        let depth = DepthImage::from_fn(40, 40, |x, y| {
            if in_circle(x, y, 20, 20, 13) {
                Luma([1000])
            } else {
                Luma([0])
            }
        });

        let d = roi_depth_median(&depth, &Roi::new(10.0, 10.0, 20.0, 20.0), &DepthSamplingConfig::default());
        assert_eq!(d, Some(1000.0));

        let spikes = DepthImage::from_fn(40, 40, |x, y| {
            if in_circle(x, y, 20, 20, 13) {
                Luma([1000])
            } else {
                Luma([u16::MAX])
            }
        });
        let d = roi_depth_median(&spikes, &Roi::new(10.0, 10.0, 20.0, 20.0), &DepthSamplingConfig::default());
        assert_eq!(d, Some(1000.0));
    }

    #[test]
    fn test_median_resists_holes_inside_circle() {
        // A few zero holes inside the circle do not move the median
        let depth = DepthImage::from_fn(40, 40, |x, y| {
            if (x + y) % 7 == 0 {
                Luma([0])
            } else {
                Luma([1200])
            }
        });
        let d = roi_depth_median(&depth, &Roi::new(10.0, 10.0, 20.0, 20.0), &DepthSamplingConfig::default());
        assert_eq!(d, Some(1200.0));
    }

    #[test]
    fn test_ignore_zero_depth() {
        // Mostly holes: the plain median is 0, skipping holes recovers the reading
        let depth = DepthImage::from_fn(40, 40, |x, _| if x % 4 == 0 { Luma([900]) } else { Luma([0]) });
        let roi = Roi::new(0.0, 0.0, 40.0, 40.0);

        let plain = roi_depth_median(&depth, &roi, &DepthSamplingConfig::default());
        assert_eq!(plain, Some(0.0));

        let config = DepthSamplingConfig { ignore_zero_depth: true, ..Default::default() };
        assert_eq!(roi_depth_median(&depth, &roi, &config), Some(900.0));
    }

    #[test]
    fn test_roi_outside_image() {
        let depth = DepthImage::from_pixel(32, 32, Luma([500]));
        let config = DepthSamplingConfig::default();
        assert_eq!(roi_depth_median(&depth, &Roi::new(40.0, 40.0, 10.0, 10.0), &config), None);
        assert_eq!(roi_depth_median(&depth, &Roi::new(-20.0, 0.0, 10.0, 10.0), &config), None);
        assert_eq!(roi_depth_median(&depth, &Roi::new(5.0, 5.0, 0.0, 0.0), &config), None);
    }

    #[test]
    fn test_unbounded_roi_does_not_overflow() {
        let depth = DepthImage::from_pixel(32, 32, Luma([850]));
        let config = DepthSamplingConfig::default();

        assert_eq!(roi_depth_median(&depth, &Roi::new(1e30, 0.0, 1e30, 10.0), &config), None);
        assert_eq!(roi_depth_median(&depth, &Roi::new(f64::INFINITY, 0.0, 10.0, 10.0), &config), None);
        assert_eq!(roi_depth_median(&depth, &Roi::new(0.0, f64::NEG_INFINITY, 10.0, 10.0), &config), None);

        // A huge box over the whole frame still samples it
        assert_eq!(roi_depth_median(&depth, &Roi::new(0.0, 0.0, 1e30, 1e30), &config), Some(850.0));
    }

    #[test]
    fn test_roi_partially_outside_image() {
        let depth = DepthImage::from_fn(32, 32, |x, _| Luma([100 + x as u16]));
        let d = roi_depth_median(&depth, &Roi::new(24.0, 8.0, 16.0, 16.0), &DepthSamplingConfig::default());
        // Only columns 24..32 are inside the image
        let d = d.unwrap();
        assert!((124.0..=131.0).contains(&d), "d = {}", d);
    }

    #[test]
    fn test_fractional_roi_is_rounded() {
        let depth = DepthImage::from_fn(40, 40, |x, _| Luma([x as u16]));
        let a = roi_depth_median(&depth, &Roi::new(10.4, 10.4, 9.6, 9.6), &DepthSamplingConfig::default());
        let b = roi_depth_median(&depth, &Roi::new(10.0, 10.0, 10.0, 10.0), &DepthSamplingConfig::default());
        assert_eq!(a, b);
        assert_relative_eq!(a.unwrap(), 15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_config_validation() {
        assert!(DepthSamplingConfig::default().validate().is_ok());
        let config = DepthSamplingConfig { mask_radius_factor: 0.0, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
