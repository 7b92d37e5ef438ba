//! Grey-level template matching tracker.

use serde::{Deserialize, Serialize};

use super::VisualTracker;
use crate::geometry::{PixelWindow, Roi};
use crate::utils::luma;
use crate::{ColorImage, Error, Result};

/// Template tracker parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateTrackerConfig {
    /// Half-size of the search window around the last match, in pixels.
    pub search_radius: u32,

    /// Largest mean absolute grey-level difference accepted as a match.
    pub max_mean_abs_diff: f64,
}

impl Default for TemplateTrackerConfig {
    fn default() -> Self {
        Self {
            search_radius: 16,
            max_mean_abs_diff: 24.0,
        }
    }
}

impl TemplateTrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.max_mean_abs_diff.is_finite() || self.max_mean_abs_diff < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "template.max_mean_abs_diff must be non-negative, got {}",
                self.max_mean_abs_diff
            )));
        }
        Ok(())
    }
}

/// Visual tracker matching a fixed grey-level template.
///
/// The template is captured once at [`init`](VisualTracker::init). Each
/// update searches every offset within `search_radius` of the previous
/// match and keeps the one with the smallest mean absolute difference.
/// Ties go to the smallest displacement.
#[derive(Debug, Clone)]
pub struct TemplateTracker {
    config: TemplateTrackerConfig,
    template: Vec<f32>,
    width: u32,
    height: u32,
    position: (i64, i64),
    last_score: Option<f64>,
}

impl TemplateTracker {
    pub fn new(config: TemplateTrackerConfig) -> Self {
        Self {
            config,
            template: Vec::new(),
            width: 0,
            height: 0,
            position: (0, 0),
            last_score: None,
        }
    }

    pub fn config(&self) -> &TemplateTrackerConfig {
        &self.config
    }

    /// Mean absolute difference of the best candidate in the last update.
    pub fn last_score(&self) -> Option<f64> {
        self.last_score
    }

    /// Candidate offsets ordered by displacement, `(0, 0)` first.
    fn offsets(&self) -> Vec<(i64, i64)> {
        let r = self.config.search_radius as i64;
        let mut offsets: Vec<(i64, i64)> = (-r..=r)
            .flat_map(|dy| (-r..=r).map(move |dx| (dx, dy)))
            .collect();
        offsets.sort_by_key(|&(dx, dy)| dx * dx + dy * dy);
        offsets
    }

    /// Sum of absolute differences at `(x, y)`, abandoned once it reaches
    /// `bound`.
    fn sad(&self, gray: &[f32], stride: usize, x: usize, y: usize, bound: f32) -> f32 {
        let w = self.width as usize;
        let mut sum = 0.0f32;
        for row in 0..self.height as usize {
            let image_row = &gray[(y + row) * stride + x..(y + row) * stride + x + w];
            let template_row = &self.template[row * w..(row + 1) * w];
            sum += image_row
                .iter()
                .zip(template_row)
                .map(|(a, b)| (a - b).abs())
                .sum::<f32>();
            if sum >= bound {
                return sum;
            }
        }
        sum
    }
}

impl Default for TemplateTracker {
    fn default() -> Self {
        Self::new(TemplateTrackerConfig::default())
    }
}

impl VisualTracker for TemplateTracker {
    fn init(&mut self, image: &ColorImage, roi: &Roi) {
        let r = roi.normalized().rounded();
        self.template.clear();
        self.width = 0;
        self.height = 0;
        self.last_score = None;

        let window = match PixelWindow::clip(
            r.x as i64,
            r.y as i64,
            r.width as i64,
            r.height as i64,
            image.width(),
            image.height(),
        ) {
            Some(window) => window,
            None => {
                log::debug!("template tracker: roi {:?} does not overlap the image", roi);
                return;
            }
        };

        self.width = window.width();
        self.height = window.height();
        self.position = (window.x0 as i64, window.y0 as i64);
        self.template.reserve((self.width * self.height) as usize);
        for y in window.y0..window.y1 {
            for x in window.x0..window.x1 {
                self.template.push(luma(image.get_pixel(x, y)));
            }
        }
    }

    fn update(&mut self, image: &ColorImage) -> Option<Roi> {
        self.last_score = None;
        if self.template.is_empty() {
            return None;
        }

        let (img_w, img_h) = (image.width() as i64, image.height() as i64);
        let gray: Vec<f32> = image.pixels().map(luma).collect();
        let stride = image.width() as usize;
        let n = self.template.len() as f32;

        let mut best: Option<((i64, i64), f32)> = None;
        for (dx, dy) in self.offsets() {
            let (x, y) = (self.position.0 + dx, self.position.1 + dy);
            if x < 0 || y < 0 || x + self.width as i64 > img_w || y + self.height as i64 > img_h {
                continue;
            }

            let bound = best.map(|(_, s)| s).unwrap_or(f32::INFINITY);
            let score = self.sad(&gray, stride, x as usize, y as usize, bound);
            if score < bound {
                best = Some(((x, y), score));
            }
        }

        let ((x, y), sum) = best?;
        let mean = (sum / n) as f64;
        self.last_score = Some(mean);

        if mean > self.config.max_mean_abs_diff {
            return None;
        }

        self.position = (x, y);
        Some(Roi::new(x as f64, y as f64, self.width as f64, self.height as f64))
    }
}
