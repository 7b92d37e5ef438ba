//! 2-D visual trackers.
//!
//! A visual tracker follows an image patch from frame to frame. The
//! [`RoiTracker`](crate::RoiTracker) only needs the two operations of
//! [`VisualTracker`], so any algorithm (correlation filter, template match,
//! a detector in a loop) can be plugged in.

mod template;

pub use template::{TemplateTracker, TemplateTrackerConfig};

use crate::geometry::Roi;
use crate::ColorImage;

/// Trait for 2-D visual trackers.
pub trait VisualTracker {
    /// Start (or restart) tracking `roi` in `image`, discarding any previous
    /// target.
    fn init(&mut self, image: &ColorImage, roi: &Roi);

    /// Locate the target in a new frame.
    ///
    /// Returns the updated box on success, `None` when the target was lost.
    fn update(&mut self, image: &ColorImage) -> Option<Roi>;
}

impl<T: VisualTracker + ?Sized> VisualTracker for Box<T> {
    fn init(&mut self, image: &ColorImage, roi: &Roi) {
        (**self).init(image, roi)
    }

    fn update(&mut self, image: &ColorImage) -> Option<Roi> {
        (**self).update(image)
    }
}
