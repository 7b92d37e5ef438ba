//! Presentation helpers: tracking boxes drawn onto the colour frame.
//!
//! Purely advisory; nothing here feeds back into tracking.

use image::Rgb;

use crate::geometry::{PixelWindow, Roi};
use crate::tracker::{RoiTracker, TrackerState};
use crate::visual::VisualTracker;
use crate::ColorImage;

pub const PREDICTED_COLOR: Rgb<u8> = Rgb([255, 0, 255]);
pub const MEASURED_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
pub const LINE_THICKNESS: u32 = 2;

pub const NO_ROI_TEXT: &str = "Indicate an ROI to track";
pub const LOST_TEXT: &str = "Tracking lost";

/// Draw the outline of `roi` (rounded to pixels), growing `thickness`
/// pixels inwards. Parts outside the image are skipped.
pub fn draw_roi(image: &mut ColorImage, roi: &Roi, color: Rgb<u8>, thickness: u32) {
    let r = roi.normalized().rounded();
    let (x, y, w, h) = (r.x as i64, r.y as i64, r.width as i64, r.height as i64);
    let t = (thickness as i64).min(w).min(h);
    if t <= 0 {
        return;
    }

    let bands = [
        (x, y, w, t), // top
        (x, y.saturating_add(h - t), w, t), // bottom
        (x, y, t, h), // left
        (x.saturating_add(w - t), y, t, h), // right
    ];
    for (bx, by, bw, bh) in bands {
        if let Some(window) = PixelWindow::clip(bx, by, bw, bh, image.width(), image.height()) {
            for py in window.y0..window.y1 {
                for px in window.x0..window.x1 {
                    image.put_pixel(px, py, color);
                }
            }
        }
    }
}

/// Draw the latest tracking result of `tracker` onto `image`.
///
/// The forecast box is drawn once the visual tracker runs, the measured box
/// while the target is tracked. Returns the status text the caller should
/// render, if any.
pub fn draw_overlay<V: VisualTracker>(tracker: &RoiTracker<V>, image: &mut ColorImage) -> Option<&'static str> {
    if tracker.is_initialized() {
        if let Some(predicted) = tracker.predicted_roi() {
            draw_roi(image, &predicted, PREDICTED_COLOR, LINE_THICKNESS);
        }
    }

    if tracker.is_tracked() {
        if let Some(measured) = tracker.measured_roi() {
            draw_roi(image, &measured, MEASURED_COLOR, LINE_THICKNESS);
        }
    }

    status_text(tracker.state())
}

/// Status annotation for a tracker state.
pub fn status_text(state: TrackerState) -> Option<&'static str> {
    match state {
        TrackerState::Uninitialized | TrackerState::Initializing => Some(NO_ROI_TEXT),
        TrackerState::Lost => Some(LOST_TEXT),
        TrackerState::Tracking => None,
    }
}
