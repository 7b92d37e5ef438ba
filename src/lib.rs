//! # ROI Tracker - RGB-D region-of-interest tracking
//!
//! Tracks a single user-selected region of interest across a stream of
//! colour + depth frames and reports its position in 3-D.
//!
//! ## Features
//!
//! - Constant-velocity Kalman filter over `[x, y, vx, vy, w, h]`
//! - Pluggable 2-D visual tracker (a template tracker ships with the crate)
//! - Prediction fallback while the visual tracker has lost the target
//! - Robust depth sampling (circular mask median) and inverse Brown-Conrady
//!   deprojection into millimetres
//!
//! ## Example
//!
//! ```rust,ignore
//! use roi_tracker::{Roi, RoiTracker, RoiTrackerConfig};
//!
//! let mut tracker = RoiTracker::with_template_tracker(RoiTrackerConfig::default()).unwrap();
//! tracker.set_intrinsics(&camera_matrix, &distortion).unwrap();
//! tracker.set_depth_scale(1.0).unwrap();
//!
//! tracker.init_roi(Roi::new(100.0, 80.0, 40.0, 40.0));
//! loop {
//!     let tracked = tracker.update(&color, Some(&depth));
//!     let position = tracker.position_3d();
//! }
//! ```

// Internal modules
pub(crate) mod internal;

// Public modules
pub mod camera;
pub mod depth;
pub mod filter;
pub mod geometry;
pub mod overlay;
pub mod tracker;
pub mod utils;
pub mod visual;

// Re-exports for convenience
pub use camera::{unset_position, CameraIntrinsics};
pub use depth::{DepthImage, DepthSamplingConfig};
pub use filter::{BoxFilter, FilterConfig, FilterKind, MotionFilter, MotionState};
pub use geometry::Roi;
pub use tracker::{RoiTracker, RoiTrackerConfig, TrackerState};
pub use visual::{TemplateTracker, TemplateTrackerConfig, VisualTracker};

/// Colour frame (8-bit, 3 channels).
pub type ColorImage = image::RgbImage;

// Error types
pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    /// Errors that can occur while configuring a tracker.
    ///
    /// Frame processing never fails; only configuration entry points
    /// return these.
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Invalid camera intrinsics: expected {expected}, got {got}")]
        InvalidIntrinsics { expected: String, got: String },

        #[error("Invalid depth scale: {0} (must be finite and positive)")]
        InvalidDepthScale(f64),

        #[error("Config parse error: {0}")]
        Json(#[from] serde_json::Error),

        #[error("IO error: {0}")]
        IoError(#[from] std::io::Error),
    }

    /// Result type for roi_tracker operations
    pub type Result<T> = std::result::Result<T, Error>;
}
