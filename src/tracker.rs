//! Region-of-interest tracker.
//!
//! Couples a 2-D visual tracker with a box motion filter and samples the
//! depth frame under the tracked box to report a 3-D position every frame.

use std::fmt;
use std::path::Path;

use log::debug;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::camera::{unset_position, CameraIntrinsics};
use crate::depth::{roi_depth_median, DepthImage, DepthSamplingConfig};
use crate::filter::{BoxFilter, FilterConfig, RoiFilterEnum};
use crate::geometry::Roi;
use crate::utils::warn_once;
use crate::visual::{TemplateTracker, TemplateTrackerConfig, VisualTracker};
use crate::{ColorImage, Error, Result};

/// Configuration for the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiTrackerConfig {
    /// Motion filter.
    pub filter: FilterConfig,

    /// Depth sampling under the tracked box.
    pub depth: DepthSamplingConfig,

    /// Factor converting raw depth units to millimetres.
    pub depth_scale: f64,

    /// Parameters of the built-in template tracker.
    pub template: TemplateTrackerConfig,
}

impl Default for RoiTrackerConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            depth: DepthSamplingConfig::default(),
            depth_scale: 1.0,
            template: TemplateTrackerConfig::default(),
        }
    }
}

impl RoiTrackerConfig {
    pub fn validate(&self) -> Result<()> {
        self.filter.validate()?;
        self.depth.validate()?;
        self.template.validate()?;
        validate_depth_scale(self.depth_scale)
    }

    /// Parse and validate a JSON configuration. Missing fields take their
    /// defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

fn validate_depth_scale(value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidDepthScale(value));
    }
    Ok(())
}

/// Lifecycle of a [`RoiTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// No region of interest given yet.
    Uninitialized,
    /// Region given, visual tracker starts on the next frame.
    Initializing,
    /// Visual tracker running, last update succeeded.
    Tracking,
    /// Visual tracker running, last update failed; the filter forecast
    /// stands in for the measurement.
    Lost,
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackerState::Uninitialized => "uninitialized",
            TrackerState::Initializing => "initializing",
            TrackerState::Tracking => "tracking",
            TrackerState::Lost => "lost",
        };
        f.write_str(name)
    }
}

/// Single-target RGB-D tracker.
///
/// Call [`init_roi`](Self::init_roi) with a box, then
/// [`update`](Self::update) once per frame. Each update:
///
/// 1. starts the visual tracker on the current frame if a new box was given,
/// 2. forecasts the box with the motion filter (when it has samples),
/// 3. asks the visual tracker for a measurement and corrects the filter
///    with it,
/// 4. takes the measurement, or the forecast when the target was lost, as
///    the box of this frame and deprojects its centre at the median depth
///    under it.
///
/// Not reentrant: one owner drives configuration and updates.
pub struct RoiTracker<V: VisualTracker = TemplateTracker> {
    config: RoiTrackerConfig,
    visual: V,
    filter: RoiFilterEnum,
    state: TrackerState,

    /// Box passed to the last `init_roi`.
    target: Option<Roi>,
    /// Box reported for the last frame (measured, else predicted).
    roi: Option<Roi>,
    measured_roi: Option<Roi>,
    predicted_roi: Option<Roi>,

    position: Point3<f64>,
    distance: Option<f64>,

    intrinsics: Option<CameraIntrinsics>,
    depth_scale: f64,
}

impl RoiTracker<TemplateTracker> {
    /// Create a tracker backed by the built-in [`TemplateTracker`].
    pub fn with_template_tracker(config: RoiTrackerConfig) -> Result<Self> {
        let visual = TemplateTracker::new(config.template.clone());
        Self::new(config, visual)
    }
}

impl<V: VisualTracker> RoiTracker<V> {
    /// Create a new tracker with the given configuration and visual tracker.
    pub fn new(config: RoiTrackerConfig, visual: V) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            filter: config.filter.build(),
            depth_scale: config.depth_scale,
            config,
            visual,
            state: TrackerState::Uninitialized,
            target: None,
            roi: None,
            measured_roi: None,
            predicted_roi: None,
            position: Point3::origin(),
            distance: None,
            intrinsics: None,
        })
    }

    /// Start tracking a new region of interest.
    ///
    /// The box is normalized and the motion filter reset. The visual
    /// tracker is started on the frame passed to the next `update`.
    pub fn init_roi(&mut self, roi: Roi) {
        let roi = roi.normalized();
        debug!("roi tracker: new target {:?} (was {})", roi, self.state);

        self.target = Some(roi);
        self.filter.reset();
        self.state = TrackerState::Initializing;
    }

    /// Process one frame. Returns whether the visual tracker found the
    /// target.
    ///
    /// Before any `init_roi` this is a no-op returning `false`.
    pub fn update(&mut self, color: &ColorImage, depth: Option<&DepthImage>) -> bool {
        let target = match self.target {
            Some(target) => target,
            None => return false,
        };

        if self.state == TrackerState::Initializing {
            self.visual.init(color, &target);
            debug!("roi tracker: visual tracker started at {:?}", target);
        }

        let predicted = if self.filter.has_samples() {
            Some(self.filter.predict())
        } else {
            None
        };

        // A non-finite box is no measurement
        let measured = self.visual.update(color).filter(|roi| {
            let finite = roi.is_finite();
            if !finite {
                debug!("roi tracker: discarding non-finite measurement {:?}", roi);
            }
            finite
        });
        if let Some(measured) = &measured {
            self.filter.correct(measured);
        }

        let tracked = measured.is_some();
        let roi = measured.or(predicted);
        self.update_position(roi.as_ref(), depth);

        let next = if tracked {
            TrackerState::Tracking
        } else {
            TrackerState::Lost
        };
        if next != self.state {
            debug!("roi tracker: {} -> {}", self.state, next);
        }

        self.state = next;
        self.predicted_roi = predicted;
        self.measured_roi = measured;
        self.roi = roi;

        tracked
    }

    fn update_position(&mut self, roi: Option<&Roi>, depth: Option<&DepthImage>) {
        let distance = match (roi, depth) {
            (Some(roi), Some(depth)) => roi_depth_median(depth, roi, &self.config.depth)
                .map(|raw| raw * self.depth_scale)
                .filter(|d| *d > 0.0),
            _ => None,
        };
        if distance.is_some() {
            self.distance = distance;
        }

        let intrinsics = match &self.intrinsics {
            Some(intrinsics) => intrinsics,
            None => {
                warn_once("roi tracker: no camera intrinsics set, reporting unset 3-D position");
                self.position = unset_position();
                return;
            }
        };

        // No reading this frame: keep the last position
        if let (Some(roi), Some(d)) = (roi, distance) {
            let (u, v) = roi.center();
            self.position = intrinsics.deproject(u, v, d);
        }
    }

    /// Replace the camera parameters from a row-major 3x3 camera matrix and
    /// 5 distortion coefficients.
    ///
    /// Both must be given together; passing two empty slices clears them.
    pub fn set_intrinsics(&mut self, camera_matrix: &[f64], distortion: &[f64]) -> Result<()> {
        match (camera_matrix.is_empty(), distortion.is_empty()) {
            (true, true) => {
                self.clear_intrinsics();
                Ok(())
            }
            (true, false) | (false, true) => Err(Error::InvalidIntrinsics {
                expected: "camera matrix and distortion coefficients together".to_string(),
                got: format!(
                    "{} matrix values and {} coefficients",
                    camera_matrix.len(),
                    distortion.len()
                ),
            }),
            (false, false) => {
                self.intrinsics = Some(CameraIntrinsics::from_slices(camera_matrix, distortion)?);
                Ok(())
            }
        }
    }

    pub fn set_camera_intrinsics(&mut self, intrinsics: CameraIntrinsics) -> Result<()> {
        intrinsics.validate()?;
        self.intrinsics = Some(intrinsics);
        Ok(())
    }

    pub fn clear_intrinsics(&mut self) {
        self.intrinsics = None;
    }

    /// Set the factor converting raw depth units to millimetres.
    pub fn set_depth_scale(&mut self, value: f64) -> Result<()> {
        validate_depth_scale(value)?;
        self.depth_scale = value;
        Ok(())
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Position of the target in millimetres, colour sensor frame.
    ///
    /// `(0, 0, 0)` until the first reading, `(-1, -1, -1)` while no camera
    /// intrinsics are set. Frames without a depth reading keep the previous
    /// value.
    pub fn position_3d(&self) -> Point3<f64> {
        self.position
    }

    /// Whether the last update found the target.
    pub fn is_tracked(&self) -> bool {
        self.state == TrackerState::Tracking
    }

    /// Whether the visual tracker has been started on the current target.
    pub fn is_initialized(&self) -> bool {
        matches!(self.state, TrackerState::Tracking | TrackerState::Lost)
    }

    /// Filter forecast made during the last update, if the filter had
    /// samples.
    pub fn predicted_roi(&self) -> Option<Roi> {
        self.predicted_roi
    }

    /// Visual tracker measurement of the last update, if it succeeded.
    pub fn measured_roi(&self) -> Option<Roi> {
        self.measured_roi
    }

    /// Box reported for the last update: the measurement, else the forecast.
    pub fn roi(&self) -> Option<Roi> {
        self.roi
    }

    /// Box given to the last `init_roi`.
    pub fn target(&self) -> Option<Roi> {
        self.target
    }

    /// Last valid distance to the target in millimetres.
    pub fn distance(&self) -> Option<f64> {
        self.distance
    }

    pub fn intrinsics(&self) -> Option<&CameraIntrinsics> {
        self.intrinsics.as_ref()
    }

    pub fn depth_scale(&self) -> f64 {
        self.depth_scale
    }

    pub fn filter(&self) -> &RoiFilterEnum {
        &self.filter
    }

    pub fn visual(&self) -> &V {
        &self.visual
    }

    pub fn config(&self) -> &RoiTrackerConfig {
        &self.config
    }
}
