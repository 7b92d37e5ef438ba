//! Filter traits for box tracking.

use crate::geometry::Roi;
use serde::{Deserialize, Serialize};

/// Full filter state `[x, y, vx, vy, w, h]`, unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionState {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub w: f64,
    pub h: f64,
}

impl MotionState {
    /// State at rest at the given box (zero velocity).
    pub fn at_rest(roi: &Roi) -> Self {
        Self {
            x: roi.x,
            y: roi.y,
            vx: 0.0,
            vy: 0.0,
            w: roi.width,
            h: roi.height,
        }
    }

    /// Position and size part of the state, unrounded.
    pub fn roi(&self) -> Roi {
        Roi::new(self.x, self.y, self.w, self.h)
    }

    pub fn to_array(&self) -> [f64; 6] {
        [self.x, self.y, self.vx, self.vy, self.w, self.h]
    }
}

/// Trait for box motion filters.
///
/// A filter starts without samples; until the first `correct` it cannot
/// forecast anything and `predict` returns [`Roi::INVALID`].
pub trait BoxFilter: Send + Sync {
    /// Drop all samples and restore the fixed configuration.
    fn reset(&mut self);

    /// Feed a measured box. The first sample after a reset initializes the
    /// state directly (zero velocity) instead of blending.
    fn correct(&mut self, measurement: &Roi);

    /// Advance one step and return the rounded position/size estimate, or
    /// [`Roi::INVALID`] when no sample has been seen yet.
    fn predict(&mut self) -> Roi;

    /// `correct` followed by a forecast; returns the full unrounded state.
    fn step(&mut self, measurement: &Roi) -> MotionState;

    /// Current unrounded state estimate.
    fn state(&self) -> MotionState;

    /// Number of measurements since the last reset.
    fn sample_count(&self) -> usize;

    fn has_samples(&self) -> bool {
        self.sample_count() > 0
    }
}
