//! Enum-based filter dispatch for static (non-virtual) function calls.
//!
//! `RoiFilterEnum` wraps all supported filter types so the tracker can hold
//! a configurable filter without a `Box<dyn BoxFilter>`.

use serde::{Deserialize, Serialize};

use super::kalman::MotionFilter;
use super::no_filter::NoFilter;
use super::traits::{BoxFilter, MotionState};
use crate::geometry::Roi;
use crate::{Error, Result};

/// Which filter implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Constant-velocity Kalman filter.
    #[default]
    Kalman,
    /// Hold the last measurement, no motion model.
    HoldLast,
}

/// Filter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Filter implementation.
    pub kind: FilterKind,

    /// Process noise variance, equal across all six state dimensions.
    pub process_noise: f64,

    /// Measurement noise variance of the box position (px²).
    pub position_noise: f64,

    /// Measurement noise variance of the box size.
    pub size_noise: f64,

    /// Error covariance installed on reset.
    pub initial_covariance: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            kind: FilterKind::Kalman,
            process_noise: 0.03,
            position_noise: 2.0,
            size_noise: 25.0,
            initial_covariance: 0.0,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("process_noise", self.process_noise),
            ("position_noise", self.position_noise),
            ("size_noise", self.size_noise),
            ("initial_covariance", self.initial_covariance),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(Error::InvalidConfig(format!("filter.{} must be finite, got {}", name, value)));
            }
        }

        if self.process_noise < 0.0 || self.initial_covariance < 0.0 {
            return Err(Error::InvalidConfig(
                "filter.process_noise and filter.initial_covariance must be non-negative".to_string(),
            ));
        }

        if self.position_noise <= 0.0 || self.size_noise <= 0.0 {
            return Err(Error::InvalidConfig(
                "filter measurement noise must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the configured filter.
    pub fn build(&self) -> RoiFilterEnum {
        match self.kind {
            FilterKind::Kalman => RoiFilterEnum::Kalman(MotionFilter::new(
                self.process_noise,
                self.position_noise,
                self.size_noise,
                self.initial_covariance,
            )),
            FilterKind::HoldLast => RoiFilterEnum::HoldLast(NoFilter::new()),
        }
    }
}

/// Enum-based filter for static dispatch.
#[derive(Clone, Debug)]
pub enum RoiFilterEnum {
    Kalman(MotionFilter),
    HoldLast(NoFilter),
}

impl Default for RoiFilterEnum {
    fn default() -> Self {
        RoiFilterEnum::Kalman(MotionFilter::default())
    }
}

impl RoiFilterEnum {
    pub fn kind(&self) -> FilterKind {
        match self {
            RoiFilterEnum::Kalman(_) => FilterKind::Kalman,
            RoiFilterEnum::HoldLast(_) => FilterKind::HoldLast,
        }
    }
}

impl BoxFilter for RoiFilterEnum {
    #[inline(always)]
    fn reset(&mut self) {
        match self {
            RoiFilterEnum::Kalman(f) => f.reset(),
            RoiFilterEnum::HoldLast(f) => f.reset(),
        }
    }

    #[inline(always)]
    fn correct(&mut self, measurement: &Roi) {
        match self {
            RoiFilterEnum::Kalman(f) => f.correct(measurement),
            RoiFilterEnum::HoldLast(f) => f.correct(measurement),
        }
    }

    #[inline(always)]
    fn predict(&mut self) -> Roi {
        match self {
            RoiFilterEnum::Kalman(f) => f.predict(),
            RoiFilterEnum::HoldLast(f) => f.predict(),
        }
    }

    #[inline(always)]
    fn step(&mut self, measurement: &Roi) -> MotionState {
        match self {
            RoiFilterEnum::Kalman(f) => f.step(measurement),
            RoiFilterEnum::HoldLast(f) => f.step(measurement),
        }
    }

    #[inline(always)]
    fn state(&self) -> MotionState {
        match self {
            RoiFilterEnum::Kalman(f) => f.state(),
            RoiFilterEnum::HoldLast(f) => f.state(),
        }
    }

    #[inline(always)]
    fn sample_count(&self) -> usize {
        match self {
            RoiFilterEnum::Kalman(f) => f.sample_count(),
            RoiFilterEnum::HoldLast(f) => f.sample_count(),
        }
    }
}
