//! Constant-velocity Kalman filter over bounding boxes.
//!
//! State is `[x, y, vx, vy, w, h]`; observations are `[x, y, w, h]`.
//! Only the position has a velocity term, the box size is modelled as
//! static between steps.

use nalgebra::{DMatrix, DVector};

use super::traits::{BoxFilter, MotionState};
use crate::geometry::Roi;
use crate::internal::kalman::KalmanFilter;
use crate::utils::warn_once;

const DIM_X: usize = 6;
const DIM_Z: usize = 4;

// State layout
const X: usize = 0;
const Y: usize = 1;
const VX: usize = 2;
const VY: usize = 3;
const W: usize = 4;
const H: usize = 5;

/// Kalman filter for a tracked region of interest.
///
/// Matrices are rebuilt from the stored noise parameters on every
/// [`reset`](BoxFilter::reset), so a reset filter is indistinguishable from
/// a freshly constructed one.
#[derive(Clone, Debug)]
pub struct MotionFilter {
    kf: KalmanFilter,
    n: usize,
    process_noise: f64,
    position_noise: f64,
    size_noise: f64,
    initial_covariance: f64,
}

impl MotionFilter {
    /// Create a new filter.
    ///
    /// # Arguments
    /// * `process_noise` - Per-step variance added to every state dimension
    /// * `position_noise` - Measurement variance of `x` and `y` (px²)
    /// * `size_noise` - Measurement variance of `w` and `h`
    /// * `initial_covariance` - Error covariance installed on reset
    pub fn new(
        process_noise: f64,
        position_noise: f64,
        size_noise: f64,
        initial_covariance: f64,
    ) -> Self {
        let mut filter = Self {
            kf: KalmanFilter::new(DIM_X, DIM_Z),
            n: 0,
            process_noise,
            position_noise,
            size_noise,
            initial_covariance,
        };
        filter.reset();
        filter
    }

    /// Get process noise variance.
    #[inline(always)]
    pub fn process_noise(&self) -> f64 {
        self.process_noise
    }

    /// Get position measurement variance.
    #[inline(always)]
    pub fn position_noise(&self) -> f64 {
        self.position_noise
    }

    /// Get size measurement variance.
    #[inline(always)]
    pub fn size_noise(&self) -> f64 {
        self.size_noise
    }

    /// Current error covariance (6 x 6).
    pub fn covariance(&self) -> &DMatrix<f64> {
        self.kf.covariance()
    }

    fn configure(&mut self) {
        // Transition: identity plus x += vx, y += vy
        self.kf.f = DMatrix::identity(DIM_X, DIM_X);
        self.kf.f[(X, VX)] = 1.0;
        self.kf.f[(Y, VY)] = 1.0;

        // Observation: select x, y, w, h
        self.kf.h = DMatrix::zeros(DIM_Z, DIM_X);
        self.kf.h[(0, X)] = 1.0;
        self.kf.h[(1, Y)] = 1.0;
        self.kf.h[(2, W)] = 1.0;
        self.kf.h[(3, H)] = 1.0;

        self.kf.q = DMatrix::identity(DIM_X, DIM_X) * self.process_noise;

        self.kf.r = DMatrix::from_diagonal(&DVector::from_vec(vec![
            self.position_noise,
            self.position_noise,
            self.size_noise,
            self.size_noise,
        ]));

        self.kf.p = DMatrix::identity(DIM_X, DIM_X) * self.initial_covariance;
        self.kf.x = DVector::zeros(DIM_X);
    }
}

impl Default for MotionFilter {
    fn default() -> Self {
        Self::new(0.03, 2.0, 25.0, 0.0)
    }
}

impl BoxFilter for MotionFilter {
    fn reset(&mut self) {
        self.n = 0;
        self.configure();
    }

    fn correct(&mut self, measurement: &Roi) {
        if self.n == 0 {
            // A correction against an undefined prior is meaningless: take the
            // first sample as the state, at rest.
            self.kf.x = DVector::from_row_slice(&MotionState::at_rest(measurement).to_array());
        } else {
            let z = DVector::from_row_slice(&measurement.to_array());
            if !self.kf.update(&z) {
                warn_once("roi filter: singular innovation covariance, measurement skipped");
            }
        }
        self.n += 1;
    }

    fn predict(&mut self) -> Roi {
        if self.n == 0 {
            return Roi::INVALID;
        }
        self.kf.predict();
        self.state().roi().rounded()
    }

    fn step(&mut self, measurement: &Roi) -> MotionState {
        let initializing = self.n == 0;
        self.correct(measurement);
        if !initializing {
            self.kf.predict();
        }
        self.state()
    }

    fn state(&self) -> MotionState {
        let x = self.kf.state();
        MotionState {
            x: x[X],
            y: x[Y],
            vx: x[VX],
            vy: x[VY],
            w: x[W],
            h: x[H],
        }
    }

    fn sample_count(&self) -> usize {
        self.n
    }
}
