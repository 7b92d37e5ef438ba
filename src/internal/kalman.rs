//! Linear Kalman filter.
//!
//! Standard predict / correct recursion with configurable state transition,
//! observation, and noise matrices. Holds a single (a-posteriori after
//! `update`, a-priori after `predict`) state estimate.

use nalgebra::{DMatrix, DVector};

/// Dense linear Kalman filter.
///
/// Matrices are public so owners can install their own model; `new` only
/// sets shapes, an identity transition and zero covariance.
#[derive(Clone, Debug)]
pub struct KalmanFilter {
    pub dim_x: usize,
    pub dim_z: usize,
    /// State estimate (`dim_x`)
    pub x: DVector<f64>,
    /// Error covariance (`dim_x` x `dim_x`)
    pub p: DMatrix<f64>,
    /// Transition (`dim_x` x `dim_x`)
    pub f: DMatrix<f64>,
    /// Observation (`dim_z` x `dim_x`)
    pub h: DMatrix<f64>,
    /// Measurement noise (`dim_z` x `dim_z`)
    pub r: DMatrix<f64>,
    /// Process noise (`dim_x` x `dim_x`)
    pub q: DMatrix<f64>,
    // Scratch kept between updates
    y: DVector<f64>,
    s: DMatrix<f64>,
    k: DMatrix<f64>,
}

impl KalmanFilter {
    /// Filter with `dim_x` states observed through `dim_z` measurements.
    pub fn new(dim_x: usize, dim_z: usize) -> Self {
        let mut h = DMatrix::zeros(dim_z, dim_x);
        for i in 0..dim_z.min(dim_x) {
            h[(i, i)] = 1.0;
        }

        Self {
            dim_x,
            dim_z,
            x: DVector::zeros(dim_x),
            p: DMatrix::zeros(dim_x, dim_x),
            f: DMatrix::identity(dim_x, dim_x),
            h,
            r: DMatrix::identity(dim_z, dim_z),
            q: DMatrix::identity(dim_x, dim_x),
            y: DVector::zeros(dim_z),
            s: DMatrix::zeros(dim_z, dim_z),
            k: DMatrix::zeros(dim_x, dim_z),
        }
    }

    /// Time update: `x = F x`, `P = F P F' + Q`.
    pub fn predict(&mut self) {
        // x = F @ x
        self.x = &self.f * &self.x;

        // P = F @ P @ F.T + Q
        self.p = &self.f * &self.p * self.f.transpose() + &self.q;
    }

    /// Correct the state with a measurement.
    ///
    /// Returns `false` (leaving the state untouched) when the innovation
    /// covariance is singular.
    pub fn update(&mut self, z: &DVector<f64>) -> bool {
        debug_assert_eq!(z.len(), self.dim_z);

        // y = z - H @ x (innovation)
        self.y = z - &self.h * &self.x;

        // S = H @ P @ H.T + R (innovation covariance)
        self.s = &self.h * &self.p * self.h.transpose() + &self.r;

        let si = match self.s.clone().try_inverse() {
            Some(si) => si,
            None => return false,
        };

        // K = P @ H.T @ S^-1 (Kalman gain)
        self.k = &self.p * self.h.transpose() * si;

        // x = x + K @ y
        self.x += &self.k * &self.y;

        // P = (I - K @ H) @ P
        let i = DMatrix::identity(self.dim_x, self.dim_x);
        self.p = (i - &self.k * &self.h) * &self.p;

        true
    }

    pub fn state(&self) -> &DVector<f64> {
        &self.x
    }

    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kalman_filter_create() {
        let kf = KalmanFilter::new(6, 4);

        assert_eq!(kf.dim_x, 6);
        assert_eq!(kf.dim_z, 4);
        assert_eq!(kf.x.len(), 6);
        assert_eq!(kf.p.nrows(), 6);

        // Covariance starts at zero, F at identity
        for i in 0..6 {
            for j in 0..6 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(kf.f[(i, j)], expected, epsilon = 1e-12);
                assert_relative_eq!(kf.p[(i, j)], 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_kalman_filter_predict() {
        let mut kf = KalmanFilter::new(2, 1);
        kf.x = DVector::from_vec(vec![1.0, 2.0]);
        kf.f = DMatrix::from_row_slice(2, 2, &[
            1.0, 1.0,
            0.0, 1.0,
        ]);
        kf.q = DMatrix::identity(2, 2) * 0.1;
        kf.p = DMatrix::identity(2, 2);

        kf.predict();

        assert_relative_eq!(kf.x[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(kf.x[1], 2.0, epsilon = 1e-12);

        // P = F P F' + Q = [2.1, 1; 1, 1.1]
        assert_relative_eq!(kf.p[(0, 0)], 2.1, epsilon = 1e-12);
        assert_relative_eq!(kf.p[(0, 1)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(kf.p[(1, 0)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(kf.p[(1, 1)], 1.1, epsilon = 1e-12);
    }

    #[test]
    fn test_kalman_filter_update() {
        let mut kf = KalmanFilter::new(2, 1);
        kf.h = DMatrix::from_row_slice(1, 2, &[1.0, 0.0]);
        kf.r = DMatrix::from_row_slice(1, 1, &[1.0]);
        kf.p = DMatrix::identity(2, 2) * 10.0;

        assert!(kf.update(&DVector::from_vec(vec![5.0])));

        // K = 10 / 11, x = 50 / 11
        assert_relative_eq!(kf.x[0], 50.0 / 11.0, epsilon = 1e-9);
        assert_relative_eq!(kf.x[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(kf.p[(0, 0)], 10.0 / 11.0, epsilon = 1e-9);
    }

    #[test]
    fn test_kalman_filter_singular_innovation() {
        let mut kf = KalmanFilter::new(2, 1);
        kf.h = DMatrix::from_row_slice(1, 2, &[1.0, 0.0]);
        kf.r = DMatrix::zeros(1, 1);
        kf.x = DVector::from_vec(vec![1.0, 0.0]);

        // P and R both zero: S is singular, nothing changes
        assert!(!kf.update(&DVector::from_vec(vec![5.0])));
        assert_relative_eq!(kf.x[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_kalman_filter_tracks_constant_velocity() {
        let mut kf = KalmanFilter::new(2, 1);
        kf.x = DVector::from_vec(vec![0.0, 1.0]);
        kf.f = DMatrix::from_row_slice(2, 2, &[
            1.0, 1.0,
            0.0, 1.0,
        ]);
        kf.h = DMatrix::from_row_slice(1, 2, &[1.0, 0.0]);
        kf.q = DMatrix::identity(2, 2) * 0.01;
        kf.r = DMatrix::from_row_slice(1, 1, &[0.1]);
        kf.p = DMatrix::identity(2, 2);

        for (i, z) in [1.0, 2.0, 3.0, 4.0, 5.0].iter().enumerate() {
            kf.predict();
            kf.update(&DVector::from_vec(vec![*z]));

            if i >= 2 {
                assert!((kf.x[0] - z).abs() < 0.5, "Step {}: position {}", i + 1, kf.x[0]);
                assert!((kf.x[1] - 1.0).abs() < 0.5, "Step {}: velocity {}", i + 1, kf.x[1]);
            }
        }
    }
}
