//! Colour sensor intrinsics and pixel deprojection.

use nalgebra::{Matrix3, Point3};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// 3-D position reported when no camera intrinsics are available.
pub fn unset_position() -> Point3<f64> {
    Point3::new(-1.0, -1.0, -1.0)
}

/// Pinhole intrinsics with 5 Brown-Conrady distortion coefficients
/// `[k1, k2, p1, p2, k3]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Focal length in pixels along x.
    pub fx: f64,
    /// Focal length in pixels along y.
    pub fy: f64,
    /// Principal point x.
    pub ppx: f64,
    /// Principal point y.
    pub ppy: f64,
    /// Distortion coefficients `[k1, k2, p1, p2, k3]`.
    pub coeffs: [f64; 5],
}

impl CameraIntrinsics {
    pub fn from_pinhole(fx: f64, fy: f64, ppx: f64, ppy: f64, coeffs: [f64; 5]) -> Result<Self> {
        let intrinsics = Self { fx, fy, ppx, ppy, coeffs };
        intrinsics.validate()?;
        Ok(intrinsics)
    }

    /// Build from a row-major 3x3 camera matrix and 5 distortion
    /// coefficients.
    pub fn from_slices(camera_matrix: &[f64], distortion: &[f64]) -> Result<Self> {
        if camera_matrix.len() != 9 {
            return Err(Error::InvalidIntrinsics {
                expected: "3x3 camera matrix (9 values)".to_string(),
                got: format!("{} values", camera_matrix.len()),
            });
        }
        if distortion.len() != 5 {
            return Err(Error::InvalidIntrinsics {
                expected: "5 distortion coefficients".to_string(),
                got: format!("{} values", distortion.len()),
            });
        }

        let m = Matrix3::from_row_slice(camera_matrix);
        let mut coeffs = [0.0; 5];
        coeffs.copy_from_slice(distortion);
        Self::from_pinhole(m[(0, 0)], m[(1, 1)], m[(0, 2)], m[(1, 2)], coeffs)
    }

    /// Check that all values are finite and the focal lengths are non-zero.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.fx, self.fy, self.ppx, self.ppy]
            .iter()
            .chain(self.coeffs.iter())
            .all(|v| v.is_finite());
        if !finite {
            return Err(Error::InvalidIntrinsics {
                expected: "finite values".to_string(),
                got: format!("{:?}", self),
            });
        }
        if self.fx == 0.0 || self.fy == 0.0 {
            return Err(Error::InvalidIntrinsics {
                expected: "non-zero focal lengths".to_string(),
                got: format!("fx={}, fy={}", self.fx, self.fy),
            });
        }
        Ok(())
    }

    /// The 3x3 camera matrix `[[fx, 0, ppx], [0, fy, ppy], [0, 0, 1]]`.
    pub fn camera_matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.fx, 0.0, self.ppx,
            0.0, self.fy, self.ppy,
            0.0, 0.0, 1.0,
        )
    }

    /// Deproject pixel `(u, v)` at distance `depth` into sensor coordinates.
    ///
    /// Uses the inverse Brown-Conrady model: the normalized ray is computed
    /// from the pixel, undistorted, then scaled by the depth. Output units
    /// follow `depth` (millimetres in the tracker).
    pub fn deproject(&self, u: f64, v: f64, depth: f64) -> Point3<f64> {
        let [k1, k2, p1, p2, k3] = self.coeffs;

        let x = (u - self.ppx) / self.fx;
        let y = (v - self.ppy) / self.fy;

        let r2 = x * x + y * y;
        let f = 1.0 + k1 * r2 + k2 * r2 * r2 + k3 * r2 * r2 * r2;
        let ux = x * f + 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
        let uy = y * f + 2.0 * p2 * x * y + p1 * (r2 + 2.0 * y * y);

        Point3::new(depth * ux, depth * uy, depth)
    }
}
