//! Box motion filters.
//!
//! This module provides:
//! - `MotionFilter` - constant-velocity Kalman filter over `[x, y, vx, vy, w, h]`
//! - `NoFilter` - baseline that holds the last measurement
//! - `RoiFilterEnum` - static dispatch over both, built from `FilterConfig`

mod traits;
mod kalman;
mod no_filter;
mod dispatch;

pub use traits::{BoxFilter, MotionState};
pub use kalman::MotionFilter;
pub use no_filter::NoFilter;
pub use dispatch::{FilterConfig, FilterKind, RoiFilterEnum};
