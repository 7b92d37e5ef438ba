//! Internal numerical building blocks.
//!
//! - kalman: generic linear Kalman filter on `nalgebra` dynamic matrices

pub mod kalman;
