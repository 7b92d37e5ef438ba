//! No-op filter that simply holds the last measurement.
//!
//! Baseline for comparison: no motion model, the forecast is the last
//! measured box.

use super::traits::{BoxFilter, MotionState};
use crate::geometry::Roi;

/// Filter that stores the last measurement as its state.
#[derive(Clone, Debug, Default)]
pub struct NoFilter {
    last: Option<Roi>,
    n: usize,
}

impl NoFilter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BoxFilter for NoFilter {
    fn reset(&mut self) {
        self.last = None;
        self.n = 0;
    }

    fn correct(&mut self, measurement: &Roi) {
        self.last = Some(*measurement);
        self.n += 1;
    }

    fn predict(&mut self) -> Roi {
        match self.last {
            Some(roi) => roi.rounded(),
            None => Roi::INVALID,
        }
    }

    fn step(&mut self, measurement: &Roi) -> MotionState {
        self.correct(measurement);
        self.state()
    }

    fn state(&self) -> MotionState {
        self.last
            .map(|roi| MotionState::at_rest(&roi))
            .unwrap_or_default()
    }

    fn sample_count(&self) -> usize {
        self.n
    }
}
