//! Noise model and search parameters of the recursive tracker.
//!
//! Matrices are written row-major in configuration files. The defaults are
//! the calibrated constants; the transition covariance carries
//! an off-diagonal `-5e-5` term coupling the lower edge to the upper edge.
use nalgebra::{Matrix2, Matrix3};
use serde::{Deserialize, Serialize};

/// How a column with exactly one unreadable edge is fed to the filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialMissPolicy {
    /// Replace the missing edge with the filter's previous estimate of it and
    /// run a full two-edge correction.
    #[default]
    SubstituteEstimate,
    /// Leave the missing edge out and correct with the observed edge only.
    ScalarUpdate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KalmanParams {
    /// Half-height (px) of the search box beyond the previous edge row.
    pub box_width: usize,
    pub initial_covariance: [[f64; 3]; 3],
    pub transition: [[f64; 3]; 3],
    pub transition_covariance: [[f64; 3]; 3],
    pub observation_covariance: [[f64; 2]; 2],
    pub partial_miss: PartialMissPolicy,
}

impl Default for KalmanParams {
    fn default() -> Self {
        Self {
            box_width: 20,
            initial_covariance: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.001]],
            transition: [[1.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 0.0, 1.0]],
            transition_covariance: [
                [0.00005, 0.0, 0.0],
                [-0.00005, 0.0, 0.0],
                [0.0, 0.0, 0.00005],
            ],
            observation_covariance: [[3.0, 0.0], [0.0, 3.0]],
            partial_miss: PartialMissPolicy::SubstituteEstimate,
        }
    }
}

impl KalmanParams {
    pub fn initial_covariance(&self) -> Matrix3<f64> {
        matrix3(&self.initial_covariance)
    }

    pub fn transition(&self) -> Matrix3<f64> {
        matrix3(&self.transition)
    }

    pub fn transition_covariance(&self) -> Matrix3<f64> {
        matrix3(&self.transition_covariance)
    }

    pub fn observation_covariance(&self) -> Matrix2<f64> {
        let r = &self.observation_covariance;
        Matrix2::new(r[0][0], r[0][1], r[1][0], r[1][1])
    }
}

fn matrix3(rows: &[[f64; 3]; 3]) -> Matrix3<f64> {
    Matrix3::from_fn(|r, c| rows[r][c])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrices_are_read_row_major() {
        let params = KalmanParams::default();
        let q = params.transition_covariance();
        assert_eq!(q[(1, 0)], -0.00005);
        assert_eq!(q[(0, 1)], 0.0);
        let f = params.transition();
        assert_eq!(f[(0, 2)], 1.0);
        assert_eq!(f[(2, 0)], 0.0);
    }
}
