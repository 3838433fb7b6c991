//! Linear filter over the strip state `[upper, lower, slope]`.
//!
//! The observation is the pair of edge rows. Each edge is either observed or
//! missing, and [`StateFilter::step`] handles the three combinations
//! explicitly:
//!
//! - both observed: full 2-D correction `K = P Hᵀ (H P Hᵀ + R)⁻¹`;
//! - one observed: scalar correction on that row of `H`;
//! - none observed: the prediction is kept as the posterior.
use super::params::KalmanParams;
use nalgebra::{Matrix2, Matrix2x3, Matrix3, Vector2, Vector3};

/// One edge of the observation vector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EdgeObservation {
    Observed(f64),
    Missing,
}

impl EdgeObservation {
    pub fn value(self) -> Option<f64> {
        match self {
            EdgeObservation::Observed(v) => Some(v),
            EdgeObservation::Missing => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observation {
    pub upper: EdgeObservation,
    pub lower: EdgeObservation,
}

impl Observation {
    pub fn both(upper: f64, lower: f64) -> Self {
        Self {
            upper: EdgeObservation::Observed(upper),
            lower: EdgeObservation::Observed(lower),
        }
    }

    pub fn none() -> Self {
        Self {
            upper: EdgeObservation::Missing,
            lower: EdgeObservation::Missing,
        }
    }
}

/// Which correction the last step applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Correction {
    Full,
    UpperOnly,
    LowerOnly,
    PredictOnly,
}

#[derive(Clone, Debug)]
pub struct StateFilter {
    transition: Matrix3<f64>,
    transition_cov: Matrix3<f64>,
    observation: Matrix2x3<f64>,
    observation_cov: Matrix2<f64>,
    mean: Vector3<f64>,
    covariance: Matrix3<f64>,
}

impl StateFilter {
    pub fn new(params: &KalmanParams, initial_mean: Vector3<f64>) -> Self {
        Self {
            transition: params.transition(),
            transition_cov: params.transition_covariance(),
            observation: Matrix2x3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0),
            observation_cov: params.observation_covariance(),
            mean: initial_mean,
            covariance: params.initial_covariance(),
        }
    }

    /// Posterior state after the last step (or the initial state).
    pub fn mean(&self) -> &Vector3<f64> {
        &self.mean
    }

    pub fn covariance(&self) -> &Matrix3<f64> {
        &self.covariance
    }

    /// Time update without touching the filter.
    pub fn predict(&self) -> (Vector3<f64>, Matrix3<f64>) {
        let mean = self.transition * self.mean;
        let cov = self.transition * self.covariance * self.transition.transpose()
            + self.transition_cov;
        (mean, cov)
    }

    /// Predict one column ahead and correct with `obs`.
    pub fn step(&mut self, obs: Observation) -> Correction {
        let (mean_pred, cov_pred) = self.predict();
        let (mean, cov, kind) = match (obs.upper, obs.lower) {
            (EdgeObservation::Observed(u), EdgeObservation::Observed(l)) => {
                match self.correct_full(&mean_pred, &cov_pred, Vector2::new(u, l)) {
                    Some((m, c)) => (m, c, Correction::Full),
                    None => (mean_pred, cov_pred, Correction::PredictOnly),
                }
            }
            (EdgeObservation::Observed(u), EdgeObservation::Missing) => {
                let (m, c) = self.correct_row(&mean_pred, &cov_pred, 0, u);
                (m, c, Correction::UpperOnly)
            }
            (EdgeObservation::Missing, EdgeObservation::Observed(l)) => {
                let (m, c) = self.correct_row(&mean_pred, &cov_pred, 1, l);
                (m, c, Correction::LowerOnly)
            }
            (EdgeObservation::Missing, EdgeObservation::Missing) => {
                (mean_pred, cov_pred, Correction::PredictOnly)
            }
        };
        self.mean = mean;
        self.covariance = cov;
        kind
    }

    fn correct_full(
        &self,
        mean_pred: &Vector3<f64>,
        cov_pred: &Matrix3<f64>,
        z: Vector2<f64>,
    ) -> Option<(Vector3<f64>, Matrix3<f64>)> {
        let h = &self.observation;
        let innovation_cov = h * cov_pred * h.transpose() + self.observation_cov;
        let inv = innovation_cov.try_inverse()?;
        let gain = cov_pred * h.transpose() * inv;
        let mean = mean_pred + gain * (z - h * mean_pred);
        let cov = cov_pred - gain * h * cov_pred;
        Some((mean, cov))
    }

    fn correct_row(
        &self,
        mean_pred: &Vector3<f64>,
        cov_pred: &Matrix3<f64>,
        row: usize,
        z: f64,
    ) -> (Vector3<f64>, Matrix3<f64>) {
        let s = cov_pred[(row, row)] + self.observation_cov[(row, row)];
        if s <= f64::EPSILON {
            return (*mean_pred, *cov_pred);
        }
        let gain: Vector3<f64> = cov_pred.column(row) / s;
        let mean = mean_pred + gain * (z - mean_pred[row]);
        let cov = cov_pred - gain * cov_pred.row(row);
        (mean, cov)
    }
}
