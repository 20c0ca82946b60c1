//! Sequential smoothing of a finished height field.
//!
//! The final synthesis step feeds every height, in flat row-major order,
//! through one scalar Kalman filter whose state carries over from cell to
//! cell. It is a 1D smoother applied to the flattened 2D field, not an
//! isotropic blur: each row inherits state from the end of the previous row
//! and the result is biased along the scan axis.

/// Control input applied at every smoothing step.
pub const SMOOTHING_CONTROL: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
struct KalmanState {
    estimate: f64,
    covariance: f64,
}

/// One-dimensional Kalman filter with a linear control term.
///
/// Model: `x' = transition * x + control * u`, observed as
/// `z = observation * x`. The control gain defaults to zero, so the control
/// input is inert unless a gain is set; with zero gain every estimate is a
/// convex combination of the measurements seen so far.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarKalman {
    /// Process noise variance.
    pub process_noise: f64,
    /// Measurement noise variance.
    pub measurement_noise: f64,
    pub transition: f64,
    pub control: f64,
    pub observation: f64,
    state: Option<KalmanState>,
}

impl ScalarKalman {
    /// Filter with the given variances, unit transition/observation and no control gain.
    pub fn new(process_noise: f64, measurement_noise: f64) -> Self {
        Self {
            process_noise,
            measurement_noise,
            transition: 1.0,
            control: 0.0,
            observation: 1.0,
            state: None,
        }
    }

    /// Feed one measurement `z` with control input `u`, returning the new estimate.
    ///
    /// The first measurement initialises the estimate directly.
    pub fn filter(&mut self, z: f64, u: f64) -> f64 {
        let next = match self.state {
            None => KalmanState {
                estimate: z / self.observation,
                covariance: self.measurement_noise / (self.observation * self.observation),
            },
            Some(prev) => {
                let predicted = self.transition * prev.estimate + self.control * u;
                let predicted_cov =
                    self.transition * prev.covariance * self.transition + self.process_noise;
                let gain = predicted_cov * self.observation
                    / (self.observation * predicted_cov * self.observation
                        + self.measurement_noise);
                KalmanState {
                    estimate: predicted + gain * (z - self.observation * predicted),
                    covariance: predicted_cov - gain * self.observation * predicted_cov,
                }
            }
        };
        self.state = Some(next);
        next.estimate
    }

    /// Current estimate, if any measurement has been seen.
    pub fn estimate(&self) -> Option<f64> {
        self.state.map(|s| s.estimate)
    }

    /// Forget all state.
    pub fn reset(&mut self) {
        self.state = None;
    }
}

impl Default for ScalarKalman {
    /// Unit process and measurement variance, as used for terrain smoothing.
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Smooth `values` in place, in slice order, through `filter`.
///
/// Each output is clamped to `[0, 1]`; the filter keeps its unclamped
/// estimate as state for the next cell.
pub fn smooth_in_scan_order(values: &mut [f32], filter: &mut ScalarKalman, control: f64) {
    for value in values.iter_mut() {
        let estimate = filter.filter(f64::from(*value), control);
        *value = (estimate as f32).clamp(0.0, 1.0);
    }
}
