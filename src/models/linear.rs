use serde::{Deserialize, Serialize};

use super::{ForecastModel, check_output, check_window};
use crate::error::InferenceError;

/// Linear autoregression: `bias + sum(weights[i] * window[i])`.
///
/// `weights[0]` applies to the oldest sample of the window and the last weight
/// to the most recent one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// One coefficient per window position, oldest first.
    pub weights: Vec<f64>,
    /// Constant term (MW).
    #[serde(default)]
    pub bias: f64,
}

impl LinearModel {
    pub fn new(weights: Vec<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }

    /// Repeats the most recent sample.
    pub fn persistence(window_size: usize) -> Self {
        let mut weights = vec![0.0; window_size];
        if let Some(last) = weights.last_mut() {
            *last = 1.0;
        }
        Self::new(weights, 0.0)
    }

    /// Averages the `n` most recent samples (`n` is clamped to the window).
    pub fn moving_average(window_size: usize, n: usize) -> Self {
        let n = n.clamp(1, window_size.max(1));
        let mut weights = vec![0.0; window_size];
        let start = window_size.saturating_sub(n);
        for w in &mut weights[start..] {
            *w = 1.0 / n as f64;
        }
        Self::new(weights, 0.0)
    }

    pub(crate) fn validate(&self) -> Result<(), InferenceError> {
        if self.weights.is_empty() {
            return Err(InferenceError::Shape(
                "linear model needs at least one weight".to_string(),
            ));
        }
        if self.weights.iter().chain([&self.bias]).any(|w| !w.is_finite()) {
            return Err(InferenceError::Shape(
                "linear model weights must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl ForecastModel for LinearModel {
    fn window_size(&self) -> usize {
        self.weights.len()
    }

    fn predict(&self, window: &[f64]) -> Result<f64, InferenceError> {
        check_window(self.weights.len(), window)?;
        let value = self
            .weights
            .iter()
            .zip(window)
            .fold(self.bias, |acc, (w, x)| acc + w * x);
        check_output(value)
    }
}
