use serde::{Deserialize, Serialize};

use super::{ForecastModel, check_output, check_window};
use crate::error::InferenceError;

/// Recurrent network exported from a Keras-style training run.
///
/// The window is fed as a sequence of `window_size` one-feature steps (input
/// shape `(1, window_size, 1)`). Each [`RnnLayer`] consumes the full hidden
/// sequence of the previous one; the final hidden state of the last layer goes
/// through the dense head and is multiplied by `output_scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RnnModel {
    /// Number of time steps per input sequence.
    pub window_size: usize,
    /// Recurrent layers, input side first.
    pub layers: Vec<RnnLayer>,
    /// Output projection.
    pub dense: DenseLayer,
    /// Multiplier applied to the dense output (a trailing scaling layer).
    #[serde(default = "unit_scale")]
    pub output_scale: f64,
}

fn unit_scale() -> f64 {
    1.0
}

/// SimpleRNN layer with `tanh` activation.
///
/// `h_t = tanh(x_t · kernel + h_{t-1} · recurrent_kernel + bias)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RnnLayer {
    /// Input weights, `[input_dim][units]`.
    pub kernel: Vec<Vec<f64>>,
    /// Hidden-to-hidden weights, `[units][units]`.
    pub recurrent_kernel: Vec<Vec<f64>>,
    /// Per-unit bias, `[units]`.
    pub bias: Vec<f64>,
}

/// Fully connected layer with a single linear output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    /// One weight per input unit.
    pub weights: Vec<f64>,
    #[serde(default)]
    pub bias: f64,
}

impl RnnLayer {
    pub fn units(&self) -> usize {
        self.bias.len()
    }

    fn input_dim(&self) -> usize {
        self.kernel.len()
    }

    fn forward(&self, inputs: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let units = self.units();
        let mut h = vec![0.0; units];
        let mut outputs = Vec::with_capacity(inputs.len());
        for x in inputs {
            let mut next = self.bias.clone();
            for (xi, row) in x.iter().zip(&self.kernel) {
                for (n, w) in next.iter_mut().zip(row) {
                    *n += xi * w;
                }
            }
            for (hi, row) in h.iter().zip(&self.recurrent_kernel) {
                for (n, w) in next.iter_mut().zip(row) {
                    *n += hi * w;
                }
            }
            for n in &mut next {
                *n = n.tanh();
            }
            h.clone_from(&next);
            outputs.push(next);
        }
        outputs
    }

    fn validate(&self, position: usize, input_dim: usize) -> Result<(), InferenceError> {
        let units = self.units();
        let shape_err =
            |what: String| Err(InferenceError::Shape(format!("layer {position}: {what}")));

        if units == 0 {
            return shape_err("bias must not be empty".to_string());
        }
        if self.input_dim() != input_dim {
            return shape_err(format!(
                "kernel has {} rows, expected {input_dim}",
                self.input_dim()
            ));
        }
        if self.kernel.iter().any(|row| row.len() != units) {
            return shape_err(format!("kernel rows must have {units} columns"));
        }
        if self.recurrent_kernel.len() != units
            || self.recurrent_kernel.iter().any(|row| row.len() != units)
        {
            return shape_err(format!("recurrent_kernel must be {units}x{units}"));
        }
        Ok(())
    }
}

impl RnnModel {
    /// One-unit, one-layer network; handy for hand-checkable fixtures.
    pub fn scalar(
        window_size: usize,
        input_weight: f64,
        recurrent_weight: f64,
        output_weight: f64,
    ) -> Self {
        Self {
            window_size,
            layers: vec![RnnLayer {
                kernel: vec![vec![input_weight]],
                recurrent_kernel: vec![vec![recurrent_weight]],
                bias: vec![0.0],
            }],
            dense: DenseLayer {
                weights: vec![output_weight],
                bias: 0.0,
            },
            output_scale: 1.0,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), InferenceError> {
        if self.window_size == 0 {
            return Err(InferenceError::Shape("window_size must be > 0".to_string()));
        }
        if self.layers.is_empty() {
            return Err(InferenceError::Shape(
                "rnn model needs at least one layer".to_string(),
            ));
        }
        let mut input_dim = 1;
        for (i, layer) in self.layers.iter().enumerate() {
            layer.validate(i, input_dim)?;
            input_dim = layer.units();
        }
        if self.dense.weights.len() != input_dim {
            return Err(InferenceError::Shape(format!(
                "dense layer has {} weights, expected {input_dim}",
                self.dense.weights.len()
            )));
        }
        Ok(())
    }
}

impl ForecastModel for RnnModel {
    fn window_size(&self) -> usize {
        self.window_size
    }

    fn predict(&self, window: &[f64]) -> Result<f64, InferenceError> {
        check_window(self.window_size, window)?;
        let mut sequence: Vec<Vec<f64>> = window.iter().map(|&x| vec![x]).collect();
        for layer in &self.layers {
            sequence = layer.forward(&sequence);
        }
        let last = sequence
            .last()
            .ok_or_else(|| InferenceError::Shape("empty sequence".to_string()))?;
        let dense = self
            .dense
            .weights
            .iter()
            .zip(last)
            .fold(self.dense.bias, |acc, (w, h)| acc + w * h);
        check_output(dense * self.output_scale)
    }
}
