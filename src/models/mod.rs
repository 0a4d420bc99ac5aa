//! Pretrained forecasting models.
//!
//! Every model satisfies [`ForecastModel`]: given a fixed-length window of past
//! hourly samples it returns one predicted value. File-loaded models are
//! represented by [`PretrainedModel`], which dispatches to the concrete
//! architectures.

/// Autoregressive linear model.
pub mod linear;
/// Stacked SimpleRNN network with a dense head.
pub mod rnn;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ForecastError, InferenceError};

pub use linear::LinearModel;
pub use rnn::{DenseLayer, RnnLayer, RnnModel};

/// Single-step inference over a window of past samples.
pub trait ForecastModel {
    /// Number of samples the model expects per window.
    fn window_size(&self) -> usize;

    /// Predicts the sample that immediately follows `window`.
    ///
    /// # Errors
    ///
    /// Returns an [`InferenceError`] if the window has the wrong length or the
    /// output diverges.
    fn predict(&self, window: &[f64]) -> Result<f64, InferenceError>;

    /// Predicts one value per window, in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`InferenceError`] encountered.
    fn predict_batch(&self, windows: &[&[f64]]) -> Result<Vec<f64>, InferenceError> {
        windows.iter().map(|w| self.predict(w)).collect()
    }
}

impl<M: ForecastModel + ?Sized> ForecastModel for Box<M> {
    fn window_size(&self) -> usize {
        (**self).window_size()
    }

    fn predict(&self, window: &[f64]) -> Result<f64, InferenceError> {
        (**self).predict(window)
    }

    fn predict_batch(&self, windows: &[&[f64]]) -> Result<Vec<f64>, InferenceError> {
        (**self).predict_batch(windows)
    }
}

/// Rejects windows whose length differs from `expected`.
pub(crate) fn check_window(expected: usize, window: &[f64]) -> Result<(), InferenceError> {
    if window.len() != expected {
        return Err(InferenceError::WindowLength {
            expected,
            got: window.len(),
        });
    }
    Ok(())
}

/// Rejects infinite outputs. NaN passes through: it is what a window with
/// missing samples produces.
pub(crate) fn check_output(value: f64) -> Result<f64, InferenceError> {
    if value.is_infinite() {
        return Err(InferenceError::Infinite(value));
    }
    Ok(value)
}

/// Model loaded from a JSON file, tagged by `"kind"`.
///
/// Follows the enum-dispatch pattern so the service stays generic over a
/// single concrete type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PretrainedModel {
    /// Recurrent network.
    Rnn(RnnModel),
    /// Linear autoregression.
    Linear(LinearModel),
}

impl PretrainedModel {
    /// Loads and validates a model from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::ModelLoad`] if the file cannot be read, is not
    /// valid JSON, or describes an inconsistent network.
    pub fn from_json_file(path: &Path) -> Result<Self, ForecastError> {
        let load_err = |message: String| ForecastError::ModelLoad {
            path: path.to_path_buf(),
            message,
        };
        let content = fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let model = Self::from_json_str(&content).map_err(|e| load_err(e.to_string()))?;
        info!(
            path = %path.display(),
            kind = model.kind(),
            window_size = model.window_size(),
            "loaded pretrained model"
        );
        Ok(model)
    }

    /// Parses and validates a model from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::Shape`] for malformed JSON or inconsistent
    /// layer dimensions.
    pub fn from_json_str(s: &str) -> Result<Self, InferenceError> {
        let model: Self =
            serde_json::from_str(s).map_err(|e| InferenceError::Shape(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    /// Serializes the model as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json` error if serialization fails.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Checks layer dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::Shape`] describing the first inconsistency.
    pub fn validate(&self) -> Result<(), InferenceError> {
        match self {
            Self::Rnn(m) => m.validate(),
            Self::Linear(m) => m.validate(),
        }
    }

    /// Architecture tag as written in the model file.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rnn(_) => "rnn",
            Self::Linear(_) => "linear",
        }
    }
}

impl ForecastModel for PretrainedModel {
    fn window_size(&self) -> usize {
        match self {
            Self::Rnn(m) => m.window_size(),
            Self::Linear(m) => m.window_size(),
        }
    }

    fn predict(&self, window: &[f64]) -> Result<f64, InferenceError> {
        match self {
            Self::Rnn(m) => m.predict(window),
            Self::Linear(m) => m.predict(window),
        }
    }
}
