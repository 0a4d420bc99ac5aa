//! Error types shared across loading, configuration, and inference.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Failures raised while evaluating a model over a window.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    /// The window handed to the model has the wrong number of samples.
    #[error("window length mismatch: expected {expected}, got {got}")]
    WindowLength { expected: usize, got: usize },

    /// A batched call returned a different number of outputs than inputs.
    #[error("batch size mismatch: sent {sent} windows, received {received} outputs")]
    BatchSize { sent: usize, received: usize },

    /// The model output diverged to infinity.
    #[error("model produced an infinite output: {0}")]
    Infinite(f64),

    /// The model file describes an inconsistent network.
    #[error("invalid model shape: {0}")]
    Shape(String),
}

/// Errors that abort loading or a single forecast request.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The source file could not be opened or read.
    #[error("cannot read \"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected the file structure.
    #[error("malformed CSV in \"{}\": {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A non-empty cell is not a number.
    #[error("\"{}\" row {row}: cannot parse \"{value}\" as a number", .path.display())]
    Parse {
        path: PathBuf,
        row: usize,
        value: String,
    },

    /// A data row is shorter than the configured production column.
    #[error("\"{}\" row {row}: no column {column}", .path.display())]
    MissingColumn {
        path: PathBuf,
        row: usize,
        column: usize,
    },

    /// A pretrained model file is unreadable or inconsistent.
    #[error("cannot load model \"{}\": {message}", .path.display())]
    ModelLoad { path: PathBuf, message: String },

    /// The target lies past the end of the loaded series.
    #[error("target index {index} lies beyond the series (length {len})")]
    WindowOutOfRange { index: i64, len: usize },

    /// The model rejected its input or produced a malformed output.
    #[error("model inference failed: {0}")]
    ModelInference(#[from] InferenceError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
