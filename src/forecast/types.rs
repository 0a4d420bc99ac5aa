//! Request and result types for single-point and full-series forecasts.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Energy source with its own history and model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyType {
    Wind,
    Solar,
}

impl EnergyType {
    /// Both energy types in display order.
    pub const ALL: [EnergyType; 2] = [EnergyType::Wind, EnergyType::Solar];

    /// Lowercase identifier used in URLs and CSV exports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wind => "wind",
            Self::Solar => "solar",
        }
    }
}

impl fmt::Display for EnergyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wind => write!(f, "Wind"),
            Self::Solar => write!(f, "Solar"),
        }
    }
}

impl FromStr for EnergyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wind" => Ok(Self::Wind),
            "solar" => Ok(Self::Solar),
            _ => Err(format!("unknown energy type \"{s}\" (expected wind or solar)")),
        }
    }
}

/// Energy type plus the datetime to forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub energy: EnergyType,
    pub datetime: NaiveDateTime,
}

/// Successful single-step prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Energy type the model was evaluated for.
    pub energy: EnergyType,
    /// Datetime as requested (not truncated to the hour).
    pub requested: NaiveDateTime,
    /// Offset of the forecast sample in the series.
    pub target_index: i64,
    /// Model output (MW). NaN when the window held missing samples and the
    /// model propagated them.
    pub value_mw: f64,
    /// Number of missing samples inside the input window.
    pub missing_in_window: usize,
}

/// Outcome of one forecast request that did not fail.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ForecastOutcome {
    /// The model produced a value.
    Predicted(ForecastResult),
    /// The requested datetime lies past the configured ceiling.
    DateUnavailable {
        requested: NaiveDateTime,
        max_valid: NaiveDateTime,
    },
    /// Fewer than `window_size` samples precede the target.
    InsufficientHistory {
        requested: NaiveDateTime,
        target_index: i64,
        window_size: usize,
    },
}

impl ForecastOutcome {
    /// The predicted value, if any.
    pub fn value_mw(&self) -> Option<f64> {
        match self {
            Self::Predicted(r) => Some(r.value_mw),
            _ => None,
        }
    }
}

/// One point of a full-series forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    /// Timestamp of the sample this value forecasts.
    pub timestamp: NaiveDateTime,
    /// Predicted production (MW).
    pub value_mw: f64,
}
