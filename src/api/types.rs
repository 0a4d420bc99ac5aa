//! API response and query types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::forecast::{
    DashboardReport, EnergyType, FitSummary, ForecastOutcome, ForecastPoint, PanelReport, PlotRange,
};
use crate::report::outcome_message;

/// Query parameters of the forecast endpoints.
#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    /// Requested datetime, e.g. `2021-04-20T13:00`; defaults to the
    /// preselected date and time.
    pub datetime: Option<String>,
}

/// Query parameters of the plot endpoint.
#[derive(Debug, Deserialize)]
pub struct PlotQuery {
    /// `1d`, `1w` or `all` (default).
    pub range: Option<String>,
}

/// Both energy panels for one datetime.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub requested: NaiveDateTime,
    pub target_index: i64,
    pub panels: Vec<PanelResponse>,
}

impl From<&DashboardReport> for DashboardResponse {
    fn from(report: &DashboardReport) -> Self {
        Self {
            requested: report.requested,
            target_index: report.target_index,
            panels: report.panels.iter().map(PanelResponse::from).collect(),
        }
    }
}

/// One energy panel: either an outcome or the error that replaced it.
#[derive(Debug, Serialize)]
pub struct PanelResponse {
    pub energy: EnergyType,
    /// Message as shown on the dashboard.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ForecastOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PanelResponse {
    pub fn new(energy: EnergyType, outcome: &Result<ForecastOutcome>) -> Self {
        let message = outcome_message(energy, outcome);
        match outcome {
            Ok(o) => Self {
                energy,
                message,
                outcome: Some(o.clone()),
                error: None,
            },
            Err(e) => Self {
                energy,
                message,
                outcome: None,
                error: Some(e.to_string()),
            },
        }
    }
}

impl From<&PanelReport> for PanelResponse {
    fn from(panel: &PanelReport) -> Self {
        Self::new(panel.energy, &panel.outcome)
    }
}

/// Actual and forecast series of one energy type within a range.
///
/// Missing samples serialize as `null`.
#[derive(Debug, Serialize)]
pub struct PlotResponse {
    pub energy: EnergyType,
    pub range: String,
    pub actual: Vec<ForecastPoint>,
    pub forecast: Vec<ForecastPoint>,
    /// Fit over the whole series, independent of `range`.
    pub summary: FitSummary,
}

impl PlotResponse {
    pub fn new(
        energy: EnergyType,
        range: PlotRange,
        actual: &[ForecastPoint],
        forecast: &[ForecastPoint],
        summary: FitSummary,
    ) -> Self {
        Self {
            energy,
            range: range.to_string(),
            actual: actual.to_vec(),
            forecast: forecast.to_vec(),
            summary,
        }
    }
}

/// Error response body for 4xx/5xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::error::ForecastError;

    #[test]
    fn panel_response_carries_error_text() {
        let panel = PanelResponse::new(
            EnergyType::Solar,
            &Err(ForecastError::WindowOutOfRange { index: 40, len: 30 }),
        );
        assert!(panel.outcome.is_none());
        assert_eq!(
            panel.error.as_deref(),
            Some("target index 40 lies beyond the series (length 30)")
        );
        let json = serde_json::to_value(&panel).expect("serializes");
        assert!(json.get("outcome").is_none());
    }

    #[test]
    fn panel_response_keeps_outcome() {
        let requested = NaiveDate::from_ymd_opt(2020, 4, 1)
            .and_then(|d| d.and_hms_opt(3, 0, 0))
            .expect("valid datetime");
        let outcome = ForecastOutcome::InsufficientHistory {
            requested,
            target_index: 3,
            window_size: 20,
        };
        let panel = PanelResponse::new(EnergyType::Wind, &Ok(outcome.clone()));
        assert_eq!(panel.outcome, Some(outcome));
        assert!(panel.message.starts_with("Not enough historical data"));
    }
}
