//! Plain-text rendering of dashboard forecasts and plot summaries.

use std::fmt;

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::forecast::{DashboardReport, EnergyType, ForecastOutcome, PlotData};

/// Message shown when the request lies past the ceiling.
pub const DATE_UNAVAILABLE: &str = "The date is not available";

/// Formats datetimes the way every surface shows them.
pub fn format_datetime(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Heading of an energy panel, e.g. `Wind Energy Forecast`.
pub fn panel_title(energy: EnergyType) -> String {
    format!("{energy} Energy Forecast")
}

/// Single-line message for one panel outcome.
pub fn outcome_message(energy: EnergyType, outcome: &Result<ForecastOutcome>) -> String {
    match outcome {
        Ok(ForecastOutcome::Predicted(r)) => {
            format!("Predicted {} production: {:.2} MW", energy.as_str(), r.value_mw)
        }
        Ok(ForecastOutcome::DateUnavailable { .. }) => DATE_UNAVAILABLE.to_string(),
        Ok(ForecastOutcome::InsufficientHistory { requested, .. }) => format!(
            "Not enough historical data available to forecast for {}.",
            format_datetime(*requested)
        ),
        Err(e) => format!("Forecast failed: {e}"),
    }
}

/// Extra line for a prediction made over a window with missing samples.
pub fn missing_note(outcome: &Result<ForecastOutcome>, window_size: usize) -> Option<String> {
    match outcome {
        Ok(ForecastOutcome::Predicted(r)) if r.missing_in_window > 0 => Some(format!(
            "Note: {} of {window_size} input samples are missing",
            r.missing_in_window
        )),
        _ => None,
    }
}

/// Text view of a [`DashboardReport`].
///
/// A request past the ceiling prints only [`DATE_UNAVAILABLE`]; otherwise the
/// header lines are followed by one block per energy panel.
pub struct ReportView<'a> {
    pub report: &'a DashboardReport,
    pub window_size: usize,
}

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        if report.date_unavailable() {
            return write!(f, "{DATE_UNAVAILABLE}");
        }
        writeln!(
            f,
            "Forecasting production for: {}",
            format_datetime(report.requested)
        )?;
        write!(f, "Corresponding index in the series: {}", report.target_index)?;
        for panel in &report.panels {
            writeln!(f)?;
            writeln!(f)?;
            writeln!(f, "--- {} ---", panel_title(panel.energy))?;
            write!(f, "{}", outcome_message(panel.energy, &panel.outcome))?;
            if let Some(note) = missing_note(&panel.outcome, self.window_size) {
                write!(f, "\n{note}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for PlotData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let missing = self.actual.iter().filter(|p| p.value_mw.is_nan()).count();
        writeln!(
            f,
            "--- Actual vs Forecasted {} Energy Production ---",
            self.energy
        )?;
        writeln!(
            f,
            "Actual samples:   {} ({missing} missing)",
            self.actual.len()
        )?;
        write!(f, "Forecast points:  {}", self.forecast.len())?;
        if let (Some(first), Some(last)) = (self.forecast.first(), self.forecast.last()) {
            write!(
                f,
                "\nForecast span:    {} .. {}",
                format_datetime(first.timestamp),
                format_datetime(last.timestamp)
            )?;
        }
        match (self.summary.mae_mw, self.summary.rmse_mw) {
            (Some(mae), Some(rmse)) => write!(
                f,
                "\nMAE:              {mae:.3} MW\nRMSE:             {rmse:.3} MW ({} compared)",
                self.summary.compared
            ),
            _ => write!(f, "\nMAE/RMSE:         n/a (no overlapping samples)"),
        }
    }
}
