//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::NaiveDateTime;
use tracing::{debug, warn};

use super::AppState;
use super::types::{
    DashboardResponse, ErrorResponse, ForecastQuery, PanelResponse, PlotQuery, PlotResponse,
};
use crate::error::ForecastError;
use crate::forecast::{EnergyType, PlotRange};

/// Status code and JSON body of a failed request.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Datetime formats accepted in `?datetime=`.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn requested_datetime(state: &AppState, query: &ForecastQuery) -> Result<NaiveDateTime, ApiError> {
    match query.datetime.as_deref() {
        None => Ok(state.presentation.default_datetime()),
        Some(raw) => parse_datetime(raw).ok_or_else(|| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("invalid datetime \"{raw}\" (expected YYYY-MM-DDTHH:MM[:SS])"),
            )
        }),
    }
}

fn energy_type(raw: &str) -> Result<EnergyType, ApiError> {
    raw.parse::<EnergyType>()
        .map_err(|e| api_error(StatusCode::NOT_FOUND, e))
}

fn status_for(err: &ForecastError) -> StatusCode {
    match err {
        ForecastError::WindowOutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Forecasts both energy types.
///
/// `GET /forecast?datetime=2021-04-20T13:00` → 200 + `DashboardResponse` JSON.
/// Panel failures are reported inside the body. A malformed datetime → 400.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let requested = requested_datetime(&state, &query)?;
    debug!(%requested, "dashboard request");
    let report = state.service.forecast_both(requested);
    Ok(Json(DashboardResponse::from(&report)))
}

/// Forecasts one energy type.
///
/// `GET /forecast/{energy}?datetime=…` → 200 + `PanelResponse` JSON for any
/// outcome; 404 for an unknown energy type; 400 for a malformed datetime;
/// 422 when the window runs past the loaded series; 500 when the model fails.
pub async fn get_forecast(
    State(state): State<Arc<AppState>>,
    Path(energy): Path<String>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<PanelResponse>, ApiError> {
    let energy = energy_type(&energy)?;
    let requested = requested_datetime(&state, &query)?;
    let outcome = state.service.forecast(energy, requested);
    if let Err(e) = &outcome {
        warn!(%energy, %requested, error = %e, "forecast request failed");
        return Err(api_error(status_for(e), e.to_string()));
    }
    Ok(Json(PanelResponse::new(energy, &outcome)))
}

/// Actual vs forecast series of one energy type.
///
/// `GET /plot/{energy}?range=1d|1w|all` → 200 + `PlotResponse` JSON; 404 for an
/// unknown energy type; 400 for an unknown range.
pub async fn get_plot(
    State(state): State<Arc<AppState>>,
    Path(energy): Path<String>,
    Query(query): Query<PlotQuery>,
) -> Result<Json<PlotResponse>, ApiError> {
    let energy = energy_type(&energy)?;
    let range = match query.range.as_deref() {
        None => PlotRange::All,
        Some(raw) => raw
            .parse::<PlotRange>()
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?,
    };
    let plot = state.service.plot(energy).map_err(|e| {
        warn!(%energy, error = %e, "plot request failed");
        api_error(status_for(&e), e.to_string())
    })?;
    let view = plot.visible(range);
    Ok(Json(PlotResponse::new(
        energy,
        range,
        view.actual,
        view.forecast,
        plot.summary,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_iso_and_space_separated_datetimes() {
        let expected = chrono::NaiveDate::from_ymd_opt(2021, 4, 20)
            .and_then(|d| d.and_hms_opt(13, 0, 0));
        assert_eq!(parse_datetime("2021-04-20T13:00"), expected);
        assert_eq!(parse_datetime("2021-04-20 13:00:00"), expected);
        assert_eq!(parse_datetime("20.04.2021 13:00"), None);
    }

    #[test]
    fn out_of_range_maps_to_422() {
        let err = ForecastError::WindowOutOfRange { index: 9, len: 3 };
        assert_eq!(status_for(&err), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
