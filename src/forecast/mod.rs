//! Single-point forecasting service and full-series forecasting.
//!
//! [`ForecastService`] answers "what is the predicted production at datetime
//! T" for one energy type; [`batch::BatchForecaster`] recomputes a prediction
//! for every sliding window of a series for plotting.

/// Sliding-window forecasts over a whole series.
pub mod batch;
/// Actual-vs-forecast plot data.
pub mod plot;
pub mod types;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ForecastConfig, ForecastSettings, SourceConfig};
use crate::error::{ForecastError, Result};
use crate::index;
use crate::models::{ForecastModel, PretrainedModel};
use crate::series::SeriesStore;

pub use batch::BatchForecaster;
pub use plot::{FitSummary, PlotData, PlotRange};
pub use types::{EnergyType, ForecastOutcome, ForecastPoint, ForecastRequest, ForecastResult};

/// History and model of one energy type.
#[derive(Debug, Clone)]
pub struct EnergyPanel<M> {
    pub store: SeriesStore,
    pub model: M,
}

impl<M> EnergyPanel<M> {
    pub fn new(store: SeriesStore, model: M) -> Self {
        Self { store, model }
    }
}

/// Outcome of one energy panel within a [`DashboardReport`].
#[derive(Debug)]
pub struct PanelReport {
    pub energy: EnergyType,
    pub outcome: Result<ForecastOutcome>,
}

/// Wind and solar forecasts for one requested datetime, evaluated independently.
#[derive(Debug)]
pub struct DashboardReport {
    /// Datetime as requested.
    pub requested: NaiveDateTime,
    /// Offset of the requested datetime from the series start.
    pub target_index: i64,
    /// One entry per energy type, in [`EnergyType::ALL`] order.
    pub panels: Vec<PanelReport>,
}

impl DashboardReport {
    /// Returns the panel for `energy`.
    pub fn panel(&self, energy: EnergyType) -> Option<&PanelReport> {
        self.panels.iter().find(|p| p.energy == energy)
    }

    /// `true` when the request exceeded the configured ceiling.
    pub fn date_unavailable(&self) -> bool {
        self.panels
            .iter()
            .any(|p| matches!(p.outcome, Ok(ForecastOutcome::DateUnavailable { .. })))
    }
}

/// Read-only forecasting state constructed once at start-up.
///
/// Owns both energy panels; nothing is mutated after construction, so a
/// service can be shared behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct ForecastService<M> {
    settings: ForecastSettings,
    wind: EnergyPanel<M>,
    solar: EnergyPanel<M>,
}

impl<M: ForecastModel> ForecastService<M> {
    pub fn new(settings: ForecastSettings, wind: EnergyPanel<M>, solar: EnergyPanel<M>) -> Self {
        Self {
            settings,
            wind,
            solar,
        }
    }

    pub fn settings(&self) -> &ForecastSettings {
        &self.settings
    }

    pub fn panel(&self, energy: EnergyType) -> &EnergyPanel<M> {
        match energy {
            EnergyType::Wind => &self.wind,
            EnergyType::Solar => &self.solar,
        }
    }

    /// Offset of `requested` from the configured series start.
    pub fn target_index(&self, requested: NaiveDateTime) -> i64 {
        index::to_index(self.settings.start_datetime, requested)
    }

    /// Predicts production of `energy` at `requested`.
    ///
    /// A request past the ceiling yields [`ForecastOutcome::DateUnavailable`]
    /// without touching the series or the model. A target inside the first
    /// `window_size` samples yields [`ForecastOutcome::InsufficientHistory`].
    /// Otherwise the model is called exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::WindowOutOfRange`] when the window extends past
    /// the end of the series and [`ForecastError::ModelInference`] when the
    /// model fails.
    pub fn forecast(&self, energy: EnergyType, requested: NaiveDateTime) -> Result<ForecastOutcome> {
        let s = &self.settings;
        if requested > s.max_valid_datetime {
            debug!(%energy, %requested, "date past ceiling");
            return Ok(ForecastOutcome::DateUnavailable {
                requested,
                max_valid: s.max_valid_datetime,
            });
        }

        let panel = self.panel(energy);
        let target_index = index::to_index(panel.store.start(), requested);
        if target_index < s.window_size as i64 {
            debug!(%energy, target_index, "not enough history");
            return Ok(ForecastOutcome::InsufficientHistory {
                requested,
                target_index,
                window_size: s.window_size,
            });
        }

        let out_of_range = || ForecastError::WindowOutOfRange {
            index: target_index,
            len: panel.store.len(),
        };
        let target = usize::try_from(target_index).map_err(|_| out_of_range())?;
        let window = panel
            .store
            .window(target, s.window_size)
            .ok_or_else(out_of_range)?;

        let missing_in_window = window.iter().filter(|v| v.is_nan()).count();
        if missing_in_window > 0 {
            warn!(%energy, target_index, missing_in_window, "forecast window contains missing samples");
        }

        let value_mw = panel.model.predict(window)?;
        debug!(%energy, target_index, value_mw, "forecast computed");

        Ok(ForecastOutcome::Predicted(ForecastResult {
            energy,
            requested,
            target_index,
            value_mw,
            missing_in_window,
        }))
    }

    /// Same as [`ForecastService::forecast`] for a request value.
    ///
    /// # Errors
    ///
    /// See [`ForecastService::forecast`].
    pub fn forecast_request(&self, request: ForecastRequest) -> Result<ForecastOutcome> {
        self.forecast(request.energy, request.datetime)
    }

    /// Forecasts both energy types; a failure in one panel does not affect the other.
    pub fn forecast_both(&self, requested: NaiveDateTime) -> DashboardReport {
        let panels = EnergyType::ALL
            .iter()
            .map(|&energy| PanelReport {
                energy,
                outcome: self.forecast(energy, requested),
            })
            .collect();
        DashboardReport {
            requested,
            target_index: self.target_index(requested),
            panels,
        }
    }

    /// Predicts every sliding window of the `energy` series.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Config`] if the window or batch size is zero,
    /// and [`ForecastError::ModelInference`] on the first failing batch.
    pub fn forecast_series(&self, energy: EnergyType) -> Result<Vec<ForecastPoint>> {
        if self.settings.window_size == 0 {
            return Err(ConfigError::new("forecast.window_size", "must be > 0").into());
        }
        if self.settings.batch_size == 0 {
            return Err(ConfigError::new("forecast.batch_size", "must be > 0").into());
        }
        let panel = self.panel(energy);
        BatchForecaster::from_settings(&self.settings).forecast_all(&panel.store, &panel.model)
    }

    /// Actual and forecast series of `energy` with a fit summary.
    ///
    /// # Errors
    ///
    /// See [`ForecastService::forecast_series`].
    pub fn plot(&self, energy: EnergyType) -> Result<PlotData> {
        let forecast = self.forecast_series(energy)?;
        Ok(PlotData::build(energy, &self.panel(energy).store, forecast))
    }
}

impl ForecastService<PretrainedModel> {
    /// Loads both series and models named by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Config`] with the first violated constraint
    /// of [`ForecastConfig::validate`], otherwise the first load error:
    /// unreadable files, unparsable cells, invalid model files, or a model
    /// whose window length differs from `forecast.window_size`.
    pub fn from_config(config: &ForecastConfig) -> Result<Self> {
        if let Some(err) = config.validate().into_iter().next() {
            return Err(ForecastError::Config(err));
        }
        let settings = config.forecast.clone();
        let wind = load_panel(&config.wind, &settings)?;
        let solar = load_panel(&config.solar, &settings)?;
        info!(
            wind_samples = wind.store.len(),
            solar_samples = solar.store.len(),
            window_size = settings.window_size,
            "forecast service ready"
        );
        Ok(Self::new(settings, wind, solar))
    }
}

fn load_panel(
    source: &SourceConfig,
    settings: &ForecastSettings,
) -> Result<EnergyPanel<PretrainedModel>> {
    let store = SeriesStore::load(&source.data_path, source.column, settings.start_datetime)?;
    let model = PretrainedModel::from_json_file(&source.model_path)?;
    if model.window_size() != settings.window_size {
        return Err(ForecastError::ModelLoad {
            path: source.model_path.clone(),
            message: format!(
                "model expects windows of {} samples, forecast.window_size is {}",
                model.window_size(),
                settings.window_size
            ),
        });
    }
    Ok(EnergyPanel::new(store, model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinearModel;
    use chrono::TimeDelta;

    fn settings() -> ForecastSettings {
        ForecastSettings::default()
    }

    fn service(len: usize) -> ForecastService<LinearModel> {
        let s = settings();
        let samples: Vec<f64> = (0..len).map(|i| i as f64).collect();
        let wind = EnergyPanel::new(
            SeriesStore::from_samples(s.start_datetime, samples.clone()),
            LinearModel::persistence(s.window_size),
        );
        let solar = EnergyPanel::new(
            SeriesStore::from_samples(s.start_datetime, samples.iter().map(|v| v * 2.0).collect()),
            LinearModel::moving_average(s.window_size, 2),
        );
        ForecastService::new(s, wind, solar)
    }

    fn at(hours: i64) -> NaiveDateTime {
        settings().start_datetime + TimeDelta::hours(hours)
    }

    #[test]
    fn predicts_from_preceding_window() {
        let svc = service(25);
        let outcome = svc.forecast(EnergyType::Wind, at(20)).expect("forecast");
        assert_eq!(outcome.value_mw(), Some(19.0));
        match outcome {
            ForecastOutcome::Predicted(r) => {
                assert_eq!(r.target_index, 20);
                assert_eq!(r.missing_in_window, 0);
                assert_eq!(r.energy, EnergyType::Wind);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn energy_types_use_their_own_panel() {
        let svc = service(25);
        let solar = svc.forecast(EnergyType::Solar, at(22)).expect("forecast");
        // mean of samples 20 and 21, doubled
        assert_eq!(solar.value_mw(), Some(41.0));
    }

    #[test]
    fn early_request_is_insufficient_history() {
        let svc = service(25);
        let outcome = svc.forecast(EnergyType::Wind, at(5)).expect("forecast");
        assert_eq!(
            outcome,
            ForecastOutcome::InsufficientHistory {
                requested: at(5),
                target_index: 5,
                window_size: 20
            }
        );
    }

    #[test]
    fn request_before_start_is_insufficient_history() {
        let svc = service(25);
        let outcome = svc.forecast(EnergyType::Solar, at(-48)).expect("forecast");
        assert!(matches!(
            outcome,
            ForecastOutcome::InsufficientHistory { target_index: -48, .. }
        ));
    }

    #[test]
    fn request_past_ceiling_is_unavailable() {
        let svc = service(25);
        let late = settings().max_valid_datetime + TimeDelta::seconds(1);
        let outcome = svc.forecast(EnergyType::Wind, late).expect("forecast");
        assert!(matches!(outcome, ForecastOutcome::DateUnavailable { .. }));
    }

    #[test]
    fn ceiling_itself_is_valid() {
        let svc = service(25);
        let ceiling = settings().max_valid_datetime;
        let result = svc.forecast(EnergyType::Wind, ceiling);
        // inside the ceiling, so the short series is the limiting factor
        assert!(matches!(result, Err(ForecastError::WindowOutOfRange { .. })));
    }

    #[test]
    fn window_ending_at_series_end_is_allowed() {
        let svc = service(25);
        let outcome = svc.forecast(EnergyType::Wind, at(25)).expect("forecast");
        assert_eq!(outcome.value_mw(), Some(24.0));
        assert!(matches!(
            svc.forecast(EnergyType::Wind, at(26)),
            Err(ForecastError::WindowOutOfRange { index: 26, len: 25 })
        ));
    }

    #[test]
    fn sub_hour_request_truncates() {
        let svc = service(25);
        let requested = at(21) + TimeDelta::minutes(45);
        let outcome = svc.forecast(EnergyType::Wind, requested).expect("forecast");
        assert_eq!(outcome.value_mw(), Some(20.0));
    }

    #[test]
    fn forecast_both_reports_each_panel() {
        let svc = service(25);
        let report = svc.forecast_both(at(21));
        assert_eq!(report.target_index, 21);
        assert_eq!(report.panels.len(), 2);
        assert!(!report.date_unavailable());
        let wind = report.panel(EnergyType::Wind).expect("wind panel");
        assert_eq!(wind.outcome.as_ref().ok().and_then(ForecastOutcome::value_mw), Some(20.0));
    }

    #[test]
    fn forecast_series_covers_every_window() {
        let svc = service(25);
        let points = svc.forecast_series(EnergyType::Wind).expect("series");
        assert_eq!(points.len(), 5);
        assert_eq!(points[0].timestamp, at(20));
        assert_eq!(points[0].value_mw, 19.0);
    }

    #[test]
    fn zero_batch_size_is_a_config_error() {
        let mut svc = service(25);
        svc.settings.batch_size = 0;
        let err = svc.plot(EnergyType::Wind).expect_err("must fail");
        assert!(matches!(err, ForecastError::Config(ref e) if e.field == "forecast.batch_size"));
    }
}
