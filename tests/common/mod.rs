//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use renewable_forecast::config::ForecastSettings;
use renewable_forecast::error::InferenceError;
use renewable_forecast::forecast::{EnergyPanel, ForecastService};
use renewable_forecast::models::ForecastModel;
use renewable_forecast::series::SeriesStore;

/// Default series start (2020-04-01 00:00).
pub fn start() -> NaiveDateTime {
    ForecastSettings::default().start_datetime
}

/// Datetime `hours` after the series start.
pub fn at(hours: i64) -> NaiveDateTime {
    start() + TimeDelta::hours(hours)
}

/// Calendar datetime helper.
pub fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, s))
        .expect("valid datetime")
}

/// Series `0.0, 1.0, …, len - 1` starting at [`start`].
pub fn ramp(len: usize) -> SeriesStore {
    SeriesStore::from_samples(start(), (0..len).map(|i| i as f64).collect())
}

/// Model that returns the sum of its window and records every call.
#[derive(Clone, Default)]
pub struct CountingModel {
    calls: Arc<AtomicUsize>,
    windows: Arc<Mutex<Vec<Vec<f64>>>>,
}

impl CountingModel {
    /// Number of `predict` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Windows seen so far, in call order.
    pub fn windows(&self) -> Vec<Vec<f64>> {
        self.windows.lock().expect("lock").clone()
    }
}

impl ForecastModel for CountingModel {
    fn window_size(&self) -> usize {
        20
    }

    fn predict(&self, window: &[f64]) -> Result<f64, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.windows.lock().expect("lock").push(window.to_vec());
        Ok(window.iter().sum())
    }
}

/// Service over `wind` and `solar` sharing one counting model.
pub fn counting_service(
    wind: SeriesStore,
    solar: SeriesStore,
) -> (ForecastService<CountingModel>, CountingModel) {
    let model = CountingModel::default();
    let service = ForecastService::new(
        ForecastSettings::default(),
        EnergyPanel::new(wind, model.clone()),
        EnergyPanel::new(solar, model.clone()),
    );
    (service, model)
}

/// Model that rejects every window.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingModel;

impl ForecastModel for FailingModel {
    fn window_size(&self) -> usize {
        20
    }

    fn predict(&self, _window: &[f64]) -> Result<f64, InferenceError> {
        Err(InferenceError::Infinite(f64::INFINITY))
    }
}
