use tracing::info;

use super::types::ForecastPoint;
use crate::config::ForecastSettings;
use crate::error::{InferenceError, Result};
use crate::models::ForecastModel;
use crate::series::SeriesStore;

/// Runs a model over every stride-1 window of a series.
///
/// Prediction `i` uses samples `[i, i + window_size)` and is stamped with the
/// timestamp of sample `window_size + i`, the first sample it forecasts. A
/// series of length `n` yields `max(0, n - window_size)` predictions.
#[derive(Debug, Clone, Copy)]
pub struct BatchForecaster {
    window_size: usize,
    batch_size: usize,
}

impl BatchForecaster {
    /// Creates a forecaster.
    ///
    /// # Arguments
    ///
    /// * `window_size` - Samples per model input
    /// * `batch_size` - Windows handed to the model per call
    ///
    /// # Panics
    ///
    /// Panics if `window_size` or `batch_size` is zero.
    pub fn new(window_size: usize, batch_size: usize) -> Self {
        assert!(window_size > 0, "window_size must be > 0");
        assert!(batch_size > 0, "batch_size must be > 0");
        Self {
            window_size,
            batch_size,
        }
    }

    /// Creates a forecaster from validated settings.
    pub fn from_settings(settings: &ForecastSettings) -> Self {
        Self::new(settings.window_size, settings.batch_size)
    }

    /// Predicts the whole series.
    ///
    /// # Errors
    ///
    /// Returns the first inference failure, or
    /// [`InferenceError::BatchSize`] if a batch returns the wrong number of
    /// outputs.
    pub fn forecast_all<M: ForecastModel + ?Sized>(
        &self,
        store: &SeriesStore,
        model: &M,
    ) -> Result<Vec<ForecastPoint>> {
        let count = store.len().saturating_sub(self.window_size);
        if count == 0 {
            return Ok(Vec::new());
        }

        let windows: Vec<&[f64]> = store.samples().windows(self.window_size).take(count).collect();
        let mut points = Vec::with_capacity(count);

        for batch in windows.chunks(self.batch_size) {
            let values = model.predict_batch(batch)?;
            if values.len() != batch.len() {
                return Err(InferenceError::BatchSize {
                    sent: batch.len(),
                    received: values.len(),
                }
                .into());
            }
            for value_mw in values {
                let i = points.len();
                points.push(ForecastPoint {
                    timestamp: store.timestamp_at(self.window_size + i),
                    value_mw,
                });
            }
        }

        info!(
            predictions = points.len(),
            batch_size = self.batch_size,
            "full-series forecast computed"
        );
        Ok(points)
    }
}
