//! Synthetic production history and demo models.
//!
//! Backs the built-in presets so the dashboard runs without data files, and
//! writes the same data to disk as a ready-to-edit file setup.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime, Timelike};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::info;

use crate::config::{ForecastConfig, SyntheticConfig};
use crate::error::{ForecastError, Result};
use crate::forecast::{EnergyPanel, EnergyType, ForecastService};
use crate::index;
use crate::models::{LinearModel, PretrainedModel};
use crate::series::SeriesStore;

/// Hour of day at which solar output starts (inclusive).
const SUNRISE_HOUR: u32 = 6;
/// Hour of day at which solar output stops (exclusive).
const SUNSET_HOUR: u32 = 20;

/// Long-run mean wind capacity factor.
const WIND_MEAN_CF: f64 = 0.35;
/// AR(1) persistence of the wind capacity factor.
const WIND_ALPHA: f64 = 0.95;
/// Innovation noise of the wind capacity factor.
const WIND_NOISE_STD: f64 = 0.05;

/// AR(1) persistence of the solar cloud multiplier.
const CLOUD_ALPHA: f64 = 0.85;
/// Innovation noise of the cloud multiplier.
const CLOUD_NOISE_STD: f64 = 0.2;
/// Cloud multiplier bounds (heavy overcast to cloud-edge enhancement).
const CLOUD_MIN: f64 = 0.2;
const CLOUD_MAX: f64 = 1.2;

/// Samples averaged by the demo solar model.
const SOLAR_AVERAGE_SPAN: usize = 3;

/// Header of the generated CSV files; production sits in the last column,
/// which is the default `column` of a source.
const CSV_HEADER: [&str; 6] = ["datetime", "year", "month", "day", "hour", "production_mw"];

/// Gaussian noise via the Box-Muller transform.
fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

/// Half-sine daylight shape for `hour`, 0 at night and 1 at solar noon.
fn daylight_frac(hour: u32) -> f64 {
    if !(SUNRISE_HOUR..SUNSET_HOUR).contains(&hour) {
        return 0.0;
    }
    let span = f64::from(SUNSET_HOUR - SUNRISE_HOUR);
    let pos = f64::from(hour - SUNRISE_HOUR) + 0.5;
    (std::f64::consts::PI * pos / span).sin()
}

/// Seasonal solar scaling, peaking near the June solstice.
fn seasonal_factor(at: NaiveDateTime) -> f64 {
    let day = f64::from(at.ordinal());
    let phase = 2.0 * std::f64::consts::PI * (day - 172.0) / 365.25;
    0.65 + 0.35 * phase.cos()
}

/// Number of samples to generate for `cfg`.
///
/// `synthetic.hours = 0` spans from the series start up to and including the
/// hour of the request ceiling.
pub fn sample_count(cfg: &ForecastConfig) -> usize {
    if cfg.synthetic.hours > 0 {
        return cfg.synthetic.hours;
    }
    let f = &cfg.forecast;
    let last = index::to_index(f.start_datetime, f.max_valid_datetime);
    usize::try_from(last + 1).unwrap_or(0)
}

/// Generates the hourly history of `energy`.
///
/// Wind follows a mean-reverting AR(1) capacity factor; solar is a half-sine
/// daylight profile scaled by season and an AR(1) cloud multiplier. Each cell
/// is dropped (NaN) with probability `missing_rate`. The same seed always
/// yields the same series.
pub fn generate(
    energy: EnergyType,
    start: NaiveDateTime,
    hours: usize,
    synthetic: &SyntheticConfig,
) -> SeriesStore {
    let seed = match energy {
        EnergyType::Wind => synthetic.seed,
        EnergyType::Solar => synthetic.seed.wrapping_add(1),
    };
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = match energy {
        EnergyType::Wind => WIND_MEAN_CF,
        EnergyType::Solar => 1.0,
    };

    let mut samples = Vec::with_capacity(hours);
    for i in 0..hours {
        let at = index::timestamp_for(start, i as i64);
        let value = match energy {
            EnergyType::Wind => {
                state = WIND_ALPHA * state
                    + (1.0 - WIND_ALPHA) * WIND_MEAN_CF
                    + gaussian_noise(&mut rng, WIND_NOISE_STD);
                state = state.clamp(0.0, 1.0);
                synthetic.wind_capacity_mw * state
            }
            EnergyType::Solar => {
                state = CLOUD_ALPHA * state
                    + (1.0 - CLOUD_ALPHA)
                    + gaussian_noise(&mut rng, CLOUD_NOISE_STD * (1.0 - CLOUD_ALPHA));
                state = state.clamp(CLOUD_MIN, CLOUD_MAX);
                let frac = daylight_frac(at.hour()) * seasonal_factor(at);
                (synthetic.solar_capacity_mw * frac * state).min(synthetic.solar_capacity_mw)
            }
        };
        let dropped = synthetic.missing_rate > 0.0 && rng.random::<f64>() < synthetic.missing_rate;
        samples.push(if dropped {
            f64::NAN
        } else {
            (value * 1000.0).round() / 1000.0
        });
    }
    SeriesStore::from_samples(start, samples)
}

/// Model used for `energy` by the demo presets.
///
/// Wind uses persistence; solar averages the last few hours.
pub fn demo_model(energy: EnergyType, window_size: usize) -> PretrainedModel {
    match energy {
        EnergyType::Wind => PretrainedModel::Linear(LinearModel::persistence(window_size)),
        EnergyType::Solar => PretrainedModel::Linear(LinearModel::moving_average(
            window_size,
            SOLAR_AVERAGE_SPAN.min(window_size),
        )),
    }
}

/// Builds a service over synthetic history, without touching the filesystem.
pub fn demo_service(cfg: &ForecastConfig) -> ForecastService<PretrainedModel> {
    let settings = cfg.forecast.clone();
    let hours = sample_count(cfg);
    let panel = |energy| {
        EnergyPanel::new(
            generate(energy, settings.start_datetime, hours, &cfg.synthetic),
            demo_model(energy, settings.window_size),
        )
    };
    let wind = panel(EnergyType::Wind);
    let solar = panel(EnergyType::Solar);
    info!(
        hours,
        seed = cfg.synthetic.seed,
        missing_rate = cfg.synthetic.missing_rate,
        "synthetic forecast service ready"
    );
    ForecastService::new(settings, wind, solar)
}

/// Writes synthetic CSVs, demo model files, and a matching `forecast.toml` under `dir`.
///
/// Returns the path of the written configuration, which loads with
/// [`ForecastConfig::from_toml_file`].
///
/// # Errors
///
/// Returns [`ForecastError::Io`] or [`ForecastError::Csv`] if a file cannot be
/// written.
pub fn write_demo(dir: &Path, cfg: &ForecastConfig) -> Result<PathBuf> {
    let service = demo_service(cfg);
    // always write the default relative layout, whatever paths `cfg` names
    let defaults = ForecastConfig::default();
    let written = ForecastConfig {
        wind: defaults.wind,
        solar: defaults.solar,
        ..cfg.clone()
    };

    for energy in EnergyType::ALL {
        let source = match energy {
            EnergyType::Wind => &written.wind,
            EnergyType::Solar => &written.solar,
        };
        let panel = service.panel(energy);
        write_series(&dir.join(&source.data_path), &panel.store)?;
        write_model(&dir.join(&source.model_path), &panel.model)?;
    }

    let config_path = dir.join("forecast.toml");
    let toml = written.to_toml_string()?;
    write_file(&config_path, toml.as_bytes())?;
    info!(dir = %dir.display(), "demo files written");
    Ok(config_path)
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ForecastError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    create_parent(path)?;
    fs::write(path, contents).map_err(|source| ForecastError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_series(path: &Path, store: &SeriesStore) -> Result<()> {
    create_parent(path)?;
    let csv_err = |source| ForecastError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    wtr.write_record(CSV_HEADER).map_err(csv_err)?;
    for (at, value) in store.points() {
        let production = if value.is_nan() {
            String::new()
        } else {
            value.to_string()
        };
        wtr.write_record([
            at.format("%Y-%m-%d %H:%M:%S").to_string(),
            at.year().to_string(),
            at.month().to_string(),
            at.day().to_string(),
            at.hour().to_string(),
            production,
        ])
        .map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| ForecastError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_model(path: &Path, model: &PretrainedModel) -> Result<()> {
    let json = model.to_json_string().map_err(|e| ForecastError::ModelLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    write_file(path, json.as_bytes())
}
