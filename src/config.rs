//! TOML-based dashboard configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level configuration parsed from TOML.
///
/// All sections have defaults matching the production dashboard. Load from
/// TOML with [`ForecastConfig::from_toml_file`] or use
/// [`ForecastConfig::from_preset`] for a built-in synthetic setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    /// Series epoch, window length, and request ceiling.
    pub forecast: ForecastSettings,
    /// Date/time selection bounds for the interactive surfaces.
    pub presentation: PresentationConfig,
    /// Wind production history and model.
    pub wind: SourceConfig,
    /// Solar production history and model.
    pub solar: SourceConfig,
    /// Generator parameters for the demo presets.
    pub synthetic: SyntheticConfig,
}

/// Forecasting constants shared by both energy types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastSettings {
    /// Number of past hourly samples fed to the model (must be > 0).
    pub window_size: usize,
    /// Timestamp of the first sample in every series.
    pub start_datetime: NaiveDateTime,
    /// Latest datetime a forecast may be requested for (inclusive).
    pub max_valid_datetime: NaiveDateTime,
    /// Windows per model call when forecasting a whole series (must be > 0).
    pub batch_size: usize,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            window_size: 20,
            start_datetime: datetime(2020, 4, 1, 0, 0, 0),
            max_valid_datetime: datetime(2023, 6, 30, 23, 59, 59),
            batch_size: 32,
        }
    }
}

/// Bounds and initial values of the date/time picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PresentationConfig {
    /// Earliest selectable calendar date.
    pub min_date: NaiveDate,
    /// Latest selectable calendar date.
    pub max_date: NaiveDate,
    /// Date preselected when no date is given.
    pub default_date: NaiveDate,
    /// Time of day preselected when no time is given.
    pub default_time: NaiveTime,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            min_date: date(2020, 4, 1),
            max_date: date(2023, 6, 30),
            default_date: date(2021, 4, 20),
            default_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap_or_default(),
        }
    }
}

impl PresentationConfig {
    /// Returns `true` when `day` can be picked.
    pub fn is_selectable(&self, day: NaiveDate) -> bool {
        (self.min_date..=self.max_date).contains(&day)
    }

    /// The datetime preselected on start-up.
    pub fn default_datetime(&self) -> NaiveDateTime {
        self.default_date.and_time(self.default_time)
    }
}

/// Location of one energy type's history and pretrained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// CSV file holding one row per hourly sample, with a header row.
    pub data_path: PathBuf,
    /// Zero-based index of the production column.
    #[serde(default = "default_column")]
    pub column: usize,
    /// JSON model file.
    pub model_path: PathBuf,
}

fn default_column() -> usize {
    5
}

impl SourceConfig {
    fn wind() -> Self {
        Self {
            data_path: PathBuf::from("data/wind_renewables_production_cl.csv"),
            column: default_column(),
            model_path: PathBuf::from("models/rnn_forecast_wind.json"),
        }
    }

    fn solar() -> Self {
        Self {
            data_path: PathBuf::from("data/solar_renewables_production_cl.csv"),
            column: default_column(),
            model_path: PathBuf::from("models/rnn_forecast_solar.json"),
        }
    }
}

/// Parameters of the synthetic history used by the demo presets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntheticConfig {
    /// Random seed.
    pub seed: u64,
    /// Number of hourly samples to generate; `0` spans start to ceiling.
    pub hours: usize,
    /// Installed wind capacity (MW).
    pub wind_capacity_mw: f64,
    /// Installed solar capacity (MW).
    pub solar_capacity_mw: f64,
    /// Probability that a generated cell is left empty (0.0 to < 1.0).
    pub missing_rate: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            hours: 0,
            wind_capacity_mw: 120.0,
            solar_capacity_mw: 80.0,
            missing_rate: 0.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"forecast.window_size"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub(crate) fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            forecast: ForecastSettings::default(),
            presentation: PresentationConfig::default(),
            wind: SourceConfig::wind(),
            solar: SourceConfig::solar(),
            synthetic: SyntheticConfig::default(),
        }
    }
}

impl ForecastConfig {
    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo", "demo_gappy"];

    /// Synthetic history without missing cells.
    pub fn demo() -> Self {
        Self::default()
    }

    /// Synthetic history where roughly 2% of the cells are empty.
    pub fn demo_gappy() -> Self {
        Self {
            synthetic: SyntheticConfig {
                seed: 7,
                missing_rate: 0.02,
                ..SyntheticConfig::default()
            },
            ..Self::default()
        }
    }

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "demo" => Ok(Self::demo()),
            "demo_gappy" => Ok(Self::demo_gappy()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// Relative data and model paths are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        let mut cfg = Self::from_toml_str(&content)?;
        if let Some(dir) = path.parent() {
            cfg.resolve_paths(dir);
        }
        Ok(cfg)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Serializes the configuration back to TOML.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a value cannot be represented in TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    fn resolve_paths(&mut self, base: &Path) {
        for source in [&mut self.wind, &mut self.solar] {
            if source.data_path.is_relative() {
                source.data_path = base.join(&source.data_path);
            }
            if source.model_path.is_relative() {
                source.model_path = base.join(&source.model_path);
            }
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let f = &self.forecast;

        if f.window_size == 0 {
            errors.push(ConfigError::new("forecast.window_size", "must be > 0"));
        }
        if f.batch_size == 0 {
            errors.push(ConfigError::new("forecast.batch_size", "must be > 0"));
        }
        if f.max_valid_datetime < f.start_datetime {
            errors.push(ConfigError::new(
                "forecast.max_valid_datetime",
                "must be >= forecast.start_datetime",
            ));
        }

        let p = &self.presentation;
        if p.min_date > p.max_date {
            errors.push(ConfigError::new(
                "presentation.min_date",
                "must be <= presentation.max_date",
            ));
        } else if !p.is_selectable(p.default_date) {
            errors.push(ConfigError::new(
                "presentation.default_date",
                format!("must lie within {} and {}", p.min_date, p.max_date),
            ));
        }

        let s = &self.synthetic;
        if !(0.0..1.0).contains(&s.missing_rate) {
            errors.push(ConfigError::new(
                "synthetic.missing_rate",
                "must be in [0.0, 1.0)",
            ));
        }
        if s.wind_capacity_mw <= 0.0 {
            errors.push(ConfigError::new("synthetic.wind_capacity_mw", "must be > 0"));
        }
        if s.solar_capacity_mw <= 0.0 {
            errors.push(ConfigError::new("synthetic.solar_capacity_mw", "must be > 0"));
        }

        errors
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    date(y, m, d)
        .and_hms_opt(h, min, s)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_constants() {
        let cfg = ForecastConfig::default();
        assert_eq!(cfg.forecast.window_size, 20);
        assert_eq!(cfg.forecast.batch_size, 32);
        assert_eq!(cfg.forecast.start_datetime.to_string(), "2020-04-01 00:00:00");
        assert_eq!(
            cfg.forecast.max_valid_datetime.to_string(),
            "2023-06-30 23:59:59"
        );
        assert_eq!(cfg.presentation.default_datetime().to_string(), "2021-04-20 13:00:00");
        assert_eq!(cfg.wind.column, 5);
        assert_eq!(cfg.solar.column, 5);
    }

    #[test]
    fn default_config_valid() {
        let errors = ForecastConfig::default().validate();
        assert!(errors.is_empty(), "default should be valid: {errors:?}");
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ForecastConfig::PRESETS {
            let cfg = ForecastConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(errors.is_empty(), "preset \"{name}\" should be valid: {errors:?}");
        }
    }

    #[test]
    fn from_preset_unknown() {
        let err = ForecastConfig::from_preset("nonexistent");
        let e = err.expect_err("unknown preset must fail");
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[forecast]
window_size = 24
start_datetime = "2021-01-01T00:00:00"
max_valid_datetime = "2021-12-31T23:00:00"
batch_size = 8

[presentation]
min_date = "2021-01-01"
max_date = "2021-12-31"
default_date = "2021-06-01"
default_time = "08:30:00"

[wind]
data_path = "wind.csv"
column = 2
model_path = "wind.json"

[solar]
data_path = "solar.csv"
model_path = "solar.json"
"#;
        let cfg = ForecastConfig::from_toml_str(toml).expect("valid TOML should parse");
        assert_eq!(cfg.forecast.window_size, 24);
        assert_eq!(cfg.forecast.batch_size, 8);
        assert_eq!(cfg.wind.column, 2);
        assert_eq!(cfg.solar.column, 5);
        assert_eq!(cfg.presentation.default_time.to_string(), "08:30:00");
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[forecast]
window_size = 10
"#;
        let cfg = ForecastConfig::from_toml_str(toml).expect("partial TOML should parse");
        assert_eq!(cfg.forecast.window_size, 10);
        assert_eq!(cfg.forecast.batch_size, 32);
        assert_eq!(
            cfg.wind.data_path,
            PathBuf::from("data/wind_renewables_production_cl.csv")
        );
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[forecast]
window_size = 20
horizon = 3
"#;
        assert!(ForecastConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_zero_window() {
        let mut cfg = ForecastConfig::default();
        cfg.forecast.window_size = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "forecast.window_size"));
    }

    #[test]
    fn validation_catches_inverted_ceiling() {
        let mut cfg = ForecastConfig::default();
        cfg.forecast.max_valid_datetime = datetime(2019, 1, 1, 0, 0, 0);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "forecast.max_valid_datetime"));
    }

    #[test]
    fn validation_catches_default_date_out_of_bounds() {
        let mut cfg = ForecastConfig::default();
        cfg.presentation.default_date = date(2024, 1, 1);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "presentation.default_date"));
    }

    #[test]
    fn validation_catches_bad_missing_rate() {
        let mut cfg = ForecastConfig::default();
        cfg.synthetic.missing_rate = 1.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "synthetic.missing_rate"));
    }

    #[test]
    fn toml_round_trip_preserves_settings() {
        let cfg = ForecastConfig::demo_gappy();
        let text = cfg.to_toml_string().expect("serializes");
        let back = ForecastConfig::from_toml_str(&text).expect("parses back");
        assert_eq!(back.forecast, cfg.forecast);
        assert_eq!(back.synthetic, cfg.synthetic);
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let mut cfg = ForecastConfig::default();
        cfg.resolve_paths(Path::new("/srv/forecast"));
        assert_eq!(
            cfg.wind.model_path,
            PathBuf::from("/srv/forecast/models/rnn_forecast_wind.json")
        );
    }
}
