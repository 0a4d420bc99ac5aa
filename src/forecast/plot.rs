use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

use super::types::{EnergyType, ForecastPoint};
use crate::series::SeriesStore;

/// Actual and forecast production of one energy type, ready for charting.
#[derive(Debug, Clone, Serialize)]
pub struct PlotData {
    pub energy: EnergyType,
    /// Every loaded sample, missing ones as NaN.
    pub actual: Vec<ForecastPoint>,
    /// One point per sliding window, aligned with the sample it forecasts.
    pub forecast: Vec<ForecastPoint>,
    pub summary: FitSummary,
}

/// Error of the forecast against the actual samples it overlaps.
///
/// Pairs where either value is missing are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitSummary {
    /// Number of compared pairs.
    pub compared: usize,
    /// Mean absolute error (MW); `None` when nothing was compared.
    pub mae_mw: Option<f64>,
    /// Root-mean-square error (MW); `None` when nothing was compared.
    pub rmse_mw: Option<f64>,
}

impl FitSummary {
    fn from_pairs(pairs: impl Iterator<Item = (f64, f64)>) -> Self {
        let mut compared = 0_usize;
        let mut abs_sum = 0.0_f64;
        let mut sq_sum = 0.0_f64;
        for (actual, predicted) in pairs {
            if actual.is_nan() || predicted.is_nan() {
                continue;
            }
            let err = predicted - actual;
            abs_sum += err.abs();
            sq_sum += err * err;
            compared += 1;
        }
        if compared == 0 {
            return Self {
                compared,
                mae_mw: None,
                rmse_mw: None,
            };
        }
        let n = compared as f64;
        Self {
            compared,
            mae_mw: Some(abs_sum / n),
            rmse_mw: Some((sq_sum / n).sqrt()),
        }
    }
}

impl PlotData {
    /// Pairs `store` with its full-series `forecast`.
    pub fn build(energy: EnergyType, store: &SeriesStore, forecast: Vec<ForecastPoint>) -> Self {
        let actual: Vec<ForecastPoint> = store
            .points()
            .map(|(timestamp, value_mw)| ForecastPoint {
                timestamp,
                value_mw,
            })
            .collect();

        let offset = store.len().saturating_sub(forecast.len());
        let summary = FitSummary::from_pairs(
            forecast
                .iter()
                .zip(actual.iter().skip(offset))
                .map(|(f, a)| (a.value_mw, f.value_mw)),
        );

        Self {
            energy,
            actual,
            forecast,
            summary,
        }
    }

    /// Points within `range`, counted backwards from the last actual sample.
    pub fn visible(&self, range: PlotRange) -> PlotView<'_> {
        let Some(span) = range.span() else {
            return PlotView {
                actual: &self.actual,
                forecast: &self.forecast,
            };
        };
        let Some(last) = self.actual.last() else {
            return PlotView {
                actual: &[],
                forecast: &[],
            };
        };
        let cutoff = last.timestamp - span;
        PlotView {
            actual: since(&self.actual, cutoff),
            forecast: since(&self.forecast, cutoff),
        }
    }
}

fn since(points: &[ForecastPoint], cutoff: NaiveDateTime) -> &[ForecastPoint] {
    let first = points.partition_point(|p| p.timestamp < cutoff);
    &points[first..]
}

/// Borrowed slice of a [`PlotData`].
#[derive(Debug, Clone, Copy)]
pub struct PlotView<'a> {
    pub actual: &'a [ForecastPoint],
    pub forecast: &'a [ForecastPoint],
}

/// Backward-looking time range of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotRange {
    /// Last day.
    Day,
    /// Last week.
    Week,
    /// Whole series.
    #[default]
    All,
}

impl PlotRange {
    fn span(self) -> Option<TimeDelta> {
        match self {
            Self::Day => Some(TimeDelta::days(1)),
            Self::Week => Some(TimeDelta::days(7)),
            Self::All => None,
        }
    }

    /// Next range in the 1d → 1w → all cycle.
    pub fn cycle(self) -> Self {
        match self {
            Self::Day => Self::Week,
            Self::Week => Self::All,
            Self::All => Self::Day,
        }
    }
}

impl fmt::Display for PlotRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "1d"),
            Self::Week => write!(f, "1w"),
            Self::All => write!(f, "all"),
        }
    }
}

impl FromStr for PlotRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1d" | "day" => Ok(Self::Day),
            "1w" | "week" => Ok(Self::Week),
            "all" => Ok(Self::All),
            _ => Err(format!("unknown range \"{s}\" (expected 1d, 1w or all)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 4, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid start")
    }

    fn point(hour: i64, value_mw: f64) -> ForecastPoint {
        ForecastPoint {
            timestamp: start() + TimeDelta::hours(hour),
            value_mw,
        }
    }

    #[test]
    fn summary_compares_aligned_samples() {
        let store = SeriesStore::from_samples(start(), vec![0.0, 1.0, 2.0, 4.0]);
        // forecasts for samples 2 and 3
        let forecast = vec![point(2, 3.0), point(3, 4.0)];
        let plot = PlotData::build(EnergyType::Wind, &store, forecast);
        assert_eq!(plot.actual.len(), 4);
        assert_eq!(plot.summary.compared, 2);
        assert_eq!(plot.summary.mae_mw, Some(0.5));
        assert_eq!(plot.summary.rmse_mw, Some((0.5_f64).sqrt()));
    }

    #[test]
    fn summary_skips_missing_samples() {
        let store = SeriesStore::from_samples(start(), vec![0.0, f64::NAN, 2.0]);
        let forecast = vec![point(1, 1.0), point(2, f64::NAN)];
        let plot = PlotData::build(EnergyType::Solar, &store, forecast);
        assert_eq!(plot.summary.compared, 0);
        assert_eq!(plot.summary.mae_mw, None);
    }

    #[test]
    fn visible_range_counts_back_from_last_sample() {
        let store = SeriesStore::from_samples(start(), vec![1.0; 24 * 10]);
        let forecast = (20..240).map(|h| point(h, 1.0)).collect();
        let plot = PlotData::build(EnergyType::Wind, &store, forecast);

        let day = plot.visible(PlotRange::Day);
        assert_eq!(day.actual.len(), 25);
        assert_eq!(day.forecast.len(), 25);

        let week = plot.visible(PlotRange::Week);
        assert_eq!(week.actual.len(), 24 * 7 + 1);

        let all = plot.visible(PlotRange::All);
        assert_eq!(all.actual.len(), 240);
        assert_eq!(all.forecast.len(), 220);
    }

    #[test]
    fn range_cycles_and_parses() {
        assert_eq!(PlotRange::Day.cycle(), PlotRange::Week);
        assert_eq!(PlotRange::All.cycle(), PlotRange::Day);
        assert_eq!("1w".parse::<PlotRange>(), Ok(PlotRange::Week));
        assert_eq!(PlotRange::default().to_string(), "all");
    }
}
