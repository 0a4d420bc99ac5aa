//! Color constants and auto-scaling helpers for the TUI.

use chrono::NaiveDateTime;
use ratatui::style::Color;

use crate::forecast::{EnergyType, ForecastPoint};
use crate::index;

/// Actual production line color.
pub const ACTUAL_COLOR: Color = Color::Blue;
/// Wind forecast line color.
pub const WIND_FORECAST: Color = Color::Red;
/// Solar forecast line color.
pub const SOLAR_FORECAST: Color = Color::Rgb(255, 165, 0);
/// Successful prediction text.
pub const SUCCESS_FG: Color = Color::Green;
/// Outcome or error text that replaced a prediction.
pub const ERROR_FG: Color = Color::Red;
/// Missing-sample note.
pub const NOTE_FG: Color = Color::Yellow;
/// Header bar foreground.
pub const HEADER_FG: Color = Color::White;
/// Header bar background.
pub const HEADER_BG: Color = Color::DarkGray;
/// Footer help text color.
pub const FOOTER_FG: Color = Color::DarkGray;

/// Forecast line color of `energy`.
pub fn forecast_color(energy: EnergyType) -> Color {
    match energy {
        EnergyType::Wind => WIND_FORECAST,
        EnergyType::Solar => SOLAR_FORECAST,
    }
}

/// Computes Y-axis bounds from chart data points with 10% padding.
///
/// NaN points are ignored.
pub fn auto_bounds_y(actual: &[(f64, f64)], forecast: &[(f64, f64)]) -> [f64; 2] {
    let all = actual
        .iter()
        .chain(forecast.iter())
        .map(|&(_, y)| y)
        .filter(|y| !y.is_nan());
    let min = all.clone().fold(f64::INFINITY, f64::min);
    let max = all.fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return [-1.0, 1.0];
    }
    let range = (max - min).max(0.1);
    let pad = range * 0.1;
    [min - pad, max + pad]
}

/// Computes X-axis bounds (hours since `origin`) spanning both views.
///
/// Bounds follow the timestamps, so missing samples do not shrink the axis.
pub fn bounds_x(
    actual: &[ForecastPoint],
    forecast: &[ForecastPoint],
    origin: NaiveDateTime,
) -> [f64; 2] {
    let hours = |p: &ForecastPoint| index::to_index(origin, p.timestamp) as f64;
    let lo = actual
        .first()
        .into_iter()
        .chain(forecast.first())
        .map(hours)
        .fold(f64::INFINITY, f64::min);
    let hi = actual
        .last()
        .into_iter()
        .chain(forecast.last())
        .map(hours)
        .fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    [lo, hi.max(lo + 1.0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_pad_and_skip_nan() {
        let bounds = auto_bounds_y(&[(0.0, 0.0), (1.0, f64::NAN)], &[(1.0, 10.0)]);
        assert_eq!(bounds, [-1.0, 11.0]);
    }

    #[test]
    fn empty_data_has_unit_bounds() {
        assert_eq!(auto_bounds_y(&[], &[]), [-1.0, 1.0]);
    }

    fn point(origin: NaiveDateTime, hours: i64, value_mw: f64) -> ForecastPoint {
        ForecastPoint {
            timestamp: origin + chrono::TimeDelta::hours(hours),
            value_mw,
        }
    }

    #[test]
    fn x_bounds_follow_timestamps_of_missing_samples() {
        let origin = crate::config::ForecastSettings::default().start_datetime;
        let actual: Vec<_> = (10..20).map(|h| point(origin, h, f64::NAN)).collect();
        let forecast = vec![point(origin, 15, 3.0), point(origin, 21, 4.0)];
        assert_eq!(bounds_x(&actual, &forecast, origin), [10.0, 21.0]);
        assert_eq!(bounds_x(&[], &forecast[..1], origin), [15.0, 16.0]);
        assert_eq!(bounds_x(&[], &[], origin), [0.0, 1.0]);
    }
}
