//! CSV export for actual-vs-forecast plot data.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::NaiveDateTime;

use crate::forecast::PlotData;
use crate::report::format_datetime;

/// Column header of the plot export.
const HEADER: [&str; 4] = ["timestamp", "energy", "actual_mw", "forecast_mw"];

/// Exports one or more plots to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_plot_csv(plots: &[PlotData], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_plot_csv(plots, buf)
}

/// Writes plots as CSV to any writer.
///
/// One row per timestamp and energy type, ordered by energy then time. A
/// missing actual sample, or a timestamp without a forecast (the first
/// `window_size` hours), leaves its cell empty.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_plot_csv(plots: &[PlotData], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(HEADER)?;

    for plot in plots {
        let mut rows: BTreeMap<NaiveDateTime, (Option<f64>, Option<f64>)> = BTreeMap::new();
        for p in &plot.actual {
            rows.entry(p.timestamp).or_default().0 = Some(p.value_mw);
        }
        for p in &plot.forecast {
            rows.entry(p.timestamp).or_default().1 = Some(p.value_mw);
        }
        for (timestamp, (actual, forecast)) in rows {
            wtr.write_record([
                format_datetime(timestamp),
                plot.energy.as_str().to_string(),
                cell(actual),
                cell(forecast),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{v:.4}"),
        _ => String::new(),
    }
}
