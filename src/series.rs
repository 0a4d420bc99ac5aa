//! Hourly production history loaded from a delimited file.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, TimeDelta};
use tracing::{debug, info};

use crate::error::{ForecastError, Result};

/// Immutable sequence of hourly samples starting at a fixed timestamp.
///
/// `samples[i]` is the production (MW) at `start + i` hours. Empty source
/// cells are stored as `f64::NAN`; the mapping to time is purely positional.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStore {
    start: NaiveDateTime,
    samples: Vec<f64>,
}

impl SeriesStore {
    /// Wraps an in-memory sample vector.
    pub fn from_samples(start: NaiveDateTime, samples: Vec<f64>) -> Self {
        Self { start, samples }
    }

    /// Loads `column` (zero-based) from the CSV file at `path`, skipping the header row.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Io`] if the file cannot be opened,
    /// [`ForecastError::Parse`] for a non-empty cell that is not a number, and
    /// [`ForecastError::MissingColumn`] for a row shorter than `column + 1`.
    pub fn load(path: &Path, column: usize, start: NaiveDateTime) -> Result<Self> {
        let file = File::open(path).map_err(|source| ForecastError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::read(BufReader::new(file), path, column, start)?;
        info!(
            path = %path.display(),
            column,
            samples = store.len(),
            missing = store.missing_count(),
            "loaded production series"
        );
        Ok(store)
    }

    /// Same as [`SeriesStore::load`] for an arbitrary reader.
    ///
    /// # Errors
    ///
    /// See [`SeriesStore::load`].
    pub fn from_reader(reader: impl Read, column: usize, start: NaiveDateTime) -> Result<Self> {
        Self::read(reader, Path::new("<reader>"), column, start)
    }

    fn read(reader: impl Read, path: &Path, column: usize, start: NaiveDateTime) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut samples = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let row = i + 1;
            let record = record.map_err(|source| ForecastError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            let cell = record.get(column).ok_or_else(|| ForecastError::MissingColumn {
                path: path.to_path_buf(),
                row,
                column,
            })?;
            samples.push(parse_cell(cell, path, row)?);
        }

        debug!(path = %path.display(), rows = samples.len(), "parsed csv column");
        Ok(Self { start, samples })
    }

    /// Timestamp of the first sample.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// All samples in time order.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of missing (NaN) samples.
    pub fn missing_count(&self) -> usize {
        self.samples.iter().filter(|v| v.is_nan()).count()
    }

    /// Timestamp of sample `index`.
    pub fn timestamp_at(&self, index: usize) -> NaiveDateTime {
        self.start + TimeDelta::hours(index as i64)
    }

    /// The `size` samples immediately preceding `target`.
    ///
    /// Returns `None` unless `size <= target <= len`, i.e. unless every sample
    /// of `[target - size, target)` exists.
    pub fn window(&self, target: usize, size: usize) -> Option<&[f64]> {
        if target < size || target > self.samples.len() {
            return None;
        }
        Some(&self.samples[target - size..target])
    }

    /// Iterates `(timestamp, value)` pairs in order.
    pub fn points(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, &v)| (self.timestamp_at(i), v))
    }
}

fn parse_cell(cell: &str, path: &Path, row: usize) -> Result<f64> {
    let text = cell.trim();
    if text.is_empty() {
        return Ok(f64::NAN);
    }
    text.parse::<f64>().map_err(|_| ForecastError::Parse {
        path: PathBuf::from(path),
        row,
        value: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 4, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid start")
    }

    const CSV: &str = "\
region,date,hour,source,unit,production
north,2020-04-01,0,wind,MW,10.5
north,2020-04-01,1,wind,MW,
north,2020-04-01,2,wind,MW, 12.25
";

    #[test]
    fn loads_column_and_maps_empty_to_nan() {
        let store = SeriesStore::from_reader(CSV.as_bytes(), 5, start()).expect("loads");
        assert_eq!(store.len(), 3);
        assert_eq!(store.samples()[0], 10.5);
        assert!(store.samples()[1].is_nan());
        assert_eq!(store.samples()[2], 12.25);
        assert_eq!(store.missing_count(), 1);
    }

    #[test]
    fn non_numeric_cell_is_parse_error() {
        let csv = "a,b\n1,2\n3,oops\n";
        let err = SeriesStore::from_reader(csv.as_bytes(), 1, start()).expect_err("must fail");
        match err {
            ForecastError::Parse { row, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(value, "oops");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_row_is_missing_column() {
        let csv = "a,b,c\n1,2,3\n4,5\n";
        let err = SeriesStore::from_reader(csv.as_bytes(), 2, start()).expect_err("must fail");
        assert!(matches!(
            err,
            ForecastError::MissingColumn { row: 2, column: 2, .. }
        ));
    }

    #[test]
    fn header_only_file_is_empty() {
        let store = SeriesStore::from_reader("a,b\n".as_bytes(), 1, start()).expect("loads");
        assert!(store.is_empty());
    }

    #[test]
    fn timestamps_are_hourly_from_start() {
        let store = SeriesStore::from_samples(start(), vec![0.0; 30]);
        assert_eq!(store.timestamp_at(0), start());
        assert_eq!(store.timestamp_at(25).to_string(), "2020-04-02 01:00:00");
    }

    #[test]
    fn window_requires_full_history() {
        let store = SeriesStore::from_samples(start(), (0..25).map(f64::from).collect());
        assert_eq!(store.window(20, 20).map(<[f64]>::len), Some(20));
        assert_eq!(store.window(20, 20).map(|w| w[0]), Some(0.0));
        assert_eq!(store.window(25, 20).map(|w| w[19]), Some(24.0));
        assert!(store.window(19, 20).is_none());
        assert!(store.window(26, 20).is_none());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SeriesStore::load(Path::new("/nonexistent/wind.csv"), 5, start())
            .expect_err("must fail");
        assert!(matches!(err, ForecastError::Io { .. }));
    }
}
