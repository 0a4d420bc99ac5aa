//! Mapping between wall-clock datetimes and hourly sample offsets.

use chrono::{NaiveDateTime, TimeDelta};

const SECONDS_PER_HOUR: i64 = 3600;

/// Converts `requested` into an offset from `start` in whole hours.
///
/// Uses floor division on the elapsed seconds: minutes and seconds are
/// truncated (a request at 01:30 maps to the same index as 01:00), and a
/// request before `start` yields a negative index. No bound checking is done
/// here.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use renewable_forecast::index::to_index;
///
/// let start = NaiveDate::from_ymd_opt(2020, 4, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let t = NaiveDate::from_ymd_opt(2020, 4, 2).unwrap().and_hms_opt(1, 29, 0).unwrap();
/// assert_eq!(to_index(start, t), 25);
/// ```
pub fn to_index(start: NaiveDateTime, requested: NaiveDateTime) -> i64 {
    let delta = requested - start;
    let mut seconds = delta.num_seconds();
    // num_seconds truncates toward zero; round negative fractions down.
    if delta < TimeDelta::seconds(seconds) {
        seconds -= 1;
    }
    seconds.div_euclid(SECONDS_PER_HOUR)
}

/// Timestamp of the sample at `index`.
pub fn timestamp_for(start: NaiveDateTime, index: i64) -> NaiveDateTime {
    start + TimeDelta::hours(index)
}
