use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::{ConfigError, PeriodizeResult};

/// Calendar resolution of a partition.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Hour,
    Day,
    Month,
}

/// A calendar period (hour, day or month) a timestamp falls into.
///
/// Fields finer than the granularity are normalized (`day = 1`, `hour = 0`),
/// so buckets of the same granularity order chronologically by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalendarBucket {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    granularity: Granularity,
}

impl CalendarBucket {
    pub fn of<T: TimeZone>(ts: &DateTime<T>, granularity: Granularity) -> Self {
        Self::from_fields(ts.year(), ts.month(), ts.day(), ts.hour(), granularity)
    }

    /// Builds a bucket from wall-clock fields, normalizing those finer than
    /// `granularity`.
    pub(crate) fn from_fields(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        granularity: Granularity,
    ) -> Self {
        let (day, hour) = match granularity {
            Granularity::Month => (1, 0),
            Granularity::Day => (day, 0),
            Granularity::Hour => (day, hour),
        };
        Self {
            year,
            month,
            day,
            hour,
            granularity,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Fixed-width label: `YYYYMM`, `YYYYMMDD` or `YYYYMMDD:HH`.
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Wall-clock start of the bucket, in the zone the bucket was derived in.
    pub fn start(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(self.hour, 0, 0)
    }

    /// Start of the bucket as an instant in `tz`. A start skipped by a DST
    /// gap has no instant; an ambiguous one resolves to the earlier offset.
    pub fn start_in(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        tz.from_local_datetime(&self.start()?).earliest()
    }
}

impl fmt::Display for CalendarBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.granularity {
            Granularity::Month => write!(f, "{:04}{:02}", self.year, self.month),
            Granularity::Day => write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day),
            Granularity::Hour => write!(
                f,
                "{:04}{:02}{:02}:{:02}",
                self.year, self.month, self.day, self.hour
            ),
        }
    }
}

/// Resolves a column time zone; naive columns are read as UTC wall clock.
pub(crate) fn resolve_time_zone(name: Option<&str>) -> PeriodizeResult<Tz> {
    match name {
        None => Ok(Tz::UTC),
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimeZone(name.to_string()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    fn hour_of(y: i32, m: u32, d: u32, h: u32) -> CalendarBucket {
        let ts = Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();
        CalendarBucket::of(&ts, Granularity::Hour)
    }

    #[test]
    fn test_labels() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 7, 9, 41, 12).unwrap();

        assert_eq!(CalendarBucket::of(&ts, Granularity::Month).label(), "202503");
        assert_eq!(CalendarBucket::of(&ts, Granularity::Day).label(), "20250307");
        assert_eq!(CalendarBucket::of(&ts, Granularity::Hour).label(), "20250307:09");
    }

    #[test]
    fn test_ordering_is_chronological() {
        let a = hour_of(2024, 12, 31, 23);
        let b = hour_of(2025, 1, 1, 0);
        let c = hour_of(2025, 1, 1, 10);

        assert!(a < b && b < c);
        assert!(a.label() < b.label() && b.label() < c.label());
    }

    #[test]
    fn test_month_normalizes_finer_fields() {
        let early = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 2, 28, 23, 59, 59).unwrap();

        let a = CalendarBucket::of(&early, Granularity::Month);
        let b = CalendarBucket::of(&late, Granularity::Month);
        assert_eq!(a, b);
        assert_eq!(
            a.start(),
            NaiveDate::from_ymd_opt(2025, 2, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
    }

    #[test]
    fn test_bucket_uses_column_zone() {
        let tz = resolve_time_zone(Some("America/New_York")).expect("Known zone");
        let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 0, 0).unwrap();

        // 03:00 UTC is still the previous evening in New York.
        let local = CalendarBucket::of(&ts.with_timezone(&tz), Granularity::Day);
        assert_eq!(local.label(), "20250101");
        assert_eq!(CalendarBucket::of(&ts, Granularity::Day).label(), "20250102");

        let start = local.start_in(&tz).expect("Midnight exists in New York");
        let expected = Utc.with_ymd_and_hms(2025, 1, 1, 5, 0, 0).unwrap();
        assert_eq!(start.with_timezone(&Utc), expected);
    }

    #[test]
    fn test_from_fields_normalizes() {
        let day = CalendarBucket::from_fields(2025, 4, 9, 17, Granularity::Day);
        assert_eq!((day.day(), day.hour()), (9, 0));
        let month = CalendarBucket::from_fields(2025, 4, 9, 17, Granularity::Month);
        assert_eq!(month.label(), "202504");
    }

    #[test]
    fn test_unknown_zone() {
        assert!(resolve_time_zone(Some("Mars/Olympus")).is_err());
        assert_eq!(resolve_time_zone(None).expect("Defaults to UTC"), Tz::UTC);
    }

    #[test]
    fn test_granularity_parses() {
        assert_eq!(Granularity::from_str("month").unwrap(), Granularity::Month);
        assert_eq!(Granularity::Hour.to_string(), "hour");
        assert!(Granularity::from_str("fortnight").is_err());
    }
}
