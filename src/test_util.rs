use chrono::{DateTime, TimeDelta, Utc};
use polars::prelude::{DataFrame, DataType, TimeUnit, TimeZone};

use crate::record::PerformanceRecord;

pub(crate) fn utc_micros() -> DataType {
    DataType::Datetime(TimeUnit::Microseconds, Some(TimeZone::UTC))
}

pub(crate) fn zoned_micros(tz: &chrono_tz::Tz) -> DataType {
    DataType::Datetime(TimeUnit::Microseconds, Some(TimeZone::from_chrono(tz)))
}

pub(crate) fn spaced(start: DateTime<Utc>, step: TimeDelta, n: usize) -> Vec<DateTime<Utc>> {
    (0..n)
        .map(|i| start + step * i32::try_from(i).expect("Fixture too large"))
        .collect()
}

pub(crate) fn micros(ts: &[DateTime<Utc>]) -> Vec<i64> {
    ts.iter().map(|t| t.timestamp_micros()).collect()
}

/// Casts an integer `timestamp` column to `dtype`, reading values in its unit.
pub(crate) fn with_datetime_key(mut df: DataFrame, dtype: &DataType) -> DataFrame {
    let key = df
        .column("timestamp")
        .expect("Fixture needs a timestamp column")
        .cast(dtype)
        .expect("Failed to cast fixture timestamps");
    df.with_column(key).expect("Failed to replace fixture key");
    df
}

pub(crate) fn record(df: DataFrame) -> PerformanceRecord {
    PerformanceRecord::new(with_datetime_key(df, &utc_micros())).expect("Invalid fixture record")
}
