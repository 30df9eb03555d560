use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use periodize::prelude::*;
use polars::prelude::*;

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

pub fn spaced(start: DateTime<Utc>, step: TimeDelta, n: usize) -> Vec<DateTime<Utc>> {
    (0..n)
        .map(|i| start + step * i32::try_from(i).expect("Fixture too large"))
        .collect()
}

/// A record shaped like a backtest performance dump: level columns
/// (`price`, `position`, `balance`, `fee`) plus the three flow columns.
pub fn performance_record(ts: &[DateTime<Utc>]) -> PerformanceRecord {
    let n = ts.len();
    let df = df![
        "timestamp" => ts.iter().map(|t| t.timestamp_micros()).collect::<Vec<_>>(),
        "price" => (0..n).map(|i| 100.0 + i as f64).collect::<Vec<_>>(),
        "position" => (0..n).map(|i| (i % 3) as f64).collect::<Vec<_>>(),
        "balance" => (0..n).map(|i| 1_000.0 - i as f64).collect::<Vec<_>>(),
        "fee" => (0..n).map(|i| i as f64 * 0.01).collect::<Vec<_>>(),
        "num_trades_" => (0..n).map(|i| (i % 2) as i64).collect::<Vec<_>>(),
        "trading_volume_" => vec![1.0; n],
        "trading_value_" => (0..n).map(|i| 100.0 + i as f64).collect::<Vec<_>>(),
    ]
    .expect("Failed to create mock DF");

    PerformanceRecord::new(with_utc_key(df)).expect("Invalid fixture record")
}

pub fn with_utc_key(mut df: DataFrame) -> DataFrame {
    let key = df
        .column("timestamp")
        .expect("Fixture needs a timestamp column")
        .cast(&DataType::Datetime(TimeUnit::Microseconds, Some(polars::prelude::TimeZone::UTC)))
        .expect("Failed to cast fixture timestamps");
    df.with_column(key).expect("Failed to replace fixture key");
    df
}

pub fn f64_col(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .expect("Missing column")
        .f64()
        .expect("Column is not f64")
        .into_iter()
        .map(|v| v.expect("Unexpected null"))
        .collect()
}
