use anyhow::{Context, Result};
use periodize::prelude::*;
use polars::prelude::{DataType, TimeUnit, df};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();

    let record = sample_record().context("Failed to build sample record")?;

    let report = record.sampling_report()?;
    info!(
        samples_per_day = report.samples_per_day(),
        total_days = record.total_days()?,
        regular = report.is_regular(),
        "Sampling cadence"
    );

    for part in hourly(&record)? {
        info!(key = %part.key(), rows = part.height(), "Hourly partition");
    }

    let config = ResampleConfig::performance_record().with_empty_buckets(EmptyBucketPolicy::Drop);
    let frequency: Frequency = "15m".parse()?;
    let resampled = record.resample(frequency, &config)?;
    info!(frequency = %frequency.humanize(), rows = resampled.height(), "Resampled");
    println!("{}", resampled.as_df());

    Ok(())
}

// ================================================================================================
// Tracing Configuration
// ================================================================================================

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::NONE)
        .with_thread_names(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}

// ================================================================================================
// Helper Functions
// ================================================================================================

/// Three hours of one-minute samples with a skipped minute near the end.
fn sample_record() -> Result<PerformanceRecord> {
    const MINUTE_US: i64 = 60_000_000;
    let start_us = 1_735_689_600_000_000; // 2025-01-01T00:00:00Z

    let timestamps = (0..180)
        .filter(|i| *i != 170)
        .map(|i| start_us + i * MINUTE_US)
        .collect::<Vec<i64>>();
    let n = timestamps.len();

    let mut df = df![
        "timestamp" => timestamps,
        "price" => (0..n).map(|i| 100.0 + (i as f64 * 0.1).sin()).collect::<Vec<_>>(),
        "position" => (0..n).map(|i| (i / 30) as f64).collect::<Vec<_>>(),
        "balance" => (0..n).map(|i| 10_000.0 - i as f64).collect::<Vec<_>>(),
        "fee" => (0..n).map(|i| i as f64 * 0.02).collect::<Vec<_>>(),
        "num_trades_" => (0..n).map(|i| (i % 4 == 0) as i64).collect::<Vec<_>>(),
        "trading_volume_" => vec![0.5; n],
        "trading_value_" => (0..n).map(|i| 50.0 + i as f64).collect::<Vec<_>>(),
    ]?;

    let key = df
        .column("timestamp")?
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
    df.with_column(key)?;

    Ok(PerformanceRecord::new(df)?)
}
