//! Sampling-interval analysis, calendar partitioning and fixed-frequency
//! resampling for post-backtest performance records.
//!
//! ```
//! use periodize::prelude::*;
//! use polars::prelude::*;
//!
//! # fn main() -> PeriodizeResult<()> {
//! let minute = 60_000_000i64;
//! let mut df = df![
//!     "timestamp" => (0..4).map(|i| i * minute).collect::<Vec<_>>(),
//!     "num_trades_" => &[1i64, 2, 3, 4],
//!     "trading_value_" => &[1.0, 2.0, 3.0, 4.0],
//!     "trading_volume_" => &[1.0, 1.0, 1.0, 1.0],
//!     "balance_" => &[10.0, 20.0, 30.0, 40.0],
//! ]
//! .unwrap();
//! let key = df
//!     .column("timestamp")
//!     .unwrap()
//!     .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
//!     .unwrap();
//! df.with_column(key).unwrap();
//!
//! let record = PerformanceRecord::new(df)?;
//! assert_eq!(record.sampling_report()?.samples_per_day(), 1440.0);
//!
//! let resampled = record.resample("2m".parse()?, &ResampleConfig::performance_record())?;
//! assert_eq!(resampled.height(), 2);
//! # Ok(())
//! # }
//! ```

pub mod calendar;
pub mod config;
pub mod error;
pub mod frequency;
pub mod interval;
pub mod partition;
pub mod prelude;
pub mod record;
pub mod resample;
pub mod view;

mod polars_ext;
#[cfg(test)]
mod test_util;
