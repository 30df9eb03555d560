use chrono::{DateTime, Utc};
use polars::{
    frame::DataFrame,
    prelude::{DataType, PlSmallStr, TimeUnit},
};

use crate::{
    calendar::Granularity,
    config::ResampleConfig,
    error::{DataError, PeriodizeResult},
    frequency::Frequency,
    interval::{self, SamplingReport},
    partition::{self, Partition},
    polars_ext::polars_to_periodize_error,
    resample,
};

/// Default name of the key column of a performance record.
pub const TIMESTAMP_COL: &str = "timestamp";

/// A time-ordered table of equity and trading metrics.
///
/// Wraps a [`DataFrame`] whose key column holds non-null, ascending
/// datetimes. Every other column is treated as a metric. The record is
/// read-only; all operations build new frames.
#[derive(Debug, Clone)]
pub struct PerformanceRecord {
    df: DataFrame,
    timestamps: TimestampColumn,
}

impl PerformanceRecord {
    /// Validates `df` using the default `timestamp` key column.
    pub fn new(df: DataFrame) -> PeriodizeResult<Self> {
        Self::with_timestamp_col(df, TIMESTAMP_COL)
    }

    pub fn with_timestamp_col(df: DataFrame, name: &str) -> PeriodizeResult<Self> {
        let timestamps = TimestampColumn::from_frame(&df, name)?;
        timestamps.ensure_sorted()?;
        Ok(Self { df, timestamps })
    }

    pub fn as_df(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_df(self) -> DataFrame {
        self.df
    }

    pub fn timestamps(&self) -> &TimestampColumn {
        &self.timestamps
    }

    pub fn timestamp_col(&self) -> &str {
        self.timestamps.name()
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn sampling_report(&self) -> PeriodizeResult<SamplingReport> {
        interval::samples_per_day(&self.timestamps.to_datetimes()?)
    }

    pub fn total_days(&self) -> PeriodizeResult<f64> {
        interval::total_days(&self.timestamps.to_datetimes()?)
    }

    pub fn partition_by(&self, granularity: Granularity) -> PeriodizeResult<Vec<Partition>> {
        partition::partition_by(self, granularity)
    }

    pub fn resample(&self, frequency: Frequency, config: &ResampleConfig) -> PeriodizeResult<Self> {
        resample::resample(self, frequency, config)
    }
}

impl TryFrom<DataFrame> for PerformanceRecord {
    type Error = crate::error::PeriodizeError;

    fn try_from(df: DataFrame) -> PeriodizeResult<Self> {
        Self::new(df)
    }
}

/// The physical values of a record's datetime key column.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampColumn {
    name: PlSmallStr,
    unit: TimeUnit,
    time_zone: Option<String>,
    values: Vec<i64>,
}

impl TimestampColumn {
    pub(crate) fn from_frame(df: &DataFrame, name: &str) -> PeriodizeResult<Self> {
        let column = df
            .column(name)
            .map_err(|_| DataError::MissingKeyColumn(name.to_string()))?;

        let (unit, time_zone) = match column.dtype() {
            DataType::Datetime(unit, tz) => (*unit, tz.as_ref().map(|tz| tz.as_str().to_string())),
            other => {
                return Err(DataError::InvalidKeyColumn {
                    column: name.to_string(),
                    dtype: other.to_string(),
                }
                .into());
            }
        };

        let values = column
            .datetime()
            .map_err(|e| polars_to_periodize_error("Failed to read key column", e))?
            .physical()
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                v.ok_or_else(|| DataError::NullTimestamp {
                    column: name.to_string(),
                    row,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.into(),
            unit,
            time_zone,
            values,
        })
    }

    fn ensure_sorted(&self) -> PeriodizeResult<()> {
        match self.values.windows(2).position(|w| w[1] < w[0]) {
            Some(prev) => Err(DataError::UnsortedTimestamps {
                column: self.name.to_string(),
                prev,
                row: prev + 1,
            }
            .into()),
            None => Ok(()),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn time_zone(&self) -> Option<&str> {
        self.time_zone.as_deref()
    }

    /// Raw values in [`Self::unit`] since the Unix epoch.
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_datetimes(&self) -> PeriodizeResult<Vec<DateTime<Utc>>> {
        self.values
            .iter()
            .map(|&v| {
                to_datetime(self.unit, v).ok_or_else(|| {
                    DataError::TimestampConversion(format!(
                        "{v} ({:?}) is out of range for column '{}'",
                        self.unit, self.name
                    ))
                    .into()
                })
            })
            .collect()
    }

    /// Nanoseconds in one physical unit of the column.
    pub(crate) fn nanos_per_unit(&self) -> i64 {
        match self.unit {
            TimeUnit::Nanoseconds => 1,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Milliseconds => 1_000_000,
        }
    }
}

fn to_datetime(unit: TimeUnit, v: i64) -> Option<DateTime<Utc>> {
    match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(v)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(v),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(v),
    }
}
