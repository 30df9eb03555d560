use chrono::DateTime;
use chrono_tz::Tz;
use polars::{
    frame::DataFrame,
    prelude::{DataType, Expr, IntoLazy, col},
};

use crate::{
    calendar::{CalendarBucket, Granularity, resolve_time_zone},
    error::{DataError, PeriodizeResult},
    polars_ext::polars_to_periodize_error,
    record::PerformanceRecord,
};

const YEAR_COL: &str = "__year";
const MONTH_COL: &str = "__month";
const DAY_COL: &str = "__day";
const HOUR_COL: &str = "__hour";

/// The rows of a record falling into one calendar bucket.
#[derive(Debug, Clone)]
pub struct Partition {
    key: CalendarBucket,
    record: PerformanceRecord,
}

impl Partition {
    pub fn key(&self) -> CalendarBucket {
        self.key
    }

    pub fn record(&self) -> &PerformanceRecord {
        &self.record
    }

    pub fn as_df(&self) -> &DataFrame {
        self.record.as_df()
    }

    pub fn into_record(self) -> PerformanceRecord {
        self.record
    }

    pub fn height(&self) -> usize {
        self.record.height()
    }

    /// The bucket start as an instant in the key column's zone.
    pub fn start(&self) -> PeriodizeResult<DateTime<Tz>> {
        let tz = resolve_time_zone(self.record.timestamps().time_zone())?;
        self.key.start_in(&tz).ok_or_else(|| {
            DataError::TimestampConversion(format!(
                "bucket {} has no start instant in {tz}",
                self.key
            ))
            .into()
        })
    }
}

/// Splits a record into calendar-aligned partitions.
///
/// Keys are derived in the key column's time zone. Partitions come out in
/// order of first appearance of their key and rows keep their relative
/// order, so concatenating all partitions reproduces the input. An empty
/// record yields no partitions.
#[tracing::instrument(skip_all, fields(granularity = %granularity, rows = record.height()))]
pub fn partition_by(
    record: &PerformanceRecord,
    granularity: Granularity,
) -> PeriodizeResult<Vec<Partition>> {
    if record.is_empty() {
        return Ok(Vec::new());
    }

    let key = record.timestamp_col();
    let fields = calendar_fields(granularity);
    let field_exprs = fields
        .iter()
        .map(|&field| calendar_field_expr(key, field))
        .collect::<Vec<_>>();

    let df_enriched = record
        .as_df()
        .clone()
        .lazy()
        .with_columns(field_exprs)
        .collect()
        .map_err(|e| polars_to_periodize_error("Failed to materialize calendar fields", e))?;

    let frames = df_enriched
        .partition_by_stable(fields.iter().copied(), true)
        .map_err(|e| polars_to_periodize_error("Partitioning failed", e))?;

    tracing::debug!(groups = frames.len(), "Partitioned record");

    frames
        .into_iter()
        .map(|frame| {
            let bucket = bucket_of(&frame, granularity)?;
            let df = frame.drop_many(fields.iter().copied());
            Ok(Partition {
                key: bucket,
                record: PerformanceRecord::with_timestamp_col(df, key)?,
            })
        })
        .collect()
}

/// Calendar fields that identify a bucket of `granularity`.
fn calendar_fields(granularity: Granularity) -> &'static [&'static str] {
    const FIELDS: [&str; 4] = [YEAR_COL, MONTH_COL, DAY_COL, HOUR_COL];
    match granularity {
        Granularity::Month => &FIELDS[..2],
        Granularity::Day => &FIELDS[..3],
        Granularity::Hour => &FIELDS,
    }
}

fn calendar_field_expr(key: &str, field: &str) -> Expr {
    let dt = col(key).dt();
    let expr = match field {
        YEAR_COL => dt.year(),
        MONTH_COL => dt.month(),
        DAY_COL => dt.day(),
        _ => dt.hour(),
    };
    expr.cast(DataType::Int32).alias(field)
}

/// Reads the bucket of a partition from the calendar fields of its first row.
fn bucket_of(frame: &DataFrame, granularity: Granularity) -> PeriodizeResult<CalendarBucket> {
    let field = |name: &str| -> PeriodizeResult<i32> {
        if !calendar_fields(granularity).contains(&name) {
            return Ok(0);
        }
        frame
            .column(name)
            .and_then(|c| c.i32().map(|ca| ca.get(0)))
            .map_err(|e| polars_to_periodize_error("Failed to read calendar field", e))?
            .ok_or_else(|| DataError::DataFrame(format!("calendar field {name} is null")).into())
    };
    let unsigned = |name: &str| -> PeriodizeResult<u32> {
        u32::try_from(field(name)?)
            .map_err(|_| DataError::DataFrame(format!("calendar field {name} is negative")).into())
    };

    Ok(CalendarBucket::from_fields(
        field(YEAR_COL)?,
        unsigned(MONTH_COL)?,
        unsigned(DAY_COL)?,
        unsigned(HOUR_COL)?,
        granularity,
    ))
}

pub fn monthly(record: &PerformanceRecord) -> PeriodizeResult<Vec<Partition>> {
    partition_by(record, Granularity::Month)
}

pub fn daily(record: &PerformanceRecord) -> PeriodizeResult<Vec<Partition>> {
    partition_by(record, Granularity::Day)
}

pub fn hourly(record: &PerformanceRecord) -> PeriodizeResult<Vec<Partition>> {
    partition_by(record, Granularity::Hour)
}
