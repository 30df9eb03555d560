mod roles;

use polars::prelude::{
    ClosedWindow, DataFrame, DataType, Duration, DynamicGroupOptions, Expr, IntoLazy, Label,
    PlSmallStr, PolarsUpsample, StartBy, col, len, lit,
};

pub use roles::{AggregationRole, ColumnRoles, FLOW_COLUMNS};
use roles::ResolvedColumn;

use crate::{
    config::{EmptyBucketPolicy, ResampleConfig},
    error::{ConfigError, DataError, PeriodizeResult},
    frequency::Frequency,
    polars_ext::polars_to_periodize_error,
    record::{PerformanceRecord, TimestampColumn},
};

/// Most buckets a forward-filled resample may emit.
pub const MAX_FILLED_BUCKETS: i64 = 10_000_000;

/// Row count of a populated bucket; null on inserted buckets.
const ROWS_COL: &str = "__rows";
/// Run of buckets sharing the last populated bucket.
const RUN_COL: &str = "__run";

/// Resamples a record onto fixed-width buckets.
///
/// Buckets are polars dynamic windows over the key column, closed on the
/// left and labelled with their start. Sub-daily widths are anchored at the
/// epoch in the column's wall clock, `d` starts at local midnight and `w` on
/// local Monday, the same calendar the partitioner uses. `Sum` columns hold
/// the bucket total and `Last` columns the value of the bucket's latest row.
/// Buckets come out in ascending order with the input schema unchanged.
/// Empty buckets follow [`ResampleConfig::empty_buckets`].
///
/// Integer sums narrower than 64 bits are computed as `Int64` and must fit
/// the column type again; 64-bit sums follow polars arithmetic.
///
/// # Errors
/// - [`DataError::UnknownColumn`] / [`DataError::InvalidAggregation`] when
///   the role table does not fit the frame or a bucket sum overflows.
/// - [`ConfigError::InvalidFrequency`] when `frequency` is finer than the
///   key column's resolution, or forward filling would exceed
///   [`MAX_FILLED_BUCKETS`].
#[tracing::instrument(
    skip_all,
    fields(frequency = %frequency, rows = record.height(), policy = %config.empty_buckets)
)]
pub fn resample(
    record: &PerformanceRecord,
    frequency: Frequency,
    config: &ResampleConfig,
) -> PeriodizeResult<PerformanceRecord> {
    let df = record.as_df();
    let timestamps = record.timestamps();
    let key = timestamps.name();
    let columns = config.roles.resolve(df, key)?;

    if record.is_empty() {
        return Ok(record.clone());
    }
    ensure_resolution(timestamps, frequency)?;

    let fill = config.empty_buckets == EmptyBucketPolicy::ForwardFill;
    let mut aggs = columns.iter().map(aggregation).collect::<Vec<_>>();
    if fill {
        ensure_fill_bounded(timestamps, frequency)?;
        aggs.push(len().alias(ROWS_COL));
    }

    let mut buckets = df
        .clone()
        .lazy()
        .group_by_dynamic(col(key), Vec::<Expr>::new(), window_options(frequency)?)
        .agg(aggs)
        .collect()
        .map_err(|e| polars_to_periodize_error("Failed to aggregate buckets", e))?;
    tracing::debug!(buckets = buckets.height(), "Aggregated populated buckets");

    if fill {
        buckets = fill_empty_buckets(&buckets, key, frequency, &columns)?;
        tracing::debug!(buckets = buckets.height(), "Inserted empty buckets");
    }

    let mut out = buckets
        .select(df.get_column_names_owned())
        .map_err(|e| polars_to_periodize_error("Failed to restore column order", e))?;
    restore_sum_dtypes(&mut out, &columns)?;

    PerformanceRecord::with_timestamp_col(out, key)
}

/// Rejects widths that are not a whole number of key column units.
fn ensure_resolution(timestamps: &TimestampColumn, frequency: Frequency) -> PeriodizeResult<()> {
    if frequency.as_nanos() % timestamps.nanos_per_unit() == 0 {
        return Ok(());
    }
    Err(ConfigError::InvalidFrequency {
        input: frequency.to_string(),
        msg: format!(
            "finer than the {:?} resolution of column '{}'",
            timestamps.unit(),
            timestamps.name()
        ),
    }
    .into())
}

fn ensure_fill_bounded(timestamps: &TimestampColumn, frequency: Frequency) -> PeriodizeResult<()> {
    let values = timestamps.values();
    let (Some(first), Some(last)) = (values.first(), values.last()) else {
        return Ok(());
    };
    let buckets = last
        .checked_sub(*first)
        .and_then(|span| span.checked_mul(timestamps.nanos_per_unit()))
        .map(|span| span / frequency.as_nanos());

    match buckets {
        Some(n) if n < MAX_FILLED_BUCKETS => Ok(()),
        _ => Err(ConfigError::InvalidFrequency {
            input: frequency.to_string(),
            msg: format!("filling empty buckets would emit more than {MAX_FILLED_BUCKETS} rows"),
        }
        .into()),
    }
}

fn window_options(frequency: Frequency) -> PeriodizeResult<DynamicGroupOptions> {
    let every = frequency.as_duration();
    let offset = Duration::try_parse("0ns")
        .map_err(|e| polars_to_periodize_error("Failed to build window offset", e))?;

    Ok(DynamicGroupOptions {
        every,
        period: every,
        offset,
        label: Label::Left,
        include_boundaries: false,
        closed_window: ClosedWindow::Left,
        start_by: StartBy::WindowBound,
        ..Default::default()
    })
}

fn aggregation(column: &ResolvedColumn) -> Expr {
    let expr = col(column.name.clone());
    match column.role {
        AggregationRole::Last => expr.last(),
        AggregationRole::Sum if is_narrow_integer(&column.dtype) => {
            expr.cast(DataType::Int64).sum()
        }
        AggregationRole::Sum => expr.sum(),
    }
}

fn is_narrow_integer(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
    )
}

/// Inserts the buckets between populated ones: `Sum` columns are zero and
/// `Last` columns repeat the last populated bucket, nulls included.
fn fill_empty_buckets(
    buckets: &DataFrame,
    key: &str,
    frequency: Frequency,
    columns: &[ResolvedColumn],
) -> PeriodizeResult<DataFrame> {
    let upsampled = buckets
        .upsample(Vec::<PlSmallStr>::new(), key, frequency.as_duration())
        .map_err(|e| polars_to_periodize_error("Failed to insert empty buckets", e))?;

    let fills = columns
        .iter()
        .map(|column| {
            let expr = col(column.name.clone());
            match column.role {
                AggregationRole::Sum => expr.fill_null(lit(0)),
                AggregationRole::Last => expr.first().over([col(RUN_COL)]),
            }
        })
        .collect::<Vec<_>>();

    upsampled
        .lazy()
        .with_column(
            col(ROWS_COL)
                .is_not_null()
                .cast(DataType::UInt32)
                .cum_sum(false)
                .alias(RUN_COL),
        )
        .with_columns(fills)
        .collect()
        .map_err(|e| polars_to_periodize_error("Failed to fill empty buckets", e))
}

/// Casts widened sums back to their column type, failing on overflow.
fn restore_sum_dtypes(out: &mut DataFrame, columns: &[ResolvedColumn]) -> PeriodizeResult<()> {
    for column in columns.iter().filter(|c| c.role == AggregationRole::Sum) {
        let summed = out
            .column(column.name.as_str())
            .map_err(|e| polars_to_periodize_error("Failed to read sum column", e))?;
        if summed.dtype() == &column.dtype {
            continue;
        }
        let restored =
            summed
                .strict_cast(&column.dtype)
                .map_err(|_| DataError::InvalidAggregation {
                    column: column.name.to_string(),
                    msg: format!("a bucket sum does not fit in {}", column.dtype),
                })?;
        out.with_column(restored)
            .map_err(|e| polars_to_periodize_error("Failed to replace sum column", e))?;
    }
    Ok(())
}
