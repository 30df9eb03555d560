// 1. Records
pub use crate::record::{PerformanceRecord, TIMESTAMP_COL, TimestampColumn};

// 2. Interval analysis
pub use crate::interval::{
    Diagnostic, DiagnosticSink, SECONDS_PER_DAY, SamplingReport, samples_per_day,
    samples_per_day_with, total_days,
};

// 3. Partitioning
pub use crate::calendar::{CalendarBucket, Granularity};
pub use crate::partition::{Partition, daily, hourly, monthly, partition_by};

// 4. Resampling
pub use crate::config::{EmptyBucketPolicy, ResampleConfig};
pub use crate::frequency::Frequency;
pub use crate::resample::{AggregationRole, ColumnRoles, FLOW_COLUMNS, MAX_FILLED_BUCKETS, resample};

// 5. View window
pub use crate::view::{AxisRange, PanZoom, ScrollDirection, ScrollEvent, ViewWindow};

// 6. Errors
pub use crate::error::{ConfigError, DataError, PeriodizeError, PeriodizeResult};
