use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::resample::ColumnRoles;

/// What the resampler emits for a bucket no row falls into.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EmptyBucketPolicy {
    /// **Default.** Empty buckets are omitted from the output.
    #[default]
    Drop,

    /// Empty buckets between the first and last populated bucket are emitted:
    /// `Sum` columns are zero, `Last` columns repeat the previous bucket.
    ForwardFill,
}

/// Settings for [`crate::resample::resample`].
///
/// # Example
/// ```
/// use periodize::prelude::*;
///
/// let config = ResampleConfig::performance_record()
///     .with_empty_buckets(EmptyBucketPolicy::ForwardFill);
/// assert_eq!(config.roles.role_of("num_trades_"), AggregationRole::Sum);
/// assert_eq!(config.roles.role_of("balance_"), AggregationRole::Last);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResampleConfig {
    /// Aggregation role per metric column.
    ///
    /// The default declares no column, so every metric keeps its last value.
    #[serde(default)]
    pub roles: ColumnRoles,

    #[serde(default)]
    pub empty_buckets: EmptyBucketPolicy,
}

impl ResampleConfig {
    /// Preset for backtest performance records, see [`ColumnRoles::performance_record`].
    pub fn performance_record() -> Self {
        Self::default().with_roles(ColumnRoles::performance_record())
    }

    pub fn with_roles(mut self, roles: ColumnRoles) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_empty_buckets(mut self, policy: EmptyBucketPolicy) -> Self {
        self.empty_buckets = policy;
        self
    }
}
