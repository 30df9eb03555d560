use std::collections::BTreeMap;

use polars::{
    frame::DataFrame,
    prelude::{DataType, PlSmallStr},
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::{DataError, PeriodizeResult};

/// Flow columns of a backtest performance record. They accumulate per
/// sampling interval and therefore sum when buckets widen.
pub const FLOW_COLUMNS: [&str; 3] = ["trading_value_", "trading_volume_", "num_trades_"];

/// How a metric column collapses into one value per bucket.
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
    EnumString,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AggregationRole {
    /// Flow quantity (value, volume, trade count): sum over the bucket.
    Sum,
    /// Level quantity (balance, price, position): value of the latest row.
    #[default]
    Last,
}

/// Explicit aggregation role per column.
///
/// Columns that are not listed use the fallback role (`Last` unless
/// changed). Listed columns are checked against the frame on every call,
/// so a renamed column fails loudly instead of silently switching role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoles {
    #[serde(default)]
    columns: BTreeMap<String, AggregationRole>,
    #[serde(default)]
    fallback: AggregationRole,
}

impl ColumnRoles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roles of a backtest performance record: [`FLOW_COLUMNS`] sum, the
    /// rest keep their last value.
    pub fn performance_record() -> Self {
        FLOW_COLUMNS
            .iter()
            .fold(Self::new(), |roles, name| roles.with_role(*name, AggregationRole::Sum))
    }

    pub fn with_role(mut self, column: impl Into<String>, role: AggregationRole) -> Self {
        self.columns.insert(column.into(), role);
        self
    }

    pub fn with_fallback(mut self, role: AggregationRole) -> Self {
        self.fallback = role;
        self
    }

    pub fn role_of(&self, column: &str) -> AggregationRole {
        self.columns.get(column).copied().unwrap_or(self.fallback)
    }

    pub fn declared(&self) -> impl Iterator<Item = (&str, AggregationRole)> {
        self.columns.iter().map(|(name, role)| (name.as_str(), *role))
    }

    /// Assigns a role to every non-key column of `df`, in schema order.
    pub(crate) fn resolve(
        &self,
        df: &DataFrame,
        key: &str,
    ) -> PeriodizeResult<Vec<ResolvedColumn>> {
        for name in self.columns.keys() {
            if name == key {
                return Err(DataError::InvalidAggregation {
                    column: name.clone(),
                    msg: "the key column cannot carry an aggregation role".to_string(),
                }
                .into());
            }
            if df.column(name).is_err() {
                return Err(DataError::UnknownColumn(name.clone()).into());
            }
        }

        df.get_columns()
            .iter()
            .filter(|c| c.name().as_str() != key)
            .map(|c| {
                let role = self.role_of(c.name().as_str());
                let dtype = c.dtype();
                if role == AggregationRole::Sum && !(dtype.is_integer() || dtype.is_float()) {
                    return Err(DataError::InvalidAggregation {
                        column: c.name().to_string(),
                        msg: format!("cannot sum a column of type {dtype}"),
                    }
                    .into());
                }
                Ok(ResolvedColumn {
                    name: c.name().clone(),
                    role,
                    dtype: dtype.clone(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedColumn {
    pub name: PlSmallStr,
    pub role: AggregationRole,
    pub dtype: DataType,
}
