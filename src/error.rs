use thiserror::Error;

pub type PeriodizeResult<T> = Result<T, PeriodizeError>;

#[derive(Debug, Error)]
pub enum PeriodizeError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to the shape and content of a performance record.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Degenerate sampling interval: {0}")]
    DegenerateInterval(String),

    #[error("Missing key column '{0}'")]
    MissingKeyColumn(String),

    #[error("Key column '{column}' must be a datetime column, found {dtype}")]
    InvalidKeyColumn { column: String, dtype: String },

    #[error("Key column '{column}' contains a null timestamp at row {row}")]
    NullTimestamp { column: String, row: usize },

    #[error("Key column '{column}' is not sorted ascending (row {row} precedes row {prev})")]
    UnsortedTimestamps {
        column: String,
        prev: usize,
        row: usize,
    },

    #[error("Aggregation role assigned to unknown column '{0}'")]
    UnknownColumn(String),

    #[error("Invalid aggregation for column '{column}': {msg}")]
    InvalidAggregation { column: String, msg: String },

    #[error("Failed timestamp conversion: {0}")]
    TimestampConversion(String),

    #[error("Data frame error: {0}")]
    DataFrame(String),
}

/// Errors related to caller-supplied settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid frequency '{input}': {msg}")]
    InvalidFrequency { input: String, msg: String },

    #[error("Invalid time zone: '{0}'")]
    InvalidTimeZone(String),

    #[error("Failed to parse enum: {0}")]
    ParseEnum(#[from] strum::ParseError),
}
