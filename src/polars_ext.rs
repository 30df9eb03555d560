use crate::error::{DataError, PeriodizeError};

pub(crate) fn polars_to_periodize_error(
    context: &str,
    e: polars::error::PolarsError,
) -> PeriodizeError {
    PeriodizeError::Data(DataError::DataFrame(format!("{context}: {e}")))
}
