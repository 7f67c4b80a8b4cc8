//! Failure taxonomy for loading and summarising usage data.

use thiserror::Error;

/// Errors raised by the engagement pipeline itself.
///
/// I/O, CSV and workbook failures are propagated as their own error types
/// with the offending path attached as context.
#[derive(Debug, Error)]
pub enum EngagementError {
    #[error("unsupported input format: {0} (expected csv, xlsx, xlsm, xlsb, xls or ods)")]
    UnsupportedFormat(String),

    #[error("required column not found: {0}")]
    MissingColumn(String),

    #[error("workbook has no worksheets: {0}")]
    EmptyWorkbook(String),

    #[error("worksheet not found: {0}")]
    SheetNotFound(String),

    #[error("invalid value in row {row}, column {column}: {value:?}")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },

    #[error("feature {0:?} is missing from one of the per-feature summaries")]
    KeyMismatch(String),
}
