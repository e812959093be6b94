use std::fmt;

use arrow_schema::{ArrowError, DataType};
use thiserror::Error;

/// Errors raised while building a dense matrix from rows, Arrow arrays or
/// Parquet files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DenseMatrixProviderError {
    /// The requested column is absent from the schema.
    #[error("column `{column}` not found in Parquet schema")]
    ColumnNotFound {
        /// Name that was looked up.
        column: String,
    },
    /// The column is not a `FixedSizeList`.
    #[error("column `{column}` must be a FixedSizeList of floats but found {actual:?}")]
    InvalidColumnType {
        /// Offending column.
        column: String,
        /// Type found in the schema.
        actual: DataType,
    },
    /// The list items do not have the requested float type.
    #[error("FixedSizeList child type must be {expected:?} but found {actual:?}")]
    InvalidListValueType {
        /// Arrow type matching the requested precision.
        expected: DataType,
        /// Type found in the array.
        actual: DataType,
    },
    /// The schema declares the list or its items nullable.
    #[error("column `{column}` must not be nullable (nullable items: {nullable_child})")]
    NullableField {
        /// Offending column.
        column: String,
        /// Whether the item field, rather than the list, is nullable.
        nullable_child: bool,
    },
    /// Rows must carry at least one coordinate.
    #[error("dense rows must have positive dimension")]
    ZeroDimension,
    /// The list width does not fit in `usize`.
    #[error("invalid FixedSizeList dimension {actual}")]
    InvalidDimension {
        /// Width declared by the array.
        actual: i32,
    },
    /// A whole row is null.
    #[error("row {row} is null")]
    NullRow {
        /// Offending row.
        row: usize,
    },
    /// A row contains a null coordinate.
    #[error("row {row} contains null value at position {value_index}")]
    NullValue {
        /// Offending row.
        row: usize,
        /// Position of the first null coordinate.
        value_index: usize,
    },
    /// A row disagrees with the dimension of the first row.
    #[error("row {row} has length {actual} but expected {expected}")]
    RaggedRow {
        /// Offending row.
        row: usize,
        /// Dimension of the first row.
        expected: usize,
        /// Length of the offending row.
        actual: usize,
    },
    /// The matrix would not fit in memory addressable by `usize`.
    #[error("matrix with {rows} rows and dimension {dimension} exceeds capacity limits")]
    CapacityOverflow {
        /// Rows being appended.
        rows: usize,
        /// Row dimension.
        dimension: usize,
    },
    /// Record batches disagree on the list width.
    #[error("inconsistent dimensions across batches: expected {expected}, got {actual}")]
    InconsistentBatchDimension {
        /// Width of the first batch.
        expected: usize,
        /// Width of the offending batch.
        actual: usize,
    },
    /// Arrow failed to decode a batch.
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
    /// Parquet failed to read the file.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    /// The file could not be opened.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl DenseMatrixProviderError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> DenseMatrixProviderErrorCode {
        match self {
            Self::ColumnNotFound { .. } => DenseMatrixProviderErrorCode::ColumnNotFound,
            Self::InvalidColumnType { .. } => DenseMatrixProviderErrorCode::InvalidColumnType,
            Self::InvalidListValueType { .. } => DenseMatrixProviderErrorCode::InvalidListValueType,
            Self::NullableField { .. } => DenseMatrixProviderErrorCode::NullableField,
            Self::ZeroDimension => DenseMatrixProviderErrorCode::ZeroDimension,
            Self::InvalidDimension { .. } => DenseMatrixProviderErrorCode::InvalidDimension,
            Self::NullRow { .. } => DenseMatrixProviderErrorCode::NullRow,
            Self::NullValue { .. } => DenseMatrixProviderErrorCode::NullValue,
            Self::RaggedRow { .. } => DenseMatrixProviderErrorCode::RaggedRow,
            Self::CapacityOverflow { .. } => DenseMatrixProviderErrorCode::CapacityOverflow,
            Self::InconsistentBatchDimension { .. } => {
                DenseMatrixProviderErrorCode::InconsistentBatchDimension
            }
            Self::Arrow(_) => DenseMatrixProviderErrorCode::Arrow,
            Self::Parquet(_) => DenseMatrixProviderErrorCode::Parquet,
            Self::Io(_) => DenseMatrixProviderErrorCode::Io,
        }
    }
}

/// Machine-readable error codes for [`DenseMatrixProviderError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum DenseMatrixProviderErrorCode {
    /// The requested column is absent.
    ColumnNotFound,
    /// The column is not a `FixedSizeList`.
    InvalidColumnType,
    /// The list items have the wrong float type.
    InvalidListValueType,
    /// The schema allows nulls.
    NullableField,
    /// Rows have no coordinates.
    ZeroDimension,
    /// The list width is negative.
    InvalidDimension,
    /// A row is null.
    NullRow,
    /// A coordinate is null.
    NullValue,
    /// Rows differ in length.
    RaggedRow,
    /// The matrix size overflows `usize`.
    CapacityOverflow,
    /// Batches differ in width.
    InconsistentBatchDimension,
    /// Arrow decoding failed.
    Arrow,
    /// Parquet reading failed.
    Parquet,
    /// The file could not be opened.
    Io,
}

impl DenseMatrixProviderErrorCode {
    /// Returns the symbolic identifier for logging surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ColumnNotFound => "DENSE_COLUMN_NOT_FOUND",
            Self::InvalidColumnType => "DENSE_INVALID_COLUMN_TYPE",
            Self::InvalidListValueType => "DENSE_INVALID_LIST_VALUE_TYPE",
            Self::NullableField => "DENSE_NULLABLE_FIELD",
            Self::ZeroDimension => "DENSE_ZERO_DIMENSION",
            Self::InvalidDimension => "DENSE_INVALID_DIMENSION",
            Self::NullRow => "DENSE_NULL_ROW",
            Self::NullValue => "DENSE_NULL_VALUE",
            Self::RaggedRow => "DENSE_RAGGED_ROW",
            Self::CapacityOverflow => "DENSE_CAPACITY_OVERFLOW",
            Self::InconsistentBatchDimension => "DENSE_INCONSISTENT_BATCH_DIMENSION",
            Self::Arrow => "DENSE_ARROW",
            Self::Parquet => "DENSE_PARQUET",
            Self::Io => "DENSE_IO",
        }
    }
}

impl fmt::Display for DenseMatrixProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
