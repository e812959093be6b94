//! Precision-erased dense matrices loaded from Parquet.
use std::{fs::File, path::Path};

use arrow_schema::DataType;
use hdbstar_core::{Coordinate, VectorSource};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::{
    errors::DenseMatrixProviderError, ingest::column_index, provider::DenseMatrixProvider,
};

/// A dense matrix stored at the precision of its source column.
#[derive(Clone, Debug)]
pub enum DenseMatrix {
    /// Single-precision coordinates.
    F32(DenseMatrixProvider<f32>),
    /// Double-precision coordinates.
    F64(DenseMatrixProvider<f64>),
}

impl DenseMatrix {
    /// Returns the name given at load time.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::F32(provider) => provider.name(),
            Self::F64(provider) => provider.name(),
        }
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::F32(provider) => provider.len(),
            Self::F64(provider) => provider.len(),
        }
    }

    /// Returns whether the matrix has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the row dimension.
    #[must_use]
    pub fn dimension(&self) -> usize {
        match self {
            Self::F32(provider) => provider.dimension(),
            Self::F64(provider) => provider.dimension(),
        }
    }

    /// Returns `"f32"` or `"f64"`.
    #[must_use]
    pub const fn precision(&self) -> &'static str {
        match self {
            Self::F32(_) => <f32 as Coordinate>::PRECISION,
            Self::F64(_) => <f64 as Coordinate>::PRECISION,
        }
    }
}

/// Loads `column` from the Parquet file at `path`.
///
/// `FixedSizeList<Float64, D>` columns load as [`DenseMatrix::F64`]; every
/// other column is read as `f32`, so non-float columns report the `Float32`
/// expectation in their error.
///
/// # Errors
/// Returns [`DenseMatrixProviderError::Io`] when the file cannot be opened,
/// [`DenseMatrixProviderError::ColumnNotFound`] when the column is absent and
/// the validation errors of [`DenseMatrixProvider::try_from_parquet_reader`]
/// otherwise.
pub fn load_parquet(
    name: impl Into<String>,
    path: impl AsRef<Path>,
    column: &str,
) -> Result<DenseMatrix, DenseMatrixProviderError> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let index = column_index(builder.schema(), column)?;
    let double = matches!(
        builder.schema().field(index).data_type(),
        DataType::FixedSizeList(child, _) if child.data_type() == &DataType::Float64
    );
    if double {
        DenseMatrixProvider::from_parquet_builder(name, builder, column).map(DenseMatrix::F64)
    } else {
        DenseMatrixProvider::from_parquet_builder(name, builder, column).map(DenseMatrix::F32)
    }
}
