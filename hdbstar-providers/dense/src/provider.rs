//! Dense matrix provider implementation.
use std::{fs::File, path::Path};

use arrow_array::{Array, FixedSizeListArray};
use hdbstar_core::{VectorSource, VectorSourceError};
use parquet::arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder};
use parquet::file::reader::ChunkReader;
use tracing::{debug, instrument};

use crate::coordinate::DenseCoordinate;
use crate::errors::DenseMatrixProviderError;
use crate::ingest::{append_fixed_size_list_values, column_index, validate_fixed_size_list_field};

/// Dense matrix provider backed by a contiguous row-major buffer.
#[derive(Clone, Debug)]
pub struct DenseMatrixProvider<T> {
    name: String,
    rows: usize,
    dimension: usize,
    values: Vec<T>,
}

impl<T: DenseCoordinate> DenseMatrixProvider<T> {
    fn from_parts(name: impl Into<String>, rows: usize, dimension: usize, values: Vec<T>) -> Self {
        debug_assert_eq!(values.len(), rows.saturating_mul(dimension));
        Self {
            name: name.into(),
            rows,
            dimension,
            values,
        }
    }

    /// Copies in-memory rows into a contiguous matrix.
    ///
    /// An empty `rows` vector yields an empty provider, which the engine
    /// rejects when asked to cluster it.
    ///
    /// # Errors
    /// Returns [`DenseMatrixProviderError::ZeroDimension`] when the first row
    /// is empty and [`DenseMatrixProviderError::RaggedRow`] when a later row
    /// differs in length from the first.
    ///
    /// # Examples
    /// ```
    /// use hdbstar_core::VectorSource;
    /// use hdbstar_providers_dense::DenseMatrixProvider;
    ///
    /// let provider = DenseMatrixProvider::try_from_rows("demo", vec![vec![0.0_f64, 1.0], vec![2.0, 3.0]])?;
    /// assert_eq!(provider.len(), 2);
    /// assert_eq!(provider.vector(1)?, &[2.0, 3.0]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_from_rows(
        name: impl Into<String>,
        rows: Vec<Vec<T>>,
    ) -> Result<Self, DenseMatrixProviderError> {
        let dimension = rows.first().map_or(0, Vec::len);
        if !rows.is_empty() && dimension == 0 {
            return Err(DenseMatrixProviderError::ZeroDimension);
        }
        let capacity = rows
            .len()
            .checked_mul(dimension)
            .ok_or(DenseMatrixProviderError::CapacityOverflow {
                rows: rows.len(),
                dimension,
            })?;
        let mut values = Vec::with_capacity(capacity);
        for (row, coordinates) in rows.iter().enumerate() {
            if coordinates.len() != dimension {
                return Err(DenseMatrixProviderError::RaggedRow {
                    row,
                    expected: dimension,
                    actual: coordinates.len(),
                });
            }
            values.extend_from_slice(coordinates);
        }
        Ok(Self::from_parts(name, rows.len(), dimension, values))
    }

    /// Returns the underlying row-major matrix.
    #[must_use]
    #[rustfmt::skip]
    pub fn data(&self) -> &[T] { &self.values }

    /// Loads data from an Arrow [`FixedSizeListArray`].
    ///
    /// # Errors
    /// Returns an error when the items are not of type `T`, when the width is
    /// zero, or when a row or coordinate is null.
    pub fn try_from_fixed_size_list(
        name: impl Into<String>,
        array: &FixedSizeListArray,
    ) -> Result<Self, DenseMatrixProviderError> {
        let mut values = Vec::new();
        let dimension = append_fixed_size_list_values(array, None, 0, &mut values)?;
        Ok(Self::from_parts(name, array.len(), dimension, values))
    }

    /// Loads data from a Parquet column containing `FixedSizeList<T, D>` rows.
    ///
    /// # Errors
    /// Returns [`DenseMatrixProviderError::Io`] when the file cannot be opened
    /// and the errors of [`Self::try_from_parquet_reader`] otherwise.
    pub fn try_from_parquet_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        column: &str,
    ) -> Result<Self, DenseMatrixProviderError> {
        let file = File::open(path)?;
        Self::try_from_parquet_reader(name, file, column)
    }

    /// Loads data from a Parquet reader.
    ///
    /// # Errors
    /// Returns an error when the column is missing, nullable, not a
    /// `FixedSizeList` of `T`, or when the file cannot be decoded.
    pub fn try_from_parquet_reader<R>(
        name: impl Into<String>,
        reader: R,
        column: &str,
    ) -> Result<Self, DenseMatrixProviderError>
    where
        R: ChunkReader + Send + 'static,
    {
        let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
        Self::from_parquet_builder(name, builder, column)
    }

    #[instrument(name = "dense.parquet", err, skip_all, fields(column = %column, precision = T::PRECISION))]
    pub(crate) fn from_parquet_builder<R>(
        name: impl Into<String>,
        builder: ParquetRecordBatchReaderBuilder<R>,
        column: &str,
    ) -> Result<Self, DenseMatrixProviderError>
    where
        R: ChunkReader + Send + 'static,
    {
        let index = column_index(builder.schema(), column)?;
        let dimension =
            validate_fixed_size_list_field::<T>(builder.schema().field(index), column)?;
        let mask = ProjectionMask::roots(builder.parquet_schema(), [index]);
        let reader = builder.with_projection(mask).build()?;
        let mut values = Vec::new();
        let mut rows = 0_usize;
        for batch in reader {
            let batch = batch?;
            let column_array =
                batch
                    .column_by_name(column)
                    .ok_or_else(|| DenseMatrixProviderError::ColumnNotFound {
                        column: column.to_owned(),
                    })?;
            let list = column_array
                .as_any()
                .downcast_ref::<FixedSizeListArray>()
                .ok_or_else(|| DenseMatrixProviderError::InvalidColumnType {
                    column: column.to_owned(),
                    actual: column_array.data_type().clone(),
                })?;
            append_fixed_size_list_values(list, Some(dimension), rows, &mut values)?;
            rows += list.len();
        }
        debug!(rows, dimension, "dense matrix loaded");
        Ok(Self::from_parts(name, rows, dimension, values))
    }
}

impl<T: DenseCoordinate> VectorSource for DenseMatrixProvider<T> {
    type Coordinate = T;

    fn len(&self) -> usize {
        self.rows
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn vector(&self, index: usize) -> Result<&[T], VectorSourceError> {
        if index >= self.rows {
            return Err(VectorSourceError::OutOfBounds { index });
        }
        let start = index
            .checked_mul(self.dimension)
            .ok_or(VectorSourceError::OutOfBounds { index })?;
        let end = start
            .checked_add(self.dimension)
            .ok_or(VectorSourceError::OutOfBounds { index })?;
        self.values
            .get(start..end)
            .ok_or(VectorSourceError::OutOfBounds { index })
    }
}
