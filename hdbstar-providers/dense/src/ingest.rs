//! Helpers for ingesting fixed-size list arrays into dense buffers.
use arrow_array::{Array, ArrowPrimitiveType, FixedSizeListArray, PrimitiveArray};
use arrow_schema::{DataType, Field, Schema};

use crate::{coordinate::DenseCoordinate, errors::DenseMatrixProviderError};

/// Resolves `column` to a top-level field index.
pub(crate) fn column_index(schema: &Schema, column: &str) -> Result<usize, DenseMatrixProviderError> {
    schema
        .index_of(column)
        .map_err(|_| DenseMatrixProviderError::ColumnNotFound {
            column: column.to_owned(),
        })
}

/// Checks that `field` is a non-nullable `FixedSizeList<T>` and returns its
/// width.
pub(crate) fn validate_fixed_size_list_field<T: DenseCoordinate>(
    field: &Field,
    column: &str,
) -> Result<usize, DenseMatrixProviderError> {
    match field.data_type() {
        DataType::FixedSizeList(child, width) => {
            if field.is_nullable() || child.is_nullable() {
                return Err(DenseMatrixProviderError::NullableField {
                    column: column.to_owned(),
                    nullable_child: child.is_nullable(),
                });
            }
            ensure_value_type::<T>(child.data_type())?;
            list_dimension(*width)
        }
        other => Err(DenseMatrixProviderError::InvalidColumnType {
            column: column.to_owned(),
            actual: other.clone(),
        }),
    }
}

pub(crate) fn append_fixed_size_list_values<T: DenseCoordinate>(
    array: &FixedSizeListArray,
    expected_dimension: Option<usize>,
    start_row: usize,
    out: &mut Vec<T>,
) -> Result<usize, DenseMatrixProviderError> {
    ensure_value_type::<T>(&array.value_type())?;
    let dimension = list_dimension(array.value_length())?;
    if let Some(expected) = expected_dimension.filter(|&expected| expected != dimension) {
        return Err(DenseMatrixProviderError::InconsistentBatchDimension {
            expected,
            actual: dimension,
        });
    }
    copy_list_values(array, dimension, start_row, out)?;
    Ok(dimension)
}

fn ensure_value_type<T: DenseCoordinate>(actual: &DataType) -> Result<(), DenseMatrixProviderError> {
    let expected = T::Arrow::DATA_TYPE;
    if *actual == expected {
        Ok(())
    } else {
        Err(DenseMatrixProviderError::InvalidListValueType {
            expected,
            actual: actual.clone(),
        })
    }
}

fn list_dimension(width: i32) -> Result<usize, DenseMatrixProviderError> {
    match usize::try_from(width) {
        Ok(0) => Err(DenseMatrixProviderError::ZeroDimension),
        Ok(dimension) => Ok(dimension),
        Err(_) => Err(DenseMatrixProviderError::InvalidDimension { actual: width }),
    }
}

fn copy_list_values<T: DenseCoordinate>(
    array: &FixedSizeListArray,
    dimension: usize,
    start_row: usize,
    out: &mut Vec<T>,
) -> Result<(), DenseMatrixProviderError> {
    let rows = array.len();
    let additional = rows
        .checked_mul(dimension)
        .ok_or(DenseMatrixProviderError::CapacityOverflow { rows, dimension })?;
    out.reserve(additional);
    for row_index in 0..rows {
        let absolute_row = start_row + row_index;
        if array.is_null(row_index) {
            return Err(DenseMatrixProviderError::NullRow { row: absolute_row });
        }
        let row = array.value(row_index);
        let items = row
            .as_any()
            .downcast_ref::<PrimitiveArray<T::Arrow>>()
            .ok_or_else(|| DenseMatrixProviderError::InvalidListValueType {
                expected: T::Arrow::DATA_TYPE,
                actual: row.data_type().clone(),
            })?;
        if items.len() != dimension {
            return Err(DenseMatrixProviderError::RaggedRow {
                row: absolute_row,
                expected: dimension,
                actual: items.len(),
            });
        }
        if items.null_count() > 0
            && let Some(value_index) = (0..dimension).find(|&index| items.is_null(index))
        {
            return Err(DenseMatrixProviderError::NullValue {
                row: absolute_row,
                value_index,
            });
        }
        out.extend_from_slice(items.values().as_ref());
    }
    Ok(())
}
