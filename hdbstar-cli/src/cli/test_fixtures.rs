//! Parquet inputs shared by the CLI tests.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use arrow_array::{ArrayRef, FixedSizeListArray, Float32Array, Float64Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use parquet::arrow::arrow_writer::ArrowWriter;
use tempfile::TempDir;

/// Two well-separated pairs of 2-D points: (0,0), (0,1), (10,10), (10,11).
const TWO_PAIRS: [f64; 8] = [0.0, 0.0, 0.0, 1.0, 10.0, 10.0, 10.0, 11.0];

/// Writes [`TWO_PAIRS`] as a `features: FixedSizeList<item_type, 2>` column.
///
/// # Errors
/// Returns an error when the file cannot be created or the Parquet writer
/// fails to write the batch.
pub(super) fn create_parquet_file(
    dir: &TempDir,
    name: &str,
    item_type: &DataType,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dir.path().join(name);
    let item_field = Arc::new(Field::new("item", item_type.clone(), false));
    let schema = Arc::new(Schema::new(vec![Field::new(
        "features",
        DataType::FixedSizeList(item_field.clone(), 2),
        false,
    )]));
    let values: ArrayRef = match item_type {
        DataType::Float64 => Arc::new(Float64Array::from(TWO_PAIRS.to_vec())),
        _ => Arc::new(Float32Array::from_iter_values(
            TWO_PAIRS.iter().map(|value| *value as f32),
        )),
    };
    let list = FixedSizeListArray::new(item_field, 2, values, None);
    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(list) as ArrayRef])?;
    let file = File::create(&path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(path)
}
