use std::sync::Arc;

use arrow_array::{ArrayRef, ArrowPrimitiveType, FixedSizeListArray, PrimitiveArray, RecordBatch};
use arrow_schema::{Field, Schema};
use bytes::Bytes;
use parquet::{arrow::arrow_writer::ArrowWriter, file::properties::WriterProperties};

use crate::DenseCoordinate;

pub(crate) fn build_array(rows: &[[f32; 3]]) -> FixedSizeListArray {
    let rows = rows.iter().map(|row| row.to_vec()).collect::<Vec<_>>();
    build_list_array(&rows, 3, false)
}

pub(crate) fn build_list_array<T: DenseCoordinate>(
    rows: &[Vec<T>],
    dimension: usize,
    child_nullable: bool,
) -> FixedSizeListArray {
    assert!(rows.iter().all(|row| row.len() == dimension));
    let values = PrimitiveArray::<T::Arrow>::from_iter_values(rows.iter().flatten().copied());
    FixedSizeListArray::new(
        Arc::new(Field::new("item", T::Arrow::DATA_TYPE, child_nullable)),
        i32::try_from(dimension).expect("dimension fits in i32"),
        Arc::new(values) as ArrayRef,
        None,
    )
}

pub(crate) fn feature_field<T: DenseCoordinate>(
    dimension: usize,
    child_nullable: bool,
    list_nullable: bool,
) -> Field {
    Field::new(
        "features",
        arrow_schema::DataType::FixedSizeList(
            Arc::new(Field::new("item", T::Arrow::DATA_TYPE, child_nullable)),
            i32::try_from(dimension).expect("dimension fits in i32"),
        ),
        list_nullable,
    )
}

pub(crate) fn write_parquet(array: FixedSizeListArray) -> Bytes {
    write_parquet_with_field(feature_field::<f32>(3, false, false), array)
}

pub(crate) fn write_parquet_with_field(field: Field, array: FixedSizeListArray) -> Bytes {
    write_batches(field, vec![Arc::new(array) as ArrayRef], None)
}

/// Writes one record batch per array, capping row groups at
/// `max_row_group_size` rows when given.
pub(crate) fn write_batches(
    field: Field,
    arrays: Vec<ArrayRef>,
    max_row_group_size: Option<usize>,
) -> Bytes {
    let schema = Arc::new(Schema::new(vec![field]));
    let properties = max_row_group_size.map(|rows| {
        WriterProperties::builder()
            .set_max_row_group_size(rows)
            .build()
    });
    let mut buffer = Vec::new();
    {
        let mut writer =
            ArrowWriter::try_new(&mut buffer, schema.clone(), properties).expect("writer");
        for array in arrays {
            let batch = RecordBatch::try_new(schema.clone(), vec![array]).expect("batch");
            writer.write(&batch).expect("write");
        }
        writer.close().expect("close");
    }
    Bytes::from(buffer)
}
