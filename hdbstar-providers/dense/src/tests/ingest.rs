use super::{DenseMatrixProvider, DenseMatrixProviderError, support::*};
use crate::ingest::{append_fixed_size_list_values, validate_fixed_size_list_field};
use arrow_array::{ArrayRef, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use bytes::Bytes;
use hdbstar_core::VectorSource;
use rstest::rstest;
use std::sync::Arc;

#[rstest]
fn matrix_provider_from_parquet() {
    let array = build_array(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    let bytes = write_parquet(array);
    let provider = DenseMatrixProvider::<f32>::try_from_parquet_reader("demo", bytes, "features")
        .expect("parquet load");
    assert_eq!(provider.len(), 2);
    assert_eq!(provider.dimension(), 3);
    assert_eq!(provider.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[rstest]
fn matrix_provider_from_double_precision_parquet() {
    let rows = vec![vec![0.5_f64, -1.25], vec![1e-300, 2.0]];
    let bytes = write_parquet_with_field(
        feature_field::<f64>(2, false, false),
        build_list_array(&rows, 2, false),
    );
    let provider = DenseMatrixProvider::<f64>::try_from_parquet_reader("wide", bytes, "features")
        .expect("parquet load");
    assert_eq!(provider.data(), &[0.5, -1.25, 1e-300, 2.0]);
}

#[rstest]
fn matrix_provider_reads_every_row_group() {
    let first = build_list_array(&[vec![0.0_f32, 1.0], vec![2.0, 3.0], vec![4.0, 5.0]], 2, false);
    let second = build_list_array(&[vec![6.0_f32, 7.0], vec![8.0, 9.0]], 2, false);
    let bytes = write_batches(
        feature_field::<f32>(2, false, false),
        vec![Arc::new(first) as ArrayRef, Arc::new(second) as ArrayRef],
        Some(2),
    );
    let provider = DenseMatrixProvider::<f32>::try_from_parquet_reader("groups", bytes, "features")
        .expect("parquet load");
    assert_eq!(provider.len(), 5);
    assert_eq!(provider.vector(4).expect("last row"), &[8.0, 9.0]);
    assert_eq!(
        provider.data(),
        &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
    );
}

#[rstest]
fn matrix_provider_parquet_missing_column() {
    let array = build_array(&[[1.0, 2.0, 3.0]]);
    let bytes = write_parquet(array);
    let err = DenseMatrixProvider::<f32>::try_from_parquet_reader("demo", bytes, "unknown")
        .expect_err("missing column");
    assert!(matches!(
        err,
        DenseMatrixProviderError::ColumnNotFound { column } if column == "unknown"
    ));
}

#[rstest]
fn matrix_provider_parquet_wrong_type() {
    let field = Field::new("features", DataType::Int32, false);
    let schema = Arc::new(Schema::new(vec![field]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(arrow_array::Int32Array::from(vec![1, 2, 3])) as _],
    )
    .expect("batch");
    let mut buffer = Vec::new();
    {
        let mut writer =
            parquet::arrow::arrow_writer::ArrowWriter::try_new(&mut buffer, schema, None)
                .expect("writer");
        writer.write(&batch).expect("write");
        writer.close().expect("close");
    }
    let bytes = Bytes::from(buffer);
    let err = DenseMatrixProvider::<f32>::try_from_parquet_reader("demo", bytes, "features")
        .expect_err("wrong type");
    assert!(matches!(
        err,
        DenseMatrixProviderError::InvalidColumnType { .. }
    ));
}

#[rstest]
#[case(true, false)]
#[case(false, true)]
fn matrix_provider_parquet_nullable_schema(
    #[case] list_nullable: bool,
    #[case] child_nullable: bool,
) {
    let rows = vec![vec![1.0_f32, 2.0, 3.0]];
    let array = build_list_array(&rows, 3, child_nullable);
    let field = feature_field::<f32>(3, child_nullable, list_nullable);
    let bytes = write_parquet_with_field(field, array);
    let err = DenseMatrixProvider::<f32>::try_from_parquet_reader("demo", bytes, "features")
        .expect_err("nullable schema must be rejected");
    assert!(matches!(
        err,
        DenseMatrixProviderError::NullableField {
            column,
            nullable_child
        } if column == "features" && nullable_child == child_nullable
    ));
}

#[rstest]
#[case::negative(-1)]
#[case::zero(0)]
fn validate_field_rejects_non_positive_dimension(#[case] width: i32) {
    let child = Arc::new(Field::new("item", DataType::Float32, false));
    let field = Field::new("features", DataType::FixedSizeList(child, width), false);
    let err = validate_fixed_size_list_field::<f32>(&field, "features")
        .expect_err("non-positive dimension must be rejected");
    if width == 0 {
        assert!(matches!(err, DenseMatrixProviderError::ZeroDimension));
    } else {
        assert!(matches!(
            err,
            DenseMatrixProviderError::InvalidDimension { actual } if actual == width
        ));
    }
}

#[test]
fn append_rejects_width_change_between_batches() {
    let mut values = Vec::<f32>::new();
    let first = build_list_array(&[vec![1.0_f32, 2.0, 3.0]], 3, false);
    let width = append_fixed_size_list_values(&first, None, 0, &mut values)
        .expect("first batch sets the width");
    let second = build_list_array(&[vec![4.0_f32, 5.0]], 2, false);
    let err = append_fixed_size_list_values(&second, Some(width), 1, &mut values)
        .expect_err("width change must be rejected");
    assert!(matches!(
        err,
        DenseMatrixProviderError::InconsistentBatchDimension {
            expected: 3,
            actual: 2
        }
    ));
    assert_eq!(values, vec![1.0, 2.0, 3.0]);
}

#[rstest]
fn append_copies_double_precision_rows_in_order() {
    let mut values = Vec::<f64>::new();
    let first = build_list_array(&[vec![0.5_f64, -1.5], vec![2.25, 3.0]], 2, false);
    let width = append_fixed_size_list_values(&first, None, 0, &mut values)
        .expect("first batch must be copied");
    let second = build_list_array(&[vec![1e-300_f64, f64::MAX]], 2, false);
    append_fixed_size_list_values(&second, Some(width), 2, &mut values)
        .expect("second batch must be appended");
    assert_eq!(width, 2);
    assert_eq!(values, vec![0.5, -1.5, 2.25, 3.0, 1e-300, f64::MAX]);
}
