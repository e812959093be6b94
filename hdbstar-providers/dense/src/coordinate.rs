use arrow_array::{
    ArrowNativeTypeOp, ArrowPrimitiveType,
    types::{Float32Type, Float64Type},
};
use hdbstar_core::Coordinate;

/// Coordinate precision that can be read from an Arrow float array.
///
/// # Examples
/// ```
/// use arrow_array::ArrowPrimitiveType;
/// use arrow_schema::DataType;
/// use hdbstar_providers_dense::DenseCoordinate;
///
/// assert_eq!(<f64 as DenseCoordinate>::Arrow::DATA_TYPE, DataType::Float64);
/// ```
pub trait DenseCoordinate: Coordinate + ArrowNativeTypeOp {
    /// Arrow primitive type whose native representation is `Self`.
    type Arrow: ArrowPrimitiveType<Native = Self>;
}

impl DenseCoordinate for f32 {
    type Arrow = Float32Type;
}

impl DenseCoordinate for f64 {
    type Arrow = Float64Type;
}
