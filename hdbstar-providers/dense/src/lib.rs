//! Dense, row-major vector sources for the hdbstar engine.
//!
//! [`DenseMatrixProvider`] owns a contiguous buffer of `f32` or `f64`
//! coordinates and implements [`hdbstar_core::VectorSource`] over it. Rows can
//! be supplied in memory, as an Arrow `FixedSizeList` array or as a Parquet
//! column; [`load_parquet`] picks the precision from the column type.

mod coordinate;
mod errors;
mod ingest;
mod matrix;
mod provider;

pub use coordinate::DenseCoordinate;
pub use errors::{DenseMatrixProviderError, DenseMatrixProviderErrorCode};
pub use matrix::{DenseMatrix, load_parquet};
pub use provider::DenseMatrixProvider;

#[cfg(test)]
mod tests;
