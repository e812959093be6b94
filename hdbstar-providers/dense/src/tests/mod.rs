pub(crate) use super::{DenseMatrixProvider, DenseMatrixProviderError};

mod ingest;
mod support;
