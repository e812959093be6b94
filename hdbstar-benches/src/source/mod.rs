//! Synthetic benchmark data sources.
//!
//! Seeded generators for uniform and Gaussian-blob vector datasets.

mod errors;
mod numeric;

pub use errors::SyntheticError;
pub use numeric::{Anisotropy, GaussianBlobConfig, SyntheticConfig, SyntheticSource};
