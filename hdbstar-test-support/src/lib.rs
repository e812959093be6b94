//! Shared test utilities used across hdbstar crates.

pub mod ci;
pub mod tracing;
