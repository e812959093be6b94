//! Benchmark support crate for hdbstar.
//!
//! Provides synthetic vector sources and parameter types used by the
//! Criterion benchmarks of the three CPU pipeline stages: KD-tree build with
//! core distances, Boruvka spanning tree, and hierarchy extraction.

pub mod error;
pub mod params;
pub mod source;
