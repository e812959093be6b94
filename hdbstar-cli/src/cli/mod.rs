//! Command-line interface orchestration for hdbstar.
//!
//! The `run` command loads a dense matrix from a Parquet column, clusters it
//! with HDBSCAN* and renders the labels as text.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, ParquetArgs, RunCommand, RunSource, Traversal,
    render_summary, run_cli,
};

#[cfg(test)]
mod test_fixtures;
#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod tests;
