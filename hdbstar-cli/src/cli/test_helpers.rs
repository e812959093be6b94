//! Small helpers shared across CLI tests.

use std::path::PathBuf;

use tempfile::TempDir;

use super::commands::run_command;
use super::{Cli, CliError, ParquetArgs, RunCommand, RunSource, Traversal, run_cli};

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

/// A `run parquet` command over `path` with small-data settings.
pub(super) fn parquet_command(path: PathBuf, column: &str, name: Option<&str>) -> RunCommand {
    RunCommand {
        min_cluster_size: 2,
        samples: 1,
        leaf_size: 1,
        traversal: Traversal::SingleTree,
        concurrency: Some(2),
        source: RunSource::Parquet(ParquetArgs {
            path,
            column: column.to_owned(),
            name: name.map(ToOwned::to_owned),
        }),
    }
}

pub(super) fn run_cli_expecting_error(cli: Cli, panic_msg: &str) -> CliError {
    match run_cli(cli) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}

pub(super) fn run_command_expecting_error(cmd: RunCommand, panic_msg: &str) -> CliError {
    match run_command(cmd) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
