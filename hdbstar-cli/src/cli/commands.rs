//! Command implementations and argument parsing for the hdbstar CLI.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use hdbstar_core::{
    BoruvkaTraversal, DEFAULT_MIN_CLUSTER_SIZE, DEFAULT_SAMPLES, Hdbscan, HdbscanBuilder,
    HdbscanError, HdbscanResult, Labels, VectorSource, kdtree::DEFAULT_LEAF_SIZE,
};
use hdbstar_providers_dense::{DenseMatrix, DenseMatrixProviderError, load_parquet};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "hdbstar", about = "Cluster dense vectors with HDBSCAN*.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Cluster a data source and print one label per point.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Smallest group of points reported as a cluster.
    #[arg(long = "min-cluster-size", default_value_t = DEFAULT_MIN_CLUSTER_SIZE)]
    pub min_cluster_size: usize,

    /// Neighbour rank defining each point's core distance.
    #[arg(long, default_value_t = DEFAULT_SAMPLES)]
    pub samples: usize,

    /// Maximum number of points per KD-tree leaf.
    #[arg(long = "leaf-size", default_value_t = DEFAULT_LEAF_SIZE)]
    pub leaf_size: usize,

    /// Boruvka search strategy.
    #[arg(long, value_enum, default_value_t = Traversal::SingleTree)]
    pub traversal: Traversal,

    /// Worker threads (defaults to the available parallelism).
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Data source configuration.
    #[command(subcommand)]
    pub source: RunSource,
}

/// Command-line spelling of [`BoruvkaTraversal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Traversal {
    /// Probe the tree once per point.
    SingleTree,
    /// Walk pairs of query and reference subtrees.
    DualTree,
}

impl From<Traversal> for BoruvkaTraversal {
    fn from(traversal: Traversal) -> Self {
        match traversal {
            Traversal::SingleTree => Self::SingleTree,
            Traversal::DualTree => Self::DualTree,
        }
    }
}

/// Input data sources supported by `run`.
#[derive(Debug, Subcommand, Clone)]
pub enum RunSource {
    /// Read a Parquet column of `FixedSizeList<Float32 | Float64, D>` rows.
    Parquet(ParquetArgs),
}

/// Parquet ingestion arguments.
#[derive(Debug, Args, Clone)]
pub struct ParquetArgs {
    /// Path to the Parquet file containing feature vectors.
    pub path: PathBuf,

    /// Column containing the fixed-size float lists.
    #[arg(long)]
    pub column: String,

    /// Override name for the data source (defaults to the file name).
    #[arg(long)]
    pub name: Option<String>,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Dense matrix ingestion failed.
    #[error(transparent)]
    Dense(#[from] DenseMatrixProviderError),
    /// Clustering failed.
    #[error(transparent)]
    Core(#[from] HdbscanError),
}

impl CliError {
    /// Returns the stable code of the underlying error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Dense(error) => error.code().as_str(),
            Self::Core(error) => error.code().as_str(),
        }
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionSummary {
    /// Name reported by the data source implementation.
    pub data_source: String,
    /// Flat labels, `-1` for noise.
    pub labels: Labels,
    /// Sum of the mutual-reachability spanning tree's edge weights.
    pub total_weight: f64,
}

impl ExecutionSummary {
    fn from_result(data_source: &str, result: HdbscanResult) -> Self {
        let total_weight = result.spanning_tree().total_weight();
        Self {
            data_source: data_source.to_owned(),
            labels: result.into_labels(),
            total_weight,
        }
    }
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading or clustering fails.
///
/// # Examples
/// ```
/// # use hdbstar_cli::cli::{Cli, CliError, Command, ParquetArgs, RunCommand, RunSource, Traversal, run_cli};
/// let cli = Cli {
///     command: Command::Run(RunCommand {
///         min_cluster_size: 2,
///         samples: 1,
///         leaf_size: 1,
///         traversal: Traversal::SingleTree,
///         concurrency: Some(1),
///         source: RunSource::Parquet(ParquetArgs {
///             path: "does-not-exist.parquet".into(),
///             column: "features".into(),
///             name: None,
///         }),
///     }),
/// };
/// assert!(matches!(run_cli(cli), Err(CliError::Dense(_))));
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(
        min_cluster_size = command.min_cluster_size,
        samples = command.samples,
        source = field::Empty,
    ),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let hdbscan = build_hdbscan(&command)?;

    let summary = match command.source {
        RunSource::Parquet(args) => {
            Span::current().record("source", field::display("parquet"));
            run_parquet(&hdbscan, args)?
        }
    };

    info!(
        data_source = summary.data_source.as_str(),
        clusters = summary.labels.cluster_count(),
        noise = summary.labels.noise_point_count(),
        "command completed"
    );
    Ok(summary)
}

fn build_hdbscan(command: &RunCommand) -> Result<Hdbscan, HdbscanError> {
    let builder = HdbscanBuilder::new()
        .with_min_cluster_size(command.min_cluster_size)
        .with_samples(command.samples)
        .with_leaf_size(command.leaf_size)
        .with_traversal(command.traversal.into());
    match command.concurrency {
        Some(threads) => builder.with_concurrency(threads).build(),
        None => builder.build(),
    }
}

#[instrument(
    name = "cli.run_parquet",
    err,
    skip(hdbscan, args),
    fields(
        path = field::Empty,
        column = field::Empty,
        override_name = field::Empty,
        precision = field::Empty,
    ),
)]
pub(super) fn run_parquet(
    hdbscan: &Hdbscan,
    args: ParquetArgs,
) -> Result<ExecutionSummary, CliError> {
    let ParquetArgs { path, column, name } = args;
    let span = Span::current();
    span.record("path", field::display(path.display()));
    span.record("column", field::display(&column));
    span.record(
        "override_name",
        field::display(name.as_deref().unwrap_or("<derived>")),
    );
    let chosen_name = derive_data_source_name(&path, name.as_deref());
    let matrix = load_parquet(chosen_name, &path, &column)?;
    span.record("precision", field::display(matrix.precision()));
    let summary = match &matrix {
        DenseMatrix::F32(provider) => cluster(hdbscan, provider)?,
        DenseMatrix::F64(provider) => cluster(hdbscan, provider)?,
    };
    Ok(summary)
}

fn cluster<S: VectorSource>(hdbscan: &Hdbscan, source: &S) -> Result<ExecutionSummary, CliError> {
    let result = hdbscan.run(source)?;
    Ok(ExecutionSummary::from_result(source.name(), result))
}

pub(super) fn derive_data_source_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map_or_else(|| "data_source".to_owned(), ToOwned::to_owned)
}

/// Renders `summary` to `writer`: a header of totals followed by one
/// `index<TAB>label` line per point.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use hdbstar_cli::cli::{ExecutionSummary, render_summary};
/// # use hdbstar_core::Labels;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary {
///     data_source: "demo".into(),
///     labels: Labels::try_from_labels(vec![0, -1, 0])?,
///     total_weight: 2.5,
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// let text = String::from_utf8(buffer)?;
/// assert!(text.ends_with("0\t0\n1\t-1\n2\t0\n"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let labels = &summary.labels;
    writeln!(writer, "data source: {}", summary.data_source)?;
    writeln!(writer, "points: {}", labels.len())?;
    writeln!(writer, "clusters: {}", labels.cluster_count())?;
    writeln!(writer, "noise: {}", labels.noise_point_count())?;
    writeln!(writer, "mst weight: {}", summary.total_weight)?;
    for (index, label) in labels.labels().iter().enumerate() {
        writeln!(writer, "{index}\t{label}")?;
    }
    Ok(())
}
