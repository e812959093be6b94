//! Unit tests for the CLI commands and data ingestion helpers.

use super::commands::{derive_data_source_name, run_command};
use super::test_fixtures::create_parquet_file;
use super::test_helpers::{
    parquet_command, run_cli_expecting_error, run_command_expecting_error, temp_dir,
};
use super::{
    Cli, CliError, Command, ExecutionSummary, RunCommand, RunSource, Traversal, render_summary,
    run_cli,
};

use std::path::Path;

use arrow_schema::DataType;
use clap::Parser;
use hdbstar_core::{BoruvkaTraversal, HdbscanError, Labels};
use hdbstar_providers_dense::DenseMatrixProviderError;
use hdbstar_test_support::tracing::RecordingLayer;
use rstest::rstest;
use tracing::Level;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[rstest]
#[case::override_name("/tmp/source.parquet", Some("override"), "override")]
#[case::stem_with_extension("/tmp/source.parquet", None, "source")]
#[case::stem_without_extension("/tmp/source", None, "source")]
#[case::missing_stem("", None, "data_source")]
fn derive_data_source_name_selects_expected_name(
    #[case] raw_path: &str,
    #[case] override_name: Option<&'static str>,
    #[case] expected: &str,
) {
    let path = Path::new(raw_path);
    let name = derive_data_source_name(path, override_name);
    assert_eq!(name, expected);
}

#[rstest]
#[case::single_precision(DataType::Float32)]
#[case::double_precision(DataType::Float64)]
fn run_parquet_success(#[case] item_type: DataType) -> TestResult {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "vectors.parquet", &item_type)?;
    let cli = Cli {
        command: Command::Run(parquet_command(path, "features", Some("pairs"))),
    };
    let summary = run_cli(cli)?;
    assert_eq!(summary.data_source, "pairs");
    assert_eq!(summary.labels.labels(), &[0, 0, 1, 1]);
    assert!((summary.total_weight - (2.0 + 181.0_f64.sqrt())).abs() < 1e-5);
    Ok(())
}

#[rstest]
fn run_parquet_rejects_missing_column() -> TestResult {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "vectors.parquet", &DataType::Float32)?;
    let cli = Cli {
        command: Command::Run(parquet_command(path, "unknown", None)),
    };
    let err = run_cli_expecting_error(cli, "unknown column must fail");
    assert!(matches!(
        err,
        CliError::Dense(DenseMatrixProviderError::ColumnNotFound { .. })
    ));
    assert_eq!(err.code(), "DENSE_COLUMN_NOT_FOUND");
    Ok(())
}

#[rstest]
fn run_parquet_rejects_missing_files() {
    let dir = temp_dir();
    let command = parquet_command(dir.path().join("absent.parquet"), "features", None);
    let err = run_command_expecting_error(command, "missing file must fail");
    assert!(matches!(err, CliError::Dense(DenseMatrixProviderError::Io(_))));
}

#[rstest]
#[case::min_cluster_size(|command: &mut RunCommand| command.min_cluster_size = 0, "HDBSTAR_INVALID_MIN_CLUSTER_SIZE")]
#[case::samples(|command: &mut RunCommand| command.samples = 0, "HDBSTAR_INVALID_SAMPLES")]
#[case::leaf_size(|command: &mut RunCommand| command.leaf_size = 0, "HDBSTAR_INVALID_LEAF_SIZE")]
#[case::concurrency(|command: &mut RunCommand| command.concurrency = Some(0), "HDBSTAR_INVALID_CONCURRENCY")]
fn run_command_rejects_zero_settings(
    #[case] tweak: fn(&mut RunCommand),
    #[case] code: &str,
) -> TestResult {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "vectors.parquet", &DataType::Float32)?;
    let mut command = parquet_command(path, "features", None);
    tweak(&mut command);
    let err = run_command_expecting_error(command, "zero settings must fail");
    assert!(matches!(err, CliError::Core(_)));
    assert_eq!(err.code(), code);
    Ok(())
}

#[rstest]
fn render_summary_outputs_totals_and_labels() -> TestResult {
    let summary = ExecutionSummary {
        data_source: "demo".into(),
        labels: Labels::try_from_labels(vec![0, -1, 1, 0])?,
        total_weight: 3.5,
    };
    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer)?;
    let text = String::from_utf8(buffer)?;
    assert_eq!(
        text,
        "data source: demo\npoints: 4\nclusters: 2\nnoise: 1\nmst weight: 3.5\n\
         0\t0\n1\t-1\n2\t1\n3\t0\n"
    );
    Ok(())
}

#[rstest]
fn clap_parses_run_parquet_with_defaults() {
    let cli = Cli::try_parse_from([
        "hdbstar",
        "run",
        "parquet",
        "data.parquet",
        "--column",
        "features",
    ])
    .expect("arguments must parse");
    let Command::Run(run) = cli.command;
    assert_eq!(run.min_cluster_size, hdbstar_core::DEFAULT_MIN_CLUSTER_SIZE);
    assert_eq!(run.samples, hdbstar_core::DEFAULT_SAMPLES);
    assert_eq!(run.leaf_size, hdbstar_core::kdtree::DEFAULT_LEAF_SIZE);
    assert_eq!(run.traversal, Traversal::SingleTree);
    assert_eq!(run.concurrency, None);
    let RunSource::Parquet(args) = run.source;
    assert_eq!(args.column, "features");
    assert_eq!(args.name, None);
}

#[rstest]
fn clap_parses_engine_settings() {
    let cli = Cli::try_parse_from([
        "hdbstar",
        "run",
        "--min-cluster-size",
        "3",
        "--samples",
        "4",
        "--leaf-size",
        "16",
        "--traversal",
        "dual-tree",
        "--concurrency",
        "2",
        "parquet",
        "data.parquet",
        "--column",
        "features",
        "--name",
        "demo",
    ])
    .expect("arguments must parse");
    let Command::Run(run) = cli.command;
    assert_eq!(
        (run.min_cluster_size, run.samples, run.leaf_size, run.concurrency),
        (3, 4, 16, Some(2))
    );
    assert_eq!(
        BoruvkaTraversal::from(run.traversal),
        BoruvkaTraversal::DualTree
    );
}

#[rstest]
#[case::unknown_traversal(&["hdbstar", "run", "--traversal", "cover-tree", "parquet", "x.parquet", "--column", "c"])]
#[case::missing_column(&["hdbstar", "run", "parquet", "x.parquet"])]
#[case::negative_samples(&["hdbstar", "run", "--samples", "-1", "parquet", "x.parquet", "--column", "c"])]
fn clap_rejects_invalid_arguments(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_err());
}

#[rstest]
fn run_command_emits_tracing_fields() -> TestResult {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "lines.parquet", &DataType::Float64)?;
    let command = parquet_command(path, "features", None);

    let (summary, layer) = RecordingLayer::capture(|| run_command(command));
    let summary = summary?;
    assert_eq!(summary.data_source, "lines");

    let execute = layer.span("cli.execute").expect("cli.execute span must exist");
    assert_eq!(execute.field("min_cluster_size"), Some("2"));
    assert_eq!(execute.field("samples"), Some("1"));
    assert_eq!(execute.field("source"), Some("parquet"));

    let parquet = layer
        .span("cli.run_parquet")
        .expect("cli.run_parquet span must exist");
    assert!(
        parquet
            .field("path")
            .is_some_and(|value| value.ends_with("lines.parquet"))
    );
    assert_eq!(parquet.field("column"), Some("features"));
    assert_eq!(parquet.field("override_name"), Some("<derived>"));
    assert_eq!(parquet.field("precision"), Some("f64"));

    let run = layer.span("core.run").expect("core.run span must exist");
    assert_eq!(run.parent.as_deref(), Some("cli.run_parquet"));

    assert!(layer.events_at(Level::INFO).iter().any(|event| {
        event.message() == Some("command completed") && event.field("data_source") == Some("lines")
    }));
    Ok(())
}

#[rstest]
fn failures_are_recorded_on_the_command_span() {
    let dir = temp_dir();
    let command = parquet_command(dir.path().join("missing.parquet"), "features", None);
    let (result, layer) = RecordingLayer::capture(|| run_command(command));
    assert!(matches!(result, Err(CliError::Dense(_))));

    let parquet = layer
        .span("cli.run_parquet")
        .expect("cli.run_parquet span must exist");
    assert!(
        parquet
            .field("path")
            .is_some_and(|value| value.ends_with("missing.parquet"))
    );
    assert!(
        layer
            .events_at(Level::ERROR)
            .iter()
            .any(|event| event.span.as_deref() == Some("cli.execute"))
    );
}

#[rstest]
fn core_errors_convert_into_cli_errors() {
    let err = CliError::from(HdbscanError::InvalidSamples { got: 0 });
    assert_eq!(err.code(), "HDBSTAR_INVALID_SAMPLES");
    assert_eq!(err.to_string(), "samples must be at least 1 (got 0)");
}
