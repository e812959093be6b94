//! CLI entry point for hdbstar.
//!
//! Parses command-line arguments with clap, clusters the requested source,
//! renders the summary to stdout, and maps errors to the exit code. Logging
//! is initialised first so every later step can emit structured diagnostics
//! via `tracing`.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use hdbstar_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging::{self, LoggingError},
};
use tracing::{error, field};

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }
    try_main()
}

/// Runs the command and reports any failure with its stable code.
fn try_main() -> ExitCode {
    let Err(err) = execute() else {
        return ExitCode::SUCCESS;
    };

    let cli_error = err.downcast_ref::<CliError>();
    let code_field = cli_error.map(|cli_error| field::display(cli_error.code()));
    let vector_source_code_field = cli_error
        .and_then(|cli_error| match cli_error {
            CliError::Core(core) => core.vector_source_code(),
            CliError::Dense(_) => None,
        })
        .map(|code| field::display(code.as_str()));

    error!(
        error = %err,
        cause = %err.root_cause(),
        code = code_field,
        vector_source_code = vector_source_code_field,
        "command execution failed"
    );
    ExitCode::FAILURE
}

/// Parses arguments, executes the command, renders the summary and flushes
/// the output stream.
fn execute() -> Result<()> {
    let cli = Cli::parse();
    let summary = run_cli(cli).context("failed to execute command")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_summary(&summary, &mut writer).context("failed to render summary")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialized"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}
