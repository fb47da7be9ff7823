use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use std::process::ExitCode;
use transpile_parity::cli::{self, OutputFormat};
use transpile_parity::logging::{self, Verbosity};
use transpile_parity::matrix::TypeMatrix;
use transpile_parity::output::{write_report, OutputFormatter};
use transpile_parity::runner;

fn main() -> ExitCode {
    let args = cli::Args::parse();
    logging::init(Verbosity::from_flags(args.verbose, args.quiet));

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether the run passed.
fn run(args: &cli::Args) -> Result<bool> {
    args.validate().context("Invalid arguments")?;
    let config = args.resolve_config()?;
    let matrix = TypeMatrix::default();
    let suites =
        runner::load_configured_suites(&config, &matrix).context("Cannot load suites")?;
    let filter = args.filter.as_deref();

    if args.list {
        let ids = runner::list_cases(&suites, &matrix, filter);
        let mut listing = ids.join("\n");
        listing.push('\n');
        emit(args, &listing)?;
        return Ok(true);
    }

    let report = runner::run(&config, &matrix, &suites, filter).context("Parity run aborted")?;
    let rendered =
        OutputFormatter::format(&report, args.format, config.fail_on_unexpected_success)?;
    emit(args, &rendered)?;

    if args.format == OutputFormat::Json && args.output_file.is_some() && !args.quiet {
        eprintln!(
            "{} cases: {} passed, {} failed, {} expected failures, {} unexpected successes",
            report.summary.total,
            report.summary.passed,
            report.summary.failed,
            report.summary.expected_failures,
            report.summary.unexpected_successes
        );
    }
    Ok(report.is_success(config.fail_on_unexpected_success))
}

fn emit(args: &cli::Args, rendered: &str) -> Result<()> {
    match args.output_file {
        Some(ref path) => write_report(path, rendered)
            .with_context(|| format!("Cannot write output: {}", path.display())),
        None => {
            print!("{rendered}");
            Ok(())
        }
    }
}
