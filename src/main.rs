//! disk-walker - Concurrent Filesystem Inventory
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use disk_walker::config::{CliArgs, WalkConfig};
use disk_walker::progress::{print_header, print_summary, ProgressReporter};
use disk_walker::report::ReportGenerator;
use disk_walker::walker::WalkCoordinator;
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // clap exits with status 2 on usage errors; a usage error here is exit 1
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            // --help / --version render on stdout and succeed
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<ExitCode> {
    setup_logging(args.verbose);

    let config = WalkConfig::from_args(args).context("Invalid configuration")?;

    for flag in &config.unknown_flags {
        warn!(flag = %flag, "Unknown report flag");
    }

    if config.show_progress {
        print_header(
            &config.root,
            config.worker_count,
            &config.output_path.display().to_string(),
        );
    }

    let coordinator = WalkCoordinator::new(config.clone())?;

    let result = if config.show_progress {
        let reporter = ProgressReporter::new();
        reporter.set_status("Scanning...");
        let updater = reporter.clone();
        let result = coordinator.run_with_progress(move |progress| updater.update(&progress));
        reporter.finish_and_clear();
        result
    } else {
        coordinator.run()
    };
    drop(coordinator);

    if config.show_progress {
        print_summary(&result);
    }

    // Scan failures and unparseable report flags surface in the exit status
    // even though the traversal and the remaining reports ran to completion.
    let mut failed = result.errors > 0 || !config.unknown_flags.is_empty();

    let generator = ReportGenerator::new(&result.completed, &config.root);
    for request in &config.reports {
        if let Err(e) = generator.run(request, &config.output_path) {
            error!(error = %e, "Report failed");
            eprintln!("Error: {e}");
            failed = true;
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("disk_walker=info,warn")
    } else {
        EnvFilter::new("disk_walker=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
