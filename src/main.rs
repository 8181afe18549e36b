//! hdfs-usage - Per-entry disk usage export for HDFS namespaces
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use hdfs_usage::config::{CliArgs, WalkConfig};
use hdfs_usage::export::Exporter;
use hdfs_usage::hdfs;
use hdfs_usage::progress::{print_header, print_summary, ProgressReporter};
use hdfs_usage::report::CsvSink;
use hdfs_usage::walker::LevelWalker;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = WalkConfig::from_args(args).context("Invalid configuration")?;
    debug!(
        roots = ?config.roots,
        output = %config.output,
        append = config.append,
        options = ?config.options,
        namenode = ?config.client.namenode,
        "Parsed arguments"
    );

    let client = hdfs::connect(&config.client).context("Unable to create HDFS client")?;

    // Opened only once the cluster is reachable, so a failed connect
    // leaves an existing report untouched
    let mut sink = CsvSink::open(&config.output, config.append)
        .with_context(|| format!("Unable to open output {}", config.output))?;

    if config.show_progress {
        print_header(
            &client.describe(),
            &config.roots,
            &config.output.to_string(),
        );
    }

    let mut exporter = Exporter::new(LevelWalker::new(client), config.options.clone());
    if config.show_progress {
        exporter = exporter.with_progress(ProgressReporter::new());
    }

    // Setup signal handler for graceful shutdown
    let shutdown_flag = exporter.shutdown_flag();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    let summary = exporter
        .run(&config.roots, &mut sink)
        .context("Export failed")?;
    sink.finish().context("Failed to flush output")?;

    if config.show_progress {
        print_summary(&summary, &config.output.to_string());
    }

    if summary.interrupted {
        info!("Walk was interrupted before completion");
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("hdfs_usage=debug,warn")
    } else {
        EnvFilter::new("hdfs_usage=info,warn")
    };

    // stdout may carry the CSV
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
