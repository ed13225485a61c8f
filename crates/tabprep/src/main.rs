//! CLI entry point for the data preparation pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use std::path::PathBuf;
use tabprep::{Pipeline, PipelineConfig, RunSummary};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Prepare a CSV table as NumPy feature/target arrays",
    long_about = "Loads a CSV file, removes empty and duplicate rows, drops identifier-like\n\
                  columns, splits off the last column as the target and writes\n\
                  x_data.npy and y_data.npy.\n\n\
                  EXAMPLES:\n  \
                  tabprep data.csv\n  \
                  tabprep data.csv -o arrays --create-output-dir\n  \
                  tabprep data.csv --json | jq .features_shape"
)]
struct Args {
    /// Path to the CSV file to process
    input: PathBuf,

    /// Directory for x_data.npy and y_data.npy
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Create the output directory if it does not exist
    #[arg(long)]
    create_output_dir: bool,

    /// Drop every column when the cleaned table has no rows
    ///
    /// By default an empty table keeps its columns, since the all-unique
    /// test is trivially true for every column of a zero-row table.
    #[arg(long)]
    select_on_empty_table: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Print the run summary as JSON instead of human-readable text
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// With `--json` no subscriber is installed, so stdout only carries JSON.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = PipelineConfig::builder()
        .output_dir(&args.output_dir)
        .create_output_dir(args.create_output_dir)
        .select_on_empty_table(args.select_on_empty_table)
        .build()?;

    let mut builder = Pipeline::builder().config(config);
    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let pipeline = builder.build()?;

    if !args.json {
        info!("{}", "=".repeat(50));
        info!("Starting data preparation pipeline");
        info!("{}", "=".repeat(50));
    }

    let ctx = match pipeline.process(&args.input) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            }
            return Err(anyhow!("Pipeline failed: {}", e));
        }
    };

    let summary = ctx.summary();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_human_readable_summary(&summary);
    }

    Ok(())
}

/// Print a human-readable summary of the run.
///
/// Uses `println!` rather than logging so the summary shows regardless of
/// log level.
fn print_human_readable_summary(summary: &RunSummary) {
    println!();
    println!("{}", "=".repeat(50));
    println!("PREPARATION COMPLETE");
    println!("{}", "=".repeat(50));

    if let Some(ref input) = summary.input_path {
        println!("Input:  {}", input.display());
    }
    if let Some((rows, cols)) = summary.original_shape {
        println!("Loaded: {} rows x {} columns", rows, cols);
    }
    if let Some((rows, cols)) = summary.cleaned_shape {
        println!(
            "Cleaned: {} rows x {} columns ({} empty, {} duplicate rows removed)",
            rows, cols, summary.empty_rows_removed, summary.duplicate_rows_removed
        );
    }

    if summary.dropped_columns.is_empty() {
        println!("Dropped columns: none");
    } else {
        println!("Dropped columns: {}", summary.dropped_columns.join(", "));
    }

    if let Some(ref target) = summary.target_column {
        println!("Target column: {}", target);
    }
    if let (Some((rows, cols)), Some(kind)) = (summary.features_shape, summary.features_kind) {
        println!("X: ({}, {}) {:?}", rows, cols, kind);
    }
    if let (Some(len), Some(kind)) = (summary.target_len, summary.target_kind) {
        println!("y: ({},) {:?}", len, kind);
    }

    println!();
    println!("Output files:");
    for path in &summary.output_files {
        println!("  - {}", path.display());
    }
    println!("{}", "=".repeat(50));
}
