//! # CLI Module
//!
//! Command-line interface for the photo export reconciler.
//!
//! ## Usage
//! ```bash
//! # Export the last 35 days of a folder library
//! photo-export run --source ~/Pictures/Library --dest /Volumes/Archive/Photos
//!
//! # Everything, with a report for scripting
//! photo-export run --source ./library --dest ./export --all --output json
//!
//! # Verbose decision logging
//! photo-export run --source ./library --dest ./export --verbose
//! ```

use chrono::{Duration as DateDuration, Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_export::core::library::FolderLibrary;
use photo_export::core::pipeline::{Pipeline, PipelineResult};
use photo_export::core::timestamp::RetryPolicy;
use photo_export::error::{PhotoExportError, Result};
use photo_export::events::{Event, EventChannel, PhotoEvent, PipelineEvent, VariantEvent};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// Photo Export - copy a photo library into a dated tree, once
#[derive(Parser, Debug)]
#[command(name = "photo-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export new photos from a library folder into the export tree
    Run {
        /// Library folder to read photos from
        #[arg(short, long)]
        source: PathBuf,

        /// Root of the <year>/<month> export tree
        #[arg(short, long)]
        dest: PathBuf,

        /// Only process photos captured within this many days
        #[arg(long, default_value = "35")]
        overlap_days: u32,

        /// Process the whole library regardless of capture date
        #[arg(long, conflicts_with = "overlap_days")]
        all: bool,

        /// How many times to look for an exported file before giving up
        #[arg(long, default_value = "5")]
        retry_attempts: u32,

        /// Pause between those looks, in milliseconds
        #[arg(long, default_value = "1000")]
        retry_interval_ms: u64,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Log every decision
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Options for one export run
struct RunOptions {
    source: PathBuf,
    dest: PathBuf,
    since: Option<NaiveDate>,
    retry: RetryPolicy,
    output: OutputFormat,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            dest,
            overlap_days,
            all,
            retry_attempts,
            retry_interval_ms,
            output,
            verbose,
        } => {
            photo_export::init_tracing(if verbose {
                "photo_export=debug"
            } else {
                "photo_export=warn"
            });

            let since = (!all)
                .then(|| Local::now().date_naive() - DateDuration::days(i64::from(overlap_days)));

            run_export(RunOptions {
                source,
                dest,
                since,
                retry: RetryPolicy::new(retry_attempts, Duration::from_millis(retry_interval_ms)),
                output,
            })
        }
    }
}

fn run_export(options: RunOptions) -> Result<()> {
    let term = Term::stderr();
    let pretty = matches!(options.output, OutputFormat::Pretty);

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Photo Export").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        if let Some(since) = options.since {
            term.write_line(&format!("Processing photos captured since {}", since))
                .ok();
        }
        term.write_line("").ok();
    }

    let pipeline = Pipeline::builder()
        .export_root(options.dest.clone())
        .since(options.since)
        .retry_policy(options.retry)
        .build()?;
    let library = FolderLibrary::new(options.source.clone());

    let (sender, receiver) = EventChannel::new();

    let progress = pretty.then(|| {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        pb
    });

    let progress_clone = progress.clone();

    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::Started { total_photos }) => {
                    pb.set_length(total_photos as u64);
                }
                Event::Photo(PhotoEvent::Started { index, filename, .. }) => {
                    pb.set_position(index.saturating_sub(1) as u64);
                    pb.set_message(filename);
                }
                Event::Photo(PhotoEvent::Failed { filename, message }) => {
                    pb.println(format!("{} {}: {}", style("✗").red(), filename, message));
                }
                Event::Variant(VariantEvent::Unresolved { path, .. }) => {
                    pb.println(format!(
                        "{} {} differs from the photo, left for review",
                        style("?").yellow(),
                        path.display()
                    ));
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&library, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let result = result?;

    match options.output {
        OutputFormat::Pretty => print_pretty_results(&term, &result),
        OutputFormat::Json => print_json_results(&result)?,
    }

    Ok(())
}

fn print_pretty_results(term: &Term, result: &PipelineResult) {
    term.write_line(&format!(
        "{} {} photos reconciled in {:.1}s",
        style("✓").green().bold(),
        style(result.total_photos).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line("").ok();

    // The report goes to stdout so it can be captured
    print!("{}", result.report);

    if !result.errors.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!(
            "{}",
            style("Photos that could not be exported:").bold().red()
        ))
        .ok();
        for error in &result.errors {
            term.write_line(&format!("  {}", error)).ok();
        }
    }
}

fn print_json_results(result: &PipelineResult) -> Result<()> {
    let output = serde_json::json!({
        "total_photos": result.total_photos,
        "duration_ms": result.duration_ms,
        "report": result.report,
        "errors": result.errors,
    });

    let rendered = serde_json::to_string_pretty(&output)
        .map_err(|e| PhotoExportError::Config(format!("Failed to render report: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}
