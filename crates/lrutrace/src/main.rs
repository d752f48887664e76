//! lrutrace - replay get/put traces against lrucache and check the outputs

mod report;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use lrucache::trace::{replay_with_capacity, Trace};
use tracing::{info, warn};

use crate::report::Report;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Trace file to replay (defaults to the built-in reference trace)
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Cache capacity (overrides the trace's `capacity` line)
    #[arg(short, long)]
    capacity: Option<usize>,

    /// Print the report as JSON
    #[arg(long, conflicts_with = "legacy")]
    json: bool,

    /// Print only the outcomes, space-separated, in the original driver format
    #[arg(long)]
    legacy: bool,
}

fn main() -> Result<ExitCode> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let (source, trace) = load_trace(args.trace.as_deref())?;
    let capacity = args.capacity.unwrap_or(trace.capacity);

    info!("Replaying {} ({} steps)", source, trace.steps.len());
    info!("Cache capacity: {}", capacity);

    let run = replay_with_capacity(&trace, capacity)
        .with_context(|| format!("cannot replay {} with capacity {}", source, capacity))?;

    for mismatch in &run.mismatches {
        warn!("{}", mismatch);
    }

    if args.legacy {
        println!("{}", run.legacy_transcript());
    } else {
        let report = Report::new(source, &trace, &run);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{}", report);
        }
    }

    if run.is_success() {
        info!("All {} checked steps matched", trace.checked_steps());
        Ok(ExitCode::SUCCESS)
    } else {
        warn!("{} of {} checked steps failed", run.mismatches.len(), trace.checked_steps());
        Ok(ExitCode::FAILURE)
    }
}

/// Read and parse a trace file, or fall back to the reference trace
fn load_trace(path: Option<&Path>) -> Result<(String, Trace)> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read trace {}", path.display()))?;
            let trace = Trace::parse(&text)
                .with_context(|| format!("invalid trace {}", path.display()))?;
            Ok((path.display().to_string(), trace))
        }
        None => Ok(("<reference>".to_string(), Trace::reference())),
    }
}
