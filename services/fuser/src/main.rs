//! Snapshot fusion service.
//!
//! Makes the latest reanalysis and forecast snapshots available under a
//! target folder, fuses them into one NetCDF file in `processed/`, and
//! optionally writes the TOA radiation reference field next to it.
//! `fuser inspect <file>` prints the structure of a NetCDF file instead.

mod config;
mod inspect;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use fusion_common::parse_utc_timestamp;
use ingestion::{write_reference_field, FusionPipeline, NetCdfStore, SourceKind};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use config::FuserConfig;

/// Subdirectory of the target folder that receives fused output.
const PROCESSED_DIR: &str = "processed";

#[derive(Parser, Debug)]
#[command(name = "fuser")]
#[command(about = "Fuse the latest reanalysis and forecast snapshots")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Root folder holding one subdirectory per source
    #[arg(short, long, env = "FUSER_TARGET_FOLDER", default_value = "./data")]
    target_folder: PathBuf,

    /// Configuration file path (YAML)
    #[arg(short, long, env = "FUSER_CONFIG")]
    config: Option<PathBuf>,

    /// Use the files already present instead of retrieving
    #[arg(long)]
    skip_retrieval: bool,

    /// Also write the TOA radiation field for the window ending at this
    /// RFC 3339 time
    #[arg(long)]
    toa_time: Option<String>,

    /// Integration window of the TOA radiation field, in hours
    #[arg(long, default_value_t = 1.0)]
    toa_hours: f64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print dimensions, variables and coordinates of a NetCDF file
    Inspect {
        /// Path to a NetCDF file
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let result = match &args.command {
        Some(Command::Inspect { file }) => inspect::inspect(file),
        None => run(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Fuser failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    info!(target_folder = %args.target_folder.display(), "Starting snapshot fuser");

    let config = FuserConfig::load(args.config.as_deref())?;
    info!(
        convention = %config.pipeline.target_convention,
        variables = ?config.pipeline.reanalysis_single_variables,
        "Loaded configuration"
    );

    // Parse up front so a bad flag fails before any work is done
    let toa_time = args
        .toa_time
        .as_deref()
        .map(parse_utc_timestamp)
        .transpose()
        .context("Invalid --toa-time")?;

    let output_dir = args.target_folder.join(PROCESSED_DIR);
    let store = NetCdfStore;

    // The reference field does not depend on the fused output
    let fused = fuse(args, &config, &store, &output_dir);
    let reference = match toa_time {
        Some(end_time) => write_reference(&store, &output_dir, end_time, args.toa_hours, &config),
        None => Ok(()),
    };

    match (fused, reference) {
        (Err(fused), Err(reference)) => {
            error!(error = %format!("{:#}", reference), "Reference field failed");
            Err(fused)
        }
        (fused, reference) => fused.and(reference),
    }
}

/// Retrieve the sources and run the fusion pipeline.
fn fuse(args: &Args, config: &FuserConfig, store: &NetCdfStore, output_dir: &Path) -> Result<()> {
    retrieve_sources(&args.target_folder, config, args.skip_retrieval)?;

    let pipeline = FusionPipeline::new(
        SourceKind::Reanalysis.directory(&args.target_folder),
        SourceKind::Forecast.directory(&args.target_folder),
        output_dir,
        config.pipeline.clone(),
    );

    match pipeline.run(store, Utc::now()) {
        Ok(path) => {
            info!(path = %path.display(), "Fusion complete");
            Ok(())
        }
        Err(e) => {
            error!(
                state = %e.state,
                kind = e.kind(),
                error = %e.error,
                "Fusion failed"
            );
            Err(e.into())
        }
    }
}

/// Prepare each source directory and, unless skipped, retrieve its latest
/// snapshot.
fn retrieve_sources(root: &Path, config: &FuserConfig, skip: bool) -> Result<()> {
    for kind in SourceKind::ALL {
        let dir = kind.directory(root);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        if skip {
            info!(source = %kind, "Skipping retrieval");
            continue;
        }

        let retriever = kind.retriever(config.pipeline.extension());
        let snapshot = retriever
            .retrieve_latest(&dir)
            .with_context(|| format!("Retrieval failed for {}", kind))?;
        info!(source = %kind, snapshot = %snapshot, "Retrieved latest snapshot");
    }
    Ok(())
}

fn write_reference(
    store: &NetCdfStore,
    output_dir: &Path,
    end_time: DateTime<Utc>,
    hours: f64,
    config: &FuserConfig,
) -> Result<()> {
    let path = write_reference_field(
        store,
        output_dir,
        end_time,
        hours,
        &config.reference.grid_spec(),
        config.pipeline.extension(),
    )
    .context("Failed to write reference field")?;
    info!(path = %path.display(), "Reference field complete");
    Ok(())
}
