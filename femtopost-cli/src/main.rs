//! femtopost CLI
//!
//! Applies the configured selections to a partitioned dataset and writes
//! the merged histograms.
#![allow(clippy::uninlined_format_args)]

use clap::Parser;
use femtopost_config::{load_schema, CutSet};
use femtopost_io::{DatasetSource, HistogramSink, JsonDataset, JsonHistogramSink};
use femtopost_selection::{Pipeline, PipelineConfig, SelectionCuts, TripletPolicy};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] femtopost_io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] femtopost_config::Error),

    #[error("Selection error: {0}")]
    Selection(#[from] femtopost_selection::Error),

    #[error("unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// On-disk format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    #[cfg(feature = "hdf5")]
    Hdf5,
}

impl Format {
    fn detect(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            #[cfg(feature = "hdf5")]
            Some("h5" | "hdf5") => Ok(Self::Hdf5),
            _ => Err(CliError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Femtoscopy selection and histogram aggregation.
#[derive(Parser)]
#[command(name = "femtopost")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input dataset (.json, or .h5/.hdf5 with HDF5 support)
    input: PathBuf,

    /// Output histogram file
    output: PathBuf,

    /// Histogram binning configuration (JSON)
    hist_config: PathBuf,

    /// Selection cut configuration (JSON)
    cut_config: PathBuf,

    /// Log per-partition progress
    #[arg(short, long)]
    verbose: bool,

    /// Process partitions one at a time
    #[arg(long)]
    sequential: bool,

    /// Fail on malformed V0 triplets instead of truncating the partition
    #[arg(long)]
    strict_triplets: bool,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            parallel: !self.sequential,
            triplet_policy: if self.strict_triplets {
                TripletPolicy::Strict
            } else {
                TripletPolicy::Lenient
            },
        }
    }
}

fn open_source(path: &Path) -> Result<Box<dyn DatasetSource>> {
    Ok(match Format::detect(path)? {
        Format::Json => Box::new(JsonDataset::open(path)?),
        #[cfg(feature = "hdf5")]
        Format::Hdf5 => Box::new(femtopost_io::Hdf5Dataset::open(path)?),
    })
}

fn create_sink(path: &Path, format: Format) -> Result<Box<dyn HistogramSink>> {
    Ok(match format {
        Format::Json => Box::new(JsonHistogramSink::create(path)?),
        #[cfg(feature = "hdf5")]
        Format::Hdf5 => Box::new(femtopost_io::Hdf5HistogramSink::create(path)?),
    })
}

fn run(cli: &Cli) -> Result<()> {
    let start = Instant::now();

    // Configuration is validated before any row is read
    let schema = load_schema(&cli.hist_config)?;
    let cut_set = CutSet::from_file(&cli.cut_config)?;
    let cuts = SelectionCuts::from_cut_set(&cut_set)?;
    let pipeline = Pipeline::new(cuts, schema, cli.pipeline_config());
    log::debug!("pipeline options: {:?}", pipeline.config());

    let output_format = Format::detect(&cli.output)?;
    let source = open_source(&cli.input)?;
    let names = source.partition_names()?;
    log::info!("{}: {} partitions", cli.input.display(), names.len());

    let output = pipeline.run_with(&names, |name| {
        source.load_partition(name).map_err(CliError::from)
    })?;

    // The output file is only touched once the run has succeeded
    create_sink(&cli.output, output_format)?.write(&output.histograms)?;

    println!("{}", output.summary);
    println!(
        "Wrote {} in {:.2}s",
        cli.output.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
