//! Quicklook Extraction Tool
//!
//! Extracts labeled transit (and transit-free) segments from a set of light
//! curves, using an IPAC catalog of injected transit parameters.
//!
//! ## Output Format
//!
//! For every input `<root>.<ext>` with a catalog entry:
//!
//! - `<root>_quicklook.ecsv`: padded transit window, labeled
//! - `<root>_quicklook_negative.ecsv`: disjoint window, all labels zero
//!   (not produced for eclipsing-binary injections)
//!
//! # Usage
//!
//! ```bash
//! # Randomized padding, negatives on
//! cargo run --release --features cli --bin quicklook -- \
//!     --catalog injections.ipac --output-dir quicklook/ data/*.csv
//!
//! # Reproducible run from a config file
//! cargo run --release --features cli --bin quicklook -- \
//!     --catalog injections.ipac --config quicklook.toml --seed 42 data/*.csv
//!
//! # Generate sample config
//! cargo run --release --features cli --bin quicklook -- --generate-config quicklook.toml
//! ```

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use transit_extractor::batch::{BatchConfig, BatchProcessor, LoggingProgress};
use transit_extractor::{
    CsvLightCurveLoader, ExtractionConfig, PipelineBuilder, SegmentWriter, TargetCatalog,
};

/// Command line arguments for quicklook extraction
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Extract labeled transit segments from light curves"
)]
struct Args {
    /// IPAC table with KIC_ID, i_epoch, i_period, i_dur and EB_injection columns
    #[arg(long, required_unless_present = "generate_config")]
    catalog: Option<PathBuf>,

    /// Extraction configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for ECSV outputs
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Worker threads (0 = one per core)
    #[arg(short = 'j', long, default_value_t = 0)]
    threads: usize,

    /// Seed for reproducible padding and negative sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Use fixed six-hour padding instead of randomized padding
    #[arg(long)]
    fixed_tolerance: bool,

    /// Skip negative segments
    #[arg(long)]
    no_negatives: bool,

    /// Flux column to read
    #[arg(long, default_value = "SAP_FLUX")]
    flux_column: String,

    /// Log input validation findings
    #[arg(long)]
    validate: bool,

    /// Write a sample configuration to this path and exit
    #[arg(long)]
    generate_config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Light-curve files
    #[arg(required_unless_present = "generate_config")]
    files: Vec<PathBuf>,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Some(path) = &args.generate_config {
        generate_sample_config(path);
        return;
    }

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> transit_extractor::Result<()> {
    let config = match &args.config {
        Some(path) => ExtractionConfig::load_toml(path)?,
        None => ExtractionConfig::default(),
    };

    let mut builder = PipelineBuilder::from_config(config);
    if args.fixed_tolerance {
        builder = builder.tolerance(transit_extractor::TolerancePolicy::fixed_default());
    }
    if args.no_negatives {
        builder = builder.without_negatives();
    }
    log::info!("{}", builder.summary());
    let pipeline = builder.build()?;

    let catalog = match &args.catalog {
        Some(path) => TargetCatalog::load_ipac(path)?,
        None => TargetCatalog::new(),
    };

    let mut batch_config = BatchConfig::new()
        .with_threads(args.threads)
        .with_validation(args.validate);
    if let Some(seed) = args.seed {
        batch_config = batch_config.with_seed(seed);
    }

    let loader = CsvLightCurveLoader::new().with_flux_column(args.flux_column.clone());
    let progress = if args.verbose {
        LoggingProgress::new().verbose()
    } else {
        LoggingProgress::new()
    };

    let processor = BatchProcessor::new(pipeline, Arc::new(catalog), loader, batch_config)
        .with_writer(SegmentWriter::new(&args.output_dir))
        .with_progress_callback(Box::new(progress));

    let output = processor.process_files(&args.files)?;

    let written: usize = output.iter().map(|r| r.written.len()).sum();
    log::info!(
        "Wrote {} files to {} ({} of {} inputs extracted)",
        written,
        args.output_dir.display(),
        output.successful_count(),
        args.files.len()
    );
    Ok(())
}

fn generate_sample_config(path: &Path) {
    let config = ExtractionConfig::default();
    match config.save_toml(path) {
        Ok(()) => log::info!("Sample configuration written to {}", path.display()),
        Err(e) => {
            log::error!("Failed to write {}: {}", path.display(), e);
            process::exit(1);
        }
    }
}
