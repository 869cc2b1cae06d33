//! Parallel batch extraction over many light-curve files.
//!
//! Files are processed on a local rayon pool. The pipeline, catalog and
//! loader are shared read-only; every file owns its light curve, its random
//! generator and its results, so workers never contend on mutable state.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        BatchProcessor                            │
//! │   Arc<ExtractionPipeline>   Arc<TargetCatalog>   Arc<dyn Loader> │
//! │  ┌────────────────────────────────────────────────────────────┐  │
//! │  │                    Rayon Thread Pool                       │  │
//! │  │                                                            │  │
//! │  │  kplr…555.csv        kplr…812.csv        kplr…033.csv      │  │
//! │  │       │                   │                   │            │  │
//! │  │  id → target         id → target         id → target       │  │
//! │  │  load → extract      load → extract      load → extract    │  │
//! │  │       │                   │                   │            │  │
//! │  │       ▼                   ▼                   ▼            │  │
//! │  │  FileResult          FileError           FileResult        │  │
//! │  └────────────────────────────┬───────────────────────────────┘  │
//! │                               ▼                                  │
//! │                          BatchOutput                             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Reproducibility
//!
//! With [`BatchConfig::with_seed`], file `i` draws from
//! `StdRng::seed_from_u64(seed + i)`. Results depend only on the seed and
//! the file order, never on scheduling or thread count.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use transit_extractor::prelude::*;
//!
//! let catalog = Arc::new(TargetCatalog::load_ipac("injections.ipac")?);
//! let pipeline = PipelineBuilder::new().build()?;
//! let processor = BatchProcessor::new(
//!     pipeline,
//!     catalog,
//!     CsvLightCurveLoader::new(),
//!     BatchConfig::new().with_threads(8).with_seed(42),
//! )
//! .with_writer(SegmentWriter::new("quicklook/"));
//!
//! let output = processor.process_files(&files)?;
//! println!("{} positives, {} negatives", output.positive_count(), output.negative_count());
//! ```

use crate::catalog::{target_id_from_path, TargetCatalog};
use crate::error::{ExtractionError, Result};
use crate::export::SegmentWriter;
use crate::io::{CsvLightCurveLoader, LightCurveLoader};
use crate::pipeline::{Extraction, ExtractionPipeline};
use crate::validation::validate_light_curve;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ============================================================================
// Configuration
// ============================================================================

/// Error handling mode for batch processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Stop scheduling new files after the first failure and return it.
    FailFast,

    /// Log each failure, keep going, and report all failures at the end.
    #[default]
    CollectErrors,
}

/// Batch processing configuration.
#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    /// Worker threads; `None` uses the rayon default.
    pub num_threads: Option<usize>,

    pub error_mode: ErrorMode,

    /// Base seed for per-file generators; `None` uses the thread-local one.
    pub seed: Option<u64>,

    /// Run input validation and log its findings before extracting.
    pub validate_inputs: bool,
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker count. Zero keeps the rayon default.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = (threads > 0).then_some(threads);
        self
    }

    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Make the run reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate_inputs = validate;
        self
    }

    /// Configured threads or rayon's default.
    pub fn effective_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(rayon::current_num_threads)
    }
}

// ============================================================================
// Results
// ============================================================================

/// Successful extraction of one file.
#[derive(Debug)]
pub struct FileResult {
    pub file_path: String,

    pub target_id: u64,

    pub extraction: Extraction,

    /// Output files, when a writer is attached.
    pub written: Vec<PathBuf>,

    pub elapsed: Duration,

    /// Worker that processed the file (for debugging).
    pub thread_id: usize,
}

/// Failure record for one file.
#[derive(Debug, Clone)]
pub struct FileError {
    pub file_path: String,

    /// Identifier parsed from the file name, if parsing got that far.
    pub target_id: Option<u64>,

    /// Short error kind, see [`ExtractionError::kind`].
    pub kind: &'static str,

    pub error: String,
}

impl FileError {
    fn new(file_path: &str, target_id: Option<u64>, err: &ExtractionError) -> Self {
        Self {
            file_path: file_path.to_string(),
            target_id,
            kind: err.kind(),
            error: err.to_string(),
        }
    }
}

/// Aggregated results of a batch run, in input order.
#[derive(Debug, Default)]
pub struct BatchOutput {
    pub results: Vec<FileResult>,

    pub errors: Vec<FileError>,

    /// Wall-clock time of the whole run.
    pub elapsed: Duration,

    pub threads_used: usize,

    /// Files never started because a fail-fast run already failed.
    pub skipped_count: usize,
}

impl BatchOutput {
    pub fn successful_count(&self) -> usize {
        self.results.len()
    }

    pub fn failed_count(&self) -> usize {
        self.errors.len()
    }

    /// Positive segments produced (one per successful file).
    pub fn positive_count(&self) -> usize {
        self.results.len()
    }

    /// Negative segments produced.
    pub fn negative_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.extraction.negative_segment().is_some())
            .count()
    }

    /// Successful files whose negative sampling failed.
    pub fn negative_failures(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.extraction.negative.error().is_some())
            .count()
    }

    pub fn all_successful(&self) -> bool {
        self.errors.is_empty() && self.skipped_count == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileResult> {
        self.results.iter()
    }

    pub fn iter_errors(&self) -> impl Iterator<Item = &FileError> {
        self.errors.iter()
    }

    /// Failure counts per error kind, sorted by kind.
    pub fn error_kinds(&self) -> Vec<(&'static str, usize)> {
        let mut counts: Vec<(&'static str, usize)> = Vec::new();
        for err in &self.errors {
            match counts.iter_mut().find(|(kind, _)| *kind == err.kind) {
                Some((_, n)) => *n += 1,
                None => counts.push((err.kind, 1)),
            }
        }
        counts.sort_unstable_by_key(|(kind, _)| *kind);
        counts
    }
}

// ============================================================================
// Progress Reporting
// ============================================================================

/// Progress information for callbacks.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    pub current_file: String,

    /// Index of the current file (0-based).
    pub current_index: usize,

    pub total_files: usize,

    pub completed: usize,

    pub failed: usize,

    pub elapsed: Duration,
}

impl ProgressInfo {
    /// Completion percentage (0.0 to 100.0).
    pub fn percent_complete(&self) -> f64 {
        if self.total_files == 0 {
            100.0
        } else {
            (self.completed + self.failed) as f64 / self.total_files as f64 * 100.0
        }
    }

    /// Remaining time extrapolated from the average so far.
    pub fn estimated_remaining(&self) -> Option<Duration> {
        let done = self.completed + self.failed;
        if done == 0 {
            return None;
        }
        let remaining = self.total_files.saturating_sub(done);
        let avg_time = self.elapsed.as_secs_f64() / done as f64;
        Some(Duration::from_secs_f64(avg_time * remaining as f64))
    }
}

/// Progress hooks invoked from worker threads.
pub trait ProgressCallback: Send + Sync {
    /// Called when a file is about to be processed.
    fn on_progress(&self, info: &ProgressInfo);

    /// Called once when the batch completes.
    fn on_complete(&self, output: &BatchOutput);
}

/// Progress reporter that writes through the `log` facade.
#[derive(Debug, Default)]
pub struct LoggingProgress {
    /// Log every file at `info` instead of `debug`.
    pub verbose: bool,
}

impl LoggingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl ProgressCallback for LoggingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let level = if self.verbose {
            log::Level::Info
        } else {
            log::Level::Debug
        };
        log::log!(
            level,
            "[{:>4}/{:>4}] {} ({:.1}% complete)",
            info.current_index + 1,
            info.total_files,
            info.current_file,
            info.percent_complete()
        );
    }

    fn on_complete(&self, output: &BatchOutput) {
        log::info!(
            "Segments: {} positive, {} negative ({} negative sampling failures)",
            output.positive_count(),
            output.negative_count(),
            output.negative_failures()
        );
        for (kind, count) in output.error_kinds() {
            log::info!("  {:<24} {}", kind, count);
        }
    }
}

// ============================================================================
// Batch Processor
// ============================================================================

/// Parallel extraction driver.
pub struct BatchProcessor {
    pipeline: Arc<ExtractionPipeline>,

    catalog: Arc<TargetCatalog>,

    loader: Arc<dyn LightCurveLoader>,

    config: BatchConfig,

    writer: Option<SegmentWriter>,

    progress_callback: Option<Box<dyn ProgressCallback>>,
}

enum ProcessResult {
    Success(Box<FileResult>),
    Error(FileError, ExtractionError),
    Skipped,
}

impl BatchProcessor {
    pub fn new<L: LightCurveLoader + 'static>(
        pipeline: ExtractionPipeline,
        catalog: Arc<TargetCatalog>,
        loader: L,
        config: BatchConfig,
    ) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            catalog,
            loader: Arc::new(loader),
            config,
            writer: None,
            progress_callback: None,
        }
    }

    /// Write each file's segments from the worker that extracted them.
    pub fn with_writer(mut self, writer: SegmentWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn with_progress_callback(mut self, callback: Box<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn batch_config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &ExtractionPipeline {
        &self.pipeline
    }

    /// Process `files` in parallel.
    ///
    /// # Errors
    ///
    /// In `FailFast` mode, the first failing file's error (in input order).
    /// In `CollectErrors` mode failures are recorded in the output and this
    /// only fails if the thread pool cannot be built.
    pub fn process_files<P: AsRef<Path> + Sync>(&self, files: &[P]) -> Result<BatchOutput> {
        let start = Instant::now();
        let total_files = files.len();
        let threads_used = self.config.effective_threads();

        let completed = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);
        let abort = AtomicBool::new(false);

        // Local pool: build_global() only works once per process.
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads_used)
            .build()
            .map_err(|e| ExtractionError::InvalidConfig(format!("thread pool: {e}")))?;

        let results: Vec<ProcessResult> = pool.install(|| {
            files
                .par_iter()
                .enumerate()
                .map(|(index, file)| {
                    let file_path = file.as_ref().to_string_lossy().to_string();

                    if abort.load(Ordering::Relaxed) {
                        return ProcessResult::Skipped;
                    }

                    if let Some(ref callback) = self.progress_callback {
                        callback.on_progress(&ProgressInfo {
                            current_file: file_path.clone(),
                            current_index: index,
                            total_files,
                            completed: completed.load(Ordering::Relaxed),
                            failed: failed.load(Ordering::Relaxed),
                            elapsed: start.elapsed(),
                        });
                    }

                    match self.process_single_file(file.as_ref(), &file_path, index) {
                        Ok(result) => {
                            completed.fetch_add(1, Ordering::Relaxed);
                            ProcessResult::Success(Box::new(result))
                        }
                        Err((record, err)) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                            if self.config.error_mode == ErrorMode::FailFast {
                                abort.store(true, Ordering::Relaxed);
                            }
                            ProcessResult::Error(record, err)
                        }
                    }
                })
                .collect()
        });

        let mut output = BatchOutput {
            threads_used,
            ..Default::default()
        };
        for result in results {
            match result {
                ProcessResult::Success(file_result) => output.results.push(*file_result),
                ProcessResult::Error(record, err) => {
                    if self.config.error_mode == ErrorMode::FailFast {
                        log::error!("{}: {}", record.file_path, err);
                        return Err(err);
                    }
                    log::warn!("{}: [{}] {}", record.file_path, record.kind, record.error);
                    output.errors.push(record);
                }
                ProcessResult::Skipped => output.skipped_count += 1,
            }
        }
        output.elapsed = start.elapsed();

        log::info!(
            "Batch complete: {} extracted, {} failed, {} skipped in {:.2?} on {} threads",
            output.successful_count(),
            output.failed_count(),
            output.skipped_count,
            output.elapsed,
            threads_used
        );

        if let Some(ref callback) = self.progress_callback {
            callback.on_complete(&output);
        }

        Ok(output)
    }

    /// Identify, load, extract and optionally write one file.
    fn process_single_file(
        &self,
        path: &Path,
        file_path: &str,
        index: usize,
    ) -> std::result::Result<FileResult, (FileError, ExtractionError)> {
        let start = Instant::now();
        let fail = |target_id: Option<u64>, err: ExtractionError| {
            (FileError::new(file_path, target_id, &err), err)
        };

        let target_id = target_id_from_path(path).map_err(|e| fail(None, e))?;
        let target = self.catalog.get(target_id).map_err(|e| fail(Some(target_id), e))?;
        let light_curve = self.loader.load(path).map_err(|e| fail(Some(target_id), e))?;

        if self.config.validate_inputs {
            let report = validate_light_curve(&light_curve);
            for warning in report.warnings().iter().chain(report.errors().iter()) {
                log::warn!("{}: {}", file_path, warning);
            }
        }

        let extraction = match self.config.seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(index as u64));
                self.pipeline.extract_with_rng(&light_curve, target, &mut rng)
            }
            None => self
                .pipeline
                .extract_with_rng(&light_curve, target, &mut rand::thread_rng()),
        }
        .map_err(|e| fail(Some(target_id), e))?;

        let written = match &self.writer {
            Some(writer) => writer
                .write_extraction(path, &extraction)
                .map_err(|e| fail(Some(target_id), e))?,
            None => Vec::new(),
        };

        Ok(FileResult {
            file_path: file_path.to_string(),
            target_id,
            extraction,
            written,
            elapsed: start.elapsed(),
            thread_id: rayon::current_thread_index().unwrap_or(0),
        })
    }
}

// ============================================================================
// Convenience Functions
// ============================================================================

/// Process CSV light curves with default batch settings.
pub fn process_files_parallel<P: AsRef<Path> + Sync>(
    pipeline: ExtractionPipeline,
    catalog: Arc<TargetCatalog>,
    files: &[P],
) -> Result<BatchOutput> {
    BatchProcessor::new(pipeline, catalog, CsvLightCurveLoader::new(), BatchConfig::new())
        .process_files(files)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TargetEvent;
    use crate::config::ExtractionConfig;
    use std::fmt::Write as _;
    use std::fs;
    use tempfile::TempDir;

    fn write_light_curve(dir: &TempDir, id: u64) -> PathBuf {
        let mut text = String::from("# OBJECT = 'KIC test'\nTIME,SAP_FLUX\n");
        for i in 0..4000 {
            let t = 105.0 + i as f64 * 0.0204;
            writeln!(text, "{t},{}", 1000.0 + (i % 7) as f64).unwrap();
        }
        let path = dir
            .path()
            .join(format!("kplr{id:09}-2009166043257_llc.csv"));
        fs::write(&path, text).unwrap();
        path
    }

    fn catalog() -> Arc<TargetCatalog> {
        let mut catalog = TargetCatalog::new();
        catalog.insert(TargetEvent::new(1, 100.0, 10.0, 0.5, false).unwrap());
        catalog.insert(TargetEvent::new(2, 100.0, 10.0, 0.5, true).unwrap());
        Arc::new(catalog)
    }

    fn processor(config: BatchConfig) -> BatchProcessor {
        let pipeline = ExtractionPipeline::new(ExtractionConfig::default()).unwrap();
        BatchProcessor::new(pipeline, catalog(), CsvLightCurveLoader::new(), config)
    }

    #[test]
    fn test_batch_config_defaults() {
        let config = BatchConfig::default();
        assert!(config.num_threads.is_none());
        assert_eq!(config.error_mode, ErrorMode::CollectErrors);
        assert!(config.seed.is_none());
        assert!(!config.validate_inputs);
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new()
            .with_threads(4)
            .with_error_mode(ErrorMode::FailFast)
            .with_seed(7)
            .with_validation(true);
        assert_eq!(config.num_threads, Some(4));
        assert_eq!(config.effective_threads(), 4);
        assert_eq!(config.error_mode, ErrorMode::FailFast);
        assert_eq!(config.seed, Some(7));

        assert!(BatchConfig::new().with_threads(0).num_threads.is_none());
    }

    #[test]
    fn test_progress_info_percent() {
        let info = ProgressInfo {
            current_file: "a.csv".to_string(),
            current_index: 3,
            total_files: 10,
            completed: 4,
            failed: 1,
            elapsed: Duration::from_secs(10),
        };
        assert!((info.percent_complete() - 50.0).abs() < 1e-9);
        assert_eq!(info.estimated_remaining(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_collect_errors_keeps_order() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            write_light_curve(&dir, 1),
            write_light_curve(&dir, 99),
            dir.path().join("short.csv"),
            write_light_curve(&dir, 2),
        ];

        let output = processor(BatchConfig::new().with_threads(2).with_seed(3))
            .process_files(&files)
            .unwrap();

        assert_eq!(output.successful_count(), 2);
        assert_eq!(output.results[0].target_id, 1);
        assert_eq!(output.results[1].target_id, 2);
        assert_eq!(output.failed_count(), 2);
        assert_eq!(output.errors[0].kind, "TargetNotFound");
        assert_eq!(output.errors[0].target_id, Some(99));
        assert_eq!(output.errors[1].kind, "InvalidFileName");
        assert!(!output.all_successful());

        // EB target produces no negative
        assert!(output.results[1].extraction.negative_segment().is_none());
        assert_eq!(
            output.error_kinds(),
            vec![("InvalidFileName", 1), ("TargetNotFound", 1)]
        );
    }

    #[test]
    fn test_fail_fast_returns_error() {
        let dir = TempDir::new().unwrap();
        let files = vec![write_light_curve(&dir, 42)];
        let err = processor(BatchConfig::new().with_error_mode(ErrorMode::FailFast))
            .process_files(&files)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::TargetNotFound { id: 42 }));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let dir = TempDir::new().unwrap();
        let files = vec![write_light_curve(&dir, 1), write_light_curve(&dir, 1)];

        let a = processor(BatchConfig::new().with_threads(1).with_seed(11))
            .process_files(&files)
            .unwrap();
        let b = processor(BatchConfig::new().with_threads(4).with_seed(11))
            .process_files(&files)
            .unwrap();

        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.extraction.transit, y.extraction.transit);
            assert_eq!(x.extraction.positive, y.extraction.positive);
        }
    }

    #[test]
    fn test_writer_outputs() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let files = vec![write_light_curve(&dir, 1)];

        let output = processor(BatchConfig::new().with_seed(5).with_validation(true))
            .with_writer(SegmentWriter::new(&out))
            .process_files(&files)
            .unwrap();

        let written = &output.results[0].written;
        assert!(written[0].ends_with("kplr000000001-2009166043257_llc_quicklook.ecsv"));
        assert!(written.iter().all(|p| p.exists()));
        assert_eq!(written.len(), 1 + output.negative_count());
    }

    #[test]
    fn test_write_failure_leaves_no_partial_output() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let files = vec![write_light_curve(&dir, 1)];
        fs::create_dir_all(out.join("kplr000000001-2009166043257_llc_quicklook_negative.ecsv"))
            .unwrap();

        let output = processor(BatchConfig::new().with_seed(5))
            .with_writer(SegmentWriter::new(&out))
            .process_files(&files)
            .unwrap();

        assert_eq!(output.successful_count(), 0);
        assert_eq!(output.errors[0].kind, "Io");
        assert!(!out
            .join("kplr000000001-2009166043257_llc_quicklook.ecsv")
            .exists());
    }

    #[test]
    fn test_empty_batch() {
        let files: Vec<PathBuf> = Vec::new();
        let output = processor(BatchConfig::new()).process_files(&files).unwrap();
        assert!(output.all_successful());
        assert_eq!(output.successful_count(), 0);
    }
}
