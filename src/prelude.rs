//! Prelude module for convenient imports.
//!
//! ```ignore
//! use transit_extractor::prelude::*;
//!
//! let pipeline = PipelineBuilder::new().build()?;
//! let extraction = pipeline.extract(&light_curve, &target)?;
//! ```
//!
//! # What's Included
//!
//! ## Core Pipeline
//! - [`ExtractionPipeline`] - Extraction for one light curve and target
//! - [`PipelineBuilder`] - Fluent pipeline construction
//! - [`ExtractionConfig`] - Serializable configuration
//! - [`Extraction`] / [`NegativeOutcome`] - Pipeline output
//!
//! ## Data
//! - [`LightCurve`], [`Metadata`], [`MetaValue`]
//! - [`TargetEvent`], [`TargetCatalog`]
//! - [`LabeledSegment`], [`SegmentKind`]
//!
//! ## I/O
//! - [`LightCurveLoader`], [`CsvLightCurveLoader`]
//! - [`SegmentWriter`]
//!
//! ## Batch Processing (feature `parallel`)
//! - `BatchProcessor`, `BatchConfig`, `ErrorMode`

// ============================================================================
// Core Pipeline
// ============================================================================

pub use crate::builder::PipelineBuilder;
pub use crate::config::{ExperimentMetadata, ExtractionConfig};
pub use crate::pipeline::{Extraction, ExtractionPipeline, NegativeOutcome};

// ============================================================================
// Data Types
// ============================================================================

pub use crate::catalog::{target_id_from_path, TargetCatalog, TargetEvent};
pub use crate::error::{ExtractionError, Result};
pub use crate::light_curve::{LightCurve, MetaValue, Metadata};
pub use crate::segment::{LabeledSegment, SegmentKind};
pub use crate::window::{Ephemeris, TolerancePolicy, TransitWindow, Window};

// ============================================================================
// Components
// ============================================================================

pub use crate::boundary::index_range;
pub use crate::labeling::{build_labels, zero_labels, LabelStats, Labels};
pub use crate::sampling::{NegativeSampler, NegativeSamplingConfig};
pub use crate::window::compute_transit_window;

// ============================================================================
// I/O and Validation
// ============================================================================

pub use crate::export::{write_ecsv, SegmentWriter};
pub use crate::io::{CsvLightCurveLoader, LightCurveLoader};
pub use crate::validation::{validate_light_curve, ValidationResult};

// ============================================================================
// Batch Processing
// ============================================================================

#[cfg(feature = "parallel")]
pub use crate::batch::{
    BatchConfig, BatchOutput, BatchProcessor, ErrorMode, FileError, FileResult, LoggingProgress,
    ProgressCallback,
};
