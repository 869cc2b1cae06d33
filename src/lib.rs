//! Transit Extractor
//!
//! Builds labeled training segments from light curves with known injected
//! transits.
//!
//! # Overview
//!
//! Given a brightness time series and a target's catalog ephemeris (epoch,
//! period, duration, eclipsing-binary flag), the library:
//!
//! - locates the first transit occurrence after the observation start
//! - pads it into an extraction window (fixed or randomized margins)
//! - slices the samples inside the window by binary search
//! - labels every sample as in-transit or eclipsing-binary injection
//! - optionally samples a disjoint, transit-free negative window
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Transit Extractor                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  window/     - Transit occurrence and padded window             │
//! │  boundary/   - Binary search of window bounds in time array     │
//! │  sampling/   - Disjoint negative window sampling                │
//! │  labeling/   - Per-sample in-transit / EB-injection labels      │
//! │  pipeline/   - Orchestration for one light curve and target     │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  catalog/    - Target ephemerides (IPAC tables)                 │
//! │  io/         - Light-curve loading                              │
//! │  export/     - ECSV segment output                              │
//! │  batch/      - Parallel processing over files (rayon)           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use transit_extractor::prelude::*;
//!
//! let catalog = TargetCatalog::load_ipac("injections.ipac")?;
//! let path = "kplr011183555-2009166043257_llc.csv";
//!
//! let light_curve = CsvLightCurveLoader::new().load(path.as_ref())?;
//! let target = catalog.get(target_id_from_path(path)?)?;
//!
//! let pipeline = PipelineBuilder::new().fixed_tolerance(0.25).build()?;
//! let extraction = pipeline.extract(&light_curve, target)?;
//!
//! SegmentWriter::new("quicklook/").write_extraction(path, &extraction)?;
//! ```

pub mod boundary;
pub mod builder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod io;
pub mod labeling;
pub mod light_curve;
pub mod pipeline;
pub mod prelude;
pub mod sampling;
pub mod segment;
pub mod validation;
pub mod window;

#[cfg(feature = "parallel")]
pub mod batch;

// Re-exports - Core types
pub use error::{ExtractionError, Result};
pub use light_curve::{LightCurve, MetaValue, Metadata};
pub use window::{Ephemeris, TolerancePolicy, TransitWindow, Window};

// Re-exports - Catalog
pub use catalog::{target_id_from_path, TargetCatalog, TargetEvent};

// Re-exports - Pipeline
pub use builder::PipelineBuilder;
pub use config::{ExperimentMetadata, ExtractionConfig};
pub use pipeline::{Extraction, ExtractionPipeline, NegativeOutcome};
pub use sampling::{NegativeSample, NegativeSampler, NegativeSamplingConfig};
pub use segment::{LabeledSegment, SegmentKind};

// Re-exports - Labeling
pub use labeling::{LabelStats, Labels};

// Re-exports - I/O
pub use export::{output_root, write_ecsv, SegmentWriter};
pub use io::{CsvLightCurveLoader, LightCurveLoader};

// Re-exports - Validation
pub use validation::{
    validate_light_curve, validate_time_ordering, LightCurveValidator, ValidationLevel,
    ValidationResult,
};
