//! Fluent builder for extraction pipelines.
//!
//! # Quick Start
//!
//! ```ignore
//! use transit_extractor::PipelineBuilder;
//!
//! // Randomized padding, negatives enabled
//! let pipeline = PipelineBuilder::new().build()?;
//!
//! let extraction = pipeline.extract(&light_curve, &target)?;
//! ```
//!
//! # Defaults
//!
//! | Setting | Default |
//! |---------|---------|
//! | Padding | randomized, each side in `[3/24, 1.0]` days |
//! | Negative duration | `[3/24, 1.0]` days |
//! | Negative attempts | 100 |
//! | Empty positive slice | `EmptyExtraction` error |
//!
//! # Common Configurations
//!
//! ## Fixed-length classifier input
//!
//! ```ignore
//! let pipeline = PipelineBuilder::new()
//!     .fixed_tolerance(6.0 / 24.0)
//!     .without_negatives()
//!     .build()?;
//! ```
//!
//! ## Longer negative windows
//!
//! ```ignore
//! let pipeline = PipelineBuilder::new()
//!     .negative_durations(0.5, 2.0)
//!     .max_attempts(500)
//!     .build()?;
//! ```

use crate::config::{ExperimentMetadata, ExtractionConfig};
use crate::error::Result;
use crate::pipeline::ExtractionPipeline;
use crate::window::TolerancePolicy;

/// Fluent builder for [`ExtractionPipeline`].
///
/// Setters never fail; everything is validated once in
/// [`build_config`](Self::build_config).
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    config: ExtractionConfig,
}

impl PipelineBuilder {
    /// Builder with the default randomized configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration, e.g. one loaded from TOML.
    pub fn from_config(config: ExtractionConfig) -> Self {
        Self { config }
    }

    // =========================================================================
    // Padding
    // =========================================================================

    /// Pad both sides of the transit by `margin` days.
    pub fn fixed_tolerance(mut self, margin: f64) -> Self {
        self.config.tolerance = TolerancePolicy::Fixed { margin };
        self
    }

    /// Draw each side's padding independently from `[lower, upper]` days.
    pub fn randomized_tolerance(mut self, lower: f64, upper: f64) -> Self {
        self.config.tolerance = TolerancePolicy::Randomized { lower, upper };
        self
    }

    pub fn tolerance(mut self, policy: TolerancePolicy) -> Self {
        self.config.tolerance = policy;
        self
    }

    // =========================================================================
    // Negative Sampling
    // =========================================================================

    /// Set the negative window duration range in days.
    pub fn negative_durations(mut self, min_duration: f64, max_duration: f64) -> Self {
        self.config.negative.min_duration = min_duration;
        self.config.negative.max_duration = max_duration;
        self
    }

    /// Set the negative sampling retry budget.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.config.negative.max_attempts = attempts;
        self
    }

    /// Produce positive segments only.
    pub fn without_negatives(mut self) -> Self {
        self.config.negative.enabled = false;
        self
    }

    pub fn with_negatives(mut self) -> Self {
        self.config.negative.enabled = true;
        self
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Return empty positive segments instead of `EmptyExtraction`.
    pub fn keep_empty_segments(mut self, keep: bool) -> Self {
        self.config.keep_empty_segments = keep;
        self
    }

    /// Tag the run with an experiment name and description.
    pub fn experiment(mut self, name: &str, description: &str) -> Self {
        self.config.metadata = Some(ExperimentMetadata {
            name: name.to_string(),
            description: Some(description.to_string()),
            version: None,
            tags: None,
        });
        self
    }

    pub fn with_metadata(mut self, metadata: ExperimentMetadata) -> Self {
        self.config.metadata = Some(metadata);
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Validate and return the configuration.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` describing the first rejected setting.
    pub fn build_config(self) -> Result<ExtractionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Validate the configuration and create the pipeline.
    pub fn build(self) -> Result<ExtractionPipeline> {
        ExtractionPipeline::new(self.build_config()?)
    }

    /// One-paragraph description of the current settings.
    pub fn summary(&self) -> String {
        let padding = match self.config.tolerance {
            TolerancePolicy::Fixed { margin } => format!("fixed {margin} d"),
            TolerancePolicy::Randomized { lower, upper } => {
                format!("randomized [{lower}, {upper}] d")
            }
        };
        let negative = &self.config.negative;
        let negatives = if negative.enabled {
            format!(
                "[{}, {}] d, {} attempts",
                negative.min_duration, negative.max_duration, negative.max_attempts
            )
        } else {
            "disabled".to_string()
        };

        format!(
            "PipelineBuilder Summary:\n\
             - Padding: {}\n\
             - Negatives: {}\n\
             - Keep empty segments: {}",
            padding, negatives, self.config.keep_empty_segments,
        )
    }
}
