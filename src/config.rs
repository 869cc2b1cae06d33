//! Extraction configuration management.
//!
//! One serializable struct carries every knob of the extraction pipeline so
//! that a dataset can be regenerated from the file that produced it.
//!
//! # Example
//!
//! ```ignore
//! use transit_extractor::config::ExtractionConfig;
//!
//! let config = ExtractionConfig::default();
//! config.save_toml("quicklook.toml")?;
//!
//! let loaded = ExtractionConfig::load_toml("quicklook.toml")?;
//! let pipeline = ExtractionPipeline::new(loaded)?;
//! ```
//!
//! # TOML Layout
//!
//! ```toml
//! keep_empty_segments = false
//!
//! [tolerance]
//! policy = "randomized"
//! lower = 0.125
//! upper = 1.0
//!
//! [negative]
//! enabled = true
//! min_duration = 0.125
//! max_duration = 1.0
//! max_attempts = 100
//! ```

use crate::error::{ExtractionError, Result};
use crate::sampling::NegativeSamplingConfig;
use crate::window::TolerancePolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Unified extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Return empty positive segments instead of `EmptyExtraction`.
    #[serde(default)]
    pub keep_empty_segments: bool,

    /// Padding around the raw transit.
    pub tolerance: TolerancePolicy,

    /// Negative sampling.
    pub negative: NegativeSamplingConfig,

    /// Experiment metadata (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ExperimentMetadata>,
}

/// Experiment metadata for tracking and reproducibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Version or git commit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            keep_empty_segments: false,
            tolerance: TolerancePolicy::default(),
            negative: NegativeSamplingConfig::default(),
            metadata: None,
        }
    }
}

impl ExtractionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed six-hour padding, suited to fixed-length classifiers.
    pub fn fixed() -> Self {
        Self {
            tolerance: TolerancePolicy::fixed_default(),
            ..Default::default()
        }
    }

    pub fn with_tolerance(mut self, tolerance: TolerancePolicy) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_negative(mut self, negative: NegativeSamplingConfig) -> Self {
        self.negative = negative;
        self
    }

    pub fn with_metadata(mut self, metadata: ExperimentMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.tolerance
            .validate()
            .map_err(ExtractionError::InvalidConfig)?;
        self.negative
            .validate()
            .map_err(ExtractionError::InvalidConfig)?;
        Ok(())
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ExtractionError::Parse(format!("TOML serialization: {e}")))?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Load and validate configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ExtractionConfig = toml::from_str(contents)
            .map_err(|e| ExtractionError::Parse(format!("TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ExtractionError::Parse(format!("JSON serialization: {e}")))?;
        fs::write(path, json_string)?;
        Ok(())
    }

    /// Load and validate configuration from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ExtractionConfig = serde_json::from_str(&contents)
            .map_err(|e| ExtractionError::Parse(format!("JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_is_valid() {
        let config = ExtractionConfig::default();
        assert!(config.validate().is_ok());
        assert!(matches!(
            config.tolerance,
            TolerancePolicy::Randomized { .. }
        ));
        assert!(config.negative.enabled);
        assert_eq!(config.negative.max_attempts, 100);
    }

    #[test]
    fn test_fixed_preset() {
        let config = ExtractionConfig::fixed();
        assert_eq!(config.tolerance, TolerancePolicy::Fixed { margin: 0.25 });
    }

    #[test]
    fn test_save_load_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = ExtractionConfig::fixed().with_metadata(ExperimentMetadata {
            name: "inj1".to_string(),
            description: Some("DR25 injection run".to_string()),
            version: None,
            tags: Some(vec!["svm".to_string()]),
        });
        config.save_toml(&path).unwrap();

        let loaded = ExtractionConfig::load_toml(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_load_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = ExtractionConfig::default();
        config.save_json(&path).unwrap();
        let loaded = ExtractionConfig::load_json(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_parse_toml_layout() {
        let text = r#"
[tolerance]
policy = "fixed"
margin = 0.5

[negative]
enabled = false
min_duration = 0.125
max_duration = 1.0
max_attempts = 20
"#;
        let config = ExtractionConfig::from_toml_str(text).unwrap();
        assert_eq!(config.tolerance, TolerancePolicy::Fixed { margin: 0.5 });
        assert!(!config.negative.enabled);
        assert!(!config.keep_empty_segments);
    }

    #[test]
    fn test_invalid_config_rejected_on_load() {
        let text = r#"
[tolerance]
policy = "randomized"
lower = 1.0
upper = 0.5

[negative]
enabled = true
min_duration = 0.125
max_duration = 1.0
max_attempts = 100
"#;
        let err = ExtractionConfig::from_toml_str(text).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidConfig(_)));
    }
}
