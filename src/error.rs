//! Error types for transit extraction.
//!
//! Every failure in the extraction core is returned as a typed
//! [`ExtractionError`] to the immediate caller. Nothing in the library
//! panics or logs-and-swallows; the batch driver decides whether a failure
//! is skipped or aborts the run.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Errors produced while computing, slicing or labeling transit windows.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The catalog period places no transit occurrence inside the observed span.
    #[error("no transit in observed range [{observed_start}, {observed_stop}] (transit [{transit_start}, {transit_stop}])")]
    NoTransitInRange {
        observed_start: f64,
        observed_stop: f64,
        transit_start: f64,
        transit_stop: f64,
    },

    /// The padded extraction window is clipped by the edges of the series.
    #[error("padded window [{window_start}, {window_stop}] not strictly inside observed range [{observed_start}, {observed_stop}]")]
    WindowOutsideBounds {
        observed_start: f64,
        observed_stop: f64,
        window_start: f64,
        window_stop: f64,
    },

    /// Time samples are not strictly increasing.
    #[error("time series is not strictly increasing at index {index}")]
    UnsortedTimeSeries { index: usize },

    /// No disjoint negative window was found within the retry budget.
    #[error("no negative window found after {attempts} attempts")]
    NegativeSampleExhausted { attempts: usize },

    /// Identifier absent from the catalog index.
    #[error("target {id} not found in catalog")]
    TargetNotFound { id: u64 },

    /// A valid window contained zero samples.
    #[error("window [{start}, {stop}] contains no samples")]
    EmptyExtraction { start: f64, stop: f64 },

    /// Time and value arrays differ in length.
    #[error("times ({times}) and values ({values}) differ in length")]
    LengthMismatch { times: usize, values: usize },

    /// Window bounds are reversed or non-finite.
    #[error("invalid window [{start}, {stop}]")]
    InvalidWindow { start: f64, stop: f64 },

    /// Catalog entry with non-positive or non-finite orbital parameters.
    #[error("invalid target {id}: {reason}")]
    InvalidTarget { id: u64, reason: String },

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// File name does not carry a parsable target identifier.
    #[error("cannot parse target id from file name '{0}'")]
    InvalidFileName(String),

    /// Malformed catalog or light-curve text.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ExtractionError {
    /// Stable short name of the failure kind, used in logs and batch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoTransitInRange { .. } => "NoTransitInRange",
            Self::WindowOutsideBounds { .. } => "WindowOutsideBounds",
            Self::UnsortedTimeSeries { .. } => "UnsortedTimeSeries",
            Self::NegativeSampleExhausted { .. } => "NegativeSampleExhausted",
            Self::TargetNotFound { .. } => "TargetNotFound",
            Self::EmptyExtraction { .. } => "EmptyExtraction",
            Self::LengthMismatch { .. } => "LengthMismatch",
            Self::InvalidWindow { .. } => "InvalidWindow",
            Self::InvalidTarget { .. } => "InvalidTarget",
            Self::InvalidConfig(_) => "InvalidConfig",
            Self::InvalidFileName(_) => "InvalidFileName",
            Self::Parse(_) => "Parse",
            Self::Io(_) => "Io",
            Self::Csv(_) => "Csv",
        }
    }

    /// Whether the failure only affects a single item of a batch.
    ///
    /// Configuration errors are the only kind that invalidate every item.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidConfig(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(
            ExtractionError::TargetNotFound { id: 7 }.kind(),
            "TargetNotFound"
        );
        assert_eq!(
            ExtractionError::NegativeSampleExhausted { attempts: 100 }.kind(),
            "NegativeSampleExhausted"
        );
    }

    #[test]
    fn test_display_includes_context() {
        let err = ExtractionError::UnsortedTimeSeries { index: 3 };
        assert!(err.to_string().contains("index 3"));

        let err = ExtractionError::TargetNotFound { id: 11183555 };
        assert!(err.to_string().contains("11183555"));
    }

    #[test]
    fn test_recoverable() {
        assert!(ExtractionError::EmptyExtraction {
            start: 0.0,
            stop: 1.0
        }
        .is_recoverable());
        assert!(!ExtractionError::InvalidConfig("x".to_string()).is_recoverable());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ExtractionError = io.into();
        assert_eq!(err.kind(), "Io");
    }
}
