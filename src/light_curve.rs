//! Light curve container and header metadata.
//!
//! A [`LightCurve`] is validated exactly once, at construction: time and
//! value arrays must be the same length and times must be strictly
//! increasing. Every later search relies on that invariant without
//! re-checking it.
//!
//! Header metadata is a typed optional-scalar map. Source-specific
//! "undefined" markers are turned into `None` by
//! [`MetaValue::parse_header_value`] at ingestion and never appear
//! downstream.

use crate::boundary;
use crate::error::{ExtractionError, Result};
use crate::window::Window;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

/// Scalar header value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Header metadata. Absent values are `None`; key order is deterministic.
pub type Metadata = BTreeMap<String, Option<MetaValue>>;

/// Raw header markers that mean "no value".
const UNDEFINED_MARKERS: &[&str] = &["", "UNDEFINED", "undefined", "Undefined", "NaN", "nan"];

impl MetaValue {
    /// Parse a raw header value.
    ///
    /// Quoted text becomes a string, `T`/`F`/`true`/`false` become booleans,
    /// then integers and floats are tried in that order. Undefined markers
    /// and NaN return `None`.
    pub fn parse_header_value(raw: &str) -> Option<MetaValue> {
        let trimmed = raw.trim();

        let unquoted = trimmed
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .or_else(|| {
                trimmed
                    .strip_prefix('"')
                    .and_then(|s| s.strip_suffix('"'))
            });
        if let Some(text) = unquoted {
            let text = text.trim_end();
            if UNDEFINED_MARKERS.contains(&text) {
                return None;
            }
            return Some(MetaValue::Str(text.to_string()));
        }

        if UNDEFINED_MARKERS.contains(&trimmed) {
            return None;
        }

        match trimmed {
            "T" | "true" | "True" => return Some(MetaValue::Bool(true)),
            "F" | "false" | "False" => return Some(MetaValue::Bool(false)),
            _ => {}
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return Some(MetaValue::Int(i));
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_nan() {
                return None;
            }
            return Some(MetaValue::Float(f));
        }
        Some(MetaValue::Str(trimmed.to_string()))
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetaValue::Int(i) => Some(*i as f64),
            MetaValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Bool(b) => write!(f, "{b}"),
            MetaValue::Int(i) => write!(f, "{i}"),
            MetaValue::Float(x) => write!(f, "{x}"),
            MetaValue::Str(s) => write!(f, "{s}"),
        }
    }
}

/// Brightness time series of one target.
#[derive(Debug, Clone, PartialEq)]
pub struct LightCurve {
    times: Vec<f64>,
    values: Vec<f64>,
    metadata: Metadata,
    observed: Window,
}

impl LightCurve {
    /// Build a validated light curve.
    ///
    /// # Errors
    ///
    /// - `LengthMismatch` if `times` and `values` differ in length
    /// - `UnsortedTimeSeries` at the first index where `times` fails to
    ///   strictly increase (NaN times fail this check)
    /// - `InvalidWindow` if the observed bounds are reversed or non-finite
    pub fn new(
        times: Vec<f64>,
        values: Vec<f64>,
        metadata: Metadata,
        observed_start: f64,
        observed_stop: f64,
    ) -> Result<Self> {
        if times.len() != values.len() {
            return Err(ExtractionError::LengthMismatch {
                times: times.len(),
                values: values.len(),
            });
        }
        if let Some(t) = times.first() {
            if t.is_nan() {
                return Err(ExtractionError::UnsortedTimeSeries { index: 0 });
            }
        }
        if let Some(index) = (1..times.len())
            .find(|&i| times[i].partial_cmp(&times[i - 1]) != Some(Ordering::Greater))
        {
            return Err(ExtractionError::UnsortedTimeSeries { index });
        }
        let observed = Window::new(observed_start, observed_stop)?;
        Ok(Self {
            times,
            values,
            metadata,
            observed,
        })
    }

    /// Build a light curve whose observed span is its first and last sample.
    pub fn from_samples(times: Vec<f64>, values: Vec<f64>, metadata: Metadata) -> Result<Self> {
        let (start, stop) = match (times.first(), times.last()) {
            (Some(&a), Some(&b)) => (a, b),
            _ => (0.0, 0.0),
        };
        Self::new(times, values, metadata, start, stop)
    }

    #[inline]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    #[inline]
    pub fn observed_start(&self) -> f64 {
        self.observed.start()
    }

    #[inline]
    pub fn observed_stop(&self) -> f64 {
        self.observed.stop()
    }

    /// Observed span as a window.
    #[inline]
    pub fn observed(&self) -> Window {
        self.observed
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Index range of samples inside `window` (binary search).
    #[inline]
    pub fn index_range(&self, window: &Window) -> Range<usize> {
        boundary::index_range(&self.times, window)
    }

    /// Object name from the `OBJECT` header card, if present.
    pub fn object_name(&self) -> Option<&str> {
        self.metadata
            .get("OBJECT")
            .and_then(|v| v.as_ref())
            .and_then(MetaValue::as_str)
    }
}
