//! Light-curve ingestion.
//!
//! Extraction only needs a [`LightCurve`]; where it comes from is behind the
//! [`LightCurveLoader`] trait so the batch driver can be pointed at any
//! source format.
//!
//! [`CsvLightCurveLoader`] reads a plain-text export of a light-curve file:
//!
//! ```text
//! # OBJECT = 'KIC 11183555'
//! # TSTART = 131.512
//! # TSTOP = 164.982
//! TIME,SAP_FLUX,PDCSAP_FLUX
//! 131.5123,10234.2,10231.9
//! 131.5327,10233.8,NaN
//! ```
//!
//! Comment lines of the form `# KEY = VALUE` become header metadata. `TSTART`
//! and `TSTOP` give the observed span; without them the first and last time
//! are used. Rows whose time is missing or not finite are dropped. Missing
//! flux values are kept as NaN.

use crate::error::{ExtractionError, Result};
use crate::light_curve::{LightCurve, MetaValue, Metadata};
use std::fs;
use std::path::Path;

/// Header key of the observed start time.
pub const TSTART_KEY: &str = "TSTART";

/// Header key of the observed stop time.
pub const TSTOP_KEY: &str = "TSTOP";

/// Column holding observation times.
pub const TIME_COLUMN: &str = "TIME";

/// Default flux column.
pub const DEFAULT_FLUX_COLUMN: &str = "SAP_FLUX";

/// Source of light curves.
pub trait LightCurveLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<LightCurve>;
}

/// Loader for CSV exports with a `# KEY = VALUE` comment header.
#[derive(Debug, Clone)]
pub struct CsvLightCurveLoader {
    flux_column: String,
}

impl Default for CsvLightCurveLoader {
    fn default() -> Self {
        Self {
            flux_column: DEFAULT_FLUX_COLUMN.to_string(),
        }
    }
}

impl CsvLightCurveLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read brightness values from `column` instead of `SAP_FLUX`.
    pub fn with_flux_column(mut self, column: impl Into<String>) -> Self {
        self.flux_column = column.into();
        self
    }

    pub fn flux_column(&self) -> &str {
        &self.flux_column
    }

    /// Parse a complete file held in memory.
    pub fn parse_str(&self, text: &str) -> Result<LightCurve> {
        let metadata = parse_header(text);

        let mut reader = csv::ReaderBuilder::new()
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ExtractionError::Parse(format!("missing column '{name}'")))
        };
        let time_idx = column(TIME_COLUMN)?;
        let flux_idx = column(&self.flux_column)?;

        let mut times = Vec::new();
        let mut values = Vec::new();
        let mut dropped = 0usize;

        for record in reader.records() {
            let record = record?;
            let time = match record.get(time_idx).and_then(parse_float) {
                Some(t) if t.is_finite() => t,
                _ => {
                    dropped += 1;
                    continue;
                }
            };
            times.push(time);
            values.push(record.get(flux_idx).and_then(parse_float).unwrap_or(f64::NAN));
        }
        if dropped > 0 {
            log::debug!("dropped {} rows without a finite time", dropped);
        }

        let header_bound = |key: &str| {
            metadata
                .get(key)
                .and_then(|v| v.as_ref())
                .and_then(MetaValue::as_f64)
        };
        let start = header_bound(TSTART_KEY).or_else(|| times.first().copied());
        let stop = header_bound(TSTOP_KEY).or_else(|| times.last().copied());

        LightCurve::new(
            times,
            values,
            metadata,
            start.unwrap_or(0.0),
            stop.unwrap_or(0.0),
        )
    }
}

impl LightCurveLoader for CsvLightCurveLoader {
    fn load(&self, path: &Path) -> Result<LightCurve> {
        let text = fs::read_to_string(path)?;
        self.parse_str(&text)
    }
}

/// Collect `# KEY = VALUE` comment lines into metadata.
fn parse_header(text: &str) -> Metadata {
    let mut metadata = Metadata::new();
    for line in text.lines() {
        let Some(card) = line.trim_start().strip_prefix('#') else {
            continue;
        };
        if let Some((key, value)) = card.split_once('=') {
            let key = key.trim();
            if !key.is_empty() {
                metadata.insert(key.to_string(), MetaValue::parse_header_value(value));
            }
        }
    }
    metadata
}

fn parse_float(field: &str) -> Option<f64> {
    if field.is_empty() {
        None
    } else {
        field.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
# OBJECT = 'KIC 11183555'
# TSTART = 131.5
# TSTOP = 135.0
# QUARTER = 2
# CROWDSAP = UNDEFINED
TIME,SAP_FLUX,PDCSAP_FLUX
131.5,100.0,99.0
131.6,,98.0
nan,102.0,97.0
131.8,103.0,NaN
";

    #[test]
    fn test_parse_header_and_rows() {
        let lc = CsvLightCurveLoader::new().parse_str(SAMPLE).unwrap();
        assert_eq!(lc.times(), &[131.5, 131.6, 131.8]);
        assert_eq!(lc.values()[0], 100.0);
        assert!(lc.values()[1].is_nan());
        assert_eq!(lc.observed_start(), 131.5);
        assert_eq!(lc.observed_stop(), 135.0);

        let meta = lc.metadata();
        assert_eq!(lc.object_name(), Some("KIC 11183555"));
        assert_eq!(meta.get("QUARTER"), Some(&Some(MetaValue::Int(2))));
        assert_eq!(meta.get("CROWDSAP"), Some(&None));
    }

    #[test]
    fn test_alternate_flux_column() {
        let loader = CsvLightCurveLoader::new().with_flux_column("PDCSAP_FLUX");
        let lc = loader.parse_str(SAMPLE).unwrap();
        assert_eq!(lc.values()[0], 99.0);
        assert!(lc.values()[2].is_nan());
    }

    #[test]
    fn test_missing_column() {
        let loader = CsvLightCurveLoader::new().with_flux_column("KSPSAP_FLUX");
        let err = loader.parse_str(SAMPLE).unwrap_err();
        assert!(matches!(err, ExtractionError::Parse(_)));
    }

    #[test]
    fn test_bounds_fall_back_to_samples() {
        let text = "TIME,SAP_FLUX\n10.0,1.0\n10.5,1.0\n11.0,1.0\n";
        let lc = CsvLightCurveLoader::new().parse_str(text).unwrap();
        assert_eq!(lc.observed_start(), 10.0);
        assert_eq!(lc.observed_stop(), 11.0);
        assert!(lc.metadata().is_empty());
    }

    #[test]
    fn test_unsorted_rows_rejected() {
        let text = "TIME,SAP_FLUX\n10.0,1.0\n9.0,1.0\n";
        let err = CsvLightCurveLoader::new().parse_str(text).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsortedTimeSeries { index: 1 }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let lc = CsvLightCurveLoader::new().load(file.path()).unwrap();
        assert_eq!(lc.len(), 3);
    }
}
