//! Segment persistence as ECSV tables.
//!
//! Each segment becomes one ECSV 1.0 file readable by astropy:
//!
//! ```text
//! # %ECSV 1.0
//! # ---
//! # datatype:
//! # - {name: TIME, datatype: float64}
//! # - {name: FLUX, datatype: float64}
//! # - {name: IN_TRANSIT, datatype: int32}
//! # - {name: EB_INJECTION, datatype: int32}
//! # meta: !!omap
//! # - {"EB_injection": false}
//! # - {"OBJECT": "KIC 11183555"}
//! # schema: astropy-2.0
//! TIME FLUX IN_TRANSIT EB_INJECTION
//! 109.52 10234.2 0 0
//! ```
//!
//! Output names derive from the input file: `<root>_quicklook.ecsv` for the
//! positive segment and `<root>_quicklook_negative.ecsv` for the negative
//! one, where `<root>` is the input base name up to its first `.`.

use crate::error::{ExtractionError, Result};
use crate::pipeline::Extraction;
use crate::segment::LabeledSegment;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Output file extension.
pub const ECSV_EXTENSION: &str = "ecsv";

const COLUMNS: [(&str, &str); 4] = [
    ("TIME", "float64"),
    ("FLUX", "float64"),
    ("IN_TRANSIT", "int32"),
    ("EB_INJECTION", "int32"),
];

/// Write `segment` as an ECSV table.
pub fn write_ecsv<W: Write>(segment: &LabeledSegment, mut writer: W) -> Result<()> {
    writeln!(writer, "# %ECSV 1.0")?;
    writeln!(writer, "# ---")?;
    writeln!(writer, "# datatype:")?;
    for (name, datatype) in COLUMNS {
        writeln!(writer, "# - {{name: {name}, datatype: {datatype}}}")?;
    }

    if !segment.metadata().is_empty() {
        writeln!(writer, "# meta: !!omap")?;
        for (key, value) in segment.metadata() {
            let key = serde_json::to_string(key)
                .map_err(|e| ExtractionError::Parse(format!("metadata key: {e}")))?;
            let value = serde_json::to_string(value)
                .map_err(|e| ExtractionError::Parse(format!("metadata value: {e}")))?;
            writeln!(writer, "# - {{{key}: {value}}}")?;
        }
    }
    writeln!(writer, "# schema: astropy-2.0")?;

    let names: Vec<&str> = COLUMNS.iter().map(|(name, _)| *name).collect();
    writeln!(writer, "{}", names.join(" "))?;

    for (time, value, in_transit, eb) in segment.rows() {
        writeln!(
            writer,
            "{} {} {} {}",
            format_float(time),
            format_float(value),
            in_transit,
            eb
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn format_float(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x == f64::INFINITY {
        "inf".to_string()
    } else if x == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        x.to_string()
    }
}

/// Input base name up to its first `.`.
///
/// ```
/// use transit_extractor::export::output_root;
///
/// let root = output_root("data/kplr011183555-2009166043257_llc.fits").unwrap();
/// assert_eq!(root, "kplr011183555-2009166043257_llc");
/// ```
pub fn output_root<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ExtractionError::InvalidFileName(path.display().to_string()))?;
    match name.split('.').next() {
        Some(root) if !root.is_empty() => Ok(root.to_string()),
        _ => Err(ExtractionError::InvalidFileName(name.to_string())),
    }
}

/// Writes extracted segments into one output directory.
#[derive(Debug, Clone)]
pub struct SegmentWriter {
    output_dir: PathBuf,
}

impl SegmentWriter {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Output path of a segment extracted from `input_path`.
    pub fn segment_path<P: AsRef<Path>>(
        &self,
        input_path: P,
        segment: &LabeledSegment,
    ) -> Result<PathBuf> {
        let root = output_root(input_path)?;
        Ok(self.output_dir.join(format!(
            "{}{}.{}",
            root,
            segment.kind().file_suffix(),
            ECSV_EXTENSION
        )))
    }

    /// Write one segment, returning the created path.
    pub fn write_segment<P: AsRef<Path>>(
        &self,
        input_path: P,
        segment: &LabeledSegment,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.segment_path(input_path, segment)?;
        let file = File::create(&path)?;
        write_ecsv(segment, BufWriter::new(file))?;
        log::debug!("wrote {} rows to {}", segment.len(), path.display());
        Ok(path)
    }

    /// Write every segment of `extraction`, positive first.
    ///
    /// All or nothing: if any write fails, files already written for this
    /// extraction are removed before the error is returned.
    pub fn write_extraction<P: AsRef<Path>>(
        &self,
        input_path: P,
        extraction: &Extraction,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(2);
        for segment in extraction.segments() {
            match self.write_segment(input_path.as_ref(), segment) {
                Ok(path) => written.push(path),
                Err(err) => {
                    for path in &written {
                        if let Err(e) = fs::remove_file(path) {
                            log::warn!("failed to remove {}: {}", path.display(), e);
                        }
                    }
                    return Err(err);
                }
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeling::build_labels;
    use crate::light_curve::{MetaValue, Metadata};
    use crate::segment::SegmentKind;
    use crate::window::Window;

    fn segment(kind: SegmentKind) -> LabeledSegment {
        let mut meta = Metadata::new();
        meta.insert(
            "OBJECT".to_string(),
            Some(MetaValue::Str("KIC 1".to_string())),
        );
        meta.insert("CROWDSAP".to_string(), None);
        let times = [109.5, 110.0, 110.5];
        LabeledSegment::new(
            kind,
            Window::new(109.5, 110.5).unwrap(),
            &times,
            &[1.0, 0.5, f64::NAN],
            build_labels(&times, &Window::new(109.75, 110.25).unwrap(), false),
            meta,
            false,
        )
    }

    #[test]
    fn test_write_ecsv() {
        let mut buf = Vec::new();
        write_ecsv(&segment(SegmentKind::Positive), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# %ECSV 1.0");
        assert!(text.contains("# - {name: IN_TRANSIT, datatype: int32}"));
        assert!(text.contains("# - {\"CROWDSAP\": null}"));
        assert!(text.contains("# - {\"EB_injection\": false}"));
        assert!(text.contains("# - {\"OBJECT\": \"KIC 1\"}"));
        assert!(text.contains("# schema: astropy-2.0"));

        let body: Vec<&str> = lines.iter().filter(|l| !l.starts_with('#')).copied().collect();
        assert_eq!(
            body,
            vec![
                "TIME FLUX IN_TRANSIT EB_INJECTION",
                "109.5 1 0 0",
                "110 0.5 1 0",
                "110.5 nan 0 0",
            ]
        );
    }

    #[test]
    fn test_output_root() {
        assert_eq!(output_root("a/b/kplr1.fits.gz").unwrap(), "kplr1");
        assert_eq!(output_root("noext").unwrap(), "noext");
        assert!(output_root(".hidden").is_err());
        assert!(output_root("/").is_err());
    }

    #[test]
    fn test_segment_paths() {
        let writer = SegmentWriter::new("/out");
        let input = "data/kplr011183555-2009166043257_llc.fits";
        assert_eq!(
            writer
                .segment_path(input, &segment(SegmentKind::Positive))
                .unwrap(),
            PathBuf::from("/out/kplr011183555-2009166043257_llc_quicklook.ecsv")
        );
        assert_eq!(
            writer
                .segment_path(input, &segment(SegmentKind::Negative))
                .unwrap(),
            PathBuf::from("/out/kplr011183555-2009166043257_llc_quicklook_negative.ecsv")
        );
    }

    #[test]
    fn test_failed_negative_write_removes_positive() {
        use crate::catalog::TargetEvent;
        use crate::config::ExtractionConfig;
        use crate::light_curve::LightCurve;
        use crate::pipeline::ExtractionPipeline;
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let times: Vec<f64> = (0..4000).map(|i| 105.0 + i as f64 * 0.0204).collect();
        let lc = LightCurve::new(times.clone(), vec![1.0; times.len()], Metadata::new(), 105.0, 200.0)
            .unwrap();
        let target = TargetEvent::new(1, 100.0, 10.0, 0.5, false).unwrap();
        let ex = ExtractionPipeline::new(ExtractionConfig::fixed())
            .unwrap()
            .extract_with_rng(&lc, &target, &mut StdRng::seed_from_u64(4))
            .unwrap();
        assert!(ex.negative_segment().is_some());

        let dir = tempfile::tempdir().unwrap();
        let writer = SegmentWriter::new(dir.path());
        let input = "kplr000000001-2009166043257_llc.csv";
        // a directory in place of the negative output makes its write fail
        let negative_path = writer
            .segment_path(input, ex.negative_segment().unwrap())
            .unwrap();
        fs::create_dir_all(&negative_path).unwrap();

        assert!(writer.write_extraction(input, &ex).is_err());
        let positive_path = writer.segment_path(input, &ex.positive).unwrap();
        assert!(!positive_path.exists());
    }

    #[test]
    fn test_write_segment_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SegmentWriter::new(dir.path().join("nested"));
        let path = writer
            .write_segment("kplr1.fits", &segment(SegmentKind::Positive))
            .unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert!(text.ends_with("110.5 nan 0 0\n"));
    }
}
