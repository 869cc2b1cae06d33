//! Target catalog: predicted transit ephemerides indexed by target id.
//!
//! The catalog is loaded once per batch run and shared read-only across
//! worker threads. Catalog durations are given in hours and converted to the
//! light curves' native unit (days) here, at the boundary.
//!
//! # IPAC Table Format
//!
//! ```text
//! \fixlen = T
//! |   KIC_ID|    i_epoch|  i_period|  i_dur| EB_injection|
//! |     long|     double|    double| double|          int|
//!   11183555   131.5123    12.3456   4.2000             0
//! ```
//!
//! Lines starting with `\` are keywords and are skipped. The first `|` line
//! names the columns; further `|` lines (types, units, nulls) are ignored.
//! Data rows are whitespace separated.

use crate::error::{ExtractionError, Result};
use crate::window::Ephemeris;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Hours per day, for catalog duration conversion.
pub const HOURS_PER_DAY: f64 = 24.0;

/// Byte offsets of the target identifier inside a light-curve file name
/// (`kplr011183555-...` → `011183555`).
pub const FILE_ID_RANGE: std::ops::Range<usize> = 4..13;

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetEvent {
    pub id: u64,
    /// Reference mid-transit time (days).
    pub epoch: f64,
    /// Orbital period (days, > 0).
    pub period: f64,
    /// Transit duration (days, > 0).
    pub duration: f64,
    /// Whether the injected signal is an eclipsing binary rather than a transit.
    pub is_eclipsing_binary_injection: bool,
}

impl TargetEvent {
    /// Create a validated entry with the duration already in days.
    pub fn new(
        id: u64,
        epoch: f64,
        period: f64,
        duration: f64,
        is_eclipsing_binary_injection: bool,
    ) -> Result<Self> {
        let invalid = |reason: String| ExtractionError::InvalidTarget { id, reason };
        if !epoch.is_finite() {
            return Err(invalid(format!("epoch must be finite, got {epoch}")));
        }
        if !period.is_finite() || period <= 0.0 {
            return Err(invalid(format!("period must be > 0, got {period}")));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(invalid(format!("duration must be > 0, got {duration}")));
        }
        Ok(Self {
            id,
            epoch,
            period,
            duration,
            is_eclipsing_binary_injection,
        })
    }

    /// Create an entry from a catalog row whose duration is in hours.
    pub fn from_hours(
        id: u64,
        epoch: f64,
        period: f64,
        duration_hours: f64,
        is_eclipsing_binary_injection: bool,
    ) -> Result<Self> {
        Self::new(
            id,
            epoch,
            period,
            duration_hours / HOURS_PER_DAY,
            is_eclipsing_binary_injection,
        )
    }

    #[inline]
    pub fn ephemeris(&self) -> Ephemeris {
        Ephemeris {
            epoch: self.epoch,
            period: self.period,
            duration: self.duration,
        }
    }
}

/// Immutable-after-load index from target id to [`TargetEvent`].
#[derive(Debug, Clone, Default)]
pub struct TargetCatalog {
    entries: HashMap<u64, TargetEvent>,
}

impl TargetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. A later entry with the same id replaces the earlier one.
    pub fn insert(&mut self, event: TargetEvent) {
        self.entries.insert(event.id, event);
    }

    /// Look up a target.
    pub fn get(&self, id: u64) -> Result<&TargetEvent> {
        self.entries
            .get(&id)
            .ok_or(ExtractionError::TargetNotFound { id })
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetEvent> {
        self.entries.values()
    }

    /// Load an IPAC table from disk.
    pub fn load_ipac<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_ipac_str(&contents)
    }

    /// Parse an IPAC table.
    ///
    /// Required columns: `KIC_ID`, `i_epoch`, `i_period`, `i_dur` (hours).
    /// `EB_injection` is optional and defaults to false.
    ///
    /// Structural damage (no header, a missing required column, a ragged
    /// row, an unreadable id) fails the whole table. A row with unusable
    /// orbital values is skipped with a warning; looking its id up later
    /// yields `TargetNotFound`.
    pub fn from_ipac_str(contents: &str) -> Result<Self> {
        let mut columns: Option<Vec<String>> = None;
        let mut catalog = TargetCatalog::new();
        let mut skipped = 0usize;

        for (line_no, line) in contents.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('\\') {
                continue;
            }
            if trimmed.starts_with('|') {
                if columns.is_none() {
                    let names: Vec<String> = trimmed
                        .split('|')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                    if let Some(missing) = REQUIRED_COLUMNS
                        .iter()
                        .find(|&&c| !names.iter().any(|n| n == c))
                    {
                        return Err(ExtractionError::Parse(format!(
                            "missing required column '{missing}'"
                        )));
                    }
                    columns = Some(names);
                }
                continue;
            }

            let names = columns.as_ref().ok_or_else(|| {
                ExtractionError::Parse(format!(
                    "line {}: data row before column header",
                    line_no + 1
                ))
            })?;
            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            if fields.len() != names.len() {
                return Err(ExtractionError::Parse(format!(
                    "line {}: expected {} fields, found {}",
                    line_no + 1,
                    names.len(),
                    fields.len()
                )));
            }

            let row = IpacRow {
                names,
                fields: &fields,
                line_no: line_no + 1,
            };
            let id = row.integer("KIC_ID")?;
            match row.event(id) {
                Ok(event) => catalog.insert(event),
                Err(err) => {
                    log::warn!("catalog line {}: skipping target {}: {}", line_no + 1, id, err);
                    skipped += 1;
                }
            }
        }

        if columns.is_none() {
            return Err(ExtractionError::Parse(
                "IPAC table has no column header".to_string(),
            ));
        }
        if skipped > 0 {
            log::warn!("Skipped {} invalid catalog rows", skipped);
        }
        log::info!("Loaded {} catalog targets", catalog.len());
        Ok(catalog)
    }
}

const REQUIRED_COLUMNS: [&str; 4] = ["KIC_ID", "i_epoch", "i_period", "i_dur"];

struct IpacRow<'a> {
    names: &'a [String],
    fields: &'a [&'a str],
    line_no: usize,
}

impl IpacRow<'_> {
    fn raw(&self, column: &str) -> Option<&str> {
        self.names
            .iter()
            .position(|n| n == column)
            .map(|i| self.fields[i])
    }

    fn required(&self, column: &str) -> Result<&str> {
        self.raw(column).ok_or_else(|| {
            ExtractionError::Parse(format!("missing required column '{column}'"))
        })
    }

    fn integer(&self, column: &str) -> Result<u64> {
        let raw = self.required(column)?;
        raw.parse().map_err(|_| {
            ExtractionError::Parse(format!(
                "line {}: column '{column}' is not an integer: '{raw}'",
                self.line_no
            ))
        })
    }

    fn float(&self, column: &str) -> Result<f64> {
        let raw = self.required(column)?;
        raw.parse().map_err(|_| {
            ExtractionError::Parse(format!(
                "line {}: column '{column}' is not a number: '{raw}'",
                self.line_no
            ))
        })
    }

    /// Orbital values of this row as a validated event.
    fn event(&self, id: u64) -> Result<TargetEvent> {
        TargetEvent::from_hours(
            id,
            self.float("i_epoch")?,
            self.float("i_period")?,
            self.float("i_dur")?,
            self.flag("EB_injection")?,
        )
    }

    fn flag(&self, column: &str) -> Result<bool> {
        match self.raw(column) {
            None => Ok(false),
            Some("1" | "T" | "t" | "True" | "true") => Ok(true),
            Some("0" | "F" | "f" | "False" | "false" | "null") => Ok(false),
            Some(other) => Err(ExtractionError::Parse(format!(
                "line {}: column '{column}' is not a boolean: '{other}'",
                self.line_no
            ))),
        }
    }
}

/// Parse the target identifier embedded in a light-curve file name.
///
/// The identifier occupies characters 4 through 12 of the base name.
///
/// ```
/// use transit_extractor::catalog::target_id_from_path;
///
/// let id = target_id_from_path("/data/kplr011183555-2011271113734_INJECTED-inj1_llc.fits.gz");
/// assert_eq!(id.unwrap(), 11183555);
/// ```
pub fn target_id_from_path<P: AsRef<Path>>(path: P) -> Result<u64> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ExtractionError::InvalidFileName(path.display().to_string()))?;
    name.get(FILE_ID_RANGE)
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| ExtractionError::InvalidFileName(name.to_string()))
}
