//! Input quality checks for light curves.
//!
//! Validation is advisory: a light curve that already passed
//! [`LightCurve::new`] can always be extracted. These checks surface data
//! problems worth logging before they end up in a training set.
//!
//! # Checks
//!
//! 1. **Time ordering**: strictly increasing times, cadence gap detection
//! 2. **Flux**: non-finite values
//! 3. **Observed bounds**: samples recorded outside `TSTART`/`TSTOP`
//!
//! # Usage
//!
//! ```ignore
//! use transit_extractor::validation::LightCurveValidator;
//!
//! let result = LightCurveValidator::default().validate(&light_curve);
//! if !result.is_valid() {
//!     for warning in result.warnings() {
//!         log::warn!("{}", warning);
//!     }
//! }
//! ```

use crate::light_curve::LightCurve;
use std::fmt;

/// Validation result for a single check.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Valid,
    Warning(String),
    Error(String),
}

impl ValidationLevel {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationLevel::Valid)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, ValidationLevel::Warning(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ValidationLevel::Error(_))
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationLevel::Valid => write!(f, "Valid"),
            ValidationLevel::Warning(msg) => write!(f, "Warning: {msg}"),
            ValidationLevel::Error(msg) => write!(f, "Error: {msg}"),
        }
    }
}

/// Aggregated validation result.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    results: Vec<(String, ValidationLevel)>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a named check.
    pub fn add(&mut self, check_name: &str, level: ValidationLevel) {
        self.results.push((check_name.to_string(), level));
    }

    /// Append every check from `other`.
    pub fn merge(&mut self, other: ValidationResult) {
        self.results.extend(other.results);
    }

    /// True when no check produced a warning or an error.
    pub fn is_valid(&self) -> bool {
        self.results.iter().all(|(_, level)| level.is_valid())
    }

    pub fn has_errors(&self) -> bool {
        self.results.iter().any(|(_, level)| level.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.results.iter().any(|(_, level)| level.is_warning())
    }

    /// Warnings formatted as `check: message`.
    pub fn warnings(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|(name, level)| match level {
                ValidationLevel::Warning(msg) => Some(format!("{name}: {msg}")),
                _ => None,
            })
            .collect()
    }

    /// Errors formatted as `check: message`.
    pub fn errors(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|(name, level)| match level {
                ValidationLevel::Error(msg) => Some(format!("{name}: {msg}")),
                _ => None,
            })
            .collect()
    }

    pub fn all_results(&self) -> &[(String, ValidationLevel)] {
        &self.results
    }

    pub fn check_count(&self) -> usize {
        self.results.len()
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|(_, l)| l.is_valid()).count()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let passed = self.passed_count();
        let total = self.check_count();
        writeln!(f, "Validation: {passed}/{total} checks passed")?;

        for (name, level) in &self.results {
            if !level.is_valid() {
                writeln!(f, "  - {name}: {level}")?;
            }
        }

        Ok(())
    }
}

/// Default gap threshold, in multiples of the median cadence.
pub const DEFAULT_GAP_WARNING_FACTOR: f64 = 10.0;

/// Configuration for light-curve validation.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Warn when a cadence gap exceeds this multiple of the median cadence.
    pub gap_warning_factor: f64,

    /// Count NaN/Inf flux values.
    pub check_non_finite_flux: bool,

    /// Check that samples fall inside the observed bounds.
    pub check_observed_bounds: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            gap_warning_factor: DEFAULT_GAP_WARNING_FACTOR,
            check_non_finite_flux: true,
            check_observed_bounds: true,
        }
    }
}

/// Light-curve validator.
#[derive(Debug, Clone, Default)]
pub struct LightCurveValidator {
    config: ValidationConfig,
}

impl LightCurveValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Run every enabled check.
    pub fn validate(&self, lc: &LightCurve) -> ValidationResult {
        let mut result = ValidationResult::new();

        if lc.is_empty() {
            result.add(
                "samples",
                ValidationLevel::Warning("Light curve has no samples".to_string()),
            );
            return result;
        }
        result.add("samples", ValidationLevel::Valid);

        result.merge(check_time_ordering(lc.times(), self.config.gap_warning_factor));

        if self.config.check_non_finite_flux {
            self.validate_flux(lc, &mut result);
        }
        if self.config.check_observed_bounds {
            self.validate_observed_bounds(lc, &mut result);
        }

        result
    }

    fn validate_flux(&self, lc: &LightCurve, result: &mut ValidationResult) {
        let non_finite = lc.values().iter().filter(|v| !v.is_finite()).count();
        if non_finite > 0 {
            result.add(
                "flux_values",
                ValidationLevel::Warning(format!(
                    "{} of {} flux values are not finite",
                    non_finite,
                    lc.len()
                )),
            );
        } else {
            result.add("flux_values", ValidationLevel::Valid);
        }
    }

    fn validate_observed_bounds(&self, lc: &LightCurve, result: &mut ValidationResult) {
        let observed = lc.observed();
        let outside = lc.times().iter().filter(|&&t| !observed.contains(t)).count();
        if outside > 0 {
            result.add(
                "observed_bounds",
                ValidationLevel::Warning(format!(
                    "{} samples outside observed span [{}, {}]",
                    outside,
                    observed.start(),
                    observed.stop()
                )),
            );
        } else {
            result.add("observed_bounds", ValidationLevel::Valid);
        }
    }
}

/// Validate a light curve with the default configuration.
pub fn validate_light_curve(lc: &LightCurve) -> ValidationResult {
    LightCurveValidator::default().validate(lc)
}

/// Validate a time array for strict ordering and cadence gaps.
pub fn validate_time_ordering(times: &[f64]) -> ValidationResult {
    check_time_ordering(times, DEFAULT_GAP_WARNING_FACTOR)
}

fn check_time_ordering(times: &[f64], gap_warning_factor: f64) -> ValidationResult {
    let mut result = ValidationResult::new();

    if times.is_empty() {
        result.add(
            "time_ordering",
            ValidationLevel::Warning("No timestamps to validate".to_string()),
        );
        return result;
    }

    let mut steps = Vec::with_capacity(times.len().saturating_sub(1));
    for i in 1..times.len() {
        let step = times[i] - times[i - 1];
        if step.is_nan() || step <= 0.0 {
            result.add(
                "time_ordering",
                ValidationLevel::Error(format!(
                    "Non-increasing time at index {}: {} after {}",
                    i,
                    times[i],
                    times[i - 1]
                )),
            );
            return result;
        }
        steps.push(step);
    }
    result.add("time_ordering", ValidationLevel::Valid);

    if steps.is_empty() {
        return result;
    }

    let mut sorted = steps.clone();
    sorted.sort_by(f64::total_cmp);
    let median = sorted[sorted.len() / 2];
    let max_gap = sorted[sorted.len() - 1];
    let threshold = median * gap_warning_factor;

    if max_gap > threshold {
        let gaps = steps.iter().filter(|&&s| s > threshold).count();
        result.add(
            "cadence_gaps",
            ValidationLevel::Warning(format!(
                "{gaps} gaps longer than {threshold:.4} d (max {max_gap:.4} d, median cadence {median:.4} d)"
            )),
        );
    } else {
        result.add("cadence_gaps", ValidationLevel::Valid);
    }

    result
}
