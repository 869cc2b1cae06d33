//! Transit window computation.
//!
//! Given a target's ephemeris and the observed span of a light curve, finds
//! the transit occurrence to extract and pads it into an extraction window.
//!
//! # Occurrence Selection
//!
//! ```text
//! k          = floor((observed_start - epoch) / period) + 1
//! mid        = epoch + period * k
//! transit    = [mid - duration/2, mid + duration/2]
//! window     = [transit.start - pad_lo, transit.stop + pad_hi]
//! ```
//!
//! `k` always selects the first occurrence strictly after `observed_start`:
//! an occurrence exactly at `observed_start` is skipped in favour of the
//! next one. Produced segments depend on this offset; do not round or clamp
//! `k`.
//!
//! # Failure Modes
//!
//! | Condition | Error |
//! |-----------|-------|
//! | tolerance policy fails validation | `InvalidConfig` |
//! | raw transit does not overlap `[observed_start, observed_stop]` | `NoTransitInRange` |
//! | padded window touches or crosses either observed edge | `WindowOutsideBounds` |

use crate::error::{ExtractionError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default fixed padding in days (12 long cadences).
pub const DEFAULT_FIXED_MARGIN: f64 = 6.0 / 24.0;

/// Default lower bound of randomized padding in days.
pub const DEFAULT_RANDOM_MARGIN_LOWER: f64 = 3.0 / 24.0;

/// Default upper bound of randomized padding in days.
pub const DEFAULT_RANDOM_MARGIN_UPPER: f64 = 1.0;

/// Closed time interval with `start <= stop`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    start: f64,
    stop: f64,
}

impl Window {
    /// Create a window, rejecting reversed or non-finite bounds.
    pub fn new(start: f64, stop: f64) -> Result<Self> {
        if !start.is_finite() || !stop.is_finite() || start > stop {
            return Err(ExtractionError::InvalidWindow { start, stop });
        }
        Ok(Self { start, stop })
    }

    #[inline]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[inline]
    pub fn stop(&self) -> f64 {
        self.stop
    }

    /// Length of the window.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.stop - self.start
    }

    /// Whether `t` lies in the closed interval.
    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.stop
    }

    /// Whether the two closed intervals share at least one point.
    #[inline]
    pub fn overlaps(&self, other: &Window) -> bool {
        !(self.stop < other.start || self.start > other.stop)
    }

    /// Whether this window lies strictly inside `(start, stop)`.
    #[inline]
    pub fn strictly_inside(&self, start: f64, stop: f64) -> bool {
        start < self.start && self.stop < stop
    }
}

/// Padding applied around the raw transit before slicing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum TolerancePolicy {
    /// Same margin on both sides.
    Fixed { margin: f64 },

    /// Each side drawn independently from `[lower, upper]` on every call.
    Randomized { lower: f64, upper: f64 },
}

impl Default for TolerancePolicy {
    fn default() -> Self {
        Self::Randomized {
            lower: DEFAULT_RANDOM_MARGIN_LOWER,
            upper: DEFAULT_RANDOM_MARGIN_UPPER,
        }
    }
}

impl TolerancePolicy {
    /// Fixed padding of six hours.
    pub fn fixed_default() -> Self {
        Self::Fixed {
            margin: DEFAULT_FIXED_MARGIN,
        }
    }

    /// Draw `(pad_lo, pad_hi)`.
    ///
    /// `Fixed` consumes no randomness. `Randomized` draws the lower pad
    /// first, then the upper pad.
    pub fn padding<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, f64) {
        match *self {
            Self::Fixed { margin } => (margin, margin),
            Self::Randomized { lower, upper } => {
                let lo = rng.gen_range(lower..=upper);
                let hi = rng.gen_range(lower..=upper);
                (lo, hi)
            }
        }
    }

    /// Validate the policy parameters.
    pub fn validate(&self) -> std::result::Result<(), String> {
        match *self {
            Self::Fixed { margin } => {
                if !margin.is_finite() || margin < 0.0 {
                    return Err(format!("fixed margin must be finite and >= 0, got {margin}"));
                }
            }
            Self::Randomized { lower, upper } => {
                if !lower.is_finite() || !upper.is_finite() {
                    return Err("randomized margin bounds must be finite".to_string());
                }
                if lower < 0.0 {
                    return Err(format!("randomized margin lower bound must be >= 0, got {lower}"));
                }
                if lower > upper {
                    return Err(format!(
                        "randomized margin lower bound ({lower}) exceeds upper bound ({upper})"
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Periodic transit ephemeris in the light curve's time unit (days).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ephemeris {
    /// Reference time of one known mid-transit.
    pub epoch: f64,
    /// Time between successive transits (> 0).
    pub period: f64,
    /// Full transit duration (> 0).
    pub duration: f64,
}

/// Output of [`compute_transit_window`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitWindow {
    /// Padded extraction window.
    pub window: Window,
    /// Raw, unpadded transit bounds used for labeling.
    pub transit: Window,
    /// Mid-transit time of the selected occurrence.
    pub mid_transit: f64,
    /// Number of periods from the epoch to the selected occurrence.
    pub elapsed_periods: f64,
}

/// Number of periods from `epoch` to the first occurrence strictly after
/// `observed_start`.
#[inline]
pub fn elapsed_periods(observed_start: f64, epoch: f64, period: f64) -> f64 {
    ((observed_start - epoch) / period).floor() + 1.0
}

/// Compute the padded extraction window for the next transit after
/// `observed_start`.
///
/// # Example
///
/// ```
/// use transit_extractor::window::{compute_transit_window, Ephemeris, TolerancePolicy};
///
/// let eph = Ephemeris { epoch: 100.0, period: 10.0, duration: 0.5 };
/// let policy = TolerancePolicy::Fixed { margin: 0.25 };
/// let tw = compute_transit_window(105.0, 200.0, &eph, &policy, &mut rand::thread_rng()).unwrap();
///
/// assert_eq!(tw.mid_transit, 110.0);
/// assert_eq!(tw.transit.start(), 109.75);
/// assert_eq!(tw.window.start(), 109.5);
/// assert_eq!(tw.window.stop(), 110.5);
/// ```
pub fn compute_transit_window<R: Rng + ?Sized>(
    observed_start: f64,
    observed_stop: f64,
    ephemeris: &Ephemeris,
    tolerance: &TolerancePolicy,
    rng: &mut R,
) -> Result<TransitWindow> {
    tolerance.validate().map_err(ExtractionError::InvalidConfig)?;

    let k = elapsed_periods(observed_start, ephemeris.epoch, ephemeris.period);
    let mid_transit = ephemeris.epoch + ephemeris.period * k;
    let half_width = ephemeris.duration / 2.0;
    let transit_start = mid_transit - half_width;
    let transit_stop = mid_transit + half_width;

    if observed_start >= transit_stop || observed_stop <= transit_start {
        return Err(ExtractionError::NoTransitInRange {
            observed_start,
            observed_stop,
            transit_start,
            transit_stop,
        });
    }

    let (pad_lo, pad_hi) = tolerance.padding(rng);
    let window_start = transit_start - pad_lo;
    let window_stop = transit_stop + pad_hi;

    if observed_start >= window_start || observed_stop <= window_stop {
        return Err(ExtractionError::WindowOutsideBounds {
            observed_start,
            observed_stop,
            window_start,
            window_stop,
        });
    }

    log::debug!(
        "transit k={} mid={} raw=[{}, {}] window=[{}, {}]",
        k,
        mid_transit,
        transit_start,
        transit_stop,
        window_start,
        window_stop
    );

    Ok(TransitWindow {
        window: Window::new(window_start, window_stop)?,
        transit: Window::new(transit_start, transit_stop)?,
        mid_transit,
        elapsed_periods: k,
    })
}
