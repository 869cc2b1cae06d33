//! Negative-window sampling.
//!
//! Draws a random window that does not intersect the positive (transit)
//! window of the same light curve. Candidates start at an observed
//! timestamp and last a random duration; the first disjoint candidate is
//! accepted. Sampling gives up after a bounded number of attempts.
//!
//! Candidates are not clipped to the observed span. A window that runs past
//! the last sample simply slices fewer rows.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use transit_extractor::{sampling::NegativeSampler, Window};
//!
//! let times: Vec<f64> = (0..1000).map(|i| 100.0 + i as f64 * 0.02).collect();
//! let positive = Window::new(109.5, 110.5).unwrap();
//! let sampler = NegativeSampler::new(0.25, 1.0, 100).unwrap();
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let neg = sampler.sample(&times, &positive, &mut rng).unwrap();
//! assert!(!neg.window.overlaps(&positive));
//! ```

use crate::error::{ExtractionError, Result};
use crate::window::Window;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default shortest negative window (days).
pub const DEFAULT_MIN_DURATION: f64 = 3.0 / 24.0;

/// Default longest negative window (days).
pub const DEFAULT_MAX_DURATION: f64 = 1.0;

/// Default retry budget.
pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

/// Negative sampling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegativeSamplingConfig {
    /// Produce a negative segment alongside each positive one.
    pub enabled: bool,

    /// Lower bound of the negative window duration (days).
    pub min_duration: f64,

    /// Upper bound of the negative window duration (days).
    pub max_duration: f64,

    /// Candidates drawn before giving up.
    pub max_attempts: usize,
}

impl Default for NegativeSamplingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_duration: DEFAULT_MIN_DURATION,
            max_duration: DEFAULT_MAX_DURATION,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl NegativeSamplingConfig {
    /// Disabled configuration with default bounds.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.min_duration.is_finite() || !self.max_duration.is_finite() {
            return Err("negative durations must be finite".to_string());
        }
        if self.min_duration <= 0.0 {
            return Err(format!(
                "negative min_duration must be > 0, got {}",
                self.min_duration
            ));
        }
        if self.min_duration > self.max_duration {
            return Err(format!(
                "negative min_duration ({}) exceeds max_duration ({})",
                self.min_duration, self.max_duration
            ));
        }
        if self.max_attempts == 0 {
            return Err("negative max_attempts must be > 0".to_string());
        }
        Ok(())
    }
}

/// An accepted negative window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegativeSample {
    pub window: Window,
    /// Attempts used, including the accepted one.
    pub attempts: usize,
}

/// Bounded-retry sampler for windows disjoint from a positive window.
#[derive(Debug, Clone)]
pub struct NegativeSampler {
    min_duration: f64,
    max_duration: f64,
    max_attempts: usize,
}

impl NegativeSampler {
    /// Create a sampler, validating the duration bounds and retry budget.
    pub fn new(min_duration: f64, max_duration: f64, max_attempts: usize) -> Result<Self> {
        let config = NegativeSamplingConfig {
            enabled: true,
            min_duration,
            max_duration,
            max_attempts,
        };
        Self::from_config(&config)
    }

    pub fn from_config(config: &NegativeSamplingConfig) -> Result<Self> {
        config.validate().map_err(ExtractionError::InvalidConfig)?;
        Ok(Self {
            min_duration: config.min_duration,
            max_duration: config.max_duration,
            max_attempts: config.max_attempts,
        })
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Draw a window disjoint from `avoid`.
    ///
    /// Each attempt draws a fresh duration from `[min, max]` and a start
    /// uniformly from `times`. A candidate is accepted when
    /// `stop < avoid.start` or `start > avoid.stop`.
    ///
    /// # Errors
    ///
    /// `NegativeSampleExhausted` when no candidate is accepted within the
    /// retry budget, or immediately when `times` is empty.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        times: &[f64],
        avoid: &Window,
        rng: &mut R,
    ) -> Result<NegativeSample> {
        for attempt in 1..=self.max_attempts {
            let duration = rng.gen_range(self.min_duration..=self.max_duration);
            let Some(&start) = times.choose(rng) else {
                return Err(ExtractionError::NegativeSampleExhausted { attempts: 0 });
            };
            let stop = start + duration;

            if stop < avoid.start() || start > avoid.stop() {
                return Ok(NegativeSample {
                    window: Window::new(start, stop)?,
                    attempts: attempt,
                });
            }
        }

        Err(ExtractionError::NegativeSampleExhausted {
            attempts: self.max_attempts,
        })
    }
}
