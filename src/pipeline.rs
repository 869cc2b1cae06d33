//! Extraction pipeline for one light curve and one catalog target.
//!
//! Connects window computation, boundary search, negative sampling and
//! labeling:
//!
//! ```text
//! LightCurve + TargetEvent
//!        │
//!        ▼
//! compute_transit_window ──► Err(NoTransitInRange | WindowOutsideBounds)
//!        │
//!        ├──► index_range(window) ──► build_labels ──► positive LabeledSegment
//!        │
//!        └──► NegativeSampler (skipped for EB injections)
//!                   │
//!                   └──► index_range(neg) ──► zero_labels ──► negative LabeledSegment
//! ```
//!
//! The positive segment is the contract: [`ExtractionPipeline::extract`]
//! returns either a positive segment or the reason there is none. The
//! negative outcome rides along and never invalidates a positive result.
//!
//! # Randomness
//!
//! Randomized padding and negative sampling draw from a caller-supplied
//! generator ([`ExtractionPipeline::extract_with_rng`]), so a seeded
//! `StdRng` reproduces a run exactly. [`ExtractionPipeline::extract`] uses
//! the thread-local generator.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use transit_extractor::prelude::*;
//!
//! let times: Vec<f64> = (0..5000).map(|i| 105.0 + i as f64 * 0.0204).collect();
//! let flux = vec![1.0; times.len()];
//! let lc = LightCurve::new(times, flux, Metadata::new(), 105.0, 207.0).unwrap();
//! let target = TargetEvent::new(11183555, 100.0, 10.0, 0.5, false).unwrap();
//!
//! let pipeline = ExtractionPipeline::new(ExtractionConfig::fixed()).unwrap();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let extraction = pipeline.extract_with_rng(&lc, &target, &mut rng).unwrap();
//!
//! assert!(extraction.positive.in_transit().contains(&1));
//! assert!(extraction.negative_segment().is_some());
//! ```

use crate::catalog::{TargetCatalog, TargetEvent};
use crate::config::ExtractionConfig;
use crate::error::{ExtractionError, Result};
use crate::labeling::{build_labels, zero_labels};
use crate::light_curve::LightCurve;
use crate::sampling::{NegativeSample, NegativeSampler};
use crate::segment::{LabeledSegment, SegmentKind};
use crate::window::{compute_transit_window, TransitWindow};
use rand::Rng;

/// What happened to the optional negative segment.
#[derive(Debug)]
pub enum NegativeOutcome {
    /// Negative sampling is turned off in the configuration.
    Disabled,

    /// Target carries an injected eclipsing binary; no negative is produced.
    SuppressedEclipsingBinary,

    /// A disjoint window was found and sliced.
    Sampled {
        segment: LabeledSegment,
        attempts: usize,
    },

    /// Sampling failed; the positive segment is unaffected.
    Failed(ExtractionError),
}

impl NegativeOutcome {
    pub fn segment(&self) -> Option<&LabeledSegment> {
        match self {
            NegativeOutcome::Sampled { segment, .. } => Some(segment),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ExtractionError> {
        match self {
            NegativeOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Successful extraction for one `(LightCurve, TargetEvent)` pair.
#[derive(Debug)]
pub struct Extraction {
    pub target_id: u64,

    /// Selected transit occurrence and padded window.
    pub transit: TransitWindow,

    /// Segment covering the padded transit window.
    pub positive: LabeledSegment,

    pub negative: NegativeOutcome,
}

impl Extraction {
    pub fn negative_segment(&self) -> Option<&LabeledSegment> {
        self.negative.segment()
    }

    /// Produced segments, positive first.
    pub fn segments(&self) -> Vec<&LabeledSegment> {
        let mut out = vec![&self.positive];
        out.extend(self.negative_segment());
        out
    }
}

/// Stateless extraction engine; one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct ExtractionPipeline {
    config: ExtractionConfig,
    sampler: NegativeSampler,
}

impl ExtractionPipeline {
    /// Create a pipeline from a validated configuration.
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        config.validate()?;
        let sampler = NegativeSampler::from_config(&config.negative)?;
        Ok(Self { config, sampler })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract using the thread-local random generator.
    pub fn extract(&self, light_curve: &LightCurve, target: &TargetEvent) -> Result<Extraction> {
        self.extract_with_rng(light_curve, target, &mut rand::thread_rng())
    }

    /// Look `target_id` up in `catalog`, then extract.
    pub fn extract_from_catalog<R: Rng + ?Sized>(
        &self,
        light_curve: &LightCurve,
        catalog: &TargetCatalog,
        target_id: u64,
        rng: &mut R,
    ) -> Result<Extraction> {
        let target = catalog.get(target_id)?;
        self.extract_with_rng(light_curve, target, rng)
    }

    /// Extract the positive segment and, when configured, a negative one.
    ///
    /// # Errors
    ///
    /// - `NoTransitInRange` / `WindowOutsideBounds` from window computation
    /// - `EmptyExtraction` when the window holds no samples and
    ///   `keep_empty_segments` is off
    ///
    /// Negative-sampling failures are reported in [`Extraction::negative`].
    pub fn extract_with_rng<R: Rng + ?Sized>(
        &self,
        light_curve: &LightCurve,
        target: &TargetEvent,
        rng: &mut R,
    ) -> Result<Extraction> {
        let transit = compute_transit_window(
            light_curve.observed_start(),
            light_curve.observed_stop(),
            &target.ephemeris(),
            &self.config.tolerance,
            rng,
        )?;

        let range = light_curve.index_range(&transit.window);
        if range.is_empty() && !self.config.keep_empty_segments {
            return Err(ExtractionError::EmptyExtraction {
                start: transit.window.start(),
                stop: transit.window.stop(),
            });
        }
        log::debug!(
            "target {}: positive rows {}..{} of {}",
            target.id,
            range.start,
            range.end,
            light_curve.len()
        );

        let times = &light_curve.times()[range.clone()];
        let positive = LabeledSegment::new(
            SegmentKind::Positive,
            transit.window,
            times,
            &light_curve.values()[range],
            build_labels(times, &transit.transit, target.is_eclipsing_binary_injection),
            light_curve.metadata().clone(),
            target.is_eclipsing_binary_injection,
        );

        let negative = if !self.config.negative.enabled {
            NegativeOutcome::Disabled
        } else if target.is_eclipsing_binary_injection {
            NegativeOutcome::SuppressedEclipsingBinary
        } else {
            match self.sampler.sample(light_curve.times(), &transit.window, rng) {
                Ok(sample) => self.slice_negative(light_curve, target, sample),
                Err(err) => {
                    log::debug!("target {}: negative sampling failed: {}", target.id, err);
                    NegativeOutcome::Failed(err)
                }
            }
        };

        Ok(Extraction {
            target_id: target.id,
            transit,
            positive,
            negative,
        })
    }

    fn slice_negative(
        &self,
        light_curve: &LightCurve,
        target: &TargetEvent,
        sample: NegativeSample,
    ) -> NegativeOutcome {
        // The start is an observed timestamp, so the slice holds at least one row;
        // windows past the last sample are truncated.
        let range = light_curve.index_range(&sample.window);
        log::debug!(
            "target {}: negative rows {}..{} after {} attempts",
            target.id,
            range.start,
            range.end,
            sample.attempts
        );
        let times = &light_curve.times()[range.clone()];
        let segment = LabeledSegment::new(
            SegmentKind::Negative,
            sample.window,
            times,
            &light_curve.values()[range],
            zero_labels(times.len()),
            light_curve.metadata().clone(),
            false,
        );
        NegativeOutcome::Sampled {
            segment,
            attempts: sample.attempts,
        }
    }
}
