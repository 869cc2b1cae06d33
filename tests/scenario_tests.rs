//! Reference scenarios for window computation, slicing, sampling and labeling.
//!
//! Numbers here are exact reference values; changing any of them changes the
//! produced datasets.

use rand::rngs::StdRng;
use rand::SeedableRng;
use transit_extractor::prelude::*;
use transit_extractor::window::elapsed_periods;

fn ephemeris() -> Ephemeris {
    Ephemeris {
        epoch: 100.0,
        period: 10.0,
        duration: 0.5,
    }
}

fn cadence(start: f64, stop: f64, step: f64) -> Vec<f64> {
    let n = ((stop - start) / step) as usize;
    (0..=n).map(|i| start + i as f64 * step).collect()
}

// ============================================================================
// Scenario A: occurrence selection
// ============================================================================

#[test]
fn test_scenario_a_first_occurrence() {
    let mut rng = StdRng::seed_from_u64(0);
    let tw = compute_transit_window(
        105.0,
        200.0,
        &ephemeris(),
        &TolerancePolicy::Fixed { margin: 0.25 },
        &mut rng,
    )
    .unwrap();

    assert_eq!(tw.elapsed_periods, 1.0);
    assert_eq!(tw.mid_transit, 110.0);
    assert_eq!(tw.transit.start(), 109.75);
    assert_eq!(tw.transit.stop(), 110.25);
}

#[test]
fn test_elapsed_periods_boundary_equal() {
    // an occurrence exactly at observed_start does not count
    assert_eq!(elapsed_periods(110.0, 100.0, 10.0), 2.0);
    assert_eq!(elapsed_periods(109.999, 100.0, 10.0), 1.0);
    assert_eq!(elapsed_periods(100.0, 100.0, 10.0), 1.0);

    // observation starting before the epoch
    assert_eq!(elapsed_periods(85.0, 100.0, 10.0), -1.0);
    assert_eq!(elapsed_periods(90.0, 100.0, 10.0), 0.0);
}

#[test]
fn test_no_transit_in_range() {
    // observation ends before the selected occurrence begins
    let mut rng = StdRng::seed_from_u64(0);
    let err = compute_transit_window(
        105.0,
        109.7,
        &ephemeris(),
        &TolerancePolicy::fixed_default(),
        &mut rng,
    )
    .unwrap_err();
    assert!(matches!(err, ExtractionError::NoTransitInRange { .. }));
}

#[test]
fn test_window_outside_bounds() {
    // transit overlaps the observation but the padding runs past its end
    let mut rng = StdRng::seed_from_u64(0);
    let err = compute_transit_window(
        105.0,
        110.3,
        &ephemeris(),
        &TolerancePolicy::Fixed { margin: 0.25 },
        &mut rng,
    )
    .unwrap_err();
    match err {
        ExtractionError::WindowOutsideBounds {
            window_start,
            window_stop,
            ..
        } => {
            assert_eq!(window_start, 109.5);
            assert_eq!(window_stop, 110.5);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_window_outside_bounds_at_start() {
    // transit [109.75, 110.25] overlaps, but the lower padding reaches 109.5
    for observed_start in [109.7, 109.5] {
        let mut rng = StdRng::seed_from_u64(0);
        let err = compute_transit_window(
            observed_start,
            200.0,
            &ephemeris(),
            &TolerancePolicy::Fixed { margin: 0.25 },
            &mut rng,
        )
        .unwrap_err();
        match err {
            ExtractionError::WindowOutsideBounds {
                window_start,
                window_stop,
                ..
            } => {
                assert_eq!(window_start, 109.5);
                assert_eq!(window_stop, 110.5);
            }
            other => panic!("unexpected error at {observed_start}: {other}"),
        }
    }
}

#[test]
fn test_unvalidated_policy_is_rejected() {
    let mut rng = StdRng::seed_from_u64(0);
    let err = compute_transit_window(
        105.0,
        200.0,
        &ephemeris(),
        &TolerancePolicy::Randomized {
            lower: 0.5,
            upper: 0.1,
        },
        &mut rng,
    )
    .unwrap_err();
    assert!(matches!(err, ExtractionError::InvalidConfig(_)));
}

// ============================================================================
// Scenario B: fixed padding and boundary search
// ============================================================================

#[test]
fn test_scenario_b_fixed_window_slice() {
    let mut rng = StdRng::seed_from_u64(0);
    let tw = compute_transit_window(
        105.0,
        200.0,
        &ephemeris(),
        &TolerancePolicy::Fixed { margin: 0.25 },
        &mut rng,
    )
    .unwrap();
    assert_eq!(tw.window, Window::new(109.5, 110.5).unwrap());

    let times = [109.0, 109.6, 110.0, 110.4, 110.6];
    let range = index_range(&times, &tw.window);
    assert_eq!(&times[range], &[109.6, 110.0, 110.4]);
}

#[test]
fn test_scenario_b_through_pipeline() {
    let times = vec![105.0, 109.0, 109.6, 110.0, 110.4, 110.6, 199.0];
    let flux = vec![1.0, 1.0, 0.99, 0.98, 0.99, 1.0, 1.0];
    let lc = LightCurve::new(times, flux, Metadata::new(), 105.0, 200.0).unwrap();
    let target = TargetEvent::new(1, 100.0, 10.0, 0.5, false).unwrap();

    let pipeline = PipelineBuilder::new()
        .fixed_tolerance(0.25)
        .without_negatives()
        .build()
        .unwrap();
    let ex = pipeline
        .extract_with_rng(&lc, &target, &mut StdRng::seed_from_u64(0))
        .unwrap();

    assert_eq!(ex.positive.times(), &[109.6, 110.0, 110.4]);
    assert_eq!(ex.positive.values(), &[0.99, 0.98, 0.99]);
    // 109.6 and 110.4 are padding, outside [109.75, 110.25]
    assert_eq!(ex.positive.in_transit(), &[0, 1, 0]);
    assert_eq!(ex.positive.eb_injection(), &[0, 0, 0]);
}

// ============================================================================
// Scenario C: negative sampling exhaustion
// ============================================================================

#[test]
fn test_scenario_c_negative_exhausted() {
    let positive = Window::new(109.5, 110.5).unwrap();
    // observed samples shrunk to the positive window
    let times = cadence(109.6, 110.4, 0.02);
    let sampler = NegativeSampler::new(0.25, 1.0, 100).unwrap();

    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        let err = sampler.sample(&times, &positive, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::NegativeSampleExhausted { attempts: 100 }
        ));
    }
}

#[test]
fn test_negative_window_truncated_at_series_end() {
    let positive = Window::new(109.5, 110.5).unwrap();
    let times = vec![105.0, 105.1, 109.6, 199.9];
    let sampler = NegativeSampler::new(0.5, 0.5, 1000).unwrap();
    let mut rng = StdRng::seed_from_u64(2);

    // keep sampling until the last sample is picked as a start
    let neg = loop {
        let neg = sampler.sample(&times, &positive, &mut rng).unwrap();
        if neg.window.start() == 199.9 {
            break neg;
        }
    };
    assert!(neg.window.stop() > 200.0);
    assert_eq!(index_range(&times, &neg.window), 3..4);
}

// ============================================================================
// Scenario D: eclipsing-binary injection
// ============================================================================

#[test]
fn test_scenario_d_eclipsing_binary() {
    let times = cadence(105.0, 200.0, 0.0204);
    let lc = LightCurve::new(times.clone(), vec![1.0; times.len()], Metadata::new(), 105.0, 200.0)
        .unwrap();
    let target = TargetEvent::new(7, 100.0, 10.0, 0.5, true).unwrap();

    let pipeline = ExtractionPipeline::new(ExtractionConfig::fixed()).unwrap();
    let ex = pipeline
        .extract_with_rng(&lc, &target, &mut StdRng::seed_from_u64(9))
        .unwrap();

    assert!(ex.positive.in_transit().iter().all(|&l| l == 0));
    for (t, _, _, eb) in ex.positive.rows() {
        assert_eq!(eb == 1, (109.75..=110.25).contains(&t));
    }
    assert!(ex.positive.eb_injection().contains(&1));
    assert!(matches!(
        ex.negative,
        NegativeOutcome::SuppressedEclipsingBinary
    ));
    assert_eq!(ex.segments().len(), 1);
    assert_eq!(
        ex.positive.metadata().get("EB_injection"),
        Some(&Some(MetaValue::Bool(true)))
    );
}
