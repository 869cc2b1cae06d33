//! Sorted-array boundary search.
//!
//! Finds the half-open index range of samples that fall inside a closed
//! time window. Callers pass time arrays that have already been validated as
//! strictly increasing (see [`crate::LightCurve::new`]); the search itself
//! performs no ordering checks.

use crate::window::Window;
use std::ops::Range;

/// Index range `[i_start, i_stop)` of `times` covered by `window`.
///
/// `times[i_start] >= window.start()` and `times[i_stop - 1] <= window.stop()`.
/// Both bounds are inclusive on the time axis. A window that contains no
/// samples yields an empty range positioned where the window would be.
///
/// # Performance
///
/// O(log n): two `partition_point` binary searches.
///
/// # Example
///
/// ```
/// use transit_extractor::{boundary::index_range, Window};
///
/// let times = [109.0, 109.6, 110.0, 110.4, 110.6];
/// let window = Window::new(109.5, 110.5).unwrap();
/// assert_eq!(index_range(&times, &window), 1..4);
/// ```
pub fn index_range(times: &[f64], window: &Window) -> Range<usize> {
    let start = times.partition_point(|&t| t < window.start());
    let stop = times.partition_point(|&t| t <= window.stop());
    // stop >= start whenever window.start() <= window.stop()
    start..stop.max(start)
}
