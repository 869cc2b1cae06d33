//! Per-sample labels for extracted segments.
//!
//! Each sample of a segment carries two binary labels:
//!
//! | Label | Meaning |
//! |-------|---------|
//! | `in_transit` | sample lies inside a planetary transit |
//! | `eb_injection` | sample lies inside an injected eclipsing-binary event |
//!
//! The labels are mutually exclusive. For a target whose injected signal is
//! an eclipsing binary, samples inside the raw transit bounds are marked in
//! `eb_injection` and `in_transit` stays zero; for every other target the
//! reverse holds. Negative segments are all zeros by construction.
//!
//! Only the raw, unpadded transit bounds decide membership. Padding samples
//! are always labeled zero.

use crate::window::Window;

/// Label arrays aligned with a segment's samples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels {
    pub in_transit: Vec<u8>,
    pub eb_injection: Vec<u8>,
}

impl Labels {
    pub fn len(&self) -> usize {
        self.in_transit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_transit.is_empty()
    }

    /// Label counts.
    pub fn stats(&self) -> LabelStats {
        let in_transit = self.in_transit.iter().filter(|&&l| l == 1).count();
        let eb_injection = self.eb_injection.iter().filter(|&&l| l == 1).count();
        LabelStats {
            total: self.len(),
            in_transit,
            eb_injection,
            background: self.len() - in_transit - eb_injection,
        }
    }
}

/// Label distribution of one segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelStats {
    pub total: usize,
    pub in_transit: usize,
    pub eb_injection: usize,
    pub background: usize,
}

impl LabelStats {
    /// Fraction of samples marked in either label.
    pub fn event_fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.in_transit + self.eb_injection) as f64 / self.total as f64
        }
    }
}

/// Label `times` against the raw transit bounds.
///
/// # Example
///
/// ```
/// use transit_extractor::{labeling::build_labels, Window};
///
/// let transit = Window::new(109.75, 110.25).unwrap();
/// let labels = build_labels(&[109.6, 110.0, 110.4], &transit, false);
/// assert_eq!(labels.in_transit, vec![0, 1, 0]);
/// assert_eq!(labels.eb_injection, vec![0, 0, 0]);
/// ```
pub fn build_labels(times: &[f64], transit: &Window, is_eclipsing_binary: bool) -> Labels {
    let in_window: Vec<u8> = times.iter().map(|&t| u8::from(transit.contains(t))).collect();
    let zeros = vec![0u8; times.len()];

    if is_eclipsing_binary {
        Labels {
            in_transit: zeros,
            eb_injection: in_window,
        }
    } else {
        Labels {
            in_transit: in_window,
            eb_injection: zeros,
        }
    }
}

/// All-zero labels for a negative segment of `len` samples.
pub fn zero_labels(len: usize) -> Labels {
    Labels {
        in_transit: vec![0; len],
        eb_injection: vec![0; len],
    }
}
