//! Labeled training segments.

use crate::labeling::{LabelStats, Labels};
use crate::light_curve::{MetaValue, Metadata};
use crate::window::Window;
use std::fmt;

/// Metadata key recording whether the source target carries an injected
/// eclipsing binary.
pub const EB_INJECTION_KEY: &str = "EB_injection";

/// Whether a segment contains the transit or was sampled away from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Positive,
    Negative,
}

impl SegmentKind {
    /// File-name suffix used when persisting a segment.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            SegmentKind::Positive => "_quicklook",
            SegmentKind::Negative => "_quicklook_negative",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentKind::Positive => write!(f, "positive"),
            SegmentKind::Negative => write!(f, "negative"),
        }
    }
}

/// Slice of a light curve with per-sample labels.
///
/// Created once per successful extraction and immutable afterwards. All four
/// arrays have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSegment {
    kind: SegmentKind,
    window: Window,
    times: Vec<f64>,
    values: Vec<f64>,
    labels: Labels,
    metadata: Metadata,
}

impl LabeledSegment {
    /// Assemble a segment. `metadata` is the source header; the injection
    /// flag is added here.
    pub(crate) fn new(
        kind: SegmentKind,
        window: Window,
        times: &[f64],
        values: &[f64],
        labels: Labels,
        mut metadata: Metadata,
        is_eclipsing_binary: bool,
    ) -> Self {
        debug_assert_eq!(times.len(), values.len());
        debug_assert_eq!(times.len(), labels.len());
        metadata.insert(
            EB_INJECTION_KEY.to_string(),
            Some(MetaValue::Bool(is_eclipsing_binary)),
        );
        Self {
            kind,
            window,
            times: times.to_vec(),
            values: values.to_vec(),
            labels,
            metadata,
        }
    }

    #[inline]
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// Window the samples were sliced from.
    #[inline]
    pub fn window(&self) -> Window {
        self.window
    }

    #[inline]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn in_transit(&self) -> &[u8] {
        &self.labels.in_transit
    }

    #[inline]
    pub fn eb_injection(&self) -> &[u8] {
        &self.labels.eb_injection
    }

    #[inline]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn label_stats(&self) -> LabelStats {
        self.labels.stats()
    }

    /// Iterate rows as `(time, value, in_transit, eb_injection)`.
    pub fn rows(&self) -> impl Iterator<Item = (f64, f64, u8, u8)> + '_ {
        self.times
            .iter()
            .zip(&self.values)
            .zip(self.labels.in_transit.iter().zip(&self.labels.eb_injection))
            .map(|((&t, &v), (&a, &b))| (t, v, a, b))
    }
}
