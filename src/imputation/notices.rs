//! Once-per-run notices for non-fatal conditions.

use std::collections::HashMap;
use std::fmt;
use tracing::info;

/// A category of non-fatal condition raised by a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NoticeKind {
    /// A geographic cell had no neighbor with a usable value.
    NoNeighborValues,
    /// A series had too few known points for the whole-series fit.
    TooFewPointsForGlobalFit,
    /// The refinement model could not be fitted.
    ModelFitFailed,
    /// A series still had gaps when refinement started.
    SeriesNotComplete,
}

impl NoticeKind {
    fn message(&self) -> &'static str {
        match self {
            NoticeKind::NoNeighborValues => "neighbors have no value for some cells; left missing",
            NoticeKind::TooFewPointsForGlobalFit => {
                "some series have too few known points for a global fit; left missing"
            }
            NoticeKind::ModelFitFailed => {
                "refinement model could not be fitted for some series; imputations kept"
            }
            NoticeKind::SeriesNotComplete => {
                "some series still have gaps before refinement; skipped"
            }
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Counts notices and logs each kind the first time it is seen.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    counts: HashMap<NoticeKind, usize>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence. Returns `true` on the first of its kind.
    pub fn record(&mut self, kind: NoticeKind) -> bool {
        let count = self.counts.entry(kind).or_insert(0);
        *count += 1;
        let first = *count == 1;
        if first {
            info!(notice = ?kind, "{kind}");
        }
        first
    }

    pub fn count(&self, kind: NoticeKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Kinds seen so far, in a stable order.
    pub fn kinds(&self) -> Vec<NoticeKind> {
        let mut kinds: Vec<NoticeKind> = self.counts.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }
}
