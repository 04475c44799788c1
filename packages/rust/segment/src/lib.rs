//! Heuristic clause segmentation for extracted contract text.
//!
//! Contracts arrive as a flat text blob. [`segment`] splits it into an ordered
//! list of clauses by trying a series of strategies (numbered clauses, then
//! paragraphs, then sentences) and keeping the first one that yields anything.

mod strategies;

use tracing::{debug, instrument};

pub use strategies::{
    MIN_CLAUSE_CHARS, SegmentStrategy, numbered_clauses, paragraphs, sentences,
};

/// Clauses produced by a segmentation run, with the strategy that found them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    /// Strategy that produced `clauses`, `None` when nothing was found.
    pub strategy: Option<SegmentStrategy>,
    /// Trimmed clauses in document order.
    pub clauses: Vec<String>,
}

/// Split contract text into clauses.
///
/// An empty result is not an error here; callers decide how to report it.
pub fn segment(text: &str) -> Vec<String> {
    segment_with_strategy(text).clauses
}

/// Split contract text into clauses and report which strategy succeeded.
#[instrument(skip_all, fields(text_len = text.len()))]
pub fn segment_with_strategy(text: &str) -> Segmentation {
    for (strategy, split) in strategies::STRATEGIES {
        let clauses = split(text);
        if !clauses.is_empty() {
            debug!(strategy = %strategy, clauses = clauses.len(), "segmentation succeeded");
            return Segmentation {
                strategy: Some(*strategy),
                clauses,
            };
        }
        debug!(strategy = %strategy, "strategy found no clauses");
    }

    Segmentation {
        strategy: None,
        clauses: Vec::new(),
    }
}
