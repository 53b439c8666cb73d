//! Tuning defaults.
//!
//! Everything here is a soft limit: blowing past a cap returns a best-effort
//! result instead of an error. The defaults are sized for corpora of a few
//! million sentences on commodity hardware.

/// K-gram size for the inverted index.
pub const GRAM: usize = 3;

/// Default number of completions returned by `Engine::complete`.
pub const TOP_K: usize = 5;

/// Cap on sentence ids handed to the scorer per query. When more sentences
/// match, the ones with the most gram hits are kept (ties by ascending id).
pub const MAX_CANDIDATES: usize = 15_000;

/// Cap on lexicon terms expanded for a word-prefix query.
pub const MAX_PREFIX_TERMS: usize = 5_000;

/// Cap on the word-prefix candidate sentence set.
pub const MAX_PREFIX_CANDIDATES: usize = 20_000;

/// Lexicon neighborhood scanned (each side of the prefix range) for terms
/// within one edit of the typed prefix.
pub const PREFIX_NEIGHBOR_BAND: usize = 2_000;

/// Lexicon neighborhood scanned (each side of the bisect point) by the query
/// augmenter when a token is not in the lexicon.
pub const AUGMENT_NEIGHBOR_BAND: usize = 3_000;

/// Lines per block when indexing with `TextUnit::Window`.
pub const WINDOW_SIZE: usize = 3;

/// Lines to slide between windows.
pub const WINDOW_STEP: usize = 1;

/// Per-query resource limits, adjustable per engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_candidates: usize,
    pub max_prefix_terms: usize,
    pub max_prefix_candidates: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_candidates: MAX_CANDIDATES,
            max_prefix_terms: MAX_PREFIX_TERMS,
            max_prefix_candidates: MAX_PREFIX_CANDIDATES,
        }
    }
}
