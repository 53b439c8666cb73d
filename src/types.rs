//! The building blocks of the autocomplete engine.
//!
//! A [`Sentence`] is the unit of retrieval: one line (or paragraph, or
//! sliding window of lines) of a source file, kept both verbatim and in
//! normalized form, with a per-code-point map back into the original bytes.
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - **Sentence**: `norm_to_orig.len() == normalized.chars().count()`, every
//!   entry is `< original.len()`, and entries are strictly increasing. A
//!   record that violates this is treated as having no normalized text at
//!   all — it can never match, but it never panics either.
//! - **Sentence ids** are dense `0..N-1` in file-discovery order and stable
//!   for the life of an index. The k-gram postings and the store table both
//!   key on them.

use serde::{Deserialize, Serialize};

/// The unit of retrieval: one block of a source file.
///
/// `original` holds the exact bytes as read (without the trailing line
/// terminator); `normalized` is the matchable form produced by
/// [`crate::normalize::normalize_and_map`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    /// Dense id, assigned in file-discovery order.
    pub id: u32,
    /// Source file path, relative to the ingestion root that contained it.
    pub path: String,
    /// First line of the block in the source file (0-based).
    pub line_no: u32,
    /// Verbatim block text.
    pub original: String,
    /// Casefolded, punctuation-free, single-spaced form of `original`.
    pub normalized: String,
    /// `norm_to_orig[i]` is the byte offset into `original` that produced
    /// the i-th code point of `normalized`. Strictly increasing.
    pub norm_to_orig: Vec<u32>,
}

impl Sentence {
    /// Whether the offset map is usable: one strictly-increasing in-bounds
    /// entry per normalized code point.
    ///
    /// Sentences failing this check contribute no matches (the scorer is
    /// never run against them).
    pub fn mapping_is_valid(&self) -> bool {
        if self.norm_to_orig.len() != self.normalized.chars().count() {
            return false;
        }
        let len = self.original.len() as u32;
        let mut prev: Option<u32> = None;
        for &off in &self.norm_to_orig {
            if off >= len {
                return false;
            }
            if let Some(p) = prev {
                if off <= p {
                    return false;
                }
            }
            prev = Some(off);
        }
        true
    }
}

/// What users see when they get a completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    /// The matched sentence, verbatim.
    pub completed_sentence: String,
    /// Source file path of the sentence.
    pub source_text: String,
    /// Byte offset within the source file where the match begins.
    pub offset: u64,
    /// Match score; higher is better, one-edit matches score below exact.
    pub score: i32,
}

/// How source files are split into sentences at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextUnit {
    /// One sentence per line.
    #[default]
    Line,
    /// One sentence per blank-line-delimited paragraph.
    Paragraph,
    /// Overlapping windows of `size` lines, sliding by `step`.
    Window { size: usize, step: usize },
}

/// Which query pipeline a loaded engine runs.
///
/// The two modes are independent code paths chosen per engine instance;
/// there is no runtime switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// K-gram candidates scored with the exact + one-edit window scorer.
    #[default]
    Substring,
    /// Word-prefix candidates: head tokens as whole words, last token as a
    /// word prefix, with one-edit token correction against the lexicon.
    Prefix,
}
