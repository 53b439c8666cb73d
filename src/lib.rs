//! Typo-tolerant autocomplete over static text corpora.
//!
//! Given a user-typed prefix (possibly containing one typographic error),
//! return the top-k matching sentences from a previously ingested body of
//! text files — each with a score, a file path, and the byte offset where
//! the match begins. Interactive latency over millions of sentences comes
//! from two memory-mapped files with O(1) open cost and a bounded
//! candidate-selection stage in front of the scorer.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐    ┌─────────────┐    ┌─────────────┐
//! │ normalize  │───▶│  build      │───▶│  acx / cdb  │
//! │ (casefold, │    │ (discover,  │    │ (mmap k-gram│
//! │ offset map)│    │  split)     │    │  + records) │
//! └────────────┘    └─────────────┘    └─────────────┘
//!        │                                    │
//!        ▼                                    ▼
//! ┌────────────┐    ┌─────────────┐    ┌─────────────┐
//! │ index      │───▶│   score     │◀───│   engine    │
//! │ (candidate │    │ (exact +    │    │ (rank,      │
//! │  selection)│    │  one edit)  │    │  top-k)     │
//! └────────────┘    └─────────────┘    └─────────────┘
//! ```
//!
//! The optional prefix pipeline swaps candidate selection for a positional
//! word index ([`words`]) and runs the query through a one-edit token
//! corrector ([`augment`]) first.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::PathBuf;
//! use foreword::{BuildOptions, Engine};
//!
//! # fn main() -> foreword::Result<()> {
//! let options = BuildOptions {
//!     acx_path: Some(PathBuf::from("index.acx")),
//!     cdb_path: Some(PathBuf::from("corpus.cdb")),
//!     ..Default::default()
//! };
//! let engine = Engine::build(&[PathBuf::from("./corpus")], &options)?;
//! for hit in engine.complete("to be or", 5) {
//!     println!("{:>4}  {}:{}  {}", hit.score, hit.source_text, hit.offset, hit.completed_sentence);
//! }
//! # Ok(()) }
//! ```

pub mod acx;
pub mod augment;
mod binio;
pub mod build;
pub mod cdb;
pub mod config;
pub mod engine;
mod error;
pub mod index;
pub mod normalize;
pub mod score;
pub mod store;
pub mod types;
pub mod words;

pub use acx::{AcxIndex, AcxWriter, Postings};
pub use augment::{augment_query, Augmented, TokenFix};
pub use cdb::{lines_sidecar_path, CdbStore, CdbWriter, LineOffsets};
pub use config::Limits;
pub use engine::{BuildOptions, Engine};
pub use error::{Error, Result};
pub use index::{FrozenIndex, KgramIndex};
pub use normalize::{kgrams, normalize, normalize_and_map};
pub use score::{best_match, indel_penalty, sub_penalty, ScoredSpan};
pub use store::{MemoryStore, SentenceStore};
pub use types::{Completion, SearchMode, Sentence, TextUnit};
pub use words::WordIndex;
