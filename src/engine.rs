//! The engine: wires ingestion, persistence, candidate selection, scoring,
//! and ranking into one object.
//!
//! Build once, query many: after [`Engine::build`] or [`Engine::load`] all
//! shared state (k-gram index, sentence store, word index, line offsets) is
//! immutable, so any number of `complete` calls may run concurrently on
//! shared references without locks. Results for the same query on the same
//! engine are identical across calls and processes.
//!
//! Query pipeline: normalize → (augment in prefix mode) → candidate
//! selection → score each candidate sentence → map the match start back
//! through `norm_to_orig` to an absolute byte offset → rank by
//! `(score DESC, completed_sentence ASC)` → top-k.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::acx::{AcxIndex, AcxWriter};
use crate::augment::augment_query;
use crate::build;
use crate::cdb::{lines_sidecar_path, CdbStore, CdbWriter, LineOffsets};
use crate::config::{Limits, GRAM};
use crate::error::Result;
use crate::index::{FrozenIndex, KgramIndex};
use crate::normalize::{kgrams, normalize};
use crate::score::best_match;
use crate::store::{MemoryStore, SentenceStore};
use crate::types::{Completion, SearchMode, Sentence, TextUnit};
use crate::words::WordIndex;

/// Everything `Engine::build` needs to know.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub unit: TextUnit,
    pub mode: SearchMode,
    /// Persist the k-gram index here (atomically) when set.
    pub acx_path: Option<PathBuf>,
    /// Persist the sentence store (and its line sidecar) here when set.
    /// The engine then serves reads from the memory-mapped file.
    pub cdb_path: Option<PathBuf>,
    /// Show a progress bar while reading source files.
    pub progress: bool,
}

/// An autocomplete engine over one ingested corpus.
pub struct Engine {
    mode: SearchMode,
    limits: Limits,
    kgrams: KgramIndex,
    store: Box<dyn SentenceStore>,
    words: WordIndex,
    lines: LineOffsets,
}

impl Engine {
    /// Ingest `roots`, build all indexes, and persist them when paths are
    /// given.
    pub fn build(roots: &[PathBuf], options: &BuildOptions) -> Result<Self> {
        let corpus = build::load_corpus(roots, options.unit, options.progress)?;

        let mut acc: HashMap<String, HashSet<u32>> = HashMap::new();
        for s in &corpus.sentences {
            for gram in kgrams(&s.normalized, GRAM) {
                acc.entry(gram.to_owned()).or_default().insert(s.id);
            }
        }
        let frozen = FrozenIndex::from_accumulator(GRAM, acc);
        log::info!(
            "built k-gram index: {} keys over {} sentences",
            frozen.key_count(),
            corpus.sentences.len()
        );

        if let Some(path) = &options.acx_path {
            AcxWriter::new(GRAM as u32).save(path, frozen.items())?;
            log::info!("saved k-gram index to {}", path.display());
        }

        let words = WordIndex::build(
            corpus
                .sentences
                .iter()
                .map(|s| (s.id, s.normalized.clone())),
        );

        let lines = corpus.lines.clone();
        let store: Box<dyn SentenceStore> = match &options.cdb_path {
            Some(path) => {
                CdbWriter::save(path, &corpus.sentences)?;
                lines.save(&lines_sidecar_path(path))?;
                log::info!("saved sentence store to {}", path.display());
                Box::new(CdbStore::open(path)?)
            }
            None => Box::new(MemoryStore::new(corpus.sentences)),
        };

        Ok(Self {
            mode: options.mode,
            limits: Limits::default(),
            kgrams: KgramIndex::Frozen(frozen),
            store,
            words,
            lines,
        })
    }

    /// Memory-map previously persisted ACX and CDB files.
    ///
    /// The word index is rebuilt by streaming the store; the line sidecar
    /// is picked up from next to the CDB file.
    pub fn load(acx_path: &Path, cdb_path: &Path, mode: SearchMode) -> Result<Self> {
        let acx = AcxIndex::open(acx_path)?;
        let store = CdbStore::open(cdb_path)?;

        let sidecar = lines_sidecar_path(cdb_path);
        let lines = match LineOffsets::load(&sidecar) {
            Ok(lines) => lines,
            Err(err) => {
                log::warn!(
                    "no usable line sidecar at {} ({err}); offsets fall back to column-only",
                    sidecar.display()
                );
                LineOffsets::default()
            }
        };

        let ids = store.ids();
        let words = WordIndex::build(
            ids.iter()
                .filter_map(|&id| store.get(id).ok())
                .map(|s| (s.id, s.normalized)),
        );
        log::info!(
            "loaded {} sentences, {} k-gram keys, {} terms",
            store.count(),
            acx.key_count(),
            words.lexicon().len()
        );

        Ok(Self {
            mode,
            limits: Limits::default(),
            kgrams: KgramIndex::Mapped(acx),
            store: Box::new(store),
            words,
            lines,
        })
    }

    /// Replace the per-query resource limits.
    pub fn set_limits(&mut self, limits: Limits) {
        self.limits = limits;
    }

    pub fn sentence_count(&self) -> usize {
        self.store.count()
    }

    /// Apply an overlay edit; visible to queries, never persisted.
    pub fn overlay_put(&mut self, s: Sentence) {
        self.store.overlay_put(s);
    }

    /// Hide a sentence from queries; never persisted.
    pub fn overlay_delete(&mut self, id: u32) {
        self.store.overlay_delete(id);
    }

    /// Top-k completions for `query`. Empty queries and queries with no
    /// candidates return an empty list; nothing here errors.
    pub fn complete(&self, query: &str, k: usize) -> Vec<Completion> {
        if k == 0 {
            return Vec::new();
        }
        let mut results = match self.mode {
            SearchMode::Substring => self.complete_substring(query),
            SearchMode::Prefix => self.complete_prefix(query),
        };
        // Candidates were visited in ascending id order and the sort is
        // stable, so equal (score, sentence) pairs keep a deterministic
        // order.
        results.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.completed_sentence.cmp(&b.completed_sentence))
        });
        results.truncate(k);
        results
    }

    fn complete_substring(&self, query: &str) -> Vec<Completion> {
        let q_norm = normalize(query);
        if q_norm.is_empty() {
            return Vec::new();
        }
        let q_chars: Vec<char> = q_norm.chars().collect();
        let candidates = self
            .kgrams
            .candidate_ids(&q_norm, self.limits.max_candidates);

        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for id in candidates {
            let Ok(s) = self.store.get(id) else { continue };
            if !s.mapping_is_valid() {
                continue;
            }
            let s_chars: Vec<char> = s.normalized.chars().collect();
            let Some(m) = best_match(&s_chars, &q_chars) else {
                continue;
            };
            let offset = self.resolve_offset(&s, m.start);
            if seen.insert((s.path.clone(), s.line_no, offset, m.score)) {
                out.push(Completion {
                    completed_sentence: s.original,
                    source_text: s.path,
                    offset,
                    score: m.score,
                });
            }
        }
        out
    }

    fn complete_prefix(&self, query: &str) -> Vec<Completion> {
        let aug = augment_query(query, &self.words);
        let tokens: Vec<&str> = aug.corrected.split_whitespace().collect();
        if tokens.is_empty() {
            return Vec::new();
        }
        let corrected_len: i32 = tokens.iter().map(|t| t.chars().count() as i32).sum::<i32>()
            + tokens.len() as i32
            - 1;
        let score = 2 * corrected_len + aug.total_penalty;

        let candidates = self.words.candidates_for_prefix_query(
            aug.corrected.trim_end(),
            aug.trailing_space,
            self.limits.max_prefix_terms,
            self.limits.max_prefix_candidates,
            crate::config::PREFIX_NEIGHBOR_BAND,
        );

        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for id in candidates {
            let Ok(s) = self.store.get(id) else { continue };
            if !s.mapping_is_valid() {
                continue;
            }
            let Some((start, end)) = prefix_scan(&s.normalized, &tokens, aug.trailing_space)
            else {
                continue;
            };
            if !span_is_clean(&s, start, end) {
                continue;
            }
            let offset = self.resolve_offset(&s, start);
            if seen.insert((s.path.clone(), s.line_no, offset, score)) {
                out.push(Completion {
                    completed_sentence: s.original,
                    source_text: s.path,
                    offset,
                    score,
                });
            }
        }
        out
    }

    /// Absolute byte offset in the source file for a match starting at
    /// normalized code point `start_norm` of `s`.
    ///
    /// `norm_to_orig` gives the byte within the (possibly multi-line)
    /// original block; newlines before it shift the line, the line table
    /// supplies the file base.
    fn resolve_offset(&self, s: &Sentence, start_norm: usize) -> u64 {
        let in_block = s.norm_to_orig.get(start_norm).copied().unwrap_or(0) as usize;
        let in_block = in_block.min(s.original.len());
        let before = &s.original.as_bytes()[..in_block];
        let line_add = before.iter().filter(|&&b| b == b'\n').count() as u32;
        let col = match before.iter().rposition(|&b| b == b'\n') {
            Some(nl) => (in_block - nl - 1) as u64,
            None => in_block as u64,
        };
        let base = self
            .lines
            .start_of_line(&s.path, s.line_no + line_add)
            .unwrap_or(0);
        base + col
    }

    /// Release resources. Maps unmap in reverse open order: store (CDB)
    /// first, then the k-gram index (ACX).
    pub fn shutdown(self) {
        let Engine {
            kgrams,
            store,
            words,
            lines,
            ..
        } = self;
        drop(words);
        drop(lines);
        drop(store);
        drop(kgrams);
        log::info!("engine shut down");
    }
}

/// Find the earliest word-prefix match of `tokens` in single-spaced
/// normalized text.
///
/// Head tokens must equal consecutive whole words. Without
/// `needs_following_word`, the last token must be a prefix of the next
/// word; with it, every token is a whole word and one further word must
/// follow. Returns `(start, end)` code-point indices of the matched span.
fn prefix_scan(
    normalized: &str,
    tokens: &[&str],
    needs_following_word: bool,
) -> Option<(usize, usize)> {
    if normalized.is_empty() || tokens.is_empty() {
        return None;
    }
    // (char offset, word) pairs; the text is single-spaced by construction.
    let mut words: Vec<(usize, &str)> = Vec::new();
    let mut pos = 0;
    for w in normalized.split(' ') {
        words.push((pos, w));
        pos += w.chars().count() + 1;
    }

    let t = tokens.len();
    for i in 0..words.len() {
        if needs_following_word {
            if i + t >= words.len() {
                break;
            }
            if tokens
                .iter()
                .zip(&words[i..i + t])
                .all(|(tok, (_, w))| tok == w)
            {
                let (extra_start, extra) = words[i + t];
                return Some((words[i].0, extra_start + extra.chars().count()));
            }
        } else {
            if i + t > words.len() {
                break;
            }
            let heads_match = tokens[..t - 1]
                .iter()
                .zip(&words[i..i + t - 1])
                .all(|(tok, (_, w))| tok == w);
            let (last_start, last_word) = words[i + t - 1];
            if heads_match && last_word.starts_with(tokens[t - 1]) {
                let end = last_start + tokens[t - 1].chars().count();
                return Some((words[i].0, end));
            }
        }
    }
    None
}

/// Strict word-prefix guard: the matched span's original bytes must hold
/// only alphanumeric or whitespace code points. A match spanning an
/// apostrophe or hyphen inside a word is rejected.
fn span_is_clean(s: &Sentence, start: usize, end: usize) -> bool {
    if end == 0 || end > s.norm_to_orig.len() {
        return true;
    }
    let a = s.norm_to_orig[start] as usize;
    let b = s.norm_to_orig[end - 1] as usize;
    for (i, ch) in s.original[a..].char_indices() {
        if a + i > b {
            break;
        }
        if !ch.is_alphanumeric() && !ch.is_whitespace() {
            return false;
        }
    }
    true
}
