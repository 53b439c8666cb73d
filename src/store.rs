//! Sentence storage behind one read contract.
//!
//! The engine does not care where sentences live: freshly built corpora sit
//! in memory, loaded ones are decoded lazily from a memory-mapped CDB file.
//! Both go through [`SentenceStore`], and both support the same bounded
//! overlay for query-time edits. The base data is never mutated.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::types::Sentence;

/// Read access to sentences by id, plus an in-memory overlay.
///
/// Overlay semantics: `get` checks the overlay first, the deleted set
/// second, and the base data last. Overlay mutations are never persisted.
pub trait SentenceStore: Send + Sync {
    /// Fetch one sentence. `Err(NotFound)` for unknown or deleted ids.
    fn get(&self, id: u32) -> Result<Sentence>;

    /// Number of visible sentences (base minus deleted plus overlay-only).
    fn count(&self) -> usize;

    /// All visible ids, ascending.
    fn ids(&self) -> Vec<u32>;

    /// Insert or replace a sentence in the overlay.
    fn overlay_put(&mut self, s: Sentence);

    /// Hide a sentence. Unknown ids are remembered as deleted anyway.
    fn overlay_delete(&mut self, id: u32);

    /// Visit `ids` in the given order, skipping any that are not present
    /// (deleted ids included). Decode failures are skipped as well: a
    /// damaged record contributes no matches rather than aborting a query.
    fn iter<'a>(&'a self, ids: Vec<u32>) -> Box<dyn Iterator<Item = Sentence> + 'a>
    where
        Self: Sized,
    {
        Box::new(ids.into_iter().filter_map(move |id| self.get(id).ok()))
    }
}

/// HashMap-backed store for freshly built corpora and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: HashMap<u32, Sentence>,
    deleted: HashSet<u32>,
}

impl MemoryStore {
    pub fn new(sentences: Vec<Sentence>) -> Self {
        let rows = sentences.into_iter().map(|s| (s.id, s)).collect();
        Self {
            rows,
            deleted: HashSet::new(),
        }
    }
}

impl SentenceStore for MemoryStore {
    fn get(&self, id: u32) -> Result<Sentence> {
        if self.deleted.contains(&id) {
            return Err(Error::NotFound(id));
        }
        self.rows.get(&id).cloned().ok_or(Error::NotFound(id))
    }

    fn count(&self) -> usize {
        self.rows
            .keys()
            .filter(|id| !self.deleted.contains(id))
            .count()
    }

    fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .rows
            .keys()
            .copied()
            .filter(|id| !self.deleted.contains(id))
            .collect();
        ids.sort_unstable();
        ids
    }

    fn overlay_put(&mut self, s: Sentence) {
        self.deleted.remove(&s.id);
        self.rows.insert(s.id, s);
    }

    fn overlay_delete(&mut self, id: u32) {
        self.rows.remove(&id);
        self.deleted.insert(id);
    }
}
