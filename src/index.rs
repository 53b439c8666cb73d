//! K-gram postings index and candidate selection.
//!
//! Two read-only backends sit behind one enum: [`FrozenIndex`] holds sorted
//! keys and postings in memory (the shape a build produces), and
//! [`crate::acx::AcxIndex`] serves the same data from a memory map. Freeze
//! is terminal — there is no insert after construction; builds accumulate
//! into a hashmap and freeze once.
//!
//! Candidate selection is recall-safe for one-edit matching: a sentence
//! containing *any* k-gram of the query is retained, so a sentence that
//! matches the query within one edit (and therefore shares all but a
//! handful of the query's grams) cannot be pruned away by a missing gram.
//! Queries shorter than k fall back to scanning the key directory for keys
//! that contain the query.

use std::collections::HashMap;

use crate::acx::{AcxIndex, Postings};
use crate::normalize::kgrams;

/// In-memory frozen k-gram index: sorted keys, sorted deduplicated
/// postings.
#[derive(Debug, Default)]
pub struct FrozenIndex {
    k: usize,
    keys: Vec<String>,
    postings: Vec<Vec<u32>>,
}

impl FrozenIndex {
    /// Freeze a build-time accumulator into sorted arrays.
    pub fn from_accumulator(
        k: usize,
        acc: HashMap<String, std::collections::HashSet<u32>>,
    ) -> Self {
        let mut items: Vec<(String, Vec<u32>)> = acc
            .into_iter()
            .map(|(key, ids)| {
                let mut ids: Vec<u32> = ids.into_iter().collect();
                ids.sort_unstable();
                (key, ids)
            })
            .collect();
        items.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

        let mut keys = Vec::with_capacity(items.len());
        let mut postings = Vec::with_capacity(items.len());
        for (key, ids) in items {
            keys.push(key);
            postings.push(ids);
        }
        Self { k, keys, postings }
    }

    pub fn get(&self, key: &str) -> &[u32] {
        match self
            .keys
            .binary_search_by(|k| k.as_bytes().cmp(key.as_bytes()))
        {
            Ok(i) => &self.postings[i],
            Err(_) => &[],
        }
    }

    /// `(key, postings)` pairs in ascending key order.
    pub fn items(&self) -> impl Iterator<Item = (&str, &[u32])> {
        self.keys
            .iter()
            .map(String::as_str)
            .zip(self.postings.iter().map(Vec::as_slice))
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

/// A postings view from either backend.
pub enum PostingsRef<'a> {
    Slice(std::slice::Iter<'a, u32>),
    Mapped(Postings<'a>),
}

impl Iterator for PostingsRef<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        match self {
            PostingsRef::Slice(it) => it.next().copied(),
            PostingsRef::Mapped(p) => p.next(),
        }
    }
}

/// The k-gram index a loaded engine queries, whichever backend it came
/// from.
pub enum KgramIndex {
    Frozen(FrozenIndex),
    Mapped(AcxIndex),
}

impl KgramIndex {
    pub fn k(&self) -> usize {
        match self {
            KgramIndex::Frozen(ix) => ix.k,
            KgramIndex::Mapped(ix) => ix.k(),
        }
    }

    pub fn key_count(&self) -> usize {
        match self {
            KgramIndex::Frozen(ix) => ix.key_count(),
            KgramIndex::Mapped(ix) => ix.key_count(),
        }
    }

    fn get(&self, key: &str) -> PostingsRef<'_> {
        match self {
            KgramIndex::Frozen(ix) => PostingsRef::Slice(ix.get(key).iter()),
            KgramIndex::Mapped(ix) => PostingsRef::Mapped(ix.get(key)),
        }
    }

    fn for_each_item(&self, f: &mut dyn FnMut(&str, PostingsRef<'_>)) {
        match self {
            KgramIndex::Frozen(ix) => {
                for (key, ids) in ix.items() {
                    f(key, PostingsRef::Slice(ids.iter()));
                }
            }
            KgramIndex::Mapped(ix) => {
                for (key, p) in ix.iter_items() {
                    f(key, PostingsRef::Mapped(p));
                }
            }
        }
    }

    /// Bounded candidate set for a normalized query, ascending by id.
    ///
    /// - Empty query → empty set.
    /// - `|Q| < k` → union of postings for directory keys containing the
    ///   query as a substring.
    /// - `|Q| ≥ k` → union of postings across the query's k-grams; empty
    ///   when no gram has any postings.
    ///
    /// When the union exceeds `max_candidates`, the ids with the most gram
    /// hits survive, ties broken by ascending id.
    pub fn candidate_ids(&self, query_norm: &str, max_candidates: usize) -> Vec<u32> {
        if query_norm.is_empty() {
            return Vec::new();
        }
        let qlen = query_norm.chars().count();
        let mut hits: HashMap<u32, u32> = HashMap::new();

        if qlen < self.k() {
            self.for_each_item(&mut |key, postings| {
                if key.contains(query_norm) {
                    for id in postings {
                        *hits.entry(id).or_insert(0) += 1;
                    }
                }
            });
        } else {
            for gram in kgrams(query_norm, self.k()) {
                for id in self.get(gram) {
                    *hits.entry(id).or_insert(0) += 1;
                }
            }
        }

        if hits.is_empty() {
            return Vec::new();
        }

        let mut ids: Vec<u32> = if max_candidates > 0 && hits.len() > max_candidates {
            let mut ranked: Vec<(u32, u32)> = hits.into_iter().collect();
            // Most gram hits first; ascending id breaks ties.
            ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            ranked.truncate(max_candidates);
            ranked.into_iter().map(|(id, _)| id).collect()
        } else {
            hits.into_keys().collect()
        };
        ids.sort_unstable();
        ids
    }
}
