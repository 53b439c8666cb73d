//! Positional word index for prefix-oriented autocomplete.
//!
//! Built from each sentence's normalized text: every whitespace-delimited
//! token gets postings of `(sentence_id, token_position)`, and the distinct
//! terms form a sorted lexicon. The lexicon answers two questions cheaply:
//! which terms start with this prefix (binary search for the range), and
//! which nearby terms are within one edit of it (a bounded band scan around
//! the range — the lexicon is sorted, so most one-edit neighbours share a
//! long prefix and sit close by; the band is a heuristic, not a guarantee).
//!
//! Candidate selection here is generous on purpose: the scanner and scorer
//! downstream enforce the actual match rules.

use std::collections::HashMap;

use crate::score::{hamming_one, one_added_in_query, one_missing_in_query};

/// Sorted term lexicon plus positional postings.
#[derive(Debug, Default)]
pub struct WordIndex {
    lexicon: Vec<String>,
    postings: HashMap<String, Vec<(u32, u32)>>,
}

impl WordIndex {
    /// Build from `(sentence_id, normalized_text)` pairs.
    pub fn build<I>(sentences: I) -> Self
    where
        I: IntoIterator<Item = (u32, String)>,
    {
        let mut postings: HashMap<String, Vec<(u32, u32)>> = HashMap::new();
        for (id, normalized) in sentences {
            for (pos, token) in normalized.split(' ').filter(|t| !t.is_empty()).enumerate() {
                postings
                    .entry(token.to_owned())
                    .or_default()
                    .push((id, pos as u32));
            }
        }
        let mut lexicon: Vec<String> = postings.keys().cloned().collect();
        lexicon.sort_unstable();
        Self { lexicon, postings }
    }

    pub fn lexicon(&self) -> &[String] {
        &self.lexicon
    }

    pub fn contains(&self, term: &str) -> bool {
        self.postings.contains_key(term)
    }

    /// Number of occurrences of `term` across the corpus.
    pub fn term_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, Vec::len)
    }

    /// Postings for an exact term, or an empty slice.
    pub fn postings(&self, term: &str) -> &[(u32, u32)] {
        self.postings.get(term).map_or(&[], Vec::as_slice)
    }

    /// Index of the first lexicon entry `>= term`.
    pub fn bisect(&self, term: &str) -> usize {
        self.lexicon.partition_point(|t| t.as_str() < term)
    }

    /// Lexicon terms starting with `prefix`, plus terms within one edit of
    /// it from a band of `neighbor_band` entries on each side of the
    /// prefix range. At most `max_terms` terms total.
    fn expand_prefix_terms(
        &self,
        prefix: &str,
        max_terms: usize,
        neighbor_band: usize,
    ) -> Vec<&str> {
        let lo = self.bisect(prefix);
        let mut terms: Vec<&str> = Vec::new();
        let mut hi = lo;
        while hi < self.lexicon.len()
            && terms.len() < max_terms
            && self.lexicon[hi].starts_with(prefix)
        {
            terms.push(self.lexicon[hi].as_str());
            hi += 1;
        }

        if terms.len() < max_terms {
            let w_lo = lo.saturating_sub(neighbor_band);
            let w_hi = (hi + neighbor_band).min(self.lexicon.len());
            let prefix_chars: Vec<char> = prefix.chars().collect();
            for t in &self.lexicon[w_lo..w_hi] {
                if t.starts_with(prefix) {
                    continue; // already collected above
                }
                if within_one_edit(&prefix_chars, t) {
                    terms.push(t.as_str());
                    if terms.len() >= max_terms {
                        break;
                    }
                }
            }
        }
        terms
    }

    /// Sentence ids whose text could complete `prefix` as a word, bounded
    /// by `max_terms` lexicon expansions and `max_candidates` ids.
    /// Ascending.
    pub fn candidates_for_term_prefix(
        &self,
        prefix: &str,
        max_terms: usize,
        max_candidates: usize,
        neighbor_band: usize,
    ) -> Vec<u32> {
        let mut out: Vec<u32> = Vec::new();
        let mut seen = std::collections::HashSet::new();
        'terms: for term in self.expand_prefix_terms(prefix, max_terms, neighbor_band) {
            for &(sid, _) in self.postings(term) {
                if seen.insert(sid) {
                    out.push(sid);
                    if out.len() >= max_candidates {
                        break 'terms;
                    }
                }
            }
        }
        out.sort_unstable();
        out
    }

    /// Sentence ids that could match a whole prefix query: every head token
    /// as a whole word, the last token as a word prefix — or, when the raw
    /// query ended in whitespace, every token as a whole word with a
    /// further word required after them (the scanner enforces that part).
    pub fn candidates_for_prefix_query(
        &self,
        query_norm: &str,
        trailing_space: bool,
        max_terms: usize,
        max_candidates: usize,
        neighbor_band: usize,
    ) -> Vec<u32> {
        let tokens: Vec<&str> = query_norm.split_whitespace().collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let (heads, last) = if trailing_space {
            (&tokens[..], None)
        } else {
            (&tokens[..tokens.len() - 1], Some(tokens[tokens.len() - 1]))
        };

        // Head tokens must appear as whole terms; a head with no postings
        // sinks the query.
        let mut head_sets: Vec<std::collections::HashSet<u32>> = Vec::with_capacity(heads.len());
        for head in heads {
            let set: std::collections::HashSet<u32> =
                self.postings(head).iter().map(|&(sid, _)| sid).collect();
            if set.is_empty() {
                return Vec::new();
            }
            head_sets.push(set);
        }

        let mut out: Vec<u32> = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut push_if_fits = |sid: u32, out: &mut Vec<u32>, seen: &mut std::collections::HashSet<u32>| {
            if head_sets.iter().all(|set| set.contains(&sid)) && seen.insert(sid) {
                out.push(sid);
            }
        };

        match last {
            Some(prefix) => {
                'terms: for term in self.expand_prefix_terms(prefix, max_terms, neighbor_band) {
                    for &(sid, _) in self.postings(term) {
                        push_if_fits(sid, &mut out, &mut seen);
                        if out.len() >= max_candidates {
                            break 'terms;
                        }
                    }
                }
            }
            None => {
                // All tokens are heads; candidates are the intersection of
                // their postings.
                let (smallest, rest) = match head_sets.split_first() {
                    Some(x) => x,
                    None => return Vec::new(),
                };
                for &sid in smallest {
                    if rest.iter().all(|set| set.contains(&sid)) && seen.insert(sid) {
                        out.push(sid);
                        if out.len() >= max_candidates {
                            break;
                        }
                    }
                }
            }
        }

        out.sort_unstable();
        out
    }
}

/// Tolerant one-edit check used for lexicon expansion. Equal strings count
/// as within one edit; a trailing leftover counts as the one edit.
fn within_one_edit(a_chars: &[char], b: &str) -> bool {
    let b_chars: Vec<char> = b.chars().collect();
    let (al, bl) = (a_chars.len(), b_chars.len());
    if al == bl {
        return a_chars == b_chars.as_slice() || hamming_one(a_chars, &b_chars).is_some();
    }
    if al + 1 == bl {
        return one_missing_in_query(a_chars, &b_chars).is_some();
    }
    if bl + 1 == al {
        return one_added_in_query(a_chars, &b_chars).is_some();
    }
    false
}
