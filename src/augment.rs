//! One-edit query correction against the corpus lexicon.
//!
//! Each token of the raw query is either already a known term (kept, no
//! penalty) or replaced by the best lexicon term within one edit of it.
//! "Best" is a deterministic triple: highest term frequency first, then
//! the penalty closest to zero, then the lexicographically smaller term,
//! and finally a preference for alphabetic terms when the typed token
//! contains any letters. Penalties reuse the scorer's position tables, so
//! a corrected query ranks exactly as far below a clean one as the same
//! typo would inside a sentence.
//!
//! Candidate terms come from a bounded band of the sorted lexicon around
//! the token's insertion point. Tokens mixing letters and digits also get
//! a full lexicon scan: their one-edit neighbours (`2o` → `to`) can sort
//! arbitrarily far away.

use crate::config::AUGMENT_NEIGHBOR_BAND;
use crate::normalize::normalize;
use crate::score::{
    hamming_one, indel_penalty, one_added_in_query, one_missing_in_query, sub_penalty,
};
use crate::words::WordIndex;

/// One token's correction record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFix {
    pub original: String,
    pub corrected: String,
    /// 0 for kept tokens, negative for corrected ones.
    pub penalty: i32,
}

/// The corrected query and how it got that way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Augmented {
    /// Corrected tokens joined by single spaces; keeps a trailing space
    /// when the raw query had one.
    pub corrected: String,
    /// Sum of all token penalties (≤ 0).
    pub total_penalty: i32,
    pub tokens: Vec<TokenFix>,
    pub trailing_space: bool,
}

/// Penalty of the single edit turning `typed` into `term`, or `None` when
/// they are further than one edit apart.
fn one_edit_penalty(typed: &[char], term: &str) -> Option<i32> {
    let term_chars: Vec<char> = term.chars().collect();
    let (tl, ul) = (typed.len(), term_chars.len());
    if tl == ul {
        return hamming_one(typed, &term_chars).map(sub_penalty);
    }
    if tl == ul + 1 {
        // The typed token carries one extra character.
        return one_added_in_query(typed, &term_chars).map(indel_penalty);
    }
    if ul == tl + 1 {
        // The typed token is missing one character.
        return one_missing_in_query(typed, &term_chars).map(indel_penalty);
    }
    None
}

#[derive(Debug)]
struct Candidate<'a> {
    term: &'a str,
    tf: usize,
    penalty: i32,
}

/// `true` when `cand` should replace `best` under the preference order.
fn prefer(cand: &Candidate<'_>, best: &Candidate<'_>, typed_has_letters: bool) -> bool {
    if cand.tf != best.tf {
        return cand.tf > best.tf;
    }
    if cand.penalty != best.penalty {
        return cand.penalty > best.penalty;
    }
    if cand.term != best.term {
        // Prefer alphabetic replacements for alphabetic-looking input.
        if typed_has_letters {
            let ca = cand.term.chars().any(char::is_alphabetic);
            let ba = best.term.chars().any(char::is_alphabetic);
            if ca != ba {
                return ca;
            }
        }
        return cand.term < best.term;
    }
    false
}

fn correct_token<'a>(token: &'a str, words: &'a WordIndex) -> TokenFix {
    // Known terms are kept; so are prefixes of known terms, because a
    // prefix-in-progress is unfinished typing, not a typo.
    let at = words.bisect(token);
    if words.contains(token)
        || words
            .lexicon()
            .get(at)
            .is_some_and(|t| t.starts_with(token))
    {
        return TokenFix {
            original: token.to_owned(),
            corrected: token.to_owned(),
            penalty: 0,
        };
    }

    let typed: Vec<char> = token.chars().collect();
    let has_letters = token.chars().any(char::is_alphabetic);
    let has_digits = token.chars().any(char::is_numeric);
    let lexicon = words.lexicon();

    let mut best: Option<Candidate<'_>> = None;
    let mut consider = |term: &'a str| {
        if let Some(penalty) = one_edit_penalty(&typed, term) {
            let cand = Candidate {
                term,
                tf: words.term_frequency(term),
                penalty,
            };
            match &best {
                Some(b) if !prefer(&cand, b, has_letters) => {}
                _ => best = Some(cand),
            }
        }
    };

    if has_letters && has_digits {
        // Mixed tokens: the right correction can live anywhere.
        for term in lexicon {
            consider(term);
        }
    } else {
        let lo = at.saturating_sub(AUGMENT_NEIGHBOR_BAND);
        let hi = (at + AUGMENT_NEIGHBOR_BAND).min(lexicon.len());
        for term in &lexicon[lo..hi] {
            consider(term);
        }
    }

    match best {
        Some(c) => TokenFix {
            original: token.to_owned(),
            corrected: c.term.to_owned(),
            penalty: c.penalty,
        },
        None => TokenFix {
            original: token.to_owned(),
            corrected: token.to_owned(),
            penalty: 0,
        },
    }
}

/// Correct each token of `raw` by at most one edit against the lexicon.
pub fn augment_query(raw: &str, words: &WordIndex) -> Augmented {
    let normalized = normalize(raw);
    let trailing_space = raw.chars().next_back().is_some_and(char::is_whitespace);

    let tokens: Vec<TokenFix> = normalized
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(|t| correct_token(t, words))
        .collect();

    let mut corrected = tokens
        .iter()
        .map(|t| t.corrected.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    if trailing_space && !corrected.is_empty() {
        corrected.push(' ');
    }
    let total_penalty = tokens.iter().map(|t| t.penalty).sum();

    Augmented {
        corrected,
        total_penalty,
        tokens,
        trailing_space,
    }
}
