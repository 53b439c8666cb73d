//! Text normalization and k-gram extraction.
//!
//! Normalization turns raw text into a matchable form while keeping enough
//! information to point back at the original bytes:
//!
//! - letters and digits are casefolded and kept,
//! - punctuation and symbols are dropped,
//! - whitespace runs collapse to a single ASCII space,
//! - the result never starts or ends with a space.
//!
//! Alongside the normalized string we return one byte offset per emitted
//! code point: where in the original string that code point came from. A
//! collapsed space maps to the first whitespace code point of its run.
//!
//! Ingestion and querying use the exact same function, so a query matches a
//! sentence iff their normalized forms match. The function is pure and
//! idempotent: `normalize(normalize(x)) == normalize(x)`.

/// Resolve a code point to its base character.
///
/// With the `unicode-normalization` feature, canonical decomposition is
/// applied and combining marks are discarded, so `é` classifies (and
/// matches) as `e`. Without it, the code point is classified as-is.
#[cfg(feature = "unicode-normalization")]
fn base_char(c: char) -> char {
    use unicode_normalization::char::{decompose_canonical, is_combining_mark};
    let mut base = None;
    decompose_canonical(c, |d| {
        if base.is_none() && !is_combining_mark(d) {
            base = Some(d);
        }
    });
    base.unwrap_or(c)
}

#[cfg(not(feature = "unicode-normalization"))]
fn base_char(c: char) -> char {
    c
}

/// Lowercase a code point, keeping exactly one output code point.
///
/// Multi-character lowercase expansions emit only their first character so
/// the offset map stays one strictly-increasing entry per emitted code
/// point.
fn casefold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Normalize `text` and return the normalized string together with the map
/// from normalized code-point index to originating byte offset in `text`.
pub fn normalize_and_map(text: &str) -> (String, Vec<u32>) {
    let mut out = String::with_capacity(text.len());
    let mut map: Vec<u32> = Vec::with_capacity(text.len());
    // Byte offset of the first whitespace code point of the current run,
    // if a run is pending. Punctuation does not break a run.
    let mut pending_space: Option<u32> = None;

    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if pending_space.is_none() {
                pending_space = Some(i as u32);
            }
            continue;
        }
        let base = base_char(ch);
        if base.is_alphanumeric() {
            if let Some(space_at) = pending_space.take() {
                if !out.is_empty() {
                    out.push(' ');
                    map.push(space_at);
                }
            }
            out.push(casefold(base));
            map.push(i as u32);
        }
        // Punctuation and symbols are dropped without breaking a space run.
    }

    debug_assert_eq!(out.chars().count(), map.len());
    (out, map)
}

/// Normalize `text`, discarding the offset map.
pub fn normalize(text: &str) -> String {
    normalize_and_map(text).0
}

/// Distinct k-grams of `s`, measured in code points, in first-occurrence
/// order.
///
/// A string shorter than `k` yields all of its distinct non-empty
/// substrings instead, so short sentences remain findable. The empty string
/// yields nothing.
pub fn kgrams(s: &str, k: usize) -> Vec<&str> {
    let bounds: Vec<usize> = s
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()))
        .collect();
    let n = bounds.len() - 1;
    if n == 0 || k == 0 {
        return Vec::new();
    }

    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    if n < k {
        for i in 0..n {
            for j in i + 1..=n {
                let g = &s[bounds[i]..bounds[j]];
                if seen.insert(g) {
                    out.push(g);
                }
            }
        }
    } else {
        for i in 0..=n - k {
            let g = &s[bounds[i]..bounds[i + k]];
            if seen.insert(g) {
                out.push(g);
            }
        }
    }
    out
}
