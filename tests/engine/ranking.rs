//! Scoring and ordering behavior.

use crate::common::memory_engine;
use foreword::{indel_penalty, sub_penalty, Sentence};

#[test]
fn substitution_at_position_one_scores_three_for_five_char_query() {
    let (_dir, engine) = memory_engine(&[("a.txt", "jello world\n")]);
    let results = engine.complete("hello", 5);
    assert_eq!(results.len(), 1);
    // 2·(5−1) + (−5) = 3.
    assert_eq!(results[0].score, 3);
}

#[test]
fn penalties_degrade_with_position() {
    // The same substitution later in the query costs less.
    let (_dir, engine) = memory_engine(&[("a.txt", "abcdef\n")]);
    let early = engine.complete("xbcdef", 5)[0].score;
    let late = engine.complete("abcdxf", 5)[0].score;
    assert_eq!(early, 2 * 5 + sub_penalty(1));
    assert_eq!(late, 2 * 5 + sub_penalty(5));
    assert!(late > early);
}

#[test]
fn extra_char_in_query_scores_with_indel_penalty() {
    let (_dir, engine) = memory_engine(&[("a.txt", "the cat\n")]);
    let results = engine.complete("catt", 5);
    assert_eq!(results.len(), 1);
    // Window "cat", extra 't' at the end of the query (position 4):
    // 2·3 + (−4) = 2.
    assert_eq!(results[0].score, 2 * 3 + indel_penalty(4));
}

#[test]
fn exact_full_sentence_match() {
    let (_dir, engine) = memory_engine(&[("a.txt", "hello\n")]);
    let results = engine.complete("hello", 5);
    assert_eq!(results[0].score, 10);
}

#[test]
fn higher_scores_rank_first() {
    let (_dir, engine) = memory_engine(&[("a.txt", "hello world\nhelpo world\n")]);
    let results = engine.complete("hello", 5);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].completed_sentence, "hello world");
    assert!(results[0].score > results[1].score);
}

#[test]
fn determinism_across_calls() {
    let text: String = (0..200)
        .map(|i| format!("sentence number {i} with shared words\n"))
        .collect();
    let (_dir, engine) = memory_engine(&[("a.txt", &text)]);

    let first = engine.complete("shared words", 10);
    for _ in 0..5 {
        assert_eq!(engine.complete("shared words", 10), first);
    }
}

#[test]
fn overlay_edits_are_visible() {
    let (_dir, mut engine) = memory_engine(&[("a.txt", "hello world\ngoodbye world\n")]);

    // Shadow sentence 0 with different text; the candidate set still comes
    // from the built index, but scoring sees the overlay content.
    let (normalized, norm_to_orig) = foreword::normalize_and_map("hollow world");
    engine.overlay_put(Sentence {
        id: 0,
        path: "a.txt".to_string(),
        line_no: 0,
        original: "hollow world".to_string(),
        normalized,
        norm_to_orig,
    });
    let results = engine.complete("hello", 5);
    assert!(results
        .iter()
        .all(|r| r.completed_sentence != "hello world"));

    // Deleting hides the sentence entirely.
    engine.overlay_delete(0);
    engine.overlay_delete(1);
    assert!(engine.complete("hello", 5).is_empty());
}

#[test]
fn identical_sentences_in_different_files_both_show() {
    let (_dir, engine) = memory_engine(&[("a.txt", "same text\n"), ("b.txt", "same text\n")]);
    let results = engine.complete("same", 5);
    assert_eq!(results.len(), 2);
}
