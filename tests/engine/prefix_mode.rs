//! Prefix pipeline: augmentation, word-prefix scanning, and the strict
//! word-break guard.

use crate::common::{memory_engine, prefix_engine};

#[test]
fn last_token_completes_as_a_word_prefix() {
    let (_dir, engine) = prefix_engine(&[(
        "a.txt",
        "to be or not to be\nto bet on horses\ntomorrow never knows\n",
    )]);

    let results = engine.complete("to b", 5);
    let texts: Vec<&str> = results
        .iter()
        .map(|r| r.completed_sentence.as_str())
        .collect();
    assert!(texts.contains(&"to be or not to be"));
    assert!(texts.contains(&"to bet on horses"));
    // "to" must match as a whole word, so "tomorrow ..." stays out.
    assert!(!texts.contains(&"tomorrow never knows"));
}

#[test]
fn head_tokens_must_be_whole_words() {
    let (_dir, engine) = prefix_engine(&[("a.txt", "tomorrow begins today\n")]);
    assert!(engine.complete("to b", 5).is_empty());
}

#[test]
fn trailing_space_requires_a_following_word() {
    let (_dir, engine) = prefix_engine(&[("a.txt", "to be or\nto be\n")]);

    let results = engine.complete("to be ", 5);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].completed_sentence, "to be or");
}

#[test]
fn typo_in_head_token_is_corrected() {
    // "2o" corrects to "to" (frequent, one substitution away).
    let (_dir, engine) = prefix_engine(&[(
        "a.txt",
        "to be or not to be\nto the lighthouse\n25 degrees\n",
    )]);

    let results = engine.complete("2o b", 5);
    assert!(!results.is_empty());
    assert_eq!(results[0].completed_sentence, "to be or not to be");
    // The correction cost shows up in the score: 2·|"to b"| − 5.
    assert_eq!(results[0].score, 2 * 4 - 5);
}

#[test]
fn clean_prefix_scores_twice_corrected_length() {
    let (_dir, engine) = prefix_engine(&[("a.txt", "alpha beta gamma\n")]);
    let results = engine.complete("alpha b", 5);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 2 * 7);
    // Match starts at the beginning of "alpha".
    assert_eq!(results[0].offset, 0);
}

#[test]
fn word_break_guard_rejects_inner_punctuation() {
    let (_dir, engine) = prefix_engine(&[("a.txt", "don't stop\n")]);
    // Normalized text is "dont stop", but the span of "dont" crosses the
    // apostrophe in the original bytes.
    assert!(engine.complete("dont", 5).is_empty());

    // The substring pipeline has no such guard.
    let (_dir2, engine2) = memory_engine(&[("a.txt", "don't stop\n")]);
    assert!(!engine2.complete("dont", 5).is_empty());
}

#[test]
fn offsets_point_at_the_matched_word() {
    let (_dir, engine) = prefix_engine(&[("a.txt", "first line\nsay hello world\n")]);
    let results = engine.complete("hello w", 5);
    assert_eq!(results.len(), 1);
    // "first line\n" is 11 bytes; "say " is 4 more.
    assert_eq!(results[0].offset, 15);
}

#[test]
fn empty_and_unknown_queries_return_nothing() {
    let (_dir, engine) = prefix_engine(&[("a.txt", "alpha beta\n")]);
    assert!(engine.complete("", 5).is_empty());
    assert!(engine.complete("zzgx qqpt", 5).is_empty());
}
