//! End-to-end completion scenarios over small corpora.

use crate::common::memory_engine;
use foreword::Limits;

#[test]
fn exact_substring_match() {
    let (_dir, engine) = memory_engine(&[(
        "hamlet.txt",
        "To be, or not to be: that is the question.\n",
    )]);

    let results = engine.complete("to be", 5);
    assert!(!results.is_empty());
    let top = &results[0];
    assert_eq!(top.score, 10); // 2 × |"to be"|
    assert_eq!(top.offset, 0);
    assert_eq!(top.source_text, "hamlet.txt");
    assert_eq!(
        top.completed_sentence,
        "To be, or not to be: that is the question."
    );
}

#[test]
fn single_substitution() {
    let (_dir, engine) = memory_engine(&[("hello.txt", "hello world\n")]);

    let results = engine.complete("helpo", 5);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].completed_sentence, "hello world");
    // "helpo" vs "hello": one substitution at the fourth character.
    assert_eq!(results[0].score, 2 * 4 + foreword::sub_penalty(4));
}

#[test]
fn tie_break_is_lexicographic_on_sentence() {
    let (_dir, engine) = memory_engine(&[("greek.txt", "alpha zeta\nalpha beta\n")]);

    let results = engine.complete("alpha", 5);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].score, 10);
    assert_eq!(results[1].score, 10);
    assert_eq!(results[0].completed_sentence, "alpha beta");
    assert_eq!(results[1].completed_sentence, "alpha zeta");
    // Line 2 starts after "alpha zeta\n".
    assert_eq!(results[0].offset, 11);
    assert_eq!(results[1].offset, 0);
}

#[test]
fn missing_char_in_query() {
    let (_dir, engine) = memory_engine(&[("ins.txt", "insert text\n")]);

    let results = engine.complete("nsert", 5);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].completed_sentence, "insert text");
    // Missing character at position 1: 2·5 + (-10) = 0.
    assert_eq!(results[0].score, 0);
}

#[test]
fn unicode_normalization_recovers_match() {
    let (_dir, engine) = memory_engine(&[("cafe.txt", "Café con leche.\n")]);

    let results = engine.complete("cafe con", 5);
    assert!(!results.is_empty());
    let top = &results[0];
    assert_eq!(top.completed_sentence, "Café con leche.");
    assert_eq!(top.offset, 0);
}

#[test]
fn pruning_keeps_the_right_sentence() {
    let mut text = String::new();
    for i in 0..10_000 {
        text.push_str(&format!("filler sentence number {i}\n"));
    }
    text.push_str("the quick brown fox jumps over the lazy dog\n");
    let (_dir, mut engine) = memory_engine(&[("big.txt", &text)]);
    engine.set_limits(Limits {
        max_candidates: 100,
        ..Limits::default()
    });

    let results = engine.complete("quick brown", 5);
    assert!(!results.is_empty());
    assert_eq!(results[0].score, 2 * 11);
    assert_eq!(
        results[0].completed_sentence,
        "the quick brown fox jumps over the lazy dog"
    );
}

#[test]
fn empty_query_returns_nothing() {
    let (_dir, engine) = memory_engine(&[("a.txt", "anything at all\n")]);
    assert!(engine.complete("", 5).is_empty());
    assert!(engine.complete("   ", 5).is_empty());
    assert!(engine.complete("!!!", 5).is_empty());
}

#[test]
fn no_candidates_returns_nothing() {
    let (_dir, engine) = memory_engine(&[("a.txt", "alpha beta gamma\n")]);
    assert!(engine.complete("zzzzzz", 5).is_empty());
}

#[test]
fn short_query_uses_gram_substring_scan() {
    let (_dir, engine) = memory_engine(&[("a.txt", "hi there\nunrelated line\n")]);
    let results = engine.complete("hi", 5);
    assert!(!results.is_empty());
    assert_eq!(results[0].completed_sentence, "hi there");
    assert_eq!(results[0].score, 4);
}

#[test]
fn offsets_account_for_earlier_lines() {
    let (_dir, engine) = memory_engine(&[("a.txt", "first line\nsecond target here\n")]);
    let results = engine.complete("target", 5);
    assert_eq!(results.len(), 1);
    // "first line\n" is 11 bytes, "second " is 7 more.
    assert_eq!(results[0].offset, 18);
}

#[test]
fn multiple_files_are_searched() {
    let (_dir, engine) = memory_engine(&[
        ("one.txt", "the cat sat\n"),
        ("sub/two.txt", "the dog ran\n"),
    ]);
    let results = engine.complete("the", 5);
    assert_eq!(results.len(), 2);
    let paths: Vec<&str> = results.iter().map(|r| r.source_text.as_str()).collect();
    assert!(paths.contains(&"one.txt"));
    assert!(paths.contains(&"sub/two.txt"));
}

#[test]
fn window_blocks_resolve_offsets_across_lines() {
    use foreword::{BuildOptions, Engine, TextUnit};

    let dir = tempfile::tempdir().unwrap();
    crate::common::write_corpus(dir.path(), &[("w.txt", "aaa\nbbb target\nccc\n")]);
    let options = BuildOptions {
        unit: TextUnit::Window { size: 2, step: 1 },
        ..Default::default()
    };
    let engine = Engine::build(&[dir.path().to_path_buf()], &options).unwrap();

    // "target" sits on line 1 at column 4; "aaa\n" is 4 bytes.
    let results = engine.complete("target", 5);
    assert_eq!(results.len(), 2); // both overlapping windows contain it
    for r in &results {
        assert_eq!(r.offset, 8);
        assert_eq!(r.score, 12);
    }
    // Equal scores order by sentence text.
    assert_eq!(results[0].completed_sentence, "aaa\nbbb target");
    assert_eq!(results[1].completed_sentence, "bbb target\nccc");
}

#[test]
fn k_limits_result_count() {
    let text: String = (0..10).map(|i| format!("common word {i}\n")).collect();
    let (_dir, engine) = memory_engine(&[("a.txt", &text)]);
    let results = engine.complete("common", 3);
    assert_eq!(results.len(), 3);
    assert!(engine.complete("common", 0).is_empty());
}
