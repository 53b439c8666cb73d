//! Persistence: build → save → reload gives identical answers, and the
//! file formats fail loudly when damaged.

use std::fs;

use crate::common::{persisted_engine, write_corpus};
use foreword::{
    AcxIndex, AcxWriter, BuildOptions, CdbStore, Engine, Error, SearchMode, SentenceStore,
};

#[test]
fn reloaded_engine_matches_freshly_built() {
    let files = &[
        ("one.txt", "To be, or not to be: that is the question.\nhello world\n"),
        ("two.txt", "the quick brown fox\ninsert text\n"),
    ];

    let dir = tempfile::tempdir().unwrap();
    let corpus_dir = dir.path().join("corpus");
    fs::create_dir_all(&corpus_dir).unwrap();
    write_corpus(&corpus_dir, files);

    let acx = dir.path().join("index.acx");
    let cdb = dir.path().join("corpus.cdb");
    let options = BuildOptions {
        acx_path: Some(acx.clone()),
        cdb_path: Some(cdb.clone()),
        ..Default::default()
    };
    let built = Engine::build(&[corpus_dir], &options).unwrap();
    let loaded = Engine::load(&acx, &cdb, SearchMode::Substring).unwrap();

    for query in ["to be", "helpo", "nsert", "quick brown", "qu", "missing"] {
        assert_eq!(
            built.complete(query, 10),
            loaded.complete(query, 10),
            "built and loaded engines disagree on {query:?}"
        );
    }
}

#[test]
fn results_are_identical_across_separate_loads() {
    let (_dir, first) = persisted_engine(
        &[("a.txt", "alpha beta\nalpha zeta\ngamma delta\n")],
        SearchMode::Substring,
    );
    let results = first.complete("alpha", 5);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].completed_sentence, "alpha beta");

    let (_dir2, second) = persisted_engine(
        &[("a.txt", "alpha beta\nalpha zeta\ngamma delta\n")],
        SearchMode::Substring,
    );
    assert_eq!(second.complete("alpha", 5), results);
}

#[test]
fn prefix_mode_survives_reload() {
    let (_dir, engine) = persisted_engine(
        &[("a.txt", "to be or not to be\nto bet on horses\n")],
        SearchMode::Prefix,
    );
    let results = engine.complete("to b", 5);
    assert_eq!(results.len(), 2);
}

#[test]
fn acx_magic_mismatch_fails_open() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("bogus.acx");
    fs::write(&bogus, b"CDB1\x00\x00\x00\x00\x00\x00\x00\x00").unwrap();
    assert!(matches!(
        AcxIndex::open(&bogus),
        Err(Error::InvalidFormat { kind: "acx", .. })
    ));
}

#[test]
fn cdb_magic_mismatch_fails_open() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("bogus.cdb");
    fs::write(&bogus, b"ACX1\x00\x00\x00\x00").unwrap();
    assert!(matches!(
        CdbStore::open(&bogus),
        Err(Error::InvalidFormat { kind: "cdb", .. })
    ));
}

#[test]
fn engine_load_surfaces_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let err = Engine::load(
        &dir.path().join("nope.acx"),
        &dir.path().join("nope.cdb"),
        SearchMode::Substring,
    );
    assert!(matches!(err, Err(Error::Io(_))));
}

#[test]
fn acx_round_trips_through_the_writer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grams.acx");
    let the = [5u32, 1, 3];
    let cat = [2u32, 2, 9];
    AcxWriter::new(3)
        .save(&path, vec![("the", &the[..]), ("cat", &cat[..])])
        .unwrap();

    let ix = AcxIndex::open(&path).unwrap();
    assert_eq!(ix.get("the").collect::<Vec<_>>(), vec![1, 3, 5]);
    assert_eq!(ix.get("cat").collect::<Vec<_>>(), vec![2, 9]);
    assert!(ix.get("dog").is_empty());
}

#[test]
fn truncated_store_surfaces_corrupt_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_dir = dir.path().join("c");
    fs::create_dir_all(&corpus_dir).unwrap();
    write_corpus(&corpus_dir, &[("a.txt", "a fairly long sentence to clip\n")]);
    let acx = dir.path().join("i.acx");
    let cdb = dir.path().join("c.cdb");
    let options = BuildOptions {
        acx_path: Some(acx),
        cdb_path: Some(cdb.clone()),
        ..Default::default()
    };
    Engine::build(&[corpus_dir], &options).unwrap().shutdown();

    let bytes = fs::read(&cdb).unwrap();
    fs::write(&cdb, &bytes[..bytes.len() - 8]).unwrap();
    let store = CdbStore::open(&cdb).unwrap();
    assert!(matches!(store.get(0), Err(Error::Corrupt(_))));

    // A clipped record never aborts a query; it just contributes nothing.
    let lines = dir.path().join("c.cdb.lines");
    assert!(lines.exists());
}

#[test]
fn line_sidecar_is_written_next_to_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_dir = dir.path().join("c");
    fs::create_dir_all(&corpus_dir).unwrap();
    write_corpus(&corpus_dir, &[("a.txt", "one\ntwo\nthree\n")]);

    let cdb = dir.path().join("c.cdb");
    let options = BuildOptions {
        acx_path: Some(dir.path().join("i.acx")),
        cdb_path: Some(cdb.clone()),
        ..Default::default()
    };
    Engine::build(&[corpus_dir], &options).unwrap().shutdown();

    let lines = foreword::LineOffsets::load(&foreword::lines_sidecar_path(&cdb)).unwrap();
    assert_eq!(lines.start_of_line("a.txt", 0), Some(0));
    assert_eq!(lines.start_of_line("a.txt", 1), Some(4));
    assert_eq!(lines.start_of_line("a.txt", 2), Some(8));
}
