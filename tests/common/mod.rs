//! Shared test fixtures.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use foreword::{BuildOptions, Engine, SearchMode};

/// Write `(relative_path, contents)` pairs under `dir`.
pub fn write_corpus(dir: &Path, files: &[(&str, &str)]) {
    for (name, text) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }
}

/// Build an in-memory engine over a temp corpus.
pub fn memory_engine(files: &[(&str, &str)]) -> (TempDir, Engine) {
    engine_with_mode(files, SearchMode::Substring)
}

/// Build an in-memory engine running the prefix pipeline.
pub fn prefix_engine(files: &[(&str, &str)]) -> (TempDir, Engine) {
    engine_with_mode(files, SearchMode::Prefix)
}

fn engine_with_mode(files: &[(&str, &str)], mode: SearchMode) -> (TempDir, Engine) {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path(), files);
    let options = BuildOptions {
        mode,
        ..Default::default()
    };
    let engine = Engine::build(&[dir.path().to_path_buf()], &options).unwrap();
    (dir, engine)
}

/// Build with persistence, then reload the engine from the files on disk.
pub fn persisted_engine(files: &[(&str, &str)], mode: SearchMode) -> (TempDir, Engine) {
    let dir = tempfile::tempdir().unwrap();
    let corpus_dir = dir.path().join("corpus");
    fs::create_dir_all(&corpus_dir).unwrap();
    write_corpus(&corpus_dir, files);

    let acx = dir.path().join("index.acx");
    let cdb = dir.path().join("corpus.cdb");
    let options = BuildOptions {
        mode,
        acx_path: Some(acx.clone()),
        cdb_path: Some(cdb.clone()),
        ..Default::default()
    };
    let built = Engine::build(&[corpus_dir], &options).unwrap();
    built.shutdown();

    let engine = Engine::load(&acx, &cdb, mode).unwrap();
    (dir, engine)
}
