//! Corpus ingestion: file discovery, reading, and unit splitting.
//!
//! Discovery walks the given roots in sorted order so sentence ids come out
//! identical run to run. File *reads* may happen on a thread pool (see
//! `parallel`), but splitting and id assignment always run on the calling
//! thread afterwards, in (file, line) order — parallelism never leaks into
//! ids.
//!
//! Files that are not valid UTF-8 are decoded as Latin-1 rather than
//! skipped; files that cannot be read at all are logged and skipped.

mod parallel;

pub(crate) use parallel::read_sources;

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::cdb::LineOffsets;
use crate::error::Result;
use crate::normalize::normalize_and_map;
use crate::types::{Sentence, TextUnit};

/// Directories never descended into.
const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    "node_modules",
];

/// The loaded corpus: sentences in id order plus per-file line offsets.
#[derive(Debug, Default)]
pub struct Corpus {
    pub sentences: Vec<Sentence>,
    pub lines: LineOffsets,
}

/// A discovered source file: absolute path plus the relative path used in
/// results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceFile {
    pub abs: PathBuf,
    pub rel: String,
}

fn is_excluded(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| EXCLUDED_DIRS.contains(&name))
}

fn rel_path(abs: &Path, root: &Path) -> String {
    let rel = abs.strip_prefix(root).unwrap_or(abs);
    rel.to_string_lossy().replace('\\', "/")
}

/// Collect `*.txt` files under each root (a root that is itself a file is
/// taken as-is, whatever its extension). Sorted by relative path, then
/// deduplicated by it — the first root wins.
pub(crate) fn discover_files(roots: &[PathBuf]) -> Result<Vec<SourceFile>> {
    let mut files: Vec<SourceFile> = Vec::new();
    for root in roots {
        if root.is_file() {
            let rel = root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| root.to_string_lossy().into_owned());
            files.push(SourceFile {
                abs: root.clone(),
                rel,
            });
            continue;
        }
        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_excluded(e))
        {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    log::warn!("skipping unreadable directory entry: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let is_txt = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
            if !is_txt {
                continue;
            }
            files.push(SourceFile {
                abs: entry.path().to_path_buf(),
                rel: rel_path(entry.path(), root),
            });
        }
    }
    files.sort_by(|a, b| a.rel.cmp(&b.rel).then_with(|| a.abs.cmp(&b.abs)));
    files.dedup_by(|a, b| a.rel == b.rel);
    Ok(files)
}

/// Decode file bytes: UTF-8 when valid, Latin-1 otherwise.
pub(crate) fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(err) => err
            .into_bytes()
            .iter()
            .map(|&b| b as char)
            .collect(),
    }
}

/// Byte offset of the start of each line, EOLs counted as read.
pub(crate) fn line_starts(text: &str) -> Vec<u64> {
    let mut starts = vec![0u64];
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i as u64 + 1);
        }
    }
    // A trailing newline opens a line that has no content; drop it so the
    // table has exactly one entry per split line.
    if text.ends_with('\n') {
        starts.pop();
    }
    if text.is_empty() {
        starts.clear();
    }
    starts
}

/// Split into lines without terminators, `\r\n` and `\n` alike.
fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split_inclusive('\n')
        .map(|chunk| chunk.trim_end_matches('\n').trim_end_matches('\r'))
        .collect()
}

fn make_sentence(id: u32, path: &str, line_no: u32, original: String) -> Sentence {
    let (normalized, norm_to_orig) = normalize_and_map(&original);
    Sentence {
        id,
        path: path.to_owned(),
        line_no,
        original,
        normalized,
        norm_to_orig,
    }
}

/// Split one file's text into sentences, appending to `out` with ids
/// starting at `next_id`. Returns the next free id.
pub(crate) fn split_units(
    path: &str,
    text: &str,
    unit: TextUnit,
    next_id: u32,
    out: &mut Vec<Sentence>,
) -> u32 {
    let lines = split_lines(text);
    let mut id = next_id;
    match unit {
        TextUnit::Line => {
            for (i, line) in lines.iter().enumerate() {
                out.push(make_sentence(id, path, i as u32, (*line).to_owned()));
                id += 1;
            }
        }
        TextUnit::Paragraph => {
            let mut block: Vec<&str> = Vec::new();
            let mut block_start = 0u32;
            for (i, line) in lines.iter().enumerate() {
                if line.trim().is_empty() {
                    if !block.is_empty() {
                        out.push(make_sentence(id, path, block_start, block.join("\n")));
                        id += 1;
                        block.clear();
                    }
                } else {
                    if block.is_empty() {
                        block_start = i as u32;
                    }
                    block.push(line);
                }
            }
            if !block.is_empty() {
                out.push(make_sentence(id, path, block_start, block.join("\n")));
                id += 1;
            }
        }
        TextUnit::Window { size, step } => {
            let size = size.max(1);
            let step = step.max(1);
            let mut i = 0;
            while i + size <= lines.len() {
                let block = lines[i..i + size].join("\n");
                out.push(make_sentence(id, path, i as u32, block));
                id += 1;
                i += step;
            }
        }
    }
    id
}

/// Discover, read, and split the corpus. Sentence ids are dense `0..N-1`
/// in (file, block) order.
pub fn load_corpus(roots: &[PathBuf], unit: TextUnit, progress: bool) -> Result<Corpus> {
    let files = discover_files(roots)?;
    log::info!("discovered {} source files", files.len());

    let texts = read_sources(&files, progress);

    let mut corpus = Corpus::default();
    let mut next_id = 0u32;
    for (rel, text) in &texts {
        corpus.lines.insert(rel.clone(), line_starts(text));
        next_id = split_units(rel, text, unit, next_id, &mut corpus.sentences);
    }
    log::info!(
        "loaded {} sentences from {} files",
        corpus.sentences.len(),
        texts.len()
    );
    Ok(corpus)
}
