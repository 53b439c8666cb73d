//! Parallel file reading for the build pipeline.
//!
//! Reading the corpus is the only I/O-bound part of a build, and it is
//! embarrassingly parallel. `par_iter` preserves input order in its output,
//! so the sequential and parallel paths produce byte-identical corpora —
//! ids are assigned after the reads either way.

use std::fs;

use super::{decode_text, SourceFile};

#[cfg(feature = "parallel")]
use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

fn read_one(file: &SourceFile) -> Option<(String, String)> {
    match fs::read(&file.abs) {
        Ok(bytes) => Some((file.rel.clone(), decode_text(bytes))),
        Err(err) => {
            log::warn!("skipping {}: {err}", file.abs.display());
            None
        }
    }
}

/// Read every file, in input order, skipping unreadable ones.
#[cfg(feature = "parallel")]
pub(crate) fn read_sources(files: &[SourceFile], progress: bool) -> Vec<(String, String)> {
    let bar = if progress {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} reading {pos}/{len} {wide_bar}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    } else {
        None
    };

    let out: Vec<(String, String)> = files
        .par_iter()
        .filter_map(|file| {
            let result = read_one(file);
            if let Some(bar) = &bar {
                bar.inc(1);
            }
            result
        })
        .collect();

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    out
}

/// Read every file sequentially, skipping unreadable ones.
#[cfg(not(feature = "parallel"))]
pub(crate) fn read_sources(files: &[SourceFile], _progress: bool) -> Vec<(String, String)> {
    files.iter().filter_map(read_one).collect()
}
