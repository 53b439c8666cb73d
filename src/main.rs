//! Foreword CLI: build, search, and inspect autocomplete indexes.
//!
//! ```bash
//! # Build the index pair from a directory of text files
//! foreword build ./corpus --acx index.acx --cdb corpus.cdb
//!
//! # Query it (typos welcome)
//! foreword search --acx index.acx --cdb corpus.cdb "to bee or"
//!
//! # Look inside either file
//! foreword inspect index.acx
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;

use foreword::{
    AcxIndex, BuildOptions, CdbStore, Completion, Engine, Result, SearchMode, SentenceStore,
};

mod cli;
use cli::{Cli, Commands, ModeArg, UnitArg};

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build {
            roots,
            acx,
            cdb,
            unit,
            window_size,
            window_step,
        } => run_build(&roots, acx, cdb, unit, window_size, window_step),
        Commands::Search {
            acx,
            cdb,
            query,
            limit,
            mode,
            json,
        } => run_search(&acx, &cdb, &query, limit, mode, json),
        Commands::Inspect { file } => run_inspect(&file),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run_build(
    roots: &[PathBuf],
    acx: PathBuf,
    cdb: PathBuf,
    unit: UnitArg,
    window_size: usize,
    window_step: usize,
) -> Result<()> {
    let started = Instant::now();
    let options = BuildOptions {
        unit: unit.to_unit(window_size, window_step),
        mode: SearchMode::Substring,
        acx_path: Some(acx.clone()),
        cdb_path: Some(cdb.clone()),
        progress: true,
    };
    let engine = Engine::build(roots, &options)?;
    println!(
        "indexed {} sentences in {:.2}s",
        engine.sentence_count(),
        started.elapsed().as_secs_f64()
    );
    println!("  k-gram index:   {}", acx.display());
    println!("  sentence store: {}", cdb.display());
    engine.shutdown();
    Ok(())
}

fn run_search(
    acx: &Path,
    cdb: &Path,
    query: &str,
    limit: usize,
    mode: ModeArg,
    json: bool,
) -> Result<()> {
    let engine = Engine::load(acx, cdb, SearchMode::from(mode))?;
    let started = Instant::now();
    let results = engine.complete(query, limit);
    let elapsed = started.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(query, &results, elapsed.as_secs_f64() * 1000.0);
    }
    engine.shutdown();
    Ok(())
}

fn print_results(query: &str, results: &[Completion], elapsed_ms: f64) {
    if results.is_empty() {
        println!("no completions for {query:?} ({elapsed_ms:.1} ms)");
        return;
    }
    println!(
        "{} completion(s) for {query:?} ({elapsed_ms:.1} ms)",
        results.len()
    );
    for (i, r) in results.iter().enumerate() {
        println!(
            "{:>3}. [{:>4}] {}:{}  {}",
            i + 1,
            r.score,
            r.source_text,
            r.offset,
            truncate(&r.completed_sentence, 80)
        );
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{cut}…")
}

fn run_inspect(file: &Path) -> Result<()> {
    let bytes_len = std::fs::metadata(file)?.len();
    let mut magic = [0u8; 4];
    {
        use std::io::Read;
        let mut f = std::fs::File::open(file)?;
        f.read_exact(&mut magic)?;
    }

    match &magic {
        b"ACX1" => {
            let ix = AcxIndex::open(file)?;
            println!("ACX k-gram index  {}", file.display());
            println!("  file size:  {bytes_len} bytes");
            println!("  gram size:  {}", ix.k());
            println!("  keys:       {}", ix.key_count());
            println!("  postings:   {}", ix.posting_count());
        }
        b"CDB1" => {
            let store = CdbStore::open(file)?;
            println!("CDB sentence store  {}", file.display());
            println!("  file size:  {bytes_len} bytes");
            println!("  records:    {}", store.count());
        }
        b"CLT1" => {
            let lines = foreword::LineOffsets::load(file)?;
            println!("line-offset sidecar  {}", file.display());
            println!("  file size:  {bytes_len} bytes");
            println!("  files:      {}", lines.file_count());
        }
        other => {
            eprintln!(
                "unrecognized magic {:?} (expected ACX1, CDB1, or CLT1)",
                String::from_utf8_lossy(other)
            );
            std::process::exit(1);
        }
    }
    Ok(())
}
