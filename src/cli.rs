//! CLI definitions for the foreword command-line interface.
//!
//! Three subcommands: `build` to ingest a corpus and persist the `.acx` /
//! `.cdb` pair, `search` to query them, and `inspect` to examine either
//! file's structure.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use foreword::{SearchMode, TextUnit};

#[derive(Parser)]
#[command(
    name = "foreword",
    about = "Typo-tolerant autocomplete over static text corpora",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest text files and build the persistent indexes
    Build {
        /// Files or directories to ingest (directories are walked for *.txt)
        #[arg(required = true)]
        roots: Vec<PathBuf>,

        /// Output path for the k-gram index
        #[arg(long)]
        acx: PathBuf,

        /// Output path for the sentence store
        #[arg(long)]
        cdb: PathBuf,

        /// How files are split into sentences
        #[arg(long, value_enum, default_value = "line")]
        unit: UnitArg,

        /// Lines per block (window unit only)
        #[arg(long, default_value_t = foreword::config::WINDOW_SIZE)]
        window_size: usize,

        /// Lines to slide between blocks (window unit only)
        #[arg(long, default_value_t = foreword::config::WINDOW_STEP)]
        window_step: usize,
    },

    /// Query a built index pair
    Search {
        /// Path to the k-gram index
        #[arg(long)]
        acx: PathBuf,

        /// Path to the sentence store
        #[arg(long)]
        cdb: PathBuf,

        /// The (possibly misspelled) query text
        query: String,

        /// Maximum number of completions to return
        #[arg(short, long, default_value_t = foreword::config::TOP_K)]
        limit: usize,

        /// Query pipeline to run
        #[arg(long, value_enum, default_value = "substring")]
        mode: ModeArg,

        /// Emit results as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Inspect an .acx or .cdb file's structure
    Inspect {
        /// Path to the file
        file: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum UnitArg {
    Line,
    Paragraph,
    Window,
}

impl UnitArg {
    pub fn to_unit(self, size: usize, step: usize) -> TextUnit {
        match self {
            UnitArg::Line => TextUnit::Line,
            UnitArg::Paragraph => TextUnit::Paragraph,
            UnitArg::Window => TextUnit::Window { size, step },
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Substring,
    Prefix,
}

impl From<ModeArg> for SearchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Substring => SearchMode::Substring,
            ModeArg::Prefix => SearchMode::Prefix,
        }
    }
}
