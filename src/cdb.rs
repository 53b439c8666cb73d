//! The CDB on-disk sentence store.
//!
//! A flat, memory-mappable file with an id → offset table up front. Opening
//! parses only the header and table; record bodies are decoded on demand
//! from the map, so startup cost does not grow with corpus size.
//!
//! # Format
//!
//! ```text
//! [0..4]      magic "CDB1"
//! [4..8]      M (u32 little-endian) = number of records
//! [8..8+12M]  table: M tuples of (id:u32, offset:u64)
//! [...]       record region
//! ```
//!
//! Record body:
//!
//! ```text
//! path_len:u16 | path:utf-8 bytes
//! line_no:u32
//! orig_len:u32 | original:utf-8 bytes
//! norm_len:u32 | normalized:utf-8 bytes
//! map_len:u32  | mapping: map_len × u32 (little-endian)
//! ```
//!
//! The store also carries a small sidecar (`<path>.lines`, magic `CLT1`)
//! holding each source file's line-start byte offsets, so a match position
//! inside a sentence resolves to an absolute file offset in O(1).
//!
//! An in-memory overlay supports put/delete at query time without touching
//! the file; the read path checks the overlay first, the deleted set
//! second, and the base map last.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::binio::{write_atomic, Reader};
use crate::error::{Error, Result};
use crate::store::SentenceStore;
use crate::types::Sentence;

pub const CDB_MAGIC: [u8; 4] = *b"CDB1";
pub const LINES_MAGIC: [u8; 4] = *b"CLT1";

const HEADER_LEN: usize = 8;
const TABLE_ENTRY_LEN: usize = 12;

/// Path of the line-offset sidecar that travels with a CDB file.
pub fn lines_sidecar_path(cdb_path: &Path) -> PathBuf {
    let mut os = cdb_path.as_os_str().to_os_string();
    os.push(".lines");
    PathBuf::from(os)
}

// ============================================================================
// WRITER
// ============================================================================

/// Serializes sentences into a CDB file.
pub struct CdbWriter;

impl CdbWriter {
    /// Persist `sentences` atomically, table sorted by id.
    pub fn save(path: &Path, sentences: &[Sentence]) -> Result<()> {
        let mut order: Vec<usize> = (0..sentences.len()).collect();
        order.sort_by_key(|&i| sentences[i].id);

        let table_len = sentences.len() * TABLE_ENTRY_LEN;
        let mut buf = Vec::with_capacity(HEADER_LEN + table_len);
        buf.extend_from_slice(&CDB_MAGIC);
        buf.extend_from_slice(&(sentences.len() as u32).to_le_bytes());
        // Placeholder table, backfilled once record offsets are known.
        buf.resize(HEADER_LEN + table_len, 0);

        let mut offsets: Vec<(u32, u64)> = Vec::with_capacity(sentences.len());
        for &i in &order {
            let s = &sentences[i];
            offsets.push((s.id, buf.len() as u64));
            Self::encode_record(&mut buf, s)?;
        }

        for (slot, (id, off)) in offsets.iter().enumerate() {
            let at = HEADER_LEN + slot * TABLE_ENTRY_LEN;
            buf[at..at + 4].copy_from_slice(&id.to_le_bytes());
            buf[at + 4..at + 12].copy_from_slice(&off.to_le_bytes());
        }

        write_atomic(path, &buf)
    }

    fn encode_record(buf: &mut Vec<u8>, s: &Sentence) -> Result<()> {
        let path = s.path.as_bytes();
        if path.len() > u16::MAX as usize {
            return Err(Error::invalid(
                "cdb",
                format!("path of {} bytes exceeds the u16 length field", path.len()),
            ));
        }
        buf.extend_from_slice(&(path.len() as u16).to_le_bytes());
        buf.extend_from_slice(path);
        buf.extend_from_slice(&s.line_no.to_le_bytes());
        buf.extend_from_slice(&(s.original.len() as u32).to_le_bytes());
        buf.extend_from_slice(s.original.as_bytes());
        buf.extend_from_slice(&(s.normalized.len() as u32).to_le_bytes());
        buf.extend_from_slice(s.normalized.as_bytes());
        buf.extend_from_slice(&(s.norm_to_orig.len() as u32).to_le_bytes());
        for off in &s.norm_to_orig {
            buf.extend_from_slice(&off.to_le_bytes());
        }
        Ok(())
    }
}

// ============================================================================
// STORE
// ============================================================================

/// Read-only memory-mapped sentence store with an in-memory overlay.
pub struct CdbStore {
    mmap: Mmap,
    table: HashMap<u32, u64>,
    overlay: HashMap<u32, Sentence>,
    deleted: HashSet<u32>,
}

impl CdbStore {
    /// Memory-map `path` and parse the header and id table.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // Safety: read-only private map; the build path replaces the file
        // by rename, never by writing in place.
        let mmap = unsafe { Mmap::map(&file) }?;

        if mmap.len() < HEADER_LEN {
            return Err(Error::invalid(
                "cdb",
                format!("file of {} bytes is too small for a header", mmap.len()),
            ));
        }
        if mmap[..4] != CDB_MAGIC {
            return Err(Error::invalid("cdb", "magic mismatch"));
        }

        let table = {
            let mut r = Reader::at(&mmap, 4)?;
            let m = r.read_u32()?;
            let need = HEADER_LEN + m as usize * TABLE_ENTRY_LEN;
            if mmap.len() < need {
                return Err(Error::invalid(
                    "cdb",
                    format!("table of {m} entries does not fit in the file"),
                ));
            }
            let mut table = HashMap::with_capacity(m as usize);
            for _ in 0..m {
                let id = r.read_u32()?;
                let off = r.read_u64()?;
                table.insert(id, off);
            }
            table
        };

        Ok(Self {
            mmap,
            table,
            overlay: HashMap::new(),
            deleted: HashSet::new(),
        })
    }

    fn decode_record(&self, id: u32, off: u64) -> Result<Sentence> {
        let mut r = Reader::at(&self.mmap, off as usize)?;
        let path_len = r.read_u16()? as usize;
        let path = r.read_str(path_len)?.to_owned();
        let line_no = r.read_u32()?;
        let orig_len = r.read_u32()? as usize;
        let original = r.read_str(orig_len)?.to_owned();
        let norm_len = r.read_u32()? as usize;
        let normalized = r.read_str(norm_len)?.to_owned();
        let map_len = r.read_u32()? as usize;
        let mut norm_to_orig = Vec::with_capacity(map_len);
        for _ in 0..map_len {
            norm_to_orig.push(r.read_u32()?);
        }
        Ok(Sentence {
            id,
            path,
            line_no,
            original,
            normalized,
            norm_to_orig,
        })
    }
}

impl SentenceStore for CdbStore {
    fn get(&self, id: u32) -> Result<Sentence> {
        if let Some(s) = self.overlay.get(&id) {
            return Ok(s.clone());
        }
        if self.deleted.contains(&id) {
            return Err(Error::NotFound(id));
        }
        match self.table.get(&id) {
            Some(&off) => self.decode_record(id, off),
            None => Err(Error::NotFound(id)),
        }
    }

    fn count(&self) -> usize {
        let shadowed = self
            .deleted
            .iter()
            .filter(|id| self.table.contains_key(id))
            .count();
        let added = self
            .overlay
            .keys()
            .filter(|id| !self.table.contains_key(id))
            .count();
        self.table.len() - shadowed + added
    }

    fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .table
            .keys()
            .chain(self.overlay.keys())
            .copied()
            .filter(|id| !self.deleted.contains(id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn overlay_put(&mut self, s: Sentence) {
        self.deleted.remove(&s.id);
        self.overlay.insert(s.id, s);
    }

    fn overlay_delete(&mut self, id: u32) {
        self.overlay.remove(&id);
        self.deleted.insert(id);
    }
}

impl std::fmt::Debug for CdbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdbStore")
            .field("records", &self.table.len())
            .field("overlay", &self.overlay.len())
            .field("deleted", &self.deleted.len())
            .finish()
    }
}

// ============================================================================
// LINE-OFFSET SIDECAR
// ============================================================================

/// Per-file byte offsets of each line start, EOLs included as read.
///
/// `start_of_line(path, n)` is the absolute byte offset of line `n`
/// (0-based) in that file, which turns a column within a sentence into an
/// absolute file offset without re-reading the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineOffsets {
    files: HashMap<String, Vec<u64>>,
}

impl LineOffsets {
    pub fn insert(&mut self, path: String, starts: Vec<u64>) {
        self.files.insert(path, starts);
    }

    pub fn start_of_line(&self, path: &str, line: u32) -> Option<u64> {
        self.files.get(path)?.get(line as usize).copied()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Persist atomically. Files are written in sorted path order so the
    /// bytes are reproducible.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&LINES_MAGIC);
        buf.extend_from_slice(&(self.files.len() as u32).to_le_bytes());
        let mut paths: Vec<&String> = self.files.keys().collect();
        paths.sort();
        for p in paths {
            let starts = &self.files[p];
            let pb = p.as_bytes();
            if pb.len() > u16::MAX as usize {
                return Err(Error::invalid("lines", "path exceeds u16 length field"));
            }
            buf.extend_from_slice(&(pb.len() as u16).to_le_bytes());
            buf.extend_from_slice(pb);
            buf.extend_from_slice(&(starts.len() as u32).to_le_bytes());
            for s in starts {
                buf.extend_from_slice(&s.to_le_bytes());
            }
        }
        write_atomic(path, &buf)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        if bytes.len() < 8 {
            return Err(Error::invalid("lines", "file too small for a header"));
        }
        if bytes[..4] != LINES_MAGIC {
            return Err(Error::invalid("lines", "magic mismatch"));
        }
        let mut r = Reader::at(&bytes, 4)?;
        let n = r.read_u32()?;
        let mut files = HashMap::with_capacity(n as usize);
        for _ in 0..n {
            let path_len = r.read_u16()? as usize;
            let p = r.read_str(path_len)?.to_owned();
            let m = r.read_u32()? as usize;
            let mut starts = Vec::with_capacity(m);
            for _ in 0..m {
                starts.push(r.read_u64()?);
            }
            files.insert(p, starts);
        }
        Ok(Self { files })
    }
}
