//! The ACX on-disk k-gram index.
//!
//! A sorted-key postings file designed around one constraint: opening must
//! be O(1)-ish no matter how large the corpus is. Only the key directory is
//! parsed into memory; postings stay in the memory map and are touched by
//! page faults when a query actually asks for them.
//!
//! # Format
//!
//! ```text
//! [0..4]   magic "ACX1"
//! [4..8]   k (u32 little-endian)
//! [8..12]  N (u32) number of keys
//! repeated N times, keys in ascending byte order:
//!    len:u8 | key:len bytes | off:u32 | cnt:u32
//! postings region:
//!    cnt_total × u32 little-endian sentence ids, concatenated in
//!    directory order
//! ```
//!
//! `off` counts postings (not bytes) from the start of the postings region.
//! Keys are at most 255 bytes. Each postings list is strictly ascending and
//! deduplicated. The file is written to a temp sibling and renamed into
//! place.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::binio::{write_atomic, Reader};
use crate::error::{Error, Result};

pub const ACX_MAGIC: [u8; 4] = *b"ACX1";

const HEADER_LEN: usize = 12;

// ============================================================================
// WRITER
// ============================================================================

/// Serializes `(key, ids)` pairs into an ACX file.
#[derive(Debug, Clone, Copy)]
pub struct AcxWriter {
    k: u32,
}

impl AcxWriter {
    pub fn new(k: u32) -> Self {
        Self { k }
    }

    /// Sort, deduplicate, and persist the items atomically.
    ///
    /// Keys arrive in any order; ids per key may be unsorted or contain
    /// duplicates. Fails if any key exceeds 255 bytes.
    pub fn save<'a, I>(&self, path: &Path, items: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a [u32])>,
    {
        // BTreeMap gives us the ascending key order the format requires.
        let mut sorted: BTreeMap<&[u8], Vec<u32>> = BTreeMap::new();
        for (key, ids) in items {
            let kb = key.as_bytes();
            if kb.len() > 255 {
                return Err(Error::invalid(
                    "acx",
                    format!("key of {} bytes exceeds the 255-byte limit", kb.len()),
                ));
            }
            let mut ids = ids.to_vec();
            ids.sort_unstable();
            ids.dedup();
            sorted.insert(kb, ids);
        }

        let mut directory = Vec::new();
        let mut postings = Vec::new();
        let mut off: u32 = 0;
        for (key, ids) in &sorted {
            directory.push(key.len() as u8);
            directory.extend_from_slice(key);
            directory.extend_from_slice(&off.to_le_bytes());
            directory.extend_from_slice(&(ids.len() as u32).to_le_bytes());
            for id in ids {
                postings.extend_from_slice(&id.to_le_bytes());
            }
            off += ids.len() as u32;
        }

        let mut buf = Vec::with_capacity(HEADER_LEN + directory.len() + postings.len());
        buf.extend_from_slice(&ACX_MAGIC);
        buf.extend_from_slice(&self.k.to_le_bytes());
        buf.extend_from_slice(&(sorted.len() as u32).to_le_bytes());
        buf.extend_from_slice(&directory);
        buf.extend_from_slice(&postings);
        write_atomic(path, &buf)
    }
}

// ============================================================================
// READER
// ============================================================================

#[derive(Debug)]
struct DirEntry {
    key: String,
    off: u32,
    cnt: u32,
}

/// Read-only memory-mapped ACX index.
///
/// Holds the key directory in memory; postings are borrowed views into the
/// map, decoded u32 by u32 as they are iterated.
pub struct AcxIndex {
    mmap: Mmap,
    k: u32,
    dir: Vec<DirEntry>,
    postings_base: usize,
}

impl AcxIndex {
    /// Memory-map `path` and parse the header and key directory.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // Safety: the map is read-only and private to this process; a
        // concurrent writer replaces the file via rename, never in place.
        let mmap = unsafe { Mmap::map(&file) }?;
        Self::parse(mmap)
    }

    fn parse(mmap: Mmap) -> Result<Self> {
        if mmap.len() < HEADER_LEN {
            return Err(Error::invalid(
                "acx",
                format!("file of {} bytes is too small for a header", mmap.len()),
            ));
        }
        if mmap[..4] != ACX_MAGIC {
            return Err(Error::invalid("acx", "magic mismatch"));
        }

        let (k, dir, postings_base) = {
            let mut r = Reader::at(&mmap, 4)?;
            let k = r.read_u32()?;
            let n = r.read_u32()?;
            let mut dir: Vec<DirEntry> = Vec::with_capacity(n as usize);
            let mut expected_off: u32 = 0;
            for _ in 0..n {
                let len = r.read_u8()? as usize;
                let key = r.read_str(len)?.to_owned();
                let off = r.read_u32()?;
                let cnt = r.read_u32()?;
                if off != expected_off {
                    return Err(Error::invalid(
                        "acx",
                        format!("postings offset {off} out of sequence for key {key:?}"),
                    ));
                }
                if let Some(prev) = dir.last() {
                    if prev.key.as_bytes() >= key.as_bytes() {
                        return Err(Error::invalid(
                            "acx",
                            format!("keys not in ascending order near {key:?}"),
                        ));
                    }
                }
                expected_off = expected_off.checked_add(cnt).ok_or_else(|| {
                    Error::invalid("acx", "postings count overflows u32")
                })?;
                dir.push(DirEntry { key, off, cnt });
            }
            let postings_base = r.position();
            let available = (mmap.len() - postings_base) / 4;
            if (expected_off as usize) > available {
                return Err(Error::invalid(
                    "acx",
                    format!(
                        "directory promises {expected_off} postings but the region holds {available}"
                    ),
                ));
            }
            (k, dir, postings_base)
        };

        Ok(Self {
            mmap,
            k,
            dir,
            postings_base,
        })
    }

    /// Gram size the index was built with.
    pub fn k(&self) -> usize {
        self.k as usize
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.dir.len()
    }

    /// Total number of stored postings.
    pub fn posting_count(&self) -> usize {
        self.dir.iter().map(|e| e.cnt as usize).sum()
    }

    /// Postings for `key`, ascending. Missing keys yield an empty view.
    pub fn get(&self, key: &str) -> Postings<'_> {
        match self
            .dir
            .binary_search_by(|e| e.key.as_bytes().cmp(key.as_bytes()))
        {
            Ok(i) => self.slice_for(&self.dir[i]),
            Err(_) => Postings { bytes: &[] },
        }
    }

    /// All `(key, postings)` pairs in ascending key order.
    pub fn iter_items(&self) -> impl Iterator<Item = (&str, Postings<'_>)> {
        self.dir.iter().map(|e| (e.key.as_str(), self.slice_for(e)))
    }

    fn slice_for(&self, entry: &DirEntry) -> Postings<'_> {
        let start = self.postings_base + entry.off as usize * 4;
        let end = start + entry.cnt as usize * 4;
        // Bounds were validated against the file length in `parse`.
        Postings {
            bytes: &self.mmap[start..end],
        }
    }
}

impl std::fmt::Debug for AcxIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcxIndex")
            .field("k", &self.k)
            .field("keys", &self.dir.len())
            .finish()
    }
}

/// Borrowed postings view: decodes little-endian u32 ids on the fly.
#[derive(Debug, Clone, Copy)]
pub struct Postings<'a> {
    bytes: &'a [u8],
}

impl Postings<'_> {
    pub fn len(&self) -> usize {
        self.bytes.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Iterator for Postings<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.bytes.len() < 4 {
            return None;
        }
        let (head, rest) = self.bytes.split_at(4);
        self.bytes = rest;
        Some(u32::from_le_bytes([head[0], head[1], head[2], head[3]]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len();
        (n, Some(n))
    }
}

impl ExactSizeIterator for Postings<'_> {}
