//! Forward-only cursor over a relation index file.
//!
//! The file is a flat array of signed 64-bit words without any header:
//!
//! ```text
//! relation record: relation_id, way_count, way record * way_count
//! way record:      way_id, location_count, coordinate code * location_count
//! ```
//!
//! Relation records are sorted by strictly increasing id, and way records
//! follow the order of the way members of their relation.

use crate::error::{Error, Result};

use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian};
use log::{info, warn};
use memmap2::Mmap;

use std::fmt;
use std::fs::File;
use std::ops::Deref;
use std::path::Path;
use std::str::FromStr;

const WORD_SIZE: usize = 8;

/// Byte order of the words in an index file.
///
/// Must match the byte order used by the program which wrote the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Native,
    Little,
    Big,
}

impl Default for Endianness {
    fn default() -> Self {
        Endianness::Native
    }
}

impl Endianness {
    #[inline]
    fn read_i64(self, buf: &[u8]) -> i64 {
        match self {
            Endianness::Native => NativeEndian::read_i64(buf),
            Endianness::Little => LittleEndian::read_i64(buf),
            Endianness::Big => BigEndian::read_i64(buf),
        }
    }

    #[cfg(test)]
    fn write_i64(self, buf: &mut [u8], value: i64) {
        match self {
            Endianness::Native => NativeEndian::write_i64(buf, value),
            Endianness::Little => LittleEndian::write_i64(buf, value),
            Endianness::Big => BigEndian::write_i64(buf, value),
        }
    }
}

impl FromStr for Endianness {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "native" => Ok(Endianness::Native),
            "little" => Ok(Endianness::Little),
            "big" => Ok(Endianness::Big),
            _ => Err(format!(
                "unknown byte order '{}', expected one of: native, little, big",
                s
            )),
        }
    }
}

/// Read-only cursor over the words of a relation index.
///
/// The position only moves forward. The storage is usually a memory mapped
/// file (see `IndexCursor::open`) which stays mapped until the cursor is
/// dropped.
pub struct IndexCursor<D = Mmap> {
    data: D,
    endianness: Endianness,
    position: usize,
    len: usize,
}

impl IndexCursor<Mmap> {
    /// Opens and maps the index file at `path`.
    pub fn open<P: AsRef<Path>>(path: P, endianness: Endianness) -> Result<Self> {
        let path = path.as_ref();
        let unavailable = |source| Error::IndexUnavailable {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(unavailable)?;
        // The index is never written while it is mapped.
        let data = unsafe { Mmap::map(&file) }.map_err(unavailable)?;
        info!(
            "Mapped relation index {} ({} words)",
            path.display(),
            data.len() / WORD_SIZE
        );
        Ok(Self::from_storage(data, endianness))
    }
}

impl<D: Deref<Target = [u8]>> IndexCursor<D> {
    /// Creates a cursor over in-memory storage.
    ///
    /// Trailing bytes which do not form a complete word are ignored.
    pub fn from_storage(data: D, endianness: Endianness) -> Self {
        let trailing = data.len() % WORD_SIZE;
        if trailing != 0 {
            warn!(
                "Relation index has {} trailing byte(s) which are ignored",
                trailing
            );
        }
        let len = data.len() / WORD_SIZE;
        Self {
            data,
            endianness,
            position: 0,
            len,
        }
    }

    /// Number of words in the index.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current word offset.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.len
    }

    fn exhausted(&self) -> Error {
        Error::IndexExhausted {
            position: self.position,
            len: self.len,
        }
    }

    /// Returns the word at the current position and advances by one.
    #[inline]
    pub fn next(&mut self) -> Result<i64> {
        if self.position >= self.len {
            return Err(self.exhausted());
        }
        let offset = self.position * WORD_SIZE;
        let word = self
            .endianness
            .read_i64(&self.data[offset..offset + WORD_SIZE]);
        self.position += 1;
        Ok(word)
    }

    /// Advances by `n` words without reading them.
    ///
    /// Fails without moving if the new position would be at or past the end.
    #[inline]
    pub fn skip(&mut self, n: u64) -> Result<()> {
        let target = (self.position as u64).saturating_add(n);
        if target >= self.len as u64 {
            return Err(self.exhausted());
        }
        self.position = target as usize;
        Ok(())
    }
}

impl<D> fmt::Debug for IndexCursor<D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("IndexCursor")
            .field("endianness", &self.endianness)
            .field("position", &self.position)
            .field("len", &self.len)
            .finish()
    }
}

/// Serializes words into the byte layout of an index file.
#[cfg(test)]
pub(crate) fn words_to_bytes(words: &[i64], endianness: Endianness) -> Vec<u8> {
    let mut bytes = vec![0; words.len() * WORD_SIZE];
    for (chunk, &word) in bytes.chunks_exact_mut(WORD_SIZE).zip(words) {
        endianness.write_i64(chunk, word);
    }
    bytes
}
