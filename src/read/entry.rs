//! Entry descriptors and selectors.

use log::warn;

use crate::format::IndexRecord;
use crate::name::{self, EntryName};
use crate::Result;

/// Identifies an entry within one open archive.
///
/// Ids are stable across commits that do not delete the entry, so pending
/// operations keep pointing at the right entry even when others are removed
/// ahead of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(pub(crate) u64);

/// An entry in a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Identity of the entry within its archive.
    pub id: EntryId,
    /// The normalized entry name.
    pub name: EntryName,
    /// Logical offset of the stored payload.
    pub offset: u64,
    /// Uncompressed size in bytes.
    pub size: u32,
    /// Stored size in bytes.
    pub compressed_size: u32,
    /// Unused record fields, kept for round-trip fidelity.
    pub(crate) reserved: [u32; 4],
}

impl Entry {
    pub(crate) fn new(id: EntryId, name: EntryName, offset: u64, size: u32, compressed_size: u32) -> Self {
        Self {
            id,
            name,
            offset,
            size,
            compressed_size,
            reserved: [0; 4],
        }
    }

    /// Builds an entry from a decoded index record.
    pub(crate) fn from_record(id: EntryId, record: &IndexRecord, index: usize) -> Self {
        let (name, lossy) = EntryName::from_stored(record.name_bytes());
        if lossy {
            warn!(
                "index record {} has a name that is not valid GBK, decoded as '{}'; its bytes are kept as stored",
                index, name
            );
        }
        Self {
            id,
            name,
            offset: record.offset,
            size: record.size,
            compressed_size: record.compressed_size,
            reserved: [
                record.reserved_a,
                record.reserved_b,
                record.reserved_d,
                record.reserved_e,
            ],
        }
    }

    /// Builds the index record describing this entry.
    pub(crate) fn to_record(&self) -> Result<IndexRecord> {
        let mut record = IndexRecord {
            reserved_a: self.reserved[0],
            reserved_b: self.reserved[1],
            offset: self.offset,
            size: self.size,
            compressed_size: self.compressed_size,
            reserved_d: self.reserved[2],
            reserved_e: self.reserved[3],
            ..Default::default()
        };
        record.set_name_bytes(&self.name.to_stored_bytes()?);
        Ok(record)
    }

    /// Returns the entry name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns `true` if the payload is stored without compression.
    pub fn is_stored_raw(&self) -> bool {
        self.compressed_size == self.size
    }

    /// Returns the logical offset just past the stored payload.
    pub fn end_offset(&self) -> u64 {
        self.offset + u64::from(self.compressed_size)
    }

    /// Returns the compression ratio (stored / uncompressed).
    pub fn compression_ratio(&self) -> f64 {
        if self.size == 0 {
            1.0
        } else {
            f64::from(self.compressed_size) / f64::from(self.size)
        }
    }
}

/// Trait for selecting entries during extraction.
pub trait EntrySelector {
    /// Returns true if the entry should be selected.
    fn select(&self, entry: &Entry) -> bool;
}

/// Selector that matches all entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectAll;

impl EntrySelector for SelectAll {
    fn select(&self, _entry: &Entry) -> bool {
        true
    }
}

/// Selector that matches entries by name, ignoring case and separator style.
#[derive(Debug, Clone)]
pub struct SelectByName {
    names: Vec<String>,
}

impl SelectByName {
    /// Creates a selector for the given names.
    pub fn new<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names
                .into_iter()
                .map(|n| name::normalize(n.as_ref()))
                .collect(),
        }
    }
}

impl EntrySelector for SelectByName {
    fn select(&self, entry: &Entry) -> bool {
        self.names
            .iter()
            .any(|n| name::names_equal(entry.name(), n))
    }
}

/// Selector that matches every entry under a directory prefix.
#[derive(Debug, Clone)]
pub struct SelectDirectory {
    dir: String,
}

impl SelectDirectory {
    /// Creates a selector for entries under `dir`.
    pub fn new(dir: &str) -> Self {
        Self {
            dir: name::normalize(dir),
        }
    }
}

impl EntrySelector for SelectDirectory {
    fn select(&self, entry: &Entry) -> bool {
        entry.name.is_under(&self.dir)
    }
}

/// The unit type `()` selects all entries.
impl EntrySelector for () {
    fn select(&self, _entry: &Entry) -> bool {
        true
    }
}

// Implement for closures
impl<F: Fn(&Entry) -> bool> EntrySelector for F {
    fn select(&self, entry: &Entry) -> bool {
        self(entry)
    }
}
