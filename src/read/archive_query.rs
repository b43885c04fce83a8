//! Archive query methods.
//!
//! Lookup, payload access and archive-level information. Name lookup is a
//! linear scan; the cost of reading payloads dominates it.

use std::path::Path;
use std::sync::Arc;

use crate::codec;
use crate::format::{HEADER_SIZE, TRAILER_SIZE};
use crate::name;
use crate::{ArchiveOptions, Error, Result};

use super::{Archive, ArchiveStats, Entry, EntryHandle, EntryTree};

impl Archive {
    /// Returns all entries in index order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns the number of entries in the archive.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index >= self.len()`.
    pub fn entry(&self, index: usize) -> Result<&Entry> {
        self.entries.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    /// Finds an entry by name, ignoring case and separator style.
    pub fn find(&self, name: &str) -> Option<&Entry> {
        let wanted = name::normalize(name);
        self.entries
            .iter()
            .find(|e| name::names_equal(e.name(), &wanted))
    }

    /// Finds an entry by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryNotFound`] if no entry matches.
    pub fn entry_by_name(&self, name: &str) -> Result<&Entry> {
        self.find(name).ok_or_else(|| Error::EntryNotFound {
            name: name.to_string(),
        })
    }

    /// Returns `true` if an entry with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Reads the stored (possibly compressed) bytes of an entry.
    pub fn read_raw(&self, entry: &Entry) -> Result<Vec<u8>> {
        self.store
            .read_at(entry.offset, entry.compressed_size as usize)
    }

    /// Reads and decodes the payload of an entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptPayload`] if the stored bytes neither
    /// decompress to the declared size nor are plausibly stored raw.
    pub fn read(&self, entry: &Entry) -> Result<Vec<u8>> {
        let stored = self.read_raw(entry)?;
        codec::unpack(entry.name(), stored, entry.size as usize)
    }

    /// Reads and decodes the payload of the entry called `name`.
    pub fn read_by_name(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self.entry_by_name(name)?;
        self.read(entry)
    }

    /// Returns a detached handle to `entry`.
    pub fn handle(&self, entry: &Entry) -> EntryHandle {
        EntryHandle {
            store: Arc::downgrade(&self.store),
            archive_id: self.id,
            entry: entry.clone(),
        }
    }

    /// Returns detached handles to every entry.
    pub fn handles(&self) -> Vec<EntryHandle> {
        self.entries.iter().map(|e| self.handle(e)).collect()
    }

    /// Returns a statistics snapshot.
    pub fn stats(&self) -> ArchiveStats {
        let fixed = HEADER_SIZE + TRAILER_SIZE;
        let used = fixed + self.totals.index_size + self.totals.compressed_size;
        ArchiveStats {
            file_size: self.header.size,
            total_size: self.totals.size,
            compressed_size: self.totals.compressed_size,
            index_size: self.totals.index_size,
            redundancy: self.header.size.saturating_sub(used),
            entry_count: self.entries.len(),
            has_overflow: self.store.has_overflow(),
        }
    }

    /// Builds a directory-like tree over the entry names.
    pub fn tree(&self) -> EntryTree {
        EntryTree::build(&self.entries)
    }

    /// Returns the primary file path.
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Returns the identity of this archive instance.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the options the archive was opened with.
    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    /// Returns `true` if the archive rejects mutations.
    pub fn is_read_only(&self) -> bool {
        self.store.is_read_only()
    }

    /// Returns the logical address of the index table.
    pub fn index_address(&self) -> u64 {
        self.trailer.index_address()
    }

    /// Returns the trailer's free-text info slot, up to its first NUL after the prefix.
    pub fn info_text(&self) -> String {
        let slot = &self.trailer.info[crate::format::INFO_TEXT_OFFSET..];
        let text = crate::format::reader::until_nul(slot);
        String::from_utf8_lossy(text).into_owned()
    }
}
