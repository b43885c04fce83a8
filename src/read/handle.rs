//! Detached entry handles.

use std::sync::Weak;

use crate::codec;
use crate::volume::ByteStore;
use crate::{Error, Result};

use super::Entry;

/// A non-owning handle to an entry of an open archive.
///
/// A handle keeps a copy of the entry descriptor and a weak reference to
/// the archive's byte store. It never keeps the archive alive: once the
/// archive is dropped, reading through the handle fails with
/// [`Error::ArchiveClosed`].
///
/// Handles describe the entry as it was when the handle was taken. A commit
/// that later moves or deletes the entry makes the handle stale.
///
/// # Example
///
/// ```rust,no_run
/// use pck::{Archive, ArchiveOptions};
///
/// let source = Archive::open("old.pck")?;
/// let mut target = Archive::create("new.pck", false)?;
/// let handle = source.handle(source.entry(0)?);
/// target.add_entry(&handle)?;
/// # Ok::<(), pck::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct EntryHandle {
    pub(crate) store: Weak<ByteStore>,
    pub(crate) archive_id: u64,
    pub(crate) entry: Entry,
}

impl EntryHandle {
    /// Returns the entry descriptor captured by this handle.
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Returns the entry name.
    pub fn name(&self) -> &str {
        self.entry.name()
    }

    /// Returns the identity of the archive the entry belongs to.
    pub fn archive_id(&self) -> u64 {
        self.archive_id
    }

    /// Returns `true` if the owning archive is still open.
    pub fn is_alive(&self) -> bool {
        self.store.strong_count() > 0
    }

    /// Reads the stored (possibly compressed) payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArchiveClosed`] if the owning archive was dropped.
    pub fn read_raw(&self) -> Result<Vec<u8>> {
        let store = self.store.upgrade().ok_or(Error::ArchiveClosed)?;
        store.read_at(self.entry.offset, self.entry.compressed_size as usize)
    }

    /// Reads and decodes the payload.
    pub fn read(&self) -> Result<Vec<u8>> {
        let stored = self.read_raw()?;
        codec::unpack(self.entry.name(), stored, self.entry.size as usize)
    }
}
