//! Archive opening and creation.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;

use crate::format::{HEADER_SIZE, Header, IndexRecord, TRAILER_SIZE, Trailer};
use crate::volume::{ByteStore, SplitConfig};
use crate::{ArchiveOptions, Error, Result};

use super::{Archive, Entry, EntryId, Totals};

/// Source of archive identities, shared by every archive in the process.
static NEXT_ARCHIVE_ID: AtomicU64 = AtomicU64::new(1);

fn next_archive_id() -> u64 {
    NEXT_ARCHIVE_ID.fetch_add(1, Ordering::Relaxed)
}

impl Archive {
    /// Opens an existing archive read-only.
    ///
    /// # Errors
    ///
    /// - [`Error::Storage`] if the file cannot be opened or read
    /// - [`Error::InvalidFormat`] if the header magic does not match
    /// - [`Error::CorruptTrailer`] / [`Error::UnsupportedVersion`] for a bad trailer
    /// - [`Error::CorruptIndex`] if an index record cannot be decoded
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, &ArchiveOptions::default())
    }

    /// Opens an existing archive for reading and writing.
    pub fn open_writable(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, &ArchiveOptions::new().read_only(false))
    }

    /// Opens an existing archive with custom options.
    pub fn open_with_options(path: impl AsRef<Path>, options: &ArchiveOptions) -> Result<Self> {
        let path = path.as_ref();
        let config = SplitConfig::with_split_size(path, options.split_size);
        let store = ByteStore::open(config, options.read_only)?;

        let file_len = store.len();
        if file_len < HEADER_SIZE + TRAILER_SIZE {
            return Err(Error::InvalidFormat(format!(
                "file is {} bytes, too small for a package",
                file_len
            )));
        }

        let header = Header::parse(&mut store.read_at(0, HEADER_SIZE as usize)?.as_slice())?;
        if header.size > file_len || header.size < HEADER_SIZE + TRAILER_SIZE {
            return Err(Error::InvalidFormat(format!(
                "header declares {} bytes but the file holds {}",
                header.size, file_len
            )));
        }

        let trailer_pos = header.size - TRAILER_SIZE;
        let trailer =
            Trailer::parse(&mut store.read_at(trailer_pos, TRAILER_SIZE as usize)?.as_slice())?;
        trailer.validate()?;

        let index_address = trailer.index_address();
        if index_address < HEADER_SIZE || index_address > trailer_pos {
            return Err(Error::CorruptTrailer {
                reason: format!(
                    "index address {} outside [{}, {}]",
                    index_address, HEADER_SIZE, trailer_pos
                ),
            });
        }

        let table = store.read_at(index_address, (trailer_pos - index_address) as usize)?;
        let count = trailer.entry_count as usize;
        let mut entries = Vec::with_capacity(count.min(table.len() / 8 + 1));
        let mut totals = Totals::default();
        let mut cursor = 0usize;
        for index in 0..count {
            let (record, used) = IndexRecord::decode(&table[cursor..], index)?;
            cursor += used;
            let entry = Entry::from_record(EntryId(index as u64), &record, index);
            totals.add(&entry);
            entries.push(entry);
        }
        totals.index_size = cursor as u64;

        debug!(
            "Opened {} ({} entries, {} bytes, index at {}){}",
            path.display(),
            entries.len(),
            header.size,
            index_address,
            if options.read_only { " read-only" } else { "" }
        );

        Ok(Self {
            store: Arc::new(store),
            id: next_archive_id(),
            options: options.clone(),
            header,
            trailer,
            next_entry_id: entries.len() as u64,
            entries,
            totals,
            pending: None,
        })
    }

    /// Creates a new, empty archive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] with operation `"create"` if the file exists
    /// and `overwrite` is false, or if it cannot be created.
    pub fn create(path: impl AsRef<Path>, overwrite: bool) -> Result<Self> {
        Self::create_with_options(path, overwrite, &ArchiveOptions::default())
    }

    /// Creates a new, empty archive with custom options.
    ///
    /// `options.read_only` is ignored; created archives are always writable.
    pub fn create_with_options(
        path: impl AsRef<Path>,
        overwrite: bool,
        options: &ArchiveOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        let config = SplitConfig::with_split_size(path, options.split_size);
        let store = ByteStore::create(config, overwrite)?;

        let header = Header::new();
        let trailer = Trailer::new();
        store.write_at(0, &header.to_bytes())?;
        store.write_at(HEADER_SIZE, &trailer.to_bytes())?;
        store.set_len(header.size)?;

        debug!("Created {}", path.display());

        Ok(Self {
            store: Arc::new(store),
            id: next_archive_id(),
            options: options.clone().read_only(false),
            header,
            trailer,
            entries: Vec::new(),
            totals: Totals::default(),
            pending: None,
            next_entry_id: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{HEADER_MAGIC, INFO_TEXT};
    use tempfile::TempDir;

    #[test]
    fn test_create_empty_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.pck");
        let archive = Archive::create(&path, false).unwrap();
        assert!(archive.is_empty());
        drop(archive);

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 300);
        assert_eq!(&bytes[..4], &HEADER_MAGIC.to_le_bytes());
        assert_eq!(&bytes[4..12], &300u64.to_le_bytes());
        let info_start = 12 + 16 + 4;
        assert_eq!(&bytes[info_start..info_start + INFO_TEXT.len()], INFO_TEXT.as_bytes());
    }

    #[test]
    fn test_open_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.pck");
        drop(Archive::create(&path, false).unwrap());

        let archive = Archive::open(&path).unwrap();
        assert_eq!(archive.len(), 0);
        assert!(archive.is_read_only());
        assert_eq!(archive.index_address(), HEADER_SIZE);
    }

    #[test]
    fn test_create_refuses_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.pck");
        drop(Archive::create(&path, false).unwrap());
        let err = Archive::create(&path, false).unwrap_err();
        assert!(matches!(err, Error::Storage { operation: "create", .. }));
        assert!(Archive::create(&path, true).is_ok());
    }

    #[test]
    fn test_open_too_small() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiny.pck");
        std::fs::write(&path, [0u8; 20]).unwrap();
        assert!(matches!(Archive::open(&path), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_archive_ids_unique() {
        let dir = TempDir::new().unwrap();
        let a = Archive::create(dir.path().join("a.pck"), false).unwrap();
        let b = Archive::create(dir.path().join("b.pck"), false).unwrap();
        assert_ne!(a.id(), b.id());
    }
}
