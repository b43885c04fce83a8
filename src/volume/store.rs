//! Thread-safe positional access to a split package file.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{SplitConfig, SplitFile};
use crate::{Error, Result};

/// The byte store behind an archive.
///
/// All access goes through one mutex so that a seek and the read or write
/// that follows it are never interleaved with another thread's.
#[derive(Debug)]
pub struct ByteStore {
    file: Mutex<SplitFile>,
    path: PathBuf,
    read_only: bool,
}

impl ByteStore {
    /// Opens an existing package file.
    pub fn open(config: SplitConfig, read_only: bool) -> Result<Self> {
        let path = config.path().to_path_buf();
        let file = SplitFile::open(config, read_only).map_err(|e| Error::storage("open", e))?;
        Ok(Self {
            file: Mutex::new(file),
            path,
            read_only,
        })
    }

    /// Creates a new package file.
    pub fn create(config: SplitConfig, overwrite: bool) -> Result<Self> {
        let path = config.path().to_path_buf();
        let file =
            SplitFile::create(config, overwrite).map_err(|e| Error::storage("create", e))?;
        Ok(Self {
            file: Mutex::new(file),
            path,
            read_only: false,
        })
    }

    fn lock(&self) -> MutexGuard<'_, SplitFile> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads exactly `len` bytes starting at logical offset `pos`.
    pub fn read_at(&self, pos: u64, len: usize) -> Result<Vec<u8>> {
        let mut file = self.lock();
        let end = pos.checked_add(len as u64);
        if end.is_none_or(|end| end > file.len()) {
            return Err(Error::storage(
                "read",
                std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("{} bytes at {} lie past the end of the package", len, pos),
                ),
            ));
        }
        let mut buf = vec![0u8; len];
        file.seek(SeekFrom::Start(pos))
            .map_err(|e| Error::storage("seek", e))?;
        file.read_exact(&mut buf)
            .map_err(|e| Error::storage("read", e))?;
        Ok(buf)
    }

    /// Writes `data` at logical offset `pos`.
    pub fn write_at(&self, pos: u64, data: &[u8]) -> Result<()> {
        if self.read_only {
            return Err(Error::ReadOnly);
        }
        let mut file = self.lock();
        file.seek(SeekFrom::Start(pos))
            .map_err(|e| Error::storage("seek", e))?;
        file.write_all(data)
            .map_err(|e| Error::storage("write", e))?;
        Ok(())
    }

    /// Sets the logical size, truncating or extending the underlying files.
    pub fn set_len(&self, len: u64) -> Result<()> {
        if self.read_only {
            return Err(Error::ReadOnly);
        }
        let mut file = self.lock();
        file.set_len(len)
            .map_err(|e| Error::storage("truncate", e))?;
        file.flush().map_err(|e| Error::storage("flush", e))
    }

    /// Returns the logical size.
    pub fn len(&self) -> u64 {
        self.lock().len()
    }

    /// Returns `true` if the logical size is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the overflow file is in use.
    pub fn has_overflow(&self) -> bool {
        self.lock().has_overflow()
    }

    /// Returns the path of the primary file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the overflow file.
    pub fn overflow_path(&self) -> PathBuf {
        self.lock().config().overflow_path()
    }

    /// Returns `true` if the store rejects writes.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
}
