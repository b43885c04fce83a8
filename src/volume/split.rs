//! A seekable file spanning a primary file and an optional overflow file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};

use log::{debug, warn};

use super::SplitConfig;

/// A file presenting one logical address space over two physical files.
///
/// Logical bytes `[0, primary_len)` live in the primary file and the bytes
/// after it live in the overflow file. The primary file never grows past the
/// configured split size; writes that would cross it continue in the
/// overflow file, which is created on demand.
///
/// Reads and writes may return short counts at the boundary; `read_exact`
/// and `write_all` continue across it transparently.
pub struct SplitFile {
    config: SplitConfig,
    primary: File,
    primary_len: u64,
    overflow: Option<File>,
    overflow_len: u64,
    position: u64,
    read_only: bool,
}

impl std::fmt::Debug for SplitFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitFile")
            .field("path", &self.config.path())
            .field("primary_len", &self.primary_len)
            .field("overflow_len", &self.overflow_len)
            .field("position", &self.position)
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

impl SplitFile {
    /// Opens an existing split file.
    ///
    /// The overflow file is opened too when it exists.
    ///
    /// # Errors
    ///
    /// Fails if the primary file cannot be opened or is larger than the
    /// split size.
    pub fn open(config: SplitConfig, read_only: bool) -> io::Result<Self> {
        let mut options = OpenOptions::new();
        options.read(true).write(!read_only);

        let primary = options.open(config.path())?;
        let primary_len = primary.metadata()?.len();
        if primary_len > config.split_size() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "primary file is {} bytes, larger than the split size {}",
                    primary_len,
                    config.split_size()
                ),
            ));
        }

        let overflow_path = config.overflow_path();
        let (overflow, overflow_len) = if overflow_path.is_file() {
            let file = options.open(&overflow_path)?;
            let len = file.metadata()?.len();
            debug!("Opened overflow file {} ({} bytes)", overflow_path.display(), len);
            (Some(file), len)
        } else {
            (None, 0)
        };

        Ok(Self {
            config,
            primary,
            primary_len,
            overflow,
            overflow_len,
            position: 0,
            read_only,
        })
    }

    /// Creates a new, empty split file.
    ///
    /// Existing primary and overflow files are removed first.
    ///
    /// # Errors
    ///
    /// Fails with `AlreadyExists` if the primary file exists and `overwrite`
    /// is false.
    pub fn create(config: SplitConfig, overwrite: bool) -> io::Result<Self> {
        if config.path().exists() {
            if !overwrite {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} already exists", config.path().display()),
                ));
            }
            fs::remove_file(config.path())?;
        }
        let overflow_path = config.overflow_path();
        if overflow_path.exists() {
            fs::remove_file(&overflow_path)?;
        }

        let primary = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(config.path())?;

        Ok(Self {
            config,
            primary,
            primary_len: 0,
            overflow: None,
            overflow_len: 0,
            position: 0,
            read_only: false,
        })
    }

    /// Returns the logical length.
    pub fn len(&self) -> u64 {
        self.primary_len + self.overflow_len
    }

    /// Returns `true` if the logical length is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the overflow file is in use.
    pub fn has_overflow(&self) -> bool {
        self.overflow.is_some()
    }

    /// Returns the split configuration.
    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Returns the logical address where the overflow file begins.
    ///
    /// Without an overflow file this is the split size.
    fn boundary(&self) -> u64 {
        if self.overflow.is_some() {
            self.primary_len
        } else {
            self.config.split_size()
        }
    }

    fn read_only_error(&self) -> io::Error {
        io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("{} is opened read-only", self.config.path().display()),
        )
    }

    /// Creates the overflow file, padding the primary file to the split size.
    fn create_overflow(&mut self) -> io::Result<()> {
        if self.read_only {
            return Err(self.read_only_error());
        }
        let split = self.config.split_size();
        self.primary.set_len(split)?;
        self.primary_len = split;

        let path = self.config.overflow_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        debug!("Created overflow file {}", path.display());
        self.overflow = Some(file);
        self.overflow_len = 0;
        Ok(())
    }

    /// Sets the logical length.
    ///
    /// Lengths at or below the boundary truncate the primary file and drop
    /// the overflow file. Longer lengths fill the primary file and size the
    /// overflow file to hold the rest.
    pub fn set_len(&mut self, len: u64) -> io::Result<()> {
        if self.read_only {
            return Err(self.read_only_error());
        }

        let boundary = self.boundary();
        if len <= boundary {
            self.primary.set_len(len)?;
            self.primary_len = len;
            if self.overflow.take().is_some() {
                self.overflow_len = 0;
                let path = self.config.overflow_path();
                match fs::remove_file(&path) {
                    Ok(()) => debug!("Removed overflow file {}", path.display()),
                    Err(e) => warn!("Failed to remove overflow file {}: {}", path.display(), e),
                }
            }
        } else {
            if self.overflow.is_none() {
                self.create_overflow()?;
            }
            let boundary = self.boundary();
            if let Some(overflow) = &self.overflow {
                overflow.set_len(len - boundary)?;
            }
            self.overflow_len = len - boundary;
        }
        Ok(())
    }

    /// Flushes both files to disk.
    pub fn sync(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        if let Some(overflow) = &mut self.overflow {
            overflow.flush()?;
        }
        Ok(())
    }
}

impl Read for SplitFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let pos = self.position;
        let n = if pos < self.primary_len {
            let want = (self.primary_len - pos).min(buf.len() as u64) as usize;
            self.primary.seek(SeekFrom::Start(pos))?;
            self.primary.read(&mut buf[..want])?
        } else if let Some(overflow) = &mut self.overflow {
            let local = pos - self.primary_len;
            if local >= self.overflow_len {
                return Ok(0);
            }
            let want = (self.overflow_len - local).min(buf.len() as u64) as usize;
            overflow.seek(SeekFrom::Start(local))?;
            overflow.read(&mut buf[..want])?
        } else {
            0
        };
        self.position += n as u64;
        Ok(n)
    }
}

impl Write for SplitFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.read_only {
            return Err(self.read_only_error());
        }

        let pos = self.position;
        let boundary = self.boundary();
        let n = if pos < boundary {
            let want = (boundary - pos).min(buf.len() as u64) as usize;
            self.primary.seek(SeekFrom::Start(pos))?;
            let n = self.primary.write(&buf[..want])?;
            self.primary_len = self.primary_len.max(pos + n as u64);
            n
        } else {
            if self.overflow.is_none() {
                self.create_overflow()?;
            }
            let local = pos - self.primary_len;
            let Some(overflow) = &mut self.overflow else {
                return Err(io::Error::other("overflow file missing"));
            };
            overflow.seek(SeekFrom::Start(local))?;
            let n = overflow.write(buf)?;
            self.overflow_len = self.overflow_len.max(local + n as u64);
            n
        };
        self.position += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sync()
    }
}

impl Seek for SplitFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(p) => Some(p),
            SeekFrom::End(off) => self.len().checked_add_signed(off),
            SeekFrom::Current(off) => self.position.checked_add_signed(off),
        };
        let target = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek to a negative position")
        })?;

        if target >= self.config.split_size() && self.overflow.is_none() {
            if self.read_only {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!(
                        "position {} lies in the overflow file, which does not exist",
                        target
                    ),
                ));
            }
            self.create_overflow()?;
        }

        self.position = target;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create(dir: &TempDir, split: u64) -> SplitFile {
        let config = SplitConfig::with_split_size(dir.path().join("t.pck"), split);
        SplitFile::create(config, false).unwrap()
    }

    #[test]
    fn test_write_within_primary() {
        let dir = TempDir::new().unwrap();
        let mut file = create(&dir, 100);
        file.write_all(b"hello").unwrap();
        assert_eq!(file.len(), 5);
        assert!(!file.has_overflow());
        assert!(!dir.path().join("t.pkx").exists());
    }

    #[test]
    fn test_write_across_boundary() {
        let dir = TempDir::new().unwrap();
        let mut file = create(&dir, 10);
        let data: Vec<u8> = (0..25).collect();
        file.write_all(&data).unwrap();

        assert!(file.has_overflow());
        assert_eq!(file.len(), 25);
        assert_eq!(fs::metadata(dir.path().join("t.pck")).unwrap().len(), 10);
        assert_eq!(fs::metadata(dir.path().join("t.pkx")).unwrap().len(), 15);

        file.seek(SeekFrom::Start(5)).unwrap();
        let mut buf = [0u8; 12];
        file.read_exact(&mut buf).unwrap();
        assert_eq!(&buf[..], &data[5..17]);
    }

    #[test]
    fn test_seek_past_split_creates_overflow() {
        let dir = TempDir::new().unwrap();
        let mut file = create(&dir, 16);
        file.write_all(b"abc").unwrap();
        file.seek(SeekFrom::Start(20)).unwrap();
        assert!(file.has_overflow());
        file.write_all(b"xyz").unwrap();
        assert_eq!(file.len(), 23);

        let mut all = Vec::new();
        file.seek(SeekFrom::Start(0)).unwrap();
        file.read_to_end(&mut all).unwrap();
        assert_eq!(&all[..3], b"abc");
        assert_eq!(&all[20..], b"xyz");
    }

    #[test]
    fn test_set_len_drops_overflow() {
        let dir = TempDir::new().unwrap();
        let mut file = create(&dir, 8);
        file.write_all(&[1u8; 20]).unwrap();
        assert!(dir.path().join("t.pkx").exists());

        file.set_len(6).unwrap();
        assert_eq!(file.len(), 6);
        assert!(!file.has_overflow());
        assert!(!dir.path().join("t.pkx").exists());
    }

    #[test]
    fn test_set_len_grows_overflow() {
        let dir = TempDir::new().unwrap();
        let mut file = create(&dir, 8);
        file.write_all(&[1u8; 4]).unwrap();
        file.set_len(30).unwrap();
        assert_eq!(file.len(), 30);
        assert_eq!(fs::metadata(dir.path().join("t.pkx")).unwrap().len(), 22);
    }

    #[test]
    fn test_reopen_with_overflow() {
        let dir = TempDir::new().unwrap();
        let config = SplitConfig::with_split_size(dir.path().join("t.pck"), 8);
        {
            let mut file = SplitFile::create(config.clone(), false).unwrap();
            file.write_all(b"0123456789abcdef").unwrap();
        }
        let mut file = SplitFile::open(config, true).unwrap();
        assert_eq!(file.len(), 16);
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"0123456789abcdef");
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let dir = TempDir::new().unwrap();
        let config = SplitConfig::with_split_size(dir.path().join("t.pck"), 8);
        drop(SplitFile::create(config.clone(), false).unwrap());

        let mut file = SplitFile::open(config, true).unwrap();
        assert!(file.write_all(b"x").is_err());
        assert!(file.set_len(0).is_err());
        let err = file.seek(SeekFrom::Start(9)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_create_refuses_existing() {
        let dir = TempDir::new().unwrap();
        let config = SplitConfig::with_split_size(dir.path().join("t.pck"), 8);
        drop(SplitFile::create(config.clone(), false).unwrap());
        let err = SplitFile::create(config.clone(), false).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert!(SplitFile::create(config, true).is_ok());
    }

    #[test]
    fn test_create_removes_stale_overflow() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("t.pkx"), b"stale").unwrap();
        let file = create(&dir, 8);
        assert!(!file.has_overflow());
        assert!(!dir.path().join("t.pkx").exists());
    }

    #[test]
    fn test_open_rejects_oversized_primary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.pck");
        fs::write(&path, [0u8; 32]).unwrap();
        let err = SplitFile::open(SplitConfig::with_split_size(&path, 16), true).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_read_past_end_is_eof() {
        let dir = TempDir::new().unwrap();
        let mut file = create(&dir, 64);
        file.write_all(b"abc").unwrap();
        file.seek(SeekFrom::Start(1)).unwrap();
        let mut buf = [0u8; 4];
        let err = file.read_exact(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
