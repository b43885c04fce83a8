//! Options for opening and creating archives.

use crate::format::{MAX_ITEM_SIZE, PCK_MAX_SIZE};

/// Options controlling how an archive is opened, created and written.
///
/// # Example
///
/// ```rust
/// use pck::ArchiveOptions;
///
/// let options = ArchiveOptions::new()
///     .read_only(false)
///     .level(9)?
///     .max_item_size(64 * 1024 * 1024);
/// assert_eq!(options.level, 9);
/// # Ok::<(), pck::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Open the archive without write access (ignored by create).
    pub read_only: bool,
    /// Zlib level (0-9) for payloads and index records.
    pub level: u32,
    /// Items whose size is at or above this limit are rejected.
    pub max_item_size: u64,
    /// Largest size of the primary file before the overflow file is used.
    pub split_size: u64,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            read_only: true,
            level: 6,
            max_item_size: MAX_ITEM_SIZE,
            split_size: PCK_MAX_SIZE,
        }
    }
}

impl ArchiveOptions {
    /// Creates the default options: read-only, level 6, standard limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the archive is opened read-only.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets the compression level (0-9).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCompressionLevel`](crate::Error::InvalidCompressionLevel)
    /// if `level` is greater than 9.
    pub fn level(mut self, level: u32) -> crate::Result<Self> {
        if level > 9 {
            return Err(crate::Error::InvalidCompressionLevel { level });
        }
        self.level = level;
        Ok(self)
    }

    /// Sets the compression level, clamping values above 9.
    pub fn level_clamped(mut self, level: u32) -> Self {
        self.level = level.min(9);
        self
    }

    /// Sets the per-item size limit.
    pub fn max_item_size(mut self, limit: u64) -> Self {
        self.max_item_size = limit;
        self
    }

    /// Sets the split size of the primary file.
    ///
    /// Archives written with a non-standard split size can only be read back
    /// with the same setting.
    pub fn split_size(mut self, size: u64) -> Self {
        self.split_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ArchiveOptions::default();
        assert!(options.read_only);
        assert_eq!(options.level, 6);
        assert_eq!(options.max_item_size, 0x7FFF_FF00);
        assert_eq!(options.split_size, 0x7FFF_FF00);
    }

    #[test]
    fn test_level_validation() {
        assert_eq!(ArchiveOptions::new().level(0).unwrap().level, 0);
        assert!(matches!(
            ArchiveOptions::new().level(10),
            Err(crate::Error::InvalidCompressionLevel { level: 10 })
        ));
        assert_eq!(ArchiveOptions::new().level_clamped(15).level, 9);
    }

    #[test]
    fn test_builder_chain() {
        let options = ArchiveOptions::new()
            .read_only(false)
            .max_item_size(10)
            .split_size(4096);
        assert!(!options.read_only);
        assert_eq!(options.max_item_size, 10);
        assert_eq!(options.split_size, 4096);
    }
}
