//! Configuration for split packages.

use std::path::{Path, PathBuf};

use crate::format::PCK_MAX_SIZE;

/// Describes how a package is split across its primary and overflow files.
///
/// The overflow file sits next to the primary file and shares its name,
/// except that the last two characters are replaced by `kx`.
///
/// # Example
///
/// ```rust
/// use pck::volume::SplitConfig;
///
/// let config = SplitConfig::new("data/models.pck");
/// assert_eq!(config.overflow_path().to_str().unwrap(), "data/models.pkx");
/// assert_eq!(config.split_size(), pck::format::PCK_MAX_SIZE);
/// ```
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Largest size of the primary file in bytes.
    pub split_size: u64,
    /// Path of the primary file.
    path: PathBuf,
}

impl SplitConfig {
    /// Creates a configuration with the standard split size.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_split_size(path, PCK_MAX_SIZE)
    }

    /// Creates a configuration with a custom split size.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the primary file (e.g., "archive.pck")
    /// * `split_size` - Largest size of the primary file in bytes
    pub fn with_split_size(path: impl AsRef<Path>, split_size: u64) -> Self {
        Self {
            split_size: split_size.max(1),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the path of the primary file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the overflow file.
    pub fn overflow_path(&self) -> PathBuf {
        let Some(file_name) = self.path.file_name() else {
            return self.path.with_extension("pkx");
        };
        let file_name = file_name.to_string_lossy();
        let chars: Vec<char> = file_name.chars().collect();
        if chars.len() < 2 {
            return self.path.with_file_name(format!("{}.pkx", file_name));
        }
        let mut overflow: String = chars[..chars.len() - 2].iter().collect();
        overflow.push_str("kx");
        self.path.with_file_name(overflow)
    }

    /// Returns the split size in bytes.
    pub fn split_size(&self) -> u64 {
        self.split_size
    }
}
