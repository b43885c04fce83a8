//! Archive statistics.

/// A snapshot of archive-level size statistics.
///
/// The sizes always satisfy
///
/// ```text
/// file_size = 12 + 288 + index_size + compressed_size + redundancy
/// ```
///
/// where `redundancy` counts bytes no live entry or the index table refers
/// to, left behind by deletes and by updates that moved their payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    /// Logical size of the package (primary plus overflow file).
    pub file_size: u64,
    /// Sum of uncompressed entry sizes.
    pub total_size: u64,
    /// Sum of stored entry sizes.
    pub compressed_size: u64,
    /// Size of the encoded index table.
    pub index_size: u64,
    /// Unreferenced bytes.
    pub redundancy: u64,
    /// Number of entries.
    pub entry_count: usize,
    /// Whether an overflow file is in use.
    pub has_overflow: bool,
}

impl ArchiveStats {
    /// Returns the compression ratio (stored / uncompressed).
    pub fn compression_ratio(&self) -> f64 {
        if self.total_size == 0 {
            1.0
        } else {
            self.compressed_size as f64 / self.total_size as f64
        }
    }

    /// Returns the share of the file occupied by redundancy (0.0 - 1.0).
    pub fn redundancy_ratio(&self) -> f64 {
        if self.file_size == 0 {
            0.0
        } else {
            self.redundancy as f64 / self.file_size as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratios() {
        let stats = ArchiveStats {
            file_size: 1000,
            total_size: 800,
            compressed_size: 200,
            redundancy: 100,
            ..Default::default()
        };
        assert!((stats.compression_ratio() - 0.25).abs() < 1e-9);
        assert!((stats.redundancy_ratio() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_ratios_empty() {
        let stats = ArchiveStats::default();
        assert_eq!(stats.compression_ratio(), 1.0);
        assert_eq!(stats.redundancy_ratio(), 0.0);
    }
}
