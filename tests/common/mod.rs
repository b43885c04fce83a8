//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use pck::progress::NoProgress;
use pck::{Archive, ArchiveOptions};
use rand::{Rng, RngCore, SeedableRng, rngs::StdRng};
use tempfile::TempDir;

/// Size of the fixed header plus trailer.
pub const FIXED_OVERHEAD: u64 = 12 + 288;

/// A scratch directory holding one package path.
pub struct Scratch {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl Scratch {
    /// Creates a scratch directory with `name` as the package path inside it.
    pub fn new(name: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join(name);
        Self { dir, path }
    }

    /// Returns a path inside the scratch directory.
    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Creates a package holding `entries`, written in one transaction.
pub fn create_archive(path: &Path, entries: &[(&str, &[u8])]) -> pck::Result<Archive> {
    create_archive_with_options(path, &ArchiveOptions::default(), entries)
}

/// Creates a package with custom options holding `entries`.
pub fn create_archive_with_options(
    path: &Path,
    options: &ArchiveOptions,
    entries: &[(&str, &[u8])],
) -> pck::Result<Archive> {
    let mut archive = Archive::create_with_options(path, false, options)?;
    archive.begin_transaction()?;
    for (name, data) in entries {
        archive.add_bytes(name, data.to_vec())?;
    }
    let _ = archive.commit_transaction(&mut NoProgress)?;
    Ok(archive)
}

/// Reopens `path` and checks every entry against `entries`.
pub fn verify_archive_contents(path: &Path, entries: &[(&str, &[u8])]) {
    let archive = Archive::open(path).expect("Failed to reopen archive");
    assert_eq!(archive.len(), entries.len(), "entry count mismatch");
    for (name, data) in entries {
        let read = archive
            .read_by_name(name)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", name, e));
        assert_eq!(&read, data, "content mismatch for {}", name);
    }
}

/// Asserts that the sizes in the statistics snapshot add up to the file size.
pub fn assert_stats_balance(archive: &Archive) {
    let s = archive.stats();
    assert_eq!(
        s.file_size,
        FIXED_OVERHEAD + s.index_size + s.compressed_size + s.redundancy,
        "statistics do not balance: {:?}",
        s
    );
}

/// Returns `len` random bytes from a seeded generator.
pub fn random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = vec![0u8; len];
    rng.fill_bytes(&mut data);
    data
}

/// Returns `len` bytes of repetitive text that compresses well.
pub fn text_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let words = ["alpha ", "beta ", "gamma ", "delta ", "model ", "texture "];
    let mut data = Vec::with_capacity(len + 8);
    while data.len() < len {
        data.extend_from_slice(words[rng.gen_range(0..words.len())].as_bytes());
    }
    data.truncate(len);
    data
}

/// Returns a fresh `(name, payload)` set with `count` entries across a few directories.
pub fn sample_entries(count: usize) -> Vec<(String, Vec<u8>)> {
    (0..count)
        .map(|i| {
            let name = format!("dir{}\\sub{}\\file{:03}.dat", i % 3, i % 5, i);
            let data = if i % 2 == 0 {
                text_bytes(i as u64, 100 + i * 37)
            } else {
                random_bytes(i as u64, 10 + i * 13)
            };
            (name, data)
        })
        .collect()
}

/// Borrows a `sample_entries` result in the shape the helpers take.
pub fn as_refs(entries: &[(String, Vec<u8>)]) -> Vec<(&str, &[u8])> {
    entries
        .iter()
        .map(|(n, d)| (n.as_str(), d.as_slice()))
        .collect()
}
