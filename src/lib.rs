//! # pck
//!
//! A pure-Rust library for reading and writing Angelica package archives
//! (`.pck`, with an optional `.pkx` overflow file).
//!
//! A package is a flat list of named entries. Each payload is stored
//! zlib-compressed (or raw when compression does not help), followed by an
//! index table of obfuscated, individually compressed records and a fixed
//! trailer. Packages are edited in place: entries can be added, updated,
//! deleted and renamed, singly or batched in a transaction.
//!
//! ## Quick Start
//!
//! ### Extracting an Archive
//!
//! ```rust,no_run
//! use pck::progress::NoProgress;
//! use pck::{Archive, ExtractOptions, Result};
//!
//! fn main() -> Result<()> {
//!     let archive = Archive::open("models.pck")?;
//!
//!     // List entries
//!     for entry in archive.entries() {
//!         println!("{}: {} bytes", entry.name(), entry.size);
//!     }
//!
//!     // Extract all entries to a directory
//!     archive.extract_all("./output", &ExtractOptions::default(), &mut NoProgress)?;
//!     Ok(())
//! }
//! ```
//!
//! ### Creating an Archive
//!
//! ```rust,no_run
//! use pck::progress::NoProgress;
//! use pck::{Archive, Result};
//!
//! fn main() -> Result<()> {
//!     let mut archive = Archive::create("new.pck", false)?;
//!
//!     archive.begin_transaction()?;
//!     archive.add_file("file.txt", "docs\\file.txt")?;
//!     archive.add_bytes("hello.txt", b"Hello, World!".to_vec())?;
//!     let result = archive.commit_transaction(&mut NoProgress)?;
//!
//!     let stats = archive.stats();
//!     println!("Wrote {} entries ({:.1}% of original size)",
//!         result.added,
//!         stats.compression_ratio() * 100.0);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `parallel` | Yes | Multi-threaded extraction with Rayon |
//! | `cli` | No | The `pcktool` command-line tool |
//!
//! ## Names
//!
//! Entry names use `\` as separator, are stored in the GBK code page and
//! compare case-insensitively. Every name passed to the API is normalized
//! first, so `"Gfx/ui//icon.dds"` and `"gfx\\UI\\icon.dds"` name the same
//! entry. See [`name`].
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], which is an alias for
//! `std::result::Result<T, Error>`. The [`Error`] enum covers all possible
//! failure modes:
//!
//! ```rust,no_run
//! use pck::{Archive, Error};
//!
//! fn open_archive(path: &str) -> pck::Result<()> {
//!     match Archive::open(path) {
//!         Ok(archive) => {
//!             println!("Opened archive with {} entries", archive.len());
//!             Ok(())
//!         }
//!         Err(Error::InvalidFormat(msg)) => {
//!             eprintln!("Not a package: {}", msg);
//!             Err(Error::InvalidFormat(msg))
//!         }
//!         Err(e @ Error::UnsupportedVersion { .. }) => {
//!             eprintln!("Package written by an incompatible version");
//!             Err(e)
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! # fn main() {}
//! ```
//!
//! ## Safety
//!
//! Extraction refuses entry names that would escape the destination
//! directory, and every entry is checked against a per-item size limit
//! before it is queued for writing.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod codec;
pub mod edit;
pub mod error;
pub mod format;
pub mod name;
mod options;
pub mod progress;
pub mod read;
pub mod volume;

pub use error::{Error, Result};
pub use name::EntryName;
pub use options::ArchiveOptions;

// Re-export main types from read module
pub use read::{
    Archive, ArchiveStats, Entry, EntryHandle, EntryId, EntrySelector, EntryTree, ExtractOptions,
    SelectAll, SelectByName, SelectDirectory, Threads, TreeNode,
};

// Re-export progress types
pub use progress::{AtomicProgress, NoProgress, ProgressReporter, progress_fn};

// Re-export edit types
pub use edit::{CommitResult, Operation};
