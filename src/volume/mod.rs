//! Split package file support.
//!
//! A package is limited to [`PCK_MAX_SIZE`](crate::format::PCK_MAX_SIZE)
//! bytes per physical file. Bytes beyond that live in an overflow file next
//! to it:
//!
//! - `models.pck` - primary file, holds logical bytes `[0, split)`
//! - `models.pkx` - overflow file, holds the rest
//!
//! The overflow file is created when the package first grows past the split
//! size and removed again when a commit shrinks it back below.
//!
//! ```rust,no_run
//! use pck::volume::{ByteStore, SplitConfig};
//!
//! let store = ByteStore::open(SplitConfig::new("models.pck"), true)?;
//! println!("{} logical bytes, overflow: {}", store.len(), store.has_overflow());
//! # Ok::<(), pck::Error>(())
//! ```

mod config;
mod split;
mod store;

pub use config::SplitConfig;
pub use split::SplitFile;
pub use store::ByteStore;
