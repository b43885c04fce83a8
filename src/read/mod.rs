//! Archive reading API.
//!
//! This module provides the [`Archive`] type together with lookup, payload
//! access, statistics, tree views and bulk extraction. Mutation lives in
//! [`crate::edit`] and operates on the same type.
//!
//! # Example
//!
//! ```rust,no_run
//! use pck::progress::NoProgress;
//! use pck::{Archive, ExtractOptions};
//!
//! // Open an archive (read-only)
//! let archive = Archive::open("models.pck")?;
//!
//! // List entries
//! for entry in archive.entries() {
//!     println!("{}: {} bytes", entry.name(), entry.size);
//! }
//!
//! // Extract all files
//! archive.extract_all("output_dir", &ExtractOptions::default(), &mut NoProgress)?;
//! # Ok::<(), pck::Error>(())
//! ```

mod archive_open;
mod archive_query;
mod entry;
mod extraction;
mod handle;
mod info;
mod options;
mod tree;

pub use entry::{Entry, EntryId, EntrySelector, SelectAll, SelectByName, SelectDirectory};
pub use handle::EntryHandle;
pub use info::ArchiveStats;
pub use options::{DEFAULT_POLL_INTERVAL, ExtractOptions, Threads};
pub use tree::{EntryTree, TreeNode};

pub use extraction::output_path;

use std::sync::Arc;

use crate::ArchiveOptions;
use crate::edit::Operation;
use crate::format::{Header, Trailer};
use crate::volume::ByteStore;

/// Running totals kept in step with the entry list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Totals {
    /// Sum of uncompressed entry sizes.
    pub size: u64,
    /// Sum of stored entry sizes.
    pub compressed_size: u64,
    /// Bytes occupied by the encoded index table.
    pub index_size: u64,
}

impl Totals {
    pub(crate) fn add(&mut self, entry: &Entry) {
        self.size += u64::from(entry.size);
        self.compressed_size += u64::from(entry.compressed_size);
    }

    pub(crate) fn remove(&mut self, entry: &Entry) {
        self.size = self.size.saturating_sub(u64::from(entry.size));
        self.compressed_size = self
            .compressed_size
            .saturating_sub(u64::from(entry.compressed_size));
    }
}

/// An open package.
///
/// The archive owns its byte store, its entry list and any pending
/// operations. Reads may be issued from many threads at once (extraction
/// does this); mutation requires `&mut self`.
pub struct Archive {
    pub(crate) store: Arc<ByteStore>,
    pub(crate) id: u64,
    pub(crate) options: ArchiveOptions,
    pub(crate) header: Header,
    pub(crate) trailer: Trailer,
    pub(crate) entries: Vec<Entry>,
    pub(crate) totals: Totals,
    pub(crate) pending: Option<Vec<Operation>>,
    pub(crate) next_entry_id: u64,
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("path", &self.store.path())
            .field("id", &self.id)
            .field("entries", &self.entries.len())
            .field("size", &self.header.size)
            .field("pending", &self.pending.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}

impl Archive {
    /// Allocates a fresh entry id.
    pub(crate) fn allocate_id(&mut self) -> EntryId {
        let id = EntryId(self.next_entry_id);
        self.next_entry_id += 1;
        id
    }
}
