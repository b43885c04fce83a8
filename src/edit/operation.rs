//! Pending archive operations.

use std::fs;
use std::path::PathBuf;

use crate::codec;
use crate::name::EntryName;
use crate::read::{EntryHandle, EntryId};
use crate::{Error, Result};

/// Where the bytes of an Add or Update come from.
#[derive(Debug, Clone)]
pub enum PayloadSource {
    /// Bytes held in memory.
    Bytes(Vec<u8>),
    /// A file read at commit time.
    File(PathBuf),
    /// An entry of another open archive, copied in its stored form.
    Entry(EntryHandle),
}

/// A payload in the form it is written to the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredPayload {
    /// Stored (possibly compressed) bytes.
    pub bytes: Vec<u8>,
    /// Uncompressed size.
    pub size: u32,
}

impl StoredPayload {
    pub(crate) fn stored_len(&self) -> u32 {
        // Bounded by the per-item limit check in `Payload::load`.
        self.bytes.len() as u32
    }
}

/// The data of an Add or Update, materialized and compressed at most once.
#[derive(Debug, Clone)]
pub struct Payload {
    source: PayloadSource,
    stored: Option<StoredPayload>,
}

impl Payload {
    /// Creates a payload that has not been loaded yet.
    pub fn new(source: PayloadSource) -> Self {
        Self {
            source,
            stored: None,
        }
    }

    /// Returns the payload source.
    pub fn source(&self) -> &PayloadSource {
        &self.source
    }

    /// Returns `true` once the stored form has been computed.
    pub fn is_materialized(&self) -> bool {
        self.stored.is_some()
    }

    /// Loads and compresses the payload on first use, returning the cached form afterwards.
    pub(crate) fn materialize(
        &mut self,
        name: &str,
        level: u32,
        limit: u64,
    ) -> Result<&StoredPayload> {
        let stored = match self.stored.take() {
            Some(stored) => stored,
            None => Self::load(&self.source, name, level, limit)?,
        };
        Ok(self.stored.insert(stored))
    }

    /// Drops the materialized bytes and any in-memory source data.
    pub(crate) fn release(&mut self) {
        self.stored = None;
        if let PayloadSource::Bytes(data) = &mut self.source {
            *data = Vec::new();
        }
    }

    fn load(source: &PayloadSource, name: &str, level: u32, limit: u64) -> Result<StoredPayload> {
        match source {
            PayloadSource::Bytes(data) => {
                check_size(name, data.len() as u64, limit)?;
                Ok(StoredPayload {
                    bytes: codec::pack(data, level)?,
                    size: data.len() as u32,
                })
            }
            PayloadSource::File(path) => {
                let data = fs::read(path)?;
                check_size(&path.display().to_string(), data.len() as u64, limit)?;
                Ok(StoredPayload {
                    bytes: codec::pack(&data, level)?,
                    size: data.len() as u32,
                })
            }
            PayloadSource::Entry(handle) => {
                let entry = handle.entry();
                check_size(entry.name(), u64::from(entry.size), limit)?;
                Ok(StoredPayload {
                    bytes: handle.read_raw()?,
                    size: entry.size,
                })
            }
        }
    }
}

/// Rejects items at or above `limit`, or too large for the 32-bit size fields.
pub(crate) fn check_size(name: &str, size: u64, limit: u64) -> Result<()> {
    let limit = limit.min(u64::from(u32::MAX));
    if size >= limit {
        return Err(Error::SizeLimitExceeded {
            name: name.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

/// A pending modification of an archive.
///
/// Targets are entry ids, so an operation keeps pointing at its entry
/// even when earlier operations in the same transaction remove others.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Append a new entry.
    Add {
        /// Name of the new entry.
        name: EntryName,
        /// Data of the new entry.
        payload: Payload,
    },
    /// Replace the data of an existing entry.
    Update {
        /// Entry to update.
        target: EntryId,
        /// New data.
        payload: Payload,
    },
    /// Remove an entry.
    Delete {
        /// Entry to delete.
        target: EntryId,
    },
    /// Give an entry a new name.
    Rename {
        /// Entry to rename.
        target: EntryId,
        /// The new name, already checked against existing names.
        new_name: EntryName,
    },
}

impl Operation {
    /// Returns the id of the entry this operation modifies, if it targets one.
    pub fn target(&self) -> Option<EntryId> {
        match self {
            Operation::Add { .. } => None,
            Operation::Update { target, .. }
            | Operation::Delete { target }
            | Operation::Rename { target, .. } => Some(*target),
        }
    }

    /// Returns the operation type as a string.
    pub fn operation_type(&self) -> &'static str {
        match self {
            Operation::Add { .. } => "add",
            Operation::Update { .. } => "update",
            Operation::Delete { .. } => "delete",
            Operation::Rename { .. } => "rename",
        }
    }
}
