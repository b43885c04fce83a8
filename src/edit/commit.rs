//! Applying queued operations to the package file.

use log::{debug, trace, warn};

use crate::format::{HEADER_SIZE, TRAILER_SIZE};
use crate::progress::ProgressReporter;
use crate::read::{Archive, Entry, EntryId};
use crate::{Error, Result};

use super::operation::Operation;

/// Counts of the operations applied by a commit.
#[must_use = "commit result should be checked to verify operation completed as expected"]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitResult {
    /// Number of entries added.
    pub added: usize,
    /// Number of entries updated.
    pub updated: usize,
    /// Number of entries deleted.
    pub deleted: usize,
    /// Number of entries renamed.
    pub renamed: usize,
    /// Number of operations skipped because their target was already gone.
    pub skipped: usize,
}

impl CommitResult {
    /// Returns the number of operations applied.
    pub fn total(&self) -> usize {
        self.added + self.updated + self.deleted + self.renamed
    }
}

impl Archive {
    /// Applies every queued operation in enqueue order and closes the transaction.
    ///
    /// Adds are appended after the last payload. An update whose stored form
    /// fits in the old slot overwrites it in place; a larger one is appended.
    /// Afterwards the index table is rewritten directly after the highest
    /// live payload, followed by the trailer, and the file is truncated.
    ///
    /// `progress` is asked before each operation with `(applied, queued)`.
    /// If it returns `false` the remaining operations are dropped, the
    /// operations already applied are kept and written out, and the commit
    /// fails with [`Error::Cancelled`]. An I/O failure likewise leaves earlier
    /// operations applied; there is no rollback. Committing without an open
    /// transaction does nothing.
    ///
    /// Payloads are written over the old index table, so every name the new
    /// table will hold is checked before the first write. A name that cannot
    /// be stored ends the transaction with the file untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::ReadOnly`] if the archive is read-only
    /// - [`Error::InvalidName`] if a name of the resulting table cannot be stored
    /// - [`Error::Cancelled`] if the progress callback stopped the commit
    /// - [`Error::Storage`] / [`Error::Io`] if reading a payload or writing the file fails
    pub fn commit_transaction(
        &mut self,
        progress: &mut dyn ProgressReporter,
    ) -> Result<CommitResult> {
        self.ensure_writable()?;
        let Some(ops) = self.pending.take() else {
            return Ok(CommitResult::default());
        };

        self.check_index_encodable(&ops)?;

        let total = ops.len() as u64;
        let mut cursor = self.index_address();
        let mut result = CommitResult::default();
        let mut outcome = Ok(());

        for (i, op) in ops.into_iter().enumerate() {
            if !progress.on_progress(i as u64, total) {
                outcome = Err(Error::Cancelled);
                break;
            }
            if let Err(e) = self.apply(op, &mut cursor, &mut result) {
                outcome = Err(e);
                break;
            }
        }

        match outcome {
            Ok(()) => {
                self.write_index()?;
                progress.on_progress(total, total);
                debug!(
                    "Committed {} operations to {} ({} added, {} updated, {} deleted, {} renamed); {} entries, {} bytes",
                    result.total(),
                    self.path().display(),
                    result.added,
                    result.updated,
                    result.deleted,
                    result.renamed,
                    self.entries.len(),
                    self.header.size
                );
                Ok(result)
            }
            Err(e) => {
                if let Err(finish) = self.write_index() {
                    warn!(
                        "Failed to write the index after an interrupted commit of {}: {}",
                        self.path().display(),
                        finish
                    );
                }
                Err(e)
            }
        }
    }

    /// Fails if the index table after applying `ops` could not be encoded.
    fn check_index_encodable(&self, ops: &[Operation]) -> Result<()> {
        for entry in &self.entries {
            entry.to_record()?;
        }
        let mut added = 0;
        for op in ops {
            match op {
                Operation::Add { name, .. } => {
                    name.to_stored_bytes()?;
                    added += 1;
                }
                Operation::Rename { new_name, .. } => {
                    new_name.to_stored_bytes()?;
                }
                Operation::Update { .. } | Operation::Delete { .. } => {}
            }
        }
        entry_count(self.entries.len() + added).map(drop)
    }

    fn position_of(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn apply(&mut self, op: Operation, cursor: &mut u64, result: &mut CommitResult) -> Result<()> {
        let level = self.options.level;
        let limit = self.options.max_item_size;
        trace!("Applying {} operation", op.operation_type());

        match op {
            Operation::Add { name, mut payload } => {
                let stored = payload.materialize(name.as_str(), level, limit)?;
                self.store.write_at(*cursor, &stored.bytes)?;
                let entry = Entry::new(
                    self.allocate_id(),
                    name,
                    *cursor,
                    stored.size,
                    stored.stored_len(),
                );
                *cursor += u64::from(entry.compressed_size);
                trace!(
                    "Added '{}' at {} ({} -> {} bytes)",
                    entry.name(),
                    entry.offset,
                    entry.size,
                    entry.compressed_size
                );
                self.totals.add(&entry);
                self.entries.push(entry);
                payload.release();
                result.added += 1;
            }
            Operation::Update {
                target,
                mut payload,
            } => {
                let Some(pos) = self.position_of(target) else {
                    warn!("Skipping update of entry #{}: it no longer exists", target.0);
                    result.skipped += 1;
                    return Ok(());
                };
                let name = self.entries[pos].name.clone();
                let stored = payload.materialize(name.as_str(), level, limit)?;
                let old = self.entries[pos].clone();
                let offset = if stored.stored_len() > old.compressed_size {
                    let offset = *cursor;
                    *cursor += u64::from(stored.stored_len());
                    offset
                } else {
                    old.offset
                };
                self.store.write_at(offset, &stored.bytes)?;
                trace!(
                    "Updated '{}' at {} ({} -> {} bytes, {})",
                    name,
                    offset,
                    stored.size,
                    stored.stored_len(),
                    if offset == old.offset { "in place" } else { "appended" }
                );

                self.totals.remove(&old);
                let entry = &mut self.entries[pos];
                entry.offset = offset;
                entry.size = stored.size;
                entry.compressed_size = stored.stored_len();
                let updated = entry.clone();
                self.totals.add(&updated);
                payload.release();
                result.updated += 1;
            }
            Operation::Delete { target } => {
                let Some(pos) = self.position_of(target) else {
                    warn!("Skipping delete of entry #{}: it no longer exists", target.0);
                    result.skipped += 1;
                    return Ok(());
                };
                let removed = self.entries.remove(pos);
                trace!("Deleted '{}'", removed.name());
                self.totals.remove(&removed);
                result.deleted += 1;
            }
            Operation::Rename { target, new_name } => {
                let Some(pos) = self.position_of(target) else {
                    warn!("Skipping rename of entry #{}: it no longer exists", target.0);
                    result.skipped += 1;
                    return Ok(());
                };
                trace!("Renamed '{}' to '{}'", self.entries[pos].name(), new_name);
                self.entries[pos].name = new_name;
                result.renamed += 1;
            }
        }
        Ok(())
    }

    /// Rewrites the index table, trailer and header, then truncates the file.
    fn write_index(&mut self) -> Result<()> {
        let address = self
            .entries
            .iter()
            .map(Entry::end_offset)
            .max()
            .unwrap_or(HEADER_SIZE)
            .max(HEADER_SIZE);

        let mut table = Vec::new();
        for entry in &self.entries {
            table.extend_from_slice(&entry.to_record()?.encode(self.options.level)?);
        }
        let index_size = table.len() as u64;
        let entry_count = entry_count(self.entries.len())?;

        self.trailer.entry_count = entry_count;
        self.trailer.set_index_address(address);
        self.header.size = address + index_size + TRAILER_SIZE;

        self.store.write_at(address, &table)?;
        self.store
            .write_at(address + index_size, &self.trailer.to_bytes())?;
        self.store.write_at(0, &self.header.to_bytes())?;
        self.store.set_len(self.header.size)?;
        self.totals.index_size = index_size;

        trace!(
            "Wrote index of {} records ({} bytes) at {}",
            entry_count, index_size, address
        );
        Ok(())
    }
}

fn entry_count(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| Error::InvalidFormat(format!("{} entries do not fit the trailer", len)))
}
