//! Transactions and mutators.
//!
//! Mutators called inside a transaction only queue an [`Operation`]. Called
//! outside one, they open a transaction for that single operation and
//! commit it immediately.

use std::fs;
use std::path::Path;

use log::debug;

use crate::name::{self, EntryName};
use crate::progress::NoProgress;
use crate::read::{Archive, Entry, EntryHandle, EntryId};
use crate::{Error, Result};

use super::operation::{Operation, Payload, PayloadSource, check_size};

impl Archive {
    /// Opens a transaction.
    ///
    /// Until [`commit_transaction`](Self::commit_transaction) or
    /// [`cancel_transaction`](Self::cancel_transaction), mutators queue their
    /// operations instead of applying them. Beginning while a transaction is
    /// already open keeps the existing queue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnly`] if the archive was opened read-only.
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.ensure_writable()?;
        if self.pending.is_none() {
            self.pending = Some(Vec::new());
        }
        Ok(())
    }

    /// Discards the open transaction, returning how many operations were dropped.
    pub fn cancel_transaction(&mut self) -> usize {
        let dropped = self.pending.take().map_or(0, |ops| ops.len());
        if dropped > 0 {
            debug!("Cancelled transaction with {} pending operations", dropped);
        }
        dropped
    }

    /// Returns `true` while a transaction is open.
    pub fn is_in_transaction(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the number of queued operations.
    pub fn pending_count(&self) -> usize {
        self.pending.as_ref().map_or(0, Vec::len)
    }

    /// Returns the queued operations in enqueue order.
    pub fn pending_operations(&self) -> &[Operation] {
        self.pending.as_deref().unwrap_or(&[])
    }

    /// Adds an entry from memory, or updates the entry of that name if it exists.
    ///
    /// # Errors
    ///
    /// - [`Error::ReadOnly`] if the archive is read-only
    /// - [`Error::InvalidName`] if `name` is empty, too long or not encodable
    /// - [`Error::SizeLimitExceeded`] if `data` is at or above the per-item limit
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use pck::Archive;
    ///
    /// let mut archive = Archive::open_writable("configs.pck")?;
    /// archive.begin_transaction()?;
    /// archive.add_bytes("configs/server.ini", b"[server]\nport=29000\n".to_vec())?;
    /// archive.add_bytes("configs/client.ini", b"[client]\n".to_vec())?;
    /// archive.commit_transaction(&mut pck::progress::NoProgress)?;
    /// # Ok::<(), pck::Error>(())
    /// ```
    pub fn add_bytes(&mut self, name: &str, data: impl Into<Vec<u8>>) -> Result<()> {
        self.ensure_writable()?;
        let name = EntryName::new(name)?;
        let data = data.into();
        check_size(name.as_str(), data.len() as u64, self.options.max_item_size)?;
        self.add_or_update(name, Payload::new(PayloadSource::Bytes(data)))
    }

    /// Adds an entry from a file on disk, or updates the entry of that name if it exists.
    ///
    /// The file is read when the transaction is committed. Its size is
    /// checked against the per-item limit now and again when it is read.
    pub fn add_file(&mut self, path: impl AsRef<Path>, name: &str) -> Result<()> {
        self.ensure_writable()?;
        let path = path.as_ref();
        let name = EntryName::new(name)?;
        let size = fs::metadata(path)?.len();
        check_size(
            &path.display().to_string(),
            size,
            self.options.max_item_size,
        )?;
        self.add_or_update(name, Payload::new(PayloadSource::File(path.to_path_buf())))
    }

    /// Copies an entry of another archive in its stored form.
    ///
    /// A handle taken from this same archive is ignored. If an entry with the
    /// same name exists it is updated instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArchiveClosed`] if the handle's archive is gone.
    pub fn add_entry(&mut self, handle: &EntryHandle) -> Result<()> {
        self.ensure_writable()?;
        if handle.archive_id() == self.id {
            debug!("Ignoring add of '{}' from the same archive", handle.name());
            return Ok(());
        }
        if !handle.is_alive() {
            return Err(Error::ArchiveClosed);
        }
        let entry = handle.entry();
        check_size(
            entry.name(),
            u64::from(entry.size),
            self.options.max_item_size,
        )?;
        let name = entry.name.clone();
        self.add_or_update(name, Payload::new(PayloadSource::Entry(handle.clone())))
    }

    /// Replaces the data of an existing entry.
    pub fn update_bytes(&mut self, id: EntryId, data: impl Into<Vec<u8>>) -> Result<()> {
        self.ensure_writable()?;
        let entry = self.entry_by_id(id)?;
        let data = data.into();
        check_size(entry.name(), data.len() as u64, self.options.max_item_size)?;
        self.enqueue(Operation::Update {
            target: id,
            payload: Payload::new(PayloadSource::Bytes(data)),
        })
    }

    /// Replaces the data of an existing entry with the contents of a file.
    pub fn update_file(&mut self, id: EntryId, path: impl AsRef<Path>) -> Result<()> {
        self.ensure_writable()?;
        self.entry_by_id(id)?;
        let path = path.as_ref();
        let size = fs::metadata(path)?.len();
        check_size(
            &path.display().to_string(),
            size,
            self.options.max_item_size,
        )?;
        self.enqueue(Operation::Update {
            target: id,
            payload: Payload::new(PayloadSource::File(path.to_path_buf())),
        })
    }

    /// Deletes an entry.
    ///
    /// The payload bytes stay in the file as redundancy unless the entry
    /// was the last one before the index table.
    pub fn delete(&mut self, id: EntryId) -> Result<()> {
        self.ensure_writable()?;
        self.entry_by_id(id)?;
        self.enqueue(Operation::Delete { target: id })
    }

    /// Deletes the entry called `name`.
    pub fn delete_by_name(&mut self, name: &str) -> Result<()> {
        let id = self.entry_by_name(name)?.id;
        self.delete(id)
    }

    /// Deletes every entry under the directory `prefix`, returning how many were queued.
    ///
    /// Matching ignores case and separator style. Entries named exactly
    /// `prefix` are not deleted.
    pub fn delete_directory(&mut self, prefix: &str) -> Result<usize> {
        self.ensure_writable()?;
        let dir = name::normalize(prefix);
        let targets: Vec<EntryId> = self
            .entries
            .iter()
            .filter(|e| e.name.is_under(&dir))
            .map(|e| e.id)
            .collect();
        if targets.is_empty() {
            return Ok(0);
        }

        let implicit = self.pending.is_none();
        if implicit {
            self.begin_transaction()?;
        }
        let count = targets.len();
        if let Some(queue) = self.pending.as_mut() {
            queue.extend(targets.into_iter().map(|target| Operation::Delete { target }));
        }
        if implicit {
            let _ = self.commit_transaction(&mut NoProgress)?;
        }
        Ok(count)
    }

    /// Renames an entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryExists`] if another entry already has the new
    /// name, or will have it once the queued operations are applied.
    pub fn rename(&mut self, id: EntryId, new_name: &str) -> Result<()> {
        self.ensure_writable()?;
        self.entry_by_id(id)?;
        let new_name = EntryName::new(new_name)?;
        if self.name_taken(&new_name, Some(id)) {
            return Err(Error::EntryExists {
                name: new_name.into_string(),
            });
        }
        self.enqueue(Operation::Rename {
            target: id,
            new_name,
        })
    }

    pub(crate) fn ensure_writable(&self) -> Result<()> {
        if self.is_read_only() {
            return Err(Error::ReadOnly);
        }
        Ok(())
    }

    fn entry_by_id(&self, id: EntryId) -> Result<&Entry> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| Error::EntryNotFound {
                name: format!("#{}", id.0),
            })
    }

    /// Returns `true` if a committed or queued entry other than `except` carries `name`.
    fn name_taken(&self, name: &EntryName, except: Option<EntryId>) -> bool {
        let committed = self
            .entries
            .iter()
            .any(|e| Some(e.id) != except && name::names_equal(e.name(), name.as_str()));
        committed
            || self.pending_operations().iter().any(|op| match op {
                Operation::Add { name: queued, .. }
                | Operation::Rename {
                    new_name: queued, ..
                } => name::names_equal(queued.as_str(), name.as_str()),
                _ => false,
            })
    }

    fn add_or_update(&mut self, name: EntryName, payload: Payload) -> Result<()> {
        let existing = self
            .entries
            .iter()
            .find(|e| name::names_equal(e.name(), name.as_str()))
            .map(|e| e.id);
        match existing {
            Some(target) => self.enqueue(Operation::Update { target, payload }),
            None => self.enqueue(Operation::Add { name, payload }),
        }
    }

    /// Queues `op`, or applies it at once if no transaction is open.
    fn enqueue(&mut self, op: Operation) -> Result<()> {
        match self.pending.as_mut() {
            Some(queue) => {
                queue.push(op);
                Ok(())
            }
            None => {
                self.pending = Some(vec![op]);
                self.commit_transaction(&mut NoProgress).map(|_| ())
            }
        }
    }
}
