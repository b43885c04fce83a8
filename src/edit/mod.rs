//! Archive modification.
//!
//! Packages are modified in place. Mutators on [`Archive`](crate::Archive)
//! either queue an [`Operation`] inside an open transaction or, outside
//! one, apply it immediately:
//!
//! - Adding entries from memory, from files or from another archive
//! - Updating entry contents
//! - Deleting entries or whole directories
//! - Renaming entries
//!
//! # Example
//!
//! ```rust,no_run
//! use pck::Archive;
//! use pck::progress::NoProgress;
//!
//! let mut archive = Archive::open_writable("interfaces.pck")?;
//!
//! archive.begin_transaction()?;
//! let old = archive.entry_by_name("interfaces\\old.xml")?.id;
//! archive.rename(old, "interfaces\\new.xml")?;
//! archive.delete_directory("interfaces\\unused")?;
//! archive.add_bytes("interfaces\\extra.txt", b"Hello, World!".to_vec())?;
//! let result = archive.commit_transaction(&mut NoProgress)?;
//!
//! println!("renamed {}, deleted {}, added {}",
//!          result.renamed,
//!          result.deleted,
//!          result.added);
//! # Ok::<(), pck::Error>(())
//! ```
//!
//! # Implementation Notes
//!
//! Commit writes payloads over the old index table and past it, then
//! writes a fresh index table after the highest live payload. Space freed
//! by deletes, and by updates that had to move, stays in the file as
//! redundancy until [`Archive::rebuild`](crate::Archive::rebuild) copies the
//! live entries into a new package.

mod bulk;
mod commit;
mod operation;
mod transaction;

pub use commit::CommitResult;
pub use operation::{Operation, Payload, PayloadSource};
