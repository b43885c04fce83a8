//! Error types for package archive operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when working with `.pck` archives, along with a convenient
//! [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. Errors are
//! never stashed in global state; every call reports its own failure.
//!
//! ```rust,no_run
//! use pck::{Archive, Error};
//!
//! fn open_or_explain(path: &str) -> pck::Result<Archive> {
//!     match Archive::open(path) {
//!         Ok(archive) => Ok(archive),
//!         Err(Error::InvalidFormat(msg)) => {
//!             eprintln!("Not a package file: {}", msg);
//!             Err(Error::InvalidFormat(msg))
//!         }
//!         Err(e @ Error::UnsupportedVersion { .. }) => {
//!             eprintln!("Package written by an unsupported version");
//!             Err(e)
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use std::io;

/// The main error type for package archive operations.
///
/// # Error Categories
///
/// | Category | Variants |
/// |----------|----------|
/// | Format | [`InvalidFormat`][Self::InvalidFormat], [`CorruptTrailer`][Self::CorruptTrailer], [`UnsupportedVersion`][Self::UnsupportedVersion] |
/// | Index corruption | [`CorruptIndex`][Self::CorruptIndex] |
/// | Payload corruption | [`CorruptPayload`][Self::CorruptPayload] |
/// | I/O | [`Io`][Self::Io], [`Storage`][Self::Storage], [`ReadOnly`][Self::ReadOnly], [`ArchiveClosed`][Self::ArchiveClosed] |
/// | Names | [`InvalidName`][Self::InvalidName], [`EntryExists`][Self::EntryExists], [`UnsafePath`][Self::UnsafePath] |
/// | Lookup | [`EntryNotFound`][Self::EntryNotFound], [`IndexOutOfRange`][Self::IndexOutOfRange] |
/// | Limits | [`SizeLimitExceeded`][Self::SizeLimitExceeded] |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred outside the archive byte store.
    ///
    /// This wraps [`std::io::Error`] and is returned when file operations such
    /// as reading an input file or writing an extracted file fail.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An operation on the archive byte store failed.
    ///
    /// `operation` names the primitive that failed (`"seek"`, `"read"`,
    /// `"write"`, `"truncate"`, `"open"`, `"create"`).
    #[error("package {operation} failed: {source}")]
    Storage {
        /// The store primitive that failed.
        operation: &'static str,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file does not start with the package header magic.
    #[error("Invalid package format: {0}")]
    InvalidFormat(String),

    /// The trailer check values do not match.
    #[error("Corrupt trailer: {reason}")]
    CorruptTrailer {
        /// A description of the mismatch.
        reason: String,
    },

    /// The trailer carries a format version this crate does not read.
    #[error("Unsupported package version {found_head:#x}/{found_tail:#x}")]
    UnsupportedVersion {
        /// Version stored in the first trailer field.
        found_head: u32,
        /// Version stored in the last trailer field.
        found_tail: u32,
    },

    /// An index record could not be decoded.
    ///
    /// Either the two obfuscated length fields disagree or the record data
    /// failed to decompress.
    #[error("Corrupt index record {index}: {reason}")]
    CorruptIndex {
        /// Position of the record in the index table.
        index: usize,
        /// A description of the corruption.
        reason: String,
    },

    /// Entry data failed to decompress and is not plausibly stored raw.
    #[error("Corrupt data for entry '{name}': {reason}")]
    CorruptPayload {
        /// The entry name.
        name: String,
        /// A description of the corruption.
        reason: String,
    },

    /// A mutation was attempted on an archive opened read-only.
    #[error("archive is opened read-only")]
    ReadOnly,

    /// An entry handle outlived the archive it was taken from.
    #[error("the archive owning this entry has been closed")]
    ArchiveClosed,

    /// An entry name is not acceptable.
    ///
    /// Names must be non-empty after normalisation, fit in 255 bytes once
    /// encoded in the on-disk code page, and be representable in it.
    #[error("Invalid entry name '{name}': {reason}")]
    InvalidName {
        /// The offending name.
        name: String,
        /// Why the name was rejected.
        reason: String,
    },

    /// An entry with this name already exists.
    #[error("Entry already exists: {name}")]
    EntryExists {
        /// The colliding name.
        name: String,
    },

    /// An entry name would escape the extraction directory.
    #[error("Refusing to extract unsafe path: {name}")]
    UnsafePath {
        /// The entry name.
        name: String,
    },

    /// No entry matches the requested name.
    #[error("Entry not found: {name}")]
    EntryNotFound {
        /// The name that was looked up.
        name: String,
    },

    /// An entry index is past the end of the entry table.
    #[error("Entry index {index} out of range (archive has {len} entries)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of entries in the archive.
        len: usize,
    },

    /// The operation was cancelled by the progress callback.
    #[error("Operation cancelled")]
    Cancelled,

    /// An item is too large to be stored in a package.
    #[error("'{name}' is {size} bytes, at or above the per-item limit of {limit} bytes")]
    SizeLimitExceeded {
        /// The item name (entry name or disk path).
        name: String,
        /// Size of the item in bytes.
        size: u64,
        /// The configured limit.
        limit: u64,
    },

    /// An invalid compression level was provided.
    ///
    /// ```rust
    /// use pck::{ArchiveOptions, Error};
    ///
    /// assert!(ArchiveOptions::new().level(9).is_ok());
    /// assert!(matches!(
    ///     ArchiveOptions::new().level(12),
    ///     Err(Error::InvalidCompressionLevel { level: 12 })
    /// ));
    /// ```
    #[error("invalid compression level {level}: must be 0-9")]
    InvalidCompressionLevel {
        /// The invalid level that was provided.
        level: u32,
    },
}

impl Error {
    /// Wraps an I/O error raised by a byte store primitive.
    pub fn storage(operation: &'static str, source: io::Error) -> Self {
        Error::Storage { operation, source }
    }

    /// Creates a CorruptIndex error.
    pub fn corrupt_index(index: usize, reason: impl Into<String>) -> Self {
        Error::CorruptIndex {
            index,
            reason: reason.into(),
        }
    }

    /// Creates an InvalidName error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the archive or one of its entries is damaged.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::InvalidFormat(_)
                | Error::CorruptTrailer { .. }
                | Error::CorruptIndex { .. }
                | Error::CorruptPayload { .. }
        )
    }

    /// Returns `true` if this error might be recoverable.
    ///
    /// Cancellation can be retried, and so can transient I/O failures
    /// (`WouldBlock`, `Interrupted`, `TimedOut`).
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Cancelled => true,
            Error::Io(e) | Error::Storage { source: e, .. } => matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }

    /// Returns the entry name associated with this error, if any.
    pub fn entry_name(&self) -> Option<&str> {
        match self {
            Error::CorruptPayload { name, .. }
            | Error::InvalidName { name, .. }
            | Error::EntryExists { name }
            | Error::UnsafePath { name }
            | Error::EntryNotFound { name }
            | Error::SizeLimitExceeded { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// A specialized Result type for package operations.
pub type Result<T> = std::result::Result<T, Error>;
