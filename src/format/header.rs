//! Package header and trailer structures.

use std::io::Read;

use crate::{Error, Result};

use super::reader::{put_u32_le, put_u64_le, read_array, read_u32_le, read_u64_le};
use super::{
    HEADER_MAGIC, HEADER_SIZE, INFO_TEXT, INFO_TEXT_OFFSET, NAME_FIELD_SIZE, TRAILER_CHECK_HEAD,
    TRAILER_CHECK_TAIL, TRAILER_SIZE, VERSION, mask_address,
};

/// The fixed header at offset 0 of every package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Magic value, [`HEADER_MAGIC`] for valid packages.
    pub magic: u32,
    /// Total logical size of the package (primary plus overflow file).
    pub size: u64,
}

impl Header {
    /// Creates the header of an empty package.
    pub fn new() -> Self {
        Self {
            magic: HEADER_MAGIC,
            size: HEADER_SIZE + TRAILER_SIZE,
        }
    }

    /// Parses and validates a header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the magic does not match or the
    /// declared size cannot hold a header and trailer.
    pub fn parse<R: Read>(r: &mut R) -> Result<Self> {
        let magic = read_u32_le(r).map_err(|e| Error::storage("read", e))?;
        let size = read_u64_le(r).map_err(|e| Error::storage("read", e))?;

        if magic != HEADER_MAGIC {
            return Err(Error::InvalidFormat(format!(
                "header magic mismatch: expected {:#x}, got {:#x}",
                HEADER_MAGIC, magic
            )));
        }
        if size < HEADER_SIZE + TRAILER_SIZE {
            return Err(Error::InvalidFormat(format!(
                "declared package size {} is smaller than header and trailer",
                size
            )));
        }

        Ok(Self { magic, size })
    }

    /// Serializes the header.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE as usize);
        put_u32_le(&mut buf, self.magic);
        put_u64_le(&mut buf, self.size);
        buf
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed trailer stored in the last [`TRAILER_SIZE`] bytes of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trailer {
    /// First check value, [`TRAILER_CHECK_HEAD`] for valid packages.
    pub check_head: u32,
    /// First copy of the format version.
    pub version_head: u32,
    /// Index table address XOR [`ADDRESS_MASK`](super::ADDRESS_MASK).
    pub index_value: u64,
    /// Free-text metadata slot, preserved verbatim.
    pub info: [u8; NAME_FIELD_SIZE],
    /// Second check value, [`TRAILER_CHECK_TAIL`] for valid packages.
    pub check_tail: u32,
    /// Unused field, preserved verbatim.
    pub reserved: u32,
    /// Number of index records.
    pub entry_count: u32,
    /// Second copy of the format version.
    pub version_tail: u32,
}

impl Trailer {
    /// Creates the trailer of an empty package with the index table right after the header.
    pub fn new() -> Self {
        let mut info = [0u8; NAME_FIELD_SIZE];
        info[INFO_TEXT_OFFSET..INFO_TEXT_OFFSET + INFO_TEXT.len()]
            .copy_from_slice(INFO_TEXT.as_bytes());
        Self {
            check_head: TRAILER_CHECK_HEAD,
            version_head: VERSION,
            index_value: mask_address(HEADER_SIZE),
            info,
            check_tail: TRAILER_CHECK_TAIL,
            reserved: 0,
            entry_count: 0,
            version_tail: VERSION,
        }
    }

    /// Parses a trailer without validating it.
    pub fn parse<R: Read>(r: &mut R) -> Result<Self> {
        let read = |e| Error::storage("read", e);
        Ok(Self {
            check_head: read_u32_le(r).map_err(read)?,
            version_head: read_u32_le(r).map_err(read)?,
            index_value: read_u64_le(r).map_err(read)?,
            info: read_array(r).map_err(read)?,
            check_tail: read_u32_le(r).map_err(read)?,
            reserved: read_u32_le(r).map_err(read)?,
            entry_count: read_u32_le(r).map_err(read)?,
            version_tail: read_u32_le(r).map_err(read)?,
        })
    }

    /// Validates the check values, then the version fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptTrailer`] if either check value is wrong and
    /// [`Error::UnsupportedVersion`] if either version field is not [`VERSION`].
    pub fn validate(&self) -> Result<()> {
        if self.check_head != TRAILER_CHECK_HEAD || self.check_tail != TRAILER_CHECK_TAIL {
            return Err(Error::CorruptTrailer {
                reason: format!(
                    "check values {:#x}/{:#x}, expected {:#x}/{:#x}",
                    self.check_head, self.check_tail, TRAILER_CHECK_HEAD, TRAILER_CHECK_TAIL
                ),
            });
        }
        if self.version_head != VERSION || self.version_tail != VERSION {
            return Err(Error::UnsupportedVersion {
                found_head: self.version_head,
                found_tail: self.version_tail,
            });
        }
        Ok(())
    }

    /// Returns the decoded index table address.
    pub fn index_address(&self) -> u64 {
        mask_address(self.index_value)
    }

    /// Stores an index table address, masking it.
    pub fn set_index_address(&mut self, address: u64) {
        self.index_value = mask_address(address);
    }

    /// Serializes the trailer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(TRAILER_SIZE as usize);
        put_u32_le(&mut buf, self.check_head);
        put_u32_le(&mut buf, self.version_head);
        put_u64_le(&mut buf, self.index_value);
        buf.extend_from_slice(&self.info);
        put_u32_le(&mut buf, self.check_tail);
        put_u32_le(&mut buf, self.reserved);
        put_u32_le(&mut buf, self.entry_count);
        put_u32_le(&mut buf, self.version_tail);
        buf
    }
}

impl Default for Trailer {
    fn default() -> Self {
        Self::new()
    }
}
