//! Index record encoding and decoding.
//!
//! Each record in the index table is framed as
//!
//! ```text
//! u32 len ^ INDEX_MASK_A | u32 len ^ INDEX_MASK_B | len bytes
//! ```
//!
//! where the body is the zlib-compressed [`INDEX_RECORD_SIZE`]-byte raw
//! record, or the raw record itself when compression did not help.

use log::warn;

use crate::codec;
use crate::{Error, Result};

use super::reader::{put_u32_le, put_u64_le, until_nul};
use super::{INDEX_MASK_A, INDEX_MASK_B, INDEX_RECORD_SIZE, NAME_FIELD_SIZE};

/// Size of the two masked length fields preceding each record body.
pub const FRAME_PREFIX_SIZE: usize = 8;

/// One entry of the index table, as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    /// NUL-padded name in the on-disk code page.
    pub name: [u8; NAME_FIELD_SIZE],
    /// Unused field, preserved verbatim.
    pub reserved_a: u32,
    /// Unused field, preserved verbatim.
    pub reserved_b: u32,
    /// Logical offset of the stored payload.
    pub offset: u64,
    /// Uncompressed payload size.
    pub size: u32,
    /// Stored payload size.
    pub compressed_size: u32,
    /// Unused field, preserved verbatim.
    pub reserved_d: u32,
    /// Unused field, preserved verbatim.
    pub reserved_e: u32,
}

impl Default for IndexRecord {
    fn default() -> Self {
        Self {
            name: [0; NAME_FIELD_SIZE],
            reserved_a: 0,
            reserved_b: 0,
            offset: 0,
            size: 0,
            compressed_size: 0,
            reserved_d: 0,
            reserved_e: 0,
        }
    }
}

impl IndexRecord {
    /// Returns the name bytes up to the first NUL.
    pub fn name_bytes(&self) -> &[u8] {
        until_nul(&self.name)
    }

    /// Stores encoded name bytes into the fixed name field.
    ///
    /// The caller guarantees `bytes` leaves room for the terminator.
    pub fn set_name_bytes(&mut self, bytes: &[u8]) {
        let len = bytes.len().min(NAME_FIELD_SIZE - 1);
        self.name = [0; NAME_FIELD_SIZE];
        self.name[..len].copy_from_slice(&bytes[..len]);
    }

    /// Serializes the raw, uncompressed record.
    pub fn to_raw(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(INDEX_RECORD_SIZE);
        buf.extend_from_slice(&self.name);
        put_u32_le(&mut buf, self.reserved_a);
        put_u32_le(&mut buf, self.reserved_b);
        put_u64_le(&mut buf, self.offset);
        put_u32_le(&mut buf, self.size);
        put_u32_le(&mut buf, self.compressed_size);
        put_u32_le(&mut buf, self.reserved_d);
        put_u32_le(&mut buf, self.reserved_e);
        buf
    }

    /// Parses a raw record. `raw` must be exactly [`INDEX_RECORD_SIZE`] bytes.
    pub fn from_raw(raw: &[u8]) -> Option<Self> {
        if raw.len() != INDEX_RECORD_SIZE {
            return None;
        }
        let u32_at = |pos: usize| {
            let mut b = [0u8; 4];
            b.copy_from_slice(&raw[pos..pos + 4]);
            u32::from_le_bytes(b)
        };
        let mut name = [0u8; NAME_FIELD_SIZE];
        name.copy_from_slice(&raw[..NAME_FIELD_SIZE]);
        let mut offset = [0u8; 8];
        offset.copy_from_slice(&raw[264..272]);
        Some(Self {
            name,
            reserved_a: u32_at(256),
            reserved_b: u32_at(260),
            offset: u64::from_le_bytes(offset),
            size: u32_at(272),
            compressed_size: u32_at(276),
            reserved_d: u32_at(280),
            reserved_e: u32_at(284),
        })
    }

    /// Encodes the record into its framed wire form.
    pub fn encode(&self, level: u32) -> Result<Vec<u8>> {
        let raw = self.to_raw();
        let compressed = codec::compress(&raw, level).map_err(|e| Error::storage("compress", e))?;
        let body = if compressed.len() < raw.len() {
            compressed
        } else {
            raw
        };

        let len = body.len() as u32;
        let mut buf = Vec::with_capacity(FRAME_PREFIX_SIZE + body.len());
        put_u32_le(&mut buf, len ^ INDEX_MASK_A);
        put_u32_le(&mut buf, len ^ INDEX_MASK_B);
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    /// Decodes one framed record from the start of `buf`.
    ///
    /// `index` is the position of the record in the table and is only used
    /// for error reporting. Returns the record and the number of bytes
    /// consumed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptIndex`] if the frame is truncated, the two
    /// length fields disagree, or the body is neither a valid compressed
    /// record nor a raw one.
    pub fn decode(buf: &[u8], index: usize) -> Result<(Self, usize)> {
        if buf.len() < FRAME_PREFIX_SIZE {
            return Err(Error::corrupt_index(
                index,
                format!("truncated length prefix ({} bytes left)", buf.len()),
            ));
        }
        let field = |pos: usize| {
            let mut b = [0u8; 4];
            b.copy_from_slice(&buf[pos..pos + 4]);
            u32::from_le_bytes(b)
        };
        let len_a = field(0) ^ INDEX_MASK_A;
        let len_b = field(4) ^ INDEX_MASK_B;
        if len_a != len_b {
            return Err(Error::corrupt_index(
                index,
                format!("length fields disagree ({} vs {})", len_a, len_b),
            ));
        }

        let len = len_a as usize;
        let end = FRAME_PREFIX_SIZE
            .checked_add(len)
            .filter(|&end| end <= buf.len())
            .ok_or_else(|| {
                Error::corrupt_index(
                    index,
                    format!(
                        "record length {} exceeds remaining table size {}",
                        len,
                        buf.len() - FRAME_PREFIX_SIZE
                    ),
                )
            })?;
        let body = &buf[FRAME_PREFIX_SIZE..end];

        let raw = match codec::decompress(body, INDEX_RECORD_SIZE) {
            Ok(raw) => raw,
            Err(_) if len == INDEX_RECORD_SIZE => {
                warn!("index record {} is stored uncompressed", index);
                body.to_vec()
            }
            Err(e) => {
                return Err(Error::corrupt_index(
                    index,
                    format!("record body failed to decompress: {}", e),
                ));
            }
        };

        let record = Self::from_raw(&raw)
            .ok_or_else(|| Error::corrupt_index(index, "record body has the wrong size"))?;
        Ok((record, end))
    }
}
