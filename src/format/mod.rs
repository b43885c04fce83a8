//! Package format constants, definitions, and low-level parsing utilities.
//!
//! A package is laid out as
//!
//! ```text
//! +--------+----------------------+-------------+---------+
//! | header | entry payloads ...   | index table | trailer |
//! +--------+----------------------+-------------+---------+
//! 0        12                     index addr    size - 288
//! ```
//!
//! All integers are little-endian and all structures are packed. The
//! constants below are protocol magic numbers and must match exactly.

pub mod header;
pub mod index;
pub mod reader;

pub use header::{Header, Trailer};
pub use index::IndexRecord;

/// Magic value stored in the first header field.
pub const HEADER_MAGIC: u32 = 0x4DCA_23EF;

/// Check value stored in the first trailer field.
pub const TRAILER_CHECK_HEAD: u32 = 0xFDFD_FEEE;

/// Check value stored after the trailer's info slot.
pub const TRAILER_CHECK_TAIL: u32 = 0xF00D_BEEF;

/// The only format version this crate reads and writes.
pub const VERSION: u32 = 0x0002_0003;

/// XOR mask applied to the index table address in the trailer.
pub const ADDRESS_MASK: u32 = 0xA893_7462;

/// XOR mask applied to the first copy of an index record length.
pub const INDEX_MASK_A: u32 = 0xA893_7462;

/// XOR mask applied to the second copy of an index record length.
pub const INDEX_MASK_B: u32 = 0xF1A4_3653;

/// Size of the header in bytes.
pub const HEADER_SIZE: u64 = 12;

/// Size of the trailer in bytes.
pub const TRAILER_SIZE: u64 = 288;

/// Size of an uncompressed index record in bytes.
pub const INDEX_RECORD_SIZE: usize = 288;

/// Size of the fixed name field of an index record and of the trailer info slot.
pub const NAME_FIELD_SIZE: usize = 256;

/// Longest usable entry name in bytes (one byte is kept for the terminator).
pub const MAX_NAME_LENGTH: usize = NAME_FIELD_SIZE - 1;

/// Largest size of the primary file; bytes beyond it live in the overflow file.
pub const PCK_MAX_SIZE: u64 = 0x7FFF_FF00;

/// Default per-item size cap. Items at or above it are rejected.
pub const MAX_ITEM_SIZE: u64 = 0x7FFF_FF00;

/// Payloads shorter than this are stored without compression.
pub const COMPRESS_THRESHOLD: usize = 20;

/// Product identifier written into the trailer info slot at [`INFO_TEXT_OFFSET`].
pub const INFO_TEXT: &str =
    "Angelica File Package, Perfect World Co. Ltd. 2002~2008. All Rights Reserved.";

/// Offset of [`INFO_TEXT`] inside the trailer info slot.
pub const INFO_TEXT_OFFSET: usize = 4;

/// Applies (or removes) the index address mask.
///
/// Only the low 32 bits are masked, so addresses below 4 GiB keep a zero
/// high word on disk.
pub fn mask_address(value: u64) -> u64 {
    value ^ u64::from(ADDRESS_MASK)
}
