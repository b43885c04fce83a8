//! Compression codec used for entry payloads and index records.
//!
//! Packages use a single method: zlib at a configurable level. Whether a
//! payload is actually compressed is decided per item by [`pack`], and
//! [`unpack`] undoes it, telling raw storage apart from corruption.

pub mod zlib;

use std::io;

use crate::format::COMPRESS_THRESHOLD;
use crate::{Error, Result};

pub use zlib::{compress, decompress};

/// Produces the stored form of a payload.
///
/// Payloads shorter than [`COMPRESS_THRESHOLD`] are stored as-is, as are
/// payloads that do not shrink under compression. A stored form whose length
/// equals the payload length is therefore always the raw payload.
pub fn pack(data: &[u8], level: u32) -> io::Result<Vec<u8>> {
    if data.len() < COMPRESS_THRESHOLD {
        return Ok(data.to_vec());
    }
    let compressed = compress(data, level)?;
    if compressed.len() >= data.len() {
        return Ok(data.to_vec());
    }
    Ok(compressed)
}

/// Recovers a payload from its stored form.
///
/// Decompression is always attempted first. If it fails and the stored
/// length equals the declared size the bytes were stored raw; any other
/// failure is corruption.
///
/// # Errors
///
/// Returns [`Error::CorruptPayload`] if the stored bytes neither decompress
/// to `size` bytes nor can be raw storage.
pub fn unpack(name: &str, stored: Vec<u8>, size: usize) -> Result<Vec<u8>> {
    match decompress(&stored, size) {
        Ok(data) => Ok(data),
        Err(_) if stored.len() == size => Ok(stored),
        Err(e) => Err(Error::CorruptPayload {
            name: name.to_string(),
            reason: format!(
                "{} stored bytes failed to decompress to {} bytes: {}",
                stored.len(),
                size,
                e
            ),
        }),
    }
}
