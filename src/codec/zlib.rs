//! Whole-buffer zlib streams over flate2.

use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::bufread::ZlibDecoder;
use flate2::write::ZlibEncoder;

/// Highest level zlib accepts; larger requests are clamped.
pub const MAX_LEVEL: u32 = 9;

/// Compresses `data` into a zlib stream at `level`.
pub fn compress(data: &[u8], level: u32) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 2 + 16),
        Compression::new(level.min(MAX_LEVEL)),
    );
    encoder.write_all(data)?;
    encoder.finish()
}

/// Decompresses a zlib stream that must expand to exactly `expected` bytes.
///
/// # Errors
///
/// Returns an `InvalidData` error if the stream is malformed or its output
/// length differs from `expected`.
pub fn decompress(data: &[u8], expected: usize) -> io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected);
    // One byte of slack detects streams that are longer than declared.
    ZlibDecoder::new(data)
        .take(expected as u64 + 1)
        .read_to_end(&mut out)?;
    if out.len() != expected {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "stream expands to {}{} bytes, expected {}",
                if out.len() > expected { "more than " } else { "" },
                out.len().min(expected),
                expected
            ),
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_header() {
        let compressed = compress(b"gfx\\ui\\icon.dds gfx\\ui\\icon.dds", 6).unwrap();
        // CMF byte: deflate with a 32K window
        assert_eq!(compressed[0], 0x78);
    }

    #[test]
    fn test_level_clamped() {
        let data = vec![b'q'; 300];
        assert_eq!(compress(&data, 100).unwrap(), compress(&data, MAX_LEVEL).unwrap());
    }

    #[test]
    fn test_trailing_garbage_ignored_but_length_checked() {
        let data = b"abcabcabcabcabcabcabcabc".repeat(4);
        let mut stream = compress(&data, 6).unwrap();
        stream.extend_from_slice(&[0xEE; 8]);
        assert_eq!(decompress(&stream, data.len()).unwrap(), data);
    }
}
