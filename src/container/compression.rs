//! Compression of dataset payloads.
//!
//! Datasets created with a deflate level are zlib-compressed when the
//! container is persisted.

use std::io::{Read, Write};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::util::{Error, Result};

/// Compress data using zlib.
///
/// # Arguments
/// * `data` - Data to compress
/// * `level` - Compression level (0-9, where 0 is no compression, 9 is max)
///
/// Returns `None` when compression is disabled or does not save space.
pub fn compress(data: &[u8], level: u32) -> Result<Option<Vec<u8>>> {
    if level == 0 || data.is_empty() {
        return Ok(None);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level.min(9)));
    encoder.write_all(data)?;
    let compressed = encoder.finish()?;

    if compressed.len() >= data.len() {
        return Ok(None);
    }

    Ok(Some(compressed))
}

/// Decompress zlib data that must expand to exactly `expected_len` bytes.
pub fn decompress(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut decompressed = Vec::with_capacity(expected_len);
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::invalid(format!("corrupt compressed payload: {}", e)))?;

    if decompressed.len() != expected_len {
        return Err(Error::invalid(format!(
            "compressed payload expands to {} bytes, expected {}",
            decompressed.len(),
            expected_len
        )));
    }

    Ok(decompressed)
}
