//! Raw deflate compression for snapshot buffers.
//!
//! Zero-length input is passed through unchanged in both directions, so an
//! empty snapshot costs nothing on the wire.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

/// Highest deflate level; the default for snapshots.
pub const BEST_COMPRESSION: u32 = 9;

/// Errors produced by [`compress`] and [`decompress`].
#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error("deflate compression failed: {0}")]
    Compress(#[source] std::io::Error),
    #[error("deflate decompression failed: {0}")]
    Decompress(#[source] std::io::Error),
}

/// Deflates `data` at `level` (clamped to `0..=9`).
pub fn compress(data: &[u8], level: u32) -> Result<Vec<u8>, CompressionError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let mut encoder = DeflateEncoder::new(
        Vec::with_capacity(data.len() / 2),
        Compression::new(level.min(BEST_COMPRESSION)),
    );
    encoder.write_all(data).map_err(CompressionError::Compress)?;
    encoder.finish().map_err(CompressionError::Compress)
}

/// Inflates a buffer produced by [`compress`].
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let mut decoder = DeflateDecoder::new(data);
    let mut out = Vec::with_capacity(data.len() * 4);
    decoder
        .read_to_end(&mut out)
        .map_err(CompressionError::Decompress)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_roundtrips_to_empty() {
        assert!(compress(&[], BEST_COMPRESSION).expect("compress").is_empty());
        assert!(decompress(&[]).expect("decompress").is_empty());
    }

    #[test]
    fn test_repetitive_data_shrinks() {
        let data = vec![7u8; 4096];
        let packed = compress(&data, BEST_COMPRESSION).expect("compress");
        assert!(
            packed.len() < data.len() / 10,
            "compressed size {} should be far below {}",
            packed.len(),
            data.len()
        );
        assert_eq!(decompress(&packed).expect("decompress"), data);
    }

    #[test]
    fn test_level_is_clamped() {
        let data: Vec<u8> = (0..=255u8).cycle().take(2000).collect();
        let packed = compress(&data, 42).expect("compress");
        assert_eq!(decompress(&packed).expect("decompress"), data);
    }

    #[test]
    fn test_garbage_input_is_an_error() {
        let result = decompress(&[0xFF; 8]);
        assert!(matches!(result, Err(CompressionError::Decompress(_))));
    }
}
