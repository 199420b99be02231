use std::io::Write;

use super::{Compressor, CompressorID, CompressionError, DecompressionError, ZSTD_COMPRESSION};

/// Zstandard compression, via the `zstd` crate. Only ever selected when a caller explicitly
/// configures it; it is not part of this crate's default compression policy.
#[derive(Debug, Clone, Copy)]
pub struct ZstdCompressor {
    pub compression_level: i32,
}

impl Default for ZstdCompressor {
    fn default() -> Self {
        // `zstd::DEFAULT_COMPRESSION_LEVEL`.
        Self { compression_level: 3 }
    }
}

impl CompressorID for ZstdCompressor {
    const ID: u8 = ZSTD_COMPRESSION;
}

impl Compressor for ZstdCompressor {
    fn encode_into(&self, source: &[u8], output_buf: &mut Vec<u8>) -> Result<(), CompressionError> {
        let mut encoder = zstd::Encoder::new(output_buf, self.compression_level)
            .map_err(CompressionError::from_display)?
            .auto_finish();
        encoder.write_all(source).map_err(CompressionError::from_display)?;
        Ok(())
    }

    fn decode_into(&self, source: &[u8], output_buf: &mut Vec<u8>) -> Result<(), DecompressionError> {
        zstd::stream::copy_decode(source, output_buf).map_err(DecompressionError::from_display)
    }
}
