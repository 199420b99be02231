use snap::raw::{max_compress_len, Decoder as SnapDecoder, Encoder as SnapEncoder};

use super::{Compressor, CompressorID, CompressionError, DecompressionError, SNAPPY_COMPRESSION};

/// Snappy compression, via the `snap` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnappyCompressor;

impl CompressorID for SnappyCompressor {
    const ID: u8 = SNAPPY_COMPRESSION;
}

impl Compressor for SnappyCompressor {
    fn encode_into(&self, source: &[u8], output_buf: &mut Vec<u8>) -> Result<(), CompressionError> {
        let base_len = output_buf.len();
        output_buf.resize(base_len + max_compress_len(source.len()), 0);

        #[expect(clippy::indexing_slicing, reason = "just resized to fit max_compress_len")]
        let scratch = &mut output_buf[base_len..];
        let written = SnapEncoder::new()
            .compress(source, scratch)
            .map_err(CompressionError::from_display)?;

        output_buf.truncate(base_len + written);
        Ok(())
    }

    fn decode_into(&self, source: &[u8], output_buf: &mut Vec<u8>) -> Result<(), DecompressionError> {
        let decoded = SnapDecoder::new()
            .decompress_vec(source)
            .map_err(DecompressionError::from_display)?;
        output_buf.extend_from_slice(&decoded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let compressor = SnappyCompressor;
        let source = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

        let mut compressed = Vec::new();
        compressor.encode_into(source, &mut compressed).expect("compress");
        assert!(compressed.len() < source.len());

        let mut decompressed = Vec::new();
        compressor.decode_into(&compressed, &mut decompressed).expect("decompress");
        assert_eq!(decompressed, source);
    }
}
