use super::{Compressor, CompressorID, CompressionError, DecompressionError, NO_COMPRESSION};

/// The identity "compressor": copies bytes through unchanged. Used as the trailer's type byte
/// `0` and as the effective compressor whenever the configured codec fails to meet the
/// savings threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneCompressor;

impl CompressorID for NoneCompressor {
    const ID: u8 = NO_COMPRESSION;
}

impl Compressor for NoneCompressor {
    fn encode_into(&self, source: &[u8], output_buf: &mut Vec<u8>) -> Result<(), CompressionError> {
        output_buf.extend_from_slice(source);
        Ok(())
    }

    fn decode_into(&self, source: &[u8], output_buf: &mut Vec<u8>) -> Result<(), DecompressionError> {
        output_buf.extend_from_slice(source);
        Ok(())
    }
}
