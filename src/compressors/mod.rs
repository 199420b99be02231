//! Block compression codecs and the compressor-ID byte stored in each block trailer.

mod compressor_list;
mod implementors;
#[cfg(feature = "snappy-compressor")]
mod snappy_impl;
#[cfg(feature = "zstd-compressor")]
mod zstd_impl;

use std::fmt::{self, Display, Formatter};

pub use compressor_list::CompressorList;
pub use implementors::NoneCompressor;
#[cfg(feature = "snappy-compressor")]
pub use snappy_impl::SnappyCompressor;
#[cfg(feature = "zstd-compressor")]
pub use zstd_impl::ZstdCompressor;

/// The type byte stored in a block trailer for an uncompressed block.
pub const NO_COMPRESSION: u8 = 0;
/// The type byte stored in a block trailer for a Snappy-compressed block.
pub const SNAPPY_COMPRESSION: u8 = 1;
/// The type byte stored in a block trailer for a Zstandard-compressed block.
pub const ZSTD_COMPRESSION: u8 = 2;

/// A block compression codec.
pub trait Compressor: std::fmt::Debug {
    fn encode_into(&self, source: &[u8], output_buf: &mut Vec<u8>) -> Result<(), CompressionError>;
    fn decode_into(&self, source: &[u8], output_buf: &mut Vec<u8>) -> Result<(), DecompressionError>;
}

/// Associates a [`Compressor`] implementation with the trailer byte it's stored under.
pub trait CompressorID {
    const ID: u8;
}

/// Error returned by [`Compressor::encode_into`].
#[derive(Debug, Clone)]
pub struct CompressionError {
    pub error_msg: String,
}

impl CompressionError {
    pub fn from_display(err: impl Display) -> Self {
        Self { error_msg: err.to_string() }
    }
}

impl Display for CompressionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "compression error: {}", self.error_msg)
    }
}

impl std::error::Error for CompressionError {}

/// Error returned by [`Compressor::decode_into`].
#[derive(Debug, Clone)]
pub struct DecompressionError {
    pub error_msg: String,
}

impl DecompressionError {
    pub fn from_display(err: impl Display) -> Self {
        Self { error_msg: err.to_string() }
    }
}

impl Display for DecompressionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "decompression error: {}", self.error_msg)
    }
}

impl std::error::Error for DecompressionError {}
