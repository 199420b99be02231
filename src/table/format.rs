//! Fixed binary layouts: block handles, the footer, and CRC masking.

use integer_encoding::{VarInt, VarIntWriter};

use crate::error::{Status, StatusResult};

/// `compression_type (u8) || masked_crc32c (u32 LE)`, appended after every block's payload.
pub const BLOCK_TRAILER_LEN: usize = 5;

/// Prefix prepended to a filter policy's name to form its metaindex key.
pub const FILTER_META_PREFIX: &[u8] = b"filter.";

/// Locates a block within the file: its starting offset and payload size (trailer excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockHandle {
    pub offset: u64,
    pub size: u64,
}

impl BlockHandle {
    /// Two varint64s, each at most 10 bytes.
    pub const MAX_ENCODED_LENGTH: usize = 20;

    #[must_use]
    pub fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    pub fn encode_to(&self, buf: &mut Vec<u8>) {
        #[expect(clippy::unwrap_used, reason = "Vec<u8> writer never fails")]
        {
            buf.write_varint(self.offset).unwrap();
            buf.write_varint(self.size).unwrap();
        }
    }

    pub fn decode_from(buf: &[u8]) -> StatusResult<(Self, usize)> {
        let (offset, offset_len) = u64::decode_var(buf)
            .ok_or_else(|| Status::corruption("truncated block handle (offset)"))?;
        let rest = buf.get(offset_len..).ok_or_else(|| Status::corruption("truncated block handle"))?;
        let (size, size_len) = u64::decode_var(rest)
            .ok_or_else(|| Status::corruption("truncated block handle (size)"))?;

        Ok((Self { offset, size }, offset_len + size_len))
    }
}

/// The 48-byte record at the very end of every table file: handles to the metaindex and index
/// blocks, padded to a fixed width, followed by a magic number identifying the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableFooter {
    pub metaindex_handle: BlockHandle,
    pub index_handle: BlockHandle,
}

impl TableFooter {
    pub const ENCODED_LENGTH: usize = 2 * BlockHandle::MAX_ENCODED_LENGTH + 8;

    pub const MAGIC: u64 = 0xdb47_7524_8b80_fb57;

    pub fn encode_to(&self, buf: &mut Vec<u8>) {
        let start = buf.len();
        self.metaindex_handle.encode_to(buf);
        self.index_handle.encode_to(buf);
        buf.resize(start + 2 * BlockHandle::MAX_ENCODED_LENGTH, 0);
        buf.extend_from_slice(&Self::MAGIC.to_le_bytes());
    }

    pub fn decode_from(buf: &[u8]) -> StatusResult<Self> {
        if buf.len() != Self::ENCODED_LENGTH {
            return Err(Status::corruption("footer has the wrong length"));
        }

        #[expect(clippy::indexing_slicing, reason = "length checked above")]
        let magic_bytes: [u8; 8] = buf[Self::ENCODED_LENGTH - 8..].try_into().unwrap_or([0; 8]);
        let magic = u64::from_le_bytes(magic_bytes);
        if magic != Self::MAGIC {
            return Err(Status::corruption("not a sorted-table file (bad magic number)"));
        }

        let (metaindex_handle, consumed) = BlockHandle::decode_from(buf)?;
        let rest = buf
            .get(consumed..)
            .ok_or_else(|| Status::corruption("truncated footer"))?;
        let (index_handle, _) = BlockHandle::decode_from(rest)?;

        Ok(Self { metaindex_handle, index_handle })
    }
}

/// Added to (and later subtracted from) a raw CRC32C before it's stored, so that storing a CRC
/// inside data whose own CRC is also computed doesn't create a fixed point under concatenation.
const CHECKSUM_MASK_DELTA: u32 = 0xa282_ead8;

#[must_use]
pub fn mask_checksum(crc: u32) -> u32 {
    crc.rotate_right(15).wrapping_add(CHECKSUM_MASK_DELTA)
}

#[must_use]
pub fn unmask_checksum(masked_crc: u32) -> u32 {
    masked_crc.wrapping_sub(CHECKSUM_MASK_DELTA).rotate_left(15)
}
