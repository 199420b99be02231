//! Configuration accepted by [`TableBuilder`](super::TableBuilder).

use crate::comparator::LexicographicComparator;
use crate::filters::NoFilterPolicy;

/// Default target size, in bytes, of an uncompressed data block before it's flushed.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Default number of entries between restart points in a data block.
pub const DEFAULT_BLOCK_RESTART_INTERVAL: usize = 16;

/// Compression codec a [`TableBuilder`](super::TableBuilder) should attempt for each data,
/// metaindex, or index block. The filter block is never compressed regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionKind {
    #[default]
    None,
    Snappy,
    Zstd,
}

/// Options controlling how a [`TableBuilder`](super::TableBuilder) lays out its output.
///
/// Type parameters default to the bundled bytewise comparator and no filter policy, matching
/// the simplest valid configuration; callers with a custom key order or a Bloom filter supply
/// their own `TableCmp`/`Policy`.
#[derive(Debug, Clone)]
pub struct WriteTableOptions<TableCmp = LexicographicComparator, Policy = NoFilterPolicy> {
    pub comparator: TableCmp,
    pub filter_policy: Option<Policy>,
    pub compression: CompressionKind,
    pub block_size: usize,
    pub block_restart_interval: usize,
}

impl Default for WriteTableOptions<LexicographicComparator, NoFilterPolicy> {
    fn default() -> Self {
        Self {
            comparator: LexicographicComparator,
            filter_policy: None,
            compression: CompressionKind::default(),
            block_size: DEFAULT_BLOCK_SIZE,
            block_restart_interval: DEFAULT_BLOCK_RESTART_INTERVAL,
        }
    }
}

impl<TableCmp, Policy> WriteTableOptions<TableCmp, Policy> {
    #[must_use]
    pub fn new(comparator: TableCmp) -> Self {
        Self {
            comparator,
            filter_policy: None,
            compression: CompressionKind::default(),
            block_size: DEFAULT_BLOCK_SIZE,
            block_restart_interval: DEFAULT_BLOCK_RESTART_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_filter_policy(mut self, policy: Policy) -> Self {
        self.filter_policy = Some(policy);
        self
    }

    #[must_use]
    pub fn with_compression(mut self, compression: CompressionKind) -> Self {
        self.compression = compression;
        self
    }

    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    #[must_use]
    pub fn with_block_restart_interval(mut self, interval: usize) -> Self {
        self.block_restart_interval = interval;
        self
    }
}
