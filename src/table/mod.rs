//! The table builder and the on-disk layouts it produces.

mod build;
mod format;
mod options;

pub use build::TableBuilder;
pub use format::{BlockHandle, TableFooter, BLOCK_TRAILER_LEN, FILTER_META_PREFIX};
pub use options::{CompressionKind, WriteTableOptions, DEFAULT_BLOCK_RESTART_INTERVAL, DEFAULT_BLOCK_SIZE};
