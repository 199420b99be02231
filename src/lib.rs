//! An immutable sorted-table (SSTable) writer for an LSM-tree key-value store.
//!
//! This crate builds the on-disk format LevelDB-family storage engines use for their sorted
//! runs: prefix-compressed data blocks with restart points for binary search, an optional
//! sharded filter block, a metaindex block, an index block, and a fixed 48-byte footer. Reading
//! tables back, the memtable, the write-ahead log, and compaction are all out of scope here;
//! this crate only writes.
//!
//! The entry point is [`table::TableBuilder`], configured via [`table::WriteTableOptions`].

pub mod arena;
pub mod block;
pub mod comparator;
pub mod compressors;
pub mod error;
pub mod filter_block;
pub mod filters;
mod internal_utils;
pub mod sink;
pub mod table;

pub use error::{Status, StatusCode, StatusResult};
