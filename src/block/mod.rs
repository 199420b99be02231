//! Prefix-compressed block construction.

mod builder;

pub use builder::BlockBuilder;
