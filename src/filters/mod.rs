//! Filter-policy contract plus the bundled Bloom and no-op implementations.

mod implementors;

pub use implementors::{BloomPolicy, NoFilterPolicy};

/// Accumulated key data stays strictly under 4 GiB per shard; enforced in `FilterBuilder::add_key`
/// since exceeding it would overflow the `u32`-width offsets used throughout the filter block.
pub const FILTER_KEY_LENGTH_LIMIT: u32 = u32::MAX;

/// At most 2^24 (~16.7 million) keys may accumulate in a single shard before `generate_filter`
/// is forced, for the same reason as [`FILTER_KEY_LENGTH_LIMIT`].
pub const FILTER_NUM_KEYS_LIMIT: u32 = 1 << 24;

/// A filter-generation strategy, such as a Bloom filter.
///
/// Implementors append an opaque filter payload to a caller-supplied buffer given the flattened
/// key data accumulated by [`FilterBuilder`](crate::filter_block::FilterBuilder).
pub trait TableFilterPolicy {
    /// Persisted as part of the metaindex key (`"filter." + name()`); changing it invalidates
    /// any table written under the old name for readers that check it.
    fn name(&self) -> &'static [u8];

    /// Append `key` to `buf`, in whatever representation `create_filter` expects to read back.
    /// For the bundled policies this is simply `buf.extend_from_slice(key)`, but the trait
    /// leaves room for policies that want to transform keys before filter construction.
    fn append_key_data(&self, key: &[u8], buf: &mut Vec<u8>) {
        buf.extend_from_slice(key);
    }

    /// Build a filter covering the keys described by `flattened_keys` sliced at consecutive
    /// `key_offsets` (each offset is a start position into `flattened_keys`; a key's end is the
    /// next offset, or `flattened_keys.len()` for the last key), appending the filter's opaque
    /// payload to `filter`.
    fn create_filter(&self, flattened_keys: &[u8], key_offsets: &[usize], filter: &mut Vec<u8>);

    /// Test whether `key` might be present in a filter previously built by `create_filter`.
    /// False positives are allowed; false negatives are not.
    fn key_may_match(&self, key: &[u8], filter: &[u8]) -> bool;
}
