//! Filter block construction: a sequence of per-shard filters indexed by data-block byte offset.

use crate::filters::{TableFilterPolicy, FILTER_KEY_LENGTH_LIMIT, FILTER_NUM_KEYS_LIMIT};

/// Every 2 KiB (2^11 bytes) of data-block output gets its own filter shard, so a reader can
/// locate the right filter purely from a block's starting offset.
const FILTER_BASE_LG: u8 = 11;
const FILTER_BASE: usize = 1 << FILTER_BASE_LG;

/// Accumulates keys and periodically emits per-shard filters, eventually serialized as a single
/// filter block.
#[derive(Debug)]
pub struct FilterBuilder<Policy> {
    policy: Policy,
    keys: Vec<u8>,
    starts: Vec<usize>,
    result: Vec<u8>,
    filter_offsets: Vec<u32>,
}

impl<Policy: TableFilterPolicy> FilterBuilder<Policy> {
    #[must_use]
    pub fn new(policy: Policy) -> Self {
        Self { policy, keys: Vec::new(), starts: Vec::new(), result: Vec::new(), filter_offsets: Vec::new() }
    }

    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Advance shard bookkeeping to the shard containing `block_offset`, generating a filter
    /// (possibly an empty-shard marker) for every shard strictly between the previous position
    /// and this one. A single data block spanning multiple shards causes several consecutive
    /// empty markers here; that's intentional, since shards are indexed strictly by position.
    pub fn start_block(&mut self, block_offset: usize) {
        let filter_index = block_offset / FILTER_BASE;
        while filter_index > self.filter_offsets.len() {
            self.generate_filter();
        }
    }

    /// Record a key as belonging to the shard currently being accumulated. Must be called after
    /// the corresponding `start_block`.
    pub fn add_key(&mut self, key: &[u8]) {
        assert!(
            u32::try_from(self.keys.len() + key.len()).is_ok_and(|len| len < FILTER_KEY_LENGTH_LIMIT),
            "accumulated filter key data exceeded the 4 GiB shard limit",
        );
        assert!(
            u32::try_from(self.starts.len()).is_ok_and(|count| count < FILTER_NUM_KEYS_LIMIT),
            "accumulated filter key count exceeded the 2^24 shard limit",
        );

        self.starts.push(self.keys.len());
        self.policy.append_key_data(key, &mut self.keys);
    }

    /// Finish and return the serialized filter block: concatenated filter payloads, then the
    /// per-shard offset array, then the offset of that array, then the shard-width exponent.
    pub fn finish(&mut self) -> &[u8] {
        if !self.starts.is_empty() {
            self.generate_filter();
        }

        let array_offset = self.result.len();
        for &offset in &self.filter_offsets {
            self.result.extend_from_slice(&offset.to_le_bytes());
        }
        #[expect(clippy::as_conversions, reason = "array_offset is always well within u32 range")]
        self.result.extend_from_slice(&(array_offset as u32).to_le_bytes());
        self.result.push(FILTER_BASE_LG);

        &self.result
    }

    fn generate_filter(&mut self) {
        #[expect(clippy::as_conversions, reason = "result.len() is always well within u32 range")]
        let offset = self.result.len() as u32;
        self.filter_offsets.push(offset);

        if self.starts.is_empty() {
            // Empty shard: no filter payload, just the offset marker already pushed above.
            return;
        }

        self.policy.create_filter(&self.keys, &self.starts, &mut self.result);

        self.keys.clear();
        self.starts.clear();
    }
}
