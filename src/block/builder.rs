use std::marker::PhantomData;

use integer_encoding::VarIntWriter;

use crate::comparator::TableComparator;
use crate::internal_utils::{common_prefix_len, U32_BYTES};

/// Accumulates sorted key/value pairs into a single prefix-compressed block.
///
/// Entries must be added in strictly increasing order under `Cmp`. Every
/// `block_restart_interval`-th entry is a *restart point*: its key is stored in full rather than
/// as a shared-prefix delta, so a reader can binary-search restart points without decoding every
/// entry in between.
#[derive(Debug)]
pub struct BlockBuilder<Cmp> {
    inner: BlockBuilderImpl,
    _comparator: PhantomData<Cmp>,
}

impl<Cmp> Default for BlockBuilder<Cmp> {
    fn default() -> Self {
        Self::new(16)
    }
}

impl<Cmp> BlockBuilder<Cmp> {
    #[must_use]
    pub fn new(restart_interval: usize) -> Self {
        Self { inner: BlockBuilderImpl::new(restart_interval), _comparator: PhantomData }
    }

    #[must_use]
    pub fn empty(&self) -> bool {
        self.inner.empty()
    }

    #[must_use]
    pub fn current_size_estimate(&self) -> usize {
        self.inner.current_size_estimate()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Consume the accumulated entries and return the finished block contents: payload bytes
    /// followed by the restart-point array and its length.
    pub fn finish(&mut self) -> &[u8] {
        self.inner.finish()
    }
}

impl<Cmp: TableComparator> BlockBuilder<Cmp> {
    /// Append a new entry. `key` must compare strictly greater than the previously added key
    /// (if any) under `comparator`.
    pub fn add_entry(&mut self, comparator: &Cmp, key: &[u8], value: &[u8]) {
        assert!(!self.inner.finished, "add_entry called after finish");
        assert!(
            self.inner.restart_counter <= self.inner.restart_interval,
            "restart counter overran restart interval",
        );
        assert!(
            self.inner.buffer.is_empty()
                || comparator.cmp(key, &self.inner.last_key) == std::cmp::Ordering::Greater,
            "keys must be added in strictly increasing order",
        );

        self.inner.add_entry(key, value);
    }
}

#[derive(Debug)]
struct BlockBuilderImpl {
    buffer: Vec<u8>,
    last_key: Vec<u8>,
    num_entries: usize,
    restarts: Vec<u32>,
    restart_counter: usize,
    restart_interval: usize,
    finished: bool,
}

impl BlockBuilderImpl {
    fn new(restart_interval: usize) -> Self {
        assert!(restart_interval >= 1, "restart_interval must be at least 1");
        Self {
            buffer: Vec::new(),
            last_key: Vec::new(),
            num_entries: 0,
            restarts: vec![0],
            restart_counter: 0,
            restart_interval,
            finished: false,
        }
    }

    fn empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn current_size_estimate(&self) -> usize {
        self.buffer.len() + U32_BYTES * (self.restarts.len() + 1)
    }

    fn add_entry(&mut self, key: &[u8], value: &[u8]) {
        let shared = if self.restart_counter >= self.restart_interval {
            self.restarts.push(u32::try_from(self.buffer.len()).unwrap_or(u32::MAX));
            self.restart_counter = 0;
            0
        } else {
            common_prefix_len(&self.last_key, key)
        };

        let non_shared = key.len() - shared;

        #[expect(clippy::unwrap_used, reason = "Vec<u8> writer never fails")]
        {
            self.buffer.write_varint(shared).unwrap();
            self.buffer.write_varint(non_shared).unwrap();
            self.buffer.write_varint(value.len()).unwrap();
        }
        #[expect(clippy::indexing_slicing, reason = "shared <= key.len() by construction")]
        self.buffer.extend_from_slice(&key[shared..]);
        self.buffer.extend_from_slice(value);

        self.last_key.truncate(shared);
        #[expect(clippy::indexing_slicing, reason = "shared <= key.len() by construction")]
        self.last_key.extend_from_slice(&key[shared..]);

        self.num_entries += 1;
        self.restart_counter += 1;
    }

    fn finish(&mut self) -> &[u8] {
        for &restart in &self.restarts {
            self.buffer.extend_from_slice(&restart.to_le_bytes());
        }
        #[expect(clippy::as_conversions, reason = "restarts.len() fits comfortably in u32")]
        self.buffer.extend_from_slice(&(self.restarts.len() as u32).to_le_bytes());
        self.finished = true;
        &self.buffer
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.restarts.clear();
        self.restarts.push(0);
        self.restart_counter = 0;
        self.last_key.clear();
        self.num_entries = 0;
        self.finished = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::LexicographicComparator;

    fn decode_varint32(buf: &[u8], pos: &mut usize) -> usize {
        let mut result: usize = 0;
        let mut shift = 0;
        loop {
            let byte = buf[*pos];
            *pos += 1;
            result |= usize::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
        }
        result
    }

    fn decode_entries(block: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        let num_restarts = u32::from_le_bytes(block[block.len() - 4..].try_into().unwrap()) as usize;
        let restart_array_start = block.len() - 4 - 4 * num_restarts;

        let mut entries = Vec::new();
        let mut pos = 0;
        let mut last_key: Vec<u8> = Vec::new();
        while pos < restart_array_start {
            let shared = decode_varint32(block, &mut pos);
            let non_shared = decode_varint32(block, &mut pos);
            let value_len = decode_varint32(block, &mut pos);

            let mut key = last_key[..shared].to_vec();
            key.extend_from_slice(&block[pos..pos + non_shared]);
            pos += non_shared;
            let value = block[pos..pos + value_len].to_vec();
            pos += value_len;

            last_key = key.clone();
            entries.push((key, value));
        }
        entries
    }

    #[test]
    fn empty_block_has_single_restart_and_zero_entries() {
        let mut builder: BlockBuilder<LexicographicComparator> = BlockBuilder::new(16);
        assert!(builder.empty());
        let finished = builder.finish();
        // No entries, restart array `[0]`, then `num_restarts = 1`.
        assert_eq!(finished, &[0, 0, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn restarts_occur_at_expected_interval() {
        let cmp = LexicographicComparator;
        let mut builder: BlockBuilder<LexicographicComparator> = BlockBuilder::new(2);
        builder.add_entry(&cmp, b"a", b"1");
        builder.add_entry(&cmp, b"ab", b"2");
        builder.add_entry(&cmp, b"ac", b"3");
        let finished = builder.finish().to_vec();
        let entries = decode_entries(&finished);
        assert_eq!(
            entries,
            vec![
                (b"a".to_vec(), b"1".to_vec()),
                (b"ab".to_vec(), b"2".to_vec()),
                (b"ac".to_vec(), b"3".to_vec()),
            ]
        );
    }

    #[test]
    fn prefix_compression_round_trips_many_keys() {
        let cmp = LexicographicComparator;
        let mut builder: BlockBuilder<LexicographicComparator> = BlockBuilder::new(16);
        let expected: Vec<(Vec<u8>, Vec<u8>)> = (0..500)
            .map(|i| (format!("key{i:06}").into_bytes(), format!("value{i}").into_bytes()))
            .collect();
        for (key, value) in &expected {
            builder.add_entry(&cmp, key, value);
        }
        let finished = builder.finish().to_vec();
        assert_eq!(decode_entries(&finished), expected);
    }

    #[test]
    #[should_panic(expected = "strictly increasing order")]
    fn out_of_order_keys_panic() {
        let cmp = LexicographicComparator;
        let mut builder: BlockBuilder<LexicographicComparator> = BlockBuilder::new(16);
        builder.add_entry(&cmp, b"b", b"1");
        builder.add_entry(&cmp, b"a", b"2");
    }

    #[test]
    fn reset_clears_all_state() {
        let cmp = LexicographicComparator;
        let mut builder: BlockBuilder<LexicographicComparator> = BlockBuilder::new(16);
        builder.add_entry(&cmp, b"a", b"1");
        builder.reset();
        assert!(builder.empty());
        builder.add_entry(&cmp, b"a", b"1");
        builder.add_entry(&cmp, b"b", b"2");
    }

    #[test]
    fn current_size_estimate_matches_finished_length() {
        let cmp = LexicographicComparator;
        let mut builder: BlockBuilder<LexicographicComparator> = BlockBuilder::new(16);
        builder.add_entry(&cmp, b"a", b"1");
        builder.add_entry(&cmp, b"b", b"2");
        let estimate = builder.current_size_estimate();
        let finished_len = builder.finish().len();
        assert_eq!(estimate, finished_len);
    }
}
