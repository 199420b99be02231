use super::TableFilterPolicy;

/// The hash function LevelDB-style Bloom filters use: a Murmur-ish 32-bit hash with a fixed
/// seed. The final two XOR-folds are not typos; they're load-bearing for the collision
/// statistics this filter design expects, carried over bit-for-bit (mixing order included) from
/// the format this crate's on-disk layout targets.
fn bloom_hash(data: &[u8]) -> u32 {
    const SEED: u32 = 0xbc9f_1d34;
    const MUL: u32 = 0xc6a4_a793;

    #[expect(clippy::as_conversions, reason = "key lengths fed into a Bloom filter never approach u32::MAX")]
    let len_u32 = data.len() as u32;
    let mut hash = SEED ^ len_u32.wrapping_mul(MUL);

    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        #[expect(clippy::unwrap_used, reason = "chunks_exact(4) guarantees exactly 4 bytes")]
        let word = u32::from_le_bytes(chunk.try_into().unwrap());
        hash = hash.wrapping_add(word).wrapping_mul(MUL);
        hash ^= hash >> 16;
    }

    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        for (idx, &byte) in remainder.iter().enumerate() {
            hash = hash.wrapping_add(u32::from(byte) << (8 * idx));
        }
        hash = hash.wrapping_mul(MUL);
        // Not a typo: 24, not 16 — the tail byte fold shifts by a different amount than the
        // per-word fold above.
        hash ^= hash >> 24;
    }

    hash
}

/// A Bloom filter policy with a configurable bits-per-key ratio.
///
/// `bits_per_key = 10` gives roughly a 1% false-positive rate, which is this policy's `Default`.
#[derive(Debug, Clone, Copy)]
pub struct BloomPolicy {
    bits_per_key: u8,
    num_hash_functions: u8,
}

impl Default for BloomPolicy {
    fn default() -> Self {
        Self::new(10)
    }
}

impl BloomPolicy {
    /// `bits_per_key` of roughly 10 gives a ~1% false-positive rate; each additional ~4.8 bits
    /// roughly halves it (optimal is `ln(2) * bits_per_key` hash functions, about 0.69 per bit).
    /// The number of hash functions is clamped to `[1, 30]`: one to always probe at least once,
    /// thirty because beyond it the false-positive rate is already below 1e-7% and more probes
    /// only cost CPU.
    #[must_use]
    pub fn new(bits_per_key: u8) -> Self {
        let ratio = f64::from(bits_per_key) * std::f64::consts::LN_2;
        #[expect(
            clippy::as_conversions,
            reason = "ratio is clamped into [1.0, 30.0] before the narrowing cast"
        )]
        let num_hash_functions = (ratio.round().clamp(1.0, 30.0)) as u8;
        Self { bits_per_key, num_hash_functions }
    }
}

impl TableFilterPolicy for BloomPolicy {
    fn name(&self) -> &'static [u8] {
        b"leveldb.BuiltinBloomFilter2"
    }

    fn create_filter(&self, flattened_keys: &[u8], key_offsets: &[usize], filter: &mut Vec<u8>) {
        let num_keys = key_offsets.len();
        if num_keys == 0 {
            return;
        }

        let bits = (num_keys * usize::from(self.bits_per_key)).max(64);
        let bytes = bits.div_ceil(8);
        let bits = bytes * 8;

        let base_len = filter.len();
        filter.resize(base_len + bytes, 0);
        filter.push(self.num_hash_functions);

        for i in 0..num_keys {
            #[expect(clippy::indexing_slicing, reason = "i < key_offsets.len() by loop bound")]
            let start = key_offsets[i];
            let end = key_offsets.get(i + 1).copied().unwrap_or(flattened_keys.len());
            let Some(key) = flattened_keys.get(start..end) else { continue };

            let mut h = bloom_hash(key);
            let delta = h.rotate_left(15);
            for _ in 0..self.num_hash_functions {
                #[expect(clippy::as_conversions, reason = "bits fits in u32 for any realistic filter size")]
                let bit_pos = (h as usize) % bits;
                #[expect(clippy::indexing_slicing, reason = "bit_pos / 8 < bytes by construction")]
                {
                    filter[base_len + bit_pos / 8] |= 1 << (bit_pos % 8);
                }
                h = h.wrapping_add(delta);
            }
        }
    }

    fn key_may_match(&self, key: &[u8], filter: &[u8]) -> bool {
        let len = filter.len();
        if len < 2 {
            return false;
        }

        #[expect(clippy::indexing_slicing, reason = "len >= 2 checked above")]
        let num_hash_functions = filter[len - 1];
        let data = &filter[..len - 1];
        let bits = data.len() * 8;

        if num_hash_functions > 30 {
            // Treat unrecognized encodings (future filter formats) as a match, consistent with
            // the "never a false negative" contract.
            return true;
        }

        let mut h = bloom_hash(key);
        let delta = h.rotate_left(15);
        for _ in 0..num_hash_functions {
            #[expect(clippy::as_conversions, reason = "bits fits in u32 for any realistic filter size")]
            let bit_pos = (h as usize) % bits;
            #[expect(clippy::indexing_slicing, reason = "bit_pos / 8 < data.len() by construction")]
            if data[bit_pos / 8] & (1 << (bit_pos % 8)) == 0 {
                return false;
            }
            h = h.wrapping_add(delta);
        }
        true
    }
}

/// The "no filter" policy, encoded at the type level as an uninhabited type so it carries no
/// runtime cost and callers can statically tell a builder has no filter policy configured.
#[derive(Debug, Clone, Copy)]
pub enum NoFilterPolicy {}

impl TableFilterPolicy for NoFilterPolicy {
    fn name(&self) -> &'static [u8] {
        match *self {}
    }

    fn create_filter(&self, _flattened_keys: &[u8], _key_offsets: &[usize], _filter: &mut Vec<u8>) {
        match *self {}
    }

    fn key_may_match(&self, _key: &[u8], _filter: &[u8]) -> bool {
        match *self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bloom_filter_has_no_false_negatives() {
        let policy = BloomPolicy::default();
        let keys: Vec<Vec<u8>> = (0..200).map(|i| format!("key{i:06}").into_bytes()).collect();

        let mut flattened = Vec::new();
        let mut offsets = Vec::new();
        for key in &keys {
            offsets.push(flattened.len());
            flattened.extend_from_slice(key);
        }

        let mut filter = Vec::new();
        policy.create_filter(&flattened, &offsets, &mut filter);

        for key in &keys {
            assert!(policy.key_may_match(key, &filter), "false negative for {key:?}");
        }
    }

    #[test]
    fn bloom_filter_mostly_rejects_absent_keys() {
        let policy = BloomPolicy::default();
        let keys: Vec<Vec<u8>> = (0..1000).map(|i| format!("present{i:06}").into_bytes()).collect();

        let mut flattened = Vec::new();
        let mut offsets = Vec::new();
        for key in &keys {
            offsets.push(flattened.len());
            flattened.extend_from_slice(key);
        }

        let mut filter = Vec::new();
        policy.create_filter(&flattened, &offsets, &mut filter);

        let false_positives = (0..1000)
            .map(|i| format!("absent{i:06}").into_bytes())
            .filter(|key| policy.key_may_match(key, &filter))
            .count();

        assert!(false_positives < 50, "false positive rate too high: {false_positives}/1000");
    }

    #[test]
    fn empty_filter_rejects_everything() {
        let policy = BloomPolicy::default();
        assert!(!policy.key_may_match(b"anything", &[]));
    }

    #[test]
    fn num_hash_functions_is_clamped() {
        let policy = BloomPolicy::new(255);
        assert!(policy.num_hash_functions <= 30);
        let policy = BloomPolicy::new(0);
        assert!(policy.num_hash_functions >= 1);
    }
}
