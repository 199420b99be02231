use std::cmp::Ordering;

use super::TableComparator;
use crate::internal_utils::common_prefix_len;

/// Plain bytewise (lexicographic) ordering. The default comparator, and the only one the
/// metaindex block is ever built with, regardless of which comparator the table itself uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicographicComparator;

impl TableComparator for LexicographicComparator {
    fn id(&self) -> &'static [u8] {
        b"leveldb.BytewiseComparator"
    }

    fn cmp(&self, lhs: &[u8], rhs: &[u8]) -> Ordering {
        lhs.cmp(rhs)
    }

    fn find_short_separator(&self, separator: &mut Vec<u8>, limit: &[u8]) {
        let min_len = common_prefix_len(separator, limit);

        if min_len >= separator.len().min(limit.len()) {
            // One is a prefix of the other; no shortening is possible.
            return;
        }

        let Some(&diff_byte) = separator.get(min_len) else { return };
        let Some(&limit_byte) = limit.get(min_len) else { return };

        if diff_byte < 0xff && diff_byte + 1 < limit_byte {
            separator.truncate(min_len + 1);
            #[expect(clippy::indexing_slicing, reason = "just truncated to min_len + 1")]
            {
                separator[min_len] = diff_byte + 1;
            }
            debug_assert_eq!(self.cmp(separator, limit), Ordering::Less);
        }
    }

    fn find_short_successor(&self, key: &mut Vec<u8>) {
        for i in 0..key.len() {
            #[expect(clippy::indexing_slicing, reason = "i < key.len() by loop bound")]
            let byte = key[i];
            if byte != 0xff {
                key.truncate(i + 1);
                #[expect(clippy::indexing_slicing, reason = "just truncated to i + 1")]
                {
                    key[i] = byte + 1;
                }
                return;
            }
        }
        // Every byte is 0xff; no shorter successor exists, leave unchanged.
    }
}

/// The comparator always used to order the metaindex block's entries, independent of the
/// table's configured comparator.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaindexComparator;

impl TableComparator for MetaindexComparator {
    fn id(&self) -> &'static [u8] {
        b"leveldb.MetaindexComparator"
    }

    fn cmp(&self, lhs: &[u8], rhs: &[u8]) -> Ordering {
        LexicographicComparator.cmp(lhs, rhs)
    }

    fn find_short_separator(&self, separator: &mut Vec<u8>, limit: &[u8]) {
        LexicographicComparator.find_short_separator(separator, limit);
    }

    fn find_short_successor(&self, key: &mut Vec<u8>) {
        LexicographicComparator.find_short_successor(key);
    }
}
