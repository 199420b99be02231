//! Key-ordering contract used by the block builder and table builder.

mod implementors;

use std::cmp::Ordering;

pub use implementors::{LexicographicComparator, MetaindexComparator};

/// A total order over byte strings, plus the two key-shortening refinements that keep index
/// entries small.
pub trait TableComparator {
    /// A stable identifier for this comparator. Used by [`change_options`] to reject an
    /// incompatible swap, since arbitrary comparator types need not implement `PartialEq`.
    ///
    /// [`change_options`]: crate::table::TableBuilder::change_options
    fn id(&self) -> &'static [u8];

    /// Three-way comparison defining the key order the table is sorted by.
    fn cmp(&self, lhs: &[u8], rhs: &[u8]) -> Ordering;

    /// Overwrite `separator` with the shortest byte string `s` such that
    /// `separator <= s < limit` under this comparator's order, if a shorter string than
    /// `separator` itself satisfies that. Otherwise leave `separator` unchanged.
    fn find_short_separator(&self, separator: &mut Vec<u8>, limit: &[u8]);

    /// Overwrite `key` with the shortest byte string strictly greater than the original `key`,
    /// if one shorter than `key` itself exists. Otherwise leave `key` unchanged.
    fn find_short_successor(&self, key: &mut Vec<u8>);
}
