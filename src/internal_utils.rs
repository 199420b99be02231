//! Small shared helpers used across the block/filter/table modules.

pub(crate) const U32_BYTES: usize = 4;

/// Length of the longest common prefix shared by `lhs` and `rhs`.
pub(crate) fn common_prefix_len(lhs: &[u8], rhs: &[u8]) -> usize {
    chunked_common_prefix_len::<128>(lhs, rhs)
}

fn chunked_common_prefix_len<const N: usize>(lhs: &[u8], rhs: &[u8]) -> usize {
    let min_len = lhs.len().min(rhs.len());
    let mut idx = 0;

    while idx + N <= min_len {
        let Some(lhs_chunk) = lhs.get(idx..idx + N) else { break };
        let Some(rhs_chunk) = rhs.get(idx..idx + N) else { break };
        if lhs_chunk == rhs_chunk {
            idx += N;
            continue;
        }
        break;
    }

    while idx < min_len && lhs.get(idx) == rhs.get(idx) {
        idx += 1;
    }

    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_common_prefix() {
        assert_eq!(common_prefix_len(b"abc", b"xyz"), 0);
    }

    #[test]
    fn full_common_prefix() {
        assert_eq!(common_prefix_len(b"abc", b"abc"), 3);
    }

    #[test]
    fn partial_prefix_across_chunk_boundary() {
        let lhs = vec![b'a'; 130];
        let mut rhs = vec![b'a'; 130];
        rhs[129] = b'b';
        assert_eq!(common_prefix_len(&lhs, &rhs), 129);
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(common_prefix_len(b"", b"anything"), 0);
        assert_eq!(common_prefix_len(b"", b""), 0);
    }
}
