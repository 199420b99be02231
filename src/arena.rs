//! Bump-pointer allocator backing peer components' key/value buffers.
//!
//! Individual allocations are never freed; the whole arena is released at once when dropped.
//! Unlike the pointer-based arena this design is descended from, allocations are handed out as
//! exclusive slices so the borrow checker (rather than caller discipline) upholds "valid until
//! the arena is destroyed".

use std::mem::align_of;
use std::sync::atomic::{AtomicUsize, Ordering};

const BLOCK_SIZE: usize = 4096;

/// A bump-pointer allocator.
///
/// `memory_usage()` may be polled from another thread via a relaxed atomic load while this
/// thread continues to allocate; every other operation requires exclusive access.
#[derive(Debug)]
pub struct Arena {
    blocks: Vec<Vec<u8>>,
    /// Index into `blocks` that small allocations are bumped from. `None` until the first
    /// non-dedicated block is allocated. A dedicated block for an oversized allocation is
    /// pushed onto `blocks` without updating this, so the previous current block's remaining
    /// space stays available afterward.
    current_block: Option<usize>,
    current_len: usize,
    memory_usage: AtomicUsize,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    #[must_use]
    pub fn new() -> Self {
        Self { blocks: Vec::new(), current_block: None, current_len: 0, memory_usage: AtomicUsize::new(0) }
    }

    /// Allocate `n` bytes, returning a zero-initialized slice valid for the arena's lifetime.
    pub fn allocate(&mut self, n: usize) -> &mut [u8] {
        if n == 0 {
            return &mut [];
        }

        if self.fits_current(n, 0) {
            return self.bump_current(n);
        }

        if n > BLOCK_SIZE / 4 {
            // Large allocations get their own dedicated block, allocated separately so they
            // don't eat into (and waste the remainder of) the current block. The current block
            // stays current; a later small allocation still draws from its leftover space.
            return self.allocate_dedicated_block(n);
        }

        self.allocate_new_current_block();
        self.bump_current(n)
    }

    /// Allocate `n` bytes aligned to `max(align_of::<usize>(), 8)` bytes.
    pub fn allocate_aligned(&mut self, n: usize) -> &mut [u8] {
        // Relies on each block's own heap allocation starting at an address aligned to at
        // least `align` bytes, which every mainstream global allocator provides for a `Vec<u8>`
        // of this size even though it isn't formally guaranteed by `Vec`'s documentation.
        let align = align_of::<usize>().max(8);
        assert!(align.is_power_of_two(), "alignment must be a power of two");

        if n == 0 {
            return &mut [];
        }

        let current_mod = self.current_len & (align - 1);
        let slop = if current_mod == 0 { 0 } else { align - current_mod };

        if self.fits_current(n, slop) {
            self.current_len += slop;
            return self.bump_current(n);
        }

        // The fallback path (a fresh default block or a dedicated block) always starts at
        // offset 0 of its own heap allocation, which is aligned without any slop, so an
        // unaligned allocation of the same size is equivalent.
        self.allocate(n)
    }

    fn fits_current(&self, n: usize, slop: usize) -> bool {
        match self.current_block {
            #[expect(clippy::indexing_slicing, reason = "current_block always indexes a live block")]
            Some(idx) => self.current_len + slop + n <= self.blocks[idx].len(),
            None => false,
        }
    }

    fn bump_current(&mut self, n: usize) -> &mut [u8] {
        let idx = self.current_block.expect("bump_current requires a current block to already exist");
        #[expect(clippy::indexing_slicing, reason = "current_block always indexes a live block")]
        let block = &mut self.blocks[idx];
        let start = self.current_len;
        self.current_len += n;
        &mut block[start..start + n]
    }

    fn allocate_new_current_block(&mut self) {
        self.blocks.push(vec![0u8; BLOCK_SIZE]);
        self.current_block = Some(self.blocks.len() - 1);
        self.current_len = 0;
        self.memory_usage.fetch_add(BLOCK_SIZE, Ordering::Relaxed);
    }

    fn allocate_dedicated_block(&mut self, n: usize) -> &mut [u8] {
        self.blocks.push(vec![0u8; n]);
        self.memory_usage.fetch_add(n, Ordering::Relaxed);
        #[expect(clippy::indexing_slicing, reason = "the block was just pushed")]
        let block = &mut self.blocks[self.blocks.len() - 1];
        block
    }

    /// Total bytes allocated across all blocks. Safe to read concurrently with allocation.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.memory_usage.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_allocations_share_a_block() {
        let mut arena = Arena::new();
        arena.allocate(16);
        arena.allocate(16);
        assert_eq!(arena.memory_usage(), BLOCK_SIZE);
    }

    #[test]
    fn large_allocation_gets_dedicated_block() {
        let mut arena = Arena::new();
        let big = BLOCK_SIZE;
        arena.allocate(big);
        assert_eq!(arena.memory_usage(), big);
    }

    #[test]
    fn dedicated_block_preserves_current_blocks_remainder() {
        let mut arena = Arena::new();
        arena.allocate(100); // starts a 4096-byte current block, 3996 bytes left in it.
        let dedicated_len = BLOCK_SIZE; // forces the dedicated-block path (> BLOCK_SIZE / 4).
        arena.allocate(dedicated_len);
        assert_eq!(arena.memory_usage(), BLOCK_SIZE + dedicated_len);

        // The small allocation below must still come out of the original current block's
        // remainder rather than forcing a third block.
        arena.allocate(50);
        assert_eq!(arena.memory_usage(), BLOCK_SIZE + dedicated_len);
    }

    #[test]
    fn allocate_aligned_is_aligned() {
        let mut arena = Arena::new();
        arena.allocate(3);
        let slice = arena.allocate_aligned(8);
        let addr = slice.as_ptr() as usize;
        assert_eq!(addr % 8, 0);
    }

    #[test]
    fn zero_length_allocation_is_empty() {
        let mut arena = Arena::new();
        assert!(arena.allocate(0).is_empty());
    }

    #[test]
    fn memory_usage_grows_monotonically() {
        let mut arena = Arena::new();
        let mut prev = arena.memory_usage();
        for _ in 0..10 {
            arena.allocate(BLOCK_SIZE);
            let next = arena.memory_usage();
            assert!(next >= prev);
            prev = next;
        }
    }
}
