//! The placer: splits a free block to satisfy a request, choosing to place
//! the allocated region at the low or high end of the block depending on
//! request size, with the split threshold kept as a named
//! [`crate::config::AllocatorConfig`] field rather than a bare literal.

use crate::block;
use crate::config::MIN_BLOCK_SIZE;
use crate::freelist::FreeLists;

/// Places a request of `asize` bytes into a free block `bp` of `csize >=
/// asize` bytes (already removed from its free list). Returns the payload
/// pointer of the resulting allocated block, which may differ from `bp`
/// when the large-request branch places the allocation at the block's high
/// end.
///
/// # Safety
/// `bp` must be a free block of size `csize`, already unlinked from every
/// free list, with `csize >= asize`.
pub unsafe fn place(
  lists: &mut FreeLists,
  bp: *mut u8,
  csize: usize,
  asize: usize,
  split_threshold: usize,
  exact_small: usize,
  exact_med: usize,
) -> *mut u8 {
  unsafe {
    let prev_alloc = block::get_prev_alloc(block::hdrp(bp));
    let remainder = csize - asize;

    if remainder < MIN_BLOCK_SIZE {
      block::write_alloc(bp, csize, prev_alloc);
      block::set_prev_alloc(block::next_blkp(bp), true);
      return bp;
    }

    if asize < split_threshold {
      // Small request: allocate the low end, free the remainder.
      block::write_alloc(bp, asize, prev_alloc);
      let free_part = block::next_blkp(bp);
      block::write_free(free_part, remainder, true);
      block::set_prev_alloc(block::next_blkp(free_part), false);
      lists.insert(free_part, remainder, exact_small, exact_med);
      bp
    } else {
      // Large request: shrink the free block, allocate the high end.
      block::write_free(bp, remainder, prev_alloc);
      lists.insert(bp, remainder, exact_small, exact_med);
      let alloc_part = block::next_blkp(bp);
      block::write_alloc(alloc_part, asize, false);
      block::set_prev_alloc(block::next_blkp(alloc_part), true);
      alloc_part
    }
  }
}
