//! Eager coalescing: merge a freshly freed (or newly extended) block with
//! its immediate neighbours, keyed by their `prev_alloc`/`alloc` bits. Runs
//! on every free and every heap extension so no two free blocks ever sit
//! adjacent in address order.

use crate::block::{self, next_blkp, prev_blkp};
use crate::freelist::FreeLists;

/// Merges `bp` (a free block not yet in any list) with any free neighbours,
/// then inserts the resulting block into the free-list index. Returns the
/// payload pointer of the (possibly grown) coalesced block.
///
/// # Safety
/// `bp` must be a free block's payload pointer, already written with a
/// correct header/footer, not present in any free list, and its
/// `prev_alloc` bit must accurately reflect the preceding block.
pub unsafe fn coalesce(
  lists: &mut FreeLists,
  bp: *mut u8,
  exact_small: usize,
  exact_med: usize,
) -> *mut u8 {
  unsafe {
    let prev_alloc = block::get_prev_alloc(block::hdrp(bp));
    let next = next_blkp(bp);
    let next_alloc = block::get_alloc(block::hdrp(next));
    let size = block::get_size(block::hdrp(bp));

    match (prev_alloc, next_alloc) {
      (true, true) => {
        lists.insert(bp, size, exact_small, exact_med);
        bp
      }
      (true, false) => {
        let next_size = block::get_size(block::hdrp(next));
        lists.delete(next, next_size, exact_small, exact_med);
        let merged_size = size + next_size;
        block::write_free(bp, merged_size, true);
        lists.insert(bp, merged_size, exact_small, exact_med);
        bp
      }
      (false, true) => {
        let prev = prev_blkp(bp);
        let prev_size = block::get_size(block::hdrp(prev));
        lists.delete(prev, prev_size, exact_small, exact_med);
        let merged_size = prev_size + size;
        let prev_prev_alloc = block::get_prev_alloc(block::hdrp(prev));
        block::write_free(prev, merged_size, prev_prev_alloc);
        lists.insert(prev, merged_size, exact_small, exact_med);
        prev
      }
      (false, false) => {
        let prev = prev_blkp(bp);
        let prev_size = block::get_size(block::hdrp(prev));
        let next_size = block::get_size(block::hdrp(next));
        lists.delete(prev, prev_size, exact_small, exact_med);
        lists.delete(next, next_size, exact_small, exact_med);
        let merged_size = prev_size + size + next_size;
        let prev_prev_alloc = block::get_prev_alloc(block::hdrp(prev));
        block::write_free(prev, merged_size, prev_prev_alloc);
        lists.insert(prev, merged_size, exact_small, exact_med);
        prev
      }
    }
  }
}
