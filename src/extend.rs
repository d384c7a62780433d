//! Heap extension: grow the process break and fold the new region into the
//! free-list index. The new region becomes one free block, which the
//! coalescer may then merge with the heap's previous trailing block.

use crate::align::round_up_8;
use crate::block;
use crate::coalesce::coalesce;
use crate::error::AllocError;
use crate::freelist::FreeLists;
use crate::heap::sbrk_extend;

/// Extends the heap by at least `words * 4` bytes (rounded up to a multiple
/// of 8 to keep double-word alignment), turns the new region into a free
/// block, coalesces it with the heap's previous final block if free, and
/// returns `(coalesced_block_bp, new_epilogue_bp)`.
///
/// `old_epilogue_bp` follows the same convention as every other block
/// pointer in this crate — `block::hdrp(old_epilogue_bp)` is the epilogue's
/// actual header word — even though the epilogue itself has no payload.
/// Its `prev_alloc` bit is carried into the new block's header, and a fresh
/// epilogue is written immediately after the grown region.
///
/// # Safety
/// `old_epilogue_bp` must satisfy `block::hdrp(old_epilogue_bp)` being the
/// current epilogue header (a 4-byte, zero-size, allocated sentinel at the
/// current heap top), and no other code may be extending the heap
/// concurrently.
pub unsafe fn extend_heap(
  lists: &mut FreeLists,
  old_epilogue_bp: *mut u8,
  words: usize,
  exact_small: usize,
  exact_med: usize,
) -> Result<(*mut u8, *mut u8), AllocError> {
  let bytes = round_up_8(words * 4).max(8);

  unsafe {
    let old_epilogue_header = block::hdrp(old_epilogue_bp);
    let prev_alloc = block::get_prev_alloc(old_epilogue_header);

    let raw = sbrk_extend(bytes)?;
    debug_assert_eq!(
      raw, old_epilogue_bp,
      "heap must grow contiguously from the old epilogue"
    );

    // The new free block's payload pointer is exactly where the old
    // epilogue's header used to sit plus one word; its header overwrites
    // that word.
    let bp = old_epilogue_header.add(4);
    block::write_free(bp, bytes, prev_alloc);

    let new_epilogue_bp = block::next_blkp(bp);
    block::put(block::hdrp(new_epilogue_bp), block::pack(0, false, true));

    let merged = coalesce(lists, bp, exact_small, exact_med);
    Ok((merged, new_epilogue_bp))
  }
}
