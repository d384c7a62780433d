//! Debug-only heap invariant checker.
//!
//! Not a correctness mechanism — a diagnostic instrument that walks the
//! heap and the free lists and reports the first invariant that disagrees.
//! `check` returns a typed [`InvariantViolation`] rather than aborting
//! directly, so tests can assert on *which* invariant failed;
//! [`Allocator::check_or_abort`](crate::allocator::Allocator::check_or_abort)
//! is the libc-`assert`-shaped entry point that prints and aborts.

use crate::block;
use crate::config::NUM_BINS;
use crate::error::InvariantViolation;
use crate::freelist::{bin_table, BinRule, FreeLists};

/// Everything the checker needs to know about the heap shape, independent
/// of the rest of [`crate::allocator::Allocator`]'s bookkeeping.
pub struct HeapView<'a> {
  pub first_block: *mut u8,
  pub epilogue: *mut u8,
  pub prologue_bp: *mut u8,
  pub lists: &'a FreeLists,
  pub exact_small: usize,
  pub exact_med: usize,
}

/// Walks the block sequence from the prologue to the epilogue, then each
/// free list, verifying that headers and footers agree, no two free blocks
/// sit adjacent, every block is listed in the bin its size calls for, and
/// the two walks agree on the free-block count. Returns the first
/// violation found, if any.
pub fn check(view: &HeapView<'_>) -> Result<(), InvariantViolation> {
  unsafe { check_sentinels(view)? };
  let heap_walk_count = unsafe { check_block_sequence(view)? };
  let list_walk_count = unsafe { check_lists(view)? };

  if heap_walk_count != list_walk_count {
    return Err(InvariantViolation::FreeCountMismatch {
      heap_walk: heap_walk_count,
      list_walk: list_walk_count,
    });
  }

  Ok(())
}

unsafe fn check_sentinels(view: &HeapView<'_>) -> Result<(), InvariantViolation> {
  unsafe {
    let prologue_header = block::hdrp(view.prologue_bp);
    if block::get_size(prologue_header) != 8 || !block::get_alloc(prologue_header) {
      return Err(InvariantViolation::PrologueCorrupt);
    }
    let prologue_footer = block::ftrp(view.prologue_bp);
    if block::get(prologue_header) != block::get(prologue_footer) {
      return Err(InvariantViolation::PrologueCorrupt);
    }
    let epilogue_header = block::hdrp(view.epilogue);
    if block::get_size(epilogue_header) != 0 || !block::get_alloc(epilogue_header) {
      return Err(InvariantViolation::EpilogueCorrupt);
    }
  }
  Ok(())
}

/// Walks blocks in address order. Returns the number of free blocks found.
unsafe fn check_block_sequence(view: &HeapView<'_>) -> Result<usize, InvariantViolation> {
  let mut bp = view.first_block;
  let mut free_count = 0usize;
  let mut prev_was_free = false;

  unsafe {
    while block::get_size(block::hdrp(bp)) > 0 {
      let header = block::hdrp(bp);
      let size = block::get_size(header);
      let alloc = block::get_alloc(header);

      if size % 8 != 0 {
        return Err(InvariantViolation::Misaligned { addr: bp as usize, size });
      }

      if !alloc {
        let footer = block::ftrp(bp);
        if block::get(header) != block::get(footer) {
          return Err(InvariantViolation::HeaderFooterMismatch {
            addr: bp as usize,
            header: block::get(header),
            footer: block::get(footer),
          });
        }
        if prev_was_free {
          return Err(InvariantViolation::AdjacentFreeBlocks {
            first: block::prev_blkp(bp) as usize,
            second: bp as usize,
          });
        }
        free_count += 1;
      }

      let next = block::next_blkp(bp);
      let next_prev_alloc = block::get_prev_alloc(block::hdrp(next));
      if next_prev_alloc != alloc {
        return Err(InvariantViolation::PrevAllocMismatch {
          addr: bp as usize,
          next_prev_alloc,
          this_alloc: alloc,
        });
      }

      prev_was_free = !alloc;
      bp = next;
    }
  }

  Ok(free_count)
}

/// Walks every free list. Returns the total number of listed blocks.
unsafe fn check_lists(view: &HeapView<'_>) -> Result<usize, InvariantViolation> {
  let table = bin_table(view.exact_small, view.exact_med);
  let heap_lo = view.prologue_bp as usize;
  let heap_hi = view.epilogue as usize;
  let mut total = 0usize;

  for (bin, rule) in table.iter().enumerate().take(NUM_BINS) {
    for bp in unsafe { view.lists.iter(bin) } {
      let addr = bp as usize;
      if addr < heap_lo || addr >= heap_hi {
        return Err(InvariantViolation::OutOfBounds { addr, lo: heap_lo, hi: heap_hi });
      }
      let header = unsafe { block::hdrp(bp) };
      if unsafe { block::get_alloc(header) } {
        return Err(InvariantViolation::ListedBlockNotFree { addr });
      }
      let size = unsafe { block::get_size(header) };
      let in_bin = match rule {
        BinRule::UpperBound(bound) => size <= *bound,
        BinRule::Exact(value) => size == *value,
        BinRule::Unbounded => true,
      };
      if !in_bin {
        return Err(InvariantViolation::WrongBin { addr, bin, size });
      }
      total += 1;
    }
  }

  Ok(total)
}
