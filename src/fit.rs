//! First-fit search over the segregated free lists.
//!
//! Starts at the same bin [`crate::freelist::classify`] would file a block
//! of size `asize` into, then scans forward through every remaining bin.
//! This fall-through is required for correctness, not an optimization to
//! collapse into a single-bin lookup: an empty or too-small starting bin
//! must not end the search, since a larger bin may still hold a fit.

use crate::block;
use crate::config::NUM_BINS;
use crate::freelist::{classify, FreeLists};

/// Finds the first free block able to hold `asize` bytes, scanning
/// forward from `classify(asize, ..)` through `L15`.
///
/// # Safety
/// Every block reachable through `lists` must be a live free block.
pub unsafe fn find_fit(
  lists: &FreeLists,
  asize: usize,
  exact_small: usize,
  exact_med: usize,
) -> Option<*mut u8> {
  let start = classify(asize, exact_small, exact_med);
  for bin in start..NUM_BINS {
    for bp in unsafe { lists.iter(bin) } {
      let size = unsafe { block::get_size(block::hdrp(bp)) };
      if size >= asize {
        return Some(bp);
      }
    }
  }
  None
}
