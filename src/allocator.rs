//! The public API: an [`Allocator`] owning one heap, composing the block
//! layout, free-list index, coalescer, placer, fit finder, and extender
//! into the four entry points (`alloc`, `free`, `realloc`, `zalloc`).
//!
//! [`Allocator`] itself takes `&mut self` and does no locking of its own,
//! so the core state machine stays testable without any locking concerns.
//! A mutex is added only at the free-function layer, around a single
//! process-wide instance, because exposing the allocator to multiple
//! threads must serialize the entire public API — no finer-grained locking
//! is designed in here.

use std::ptr;
use std::sync::Mutex;

use log::{debug, trace, warn};

use crate::block;
use crate::checker::{self, HeapView};
use crate::coalesce::coalesce;
use crate::config::{AllocatorConfig, DSIZE, MIN_BLOCK_SIZE, WSIZE};
use crate::error::{AllocError, InvariantViolation};
use crate::extend::extend_heap;
use crate::fit::find_fit;
use crate::freelist::FreeLists;
use crate::heap::sbrk_extend;
use crate::placer::place;

/// Owns one heap and its free-list index. Not `Sync`; wrap in a `Mutex` (as
/// [`GLOBAL`] does) to share across threads.
pub struct Allocator {
  lists: FreeLists,
  config: AllocatorConfig,
  /// Prologue's payload-convention pointer (`block::hdrp` of this is the
  /// real prologue header).
  prologue_bp: *mut u8,
  /// Epilogue's payload-convention pointer, updated on every extension.
  epilogue_bp: *mut u8,
  initialized: bool,
}

// The allocator's state is plain heap-resident pointers with no interior
// mutability surprises; access is serialized by the caller (a `Mutex` at
// the public free-function layer, or exclusive ownership in tests).
unsafe impl Send for Allocator {}

impl Allocator {
  /// `const`-constructible empty allocator, for use in `static` storage
  /// before [`init`](Self::init) is called.
  pub const fn empty() -> Self {
    Self {
      lists: FreeLists::new(),
      config: AllocatorConfig::const_default(),
      prologue_bp: ptr::null_mut(),
      epilogue_bp: ptr::null_mut(),
      initialized: false,
    }
  }

  /// Builds an allocator with the given tuning knobs, uninitialized until
  /// [`init`](Self::init) is called.
  pub const fn with_config(config: AllocatorConfig) -> Self {
    Self { config, ..Self::empty() }
  }

  /// Acquires the initial 16 bytes for the heap skeleton (padding word,
  /// prologue header/footer, epilogue header) and installs the first free
  /// block via one call to the extender.
  pub fn init(&mut self) -> Result<(), AllocError> {
    // SAFETY: this is the first heap-mutating call for this instance; no
    // blocks exist yet to corrupt.
    let base = unsafe { sbrk_extend(4 * WSIZE)? };

    unsafe {
      block::put(base, 0); // alignment padding
      block::put(base.add(4), block::pack(DSIZE, true, true)); // prologue header
      block::put(base.add(8), block::pack(DSIZE, true, true)); // prologue footer
      block::put(base.add(12), block::pack(0, true, true)); // epilogue header
    }

    self.prologue_bp = unsafe { base.add(8) };
    let initial_epilogue_bp = unsafe { base.add(16) };

    let words = self.config.chunk_size / WSIZE;
    let (_, new_epilogue_bp) = unsafe {
      extend_heap(
        &mut self.lists,
        initial_epilogue_bp,
        words,
        self.config.exact_bin_small,
        self.config.exact_bin_med,
      )?
    };
    self.epilogue_bp = new_epilogue_bp;
    self.initialized = true;

    debug!("segalloc: init complete, heap = [{:#x}, {:#x})", self.prologue_bp as usize, self.epilogue_bp as usize);
    Ok(())
  }

  /// The adjusted block size for a `n`-byte request: header plus payload,
  /// rounded up to 8, floored at [`MIN_BLOCK_SIZE`].
  fn adjusted_size(n: usize) -> usize {
    crate::align::round_up_8(n + WSIZE).max(MIN_BLOCK_SIZE)
  }

  /// Allocates at least `n` bytes and returns an 8-aligned pointer, or null
  /// if `n == 0` or the heap cannot grow enough to satisfy the request
  /// (when `n == 0`, or when growing the heap fails).
  pub fn alloc(&mut self, n: usize) -> *mut u8 {
    if n == 0 || !self.initialized {
      return ptr::null_mut();
    }

    let asize = Self::adjusted_size(n);

    let bp = match unsafe {
      find_fit(&self.lists, asize, self.config.exact_bin_small, self.config.exact_bin_med)
    } {
      Some(bp) => {
        unsafe { self.lists.delete(bp, block::get_size(block::hdrp(bp)), self.config.exact_bin_small, self.config.exact_bin_med) };
        bp
      }
      None => {
        let grow_bytes = asize.max(self.config.chunk_size);
        let words = grow_bytes / WSIZE;
        match unsafe {
          extend_heap(&mut self.lists, self.epilogue_bp, words, self.config.exact_bin_small, self.config.exact_bin_med)
        } {
          Ok((bp, new_epilogue)) => {
            self.epilogue_bp = new_epilogue;
            unsafe { self.lists.delete(bp, block::get_size(block::hdrp(bp)), self.config.exact_bin_small, self.config.exact_bin_med) };
            bp
          }
          Err(err) => {
            warn!("segalloc: alloc({n}) failed to extend heap: {err}");
            return ptr::null_mut();
          }
        }
      }
    };

    let csize = unsafe { block::get_size(block::hdrp(bp)) };
    let result = unsafe {
      place(
        &mut self.lists,
        bp,
        csize,
        asize,
        self.config.split_threshold,
        self.config.exact_bin_small,
        self.config.exact_bin_med,
      )
    };
    trace!("segalloc: alloc({n}) -> {:#x} (asize={asize})", result as usize);
    result
  }

  /// Frees a block previously returned by `alloc`/`zalloc`/`realloc`. A
  /// null pointer is a no-op.
  pub fn free(&mut self, p: *mut u8) {
    if p.is_null() || !self.initialized {
      return;
    }

    unsafe {
      let prev_alloc = block::get_prev_alloc(block::hdrp(p));
      let size = block::get_size(block::hdrp(p));
      block::write_free(p, size, prev_alloc);
      block::set_prev_alloc(block::next_blkp(p), false);
      coalesce(&mut self.lists, p, self.config.exact_bin_small, self.config.exact_bin_med);
    }
    trace!("segalloc: free({:#x})", p as usize);
  }

  /// Reallocates `p` to hold `n` bytes, preserving the overlapping prefix
  /// of the payload.
  pub fn realloc(&mut self, p: *mut u8, n: usize) -> *mut u8 {
    if n == 0 {
      self.free(p);
      return ptr::null_mut();
    }
    if p.is_null() {
      return self.alloc(n);
    }

    let old_size = unsafe { block::get_size(block::hdrp(p)) };
    let old_payload_bytes = old_size - WSIZE;

    let new_ptr = self.alloc(n);
    if new_ptr.is_null() {
      return ptr::null_mut();
    }

    let copy_len = n.min(old_payload_bytes);
    unsafe {
      ptr::copy_nonoverlapping(p, new_ptr, copy_len);
    }
    self.free(p);
    new_ptr
  }

  /// Allocates `nmemb * size` zeroed bytes. Rejects the request (returns
  /// null) if the product overflows, and never zeroes memory `alloc`
  /// refused to hand back.
  pub fn zalloc(&mut self, nmemb: usize, size: usize) -> *mut u8 {
    let total = match nmemb.checked_mul(size) {
      Some(total) => total,
      None => {
        warn!("segalloc: zalloc({nmemb}, {size}) overflows, rejecting");
        return ptr::null_mut();
      }
    };

    let p = self.alloc(total);
    if p.is_null() {
      return p;
    }

    unsafe { ptr::write_bytes(p, 0, total) };
    p
  }

  /// Byte-range bounds of the current heap: `(heap_lo, heap_hi)`, the
  /// prologue payload convention pointer and the epilogue payload
  /// convention pointer.
  pub fn heap_bounds(&self) -> (usize, usize) {
    (self.prologue_bp as usize, self.epilogue_bp as usize)
  }

  /// Runs the debug invariant checker and returns the
  /// first violation found, if any, without aborting.
  pub fn check(&self) -> Result<(), InvariantViolation> {
    if !self.initialized {
      return Ok(());
    }
    let first_block = unsafe { block::next_blkp(self.prologue_bp) };
    let view = HeapView {
      first_block,
      epilogue: self.epilogue_bp,
      prologue_bp: self.prologue_bp,
      lists: &self.lists,
      exact_small: self.config.exact_bin_small,
      exact_med: self.config.exact_bin_med,
    };
    checker::check(&view)
  }

  /// Prints a diagnostic and aborts the
  /// process on the first violated invariant. Intended for debug builds
  /// only — this is an instrument, not part of the correctness mechanism.
  pub fn check_or_abort(&self, lineno: i32) {
    if let Err(violation) = self.check() {
      log::error!("segalloc: invariant check failed at line {lineno}: {violation}");
      panic!("segalloc: heap invariant violated at line {lineno}: {violation}");
    }
  }
}

/// Process-wide allocator instance, behind a mutex: exposing this to
/// multiple threads serializes the entire public API, with no
/// finer-grained locking.
static GLOBAL: Mutex<Allocator> = Mutex::new(Allocator::empty());

/// Initializes the global allocator. Must be called once before the other
/// free functions are used.
pub fn init() -> Result<(), AllocError> {
  GLOBAL.lock().unwrap().init()
}

pub fn alloc(n: usize) -> *mut u8 {
  GLOBAL.lock().unwrap().alloc(n)
}

pub fn free(p: *mut u8) {
  GLOBAL.lock().unwrap().free(p)
}

pub fn realloc(p: *mut u8, n: usize) -> *mut u8 {
  GLOBAL.lock().unwrap().realloc(p, n)
}

pub fn zalloc(nmemb: usize, size: usize) -> *mut u8 {
  GLOBAL.lock().unwrap().zalloc(nmemb, size)
}

/// Debug invariant check against the global allocator.
pub fn check(lineno: i32) {
  GLOBAL.lock().unwrap().check_or_abort(lineno)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fresh() -> Allocator {
    let mut a = Allocator::empty();
    a.init().expect("init should succeed against the real process heap");
    a
  }

  fn is_aligned(p: *mut u8, align: usize) -> bool {
    (p as usize) % align == 0
  }

  #[test]
  fn minimum_allocation_is_16_bytes_and_aligned() {
    let mut a = fresh();
    let p = a.alloc(1);
    assert!(!p.is_null());
    assert!(is_aligned(p, 8));
    assert_eq!(unsafe { block::get_size(block::hdrp(p)) }, 16);
    assert!(a.check().is_ok());
  }

  #[test]
  fn free_then_realloc_does_not_crash_and_stays_consistent() {
    let mut a = fresh();
    let p = a.alloc(32);
    assert!(!p.is_null());
    a.free(p);
    assert!(a.check().is_ok());

    let q = a.alloc(16);
    assert!(!q.is_null());
    assert!(a.check().is_ok());
  }

  #[test]
  fn split_policy_small_request_allocates_low_and_remainder_is_contiguous() {
    let mut a = fresh();
    // asize = round_up_8(32+4).max(16) = 40, well under split_threshold
    // (120), so each request splits the sole free block "low": it
    // allocates the head and re-inserts the (still free) tail.
    let first = a.alloc(32);
    assert!(!first.is_null());
    let first_size = unsafe { block::get_size(block::hdrp(first)) };

    let second = a.alloc(32);
    assert!(!second.is_null());
    // The second low-placed allocation must come from exactly where the
    // first one's remainder began.
    assert_eq!(second as usize, first as usize + first_size);
    assert!(a.check().is_ok());
  }

  #[test]
  fn split_policy_large_request_allocates_high_against_the_epilogue() {
    let mut a = fresh();
    // asize = round_up_8(3000+4).max(16) = 3008, at/above split_threshold
    // (120), so it splits the sole free block "high": the allocated block
    // ends up at the block's tail, directly abutting the epilogue.
    let big = a.alloc(3000);
    assert!(!big.is_null());

    let (_, epilogue) = a.heap_bounds();
    assert_eq!(unsafe { block::next_blkp(big) } as usize, epilogue);
    assert!(a.check().is_ok());
  }

  #[test]
  fn coalesce_keeps_the_heap_consistent_after_mixed_frees() {
    let mut a = fresh();
    let x = a.alloc(64);
    let y = a.alloc(64);
    let z = a.alloc(64);
    assert!(!x.is_null() && !y.is_null() && !z.is_null());

    // Free out of address order so every coalescer case (A/A, A/F, F/A,
    // F/F) gets exercised across these three frees.
    a.free(x);
    a.free(z);
    a.free(y);
    assert!(a.check().is_ok());

    // The freed space (plus whatever else is still free) must be enough
    // to satisfy a request for their combined size without growing the
    // heap.
    let reclaimed = a.alloc(64 + 64 + 64);
    assert!(!reclaimed.is_null());
    assert!(a.check().is_ok());
  }

  #[test]
  fn zalloc_zeroes_memory() {
    let mut a = fresh();
    let p = a.zalloc(8, 8);
    assert!(!p.is_null());
    for i in 0..64 {
      assert_eq!(unsafe { p.add(i).read() }, 0);
    }
    assert!(a.check().is_ok());
  }

  #[test]
  fn zalloc_rejects_overflow() {
    let mut a = fresh();
    let p = a.zalloc(usize::MAX, 2);
    assert!(p.is_null());
  }

  #[test]
  fn realloc_zero_frees_and_returns_null() {
    let mut a = fresh();
    let p = a.alloc(64);
    assert!(!p.is_null());
    let q = a.realloc(p, 0);
    assert!(q.is_null());
    assert!(a.check().is_ok());
  }

  #[test]
  fn realloc_null_behaves_like_alloc() {
    let mut a = fresh();
    let p = a.realloc(ptr::null_mut(), 48);
    assert!(!p.is_null());
    assert!(a.check().is_ok());
  }

  #[test]
  fn realloc_preserves_payload_prefix() {
    let mut a = fresh();
    let p = a.alloc(16) as *mut u64;
    assert!(!p.is_null());
    unsafe { p.write(0xDEAD_BEEF_CAFE_F00D) };

    let grown = a.realloc(p as *mut u8, 256) as *mut u64;
    assert!(!grown.is_null());
    assert_eq!(unsafe { grown.read() }, 0xDEAD_BEEF_CAFE_F00D);
    assert!(a.check().is_ok());
  }

  #[test]
  fn non_overlapping_allocations_stay_independent() {
    let mut a = fresh();
    let p = a.alloc(64) as *mut u8;
    let q = a.alloc(64) as *mut u8;
    assert!(!p.is_null() && !q.is_null());

    unsafe {
      ptr::write_bytes(p, 0xAA, 64);
      ptr::write_bytes(q, 0xBB, 64);
    }
    let p_ok = (0..64).all(|i| unsafe { p.add(i).read() } == 0xAA);
    let q_ok = (0..64).all(|i| unsafe { q.add(i).read() } == 0xBB);
    assert!(p_ok && q_ok);
  }

  #[test]
  fn extend_then_coalesce_with_trailing_free_block() {
    let mut a = fresh();
    // Force at least one heap extension with a request larger than a
    // single default chunk.
    let big = a.alloc(8192);
    assert!(!big.is_null());
    assert!(a.check().is_ok());
  }
}
