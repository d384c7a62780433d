//! The `sbrk`-style heap primitive this allocator builds on top of: a thin,
//! failure-checked wrapper around `libc::sbrk`, shared by both `init` and
//! the extender.

use libc::{intptr_t, sbrk};

use crate::error::HeapError;

/// `sbrk`'s failure sentinel, as a `usize`-cast pointer value.
const SBRK_FAILED: usize = usize::MAX;

/// Extends the process break by `n` bytes and returns the address of the
/// first new byte (the previous break), mirroring POSIX `sbrk(2)`.
///
/// # Errors
///
/// Returns [`HeapError::OutOfMemory`] if `sbrk` reports failure (typically
/// `RLIMIT_DATA` exhaustion).
///
/// # Safety
///
/// Calls into libc and mutates global process state (the program break).
/// The caller must not call this concurrently with itself or with any other
/// user of `sbrk` on the same process, and must not shrink the heap below
/// memory still referenced by live allocations.
pub unsafe fn sbrk_extend(n: usize) -> Result<*mut u8, HeapError> {
  let raw = unsafe { sbrk(n as intptr_t) };
  if raw as usize == SBRK_FAILED {
    return Err(HeapError::OutOfMemory { requested: n });
  }
  Ok(raw as *mut u8)
}

/// Returns the current program break without moving it, for diagnostics.
pub fn current_break() -> *mut u8 {
  unsafe { sbrk(0) as *mut u8 }
}
