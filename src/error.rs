//! Error types for the heap primitive and the debug invariant checker.
//!
//! The public entry points (`alloc`, `free`, `realloc`, `zalloc`) keep the
//! libc-shaped contract of returning null / `-1` on failure rather than
//! propagating a `Result` — spec-mandated in-band error handling. These
//! types exist for the layers underneath that contract: the `sbrk` wrapper
//! and the debug checker, where a typed error is more useful than a raw
//! pointer comparison.

use thiserror::Error;

/// Failure modes of the heap-extension primitive.
#[derive(Debug, Error)]
pub enum HeapError {
  /// The underlying `sbrk` call refused to grow the heap.
  #[error("sbrk refused to extend the heap by {requested} bytes")]
  OutOfMemory { requested: usize },
}

/// Failure modes surfaced by the public allocator API before it falls back
/// to a null/`-1` return.
#[derive(Debug, Error)]
pub enum AllocError {
  /// Heap extension failed; the heap is left in its prior consistent state.
  #[error("heap extension failed")]
  OutOfMemory(#[from] HeapError),
  /// `zalloc(nmemb, size)` would overflow computing `nmemb * size`.
  #[error("zalloc(nmemb={nmemb}, size={size}) overflows")]
  SizeOverflow { nmemb: usize, size: usize },
}

/// A violated heap invariant, as found by the debug checker.
///
/// The public `check` entry point aborts the process on the first
/// violation rather than returning this to callers, but routing the
/// diagnosis through a typed error lets tests assert on *which* invariant
/// broke instead of grepping a log line.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum InvariantViolation {
  #[error("block at {addr:#x}: header/footer disagree ({header:#x} != {footer:#x})")]
  HeaderFooterMismatch { addr: usize, header: u32, footer: u32 },
  #[error("blocks at {first:#x} and {second:#x} are both free and adjacent")]
  AdjacentFreeBlocks { first: usize, second: usize },
  #[error("block at {addr:#x} size {size} is not a multiple of 8")]
  Misaligned { addr: usize, size: usize },
  #[error("free block at {addr:#x} lies outside heap bounds [{lo:#x}, {hi:#x})")]
  OutOfBounds { addr: usize, lo: usize, hi: usize },
  #[error("block at {addr:#x} is listed in bin {bin} but its size {size} violates that bin's bound")]
  WrongBin { addr: usize, bin: usize, size: usize },
  #[error("free block at {addr:#x} is listed but not marked free")]
  ListedBlockNotFree { addr: usize },
  #[error("free-block count mismatch: heap walk found {heap_walk}, list walk found {list_walk}")]
  FreeCountMismatch { heap_walk: usize, list_walk: usize },
  #[error("prologue sentinel corrupted")]
  PrologueCorrupt,
  #[error("epilogue sentinel corrupted")]
  EpilogueCorrupt,
  #[error("block at {addr:#x}: next.prev_alloc ({next_prev_alloc}) != this.alloc ({this_alloc})")]
  PrevAllocMismatch { addr: usize, next_prev_alloc: bool, this_alloc: bool },
}
