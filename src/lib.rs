//! # segalloc — a segregated free-list allocator over `sbrk`
//!
//! This crate manages a single contiguous heap obtained from the process
//! via `sbrk`, answering four requests — `alloc`, `free`, `realloc`,
//! `zalloc` — over boundary-tagged blocks indexed by fifteen segregated
//! free lists.
//!
//! ## Overview
//!
//! ```text
//!   Heap skeleton:
//!
//!   ┌──────┬───────────┬─────────────────────────────────┬──────────┐
//!   │ pad  │ prologue  │         user blocks              │ epilogue │
//!   │ (4B) │ (8B, alloc│   header|payload(|footer if free)│ (4B, 0,  │
//!   │      │  sentinel)│                                  │  alloc)  │
//!   └──────┴───────────┴─────────────────────────────────┴──────────┘
//! ```
//!
//! Each free block's own payload holds a next-pointer into a LIFO
//! segregated free list (`L1..L15`, see [`freelist`]); allocated blocks
//! carry a header only, trusting the next block's `prev_alloc` bit instead
//! of a footer. [`fit`] finds candidates, [`placer`] splits them low or
//! high depending on request size, [`coalesce`] merges neighbours eagerly
//! on every free and heap extension, and [`extend`] grows the heap when no
//! fit exists.
//!
//! ## Crate structure
//!
//! ```text
//!   segalloc
//!   ├── align      - alignment macros and helpers
//!   ├── config     - named, overridable tuning constants
//!   ├── error      - typed errors for the heap primitive and checker
//!   ├── heap       - the sbrk-based heap-extension primitive
//!   ├── block      - header/footer encoding, boundary-tag navigation
//!   ├── freelist   - the 15-bin segregated free-list index
//!   ├── coalesce   - eager four-case neighbour merging
//!   ├── placer     - low/high splitting policy
//!   ├── fit        - first-fit search over the segregated lists
//!   ├── extend     - heap growth and its fold into the free-list index
//!   ├── checker    - debug-only invariant walker
//!   └── allocator  - the public Allocator type and global entry points
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use segalloc::Allocator;
//!
//! let mut allocator = Allocator::empty();
//! allocator.init().expect("failed to initialize heap");
//!
//! let p = allocator.alloc(64);
//! assert!(!p.is_null());
//! allocator.free(p);
//! ```
//!
//! Or through the process-wide instance guarded by a mutex, which serializes
//! the entire public API across threads with no finer-grained locking:
//!
//! ```rust,no_run
//! segalloc::init().expect("failed to initialize heap");
//! let p = segalloc::alloc(64);
//! segalloc::free(p);
//! ```
//!
//! ## Safety
//!
//! This crate is inherently unsafe: it manages raw memory returned by
//! `sbrk` and stores free-list linkage inside the free blocks themselves.
//! `Allocator::alloc`/`free`/`realloc`/`zalloc` are safe to *call*, but the
//! pointers they hand out are raw and carry the usual C-allocator
//! obligations (no double free, no use-after-free, no writing past the
//! requested size).
//!
//! ## Limitations
//!
//! - Single-threaded core; the global entry points add a mutex but no
//!   finer-grained locking.
//! - One arena: no per-thread caches, no size-classed allocated blocks,
//!   no mmap fallback for large requests, no decommit back to the OS.

pub mod align;
pub mod allocator;
pub mod block;
pub mod checker;
pub mod coalesce;
pub mod config;
pub mod error;
pub mod extend;
pub mod fit;
pub mod freelist;
pub mod heap;
pub mod placer;

pub use allocator::{alloc, check, free, init, realloc, zalloc, Allocator};
pub use config::AllocatorConfig;
pub use error::{AllocError, HeapError, InvariantViolation};
