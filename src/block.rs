//! Block header/footer encoding and boundary-tag navigation.
//!
//! Every block is addressed here by its **payload pointer** `bp`: the first
//! byte a caller would see, immediately after the 4-byte header. Size,
//! `prev_alloc`, and `alloc` are packed into one 32-bit word so a neighbour's
//! state can be read without walking any list.
//!
//! All functions here are `unsafe`: they dereference raw pointers into the
//! heap and trust that `bp` is a valid block payload pointer within the
//! current heap bounds. Callers above this module (the allocator, the
//! coalescer, the checker) are responsible for that invariant.

use crate::config::{DSIZE, WSIZE};

const ALLOC_BIT: u32 = 0x1;
const PREV_ALLOC_BIT: u32 = 0x4;
const SIZE_MASK: u32 = !0x7;

/// Packs `size`, `prev_alloc`, and `alloc` into a header/footer word.
#[inline]
pub const fn pack(size: usize, prev_alloc: bool, alloc: bool) -> u32 {
  (size as u32) | ((prev_alloc as u32) * PREV_ALLOC_BIT) | (alloc as u32 * ALLOC_BIT)
}

/// Reads the raw 4-byte word at `p`.
///
/// # Safety
/// `p` must be a valid, aligned pointer to a live header or footer word.
#[inline]
pub unsafe fn get(p: *mut u8) -> u32 {
  unsafe { (p as *mut u32).read() }
}

/// Writes the raw 4-byte word at `p`.
///
/// # Safety
/// `p` must be a valid, aligned pointer to a header or footer word owned by
/// the allocator (not live caller payload).
#[inline]
pub unsafe fn put(p: *mut u8, val: u32) {
  unsafe { (p as *mut u32).write(val) }
}

/// # Safety
/// `p` must point at a live header or footer word.
#[inline]
pub unsafe fn get_size(p: *mut u8) -> usize {
  (unsafe { get(p) } & SIZE_MASK) as usize
}

/// # Safety
/// `p` must point at a live header or footer word.
#[inline]
pub unsafe fn get_alloc(p: *mut u8) -> bool {
  unsafe { get(p) } & ALLOC_BIT != 0
}

/// # Safety
/// `p` must point at a live header word.
#[inline]
pub unsafe fn get_prev_alloc(p: *mut u8) -> bool {
  unsafe { get(p) } & PREV_ALLOC_BIT != 0
}

/// Address of `bp`'s header (always `bp - WSIZE`).
///
/// # Safety
/// `bp` must be a valid block payload pointer.
#[inline]
pub unsafe fn hdrp(bp: *mut u8) -> *mut u8 {
  unsafe { bp.sub(WSIZE) }
}

/// Address of `bp`'s footer. Only meaningful for **free** blocks — an
/// allocated block's trailing word is caller payload, not a footer.
///
/// # Safety
/// `bp` must be a valid payload pointer to a block currently free.
#[inline]
pub unsafe fn ftrp(bp: *mut u8) -> *mut u8 {
  unsafe { bp.add(get_size(hdrp(bp)) - DSIZE) }
}

/// Payload pointer of the block immediately following `bp` in address
/// order (may be the epilogue).
///
/// # Safety
/// `bp` must be a valid payload pointer and its header size field correct.
#[inline]
pub unsafe fn next_blkp(bp: *mut u8) -> *mut u8 {
  unsafe { bp.add(get_size(hdrp(bp))) }
}

/// Payload pointer of the block immediately preceding `bp` in address
/// order. Only valid to call when the predecessor is free (so its footer,
/// at `bp - DSIZE`, is live).
///
/// # Safety
/// `bp`'s predecessor must be a free block with a live footer.
#[inline]
pub unsafe fn prev_blkp(bp: *mut u8) -> *mut u8 {
  let prev_footer = unsafe { bp.sub(DSIZE) };
  let prev_size = unsafe { get_size(prev_footer) };
  unsafe { bp.sub(prev_size) }
}

/// Writes matching header and footer for a **free** block of `size` bytes
/// at payload pointer `bp`, preserving `prev_alloc`.
///
/// # Safety
/// `[bp - WSIZE, bp + size - WSIZE)` must be writable heap memory owned by
/// the allocator.
pub unsafe fn write_free(bp: *mut u8, size: usize, prev_alloc: bool) {
  let header = pack(size, prev_alloc, false);
  unsafe {
    put(hdrp(bp), header);
    put(ftrp(bp), header);
  }
}

/// Writes a header (and no footer) for an **allocated** block of `size`
/// bytes at payload pointer `bp`, preserving `prev_alloc`.
///
/// # Safety
/// `bp - WSIZE` must be writable heap memory owned by the allocator.
pub unsafe fn write_alloc(bp: *mut u8, size: usize, prev_alloc: bool) {
  unsafe { put(hdrp(bp), pack(size, prev_alloc, true)) }
}

/// Sets only the `prev_alloc` bit of the block at `bp`, leaving `size` and
/// `alloc` untouched. If the block is free, its footer is updated too so
/// header and footer keep agreeing.
///
/// # Safety
/// `bp` must be a valid payload pointer.
pub unsafe fn set_prev_alloc(bp: *mut u8, prev_alloc: bool) {
  unsafe {
    let size = get_size(hdrp(bp));
    let alloc = get_alloc(hdrp(bp));
    let word = pack(size, prev_alloc, alloc);
    put(hdrp(bp), word);
    if !alloc {
      put(ftrp(bp), word);
    }
  }
}
