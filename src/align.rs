//! Alignment helpers.
//!
//! Every payload pointer this crate hands out is double-word (8 byte)
//! aligned, and every block size is a multiple of 8. `align_up!` rounds an
//! arbitrary expression up to an arbitrary power-of-two boundary; `dsize!`
//! specializes it to the double-word case used throughout the block layout.

/// Rounds `$value` up to the next multiple of `$boundary` (`$boundary` must
/// be a power of two).
///
/// # Examples
///
/// ```rust
/// use segalloc::align_up;
///
/// assert_eq!(align_up!(13, 8), 16);
/// assert_eq!(align_up!(16, 8), 16);
/// assert_eq!(align_up!(1, 8), 8);
/// ```
#[macro_export]
macro_rules! align_up {
  ($value:expr, $boundary:expr) => {
    ($value + $boundary - 1) & !($boundary - 1)
  };
}

/// Rounds `$value` up to the next multiple of 8 (the allocator's
/// double-word unit).
#[macro_export]
macro_rules! dsize {
  ($value:expr) => {
    $crate::align_up!($value, 8)
  };
}

/// Function form of [`dsize!`], for call sites that don't want macro
/// hygiene surprises (e.g. passing the result straight into arithmetic).
#[inline]
pub const fn round_up_8(value: usize) -> usize {
  (value + 7) & !7
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_align_up() {
    for i in 0..10 {
      let sizes = (8 * i + 1)..=(8 * (i + 1));
      let expected = 8 * (i + 1);

      for size in sizes {
        assert_eq!(expected, align_up!(size, 8));
        assert_eq!(expected, round_up_8(size));
      }
    }
  }

  #[test]
  fn test_round_up_8_already_aligned() {
    assert_eq!(round_up_8(0), 0);
    assert_eq!(round_up_8(8), 8);
    assert_eq!(round_up_8(16), 16);
  }
}
