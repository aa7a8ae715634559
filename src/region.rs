//! Address ranges used to detect aliasing between a destination buffer and
//! the input slices handed to a mutation.

/// A half-open byte range `[start, start + len)` in the address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
  start: usize,
  len:   usize,
}

impl Region {
  #[inline]
  pub fn new(ptr: *const u8, len: usize) -> Self {
    Self {
      start: ptr as usize,
      len,
    }
  }

  #[inline]
  pub fn of(bytes: &[u8]) -> Self {
    Self::new(bytes.as_ptr(), bytes.len())
  }

  #[inline]
  pub const fn start(&self) -> usize {
    self.start
  }

  #[inline]
  pub const fn len(&self) -> usize {
    self.len
  }

  #[inline]
  pub const fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// One past the last address; saturates instead of wrapping.
  #[inline]
  pub const fn end(&self) -> usize {
    self.start.saturating_add(self.len)
  }

  /// Whether the two ranges share at least one byte. Empty ranges never
  /// overlap anything.
  #[inline]
  pub const fn overlaps(&self, other: &Region) -> bool {
    !self.is_empty()
      && !other.is_empty()
      && self.start < other.end()
      && other.start < self.end()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn adjacent_ranges_do_not_overlap() {
    let buf = [0u8; 16];
    let left = Region::of(&buf[..8]);
    let right = Region::of(&buf[8..]);
    assert!(!left.overlaps(&right));
    assert!(!right.overlaps(&left));
    assert_eq!(left.end(), right.start());
  }

  #[test]
  fn shared_byte_overlaps() {
    let buf = [0u8; 16];
    let a = Region::of(&buf[..9]);
    let b = Region::of(&buf[8..]);
    assert!(a.overlaps(&b));
    assert!(b.overlaps(&a));
    assert!(Region::of(&buf).overlaps(&Region::of(&buf[3..4])));
  }

  #[test]
  fn empty_never_overlaps() {
    let buf = [0u8; 4];
    let empty = Region::of(&buf[2..2]);
    assert!(empty.is_empty());
    assert!(!empty.overlaps(&Region::of(&buf)));
    assert!(!Region::of(&buf).overlaps(&empty));
  }
}
