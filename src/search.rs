//! Slice-level search algorithms.
//!
//! Everything here works on plain byte slices and never allocates. The
//! descriptor types validate positions and then delegate to these functions
//! on the addressed sub-slice.
//!
//! Substring search is Boyer–Moore–Horspool. Backward search is the same
//! algorithm run over a reversed view of both the pattern and the haystack,
//! so there is exactly one skip-table construction and one scan loop.
//!
//! ```
//! use ansibuf::search::{self, Direction, Horspool};
//!
//! let hay = b"abracadabra";
//! assert_eq!(search::find(hay, b"abra"), Some(0));
//! assert_eq!(search::rfind(hay, b"abra"), Some(7));
//!
//! let finder = Horspool::new(b"a", Direction::Backward);
//! assert_eq!(finder.find_in(&hay[..7]), Some(5));
//! ```

/// Scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "is_variant", derive(derive_more::IsVariant))]
pub enum Direction {
  /// Lowest position first.
  #[default]
  Forward,
  /// Highest position first.
  Backward,
}

impl Direction {
  #[inline]
  pub const fn from_left(from_left: bool) -> Self {
    if from_left {
      Direction::Forward
    } else {
      Direction::Backward
    }
  }

  /// Byte `i` of `bytes` as seen when walking in this direction.
  #[inline(always)]
  fn at(self, bytes: &[u8], i: usize) -> u8 {
    match self {
      Direction::Forward => bytes[i],
      Direction::Backward => bytes[bytes.len() - 1 - i],
    }
  }
}

/// A precomputed Boyer–Moore–Horspool searcher.
///
/// The skip table maps every byte value to the distance between its last
/// occurrence in the pattern (ignoring the final byte) and the end of the
/// pattern, in the searcher's direction.
#[derive(Clone)]
pub struct Horspool<'p> {
  pattern:   &'p [u8],
  skip:      [usize; 256],
  direction: Direction,
}

impl<'p> Horspool<'p> {
  pub fn new(pattern: &'p [u8], direction: Direction) -> Self {
    let len = pattern.len();
    let mut skip = [len.max(1); 256];
    for i in 0..len.saturating_sub(1) {
      skip[direction.at(pattern, i) as usize] = len - 1 - i;
    }
    Self {
      pattern,
      skip,
      direction,
    }
  }

  #[inline]
  pub fn pattern(&self) -> &'p [u8] {
    self.pattern
  }

  #[inline]
  pub fn direction(&self) -> Direction {
    self.direction
  }

  /// Returns the start of the first (forward) or last (backward) occurrence
  /// of the pattern in `haystack`. An empty pattern never matches.
  pub fn find_in(&self, haystack: &[u8]) -> Option<usize> {
    let m = self.pattern.len();
    let n = haystack.len();
    if m == 0 || m > n {
      return None;
    }
    if m == 1 {
      return match self.direction {
        Direction::Forward => find_byte(haystack, self.pattern[0]),
        Direction::Backward => rfind_byte(haystack, self.pattern[0]),
      };
    }

    let dir = self.direction;
    let mut pos = 0;
    while pos + m <= n {
      let mut j = m - 1;
      while dir.at(haystack, pos + j) == dir.at(self.pattern, j) {
        if j == 0 {
          return Some(match dir {
            Direction::Forward => pos,
            Direction::Backward => n - pos - m,
          });
        }
        j -= 1;
      }
      pos += self.skip[dir.at(haystack, pos + m - 1) as usize];
    }
    None
  }
}

impl core::fmt::Debug for Horspool<'_> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Horspool")
      .field("pattern", &self.pattern.escape_ascii())
      .field("direction", &self.direction)
      .finish_non_exhaustive()
  }
}

#[inline]
pub fn find_byte(haystack: &[u8], byte: u8) -> Option<usize> {
  haystack.iter().position(|&b| b == byte)
}

#[inline]
pub fn rfind_byte(haystack: &[u8], byte: u8) -> Option<usize> {
  haystack.iter().rposition(|&b| b == byte)
}

/// First occurrence of `needle`.
#[inline]
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  Horspool::new(needle, Direction::Forward).find_in(haystack)
}

/// Last occurrence of `needle`.
#[inline]
pub fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  Horspool::new(needle, Direction::Backward).find_in(haystack)
}

/// First byte that is a member of `set`.
#[inline]
pub fn find_byte_from(haystack: &[u8], set: &[u8]) -> Option<usize> {
  haystack.iter().position(|b| set.contains(b))
}

/// First byte that is not a member of `set`.
#[inline]
pub fn find_byte_not_from(haystack: &[u8], set: &[u8]) -> Option<usize> {
  haystack.iter().position(|b| !set.contains(b))
}

/// Last byte that is a member of `set`.
#[inline]
pub fn rfind_byte_from(haystack: &[u8], set: &[u8]) -> Option<usize> {
  haystack.iter().rposition(|b| set.contains(b))
}

/// Last byte that is not a member of `set`.
#[inline]
pub fn rfind_byte_not_from(haystack: &[u8], set: &[u8]) -> Option<usize> {
  haystack.iter().rposition(|b| !set.contains(b))
}

/// Counts occurrences of `needle`.
///
/// With `overlapped`, a forward scan resumes one byte after each match start
/// and a backward scan one byte before each match end; otherwise the whole
/// match is skipped.
pub fn count(
  haystack: &[u8],
  needle: &[u8],
  overlapped: bool,
  direction: Direction,
) -> usize {
  let m = needle.len();
  let finder = Horspool::new(needle, direction);
  let mut found = 0;
  match direction {
    Direction::Forward => {
      let step = if overlapped { 1 } else { m };
      let mut pos = 0;
      while let Some(at) = finder.find_in(&haystack[pos..]) {
        found += 1;
        pos += at + step;
      }
    }
    Direction::Backward => {
      let mut end = haystack.len();
      while let Some(at) = finder.find_in(&haystack[..end]) {
        found += 1;
        end = if overlapped { at + m - 1 } else { at };
      }
    }
  }
  found
}

#[cfg(test)]
mod tests {
  use super::*;

  fn naive_find(hay: &[u8], pat: &[u8]) -> Option<usize> {
    if pat.is_empty() || pat.len() > hay.len() {
      return None;
    }
    (0..=hay.len() - pat.len()).find(|&i| &hay[i..i + pat.len()] == pat)
  }

  fn naive_rfind(hay: &[u8], pat: &[u8]) -> Option<usize> {
    if pat.is_empty() || pat.len() > hay.len() {
      return None;
    }
    (0..=hay.len() - pat.len())
      .rev()
      .find(|&i| &hay[i..i + pat.len()] == pat)
  }

  // Small alphabet so random inputs actually contain matches.
  fn squash(bytes: Vec<u8>) -> Vec<u8> {
    bytes.into_iter().map(|b| b'a' + b % 3).collect()
  }

  quickcheck::quickcheck! {
    fn forward_agrees_with_naive(hay: Vec<u8>, pat: Vec<u8>) -> bool {
      let (hay, pat) = (squash(hay), squash(pat));
      find(&hay, &pat) == naive_find(&hay, &pat)
    }

    fn backward_agrees_with_naive(hay: Vec<u8>, pat: Vec<u8>) -> bool {
      let (hay, pat) = (squash(hay), squash(pat));
      rfind(&hay, &pat) == naive_rfind(&hay, &pat)
    }

    fn overlapped_count_is_direction_independent(hay: Vec<u8>, pat: Vec<u8>) -> bool {
      let (hay, pat) = (squash(hay), squash(pat));
      count(&hay, &pat, true, Direction::Forward)
        == count(&hay, &pat, true, Direction::Backward)
    }
  }

  #[test]
  fn skip_table_uses_last_occurrence() {
    let finder = Horspool::new(b"abcab", Direction::Forward);
    assert_eq!(finder.skip[b'a' as usize], 1);
    assert_eq!(finder.skip[b'c' as usize], 2);
    // final byte is ignored; 'b' also appears at index 1
    assert_eq!(finder.skip[b'b' as usize], 3);
    assert_eq!(finder.skip[b'z' as usize], 5);

    let finder = Horspool::new(b"abcab", Direction::Backward);
    assert_eq!(finder.skip[b'b' as usize], 1);
    assert_eq!(finder.skip[b'c' as usize], 2);
    assert_eq!(finder.skip[b'a' as usize], 3);
  }

  #[test]
  fn finds_at_both_edges() {
    let hay = b"xyzabcxyz";
    assert_eq!(find(hay, b"xyz"), Some(0));
    assert_eq!(rfind(hay, b"xyz"), Some(6));
    assert_eq!(find(hay, b"xyzabcxyz"), Some(0));
    assert_eq!(rfind(hay, b"xyzabcxyz"), Some(0));
    assert_eq!(find(hay, b"xyzabcxyzz"), None);
    assert_eq!(find(hay, b""), None);
  }

  #[test]
  fn class_scans() {
    let hay = b"  key = value;  ";
    assert_eq!(find_byte_from(hay, b"=;"), Some(6));
    assert_eq!(rfind_byte_from(hay, b"=;"), Some(13));
    assert_eq!(find_byte_not_from(hay, b" "), Some(2));
    assert_eq!(rfind_byte_not_from(hay, b" "), Some(13));
    assert_eq!(find_byte_not_from(b"    ", b" "), None);
  }

  #[test]
  fn count_overlap_modes() {
    assert_eq!(count(b"aaaa", b"aa", true, Direction::Forward), 3);
    assert_eq!(count(b"aaaa", b"aa", false, Direction::Forward), 2);
    assert_eq!(count(b"aaaa", b"aa", true, Direction::Backward), 3);
    assert_eq!(count(b"aaaa", b"aa", false, Direction::Backward), 2);
    assert_eq!(count(b"aaa", b"aa", false, Direction::Backward), 1);
    assert_eq!(count(b"abc", b"d", true, Direction::Forward), 0);
  }
}
