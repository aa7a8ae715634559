//! In-place mutation kernels.
//!
//! Each kernel works on a `window` that starts at `data[0]` and is long
//! enough to hold the larger of the old and new contents plus the
//! terminator. Callers validate every position before calling in; the
//! kernels only move bytes, write the terminator, and return the new size.

use crate::layout::TERMINATOR;
use crate::search::Direction;
use crate::search::Horspool;
use crate::search::find_byte_not_from;
use crate::search::rfind_byte_not_from;

pub(crate) fn insert(
  window: &mut [u8],
  size: usize,
  left: usize,
  items: &[u8],
) -> usize {
  let n = items.len();
  window.copy_within(left..size, left + n);
  window[left..left + n].copy_from_slice(items);
  window[size + n] = TERMINATOR;
  size + n
}

pub(crate) fn remove_range(
  window: &mut [u8],
  size: usize,
  left: usize,
  count: usize,
) -> usize {
  window.copy_within(left + count..size, left);
  window[size - count] = TERMINATOR;
  size - count
}

/// Removes the run of class members starting at `left`, stopping at the
/// first non-member or after `right`.
pub(crate) fn trim_left(
  window: &mut [u8],
  size: usize,
  left: usize,
  right: usize,
  class: &[u8],
) -> usize {
  let span = &window[left..=right];
  let run = find_byte_not_from(span, class).unwrap_or(span.len());
  if run == 0 {
    return size;
  }
  remove_range(window, size, left, run)
}

/// Removes the run of class members ending at `right`, stopping at the first
/// non-member or before `left`.
pub(crate) fn trim_right(
  window: &mut [u8],
  size: usize,
  left: usize,
  right: usize,
  class: &[u8],
) -> usize {
  let keep_end = rfind_byte_not_from(&window[left..=right], class)
    .map_or(left, |at| left + at + 1);
  let run = right + 1 - keep_end;
  if run == 0 {
    return size;
  }
  remove_range(window, size, keep_end, run)
}

pub(crate) fn trim(
  window: &mut [u8],
  size: usize,
  left: usize,
  right: usize,
  class: &[u8],
) -> usize {
  let trimmed = trim_left(window, size, left, right, class);
  let removed = size - trimmed;
  if removed > right - left {
    return trimmed;
  }
  trim_right(window, trimmed, left, right - removed, class)
}

/// Replaces every non-overlapping occurrence of `before` that lies inside
/// `[left, right]`, discovered in `direction` order.
///
/// `occurrences` is the number of matches that scan will find; it sizes the
/// room needed when the data grows. Bytes are relocated in a single pass:
///
/// * forward scans keep the write cursor at or behind the read cursor, so a
///   growing replacement first moves the affected tail right by the total
///   growth;
/// * backward scans keep the write cursor at or ahead of the read cursor, so
///   a shrinking replacement closes the remaining gap at the end.
///
/// Searches only ever read bytes that have not been written yet.
#[allow(clippy::too_many_arguments)]
pub(crate) fn replace(
  window: &mut [u8],
  size: usize,
  left: usize,
  right: usize,
  before: &[u8],
  after: &[u8],
  direction: Direction,
  occurrences: usize,
) -> usize {
  let (b, a) = (before.len(), after.len());
  let growth = if a > b { occurrences * (a - b) } else { 0 };
  let finder = Horspool::new(before, direction);

  let new_size = match direction {
    Direction::Forward => {
      if growth > 0 {
        window.copy_within(left..size, left + growth);
      }
      let end = right + 1 + growth;
      let tail_end = size + growth;
      let mut read = left + growth;
      let mut write = left;
      while let Some(at) = finder.find_in(&window[read..end]) {
        let hit = read + at;
        window.copy_within(read..hit, write);
        write += hit - read;
        window[write..write + a].copy_from_slice(after);
        write += a;
        read = hit + b;
      }
      window.copy_within(read..tail_end, write);
      write + (tail_end - read)
    }
    Direction::Backward => {
      let end = right + 1;
      let mut read = end;
      let mut write = end + growth;
      if growth > 0 {
        window.copy_within(end..size, write);
      }
      while let Some(at) = finder.find_in(&window[left..read]) {
        let hit = left + at;
        let kept = read - (hit + b);
        write -= kept;
        window.copy_within(hit + b..read, write);
        write -= a;
        window[write..write + a].copy_from_slice(after);
        read = hit;
      }
      let tail_end = size + growth;
      if write > read {
        window.copy_within(write..tail_end, read);
      }
      tail_end - (write - read)
    }
  };

  window[new_size] = TERMINATOR;
  new_size
}

pub(crate) fn reverse(window: &mut [u8], left: usize, right: usize) {
  window[left..=right].reverse();
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Copies `text` into a window with `spare` free bytes and a terminator.
  fn window(text: &[u8], spare: usize) -> ([u8; 64], usize) {
    let mut buf = [b'#'; 64];
    buf[..text.len()].copy_from_slice(text);
    buf[text.len()] = TERMINATOR;
    assert!(text.len() + spare < buf.len());
    (buf, text.len())
  }

  fn replaced(
    text: &[u8],
    before: &[u8],
    after: &[u8],
    range: (usize, usize),
    direction: Direction,
  ) -> Vec<u8> {
    let (mut buf, size) = window(text, 32);
    let hay = &text[range.0..=range.1];
    let occurrences = crate::search::count(hay, before, false, direction);
    let new_size = replace(
      &mut buf,
      size,
      range.0,
      range.1,
      before,
      after,
      direction,
      occurrences,
    );
    assert_eq!(buf[new_size], TERMINATOR);
    buf[..new_size].to_vec()
  }

  /// Rebuilds `text` with every match in `[left, right]` swapped out,
  /// scanning a byte at a time.
  fn spliced(
    text: &[u8],
    before: &[u8],
    after: &[u8],
    (left, right): (usize, usize),
    direction: Direction,
  ) -> Vec<u8> {
    let span = &text[left..=right];
    let b = before.len();
    let mut mid = Vec::new();
    match direction {
      Direction::Forward => {
        let mut i = 0;
        while i < span.len() {
          if span[i..].starts_with(before) {
            mid.extend_from_slice(after);
            i += b;
          } else {
            mid.push(span[i]);
            i += 1;
          }
        }
      }
      Direction::Backward => {
        let mut j = span.len();
        while j > 0 {
          if span[..j].ends_with(before) {
            mid.extend(after.iter().rev());
            j -= b;
          } else {
            mid.push(span[j - 1]);
            j -= 1;
          }
        }
        mid.reverse();
      }
    }
    [&text[..left], &mid[..], &text[right + 1..]].concat()
  }

  // Two letters so matches are frequent and often overlap.
  fn squash(bytes: Vec<u8>, max: usize) -> Vec<u8> {
    bytes.into_iter().take(max).map(|b| b'a' + b % 2).collect()
  }

  quickcheck::quickcheck! {
    fn replace_agrees_with_splice(
      text: Vec<u8>,
      before: Vec<u8>,
      after: Vec<u8>,
      left: usize,
      width: usize,
      from_left: bool
    ) -> bool {
      let text = squash(text, 16);
      let before = squash(before, 3);
      let after = squash(after, 3);
      if text.is_empty() || before.is_empty() {
        return true;
      }
      let left = left % text.len();
      let right = left + width % (text.len() - left);
      let direction = Direction::from_left(from_left);
      replaced(&text, &before, &after, (left, right), direction)
        == spliced(&text, &before, &after, (left, right), direction)
    }
  }

  #[test]
  fn insert_shifts_tail() {
    let (mut buf, size) = window(b"hello", 8);
    let size = insert(&mut buf, size, 2, b"XY");
    assert_eq!(&buf[..=size], b"heXYllo\0");
    let size = insert(&mut buf, size, size, b"!");
    assert_eq!(&buf[..=size], b"heXYllo!\0");
  }

  #[test]
  fn remove_range_closes_gap() {
    let (mut buf, size) = window(b"0123456789", 0);
    let size = remove_range(&mut buf, size, 2, 3);
    assert_eq!(&buf[..=size], b"0156789\0");
  }

  #[test]
  fn trims_respect_range() {
    let (mut buf, size) = window(b"xx--ab--xx", 0);
    let size = trim(&mut buf, size, 2, 7, b"-");
    assert_eq!(&buf[..size], b"xxabxx");

    let (mut buf, size) = window(b"----", 0);
    let size = trim(&mut buf, size, 0, 3, b"-");
    assert_eq!(size, 0);
    assert_eq!(buf[0], TERMINATOR);

    let (mut buf, size) = window(b"--a--", 0);
    let size = trim_right(&mut buf, size, 0, 4, b"-");
    assert_eq!(&buf[..size], b"--a");
  }

  #[test]
  fn replace_regimes_forward() {
    let fwd = Direction::Forward;
    assert_eq!(replaced(b"a.b.c", b".", b"::", (0, 4), fwd), b"a::b::c");
    assert_eq!(replaced(b"a::b::c", b"::", b".", (0, 6), fwd), b"a.b.c");
    assert_eq!(replaced(b"a.b.c", b".", b",", (0, 4), fwd), b"a,b,c");
    assert_eq!(replaced(b"a.b.c", b".", b"", (0, 4), fwd), b"abc");
  }

  #[test]
  fn replace_regimes_backward() {
    let bwd = Direction::Backward;
    assert_eq!(replaced(b"a.b.c", b".", b"::", (0, 4), bwd), b"a::b::c");
    assert_eq!(replaced(b"a::b::c", b"::", b".", (0, 6), bwd), b"a.b.c");
    assert_eq!(replaced(b"a.b.c", b".", b"", (0, 4), bwd), b"abc");
  }

  #[test]
  fn replace_direction_picks_matches() {
    assert_eq!(
      replaced(b"aaa", b"aa", b"b", (0, 2), Direction::Forward),
      b"ba"
    );
    assert_eq!(
      replaced(b"aaa", b"aa", b"b", (0, 2), Direction::Backward),
      b"ab"
    );
    assert_eq!(
      replaced(b"aaa", b"aa", b"bbbb", (0, 2), Direction::Backward),
      b"abbbb"
    );
  }

  #[test]
  fn replace_only_inside_range() {
    let text = b"x.x.x.x";
    assert_eq!(
      replaced(text, b".", b"--", (2, 4), Direction::Forward),
      b"x.x--x.x"
    );
    assert_eq!(
      replaced(text, b".", b"--", (2, 4), Direction::Backward),
      b"x.x--x.x"
    );
    // a match straddling the right bound is left alone
    assert_eq!(
      replaced(b"ab|ab", b"ab", b"Z", (0, 3), Direction::Forward),
      b"Z|ab"
    );
  }

  #[test]
  fn replacement_is_not_rescanned() {
    assert_eq!(
      replaced(b"aXa", b"a", b"aa", (0, 2), Direction::Forward),
      b"aaXaa"
    );
    assert_eq!(
      replaced(b"aXa", b"a", b"aa", (0, 2), Direction::Backward),
      b"aaXaa"
    );
  }

  #[test]
  fn reverse_swaps_inside_range() {
    let (mut buf, size) = window(b"1234", 0);
    reverse(&mut buf, 0, size - 1);
    assert_eq!(&buf[..size], b"4321");
    reverse(&mut buf, 1, 2);
    assert_eq!(&buf[..size], b"4231");
  }
}
