use core::cmp::Ordering;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Display;
use core::fmt::Formatter;
use core::hash::Hash;
use core::hash::Hasher;
use core::ops::Deref;

use crate::error::Error;
use crate::error::Result;
use crate::layout;
use crate::layout::HEADER_LEN;
use crate::license::License;
use crate::region::Region;
use crate::search;
use crate::search::Direction;
use crate::search::Horspool;

/// Outcome of [`AnsiStr::compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "is_variant", derive(derive_more::IsVariant))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareResult {
  Equal,
  NonEqual,
}

/// Read-only descriptor over an attached buffer.
///
/// An `AnsiStr` borrows the whole buffer, header included, and reads size
/// and capacity from the header on every call. Every scan re-validates the
/// header and the terminator before touching the data, so a buffer that was
/// modified behind the descriptor's back is reported rather than trusted.
///
/// Obtain one from [`AnsiBuf::as_ansi_str`](crate::AnsiBuf::as_ansi_str) or
/// by restoring a previously attached buffer with [`AnsiStr::restore`].
///
/// # Example
///
/// ```rust
/// use ansibuf::{AnsiBuf, AttachMode, License, LicenseKey};
///
/// # fn main() -> Result<(), ansibuf::Error> {
/// let license = License::init(&|_: &LicenseKey| true, &LicenseKey::default())?;
/// let mut storage = [0u8; 32];
/// let mut s = AnsiBuf::attach(&license, &mut storage, AttachMode::Clear)?;
/// s.insert(0, b"key=value")?;
///
/// let view = s.as_ansi_str();
/// assert_eq!(view.find_single(0, 8, b'=')?, Some(3));
/// assert_eq!(view.find(0, 8, b"val")?, Some(4));
/// assert_eq!(view.first_not_of(0, 8, b"aeky")?, Some(3));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy)]
pub struct AnsiStr<'a> {
  buf: &'a [u8],
}

/// Sizes recorded by a validated mutation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Plan {
  pub size:        usize,
  /// Largest size the data reaches while the edit runs.
  pub reach:       usize,
  pub occurrences: usize,
}

impl<'a> AnsiStr<'a> {
  /// Wraps a buffer whose length is at least [`MIN_BUFFER_LEN`].
  ///
  /// [`MIN_BUFFER_LEN`]: crate::layout::MIN_BUFFER_LEN
  #[inline]
  pub(crate) const fn from_buffer(buf: &'a [u8]) -> Self {
    Self { buf }
  }

  /// Attaches read-only to a buffer prepared by an earlier
  /// [`AnsiBuf::attach`](crate::AnsiBuf::attach).
  pub fn restore(_license: &License, buffer: &'a [u8]) -> Result<Self> {
    layout::restore(buffer)?;
    Ok(Self::from_buffer(buffer))
  }

  /// Stored size. Never fails; use [`validate`](Self::validate) to check it.
  #[inline]
  pub fn size(&self) -> usize {
    layout::read_size(self.buf)
  }

  /// Stored capacity.
  #[inline]
  pub fn capacity(&self) -> usize {
    layout::read_capacity(self.buf)
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.size() == 0
  }

  /// The string contents, or an empty slice if the header is corrupted.
  #[inline]
  pub fn data(&self) -> &'a [u8] {
    self
      .buf
      .get(HEADER_LEN..HEADER_LEN + self.size())
      .unwrap_or_default()
  }

  /// The whole buffer, header and terminator included.
  #[inline]
  pub fn buffer(&self) -> &'a [u8] {
    self.buf
  }

  /// Checks capacity, size, and terminator. Returns `(size, capacity)`.
  pub fn validate(&self) -> Result<(usize, usize)> {
    layout::restore(self.buf)
  }

  /// First occurrence of `byte` in `[left, right]`.
  pub fn find_single(
    &self,
    left: usize,
    right: usize,
    byte: u8,
  ) -> Result<Option<usize>> {
    let span = self.span(left, right)?;
    Ok(search::find_byte(span, byte).map(|at| left + at))
  }

  /// Last occurrence of `byte` in `[left, right]`.
  pub fn rfind_single(
    &self,
    left: usize,
    right: usize,
    byte: u8,
  ) -> Result<Option<usize>> {
    let span = self.span(left, right)?;
    Ok(search::rfind_byte(span, byte).map(|at| left + at))
  }

  /// First occurrence of `items` lying fully inside `[left, right]`.
  pub fn find(
    &self,
    left: usize,
    right: usize,
    items: &[u8],
  ) -> Result<Option<usize>> {
    let span = self.pattern_span(left, right, items)?;
    let finder = Horspool::new(items, Direction::Forward);
    Ok(finder.find_in(span).map(|at| left + at))
  }

  /// Last occurrence of `items` lying fully inside `[left, right]`.
  pub fn rfind(
    &self,
    left: usize,
    right: usize,
    items: &[u8],
  ) -> Result<Option<usize>> {
    let span = self.pattern_span(left, right, items)?;
    let finder = Horspool::new(items, Direction::Backward);
    Ok(finder.find_in(span).map(|at| left + at))
  }

  /// First byte in `[left, right]` that is a member of `class`.
  pub fn first_of(
    &self,
    left: usize,
    right: usize,
    class: &[u8],
  ) -> Result<Option<usize>> {
    let span = self.class_span(left, right, class)?;
    Ok(search::find_byte_from(span, class).map(|at| left + at))
  }

  /// First byte in `[left, right]` that is not a member of `class`.
  pub fn first_not_of(
    &self,
    left: usize,
    right: usize,
    class: &[u8],
  ) -> Result<Option<usize>> {
    let span = self.class_span(left, right, class)?;
    Ok(search::find_byte_not_from(span, class).map(|at| left + at))
  }

  /// Last byte in `[left, right]` that is a member of `class`.
  pub fn last_of(
    &self,
    left: usize,
    right: usize,
    class: &[u8],
  ) -> Result<Option<usize>> {
    let span = self.class_span(left, right, class)?;
    Ok(search::rfind_byte_from(span, class).map(|at| left + at))
  }

  /// Last byte in `[left, right]` that is not a member of `class`.
  pub fn last_not_of(
    &self,
    left: usize,
    right: usize,
    class: &[u8],
  ) -> Result<Option<usize>> {
    let span = self.class_span(left, right, class)?;
    Ok(search::rfind_byte_not_from(span, class).map(|at| left + at))
  }

  /// Compares `items` with the data starting at `left`.
  ///
  /// With `partial`, only `items.len()` bytes are compared. Otherwise the
  /// data from `left` to the end must also be exactly `items.len()` long.
  pub fn compare(
    &self,
    left: usize,
    items: &[u8],
    partial: bool,
  ) -> Result<CompareResult> {
    let (size, _) = self.validate()?;
    non_empty(items)?;
    if left >= size {
      return Err(Error::RangeLeftTooLarge);
    }
    if items.len() > size - left {
      return Err(Error::RangeCountTooLarge);
    }
    let head = &self.data()[left..left + items.len()];
    let equal = head == items && (partial || size - left == items.len());
    Ok(if equal {
      CompareResult::Equal
    } else {
      CompareResult::NonEqual
    })
  }

  /// Counts occurrences of `items` inside `[left, right]`.
  pub fn count(
    &self,
    left: usize,
    right: usize,
    items: &[u8],
    overlapped: bool,
    from_left: bool,
  ) -> Result<usize> {
    let span = self.pattern_span(left, right, items)?;
    Ok(search::count(
      span,
      items,
      overlapped,
      Direction::from_left(from_left),
    ))
  }

  /// Validated `data[left..=right]`.
  fn span(&self, left: usize, right: usize) -> Result<&'a [u8]> {
    let (size, _) = self.validate()?;
    check_range(size, left, right)?;
    Ok(&self.data()[left..=right])
  }

  fn class_span(
    &self,
    left: usize,
    right: usize,
    class: &[u8],
  ) -> Result<&'a [u8]> {
    let (size, _) = self.validate()?;
    non_empty(class)?;
    check_range(size, left, right)?;
    Ok(&self.data()[left..=right])
  }

  fn pattern_span(
    &self,
    left: usize,
    right: usize,
    items: &[u8],
  ) -> Result<&'a [u8]> {
    let span = self.class_span(left, right, items)?;
    if items.len() > span.len() {
      return Err(Error::RangeCountTooLarge);
    }
    Ok(span)
  }

  /// The header plus `data[..=reach]`.
  fn region(&self, reach: usize) -> Region {
    Region::new(self.buf.as_ptr(), HEADER_LEN + reach + 1)
  }

  fn disjoint(&self, reach: usize, items: &[u8], err: Error) -> Result<()> {
    if self.region(reach).overlaps(&Region::of(items)) {
      return Err(err);
    }
    Ok(())
  }

  /// Validation for operations that may grow the data.
  pub(crate) fn validate_growable(&self) -> Result<(usize, usize)> {
    if self.capacity() == 0 {
      return Err(Error::CapacityInvalid);
    }
    self.validate()
  }

  pub(crate) fn validate_non_empty(&self) -> Result<(usize, usize)> {
    let (size, capacity) = self.validate()?;
    if size == 0 {
      return Err(Error::SizeIsZero);
    }
    Ok((size, capacity))
  }

  pub(crate) fn plan_insert(&self, left: usize, items: &[u8]) -> Result<Plan> {
    let (size, capacity) = self.validate_growable()?;
    non_empty(items)?;
    if left > size {
      return Err(Error::RangeLeftTooLarge);
    }
    let reach = size + items.len();
    if reach > capacity {
      return Err(Error::RangeCountTooLarge);
    }
    self.disjoint(reach, items, Error::RegionsOverlap)?;
    Ok(Plan::new(size, reach))
  }

  pub(crate) fn plan_remove_from(
    &self,
    left: usize,
    count: usize,
  ) -> Result<Plan> {
    let (size, _) = self.validate_non_empty()?;
    if count == 0 {
      return Err(Error::CountIsZero);
    }
    if left >= size {
      return Err(Error::RangeLeftTooLarge);
    }
    if count > size - left {
      return Err(Error::RangeCountTooLarge);
    }
    Ok(Plan::new(size, size))
  }

  pub(crate) fn plan_remove(
    &self,
    left: usize,
    right: usize,
    items: &[u8],
  ) -> Result<Plan> {
    let (size, _) = self.validate_non_empty()?;
    non_empty(items)?;
    check_range(size, left, right)?;
    if items.len() > right - left + 1 {
      return Err(Error::RangeCountTooLarge);
    }
    self.disjoint(size, items, Error::RegionsOverlap)?;
    Ok(Plan::new(size, size))
  }

  pub(crate) fn plan_trim(
    &self,
    left: usize,
    right: usize,
    class: &[u8],
  ) -> Result<Plan> {
    let (size, _) = self.validate_non_empty()?;
    non_empty(class)?;
    check_range(size, left, right)?;
    self.disjoint(size, class, Error::RegionsOverlap)?;
    Ok(Plan::new(size, size))
  }

  pub(crate) fn plan_replace(
    &self,
    left: usize,
    right: usize,
    before: &[u8],
    after: &[u8],
    direction: Direction,
  ) -> Result<Plan> {
    let (size, capacity) = self.validate_growable()?;
    if size == 0 {
      return Err(Error::SizeIsZero);
    }
    non_empty(before)?;
    check_range(size, left, right)?;
    if before.len() > right - left + 1 {
      return Err(Error::RangeCountTooLarge);
    }
    self.disjoint(size, before, Error::RegionsOverlap)?;
    self.disjoint(size, after, Error::RegionsOverlap)?;

    let span = &self.data()[left..=right];
    let occurrences = search::count(span, before, false, direction);
    let new_size = replaced_size(size, occurrences, before.len(), after.len())
      .filter(|&new_size| new_size <= capacity)
      .ok_or(Error::ReplacementTooLarge)?;
    let reach = size.max(new_size);
    self.disjoint(reach, before, Error::ReplacementOverlap)?;
    self.disjoint(reach, after, Error::ReplacementOverlap)?;
    Ok(Plan {
      size,
      reach,
      occurrences,
    })
  }

  pub(crate) fn plan_reverse(&self, left: usize, right: usize) -> Result<Plan> {
    let (size, _) = self.validate()?;
    if right >= size {
      return Err(Error::RangeRightTooLarge);
    }
    if left >= right {
      return Err(Error::RangeLeftTooLarge);
    }
    Ok(Plan::new(size, size))
  }
}

impl Plan {
  #[inline]
  const fn new(size: usize, reach: usize) -> Self {
    Self {
      size,
      reach,
      occurrences: 0,
    }
  }
}

/// Size after replacing `occurrences` matches, or `None` on overflow.
///
/// Removed bytes all lie inside the data, so the subtraction never
/// underflows.
#[inline]
fn replaced_size(
  size: usize,
  occurrences: usize,
  before: usize,
  after: usize,
) -> Option<usize> {
  let added = occurrences.checked_mul(after)?;
  (size - occurrences * before).checked_add(added)
}

#[inline]
fn non_empty(items: &[u8]) -> Result<()> {
  if items.is_empty() {
    return Err(Error::CountIsZero);
  }
  Ok(())
}

#[inline]
fn check_range(size: usize, left: usize, right: usize) -> Result<()> {
  if right >= size {
    return Err(Error::RangeRightTooLarge);
  }
  if left > right {
    return Err(Error::RangeLeftTooLarge);
  }
  Ok(())
}

impl Debug for AnsiStr<'_> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "\"{}\"", self.data().escape_ascii())
  }
}

/// Writes each byte as the Latin-1 character with the same value.
impl Display for AnsiStr<'_> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    use core::fmt::Write;
    self.data().iter().try_for_each(|&b| f.write_char(b as char))
  }
}

impl Deref for AnsiStr<'_> {
  type Target = [u8];

  #[inline(always)]
  fn deref(&self) -> &[u8] {
    self.data()
  }
}

impl AsRef<[u8]> for AnsiStr<'_> {
  #[inline(always)]
  fn as_ref(&self) -> &[u8] {
    self.data()
  }
}

impl Hash for AnsiStr<'_> {
  #[inline(always)]
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.data().hash(state);
  }
}

impl PartialEq for AnsiStr<'_> {
  #[inline(always)]
  fn eq(&self, other: &Self) -> bool {
    self.data() == other.data()
  }
}

impl Eq for AnsiStr<'_> {}

impl PartialEq<[u8]> for AnsiStr<'_> {
  #[inline(always)]
  fn eq(&self, other: &[u8]) -> bool {
    self.data() == other
  }
}

impl PartialEq<&[u8]> for AnsiStr<'_> {
  #[inline(always)]
  fn eq(&self, other: &&[u8]) -> bool {
    self.data() == *other
  }
}

impl<const N: usize> PartialEq<[u8; N]> for AnsiStr<'_> {
  #[inline(always)]
  fn eq(&self, other: &[u8; N]) -> bool {
    self.data() == other.as_slice()
  }
}

impl<const N: usize> PartialEq<&[u8; N]> for AnsiStr<'_> {
  #[inline(always)]
  fn eq(&self, other: &&[u8; N]) -> bool {
    self.data() == other.as_slice()
  }
}

impl PartialEq<str> for AnsiStr<'_> {
  #[inline(always)]
  fn eq(&self, other: &str) -> bool {
    self.data() == other.as_bytes()
  }
}

impl PartialEq<&str> for AnsiStr<'_> {
  #[inline(always)]
  fn eq(&self, other: &&str) -> bool {
    self.data() == other.as_bytes()
  }
}

impl PartialEq<AnsiStr<'_>> for &str {
  #[inline(always)]
  fn eq(&self, other: &AnsiStr<'_>) -> bool {
    self.as_bytes() == other.data()
  }
}

impl PartialEq<AnsiStr<'_>> for &[u8] {
  #[inline(always)]
  fn eq(&self, other: &AnsiStr<'_>) -> bool {
    *self == other.data()
  }
}

impl PartialOrd for AnsiStr<'_> {
  #[inline(always)]
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for AnsiStr<'_> {
  #[inline(always)]
  fn cmp(&self, other: &Self) -> Ordering {
    self.data().cmp(other.data())
  }
}

#[cfg(feature = "serde")]
mod serde_impl {
  use serde::Serialize;
  use serde::Serializer;

  use super::AnsiStr;

  impl Serialize for AnsiStr<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
      S: Serializer,
    {
      serializer.serialize_bytes(self.data())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::AnsiBuf;
  use crate::AttachMode;
  use crate::license::test_license;

  fn with_text<R>(text: &[u8], f: impl FnOnce(AnsiStr<'_>) -> R) -> R {
    let mut storage = [0u8; 64];
    let mut buf =
      AnsiBuf::attach(&test_license(), &mut storage, AttachMode::Clear)
        .unwrap();
    if !text.is_empty() {
      buf.insert(0, text).unwrap();
    }
    f(buf.as_ansi_str())
  }

  #[test]
  fn restore_reads_existing_header() {
    let mut storage = [0u8; 16];
    AnsiBuf::attach(&test_license(), &mut storage, AttachMode::Clear)
      .unwrap()
      .insert(0, b"abc")
      .unwrap();
    let s = AnsiStr::restore(&test_license(), &storage).unwrap();
    assert_eq!(s.size(), 3);
    assert_eq!(s.capacity(), 11);
    assert_eq!(s, "abc");
  }

  #[test]
  fn accessors_degrade_on_corrupt_header() {
    let mut storage = [0u8; 8];
    storage[0] = 200; // size far past the buffer
    let s = AnsiStr::from_buffer(&storage);
    assert_eq!(s.size(), 200);
    assert_eq!(s.data(), b"");
    assert_eq!(s.validate(), Err(Error::SizeExceedsCapacity));
  }

  #[test]
  fn single_byte_search_respects_bounds() {
    with_text(b"abcabc", |s| {
      assert_eq!(s.find_single(0, 5, b'c'), Ok(Some(2)));
      assert_eq!(s.find_single(3, 5, b'c'), Ok(Some(5)));
      assert_eq!(s.rfind_single(0, 4, b'c'), Ok(Some(2)));
      assert_eq!(s.find_single(0, 1, b'c'), Ok(None));
      assert_eq!(s.find_single(0, 6, b'c'), Err(Error::RangeRightTooLarge));
      assert_eq!(s.find_single(4, 3, b'c'), Err(Error::RangeLeftTooLarge));
    });
  }

  #[test]
  fn empty_string_has_no_valid_range() {
    with_text(b"", |s| {
      assert_eq!(s.find_single(0, 0, b'a'), Err(Error::RangeRightTooLarge));
      assert_eq!(s.find(0, 0, b"a"), Err(Error::RangeRightTooLarge));
    });
  }

  #[test]
  fn substring_search_checks_count_against_range() {
    with_text(b"hello world", |s| {
      assert_eq!(s.find(0, 10, b"o"), Ok(Some(4)));
      assert_eq!(s.rfind(0, 10, b"o"), Ok(Some(7)));
      assert_eq!(s.find(0, 10, b"world"), Ok(Some(6)));
      assert_eq!(s.find(0, 9, b"world"), Ok(None));
      assert_eq!(s.find(8, 10, b"world"), Err(Error::RangeCountTooLarge));
      assert_eq!(s.find(0, 10, b""), Err(Error::CountIsZero));
    });
  }

  #[test]
  fn class_scans_report_absolute_positions() {
    with_text(b"  a-b  ", |s| {
      assert_eq!(s.first_of(0, 6, b"-"), Ok(Some(3)));
      assert_eq!(s.first_not_of(0, 6, b" "), Ok(Some(2)));
      assert_eq!(s.last_of(0, 6, b"ab"), Ok(Some(4)));
      assert_eq!(s.last_not_of(0, 6, b" "), Ok(Some(4)));
      assert_eq!(s.first_not_of(0, 1, b" "), Ok(None));
      assert_eq!(s.last_of(0, 6, b""), Err(Error::CountIsZero));
    });
  }

  #[test]
  fn compare_modes() {
    with_text(b"678876", |s| {
      assert_eq!(s.compare(0, b"678", false), Ok(CompareResult::NonEqual));
      assert_eq!(s.compare(0, b"678", true), Ok(CompareResult::Equal));
      assert_eq!(s.compare(3, b"876", false), Ok(CompareResult::Equal));
      assert_eq!(s.compare(0, b"679", true), Ok(CompareResult::NonEqual));
      assert_eq!(s.compare(6, b"6", true), Err(Error::RangeLeftTooLarge));
      assert_eq!(s.compare(4, b"768", true), Err(Error::RangeCountTooLarge));
    });
  }

  #[test]
  fn count_modes() {
    with_text(b"aaaa", |s| {
      assert_eq!(s.count(0, 3, b"aa", true, true), Ok(3));
      assert_eq!(s.count(0, 3, b"aa", false, true), Ok(2));
      assert_eq!(s.count(0, 3, b"aa", false, false), Ok(2));
      assert_eq!(s.count(1, 3, b"aa", true, false), Ok(2));
    });
  }

  #[test]
  fn replaced_size_reports_overflow() {
    assert_eq!(replaced_size(5, 2, 1, 3), Some(9));
    assert_eq!(replaced_size(5, 2, 2, 0), Some(1));
    assert_eq!(replaced_size(3, 2, 1, usize::MAX), None);
    assert_eq!(replaced_size(3, 1, 1, usize::MAX), None);
    assert_eq!(replaced_size(3, 1, 1, usize::MAX - 2), Some(usize::MAX));
  }

  #[test]
  fn terminator_corruption_is_detected() {
    let mut storage = [0u8; 16];
    let mut buf =
      AnsiBuf::attach(&test_license(), &mut storage, AttachMode::Clear)
        .unwrap();
    buf.insert(0, b"abc").unwrap();
    buf.buffer_mut()[HEADER_LEN + 3] = b'!';
    let s = buf.as_ansi_str();
    assert_eq!(s.find_single(0, 2, b'a'), Err(Error::TerminatorMissing));
    assert_eq!(s.compare(0, b"a", true), Err(Error::TerminatorMissing));
  }

  #[test]
  fn formatting() {
    with_text(b"tab\there", |s| {
      assert_eq!(format!("{s:?}"), "\"tab\\there\"");
      assert_eq!(format!("{s}"), "tab\there");
    });
  }

  #[test]
  #[cfg(feature = "serde")]
  fn serializes_as_bytes() {
    with_text(b"hi", |s| {
      assert_eq!(serde_json::to_string(&s).unwrap(), "[104,105]");
    });
  }
}
