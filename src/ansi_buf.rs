use core::fmt;
use core::fmt::Debug;
use core::fmt::Display;
use core::fmt::Formatter;
use core::ops::Deref;

use crate::ansi_str::AnsiStr;
use crate::ansi_str::CompareResult;
use crate::ansi_str::Plan;
use crate::edit;
use crate::error::Error;
use crate::error::Result;
use crate::layout;
use crate::layout::AttachMode;
use crate::layout::HEADER_LEN;
use crate::license::License;
use crate::search::Direction;

/// How a growing replacement makes room for the new bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReplaceType {
  /// Count the matches first to size the result, then relocate every byte
  /// once, in place.
  #[default]
  Dual,
}

/// Mutable descriptor bound to a caller-owned buffer.
///
/// The buffer holds a 4-byte header (size and capacity), the data region,
/// and one terminator slot; see [`layout`](crate::layout). `AnsiBuf` never
/// allocates and never grows past the capacity fixed at attachment. Every
/// mutation validates all of its inputs before the first byte is written,
/// so a failed call leaves the buffer untouched.
///
/// # Example
///
/// ```rust
/// use ansibuf::{AnsiBuf, AttachMode, Error, License, LicenseKey, ReplaceType};
///
/// # fn main() -> Result<(), Error> {
/// let license = License::init(&|_: &LicenseKey| true, &LicenseKey::default())?;
/// let mut storage = [0u8; 16];
/// let mut s = AnsiBuf::attach(&license, &mut storage, AttachMode::Clear)?;
/// assert_eq!(s.capacity(), 11);
///
/// s.insert(0, b"  a,b,c ")?;
/// s.trim(0, s.size() - 1, b" ")?;
/// s.replace(0, s.size() - 1, b",", b"; ", true, ReplaceType::Dual)?;
/// assert_eq!(s, "a; b; c");
///
/// // the result would not fit
/// let err = s.replace(0, s.size() - 1, b";", b";;;;", true, ReplaceType::Dual);
/// assert_eq!(err, Err(Error::ReplacementTooLarge));
/// assert_eq!(s, "a; b; c");
/// # Ok(())
/// # }
/// ```
pub struct AnsiBuf<'a> {
  buf: &'a mut [u8],
}

#[inline]
fn rejected(op: &'static str) -> impl Fn(&Error) {
  move |err| log::trace!("{op} rejected: {err}")
}

impl<'a> AnsiBuf<'a> {
  /// Binds `buffer` and writes the header and terminator according to
  /// `mode`.
  pub fn attach(
    _license: &License,
    buffer: &'a mut [u8],
    mode: AttachMode,
  ) -> Result<Self> {
    layout::attach(buffer, mode).inspect_err(rejected("attach"))?;
    log::debug!(
      "attached {} byte buffer ({:?}), capacity {}",
      buffer.len(),
      mode,
      layout::read_capacity(buffer)
    );
    Ok(Self { buf: buffer })
  }

  /// Releases the descriptor and returns the buffer, header intact, so it
  /// can later be re-attached with [`AttachMode::Restore`].
  #[inline]
  pub fn detach(self) -> &'a mut [u8] {
    self.buf
  }

  #[inline]
  pub fn as_ansi_str(&self) -> AnsiStr<'_> {
    AnsiStr::from_buffer(self.buf)
  }

  #[inline]
  pub fn size(&self) -> usize {
    self.as_ansi_str().size()
  }

  #[inline]
  pub fn capacity(&self) -> usize {
    self.as_ansi_str().capacity()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.size() == 0
  }

  #[inline]
  pub fn data(&self) -> &[u8] {
    self.as_ansi_str().data()
  }

  /// Mutable access to the string contents. The size cannot change through
  /// this slice and the terminator is outside of it.
  #[inline]
  pub fn data_mut(&mut self) -> &mut [u8] {
    let end = HEADER_LEN + self.size();
    self.buf.get_mut(HEADER_LEN..end).unwrap_or_default()
  }

  /// The whole buffer, header included.
  ///
  /// Writes through this slice bypass every invariant. The next operation
  /// re-validates the header and terminator and reports any damage.
  #[inline]
  pub fn buffer_mut(&mut self) -> &mut [u8] {
    self.buf
  }

  /// `data[..=plan.reach]`, the only bytes an edit may touch.
  #[inline]
  fn window_mut(&mut self, plan: Plan) -> &mut [u8] {
    &mut self.buf[HEADER_LEN..=HEADER_LEN + plan.reach]
  }

  #[inline]
  fn set_size(&mut self, size: usize) {
    layout::write_size(self.buf, size);
  }

  /// Inserts `items` at `left`; `left == size()` appends.
  pub fn insert(&mut self, left: usize, items: &[u8]) -> Result<()> {
    let plan = self
      .as_ansi_str()
      .plan_insert(left, items)
      .inspect_err(rejected("insert"))?;
    let size = edit::insert(self.window_mut(plan), plan.size, left, items);
    self.set_size(size);
    Ok(())
  }

  /// Removes `count` bytes starting at `left`.
  pub fn remove_from(&mut self, left: usize, count: usize) -> Result<()> {
    let plan = self
      .as_ansi_str()
      .plan_remove_from(left, count)
      .inspect_err(rejected("remove_from"))?;
    let size =
      edit::remove_range(self.window_mut(plan), plan.size, left, count);
    self.set_size(size);
    Ok(())
  }

  /// Removes every non-overlapping occurrence of `items` lying inside
  /// `[left, right]`, scanning from the left or from the right.
  pub fn remove(
    &mut self,
    left: usize,
    right: usize,
    items: &[u8],
    from_left: bool,
  ) -> Result<()> {
    let plan = self
      .as_ansi_str()
      .plan_remove(left, right, items)
      .inspect_err(rejected("remove"))?;
    let size = edit::replace(
      self.window_mut(plan),
      plan.size,
      left,
      right,
      items,
      &[],
      Direction::from_left(from_left),
      0,
    );
    self.set_size(size);
    Ok(())
  }

  /// Removes class members from `left` onwards, up to `right`.
  pub fn trim_left(
    &mut self,
    left: usize,
    right: usize,
    class: &[u8],
  ) -> Result<()> {
    let plan = self
      .as_ansi_str()
      .plan_trim(left, right, class)
      .inspect_err(rejected("trim_left"))?;
    let size =
      edit::trim_left(self.window_mut(plan), plan.size, left, right, class);
    self.set_size(size);
    Ok(())
  }

  /// Removes class members from `right` backwards, down to `left`.
  pub fn trim_right(
    &mut self,
    left: usize,
    right: usize,
    class: &[u8],
  ) -> Result<()> {
    let plan = self
      .as_ansi_str()
      .plan_trim(left, right, class)
      .inspect_err(rejected("trim_right"))?;
    let size = edit::trim_right(
      self.window_mut(plan),
      plan.size,
      left,
      right,
      class,
    );
    self.set_size(size);
    Ok(())
  }

  /// [`trim_left`](Self::trim_left) followed by
  /// [`trim_right`](Self::trim_right) over what is left of the range.
  pub fn trim(&mut self, left: usize, right: usize, class: &[u8]) -> Result<()> {
    let plan = self
      .as_ansi_str()
      .plan_trim(left, right, class)
      .inspect_err(rejected("trim"))?;
    let size =
      edit::trim(self.window_mut(plan), plan.size, left, right, class);
    self.set_size(size);
    Ok(())
  }

  /// Replaces every non-overlapping occurrence of `before` inside
  /// `[left, right]` with `after`.
  ///
  /// `from_left` decides which occurrences are picked when candidates
  /// overlap: replacing `"aa"` in `"aaa"` touches the first two bytes from
  /// the left and the last two from the right. A growing replacement that
  /// would not fit fails with [`Error::ReplacementTooLarge`] before anything
  /// is written.
  pub fn replace(
    &mut self,
    left: usize,
    right: usize,
    before: &[u8],
    after: &[u8],
    from_left: bool,
    replace_type: ReplaceType,
  ) -> Result<()> {
    let direction = Direction::from_left(from_left);
    let plan = self
      .as_ansi_str()
      .plan_replace(left, right, before, after, direction)
      .inspect_err(rejected("replace"))?;
    let size = match replace_type {
      ReplaceType::Dual => edit::replace(
        self.window_mut(plan),
        plan.size,
        left,
        right,
        before,
        after,
        direction,
        plan.occurrences,
      ),
    };
    self.set_size(size);
    Ok(())
  }

  /// Reverses the bytes in `[left, right]`; `left` must be below `right`.
  pub fn reverse(&mut self, left: usize, right: usize) -> Result<()> {
    let plan = self
      .as_ansi_str()
      .plan_reverse(left, right)
      .inspect_err(rejected("reverse"))?;
    edit::reverse(self.window_mut(plan), left, right);
    Ok(())
  }

  /// See [`AnsiStr::find_single`].
  #[inline]
  pub fn find_single(
    &self,
    left: usize,
    right: usize,
    byte: u8,
  ) -> Result<Option<usize>> {
    self.as_ansi_str().find_single(left, right, byte)
  }

  /// See [`AnsiStr::rfind_single`].
  #[inline]
  pub fn rfind_single(
    &self,
    left: usize,
    right: usize,
    byte: u8,
  ) -> Result<Option<usize>> {
    self.as_ansi_str().rfind_single(left, right, byte)
  }

  /// See [`AnsiStr::find`].
  #[inline]
  pub fn find(
    &self,
    left: usize,
    right: usize,
    items: &[u8],
  ) -> Result<Option<usize>> {
    self.as_ansi_str().find(left, right, items)
  }

  /// See [`AnsiStr::rfind`].
  #[inline]
  pub fn rfind(
    &self,
    left: usize,
    right: usize,
    items: &[u8],
  ) -> Result<Option<usize>> {
    self.as_ansi_str().rfind(left, right, items)
  }

  #[inline]
  pub fn first_of(
    &self,
    left: usize,
    right: usize,
    class: &[u8],
  ) -> Result<Option<usize>> {
    self.as_ansi_str().first_of(left, right, class)
  }

  #[inline]
  pub fn first_not_of(
    &self,
    left: usize,
    right: usize,
    class: &[u8],
  ) -> Result<Option<usize>> {
    self.as_ansi_str().first_not_of(left, right, class)
  }

  #[inline]
  pub fn last_of(
    &self,
    left: usize,
    right: usize,
    class: &[u8],
  ) -> Result<Option<usize>> {
    self.as_ansi_str().last_of(left, right, class)
  }

  #[inline]
  pub fn last_not_of(
    &self,
    left: usize,
    right: usize,
    class: &[u8],
  ) -> Result<Option<usize>> {
    self.as_ansi_str().last_not_of(left, right, class)
  }

  /// See [`AnsiStr::compare`].
  #[inline]
  pub fn compare(
    &self,
    left: usize,
    items: &[u8],
    partial: bool,
  ) -> Result<CompareResult> {
    self.as_ansi_str().compare(left, items, partial)
  }

  /// See [`AnsiStr::count`].
  #[inline]
  pub fn count(
    &self,
    left: usize,
    right: usize,
    items: &[u8],
    overlapped: bool,
    from_left: bool,
  ) -> Result<usize> {
    self
      .as_ansi_str()
      .count(left, right, items, overlapped, from_left)
  }
}

impl Debug for AnsiBuf<'_> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    Debug::fmt(&self.as_ansi_str(), f)
  }
}

impl Display for AnsiBuf<'_> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    Display::fmt(&self.as_ansi_str(), f)
  }
}

impl Deref for AnsiBuf<'_> {
  type Target = [u8];

  #[inline(always)]
  fn deref(&self) -> &[u8] {
    self.data()
  }
}

impl AsRef<[u8]> for AnsiBuf<'_> {
  #[inline(always)]
  fn as_ref(&self) -> &[u8] {
    self.data()
  }
}

impl<T: AsRef<[u8]> + ?Sized> PartialEq<T> for AnsiBuf<'_> {
  #[inline(always)]
  fn eq(&self, other: &T) -> bool {
    self.data() == other.as_ref()
  }
}

#[cfg(feature = "serde")]
mod serde_impl {
  use serde::Serialize;
  use serde::Serializer;

  use super::AnsiBuf;

  impl Serialize for AnsiBuf<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
      S: Serializer,
    {
      self.as_ansi_str().serialize(serializer)
    }
  }
}
