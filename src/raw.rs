//! Raw-pointer entry points.
//!
//! These mirror the [`AnsiBuf`] / [`AnsiStr`] surface for callers that only
//! hold pointers: FFI shims, shared memory, buffers placed by a linker
//! script. A descriptor here is simply the pointer to the start of an
//! attached buffer; its length is recovered from the capacity in the header.
//!
//! Unlike the safe API, input regions may alias the buffer. Every call first
//! validates through shared views, including the address-range overlap
//! checks, and only then creates the mutable window the edit writes through.
//!
//! # Safety
//!
//! For every function taking a `buffer`:
//!
//! * `buffer` is null, or points to at least `HEADER_LEN` readable bytes;
//!   when the header's capacity is within [`MAX_CAPACITY`], the whole
//!   `capacity + MIN_BUFFER_LEN` bytes are readable (and writable for the
//!   mutating functions);
//! * `items` pointers are null, or valid for reads of `count` bytes;
//! * no other thread accesses the memory for the duration of the call.

use core::ptr;
use core::ptr::NonNull;
use core::slice;

use crate::ansi_buf::AnsiBuf;
use crate::ansi_buf::ReplaceType;
use crate::ansi_str::AnsiStr;
use crate::ansi_str::CompareResult;
use crate::ansi_str::Plan;
use crate::edit;
use crate::error::Error;
use crate::error::Result;
use crate::layout;
use crate::layout::AttachMode;
use crate::layout::HEADER_LEN;
use crate::layout::MAX_CAPACITY;
use crate::layout::MIN_BUFFER_LEN;
use crate::license::License;
use crate::search::Direction;

/// Attaches the `len` bytes at `buffer` and returns the descriptor pointer.
///
/// # Safety
///
/// `buffer` is null or valid for reads and writes of `len` bytes.
pub unsafe fn attach(
  license: &License,
  buffer: *mut u8,
  len: usize,
  mode: AttachMode,
) -> Result<NonNull<u8>> {
  let Some(descriptor) = NonNull::new(buffer) else {
    return Err(Error::DataInvalid);
  };
  let bytes = unsafe { slice::from_raw_parts_mut(buffer, len) };
  AnsiBuf::attach(license, bytes, mode)?;
  Ok(descriptor)
}

/// Stored size, or 0 for a null descriptor.
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn size(buffer: *const u8) -> usize {
  match unsafe { header(buffer) } {
    Some(header) => layout::read_size(header),
    None => 0,
  }
}

/// Stored capacity, or 0 for a null descriptor.
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn capacity(buffer: *const u8) -> usize {
  match unsafe { header(buffer) } {
    Some(header) => layout::read_capacity(header),
    None => 0,
  }
}

/// Pointer to the first data byte, or null for a null descriptor.
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn data(buffer: *mut u8) -> *mut u8 {
  if buffer.is_null() {
    return ptr::null_mut();
  }
  unsafe { buffer.add(HEADER_LEN) }
}

/// Const flavour of [`data`].
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn data_const(buffer: *const u8) -> *const u8 {
  if buffer.is_null() {
    return ptr::null();
  }
  unsafe { buffer.add(HEADER_LEN) }
}

unsafe fn header<'a>(buffer: *const u8) -> Option<&'a [u8]> {
  if buffer.is_null() {
    return None;
  }
  Some(unsafe { slice::from_raw_parts(buffer, HEADER_LEN) })
}

/// Shared view of the whole buffer, sized from the header.
unsafe fn view<'a>(buffer: *const u8) -> Result<AnsiStr<'a>> {
  let Some(header) = (unsafe { header(buffer) }) else {
    return Err(Error::DataInvalid);
  };
  let capacity = layout::read_capacity(header);
  if capacity > MAX_CAPACITY {
    return Err(Error::CapacityInvalid);
  }
  let len = capacity + MIN_BUFFER_LEN;
  Ok(AnsiStr::from_buffer(unsafe { slice::from_raw_parts(buffer, len) }))
}

unsafe fn items<'a>(items: *const u8, count: usize) -> Result<&'a [u8]> {
  if items.is_null() {
    return Err(Error::ItemsInvalid);
  }
  Ok(unsafe { slice::from_raw_parts(items, count) })
}

/// Like [`items`], but a null pointer is accepted for an empty region.
unsafe fn optional_items<'a>(
  items: *const u8,
  count: usize,
) -> Result<&'a [u8]> {
  if items.is_null() && count == 0 {
    return Ok(&[]);
  }
  unsafe { self::items(items, count) }
}

/// Runs `edit` on the data window sized by `plan`, then stores the new size.
///
/// The caller has proven that no input region overlaps the header or
/// `data[..=plan.reach]`.
unsafe fn commit(
  buffer: *mut u8,
  plan: Plan,
  edit: impl FnOnce(&mut [u8]) -> usize,
) {
  let window = unsafe {
    slice::from_raw_parts_mut(buffer.add(HEADER_LEN), plan.reach + 1)
  };
  let size = edit(window);
  let header = unsafe { slice::from_raw_parts_mut(buffer, HEADER_LEN) };
  layout::write_size(header, size);
}

/// See [`AnsiBuf::insert`].
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn insert(
  _license: &License,
  buffer: *mut u8,
  left: usize,
  items: *const u8,
  count: usize,
) -> Result<()> {
  let s = unsafe { view(buffer)? };
  s.validate_growable()?;
  let items = unsafe { self::items(items, count)? };
  let plan = s.plan_insert(left, items)?;
  unsafe {
    commit(buffer, plan, |window| edit::insert(window, plan.size, left, items))
  };
  Ok(())
}

/// See [`AnsiBuf::remove_from`].
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn remove_from(
  _license: &License,
  buffer: *mut u8,
  left: usize,
  count: usize,
) -> Result<()> {
  let s = unsafe { view(buffer)? };
  let plan = s.plan_remove_from(left, count)?;
  unsafe {
    commit(buffer, plan, |window| {
      edit::remove_range(window, plan.size, left, count)
    })
  };
  Ok(())
}

/// See [`AnsiBuf::remove`].
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn remove(
  _license: &License,
  buffer: *mut u8,
  left: usize,
  right: usize,
  items: *const u8,
  count: usize,
  from_left: bool,
) -> Result<()> {
  let s = unsafe { view(buffer)? };
  s.validate_non_empty()?;
  let items = unsafe { self::items(items, count)? };
  let plan = s.plan_remove(left, right, items)?;
  let direction = Direction::from_left(from_left);
  unsafe {
    commit(buffer, plan, |window| {
      edit::replace(window, plan.size, left, right, items, &[], direction, 0)
    })
  };
  Ok(())
}

/// See [`AnsiBuf::trim_left`].
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn trim_left(
  _license: &License,
  buffer: *mut u8,
  left: usize,
  right: usize,
  items: *const u8,
  count: usize,
) -> Result<()> {
  unsafe { trim_with(buffer, left, right, items, count, edit::trim_left) }
}

/// See [`AnsiBuf::trim_right`].
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn trim_right(
  _license: &License,
  buffer: *mut u8,
  left: usize,
  right: usize,
  items: *const u8,
  count: usize,
) -> Result<()> {
  unsafe { trim_with(buffer, left, right, items, count, edit::trim_right) }
}

/// See [`AnsiBuf::trim`].
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn trim(
  _license: &License,
  buffer: *mut u8,
  left: usize,
  right: usize,
  items: *const u8,
  count: usize,
) -> Result<()> {
  unsafe { trim_with(buffer, left, right, items, count, edit::trim) }
}

unsafe fn trim_with(
  buffer: *mut u8,
  left: usize,
  right: usize,
  items: *const u8,
  count: usize,
  kernel: fn(&mut [u8], usize, usize, usize, &[u8]) -> usize,
) -> Result<()> {
  let s = unsafe { view(buffer)? };
  s.validate_non_empty()?;
  let class = unsafe { self::items(items, count)? };
  let plan = s.plan_trim(left, right, class)?;
  unsafe {
    commit(buffer, plan, |window| {
      kernel(window, plan.size, left, right, class)
    })
  };
  Ok(())
}

/// See [`AnsiBuf::replace`]. `after` may be null when `count_after` is 0.
///
/// # Safety
///
/// See the [module documentation](self).
#[allow(clippy::too_many_arguments)]
pub unsafe fn replace(
  _license: &License,
  buffer: *mut u8,
  left: usize,
  right: usize,
  before: *const u8,
  count_before: usize,
  after: *const u8,
  count_after: usize,
  from_left: bool,
  replace_type: ReplaceType,
) -> Result<()> {
  let s = unsafe { view(buffer)? };
  s.validate_growable()?;
  if s.is_empty() {
    return Err(Error::SizeIsZero);
  }
  let before = unsafe { items(before, count_before)? };
  let after = unsafe { optional_items(after, count_after)? };
  let direction = Direction::from_left(from_left);
  let plan = s.plan_replace(left, right, before, after, direction)?;
  unsafe {
    commit(buffer, plan, |window| match replace_type {
      ReplaceType::Dual => edit::replace(
        window,
        plan.size,
        left,
        right,
        before,
        after,
        direction,
        plan.occurrences,
      ),
    })
  };
  Ok(())
}

/// See [`AnsiBuf::reverse`].
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn reverse(
  _license: &License,
  buffer: *mut u8,
  left: usize,
  right: usize,
) -> Result<()> {
  let s = unsafe { view(buffer)? };
  let plan = s.plan_reverse(left, right)?;
  unsafe {
    commit(buffer, plan, |window| {
      edit::reverse(window, left, right);
      plan.size
    })
  };
  Ok(())
}

/// See [`AnsiStr::find_single`].
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn find_single(
  _license: &License,
  buffer: *const u8,
  left: usize,
  right: usize,
  byte: u8,
) -> Result<Option<usize>> {
  unsafe { view(buffer)? }.find_single(left, right, byte)
}

/// See [`AnsiStr::rfind_single`].
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn rfind_single(
  _license: &License,
  buffer: *const u8,
  left: usize,
  right: usize,
  byte: u8,
) -> Result<Option<usize>> {
  unsafe { view(buffer)? }.rfind_single(left, right, byte)
}

/// Shared prologue of the scans that take an input region.
unsafe fn scan<'a, T>(
  buffer: *const u8,
  items: *const u8,
  count: usize,
  op: impl FnOnce(AnsiStr<'a>, &'a [u8]) -> Result<T>,
) -> Result<T> {
  let s = unsafe { view(buffer)? };
  s.validate()?;
  let items = unsafe { self::items(items, count)? };
  op(s, items)
}

/// See [`AnsiStr::find`].
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn find(
  _license: &License,
  buffer: *const u8,
  left: usize,
  right: usize,
  items: *const u8,
  count: usize,
) -> Result<Option<usize>> {
  unsafe { scan(buffer, items, count, |s, items| s.find(left, right, items)) }
}

/// See [`AnsiStr::rfind`].
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn rfind(
  _license: &License,
  buffer: *const u8,
  left: usize,
  right: usize,
  items: *const u8,
  count: usize,
) -> Result<Option<usize>> {
  unsafe { scan(buffer, items, count, |s, items| s.rfind(left, right, items)) }
}

/// See [`AnsiStr::first_of`].
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn first_of(
  _license: &License,
  buffer: *const u8,
  left: usize,
  right: usize,
  items: *const u8,
  count: usize,
) -> Result<Option<usize>> {
  unsafe {
    scan(buffer, items, count, |s, class| s.first_of(left, right, class))
  }
}

/// See [`AnsiStr::first_not_of`].
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn first_not_of(
  _license: &License,
  buffer: *const u8,
  left: usize,
  right: usize,
  items: *const u8,
  count: usize,
) -> Result<Option<usize>> {
  unsafe {
    scan(buffer, items, count, |s, class| s.first_not_of(left, right, class))
  }
}

/// See [`AnsiStr::last_of`].
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn last_of(
  _license: &License,
  buffer: *const u8,
  left: usize,
  right: usize,
  items: *const u8,
  count: usize,
) -> Result<Option<usize>> {
  unsafe {
    scan(buffer, items, count, |s, class| s.last_of(left, right, class))
  }
}

/// See [`AnsiStr::last_not_of`].
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn last_not_of(
  _license: &License,
  buffer: *const u8,
  left: usize,
  right: usize,
  items: *const u8,
  count: usize,
) -> Result<Option<usize>> {
  unsafe {
    scan(buffer, items, count, |s, class| s.last_not_of(left, right, class))
  }
}

/// See [`AnsiStr::compare`].
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn compare(
  _license: &License,
  buffer: *const u8,
  left: usize,
  items: *const u8,
  count: usize,
  partial: bool,
) -> Result<CompareResult> {
  unsafe {
    scan(buffer, items, count, |s, items| s.compare(left, items, partial))
  }
}

/// See [`AnsiStr::count`].
///
/// # Safety
///
/// See the [module documentation](self).
#[allow(clippy::too_many_arguments)]
pub unsafe fn count(
  _license: &License,
  buffer: *const u8,
  left: usize,
  right: usize,
  items: *const u8,
  count: usize,
  overlapped: bool,
  from_left: bool,
) -> Result<usize> {
  unsafe {
    scan(buffer, items, count, |s, items| {
      s.count(left, right, items, overlapped, from_left)
    })
  }
}
