//! Buffer layout shared by every descriptor.
//!
//! A buffer starts with a 4-byte header holding the size and the capacity as
//! little-endian `u16` values, followed by the data region and one terminator
//! slot:
//!
//! ```text
//! [size: u16][capacity: u16][data: capacity bytes][0]
//! ```

use crate::error::Error;
use crate::error::Result;

/// Bytes reserved in front of the data region.
pub const HEADER_LEN: usize = 4;

/// Value stored at `data[size]`.
pub const TERMINATOR: u8 = 0;

/// Smallest buffer that can be attached; its capacity is 0.
pub const MIN_BUFFER_LEN: usize = HEADER_LEN + 1;

/// Largest buffer the 16-bit header can describe.
pub const MAX_BUFFER_LEN: usize = u16::MAX as usize;

/// Capacity ceiling. Kept below `u16::MAX` so that the size plus header and
/// terminator always fits the 16-bit size class.
pub const MAX_CAPACITY: usize = MAX_BUFFER_LEN - MIN_BUFFER_LEN;

const SIZE_AT: usize = 0;
const CAPACITY_AT: usize = 2;

/// How [`AnsiBuf::attach`](crate::AnsiBuf::attach) treats the existing
/// buffer contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "is_variant", derive(derive_more::IsVariant))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttachMode {
  /// Start with an empty string.
  #[default]
  Clear,
  /// The first `n` data bytes already hold the string contents.
  Sized(usize),
  /// Reuse the header written by an earlier attachment.
  Restore,
}

#[inline]
pub(crate) fn read_size(buf: &[u8]) -> usize {
  u16::from_le_bytes([buf[SIZE_AT], buf[SIZE_AT + 1]]) as usize
}

#[inline]
pub(crate) fn read_capacity(buf: &[u8]) -> usize {
  u16::from_le_bytes([buf[CAPACITY_AT], buf[CAPACITY_AT + 1]]) as usize
}

/// Stores `size`. Callers guarantee `size <= MAX_CAPACITY`.
#[inline]
pub(crate) fn write_size(buf: &mut [u8], size: usize) {
  buf[SIZE_AT..SIZE_AT + 2].copy_from_slice(&(size as u16).to_le_bytes());
}

#[inline]
pub(crate) fn write_capacity(buf: &mut [u8], capacity: usize) {
  buf[CAPACITY_AT..CAPACITY_AT + 2]
    .copy_from_slice(&(capacity as u16).to_le_bytes());
}

/// Checks the raw buffer length and returns the capacity it provides.
pub(crate) fn capacity_for(len: usize) -> Result<usize> {
  if len == 0 {
    return Err(Error::DataInvalid);
  }
  if len < MIN_BUFFER_LEN {
    return Err(Error::CapacityTooSmall);
  }
  if len > MAX_BUFFER_LEN {
    return Err(Error::CapacityInvalid);
  }
  Ok(len - MIN_BUFFER_LEN)
}

/// Prepares `buf` according to `mode` and writes header and terminator.
///
/// Nothing is written when an error is returned.
pub(crate) fn attach(buf: &mut [u8], mode: AttachMode) -> Result<()> {
  let capacity = capacity_for(buf.len())?;
  match mode {
    AttachMode::Clear => init(buf, capacity, 0),
    AttachMode::Sized(size) if size > capacity => {
      Err(Error::SizeExceedsCapacity)
    }
    AttachMode::Sized(size) => init(buf, capacity, size),
    AttachMode::Restore => restore(buf).map(|_| ()),
  }
}

fn init(buf: &mut [u8], capacity: usize, size: usize) -> Result<()> {
  write_size(buf, size);
  write_capacity(buf, capacity);
  buf[HEADER_LEN + size] = TERMINATOR;
  Ok(())
}

/// Validates a header left by an earlier attachment. Returns
/// `(size, capacity)`.
pub(crate) fn restore(buf: &[u8]) -> Result<(usize, usize)> {
  let available = capacity_for(buf.len())?;
  let capacity = read_capacity(buf);
  if capacity > available {
    return Err(Error::CapacityInvalid);
  }
  let size = read_size(buf);
  if size > capacity {
    return Err(Error::SizeExceedsCapacity);
  }
  if buf[HEADER_LEN + size] != TERMINATOR {
    return Err(Error::TerminatorMissing);
  }
  Ok((size, capacity))
}
