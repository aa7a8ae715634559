//! Error taxonomy shared by every attachment, scan, and mutation.
//!
//! Each variant names exactly one violated precondition. Operations check
//! their preconditions in a fixed order and report the first one that fails,
//! so a given bad call always produces the same error.

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Enumerated failure outcomes.
///
/// # Example
///
/// ```rust
/// use ansibuf::{AnsiBuf, AttachMode, Error, License, LicenseKey};
///
/// # fn main() -> Result<(), Error> {
/// let license = License::init(&|_: &LicenseKey| true, &LicenseKey::new(1, 2, 3, 4))?;
/// let mut buf = [0u8; 4];
/// let err = AnsiBuf::attach(&license, &mut buf, AttachMode::Clear).unwrap_err();
/// assert_eq!(err, Error::CapacityTooSmall);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(derive_more::Display, derive_more::Error)]
#[cfg_attr(feature = "is_variant", derive(derive_more::IsVariant))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
  /// The entitlement check rejected the supplied license key.
  #[display("license is not initialized or invalid")]
  LicenseInvalid,
  /// The buffer (or raw descriptor pointer) is absent.
  #[display("buffer is null or empty")]
  DataInvalid,
  /// Capacity is zero where growth is required, or exceeds the ceiling.
  #[display("capacity is zero or exceeds the supported maximum")]
  CapacityInvalid,
  /// The buffer cannot hold the header and the terminator.
  #[display("buffer is too small to hold the header and terminator")]
  CapacityTooSmall,
  /// The stored size is larger than the stored capacity.
  #[display("size exceeds capacity")]
  SizeExceedsCapacity,
  /// The byte at `data[size]` is not the terminator.
  #[display("terminator is missing at data[size]")]
  TerminatorMissing,
  /// A required input region is null.
  #[display("items pointer is null")]
  ItemsInvalid,
  /// An input region has zero length where at least one byte is required.
  #[display("count is zero")]
  CountIsZero,
  /// The operation requires a non-empty string.
  #[display("string is empty")]
  SizeIsZero,
  /// The left position is past its allowed bound.
  #[display("left position is too large")]
  RangeLeftTooLarge,
  /// The right position is at or past the string size.
  #[display("right position is too large")]
  RangeRightTooLarge,
  /// The count does not fit the addressed range or the capacity.
  #[display("count is too large for the range")]
  RangeCountTooLarge,
  /// An input region overlaps the destination buffer.
  #[display("input region overlaps the string buffer")]
  RegionsOverlap,
  /// The size after replacement would exceed the capacity.
  #[display("replacement result exceeds capacity")]
  ReplacementTooLarge,
  /// An input region overlaps the buffer span used after replacement.
  #[display("input region overlaps the buffer after replacement")]
  ReplacementOverlap,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_is_human_readable() {
    assert_eq!(Error::SizeIsZero.to_string(), "string is empty");
    assert_eq!(
      Error::ReplacementTooLarge.to_string(),
      "replacement result exceeds capacity"
    );
  }

  #[test]
  fn implements_core_error() {
    fn assert_error<E: core::error::Error>(_: &E) {}
    assert_error(&Error::RegionsOverlap);
  }

  #[test]
  #[cfg(feature = "is_variant")]
  fn variant_predicates() {
    assert!(Error::TerminatorMissing.is_terminator_missing());
    assert!(!Error::TerminatorMissing.is_count_is_zero());
  }

  #[test]
  #[cfg(feature = "serde")]
  fn serde_uses_variant_names() {
    let json = serde_json::to_string(&Error::RangeLeftTooLarge).unwrap();
    assert_eq!(json, "\"RangeLeftTooLarge\"");
    let back: Error = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Error::RangeLeftTooLarge);
  }
}
