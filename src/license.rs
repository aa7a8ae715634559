//! One-time entitlement gate.
//!
//! The decision whether a key is acceptable belongs to the host application
//! and is supplied through the [`Entitlement`] trait. A successful
//! [`License::init`] yields a [`License`] token, and every attachment requires
//! a reference to one, so no descriptor can be created without passing the
//! gate first.

use crate::error::Error;
use crate::error::Result;

/// Identity and license material presented to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "constructors", derive(derive_more::Constructor))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LicenseKey {
  pub first_name_hash: u32,
  pub last_name_hash:  u32,
  pub email_hash:      u32,
  pub license_hash:    u32,
}

impl LicenseKey {
  /// Creates a new `LicenseKey`.
  #[cfg(not(feature = "constructors"))]
  pub const fn new(
    first_name_hash: u32,
    last_name_hash: u32,
    email_hash: u32,
    license_hash: u32,
  ) -> Self {
    Self {
      first_name_hash,
      last_name_hash,
      email_hash,
      license_hash,
    }
  }
}

/// Decides whether a [`LicenseKey`] grants access.
///
/// Implemented for any `Fn(&LicenseKey) -> bool`, so a closure is enough for
/// simple hosts.
pub trait Entitlement {
  fn verify(&self, key: &LicenseKey) -> bool;
}

impl<F> Entitlement for F
where
  F: Fn(&LicenseKey) -> bool,
{
  #[inline]
  fn verify(&self, key: &LicenseKey) -> bool {
    self(key)
  }
}

/// Proof that the entitlement gate has been passed.
///
/// # Example
///
/// ```rust
/// use ansibuf::{Error, License, LicenseKey};
///
/// let key = LicenseKey::new(0x11, 0x22, 0x33, 0x66);
/// let sums_match = |k: &LicenseKey| {
///   k.first_name_hash + k.last_name_hash + k.email_hash == k.license_hash
/// };
///
/// assert!(License::init(&sums_match, &key).is_ok());
/// let forged = LicenseKey::new(0x11, 0x22, 0x33, 0x00);
/// assert_eq!(License::init(&sums_match, &forged), Err(Error::LicenseInvalid));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct License {
  key: LicenseKey,
}

impl License {
  /// Runs the gate once and returns the token on success.
  pub fn init<E>(entitlement: &E, key: &LicenseKey) -> Result<Self>
  where
    E: Entitlement + ?Sized,
  {
    if entitlement.verify(key) {
      log::debug!("license accepted");
      Ok(Self { key: *key })
    } else {
      log::debug!("license rejected");
      Err(Error::LicenseInvalid)
    }
  }

  /// The key this token was issued for.
  #[inline]
  pub const fn key(&self) -> &LicenseKey {
    &self.key
  }
}

/// Token used by unit tests across the crate.
#[cfg(test)]
pub(crate) fn test_license() -> License {
  License::init(&|_: &LicenseKey| true, &LicenseKey::default())
    .expect("permissive entitlement")
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Allowlist(&'static [u32]);

  impl Entitlement for Allowlist {
    fn verify(&self, key: &LicenseKey) -> bool {
      self.0.contains(&key.license_hash)
    }
  }

  #[test]
  fn trait_object_entitlement() {
    let gate: &dyn Entitlement = &Allowlist(&[7, 9]);
    let ok = License::init(gate, &LicenseKey::new(1, 2, 3, 9)).unwrap();
    assert_eq!(ok.key().license_hash, 9);
    assert_eq!(
      License::init(gate, &LicenseKey::new(1, 2, 3, 8)),
      Err(Error::LicenseInvalid)
    );
  }

  #[test]
  fn closure_entitlement_sees_the_key() {
    let key = LicenseKey::new(10, 20, 30, 40);
    let gate = |k: &LicenseKey| k.email_hash == 30;
    assert!(License::init(&gate, &key).is_ok());
    assert!(License::init(&gate, &LicenseKey::default()).is_err());
  }

  #[test]
  #[cfg(feature = "serde")]
  fn license_key_round_trips_through_json() {
    let key = LicenseKey::new(1, 2, 3, 4);
    let json = serde_json::to_string(&key).unwrap();
    assert_eq!(
      json,
      r#"{"first_name_hash":1,"last_name_hash":2,"email_hash":3,"license_hash":4}"#
    );
  }
}
