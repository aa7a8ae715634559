//! # ansibuf
//!
//! ### Fixed-capacity byte strings in caller-owned buffers
//!
//! This crate manages a single-byte ("ANSI") string that lives entirely
//! inside a byte buffer the caller provides: a static array, a stack array,
//! a region of shared memory. Nothing here ever allocates. The buffer starts
//! with a small header recording the current size and the fixed capacity,
//! followed by the data and one terminator byte, so the string can be handed
//! to C code as a plain NUL-terminated pointer at any time.
//!
//! ---
//!
//! ## [`AnsiBuf`] and [`AnsiStr`]
//!
//! [`AnsiBuf`] is the mutable descriptor: insert, remove, trim, replace and
//! reverse, plus every scan. [`AnsiStr`] is the read-only view of the same
//! layout. Both re-read the header on every call, so a buffer attached once
//! can be detached, stored, and restored later.
//!
//! Every operation validates all of its inputs first. A call that returns
//! an [`Error`] has not written a single byte.
//!
//! ### Example
//!
//! ```rust
//! use ansibuf::{AnsiBuf, AttachMode, License, LicenseKey, ReplaceType};
//!
//! # fn main() -> Result<(), ansibuf::Error> {
//! let license = License::init(&|_: &LicenseKey| true, &LicenseKey::default())?;
//! let mut storage = [0u8; 32];
//! let mut s = AnsiBuf::attach(&license, &mut storage, AttachMode::Clear)?;
//!
//! s.insert(0, b"key=value")?;
//! let eq = s.find_single(0, s.size() - 1, b'=')?;
//! assert_eq!(eq, Some(3));
//!
//! s.replace(0, s.size() - 1, b"=", b" := ", true, ReplaceType::Dual)?;
//! assert_eq!(s, "key := value");
//! # Ok(())
//! # }
//! ```
//!
//! ## [`License`]
//!
//! Every entry point takes a `&License`. A license is only obtainable from
//! [`License::init`], which asks an [`Entitlement`] to verify a
//! [`LicenseKey`]; holding one is proof the check passed.
//!
//! ## Ranges
//!
//! Positions are data-relative and ranges are inclusive: `[left, right]`
//! addresses `data[left..=right]`. Searches return positions relative to the
//! start of the data, not to `left`.
//!
//! ---
//!
//! ## `no_std` Support
//!
//! The crate is `no_std` unless the `std` feature is enabled.
//!
//! ---
//!
//! ## Features
//!
//! - `std`: Enables integration with the Rust standard library. When disabled,
//!   the crate operates in `no_std` mode.
//! - `serde`†: Serialization support via Serde.
//! - `is_variant`†: `is_*` predicates on the public enums.
//! - `constructors`†: Derived `new` constructor for [`LicenseKey`].
//! - `raw`†: The pointer-based [`raw`] module.
//!
//! > † enabled by default

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate core;

pub mod ansi_buf;
pub mod ansi_str;
pub mod error;
pub mod layout;
pub mod license;
#[cfg(feature = "raw")]
pub mod raw;
pub mod region;
pub mod search;

mod edit;

pub use ansi_buf::AnsiBuf;
pub use ansi_buf::ReplaceType;
pub use ansi_str::AnsiStr;
pub use ansi_str::CompareResult;
pub use error::Error;
pub use error::Result;
pub use layout::AttachMode;
pub use license::Entitlement;
pub use license::License;
pub use license::LicenseKey;
pub use region::Region;
