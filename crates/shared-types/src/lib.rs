//! # Shared Types Crate
//!
//! Chain entities used by more than one subsystem crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `BlockHeader` is defined once and shared by
//!   the header cache (kc-03) and the serialization adapter (kc-04).
//! - **JSON-safe by construction**: 64-bit integers serialize as decimal
//!   strings and byte fields as lowercase hex, so the JSON view never loses
//!   precision in consumers that parse numbers as doubles.

pub mod entities;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use entities::*;
