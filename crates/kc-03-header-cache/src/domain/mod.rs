//! # Domain Layer
//!
//! - `window` - contiguous in-memory run of headers
//! - `errors` - cache and store errors

pub mod errors;
pub mod window;

pub use errors::{CacheError, StoreError};
pub use window::{check_contiguous, HeaderWindow};
