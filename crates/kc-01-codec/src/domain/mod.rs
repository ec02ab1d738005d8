//! # Domain Layer
//!
//! Pure codec logic with no I/O.
//!
//! ## Modules
//!
//! - `schema` - Field model, validation, JSON-schema loading
//! - `value` - Dynamic values checked against a schema
//! - `varint` - LEB128 varints and zigzag mapping
//! - `wire` - Wire types and field keys
//! - `errors` - Schema, encoding and decoding errors

pub mod errors;
pub mod schema;
pub mod value;
pub mod varint;
pub mod wire;
