//! # Binary Codec (kc-01)
//!
//! Schema-driven, deterministic binary encoding for chain objects (blocks,
//! transactions, accounts). Encoded bytes feed directly into the SHA-256
//! digests that identify blocks and transactions, so for a given
//! `(schema, value)` pair the output is byte-identical on every node.
//!
//! ## Wire Format
//!
//! ```text
//! field   := key payload
//! key     := varint((field_number << 3) | wire_type)      wire_type ∈ {0, 2}
//! payload := varint                                       uint32 / uint64
//!          | varint(zigzag(n))                            sint32 / sint64
//!          | 0x00 | 0x01                                  boolean
//!          | varint(len) bytes                            string / bytes / object
//!          | varint(len) varint*                          packed numeric array
//! ```
//!
//! Fields are always emitted in ascending field-number order. Arrays of
//! strings, bytes or objects repeat the key once per item; empty arrays are
//! omitted entirely.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Determinism | Same schema and value always yield the same bytes |
//! | 2 | Ascending Fields | Encoder emits and decoder requires ascending field numbers |
//! | 3 | Canonical Varints | Non-minimal varints are rejected on decode |
//! | 4 | No Partial Output | A failed encode or decode returns no buffer or value |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Schema model, values, varint and wire primitives, errors
//! - `ports/` - `CodecApi` driving port
//! - `service/` - Encoder, decoder, JSON view, `BinaryCodec`
//!
//! ## Usage
//!
//! ```rust
//! use kc_01_codec::{decode, encode, DataType, Object, Schema, SchemaField, Value};
//!
//! let schema = Schema::new(vec![
//!     SchemaField::scalar("nonce", 1, DataType::Uint64),
//!     SchemaField::scalar("memo", 2, DataType::String),
//! ])
//! .unwrap();
//!
//! let mut value = Object::new();
//! value.insert("nonce".into(), Value::Uint64(7));
//! value.insert("memo".into(), Value::from("hi"));
//!
//! let bytes = encode(&schema, &value).unwrap();
//! assert_eq!(bytes, vec![0x08, 0x07, 0x12, 0x02, b'h', b'i']);
//! assert_eq!(decode(&schema, &bytes).unwrap(), value);
//! ```

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::errors::{CodecError, DecodingError, EncodingError, SchemaError};
pub use domain::schema::{DataType, FieldType, Schema, SchemaField, MAX_FIELD_NUMBER};
pub use domain::value::{Object, Value};
pub use domain::wire::WireType;
pub use ports::inbound::CodecApi;
pub use service::{decode, decode_with, encode, from_json, to_json, BinaryCodec, DecodeOptions};
