//! # Service Layer
//!
//! Entry points over the encoder, decoder and JSON view, plus `BinaryCodec`,
//! the `CodecApi` implementation handed to other subsystems.

mod decoder;
mod encoder;
mod json;


pub use decoder::DecodeOptions;

use crate::domain::errors::CodecError;
use crate::domain::schema::Schema;
use crate::domain::value::Object;
use crate::ports::inbound::CodecApi;

/// Encode `value` under `schema`.
///
/// Output is canonical: fields in ascending field-number order, minimal
/// varints, empty arrays omitted.
pub fn encode(schema: &Schema, value: &Object) -> Result<Vec<u8>, CodecError> {
    Ok(encoder::encode_object(schema, value)?)
}

/// Decode `bytes` under `schema`, rejecting unknown fields.
pub fn decode(schema: &Schema, bytes: &[u8]) -> Result<Object, CodecError> {
    decode_with(schema, bytes, DecodeOptions::strict())
}

/// Decode `bytes` under `schema` with explicit options.
pub fn decode_with(
    schema: &Schema,
    bytes: &[u8],
    options: DecodeOptions,
) -> Result<Object, CodecError> {
    Ok(decoder::decode_object(schema, bytes, options)?)
}

/// JSON view of `value`.
pub fn to_json(schema: &Schema, value: &Object) -> Result<serde_json::Value, CodecError> {
    Ok(json::object_to_json(schema, value)?)
}

/// Parse the JSON view of a value.
pub fn from_json(schema: &Schema, json: &serde_json::Value) -> Result<Object, CodecError> {
    Ok(json::object_from_json(schema, json)?)
}

/// Stateless codec configured with decode options.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec {
    options: DecodeOptions,
}

impl BinaryCodec {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> DecodeOptions {
        self.options
    }
}

impl CodecApi for BinaryCodec {
    fn encode(&self, schema: &Schema, value: &Object) -> Result<Vec<u8>, CodecError> {
        encode(schema, value)
    }

    fn decode(&self, schema: &Schema, bytes: &[u8]) -> Result<Object, CodecError> {
        decode_with(schema, bytes, self.options)
    }

    fn to_json(&self, schema: &Schema, value: &Object) -> Result<serde_json::Value, CodecError> {
        to_json(schema, value)
    }

    fn from_json(&self, schema: &Schema, json: &serde_json::Value) -> Result<Object, CodecError> {
        from_json(schema, json)
    }
}
