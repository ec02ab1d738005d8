//! Inbound Ports (Driving Ports)
//!
//! API that storage, networking and hashing code use to turn chain objects
//! into canonical bytes and back.

use crate::domain::errors::CodecError;
use crate::domain::schema::Schema;
use crate::domain::value::Object;

/// Schema-driven codec (Driving Port).
///
/// Implementations hold no mutable state and may be shared freely across
/// threads.
pub trait CodecApi: Send + Sync {
    /// Encode `value` under `schema` into canonical bytes.
    fn encode(&self, schema: &Schema, value: &Object) -> Result<Vec<u8>, CodecError>;

    /// Decode a whole buffer under `schema`.
    fn decode(&self, schema: &Schema, bytes: &[u8]) -> Result<Object, CodecError>;

    /// JSON view of a value: 64-bit integers as decimal strings, bytes as hex.
    fn to_json(&self, schema: &Schema, value: &Object) -> Result<serde_json::Value, CodecError>;

    /// Parse the JSON view back into a value.
    fn from_json(&self, schema: &Schema, json: &serde_json::Value) -> Result<Object, CodecError>;
}
