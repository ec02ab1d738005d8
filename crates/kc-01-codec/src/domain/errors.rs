//! # Domain Errors
//!
//! Every failure is fatal to the single encode or decode call that raised
//! it; no partially written buffer or partially decoded value escapes.

use thiserror::Error;

/// Malformed schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Field number outside `1..=MAX_FIELD_NUMBER`.
    #[error("Invalid field number {field_number} for property '{name}' (must be 1..={max})")]
    InvalidFieldNumber {
        /// Property name.
        name: String,
        /// Offending field number.
        field_number: u32,
        /// Largest allowed field number.
        max: u32,
    },

    /// Two properties share a field number.
    #[error("Duplicate field number {field_number} for properties '{first}' and '{second}'")]
    DuplicateFieldNumber {
        /// Shared field number.
        field_number: u32,
        /// First property using it.
        first: String,
        /// Second property using it.
        second: String,
    },

    /// Two properties share a name.
    #[error("Duplicate property name '{0}'")]
    DuplicatePropertyName(String),

    /// Property name is empty.
    #[error("Property name must not be empty")]
    EmptyPropertyName,

    /// Array items are themselves arrays.
    #[error("Nested arrays are not supported (property '{0}')")]
    NestedArray(String),

    /// Property missing from the `required` list of a JSON schema.
    #[error("Property '{0}' is not listed as required")]
    NotRequired(String),

    /// `dataType` is not one of the supported scalar types.
    #[error("Unknown data type '{data_type}' for property '{name}'")]
    UnknownDataType {
        /// Property name.
        name: String,
        /// Unrecognised data type.
        data_type: String,
    },

    /// JSON schema document does not have the expected shape.
    #[error("Malformed schema: {0}")]
    Malformed(String),
}

/// Value does not match its schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// Schema property absent from the value.
    #[error("Missing property '{0}'")]
    MissingProperty(String),

    /// Value property absent from the schema.
    #[error("Unknown property '{0}'")]
    UnknownProperty(String),

    /// Value variant does not match the declared data type.
    #[error("Type mismatch for '{path}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Dotted path to the property.
        path: String,
        /// Declared type.
        expected: &'static str,
        /// Supplied value kind.
        actual: &'static str,
    },

    /// Number does not fit the declared data type.
    #[error("Value out of range for '{path}': {value} does not fit {data_type}")]
    OutOfRange {
        /// Dotted path to the property.
        path: String,
        /// Supplied value as text.
        value: String,
        /// Declared type.
        data_type: &'static str,
    },

    /// JSON value cannot be converted.
    #[error("Invalid JSON for '{path}': {reason}")]
    InvalidJson {
        /// Dotted path to the property.
        path: String,
        /// Why the conversion failed.
        reason: String,
    },
}

/// Buffer does not hold a canonical encoding for the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodingError {
    /// Buffer ended in the middle of a key or payload.
    #[error("Unexpected end of buffer at offset {offset}")]
    UnexpectedEof {
        /// Absolute offset of the truncated read.
        offset: usize,
    },

    /// Varint is overlong, overflows 64 bits or is not minimal.
    #[error("Invalid varint at offset {offset}: {reason}")]
    InvalidVarint {
        /// Absolute offset of the first varint byte.
        offset: usize,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Wire type tag other than 0 or 2.
    #[error("Invalid wire type {wire_type} at offset {offset}")]
    InvalidWireType {
        /// Tag found in the key.
        wire_type: u8,
        /// Absolute offset of the key.
        offset: usize,
    },

    /// Field number not present in the schema.
    #[error("Unknown field number {field_number} at offset {offset}")]
    UnknownField {
        /// Field number found in the key.
        field_number: u32,
        /// Absolute offset of the key.
        offset: usize,
    },

    /// Field number not greater than the previous one.
    #[error("Field {field_number} at offset {offset} is out of order (previous field {previous})")]
    OutOfOrder {
        /// Field number found in the key.
        field_number: u32,
        /// Previous field number.
        previous: u32,
        /// Absolute offset of the key.
        offset: usize,
    },

    /// Wire type does not match the schema's data type.
    #[error("Wire type mismatch for field {field_number}: expected {expected}, got {actual}")]
    WireTypeMismatch {
        /// Field number.
        field_number: u32,
        /// Wire type implied by the schema.
        expected: u8,
        /// Wire type found in the key.
        actual: u8,
    },

    /// Required property never appeared.
    #[error("Missing field '{0}'")]
    MissingField(String),

    /// Number does not fit the declared 32-bit type.
    #[error("Value out of range for field '{0}'")]
    OutOfRange(String),

    /// Boolean payload other than 0x00 or 0x01.
    #[error("Invalid boolean byte 0x{byte:02x} at offset {offset}")]
    InvalidBoolean {
        /// Byte found.
        byte: u8,
        /// Absolute offset.
        offset: usize,
    },

    /// String payload is not UTF-8.
    #[error("Invalid UTF-8 in field '{0}'")]
    InvalidUtf8(String),

    /// Packed array field with a zero-length payload.
    #[error("Empty packed array for field '{0}'")]
    EmptyPackedArray(String),

    /// Array whose items are arrays.
    #[error("Nested arrays are not supported (field '{0}')")]
    NestedArray(String),
}

/// Top-level codec error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Malformed schema.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Value does not match the schema.
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Buffer does not match the schema.
    #[error("Decoding error: {0}")]
    Decoding(#[from] DecodingError),
}
