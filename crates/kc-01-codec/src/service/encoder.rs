//! Canonical encoder.
//!
//! Walks the schema (already sorted by field number) rather than the value,
//! so property insertion order never reaches the output.

use crate::domain::errors::EncodingError;
use crate::domain::schema::{DataType, FieldType, Schema, SchemaField};
use crate::domain::value::{Object, Value};
use crate::domain::varint::{write_uvarint, zigzag_encode_32, zigzag_encode_64};
use crate::domain::wire::{make_key, WireType};

/// Encode a top-level object.
pub(crate) fn encode_object(schema: &Schema, value: &Object) -> Result<Vec<u8>, EncodingError> {
    let mut out = Vec::new();
    write_object(schema, value, "", &mut out)?;
    Ok(out)
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn write_object(
    schema: &Schema,
    value: &Object,
    path: &str,
    out: &mut Vec<u8>,
) -> Result<(), EncodingError> {
    if let Some(unknown) = value.keys().find(|k| schema.field_by_name(k).is_none()) {
        return Err(EncodingError::UnknownProperty(join(path, unknown)));
    }

    for field in schema.fields() {
        let field_path = join(path, &field.name);
        let field_value = value
            .get(&field.name)
            .ok_or_else(|| EncodingError::MissingProperty(field_path.clone()))?;
        write_field(field, field_value, &field_path, out)?;
    }
    Ok(())
}

fn write_field(
    field: &SchemaField,
    value: &Value,
    path: &str,
    out: &mut Vec<u8>,
) -> Result<(), EncodingError> {
    match &field.field_type {
        FieldType::Scalar(data_type) => {
            write_uvarint(out, make_key(field.field_number, data_type.wire_type()));
            write_scalar(*data_type, value, path, out)
        }
        FieldType::Object(schema) => {
            let nested = expect_object(value, path)?;
            let mut body = Vec::new();
            write_object(schema, nested, path, &mut body)?;
            write_uvarint(out, make_key(field.field_number, WireType::LengthDelimited));
            write_length_delimited(out, &body);
            Ok(())
        }
        FieldType::Array(item) => {
            let items = match value {
                Value::Array(items) => items,
                other => return Err(mismatch(path, "array", other)),
            };
            if items.is_empty() {
                return Ok(());
            }
            let key = make_key(field.field_number, WireType::LengthDelimited);
            match item.as_ref() {
                FieldType::Scalar(data_type) if data_type.is_packable() => {
                    let mut body = Vec::new();
                    for (idx, item_value) in items.iter().enumerate() {
                        write_scalar(*data_type, item_value, &format!("{path}[{idx}]"), &mut body)?;
                    }
                    write_uvarint(out, key);
                    write_length_delimited(out, &body);
                }
                FieldType::Scalar(data_type) => {
                    for (idx, item_value) in items.iter().enumerate() {
                        write_uvarint(out, key);
                        write_scalar(*data_type, item_value, &format!("{path}[{idx}]"), out)?;
                    }
                }
                FieldType::Object(schema) => {
                    for (idx, item_value) in items.iter().enumerate() {
                        let item_path = format!("{path}[{idx}]");
                        let nested = expect_object(item_value, &item_path)?;
                        let mut body = Vec::new();
                        write_object(schema, nested, &item_path, &mut body)?;
                        write_uvarint(out, key);
                        write_length_delimited(out, &body);
                    }
                }
                FieldType::Array(_) => {
                    return Err(EncodingError::TypeMismatch {
                        path: path.to_string(),
                        expected: "array of scalars or objects",
                        actual: "array of arrays",
                    })
                }
            }
            Ok(())
        }
    }
}

/// Write a scalar payload, without its key.
fn write_scalar(
    data_type: DataType,
    value: &Value,
    path: &str,
    out: &mut Vec<u8>,
) -> Result<(), EncodingError> {
    match (data_type, value) {
        (DataType::Uint32, Value::Uint32(v)) => write_uvarint(out, u64::from(*v)),
        (DataType::Uint64, Value::Uint64(v)) => write_uvarint(out, *v),
        (DataType::Sint32, Value::Sint32(v)) => write_uvarint(out, u64::from(zigzag_encode_32(*v))),
        (DataType::Sint64, Value::Sint64(v)) => write_uvarint(out, zigzag_encode_64(*v)),
        (DataType::Boolean, Value::Boolean(v)) => out.push(u8::from(*v)),
        (DataType::String, Value::String(v)) => write_length_delimited(out, v.as_bytes()),
        (DataType::Bytes, Value::Bytes(v)) => write_length_delimited(out, v),
        (expected, other) => return Err(mismatch(path, expected.name(), other)),
    }
    Ok(())
}

fn write_length_delimited(out: &mut Vec<u8>, body: &[u8]) {
    write_uvarint(out, body.len() as u64);
    out.extend_from_slice(body);
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Object, EncodingError> {
    match value {
        Value::Object(object) => Ok(object),
        other => Err(mismatch(path, "object", other)),
    }
}

fn mismatch(path: &str, expected: &'static str, actual: &Value) -> EncodingError {
    EncodingError::TypeMismatch {
        path: path.to_string(),
        expected,
        actual: actual.kind_name(),
    }
}
