//! JSON view of codec values.
//!
//! `uint64` and `sint64` travel as decimal strings so JSON consumers that
//! parse numbers as doubles never lose precision. Bytes travel as lowercase
//! hex. Everything else maps to its natural JSON type.

use std::num::IntErrorKind;

use serde_json::{Map, Number, Value as Json};

use crate::domain::errors::EncodingError;
use crate::domain::schema::{DataType, FieldType, Schema};
use crate::domain::value::{Object, Value};

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

pub(crate) fn object_to_json(schema: &Schema, value: &Object) -> Result<Json, EncodingError> {
    write_object(schema, value, "")
}

pub(crate) fn object_from_json(schema: &Schema, json: &Json) -> Result<Object, EncodingError> {
    read_object(schema, json, "")
}

fn write_object(schema: &Schema, value: &Object, path: &str) -> Result<Json, EncodingError> {
    if let Some(unknown) = value.keys().find(|k| schema.field_by_name(k).is_none()) {
        return Err(EncodingError::UnknownProperty(join(path, unknown)));
    }
    let mut map = Map::new();
    for field in schema.fields() {
        let field_path = join(path, &field.name);
        let field_value = value
            .get(&field.name)
            .ok_or_else(|| EncodingError::MissingProperty(field_path.clone()))?;
        map.insert(
            field.name.clone(),
            write_value(&field.field_type, field_value, &field_path)?,
        );
    }
    Ok(Json::Object(map))
}

fn write_value(field_type: &FieldType, value: &Value, path: &str) -> Result<Json, EncodingError> {
    match (field_type, value) {
        (FieldType::Scalar(data_type), _) => write_scalar(*data_type, value, path),
        (FieldType::Object(schema), Value::Object(object)) => write_object(schema, object, path),
        (FieldType::Array(item), Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(idx, v)| write_value(item, v, &format!("{path}[{idx}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Json::Array),
        (FieldType::Object(_), other) => Err(mismatch(path, "object", other.kind_name())),
        (FieldType::Array(_), other) => Err(mismatch(path, "array", other.kind_name())),
    }
}

fn write_scalar(data_type: DataType, value: &Value, path: &str) -> Result<Json, EncodingError> {
    let json = match (data_type, value) {
        (DataType::Uint32, Value::Uint32(v)) => Json::from(*v),
        (DataType::Sint32, Value::Sint32(v)) => Json::from(*v),
        (DataType::Uint64, Value::Uint64(v)) => Json::String(v.to_string()),
        (DataType::Sint64, Value::Sint64(v)) => Json::String(v.to_string()),
        (DataType::Boolean, Value::Boolean(v)) => Json::Bool(*v),
        (DataType::String, Value::String(v)) => Json::String(v.clone()),
        (DataType::Bytes, Value::Bytes(v)) => Json::String(hex::encode(v)),
        (expected, other) => return Err(mismatch(path, expected.name(), other.kind_name())),
    };
    Ok(json)
}

fn read_object(schema: &Schema, json: &Json, path: &str) -> Result<Object, EncodingError> {
    let map = json
        .as_object()
        .ok_or_else(|| mismatch(path, "object", json_kind(json)))?;
    if let Some(unknown) = map.keys().find(|k| schema.field_by_name(k).is_none()) {
        return Err(EncodingError::UnknownProperty(join(path, unknown)));
    }
    let mut object = Object::new();
    for field in schema.fields() {
        let field_path = join(path, &field.name);
        let field_json = map
            .get(&field.name)
            .ok_or_else(|| EncodingError::MissingProperty(field_path.clone()))?;
        object.insert(
            field.name.clone(),
            read_value(&field.field_type, field_json, &field_path)?,
        );
    }
    Ok(object)
}

fn read_value(field_type: &FieldType, json: &Json, path: &str) -> Result<Value, EncodingError> {
    match field_type {
        FieldType::Scalar(data_type) => read_scalar(*data_type, json, path),
        FieldType::Object(schema) => read_object(schema, json, path).map(Value::Object),
        FieldType::Array(item) => {
            let items = json
                .as_array()
                .ok_or_else(|| mismatch(path, "array", json_kind(json)))?;
            items
                .iter()
                .enumerate()
                .map(|(idx, v)| read_value(item, v, &format!("{path}[{idx}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
    }
}

fn read_scalar(data_type: DataType, json: &Json, path: &str) -> Result<Value, EncodingError> {
    match (data_type, json) {
        (DataType::Uint32, Json::Number(n)) => {
            let v = whole_number(n, path)?;
            u32::try_from(v)
                .map(Value::Uint32)
                .map_err(|_| out_of_range(path, v, data_type))
        }
        (DataType::Sint32, Json::Number(n)) => {
            let v = whole_number(n, path)?;
            i32::try_from(v)
                .map(Value::Sint32)
                .map_err(|_| out_of_range(path, v, data_type))
        }
        (DataType::Uint64, Json::String(s)) => parse_decimal::<u64>(s, path, data_type).map(Value::Uint64),
        (DataType::Sint64, Json::String(s)) => parse_decimal::<i64>(s, path, data_type).map(Value::Sint64),
        (DataType::Boolean, Json::Bool(b)) => Ok(Value::Boolean(*b)),
        (DataType::String, Json::String(s)) => Ok(Value::String(s.clone())),
        (DataType::Bytes, Json::String(s)) => hex::decode(s)
            .map(Value::Bytes)
            .map_err(|e| EncodingError::InvalidJson {
                path: path.to_string(),
                reason: format!("invalid hex: {e}"),
            }),
        (expected, other) => Err(mismatch(path, expected.name(), json_kind(other))),
    }
}

/// Integer value of a JSON number, wide enough for any 32-bit type.
fn whole_number(n: &Number, path: &str) -> Result<i128, EncodingError> {
    if let Some(v) = n.as_u64() {
        Ok(i128::from(v))
    } else if let Some(v) = n.as_i64() {
        Ok(i128::from(v))
    } else {
        Err(EncodingError::InvalidJson {
            path: path.to_string(),
            reason: format!("{n} is not an integer"),
        })
    }
}

fn parse_decimal<T>(s: &str, path: &str, data_type: DataType) -> Result<T, EncodingError>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    // Only the shortest form is accepted: no sign other than '-', no
    // leading zeros, no "-0".
    let (negative, digits) = match s.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, s),
    };
    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && ((digits == "0" && !negative) || !digits.starts_with('0'));
    if !canonical {
        return Err(EncodingError::InvalidJson {
            path: path.to_string(),
            reason: format!("'{s}' is not a canonical decimal integer"),
        });
    }
    s.parse::<T>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => EncodingError::OutOfRange {
            path: path.to_string(),
            value: s.to_string(),
            data_type: data_type.name(),
        },
        // A well-formed negative number is a range error for unsigned types.
        IntErrorKind::InvalidDigit if negative => EncodingError::OutOfRange {
            path: path.to_string(),
            value: s.to_string(),
            data_type: data_type.name(),
        },
        _ => EncodingError::InvalidJson {
            path: path.to_string(),
            reason: format!("'{s}' is not a decimal integer"),
        },
    })
}

fn out_of_range(path: &str, value: i128, data_type: DataType) -> EncodingError {
    EncodingError::OutOfRange {
        path: path.to_string(),
        value: value.to_string(),
        data_type: data_type.name(),
    }
}

fn mismatch(path: &str, expected: &'static str, actual: &'static str) -> EncodingError {
    EncodingError::TypeMismatch {
        path: path.to_string(),
        expected,
        actual,
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
