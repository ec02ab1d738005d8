//! Strict decoder.
//!
//! Nested readers share the top-level buffer and only narrow its end, so
//! every offset reported in an error is absolute.

use crate::domain::errors::DecodingError;
use crate::domain::schema::{DataType, FieldType, Schema, SchemaField, MAX_FIELD_NUMBER};
use crate::domain::value::{Object, Value};
use crate::domain::varint::{read_uvarint, zigzag_decode_32, zigzag_decode_64};
use crate::domain::wire::{split_key, WireType};

/// Decoder behaviour for fields the schema does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// Skip unknown field numbers instead of failing. Ordering, varint and
    /// framing checks still apply to skipped fields.
    pub lenient_unknown_fields: bool,
}

impl DecodeOptions {
    /// Reject unknown fields (default).
    pub const fn strict() -> Self {
        Self {
            lenient_unknown_fields: false,
        }
    }

    /// Skip unknown fields.
    pub const fn lenient() -> Self {
        Self {
            lenient_unknown_fields: true,
        }
    }
}

/// Decode a top-level object; the whole buffer must be consumed.
pub(crate) fn decode_object(
    schema: &Schema,
    bytes: &[u8],
    options: DecodeOptions,
) -> Result<Object, DecodingError> {
    let mut reader = Reader { buf: bytes, pos: 0 };
    reader.read_object(schema, "", options)
}

struct Reader<'a> {
    /// Top-level buffer truncated at the end of the current object.
    buf: &'a [u8],
    pos: usize,
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

impl<'a> Reader<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn read_varint(&mut self) -> Result<u64, DecodingError> {
        let (value, consumed) = read_uvarint(self.buf, self.pos)?;
        self.pos += consumed;
        Ok(value)
    }

    /// Read a length prefix and return a reader over the framed bytes.
    fn read_frame(&mut self) -> Result<Reader<'a>, DecodingError> {
        let len = self.read_varint()?;
        let start = self.pos;
        let end = usize::try_from(len)
            .ok()
            .and_then(|len| start.checked_add(len))
            .filter(|end| *end <= self.buf.len())
            .ok_or(DecodingError::UnexpectedEof {
                offset: self.buf.len(),
            })?;
        self.pos = end;
        Ok(Reader {
            buf: &self.buf[..end],
            pos: start,
        })
    }

    fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    fn read_object(
        &mut self,
        schema: &Schema,
        path: &str,
        options: DecodeOptions,
    ) -> Result<Object, DecodingError> {
        let mut object = Object::new();
        let mut previous: u32 = 0;

        while !self.at_end() {
            let key_offset = self.pos;
            let (raw_field, tag) = split_key(self.read_varint()?);
            let wire_type = WireType::from_tag(tag, key_offset)?;
            let field_number = u32::try_from(raw_field)
                .ok()
                .filter(|n| (1..=MAX_FIELD_NUMBER).contains(n))
                .ok_or(DecodingError::UnknownField {
                    field_number: raw_field.min(u64::from(u32::MAX)) as u32,
                    offset: key_offset,
                })?;

            let field = schema.field_by_number(field_number);
            let repeats = field.map_or(options.lenient_unknown_fields, |f| {
                f.field_type.is_repeated()
            });
            if field_number < previous || (field_number == previous && !repeats) {
                return Err(DecodingError::OutOfOrder {
                    field_number,
                    previous,
                    offset: key_offset,
                });
            }
            previous = field_number;

            let Some(field) = field else {
                if !options.lenient_unknown_fields {
                    return Err(DecodingError::UnknownField {
                        field_number,
                        offset: key_offset,
                    });
                }
                self.skip(wire_type)?;
                continue;
            };

            let expected = field.field_type.wire_type();
            if wire_type != expected {
                return Err(DecodingError::WireTypeMismatch {
                    field_number,
                    expected: expected.tag(),
                    actual: wire_type.tag(),
                });
            }

            let field_path = join(path, &field.name);
            self.read_field(field, &field_path, options, &mut object)?;
        }

        for field in schema.fields() {
            if object.contains_key(&field.name) {
                continue;
            }
            match field.field_type {
                // Empty arrays are omitted on the wire.
                FieldType::Array(_) => {
                    object.insert(field.name.clone(), Value::Array(Vec::new()));
                }
                _ => return Err(DecodingError::MissingField(join(path, &field.name))),
            }
        }

        Ok(object)
    }

    fn read_field(
        &mut self,
        field: &SchemaField,
        path: &str,
        options: DecodeOptions,
        object: &mut Object,
    ) -> Result<(), DecodingError> {
        match &field.field_type {
            FieldType::Scalar(data_type) => {
                let value = self.read_scalar(*data_type, path)?;
                object.insert(field.name.clone(), value);
            }
            FieldType::Object(schema) => {
                let nested = self.read_frame()?.read_object(schema, path, options)?;
                object.insert(field.name.clone(), Value::Object(nested));
            }
            FieldType::Array(item) => match item.as_ref() {
                FieldType::Scalar(data_type) if data_type.is_packable() => {
                    let mut frame = self.read_frame()?;
                    if frame.at_end() {
                        return Err(DecodingError::EmptyPackedArray(path.to_string()));
                    }
                    let mut items = Vec::new();
                    while !frame.at_end() {
                        items.push(frame.read_scalar(*data_type, path)?);
                    }
                    object.insert(field.name.clone(), Value::Array(items));
                }
                FieldType::Scalar(data_type) => {
                    let value = self.read_scalar(*data_type, path)?;
                    push_item(object, &field.name, value);
                }
                FieldType::Object(schema) => {
                    let nested = self.read_frame()?.read_object(schema, path, options)?;
                    push_item(object, &field.name, Value::Object(nested));
                }
                FieldType::Array(_) => return Err(DecodingError::NestedArray(path.to_string())),
            },
        }
        Ok(())
    }

    fn read_scalar(&mut self, data_type: DataType, path: &str) -> Result<Value, DecodingError> {
        let value = match data_type {
            DataType::Uint32 => Value::Uint32(
                u32::try_from(self.read_varint()?)
                    .map_err(|_| DecodingError::OutOfRange(path.to_string()))?,
            ),
            DataType::Uint64 => Value::Uint64(self.read_varint()?),
            DataType::Sint32 => {
                let raw = u32::try_from(self.read_varint()?)
                    .map_err(|_| DecodingError::OutOfRange(path.to_string()))?;
                Value::Sint32(zigzag_decode_32(raw))
            }
            DataType::Sint64 => Value::Sint64(zigzag_decode_64(self.read_varint()?)),
            DataType::Boolean => {
                let offset = self.pos;
                let byte = *self
                    .buf
                    .get(offset)
                    .ok_or(DecodingError::UnexpectedEof { offset })?;
                self.pos += 1;
                match byte {
                    0x00 => Value::Boolean(false),
                    0x01 => Value::Boolean(true),
                    byte => return Err(DecodingError::InvalidBoolean { byte, offset }),
                }
            }
            DataType::String => {
                let bytes = self.read_frame()?.remaining();
                let text = std::str::from_utf8(bytes)
                    .map_err(|_| DecodingError::InvalidUtf8(path.to_string()))?;
                Value::String(text.to_string())
            }
            DataType::Bytes => Value::Bytes(self.read_frame()?.remaining().to_vec()),
        };
        Ok(value)
    }

    fn skip(&mut self, wire_type: WireType) -> Result<(), DecodingError> {
        match wire_type {
            WireType::Varint => self.read_varint().map(|_| ()),
            WireType::LengthDelimited => self.read_frame().map(|_| ()),
        }
    }
}

fn push_item(object: &mut Object, name: &str, value: Value) {
    match object.get_mut(name) {
        Some(Value::Array(items)) => items.push(value),
        _ => {
            object.insert(name.to_string(), Value::Array(vec![value]));
        }
    }
}
