//! Schema model.
//!
//! A `Schema` is an ordered set of fields. Fields are sorted by field number
//! at construction, which is what makes encoding independent of the order
//! in which a caller declared the properties.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use super::errors::SchemaError;
use super::wire::WireType;

/// Largest field number that still fits a 32-bit key.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Scalar data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    String,
    Bytes,
    Boolean,
}

impl DataType {
    /// Name used in JSON schemas and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            DataType::Uint32 => "uint32",
            DataType::Uint64 => "uint64",
            DataType::Sint32 => "sint32",
            DataType::Sint64 => "sint64",
            DataType::String => "string",
            DataType::Bytes => "bytes",
            DataType::Boolean => "boolean",
        }
    }

    /// Parse a JSON-schema `dataType`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "uint32" => Some(DataType::Uint32),
            "uint64" => Some(DataType::Uint64),
            "sint32" => Some(DataType::Sint32),
            "sint64" => Some(DataType::Sint64),
            "string" => Some(DataType::String),
            "bytes" => Some(DataType::Bytes),
            "boolean" => Some(DataType::Boolean),
            _ => None,
        }
    }

    /// Wire type of a standalone field of this type.
    pub const fn wire_type(self) -> WireType {
        match self {
            DataType::String | DataType::Bytes => WireType::LengthDelimited,
            _ => WireType::Varint,
        }
    }

    /// Whether arrays of this type are packed into a single blob.
    pub const fn is_packable(self) -> bool {
        matches!(self.wire_type(), WireType::Varint)
    }
}

/// Type of a schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// A single scalar.
    Scalar(DataType),
    /// A nested object.
    Object(Schema),
    /// A list of items; items are never arrays themselves.
    Array(Box<FieldType>),
}

impl FieldType {
    /// Wire type used in this field's key.
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldType::Scalar(data_type) => data_type.wire_type(),
            FieldType::Object(_) | FieldType::Array(_) => WireType::LengthDelimited,
        }
    }

    /// Whether the field is an array encoded as one keyed entry per item.
    pub fn is_repeated(&self) -> bool {
        match self {
            FieldType::Array(item) => !matches!(**item, FieldType::Scalar(dt) if dt.is_packable()),
            _ => false,
        }
    }
}

/// One property of a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: String,
    pub field_number: u32,
    pub field_type: FieldType,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, field_number: u32, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_number,
            field_type,
        }
    }

    pub fn scalar(name: impl Into<String>, field_number: u32, data_type: DataType) -> Self {
        Self::new(name, field_number, FieldType::Scalar(data_type))
    }

    pub fn object(name: impl Into<String>, field_number: u32, schema: Schema) -> Self {
        Self::new(name, field_number, FieldType::Object(schema))
    }

    pub fn array(name: impl Into<String>, field_number: u32, item: FieldType) -> Self {
        Self::new(name, field_number, FieldType::Array(Box::new(item)))
    }
}

/// A validated, field-number-ordered schema.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    id: Option<String>,
    fields: Vec<SchemaField>,
}

impl Schema {
    /// Validate `fields` and sort them by field number.
    ///
    /// ## Errors
    ///
    /// - `InvalidFieldNumber`: number is 0 or above `MAX_FIELD_NUMBER`
    /// - `DuplicateFieldNumber` / `DuplicatePropertyName`
    /// - `EmptyPropertyName`
    /// - `NestedArray`: array items declared as arrays
    pub fn new(mut fields: Vec<SchemaField>) -> Result<Self, SchemaError> {
        let mut names = HashSet::with_capacity(fields.len());
        for field in &fields {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyPropertyName);
            }
            if field.field_number == 0 || field.field_number > MAX_FIELD_NUMBER {
                return Err(SchemaError::InvalidFieldNumber {
                    name: field.name.clone(),
                    field_number: field.field_number,
                    max: MAX_FIELD_NUMBER,
                });
            }
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicatePropertyName(field.name.clone()));
            }
            if let FieldType::Array(item) = &field.field_type {
                if matches!(**item, FieldType::Array(_)) {
                    return Err(SchemaError::NestedArray(field.name.clone()));
                }
            }
        }

        fields.sort_by_key(|f| f.field_number);
        for pair in fields.windows(2) {
            if pair[0].field_number == pair[1].field_number {
                return Err(SchemaError::DuplicateFieldNumber {
                    field_number: pair[0].field_number,
                    first: pair[0].name.clone(),
                    second: pair[1].name.clone(),
                });
            }
        }

        Ok(Self { id: None, fields })
    }

    /// Attach a `$id`.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Fields in ascending field-number order.
    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn field_by_number(&self, field_number: u32) -> Option<&SchemaField> {
        self.fields
            .binary_search_by_key(&field_number, |f| f.field_number)
            .ok()
            .map(|idx| &self.fields[idx])
    }

    pub fn field_by_name(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Load a schema from its JSON-schema document.
    ///
    /// ```json
    /// {
    ///   "$id": "/transfer/asset",
    ///   "type": "object",
    ///   "required": ["amount", "recipientAddress"],
    ///   "properties": {
    ///     "amount": { "dataType": "uint64", "fieldNumber": 1 },
    ///     "recipientAddress": { "dataType": "bytes", "fieldNumber": 2 }
    ///   }
    /// }
    /// ```
    pub fn from_json(document: &serde_json::Value) -> Result<Self, SchemaError> {
        let raw: RawNode = serde_json::from_value(document.clone())
            .map_err(|e| SchemaError::Malformed(e.to_string()))?;
        if raw.kind.as_deref() != Some("object") {
            return Err(SchemaError::Malformed(
                "root schema must have type 'object'".to_string(),
            ));
        }
        let schema = raw.into_schema("$")?;
        Ok(match raw_id(document) {
            Some(id) => schema.with_id(id),
            None => schema,
        })
    }
}

fn raw_id(document: &serde_json::Value) -> Option<String> {
    document
        .get("$id")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Shape shared by schema roots, properties and array items.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(rename = "type")]
    kind: Option<String>,
    data_type: Option<String>,
    field_number: Option<u32>,
    items: Option<Box<RawNode>>,
    #[serde(default)]
    required: Vec<String>,
    #[serde(default)]
    properties: BTreeMap<String, RawNode>,
}

impl RawNode {
    fn into_schema(&self, path: &str) -> Result<Schema, SchemaError> {
        let mut fields = Vec::with_capacity(self.properties.len());
        for (name, node) in &self.properties {
            if !self.required.iter().any(|r| r == name) {
                return Err(SchemaError::NotRequired(name.clone()));
            }
            let field_number = node.field_number.ok_or_else(|| {
                SchemaError::Malformed(format!("{path}.{name} has no fieldNumber"))
            })?;
            let field_type = node.field_type(name, &format!("{path}.{name}"))?;
            fields.push(SchemaField::new(name.clone(), field_number, field_type));
        }
        Schema::new(fields)
    }

    fn field_type(&self, name: &str, path: &str) -> Result<FieldType, SchemaError> {
        if let Some(data_type) = &self.data_type {
            return DataType::parse(data_type)
                .map(FieldType::Scalar)
                .ok_or_else(|| SchemaError::UnknownDataType {
                    name: name.to_string(),
                    data_type: data_type.clone(),
                });
        }
        match self.kind.as_deref() {
            Some("object") => Ok(FieldType::Object(self.into_schema(path)?)),
            Some("array") => {
                let items = self
                    .items
                    .as_ref()
                    .ok_or_else(|| SchemaError::Malformed(format!("{path} has no items")))?;
                let item = items.field_type(name, &format!("{path}[]"))?;
                if matches!(item, FieldType::Array(_)) {
                    return Err(SchemaError::NestedArray(name.to_string()));
                }
                Ok(FieldType::Array(Box::new(item)))
            }
            _ => Err(SchemaError::Malformed(format!(
                "{path} needs a dataType or type 'object'/'array'"
            ))),
        }
    }
}
