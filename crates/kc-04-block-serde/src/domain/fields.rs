//! Typed extraction from schema-checked codec objects.
//!
//! Decoded objects always carry every schema field with its declared type,
//! so these only fail when a caller hands in an object built by hand.

use kc_01_codec::{Object, Value};

use super::errors::SerdeError;

pub(crate) struct Fields {
    object: Object,
    path: &'static str,
}

impl Fields {
    pub(crate) fn new(object: Object, path: &'static str) -> Self {
        Self { object, path }
    }

    fn take(&mut self, name: &str) -> Result<Value, SerdeError> {
        self.object
            .remove(name)
            .ok_or_else(|| SerdeError::invalid(self.field(name), "missing"))
    }

    fn field(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.path, name)
        }
    }

    fn wrong(&self, name: &str, expected: &str, actual: &Value) -> SerdeError {
        SerdeError::invalid(
            self.field(name),
            format!("expected {expected}, got {}", actual.kind_name()),
        )
    }

    pub(crate) fn u32(&mut self, name: &str) -> Result<u32, SerdeError> {
        let value = self.take(name)?;
        value.as_u32().ok_or_else(|| self.wrong(name, "uint32", &value))
    }

    pub(crate) fn u64(&mut self, name: &str) -> Result<u64, SerdeError> {
        let value = self.take(name)?;
        value.as_u64().ok_or_else(|| self.wrong(name, "uint64", &value))
    }

    pub(crate) fn i64(&mut self, name: &str) -> Result<i64, SerdeError> {
        let value = self.take(name)?;
        value.as_i64().ok_or_else(|| self.wrong(name, "sint64", &value))
    }

    pub(crate) fn string(&mut self, name: &str) -> Result<String, SerdeError> {
        match self.take(name)? {
            Value::String(s) => Ok(s),
            other => Err(self.wrong(name, "string", &other)),
        }
    }

    pub(crate) fn bytes(&mut self, name: &str) -> Result<Vec<u8>, SerdeError> {
        match self.take(name)? {
            Value::Bytes(b) => Ok(b),
            other => Err(self.wrong(name, "bytes", &other)),
        }
    }

    /// Bytes field of exactly `N` bytes.
    pub(crate) fn fixed<const N: usize>(&mut self, name: &str) -> Result<[u8; N], SerdeError> {
        let bytes = self.bytes(name)?;
        let len = bytes.len();
        bytes.try_into().map_err(|_| {
            SerdeError::invalid(self.field(name), format!("expected {N} bytes, got {len}"))
        })
    }

    pub(crate) fn array(&mut self, name: &str) -> Result<Vec<Value>, SerdeError> {
        match self.take(name)? {
            Value::Array(items) => Ok(items),
            other => Err(self.wrong(name, "array", &other)),
        }
    }

    /// Array of objects, each wrapped for further extraction.
    pub(crate) fn objects(
        &mut self,
        name: &str,
        item_path: &'static str,
    ) -> Result<Vec<Fields>, SerdeError> {
        let items = self.array(name)?;
        items
            .into_iter()
            .map(|item| match item {
                Value::Object(object) => Ok(Fields::new(object, item_path)),
                other => Err(self.wrong(name, "object", &other)),
            })
            .collect()
    }

    pub(crate) fn byte_items(&mut self, name: &str) -> Result<Vec<Vec<u8>>, SerdeError> {
        let items = self.array(name)?;
        items
            .into_iter()
            .map(|item| match item {
                Value::Bytes(b) => Ok(b),
                other => Err(self.wrong(name, "bytes", &other)),
            })
            .collect()
    }
}
