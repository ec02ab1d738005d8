//! # Domain Errors

use kc_01_codec::CodecError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeError {
    /// No asset schema is registered for this transaction type.
    #[error("Unknown transaction type {0}")]
    UnknownTransactionType(u32),

    /// JSON input is not shaped like the typed model.
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// A field holds a value the typed model does not accept.
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    /// Codec failure, propagated unchanged.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl SerdeError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SerdeError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
