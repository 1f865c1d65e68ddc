//! Schema error types
//!
//! Error codes:
//! - AIS_UNKNOWN_MESSAGE_TYPE (FATAL for registry lookups, a row-level
//!   "invalid" inside the analyzer)
//! - AIS_MISSING_MESSAGE_TYPE
//! - AIS_UNKNOWN_FIELD
//! - AIS_COERCION_FAILED (RECOVERABLE when the caller opts into quarantine)
//! - AIS_INVALID_REGISTRY
//!
//! Field validation failures and missing required fields are never raised;
//! they are recorded in the message quarantine.

use std::fmt;

use thiserror::Error;

/// How a caller is expected to treat an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The record can be quarantined and processing continues
    Recoverable,
    /// The operation cannot produce a result
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Recoverable => write!(f, "RECOVERABLE"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown message type: {type_value}")]
    UnknownMessageType { type_value: String },

    #[error("message has no usable 'type' field")]
    MissingMessageType,

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("cannot coerce field '{field}' value '{raw}': {cause}")]
    Coercion {
        field: String,
        raw: String,
        cause: String,
    },

    #[error("invalid registry: {0}")]
    InvalidRegistry(String),
}

impl SchemaError {
    pub fn unknown_type(type_value: impl fmt::Display) -> Self {
        SchemaError::UnknownMessageType {
            type_value: type_value.to_string(),
        }
    }

    pub fn coercion(field: impl Into<String>, raw: impl fmt::Display, cause: impl Into<String>) -> Self {
        SchemaError::Coercion {
            field: field.into(),
            raw: raw.to_string(),
            cause: cause.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::UnknownMessageType { .. } => "AIS_UNKNOWN_MESSAGE_TYPE",
            SchemaError::MissingMessageType => "AIS_MISSING_MESSAGE_TYPE",
            SchemaError::UnknownField(_) => "AIS_UNKNOWN_FIELD",
            SchemaError::Coercion { .. } => "AIS_COERCION_FAILED",
            SchemaError::InvalidRegistry(_) => "AIS_INVALID_REGISTRY",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            SchemaError::Coercion { .. } => Severity::Recoverable,
            _ => Severity::Fatal,
        }
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
