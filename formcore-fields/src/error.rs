//! Error types for field interpretation and field bookkeeping

use std::path::PathBuf;
use thiserror::Error;

/// Result type for fields operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors that can occur while interpreting or managing fields
#[derive(Debug, Error)]
pub enum FieldsError {
    /// Interpretation target lacks the virtual-model capability
    #[error("{target} must be a {expected}")]
    InvalidTarget {
        target: String,
        expected: &'static str,
    },

    /// An abstract field kind was asked for something only concrete kinds provide
    #[error("{operation} is not implemented for field kind '{kind}'")]
    NotImplemented {
        kind: String,
        operation: &'static str,
    },

    /// A spec was interpreted without an attribute to attach to
    #[error("{what} must be bound to an attribute before interpretation")]
    UnboundAttribute { what: &'static str },

    /// Field name missing
    #[error("field name can't be blank")]
    BlankFieldName,

    /// Field name doesn't match the identifier pattern
    #[error("invalid field name '{name}': must match {pattern}")]
    InvalidFieldName { name: String, pattern: &'static str },

    /// Field name collides with a reserved word
    #[error("field name '{name}' is reserved")]
    ReservedFieldName { name: String },

    /// Duplicate field name within a section
    #[error("duplicate field name: {name}")]
    DuplicateFieldName { name: String },

    /// Two fields in one section share an id
    #[error("duplicate field id: {id}")]
    DuplicateFieldId { id: String },

    /// Field label missing
    #[error("label can't be blank for field '{name}'")]
    BlankLabel { name: String },

    /// Record names a field kind nobody registered
    #[error("unknown field kind: {type_key}")]
    UnknownFieldKind { type_key: String },

    /// Field not found by name
    #[error("field not found: {name}")]
    FieldNotFound { name: String },

    /// Field not found by ULID
    #[error("field not found by id: {id}")]
    FieldNotFoundById { id: String },

    /// Configuration extraction failed
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    /// Configuration file extension not recognized
    #[error("unsupported configuration format: {path}")]
    UnsupportedConfigFormat { path: PathBuf },

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl FieldsError {
    /// Caller misuse or a broken field kind. These are never worth retrying.
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            FieldsError::InvalidTarget { .. }
                | FieldsError::NotImplemented { .. }
                | FieldsError::UnboundAttribute { .. }
        )
    }
}
