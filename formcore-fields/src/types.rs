//! Core value types shared by fields, specs and model targets.
//!
//! Settings mappings, stored types, accessibility modes and per-call
//! overrides all serialize to/from YAML via serde.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A mapping of named settings (rule name → rule options, option name → value).
pub type Settings = serde_json::Map<String, Value>;

/// The storage type of an attribute declared on a virtual model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StoredType {
    String,
    Text,
    Integer,
    Decimal,
    Float,
    Boolean,
    Date,
    Datetime,
    Json,
    /// A list of values of the inner type.
    Array(Box<StoredType>),
}

impl StoredType {
    pub fn array_of(inner: StoredType) -> Self {
        StoredType::Array(Box::new(inner))
    }
}

impl fmt::Display for StoredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredType::String => f.write_str("string"),
            StoredType::Text => f.write_str("text"),
            StoredType::Integer => f.write_str("integer"),
            StoredType::Decimal => f.write_str("decimal"),
            StoredType::Float => f.write_str("float"),
            StoredType::Boolean => f.write_str("boolean"),
            StoredType::Date => f.write_str("date"),
            StoredType::Datetime => f.write_str("datetime"),
            StoredType::Json => f.write_str("json"),
            StoredType::Array(inner) => write!(f, "{inner}[]"),
        }
    }
}

/// Whether validations are enforced for an interpretation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    #[default]
    ReadAndWrite,
    ReadOnly,
}

impl Accessibility {
    /// Only `read_and_write` targets receive validation rules.
    pub fn enforces_validations(self) -> bool {
        matches!(self, Accessibility::ReadAndWrite)
    }
}

/// Per-call overrides for a single interpretation. Never persisted.
///
/// Every key is optional. `default_value: null` is kept distinct from an
/// absent key and means "declare without a default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validations: Option<Settings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_options: Option<Settings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Settings>,
}

impl Overrides {
    pub const EMPTY: Overrides = Overrides {
        name: None,
        default_value: None,
        validations: None,
        validation_options: None,
        options: None,
    };

    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the attribute under a different name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_validations(mut self, validations: Settings) -> Self {
        self.validations = Some(validations);
        self
    }

    pub fn with_validation_options(mut self, options: Settings) -> Self {
        self.validation_options = Some(options);
        self
    }

    pub fn with_options(mut self, options: Settings) -> Self {
        self.options = Some(options);
        self
    }

    /// The attribute name to declare: the override if present, else `fallback`.
    pub fn attribute_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(fallback)
    }

    /// The default to declare. An explicit `null` override clears `fallback`.
    pub fn resolve_default(&self, fallback: Option<Value>) -> Option<Value> {
        match &self.default_value {
            Some(Value::Null) => None,
            Some(value) => Some(value.clone()),
            None => fallback,
        }
    }
}

// Keeps `default_value: null` as `Some(Null)` rather than collapsing it to `None`.
fn present_value<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Deserialize a settings mapping, treating `null` as empty.
pub(crate) fn settings_or_empty<'de, D>(deserializer: D) -> std::result::Result<Settings, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Settings>::deserialize(deserializer)?.unwrap_or_default())
}
