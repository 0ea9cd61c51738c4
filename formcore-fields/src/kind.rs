//! Field kinds: the per-variant hooks behind [`Field`] interpretation.
//!
//! A kind decides the stored type and default of its attribute and may
//! override the two interpretation hooks. The trait defaults describe the
//! base field: no stored type, no default, raw validation mapping, no extras.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::trace;

use crate::error::{FieldsError, Result};
use crate::field::Field;
use crate::interpret::{Interpretable, Interpretation};
use crate::model::ModelTarget;
use crate::options::OptionSpec;
use crate::types::StoredType;
use crate::validations::ValidationSpec;

/// Option key holding an author-configured default value.
pub const DEFAULT_VALUE_KEY: &str = "default_value";

/// Behavior of one kind of field.
pub trait FieldKind: fmt::Debug + Send + Sync {
    /// Stable identifier persisted as the field's `type`.
    fn type_key(&self) -> &str;

    fn stored_type(&self) -> Result<StoredType> {
        Err(FieldsError::NotImplemented {
            kind: self.type_key().to_string(),
            operation: "stored_type",
        })
    }

    fn default_value(&self, _options: &OptionSpec) -> Option<Value> {
        None
    }

    fn interpret_validations_to(
        &self,
        field: &Field,
        target: &mut dyn ModelTarget,
        cx: Interpretation<'_>,
    ) -> Result<()> {
        interpret_raw_validations(field, target, cx)
    }

    fn interpret_extra_to(
        &self,
        _field: &Field,
        _target: &mut dyn ModelTarget,
        _cx: Interpretation<'_>,
    ) -> Result<()> {
        Ok(())
    }
}

/// Base validation hook: treat the field's validations as a raw mapping.
///
/// `overrides.validations` replaces the stored rules outright and
/// `overrides.validation_options` replaces `options.validation`.
pub fn interpret_raw_validations(
    field: &Field,
    target: &mut dyn ModelTarget,
    cx: Interpretation<'_>,
) -> Result<()> {
    let attribute = cx.overrides.attribute_name(field.name());
    if !cx.accessibility.enforces_validations() {
        trace!(attribute, accessibility = ?cx.accessibility, "skipping validations");
        return Ok(());
    }

    let validations = match &cx.overrides.validations {
        Some(validations) => validations.clone(),
        None => field.validations().rules().clone(),
    };
    let validation_options = match &cx.overrides.validation_options {
        Some(options) => options.clone(),
        None => field.options().validation_options(),
    };

    if !validations.is_empty() {
        target.validates(attribute, validations, validation_options);
    }
    Ok(())
}

/// Validation hook for kinds that route through their [`ValidationSpec`].
///
/// `overrides.validations` is merged into a duplicate of the stored spec.
/// Validation options come from `overrides.validation_options`, falling
/// back to the field's `options.validation`.
pub fn delegate_validations(
    field: &Field,
    target: &mut dyn ModelTarget,
    cx: Interpretation<'_>,
) -> Result<()> {
    interpret_validation_spec(field.validations(), field, target, cx)
}

fn interpret_validation_spec(
    spec: &ValidationSpec,
    field: &Field,
    target: &mut dyn ModelTarget,
    cx: Interpretation<'_>,
) -> Result<()> {
    if !cx.accessibility.enforces_validations() {
        return Ok(());
    }

    let attribute = cx.overrides.attribute_name(field.name());
    let stored_options = field.options().validation_options();
    let validations = spec.with_overrides(cx.overrides.validations.as_ref());
    validations.interpret_to(
        target,
        cx.for_attribute(attribute)
            .with_validation_options(&stored_options),
    )?;
    Ok(())
}

/// Extra hook for kinds that route through their [`OptionSpec`].
pub fn delegate_extra(
    field: &Field,
    target: &mut dyn ModelTarget,
    cx: Interpretation<'_>,
) -> Result<()> {
    let attribute = cx.overrides.attribute_name(field.name());
    let options = field.options().with_overrides(cx.overrides.options.as_ref());
    options.interpret_to(target, cx.for_attribute(attribute))?;
    Ok(())
}

/// The base field. Every concrete kind must supply a stored type; this one doesn't.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbstractField;

impl FieldKind for AbstractField {
    fn type_key(&self) -> &str {
        "field"
    }
}

/// A kind with a fixed stored type that keeps the base hooks.
#[derive(Debug, Clone, PartialEq)]
pub struct PlainField {
    type_key: String,
    stored_type: StoredType,
    default_value: Option<Value>,
}

impl PlainField {
    pub fn new(stored_type: StoredType) -> Self {
        Self::named("plain_field", stored_type)
    }

    pub fn named(type_key: impl Into<String>, stored_type: StoredType) -> Self {
        Self {
            type_key: type_key.into(),
            stored_type,
            default_value: None,
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }
}

impl FieldKind for PlainField {
    fn type_key(&self) -> &str {
        &self.type_key
    }

    fn stored_type(&self) -> Result<StoredType> {
        Ok(self.stored_type.clone())
    }

    fn default_value(&self, _options: &OptionSpec) -> Option<Value> {
        self.default_value.clone()
    }
}

/// Field kinds shipped with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinKind {
    TextField,
    TextArea,
    IntegerField,
    DecimalField,
    BooleanField,
    DateField,
    DatetimeField,
    /// One value out of `options.choices`.
    ChoiceField,
    /// Any subset of `options.choices`.
    MultipleChoiceField,
    /// Id of a record named by `options.resource`.
    ResourceField,
    MultipleResourceField,
}

impl BuiltinKind {
    pub const ALL: [BuiltinKind; 11] = [
        BuiltinKind::TextField,
        BuiltinKind::TextArea,
        BuiltinKind::IntegerField,
        BuiltinKind::DecimalField,
        BuiltinKind::BooleanField,
        BuiltinKind::DateField,
        BuiltinKind::DatetimeField,
        BuiltinKind::ChoiceField,
        BuiltinKind::MultipleChoiceField,
        BuiltinKind::ResourceField,
        BuiltinKind::MultipleResourceField,
    ];

    pub fn key(self) -> &'static str {
        match self {
            BuiltinKind::TextField => "text_field",
            BuiltinKind::TextArea => "text_area",
            BuiltinKind::IntegerField => "integer_field",
            BuiltinKind::DecimalField => "decimal_field",
            BuiltinKind::BooleanField => "boolean_field",
            BuiltinKind::DateField => "date_field",
            BuiltinKind::DatetimeField => "datetime_field",
            BuiltinKind::ChoiceField => "choice_field",
            BuiltinKind::MultipleChoiceField => "multiple_choice_field",
            BuiltinKind::ResourceField => "resource_field",
            BuiltinKind::MultipleResourceField => "multiple_resource_field",
        }
    }

    fn is_multiple(self) -> bool {
        matches!(
            self,
            BuiltinKind::MultipleChoiceField | BuiltinKind::MultipleResourceField
        )
    }

    /// Rule that restricts values to the configured choices.
    fn choice_rule(self) -> Option<&'static str> {
        match self {
            BuiltinKind::ChoiceField => Some("inclusion"),
            BuiltinKind::MultipleChoiceField => Some("subset"),
            _ => None,
        }
    }
}

impl FieldKind for BuiltinKind {
    fn type_key(&self) -> &str {
        self.key()
    }

    fn stored_type(&self) -> Result<StoredType> {
        Ok(match self {
            BuiltinKind::TextField
            | BuiltinKind::ChoiceField
            | BuiltinKind::ResourceField => StoredType::String,
            BuiltinKind::TextArea => StoredType::Text,
            BuiltinKind::IntegerField => StoredType::Integer,
            BuiltinKind::DecimalField => StoredType::Decimal,
            BuiltinKind::BooleanField => StoredType::Boolean,
            BuiltinKind::DateField => StoredType::Date,
            BuiltinKind::DatetimeField => StoredType::Datetime,
            BuiltinKind::MultipleChoiceField | BuiltinKind::MultipleResourceField => {
                StoredType::array_of(StoredType::String)
            }
        })
    }

    fn default_value(&self, options: &OptionSpec) -> Option<Value> {
        if let Some(value) = options.get(DEFAULT_VALUE_KEY).filter(|v| !v.is_null()) {
            return Some(value.clone());
        }
        match self {
            BuiltinKind::BooleanField => Some(Value::Bool(false)),
            kind if kind.is_multiple() => Some(Value::Array(Vec::new())),
            _ => None,
        }
    }

    /// Choice kinds prepend a rule restricting values to `options.choices`.
    /// The field's own rules and the per-call overrides merge over it, so
    /// `inclusion: false` switches it off.
    fn interpret_validations_to(
        &self,
        field: &Field,
        target: &mut dyn ModelTarget,
        cx: Interpretation<'_>,
    ) -> Result<()> {
        let Some(rule) = self.choice_rule() else {
            return delegate_validations(field, target, cx);
        };
        let choices = field
            .options()
            .with_overrides(cx.overrides.options.as_ref())
            .choices();
        if choices.is_empty() {
            return delegate_validations(field, target, cx);
        }

        let mut spec = ValidationSpec::new();
        spec.set(rule, json!({ "in": choices }));
        spec.update(field.validations().rules());
        interpret_validation_spec(&spec, field, target, cx)
    }

    fn interpret_extra_to(
        &self,
        field: &Field,
        target: &mut dyn ModelTarget,
        cx: Interpretation<'_>,
    ) -> Result<()> {
        delegate_extra(field, target, cx)
    }
}

/// Registry of known field kinds keyed by type key.
#[derive(Debug, Clone, Default)]
pub struct FieldKinds {
    kinds: IndexMap<String, Arc<dyn FieldKind>>,
}

impl FieldKinds {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every [`BuiltinKind`].
    pub fn builtin() -> Self {
        let mut kinds = Self::new();
        for kind in BuiltinKind::ALL {
            kinds.register(kind);
        }
        kinds
    }

    /// Register a kind, replacing any kind with the same type key.
    pub fn register(&mut self, kind: impl FieldKind + 'static) -> &mut Self {
        self.register_shared(Arc::new(kind))
    }

    pub fn register_shared(&mut self, kind: Arc<dyn FieldKind>) -> &mut Self {
        self.kinds.insert(kind.type_key().to_string(), kind);
        self
    }

    pub fn get(&self, type_key: &str) -> Option<Arc<dyn FieldKind>> {
        self.kinds.get(type_key).cloned()
    }

    /// Look up a kind, failing for keys nobody registered.
    pub fn resolve(&self, type_key: &str) -> Result<Arc<dyn FieldKind>> {
        self.get(type_key)
            .ok_or_else(|| FieldsError::UnknownFieldKind {
                type_key: type_key.to_string(),
            })
    }

    pub fn contains(&self, type_key: &str) -> bool {
        self.kinds.contains_key(type_key)
    }

    pub fn type_keys(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }
}
