//! Field: one attribute's worth of persisted form metadata.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use ulid::Ulid;

use crate::error::Result;
use crate::interpret::{Interpretable, Interpretation};
use crate::kind::{FieldKind, FieldKinds};
use crate::model::{check_model_validity, ModelTarget};
use crate::options::OptionSpec;
use crate::types::{settings_or_empty, Settings, StoredType};
use crate::validations::ValidationSpec;

/// A field definition bound to its kind.
///
/// `validations` and `options` always exist; an absent mapping is an empty spec.
#[derive(Debug, Clone)]
pub struct Field {
    id: Ulid,
    name: String,
    label: String,
    kind: Arc<dyn FieldKind>,
    validations: ValidationSpec,
    options: OptionSpec,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: impl FieldKind + 'static) -> Self {
        Self::with_kind(name, Arc::new(kind))
    }

    pub fn with_kind(name: impl Into<String>, kind: Arc<dyn FieldKind>) -> Self {
        let name = name.into();
        Self {
            id: Ulid::new(),
            label: name.clone(),
            name,
            kind,
            validations: ValidationSpec::new(),
            options: OptionSpec::new(),
        }
    }

    /// Build a field from its persisted shape, resolving `type` against `kinds`.
    pub fn from_record(record: FieldRecord, kinds: &FieldKinds) -> Result<Self> {
        let kind = kinds.resolve(&record.type_key)?;
        Ok(Self {
            id: record.id,
            name: record.name,
            label: record.label,
            kind,
            validations: ValidationSpec::from(record.validations),
            options: OptionSpec::from(record.options),
        })
    }

    pub fn to_record(&self) -> FieldRecord {
        FieldRecord {
            id: self.id,
            name: self.name.clone(),
            label: self.label.clone(),
            type_key: self.type_key().to_string(),
            validations: self.validations.rules().clone(),
            options: self.options.settings().clone(),
        }
    }

    pub fn with_id(mut self, id: Ulid) -> Self {
        self.id = id;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_validations(mut self, validations: impl Into<ValidationSpec>) -> Self {
        self.validations = validations.into();
        self
    }

    pub fn with_options(mut self, options: impl Into<OptionSpec>) -> Self {
        self.options = options.into();
        self
    }

    pub fn id(&self) -> Ulid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &Arc<dyn FieldKind> {
        &self.kind
    }

    pub fn type_key(&self) -> &str {
        self.kind.type_key()
    }

    pub fn validations(&self) -> &ValidationSpec {
        &self.validations
    }

    pub fn options(&self) -> &OptionSpec {
        &self.options
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn validations_mut(&mut self) -> &mut ValidationSpec {
        &mut self.validations
    }

    pub fn options_mut(&mut self) -> &mut OptionSpec {
        &mut self.options
    }

    pub fn stored_type(&self) -> Result<StoredType> {
        self.kind.stored_type()
    }

    pub fn default_value(&self) -> Option<Value> {
        self.kind.default_value(&self.options)
    }

    /// True when the field carries options an administrator could edit.
    pub fn options_configurable(&self) -> bool {
        !self.options.is_empty()
    }

    pub fn validations_configurable(&self) -> bool {
        !self.validations.is_empty()
    }
}

impl Interpretable for Field {
    /// Declare this field's attribute on `target`, then run the kind's
    /// validation and extra hooks.
    ///
    /// The attribute name comes from `overrides.name` or the field name;
    /// `cx.attribute` is not consulted. Nothing is rolled back if a hook
    /// fails after the attribute was declared.
    fn interpret_to<'t>(
        &self,
        target: &'t mut dyn ModelTarget,
        cx: Interpretation<'_>,
    ) -> Result<&'t mut dyn ModelTarget> {
        check_model_validity(&*target)?;
        let stored_type = self.stored_type()?;

        let attribute = cx.overrides.attribute_name(&self.name);
        let default = cx.overrides.resolve_default(self.default_value());
        debug!(
            field = %self.name,
            kind = self.type_key(),
            model = target.model_name(),
            attribute,
            accessibility = ?cx.accessibility,
            "interpreting field"
        );
        target.attribute(attribute, stored_type, default);

        self.kind.interpret_validations_to(self, target, cx)?;
        self.kind.interpret_extra_to(self, target, cx)?;

        Ok(target)
    }
}

/// Persisted shape of a field, as read from and written to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    #[serde(default = "Ulid::new")]
    pub id: Ulid,
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub type_key: String,
    #[serde(default, deserialize_with = "settings_or_empty")]
    pub validations: Settings,
    #[serde(default, deserialize_with = "settings_or_empty")]
    pub options: Settings,
}
