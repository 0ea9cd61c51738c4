//! Virtual-model targets that fields are interpreted onto.
//!
//! A target is any dynamically-defined model type exposing the two
//! declaration primitives (`attribute`, `validates`) and opting into the
//! virtual-model marker. [`VirtualModel`] is the in-process descriptor
//! shipped with this crate.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{FieldsError, Result};
use crate::types::{Settings, StoredType};

/// Name of the capability checked by [`check_model_validity`].
pub const VIRTUAL_MODEL: &str = "virtual model";

/// A model type that can receive attribute and validation declarations.
pub trait ModelTarget: fmt::Debug {
    /// Human-readable name of the model type, used in errors and logs.
    fn model_name(&self) -> &str;

    /// Marker capability. Targets that accept interpretation return `true`.
    fn is_virtual_model(&self) -> bool {
        false
    }

    /// Declare (or redeclare) an attribute. Redeclaring replaces.
    fn attribute(&mut self, name: &str, stored_type: StoredType, default: Option<Value>);

    /// Attach a set of validation rules with their shared options.
    fn validates(&mut self, name: &str, rules: Settings, options: Settings);

    /// Attach free-form option metadata to an attribute.
    fn annotate(&mut self, _name: &str, _options: Settings) {}
}

/// Fail unless `target` carries the virtual-model capability.
pub fn check_model_validity(target: &dyn ModelTarget) -> Result<()> {
    if target.is_virtual_model() {
        Ok(())
    } else {
        Err(FieldsError::InvalidTarget {
            target: target.model_name().to_string(),
            expected: VIRTUAL_MODEL,
        })
    }
}

/// An attribute declared on a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeDecl {
    pub name: String,
    pub stored_type: StoredType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// A validation declaration: rules plus the options shared by all of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationDecl {
    pub attribute: String,
    pub rules: Settings,
    pub options: Settings,
}

/// A dynamically-defined model type built up by interpretation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VirtualModel {
    name: String,
    attributes: IndexMap<String, AttributeDecl>,
    validations: Vec<ValidationDecl>,
    annotations: IndexMap<String, Settings>,
}

impl VirtualModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a declared attribute by name.
    pub fn attribute_named(&self, name: &str) -> Option<&AttributeDecl> {
        self.attributes.get(name)
    }

    /// Declared attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDecl> {
        self.attributes.values()
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn validations(&self) -> &[ValidationDecl] {
        &self.validations
    }

    /// Validation declarations attached to one attribute.
    pub fn validations_for<'a>(
        &'a self,
        attribute: &'a str,
    ) -> impl Iterator<Item = &'a ValidationDecl> + 'a {
        self.validations
            .iter()
            .filter(move |decl| decl.attribute == attribute)
    }

    pub fn annotations_for(&self, attribute: &str) -> Option<&Settings> {
        self.annotations.get(attribute)
    }
}

impl ModelTarget for VirtualModel {
    fn model_name(&self) -> &str {
        &self.name
    }

    fn is_virtual_model(&self) -> bool {
        true
    }

    fn attribute(&mut self, name: &str, stored_type: StoredType, default: Option<Value>) {
        debug!(model = %self.name, attribute = name, %stored_type, "declaring attribute");
        self.attributes.insert(
            name.to_string(),
            AttributeDecl {
                name: name.to_string(),
                stored_type,
                default,
            },
        );
    }

    fn validates(&mut self, name: &str, rules: Settings, options: Settings) {
        let decl = ValidationDecl {
            attribute: name.to_string(),
            rules,
            options,
        };
        if self.validations.contains(&decl) {
            trace!(model = %self.name, attribute = name, "validation already declared");
            return;
        }
        debug!(
            model = %self.name,
            attribute = name,
            rules = ?decl.rules.keys().collect::<Vec<_>>(),
            "declaring validation"
        );
        self.validations.push(decl);
    }

    fn annotate(&mut self, name: &str, options: Settings) {
        self.annotations
            .entry(name.to_string())
            .or_default()
            .extend(options);
    }
}
