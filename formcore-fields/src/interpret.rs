//! The interpretation protocol shared by fields and their owned specs.

use crate::error::{FieldsError, Result};
use crate::model::ModelTarget;
use crate::types::{Accessibility, Overrides, Settings};

pub(crate) static NO_OVERRIDES: Overrides = Overrides::EMPTY;

/// Something that can translate stored metadata into declarations on a model.
///
/// Implemented by [`Field`](crate::Field), [`ValidationSpec`](crate::ValidationSpec)
/// and [`OptionSpec`](crate::OptionSpec). Implementations mutate only `target`
/// and hand it back so calls can be chained.
pub trait Interpretable {
    fn interpret_to<'t>(
        &self,
        target: &'t mut dyn ModelTarget,
        cx: Interpretation<'_>,
    ) -> Result<&'t mut dyn ModelTarget>;
}

/// Per-call context threaded through an interpretation.
///
/// `attribute` is the resolved attribute name a spec attaches to. A field
/// resolves its own name from `overrides.name` and binds it before
/// delegating to its specs, together with the validation options resolved
/// from its stored `options.validation`.
#[derive(Debug, Clone, Copy)]
pub struct Interpretation<'a> {
    pub attribute: Option<&'a str>,
    pub accessibility: Accessibility,
    pub overrides: &'a Overrides,
    pub validation_options: Option<&'a Settings>,
}

impl<'a> Interpretation<'a> {
    pub fn new(overrides: &'a Overrides) -> Self {
        Self {
            attribute: None,
            accessibility: Accessibility::default(),
            overrides,
            validation_options: None,
        }
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn read_only(self) -> Self {
        self.with_accessibility(Accessibility::ReadOnly)
    }

    /// Bind the attribute name that specs attach their declarations to.
    pub fn for_attribute(mut self, attribute: &'a str) -> Self {
        self.attribute = Some(attribute);
        self
    }

    /// Bind the options shared by every validation the spec attaches.
    pub fn with_validation_options(mut self, options: &'a Settings) -> Self {
        self.validation_options = Some(options);
        self
    }

    /// Options for `validates`: the per-call override, then the bound options.
    pub fn effective_validation_options(&self) -> Settings {
        self.overrides
            .validation_options
            .as_ref()
            .or(self.validation_options)
            .cloned()
            .unwrap_or_default()
    }

    /// The bound attribute, or an error naming what tried to use it.
    pub fn bound_attribute(&self, what: &'static str) -> Result<&'a str> {
        self.attribute
            .ok_or(FieldsError::UnboundAttribute { what })
    }
}

impl Default for Interpretation<'static> {
    fn default() -> Self {
        Interpretation::new(&NO_OVERRIDES)
    }
}
