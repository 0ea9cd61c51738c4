//! ValidationSpec: a field's validation rules as an interpretable bundle.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::Result;
use crate::interpret::{Interpretable, Interpretation};
use crate::model::ModelTarget;
use crate::types::Settings;

/// Rule name → rule options, owned by exactly one field.
///
/// What each rule means is up to the model target; this type only carries
/// the rules and follows the duplicate/merge/delegate protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationSpec {
    rules: Settings,
}

impl ValidationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &Settings {
        &self.rules
    }

    pub fn get(&self, rule: &str) -> Option<&Value> {
        self.rules.get(rule)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Copy with independent storage.
    pub fn dup(&self) -> Self {
        self.clone()
    }

    /// Shallow merge: keys in `partial` win, everything else is kept.
    pub fn update(&mut self, partial: &Settings) -> &mut Self {
        for (rule, options) in partial {
            self.rules.insert(rule.clone(), options.clone());
        }
        self
    }

    /// Set a single rule, replacing any previous options for it.
    pub fn set(&mut self, rule: impl Into<String>, options: Value) -> &mut Self {
        self.rules.insert(rule.into(), options);
        self
    }

    /// The spec to interpret for a call: `self` untouched, or a merged duplicate
    /// when `overrides` carries anything.
    pub fn with_overrides(&self, overrides: Option<&Settings>) -> Cow<'_, Self> {
        match overrides {
            Some(partial) if !partial.is_empty() => {
                let mut merged = self.dup();
                merged.update(partial);
                Cow::Owned(merged)
            }
            _ => Cow::Borrowed(self),
        }
    }

    /// Rules that are switched on. `false` and `null` entries are disabled rules.
    pub fn active_rules(&self) -> Settings {
        self.rules
            .iter()
            .filter(|(_, options)| !matches!(options, Value::Null | Value::Bool(false)))
            .map(|(rule, options)| (rule.clone(), options.clone()))
            .collect()
    }
}

impl From<Settings> for ValidationSpec {
    fn from(rules: Settings) -> Self {
        Self { rules }
    }
}

impl Interpretable for ValidationSpec {
    fn interpret_to<'t>(
        &self,
        target: &'t mut dyn ModelTarget,
        cx: Interpretation<'_>,
    ) -> Result<&'t mut dyn ModelTarget> {
        let attribute = cx.bound_attribute("validations")?;
        if !cx.accessibility.enforces_validations() {
            trace!(attribute, accessibility = ?cx.accessibility, "skipping validations");
            return Ok(target);
        }

        let rules = self.active_rules();
        if rules.is_empty() {
            return Ok(target);
        }

        let options = cx.effective_validation_options();
        debug!(
            model = target.model_name(),
            attribute,
            rules = rules.len(),
            "interpreting validations"
        );
        target.validates(attribute, rules, options);
        Ok(target)
    }
}
