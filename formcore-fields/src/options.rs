//! OptionSpec: kind-specific extra configuration as an interpretable bundle.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::interpret::{Interpretable, Interpretation};
use crate::model::ModelTarget;
use crate::types::Settings;

/// Key under which validation options are stored alongside the other options.
pub const VALIDATION_KEY: &str = "validation";

/// Option name → value, owned by exactly one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSpec {
    settings: Settings,
}

impl OptionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Copy with independent storage.
    pub fn dup(&self) -> Self {
        self.clone()
    }

    /// Shallow merge: keys in `partial` win, everything else is kept.
    pub fn update(&mut self, partial: &Settings) -> &mut Self {
        for (key, value) in partial {
            self.settings.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.settings.insert(key.into(), value);
        self
    }

    /// The spec to interpret for a call: `self` untouched, or a merged duplicate.
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

    /// Options applied to every validation of the field (`options.validation`).
    pub fn validation_options(&self) -> Settings {
        self.settings
            .get(VALIDATION_KEY)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    /// Allowed values for choice-like kinds.
    ///
    /// Entries may be bare values or `{value, label, ...}` objects.
    pub fn choices(&self) -> Vec<Value> {
        let Some(Value::Array(entries)) = self.settings.get("choices") else {
            return Vec::new();
        };
        entries
            .iter()
            .map(|entry| match entry {
                Value::Object(choice) => choice.get("value").cloned().unwrap_or(Value::Null),
                other => other.clone(),
            })
            .filter(|value| !value.is_null())
            .collect()
    }

    /// Everything except `options.validation`, which goes to `validates` instead.
    fn extra(&self) -> Settings {
        self.settings
            .iter()
            .filter(|(key, _)| key.as_str() != VALIDATION_KEY)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl From<Settings> for OptionSpec {
    fn from(settings: Settings) -> Self {
        Self { settings }
    }
}

impl Interpretable for OptionSpec {
    fn interpret_to<'t>(
        &self,
        target: &'t mut dyn ModelTarget,
        cx: Interpretation<'_>,
    ) -> Result<&'t mut dyn ModelTarget> {
        let attribute = cx.bound_attribute("options")?;
        let extra = self.extra();
        if extra.is_empty() {
            return Ok(target);
        }

        debug!(
            model = target.model_name(),
            attribute,
            options = extra.len(),
            "interpreting options"
        );
        target.annotate(attribute, extra);
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VirtualModel;
    use serde_json::json;

    fn settings(value: Value) -> Settings {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_validation_options_default_to_empty() {
        assert!(OptionSpec::new().validation_options().is_empty());

        let spec = OptionSpec::from(settings(json!({"validation": {"allow_blank": true}})));
        assert_eq!(spec.validation_options(), settings(json!({"allow_blank": true})));

        let malformed = OptionSpec::from(settings(json!({"validation": "strict"})));
        assert!(malformed.validation_options().is_empty());
    }

    #[test]
    fn test_choices_accept_values_and_objects() {
        let spec = OptionSpec::from(settings(json!({
            "choices": ["small", {"value": "large", "label": "Large"}, {"label": "broken"}]
        })));
        assert_eq!(spec.choices(), vec![json!("small"), json!("large")]);
        assert!(OptionSpec::new().choices().is_empty());
    }

    #[test]
    fn test_interpret_annotates_everything_but_validation() {
        let spec = OptionSpec::from(settings(json!({
            "placeholder": "Your size",
            "validation": {"allow_blank": true}
        })));
        let mut model = VirtualModel::new("Order");
        spec.interpret_to(&mut model, Interpretation::default().for_attribute("size"))
            .unwrap();

        let notes = model.annotations_for("size").unwrap();
        assert_eq!(notes.get("placeholder"), Some(&json!("Your size")));
        assert!(notes.get(VALIDATION_KEY).is_none());
    }

    #[test]
    fn test_interpret_ignores_accessibility() {
        let spec = OptionSpec::from(settings(json!({"placeholder": "Your size"})));
        let mut model = VirtualModel::new("Order");
        spec.interpret_to(
            &mut model,
            Interpretation::default().for_attribute("size").read_only(),
        )
        .unwrap();
        assert!(model.annotations_for("size").is_some());
    }

    #[test]
    fn test_empty_spec_declares_nothing() {
        let mut model = VirtualModel::new("Order");
        OptionSpec::new()
            .interpret_to(&mut model, Interpretation::default().for_attribute("size"))
            .unwrap();
        assert!(model.annotations_for("size").is_none());
    }

    #[test]
    fn test_update_merges_shallowly() {
        let mut spec = OptionSpec::from(settings(json!({"a": 1, "b": {"x": 1}})));
        spec.update(&settings(json!({"b": {"y": 2}})));
        assert_eq!(spec.get("a"), Some(&json!(1)));
        assert_eq!(spec.get("b"), Some(&json!({"y": 2})));
    }
}
