//! Sections: ordered groups of sibling fields.
//!
//! A section is the uniqueness scope for field names and owns the position
//! of each field in its list. Positions are 1-based; removing a field closes
//! the gap. Fields are checked against the naming rules before they join.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ulid::Ulid;

use crate::config::FormCoreConfig;
use crate::error::{FieldsError, Result};
use crate::field::{Field, FieldRecord};
use crate::interpret::{Interpretable, Interpretation, NO_OVERRIDES};
use crate::kind::FieldKinds;
use crate::model::{check_model_validity, ModelTarget};
use crate::naming::validate_name;
use crate::types::{Accessibility, Overrides};

/// Per-field overrides for a section interpretation, keyed by field name.
pub type FieldOverrides = HashMap<String, Overrides>;

pub struct Section {
    id: Ulid,
    title: String,
    config: FormCoreConfig,
    fields: Vec<Field>,
    name_index: HashMap<String, usize>,
    id_index: HashMap<Ulid, usize>,
}

impl Section {
    pub fn new(title: impl Into<String>, config: FormCoreConfig) -> Self {
        Self {
            id: Ulid::new(),
            title: title.into(),
            config,
            fields: Vec::new(),
            name_index: HashMap::new(),
            id_index: HashMap::new(),
        }
    }

    /// Rebuild a section from storage. Every field is checked as if newly added.
    pub fn from_record(
        record: SectionRecord,
        kinds: &FieldKinds,
        config: FormCoreConfig,
    ) -> Result<Self> {
        let mut section = Self::new(record.title, config);
        section.id = record.id;
        for field in record.fields {
            section.push_field(Field::from_record(field, kinds)?)?;
        }
        Ok(section)
    }

    pub fn to_record(&self) -> SectionRecord {
        SectionRecord {
            id: self.id,
            title: self.title.clone(),
            fields: self.fields.iter().map(Field::to_record).collect(),
        }
    }

    pub fn id(&self) -> Ulid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn config(&self) -> &FormCoreConfig {
        &self.config
    }

    // --- Lookup ---

    /// Fields in position order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.name_index.get(name).map(|&i| &self.fields[i])
    }

    pub fn field_by_id(&self, id: &Ulid) -> Option<&Field> {
        self.id_index.get(id).map(|&i| &self.fields[i])
    }

    /// Like [`field_by_name`](Self::field_by_name), failing when the name is unknown.
    pub fn require_field(&self, name: &str) -> Result<&Field> {
        self.field_by_name(name)
            .ok_or_else(|| FieldsError::FieldNotFound {
                name: name.to_string(),
            })
    }

    /// 1-based position of a field.
    pub fn position_of(&self, id: &Ulid) -> Option<usize> {
        self.id_index.get(id).map(|&i| i + 1)
    }

    // --- List edits ---

    /// Append a field at the bottom of the list. Returns its position.
    pub fn push_field(&mut self, field: Field) -> Result<usize> {
        let position = self.fields.len() + 1;
        self.insert_field_at(field, position)
    }

    /// Insert a field at `position`, shifting later fields down.
    /// Positions past the end append.
    pub fn insert_field_at(&mut self, field: Field, position: usize) -> Result<usize> {
        self.check_field(&field, None)?;
        let idx = clamp_index(position, self.fields.len());
        debug!(section = %self.title, field = %field.name(), position = idx + 1, "adding field");
        self.fields.insert(idx, field);
        self.reindex();
        Ok(idx + 1)
    }

    /// Replace a field with an edited version carrying the same id.
    pub fn update_field(&mut self, field: Field) -> Result<()> {
        let idx = self.index_of(&field.id())?;
        self.check_field(&field, Some(idx))?;
        debug!(section = %self.title, field = %field.name(), "updating field");
        self.fields[idx] = field;
        self.reindex();
        Ok(())
    }

    /// Remove a field, closing the gap it leaves.
    pub fn remove_field(&mut self, id: &Ulid) -> Result<Field> {
        let idx = self.index_of(id)?;
        let field = self.fields.remove(idx);
        debug!(section = %self.title, field = %field.name(), "removed field");
        self.reindex();
        Ok(field)
    }

    /// Move a field to `position`. Out-of-range positions clamp to the ends.
    pub fn move_field(&mut self, id: &Ulid, position: usize) -> Result<usize> {
        let from = self.index_of(id)?;
        let field = self.fields.remove(from);
        let to = clamp_index(position, self.fields.len());
        self.fields.insert(to, field);
        self.reindex();
        Ok(to + 1)
    }

    // --- Interpretation ---

    /// Interpret every field onto `target` in position order.
    ///
    /// `overrides` is keyed by field name. The target is checked once up
    /// front so an invalid target receives no declarations at all.
    pub fn interpret_to<'t>(
        &self,
        target: &'t mut dyn ModelTarget,
        accessibility: Accessibility,
        overrides: &FieldOverrides,
    ) -> Result<&'t mut dyn ModelTarget> {
        check_model_validity(&*target)?;
        debug!(
            section = %self.title,
            model = target.model_name(),
            fields = self.fields.len(),
            "interpreting section"
        );
        for field in &self.fields {
            let field_overrides = overrides.get(field.name()).unwrap_or(&NO_OVERRIDES);
            let cx = Interpretation::new(field_overrides).with_accessibility(accessibility);
            field.interpret_to(&mut *target, cx)?;
        }
        Ok(target)
    }

    /// [`interpret_to`](Self::interpret_to) with the configured default accessibility
    /// and no overrides.
    pub fn interpret_default<'t>(
        &self,
        target: &'t mut dyn ModelTarget,
    ) -> Result<&'t mut dyn ModelTarget> {
        self.interpret_to(
            target,
            self.config.default_accessibility,
            &FieldOverrides::new(),
        )
    }

    // --- Internal ---

    fn check_field(&self, field: &Field, replacing: Option<usize>) -> Result<()> {
        validate_name(field.name(), &self.config)?;
        if field.label().trim().is_empty() {
            return Err(FieldsError::BlankLabel {
                name: field.name().to_string(),
            });
        }
        if let Some(&idx) = self.name_index.get(field.name()) {
            if Some(idx) != replacing {
                return Err(FieldsError::DuplicateFieldName {
                    name: field.name().to_string(),
                });
            }
        }
        if let Some(&idx) = self.id_index.get(&field.id()) {
            if Some(idx) != replacing {
                return Err(FieldsError::DuplicateFieldId {
                    id: field.id().to_string(),
                });
            }
        }
        Ok(())
    }

    fn index_of(&self, id: &Ulid) -> Result<usize> {
        self.id_index
            .get(id)
            .copied()
            .ok_or_else(|| FieldsError::FieldNotFoundById { id: id.to_string() })
    }

    fn reindex(&mut self) {
        self.name_index.clear();
        self.id_index.clear();
        for (idx, field) in self.fields.iter().enumerate() {
            self.name_index.insert(field.name().to_string(), idx);
            self.id_index.insert(field.id(), idx);
        }
    }
}

/// Convert a 1-based position into an insertion index within `0..=len`.
fn clamp_index(position: usize, len: usize) -> usize {
    position.saturating_sub(1).min(len)
}

/// Persisted shape of a section: its fields in position order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    #[serde(default = "Ulid::new")]
    pub id: Ulid,
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FieldRecord>,
}

impl SectionRecord {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::BuiltinKind;
    use crate::model::VirtualModel;
    use crate::types::{Settings, StoredType};
    use serde_json::{json, Value};

    fn section() -> Section {
        Section::new("About you", FormCoreConfig::default())
    }

    fn text(name: &str) -> Field {
        Field::new(name, BuiltinKind::TextField)
    }

    fn names(section: &Section) -> Vec<&str> {
        section.fields().iter().map(Field::name).collect()
    }

    #[test]
    fn test_push_appends_in_order() {
        let mut section = section();
        assert_eq!(section.push_field(text("first_name")).unwrap(), 1);
        assert_eq!(section.push_field(text("last_name")).unwrap(), 2);
        assert_eq!(names(&section), ["first_name", "last_name"]);
        assert_eq!(section.len(), 2);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut section = section();
        section.push_field(text("email")).unwrap();
        let err = section.push_field(text("email")).unwrap_err();
        assert!(matches!(err, FieldsError::DuplicateFieldName { .. }));
        assert_eq!(section.len(), 1);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut section = section();
        let alpha = text("alpha");
        let id = alpha.id();
        section.push_field(alpha.clone()).unwrap();

        let mut beta = alpha;
        beta.set_name("beta");
        let err = section.push_field(beta).unwrap_err();
        assert!(matches!(err, FieldsError::DuplicateFieldId { .. }));
        assert_eq!(names(&section), ["alpha"]);
        assert_eq!(section.field_by_id(&id).unwrap().name(), "alpha");

        let mut edited = section.field_by_id(&id).unwrap().clone();
        edited.set_label("Alpha");
        section.update_field(edited).unwrap();
        assert_eq!(section.field_by_id(&id).unwrap().label(), "Alpha");
    }

    #[test]
    fn test_same_name_allowed_in_different_sections() {
        let mut a = section();
        let mut b = section();
        a.push_field(text("email")).unwrap();
        assert!(b.push_field(text("email")).is_ok());
    }

    #[test]
    fn test_naming_rules_apply_on_add() {
        let mut section = section();
        assert!(matches!(
            section.push_field(text("type")),
            Err(FieldsError::ReservedFieldName { .. })
        ));
        assert!(matches!(
            section.push_field(text("First")),
            Err(FieldsError::InvalidFieldName { .. })
        ));
        assert!(matches!(
            section.push_field(text("notes").with_label("  ")),
            Err(FieldsError::BlankLabel { .. })
        ));
        assert!(section.is_empty());
    }

    #[test]
    fn test_insert_and_move_keep_positions_contiguous() {
        let mut section = section();
        let a = text("a");
        let c = text("c");
        let c_id = c.id();
        section.push_field(a).unwrap();
        section.push_field(c).unwrap();
        assert_eq!(section.insert_field_at(text("b"), 2).unwrap(), 2);
        assert_eq!(names(&section), ["a", "b", "c"]);

        assert_eq!(section.move_field(&c_id, 1).unwrap(), 1);
        assert_eq!(names(&section), ["c", "a", "b"]);
        assert_eq!(section.position_of(&c_id), Some(1));

        assert_eq!(section.move_field(&c_id, 99).unwrap(), 3);
        assert_eq!(names(&section), ["a", "b", "c"]);
    }

    #[test]
    fn test_remove_closes_the_gap() {
        let mut section = section();
        let b = text("b");
        let b_id = b.id();
        section.push_field(text("a")).unwrap();
        section.push_field(b).unwrap();
        let c = text("c");
        let c_id = c.id();
        section.push_field(c).unwrap();

        let removed = section.remove_field(&b_id).unwrap();
        assert_eq!(removed.name(), "b");
        assert_eq!(names(&section), ["a", "c"]);
        assert_eq!(section.position_of(&c_id), Some(2));
        assert!(section.field_by_name("b").is_none());
        assert!(matches!(
            section.remove_field(&b_id),
            Err(FieldsError::FieldNotFoundById { .. })
        ));
    }

    #[test]
    fn test_update_allows_keeping_own_name_and_renaming() {
        let mut section = section();
        let field = text("email");
        let id = field.id();
        section.push_field(field).unwrap();
        section.push_field(text("phone")).unwrap();

        let mut edited = section.field_by_id(&id).unwrap().clone();
        edited.set_label("E-mail address");
        section.update_field(edited.clone()).unwrap();
        assert_eq!(section.field_by_name("email").unwrap().label(), "E-mail address");

        edited.set_name("phone");
        assert!(matches!(
            section.update_field(edited.clone()),
            Err(FieldsError::DuplicateFieldName { .. })
        ));

        edited.set_name("contact_email");
        section.update_field(edited).unwrap();
        assert!(section.field_by_name("email").is_none());
        assert_eq!(section.field_by_name("contact_email").unwrap().id(), id);
    }

    #[test]
    fn test_interpret_declares_every_field() {
        let mut section = section();
        section
            .push_field(
                Field::new("age", BuiltinKind::IntegerField)
                    .with_validations(json!({"presence": true}).as_object().cloned().unwrap()),
            )
            .unwrap();
        section.push_field(text("nickname")).unwrap();

        let mut overrides = FieldOverrides::new();
        overrides.insert("nickname".into(), Overrides::new().with_name("alias"));

        let mut model = VirtualModel::new("Profile");
        section
            .interpret_to(&mut model, Accessibility::ReadAndWrite, &overrides)
            .unwrap();

        let declared: Vec<_> = model.attributes().map(|a| a.name.as_str()).collect();
        assert_eq!(declared, ["age", "alias"]);
        assert_eq!(model.validations_for("age").count(), 1);
    }

    #[test]
    fn test_interpret_default_uses_configured_accessibility() {
        let config = FormCoreConfig {
            default_accessibility: Accessibility::ReadOnly,
            ..FormCoreConfig::default()
        };
        let mut section = Section::new("Summary", config);
        section
            .push_field(
                text("title")
                    .with_validations(json!({"presence": true}).as_object().cloned().unwrap()),
            )
            .unwrap();

        let mut model = VirtualModel::new("Summary");
        section.interpret_default(&mut model).unwrap();
        assert!(model.attribute_named("title").is_some());
        assert!(model.validations().is_empty());
    }

    #[test]
    fn test_record_round_trip_through_yaml() {
        let yaml = r#"
id: 01J0000000000000000000000B
title: Shipping
fields:
  - name: street
    label: Street
    type: text_field
    validations:
      presence: true
  - name: country
    label: Country
    type: choice_field
    options:
      choices: [NL, BE, DE]
"#;
        let record = SectionRecord::from_yaml(yaml).unwrap();
        let section =
            Section::from_record(record.clone(), &FieldKinds::builtin(), FormCoreConfig::default())
                .unwrap();
        assert_eq!(section.title(), "Shipping");
        assert_eq!(names(&section), ["street", "country"]);
        assert_eq!(section.require_field("country").unwrap().type_key(), "choice_field");
        assert!(matches!(
            section.require_field("zip"),
            Err(FieldsError::FieldNotFound { .. })
        ));

        let written = section.to_record().to_yaml().unwrap();
        let reparsed = SectionRecord::from_yaml(&written).unwrap();
        assert_eq!(reparsed, record);
    }

    #[test]
    fn test_record_with_duplicate_names_is_rejected() {
        let yaml = r#"
title: Broken
fields:
  - {name: email, label: Email, type: text_field}
  - {name: email, label: Email again, type: text_field}
"#;
        let record = SectionRecord::from_yaml(yaml).unwrap();
        let result =
            Section::from_record(record, &FieldKinds::builtin(), FormCoreConfig::default());
        assert!(matches!(result, Err(FieldsError::DuplicateFieldName { .. })));
    }

    #[test]
    fn test_record_with_duplicate_ids_is_rejected() {
        let yaml = r#"
title: Broken
fields:
  - {id: 01J0000000000000000000000C, name: email, label: Email, type: text_field}
  - {id: 01J0000000000000000000000C, name: phone, label: Phone, type: text_field}
"#;
        let record = SectionRecord::from_yaml(yaml).unwrap();
        let result =
            Section::from_record(record, &FieldKinds::builtin(), FormCoreConfig::default());
        assert!(matches!(result, Err(FieldsError::DuplicateFieldId { .. })));
    }

    #[derive(Debug, Default)]
    struct CountingTarget {
        declarations: usize,
    }

    impl ModelTarget for CountingTarget {
        fn model_name(&self) -> &str {
            "CountingTarget"
        }

        fn attribute(&mut self, _name: &str, _stored_type: StoredType, _default: Option<Value>) {
            self.declarations += 1;
        }

        fn validates(&mut self, _name: &str, _rules: Settings, _options: Settings) {
            self.declarations += 1;
        }
    }

    #[test]
    fn test_interpret_rejects_invalid_target_before_any_field() {
        let mut section = section();
        section.push_field(text("street")).unwrap();
        section.push_field(text("city")).unwrap();

        let mut target = CountingTarget::default();
        let err = section.interpret_default(&mut target).unwrap_err();
        assert!(matches!(err, FieldsError::InvalidTarget { .. }));
        assert_eq!(target.declarations, 0);
    }

    #[test]
    fn test_malformed_yaml_is_a_yaml_error() {
        let err = SectionRecord::from_yaml("title: [unclosed").unwrap_err();
        assert!(matches!(err, FieldsError::Yaml(_)));
    }
}
