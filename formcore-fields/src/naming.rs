//! Field name rules checked before a field joins a section.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::FormCoreConfig;
use crate::error::{FieldsError, Result};

/// Pattern every field name must match.
pub const NAME_PATTERN: &str = r"^[a-z_][a-z_0-9]*$";

static NAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(NAME_PATTERN).unwrap());

/// Check a name is present, well-formed and not reserved.
///
/// Uniqueness depends on the sibling fields and is checked by the section.
pub fn validate_name(name: &str, config: &FormCoreConfig) -> Result<()> {
    if name.is_empty() {
        return Err(FieldsError::BlankFieldName);
    }
    if config.is_reserved(name) {
        return Err(FieldsError::ReservedFieldName {
            name: name.to_string(),
        });
    }
    if !NAME_REGEX.is_match(name) {
        return Err(FieldsError::InvalidFieldName {
            name: name.to_string(),
            pattern: NAME_PATTERN,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_snake_case_names() {
        let config = FormCoreConfig::default();
        for name in ["age", "_hidden", "line_2", "a"] {
            assert!(validate_name(name, &config).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_rejects_malformed_names() {
        let config = FormCoreConfig::default();
        for name in ["Age", "2nd", "first-name", "with space", "ünïcode", "age\n"] {
            assert!(
                matches!(
                    validate_name(name, &config),
                    Err(FieldsError::InvalidFieldName { .. })
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_blank_names() {
        let config = FormCoreConfig::default();
        assert!(matches!(
            validate_name("", &config),
            Err(FieldsError::BlankFieldName)
        ));
    }

    #[test]
    fn test_rejects_reserved_names() {
        let config = FormCoreConfig::default();
        assert!(matches!(
            validate_name("id", &config),
            Err(FieldsError::ReservedFieldName { .. })
        ));

        let mut custom = FormCoreConfig::default();
        custom.reserved_names.insert("status".into());
        assert!(validate_name("status", &FormCoreConfig::default()).is_ok());
        assert!(validate_name("status", &custom).is_err());
    }
}
