//! Configuration for field bookkeeping, loaded with Figment.
//!
//! Sources in precedence order (later sources override earlier ones):
//! 1. Built-in defaults
//! 2. An optional configuration file (YAML, TOML or JSON by extension)
//! 3. Environment variables prefixed with `FORMCORE_`

use std::collections::BTreeSet;
use std::path::Path;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FieldsError, Result};
use crate::types::Accessibility;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "FORMCORE_";

/// Identifiers the model layer already uses. Fields may not take these names.
pub const DEFAULT_RESERVED_NAMES: &[&str] = &[
    "attributes",
    "class",
    "errors",
    "freeze",
    "hash",
    "id",
    "method",
    "model_name",
    "new",
    "object_id",
    "save",
    "self",
    "send",
    "super",
    "type",
    "valid",
    "validate",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormCoreConfig {
    /// Process-wide set of names fields can't use. Replaces the defaults when set.
    pub reserved_names: BTreeSet<String>,
    /// Accessibility used when a caller doesn't pick one.
    pub default_accessibility: Accessibility,
}

impl Default for FormCoreConfig {
    fn default() -> Self {
        Self {
            reserved_names: DEFAULT_RESERVED_NAMES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            default_accessibility: Accessibility::default(),
        }
    }
}

impl FormCoreConfig {
    /// Defaults plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::extract(Self::base_figment())
    }

    /// Defaults, then the file at `path`, then environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Figment::from(Yaml::file(path)),
            Some("toml") => Figment::from(Toml::file(path)),
            Some("json") => Figment::from(Json::file(path)),
            _ => {
                return Err(FieldsError::UnsupportedConfigFormat {
                    path: path.to_path_buf(),
                })
            }
        };
        debug!(path = %path.display(), "loading form configuration file");

        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(file)
            .merge(Env::prefixed(ENV_PREFIX));
        Self::extract(figment)
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_names.contains(name)
    }

    fn base_figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract()?;
        debug!(
            reserved = config.reserved_names.len(),
            accessibility = ?config.default_accessibility,
            "form configuration loaded"
        );
        Ok(config)
    }
}
