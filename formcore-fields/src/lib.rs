//! Form field definitions interpreted onto virtual models
//!
//! `formcore-fields` turns persisted field metadata (name, kind, validations,
//! options) into attribute and validation declarations on a dynamically
//! defined model. Storage, localization and UI belong to the caller.
//!
//! # Architecture
//!
//! - **One protocol**: [`Field`], [`ValidationSpec`] and [`OptionSpec`] all
//!   implement [`Interpretable`]
//! - **Kinds as hooks**: a [`FieldKind`] picks the stored type and default and
//!   may override how validations and extra options are interpreted
//! - **Overrides are per call**: specs are duplicated before merging, the
//!   field itself is never touched
//! - **Sections own bookkeeping**: name rules, uniqueness and ordering live in
//!   [`Section`], not in the interpretation path

pub mod config;
pub mod error;
pub mod field;
pub mod interpret;
pub mod kind;
pub mod model;
pub mod naming;
pub mod options;
pub mod section;
pub mod types;
pub mod validations;

pub use config::FormCoreConfig;
pub use error::{FieldsError, Result};
pub use field::{Field, FieldRecord};
pub use interpret::{Interpretable, Interpretation};
pub use kind::{AbstractField, BuiltinKind, FieldKind, FieldKinds, PlainField};
pub use model::{check_model_validity, AttributeDecl, ModelTarget, ValidationDecl, VirtualModel};
pub use naming::validate_name;
pub use options::OptionSpec;
pub use section::{FieldOverrides, Section, SectionRecord};
pub use types::{Accessibility, Overrides, Settings, StoredType};
pub use validations::ValidationSpec;
