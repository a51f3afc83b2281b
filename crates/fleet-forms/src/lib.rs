//! # fleet-forms
//!
//! Schema-validated form engine with Bootstrap 5 widgets.
//!
//! This crate provides:
//! - A closed set of field types, each with one widget and one coercion rule
//! - Per-field validators and whole-form [`Schema`]s
//! - The [`FormEngine`], which owns field state and runs submissions
//! - Object-URL previews for file fields
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use fleet_forms::fields::{char_field, number_field};
//! use fleet_forms::{FieldRules, FormBuilder, FormEngine, FormValues, MemoryUrlRegistry};
//!
//! let fields = FormBuilder::new()
//!     .field(char_field("name", "Name", 100, true))
//!     .field(number_field("age", "Age", Some(16.0), None))
//!     .build()
//!     .unwrap();
//!
//! let mut form = FormEngine::new(
//!     fields,
//!     FieldRules::new(),
//!     FormValues::new(),
//!     Arc::new(MemoryUrlRegistry::new()),
//! )
//! .unwrap();
//!
//! form.input("name", "Alice").unwrap();
//! let html = form.render("/drivers", "post", "/drivers");
//! assert!(html.contains(r#"name="name""#));
//! ```
//!
//! ## Validation
//!
//! Validation only runs on submit. A field's error disappears as soon as that
//! field is edited again.
//!
//! ```rust
//! use fleet_forms::validation::{EmailValidator, Validator};
//! use fleet_forms::FieldValue;
//!
//! let validator = EmailValidator::new();
//! assert!(validator.validate(&FieldValue::from("ops@fleet.example")).is_ok());
//! assert!(validator.validate(&FieldValue::from("ops")).is_err());
//! ```

mod error;
mod field;
pub mod fields;
mod form;
mod schema;
mod upload;
pub mod validation;
mod value;
pub mod widgets;

pub use error::{FormError, Result, ValidationErrors, NON_FIELD_ERRORS};
pub use field::{check_fields, FieldConfig, FieldOption, FieldType, FormBuilder};
pub use form::{
    render_bootstrap_field, FormEngine, SubmitFlag, SubmitGuard, SubmitOutcome,
};
pub use schema::{schema_fn, FieldRules, JsonSchema, Rejection, Schema, SchemaFn, Typed};
pub use upload::{FilePreviews, MemoryUrlRegistry, PreviewUrl, UrlRegistry};
pub use value::{FieldValue, FormValues, UploadedFile, DATE_FORMAT};
