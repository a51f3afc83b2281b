//! Whole-form validation schemas.
//!
//! A [`Schema`] receives the complete value map on submit and either returns
//! the typed output handed to the submit callback or rejects the payload.
//! Rejections with field attribution surface inline; anything else is a
//! generic failure.

use std::marker::PhantomData;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{validator_for, ValidationError, Validator as JsonValidator};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{FormError, ValidationErrors, NON_FIELD_ERRORS};
use crate::field::FieldConfig;
use crate::value::{FieldValue, FormValues};

/// Why a schema refused a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// Messages keyed by field name (`__all__` for form-level messages).
    Fields(ValidationErrors),
    /// The validator failed without attributing the failure to any field.
    Failed(String),
}

impl From<ValidationErrors> for Rejection {
    fn from(errors: ValidationErrors) -> Self {
        Self::Fields(errors)
    }
}

/// A validator over the whole value map.
pub trait Schema: Send + Sync {
    /// Typed data produced by a successful validation.
    type Output;

    /// Validates `values`; `fields` describes the form being submitted.
    fn validate(
        &self,
        values: &FormValues,
        fields: &[FieldConfig],
    ) -> std::result::Result<Self::Output, Rejection>;
}

type ValueRule = Box<dyn Fn(&FieldValue) -> Result<(), String> + Send + Sync>;
type FormCheck = Box<dyn Fn(&FormValues) -> Result<(), String> + Send + Sync>;

/// Schema assembled from the fields' own validators plus custom rules.
///
/// Required fields are checked first; a missing required value skips the
/// field's other validators. Form-level checks only run once every field is
/// valid, and report under `__all__`.
#[derive(Default)]
pub struct FieldRules {
    rules: Vec<(String, ValueRule)>,
    checks: Vec<FormCheck>,
}

impl FieldRules {
    /// Creates rules that only apply the field validators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule for one field.
    #[must_use]
    pub fn rule<F>(mut self, field: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&FieldValue) -> Result<(), String> + Send + Sync + 'static,
    {
        self.rules.push((field.into(), Box::new(rule)));
        self
    }

    /// Adds a cross-field check.
    #[must_use]
    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn(&FormValues) -> Result<(), String> + Send + Sync + 'static,
    {
        self.checks.push(Box::new(check));
        self
    }

    fn field_errors(&self, values: &FormValues, fields: &[FieldConfig]) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        for field in fields {
            let empty = FieldValue::empty_for(field);
            let value = values.get(&field.name).unwrap_or(&empty);

            if field.required && value.is_empty() {
                errors.add(&field.name, "This field is required.");
                continue;
            }
            if field.field_type.is_choice() {
                if let Some(choice) = value.as_text().filter(|s| !s.is_empty()) {
                    if field.find_option(choice).is_none() {
                        errors.add(&field.name, "Select a valid choice.");
                        continue;
                    }
                }
            }
            for validator in &field.validators {
                if let Err(msg) = validator.validate(value) {
                    errors.add(&field.name, msg);
                }
            }
        }

        for (name, rule) in &self.rules {
            if errors.get(name).is_some() {
                continue;
            }
            let value = values.get(name).cloned().unwrap_or(FieldValue::Text(String::new()));
            if let Err(msg) = rule(&value) {
                errors.add(name, msg);
            }
        }

        errors
    }
}

impl Schema for FieldRules {
    type Output = FormValues;

    fn validate(
        &self,
        values: &FormValues,
        fields: &[FieldConfig],
    ) -> std::result::Result<FormValues, Rejection> {
        let mut errors = self.field_errors(values, fields);
        if errors.is_empty() {
            for check in &self.checks {
                if let Err(msg) = check(values) {
                    errors.add_non_field(msg);
                }
            }
        }

        if errors.is_empty() {
            Ok(values.clone())
        } else {
            Err(Rejection::Fields(errors))
        }
    }
}

/// Wraps a schema and deserializes its output into `T`.
pub struct Typed<S, T> {
    inner: S,
    _marker: PhantomData<fn() -> T>,
}

impl<S, T> Typed<S, T> {
    /// Wraps `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }
}

impl<S, T> Schema for Typed<S, T>
where
    S: Schema<Output = FormValues>,
    T: DeserializeOwned,
{
    type Output = T;

    fn validate(
        &self,
        values: &FormValues,
        fields: &[FieldConfig],
    ) -> std::result::Result<T, Rejection> {
        let values = self.inner.validate(values, fields)?;
        serde_json::from_value(values.to_json()).map_err(|e| Rejection::Failed(e.to_string()))
    }
}

/// A schema backed by a plain function.
pub struct SchemaFn<F> {
    f: F,
}

/// Creates a schema from a function over the value map.
pub fn schema_fn<F, T>(f: F) -> SchemaFn<F>
where
    F: Fn(&FormValues) -> std::result::Result<T, Rejection> + Send + Sync,
{
    SchemaFn { f }
}

impl<F, T> Schema for SchemaFn<F>
where
    F: Fn(&FormValues) -> std::result::Result<T, Rejection> + Send + Sync,
{
    type Output = T;

    fn validate(
        &self,
        values: &FormValues,
        _fields: &[FieldConfig],
    ) -> std::result::Result<T, Rejection> {
        (self.f)(values)
    }
}

/// Adapter over a compiled JSON Schema document.
///
/// Violations are attributed to the first segment of the error's instance
/// path; `required` violations are attributed to the missing property and
/// root-level violations land under `__all__`.
pub struct JsonSchema<T = Value> {
    validator: JsonValidator,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSchema<T> {
    /// Compiles a JSON Schema document.
    pub fn new(schema: &Value) -> crate::Result<Self> {
        let validator = validator_for(schema)
            .map_err(|e| FormError::SchemaFailure(format!("invalid JSON schema: {e}")))?;
        Ok(Self {
            validator,
            _marker: PhantomData,
        })
    }
}

fn error_field(error: &ValidationError<'_>) -> String {
    if let ValidationErrorKind::Required { property } = &error.kind {
        if let Some(name) = property.as_str() {
            return name.to_string();
        }
    }
    let pointer = error.instance_path.to_string();
    pointer
        .split('/')
        .find(|segment| !segment.is_empty())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .unwrap_or_else(|| NON_FIELD_ERRORS.to_string())
}

impl<T: DeserializeOwned> Schema for JsonSchema<T> {
    type Output = T;

    fn validate(
        &self,
        values: &FormValues,
        _fields: &[FieldConfig],
    ) -> std::result::Result<T, Rejection> {
        let instance = values.to_json();
        let mut errors = ValidationErrors::new();
        for error in self.validator.iter_errors(&instance) {
            errors.add(&error_field(&error), error.to_string());
        }
        if !errors.is_empty() {
            return Err(Rejection::Fields(errors));
        }
        serde_json::from_value(instance).map_err(|e| Rejection::Failed(e.to_string()))
    }
}
