//! Errors raised by the form engine and the messages it attaches to fields.

use std::collections::BTreeMap;

use thiserror::Error;

/// Key under which errors not attributable to a single field are stored.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Failures of form configuration, input or submission.
#[derive(Debug, Error)]
pub enum FormError {
    /// The field list violates a configuration invariant.
    #[error("invalid configuration for field {field}: {message}")]
    InvalidConfig { field: String, message: String },

    /// No field with this name is registered on the form.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A value of the wrong shape was written to a field.
    #[error("invalid value for field {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// The validator itself failed, without attributing the failure to a field.
    #[error("validation failed: {0}")]
    SchemaFailure(String),

    /// The submission callback failed.
    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    /// A submit was attempted while another one is still running.
    #[error("a submission is already in progress")]
    AlreadySubmitting,

    /// Creating or revoking a preview URL failed.
    #[error("preview error: {0}")]
    Preview(String),
}

/// Messages attached to a form, per field.
///
/// Keys are field names, or [`NON_FIELD_ERRORS`] for messages about the form
/// as a whole. Iteration is ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    by_field: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// No errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.by_field
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Appends a message about the whole form.
    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD_ERRORS, message);
    }

    /// Drops the messages of one field. Returns whether it had any.
    pub fn clear_field(&mut self, field: &str) -> bool {
        self.by_field.remove(field).is_some()
    }

    pub fn clear(&mut self) {
        self.by_field.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }

    /// Number of keys carrying messages, `__all__` included.
    pub fn len(&self) -> usize {
        self.by_field.len()
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.by_field.get(field)
    }

    /// The first message of `field`, which is what inline rendering shows.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.by_field
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Messages stored under [`NON_FIELD_ERRORS`].
    pub fn non_field(&self) -> &[String] {
        self.get(NON_FIELD_ERRORS)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Moves every message of `other` into `self`.
    pub fn extend(&mut self, other: ValidationErrors) {
        for (field, messages) in other.by_field {
            self.by_field.entry(field).or_default().extend(messages);
        }
    }

    /// Iterates `(field, messages)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.by_field
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Copies the messages out, e.g. for a JSON body.
    pub fn to_map(&self) -> BTreeMap<String, Vec<String>> {
        self.by_field.clone()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (field, messages) in self.iter() {
            for message in messages {
                writeln!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_clear_field() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "Enter a valid email address.");
        errors.add("email", "This field is required.");
        errors.add_non_field("Passwords do not match.");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first("email"), Some("Enter a valid email address."));
        assert_eq!(errors.non_field(), ["Passwords do not match.".to_string()]);

        assert!(errors.clear_field("email"));
        assert!(!errors.clear_field("email"));
        assert!(errors.get("email").is_none());
    }

    #[test]
    fn test_display_is_sorted() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "too short");
        errors.add("age", "not a number");
        assert_eq!(errors.to_string(), "age: not a number\nname: too short\n");
    }
}
