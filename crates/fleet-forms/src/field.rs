//! Declarative field model shared by every form.

use std::collections::HashSet;

use crate::error::{FormError, Result};
use crate::validation::Validator;

/// The closed set of input kinds a form can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Single-line text input.
    Text,
    /// Email input.
    Email,
    /// Password input.
    Password,
    /// Numeric input; the value stays a numeric string.
    Number,
    /// Multi-line text input.
    Textarea,
    /// Dropdown with one selectable option.
    Select,
    /// Group of mutually exclusive radio inputs.
    Radio,
    /// Single checkbox.
    Checkbox,
    /// Checkbox rendered as an on/off switch.
    Switch,
    /// Read-only text input with a popup calendar.
    Date,
    /// Drop target with a hidden native file picker.
    File,
}

impl FieldType {
    /// Every field type, in declaration order.
    pub const ALL: [FieldType; 11] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Password,
        FieldType::Number,
        FieldType::Textarea,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::Switch,
        FieldType::Date,
        FieldType::File,
    ];

    /// Returns the type tag as used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Number => "number",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Switch => "switch",
            Self::Date => "date",
            Self::File => "file",
        }
    }

    /// Parses a type tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// Returns whether the field picks its value from `options`.
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::Select | Self::Radio)
    }

    /// Returns whether the value is a plain string.
    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            Self::Text
                | Self::Email
                | Self::Password
                | Self::Number
                | Self::Textarea
                | Self::Select
                | Self::Radio
        )
    }

    /// Returns whether the value is a boolean toggle.
    pub fn is_toggle(&self) -> bool {
        matches!(self, Self::Checkbox | Self::Switch)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable option of a select or radio field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOption {
    /// Text shown to the user.
    pub label: String,
    /// Value written to the form state.
    pub value: String,
}

impl FieldOption {
    /// Creates an option.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Definition of a form field.
pub struct FieldConfig {
    /// Field name; a key of the form's output.
    pub name: String,
    /// Field label.
    pub label: String,
    /// The kind of input.
    pub field_type: FieldType,
    /// Placeholder text.
    pub placeholder: Option<String>,
    /// Whether the field is required.
    pub required: bool,
    /// Options for select and radio fields.
    pub options: Vec<FieldOption>,
    /// Whether a file field accepts several files.
    pub multiple: bool,
    /// Accepted MIME types for file fields (e.g. `image/*`).
    pub accept: Option<String>,
    /// Help text.
    pub help_text: Option<String>,
    /// Whether the field is disabled.
    pub disabled: bool,
    /// Validators applied by [`FieldRules`](crate::FieldRules).
    pub validators: Vec<Box<dyn Validator>>,
}

impl std::fmt::Debug for FieldConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldConfig")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("field_type", &self.field_type)
            .field("placeholder", &self.placeholder)
            .field("required", &self.required)
            .field("options", &self.options)
            .field("multiple", &self.multiple)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

impl FieldConfig {
    /// Creates a new field definition.
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            placeholder: None,
            required: false,
            options: Vec::new(),
            multiple: false,
            accept: None,
            help_text: None,
            disabled: false,
            validators: Vec::new(),
        }
    }

    /// Makes the field required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets placeholder text.
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    /// Adds a selectable option from a value and its label.
    #[must_use]
    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(FieldOption::new(label, value));
        self
    }

    /// Replaces the options with `(value, label)` pairs.
    #[must_use]
    pub fn options(mut self, choices: Vec<(impl Into<String>, impl Into<String>)>) -> Self {
        self.options = choices
            .into_iter()
            .map(|(value, label)| FieldOption::new(label, value))
            .collect();
        self
    }

    /// Lets a file field hold several files.
    #[must_use]
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Restricts the MIME types offered by the file picker.
    #[must_use]
    pub fn accept(mut self, mime: impl Into<String>) -> Self {
        self.accept = Some(mime.into());
        self
    }

    /// Sets help text.
    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    /// Disables the field.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Adds a validator.
    #[must_use]
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Returns the option whose value equals `value`.
    pub fn find_option(&self, value: &str) -> Option<&FieldOption> {
        self.options.iter().find(|o| o.value == value)
    }

    /// Checks the invariants of a single field.
    pub fn check(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FormError::InvalidConfig {
                field: self.name.clone(),
                message: "name must not be empty".to_string(),
            });
        }
        if self.field_type.is_choice() && self.options.is_empty() {
            return Err(FormError::InvalidConfig {
                field: self.name.clone(),
                message: format!("{} fields need at least one option", self.field_type),
            });
        }
        if self.multiple && self.field_type != FieldType::File {
            return Err(FormError::InvalidConfig {
                field: self.name.clone(),
                message: "only file fields accept multiple values".to_string(),
            });
        }
        Ok(())
    }
}

/// Checks a whole field list: every field is valid and names are unique.
pub fn check_fields(fields: &[FieldConfig]) -> Result<()> {
    let mut seen = HashSet::new();
    for field in fields {
        field.check()?;
        if !seen.insert(field.name.as_str()) {
            return Err(FormError::InvalidConfig {
                field: field.name.clone(),
                message: "duplicate field name".to_string(),
            });
        }
    }
    Ok(())
}

/// A simple form builder for creating forms programmatically.
#[derive(Debug, Default)]
pub struct FormBuilder {
    fields: Vec<FieldConfig>,
}

impl FormBuilder {
    /// Creates a new form builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field to the form.
    #[must_use]
    pub fn field(mut self, field: FieldConfig) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns the field definitions after checking their invariants.
    pub fn build(self) -> Result<Vec<FieldConfig>> {
        check_fields(&self.fields)?;
        Ok(self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags_round_trip() {
        for ty in FieldType::ALL {
            assert_eq!(FieldType::from_tag(ty.as_str()), Some(ty));
        }
        assert_eq!(FieldType::from_tag("color"), None);
    }

    #[test]
    fn test_field_builder() {
        let field = FieldConfig::new("status", "Status", FieldType::Select)
            .required()
            .placeholder("Pick a status")
            .options(vec![("active", "Active"), ("sold", "Sold")]);

        assert_eq!(field.name, "status");
        assert!(field.required);
        assert_eq!(field.options.len(), 2);
        assert_eq!(field.find_option("sold").map(|o| o.label.as_str()), Some("Sold"));
    }

    #[test]
    fn test_choice_field_requires_options() {
        let field = FieldConfig::new("status", "Status", FieldType::Radio);
        assert!(matches!(
            field.check(),
            Err(FormError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_multiple_only_on_file_fields() {
        let field = FieldConfig::new("notes", "Notes", FieldType::Text).multiple();
        assert!(field.check().is_err());
        let field = FieldConfig::new("photos", "Photos", FieldType::File).multiple();
        assert!(field.check().is_ok());
    }

    #[test]
    fn test_builder_rejects_duplicate_names() {
        let result = FormBuilder::new()
            .field(FieldConfig::new("name", "Name", FieldType::Text))
            .field(FieldConfig::new("name", "Other", FieldType::Text))
            .build();

        match result {
            Err(FormError::InvalidConfig { field, .. }) => assert_eq!(field, "name"),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }
}
