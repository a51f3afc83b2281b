//! Choice field types.

use crate::field::{FieldConfig, FieldType};

/// Creates a dropdown. `choices` are `(value, label)` pairs; the optional
/// placeholder becomes a disabled first option.
pub fn select_field(
    name: &str,
    label: &str,
    choices: Vec<(&str, &str)>,
    placeholder: Option<&str>,
    required: bool,
) -> FieldConfig {
    let mut field = FieldConfig::new(name, label, FieldType::Select).options(choices);
    if let Some(text) = placeholder {
        field = field.placeholder(text);
    }
    if required {
        field = field.required();
    }
    field
}

/// Creates a radio group from `(value, label)` pairs.
pub fn radio_field(name: &str, label: &str, choices: Vec<(&str, &str)>, required: bool) -> FieldConfig {
    let field = FieldConfig::new(name, label, FieldType::Radio).options(choices);
    if required {
        field.required()
    } else {
        field
    }
}
