//! Boolean field types.

use crate::field::{FieldConfig, FieldType};

/// Creates a checkbox. A required checkbox must be ticked.
pub fn checkbox_field(name: &str, label: &str, required: bool) -> FieldConfig {
    let field = FieldConfig::new(name, label, FieldType::Checkbox);
    if required {
        field.required()
    } else {
        field
    }
}

/// Creates a switch.
pub fn switch_field(name: &str, label: &str) -> FieldConfig {
    FieldConfig::new(name, label, FieldType::Switch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;

    #[test]
    fn test_toggles_default_to_false() {
        let field = switch_field("active", "Active");
        assert_eq!(FieldValue::empty_for(&field), FieldValue::Bool(false));
        assert!(checkbox_field("consent", "Consent", true).required);
    }
}
