//! Text field types.

use crate::field::{FieldConfig, FieldType};
use crate::validation::{EmailValidator, MaxLengthValidator, MinLengthValidator, RangeValidator};

/// Creates a single-line text field with a maximum length.
pub fn char_field(name: &str, label: &str, max_length: usize, required: bool) -> FieldConfig {
    let field = FieldConfig::new(name, label, FieldType::Text)
        .validator(MaxLengthValidator::new(max_length));
    if required {
        field.required()
    } else {
        field
    }
}

/// Creates a multi-line text field.
pub fn text_area_field(name: &str, label: &str, required: bool) -> FieldConfig {
    let field = FieldConfig::new(name, label, FieldType::Textarea);
    if required {
        field.required()
    } else {
        field
    }
}

/// Creates an email field.
pub fn email_field(name: &str, label: &str, required: bool) -> FieldConfig {
    let field =
        FieldConfig::new(name, label, FieldType::Email).validator(EmailValidator::new());
    if required {
        field.required()
    } else {
        field
    }
}

/// Creates a required password field.
pub fn password_field(name: &str, label: &str, min_length: Option<usize>) -> FieldConfig {
    let field = FieldConfig::new(name, label, FieldType::Password).required();
    match min_length {
        Some(min) => field.validator(MinLengthValidator::new(min)),
        None => field,
    }
}

/// Creates a numeric field. Its value stays a string; the bounds are checked
/// on the parsed number.
pub fn number_field(name: &str, label: &str, min: Option<f64>, max: Option<f64>) -> FieldConfig {
    FieldConfig::new(name, label, FieldType::Number).validator(RangeValidator::new(min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;

    #[test]
    fn test_char_field() {
        let field = char_field("registration", "Registration", 8, true);
        assert_eq!(field.name, "registration");
        assert!(field.required);
        assert_eq!(field.validators.len(), 1);
        assert!(field.validators[0]
            .validate(&FieldValue::from("AB12 CDEF9"))
            .is_err());
    }

    #[test]
    fn test_email_field() {
        let field = email_field("email", "Email address", false);
        assert_eq!(field.field_type, FieldType::Email);
        assert!(!field.required);
    }

    #[test]
    fn test_password_field() {
        let field = password_field("password", "Password", Some(8));
        assert!(field.required);
        assert_eq!(field.validators.len(), 1);
    }

    #[test]
    fn test_number_field_bounds() {
        let field = number_field("axles", "Axles", Some(2.0), Some(6.0));
        let validator = &field.validators[0];
        assert!(validator.validate(&FieldValue::from("3")).is_ok());
        assert!(validator.validate(&FieldValue::from("9")).is_err());
    }
}
