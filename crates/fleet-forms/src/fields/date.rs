//! Date field type.

use chrono::NaiveDate;

use crate::field::{FieldConfig, FieldType};
use crate::validation::DateRangeValidator;

/// Creates a date field, optionally bounded.
pub fn date_field(
    name: &str,
    label: &str,
    required: bool,
    not_before: Option<NaiveDate>,
    not_after: Option<NaiveDate>,
) -> FieldConfig {
    let mut field = FieldConfig::new(name, label, FieldType::Date).placeholder("Pick a date");
    if not_before.is_some() || not_after.is_some() {
        field = field.validator(DateRangeValidator::new(not_before, not_after));
    }
    if required {
        field = field.required();
    }
    field
}
