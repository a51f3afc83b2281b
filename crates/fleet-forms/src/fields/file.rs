//! File field type.

use crate::field::{FieldConfig, FieldType};
use crate::validation::{FileTypeValidator, MaxFilesValidator};

/// Creates a file field.
///
/// `accept` is a MIME filter such as `image/*`; when set, selected files are
/// also checked against it. `max_files` only applies to `multiple` fields.
pub fn file_field(
    name: &str,
    label: &str,
    multiple: bool,
    accept: Option<&str>,
    max_files: Option<usize>,
) -> FieldConfig {
    let mut field = FieldConfig::new(name, label, FieldType::File);
    if multiple {
        field = field.multiple();
        if let Some(max) = max_files {
            field = field.validator(MaxFilesValidator::new(max));
        }
    }
    if let Some(mime) = accept {
        let prefixes: Vec<&str> = mime
            .split(',')
            .map(|m| m.trim().trim_end_matches('*'))
            .filter(|m| !m.is_empty())
            .collect();
        field = field
            .accept(mime)
            .validator(FileTypeValidator::new(&prefixes));
    }
    field
}
