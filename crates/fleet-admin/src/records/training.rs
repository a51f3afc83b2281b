//! Training records.

use chrono::NaiveDate;
use fleet_forms::fields::{char_field, date_field, number_field, select_field, text_area_field};
use fleet_forms::{FieldConfig, FieldRules, FormBuilder, FormValues};
use fleet_table::{Column, Row};
use serde::{Deserialize, Serialize};

use super::{date_cell, expiry_badge_today, number_cell, optional_number, Collection, Resource};

/// Courses the operator tracks.
pub const COURSES: &[(&str, &str)] = &[
    ("cpc", "Driver CPC periodic"),
    ("adr", "ADR dangerous goods"),
    ("first-aid", "First aid at work"),
    ("forklift", "Forklift"),
    ("tacho", "Tachograph rules"),
];

/// One completed course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    /// Who attended.
    pub driver_name: String,
    /// One of [`COURSES`].
    pub course: String,
    /// Completion date.
    pub completed_on: NaiveDate,
    /// When the certificate lapses, if it does.
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
    /// Hours credited.
    #[serde(default, deserialize_with = "optional_number")]
    pub hours: Option<f64>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
}

impl Row for TrainingRecord {
    fn cell(&self, key: &str) -> Option<String> {
        match key {
            "driver_name" => Some(self.driver_name.clone()),
            "course" => Some(
                COURSES
                    .iter()
                    .find(|(v, _)| *v == self.course)
                    .map_or(self.course.clone(), |(_, label)| label.to_string()),
            ),
            "completed_on" => Some(date_cell(Some(self.completed_on))),
            "expires_on" => Some(date_cell(self.expires_on)),
            "hours" => Some(number_cell(self.hours)),
            "notes" => Some(self.notes.clone()),
            _ => None,
        }
    }
}

impl Resource for TrainingRecord {
    const COLLECTION: Collection = Collection::Training;
    const TITLE: &'static str = "Training record";
    const TITLE_PLURAL: &'static str = "Training";

    fn form_fields() -> fleet_forms::Result<Vec<FieldConfig>> {
        FormBuilder::new()
            .field(char_field("driver_name", "Driver", 100, true))
            .field(select_field("course", "Course", COURSES.to_vec(), Some("Choose a course"), true))
            .field(date_field("completed_on", "Completed on", true, None, None))
            .field(date_field("expires_on", "Expires on", false, None, None))
            .field(number_field("hours", "Hours", Some(0.5), Some(35.0)))
            .field(text_area_field("notes", "Notes", false))
            .build()
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("driver_name", "Driver"),
            Column::new("course", "Course"),
            Column::new("completed_on", "Completed"),
            Column::new("expires_on", "Expires")
                .render(|t: &TrainingRecord| expiry_badge_today(t.expires_on)),
            Column::new("hours", "Hours"),
        ]
    }

    fn rules() -> FieldRules {
        FieldRules::new().check(|values: &FormValues| {
            let completed = values.get("completed_on").and_then(|v| v.as_date());
            let expires = values.get("expires_on").and_then(|v| v.as_date());
            match (completed, expires) {
                (Some(done), Some(lapse)) if lapse <= done => {
                    Err("The certificate must expire after the course was completed.".to_string())
                }
                _ => Ok(()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_forms::{Rejection, Schema, NON_FIELD_ERRORS};

    #[test]
    fn test_expiry_before_completion_is_a_form_error() {
        let fields = TrainingRecord::form_fields().unwrap();
        let values = FormValues::new()
            .with("driver_name", "Tom Reed")
            .with("course", "cpc")
            .with("completed_on", NaiveDate::from_ymd_opt(2025, 2, 10).unwrap())
            .with("expires_on", NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());

        match TrainingRecord::schema().validate(&values, &fields) {
            Err(Rejection::Fields(errors)) => {
                assert_eq!(errors.non_field().len(), 1);
                assert!(errors.get(NON_FIELD_ERRORS).is_some());
            }
            other => panic!("expected a form error, got {other:?}"),
        }
    }

    #[test]
    fn test_course_label_cell() {
        let record = TrainingRecord {
            driver_name: "Tom Reed".to_string(),
            course: "adr".to_string(),
            completed_on: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            expires_on: None,
            hours: Some(7.0),
            notes: String::new(),
        };
        assert_eq!(record.cell("course").as_deref(), Some("ADR dangerous goods"));
        assert_eq!(record.cell("hours").as_deref(), Some("7"));
        assert_eq!(record.cell("expires_on").as_deref(), Some(""));
    }
}
