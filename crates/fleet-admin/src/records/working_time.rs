//! Weekly working-time records.

use chrono::{Datelike, NaiveDate, Weekday};
use fleet_forms::fields::{char_field, checkbox_field, date_field, number_field, text_area_field};
use fleet_forms::{FieldConfig, FieldRules, FormBuilder};
use fleet_table::{Column, Row};
use serde::{Deserialize, Serialize};

use super::{date_cell, number_cell, optional_number, yes_no_badge, Collection, Resource};

/// Weekly working-time limit in hours.
pub const WEEKLY_LIMIT_HOURS: f64 = 60.0;

/// Average weekly limit in hours over the reference period.
pub const AVERAGE_LIMIT_HOURS: f64 = 48.0;

/// One driver's working week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingTimeRecord {
    /// Driver name.
    pub driver_name: String,
    /// Monday of the week.
    pub week_commencing: NaiveDate,
    /// Hours worked that week.
    #[serde(default, deserialize_with = "optional_number")]
    pub hours_worked: Option<f64>,
    /// Whether every break was taken.
    #[serde(default)]
    pub breaks_taken: bool,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
}

impl WorkingTimeRecord {
    /// Whether the week stays inside the average limit.
    pub fn is_compliant(&self) -> bool {
        self.breaks_taken && self.hours_worked.unwrap_or(0.0) <= AVERAGE_LIMIT_HOURS
    }
}

impl Row for WorkingTimeRecord {
    fn cell(&self, key: &str) -> Option<String> {
        match key {
            "driver_name" => Some(self.driver_name.clone()),
            "week_commencing" => Some(date_cell(Some(self.week_commencing))),
            "hours_worked" => Some(number_cell(self.hours_worked)),
            "breaks_taken" => Some(self.breaks_taken.to_string()),
            "compliant" => Some(self.is_compliant().to_string()),
            "notes" => Some(self.notes.clone()),
            _ => None,
        }
    }
}

impl Resource for WorkingTimeRecord {
    const COLLECTION: Collection = Collection::WorkingTime;
    const TITLE: &'static str = "Working time record";
    const TITLE_PLURAL: &'static str = "Working Time";

    fn form_fields() -> fleet_forms::Result<Vec<FieldConfig>> {
        FormBuilder::new()
            .field(char_field("driver_name", "Driver", 100, true))
            .field(
                date_field("week_commencing", "Week commencing", true, None, None)
                    .help_text("The Monday the week starts on."),
            )
            .field(number_field("hours_worked", "Hours worked", Some(0.0), Some(WEEKLY_LIMIT_HOURS)).required())
            .field(checkbox_field("breaks_taken", "All breaks taken", false))
            .field(text_area_field("notes", "Notes", false))
            .build()
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("driver_name", "Driver"),
            Column::new("week_commencing", "Week"),
            Column::new("hours_worked", "Hours"),
            Column::new("compliant", "Within average")
                .render(|w: &WorkingTimeRecord| yes_no_badge(w.is_compliant())),
        ]
    }

    fn rules() -> FieldRules {
        FieldRules::new().rule("week_commencing", |value| match value.as_date() {
            Some(date) if date.weekday() != Weekday::Mon => {
                Err("Weeks start on a Monday.".to_string())
            }
            _ => Ok(()),
        })
    }
}
