//! Popup calendar state for date fields.

use chrono::{Datelike, Months, NaiveDate};

/// Key that opens the calendar from the keyboard.
pub const CALENDAR_KEY: &str = "Enter";

/// Key that closes an open calendar without picking a date.
pub const CLOSE_KEY: &str = "Escape";

/// Open/closed state and displayed month of one date field's calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarState {
    open: bool,
    month: NaiveDate,
}

impl CalendarState {
    /// Creates a closed calendar showing the month of `reference`.
    pub fn new(reference: NaiveDate) -> Self {
        Self {
            open: false,
            month: first_of_month(reference),
        }
    }

    /// Returns whether the popup is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns the first day of the displayed month.
    pub fn month(&self) -> NaiveDate {
        self.month
    }

    /// Opens the popup on the month of `reference`.
    pub fn open_at(&mut self, reference: NaiveDate) {
        self.open = true;
        self.month = first_of_month(reference);
    }

    /// Closes the popup.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Moves the displayed month by `delta` months.
    pub fn shift(&mut self, delta: i32) {
        let months = Months::new(delta.unsigned_abs());
        let shifted = if delta >= 0 {
            self.month.checked_add_months(months)
        } else {
            self.month.checked_sub_months(months)
        };
        if let Some(month) = shifted {
            self.month = month;
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Returns the weeks of `month` as Monday-first rows; days outside the month
/// are `None`.
pub fn month_grid(month: NaiveDate) -> Vec<[Option<NaiveDate>; 7]> {
    let first = first_of_month(month);
    let lead = first.weekday().num_days_from_monday() as usize;

    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut slot = lead;
    let mut day = Some(first);

    while let Some(current) = day.filter(|d| d.month() == first.month()) {
        week[slot] = Some(current);
        slot += 1;
        if slot == 7 {
            weeks.push(week);
            week = [None; 7];
            slot = 0;
        }
        day = current.succ_opt();
    }
    if slot > 0 {
        weeks.push(week);
    }
    weeks
}
