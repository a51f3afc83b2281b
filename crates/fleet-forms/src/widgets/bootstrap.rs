//! Bootstrap 5 form widgets.

use chrono::NaiveDate;

use super::calendar::{month_grid, CALENDAR_KEY, CLOSE_KEY};
use super::{display_date, html_escape, FieldState, Widget, WidgetAttrs};
use crate::value::DATE_FORMAT;

/// Bootstrap 5 single-line input.
#[derive(Debug, Clone)]
pub struct BootstrapTextInput {
    /// The HTML input type (text, email, password, number).
    pub input_type: String,
    /// Placeholder text.
    pub placeholder: Option<String>,
}

impl Default for BootstrapTextInput {
    fn default() -> Self {
        Self {
            input_type: "text".to_string(),
            placeholder: None,
        }
    }
}

impl BootstrapTextInput {
    /// Creates a plain text input.
    pub fn new() -> Self {
        Self::default()
    }

    fn typed(input_type: &str) -> Self {
        Self {
            input_type: input_type.to_string(),
            ..Default::default()
        }
    }

    /// Creates a password input.
    pub fn password() -> Self {
        Self::typed("password")
    }

    /// Creates an email input.
    pub fn email() -> Self {
        Self::typed("email")
    }

    /// Creates a number input. The value stays a string.
    pub fn number() -> Self {
        Self::typed("number")
    }

    /// Sets the placeholder text.
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }
}

fn placeholder_attr(placeholder: Option<&String>) -> String {
    placeholder
        .map(|p| format!(r#" placeholder="{}""#, html_escape(p)))
        .unwrap_or_default()
}

impl Widget for BootstrapTextInput {
    fn render(&self, name: &str, state: &FieldState<'_>, attrs: &WidgetAttrs) -> String {
        let value = state.value.display();
        let value_attr = if value.is_empty() || self.input_type == "password" {
            String::new()
        } else {
            format!(r#" value="{}""#, html_escape(&value))
        };

        format!(
            r#"<input type="{}" class="{}" id="{}" name="{}"{value_attr}{}{}>"#,
            self.input_type,
            attrs.class_with("form-control"),
            attrs.id_for(name),
            name,
            placeholder_attr(self.placeholder.as_ref()),
            attrs.extra_html()
        )
    }

    fn input_type(&self) -> &str {
        &self.input_type
    }
}

/// Bootstrap 5 textarea.
#[derive(Debug, Clone)]
pub struct BootstrapTextarea {
    /// Number of visible rows.
    pub rows: usize,
    /// Placeholder text.
    pub placeholder: Option<String>,
}

impl BootstrapTextarea {
    /// Creates a textarea with `rows` visible rows.
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            placeholder: None,
        }
    }
}

impl Widget for BootstrapTextarea {
    fn render(&self, name: &str, state: &FieldState<'_>, attrs: &WidgetAttrs) -> String {
        format!(
            r#"<textarea class="{}" id="{}" name="{}" rows="{}"{}{}>{}</textarea>"#,
            attrs.class_with("form-control"),
            attrs.id_for(name),
            name,
            self.rows,
            placeholder_attr(self.placeholder.as_ref()),
            attrs.extra_html(),
            html_escape(&state.value.display())
        )
    }

    fn input_type(&self) -> &str {
        "textarea"
    }
}

/// Bootstrap 5 dropdown.
///
/// The placeholder, when set, is rendered as a disabled first option that is
/// selected while no value is chosen.
#[derive(Debug, Clone, Default)]
pub struct BootstrapSelect {
    /// Available choices as (value, label).
    pub choices: Vec<(String, String)>,
    /// Text of the disabled first option.
    pub placeholder: Option<String>,
}

impl BootstrapSelect {
    /// Creates a select with the given (value, label) choices.
    pub fn new(choices: Vec<(impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            choices: choices
                .into_iter()
                .map(|(v, l)| (v.into(), l.into()))
                .collect(),
            placeholder: None,
        }
    }

    /// Sets the placeholder option text.
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }
}

impl Widget for BootstrapSelect {
    fn render(&self, name: &str, state: &FieldState<'_>, attrs: &WidgetAttrs) -> String {
        let current = state.value.as_text().unwrap_or_default();
        let mut options = String::new();

        if let Some(placeholder) = &self.placeholder {
            let selected = if current.is_empty() { " selected" } else { "" };
            options.push_str(&format!(
                r#"<option value="" disabled{selected}>{}</option>"#,
                html_escape(placeholder)
            ));
        }

        for (value, label) in &self.choices {
            let selected = if value == current { " selected" } else { "" };
            options.push_str(&format!(
                r#"<option value="{}"{selected}>{}</option>"#,
                html_escape(value),
                html_escape(label)
            ));
        }

        format!(
            r#"<select class="{}" id="{}" name="{}"{}>{options}</select>"#,
            attrs.class_with("form-select"),
            attrs.id_for(name),
            name,
            attrs.extra_html()
        )
    }

    fn input_type(&self) -> &str {
        "select"
    }
}

/// Bootstrap 5 checkbox, or a switch when built with [`switch`](Self::switch).
#[derive(Debug, Clone, Default)]
pub struct BootstrapCheckbox {
    /// Label shown next to the toggle.
    pub label: Option<String>,
    /// Whether to use the switch style.
    pub is_switch: bool,
}

impl BootstrapCheckbox {
    /// Creates a checkbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a switch.
    pub fn switch() -> Self {
        Self {
            is_switch: true,
            ..Default::default()
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl Widget for BootstrapCheckbox {
    fn render(&self, name: &str, state: &FieldState<'_>, attrs: &WidgetAttrs) -> String {
        let id = attrs.id_for(name);
        let checked = state.value.as_bool().unwrap_or(false);
        let checked_attr = if checked { " checked" } else { "" };

        // The switch knob sits at the end when on.
        let wrapper = if self.is_switch {
            let position = if checked { "end" } else { "start" };
            format!(r#"form-check form-switch" data-position="{position}"#)
        } else {
            "form-check".to_string()
        };

        let label_html = self
            .label
            .as_ref()
            .map(|l| {
                format!(
                    r#"<label class="form-check-label" for="{id}">{}</label>"#,
                    html_escape(l)
                )
            })
            .unwrap_or_default();

        format!(
            r#"<div class="{wrapper}">
  <input class="{}" type="checkbox" id="{id}" name="{name}" value="true"{checked_attr}{}>
  {label_html}
</div>"#,
            attrs.class_with("form-check-input"),
            attrs.extra_html()
        )
    }

    fn input_type(&self) -> &str {
        "checkbox"
    }
}

/// Bootstrap 5 radio group.
#[derive(Debug, Clone, Default)]
pub struct BootstrapRadioSelect {
    /// Available choices as (value, label).
    pub choices: Vec<(String, String)>,
    /// Whether to lay the radios out inline.
    pub inline: bool,
}

impl BootstrapRadioSelect {
    /// Creates a radio group with the given (value, label) choices.
    pub fn new(choices: Vec<(impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            choices: choices
                .into_iter()
                .map(|(v, l)| (v.into(), l.into()))
                .collect(),
            inline: false,
        }
    }

    /// Lays the radios out inline.
    #[must_use]
    pub fn inline(mut self) -> Self {
        self.inline = true;
        self
    }
}

impl Widget for BootstrapRadioSelect {
    fn render(&self, name: &str, state: &FieldState<'_>, attrs: &WidgetAttrs) -> String {
        let wrapper_class = if self.inline {
            "form-check form-check-inline"
        } else {
            "form-check"
        };
        let current = state.value.as_text().unwrap_or_default();
        let base_id = attrs.id_for(name);

        self.choices
            .iter()
            .enumerate()
            .map(|(i, (value, label))| {
                let id = format!("{base_id}_{i}");
                let checked = if value == current { " checked" } else { "" };
                format!(
                    r#"<div class="{wrapper_class}">
  <input class="form-check-input" type="radio" id="{id}" name="{name}" value="{}"{checked}>
  <label class="form-check-label" for="{id}">{}</label>
</div>
"#,
                    html_escape(value),
                    html_escape(label)
                )
            })
            .collect()
    }

    fn input_type(&self) -> &str {
        "radio"
    }
}

/// Read-only date input with a popup calendar.
///
/// The visible input shows the picked date; a hidden input carries it as
/// `YYYY-MM-DD` under the field name. The popup is rendered only while the
/// field's calendar is open.
#[derive(Debug, Clone, Default)]
pub struct BootstrapDatePicker {
    /// Text shown while no date is picked.
    pub placeholder: Option<String>,
}

impl BootstrapDatePicker {
    /// Creates a date picker.
    pub fn new(placeholder: Option<String>) -> Self {
        Self { placeholder }
    }

    fn render_popup(month: NaiveDate, selected: Option<NaiveDate>, id: &str) -> String {
        let mut rows = String::new();
        for week in month_grid(month) {
            rows.push_str("<tr>");
            for day in week {
                match day {
                    Some(date) => {
                        let active = if Some(date) == selected {
                            " active"
                        } else {
                            ""
                        };
                        rows.push_str(&format!(
                            r#"<td><button type="button" class="btn btn-sm btn-light{active}" data-date="{}">{}</button></td>"#,
                            date.format(DATE_FORMAT),
                            date.format("%-d")
                        ));
                    }
                    None => rows.push_str("<td></td>"),
                }
            }
            rows.push_str("</tr>");
        }

        format!(
            r#"<div class="dropdown-menu show p-2" id="{id}_calendar" role="dialog" data-close-key="{CLOSE_KEY}">
  <div class="d-flex justify-content-between align-items-center mb-2">
    <button type="button" class="btn btn-sm btn-outline-secondary" data-shift="-1">&lsaquo;</button>
    <strong>{}</strong>
    <button type="button" class="btn btn-sm btn-outline-secondary" data-shift="1">&rsaquo;</button>
  </div>
  <table class="table table-sm text-center mb-0">
    <thead><tr><th>Mo</th><th>Tu</th><th>We</th><th>Th</th><th>Fr</th><th>Sa</th><th>Su</th></tr></thead>
    <tbody>{rows}</tbody>
  </table>
</div>"#,
            month.format("%B %Y")
        )
    }
}

impl Widget for BootstrapDatePicker {
    fn render(&self, name: &str, state: &FieldState<'_>, attrs: &WidgetAttrs) -> String {
        let id = attrs.id_for(name);
        let date = state.value.as_date();
        let shown = date.map(display_date).unwrap_or_default();
        let raw = date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default();

        let popup = state
            .calendar
            .filter(|cal| cal.is_open())
            .map(|cal| Self::render_popup(cal.month(), date, &id))
            .unwrap_or_default();

        format!(
            r#"<div class="input-group position-relative" data-calendar-key="{CALENDAR_KEY}">
  <input type="text" class="{}" id="{id}" value="{}" readonly{}{}>
  <button type="button" class="btn btn-outline-secondary" aria-label="Open calendar" data-calendar-toggle="{id}"><i class="bi bi-calendar"></i></button>
  <input type="hidden" name="{name}" value="{raw}">
  {popup}
</div>"#,
            attrs.class_with("form-control"),
            html_escape(&shown),
            placeholder_attr(self.placeholder.as_ref()),
            attrs.extra_html()
        )
    }

    fn input_type(&self) -> &str {
        "date"
    }
}

/// Drop target with a hidden native file picker and image previews.
#[derive(Debug, Clone, Default)]
pub struct BootstrapFileDrop {
    /// Whether several files may be selected.
    pub multiple: bool,
    /// MIME filter passed to the picker.
    pub accept: Option<String>,
}

impl BootstrapFileDrop {
    /// Creates a file drop target.
    pub fn new(multiple: bool, accept: Option<String>) -> Self {
        Self { multiple, accept }
    }
}

impl Widget for BootstrapFileDrop {
    fn render(&self, name: &str, state: &FieldState<'_>, attrs: &WidgetAttrs) -> String {
        let id = attrs.id_for(name);
        let dragging = state.previews.is_some_and(|p| p.is_dragging());
        let zone_class = if dragging {
            "file-drop border border-primary rounded p-3 text-center dragging"
        } else {
            "file-drop border rounded p-3 text-center"
        };
        let multiple_attr = if self.multiple { " multiple" } else { "" };
        let accept_attr = self
            .accept
            .as_ref()
            .map(|a| format!(r#" accept="{}""#, html_escape(a)))
            .unwrap_or_default();
        let prompt = if self.multiple {
            "Drop files here or click to browse"
        } else {
            "Drop a file here or click to browse"
        };

        let mut items = String::new();
        let mut preview_index = 0;
        for (position, file) in state.value.files().iter().enumerate() {
            let url = state.previews.and_then(|p| p.url_for_file(position));
            match url {
                Some(url) => {
                    items.push_str(&format!(
                        r#"<li class="list-inline-item position-relative"><img src="{}" alt="{}" class="img-thumbnail" width="96"><button type="button" class="btn-close position-absolute top-0 end-0" aria-label="Remove" data-remove-preview="{preview_index}"></button></li>"#,
                        html_escape(url),
                        html_escape(&file.name)
                    ));
                    preview_index += 1;
                }
                None => items.push_str(&format!(
                    r#"<li class="list-inline-item"><span class="badge text-bg-secondary">{}</span></li>"#,
                    html_escape(&file.name)
                )),
            }
        }
        let list = if items.is_empty() {
            String::new()
        } else {
            format!(r#"<ul class="list-inline mt-2 mb-0">{items}</ul>"#)
        };

        format!(
            r#"<div class="{}" id="{id}_drop">
  <label for="{id}" class="mb-0">{prompt}</label>
  <input type="file" id="{id}" name="{name}" hidden{multiple_attr}{accept_attr}{}>
  {list}
</div>"#,
            attrs.class_with(zone_class),
            attrs.extra_html()
        )
    }

    fn input_type(&self) -> &str {
        "file"
    }
}
