//! Column definitions and row access.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde_json::Value;

/// Read access to the cells of one table row, by column key.
///
/// Rows carry no reflection; each row type says which keys it answers.
pub trait Row {
    /// Returns the raw text of the cell under `key`, if the row has one.
    fn cell(&self, key: &str) -> Option<String>;
}

impl Row for Value {
    fn cell(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::Null => Some(String::new()),
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            other => Some(other.to_string()),
        }
    }
}

impl Row for HashMap<String, String> {
    fn cell(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl Row for BTreeMap<String, String> {
    fn cell(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<R: Row + ?Sized> Row for &R {
    fn cell(&self, key: &str) -> Option<String> {
        (**self).cell(key)
    }
}

type CellRenderer<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

/// One table column.
pub struct Column<T> {
    /// Key looked up on every row.
    pub key: String,
    /// Header text.
    pub title: String,
    /// Whether the header offers sorting.
    pub sortable: bool,
    render: Option<CellRenderer<T>>,
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("sortable", &self.sortable)
            .field("custom_render", &self.render.is_some())
            .finish()
    }
}

impl<T: Row> Column<T> {
    /// Creates a sortable column showing the raw cell text.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            sortable: true,
            render: None,
        }
    }

    /// Sets a custom cell renderer. Its output is inserted as HTML.
    #[must_use]
    pub fn render<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.render = Some(Box::new(f));
        self
    }

    /// Removes sorting from the header.
    #[must_use]
    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Returns the raw text of this column's cell. A missing key reads as
    /// an empty string.
    pub fn text(&self, row: &T) -> String {
        row.cell(&self.key).unwrap_or_default()
    }

    /// Returns whether the column has a custom renderer.
    pub fn has_renderer(&self) -> bool {
        self.render.is_some()
    }

    /// Returns the custom rendering of a cell, if the column has a renderer.
    pub fn rendered(&self, row: &T) -> Option<String> {
        self.render.as_ref().map(|f| f(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_cells() {
        let row = json!({"reg": "AB12 CDE", "axles": 3, "active": true, "notes": null});
        assert_eq!(row.cell("reg").as_deref(), Some("AB12 CDE"));
        assert_eq!(row.cell("axles").as_deref(), Some("3"));
        assert_eq!(row.cell("active").as_deref(), Some("true"));
        assert_eq!(row.cell("notes").as_deref(), Some(""));
        assert_eq!(row.cell("missing"), None);
    }

    #[test]
    fn test_column_text_and_render() {
        let row: HashMap<String, String> =
            HashMap::from([("status".to_string(), "valid".to_string())]);
        let plain = Column::<HashMap<String, String>>::new("status", "Status");
        assert_eq!(plain.text(&row), "valid");
        assert_eq!(plain.rendered(&row), None);

        let badge = Column::new("status", "Status")
            .render(|r: &HashMap<String, String>| format!("<b>{}</b>", r["status"]));
        assert_eq!(badge.rendered(&row).as_deref(), Some("<b>valid</b>"));
        assert_eq!(badge.text(&row), "valid");
        assert_eq!(Column::<HashMap<String, String>>::new("x", "X").text(&row), "");
    }
}
