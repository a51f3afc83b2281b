//! A table that owns its rows, columns and view state.

use tracing::debug;

use crate::column::{Column, Row};
use crate::view::{visible_window, SortDirection, TableViewState, TableWindow};

/// Searchable, sortable, paginated table over an in-memory row set.
///
/// Every change recomputes from the full row set and clamps the page into
/// range, so the state never points past the last page.
#[derive(Debug)]
pub struct DataTable<T> {
    columns: Vec<Column<T>>,
    rows: Vec<T>,
    state: TableViewState,
}

impl<T: Row> DataTable<T> {
    /// Creates a table on page 1.
    pub fn new(columns: Vec<Column<T>>, rows: Vec<T>, page_size: usize) -> Self {
        Self {
            columns,
            rows,
            state: TableViewState::new(page_size),
        }
    }

    /// Replaces the view state, e.g. with one read from a query string.
    ///
    /// A sort key that names no sortable column is dropped, leaving the rows
    /// in their original order.
    #[must_use]
    pub fn with_state(mut self, mut state: TableViewState) -> Self {
        if let Some(key) = state.sort_key.take() {
            if self.is_sortable(&key) {
                state.sort_key = Some(key);
            } else {
                debug!(key = %key, "ignoring sort on unsortable column");
                state.sort_dir = SortDirection::Asc;
            }
        }
        self.state = state;
        self.refresh();
        self
    }

    /// Returns the columns.
    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    /// Returns every row, unfiltered.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Returns the view state.
    pub fn state(&self) -> &TableViewState {
        &self.state
    }

    /// Replaces the row set.
    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.refresh();
    }

    /// Sets the search query and returns to page 1.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.state.set_search(query);
        self.refresh();
    }

    /// Sorts by a column. Unknown or unsortable keys are ignored and
    /// reported as `false`.
    pub fn toggle_sort(&mut self, key: &str) -> bool {
        let sortable = self.is_sortable(key);
        if sortable {
            self.state.toggle_sort(key);
        }
        sortable
    }

    /// Moves to a page, clamped into range.
    pub fn set_page(&mut self, page: usize) {
        self.state.set_page(page);
        self.refresh();
    }

    /// Changes the page size, keeping the page in range.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.state.page_size = page_size.max(1);
        self.refresh();
    }

    /// Returns the rows currently visible.
    pub fn window(&self) -> TableWindow<'_, T> {
        visible_window(&self.rows, &self.columns, &self.state)
    }

    fn is_sortable(&self, key: &str) -> bool {
        self.columns.iter().any(|c| c.key == key && c.sortable)
    }

    fn refresh(&mut self) {
        let matches = self.window().matches;
        self.state.clamp_page(matches);
    }
}
