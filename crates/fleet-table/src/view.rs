//! Table view state and the derived visible window.
//!
//! The window is never stored: it is recomputed from the full row set as
//! `paginate(sort(filter(rows)))` whenever it is asked for.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::column::{Column, Row};

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Returns the opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Search, sort and page settings of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableViewState {
    /// Free-text search query.
    pub search: String,
    /// Key of the sort column.
    pub sort_key: Option<String>,
    /// Sort direction.
    pub sort_dir: SortDirection,
    /// Current page, 1-indexed.
    pub page: usize,
    /// Rows per page.
    pub page_size: usize,
}

impl Default for TableViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl TableViewState {
    /// Creates a state on page 1, unsorted, with no search.
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            sort_key: None,
            sort_dir: SortDirection::Asc,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Sets the search query and returns to page 1.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        self.page = 1;
    }

    /// Sorts by `key`: the same key flips the direction, a new key starts
    /// ascending.
    pub fn toggle_sort(&mut self, key: &str) {
        if self.sort_key.as_deref() == Some(key) {
            self.sort_dir = self.sort_dir.toggled();
        } else {
            self.sort_key = Some(key.to_string());
            self.sort_dir = SortDirection::Asc;
        }
    }

    /// Requests a page. Out-of-range pages are clamped when the window is
    /// computed.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Builder method to set the search query.
    #[must_use]
    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.set_search(query);
        self
    }

    /// Builder method to sort by a key in a direction.
    #[must_use]
    pub fn with_sort(mut self, key: impl Into<String>, dir: SortDirection) -> Self {
        self.sort_key = Some(key.into());
        self.sort_dir = dir;
        self
    }

    /// Builder method to request a page.
    #[must_use]
    pub fn with_page(mut self, page: usize) -> Self {
        self.set_page(page);
        self
    }

    /// Clamps the page into `[1, total_pages(matches)]`.
    pub fn clamp_page(&mut self, matches: usize) {
        self.page = self.page.clamp(1, total_pages(matches, self.page_size));
    }
}

/// Number of pages needed for `count` rows; never less than one.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// Keeps the rows whose text in at least one column contains `query`,
/// ignoring case. A blank query keeps every row.
pub fn filter_rows<'a, T: Row>(rows: &'a [T], query: &str, columns: &[Column<T>]) -> Vec<&'a T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return rows.iter().collect();
    }
    rows.iter()
        .filter(|row| {
            columns
                .iter()
                .any(|col| col.text(row).to_lowercase().contains(&needle))
        })
        .collect()
}

fn finite_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Compares two cell texts: numerically when both are finite numbers,
/// otherwise as strings.
pub fn compare_cells(a: &str, b: &str) -> Ordering {
    match (finite_number(a), finite_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

/// Sorts rows by the text under `key`. The sort is stable.
pub fn sort_rows<T: Row>(rows: &mut [&T], key: &str, dir: SortDirection) {
    rows.sort_by(|a, b| {
        let a = a.cell(key).unwrap_or_default();
        let b = b.cell(key).unwrap_or_default();
        let ord = compare_cells(&a, &b);
        match dir {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

/// Returns the slice of `rows` on `page` (1-indexed), clamping the page.
pub fn paginate<T>(rows: &[T], page: usize, page_size: usize) -> (&[T], usize) {
    let page_size = page_size.max(1);
    let page = page.clamp(1, total_pages(rows.len(), page_size));
    let start = ((page - 1) * page_size).min(rows.len());
    let end = (start + page_size).min(rows.len());
    (&rows[start..end], page)
}

/// The visible part of a table after search, sort and pagination.
#[derive(Debug, Clone)]
pub struct TableWindow<'a, T> {
    /// Rows on the current page, in display order.
    pub rows: Vec<&'a T>,
    /// The page shown, after clamping.
    pub page: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Number of pages for the matching rows.
    pub total_pages: usize,
    /// Number of rows matching the search.
    pub matches: usize,
    /// Number of rows before searching.
    pub total_rows: usize,
}

impl<T> TableWindow<'_, T> {
    /// One-based position of the first row shown, or 0 when nothing matches.
    pub fn first_index(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            (self.page - 1) * self.page_size + 1
        }
    }

    /// One-based position of the last row shown.
    pub fn last_index(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            self.first_index() + self.rows.len() - 1
        }
    }

    /// Returns whether the search left nothing while the table has rows.
    pub fn is_search_miss(&self) -> bool {
        self.matches == 0 && self.total_rows > 0
    }
}

/// Computes the visible window of `rows` for `state`.
pub fn visible_window<'a, T: Row>(
    rows: &'a [T],
    columns: &[Column<T>],
    state: &TableViewState,
) -> TableWindow<'a, T> {
    let mut matched = filter_rows(rows, &state.search, columns);
    if let Some(key) = &state.sort_key {
        sort_rows(&mut matched, key, state.sort_dir);
    }
    let (slice, page) = paginate(&matched, state.page, state.page_size);
    let window = TableWindow {
        rows: slice.to_vec(),
        page,
        page_size: state.page_size.max(1),
        total_pages: total_pages(matched.len(), state.page_size),
        matches: matched.len(),
        total_rows: rows.len(),
    };
    debug!(
        matches = window.matches,
        page = window.page,
        total_pages = window.total_pages,
        "table window recomputed"
    );
    window
}
