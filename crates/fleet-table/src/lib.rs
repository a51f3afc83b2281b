//! # fleet-table
//!
//! Searchable, sortable, paginated tables over in-memory rows.
//!
//! Rows expose their cells through the [`Row`] trait; [`Column`]s pick the
//! keys to show and may render cells themselves. The visible window is a pure
//! function of the rows, the columns and a [`TableViewState`].
//!
//! ```rust
//! use fleet_table::{Column, DataTable};
//! use serde_json::json;
//!
//! let rows: Vec<_> = (1..=25).map(|i| json!({"reg": format!("REG{i}")})).collect();
//! let mut table = DataTable::new(vec![Column::new("reg", "Registration")], rows, 10);
//!
//! table.set_page(99);
//! let window = table.window();
//! assert_eq!(window.page, 3);
//! assert_eq!(window.rows.len(), 5);
//! assert_eq!(window.total_pages, 3);
//! ```

mod column;
mod params;
mod render;
mod table;
mod view;

pub use column::{Column, Row};
pub use params::{parse_query, url_decode, url_encode};
pub use render::{html_escape, render_pagination, render_search_bar, render_table, search_href};
pub use table::DataTable;
pub use view::{
    compare_cells, filter_rows, paginate, sort_rows, total_pages, visible_window, SortDirection,
    TableViewState, TableWindow, DEFAULT_PAGE_SIZE,
};
