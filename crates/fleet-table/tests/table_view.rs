//! Filter, sort and pagination properties of the table engine.

use std::collections::HashMap;

use fleet_table::{
    filter_rows, paginate, sort_rows, total_pages, Column, DataTable, Row, SortDirection,
    TableViewState,
};
use serde_json::{json, Value};

fn drivers() -> Vec<Value> {
    vec![
        json!({"name": "Alice Smith", "licence": "C+E", "points": 0}),
        json!({"name": "Bob Jones", "licence": "C", "points": 3}),
        json!({"name": "Carol White", "licence": "C1", "points": 12}),
        json!({"name": "Dan Smithers", "licence": "B", "points": 6}),
    ]
}

fn columns() -> Vec<Column<Value>> {
    vec![Column::new("name", "Name"), Column::new("licence", "Licence")]
}

// =============================================================================
// Filtering
// =============================================================================

#[test]
fn filter_keeps_only_matching_rows() {
    let rows = drivers();
    let cols = columns();
    for query in ["smith", "C", "ce", "zzz", "WHITE"] {
        let kept = filter_rows(&rows, query, &cols);
        let needle = query.to_lowercase();
        for row in &kept {
            assert!(rows.iter().any(|r| std::ptr::eq(r, *row)));
            assert!(cols
                .iter()
                .any(|c| c.text(row).to_lowercase().contains(&needle)));
        }
    }
    assert_eq!(filter_rows(&rows, "smith", &cols).len(), 2);
}

#[test]
fn empty_query_keeps_everything_in_order() {
    let rows = drivers();
    let kept = filter_rows(&rows, "", &columns());
    assert_eq!(kept.len(), rows.len());
    assert!(kept.iter().zip(&rows).all(|(a, b)| std::ptr::eq(*a, b)));
}

#[test]
fn only_configured_columns_are_searched() {
    let rows = drivers();
    // "12" only appears in the unconfigured points column.
    assert!(filter_rows(&rows, "12", &columns()).is_empty());
}

// =============================================================================
// Sorting
// =============================================================================

#[test]
fn sort_is_stable_for_equal_keys() {
    let rows = vec![json!({"k": 1, "i": 0}), json!({"k": 1, "i": 1})];
    let mut refs: Vec<&Value> = rows.iter().collect();
    sort_rows(&mut refs, "k", SortDirection::Asc);
    assert_eq!(refs[0]["i"], 0);
    assert_eq!(refs[1]["i"], 1);

    sort_rows(&mut refs, "k", SortDirection::Desc);
    assert_eq!(refs[0]["i"], 0);
}

#[test]
fn numeric_cells_sort_numerically() {
    let rows = drivers();
    let mut refs: Vec<&Value> = rows.iter().collect();
    sort_rows(&mut refs, "points", SortDirection::Asc);
    let points: Vec<String> = refs.iter().filter_map(|r| r.cell("points")).collect();
    assert_eq!(points, vec!["0", "3", "6", "12"]);
}

#[test]
fn mixed_cells_sort_as_text() {
    let rows: Vec<HashMap<String, String>> = ["10", "9", "n/a"]
        .iter()
        .map(|v| HashMap::from([("mot".to_string(), v.to_string())]))
        .collect();
    let mut refs: Vec<&HashMap<String, String>> = rows.iter().collect();
    sort_rows(&mut refs, "mot", SortDirection::Asc);
    let order: Vec<&str> = refs.iter().map(|r| r["mot"].as_str()).collect();
    assert_eq!(order, vec!["9", "10", "n/a"]);
}

// =============================================================================
// Pagination
// =============================================================================

#[test]
fn out_of_range_page_is_clamped() {
    let rows: Vec<Value> = (1..=25).map(|i| json!({"name": format!("row {i}")})).collect();
    let mut table = DataTable::new(vec![Column::new("name", "Name")], rows, 10);
    table.set_page(99);

    let window = table.window();
    assert_eq!(window.page, 3);
    assert_eq!(window.rows.len(), 5);
    assert_eq!(window.total_pages, 3);
    assert_eq!(table.state().page, 3);
}

#[test]
fn page_always_in_range_and_slice_bounded() {
    for count in [0usize, 1, 9, 10, 11, 25, 100] {
        let rows: Vec<usize> = (0..count).collect();
        for page_size in [1usize, 3, 10, 50] {
            let pages = total_pages(count, page_size);
            for page in [0usize, 1, 2, pages, pages + 1, usize::MAX / 2] {
                let (slice, clamped) = paginate(&rows, page, page_size);
                assert!(slice.len() <= page_size);
                assert!((1..=pages).contains(&clamped));
            }
        }
    }
}

#[test]
fn search_that_shrinks_results_pulls_page_back() {
    let rows: Vec<Value> = (1..=30)
        .map(|i| {
            let name = if i <= 3 { format!("match {i}") } else { format!("other {i}") };
            json!({ "name": name })
        })
        .collect();
    let state = TableViewState::new(10).with_page(3);
    let mut table = DataTable::new(vec![Column::new("name", "Name")], rows, 10).with_state(state);
    assert_eq!(table.state().page, 3);

    table.set_search("match");
    assert_eq!(table.state().page, 1);
    assert_eq!(table.window().rows.len(), 3);
}
