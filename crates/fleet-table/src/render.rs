//! Bootstrap 5 rendering of a [`DataTable`].

use crate::column::Row;
use crate::table::DataTable;
use crate::view::{SortDirection, TableViewState, TableWindow};

/// Escapes text for use inside element content and quoted attributes.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn href(state: &TableViewState) -> String {
    let query = state.to_query_string();
    if query.is_empty() {
        "?".to_string()
    } else {
        query
    }
}

/// Renders the search form. Submitting it starts again at page 1 with the
/// current sort.
pub fn render_search_bar(state: &TableViewState) -> String {
    let ordering = state
        .ordering()
        .map(|o| format!(r#"<input type="hidden" name="o" value="{}">"#, html_escape(&o)))
        .unwrap_or_default();

    format!(
        r#"<form method="get" class="d-flex" role="search">
    <div class="input-group">
        <input type="search" name="q" class="form-control" placeholder="Search..." value="{}">
        {ordering}
        <button class="btn btn-outline-secondary" type="submit"><i class="bi bi-search"></i></button>
    </div>
</form>"#,
        html_escape(&state.search)
    )
}

fn render_headers<T: Row>(table: &DataTable<T>) -> String {
    let state = table.state();
    table
        .columns()
        .iter()
        .map(|col| {
            let title = html_escape(&col.title);
            if !col.sortable {
                return format!(r#"<th scope="col">{title}</th>"#);
            }

            let active = state.sort_key.as_deref() == Some(col.key.as_str());
            let (indicator, aria) = match (active, state.sort_dir) {
                (true, SortDirection::Asc) => (" &#9650;", "ascending"),
                (true, SortDirection::Desc) => (" &#9660;", "descending"),
                (false, _) => ("", "none"),
            };

            let mut next = state.clone();
            next.toggle_sort(&col.key);
            next.page = 1;

            format!(
                r#"<th scope="col" aria-sort="{aria}"><a href="{}" class="text-reset text-decoration-none">{title}{indicator}</a></th>"#,
                html_escape(&href(&next))
            )
        })
        .collect()
}

fn render_rows<T: Row>(table: &DataTable<T>, window: &TableWindow<'_, T>) -> String {
    window
        .rows
        .iter()
        .map(|row| {
            let cells: String = table
                .columns()
                .iter()
                .map(|col| {
                    let cell = col
                        .rendered(row)
                        .unwrap_or_else(|| html_escape(&col.text(row)));
                    format!("<td>{cell}</td>")
                })
                .collect();
            format!("<tr>{cells}</tr>")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_empty<T>(state: &TableViewState, window: &TableWindow<'_, T>) -> String {
    let message = if window.is_search_miss() {
        format!("No results for \u{201c}{}\u{201d}", html_escape(state.search.trim()))
    } else {
        "No items found.".to_string()
    };
    format!(r#"<div class="text-center text-muted py-5">{message}</div>"#)
}

/// Renders the pagination footer.
pub fn render_pagination<T>(state: &TableViewState, window: &TableWindow<'_, T>) -> String {
    let summary = format!(
        "Showing {}\u{2013}{} of {}",
        window.first_index(),
        window.last_index(),
        window.matches
    );
    if window.total_pages <= 1 {
        return format!(
            r#"<div class="d-flex justify-content-between align-items-center">
    <span class="text-muted">{summary}</span>
</div>"#
        );
    }

    let link = |page: usize| {
        let mut target = state.clone();
        target.page = page;
        html_escape(&href(&target))
    };

    let mut pages = Vec::new();
    if window.page > 1 {
        pages.push(format!(
            r#"<li class="page-item"><a class="page-link" href="{}">&laquo;</a></li>"#,
            link(window.page - 1)
        ));
    } else {
        pages.push(
            r#"<li class="page-item disabled"><span class="page-link">&laquo;</span></li>"#
                .to_string(),
        );
    }

    for p in 1..=window.total_pages {
        let distance = p.abs_diff(window.page);
        if p == window.page {
            pages.push(format!(
                r#"<li class="page-item active" aria-current="page"><span class="page-link">{p}</span></li>"#
            ));
        } else if distance <= 2 || p == 1 || p == window.total_pages {
            pages.push(format!(
                r#"<li class="page-item"><a class="page-link" href="{}">{p}</a></li>"#,
                link(p)
            ));
        } else if distance == 3 {
            pages.push(
                r#"<li class="page-item disabled"><span class="page-link">...</span></li>"#
                    .to_string(),
            );
        }
    }

    if window.page < window.total_pages {
        pages.push(format!(
            r#"<li class="page-item"><a class="page-link" href="{}">&raquo;</a></li>"#,
            link(window.page + 1)
        ));
    } else {
        pages.push(
            r#"<li class="page-item disabled"><span class="page-link">&raquo;</span></li>"#
                .to_string(),
        );
    }

    format!(
        r#"<div class="d-flex justify-content-between align-items-center">
    <span class="text-muted">{summary}</span>
    <nav aria-label="Table pages">
        <ul class="pagination pagination-sm mb-0">
            {}
        </ul>
    </nav>
</div>"#,
        pages.join("\n")
    )
}

/// Renders the search bar, the table (or its empty state) and the footer.
pub fn render_table<T: Row>(table: &DataTable<T>) -> String {
    let state = table.state();
    let window = table.window();

    let body = if window.rows.is_empty() {
        render_empty(state, &window)
    } else {
        format!(
            r#"<div class="table-responsive">
    <table class="table table-striped table-hover mb-0">
        <thead class="table-light">
            <tr>{}</tr>
        </thead>
        <tbody>
{}
        </tbody>
    </table>
</div>"#,
            render_headers(table),
            render_rows(table, &window)
        )
    };

    format!(
        r#"<div class="card">
    <div class="card-header bg-white">{}</div>
    <div class="card-body p-0">{body}</div>
    <div class="card-footer bg-white">{}</div>
</div>"#,
        render_search_bar(state),
        render_pagination(state, &window)
    )
}

/// Builds the link for a search, keeping the sort and returning to page 1.
pub fn search_href(state: &TableViewState, query: &str) -> String {
    let mut target = state.clone();
    target.set_search(query);
    href(&target)
}
