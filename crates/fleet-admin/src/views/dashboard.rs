//! Dashboard with one card per shown collection.

use ironhtml::typed::Element;
use ironhtml_elements::{Div, Span, A, H5, I, P};

use crate::error::Result;
use crate::nav::{nav_item, FeatureFlags};
use crate::records::Collection;

use super::{render_page, AppContext};
use crate::http::Response;

/// Renders the dashboard.
pub async fn dashboard_view(ctx: &AppContext, flags: &FeatureFlags) -> Result<Response> {
    let mut cards = String::new();
    for collection in Collection::ALL {
        if !flags.is_enabled(collection.slug()) {
            continue;
        }
        let Some(item) = nav_item(collection.slug()) else {
            continue;
        };
        let count = ctx.store.list(collection.slug()).await?.len();
        let list_url = collection.list_url();
        let add_url = collection.add_url();
        let icon = format!("bi {} me-2", item.icon);
        let summary = match count {
            0 => "No records yet".to_string(),
            1 => "1 record".to_string(),
            n => format!("{n} records"),
        };

        let card = Element::<Div>::new()
            .class("col-md-4 col-lg-3 mb-4")
            .child::<Div, _>(|card| {
                card.class("card h-100")
                    .child::<Div, _>(|body| {
                        body.class("card-body")
                            .child::<H5, _>(|h| {
                                h.class("card-title")
                                    .child::<I, _>(|i| i.class(&icon))
                                    .text(item.label)
                            })
                            .child::<P, _>(|p| {
                                p.class("card-text text-muted")
                                    .child::<Span, _>(|s| s.class("fw-semibold").text(&summary))
                            })
                    })
                    .child::<Div, _>(|footer| {
                        footer
                            .class("card-footer bg-transparent")
                            .child::<A, _>(|a| {
                                a.attr("href", &list_url)
                                    .class("btn btn-outline-primary btn-sm me-1")
                                    .child::<I, _>(|i| i.class("bi bi-list me-1"))
                                    .text("View")
                            })
                            .child::<A, _>(|a| {
                                a.attr("href", &add_url)
                                    .class("btn btn-primary btn-sm")
                                    .child::<I, _>(|i| i.class("bi bi-plus-lg me-1"))
                                    .text("Add")
                            })
                    })
            })
            .render();
        cards.push_str(&card);
    }

    let content = if cards.is_empty() {
        Element::<Div>::new()
            .class("alert alert-info")
            .child::<I, _>(|i| i.class("bi bi-info-circle me-2"))
            .text("Every section is hidden. Turn some back on under ")
            .child::<A, _>(|a| a.attr("href", "/settings/nav/").text("Navigation"))
            .text(".")
            .render()
    } else {
        format!(r#"<div class="row">{cards}</div>"#)
    };

    Ok(render_page(
        ctx,
        flags,
        Some("dashboard"),
        "Dashboard",
        content,
        vec![("Home".to_string(), None)],
        Vec::new(),
    ))
}
