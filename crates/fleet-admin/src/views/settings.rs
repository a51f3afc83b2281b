//! Navigation settings: which sidebar links this browser shows.

use ironhtml::html;
use ironhtml::typed::Element;
use ironhtml_elements::{Div, Form, Li, Span, Ul, I};
use tracing::{debug, info};

use crate::http::{Request, Response};
use crate::nav::{FeatureFlags, NAV_CATALOG};

use super::{render_page, AppContext};

/// Path of the settings page.
pub const NAV_SETTINGS_URL: &str = "/settings/nav/";

/// Lists every catalog link with a button that flips it.
pub fn nav_settings_view(ctx: &AppContext, flags: &FeatureFlags) -> Response {
    let list = Element::<Ul>::new()
        .class("list-group")
        .children(NAV_CATALOG.iter(), |item, li: Element<Li>| {
            let enabled = flags.is_enabled(item.id);
            let id = item.id;
            let label = item.label;
            let icon = format!("bi {} me-2", item.icon);
            let (button_class, button_text) = if enabled {
                ("btn btn-sm btn-outline-secondary", "Hide")
            } else {
                ("btn btn-sm btn-success", "Show")
            };
            let button = html! {
                button.type_("submit").class(#button_class) { #button_text }
            };
            li.class("list-group-item d-flex justify-content-between align-items-center")
                .child::<Span, _>(|s| s.child::<I, _>(|i| i.class(&icon)).text(label))
                .child::<Form, _>(|f| {
                    f.attr("method", "post")
                        .attr("action", NAV_SETTINGS_URL)
                        .class("m-0")
                        .child::<Div, _>(|d| {
                            d.raw(format!(r#"<input type="hidden" name="id" value="{id}">"#))
                                .raw(button.render())
                        })
                })
        })
        .render();

    render_page(
        ctx,
        flags,
        None,
        "Navigation",
        list,
        vec![
            ("Home".to_string(), Some("/".to_string())),
            ("Navigation".to_string(), None),
        ],
        Vec::new(),
    )
}

/// Flips the link named by the posted `id` and stores the flags in the
/// cookie.
pub fn toggle_nav(ctx: &AppContext, req: &Request, flags: &FeatureFlags) -> Response {
    let form = req.form();
    let Some(id) = form.get("id") else {
        return Response::bad_request();
    };

    let mut flags = flags.clone();
    match flags.toggle(id) {
        Some(enabled) => {
            info!(link = %id, enabled, "navigation link toggled");
            let cookie = flags.set_cookie_header(
                &ctx.config.flag_cookie_name,
                ctx.config.flag_cookie_max_age,
            );
            Response::redirect(NAV_SETTINGS_URL).set_cookie(cookie)
        }
        None => {
            debug!(link = %id, "ignoring unknown navigation link");
            Response::bad_request()
        }
    }
}
