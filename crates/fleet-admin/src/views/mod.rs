//! Page handlers.
//!
//! - `dashboard` - one card per shown collection
//! - `list` - record tables with search, sort and pagination
//! - `form` - add forms and the create handler
//! - `settings` - navigation link toggles
//!
//! [`dispatch`] routes a request to the handler for its path.

mod dashboard;
mod form;
mod list;
mod settings;

pub use dashboard::dashboard_view;
pub use form::{
    add_view, create_record, record_form, save_record, RecordForm, SaveOutcome, Submission,
};
pub use list::{list_view, load_records, record_table};
pub use settings::{nav_settings_view, toggle_nav, NAV_SETTINGS_URL};

use std::sync::Arc;

use fleet_forms::UrlRegistry;
use tracing::{debug, warn};

use crate::config::AdminConfig;
use crate::error::AdminError;
use crate::http::{Method, Request, Response};
use crate::nav::FeatureFlags;
use crate::records::Collection;
use crate::store::DocumentStore;
use crate::templates::{render_base, LayoutContext};
use crate::with_resource;

/// Shared state every handler reads.
#[derive(Clone)]
pub struct AppContext {
    /// Settings.
    pub config: AdminConfig,
    /// Where records are kept.
    pub store: Arc<dyn DocumentStore>,
    /// Hands out preview URLs for file fields.
    pub registry: Arc<dyn UrlRegistry>,
}

impl AppContext {
    /// Creates a context.
    pub fn new(
        config: AdminConfig,
        store: Arc<dyn DocumentStore>,
        registry: Arc<dyn UrlRegistry>,
    ) -> Self {
        Self {
            config,
            store,
            registry,
        }
    }
}

/// Wraps content in the site layout.
pub fn render_page(
    ctx: &AppContext,
    flags: &FeatureFlags,
    active: Option<&str>,
    page_title: &str,
    content: String,
    breadcrumbs: Vec<(String, Option<String>)>,
    messages: Vec<(String, String)>,
) -> Response {
    let layout = LayoutContext {
        site_title: ctx.config.site_title.clone(),
        links: flags.visible_links(),
        active: active.map(str::to_string),
        breadcrumbs,
        page_title: page_title.to_string(),
        content,
        messages,
    };
    Response::html(render_base(&layout))
}

fn error_page(ctx: &AppContext, flags: &FeatureFlags, error: &AdminError) -> Response {
    let (status, text) = match error {
        AdminError::NotFound { .. } | AdminError::UnknownCollection(_) => {
            (404, "The page you asked for does not exist.".to_string())
        }
        other => (500, format!("Something went wrong: {other}")),
    };
    render_page(
        ctx,
        flags,
        None,
        if status == 404 { "Not found" } else { "Error" },
        String::new(),
        vec![("Home".to_string(), Some("/".to_string()))],
        vec![("error".to_string(), text)],
    )
    .status(status)
}

/// Routes a request.
///
/// | path | GET | POST |
/// |---|---|---|
/// | `/` | dashboard | |
/// | `/settings/nav/` | link toggles | flip a link |
/// | `/{collection}/` | list | |
/// | `/{collection}/add/` | add form | create |
pub async fn dispatch(ctx: &AppContext, req: &Request) -> Response {
    let flags = FeatureFlags::from_request(req, &ctx.config.flag_cookie_name);
    let segments = req.segments();
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
    debug!(method = %req.method, path = %req.path, "dispatching");

    let result = match (req.method, segments.as_slice()) {
        (Method::Get, []) => dashboard_view(ctx, &flags).await,
        (_, []) => Ok(Response::method_not_allowed()),
        (Method::Get, ["settings", "nav"]) => Ok(nav_settings_view(ctx, &flags)),
        (Method::Post, ["settings", "nav"]) => Ok(toggle_nav(ctx, req, &flags)),
        (_, ["settings", "nav"]) => Ok(Response::method_not_allowed()),
        (method, [slug]) => match Collection::from_slug(slug) {
            Some(collection) if method == Method::Get => {
                with_resource!(collection, R => list_view::<R>(ctx, req, &flags).await)
            }
            Some(_) => Ok(Response::method_not_allowed()),
            None => Err(AdminError::UnknownCollection(slug.to_string())),
        },
        (method, [slug, "add"]) => match (Collection::from_slug(slug), method) {
            (Some(collection), Method::Get) => {
                with_resource!(collection, R => add_view::<R>(ctx, &flags))
            }
            (Some(collection), Method::Post) => Ok(with_resource!(
                collection,
                R => create_record::<R>(ctx, req, &flags).await
            )),
            (Some(_), _) => Ok(Response::method_not_allowed()),
            (None, _) => Err(AdminError::UnknownCollection(slug.to_string())),
        },
        _ => Err(AdminError::NotFound {
            collection: "pages".to_string(),
            id: req.path.clone(),
        }),
    };

    match result {
        Ok(response) => response,
        Err(e) => {
            warn!(path = %req.path, error = %e, "request failed");
            error_page(ctx, &flags, &e)
        }
    }
}
