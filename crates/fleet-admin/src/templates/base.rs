//! Page layout: sidebar from the navigation flags, top bar, content.

use ironhtml::html;
use ironhtml::typed::{Document, Element};
use ironhtml_elements::{
    Body, Div, Head, Html, Li, Link, Meta, Nav, Ol, Script, Span, Style, Title, Ul, H5, I,
};

use crate::nav::NavItem;

/// Everything a page needs besides its content.
#[derive(Debug, Clone)]
pub struct LayoutContext {
    /// Site title.
    pub site_title: String,
    /// Sidebar links, already filtered by the navigation flags.
    pub links: Vec<&'static NavItem>,
    /// Id of the link to highlight.
    pub active: Option<String>,
    /// Breadcrumbs (label, url).
    pub breadcrumbs: Vec<(String, Option<String>)>,
    /// Page heading.
    pub page_title: String,
    /// Main content HTML.
    pub content: String,
    /// Flash messages (level, text).
    pub messages: Vec<(String, String)>,
}

impl Default for LayoutContext {
    fn default() -> Self {
        Self {
            site_title: "Fleet Compliance".to_string(),
            links: Vec::new(),
            active: None,
            breadcrumbs: vec![("Home".to_string(), Some("/".to_string()))],
            page_title: "Dashboard".to_string(),
            content: String::new(),
            messages: Vec::new(),
        }
    }
}

const CSS: &str = "\
:root { --sidebar-width: 260px; }\n\
body { min-height: 100vh; background-color: #f5f6f8; }\n\
.sidebar { position: fixed; top: 0; bottom: 0; left: 0; \
width: var(--sidebar-width); background-color: #1b2a3a; overflow-y: auto; z-index: 1000; }\n\
.sidebar .nav-link { color: rgba(255,255,255,0.7); padding: 0.7rem 1rem; }\n\
.sidebar .nav-link:hover { color: #fff; background-color: rgba(255,255,255,0.08); }\n\
.sidebar .nav-link.active { color: #fff; background-color: #198754; }\n\
.sidebar-header { padding: 1rem; color: #fff; border-bottom: 1px solid rgba(255,255,255,0.1); }\n\
.sidebar-header h5 { margin: 0; font-weight: 600; }\n\
.main-content { margin-left: var(--sidebar-width); min-height: 100vh; }\n\
.content-wrapper { padding: 1.5rem; }\n\
.file-drop { border: 2px dashed #ced4da; border-radius: 0.5rem; padding: 1.5rem; text-align: center; }\n\
.file-drop.dragging { border-color: #198754; background-color: #e9f5ee; }\n\
.file-drop img { max-height: 80px; }\n\
@media (max-width: 768px) {\n\
  .sidebar { transform: translateX(-100%); transition: transform 0.3s ease; }\n\
  .sidebar.show { transform: translateX(0); }\n\
  .main-content { margin-left: 0; }\n\
}";

/// Renders a complete page.
pub fn render_base(ctx: &LayoutContext) -> String {
    let title = format!("{} | {}", ctx.page_title, ctx.site_title);

    Document::new()
        .doctype()
        .root::<Html, _>(|root| {
            root.attr("lang", "en")
                .data("bs-theme", "light")
                .child::<Head, _>(|head| {
                    head.child::<Meta, _>(|m| m.attr("charset", "UTF-8"))
                        .child::<Meta, _>(|m| {
                            m.attr("name", "viewport")
                                .attr("content", "width=device-width, initial-scale=1.0")
                        })
                        .child::<Title, _>(|t| t.text(&title))
                        .child::<Link, _>(|l| {
                            l.attr("href", "https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/css/bootstrap.min.css")
                                .attr("rel", "stylesheet")
                        })
                        .child::<Link, _>(|l| {
                            l.attr("href", "https://cdn.jsdelivr.net/npm/bootstrap-icons@1.11.1/font/bootstrap-icons.css")
                                .attr("rel", "stylesheet")
                        })
                        .child::<Style, _>(|s| s.raw(CSS))
                })
                .child::<Body, _>(|body| {
                    body.child::<Nav, _>(|nav| render_sidebar(nav, ctx))
                        .child::<Div, _>(|main| {
                            main.class("main-content")
                                .child::<Nav, _>(|n| render_topbar(n, &ctx.breadcrumbs))
                                .child::<Div, _>(|cw| {
                                    let cw = render_messages(cw.class("content-wrapper"), &ctx.messages);
                                    let heading = &ctx.page_title;
                                    let heading = html! {
                                        h2.class("h4 mb-4") { #heading }
                                    };
                                    cw.raw(heading.render()).raw(&ctx.content)
                                })
                        })
                        .child::<Script, _>(|s| {
                            s.attr("src", "https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/js/bootstrap.bundle.min.js")
                        })
                })
        })
        .build()
}

fn render_sidebar(nav: Element<Nav>, ctx: &LayoutContext) -> Element<Nav> {
    let site_title = &ctx.site_title;

    nav.class("sidebar")
        .child::<Div, _>(|d| {
            d.class("sidebar-header").child::<H5, _>(|h| {
                h.child::<I, _>(|i| i.class("bi bi-shield-check me-2"))
                    .text(site_title)
            })
        })
        .child::<Ul, _>(|ul| {
            ul.class("nav flex-column")
                .children(ctx.links.iter(), |item, li: Element<Li>| {
                    let is_active = ctx.active.as_deref() == Some(item.id);
                    let class = if is_active { "nav-link active" } else { "nav-link" };
                    let href = item.href;
                    let label = item.label;
                    let icon = format!("bi {} me-2", item.icon);
                    let link = html! {
                        a.class(#class).href(#href) {
                            i.class(#icon)
                            #label
                        }
                    };
                    li.class("nav-item").raw(link.render())
                })
                .when(ctx.links.is_empty(), |ul| {
                    ul.child::<Li, _>(|li| {
                        li.class("nav-item px-3 py-2 text-white-50 small")
                            .text("All sections are hidden.")
                    })
                })
        })
        .child::<Div, _>(|d| {
            let settings = html! {
                a.class("nav-link").href("/settings/nav/") {
                    i.class("bi bi-sliders me-2")
                    "Navigation"
                }
            };
            d.class("border-top border-secondary mt-2").raw(settings.render())
        })
}

fn render_topbar(nav: Element<Nav>, breadcrumbs: &[(String, Option<String>)]) -> Element<Nav> {
    let toggle = html! {
        button.class("btn btn-link d-md-none")
            .type_("button")
            .onclick("document.querySelector('.sidebar').classList.toggle('show')") {
            i.class("bi bi-list fs-4")
        }
    };

    nav.class("navbar bg-white border-bottom px-3").child::<Div, _>(|d| {
        d.class("container-fluid")
            .raw(toggle.render())
            .child::<Nav, _>(|n| render_breadcrumbs(n, breadcrumbs))
    })
}

fn render_breadcrumbs(nav: Element<Nav>, breadcrumbs: &[(String, Option<String>)]) -> Element<Nav> {
    let last = breadcrumbs.len().saturating_sub(1);
    nav.attr("aria-label", "breadcrumb").child::<Ol, _>(|ol| {
        ol.class("breadcrumb mb-0")
            .children(breadcrumbs.iter().enumerate(), |(i, (label, url)), li: Element<Li>| {
                match url {
                    Some(url) if i != last => {
                        let link = html! { a.href(#url) { #label } };
                        li.class("breadcrumb-item").raw(link.render())
                    }
                    _ => li
                        .class("breadcrumb-item active")
                        .attr("aria-current", "page")
                        .text(label),
                }
            })
    })
}

fn render_messages(wrapper: Element<Div>, messages: &[(String, String)]) -> Element<Div> {
    wrapper.children(messages.iter(), |(level, text), div: Element<Div>| {
        let class = match level.as_str() {
            "success" => "alert alert-success",
            "error" => "alert alert-danger",
            "warning" => "alert alert-warning",
            _ => "alert alert-info",
        };
        div.class(class)
            .attr("role", "alert")
            .child::<Span, _>(|s| s.text(text))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::FeatureFlags;

    #[test]
    fn test_layout_shows_visible_links_only() {
        let mut flags = FeatureFlags::new();
        flags.set("training", false);
        let html = render_base(&LayoutContext {
            links: flags.visible_links(),
            active: Some("vehicles".to_string()),
            page_title: "Vehicles".to_string(),
            content: "<p id=\"body\">rows</p>".to_string(),
            ..LayoutContext::default()
        });

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Vehicles | Fleet Compliance</title>"));
        assert!(html.contains(r#"href="/vehicles/""#));
        assert!(!html.contains(r#"href="/training/""#));
        assert!(html.contains("nav-link active"));
        assert!(html.contains("<p id=\"body\">rows</p>"));
    }

    #[test]
    fn test_messages_are_escaped() {
        let html = render_base(&LayoutContext {
            messages: vec![("error".to_string(), "<b>failed</b>".to_string())],
            ..LayoutContext::default()
        });
        assert!(html.contains("alert alert-danger"));
        assert!(html.contains("&lt;b&gt;failed&lt;/b&gt;"));
        assert!(html.contains("All sections are hidden."));
    }
}
