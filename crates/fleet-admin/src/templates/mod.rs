//! Bootstrap 5 page templates.

mod base;

pub use base::{render_base, LayoutContext};
