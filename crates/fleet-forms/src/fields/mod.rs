//! Shorthand constructors for common field definitions.

mod checkbox;
mod date;
mod file;
mod select;
mod text;

pub use checkbox::{checkbox_field, switch_field};
pub use date::date_field;
pub use file::file_field;
pub use select::{radio_field, select_field};
pub use text::{char_field, email_field, number_field, password_field, text_area_field};
