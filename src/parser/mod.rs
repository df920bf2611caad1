//! Markup parsing module.

mod html;
mod options;
mod style;

pub use html::parse_html;
pub use options::{ExtractOptions, PageSelection};
pub use style::{page_dimensions, parse_style, parse_style_absolute};
