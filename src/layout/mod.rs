//! Text measurement and line-breaking utilities used to place content on pages.
//!
//! These work purely in points, against a loaded [`Font`](crate::Font):
//!
//! - [`width_of_text`](crate::layout::width_of_text) measures a run of text
//! - [`wrap_lines`](crate::layout::wrap_lines) breaks a paragraph into lines that fit a width,
//!   preferring whitespace and falling back to splitting a word when it has to
//!
//! [`Margins`](crate::layout::Margins) describe the blank border of a page.

mod margins;
pub use margins::*;

mod text;
pub use text::*;
