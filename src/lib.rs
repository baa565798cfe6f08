//! A unit-aware layout layer for writing paginated PDF reports.
//!
//! A [LayoutEngine] takes every length together with its [Unit] (points,
//! millimetres, inches or pixels), converts it into the document's single native
//! unit and hands it to a [PageRenderer](renderer::PageRenderer). It remembers
//! the current font size and the "main" regular and bold fonts, so that
//! [headings](LayoutEngine::heading), [body text](LayoutEngine::text) and
//! [line breaks](LayoutEngine::newline) size themselves.
//!
//! ```no_run
//! use pdf_report::renderer::PdfRenderer;
//! use pdf_report::{CellStyle, FontStyle, HeadingLevel, LayoutConfig, LayoutEngine, Unit};
//!
//! # fn main() -> Result<(), pdf_report::LayoutError> {
//! let config = LayoutConfig::default();
//! let renderer = PdfRenderer::from_config(&config)?;
//! let mut engine = LayoutEngine::new(renderer, &config)?;
//!
//! engine.add_page()?;
//! engine.register_font("Body", FontStyle::Regular, std::path::Path::new("Body-Regular.ttf"), true)?;
//! engine.register_font("Body", FontStyle::Bold, std::path::Path::new("Body-Bold.ttf"), true)?;
//! engine.set_font("Body", FontStyle::Regular, 12.0, Unit::Point)?;
//!
//! engine.heading(HeadingLevel::H1, "Quarterly report", CellStyle::default(), None)?;
//! engine.text("All figures are in thousands.", CellStyle::default(), Some(1))?;
//! engine.output_to_file("report.pdf")?;
//! # Ok(())
//! # }
//! ```

mod colour;
pub use colour::*;

mod config;
pub use config::*;

mod content;

mod document;
pub use document::*;

mod engine;
pub use engine::*;

mod font;
pub use font::*;

mod info;
pub use info::*;

/// Utility functions and structures to layout objects (mostly text) on pages
pub mod layout;

mod page;
pub use page::*;

pub mod pagesize;

mod rect;
pub use rect::*;

pub(crate) mod refs;

pub mod renderer;

mod state;
pub use state::*;

mod units;
pub use units::*;

mod error;
pub use error::*;

/// Re-export PDF-writer functionality, mostly for custom [pdf_writer::Content] generation
pub use pdf_writer;
