//! The page-drawing boundary the layout engine talks to.
//!
//! A [`PageRenderer`] owns the actual canvas. Every length it receives is
//! already expressed in the document's native unit; converting from the unit
//! a caller happened to use is the [`LayoutEngine`](crate::LayoutEngine)'s job,
//! never the renderer's.
//!
//! Two renderers ship with the crate:
//!
//! - [`PdfRenderer`] lays content out on real PDF pages with embedded fonts
//! - [`RecordingRenderer`] records every call, for tests and dry runs

use crate::font::{FontSource, FontStyle};
use crate::{Colour, PDFError, ParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

mod pdf;
pub use pdf::*;

mod recording;
pub use recording::*;

/// Which sides of a cell get a border line
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Border {
    pub left: bool,
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
}

impl Border {
    pub const NONE: Border = Border {
        left: false,
        top: false,
        right: false,
        bottom: false,
    };

    pub const ALL: Border = Border {
        left: true,
        top: true,
        right: true,
        bottom: true,
    };

    pub fn is_none(&self) -> bool {
        *self == Border::NONE
    }

    pub fn is_all(&self) -> bool {
        *self == Border::ALL
    }
}

/// Parses the cell border notation: `"0"` (or empty) for no border, `"1"` for a
/// full frame, or any combination of `L`, `T`, `R` and `B`
impl FromStr for Border {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "0" => return Ok(Border::NONE),
            "1" => return Ok(Border::ALL),
            _ => {}
        }

        let mut border = Border::NONE;
        for side in s.trim().chars() {
            match side.to_ascii_uppercase() {
                'L' => border.left = true,
                'T' => border.top = true,
                'R' => border.right = true,
                'B' => border.bottom = true,
                _ => {
                    return Err(ParseError::UnknownBorderSide {
                        side,
                        code: s.to_string(),
                    })
                }
            }
        }
        Ok(border)
    }
}

impl From<bool> for Border {
    fn from(value: bool) -> Self {
        if value {
            Border::ALL
        } else {
            Border::NONE
        }
    }
}

impl fmt::Display for Border {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("0");
        }
        if self.is_all() {
            return f.write_str("1");
        }
        for (set, side) in [
            (self.left, 'L'),
            (self.top, 'T'),
            (self.right, 'R'),
            (self.bottom, 'B'),
        ] {
            if set {
                write!(f, "{side}")?;
            }
        }
        Ok(())
    }
}

/// Horizontal alignment of text inside a cell
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    /// Stretch the spaces of every wrapped line to fill the cell width.
    /// Single-line cells treat this as [Align::Left].
    Justify,
}

/// Parses the single-letter alignment codes `L`, `C`, `R` and `J`; an empty
/// string means [Align::Left]
impl FromStr for Align {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "L" | "LEFT" => Ok(Align::Left),
            "C" | "CENTER" | "CENTRE" => Ok(Align::Center),
            "R" | "RIGHT" => Ok(Align::Right),
            "J" | "JUSTIFY" => Ok(Align::Justify),
            _ => Err(ParseError::UnknownAlignment(s.to_string())),
        }
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Align::Left => "L",
            Align::Center => "C",
            Align::Right => "R",
            Align::Justify => "J",
        })
    }
}

/// A low-level canvas that places content on pages.
///
/// All dimensions are in the document's native unit. A width of `0` means "up to
/// the right margin". Renderers keep a cursor: cells advance it to the right,
/// multi-line blocks and [`advance`](PageRenderer::advance) move it down and back
/// to the left margin.
pub trait PageRenderer {
    /// Start a new page and move the cursor to its top-left margin
    fn add_page(&mut self) -> Result<(), PDFError>;

    /// Use `margin` for the left, top and right margins and as the bottom
    /// distance that triggers an automatic page break
    fn set_margins(&mut self, margin: f64);

    /// Make a font family available in the given style
    fn register_font(
        &mut self,
        family: &str,
        style: FontStyle,
        source: FontSource,
    ) -> Result<(), PDFError>;

    /// Make a previously registered font the active one, at `size_pt` points
    fn select_font(&mut self, family: &str, style: FontStyle, size_pt: f64)
        -> Result<(), PDFError>;

    /// Colour used for subsequent text
    fn set_text_color(&mut self, colour: Colour);

    /// Colour used for subsequent cell backgrounds
    fn set_fill_color(&mut self, colour: Colour);

    /// Draw a single-line cell at the cursor, then move the cursor to its right edge
    fn draw_cell(
        &mut self,
        width: f64,
        height: f64,
        text: &str,
        border: Border,
        align: Align,
        fill: bool,
    ) -> Result<(), PDFError>;

    /// Draw `text` wrapped into rows of `height`, then move the cursor to the left
    /// margin just below the block
    fn draw_multiline(
        &mut self,
        width: f64,
        height: f64,
        text: &str,
        border: Border,
        align: Align,
        fill: bool,
    ) -> Result<(), PDFError>;

    /// Move the cursor to the left margin and down by `height`
    fn advance(&mut self, height: f64) -> Result<(), PDFError>;

    /// Width and height of a page
    fn page_size(&self) -> (f64, f64);

    /// Write the finished document out, consuming the renderer
    fn serialize<W: Write>(self, destination: W) -> Result<(), PDFError>
    where
        Self: Sized;
}
