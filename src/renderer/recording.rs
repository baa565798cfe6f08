use super::{Align, Border, PageRenderer};
use crate::font::{FontSource, FontStyle};
use crate::{Colour, PDFError};
use std::collections::HashSet;
use std::fmt;
use std::io::Write;

/// One call received by a [RecordingRenderer]
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCall {
    AddPage,
    SetMargins(f64),
    RegisterFont {
        family: String,
        style: FontStyle,
    },
    SelectFont {
        family: String,
        style: FontStyle,
        size_pt: f64,
    },
    SetTextColor(Colour),
    SetFillColor(Colour),
    Cell {
        width: f64,
        height: f64,
        text: String,
        border: Border,
        align: Align,
        fill: bool,
    },
    Multiline {
        width: f64,
        height: f64,
        text: String,
        border: Border,
        align: Align,
        fill: bool,
    },
    Advance(f64),
}

/// One call per line, in the order of the [PageRenderer] method names. Lengths
/// print in the native unit, font sizes in points, colours as RGB bytes, and
/// borders and alignments in their short codes.
impl fmt::Display for RenderCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderCall::AddPage => f.write_str("add_page"),
            RenderCall::SetMargins(margin) => write!(f, "set_margins {margin}"),
            RenderCall::RegisterFont { family, style } => {
                write!(f, "register_font {family:?} {style}")
            }
            RenderCall::SelectFont {
                family,
                style,
                size_pt,
            } => write!(f, "select_font {family:?} {style} {size_pt}pt"),
            RenderCall::SetTextColor(colour) => {
                let (r, g, b) = colour.to_rgb_bytes();
                write!(f, "set_text_color {r} {g} {b}")
            }
            RenderCall::SetFillColor(colour) => {
                let (r, g, b) = colour.to_rgb_bytes();
                write!(f, "set_fill_color {r} {g} {b}")
            }
            RenderCall::Cell {
                width,
                height,
                text,
                border,
                align,
                fill,
            } => write!(f, "cell {width} {height} {border} {align} {fill} {text:?}"),
            RenderCall::Multiline {
                width,
                height,
                text,
                border,
                align,
                fill,
            } => write!(f, "multiline {width} {height} {border} {align} {fill} {text:?}"),
            RenderCall::Advance(height) => write!(f, "advance {height}"),
        }
    }
}

/// A renderer that draws nothing and remembers everything.
///
/// It enforces the same preconditions as [PdfRenderer](super::PdfRenderer):
/// drawing needs a page, selecting a font needs it registered, and drawing
/// text needs a selected font. Calls that fail are not recorded. Serializing
/// writes the call log, one call per line.
#[derive(Debug)]
pub struct RecordingRenderer {
    page_size: (f64, f64),
    calls: Vec<RenderCall>,
    fonts: HashSet<(String, FontStyle)>,
    font_selected: bool,
    pages: usize,
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        // A4, in millimetres
        RecordingRenderer::new((210.0, 297.0))
    }
}

impl RecordingRenderer {
    /// Create a renderer reporting `page_size` (in the native unit) as its page size
    pub fn new(page_size: (f64, f64)) -> RecordingRenderer {
        RecordingRenderer {
            page_size,
            calls: Vec::new(),
            fonts: HashSet::new(),
            font_selected: false,
            pages: 0,
        }
    }

    /// Every successful call, in order
    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Only the font selections, in order
    pub fn selected_fonts(&self) -> impl Iterator<Item = &RenderCall> {
        self.calls
            .iter()
            .filter(|call| matches!(call, RenderCall::SelectFont { .. }))
    }

    /// The text of every cell and multi-line block, in order
    pub fn drawn_text(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RenderCall::Cell { text, .. } | RenderCall::Multiline { text, .. } => {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect()
    }

    fn check_draw(&self, text: &str) -> Result<(), PDFError> {
        if self.pages == 0 {
            return Err(PDFError::NoPage);
        }
        if !text.is_empty() && !self.font_selected {
            return Err(PDFError::NoFontSelected);
        }
        Ok(())
    }
}

impl PageRenderer for RecordingRenderer {
    fn add_page(&mut self) -> Result<(), PDFError> {
        self.pages += 1;
        self.calls.push(RenderCall::AddPage);
        Ok(())
    }

    fn set_margins(&mut self, margin: f64) {
        self.calls.push(RenderCall::SetMargins(margin));
    }

    fn register_font(
        &mut self,
        family: &str,
        style: FontStyle,
        _source: FontSource,
    ) -> Result<(), PDFError> {
        self.fonts.insert((family.to_string(), style));
        self.calls.push(RenderCall::RegisterFont {
            family: family.to_string(),
            style,
        });
        Ok(())
    }

    fn select_font(
        &mut self,
        family: &str,
        style: FontStyle,
        size_pt: f64,
    ) -> Result<(), PDFError> {
        if !self.fonts.contains(&(family.to_string(), style)) {
            return Err(PDFError::UnknownFont {
                family: family.to_string(),
                style,
            });
        }
        self.font_selected = true;
        self.calls.push(RenderCall::SelectFont {
            family: family.to_string(),
            style,
            size_pt,
        });
        Ok(())
    }

    fn set_text_color(&mut self, colour: Colour) {
        self.calls.push(RenderCall::SetTextColor(colour));
    }

    fn set_fill_color(&mut self, colour: Colour) {
        self.calls.push(RenderCall::SetFillColor(colour));
    }

    fn draw_cell(
        &mut self,
        width: f64,
        height: f64,
        text: &str,
        border: Border,
        align: Align,
        fill: bool,
    ) -> Result<(), PDFError> {
        self.check_draw(text)?;
        self.calls.push(RenderCall::Cell {
            width,
            height,
            text: text.to_string(),
            border,
            align,
            fill,
        });
        Ok(())
    }

    fn draw_multiline(
        &mut self,
        width: f64,
        height: f64,
        text: &str,
        border: Border,
        align: Align,
        fill: bool,
    ) -> Result<(), PDFError> {
        self.check_draw(text)?;
        self.calls.push(RenderCall::Multiline {
            width,
            height,
            text: text.to_string(),
            border,
            align,
            fill,
        });
        Ok(())
    }

    fn advance(&mut self, height: f64) -> Result<(), PDFError> {
        if self.pages == 0 {
            return Err(PDFError::NoPage);
        }
        self.calls.push(RenderCall::Advance(height));
        Ok(())
    }

    fn page_size(&self) -> (f64, f64) {
        self.page_size
    }

    fn serialize<W: Write>(self, mut destination: W) -> Result<(), PDFError> {
        for call in self.calls.iter() {
            writeln!(destination, "{call}")?;
        }
        destination.flush()?;
        Ok(())
    }
}
