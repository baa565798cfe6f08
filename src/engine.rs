use crate::config::{HeadingSizes, LayoutConfig};
use crate::font::{FontSource, FontStyle};
use crate::renderer::{Align, Border, PageRenderer};
use crate::state::{DocumentState, FontId};
use crate::units::{calculate_ppi, Unit};
use crate::{Colour, LayoutError};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// The three heading levels a document can use
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn number(&self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = LayoutError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(HeadingLevel::H1),
            2 => Ok(HeadingLevel::H2),
            3 => Ok(HeadingLevel::H3),
            other => Err(LayoutError::InvalidHeadingLevel(other)),
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.number())
    }
}

/// Border, alignment and background of a cell
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct CellStyle {
    pub border: Border,
    pub align: Align,
    pub fill: bool,
}

impl CellStyle {
    pub fn new(border: Border, align: Align, fill: bool) -> CellStyle {
        CellStyle {
            border,
            align,
            fill,
        }
    }

    pub fn with_border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Paint the cell background with the current fill colour
    pub fn filled(mut self) -> Self {
        self.fill = true;
        self
    }
}

/// Authors a paginated document through a [PageRenderer].
///
/// Every length the engine accepts comes with its [Unit]; the engine converts it
/// into the document's native unit before the renderer sees it. Font sizes are
/// remembered in points, so paragraph heights and line breaks follow whatever
/// font was selected last.
///
/// ```
/// use pdf_report::renderer::RecordingRenderer;
/// use pdf_report::{CellStyle, FontStyle, LayoutConfig, LayoutEngine, Unit};
///
/// let mut engine = LayoutEngine::new(RecordingRenderer::default(), &LayoutConfig::default()).unwrap();
/// engine.add_page().unwrap();
/// engine.register_font("Body", FontStyle::Regular, Vec::<u8>::new(), true).unwrap();
/// engine.set_font("Body", FontStyle::Regular, 12.0, Unit::Point).unwrap();
/// engine.text("Hello", CellStyle::default(), None).unwrap();
/// assert_eq!(engine.renderer().drawn_text(), vec!["Hello"]);
/// ```
pub struct LayoutEngine<R: PageRenderer> {
    renderer: R,
    state: DocumentState,
    text_size_pt: f64,
    heading_sizes: HeadingSizes,
}

impl<R: PageRenderer> LayoutEngine<R> {
    /// Build an engine drawing onto `renderer`. The configuration's margin is
    /// forwarded to the renderer and its PPI, if any, is applied.
    pub fn new(mut renderer: R, config: &LayoutConfig) -> Result<LayoutEngine<R>, LayoutError> {
        let mut state = DocumentState::new(
            config.unit,
            config.margin,
            config.tab_width_chars,
            config.line_height_factor,
        );
        if let Some(ppi) = config.ppi {
            state.set_ppi(ppi)?;
        }
        renderer.set_margins(config.margin);

        Ok(LayoutEngine {
            renderer,
            state,
            text_size_pt: config.text_size_pt,
            heading_sizes: config.heading_sizes,
        })
    }

    pub fn state(&self) -> &DocumentState {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Give up the engine, keeping the renderer
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Start a new page. The current font and PPI carry over.
    pub fn add_page(&mut self) -> Result<(), LayoutError> {
        self.renderer.add_page()?;
        Ok(())
    }

    /// Make a font available to the document. With `make_main`, the font also
    /// becomes the main font of its style, which must then be regular or bold.
    pub fn register_font<S: Into<FontSource>>(
        &mut self,
        family: &str,
        style: FontStyle,
        source: S,
        make_main: bool,
    ) -> Result<(), LayoutError> {
        if make_main {
            DocumentState::check_main_style(style)?;
        }
        self.renderer
            .register_font(family, style, source.into())?;
        if make_main {
            self.state
                .designate_main_font(FontId::new(family, style))?;
        }
        Ok(())
    }

    /// Select a registered font at `size`, measured in `unit`
    pub fn set_font(
        &mut self,
        family: &str,
        style: FontStyle,
        size: f64,
        unit: Unit,
    ) -> Result<(), LayoutError> {
        let size_pt = self.state.to_points(size, unit)?;
        self.renderer.select_font(family, style, size_pt)?;
        self.state.record_font(FontId::new(family, style), size_pt);
        log::debug!("selected {family:?} ({style}) at {size_pt}pt");
        Ok(())
    }

    pub fn set_ppi(&mut self, value: f64) -> Result<(), LayoutError> {
        self.state.set_ppi(value)
    }

    /// Set the PPI from a display's resolution and diagonal, returning the value used
    pub fn set_ppi_from_display(
        &mut self,
        width_px: u32,
        height_px: u32,
        diagonal_in: f64,
    ) -> Result<f64, LayoutError> {
        let ppi = calculate_ppi(width_px, height_px, diagonal_in)?;
        self.state.set_ppi(ppi)?;
        Ok(ppi)
    }

    pub fn set_text_color(&mut self, r: u8, g: u8, b: u8) {
        self.renderer.set_text_color(Colour::new_rgb_bytes(r, g, b));
    }

    pub fn set_fill_color(&mut self, r: u8, g: u8, b: u8) {
        self.renderer.set_fill_color(Colour::new_rgb_bytes(r, g, b));
    }

    /// The page size in the native unit
    pub fn document_size(&self) -> (f64, f64) {
        self.renderer.page_size()
    }

    /// Place a single-line cell. `height` is scaled by the line height factor; a
    /// `width` of zero reaches the right margin. With `advance_line`, the cursor
    /// then moves down by one line of the current font. Text needs a selected font.
    pub fn cell(
        &mut self,
        width: f64,
        height: f64,
        unit: Unit,
        text: &str,
        style: CellStyle,
        advance_line: bool,
    ) -> Result<(), LayoutError> {
        let width = self.state.to_native(width, unit)?;
        let height = self.state.to_native(height, unit)? * self.state.line_height_factor();
        if !text.is_empty() {
            self.state.font_size_native()?;
        }
        let line = if advance_line {
            Some(self.state.font_size_native()?)
        } else {
            None
        };

        self.renderer
            .draw_cell(width, height, text, style.border, style.align, style.fill)?;
        if let Some(line) = line {
            self.renderer.advance(line)?;
        }
        Ok(())
    }

    /// Place a block of wrapped text across the full content width, one line of
    /// the current font per row, then move down by one more line.
    /// A `tab_level` indents the text by that many tabs of spaces.
    pub fn multi_cell(
        &mut self,
        text: &str,
        style: CellStyle,
        tab_level: Option<u32>,
    ) -> Result<(), LayoutError> {
        let line = self.state.font_size_native()?;
        let row_height = line * self.state.line_height_factor();
        let text = match tab_level {
            Some(level) => format!("{}{}", self.state.tab_prefix(level)?, text),
            None => text.to_string(),
        };

        self.renderer.draw_multiline(
            0.0,
            row_height,
            &text,
            style.border,
            style.align,
            style.fill,
        )?;
        self.renderer.advance(line)?;
        Ok(())
    }

    /// Body text in the main regular font, at the configured text size.
    /// If the block can't be placed, the previous font is selected again.
    pub fn text(
        &mut self,
        text: &str,
        style: CellStyle,
        tab_level: Option<u32>,
    ) -> Result<(), LayoutError> {
        self.main_font_block(FontStyle::Regular, self.text_size_pt, text, style, tab_level)
    }

    /// A heading in the main bold font, at the size configured for `level`.
    /// If the block can't be placed, the previous font is selected again.
    pub fn heading(
        &mut self,
        level: HeadingLevel,
        text: &str,
        style: CellStyle,
        tab_level: Option<u32>,
    ) -> Result<(), LayoutError> {
        let size_pt = self.heading_sizes.size(level);
        self.main_font_block(FontStyle::Bold, size_pt, text, style, tab_level)
    }

    /// Move to the left margin and down by `height`
    pub fn line_break(&mut self, height: f64, unit: Unit) -> Result<(), LayoutError> {
        let height = self.state.to_native(height, unit)?;
        self.renderer.advance(height)?;
        Ok(())
    }

    /// Move down by one line of the current font
    pub fn newline(&mut self) -> Result<(), LayoutError> {
        let height = self.state.font_size_native()?;
        self.renderer.advance(height)?;
        Ok(())
    }

    /// Write the document out through the renderer
    pub fn output<W: Write>(self, destination: W) -> Result<(), LayoutError> {
        self.renderer.serialize(destination)?;
        Ok(())
    }

    /// Write the document to a newly created file at `path`
    pub fn output_to_file<P: AsRef<Path>>(self, path: P) -> Result<(), LayoutError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.renderer.serialize(&mut writer)?;
        writer.flush()?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }

    fn main_font_block(
        &mut self,
        font_style: FontStyle,
        size_pt: f64,
        text: &str,
        style: CellStyle,
        tab_level: Option<u32>,
    ) -> Result<(), LayoutError> {
        if let Some(level) = tab_level {
            self.state.tab_prefix(level)?;
        }
        let previous = self.state.clone();
        self.select_main_font(font_style, size_pt)?;
        if let Err(err) = self.multi_cell(text, style, tab_level) {
            self.restore_font(previous);
            return Err(err);
        }
        Ok(())
    }

    /// Put back the state from before a failed block, reselecting its font on
    /// the renderer if the block had switched away from it
    fn restore_font(&mut self, previous: DocumentState) {
        let switched = previous.current_font() != self.state.current_font()
            || previous.current_font_size_pt() != self.state.current_font_size_pt();
        if switched {
            if let (Some(font), Some(size_pt)) =
                (previous.current_font(), previous.current_font_size_pt())
            {
                if let Err(err) = self.renderer.select_font(&font.family, font.style, size_pt) {
                    log::warn!("could not reselect {font} at {size_pt}pt: {err}");
                }
            }
        }
        self.state = previous;
    }

    /// Select the main font of `style`, if one was designated. Without one, the
    /// renderer keeps whatever font it has.
    fn select_main_font(&mut self, style: FontStyle, size_pt: f64) -> Result<(), LayoutError> {
        let Some(font) = self.state.main_font(style).cloned() else {
            log::warn!("no main {style} font registered, keeping the current font");
            return Ok(());
        };
        // fail before touching the renderer if the size can't be expressed natively
        self.state.to_native(size_pt, Unit::Point)?;
        self.set_font(&font.family, font.style, size_pt, Unit::Point)
    }
}
