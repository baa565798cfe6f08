use super::{Align, Border, PageRenderer};
use crate::colour::colours;
use crate::config::LayoutConfig;
use crate::document::Document;
use crate::font::{Font, FontSource, FontStyle};
use crate::info::Info;
use crate::layout::{width_of_text, wrap_lines, Margins, WrappedLine};
use crate::page::{Page, SpanFont, SpanLayout};
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::units::{convert, Mm, Pt, Unit};
use crate::{Colour, ConversionError, PDFError};
use id_arena::Id;
use pdf_writer::Content;
use std::collections::HashMap;
use std::io::Write;

/// Horizontal gap between a cell's edge and its text
const CELL_PADDING: Mm = Mm(1.0);
/// Stroke width of cell borders
const BORDER_WIDTH: Mm = Mm(0.2);

/// The outline of a single row being drawn at the cursor
struct CellBox {
    width: Pt,
    height: Pt,
    border: Border,
    fill: bool,
}

/// A [PageRenderer] that lays content out onto PDF pages.
///
/// The renderer works in a fixed user unit chosen at construction, like a
/// classic FPDF document: every length it receives is multiplied by the number
/// of points per native unit before it reaches the page. It keeps a cursor that
/// starts at the top-left margin of each page, and starts a new page on its
/// own when a row would cross the bottom margin.
///
/// ```
/// use pdf_report::renderer::{PageRenderer, PdfRenderer, Border, Align};
/// use pdf_report::{pagesize, Unit};
///
/// let mut renderer = PdfRenderer::new(pagesize::A4, Unit::Millimeter, None).unwrap();
/// renderer.set_margins(15.0);
/// renderer.add_page().unwrap();
/// renderer.set_fill_color((200, 220, 255).into());
/// renderer.draw_cell(0.0, 10.0, "", Border::ALL, Align::Left, true).unwrap();
///
/// let mut out: Vec<u8> = Vec::new();
/// renderer.serialize(&mut out).unwrap();
/// assert!(out.starts_with(b"%PDF"));
/// ```
pub struct PdfRenderer {
    document: Document,
    page_size: PageSize,
    /// points per native unit
    scale: f64,
    margins: Margins,
    auto_page_break: bool,
    current_page: Option<Id<Page>>,
    /// cursor, measured from the top-left corner of the page
    x: Pt,
    y: Pt,
    fonts: HashMap<(String, FontStyle), Id<Font>>,
    current_font: Option<SpanFont>,
    text_colour: Colour,
    fill_colour: Colour,
}

impl PdfRenderer {
    /// Create a renderer for pages of `page_size`, taking every length in
    /// `native_unit`. A pixel-based document needs `ppi` to know how large a
    /// pixel is on paper.
    pub fn new(
        page_size: PageSize,
        native_unit: Unit,
        ppi: Option<f64>,
    ) -> Result<PdfRenderer, ConversionError> {
        let scale = convert(1.0, native_unit, Unit::Point, ppi)?;
        Ok(PdfRenderer {
            document: Document::default(),
            page_size,
            scale,
            margins: Margins::all(Mm(10.0)),
            auto_page_break: true,
            current_page: None,
            x: Pt(0.0),
            y: Pt(0.0),
            fonts: HashMap::new(),
            current_font: None,
            text_colour: colours::BLACK,
            fill_colour: colours::WHITE,
        })
    }

    /// Create a renderer matching a layout configuration's paper, unit, PPI
    /// and margin
    pub fn from_config(config: &LayoutConfig) -> Result<PdfRenderer, ConversionError> {
        let mut renderer = PdfRenderer::new(config.page_format.size(), config.unit, config.ppi)?;
        renderer.set_margins(config.margin);
        Ok(renderer)
    }

    /// Set the metadata written into the PDF's information dictionary
    pub fn set_info(&mut self, info: Info) {
        self.document.set_info(info);
    }

    /// Turn the automatic page break at the bottom margin on or off
    pub fn set_auto_page_break(&mut self, enabled: bool) {
        self.auto_page_break = enabled;
    }

    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    /// The cursor position in the native unit, measured from the top-left corner of the page
    pub fn cursor(&self) -> (f64, f64) {
        (self.from_pt(self.x), self.from_pt(self.y))
    }

    /// The underlying PDF object model
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn to_pt(&self, value: f64) -> Pt {
        Pt((value * self.scale) as f32)
    }

    fn from_pt(&self, value: Pt) -> f64 {
        value.0 as f64 / self.scale
    }

    fn current_page_mut(&mut self) -> Result<&mut Page, PDFError> {
        let id = self.current_page.ok_or(PDFError::NoPage)?;
        self.document.page_mut(id).ok_or(PDFError::PageMissing)
    }

    fn start_page(&mut self) {
        let page = Page::new(self.page_size, Some(self.margins));
        self.current_page = Some(self.document.add_page(page));
        self.x = self.margins.left;
        self.y = self.margins.top;
    }

    /// Start a new page, keeping the cursor's horizontal position, when a row of
    /// `height` would cross the bottom margin. A row taller than the whole content
    /// area is drawn anyway once it starts at the top margin.
    fn break_page_if_needed(&mut self, height: Pt) -> Result<(), PDFError> {
        if self.current_page.is_none() {
            return Err(PDFError::NoPage);
        }
        let limit = self.page_size.1 - self.margins.bottom;
        if self.auto_page_break && self.y + height > limit && self.y > self.margins.top {
            let x = self.x;
            self.start_page();
            self.x = x;
            log::debug!("automatic page break, now on page {}", self.page_count());
        }
        Ok(())
    }

    /// A width of zero (or less) reaches from the cursor to the right margin
    fn resolve_width(&self, width: f64) -> Pt {
        if width > 0.0 {
            self.to_pt(width)
        } else {
            self.page_size.0 - self.margins.right - self.x
        }
    }

    fn box_operators(&self, rect: Rect, border: Border, fill: bool) -> Vec<u8> {
        let mut content = Content::new();
        if fill {
            self.fill_colour.apply_fill(&mut content);
            content.rect(*rect.x1, *rect.y1, *rect.width(), *rect.height());
            content.fill_nonzero();
        }
        if !border.is_none() {
            colours::BLACK.apply_stroke(&mut content);
            content.set_line_width(*Pt::from(BORDER_WIDTH));
            if border.is_all() {
                content.rect(*rect.x1, *rect.y1, *rect.width(), *rect.height());
            } else {
                let sides = [
                    (border.left, (rect.x1, rect.y1), (rect.x1, rect.y2)),
                    (border.top, (rect.x1, rect.y2), (rect.x2, rect.y2)),
                    (border.right, (rect.x2, rect.y2), (rect.x2, rect.y1)),
                    (border.bottom, (rect.x1, rect.y1), (rect.x2, rect.y1)),
                ];
                for (_, from, to) in sides.into_iter().filter(|(set, _, _)| *set) {
                    content.move_to(*from.0, *from.1);
                    content.line_to(*to.0, *to.1);
                }
            }
            content.stroke();
        }
        content.finish()
    }

    /// Draw one row at the cursor without moving it
    fn place_cell(&mut self, cell: &CellBox, text: &str, align: Align) -> Result<(), PDFError> {
        let rect = Rect::from_top_left(self.x, self.y, cell.width, cell.height, self.page_size.1);

        if cell.fill || !cell.border.is_none() {
            let ops = self.box_operators(rect, cell.border, cell.fill);
            self.current_page_mut()?.add_raw_content(ops);
        }

        if text.is_empty() {
            return Ok(());
        }

        let span_font = self.current_font.ok_or(PDFError::NoFontSelected)?;
        let font = self
            .document
            .fonts
            .get(span_font.id)
            .ok_or(PDFError::NoFontSelected)?;
        let size = span_font.size;
        let padding: Pt = CELL_PADDING.into();

        // centre the glyph box (ascent to descent) vertically in the row
        let baseline =
            rect.y2 - cell.height * 0.5 - (font.ascent(size) + font.descent(size)) * 0.5;
        let text_width = width_of_text(text, font, size);

        let mut spans: Vec<SpanLayout> = Vec::new();
        let span = |text: &str, x: Pt| SpanLayout {
            text: text.to_string(),
            font: span_font,
            colour: self.text_colour,
            coords: (x, baseline),
        };

        let words: Vec<&str> = text.split(' ').collect();
        match align {
            Align::Justify if words.len() > 1 => {
                let gaps = (words.len() - 1) as f32;
                let stretch = (cell.width - padding * 2.0 - text_width) / gaps;
                let space = width_of_text(" ", font, size);
                let mut x = rect.x1 + padding;
                for word in words {
                    if !word.is_empty() {
                        spans.push(span(word, x));
                    }
                    x += width_of_text(word, font, size) + space + stretch;
                }
            }
            Align::Left | Align::Justify => spans.push(span(text, rect.x1 + padding)),
            Align::Center => {
                spans.push(span(text, rect.x1 + (cell.width - text_width) * 0.5));
            }
            Align::Right => {
                spans.push(span(text, rect.x2 - padding - text_width));
            }
        }

        let page = self.current_page_mut()?;
        for span in spans.into_iter() {
            page.add_span(span);
        }

        Ok(())
    }

    fn wrap(&self, text: &str, width: Pt) -> Result<Vec<WrappedLine>, PDFError> {
        if text.is_empty() {
            return Ok(vec![WrappedLine {
                text: String::new(),
                width: Pt(0.0),
                ends_paragraph: true,
            }]);
        }

        let span_font = self.current_font.ok_or(PDFError::NoFontSelected)?;
        let font = self
            .document
            .fonts
            .get(span_font.id)
            .ok_or(PDFError::NoFontSelected)?;
        let padding: Pt = CELL_PADDING.into();
        Ok(wrap_lines(text, font, span_font.size, width - padding * 2.0))
    }
}

impl PageRenderer for PdfRenderer {
    fn add_page(&mut self) -> Result<(), PDFError> {
        self.start_page();
        log::debug!("added page {}", self.page_count());
        Ok(())
    }

    fn set_margins(&mut self, margin: f64) {
        self.margins = Margins::all(self.to_pt(margin));
    }

    fn register_font(
        &mut self,
        family: &str,
        style: FontStyle,
        source: FontSource,
    ) -> Result<(), PDFError> {
        let key = (family.to_string(), style);
        if self.fonts.contains_key(&key) {
            log::debug!("font {family:?} ({style}) is already registered");
            return Ok(());
        }

        let font = Font::load(source.into_bytes()?)?;
        let id = self.document.add_font(font);
        self.fonts.insert(key, id);
        log::debug!("registered font {family:?} ({style})");
        Ok(())
    }

    fn select_font(
        &mut self,
        family: &str,
        style: FontStyle,
        size_pt: f64,
    ) -> Result<(), PDFError> {
        let id = self
            .fonts
            .get(&(family.to_string(), style))
            .copied()
            .ok_or_else(|| PDFError::UnknownFont {
                family: family.to_string(),
                style,
            })?;
        self.current_font = Some(SpanFont {
            id,
            size: Pt(size_pt as f32),
        });
        Ok(())
    }

    fn set_text_color(&mut self, colour: Colour) {
        self.text_colour = colour;
    }

    fn set_fill_color(&mut self, colour: Colour) {
        self.fill_colour = colour;
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
        log::trace!("cell {width}x{height} {text:?}");
        let height = self.to_pt(height);
        self.break_page_if_needed(height)?;

        let cell = CellBox {
            width: self.resolve_width(width),
            height,
            border,
            fill,
        };
        self.place_cell(&cell, text, align)?;
        self.x += cell.width;
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
        log::trace!("multi-line cell {width}x{height} {text:?}");
        if self.current_page.is_none() {
            return Err(PDFError::NoPage);
        }

        let row_width = self.resolve_width(width);
        let height = self.to_pt(height);
        let lines = self.wrap(text, row_width)?;
        let start_x = self.x;
        let last = lines.len() - 1;

        for (i, line) in lines.iter().enumerate() {
            self.x = start_x;
            self.break_page_if_needed(height)?;

            // the block is framed as a whole: top edge on the first row, bottom on the last
            let cell = CellBox {
                width: row_width,
                height,
                border: Border {
                    top: border.top && i == 0,
                    bottom: border.bottom && i == last,
                    ..border
                },
                fill,
            };
            let row_align = match align {
                Align::Justify if line.ends_paragraph => Align::Left,
                other => other,
            };
            self.place_cell(&cell, &line.text, row_align)?;
            self.y += height;
        }

        self.x = self.margins.left;
        Ok(())
    }

    fn advance(&mut self, height: f64) -> Result<(), PDFError> {
        if self.current_page.is_none() {
            return Err(PDFError::NoPage);
        }
        self.x = self.margins.left;
        self.y += self.to_pt(height);
        Ok(())
    }

    fn page_size(&self) -> (f64, f64) {
        (self.from_pt(self.page_size.0), self.from_pt(self.page_size.1))
    }

    fn serialize<W: Write>(self, destination: W) -> Result<(), PDFError> {
        log::debug!("writing {} page(s)", self.page_count());
        self.document.write(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagesize::A4;

    fn renderer() -> PdfRenderer {
        let mut renderer = PdfRenderer::new(A4, Unit::Millimeter, None).unwrap();
        renderer.set_margins(10.0);
        renderer
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    fn with_font(size_pt: f64) -> PdfRenderer {
        let mut r = renderer();
        r.add_page().unwrap();
        let bytes = include_bytes!("../../assets/DejaVuSerif.ttf").to_vec();
        r.register_font("Serif", FontStyle::Regular, FontSource::Bytes(bytes))
            .unwrap();
        r.select_font("Serif", FontStyle::Regular, size_pt).unwrap();
        r
    }

    /// Every text span drawn so far, page by page
    fn spans(r: &PdfRenderer) -> Vec<SpanLayout> {
        r.document()
            .page_order
            .iter()
            .filter_map(|&id| r.document().page(id))
            .flat_map(|page| page.contents.iter())
            .filter_map(|contents| match contents {
                crate::page::PageContents::Text(spans) => Some(spans.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn text_width(r: &PdfRenderer, text: &str) -> Pt {
        let span_font = r.current_font.unwrap();
        let font = r.document().fonts.get(span_font.id).unwrap();
        width_of_text(text, font, span_font.size)
    }

    fn near(a: Pt, b: Pt) -> bool {
        (a.0 - b.0).abs() < 1e-2
    }

    #[test]
    fn pixel_documents_need_ppi() {
        assert!(matches!(
            PdfRenderer::new(A4, Unit::Pixel, None),
            Err(ConversionError::MissingOrInvalidPPI)
        ));
        let renderer = PdfRenderer::new(A4, Unit::Pixel, Some(72.0)).unwrap();
        let (w, _) = renderer.page_size();
        assert!((w - *A4.0 as f64).abs() < 1e-2);
    }

    #[test]
    fn page_size_in_native_unit() {
        let (w, h) = renderer().page_size();
        assert!((w - 210.0).abs() < 1e-2);
        assert!((h - 297.0).abs() < 1e-2);
    }

    #[test]
    fn cursor_follows_cells_and_breaks() {
        let mut r = renderer();
        r.add_page().unwrap();
        let (x, y) = r.cursor();
        assert!(close(x, 10.0) && close(y, 10.0));

        r.draw_cell(50.0, 8.0, "", Border::ALL, Align::Left, true)
            .unwrap();
        assert!(close(r.cursor().0, 60.0));

        // zero width reaches the right margin
        r.draw_cell(0.0, 8.0, "", Border::NONE, Align::Left, false)
            .unwrap();
        assert!(close(r.cursor().0, 200.0));

        r.advance(5.0).unwrap();
        let (x, y) = r.cursor();
        assert!(close(x, 10.0) && close(y, 15.0));
    }

    #[test]
    fn multiline_moves_below_the_block() {
        let mut r = renderer();
        r.add_page().unwrap();
        r.draw_cell(30.0, 5.0, "", Border::NONE, Align::Left, false)
            .unwrap();
        r.draw_multiline(0.0, 6.0, "", Border::ALL, Align::Left, false)
            .unwrap();
        let (x, y) = r.cursor();
        assert!(close(x, 10.0) && close(y, 16.0));
    }

    #[test]
    fn breaks_pages_at_the_bottom_margin() {
        let mut r = renderer();
        r.add_page().unwrap();
        for _ in 0..3 {
            r.draw_multiline(0.0, 100.0, "", Border::NONE, Align::Left, false)
                .unwrap();
        }
        assert_eq!(r.page_count(), 2);
        assert!(close(r.cursor().1, 110.0));

        r.set_auto_page_break(false);
        for _ in 0..3 {
            r.draw_multiline(0.0, 100.0, "", Border::NONE, Align::Left, false)
                .unwrap();
        }
        assert_eq!(r.page_count(), 2);
    }

    #[test]
    fn preconditions_are_reported() {
        let mut r = renderer();
        assert!(matches!(
            r.draw_cell(10.0, 5.0, "", Border::NONE, Align::Left, false),
            Err(PDFError::NoPage)
        ));
        assert!(matches!(r.advance(1.0), Err(PDFError::NoPage)));

        r.add_page().unwrap();
        assert!(matches!(
            r.draw_cell(10.0, 5.0, "text", Border::NONE, Align::Left, false),
            Err(PDFError::NoFontSelected)
        ));
        assert!(matches!(
            r.select_font("Missing", FontStyle::Regular, 12.0),
            Err(PDFError::UnknownFont { .. })
        ));
        assert!(matches!(
            r.register_font("Bad", FontStyle::Regular, FontSource::Bytes(vec![1, 2, 3])),
            Err(PDFError::FaceParsingError(_))
        ));
        assert!(matches!(
            r.register_font(
                "Gone",
                FontStyle::Bold,
                FontSource::Path("/definitely/not/a/font.ttf".into())
            ),
            Err(PDFError::Io(_))
        ));
    }

    #[test]
    fn aligns_text_inside_cells() {
        let mut r = with_font(12.0);
        let left = Pt::from(Mm(10.0));
        let width = Pt::from(Mm(100.0));
        let padding = Pt::from(CELL_PADDING);
        let total = text_width(&r, "Total");

        for align in [Align::Left, Align::Center, Align::Right] {
            r.draw_cell(100.0, 10.0, "Total", Border::NONE, align, false)
                .unwrap();
            r.advance(10.0).unwrap();
        }

        let spans = spans(&r);
        assert_eq!(spans.len(), 3);
        assert!(near(spans[0].coords.0, left + padding));
        assert!(near(spans[1].coords.0, left + (width - total) * 0.5));
        assert!(near(spans[2].coords.0, left + width - padding - total));
    }

    #[test]
    fn text_is_centred_vertically_in_its_row() {
        let mut r = with_font(12.0);
        r.draw_cell(50.0, 10.0, "Hg", Border::NONE, Align::Left, false)
            .unwrap();

        let span_font = r.current_font.unwrap();
        let font = r.document().fonts.get(span_font.id).unwrap();
        let baseline = spans(&r)[0].coords.1;
        let glyph_middle =
            baseline + (font.ascent(span_font.size) + font.descent(span_font.size)) * 0.5;
        let row_top = A4.1 - Pt::from(Mm(10.0));
        let row_middle = row_top - Pt::from(Mm(5.0));
        assert!(near(glyph_middle, row_middle));
    }

    #[test]
    fn justified_rows_fill_the_width() {
        let mut r = with_font(12.0);
        let text = vec!["justify"; 40].join(" ");
        r.draw_multiline(0.0, 6.0, &text, Border::NONE, Align::Justify, false)
            .unwrap();

        let spans = spans(&r);
        let first_row = spans[0].coords.1;
        let row: Vec<&SpanLayout> = spans.iter().filter(|s| s.coords.1 == first_row).collect();
        assert!(row.len() > 1);

        let padding = Pt::from(CELL_PADDING);
        let last = row[row.len() - 1];
        let right_edge = last.coords.0 + text_width(&r, &last.text);
        assert!(near(row[0].coords.0, Pt::from(Mm(10.0)) + padding));
        assert!(near(right_edge, A4.0 - Pt::from(Mm(10.0)) - padding));

        // the final row ends the paragraph, so it stays left aligned as one span
        let final_span = &spans[spans.len() - 1];
        let final_row = spans.iter().filter(|s| s.coords.1 == final_span.coords.1);
        assert_eq!(final_row.count(), 1);
        assert!(near(final_span.coords.0, Pt::from(Mm(10.0)) + padding));
    }

    #[test]
    fn wrapped_text_continues_on_new_pages() {
        let mut r = with_font(10.0);
        let text = (0..60)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        r.draw_multiline(0.0, 10.0, &text, Border::NONE, Align::Left, false)
            .unwrap();

        // 27 rows of 10mm fit between the 10mm margins of an A4 page
        assert_eq!(r.page_count(), 3);
        let spans = spans(&r);
        assert_eq!(spans.len(), 60);
        assert_eq!(spans[27].text, "line 27");
        assert_eq!(spans[27].coords.1, spans[0].coords.1);
        let (x, y) = r.cursor();
        assert!(close(x, 10.0) && close(y, 70.0));
    }

    #[test]
    fn boxes_become_raw_content() {
        let mut r = renderer();
        r.add_page().unwrap();
        r.set_fill_color(colours::RED);
        r.draw_cell(20.0, 10.0, "", "LB".parse().unwrap(), Align::Left, true)
            .unwrap();

        let page_id = r.document().page_order[0];
        let page = r.document().page(page_id).unwrap();
        assert_eq!(page.contents.len(), 1);
        match &page.contents[0] {
            crate::page::PageContents::RawContent(ops) => {
                let ops = String::from_utf8_lossy(ops);
                assert!(ops.contains("re"));
                assert!(ops.contains("1 0 0 rg"));
                assert!(ops.contains(" l"));
            }
            other => panic!("unexpected content: {other:?}"),
        }
    }

    #[test]
    fn serializes_pdf() {
        let mut r = renderer();
        r.set_info(Info::new());
        r.add_page().unwrap();
        let mut out: Vec<u8> = Vec::new();
        r.serialize(&mut out).unwrap();
        assert!(out.starts_with(b"%PDF-"));
    }
}
