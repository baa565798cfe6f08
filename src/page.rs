use crate::content::render_contents;
use crate::font::Font;
use crate::layout::Margins;
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::refs::{ObjectReferences, RefType};
use crate::units::Pt;
use crate::{Colour, PDFError};
use id_arena::{Arena, Id};
use pdf_writer::{Finish, Name, Pdf};

/// Which font, at which size, a span of text is drawn with
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SpanFont {
    pub id: Id<Font>,
    pub size: Pt,
}

/// A single run of text in one font and colour, starting at a baseline position
/// in page coordinates (origin bottom-left)
#[derive(Clone, PartialEq, Debug)]
pub struct SpanLayout {
    pub text: String,
    pub font: SpanFont,
    pub colour: Colour,
    pub coords: (Pt, Pt),
}

#[derive(Clone, PartialEq, Debug)]
pub enum PageContents {
    Text(Vec<SpanLayout>),
    /// Raw content stream operators, wrapped in a save / restore of the graphics state
    RawContent(Vec<u8>),
}

pub struct Page {
    /// The size of the page
    pub media_box: Rect,
    /// Where content can live, i.e. within the margins
    pub content_box: Rect,
    /// Everything drawn on the page, in painting order
    pub contents: Vec<PageContents>,
}

impl Page {
    /// Create a new, empty page. Without margins the content box spans the
    /// whole page.
    pub fn new(size: PageSize, margins: Option<Margins>) -> Page {
        let (width, height) = size;
        let margins = margins.unwrap_or_else(Margins::empty);
        Page {
            media_box: Rect {
                x1: Pt(0.0),
                y1: Pt(0.0),
                x2: width,
                y2: height,
            },
            content_box: Rect {
                x1: margins.left,
                y1: margins.bottom,
                x2: width - margins.right,
                y2: height - margins.top,
            },
            contents: Vec::default(),
        }
    }

    /// The height of the page, used to flip top-down layout coordinates
    pub fn height(&self) -> Pt {
        self.media_box.height()
    }

    pub fn add_span(&mut self, span: SpanLayout) {
        // consecutive spans share one text block
        if let Some(PageContents::Text(spans)) = self.contents.last_mut() {
            spans.push(span);
        } else {
            self.contents.push(PageContents::Text(vec![span]));
        }
    }

    pub fn add_raw_content(&mut self, content: Vec<u8>) {
        self.contents.push(PageContents::RawContent(content));
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        page_index: usize,
        fonts: &Arena<Font>,
        writer: &mut Pdf,
    ) -> Result<(), PDFError> {
        let id = refs.get_or_gen(RefType::Page(page_index));
        let page_tree_id = refs.get_or_gen(RefType::PageTree);
        let content_id = refs.gen(RefType::ContentForPage(page_index));

        let mut page = writer.page(id);
        page.media_box(self.media_box.into());
        page.art_box(self.content_box.into());
        page.parent(page_tree_id);

        let mut resources = page.resources();
        let mut resource_fonts = resources.fonts();
        for (font_id, _) in fonts.iter() {
            let font_ref = refs.get_or_gen(RefType::Font(font_id.index()));
            resource_fonts.pair(Name(format!("F{}", font_id.index()).as_bytes()), font_ref);
        }
        resource_fonts.finish();
        resources.finish();

        page.contents(content_id);
        page.finish();

        let rendered = render_contents(&self.contents, fonts)?;
        writer.stream(content_id, rendered.as_slice());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagesize::A4;

    #[test]
    fn content_box_respects_margins() {
        let page = Page::new(A4, Some(Margins::all(Pt(36.0))));
        assert_eq!(page.content_box.x1, Pt(36.0));
        assert_eq!(page.content_box.y2, A4.1 - Pt(36.0));
        assert_eq!(page.height(), A4.1);
        assert!(page.contents.is_empty());
    }

    #[test]
    fn raw_content_is_kept_in_order() {
        let mut page = Page::new(A4, None);
        page.add_raw_content(b"0 0 10 10 re f".to_vec());
        page.add_raw_content(b"1 1 5 5 re S".to_vec());
        assert_eq!(page.contents.len(), 2);
        assert_eq!(
            page.contents[1],
            PageContents::RawContent(b"1 1 5 5 re S".to_vec())
        );
    }
}
