use crate::{
    font::Font,
    info::Info,
    page::Page,
    refs::{ObjectReferences, RefType},
    PDFError,
};
use id_arena::{Arena, Id};
use pdf_writer::{Finish, Pdf, Ref};
use std::io::Write;

#[derive(Default)]
/// A document is the PDF object model: it stores every page and font, then
/// renders it all out with a call to [Document::write]
pub struct Document {
    pub info: Option<Info>,
    pub pages: Arena<Page>,
    pub page_order: Vec<Id<Page>>,
    pub fonts: Arena<Font>,
}

impl Document {
    /// Sets information about the document. If not provided, or if every field is empty,
    /// no information block will be written to the PDF
    pub fn set_info(&mut self, info: Info) {
        self.info = Some(info);
    }

    /// Add a page to the end of the document, returning its id
    pub fn add_page(&mut self, page: Page) -> Id<Page> {
        let id = self.pages.alloc(page);
        self.page_order.push(id);
        id
    }

    /// The number of pages in the document
    pub fn page_count(&self) -> usize {
        self.page_order.len()
    }

    pub fn page(&self, id: Id<Page>) -> Option<&Page> {
        self.pages.get(id)
    }

    pub fn page_mut(&mut self, id: Id<Page>) -> Option<&mut Page> {
        self.pages.get_mut(id)
    }

    /// Add a font to the document. Fonts are stored "globally" within the document,
    /// so any page can refer to it through the returned id.
    pub fn add_font(&mut self, font: Font) -> Id<Font> {
        self.fonts.alloc(font)
    }

    /// Write the entire document to the writer. Note: although this can write to arbitrary
    /// streams, the entire document is "rendered" in memory first. This limitation is due
    /// to the underlying pdf-writer implementation.
    ///
    /// Until `write` is called, no PDF object references exist; calling it generates every
    /// object and the references between them.
    pub fn write<W: Write>(self, mut w: W) -> Result<(), PDFError> {
        let Document {
            info,
            pages,
            page_order,
            fonts,
        } = self;

        let mut refs = ObjectReferences::new();

        let catalog_id = refs.gen(RefType::Catalog);
        let page_tree_id = refs.gen(RefType::PageTree);

        let mut writer = Pdf::new();
        if let Some(info) = info.filter(|info| !info.is_empty()) {
            info.write(&mut refs, &mut writer);
        }

        // page refs are keyed by position in the document, not by arena index
        let page_refs: Vec<Ref> = (0..page_order.len())
            .map(|i| refs.gen(RefType::Page(i)))
            .collect();

        writer
            .pages(page_tree_id)
            .count(page_refs.len() as i32)
            .kids(page_refs);

        for (id, font) in fonts.iter() {
            font.write(&mut refs, id, &mut writer);
        }

        for (page_index, id) in page_order.iter().enumerate() {
            let page = pages.get(*id).ok_or(PDFError::PageMissing)?;
            page.write(&mut refs, page_index, &fonts, &mut writer)?;
        }

        let mut catalog = writer.catalog(catalog_id);
        catalog.pages(page_tree_id);
        catalog.finish();

        w.write_all(writer.finish().as_slice()).map_err(Into::into)
    }
}
