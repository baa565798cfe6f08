use crate::units::Pt;

/// The blank border around a page's content. Margins are guidelines: the
/// [`PdfRenderer`](crate::renderer::PdfRenderer) starts each page at the top-left
/// margin, extends zero-width cells to the right margin and breaks pages at the
/// bottom margin, but nothing stops content from being drawn over them. They also
/// determine the `ArtBox` of each [`Page`](crate::Page) in the generated PDF.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Margins {
    pub top: Pt,
    pub right: Pt,
    pub bottom: Pt,
    pub left: Pt,
}

impl Margins {
    /// Create margins by specifying individual components in a clockwise fashion
    /// starting at the top (in the same order as CSS margins)
    pub fn trbl(top: Pt, right: Pt, bottom: Pt, left: Pt) -> Margins {
        Margins {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Create margins where all values are equal
    pub fn all<D: Into<Pt>>(value: D) -> Margins {
        let value: Pt = value.into();
        Margins::trbl(value, value, value, value)
    }

    /// Create margins where all values are 0.0
    pub fn empty() -> Margins {
        Margins::all(Pt(0.0))
    }
}
