use crate::units::*;

/// A rectangle in PDF user space, specified by two opposite corners.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rect {
    /// The x-coordinate of the lower-left corner.
    pub x1: Pt,
    /// The y-coordinate of the lower-left corner.
    pub y1: Pt,
    /// The x-coordinate of the upper-right corner.
    pub x2: Pt,
    /// The y-coordinate of the upper-right corner.
    pub y2: Pt,
}

impl Rect {
    /// Build a rectangle from its top-left corner, measured from the top of a page
    /// of height `page_height`, and its size. PDF's origin is the bottom-left corner,
    /// layout code thinks top-down.
    pub fn from_top_left(x: Pt, top: Pt, width: Pt, height: Pt, page_height: Pt) -> Rect {
        Rect {
            x1: x,
            y1: page_height - top - height,
            x2: x + width,
            y2: page_height - top,
        }
    }

    pub fn width(&self) -> Pt {
        self.x2 - self.x1
    }

    pub fn height(&self) -> Pt {
        self.y2 - self.y1
    }
}

impl From<Rect> for pdf_writer::Rect {
    fn from(r: Rect) -> Self {
        pdf_writer::Rect {
            x1: r.x1.into(),
            y1: r.y1.into(),
            x2: r.x2.into(),
            y2: r.y2.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_left_flips_the_y_axis() {
        let r = Rect::from_top_left(Pt(10.0), Pt(20.0), Pt(100.0), Pt(30.0), Pt(800.0));
        assert_eq!(r.x1, Pt(10.0));
        assert_eq!(r.x2, Pt(110.0));
        assert_eq!(r.y2, Pt(780.0));
        assert_eq!(r.y1, Pt(750.0));
        assert_eq!(r.width(), Pt(100.0));
        assert_eq!(r.height(), Pt(30.0));
    }
}
