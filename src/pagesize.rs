//! Pre-defined page sizes for common paper formats.
//!
//! All sizes are provided in portrait orientation (width, height) where width ≤ height.
//! Use the [`PageOrientation`](crate::pagesize::PageOrientation) trait to convert between portrait and landscape.
//!
//! # Example
//!
//! ```
//! use pdf_report::pagesize::{PageFormat, PageOrientation, A4};
//!
//! let format: PageFormat = "letter".parse().unwrap();
//! assert_eq!(PageFormat::A4.size(), A4);
//!
//! // convert to landscape
//! let landscape = format.size().landscape();
//! assert!(landscape.0 > landscape.1);
//! ```

use crate::units::*;
use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Page dimensions as (width, height) in points.
pub type PageSize = (Pt, Pt);

// north american sizes
pub const LETTER: PageSize = (Pt(8.5 * 72.0), Pt(11.0 * 72.0));
pub const LEGAL: PageSize = (Pt(8.5 * 72.0), Pt(14.0 * 72.0));

// iso a-series (converted from mm to points)
pub const A3: PageSize = (Pt(297.0 * 72.0 / 25.4), Pt(420.0 * 72.0 / 25.4));
pub const A4: PageSize = (Pt(210.0 * 72.0 / 25.4), Pt(297.0 * 72.0 / 25.4));
pub const A5: PageSize = (Pt(148.0 * 72.0 / 25.4), Pt(210.0 * 72.0 / 25.4));

/// The named paper formats a document can be configured with
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
}

impl PageFormat {
    /// The portrait size of the format
    pub fn size(&self) -> PageSize {
        match self {
            PageFormat::A3 => A3,
            PageFormat::A4 => A4,
            PageFormat::A5 => A5,
            PageFormat::Letter => LETTER,
            PageFormat::Legal => LEGAL,
        }
    }
}

impl FromStr for PageFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a3" => Ok(PageFormat::A3),
            "" | "a4" => Ok(PageFormat::A4),
            "a5" => Ok(PageFormat::A5),
            "letter" => Ok(PageFormat::Letter),
            "legal" => Ok(PageFormat::Legal),
            _ => Err(ParseError::UnknownPageFormat(s.to_string())),
        }
    }
}

/// Convert page sizes between portrait and landscape orientations.
pub trait PageOrientation {
    /// Returns the size in portrait orientation (width ≤ height).
    fn portrait(self) -> Self;
    /// Returns the size in landscape orientation (width ≥ height).
    fn landscape(self) -> Self;
}

impl PageOrientation for PageSize {
    fn portrait(self) -> Self {
        if self.0 <= self.1 {
            self
        } else {
            (self.1, self.0)
        }
    }

    fn landscape(self) -> PageSize {
        if self.0 >= self.1 {
            self
        } else {
            (self.1, self.0)
        }
    }
}
