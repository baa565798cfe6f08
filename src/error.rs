use crate::font::FontStyle;
use thiserror::Error;

/// Errors raised when translating a length between units
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("converting to or from pixels needs a positive pixels-per-inch value")]
    /// A pixel conversion was attempted without a usable PPI
    MissingOrInvalidPPI,

    #[error("unsupported unit: {0:?}")]
    /// The named unit is not one of pt, mm, in or px
    UnsupportedUnit(String),
}

/// Errors raised when parsing the short codes used for styles, borders,
/// alignment and paper formats
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unknown font style: {0:?}")]
    UnknownFontStyle(String),

    #[error("unknown border side {side:?} in {code:?}")]
    UnknownBorderSide { side: char, code: String },

    #[error("unknown alignment: {0:?}")]
    UnknownAlignment(String),

    #[error("unknown page format: {0:?}")]
    UnknownPageFormat(String),
}

/// All errors the layout engine can surface to its caller. None of them are fatal:
/// the engine's state is left exactly as it was before the failing call.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error(transparent)]
    /// A length could not be converted into the document's unit
    Conversion(#[from] ConversionError),

    #[error("pixels per inch must be a positive number, got {0}")]
    /// An explicit pixels-per-inch value was zero, negative or not a number
    InvalidPPI(f64),

    #[error("no font size has been selected yet")]
    /// Text was placed before any font size was chosen
    NoFontSelected,

    #[error("only regular and bold fonts can be main fonts, not {0}")]
    /// Only [FontStyle::Regular] and [FontStyle::Bold] can fill a main font role
    UnsupportedMainStyle(FontStyle),

    #[error("heading level must be 1, 2 or 3, got {0}")]
    /// A heading level outside of 1..=3
    InvalidHeadingLevel(u8),

    #[error("indent of {level} tabs of {tab_width} spaces is wider than {max} characters")]
    /// A tab level would indent a paragraph by an unreasonable number of spaces
    IndentTooWide { level: u32, tab_width: u32, max: usize },

    #[error(transparent)]
    /// The layout configuration could not be parsed
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    /// An I/O error occurred outside of the renderer
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// The page renderer rejected a call
    Render(#[from] PDFError),
}

/// All errors the page renderers can generate
#[derive(Error, Debug)]
pub enum PDFError {
    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsingError(#[from] owned_ttf_parser::FaceParsingError),

    #[error("no page has been added to the document")]
    /// Content was drawn before the first page was added
    NoPage,

    #[error("font {family:?} ({style}) has not been registered")]
    /// A font was selected that was never registered with the renderer
    UnknownFont { family: String, style: FontStyle },

    #[error("text cannot be drawn before a font is selected")]
    /// Text was drawn before any font was selected on the renderer
    NoFontSelected,

    #[error("a page referenced by the document is missing")]
    /// The page order refers to a page that no longer exists
    PageMissing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = LayoutError::InvalidPPI(-1.0);
        assert_eq!(
            err.to_string(),
            "pixels per inch must be a positive number, got -1"
        );

        let err = LayoutError::UnsupportedMainStyle(FontStyle::Italic);
        assert_eq!(
            err.to_string(),
            "only regular and bold fonts can be main fonts, not italic"
        );

        let err: LayoutError = ConversionError::UnsupportedUnit("cm".into()).into();
        assert_eq!(err.to_string(), "unsupported unit: \"cm\"");
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::UnknownBorderSide {
            side: 'Q',
            code: "LQ".into(),
        };
        assert_eq!(err.to_string(), "unknown border side 'Q' in \"LQ\"");
        assert_eq!(
            ParseError::UnknownPageFormat("b5".into()).to_string(),
            "unknown page format: \"b5\""
        );
    }

    #[test]
    fn renderer_errors_convert() {
        let err: LayoutError = PDFError::NoPage.into();
        assert!(matches!(err, LayoutError::Render(PDFError::NoPage)));

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PDFError = io_err.into();
        assert!(matches!(err, PDFError::Io(_)));
    }
}
