use crate::font::FontStyle;
use crate::units::{convert, Unit};
use crate::{ConversionError, LayoutError};
use std::fmt;

/// The widest paragraph indent, in spaces, that a tab level may produce
pub const MAX_INDENT_CHARS: usize = 1024;

/// Identifies a registered font by family name and style
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontId {
    pub family: String,
    pub style: FontStyle,
}

impl FontId {
    pub fn new<S: ToString>(family: S, style: FontStyle) -> FontId {
        FontId {
            family: family.to_string(),
            style,
        }
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.family, self.style)
    }
}

/// Everything a [LayoutEngine](crate::LayoutEngine) remembers between calls.
///
/// The native unit, margin, tab width and line height are fixed when the state
/// is created. The pixels-per-inch value, the current font size and the main
/// fonts change through checked mutators; a mutator that fails leaves the state
/// exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentState {
    native_unit: Unit,
    margin: f64,
    tab_width_chars: u32,
    line_height_factor: f64,
    ppi: Option<f64>,
    current_font: Option<FontId>,
    current_font_size_pt: Option<f64>,
    main_regular_font: Option<FontId>,
    main_bold_font: Option<FontId>,
}

impl DocumentState {
    /// Create the state for a document measured in `unit`. `margin` is in that
    /// unit too. No PPI is known and no font is selected yet.
    pub fn new(unit: Unit, margin: f64, tab_width: u32, line_height: f64) -> DocumentState {
        DocumentState {
            native_unit: unit,
            margin,
            tab_width_chars: tab_width,
            line_height_factor: line_height,
            ppi: None,
            current_font: None,
            current_font_size_pt: None,
            main_regular_font: None,
            main_bold_font: None,
        }
    }

    pub fn native_unit(&self) -> Unit {
        self.native_unit
    }

    /// The page margin, in the native unit
    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn tab_width_chars(&self) -> u32 {
        self.tab_width_chars
    }

    pub fn line_height_factor(&self) -> f64 {
        self.line_height_factor
    }

    pub fn ppi(&self) -> Option<f64> {
        self.ppi
    }

    /// The last selected font
    pub fn current_font(&self) -> Option<&FontId> {
        self.current_font.as_ref()
    }

    /// The size of the last selected font, in points
    pub fn current_font_size_pt(&self) -> Option<f64> {
        self.current_font_size_pt
    }

    pub fn main_regular_font(&self) -> Option<&FontId> {
        self.main_regular_font.as_ref()
    }

    pub fn main_bold_font(&self) -> Option<&FontId> {
        self.main_bold_font.as_ref()
    }

    /// The main font for `style`, if one has been designated. Only regular and
    /// bold have a main font.
    pub fn main_font(&self, style: FontStyle) -> Option<&FontId> {
        match style {
            FontStyle::Regular => self.main_regular_font(),
            FontStyle::Bold => self.main_bold_font(),
            _ => None,
        }
    }

    /// Set the pixels-per-inch used by every conversion involving pixels
    pub fn set_ppi(&mut self, value: f64) -> Result<(), LayoutError> {
        if !(value.is_finite() && value > 0.0) {
            return Err(LayoutError::InvalidPPI(value));
        }
        self.ppi = Some(value);
        log::debug!("pixels per inch set to {value}");
        Ok(())
    }

    /// Convert `value` in `unit` into the document's native unit
    pub fn to_native(&self, value: f64, unit: Unit) -> Result<f64, ConversionError> {
        convert(value, unit, self.native_unit, self.ppi)
    }

    /// Convert `value` in `unit` into points
    pub fn to_points(&self, value: f64, unit: Unit) -> Result<f64, ConversionError> {
        convert(value, unit, Unit::Point, self.ppi)
    }

    /// Check that `style` may fill a main font role, without changing anything
    pub fn check_main_style(style: FontStyle) -> Result<(), LayoutError> {
        if style.can_be_main() {
            Ok(())
        } else {
            Err(LayoutError::UnsupportedMainStyle(style))
        }
    }

    /// Make `font` the main font for its style, replacing any previous one
    pub fn designate_main_font(&mut self, font: FontId) -> Result<(), LayoutError> {
        let slot = match font.style {
            FontStyle::Regular => &mut self.main_regular_font,
            FontStyle::Bold => &mut self.main_bold_font,
            other => return Err(LayoutError::UnsupportedMainStyle(other)),
        };
        log::debug!("main {} font is now {:?}", font.style, font.family);
        *slot = Some(font);
        Ok(())
    }

    /// Remember the font that was just selected and its size in points
    pub fn record_font(&mut self, font: FontId, size_pt: f64) {
        self.current_font = Some(font);
        self.current_font_size_pt = Some(size_pt);
    }

    /// The current font size in the native unit
    pub fn font_size_native(&self) -> Result<f64, LayoutError> {
        let size_pt = self
            .current_font_size_pt
            .ok_or(LayoutError::NoFontSelected)?;
        Ok(self.to_native(size_pt, Unit::Point)?)
    }

    /// The height of one line of text at the current font size, in the native unit
    pub fn line_height_native(&self) -> Result<f64, LayoutError> {
        Ok(self.font_size_native()? * self.line_height_factor)
    }

    /// The indentation for a paragraph at `level`: `level * tab_width_chars` spaces,
    /// at most [MAX_INDENT_CHARS] of them
    pub fn tab_prefix(&self, level: u32) -> Result<String, LayoutError> {
        let width = level
            .checked_mul(self.tab_width_chars)
            .map(|width| width as usize)
            .filter(|&width| width <= MAX_INDENT_CHARS)
            .ok_or(LayoutError::IndentTooWide {
                level,
                tab_width: self.tab_width_chars,
                max: MAX_INDENT_CHARS,
            })?;
        Ok(" ".repeat(width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> DocumentState {
        DocumentState::new(Unit::Millimeter, 10.0, 4, 1.5)
    }

    #[test]
    fn starts_without_ppi_or_font() {
        let state = state();
        assert_eq!(state.native_unit(), Unit::Millimeter);
        assert_eq!(state.ppi(), None);
        assert_eq!(state.current_font_size_pt(), None);
        assert!(state.main_regular_font().is_none());
        assert!(matches!(
            state.line_height_native(),
            Err(LayoutError::NoFontSelected)
        ));
    }

    #[test]
    fn rejects_bad_ppi_without_changing() {
        let mut state = state();
        state.set_ppi(96.0).unwrap();
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(state.set_ppi(bad), Err(LayoutError::InvalidPPI(_))));
        }
        assert_eq!(state.ppi(), Some(96.0));
    }

    #[test]
    fn pixel_conversion_needs_ppi() {
        let mut state = state();
        assert_eq!(
            state.to_native(10.0, Unit::Pixel),
            Err(ConversionError::MissingOrInvalidPPI)
        );
        state.set_ppi(96.0).unwrap();
        let mm = state.to_native(96.0, Unit::Pixel).unwrap();
        assert!((mm - 25.4).abs() < 1e-9);
    }

    #[test]
    fn main_fonts_are_regular_or_bold() {
        let mut state = state();
        state
            .designate_main_font(FontId::new("Body", FontStyle::Regular))
            .unwrap();
        state
            .designate_main_font(FontId::new("Body", FontStyle::Bold))
            .unwrap();
        state
            .designate_main_font(FontId::new("Other", FontStyle::Bold))
            .unwrap();
        assert_eq!(state.main_regular_font().unwrap().family, "Body");
        assert_eq!(state.main_bold_font().unwrap().family, "Other");

        let before = state.clone();
        assert!(matches!(
            state.designate_main_font(FontId::new("Slanted", FontStyle::Italic)),
            Err(LayoutError::UnsupportedMainStyle(FontStyle::Italic))
        ));
        assert_eq!(state, before);
        assert!(DocumentState::check_main_style(FontStyle::BoldItalic).is_err());
    }

    #[test]
    fn line_height_follows_font_size() {
        let mut state = state();
        state.record_font(FontId::new("Body", FontStyle::Regular), 72.0);
        let line = state.line_height_native().unwrap();
        assert!((line - 25.4 * 1.5).abs() < 1e-9);
        assert_eq!(state.current_font().unwrap().family, "Body");
    }

    #[test]
    fn tab_prefix_is_level_times_width() {
        let state = state();
        assert_eq!(state.tab_prefix(0).unwrap(), "");
        assert_eq!(state.tab_prefix(2).unwrap(), " ".repeat(8));
    }

    #[test]
    fn huge_tab_levels_are_rejected() {
        let state = state();
        assert_eq!(state.tab_prefix(256).unwrap().len(), MAX_INDENT_CHARS);
        assert!(matches!(
            state.tab_prefix(257),
            Err(LayoutError::IndentTooWide {
                level: 257,
                tab_width: 4,
                ..
            })
        ));
        assert!(matches!(
            state.tab_prefix(u32::MAX),
            Err(LayoutError::IndentTooWide { .. })
        ));

        let wide = DocumentState::new(Unit::Millimeter, 10.0, u32::MAX, 1.5);
        assert!(wide.tab_prefix(2).is_err());
        assert_eq!(wide.tab_prefix(0).unwrap(), "");
    }
}
