use crate::engine::HeadingLevel;
use crate::pagesize::PageFormat;
use crate::units::Unit;
use crate::LayoutError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Font sizes, in points, for each heading level
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingSizes {
    pub h1: f64,
    pub h2: f64,
    pub h3: f64,
}

impl Default for HeadingSizes {
    fn default() -> Self {
        HeadingSizes {
            h1: 24.0,
            h2: 18.0,
            h3: 14.0,
        }
    }
}

impl HeadingSizes {
    /// The size of `level`, in points
    pub fn size(&self, level: HeadingLevel) -> f64 {
        match level {
            HeadingLevel::H1 => self.h1,
            HeadingLevel::H2 => self.h2,
            HeadingLevel::H3 => self.h3,
        }
    }
}

/// How a document is laid out. Every field has a default, so a configuration
/// file only needs to name what it changes:
///
/// ```
/// use pdf_report::{LayoutConfig, Unit};
///
/// let config = LayoutConfig::from_json_str(r#"{ "unit": "in", "margin": 0.5 }"#).unwrap();
/// assert_eq!(config.unit, Unit::Inch);
/// assert_eq!(config.tab_width_chars, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// The document's native unit
    pub unit: Unit,
    pub page_format: PageFormat,
    /// Page margin, in `unit`
    pub margin: f64,
    /// Spaces per indentation level of a paragraph
    pub tab_width_chars: u32,
    /// Line height as a multiple of the font size
    pub line_height_factor: f64,
    /// Body text size, in points
    pub text_size_pt: f64,
    pub heading_sizes: HeadingSizes,
    /// Pixels per inch, needed as soon as anything is measured in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ppi: Option<f64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            unit: Unit::Millimeter,
            page_format: PageFormat::default(),
            margin: 10.0,
            tab_width_chars: 4,
            line_height_factor: 1.5,
            text_size_pt: 12.0,
            heading_sizes: HeadingSizes::default(),
            ppi: None,
        }
    }
}

impl LayoutConfig {
    pub fn from_json_str(json: &str) -> Result<LayoutConfig, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<LayoutConfig, LayoutError> {
        let json = std::fs::read_to_string(path)?;
        LayoutConfig::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
