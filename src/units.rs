//! Measurement units and conversions between them.
//!
//! Two layers live here. The [`Pt`], [`Mm`] and [`In`] newtypes are the typed
//! geometry the PDF object model is built on. The [`Unit`] enum together with
//! [`convert`] is the dynamic side: a caller hands the layout engine a value and
//! the unit it is expressed in, and the engine translates it into the
//! document's native unit.
//!
//! Every conversion is derived from three physical relationships:
//!
//! * 1 inch = 72 points
//! * 1 inch = 25.4 millimetres
//! * 1 inch = `ppi` pixels, where the pixels-per-inch value depends on the display
//!
//! # Example
//!
//! ```
//! use pdf_report::{convert, Unit};
//!
//! let inches = convert(72.0, Unit::Point, Unit::Inch, None).unwrap();
//! assert_eq!(inches, 1.0);
//!
//! // pixels need a pixels-per-inch value
//! assert!(convert(96.0, Unit::Pixel, Unit::Inch, None).is_err());
//! assert_eq!(convert(96.0, Unit::Pixel, Unit::Inch, Some(96.0)).unwrap(), 1.0);
//! ```

use crate::error::{ConversionError, LayoutError};
use derive_more::{Add, AddAssign, Deref, DerefMut, Display, From, Into, Sub, SubAssign, Sum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Div, Mul};
use std::str::FromStr;

/// Points per inch
pub const POINTS_PER_INCH: f64 = 72.0;
/// Millimetres per inch
pub const MILLIMETERS_PER_INCH: f64 = 25.4;

/// A length in PostScript points (1/72 of an inch). This is the unit PDF
/// user space is expressed in.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Add,
    Sub,
    AddAssign,
    SubAssign,
    Deref,
    DerefMut,
    Display,
    From,
    Into,
    Sum,
)]
pub struct Pt(pub f32);

/// A length in millimetres
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Add,
    Sub,
    AddAssign,
    SubAssign,
    Deref,
    DerefMut,
    Display,
    From,
    Into,
    Sum,
)]
pub struct Mm(pub f32);

/// A length in inches
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Add,
    Sub,
    AddAssign,
    SubAssign,
    Deref,
    DerefMut,
    Display,
    From,
    Into,
    Sum,
)]
pub struct In(pub f32);

macro_rules! impl_scalar_ops {
    ($t:ident) => {
        impl Mul<f32> for $t {
            type Output = $t;

            fn mul(self, rhs: f32) -> $t {
                $t(self.0 * rhs)
            }
        }

        impl Mul<$t> for $t {
            type Output = $t;

            fn mul(self, rhs: $t) -> $t {
                $t(self.0 * rhs.0)
            }
        }

        impl Div<f32> for $t {
            type Output = $t;

            fn div(self, rhs: f32) -> $t {
                $t(self.0 / rhs)
            }
        }

        impl Div<$t> for $t {
            type Output = $t;

            fn div(self, rhs: $t) -> $t {
                $t(self.0 / rhs.0)
            }
        }
    };
}

impl_scalar_ops!(Pt);
impl_scalar_ops!(Mm);
impl_scalar_ops!(In);

impl From<In> for Pt {
    fn from(value: In) -> Self {
        Pt(value.0 * POINTS_PER_INCH as f32)
    }
}

impl From<Mm> for Pt {
    fn from(value: Mm) -> Self {
        Pt(value.0 * POINTS_PER_INCH as f32 / MILLIMETERS_PER_INCH as f32)
    }
}

impl From<Pt> for In {
    fn from(value: Pt) -> Self {
        In(value.0 / POINTS_PER_INCH as f32)
    }
}

impl From<Pt> for Mm {
    fn from(value: Pt) -> Self {
        Mm(value.0 * MILLIMETERS_PER_INCH as f32 / POINTS_PER_INCH as f32)
    }
}

impl From<Mm> for In {
    fn from(value: Mm) -> Self {
        In(value.0 / MILLIMETERS_PER_INCH as f32)
    }
}

impl From<In> for Mm {
    fn from(value: In) -> Self {
        Mm(value.0 * MILLIMETERS_PER_INCH as f32)
    }
}

/// The closed set of measurement systems a caller may express a length in
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "pt")]
    Point,
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "in")]
    Inch,
    #[serde(rename = "px")]
    Pixel,
}

impl Unit {
    /// All units, in a fixed order
    pub const ALL: [Unit; 4] = [Unit::Point, Unit::Millimeter, Unit::Inch, Unit::Pixel];

    /// The short name of the unit, as accepted by [Unit::from_str]
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Unit::Point => "pt",
            Unit::Millimeter => "mm",
            Unit::Inch => "in",
            Unit::Pixel => "px",
        }
    }

    /// Whether converting to or from this unit needs a pixels-per-inch value
    pub fn needs_ppi(&self) -> bool {
        matches!(self, Unit::Pixel)
    }

    /// How many of this unit fit in one inch
    fn per_inch(&self, ppi: Option<f64>) -> Result<f64, ConversionError> {
        match self {
            Unit::Point => Ok(POINTS_PER_INCH),
            Unit::Millimeter => Ok(MILLIMETERS_PER_INCH),
            Unit::Inch => Ok(1.0),
            Unit::Pixel => match ppi {
                Some(ppi) if ppi.is_finite() && ppi > 0.0 => Ok(ppi),
                _ => Err(ConversionError::MissingOrInvalidPPI),
            },
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for Unit {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pt" | "point" | "points" => Ok(Unit::Point),
            "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => {
                Ok(Unit::Millimeter)
            }
            "in" | "inch" | "inches" => Ok(Unit::Inch),
            "px" | "pixel" | "pixels" => Ok(Unit::Pixel),
            _ => Err(ConversionError::UnsupportedUnit(s.to_string())),
        }
    }
}

/// Convert `value` expressed in `from` into the unit `to`.
///
/// Converting a unit to itself always succeeds and returns `value` untouched,
/// even for pixels without a `ppi`. Any other conversion involving
/// [Unit::Pixel] requires `ppi` to be present, finite and positive.
pub fn convert(value: f64, from: Unit, to: Unit, ppi: Option<f64>) -> Result<f64, ConversionError> {
    if from == to {
        return Ok(value);
    }

    let from_per_inch = from.per_inch(ppi)?;
    let to_per_inch = to.per_inch(ppi)?;

    // multiply first so exact ratios (72pt -> 1in) stay exact
    Ok(value * to_per_inch / from_per_inch)
}

/// Calculate the pixels-per-inch of a display from its resolution and the
/// length of its diagonal in inches
pub fn calculate_ppi(width_px: u32, height_px: u32, diagonal_in: f64) -> Result<f64, LayoutError> {
    let w = width_px as f64;
    let h = height_px as f64;
    let ppi = (w * w + h * h).sqrt() / diagonal_in;
    if ppi.is_finite() && ppi > 0.0 {
        Ok(ppi)
    } else {
        Err(LayoutError::InvalidPPI(ppi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn identity_never_needs_ppi() {
        for unit in Unit::ALL {
            assert_eq!(convert(12.5, unit, unit, None).unwrap(), 12.5);
        }
    }

    #[test]
    fn fixed_ratios_are_exact() {
        assert_eq!(convert(72.0, Unit::Point, Unit::Inch, None).unwrap(), 1.0);
        assert_eq!(convert(25.4, Unit::Millimeter, Unit::Inch, None).unwrap(), 1.0);
        assert_eq!(convert(1.0, Unit::Inch, Unit::Point, None).unwrap(), 72.0);
        assert_eq!(convert(1.0, Unit::Inch, Unit::Millimeter, None).unwrap(), 25.4);
    }

    #[test]
    fn point_to_millimeter() {
        let mm = convert(12.0, Unit::Point, Unit::Millimeter, None).unwrap();
        assert!(close(mm, 4.233_333_333_333_333));
    }

    #[test]
    fn pixels_need_ppi() {
        for unit in [Unit::Point, Unit::Millimeter, Unit::Inch] {
            assert!(matches!(
                convert(1.0, Unit::Pixel, unit, None),
                Err(ConversionError::MissingOrInvalidPPI)
            ));
            assert!(matches!(
                convert(1.0, unit, Unit::Pixel, Some(0.0)),
                Err(ConversionError::MissingOrInvalidPPI)
            ));
            assert!(matches!(
                convert(1.0, unit, Unit::Pixel, Some(-96.0)),
                Err(ConversionError::MissingOrInvalidPPI)
            ));
            assert!(convert(1.0, unit, Unit::Pixel, Some(96.0)).is_ok());
        }
        assert!(close(
            convert(96.0, Unit::Pixel, Unit::Point, Some(96.0)).unwrap(),
            72.0
        ));
    }

    #[test]
    fn parses_unit_names() {
        assert_eq!("pt".parse::<Unit>().unwrap(), Unit::Point);
        assert_eq!("MM".parse::<Unit>().unwrap(), Unit::Millimeter);
        assert_eq!("inches".parse::<Unit>().unwrap(), Unit::Inch);
        assert_eq!(" px ".parse::<Unit>().unwrap(), Unit::Pixel);
        assert!(matches!(
            "cm".parse::<Unit>(),
            Err(ConversionError::UnsupportedUnit(u)) if u == "cm"
        ));
    }

    #[test]
    fn newtype_conversions() {
        let pt: Pt = In(0.5).into();
        assert_eq!(pt, Pt(36.0));
        let mm: Mm = In(1.0).into();
        assert_eq!(mm, Mm(25.4));
        let back: In = Pt(144.0).into();
        assert_eq!(back, In(2.0));
        assert_eq!(Pt(2.0) * 3.0, Pt(6.0));
        assert_eq!(Pt(6.0) / Pt(2.0), Pt(3.0));
    }

    #[test]
    fn display_ppi() {
        let ppi = calculate_ppi(1920, 1080, 15.6).unwrap();
        assert!((ppi - 141.21).abs() < 0.01);
        assert!(calculate_ppi(1920, 1080, 0.0).is_err());
        assert!(calculate_ppi(0, 0, 15.6).is_err());
    }
}
