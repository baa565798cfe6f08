use pdf_writer::Content;

/// A colour, expressed in the RGB or grey colour spaces
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Colour {
    /// DeviceRGB colour; r, g, b, range from 0.0 to 1.0
    RGB { r: f32, g: f32, b: f32 },
    /// DeviceGray colour; g ranges from 0.0 to 1.0
    Grey { g: f32 },
}

impl Default for Colour {
    fn default() -> Self {
        colours::BLACK
    }
}

impl Colour {
    /// Create a new colour in the RGB space. r, g, and b range from 0.0 to 1.0
    pub fn new_rgb(r: f32, g: f32, b: f32) -> Colour {
        Colour::RGB { r, g, b }
    }

    /// Create a new colour in the RGB space. r, g, and b range from 0 to 255
    pub fn new_rgb_bytes(r: u8, g: u8, b: u8) -> Colour {
        Colour::RGB {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Create a new colour in the Gray space, g ranges from 0.0 to 1.0
    pub fn new_grey(g: f32) -> Colour {
        Colour::Grey { g }
    }

    /// The colour as 0–255 RGB components
    pub fn to_rgb_bytes(&self) -> (u8, u8, u8) {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        match *self {
            Colour::RGB { r, g, b } => (byte(r), byte(g), byte(b)),
            Colour::Grey { g } => (byte(g), byte(g), byte(g)),
        }
    }

    /// Set this colour as the fill (non-stroking) colour of a content stream
    pub fn apply_fill(&self, content: &mut Content) {
        match *self {
            Colour::RGB { r, g, b } => content.set_fill_rgb(r, g, b),
            Colour::Grey { g } => content.set_fill_gray(g),
        };
    }

    /// Set this colour as the stroke colour of a content stream
    pub fn apply_stroke(&self, content: &mut Content) {
        match *self {
            Colour::RGB { r, g, b } => content.set_stroke_rgb(r, g, b),
            Colour::Grey { g } => content.set_stroke_gray(g),
        };
    }
}

impl From<(u8, u8, u8)> for Colour {
    fn from(c: (u8, u8, u8)) -> Self {
        Colour::new_rgb_bytes(c.0, c.1, c.2)
    }
}

/// A list of pre-defined colour constants
pub mod colours {
    use super::*;

    pub const BLACK: Colour = Colour::Grey { g: 0.0 };
    pub const WHITE: Colour = Colour::Grey { g: 1.0 };
    pub const RED: Colour = Colour::RGB {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };
    pub const GREEN: Colour = Colour::RGB {
        r: 0.0,
        g: 1.0,
        b: 0.0,
    };
    pub const BLUE: Colour = Colour::RGB {
        r: 0.0,
        g: 0.0,
        b: 1.0,
    };
}
