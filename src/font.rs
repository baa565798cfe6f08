use crate::{
    refs::{ObjectReferences, RefType},
    ParseError, PDFError, Pt,
};
use id_arena::Id;
use owned_ttf_parser::{AsFaceRef, OwnedFace};
use pdf_writer::{
    types::{FontFlags, SystemInfo},
    Finish, Name, Pdf, Ref, Str,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The style variant of a font family. A family is registered once per style.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    /// Whether this style may hold one of the two "main font" roles used by
    /// headings and body text
    pub fn can_be_main(&self) -> bool {
        matches!(self, FontStyle::Regular | FontStyle::Bold)
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FontStyle::Regular => "regular",
            FontStyle::Bold => "bold",
            FontStyle::Italic => "italic",
            FontStyle::BoldItalic => "bold italic",
        })
    }
}

/// Parses both the long names (`"bold"`) and the single-letter style codes
/// (`""`, `"B"`, `"I"`, `"BI"`) common to PDF libraries
impl FromStr for FontStyle {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "R" => return Ok(FontStyle::Regular),
            "B" => return Ok(FontStyle::Bold),
            "I" => return Ok(FontStyle::Italic),
            "BI" | "IB" => return Ok(FontStyle::BoldItalic),
            _ => {}
        }
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" | "normal" => Ok(FontStyle::Regular),
            "bold" => Ok(FontStyle::Bold),
            "italic" => Ok(FontStyle::Italic),
            "bold italic" | "bolditalic" | "bold-italic" => Ok(FontStyle::BoldItalic),
            _ => Err(ParseError::UnknownFontStyle(s.to_string())),
        }
    }
}

/// Where a font's TTF / OTF data comes from
#[derive(Debug, Clone)]
pub enum FontSource {
    /// Font data already held in memory
    Bytes(Vec<u8>),
    /// A font file on disk, read when the font is registered
    Path(PathBuf),
}

impl FontSource {
    /// Obtain the raw font data, reading it from disk if needed
    pub fn into_bytes(self) -> Result<Vec<u8>, PDFError> {
        match self {
            FontSource::Bytes(bytes) => Ok(bytes),
            FontSource::Path(path) => Ok(std::fs::read(path)?),
        }
    }
}

impl From<Vec<u8>> for FontSource {
    fn from(bytes: Vec<u8>) -> Self {
        FontSource::Bytes(bytes)
    }
}

impl From<PathBuf> for FontSource {
    fn from(path: PathBuf) -> Self {
        FontSource::Path(path)
    }
}

impl From<&std::path::Path> for FontSource {
    fn from(path: &std::path::Path) -> Self {
        FontSource::Path(path.to_path_buf())
    }
}

/// A parsed font object. Fonts can be TTF or OTF fonts, and are embedded in their
/// entirety in the generated PDF, so large fonts will noticeably increase the size
/// of the output.
///
/// Within a [Document](crate::Document), fonts are referred to by their arena
/// [Id]. The [PdfRenderer](crate::renderer::PdfRenderer) maps family / style
/// pairs onto those ids.
pub struct Font {
    pub face: OwnedFace,
}

impl Font {
    /// Load a font from raw bytes, parsing the font and returning an error if the font
    /// could not be parsed
    pub fn load(bytes: Vec<u8>) -> Result<Font, PDFError> {
        let face = OwnedFace::from_vec(bytes, 0)?;

        Ok(Font { face })
    }

    fn name_entry(&self, name_id: u16) -> Option<String> {
        self.face
            .as_face_ref()
            .names()
            .into_iter()
            .find(|name| name.name_id == name_id && name.is_unicode())
            .and_then(|name| name.to_string())
    }

    /// Obtain the full name of the font, if the font carries one
    pub fn name(&self) -> Option<String> {
        self.name_entry(owned_ttf_parser::name_id::FULL_NAME)
    }

    /// Obtain the family name of the font, if the font carries one
    pub fn family(&self) -> Option<String> {
        self.name_entry(owned_ttf_parser::name_id::FAMILY)
    }

    fn scaling(&self, size: Pt) -> Pt {
        size / self.face.as_face_ref().units_per_em() as f32
    }

    /// Calculate the ascent (distance from the baseline to the top of the font) for the given font size
    pub fn ascent(&self, size: Pt) -> Pt {
        self.scaling(size) * self.face.as_face_ref().ascender() as f32
    }

    /// Calculate the descent (distance from the baseline to the bottom of the font) for the given font size.
    /// Note: this is usually negative
    pub fn descent(&self, size: Pt) -> Pt {
        self.scaling(size) * self.face.as_face_ref().descender() as f32
    }

    /// Horizontal advance of a single glyph at the given size
    pub fn advance(&self, gid: u16, size: Pt) -> Pt {
        self.scaling(size)
            * self
                .face
                .as_face_ref()
                .glyph_hor_advance(owned_ttf_parser::GlyphId(gid))
                .unwrap_or_default() as f32
    }

    fn write_cid(&self, refs: &mut ObjectReferences, font_index: usize, writer: &mut Pdf) -> Ref {
        let font_descriptor_id = self.write_descriptor(refs, font_index, writer);

        let id = refs.gen(RefType::CidFont(font_index));

        let mut cid_font = writer.cid_font(id);
        cid_font.subtype(pdf_writer::types::CidFontType::Type2);
        cid_font.base_font(Name(format!("F{font_index}").as_bytes()));
        cid_font.system_info(SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        });
        cid_font.font_descriptor(font_descriptor_id);

        let ids = self.glyph_ids();
        let ids_augmented = self.glyphs_sizing(&ids);

        let scaling = 1000.0 / self.face.as_face_ref().units_per_em() as f32;

        // the most popular width becomes the default
        let mut widths_counts: HashMap<u16, usize> = HashMap::new();
        for (_, (_, (width, _))) in ids_augmented.iter() {
            *widths_counts.entry(*width).or_insert(0) += 1;
        }
        let most_common_width = widths_counts
            .iter()
            .max_by_key(|(_, &count)| count)
            .map(|(&width, _)| width as f32 * scaling)
            .unwrap_or(1000.0);

        let mut id_widths: Vec<(u16, f32)> = ids_augmented
            .iter()
            .map(|(&cid, &(_, (width, _)))| (cid, width as f32 * scaling))
            .collect();
        id_widths.sort_by_key(|(id, _)| *id);

        let mut widths = cid_font.widths();
        widths.consecutive(0, [1000.0]);

        // group runs of consecutive glyph ids into a single width block
        let mut blocks: Vec<(u16, Vec<f32>)> = Vec::new();
        for (cid, width) in id_widths.into_iter() {
            let continues_run = blocks
                .last()
                .map(|(start, run)| *start as usize + run.len() == cid as usize)
                .unwrap_or(false);
            match blocks.last_mut() {
                Some((_, run)) if continues_run => run.push(width),
                _ => blocks.push((cid, vec![width])),
            }
        }
        for (start, run) in blocks.into_iter() {
            widths.consecutive(start, run);
        }
        widths.finish();

        cid_font.default_width(most_common_width);
        cid_font.cid_to_gid_map_predefined(Name(b"Identity"));

        id
    }

    fn write_font_data(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let id = refs.gen(RefType::FontData(font_index));

        writer
            .stream(id, self.face.as_slice())
            .pair(Name(b"Length1"), self.face.as_slice().len() as i32);

        id
    }

    fn write_descriptor(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let font_data_stream_id = self.write_font_data(refs, font_index, writer);

        let gids = self.glyph_ids();
        let gids_augmented = self.glyphs_sizing(&gids);
        let face = self.face.as_face_ref();

        let max_width = gids_augmented
            .values()
            .map(|&(_, (w, _))| w)
            .max()
            .unwrap_or_default();
        let max_height = gids_augmented
            .values()
            .map(|&(_, (_, h))| h)
            .max()
            .unwrap_or_default();
        let sum_width: usize = gids_augmented.values().map(|&(_, (w, _))| w as usize).sum();
        let avg_width = sum_width as f32 / gids_augmented.len().max(1) as f32;

        let fallback_name = format!("F{font_index}");
        let name = self.name().unwrap_or_else(|| fallback_name.clone());
        let family = self.family().unwrap_or(fallback_name);

        let id = refs.gen(RefType::FontDescriptor(font_index));

        let mut descriptor = writer.font_descriptor(id);
        descriptor.name(Name(name.as_bytes()));
        descriptor.family(Str(family.as_bytes()));
        descriptor.weight(face.weight().to_number());

        let mut flags: FontFlags = FontFlags::empty();
        if face.is_monospaced() {
            flags.set(FontFlags::FIXED_PITCH, true);
        }
        if face.is_italic() {
            flags.set(FontFlags::ITALIC, true);
        }
        descriptor.flags(flags);

        let scaling = 1000.0 / face.units_per_em() as f32;
        descriptor.bbox(pdf_writer::Rect {
            x1: 0.0,
            y1: 0.0,
            x2: sum_width as f32 * scaling,
            y2: max_height as f32 * scaling,
        });
        descriptor.italic_angle(face.italic_angle());
        descriptor.ascent(face.ascender() as f32 * scaling);
        descriptor.descent(face.descender() as f32 * scaling);
        descriptor.leading(face.line_gap() as f32 * scaling);
        descriptor.cap_height(
            face.capital_height()
                .map(|h| h as f32 * scaling)
                .unwrap_or(1000.0),
        );
        descriptor.x_height(
            face.x_height()
                .unwrap_or_else(|| face.capital_height().unwrap_or_default()) as f32
                * scaling,
        );
        // TODO: derive the dominant vertical stem width from the glyph outlines
        descriptor.stem_v(80.0);
        descriptor.avg_width(avg_width * scaling);
        descriptor.max_width(max_width as f32 * scaling);
        descriptor.missing_width(max_width as f32 * scaling);

        descriptor.font_file2(font_data_stream_id);

        id
    }

    fn glyph_ids(&self) -> HashMap<u16, char> {
        let mut map: HashMap<u16, char> = HashMap::new();

        let Some(cmap) = self.face.as_face_ref().tables().cmap else {
            return map;
        };

        for subtable in cmap.subtables.into_iter().filter(|table| table.is_unicode()) {
            subtable.codepoints(|codepoint: u32| {
                if let Ok(ch) = char::try_from(codepoint) {
                    if let Some(index) = subtable.glyph_index(codepoint).filter(|index| index.0 > 0)
                    {
                        map.entry(index.0).or_insert(ch);
                    }
                }
            });
        }

        map
    }

    fn glyphs_sizing(&self, ids: &HashMap<u16, char>) -> HashMap<u16, (char, (u16, i16))> {
        let face = self.face.as_face_ref();
        let mut ids_augmented: HashMap<u16, (char, (u16, i16))> = HashMap::new();
        for (&id, &ch) in ids.iter() {
            if let Some(gid) = face.glyph_index(ch) {
                if let Some(h_advance) = face.glyph_hor_advance(gid) {
                    let height = face
                        .glyph_bounding_box(gid)
                        .map(|bbox| bbox.y_max - bbox.y_min - face.descender())
                        .unwrap_or(1000);
                    ids_augmented.insert(id, (ch, (h_advance, height)));
                }
            }
        }
        ids_augmented
    }

    fn write_to_unicode(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let id = refs.gen(RefType::ToUnicode(font_index));

        let mut map: String = r#"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo
<< /Registry (Adobe)
/Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
"#
        .replace("\r\n", "\n");

        let mut ids: Vec<(u16, char)> = self.glyph_ids().into_iter().collect();
        ids.sort_by_key(|&(id, _)| id);

        // bfchar blocks hold at most 100 entries sharing a high byte
        let mut cmap_blocks: Vec<Vec<(u16, char)>> = Vec::new();
        let mut current_block: Vec<(u16, char)> = Vec::new();
        let mut high_byte: u8 = 0;
        for (id, ch) in ids.iter() {
            if (id >> 8) as u8 != high_byte || current_block.len() >= 100 {
                if !current_block.is_empty() {
                    cmap_blocks.push(std::mem::take(&mut current_block));
                }
                high_byte = (id >> 8) as u8;
            }

            current_block.push((*id, *ch));
        }
        if !current_block.is_empty() {
            cmap_blocks.push(current_block);
        }

        for block in cmap_blocks.into_iter() {
            map.push_str(&format!("{} beginbfchar\n", block.len()));
            for (id, ch) in block.into_iter() {
                let ch: u32 = ch.into();
                map.push_str(&format!("<{id:04x}> <{ch:04x}>\n"));
            }
            map.push_str("endbfchar\n");
        }

        map.push_str("endcmap CMapName currentdict /CMap defineresource pop end end\n");

        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            map.as_bytes(),
            miniz_oxide::deflate::CompressionLevel::DefaultCompression as u8,
        );
        let mut stream = writer.stream(id, compressed.as_slice());
        stream.filter(pdf_writer::Filter::FlateDecode);

        id
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, id: Id<Font>, writer: &mut Pdf) {
        let font_index = id.index();
        let font_id = refs.gen(RefType::Font(font_index));
        let cid_font_id = self.write_cid(refs, font_index, writer);
        let to_unicode_id = self.write_to_unicode(refs, font_index, writer);

        let mut font = writer.type0_font(font_id);
        font.base_font(Name(format!("F{font_index}").as_bytes()));
        font.encoding_predefined(Name(b"Identity-H"));
        font.descendant_font(cid_font_id);
        font.to_unicode(to_unicode_id);
    }

    /// The glyph used to draw `ch`, if the font covers it
    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        self.face.as_face_ref().glyph_index(ch).map(|i| i.0)
    }

    /// The glyph drawn for `ch`, substituting the replacement character, then `?`,
    /// then glyph 0 (`.notdef`) when the font doesn't cover it
    pub fn glyph_id_or_fallback(&self, ch: char) -> u16 {
        self.glyph_id(ch)
            .or_else(|| self.glyph_id('\u{FFFD}'))
            .or_else(|| self.glyph_id('?'))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_style_codes() {
        assert_eq!("".parse::<FontStyle>().unwrap(), FontStyle::Regular);
        assert_eq!("B".parse::<FontStyle>().unwrap(), FontStyle::Bold);
        assert_eq!("I".parse::<FontStyle>().unwrap(), FontStyle::Italic);
        assert_eq!("IB".parse::<FontStyle>().unwrap(), FontStyle::BoldItalic);
        assert_eq!("Bold".parse::<FontStyle>().unwrap(), FontStyle::Bold);
        assert_eq!(
            "U".parse::<FontStyle>(),
            Err(ParseError::UnknownFontStyle("U".to_string()))
        );
    }

    #[test]
    fn only_regular_and_bold_are_main() {
        assert!(FontStyle::Regular.can_be_main());
        assert!(FontStyle::Bold.can_be_main());
        assert!(!FontStyle::Italic.can_be_main());
        assert!(!FontStyle::BoldItalic.can_be_main());
    }

    #[test]
    fn rejects_garbage_font_data() {
        assert!(matches!(
            Font::load(vec![0, 1, 2, 3]),
            Err(PDFError::FaceParsingError(_))
        ));
    }
}
