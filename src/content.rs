//! Content stream rendering for pages.

use crate::colour::Colour;
use crate::font::Font;
use crate::page::{PageContents, SpanFont, SpanLayout};
use id_arena::Arena;
use std::io::Write;

/// Renders page contents to a PDF content stream, converting high-level
/// content items into low-level PDF operators.
#[allow(clippy::write_with_newline)]
pub(crate) fn render_contents(
    contents: &[PageContents],
    fonts: &Arena<Font>,
) -> Result<Vec<u8>, std::io::Error> {
    let mut content: Vec<u8> = Vec::default();

    for page_content in contents.iter() {
        match page_content {
            PageContents::Text(spans) => {
                render_text_spans(&mut content, spans, fonts)?;
            }
            PageContents::RawContent(c) => {
                write!(&mut content, "q\n")?;
                content.write_all(c.as_slice())?;
                write!(&mut content, "\nQ\n")?;
            }
        }
    }

    Ok(content)
}

#[allow(clippy::write_with_newline)]
fn render_text_spans(
    content: &mut Vec<u8>,
    spans: &[SpanLayout],
    fonts: &Arena<Font>,
) -> Result<(), std::io::Error> {
    let Some(first) = spans.first() else {
        return Ok(());
    };

    write!(content, "q\n")?;

    let mut current_font: SpanFont = first.font;
    let mut current_colour: Colour = first.colour;

    write_font(content, current_font)?;
    write_colour(content, current_colour)?;

    for span in spans.iter() {
        if span.font != current_font {
            current_font = span.font;
            write_font(content, current_font)?;
        }
        if span.colour != current_colour {
            current_colour = span.colour;
            write_colour(content, current_colour)?;
        }

        let Some(font) = fonts.get(current_font.id) else {
            continue;
        };

        write!(content, "BT\n")?;
        write!(content, "{} {} Td\n", span.coords.0, span.coords.1)?;
        write!(content, "<")?;
        for ch in span.text.chars() {
            write!(content, "{:04x}", font.glyph_id_or_fallback(ch))?;
        }
        write!(content, "> Tj\n")?;
        write!(content, "ET\n")?;
    }

    write!(content, "Q\n")?;
    Ok(())
}

#[allow(clippy::write_with_newline)]
fn write_font(content: &mut Vec<u8>, font: SpanFont) -> Result<(), std::io::Error> {
    write!(content, "/F{} {} Tf\n", font.id.index(), font.size)
}

#[allow(clippy::write_with_newline)]
fn write_colour(content: &mut Vec<u8>, colour: Colour) -> Result<(), std::io::Error> {
    match colour {
        Colour::RGB { r, g, b } => write!(content, "{r} {g} {b} rg\n"),
        Colour::Grey { g } => write!(content, "{g} g\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_content_is_isolated() {
        let fonts: Arena<Font> = Arena::new();
        let rendered = render_contents(
            &[PageContents::RawContent(b"0 0 10 10 re f".to_vec())],
            &fonts,
        )
        .unwrap();
        assert_eq!(rendered, b"q\n0 0 10 10 re f\nQ\n".to_vec());
    }

    #[test]
    fn empty_contents_render_nothing() {
        let fonts: Arena<Font> = Arena::new();
        assert!(render_contents(&[], &fonts).unwrap().is_empty());
        assert!(render_contents(&[PageContents::Text(Vec::new())], &fonts)
            .unwrap()
            .is_empty());
    }
}
