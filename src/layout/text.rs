use crate::font::Font;
use crate::units::Pt;

/// Tabs inside laid out text are expanded to this many spaces
const TABSIZE: usize = 4;

/// One line of a wrapped paragraph
#[derive(Clone, Debug, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    /// Width of `text` at the size it was wrapped for
    pub width: Pt,
    /// Whether the line ends a paragraph (an explicit newline or the end of the
    /// text) rather than a soft wrap
    pub ends_paragraph: bool,
}

/// Calculate the width of a given string of text given the font and font size.
/// Characters the font can't draw are measured as the glyph drawn in their place.
pub fn width_of_text(text: &str, font: &Font, size: Pt) -> Pt {
    text.chars()
        .map(|ch| font.advance(font.glyph_id_or_fallback(ch), size))
        .sum()
}

/// Break `text` into lines no wider than `max_width`.
///
/// Explicit newlines always end a line. Inside a paragraph, lines are broken at
/// the last whitespace that fits; a word wider than the whole line is split at
/// the character where it overflows. Whitespace at a soft break is dropped, but
/// leading whitespace of a paragraph (indentation) is kept. Every line holds at
/// least one character, so a too-narrow width still terminates.
pub fn wrap_lines(text: &str, font: &Font, size: Pt, max_width: Pt) -> Vec<WrappedLine> {
    // replace tabs with spaces
    let text = text.replace('\t', &" ".repeat(TABSIZE));
    // normalize newlines
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    let finish = |line: &str, ends_paragraph: bool| WrappedLine {
        text: line.to_string(),
        width: width_of_text(line, font, size),
        ends_paragraph,
    };

    let mut lines: Vec<WrappedLine> = Vec::new();

    for paragraph in text.split('\n') {
        let chars: Vec<char> = paragraph.chars().collect();

        let mut line = String::new();
        let mut width = Pt(0.);
        let mut has_content = false;
        // (byte length of `line` up to and including the whitespace, index of the next char)
        let mut last_break: Option<(usize, usize)> = None;

        let mut ci = 0usize;
        while ci < chars.len() {
            let ch = chars[ci];
            let hadv = font.advance(font.glyph_id_or_fallback(ch), size);

            if width + hadv > max_width && !line.is_empty() {
                if ch.is_whitespace() && has_content {
                    // overflowing on whitespace: everything before it fits
                    lines.push(finish(line.trim_end(), false));
                } else {
                    match last_break {
                        Some((line_len, resume)) => {
                            line.truncate(line_len);
                            lines.push(finish(line.trim_end(), false));
                            ci = resume;
                        }
                        None => {
                            // no break point - force character break
                            lines.push(finish(&line, false));
                        }
                    }
                }

                last_break = None;
                line.clear();
                width = Pt(0.);
                has_content = false;

                // don't start a wrapped line with whitespace
                while ci < chars.len() && chars[ci].is_whitespace() {
                    ci += 1;
                }
                continue;
            }

            line.push(ch);
            width += hadv;

            if ch.is_whitespace() {
                if has_content {
                    last_break = Some((line.len(), ci + 1));
                }
            } else {
                has_content = true;
            }

            ci += 1;
        }

        lines.push(finish(&line, true));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: Pt = Pt(12.0);

    fn font() -> Font {
        Font::load(include_bytes!("../../assets/DejaVuSerif.ttf").to_vec()).unwrap()
    }

    /// Just wide enough for `text`
    fn fitting(text: &str, font: &Font) -> Pt {
        width_of_text(text, font, SIZE) + Pt(0.01)
    }

    fn texts(lines: &[WrappedLine]) -> Vec<&str> {
        lines.iter().map(|line| line.text.as_str()).collect()
    }

    #[test]
    fn soft_wraps_after_the_last_fitting_word() {
        let font = font();
        let lines = wrap_lines("hello world foo", &font, SIZE, fitting("hello world", &font));
        assert_eq!(texts(&lines), vec!["hello world", "foo"]);
        assert!(!lines[0].ends_paragraph);
        assert!(lines[1].ends_paragraph);
        assert_eq!(lines[0].width, width_of_text("hello world", &font, SIZE));
    }

    #[test]
    fn breaks_at_an_earlier_space_when_a_word_overflows() {
        let font = font();
        let lines = wrap_lines("one two three", &font, SIZE, fitting("one two thr", &font));
        assert_eq!(texts(&lines), vec!["one two", "three"]);
    }

    #[test]
    fn long_words_break_between_characters() {
        let font = font();
        let lines = wrap_lines("abcdefgh", &font, SIZE, fitting("abc", &font));
        assert_eq!(texts(&lines), vec!["abc", "def", "gh"]);

        // nothing fits: every line still takes one character
        let lines = wrap_lines("abc", &font, SIZE, Pt(0.0));
        assert_eq!(texts(&lines), vec!["a", "b", "c"]);
    }

    #[test]
    fn keeps_paragraph_indentation() {
        let font = font();
        let lines = wrap_lines("    indented text", &font, SIZE, Pt(1000.0));
        assert_eq!(texts(&lines), vec!["    indented text"]);

        let lines = wrap_lines("  aa bb", &font, SIZE, fitting("  aa", &font));
        assert_eq!(texts(&lines), vec!["  aa", "bb"]);

        let lines = wrap_lines("\tx", &font, SIZE, Pt(1000.0));
        assert_eq!(texts(&lines), vec!["    x"]);
    }

    #[test]
    fn explicit_newlines_end_paragraphs() {
        let font = font();
        let lines = wrap_lines("one\r\ntwo\rthree", &font, SIZE, Pt(1000.0));
        assert_eq!(texts(&lines), vec!["one", "two", "three"]);
        assert!(lines.iter().all(|line| line.ends_paragraph));

        let lines = wrap_lines("a\n\nb", &font, SIZE, Pt(1000.0));
        assert_eq!(texts(&lines), vec!["a", "", "b"]);
        assert_eq!(lines[1].width, Pt(0.0));

        let lines = wrap_lines("", &font, SIZE, Pt(1000.0));
        assert_eq!(texts(&lines), vec![""]);
    }
}
