//! Text measurement for the PDF standard Helvetica fonts
//!
//! Glyph advance widths come from the Adobe Font Metrics of Helvetica and
//! Helvetica-Bold, in thousandths of the font size. Characters outside
//! printable ASCII fall back to the width of a digit.

/// Font face used by the PDF writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// PDF base font name
    pub fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }

    /// Resource name inside page content streams
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

const DEFAULT_WIDTH: u16 = 556;

/// Widths of code points 32..=126
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Advance width of one character in font units (1/1000 em)
pub fn char_width(font: Font, c: char) -> u16 {
    let table = match font {
        Font::Regular => &HELVETICA,
        Font::Bold => &HELVETICA_BOLD,
    };
    let code = c as u32;
    if (32..=126).contains(&code) {
        table[(code - 32) as usize]
    } else {
        DEFAULT_WIDTH
    }
}

/// Width of a string in points at the given font size
pub fn text_width(text: &str, font: Font, size: f64) -> f64 {
    let units: u32 = text.chars().map(|c| char_width(font, c) as u32).sum();
    units as f64 * size / 1000.0
}

/// Split text into lines no wider than `max_width` points
///
/// Explicit newlines always break. Words are kept whole unless a single
/// word is wider than the line, in which case it is broken by character.
/// Always returns at least one line.
pub fn split_text_to_size(text: &str, max_width: f64, font: Font, size: f64) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if text_width(&candidate, font, size) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if text_width(word, font, size) <= max_width {
                current = word.to_string();
            } else {
                for c in word.chars() {
                    current.push(c);
                    if text_width(&current, font, size) > max_width && current.chars().count() > 1 {
                        current.pop();
                        lines.push(std::mem::take(&mut current));
                        current.push(c);
                    }
                }
            }
        }

        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_widths() {
        assert_eq!(char_width(Font::Regular, ' '), 278);
        assert_eq!(char_width(Font::Regular, 'W'), 944);
        assert_eq!(char_width(Font::Bold, 'b'), 611);
        assert_eq!(char_width(Font::Regular, '~'), 584);
        assert_eq!(char_width(Font::Regular, 'é'), DEFAULT_WIDTH);
    }

    #[test]
    fn test_text_width() {
        // "ab" = 556 + 556 units at 10pt
        assert!((text_width("ab", Font::Regular, 10.0) - 11.12).abs() < 1e-9);
    }

    #[test]
    fn test_split_short_text_is_single_line() {
        assert_eq!(
            split_text_to_size("Court of Justice", 500.0, Font::Regular, 10.0),
            vec!["Court of Justice"]
        );
    }

    #[test]
    fn test_split_wraps_on_words() {
        let text = "the court rules that the provision must be interpreted narrowly";
        let lines = split_text_to_size(text, 100.0, Font::Regular, 10.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, Font::Regular, 10.0) <= 100.0);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_split_breaks_long_words() {
        let word = "x".repeat(200);
        let lines = split_text_to_size(&word, 50.0, Font::Regular, 10.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_split_keeps_newlines_and_empty_text() {
        assert_eq!(
            split_text_to_size("a\nb", 500.0, Font::Regular, 10.0),
            vec!["a", "b"]
        );
        assert_eq!(split_text_to_size("", 500.0, Font::Regular, 10.0), vec![""]);
    }
}
