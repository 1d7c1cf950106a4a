//! Font selection, text measurement and word wrapping.
//!
//! A document uses exactly one family: either the three custom TrueType
//! faces (regular, bold, italic) or the builtin Helvetica family. Builtin
//! widths come from the Adobe Helvetica AFM tables; custom widths are summed
//! from glyph advances with `ttf-parser`.

use printpdf::{BuiltinFont, ParsedFont};
use serde::{Deserialize, Serialize};

/// Face within the document's family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontVariant {
    Regular,
    Bold,
    Italic,
}

impl FontVariant {
    pub fn builtin(self) -> BuiltinFont {
        match self {
            FontVariant::Regular => BuiltinFont::Helvetica,
            FontVariant::Bold => BuiltinFont::HelveticaBold,
            FontVariant::Italic => BuiltinFont::HelveticaOblique,
        }
    }
}

/// A loaded TrueType face with metrics, ready for embedding.
pub struct FontData {
    /// Raw font bytes (kept alive for ttf-parser's zero-copy API).
    pub bytes: Vec<u8>,
    pub units_per_em: f32,
    pub parsed: ParsedFont,
}

impl FontData {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, String> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| format!("failed to parse font: {e}"))?;
        let units_per_em = face.units_per_em() as f32;

        let parsed = ParsedFont::from_bytes(&bytes, 0, &mut Vec::new())
            .ok_or_else(|| "font could not be prepared for embedding".to_string())?;

        Ok(Self {
            bytes,
            units_per_em,
            parsed,
        })
    }

    fn measure(&self, text: &str, font_size: f32) -> f32 {
        let Ok(face) = ttf_parser::Face::parse(&self.bytes, 0) else {
            return text.chars().count() as f32 * font_size * 0.5;
        };
        let scale = font_size / self.units_per_em;
        text.chars()
            .map(|ch| match face.glyph_index(ch) {
                Some(gid) => face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale,
                // Missing glyph
                None => font_size * 0.5,
            })
            .sum()
    }
}

/// The three custom faces. All three must load for the set to be used.
pub struct CustomFonts {
    pub regular: FontData,
    pub bold: FontData,
    pub italic: FontData,
}

impl CustomFonts {
    pub fn get(&self, variant: FontVariant) -> &FontData {
        match variant {
            FontVariant::Regular => &self.regular,
            FontVariant::Bold => &self.bold,
            FontVariant::Italic => &self.italic,
        }
    }
}

/// The family a document is drawn with.
#[derive(Default)]
pub enum FontSet {
    #[default]
    Builtin,
    Custom(Box<CustomFonts>),
}

impl FontSet {
    pub fn is_custom(&self) -> bool {
        matches!(self, FontSet::Custom(_))
    }

    /// Width of `text` in points.
    pub fn measure_text_width(&self, text: &str, font_size: f32, variant: FontVariant) -> f32 {
        match self {
            FontSet::Builtin => builtin_text_width(text, font_size, variant),
            FontSet::Custom(fonts) => fonts.get(variant).measure(text, font_size),
        }
    }

    /// Word-wrap text to fit within `max_width` points. Existing line breaks
    /// (`\n` or `\r\n`) start new lines; trailing blank lines are dropped.
    pub fn wrap_text(
        &self,
        text: &str,
        font_size: f32,
        variant: FontVariant,
        max_width: f32,
    ) -> Vec<String> {
        if max_width <= 0.0 || text.is_empty() {
            return vec![text.to_string()];
        }

        let mut lines: Vec<String> = Vec::new();
        for paragraph in text.lines() {
            let words: Vec<&str> = paragraph.split_whitespace().collect();
            if words.is_empty() {
                lines.push(String::new());
                continue;
            }

            let mut current_line = String::new();
            for word in &words {
                let candidate = if current_line.is_empty() {
                    word.to_string()
                } else {
                    format!("{current_line} {word}")
                };
                let w = self.measure_text_width(&candidate, font_size, variant);
                if w > max_width && !current_line.is_empty() {
                    lines.push(current_line);
                    current_line = word.to_string();
                } else {
                    current_line = candidate;
                }
            }
            if !current_line.is_empty() {
                lines.push(current_line);
            }
        }

        while lines.len() > 1 && lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }
}

/// Character widths for Helvetica (ASCII 32..=126) in units of 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32..47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48..63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64..79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80..95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96..111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112..126
];

/// Character widths for Helvetica-Bold (ASCII 32..=126).
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32..47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48..63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64..79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80..95
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96..111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112..126
];

const DEFAULT_WIDTH: u16 = 278;

fn builtin_char_width(ch: char, variant: FontVariant) -> u16 {
    let ch = match ch {
        '°' => return 400,
        'º' => return 365,
        other => fold_latin1(other),
    };
    let code = ch as u32;
    if !(32..=126).contains(&code) {
        return DEFAULT_WIDTH;
    }
    let index = (code - 32) as usize;
    match variant {
        FontVariant::Regular | FontVariant::Italic => HELVETICA_WIDTHS[index],
        FontVariant::Bold => HELVETICA_BOLD_WIDTHS[index],
    }
}

/// Accented Latin-1 letters share the advance of their base letter.
pub(crate) fn fold_latin1(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        '\u{00A0}' => ' ',
        other => other,
    }
}

fn builtin_text_width(text: &str, font_size: f32, variant: FontVariant) -> f32 {
    let total: u32 = text
        .chars()
        .map(|ch| builtin_char_width(ch, variant) as u32)
        .sum();
    total as f32 * font_size / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_width_uses_afm_tables() {
        let fonts = FontSet::Builtin;
        // H(722) + e(556) + l(222) + l(222) + o(556) = 2278
        let w = fonts.measure_text_width("Hello", 10.0, FontVariant::Regular);
        assert!((w - 22.78).abs() < 0.001, "got {w}");
    }

    #[test]
    fn bold_is_wider_than_regular() {
        let fonts = FontSet::Builtin;
        let regular = fonts.measure_text_width("Identificación:", 9.0, FontVariant::Regular);
        let bold = fonts.measure_text_width("Identificación:", 9.0, FontVariant::Bold);
        assert!(bold > regular);
    }

    #[test]
    fn accented_letters_measure_like_base_letters() {
        let fonts = FontSet::Builtin;
        let plain = fonts.measure_text_width("Descripcion", 9.0, FontVariant::Bold);
        let accented = fonts.measure_text_width("Descripción", 9.0, FontVariant::Bold);
        assert_eq!(plain, accented);
    }

    #[test]
    fn word_wrap_respects_width() {
        let fonts = FontSet::Builtin;
        let text = "Desarrollo de sitio web corporativo con integración de pasarela de pagos";
        let lines = fonts.wrap_text(text, 9.0, FontVariant::Regular, 120.0);
        assert!(lines.len() >= 2, "expected wrapping, got {lines:?}");
        for line in &lines {
            assert!(fonts.measure_text_width(line, 9.0, FontVariant::Regular) <= 120.0);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn overlong_word_stays_on_its_own_line() {
        let fonts = FontSet::Builtin;
        let lines = fonts.wrap_text("a supercalifragilistico b", 9.0, FontVariant::Regular, 20.0);
        assert_eq!(lines, vec!["a", "supercalifragilistico", "b"]);
    }

    #[test]
    fn newlines_start_new_lines() {
        let fonts = FontSet::Builtin;
        let lines = fonts.wrap_text("uno\ndos", 9.0, FontVariant::Regular, 500.0);
        assert_eq!(lines, vec!["uno", "dos"]);
    }

    #[test]
    fn crlf_and_trailing_newlines_add_no_lines() {
        let fonts = FontSet::Builtin;
        let lines = fonts.wrap_text("uno\r\ndos\r\n", 9.0, FontVariant::Regular, 500.0);
        assert_eq!(lines, vec!["uno", "dos"]);
        let lines = fonts.wrap_text("uno\n\n", 9.0, FontVariant::Regular, 500.0);
        assert_eq!(lines, vec!["uno"]);
        // blank lines in the middle are kept
        let lines = fonts.wrap_text("uno\n\ndos", 9.0, FontVariant::Regular, 500.0);
        assert_eq!(lines, vec!["uno", "", "dos"]);
    }

    #[test]
    fn garbage_bytes_are_not_a_font() {
        assert!(FontData::from_bytes(b"not a font".to_vec()).is_err());
    }
}
