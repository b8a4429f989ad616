//! Advance widths for the standard Helvetica faces, in 1/1000 em.
//!
//! Covers printable ASCII (32..=126); anything else uses [`DEFAULT_WIDTH`].

const DEFAULT_WIDTH: u16 = 556;
const MM_PER_POINT: f32 = 25.4 / 72.0;

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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

impl FontStyle {
    fn table(&self) -> &'static [u16; 95] {
        match self {
            // Helvetica-Oblique shares the upright widths.
            FontStyle::Regular | FontStyle::Italic => &HELVETICA,
            FontStyle::Bold => &HELVETICA_BOLD,
        }
    }

    fn char_width(&self, c: char) -> u16 {
        let code = c as u32;
        if (32..=126).contains(&code) {
            self.table()[(code - 32) as usize]
        } else {
            DEFAULT_WIDTH
        }
    }
}

/// Rendered width of `text` in millimetres at `size_pt`.
pub fn text_width_mm(text: &str, style: FontStyle, size_pt: f32) -> f32 {
    let units: u32 = text.chars().map(|c| style.char_width(c) as u32).sum();
    units as f32 / 1000.0 * size_pt * MM_PER_POINT
}
