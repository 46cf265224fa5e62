// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text measurement for label layout.

use printpdf::ParsedFont;

/// Measures the rendered width of a line of text.
pub trait TextMeasure {
    /// Width of `text` in points when set at `font_size` points.
    fn text_width(&self, text: &str, font_size: f32) -> f32;

    /// Font to embed for rendered text. `None` sets text in built-in
    /// Helvetica.
    fn embedded_font(&self) -> Option<&ParsedFont> {
        None
    }
}

/// Advance widths of the standard Helvetica font, in 1/1000 em.
///
/// Glyphs outside printable ASCII fall back to [`HelveticaMetrics::DEFAULT_WIDTH`],
/// except East Asian wide characters, which take a full em.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelveticaMetrics;

impl HelveticaMetrics {
    pub const DEFAULT_WIDTH: u16 = 556;
    pub const WIDE_WIDTH: u16 = 1000;

    /// Advance width of one character in 1/1000 em.
    pub fn advance(ch: char) -> u16 {
        match ch {
            ' '..='~' => ASCII_WIDTHS[(ch as usize) - 0x20],
            _ if is_wide(ch) => Self::WIDE_WIDTH,
            _ => Self::DEFAULT_WIDTH,
        }
    }
}

impl TextMeasure for HelveticaMetrics {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|ch| u32::from(Self::advance(ch))).sum();
        units as f32 * font_size / 1000.0
    }
}

// 0x20 ..= 0x7E
#[rustfmt::skip]
const ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// CJK ideographs, kana, hangul and full-width forms.
fn is_wide(ch: char) -> bool {
    matches!(
        ch as u32,
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA000..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x20000..=0x2FFFD
            | 0x30000..=0x3FFFD
    )
}
