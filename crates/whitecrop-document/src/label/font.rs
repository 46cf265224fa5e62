// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label fonts: the first loadable TrueType/OpenType file from a search list is
// embedded and measured by its own advance widths. Built-in Helvetica covers
// the case where none loads.

use std::path::{Path, PathBuf};

use printpdf::{ParsedFont, PdfWarnMsg};
use tracing::{debug, info, instrument, warn};
use whitecrop_core::error::{Result, WhitecropError};

use super::metrics::{HelveticaMetrics, TextMeasure};

/// A parsed font file ready to be embedded in a label document.
#[derive(Clone)]
pub struct EmbeddedFont {
    font: ParsedFont,
    source: PathBuf,
    units_per_em: f32,
}

impl EmbeddedFont {
    /// Read and parse the first face of the font file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|err| WhitecropError::decode(path, err))?;
        Self::from_bytes(&bytes, path)
    }

    /// Parse font data; `source` is only used for diagnostics.
    pub fn from_bytes(bytes: &[u8], source: &Path) -> Result<Self> {
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let font = ParsedFont::from_bytes(bytes, 0, &mut warnings)
            .ok_or_else(|| WhitecropError::decode(source, "not a TrueType/OpenType font"))?;
        if font.cmap_subtable.is_none() {
            return Err(WhitecropError::decode(source, "font has no character map"));
        }
        let units_per_em = f32::from(font.font_metrics.units_per_em.max(1));
        debug!(
            glyphs = font.num_glyphs,
            units_per_em,
            warnings = warnings.len(),
            "Font parsed"
        );
        Ok(Self {
            font,
            source: source.to_path_buf(),
            units_per_em,
        })
    }

    pub fn parsed(&self) -> &ParsedFont {
        &self.font
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Advance width of `ch` in 1/1000 em.
    ///
    /// Characters the font has no glyph for are estimated with Helvetica
    /// widths.
    pub fn advance(&self, ch: char) -> f32 {
        self.font
            .lookup_glyph_index(ch as u32)
            .map(|glyph| self.font.get_horizontal_advance(glyph))
            .filter(|&units| units > 0)
            .map(|units| f32::from(units) * 1000.0 / self.units_per_em)
            .unwrap_or_else(|| f32::from(HelveticaMetrics::advance(ch)))
    }
}

impl TextMeasure for EmbeddedFont {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: f32 = text.chars().map(|ch| self.advance(ch)).sum();
        units * font_size / 1000.0
    }

    fn embedded_font(&self) -> Option<&ParsedFont> {
        Some(&self.font)
    }
}

/// The font label text is set in.
#[derive(Clone, Default)]
pub enum LabelFont {
    /// Built-in Helvetica; nothing is embedded.
    #[default]
    Helvetica,
    Embedded(Box<EmbeddedFont>),
}

impl LabelFont {
    /// The first font in `paths` that loads, or Helvetica when none does.
    #[instrument(skip_all, fields(candidates = paths.len()))]
    pub fn search(paths: &[PathBuf]) -> Self {
        for path in paths {
            if !path.is_file() {
                debug!("No font at {}", path.display());
                continue;
            }
            match EmbeddedFont::load(path) {
                Ok(font) => {
                    info!("Embedding label font {}", path.display());
                    return Self::Embedded(Box::new(font));
                }
                Err(err) => warn!("Skipping label font: {err}"),
            }
        }
        debug!("No label font loaded, using built-in Helvetica");
        Self::Helvetica
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded(_))
    }
}

impl TextMeasure for LabelFont {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        match self {
            Self::Helvetica => HelveticaMetrics.text_width(text, font_size),
            Self::Embedded(font) => font.text_width(text, font_size),
        }
    }

    fn embedded_font(&self) -> Option<&ParsedFont> {
        match self {
            Self::Helvetica => None,
            Self::Embedded(font) => font.embedded_font(),
        }
    }
}

/// A font file present on this machine, for tests that need real glyph data.
#[cfg(test)]
pub(crate) fn system_test_font() -> Option<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/Library/Fonts/Arial.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:/Windows/Fonts/arial.ttf",
    ]
    .into_iter()
    .map(PathBuf::from)
    .find(|path| path.is_file())
}
