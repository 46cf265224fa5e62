// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.
//
// Every tunable that decides what counts as background, how pages are
// rasterised, and how labels are laid out lives here so that callers pass it
// explicitly instead of relying on module-level constants.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WhitecropError};

/// How transparent pixels are treated before content detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlphaPolicy {
    /// Blend every pixel onto an opaque background colour, so fully
    /// transparent pixels become background.
    Composite { background: [u8; 3] },
    /// Drop the alpha channel and keep the stored colour.
    Discard,
}

impl AlphaPolicy {
    /// Composite onto opaque white.
    pub const WHITE: Self = Self::Composite {
        background: [255, 255, 255],
    };
}

impl Default for AlphaPolicy {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Background classification policy for one kind of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropPolicy {
    /// A pixel is background iff all three channels are >= this value.
    pub white_threshold: u8,
    /// Alpha handling applied while normalising to RGB.
    pub alpha: AlphaPolicy,
}

impl CropPolicy {
    /// Standalone raster images with crisp white backgrounds.
    pub const fn image() -> Self {
        Self {
            white_threshold: 250,
            alpha: AlphaPolicy::WHITE,
        }
    }

    /// Rasterised PDF pages, which carry anti-aliasing noise near edges.
    pub const fn pdf_page() -> Self {
        Self {
            white_threshold: 240,
            alpha: AlphaPolicy::Discard,
        }
    }
}

/// Output document settings shared by every composed PDF.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Nominal resolution tag for embedded page images.
    pub dpi: f32,
    /// Re-compress content streams after serialisation.
    pub compress: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dpi: 300.0,
            compress: true,
        }
    }
}

/// Label page geometry, font-size search range and font search order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    /// Fixed page width in points.
    pub page_width: f32,
    /// Margin on every side, in points.
    pub margin: f32,
    /// First (largest) font size tried.
    pub max_font_size: f32,
    /// Smallest font size tried, and the unconditional fallback.
    pub min_font_size: f32,
    /// Decrement between candidate sizes.
    pub font_step: f32,
    /// Line height as a multiple of the font size.
    pub line_spacing: f32,
    /// Share of the usable width the widest line may occupy.
    pub fit_ratio: f32,
    /// Extra page height, as a multiple of the font size.
    pub top_padding_factor: f32,
    /// Distance from the top margin to the first baseline, as a multiple of
    /// the font size.
    pub baseline_factor: f32,
    /// Pages are never shorter than this.
    pub min_page_height: f32,
    /// TrueType/OpenType fonts tried in order; the first one that loads is
    /// embedded. Built-in Helvetica is used when none does.
    pub font_paths: Vec<PathBuf>,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            page_width: 1000.0,
            margin: 20.0,
            max_font_size: 80.0,
            min_font_size: 14.0,
            font_step: 2.0,
            line_spacing: 1.1,
            fit_ratio: 0.95,
            top_padding_factor: 0.3,
            baseline_factor: 0.8,
            min_page_height: 200.0,
            font_paths: default_font_paths(),
        }
    }
}

/// System fonts with CJK coverage on Windows, Linux and macOS.
fn default_font_paths() -> Vec<PathBuf> {
    [
        "C:/Windows/Fonts/simsun.ttc",
        "C:/Windows/Fonts/simhei.ttf",
        "C:/Windows/Fonts/msyh.ttc",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
        "/System/Library/Fonts/PingFang.ttc",
        "/System/Library/Fonts/STHeiti Light.ttc",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Policy for standalone image inputs.
    pub image_policy: CropPolicy,
    /// Policy for rendered PDF pages.
    pub pdf_policy: CropPolicy,
    /// Upscaling factor applied when rendering PDF pages.
    pub render_scale: f32,
    /// Output document settings.
    pub output: OutputSettings,
    /// Label generator settings.
    pub label: LabelSettings,
    /// Directories searched, in order, for the PDF rendering library before
    /// falling back to the system library path.
    pub pdfium_library_dirs: Vec<PathBuf>,
    /// Lower-case file extensions accepted in image mode.
    pub image_extensions: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            image_policy: CropPolicy::image(),
            pdf_policy: CropPolicy::pdf_page(),
            render_scale: 2.0,
            output: OutputSettings::default(),
            label: LabelSettings::default(),
            pdfium_library_dirs: vec![PathBuf::from("./")],
            image_extensions: ["jpg", "jpeg", "png", "bmp", "tiff", "tif", "gif"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl AppConfig {
    /// Load settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write settings to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !is_positive(self.render_scale) {
            return Err(WhitecropError::Config(format!(
                "render_scale must be positive, got {}",
                self.render_scale
            )));
        }
        if !is_positive(self.output.dpi) {
            return Err(WhitecropError::Config(format!(
                "output dpi must be positive, got {}",
                self.output.dpi
            )));
        }
        let label = &self.label;
        if !is_positive(label.font_step) {
            return Err(WhitecropError::Config("label font_step must be positive".into()));
        }
        if label.min_font_size > label.max_font_size {
            return Err(WhitecropError::Config(format!(
                "label min_font_size {} exceeds max_font_size {}",
                label.min_font_size, label.max_font_size
            )));
        }
        if !is_positive(label.fit_ratio) || label.fit_ratio > 1.0 {
            return Err(WhitecropError::Config(format!(
                "label fit_ratio must be in (0, 1], got {}",
                label.fit_ratio
            )));
        }
        Ok(())
    }

    /// Whether `path` carries one of the accepted image extensions
    /// (case-insensitive).
    pub fn is_image_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.image_extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(&ext))
            })
            .unwrap_or(false)
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
