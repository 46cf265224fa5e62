// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Standalone image rasteriser: decodes an image file at native resolution.

use std::path::Path;

use tracing::{info, instrument};
use whitecrop_core::AlphaPolicy;
use whitecrop_core::error::Result;

use crate::raster::PixelBuffer;

/// Decodes JPEG, PNG, BMP, TIFF, and GIF files into pixel buffers.
#[derive(Debug, Clone, Copy)]
pub struct ImageRasterizer {
    alpha: AlphaPolicy,
}

impl ImageRasterizer {
    pub fn new(alpha: AlphaPolicy) -> Self {
        Self { alpha }
    }

    /// Decode `path`; corrupt or unsupported files surface as
    /// `WhitecropError::Decode`.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn rasterize(&self, path: &Path) -> Result<PixelBuffer> {
        let buffer = PixelBuffer::open(path, self.alpha)?;
        info!(
            width = buffer.width(),
            height = buffer.height(),
            "Image rasterised"
        );
        Ok(buffer)
    }
}

impl Default for ImageRasterizer {
    fn default() -> Self {
        Self::new(AlphaPolicy::WHITE)
    }
}
