// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Render module: turns one input unit (an image file, or one page of a
// document) into a `PixelBuffer`.
//
// Document rendering sits behind the `DocumentRenderer` / `PageSource` traits
// so the batch pipeline can run against any backend; `PdfiumRenderer` is the
// production implementation.

pub mod image;
pub mod pdfium;

use std::path::Path;

use whitecrop_core::error::Result;

use crate::raster::PixelBuffer;

pub use self::image::ImageRasterizer;
pub use self::pdfium::PdfiumRenderer;

/// Opens documents for page-by-page rasterisation.
pub trait DocumentRenderer {
    /// Open the document at `path`. The returned source borrows the renderer
    /// and releases the document when dropped.
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn PageSource + 'a>>;
}

/// An opened document whose pages can be rendered.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Render page `index` (zero-based) scaled by `scale` relative to its
    /// natural size of one pixel per point.
    fn render_page(&self, index: usize, scale: f32) -> Result<PixelBuffer>;
}
