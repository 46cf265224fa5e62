// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF page rasteriser backed by pdfium-render. The PDFium library is bound
// dynamically at runtime, searching the configured directories in order and
// finally the system library path.

use std::path::{Path, PathBuf};

use pdfium_render::prelude::*;
use tracing::{debug, info, instrument, warn};
use whitecrop_core::AlphaPolicy;
use whitecrop_core::error::{Result, WhitecropError};

use super::{DocumentRenderer, PageSource};
use crate::raster::PixelBuffer;

/// Renders PDF pages through PDFium.
pub struct PdfiumRenderer {
    pdfium: Pdfium,
    alpha: AlphaPolicy,
}

impl PdfiumRenderer {
    /// Bind to the PDFium library, trying each of `library_dirs` before the
    /// system library.
    pub fn bind(library_dirs: &[PathBuf], alpha: AlphaPolicy) -> Result<Self> {
        for dir in library_dirs {
            let candidate = Pdfium::pdfium_platform_library_name_at_path(dir);
            match Pdfium::bind_to_library(&candidate) {
                Ok(bindings) => {
                    info!(path = %candidate.display(), "Bound PDFium library");
                    return Ok(Self {
                        pdfium: Pdfium::new(bindings),
                        alpha,
                    });
                }
                Err(err) => debug!(path = %candidate.display(), %err, "PDFium not found here"),
            }
        }

        let bindings = Pdfium::bind_to_system_library().map_err(|err| {
            WhitecropError::Config(format!("could not find the PDFium library: {err}"))
        })?;
        info!("Bound system PDFium library");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
            alpha,
        })
    }
}

impl DocumentRenderer for PdfiumRenderer {
    #[instrument(skip(self), fields(path = %path.display()))]
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn PageSource + 'a>> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|err| WhitecropError::decode(path, err))?;
        debug!(pages = document.pages().len(), "PDF opened");
        Ok(Box::new(PdfiumPages {
            document,
            alpha: self.alpha,
        }))
    }
}

/// One open PDFium document. Dropping it closes the document.
struct PdfiumPages<'a> {
    document: PdfDocument<'a>,
    alpha: AlphaPolicy,
}

impl PageSource for PdfiumPages<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(&self, index: usize, scale: f32) -> Result<PixelBuffer> {
        let page_index = u16::try_from(index)
            .map_err(|_| WhitecropError::Render(format!("page index {index} out of range")))?;
        let page = self
            .document
            .pages()
            .get(page_index)
            .map_err(|err| WhitecropError::Render(format!("page {}: {err}", index + 1)))?;

        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = page.render_with_config(&config).map_err(|err| {
            warn!(page = index + 1, %err, "Page render failed");
            WhitecropError::Render(format!("page {}: {err}", index + 1))
        })?;

        let image: ::image::DynamicImage = bitmap.as_image();
        debug!(
            page = index + 1,
            width = image.width(),
            height = image.height(),
            scale,
            "Page rendered"
        );
        Ok(PixelBuffer::from_dynamic(image, self.alpha))
    }
}
