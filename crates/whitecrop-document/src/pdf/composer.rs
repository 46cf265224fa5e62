// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page composer: emits cropped pixel buffers as PDF pages using `printpdf`
// 0.8.
//
// Each page is sized to its own buffer at one pixel per point, and the buffer
// is embedded losslessly as the page's only graphic. Pages in one document may
// therefore have different sizes.

use std::path::Path;

use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument};
use whitecrop_core::OutputSettings;
use whitecrop_core::error::{Result, WhitecropError};

use super::output::{compress_pdf, write_atomic};
use crate::raster::PixelBuffer;

/// Millimetres per PDF point.
const MM_PER_PT: f32 = 25.4 / 72.0;

/// Converts a length in points to printpdf's millimetre unit.
pub(crate) fn pt_to_mm(points: f32) -> Mm {
    Mm(points * MM_PER_PT)
}

/// Accumulates composite pages and finalises them as one document.
///
/// Nothing touches the filesystem until [`PageComposer::save`]; dropping an
/// unfinished composer discards every page.
pub struct PageComposer {
    document: PdfDocument,
    pages: Vec<PdfPage>,
    settings: OutputSettings,
}

impl PageComposer {
    pub fn new(title: &str, settings: OutputSettings) -> Self {
        Self {
            document: PdfDocument::new(title),
            pages: Vec::new(),
            settings,
        }
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append one page sized exactly to `buffer`, which becomes the page's
    /// sole graphic.
    #[instrument(skip_all, fields(width = buffer.width(), height = buffer.height()))]
    pub fn append_page(&mut self, buffer: PixelBuffer) -> Result<()> {
        if buffer.is_empty() {
            return Err(WhitecropError::EmptyInput(
                "cannot compose a zero-sized page".into(),
            ));
        }
        let (width, height) = buffer.dimensions();

        let raw = RawImage {
            pixels: RawImageData::U8(buffer.into_samples()),
            width: width as usize,
            height: height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let xobject_id = self.document.add_image(&raw);

        // At `dpi`, printpdf draws the image at width * 72 / dpi points; scale
        // it back up so one pixel covers one point.
        let dpi = self.settings.dpi;
        let scale = dpi / 72.0;
        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(0.0)),
                translate_y: Some(Pt(0.0)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(dpi),
                rotate: None,
            },
        }];

        self.pages.push(PdfPage::new(
            pt_to_mm(width as f32),
            pt_to_mm(height as f32),
            ops,
        ));
        debug!(page = self.pages.len(), "Page appended");
        Ok(())
    }

    /// Serialise the document. Fails if no page was appended.
    pub fn finish(self) -> Result<Vec<u8>> {
        let Self {
            mut document,
            pages,
            settings,
        } = self;
        if pages.is_empty() {
            return Err(WhitecropError::EmptyInput("document has no pages".into()));
        }
        let page_count = pages.len();
        document.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = document.save(&PdfSaveOptions::default(), &mut warnings);
        debug!(page_count, warnings = warnings.len(), bytes = bytes.len(), "Document serialised");

        if settings.compress {
            compress_pdf(bytes)
        } else {
            Ok(bytes)
        }
    }

    /// Serialise and write the document to `path` atomically.
    #[instrument(skip(self), fields(path = %path.display(), pages = self.pages.len()))]
    pub fn save(self, path: &Path) -> Result<()> {
        let pages = self.pages.len();
        let bytes = self.finish()?;
        write_atomic(path, &bytes)?;
        info!(pages, "Wrote PDF to {}", path.display());
        Ok(())
    }
}
