// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// whitecrop-document: Raster and document processing for Whitecrop.
//
// Provides the pixel buffer model, content bounding-box detection and
// cropping, image and PDF page rasterisation, composition of cropped buffers
// into PDF pages, PDF inspection, and the label layout generator.

pub mod label;
pub mod pdf;
pub mod raster;
pub mod render;

// Re-export the primary types so callers can use `whitecrop_document::PageComposer` etc.
pub use label::{
    EmbeddedFont, LabelFont, LabelLayoutEngine, LabelWriter, LayoutPlan, TextMeasure,
    parse_label_groups,
};
pub use pdf::{PageComposer, PdfInspector, write_atomic};
pub use raster::{BoundingBox, BoundingBoxDetector, PixelBuffer, Trimmed, crop, trim};
pub use render::{DocumentRenderer, ImageRasterizer, PageSource, PdfiumRenderer};
