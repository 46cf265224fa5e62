// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF inspector: open an existing PDF with `lopdf` and report its page
// count and page sizes.

use std::path::Path;

use lopdf::{Document, Object, ObjectId};
use tracing::{debug, info, instrument};
use whitecrop_core::error::{Result, WhitecropError};

/// Read-only view of an existing PDF file.
pub struct PdfInspector {
    document: Document,
}

impl PdfInspector {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| WhitecropError::decode(path_ref, err))?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self { document })
    }

    /// Load a PDF already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| WhitecropError::Decode {
            path: "<memory>".into(),
            reason: err.to_string(),
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Width and height, in points, of every page in page order.
    pub fn page_sizes(&self) -> Result<Vec<(f32, f32)>> {
        self.document
            .get_pages()
            .into_values()
            .map(|page_id| {
                let [x0, y0, x1, y1] = self.media_box(page_id)?;
                Ok(((x1 - x0).abs(), (y1 - y0).abs()))
            })
            .collect()
    }

    // -- Helpers --------------------------------------------------------------

    /// The page's /MediaBox, following /Parent links for inherited values.
    fn media_box(&self, page_id: ObjectId) -> Result<[f32; 4]> {
        let mut current = Some(page_id);
        while let Some(id) = current {
            let dict = self
                .document
                .get_dictionary(id)
                .map_err(|err| pdf_err(format!("cannot read page object {id:?}: {err}")))?;

            if let Ok(entry) = dict.get(b"MediaBox") {
                let (_, resolved) = self
                    .document
                    .dereference(entry)
                    .map_err(|err| pdf_err(format!("cannot resolve /MediaBox: {err}")))?;
                return rectangle(resolved);
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok();
        }
        Err(pdf_err(format!("page {page_id:?} has no /MediaBox")))
    }
}

fn rectangle(object: &Object) -> Result<[f32; 4]> {
    let values = object
        .as_array()
        .map_err(|err| pdf_err(format!("/MediaBox is not an array: {err}")))?;
    if values.len() != 4 {
        return Err(pdf_err(format!("/MediaBox has {} entries", values.len())));
    }
    let mut rect = [0.0f32; 4];
    for (slot, value) in rect.iter_mut().zip(values) {
        *slot = match value {
            Object::Integer(int) => *int as f32,
            Object::Real(real) => *real as f32,
            other => return Err(pdf_err(format!("non-numeric /MediaBox entry {other:?}"))),
        };
    }
    Ok(rect)
}

fn pdf_err(reason: String) -> WhitecropError {
    WhitecropError::Render(reason)
}
