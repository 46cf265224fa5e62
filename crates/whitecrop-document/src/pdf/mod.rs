// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: composing image pages into new documents, inspecting existing
// documents, and writing output files safely.

pub mod composer;
pub mod output;
pub mod reader;

pub use composer::PageComposer;
pub use output::{compress_pdf, write_atomic};
pub use reader::PdfInspector;
