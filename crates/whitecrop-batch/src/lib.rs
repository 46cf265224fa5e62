// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// whitecrop-batch: Input discovery, the batch pipeline, and the background
// worker that runs it.

pub mod discovery;
pub mod pipeline;
pub mod progress;
pub mod worker;

#[cfg(test)]
mod testing;

pub use discovery::{discover_images, discover_pdfs, is_pdf_path};
pub use pipeline::{BatchPipeline, sibling_output_path};
pub use progress::CancelFlag;
pub use worker::{BatchHandle, BatchJob, BatchWorker};
