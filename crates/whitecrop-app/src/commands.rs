// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand handlers. Batch commands run on the background worker and log
// progress as it arrives; the summary goes to stdout.

use std::path::Path;

use tracing::{info, warn};
use whitecrop_batch::{BatchJob, BatchWorker};
use whitecrop_core::error::Result;
use whitecrop_core::{AppConfig, BatchReport, ItemStatus, ProgressEvent};
use whitecrop_document::{DocumentRenderer, LabelWriter, PdfInspector, PdfiumRenderer};

/// Run `job` to completion, logging progress, and print its summary.
pub fn run_batch(config: AppConfig, job: BatchJob, json: bool) -> Result<()> {
    let library_dirs = config.pdfium_library_dirs.clone();
    let alpha = config.pdf_policy.alpha;
    let renderer = move || -> Result<Box<dyn DocumentRenderer>> {
        Ok(Box::new(PdfiumRenderer::bind(&library_dirs, alpha)?))
    };

    let handle = BatchWorker::new(config).spawn(job, renderer)?;
    for event in handle.events() {
        log_event(&event);
    }
    let report = handle.join()?;
    print_report(&report, json)
}

/// Generate the label PDF for `input` into `output`.
pub fn run_labels(config: &AppConfig, input: &Path, output: &Path, json: bool) -> Result<()> {
    let pages = LabelWriter::new(config.label.clone(), config.output).write_file(input, output)?;
    if json {
        let summary = serde_json::json!({ "output": output.display().to_string(), "pages": pages });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{pages} label page(s) written to {}", output.display());
    }
    Ok(())
}

/// Print page count and page sizes of `file`.
pub fn run_inspect(file: &Path, json: bool) -> Result<()> {
    let inspector = PdfInspector::open(file)?;
    let sizes = inspector.page_sizes()?;
    if json {
        let pages: Vec<_> = sizes
            .iter()
            .map(|&(width, height)| serde_json::json!({ "width": width, "height": height }))
            .collect();
        let summary = serde_json::json!({ "path": file.display().to_string(), "page_count": sizes.len(), "pages": pages });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}: {} page(s)", file.display(), inspector.page_count());
        for (index, (width, height)) in sizes.iter().enumerate() {
            println!("  page {}: {width:.1} x {height:.1} pt", index + 1);
        }
    }
    Ok(())
}

fn log_event(event: &ProgressEvent) {
    match event {
        ProgressEvent::Discovered { total } => info!(total, "Inputs discovered"),
        ProgressEvent::ItemStarted { index, total, label } => {
            info!("[{}/{}] {label}", index + 1, total);
        }
        ProgressEvent::ItemFinished { label, status, .. } => match status {
            ItemStatus::Failed(reason) => warn!("failed: {label}: {reason}"),
            _ => info!("done: {label}"),
        },
        ProgressEvent::Finished { succeeded, total } => info!(succeeded, total, "Run finished"),
    }
}

fn print_report(report: &BatchReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    println!("{report}");
    for (item, reason) in report.failures() {
        println!("  failed: {}: {reason}", item.label());
    }
    Ok(())
}
