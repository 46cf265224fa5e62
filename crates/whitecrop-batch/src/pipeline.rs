// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch pipeline: drives discovered items through rasterise, detect, crop
// and compose, one item at a time in discovery order.
//
// A failing item is recorded and skipped; the run always attempts every
// item. Only discovery errors abort a run. Outputs shared by several items
// (a merged document, a recropped multi-page document) are written once at
// the end, and a failure to write them fails every item that fed them.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};
use whitecrop_core::error::{Result, WhitecropError};
use whitecrop_core::{AppConfig, BatchItem, BatchReport, ProgressEvent};
use whitecrop_document::{
    BoundingBoxDetector, DocumentRenderer, ImageRasterizer, PageComposer, PageSource, Trimmed,
    trim,
};

use crate::discovery::{discover_images, discover_pdfs, require_file};
use crate::progress::{CancelFlag, Progress};

/// `dir/report.pdf` becomes `dir/report_cropped.pdf`.
pub fn sibling_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    input.with_file_name(format!("{stem}_cropped.pdf"))
}

/// Runs whole batches with one configuration.
pub struct BatchPipeline {
    config: AppConfig,
    images: ImageRasterizer,
    image_detector: BoundingBoxDetector,
    page_detector: BoundingBoxDetector,
    progress: Progress,
    cancel: CancelFlag,
}

impl BatchPipeline {
    pub fn new(config: AppConfig) -> Self {
        Self {
            images: ImageRasterizer::new(config.image_policy.alpha),
            image_detector: BoundingBoxDetector::new(config.image_policy.white_threshold),
            page_detector: BoundingBoxDetector::new(config.pdf_policy.white_threshold),
            progress: Progress::default(),
            cancel: CancelFlag::default(),
            config,
        }
    }

    /// Deliver progress events to `sender` while running.
    pub fn with_progress(mut self, sender: Sender<ProgressEvent>) -> Self {
        self.progress = Progress::new(Some(sender));
        self
    }

    /// Stop before the next item once `cancel` is set.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    // -- Image modes ----------------------------------------------------------

    /// Crop every image in `input_dir` into its own single-page PDF,
    /// `output_dir/<stem>.pdf`.
    #[instrument(skip(self), fields(input = %input_dir.display(), output = %output_dir.display()))]
    pub fn images_separately(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchReport> {
        let started_at = Utc::now();
        let items = discover_images(input_dir, &self.config)?
            .into_iter()
            .map(|item| {
                let output = output_dir.join(item.relative_path.with_extension("pdf"));
                item.with_output(output)
            })
            .collect();

        let items = self.run_items(items, |_, item| {
            let trimmed = self.trim_image(&item.source_path)?;
            item.trimmed = trimmed.was_cropped();

            let output = planned_output(item)?;
            let mut composer = PageComposer::new(&document_title(&item.source_path), self.config.output);
            composer.append_page(trimmed.buffer)?;
            composer.save(&output)
        });
        Ok(self.finish(items, started_at))
    }

    /// Crop every image in `input_dir` into one page each of `output`.
    pub fn images_merged(&self, input_dir: &Path, output: &Path) -> Result<BatchReport> {
        let items = discover_images(input_dir, &self.config)?;
        self.merge_items(items, output)
    }

    /// Crop an explicit list of images, in the given order, into one page
    /// each of `output`.
    pub fn merge_images(&self, files: &[PathBuf], output: &Path) -> Result<BatchReport> {
        let items = files
            .iter()
            .map(|path| {
                let name = path.file_name().map(PathBuf::from).unwrap_or_else(|| path.clone());
                BatchItem::file(path, name)
            })
            .collect();
        self.merge_items(items, output)
    }

    #[instrument(skip(self, items), fields(output = %output.display(), count = items.len()))]
    fn merge_items(&self, items: Vec<BatchItem>, output: &Path) -> Result<BatchReport> {
        let started_at = Utc::now();
        let items = items.into_iter().map(|item| item.with_output(output)).collect();

        let mut composer = PageComposer::new(&document_title(output), self.config.output);
        let mut items = self.run_items(items, |_, item| {
            let trimmed = self.trim_image(&item.source_path)?;
            item.trimmed = trimmed.was_cropped();
            composer.append_page(trimmed.buffer)
        });

        if composer.page_count() == 0 {
            warn!("No image could be processed, merged document not written");
        } else if let Err(err) = composer.save(output) {
            warn!(%err, "Merged document could not be written");
            invalidate_all(&mut items, &err.to_string());
        }
        Ok(self.finish(items, started_at))
    }

    // -- PDF modes ------------------------------------------------------------

    /// Recrop every PDF below `input_root` into the same relative path
    /// under `output_root`. One item per file.
    #[instrument(skip(self, renderer), fields(input = %input_root.display(), output = %output_root.display()))]
    pub fn pdf_folder(
        &self,
        renderer: &dyn DocumentRenderer,
        input_root: &Path,
        output_root: &Path,
    ) -> Result<BatchReport> {
        let started_at = Utc::now();
        let items = discover_pdfs(input_root)?
            .into_iter()
            .map(|item| {
                let output = output_root.join(&item.relative_path);
                item.with_output(output)
            })
            .collect();
        fs::create_dir_all(output_root).map_err(|err| WhitecropError::write(output_root, err))?;

        let items = self.run_items(items, |_, item| {
            let output = planned_output(item)?;
            item.trimmed = self.recrop_document(renderer, &item.source_path, &output)?;
            Ok(())
        });
        Ok(self.finish(items, started_at))
    }

    /// Recrop one PDF page by page into `output`, or into
    /// [`sibling_output_path`] when none is given. One item per page; the
    /// document is written only if every page succeeds.
    #[instrument(skip(self, renderer, output), fields(input = %input.display()))]
    pub fn pdf_document(
        &self,
        renderer: &dyn DocumentRenderer,
        input: &Path,
        output: Option<&Path>,
    ) -> Result<BatchReport> {
        require_file(input)?;
        let started_at = Utc::now();
        let output = output.map_or_else(|| sibling_output_path(input), Path::to_path_buf);
        let whole_file = || {
            let name = input.file_name().map(PathBuf::from).unwrap_or_default();
            BatchItem::file(input, name).with_output(&output)
        };

        let source = match renderer.open(input) {
            Ok(source) => source,
            Err(err) => {
                let items = self.fail_single(whole_file(), err);
                return Ok(self.finish(items, started_at));
            }
        };
        let page_count = source.page_count();
        if page_count == 0 {
            let err = WhitecropError::EmptyInput("document has no pages".into());
            let items = self.fail_single(whole_file(), err);
            return Ok(self.finish(items, started_at));
        }

        let items = (0..page_count)
            .map(|index| BatchItem::page(input, index).with_output(&output))
            .collect();
        let mut composer = PageComposer::new(&document_title(input), self.config.output);
        let mut items = self.run_items(items, |index, item| {
            let trimmed = self.trim_page(&*source, index)?;
            item.trimmed = trimmed.was_cropped();
            composer.append_page(trimmed.buffer)
        });
        drop(source);

        if let Some(first) = items.iter().find(|item| !item.status.is_success()) {
            let reason = format!("document not written: {} failed", first.label());
            warn!("{reason}");
            invalidate_all(&mut items, &reason);
        } else if let Err(err) = composer.save(&output) {
            warn!(%err, "Recropped document could not be written");
            invalidate_all(&mut items, &err.to_string());
        }
        Ok(self.finish(items, started_at))
    }

    // -- Stages ---------------------------------------------------------------

    fn trim_image(&self, path: &Path) -> Result<Trimmed> {
        let buffer = self.images.rasterize(path)?;
        trim(buffer, &self.image_detector)
    }

    fn trim_page(&self, source: &dyn PageSource, index: usize) -> Result<Trimmed> {
        let buffer = source.render_page(index, self.config.render_scale)?;
        trim(buffer, &self.page_detector)
    }

    /// Recrop every page of `input` into `output`. Returns whether any page
    /// was actually cropped. Nothing is written unless every page succeeds.
    fn recrop_document(
        &self,
        renderer: &dyn DocumentRenderer,
        input: &Path,
        output: &Path,
    ) -> Result<bool> {
        let source = renderer.open(input)?;
        let (composer, any_cropped) = self.compose_pages(source, &document_title(input))?;
        composer.save(output)?;
        Ok(any_cropped)
    }

    /// Trim every page of `source` into a fresh composer. The source is
    /// closed on return, before anything is written.
    fn compose_pages(
        &self,
        source: Box<dyn PageSource + '_>,
        title: &str,
    ) -> Result<(PageComposer, bool)> {
        let mut composer = PageComposer::new(title, self.config.output);
        let mut any_cropped = false;
        for index in 0..source.page_count() {
            let trimmed = self.trim_page(&*source, index)?;
            any_cropped |= trimmed.was_cropped();
            composer.append_page(trimmed.buffer)?;
        }
        drop(source);
        Ok((composer, any_cropped))
    }

    // -- Bookkeeping ----------------------------------------------------------

    /// Attempt every item in order, recording a terminal status on each.
    fn run_items<F>(&self, mut items: Vec<BatchItem>, mut process: F) -> Vec<BatchItem>
    where
        F: FnMut(usize, &mut BatchItem) -> Result<()>,
    {
        let total = items.len();
        self.progress.emit(ProgressEvent::Discovered { total });

        for (index, item) in items.iter_mut().enumerate() {
            let label = item.label();
            if self.cancel.is_cancelled() {
                item.fail(WhitecropError::Cancelled.to_string());
            } else {
                self.progress.emit(ProgressEvent::ItemStarted {
                    index,
                    total,
                    label: label.clone(),
                });
                match process(index, item) {
                    Ok(()) => {
                        item.succeed();
                        info!(item = %label, trimmed = item.trimmed, "Item processed");
                    }
                    Err(err) => {
                        warn!(item = %label, %err, "Item failed");
                        item.fail(err.to_string());
                    }
                }
            }
            self.progress.emit(ProgressEvent::ItemFinished {
                index,
                label,
                status: item.status.clone(),
            });
        }
        items
    }

    /// Report a run whose only item failed before page processing began.
    fn fail_single(&self, item: BatchItem, err: WhitecropError) -> Vec<BatchItem> {
        let mut err = Some(err);
        self.run_items(vec![item], |_, _| Err(err.take().unwrap_or(WhitecropError::Cancelled)))
    }

    fn finish(&self, items: Vec<BatchItem>, started_at: DateTime<Utc>) -> BatchReport {
        let report = BatchReport::new(items, started_at);
        self.progress.emit(ProgressEvent::Finished {
            succeeded: report.succeeded(),
            total: report.total(),
        });
        info!(%report, "Batch finished");
        report
    }
}

fn planned_output(item: &BatchItem) -> Result<PathBuf> {
    item.output_path
        .clone()
        .ok_or_else(|| WhitecropError::Config(format!("no output path for {}", item.label())))
}

fn invalidate_all(items: &mut [BatchItem], reason: &str) {
    for item in items {
        item.invalidate(reason);
    }
}

fn document_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Whitecrop".to_string())
}
