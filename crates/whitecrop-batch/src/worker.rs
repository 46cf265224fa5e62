// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Background worker: runs one batch job on a dedicated thread so a caller
// (a UI loop, a CLI printing progress) stays responsive. Progress arrives as
// `ProgressEvent`s over a channel; the caller never touches pipeline state.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use tracing::{debug, info};
use whitecrop_core::error::{Result, WhitecropError};
use whitecrop_core::{AppConfig, BatchReport, ProgressEvent};
use whitecrop_document::DocumentRenderer;

use crate::pipeline::BatchPipeline;
use crate::progress::CancelFlag;

/// One unit of work for the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchJob {
    /// Each image in `input_dir` becomes `output_dir/<stem>.pdf`.
    ImagesSeparately { input_dir: PathBuf, output_dir: PathBuf },
    /// Every image in `input_dir` becomes one page of `output`.
    ImagesMerged { input_dir: PathBuf, output: PathBuf },
    /// Every PDF below `input_root` is recropped into the mirrored path
    /// under `output_root`.
    PdfFolder { input_root: PathBuf, output_root: PathBuf },
    /// One PDF recropped page by page.
    PdfDocument { input: PathBuf, output: Option<PathBuf> },
}

impl BatchJob {
    /// Whether the job renders PDF pages.
    pub fn needs_renderer(&self) -> bool {
        matches!(self, Self::PdfFolder { .. } | Self::PdfDocument { .. })
    }
}

/// Spawns batch jobs on background threads.
pub struct BatchWorker {
    config: AppConfig,
    cancel: CancelFlag,
}

impl BatchWorker {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            cancel: CancelFlag::new(),
        }
    }

    /// Flag that stops the job spawned by this worker before its next item.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Start `job` on a new thread.
    ///
    /// `renderer` is invoked on the worker thread, and only for jobs that
    /// render PDF pages, so the renderer itself never crosses threads.
    pub fn spawn<F>(self, job: BatchJob, renderer: F) -> Result<BatchHandle>
    where
        F: FnOnce() -> Result<Box<dyn DocumentRenderer>> + Send + 'static,
    {
        let (sender, events) = mpsc::channel();
        let cancel = self.cancel.clone();
        let Self { config, cancel: flag } = self;

        let thread = thread::Builder::new()
            .name("whitecrop-batch".into())
            .spawn(move || {
                debug!(?job, "Batch worker started");
                let pipeline = BatchPipeline::new(config)
                    .with_progress(sender)
                    .with_cancel(flag);
                run_job(&pipeline, job, renderer)
            })?;

        info!("Batch worker spawned");
        Ok(BatchHandle {
            events,
            cancel,
            thread,
        })
    }
}

fn run_job<F>(pipeline: &BatchPipeline, job: BatchJob, renderer: F) -> Result<BatchReport>
where
    F: FnOnce() -> Result<Box<dyn DocumentRenderer>>,
{
    match job {
        BatchJob::ImagesSeparately {
            input_dir,
            output_dir,
        } => pipeline.images_separately(&input_dir, &output_dir),
        BatchJob::ImagesMerged { input_dir, output } => pipeline.images_merged(&input_dir, &output),
        BatchJob::PdfFolder {
            input_root,
            output_root,
        } => {
            let renderer = renderer()?;
            pipeline.pdf_folder(&*renderer, &input_root, &output_root)
        }
        BatchJob::PdfDocument { input, output } => {
            let renderer = renderer()?;
            pipeline.pdf_document(&*renderer, &input, output.as_deref())
        }
    }
}

/// Caller's side of a running job.
pub struct BatchHandle {
    events: Receiver<ProgressEvent>,
    cancel: CancelFlag,
    thread: JoinHandle<Result<BatchReport>>,
}

impl BatchHandle {
    /// Progress events. The channel closes when the job ends.
    pub fn events(&self) -> &Receiver<ProgressEvent> {
        &self.events
    }

    /// Ask the job to stop before its next item.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the job and return its report.
    pub fn join(self) -> Result<BatchReport> {
        self.thread
            .join()
            .map_err(|_| WhitecropError::Io(std::io::Error::other("batch worker panicked")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whitecrop_core::ItemStatus;

    use crate::testing::{ScriptedRenderer, write_png, write_script};

    fn no_renderer() -> Result<Box<dyn DocumentRenderer>> {
        Err(WhitecropError::Config("renderer not available".into()))
    }

    fn scripted() -> Result<Box<dyn DocumentRenderer>> {
        Ok(Box::new(ScriptedRenderer))
    }

    #[test]
    fn image_job_streams_events_then_reports() {
        let input = tempfile::tempdir().unwrap();
        write_png(&input.path().join("a.png"), 8, 8);
        write_png(&input.path().join("b.png"), 9, 9);
        let job = BatchJob::ImagesMerged {
            input_dir: input.path().to_path_buf(),
            output: input.path().join("all.pdf"),
        };
        assert!(!job.needs_renderer());

        let handle = BatchWorker::new(AppConfig::default()).spawn(job, no_renderer).unwrap();
        let events: Vec<ProgressEvent> = handle.events().iter().collect();
        let report = handle.join().unwrap();

        assert_eq!(events.first(), Some(&ProgressEvent::Discovered { total: 2 }));
        assert_eq!(events.last(), Some(&ProgressEvent::Finished { succeeded: 2, total: 2 }));
        assert_eq!(report.succeeded(), 2);
        assert!(input.path().join("all.pdf").exists());
    }

    #[test]
    fn pdf_job_builds_its_renderer_on_the_worker() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.pdf");
        write_script(&input, &["ok", "ok"]);
        let job = BatchJob::PdfDocument {
            input: input.clone(),
            output: None,
        };
        assert!(job.needs_renderer());

        let report = BatchWorker::new(AppConfig::default())
            .spawn(job, scripted)
            .unwrap()
            .join()
            .unwrap();
        assert_eq!((report.succeeded(), report.total()), (2, 2));
        assert!(dir.path().join("doc_cropped.pdf").exists());
    }

    #[test]
    fn missing_renderer_fails_the_job() {
        let dir = tempfile::tempdir().unwrap();
        let job = BatchJob::PdfFolder {
            input_root: dir.path().to_path_buf(),
            output_root: dir.path().join("out"),
        };
        let result = BatchWorker::new(AppConfig::default())
            .spawn(job, no_renderer)
            .unwrap()
            .join();
        assert!(matches!(result, Err(WhitecropError::Config(_))));
    }

    #[test]
    fn cancelled_worker_skips_every_item() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_png(&input.path().join("a.png"), 8, 8);

        let worker = BatchWorker::new(AppConfig::default());
        worker.cancel_flag().cancel();
        let job = BatchJob::ImagesSeparately {
            input_dir: input.path().to_path_buf(),
            output_dir: output.path().to_path_buf(),
        };
        let report = worker.spawn(job, no_renderer).unwrap().join().unwrap();

        assert_eq!(report.items[0].status, ItemStatus::Failed("cancelled".into()));
        assert!(!output.path().join("a.pdf").exists());
    }
}
