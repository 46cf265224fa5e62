// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch data model: work items, their terminal status, progress events, and
// the per-run summary report.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle states of a batch item.
///
/// An item starts `Pending` and moves exactly once to `Success` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Success,
    Failed(String),
}

impl ItemStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// One unit of work: an image file, a PDF file, or one page of a PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    /// Absolute or caller-relative path of the source file.
    pub source_path: PathBuf,
    /// Path relative to the discovery root; mirrored under the output root.
    pub relative_path: PathBuf,
    /// Zero-based page index for items that are one page of a document.
    pub page_index: Option<usize>,
    /// Where the output for this item was (or will be) written.
    pub output_path: Option<PathBuf>,
    /// Whether a content region was found and the item was actually cropped.
    /// `false` after an empty-content fallback to the uncropped buffer.
    pub trimmed: bool,
    pub status: ItemStatus,
}

impl BatchItem {
    /// A pending item for a whole file.
    pub fn file(source_path: impl Into<PathBuf>, relative_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            relative_path: relative_path.into(),
            page_index: None,
            output_path: None,
            trimmed: false,
            status: ItemStatus::Pending,
        }
    }

    /// A pending item for one page of a document.
    pub fn page(source_path: impl Into<PathBuf>, page_index: usize) -> Self {
        let source_path = source_path.into();
        let relative_path = source_path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| source_path.clone());
        Self {
            source_path,
            relative_path,
            page_index: Some(page_index),
            output_path: None,
            trimmed: false,
            status: ItemStatus::Pending,
        }
    }

    pub fn with_output(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(output_path.into());
        self
    }

    /// Move to `Success`. Has no effect on an item that is already terminal.
    pub fn succeed(&mut self) {
        if !self.status.is_terminal() {
            self.status = ItemStatus::Success;
        }
    }

    /// Move to `Failed`. Has no effect on an item that is already terminal.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if !self.status.is_terminal() {
            self.status = ItemStatus::Failed(reason.into());
        }
    }

    /// Revoke a success after the shared document this item contributed to
    /// could not be written. Items that already failed keep their reason.
    pub fn invalidate(&mut self, reason: impl Into<String>) {
        if self.status.is_success() {
            self.status = ItemStatus::Failed(reason.into());
        }
    }

    /// Short human-readable name used in logs and progress messages.
    pub fn label(&self) -> String {
        match self.page_index {
            Some(index) => format!("{} (page {})", self.relative_path.display(), index + 1),
            None => self.relative_path.display().to_string(),
        }
    }
}

/// Messages delivered from a running batch to whoever is watching it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Discovery finished; `total` items will be attempted.
    Discovered { total: usize },
    /// Processing of item `index` (zero-based) has begun.
    ItemStarted {
        index: usize,
        total: usize,
        label: String,
    },
    /// Item `index` reached a terminal status.
    ItemFinished {
        index: usize,
        label: String,
        status: ItemStatus,
    },
    /// The run is over.
    Finished { succeeded: usize, total: usize },
}

/// Summary of one batch run. Kept only for reporting; never persisted
/// between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn new(items: Vec<BatchItem>, started_at: DateTime<Utc>) -> Self {
        Self {
            items,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|item| item.status.is_success()).count()
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Failed items paired with their reasons, in discovery order.
    pub fn failures(&self) -> Vec<(&BatchItem, &str)> {
        self.items
            .iter()
            .filter_map(|item| match &item.status {
                ItemStatus::Failed(reason) => Some((item, reason.as_str())),
                _ => None,
            })
            .collect()
    }
}

impl std::fmt::Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} succeeded", self.succeeded(), self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_moves_to_terminal_once() {
        let mut item = BatchItem::file("in/a.png", "a.png");
        assert_eq!(item.status, ItemStatus::Pending);

        item.fail("corrupt header");
        item.succeed();
        assert_eq!(item.status, ItemStatus::Failed("corrupt header".into()));
    }

    #[test]
    fn invalidate_only_touches_successes() {
        let mut merged = BatchItem::file("a.png", "a.png");
        merged.succeed();
        merged.invalidate("merged document not written");
        assert_eq!(merged.status, ItemStatus::Failed("merged document not written".into()));

        let mut broken = BatchItem::file("b.png", "b.png");
        broken.fail("corrupt");
        broken.invalidate("merged document not written");
        assert_eq!(broken.status, ItemStatus::Failed("corrupt".into()));

        let mut pending = BatchItem::file("c.png", "c.png");
        pending.invalidate("merged document not written");
        assert_eq!(pending.status, ItemStatus::Pending);
    }

    #[test]
    fn page_item_label_is_one_based() {
        let item = BatchItem::page("docs/report.pdf", 2);
        assert_eq!(item.relative_path, PathBuf::from("report.pdf"));
        assert_eq!(item.label(), "report.pdf (page 3)");
    }

    #[test]
    fn report_counts_and_failures() {
        let mut ok = BatchItem::file("a.png", "a.png");
        ok.succeed();
        let mut bad = BatchItem::file("b.png", "b.png");
        bad.fail("unreadable");
        let report = BatchReport::new(vec![ok, bad], Utc::now());

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.total(), 2);
        assert_eq!(report.to_string(), "1/2 succeeded");

        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].1, "unreadable");
    }

    #[test]
    fn status_serialises_with_reason() {
        let json = serde_json::to_string(&ItemStatus::Failed("disk full".into())).unwrap();
        assert_eq!(json, r#"{"state":"failed","reason":"disk full"}"#);
    }
}
