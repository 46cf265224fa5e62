// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Progress reporting and cooperative cancellation shared between a running
// pipeline and whoever is watching it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

use tracing::debug;
use whitecrop_core::ProgressEvent;

/// Shared flag asking a running batch to stop before its next item.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Optional sink for progress events.
#[derive(Debug, Clone, Default)]
pub(crate) struct Progress {
    sender: Option<Sender<ProgressEvent>>,
}

impl Progress {
    pub(crate) fn new(sender: Option<Sender<ProgressEvent>>) -> Self {
        Self { sender }
    }

    /// Deliver `event`. A watcher that went away is not an error.
    pub(crate) fn emit(&self, event: ProgressEvent) {
        if let Some(sender) = &self.sender {
            if sender.send(event).is_err() {
                debug!("Progress receiver dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn cancel_is_visible_through_clones() {
        let flag = CancelFlag::new();
        let watcher = flag.clone();
        assert!(!watcher.is_cancelled());
        flag.cancel();
        assert!(watcher.is_cancelled());
    }

    #[test]
    fn emit_survives_a_dropped_receiver() {
        let (tx, rx) = mpsc::channel();
        let progress = Progress::new(Some(tx));
        progress.emit(ProgressEvent::Discovered { total: 1 });
        assert_eq!(rx.recv().unwrap(), ProgressEvent::Discovered { total: 1 });

        drop(rx);
        progress.emit(ProgressEvent::Discovered { total: 2 });
        Progress::default().emit(ProgressEvent::Discovered { total: 3 });
    }
}
