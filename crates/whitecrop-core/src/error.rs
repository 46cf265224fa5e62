// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Whitecrop.

use thiserror::Error;

/// Top-level error type for all Whitecrop operations.
#[derive(Debug, Error)]
pub enum WhitecropError {
    // -- Run-level errors (abort before any item is processed) --
    #[error("input discovery failed: {0}")]
    Discovery(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Item-level errors --
    #[error("cannot decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("document render failed: {0}")]
    Render(String),

    #[error("cannot write {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("region {left},{top}..{right},{bottom} lies outside a {width}x{height} buffer")]
    InvalidRegion {
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
        width: u32,
        height: u32,
    },

    #[error("pixel buffer holds {actual} samples, expected {expected}")]
    InvalidBuffer { expected: usize, actual: usize },

    #[error("nothing to process: {0}")]
    EmptyInput(String),

    #[error("cancelled")]
    Cancelled,

    // -- Plumbing --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WhitecropError {
    /// Shorthand for a [`WhitecropError::Decode`] on a filesystem path.
    pub fn decode(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Shorthand for a [`WhitecropError::Write`] on a filesystem path.
    pub fn write(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        Self::Write {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error must abort a whole batch run rather than a single item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Discovery(_) | Self::Config(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WhitecropError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn decode_message_names_the_path() {
        let err = WhitecropError::decode(Path::new("scans/a.png"), "truncated header");
        assert_eq!(err.to_string(), "cannot decode scans/a.png: truncated header");
        assert!(!err.is_fatal());
    }

    #[test]
    fn discovery_is_fatal() {
        assert!(WhitecropError::Discovery("missing".into()).is_fatal());
        assert!(!WhitecropError::Render("bad xref".into()).is_fatal());
    }
}
