// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output helpers: stream compression for serialised PDFs, and all-or-nothing
// file writes.

use std::io::{Cursor, Write};
use std::path::Path;

use tracing::debug;
use whitecrop_core::error::{Result, WhitecropError};

/// Compress every stream of a serialised PDF.
///
/// printpdf writes its streams uncompressed; this reparses the output with
/// lopdf, compresses, and re-saves.
pub fn compress_pdf(uncompressed: Vec<u8>) -> Result<Vec<u8>> {
    let before = uncompressed.len();
    let mut doc = lopdf::Document::load_mem(&uncompressed)
        .map_err(|err| WhitecropError::Render(format!("cannot reparse PDF for compression: {err}")))?;

    doc.compress();

    let mut output = Cursor::new(Vec::new());
    doc.save_to(&mut output)
        .map_err(|err| WhitecropError::Render(format!("cannot save compressed PDF: {err}")))?;
    let output = output.into_inner();
    debug!(before, after = output.len(), "PDF streams compressed");
    Ok(output)
}

/// Write `bytes` to `path` so that the file either appears complete or not at
/// all.
///
/// Data goes to a temporary file in the destination directory, which is then
/// renamed over `path`. Missing parent directories are created. On any error
/// the temporary file is removed and `path` is left untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|err| WhitecropError::write(path, err))?;

    let mut staging = tempfile::Builder::new()
        .prefix(".whitecrop-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|err| WhitecropError::write(path, err))?;
    staging
        .write_all(bytes)
        .and_then(|()| staging.as_file().sync_all())
        .map_err(|err| WhitecropError::write(path, err))?;
    staging
        .persist(path)
        .map_err(|err| WhitecropError::write(path, err.error))?;

    debug!(path = %path.display(), bytes = bytes.len(), "Output written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_parents_and_leaves_no_staging_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a").join("b").join("out.pdf");

        write_atomic(&target, b"%PDF-1.7 test").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"%PDF-1.7 test");
        let leftovers: Vec<_> = std::fs::read_dir(target.parent().unwrap())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn write_atomic_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.pdf");
        std::fs::write(&target, b"old").unwrap();

        write_atomic(&target, b"new").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn write_atomic_into_a_file_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let err = write_atomic(&blocker.join("out.pdf"), b"data").unwrap_err();
        assert!(matches!(err, WhitecropError::Write { .. }));
    }

    #[test]
    fn compress_rejects_non_pdf() {
        assert!(compress_pdf(b"plain text".to_vec()).is_err());
    }
}
