// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Input discovery: turns an input location into an ordered list of batch
// items before any processing starts. Discovery failures are the only errors
// that abort a whole run.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};
use whitecrop_core::error::{Result, WhitecropError};
use whitecrop_core::{AppConfig, BatchItem};

/// Image files directly inside `dir` whose extension is accepted by
/// `config`, sorted by file name. Subdirectories are not searched.
#[instrument(skip(config), fields(dir = %dir.display()))]
pub fn discover_images(dir: &Path, config: &AppConfig) -> Result<Vec<BatchItem>> {
    let mut files: Vec<PathBuf> = read_dir_sorted(dir)?
        .into_iter()
        .filter(|path| path.is_file() && config.is_image_path(path))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    info!(count = files.len(), "Discovered images");
    Ok(files
        .into_iter()
        .map(|path| {
            let name = path.file_name().map(PathBuf::from).unwrap_or_default();
            BatchItem::file(path, name)
        })
        .collect())
}

/// Every `.pdf` file (case-insensitive) below `root`, at any depth, with its
/// path relative to `root`. Sorted by relative path.
///
/// Symbolic links to folders are not followed, so link cycles cannot recurse.
/// Linked files are still collected.
#[instrument(fields(root = %root.display()))]
pub fn discover_pdfs(root: &Path) -> Result<Vec<BatchItem>> {
    let mut found = Vec::new();
    walk_pdfs(root, &mut found)?;

    let mut items: Vec<BatchItem> = found
        .into_iter()
        .filter_map(|path| {
            let relative = path.strip_prefix(root).ok()?.to_path_buf();
            Some(BatchItem::file(path, relative))
        })
        .collect();
    items.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    info!(count = items.len(), "Discovered PDF files");
    Ok(items)
}

/// Whether `path` ends in `.pdf`, ignoring case.
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Check that a single input document exists before a run starts.
pub fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(WhitecropError::Discovery(format!(
            "input file {} does not exist",
            path.display()
        )))
    }
}

fn walk_pdfs(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    for path in read_dir_sorted(dir)? {
        if path.is_dir() {
            if is_symlink(&path) {
                debug!(path = %path.display(), "Not following linked folder");
                continue;
            }
            walk_pdfs(&path, found)?;
        } else if path.is_file() && is_pdf_path(&path) {
            debug!(path = %path.display(), "Found PDF");
            found.push(path);
        }
    }
    Ok(())
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink())
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(WhitecropError::Discovery(format!(
            "input folder {} does not exist",
            dir.display()
        )));
    }
    let entries = fs::read_dir(dir).map_err(|err| {
        WhitecropError::Discovery(format!("cannot list {}: {err}", dir.display()))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            WhitecropError::Discovery(format!("cannot list {}: {err}", dir.display()))
        })?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}
