// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label text parsing: split UTF-8 label text into groups of lines.

/// One label: the lines that end up together on a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelGroup {
    pub lines: Vec<String>,
}

/// Split `text` into groups separated by blank lines.
///
/// Lines are trimmed, whitespace-only lines count as separators, and runs of
/// several blank lines never yield empty groups.
pub fn parse_label_groups(text: &str) -> Vec<LabelGroup> {
    let mut groups = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in text.lines() {
        // `lines()` already strips "\r\n"; a lone trailing '\r' is trimmed too.
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                groups.push(LabelGroup {
                    lines: std::mem::take(&mut current),
                });
            }
        } else {
            current.push(line.to_string());
        }
    }
    if !current.is_empty() {
        groups.push(LabelGroup { lines: current });
    }
    groups
}
