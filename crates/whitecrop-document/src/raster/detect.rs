// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content bounding-box detection.
//
// A single pass over the buffer records, per row and per column, whether any
// content pixel is present. The four boundaries are then plain searches over
// those two summaries, so the cost is one full-frame read plus O(width +
// height) regardless of where the content sits.

use tracing::{debug, instrument};

use super::buffer::{CHANNELS, PixelBuffer};

/// Tightest rectangle enclosing all content pixels, in inclusive pixel
/// coordinates, or `Empty` when no usable region exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundingBox {
    Empty,
    Region {
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
    },
}

impl BoundingBox {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Width and height of the region; `None` for `Empty`.
    pub fn size(&self) -> Option<(u32, u32)> {
        match *self {
            Self::Empty => None,
            Self::Region {
                left,
                top,
                right,
                bottom,
            } => Some((right - left + 1, bottom - top + 1)),
        }
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Empty => write!(f, "empty"),
            Self::Region {
                left,
                top,
                right,
                bottom,
            } => write!(f, "{left},{top}..{right},{bottom}"),
        }
    }
}

/// Per-row and per-column "has content" summaries of one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentProfile {
    rows: Vec<bool>,
    columns: Vec<bool>,
}

impl ContentProfile {
    pub fn rows(&self) -> &[bool] {
        &self.rows
    }

    pub fn columns(&self) -> &[bool] {
        &self.columns
    }

    /// Derive the bounding box from the summaries.
    ///
    /// Degenerate regions (`left >= right` or `top >= bottom`) are reported as
    /// `Empty`, so a lone content row or column does not trigger a crop.
    pub fn bounds(&self) -> BoundingBox {
        let (Some(top), Some(bottom), Some(left), Some(right)) = (
            first_set(&self.rows),
            last_set(&self.rows),
            first_set(&self.columns),
            last_set(&self.columns),
        ) else {
            return BoundingBox::Empty;
        };

        if left >= right || top >= bottom {
            return BoundingBox::Empty;
        }
        BoundingBox::Region {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Classifies pixels against a white threshold and finds the content region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBoxDetector {
    white_threshold: u8,
}

impl BoundingBoxDetector {
    pub fn new(white_threshold: u8) -> Self {
        Self { white_threshold }
    }

    pub fn white_threshold(&self) -> u8 {
        self.white_threshold
    }

    /// A pixel is background iff every channel is at or above the threshold.
    pub fn is_background(&self, rgb: &[u8]) -> bool {
        rgb.iter().all(|&channel| channel >= self.white_threshold)
    }

    /// Build the row/column content summaries in one pass.
    pub fn profile(&self, buffer: &PixelBuffer) -> ContentProfile {
        let (width, height) = buffer.dimensions();
        let mut rows = vec![false; height as usize];
        let mut columns = vec![false; width as usize];

        if buffer.is_empty() {
            return ContentProfile { rows, columns };
        }

        for (y, row) in buffer.rows().enumerate() {
            for (x, rgb) in row.chunks_exact(CHANNELS).enumerate() {
                if !self.is_background(rgb) {
                    rows[y] = true;
                    columns[x] = true;
                }
            }
        }
        ContentProfile { rows, columns }
    }

    /// Find the minimal axis-aligned rectangle enclosing all content pixels.
    #[instrument(skip_all, fields(width = buffer.width(), height = buffer.height(), threshold = self.white_threshold))]
    pub fn detect(&self, buffer: &PixelBuffer) -> BoundingBox {
        let bounds = self.profile(buffer).bounds();
        debug!(%bounds, "Content bounds detected");
        bounds
    }
}

fn first_set(flags: &[bool]) -> Option<u32> {
    flags.iter().position(|&set| set).map(|index| index as u32)
}

fn last_set(flags: &[bool]) -> Option<u32> {
    flags.iter().rposition(|&set| set).map(|index| index as u32)
}
