// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cropper: cuts a detected bounding box out of a pixel buffer, and the
// detect-then-crop step shared by every input kind.

use tracing::{debug, instrument, warn};
use whitecrop_core::error::{Result, WhitecropError};

use super::buffer::{CHANNELS, PixelBuffer};
use super::detect::{BoundingBox, BoundingBoxDetector};

/// Cut `bounds` out of `buffer`.
///
/// `Empty` is the identity: the input buffer is returned untouched. A region
/// that does not fit inside the buffer is rejected rather than clamped.
pub fn crop(buffer: PixelBuffer, bounds: BoundingBox) -> Result<PixelBuffer> {
    let BoundingBox::Region {
        left,
        top,
        right,
        bottom,
    } = bounds
    else {
        return Ok(buffer);
    };

    let (width, height) = buffer.dimensions();
    if left > right || top > bottom || right >= width || bottom >= height {
        return Err(WhitecropError::InvalidRegion {
            left,
            top,
            right,
            bottom,
            width,
            height,
        });
    }

    // Whole-frame regions need no copy.
    if left == 0 && top == 0 && right + 1 == width && bottom + 1 == height {
        return Ok(buffer);
    }

    let out_width = right - left + 1;
    let out_height = bottom - top + 1;
    let start = left as usize * CHANNELS;
    let end = (right as usize + 1) * CHANNELS;

    let mut samples = Vec::with_capacity(out_width as usize * out_height as usize * CHANNELS);
    for row in buffer.rows().skip(top as usize).take(out_height as usize) {
        samples.extend_from_slice(&row[start..end]);
    }
    PixelBuffer::from_raw(out_width, out_height, samples)
}

/// Result of trimming one buffer.
#[derive(Debug)]
pub struct Trimmed {
    pub buffer: PixelBuffer,
    pub bounds: BoundingBox,
}

impl Trimmed {
    /// Whether a content region was found and applied.
    pub fn was_cropped(&self) -> bool {
        !self.bounds.is_empty()
    }
}

/// Detect the content region of `buffer` and crop to it.
///
/// When no content is found the original buffer is kept, never treated as a
/// failure.
#[instrument(skip_all, fields(threshold = detector.white_threshold()))]
pub fn trim(buffer: PixelBuffer, detector: &BoundingBoxDetector) -> Result<Trimmed> {
    let original = buffer.dimensions();
    let bounds = detector.detect(&buffer);
    if bounds.is_empty() {
        warn!(
            width = original.0,
            height = original.1,
            "No content region found, keeping uncropped image"
        );
    }
    let buffer = crop(buffer, bounds)?;
    debug!(
        from_w = original.0,
        from_h = original.1,
        to_w = buffer.width(),
        to_h = buffer.height(),
        "Trim complete"
    );
    Ok(Trimmed { buffer, bounds })
}
