// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster module: pixel buffers, content bounding-box detection, and cropping.

pub mod buffer;
pub mod crop;
pub mod detect;

pub use buffer::PixelBuffer;
pub use crop::{Trimmed, crop, trim};
pub use detect::{BoundingBox, BoundingBoxDetector, ContentProfile};
