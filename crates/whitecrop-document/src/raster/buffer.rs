// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel buffer: an owned, row-major grid of RGB samples with the origin at
// the top-left corner. Every stage of the pipeline consumes and produces
// these; alpha is resolved once, at construction, according to an
// `AlphaPolicy`.

use std::path::Path;

use image::{DynamicImage, RgbImage};
use tracing::{debug, instrument};
use whitecrop_core::AlphaPolicy;
use whitecrop_core::error::{Result, WhitecropError};

/// Number of samples per pixel.
pub const CHANNELS: usize = 3;

/// An owned RGB raster.
///
/// Invariant: `samples.len() == width * height * 3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl PixelBuffer {
    // -- Construction ---------------------------------------------------------

    /// A buffer of the given size filled with one colour.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let mut samples = Vec::with_capacity(pixels * CHANNELS);
        for _ in 0..pixels {
            samples.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            samples,
        }
    }

    /// Wrap raw row-major RGB samples, checking the length invariant.
    pub fn from_raw(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if samples.len() != expected {
            return Err(WhitecropError::InvalidBuffer {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Normalise a decoded image to RGB, resolving any alpha channel with
    /// `alpha`.
    pub fn from_dynamic(image: DynamicImage, alpha: AlphaPolicy) -> Self {
        let (width, height) = (image.width(), image.height());
        let samples = match alpha {
            AlphaPolicy::Composite { background } if image.color().has_alpha() => {
                composite_onto(&image, background)
            }
            _ => image.into_rgb8().into_raw(),
        };
        Self {
            width,
            height,
            samples,
        }
    }

    /// Decode an image file at native resolution.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, alpha: AlphaPolicy) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|err| WhitecropError::decode(path, err))?;
        debug!(
            width = image.width(),
            height = image.height(),
            color = ?image.color(),
            "Image decoded"
        );
        Ok(Self::from_dynamic(image, alpha))
    }

    /// Decode an in-memory encoded image (PNG, JPEG, ...).
    pub fn from_encoded(data: &[u8], alpha: AlphaPolicy) -> Result<Self> {
        let image = image::load_from_memory(data).map_err(|err| WhitecropError::Decode {
            path: "<memory>".into(),
            reason: err.to_string(),
        })?;
        Ok(Self::from_dynamic(image, alpha))
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The RGB value at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        let offset = self.offset(x, y)?;
        Some([
            self.samples[offset],
            self.samples[offset + 1],
            self.samples[offset + 2],
        ])
    }

    /// Overwrite the pixel at `(x, y)`.
    pub fn put_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) -> Result<()> {
        let offset = self.offset(x, y).ok_or(WhitecropError::InvalidRegion {
            left: x,
            top: y,
            right: x,
            bottom: y,
            width: self.width,
            height: self.height,
        })?;
        self.samples[offset..offset + CHANNELS].copy_from_slice(&rgb);
        Ok(())
    }

    /// Samples of row `y`, or `None` outside the buffer.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let stride = self.stride();
        let start = y as usize * stride;
        self.samples.get(start..start + stride)
    }

    /// Iterate over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // `chunks_exact` rejects a zero chunk size.
        self.samples.chunks_exact(self.stride().max(1))
    }

    pub fn as_samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    /// Convert into an `image` crate buffer for encoding.
    pub fn into_rgb_image(self) -> Result<RgbImage> {
        let expected = self.samples.len();
        RgbImage::from_raw(self.width, self.height, self.samples).ok_or(
            WhitecropError::InvalidBuffer {
                expected,
                actual: expected,
            },
        )
    }

    // -- Helpers --------------------------------------------------------------

    fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.stride() + x as usize * CHANNELS)
    }
}

/// Blend an image with alpha onto an opaque background, rounding to nearest.
fn composite_onto(image: &DynamicImage, background: [u8; 3]) -> Vec<u8> {
    let rgba = image.to_rgba8();
    let mut samples = Vec::with_capacity(rgba.width() as usize * rgba.height() as usize * CHANNELS);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u32;
        for (channel, bg) in [r, g, b].into_iter().zip(background) {
            let blended = (channel as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255;
            samples.push(blended as u8);
        }
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    #[test]
    fn filled_buffer_satisfies_length_invariant() {
        let buffer = PixelBuffer::filled(7, 5, [255, 255, 255]);
        assert_eq!(buffer.as_samples().len(), 7 * 5 * 3);
        assert_eq!(buffer.rows().count(), 5);
        assert_eq!(buffer.row(4).map(<[u8]>::len), Some(21));
        assert!(buffer.row(5).is_none());
    }

    #[test]
    fn from_raw_rejects_wrong_length() {
        let err = PixelBuffer::from_raw(2, 2, vec![0; 11]).unwrap_err();
        assert!(matches!(
            err,
            WhitecropError::InvalidBuffer {
                expected: 12,
                actual: 11
            }
        ));
    }

    #[test]
    fn pixel_access_is_bounds_checked() {
        let mut buffer = PixelBuffer::filled(3, 2, [10, 20, 30]);
        assert_eq!(buffer.pixel(2, 1), Some([10, 20, 30]));
        assert_eq!(buffer.pixel(3, 0), None);
        assert_eq!(buffer.pixel(0, 2), None);

        buffer.put_pixel(1, 1, [1, 2, 3]).unwrap();
        assert_eq!(buffer.pixel(1, 1), Some([1, 2, 3]));
        assert!(buffer.put_pixel(3, 1, [0, 0, 0]).is_err());
    }

    #[test]
    fn transparent_pixels_become_background_when_composited() {
        let mut rgba = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 1, Rgba([0, 0, 0, 255]));
        rgba.put_pixel(2, 2, Rgba([0, 0, 0, 128]));

        let buffer = PixelBuffer::from_dynamic(DynamicImage::ImageRgba8(rgba), AlphaPolicy::WHITE);
        assert_eq!(buffer.pixel(0, 0), Some([255, 255, 255]));
        assert_eq!(buffer.pixel(1, 1), Some([0, 0, 0]));
        // 255 * 127 / 255 rounds to 127.
        assert_eq!(buffer.pixel(2, 2), Some([127, 127, 127]));
    }

    #[test]
    fn discard_keeps_stored_colour_under_transparency() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let buffer = PixelBuffer::from_dynamic(DynamicImage::ImageRgba8(rgba), AlphaPolicy::Discard);
        assert_eq!(buffer.pixel(0, 0), Some([0, 0, 0]));
    }

    #[test]
    fn grayscale_input_expands_to_rgb() {
        let gray = GrayImage::from_pixel(3, 3, Luma([90u8]));
        let buffer = PixelBuffer::from_dynamic(DynamicImage::ImageLuma8(gray), AlphaPolicy::WHITE);
        assert_eq!(buffer.pixel(1, 1), Some([90, 90, 90]));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = PixelBuffer::from_encoded(b"definitely not an image", AlphaPolicy::WHITE).unwrap_err();
        assert!(matches!(err, WhitecropError::Decode { .. }));
    }

    #[test]
    fn rgb_image_round_trip_keeps_pixels() {
        let mut buffer = PixelBuffer::filled(4, 3, [200, 200, 200]);
        buffer.put_pixel(3, 2, [9, 8, 7]).unwrap();
        let image = buffer.clone().into_rgb_image().unwrap();
        assert_eq!(image.get_pixel(3, 2).0, [9, 8, 7]);
        assert_eq!(image.dimensions(), buffer.dimensions());
    }
}
