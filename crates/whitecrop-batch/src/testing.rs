// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test fixtures: synthetic images on disk and a scripted document renderer
// that stands in for PDFium.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use whitecrop_core::error::{Result, WhitecropError};
use whitecrop_document::{DocumentRenderer, PageSource, PixelBuffer};

/// Write a 50x50 white PNG with a `width` x `height` dark block at (5, 5).
pub fn write_png(path: &Path, width: u32, height: u32) {
    let mut img = RgbImage::from_pixel(50, 50, Rgb([255, 255, 255]));
    draw_filled_rect_mut(&mut img, Rect::at(5, 5).of_size(width, height), Rgb([20, 20, 20]));
    img.save(path).unwrap();
}

/// Write bytes that no image decoder accepts.
pub fn write_corrupt(path: &Path) {
    fs::write(path, b"this is not an image").unwrap();
}

/// Write a scripted document: one line per page.
///
/// `ok` renders a 60x40 page with a 20x10 block at (10, 10), `blank` renders
/// an all-white page, `bad` fails to render. A file whose first line is
/// `corrupt` fails to open.
pub fn write_script(path: &Path, pages: &[&str]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, pages.join("\n")).unwrap();
}

/// Renders scripted documents written by [`write_script`].
pub struct ScriptedRenderer;

impl DocumentRenderer for ScriptedRenderer {
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn PageSource + 'a>> {
        Ok(Box::new(ScriptedPages::read(path, None)?))
    }
}

/// [`ScriptedRenderer`] that counts documents currently held open.
#[derive(Default)]
pub struct CountingRenderer {
    live: Arc<AtomicUsize>,
}

impl CountingRenderer {
    pub fn open_documents(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl DocumentRenderer for CountingRenderer {
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn PageSource + 'a>> {
        let pages = ScriptedPages::read(path, Some(Arc::clone(&self.live)))?;
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(pages))
    }
}

struct ScriptedPages {
    pages: Vec<String>,
    live: Option<Arc<AtomicUsize>>,
}

impl ScriptedPages {
    fn read(path: &Path, live: Option<Arc<AtomicUsize>>) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|err| WhitecropError::decode(path, err))?;
        let pages: Vec<String> = text.lines().map(str::to_string).collect();
        if pages.first().is_some_and(|line| line == "corrupt") {
            return Err(WhitecropError::decode(path, "broken xref table"));
        }
        Ok(Self { pages, live })
    }
}

impl Drop for ScriptedPages {
    fn drop(&mut self) {
        if let Some(live) = &self.live {
            live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl PageSource for ScriptedPages {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn render_page(&self, index: usize, scale: f32) -> Result<PixelBuffer> {
        let scaled = |value: u32| (value as f32 * scale).round() as u32;
        let mut buffer = PixelBuffer::filled(scaled(60), scaled(40), [255, 255, 255]);
        match self.pages.get(index).map(String::as_str) {
            Some("ok") => {
                for y in scaled(10)..scaled(20) {
                    for x in scaled(10)..scaled(30) {
                        buffer.put_pixel(x, y, [0, 0, 0])?;
                    }
                }
                Ok(buffer)
            }
            Some("blank") => Ok(buffer),
            _ => Err(WhitecropError::Render(format!("page {} is unrenderable", index + 1))),
        }
    }
}
