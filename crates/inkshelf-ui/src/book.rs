//! Book-format collaborator interface.
//!
//! The browsing screen never parses container formats itself; it asks a
//! [`BookReader`] for a title and a rendered cover thumbnail, keyed by
//! file extension. `.epub`/`.txt`/`.md` are the supported book types.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

use crate::storage::basename;

/// Extensions the browsing screen will list and open.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".epub", ".txt", ".md"];

/// True if `name` has a supported book extension (case-insensitive).
pub fn is_supported_book(name: &str) -> bool {
    let lower = name.to_lowercase();
    SUPPORTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Derive a display title from a filename by stripping the extension.
pub fn title_from_filename(name: &str) -> String {
    match name.rfind('.') {
        Some(0) | None => name.to_string(),
        Some(i) => name[..i].to_string(),
    }
}

/// Result of loading one book's metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookCover {
    pub title: String,
    /// Path to a rendered BMP thumbnail; empty when the format has no
    /// cover or generation failed.
    pub cover_bmp_path: String,
}

/// 1-bpp packed cover bitmap, MSB-first rows, already sized for a grid
/// cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverBitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl CoverBitmap {
    /// All-white bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        let stride = Self::stride(width);
        Self {
            width,
            height,
            pixels: vec![0; stride * height as usize],
        }
    }

    /// Threshold an 8-bit grayscale image: luma below 0x80 becomes ink.
    pub fn from_luma(width: u32, height: u32, luma: &[u8]) -> Self {
        let mut bitmap = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let idx = (y * width + x) as usize;
                if luma.get(idx).copied().unwrap_or(0xFF) < 0x80 {
                    bitmap.set_black(x, y);
                }
            }
        }
        bitmap
    }

    fn stride(width: u32) -> usize {
        width.div_ceil(8) as usize
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_black(&mut self, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y as usize * Self::stride(self.width) + (x / 8) as usize;
        self.pixels[idx] |= 0x80 >> (x % 8);
    }

    pub fn is_black(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y as usize * Self::stride(self.width) + (x / 8) as usize;
        self.pixels[idx] & (0x80 >> (x % 8)) != 0
    }

    /// Blit the bitmap with its top-left corner at `origin`.
    pub fn draw<D: DrawTarget<Color = BinaryColor>>(
        &self,
        display: &mut D,
        origin: Point,
    ) -> Result<(), D::Error> {
        for y in 0..self.height {
            for x in 0..self.width {
                if self.is_black(x, y) {
                    Pixel(
                        Point::new(origin.x + x as i32, origin.y + y as i32),
                        BinaryColor::On,
                    )
                    .draw(display)?;
                }
            }
        }
        Ok(())
    }
}

/// Book-format reader collaborator.
///
/// `load_book` may block on storage and decoding; the browsing screen
/// only calls it from the background display worker, one entry per
/// tick.
pub trait BookReader {
    /// Parse the book at `path` and render its cover thumbnail at the
    /// given height. Must not fail: unsupported or corrupt files fall
    /// back to a filename-derived title and no cover.
    fn load_book(&mut self, path: &str, thumb_height: u32) -> BookCover;

    /// Decode a previously generated thumbnail for drawing.
    fn read_thumbnail(&mut self, bmp_path: &str) -> Option<CoverBitmap>;
}

/// Scriptable reader for simulators and tests.
///
/// Counts `load_book` calls through a shared handle so tests can assert
/// how much loading a scenario performed.
pub struct StubBookReader {
    load_calls: Arc<AtomicUsize>,
    with_covers: bool,
}

impl StubBookReader {
    /// Reader whose books have no cover art.
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        Self::build(false)
    }

    /// Reader that reports a synthetic cover for every book.
    pub fn with_covers() -> (Self, Arc<AtomicUsize>) {
        Self::build(true)
    }

    fn build(with_covers: bool) -> (Self, Arc<AtomicUsize>) {
        let load_calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                load_calls: Arc::clone(&load_calls),
                with_covers,
            },
            load_calls,
        )
    }
}

impl BookReader for StubBookReader {
    fn load_book(&mut self, path: &str, _thumb_height: u32) -> BookCover {
        self.load_calls.fetch_add(1, Ordering::Relaxed);
        BookCover {
            title: title_from_filename(basename(path)),
            cover_bmp_path: if self.with_covers {
                format!("{}.bmp", path)
            } else {
                String::new()
            },
        }
    }

    fn read_thumbnail(&mut self, _bmp_path: &str) -> Option<CoverBitmap> {
        if !self.with_covers {
            return None;
        }
        // Checkerboard stand-in so renders produce visible ink.
        let mut bitmap = CoverBitmap::new(120, 160);
        for y in 0..bitmap.height() {
            for x in 0..bitmap.width() {
                if (x / 8 + y / 8) % 2 == 0 {
                    bitmap.set_black(x, y);
                }
            }
        }
        Some(bitmap)
    }
}
