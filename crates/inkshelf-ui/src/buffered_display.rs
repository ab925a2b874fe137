//! Shared frame buffer for the e-ink panel.
//!
//! All widgets draw into this buffer through embedded-graphics; the
//! display worker then pushes the whole buffer to the panel in one
//! operation. The raw byte accessors also back the grid page frame
//! cache, which snapshots and restores complete frames.

use alloc::vec;
use alloc::vec::Vec;
use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

use crate::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// Hardware seam: receives a finished frame for the physical panel.
pub trait DisplayPanel {
    fn present(&mut self, frame: &[u8]);
}

/// 1-bpp packed portrait frame buffer (480x800, MSB first).
///
/// A set bit is ink (black); the buffer starts white.
pub struct BufferedDisplay {
    buffer: Vec<u8>,
}

impl BufferedDisplay {
    const ROW_BYTES: usize = (DISPLAY_WIDTH as usize) / 8;

    /// Total buffer size in bytes (46.9 KiB).
    pub const BUFFER_SIZE: usize = Self::ROW_BYTES * DISPLAY_HEIGHT as usize;

    pub fn new() -> Self {
        Self {
            buffer: vec![0; Self::BUFFER_SIZE],
        }
    }

    /// Clear the buffer to white.
    pub fn clear(&mut self) {
        self.buffer.fill(0);
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: BinaryColor) {
        if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
            return;
        }
        let byte_index = y as usize * Self::ROW_BYTES + (x / 8) as usize;
        let mask = 0x80 >> (x % 8);
        if color == BinaryColor::On {
            self.buffer[byte_index] |= mask;
        } else {
            self.buffer[byte_index] &= !mask;
        }
    }

    /// Read back one pixel, for assertions and screenshot dumps.
    pub fn pixel(&self, x: u32, y: u32) -> BinaryColor {
        if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
            return BinaryColor::Off;
        }
        let byte_index = y as usize * Self::ROW_BYTES + (x / 8) as usize;
        if self.buffer[byte_index] & (0x80 >> (x % 8)) != 0 {
            BinaryColor::On
        } else {
            BinaryColor::Off
        }
    }

    /// Raw frame bytes for the panel and the frame cache.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }
}

impl DrawTarget for BufferedDisplay {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                self.set_pixel(point.x as u32, point.y as u32, color);
            }
        }
        Ok(())
    }
}

impl OriginDimensions for BufferedDisplay {
    fn size(&self) -> Size {
        Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }
}

impl Default for BufferedDisplay {
    fn default() -> Self {
        Self::new()
    }
}
