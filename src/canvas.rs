//! Monochrome canvas the raster traversal draws from
//!
//! Images are converted once at load time; the traversal only ever asks
//! "is there ink at (x, y)" with bounds checking.

use image::{DynamicImage, GrayImage, Luma};
use std::path::Path;
use thiserror::Error;

/// Splatoon's post canvas, the traditional target size
pub const DEFAULT_WIDTH: u32 = 320;
pub const DEFAULT_HEIGHT: u32 = 120;

/// Luma at or above this is background by default
pub const DEFAULT_THRESHOLD: u8 = 128;

/// Errors building a canvas
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Canvas must be at least 1x1, got {width}x{height}")]
    Empty { width: u32, height: u32 },

    #[error("Packed bitmap for {width}x{height} needs {expected} bytes, got {actual}")]
    PackedLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Row {row} has {actual} pixels, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Immutable row-major bitmap, `true` = ink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Canvas {
    /// Canvas with no ink
    pub fn blank(width: u32, height: u32) -> Result<Self, CanvasError> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            bits: vec![false; pixel_count(width, height)],
        })
    }

    /// Build from a closure evaluated at every pixel
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Result<Self, CanvasError>
    where
        F: FnMut(u32, u32) -> bool,
    {
        check_dimensions(width, height)?;
        let mut bits = Vec::with_capacity(pixel_count(width, height));
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// Decode a packed bitmap: rows padded to whole bytes, LSB is the leftmost
    /// pixel, a set bit is ink. This is the layout image-to-C converters emit
    /// (`data[x / 8 + y * stride] & (1 << (x % 8))`).
    pub fn from_packed(width: u32, height: u32, data: &[u8]) -> Result<Self, CanvasError> {
        check_dimensions(width, height)?;
        let stride = packed_stride(width);
        let expected = stride * height as usize;
        if data.len() != expected {
            return Err(CanvasError::PackedLength {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Self::from_fn(width, height, |x, y| {
            data[(x / 8) as usize + y as usize * stride] & (1 << (x % 8)) != 0
        })
    }

    /// Parse ASCII art: one line per row, `#`, `X` or `1` is ink, anything
    /// else (spaces included) is background. Leading/trailing lines holding
    /// only whitespace are ignored.
    pub fn from_ascii(art: &str) -> Result<Self, CanvasError> {
        let rows: Vec<&str> = art
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .skip_while(|l| l.trim().is_empty())
            .collect();
        let rows: Vec<&str> = match rows.iter().rposition(|l| !l.trim().is_empty()) {
            Some(last) => rows[..=last].to_vec(),
            None => Vec::new(),
        };

        let width = rows.first().map_or(0, |r| r.chars().count());
        for (row, line) in rows.iter().enumerate() {
            let actual = line.chars().count();
            if actual != width {
                return Err(CanvasError::RaggedRow {
                    row,
                    expected: width,
                    actual,
                });
            }
        }

        let bits: Vec<bool> = rows
            .iter()
            .flat_map(|l| l.chars().map(|c| matches!(c, '#' | 'X' | '1')))
            .collect();
        let (width, height) = (width as u32, rows.len() as u32);
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// Threshold an image: pixels darker than `threshold` are ink (or lighter,
    /// with `invert`). Fully transparent pixels are always background.
    pub fn from_image(image: &DynamicImage, threshold: u8, invert: bool) -> Result<Self, CanvasError> {
        let rgba = image.to_rgba8();
        let gray = image.to_luma8();
        Self::from_fn(image.width(), image.height(), |x, y| {
            if rgba.get_pixel(x, y).0[3] == 0 {
                return false;
            }
            let dark = gray.get_pixel(x, y).0[0] < threshold;
            dark != invert
        })
    }

    /// Load and threshold an image file (any format the `image` crate decodes)
    pub fn load_image<P: AsRef<Path>>(path: P, threshold: u8, invert: bool) -> Result<Self, CanvasError> {
        let image = image::open(path.as_ref())?;
        Self::from_image(&image, threshold, invert)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Ink at `(x, y)`, or `None` when the position lies outside the canvas
    pub fn get(&self, x: i32, y: i32) -> Option<bool> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(self.bits[self.index(x as u32, y as u32)])
    }

    /// Set a pixel; out-of-range positions are ignored
    pub fn set(&mut self, x: i32, y: i32, ink: bool) {
        if self.get(x, y).is_some() {
            let idx = self.index(x as u32, y as u32);
            self.bits[idx] = ink;
        }
    }

    pub fn clear(&mut self) {
        self.bits.fill(false);
    }

    /// Number of ink pixels
    pub fn ink_count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Inverse of [`Canvas::from_packed`]
    pub fn to_packed(&self) -> Vec<u8> {
        let stride = packed_stride(self.width);
        let mut out = vec![0u8; stride * self.height as usize];
        for y in 0..self.height {
            for x in 0..self.width {
                if self.bits[self.index(x, y)] {
                    out[(x / 8) as usize + y as usize * stride] |= 1 << (x % 8);
                }
            }
        }
        out
    }

    /// Render as ASCII art (`#` ink, `.` background)
    pub fn to_ascii(&self) -> String {
        let mut out =
            String::with_capacity(pixel_count(self.width, self.height) + self.height as usize);
        for row in self.bits.chunks(self.width as usize) {
            out.extend(row.iter().map(|&ink| if ink { '#' } else { '.' }));
            out.push('\n');
        }
        out
    }

    /// Render as a black-on-white grayscale image
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            if self.bits[self.index(x, y)] {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), CanvasError> {
    if width == 0 || height == 0 {
        return Err(CanvasError::Empty { width, height });
    }
    Ok(())
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

fn packed_stride(width: u32) -> usize {
    width.div_ceil(8) as usize
}
