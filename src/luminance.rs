//! Grayscale image access
//!
//! [`LuminanceSource`] is the collaborator interface the binarizer consumes;
//! [`GrayImage`] is the bundled 8-bit implementation. Row 0 is the top of
//! the image and pixel value 0 is darkest.

use crate::{Error, Result};

pub trait LuminanceSource {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Copy row `y` into `buffer`, resizing it as needed.
    fn row(&self, y: usize, buffer: &mut Vec<u8>);

    /// The whole image, row-major.
    fn matrix(&self) -> Vec<u8>;

    fn is_crop_supported(&self) -> bool {
        false
    }

    fn crop(&self, _left: usize, _top: usize, _width: usize, _height: usize) -> Result<GrayImage> {
        Err(Error::Unsupported("crop".into()))
    }

    fn is_rotate_supported(&self) -> bool {
        false
    }

    fn rotate_counter_clockwise(&self) -> Result<GrayImage> {
        Err(Error::Unsupported("rotate".into()))
    }
}

/// Owned 8-bit grayscale buffer.
#[derive(Debug, Clone)]
pub struct GrayImage {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
}

impl GrayImage {
    pub fn new(pixels: Vec<u8>, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidArgument("empty image"));
        }
        if pixels.len() != width * height {
            return Err(Error::InvalidArgument("pixel buffer does not match dimensions"));
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }
}

impl LuminanceSource for GrayImage {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn row(&self, y: usize, buffer: &mut Vec<u8>) {
        let start = y * self.width;
        buffer.clear();
        buffer.extend_from_slice(&self.pixels[start..start + self.width]);
    }

    fn matrix(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    fn is_crop_supported(&self) -> bool {
        true
    }

    fn crop(&self, left: usize, top: usize, width: usize, height: usize) -> Result<GrayImage> {
        if left + width > self.width || top + height > self.height {
            return Err(Error::InvalidArgument("crop region outside image"));
        }
        let mut pixels = Vec::with_capacity(width * height);
        for y in top..top + height {
            let start = y * self.width + left;
            pixels.extend_from_slice(&self.pixels[start..start + width]);
        }
        GrayImage::new(pixels, width, height)
    }

    fn is_rotate_supported(&self) -> bool {
        true
    }

    fn rotate_counter_clockwise(&self) -> Result<GrayImage> {
        let mut pixels = vec![0u8; self.width * self.height];
        // Output is height x width; source column x becomes output row
        // (width - 1 - x).
        for y in 0..self.height {
            for x in 0..self.width {
                pixels[(self.width - 1 - x) * self.height + y] = self.pixel(x, y);
            }
        }
        GrayImage::new(pixels, self.height, self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer() {
        assert!(GrayImage::new(vec![0; 5], 2, 2).is_err());
        assert!(GrayImage::new(vec![], 0, 0).is_err());
    }

    #[test]
    fn crop_extracts_subimage() {
        let img = GrayImage::new((0..12).collect(), 4, 3).unwrap();
        let cropped = img.crop(1, 1, 2, 2).unwrap();
        assert_eq!(cropped.as_raw(), &[5, 6, 9, 10]);
    }

    #[test]
    fn rotate_ccw_quarter_turn() {
        // 2x3:
        //   0 1
        //   2 3
        //   4 5
        let img = GrayImage::new(vec![0, 1, 2, 3, 4, 5], 2, 3).unwrap();
        let rotated = img.rotate_counter_clockwise().unwrap();
        assert_eq!(rotated.width(), 3);
        assert_eq!(rotated.height(), 2);
        // CCW: the right column becomes the top row.
        assert_eq!(rotated.as_raw(), &[1, 3, 5, 0, 2, 4]);
    }

    #[test]
    fn four_rotations_restore_image() {
        let img = GrayImage::new((0..20).collect(), 5, 4).unwrap();
        let mut rotated = img.clone();
        for _ in 0..4 {
            rotated = rotated.rotate_counter_clockwise().unwrap();
        }
        assert_eq!(rotated.as_raw(), img.as_raw());
    }
}
