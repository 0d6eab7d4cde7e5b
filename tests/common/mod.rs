//! Shared helpers for integration tests: rendering symbols into grayscale
//! images the way a camera frame would present them.
#![allow(dead_code)]

use zedcode::common::{BitArray, BitMatrix};
use zedcode::GrayImage;

/// Render a module grid as a grayscale image with a quiet zone.
pub fn render_matrix(matrix: &BitMatrix, scale: usize, quiet_modules: usize) -> GrayImage {
    let side_modules = matrix.width() + 2 * quiet_modules;
    let side = side_modules * scale;
    let mut pixels = vec![255u8; side * side];
    for y in 0..matrix.height() {
        for x in 0..matrix.width() {
            if !matrix.get(x, y) {
                continue;
            }
            let px = (x + quiet_modules) * scale;
            let py = (y + quiet_modules) * scale;
            for dy in 0..scale {
                let row_start = (py + dy) * side;
                for dx in 0..scale {
                    pixels[row_start + px + dx] = 0;
                }
            }
        }
    }
    GrayImage::new(pixels, side, side).unwrap()
}

/// Render a 1D row as a tall grayscale image, `scale` pixels per module.
pub fn render_row(row: &BitArray, scale: usize, height: usize) -> GrayImage {
    let width = row.len() * scale;
    let mut pixels = vec![255u8; width * height];
    for x in 0..row.len() {
        if !row.get(x) {
            continue;
        }
        for dx in 0..scale {
            let px = x * scale + dx;
            for y in 0..height {
                pixels[y * width + px] = 0;
            }
        }
    }
    GrayImage::new(pixels, width, height).unwrap()
}
