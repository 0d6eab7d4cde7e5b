//! Luminance-to-bit conversion
//!
//! Two strategies: a global histogram threshold (fast, good enough for 1D
//! rows and clean images) and a hybrid local threshold (8x8 blocks averaged
//! over a 5x5 neighborhood) that holds up under uneven lighting and feeds
//! the 2D path.

use crate::common::{BitArray, BitMatrix};
use crate::luminance::LuminanceSource;
use crate::{Error, Result};

const LUMINANCE_BITS: usize = 5;
const LUMINANCE_SHIFT: usize = 8 - LUMINANCE_BITS;
const LUMINANCE_BUCKETS: usize = 1 << LUMINANCE_BITS;

pub trait Binarizer {
    /// Binarized row `y`, dark pixels set.
    fn black_row(&self, y: usize, source: &dyn LuminanceSource) -> Result<BitArray>;

    /// Binarized whole image.
    fn black_matrix(&self, source: &dyn LuminanceSource) -> Result<BitMatrix>;
}

/// Threshold from a 32-bucket luminance histogram.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalHistogramBinarizer;

impl GlobalHistogramBinarizer {
    pub fn new() -> Self {
        Self
    }
}

impl Binarizer for GlobalHistogramBinarizer {
    fn black_row(&self, y: usize, source: &dyn LuminanceSource) -> Result<BitArray> {
        let width = source.width();
        let mut luminances = Vec::with_capacity(width);
        source.row(y, &mut luminances);

        let mut buckets = [0u32; LUMINANCE_BUCKETS];
        for &pixel in &luminances {
            buckets[(pixel >> LUMINANCE_SHIFT) as usize] += 1;
        }
        let black_point = estimate_black_point(&buckets)?;

        let mut row = BitArray::new(width);
        for (x, &pixel) in luminances.iter().enumerate() {
            if u32::from(pixel) < black_point {
                row.set(x);
            }
        }
        Ok(row)
    }

    fn black_matrix(&self, source: &dyn LuminanceSource) -> Result<BitMatrix> {
        let width = source.width();
        let height = source.height();

        // Sample four rows from the middle 3/5 of the image to build the
        // histogram instead of scanning every pixel.
        let mut buckets = [0u32; LUMINANCE_BUCKETS];
        let mut luminances = Vec::with_capacity(width);
        for y in 1..5 {
            let row = height * y / 5;
            source.row(row, &mut luminances);
            let right = width * 4 / 5;
            for &pixel in &luminances[width / 5..right] {
                buckets[(pixel >> LUMINANCE_SHIFT) as usize] += 1;
            }
        }
        let black_point = estimate_black_point(&buckets)?;

        let pixels = source.matrix();
        let mut matrix = BitMatrix::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if u32::from(pixels[y * width + x]) < black_point {
                    matrix.set(x, y);
                }
            }
        }
        Ok(matrix)
    }
}

/// Two tallest histogram peaks, then the valley between them that best
/// separates the two modes. Fails when the peaks are too close together,
/// which means the image has no real contrast to threshold.
fn estimate_black_point(buckets: &[u32; LUMINANCE_BUCKETS]) -> Result<u32> {
    let mut first_peak = 0usize;
    let mut first_peak_size = 0u32;
    let mut max_bucket_count = 0u32;
    for (x, &count) in buckets.iter().enumerate() {
        if count > first_peak_size {
            first_peak = x;
            first_peak_size = count;
        }
        max_bucket_count = max_bucket_count.max(count);
    }

    let mut second_peak = 0usize;
    let mut second_peak_score = 0u64;
    for (x, &count) in buckets.iter().enumerate() {
        let distance = x.abs_diff(first_peak) as u64;
        let score = u64::from(count) * distance * distance;
        if score > second_peak_score {
            second_peak = x;
            second_peak_score = score;
        }
    }

    let (low, high) = if first_peak < second_peak {
        (first_peak, second_peak)
    } else {
        (second_peak, first_peak)
    };
    if high - low <= LUMINANCE_BUCKETS / 16 {
        return Err(Error::NotFound);
    }

    let mut best_valley = high - 1;
    let mut best_valley_score = -1i64;
    for x in (low + 1..high).rev() {
        let from_low = (x - low) as i64;
        let score =
            from_low * from_low * (high - x) as i64 * i64::from(max_bucket_count - buckets[x]);
        if score > best_valley_score {
            best_valley = x;
            best_valley_score = score;
        }
    }
    Ok((best_valley << LUMINANCE_SHIFT) as u32)
}

/// Local thresholding over 8x8 blocks with a 5x5 block neighborhood.
#[derive(Debug, Clone, Copy, Default)]
pub struct HybridBinarizer;

const BLOCK_SIZE_POWER: usize = 3;
const BLOCK_SIZE: usize = 1 << BLOCK_SIZE_POWER;
const MINIMUM_DIMENSION: usize = BLOCK_SIZE * 5;
const MIN_DYNAMIC_RANGE: u32 = 24;

impl HybridBinarizer {
    pub fn new() -> Self {
        Self
    }

    fn black_points(pixels: &[u8], width: usize, sub_width: usize, sub_height: usize) -> Vec<Vec<u32>> {
        let height = pixels.len() / width;
        let mut points = vec![vec![0u32; sub_width]; sub_height];
        for by in 0..sub_height {
            let yoffset = (by << BLOCK_SIZE_POWER).min(height - BLOCK_SIZE);
            for bx in 0..sub_width {
                let xoffset = (bx << BLOCK_SIZE_POWER).min(width - BLOCK_SIZE);
                let mut sum = 0u32;
                let mut min = 0xFFu32;
                let mut max = 0u32;
                for yy in 0..BLOCK_SIZE {
                    for xx in 0..BLOCK_SIZE {
                        let pixel = u32::from(pixels[(yoffset + yy) * width + xoffset + xx]);
                        sum += pixel;
                        min = min.min(pixel);
                        max = max.max(pixel);
                    }
                }
                let mut average = sum >> (2 * BLOCK_SIZE_POWER);
                if max - min <= MIN_DYNAMIC_RANGE {
                    // Featureless block: assume background, bias toward
                    // white, but follow already-computed neighbors so a
                    // block inside a big dark region stays dark.
                    average = min / 2;
                    if by > 0 && bx > 0 {
                        let neighbor_average = (points[by - 1][bx]
                            + 2 * points[by][bx - 1]
                            + points[by - 1][bx - 1])
                            / 4;
                        if min < neighbor_average {
                            average = neighbor_average;
                        }
                    }
                }
                points[by][bx] = average;
            }
        }
        points
    }
}

impl Binarizer for HybridBinarizer {
    fn black_row(&self, y: usize, source: &dyn LuminanceSource) -> Result<BitArray> {
        GlobalHistogramBinarizer.black_row(y, source)
    }

    fn black_matrix(&self, source: &dyn LuminanceSource) -> Result<BitMatrix> {
        let width = source.width();
        let height = source.height();
        if width < MINIMUM_DIMENSION || height < MINIMUM_DIMENSION {
            return GlobalHistogramBinarizer.black_matrix(source);
        }

        let pixels = source.matrix();
        let sub_width = (width + BLOCK_SIZE - 1) >> BLOCK_SIZE_POWER;
        let sub_height = (height + BLOCK_SIZE - 1) >> BLOCK_SIZE_POWER;
        let points = Self::black_points(&pixels, width, sub_width, sub_height);

        let mut matrix = BitMatrix::new(width, height);
        for by in 0..sub_height {
            let yoffset = (by << BLOCK_SIZE_POWER).min(height - BLOCK_SIZE);
            for bx in 0..sub_width {
                let xoffset = (bx << BLOCK_SIZE_POWER).min(width - BLOCK_SIZE);
                // Average the black points of a 5x5 block neighborhood,
                // clamped to the grid.
                let left = bx.clamp(2, sub_width.saturating_sub(3).max(2));
                let top = by.clamp(2, sub_height.saturating_sub(3).max(2));
                let mut sum = 0u32;
                for dy in 0..5 {
                    for dx in 0..5 {
                        sum += points[top + dy - 2][left + dx - 2];
                    }
                }
                let average = sum / 25;
                for yy in 0..BLOCK_SIZE {
                    for xx in 0..BLOCK_SIZE {
                        if u32::from(pixels[(yoffset + yy) * width + xoffset + xx]) <= average {
                            matrix.set(xoffset + xx, yoffset + yy);
                        }
                    }
                }
            }
        }
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::luminance::GrayImage;

    fn checkerboard(cell: usize, cells: usize) -> GrayImage {
        let side = cell * cells;
        let mut pixels = vec![0u8; side * side];
        for y in 0..side {
            for x in 0..side {
                let dark = ((x / cell) + (y / cell)) % 2 == 0;
                pixels[y * side + x] = if dark { 10 } else { 245 };
            }
        }
        GrayImage::new(pixels, side, side).unwrap()
    }

    #[test]
    fn global_thresholds_bimodal_row() {
        let img = checkerboard(8, 8);
        let row = GlobalHistogramBinarizer.black_row(0, &img).unwrap();
        assert!(row.get(0));
        assert!(!row.get(8));
        assert!(row.get(16));
    }

    #[test]
    fn global_rejects_low_contrast_image() {
        // Two luminance modes one histogram bucket apart: nothing to
        // threshold.
        let mut pixels = vec![128u8; 64 * 64];
        for (i, p) in pixels.iter_mut().enumerate() {
            if i % 2 == 0 {
                *p = 137;
            }
        }
        let img = GrayImage::new(pixels, 64, 64).unwrap();
        assert_eq!(
            GlobalHistogramBinarizer.black_matrix(&img).unwrap_err(),
            Error::NotFound
        );
    }

    #[test]
    fn hybrid_and_global_agree_on_clean_input() {
        let img = checkerboard(8, 8);
        let global = GlobalHistogramBinarizer.black_matrix(&img).unwrap();
        let hybrid = HybridBinarizer.black_matrix(&img).unwrap();
        for y in 0..img.height() {
            for x in 0..img.width() {
                assert_eq!(global.get(x, y), hybrid.get(x, y), "disagree at ({x},{y})");
            }
        }
    }
}
