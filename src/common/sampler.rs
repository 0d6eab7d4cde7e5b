//! Grid sampling strategy
//!
//! A [`GridSampler`] reconstructs a square module grid from a detected,
//! possibly perspective-distorted symbol. One process-wide strategy can be
//! installed at startup so platforms with optimized resampling can swap in
//! their own; the default software implementation is used otherwise.

use std::sync::OnceLock;

use crate::common::{BitMatrix, PerspectiveTransform};
use crate::{Error, Result};

pub trait GridSampler: Send + Sync {
    /// Sample a `dimension` x `dimension` grid of modules from `image`,
    /// transforming each cell center through `transform` into image space.
    fn sample_grid(
        &self,
        image: &BitMatrix,
        dimension: usize,
        transform: &PerspectiveTransform,
    ) -> Result<BitMatrix>;
}

/// Plain software sampler: one transformed point per module center.
#[derive(Debug, Default)]
pub struct DefaultGridSampler;

impl GridSampler for DefaultGridSampler {
    fn sample_grid(
        &self,
        image: &BitMatrix,
        dimension: usize,
        transform: &PerspectiveTransform,
    ) -> Result<BitMatrix> {
        let mut bits = BitMatrix::square(dimension);
        let mut points = vec![0f32; 2 * dimension];
        for y in 0..dimension {
            let value = y as f32 + 0.5;
            for (x, pair) in points.chunks_exact_mut(2).enumerate() {
                pair[0] = x as f32 + 0.5;
                pair[1] = value;
            }
            transform.transform_points(&mut points);
            // Out-of-bounds by at most a pixel means the code touches the
            // image border; nudge back in. Farther out means the transform
            // is bogus.
            check_and_nudge_points(image, &mut points)?;
            for x in 0..dimension {
                let px = points[2 * x] as usize;
                let py = points[2 * x + 1] as usize;
                if image.get(px.min(image.width() - 1), py.min(image.height() - 1)) {
                    bits.set(x, y);
                }
            }
        }
        Ok(bits)
    }
}

fn check_and_nudge_points(image: &BitMatrix, points: &mut [f32]) -> Result<()> {
    let width = image.width() as f32;
    let height = image.height() as f32;

    // Walk in from each end until a point is in bounds; the points lie on a
    // line, so once one end is fine the middle is too.
    let mut nudged = true;
    for offset in (0..points.len()).step_by(2) {
        if !nudged {
            break;
        }
        nudged = nudge_point(points, offset, width, height)?;
    }
    let mut nudged = true;
    for offset in (0..points.len()).step_by(2).rev() {
        if !nudged {
            break;
        }
        nudged = nudge_point(points, offset, width, height)?;
    }
    Ok(())
}

fn nudge_point(points: &mut [f32], offset: usize, width: f32, height: f32) -> Result<bool> {
    let x = points[offset];
    let y = points[offset + 1];
    if x < -1.0 || x > width || y < -1.0 || y > height {
        return Err(Error::NotFound);
    }
    let mut nudged = false;
    if x < 0.0 {
        points[offset] = 0.0;
        nudged = true;
    } else if x >= width {
        points[offset] = width - 1.0;
        nudged = true;
    }
    if y < 0.0 {
        points[offset + 1] = 0.0;
        nudged = true;
    } else if y >= height {
        points[offset + 1] = height - 1.0;
        nudged = true;
    }
    Ok(nudged)
}

static INSTALLED: OnceLock<Box<dyn GridSampler>> = OnceLock::new();
static DEFAULT: DefaultGridSampler = DefaultGridSampler;

/// Install a process-wide sampler. One-time configuration, expected at
/// program start; returns an error if a sampler was already installed.
pub fn install_grid_sampler(sampler: Box<dyn GridSampler>) -> Result<()> {
    INSTALLED
        .set(sampler)
        .map_err(|_| Error::InvalidArgument("grid sampler already installed"))
}

/// The active sampler.
pub fn grid_sampler() -> &'static dyn GridSampler {
    match INSTALLED.get() {
        Some(sampler) => sampler.as_ref(),
        None => &DEFAULT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_identity_grid() {
        let mut image = BitMatrix::square(10);
        image.set(0, 0);
        image.set(3, 4);
        image.set(9, 9);
        let transform = PerspectiveTransform::quadrilateral_to_quadrilateral(
            0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0, //
            0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0,
        );
        let sampled = DefaultGridSampler
            .sample_grid(&image, 10, &transform)
            .unwrap();
        assert!(sampled.get(0, 0));
        assert!(sampled.get(3, 4));
        assert!(sampled.get(9, 9));
        assert!(!sampled.get(5, 5));
    }

    #[test]
    fn rejects_transform_outside_image() {
        let image = BitMatrix::square(10);
        let transform = PerspectiveTransform::quadrilateral_to_quadrilateral(
            0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0, //
            50.0, 50.0, 90.0, 50.0, 90.0, 90.0, 50.0, 90.0,
        );
        assert_eq!(
            DefaultGridSampler
                .sample_grid(&image, 10, &transform)
                .unwrap_err(),
            Error::NotFound
        );
    }
}
