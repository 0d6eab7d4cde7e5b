//! QR symbol detection
//!
//! From located finder patterns to a sampled module grid: module size and
//! dimension estimation, alignment pattern search for version 2 and up,
//! and the perspective transform into grid space.

use crate::common::{grid_sampler, BitMatrix, PerspectiveTransform};
use crate::qr::finder::{self, FinderPatternInfo};
use crate::qr::version::Version;
use crate::symbol::Point;
use crate::{Error, Result};

/// A detected symbol: the sampled grid and the anchor points found in the
/// image (bottom-left, top-left, top-right, then the alignment pattern
/// when one was used).
pub struct DetectorResult {
    pub bits: BitMatrix,
    pub points: Vec<Point>,
}

pub fn detect(image: &BitMatrix, try_harder: bool) -> Result<DetectorResult> {
    let info = finder::find(image, try_harder)?;
    process_finder_pattern_info(image, &info)
}

fn process_finder_pattern_info(
    image: &BitMatrix,
    info: &FinderPatternInfo,
) -> Result<DetectorResult> {
    let top_left = info.top_left.point();
    let top_right = info.top_right.point();
    let bottom_left = info.bottom_left.point();

    let module_size = (info.top_left.estimated_module_size
        + info.top_right.estimated_module_size
        + info.bottom_left.estimated_module_size)
        / 3.0;
    if module_size < 1.0 {
        return Err(Error::NotFound);
    }

    let dimension = compute_dimension(top_left, top_right, bottom_left, module_size)?;
    let provisional_version = Version::for_dimension(dimension)?;

    // Versions 2+ carry an alignment pattern near the bottom-right; finding
    // it pins down the fourth corner much better than extrapolation.
    let mut alignment: Option<Point> = None;
    if !provisional_version.alignment_centers().is_empty() {
        let bottom_right_x = top_right.x - top_left.x + bottom_left.x;
        let bottom_right_y = top_right.y - top_left.y + bottom_left.y;
        let modules_between_centers = (dimension - 7) as f32;
        let correction = 1.0 - 3.0 / modules_between_centers;
        let est_x = top_left.x + correction * (bottom_right_x - top_left.x);
        let est_y = top_left.y + correction * (bottom_right_y - top_left.y);
        for allowance in [4, 8, 16] {
            if let Ok(point) =
                find_alignment_in_region(image, module_size, est_x, est_y, allowance as f32)
            {
                alignment = Some(point);
                break;
            }
        }
        // A missing alignment pattern is survivable; extrapolation follows.
    }

    let transform = create_transform(top_left, top_right, bottom_left, alignment, dimension);
    let bits = grid_sampler().sample_grid(image, dimension, &transform)?;

    let mut points = vec![bottom_left, top_left, top_right];
    if let Some(point) = alignment {
        points.push(point);
    }
    Ok(DetectorResult { bits, points })
}

/// Dimension from finder center spacing, snapped to 4k+1.
fn compute_dimension(
    top_left: Point,
    top_right: Point,
    bottom_left: Point,
    module_size: f32,
) -> Result<usize> {
    let top_modules = (top_left.distance(top_right) / module_size).round() as i64;
    let left_modules = (top_left.distance(bottom_left) / module_size).round() as i64;
    let mut dimension = (top_modules + left_modules) / 2 + 7;
    match dimension & 0x03 {
        0 => dimension += 1,
        2 => dimension -= 1,
        3 => return Err(Error::NotFound),
        _ => {}
    }
    if !(21..=177).contains(&dimension) {
        return Err(Error::NotFound);
    }
    Ok(dimension as usize)
}

fn create_transform(
    top_left: Point,
    top_right: Point,
    bottom_left: Point,
    alignment: Option<Point>,
    dimension: usize,
) -> PerspectiveTransform {
    let dim_minus_three = dimension as f32 - 3.5;
    let (bottom_right_x, bottom_right_y, source_x, source_y) = match alignment {
        Some(p) => (p.x, p.y, dim_minus_three - 3.0, dim_minus_three - 3.0),
        None => (
            top_right.x - top_left.x + bottom_left.x,
            top_right.y - top_left.y + bottom_left.y,
            dim_minus_three,
            dim_minus_three,
        ),
    };
    PerspectiveTransform::quadrilateral_to_quadrilateral(
        3.5,
        3.5,
        dim_minus_three,
        3.5,
        source_x,
        source_y,
        3.5,
        dim_minus_three,
        top_left.x,
        top_left.y,
        top_right.x,
        top_right.y,
        bottom_right_x,
        bottom_right_y,
        bottom_left.x,
        bottom_left.y,
    )
}

/// Search a small region around the expected center for the 1:1:1:1:1
/// signature of a row through the middle of a 5x5 alignment pattern.
pub fn find_alignment_in_region(
    image: &BitMatrix,
    module_size: f32,
    est_x: f32,
    est_y: f32,
    allowance_factor: f32,
) -> Result<Point> {
    let allowance = (allowance_factor * module_size).ceil() as i64;
    let x_start = (est_x as i64 - allowance).max(0) as usize;
    let x_end = ((est_x as i64 + allowance).max(0) as usize).min(image.width().saturating_sub(1));
    let y_start = (est_y as i64 - allowance).max(0) as usize;
    let y_end = ((est_y as i64 + allowance).max(0) as usize).min(image.height().saturating_sub(1));
    if x_end.saturating_sub(x_start) < 3 * module_size as usize
        || y_end.saturating_sub(y_start) < 3 * module_size as usize
    {
        return Err(Error::NotFound);
    }

    let middle = (y_start + y_end) / 2;
    // Scan middle-out so the likeliest rows come first.
    for offset in 0..=(y_end - y_start) {
        let row = if offset & 1 == 0 {
            middle + offset / 2
        } else {
            match (middle).checked_sub(offset / 2 + 1) {
                Some(r) => r,
                None => continue,
            }
        };
        if row < y_start || row > y_end {
            continue;
        }
        if let Some(point) = scan_alignment_row(image, row, x_start, x_end, est_x, module_size) {
            return Ok(point);
        }
    }
    Err(Error::NotFound)
}

/// Slide a five-run window along one row; a dark-led window whose runs are
/// all about one module wide is a candidate center row. Of the candidates
/// that survive the vertical cross-check, the one closest to the expected
/// x wins, so data modules at the region fringe cannot shadow the real
/// pattern.
fn scan_alignment_row(
    image: &BitMatrix,
    row: usize,
    x_start: usize,
    x_end: usize,
    est_x: f32,
    module_size: f32,
) -> Option<Point> {
    // Run-length encode the row slice as (dark, start, length).
    let mut runs: Vec<(bool, usize, usize)> = Vec::new();
    for x in x_start..=x_end {
        let dark = image.get(x, row);
        match runs.last_mut() {
            Some(run) if run.0 == dark => run.2 += 1,
            _ => runs.push((dark, x, 1)),
        }
    }

    let mut best: Option<Point> = None;
    for window in runs.windows(5) {
        if !window[0].0 {
            continue;
        }
        if !window
            .iter()
            .all(|&(_, _, len)| (module_size - len as f32).abs() < module_size / 2.0)
        {
            continue;
        }
        let (_, mid_start, mid_len) = window[2];
        let center_x = mid_start as f32 + mid_len as f32 / 2.0;
        if let Some(center_y) =
            cross_check_alignment_vertical(image, row, center_x as usize, module_size)
        {
            let closer = best
                .map_or(true, |p| (center_x - est_x).abs() < (p.x - est_x).abs());
            if closer {
                best = Some(Point::new(center_x, center_y));
            }
        }
    }
    best
}

/// Verify the same five-run signature vertically through the candidate
/// center column and refine the y coordinate.
fn cross_check_alignment_vertical(
    image: &BitMatrix,
    start_y: usize,
    center_x: usize,
    module_size: f32,
) -> Option<f32> {
    if center_x >= image.width() || !image.get(center_x, start_y) {
        return None;
    }
    let height = image.height() as i64;
    let max_run = (module_size * 2.0) as i64 + 2;
    let at = |y: i64| y >= 0 && y < height && image.get(center_x, y as usize);

    // Center dark run, then the light and dark rings above and below.
    let mut top = start_y as i64;
    while top - 1 >= 0 && at(top - 1) && start_y as i64 - top < max_run {
        top -= 1;
    }
    let mut bottom = start_y as i64;
    while at(bottom + 1) && bottom - start_y as i64 <= max_run {
        bottom += 1;
    }
    let center_len = bottom - top + 1;

    let mut run_up_light = 0i64;
    let mut y = top - 1;
    while y >= 0 && !at(y) && run_up_light <= max_run {
        run_up_light += 1;
        y -= 1;
    }
    let run_up_dark_ok = y >= 0 && at(y);

    let mut run_down_light = 0i64;
    let mut y = bottom + 1;
    while y < height && !at(y) && run_down_light <= max_run {
        run_down_light += 1;
        y += 1;
    }
    let run_down_dark_ok = y < height && at(y);

    let variance = module_size / 2.0;
    let ok = run_up_dark_ok
        && run_down_dark_ok
        && (module_size - center_len as f32).abs() < variance
        && (module_size - run_up_light as f32).abs() < variance
        && (module_size - run_down_light as f32).abs() < variance;
    ok.then(|| top as f32 + center_len as f32 / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_snaps_to_4k_plus_1() {
        let tl = Point::new(0.0, 0.0);
        // 14 modules between centers -> dimension 21.
        let tr = Point::new(56.0, 0.0);
        let bl = Point::new(0.0, 56.0);
        assert_eq!(compute_dimension(tl, tr, bl, 4.0).unwrap(), 21);
        // Slightly off distances still snap.
        let tr = Point::new(57.0, 0.0);
        assert_eq!(compute_dimension(tl, tr, bl, 4.0).unwrap(), 21);
    }

    #[test]
    fn alignment_found_in_clean_region() {
        let mut image = BitMatrix::new(60, 60);
        // 5x5 alignment pattern at modules (25..50 px), 5 px modules,
        // center (37, 37).
        for dy in 0..5usize {
            for dx in 0..5usize {
                let ring = dx == 0 || dx == 4 || dy == 0 || dy == 4;
                let core = dx == 2 && dy == 2;
                if ring || core {
                    for sy in 0..5 {
                        for sx in 0..5 {
                            image.set(25 + dx * 5 + sx, 25 + dy * 5 + sy);
                        }
                    }
                }
            }
        }
        let point = find_alignment_in_region(&image, 5.0, 37.0, 37.0, 4.0).unwrap();
        assert!((point.x - 37.5).abs() < 1.5, "x = {}", point.x);
        assert!((point.y - 37.5).abs() < 1.5, "y = {}", point.y);
    }
}
