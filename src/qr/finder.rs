//! Finder pattern location
//!
//! Scans the binarized image for the 1:1:3:1:1 dark-light ratio of the
//! three corner patterns, cross-checks candidates vertically and
//! horizontally, merges nearby sightings, and orders the best three into
//! bottom-left / top-left / top-right.

use crate::common::BitMatrix;
use crate::symbol::Point;
use crate::{Error, Result};

const CENTER_QUORUM: usize = 2;
const MIN_SKIP: usize = 3;
const MAX_MODULES: usize = 57;

#[derive(Debug, Clone, Copy)]
pub struct FinderPattern {
    pub x: f32,
    pub y: f32,
    pub estimated_module_size: f32,
    pub count: usize,
}

impl FinderPattern {
    fn about_equals(&self, module_size: f32, i: f32, j: f32) -> bool {
        if (i - self.y).abs() <= module_size && (j - self.x).abs() <= module_size {
            let delta = (module_size - self.estimated_module_size).abs();
            delta <= 1.0 || delta <= self.estimated_module_size
        } else {
            false
        }
    }

    fn combine(&mut self, i: f32, j: f32, module_size: f32) {
        let count = self.count as f32;
        self.x = (count * self.x + j) / (count + 1.0);
        self.y = (count * self.y + i) / (count + 1.0);
        self.estimated_module_size =
            (count * self.estimated_module_size + module_size) / (count + 1.0);
        self.count += 1;
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// The three ordered corner patterns.
pub struct FinderPatternInfo {
    pub bottom_left: FinderPattern,
    pub top_left: FinderPattern,
    pub top_right: FinderPattern,
}

pub fn find(image: &BitMatrix, try_harder: bool) -> Result<FinderPatternInfo> {
    let width = image.width();
    let height = image.height();
    let mut candidates: Vec<FinderPattern> = Vec::new();

    // Assume the symbol fills at least a quarter of the image unless asked
    // to try harder; then scan densely.
    let mut skip = (3 * height) / (4 * MAX_MODULES);
    if skip < MIN_SKIP || try_harder {
        skip = MIN_SKIP;
    }

    let mut row = skip - 1;
    while row < height {
        let mut state_count = [0usize; 5];
        let mut current_state = 0usize;
        for col in 0..width {
            if image.get(col, row) {
                if current_state & 1 == 1 {
                    current_state += 1;
                }
                state_count[current_state] += 1;
            } else if current_state & 1 == 0 {
                if current_state == 4 {
                    if found_pattern_cross(&state_count) {
                        handle_possible_center(image, &mut candidates, &state_count, row, col);
                        state_count = [0; 5];
                        current_state = 0;
                    } else {
                        // Slide the window: drop the first two runs.
                        state_count = [state_count[2], state_count[3], state_count[4], 1, 0];
                        current_state = 3;
                    }
                } else {
                    current_state += 1;
                    state_count[current_state] += 1;
                }
            } else {
                state_count[current_state] += 1;
            }
        }
        if found_pattern_cross(&state_count) {
            handle_possible_center(image, &mut candidates, &state_count, row, width);
        }
        row += skip;
    }

    let best = select_best_patterns(candidates)?;
    Ok(order_patterns(best))
}

/// Do the five run lengths look like 1:1:3:1:1 within 50% per module?
fn found_pattern_cross(state_count: &[usize; 5]) -> bool {
    let total: usize = state_count.iter().sum();
    if total < 7 || state_count.iter().any(|&c| c == 0) {
        return false;
    }
    let module_size = total as f32 / 7.0;
    let max_variance = module_size / 2.0;
    (module_size - state_count[0] as f32).abs() < max_variance
        && (module_size - state_count[1] as f32).abs() < max_variance
        && (3.0 * module_size - state_count[2] as f32).abs() < 3.0 * max_variance
        && (module_size - state_count[3] as f32).abs() < max_variance
        && (module_size - state_count[4] as f32).abs() < max_variance
}

fn center_from_end(state_count: &[usize; 5], end: usize) -> f32 {
    (end - state_count[4] - state_count[3]) as f32 - state_count[2] as f32 / 2.0
}

fn handle_possible_center(
    image: &BitMatrix,
    candidates: &mut Vec<FinderPattern>,
    state_count: &[usize; 5],
    row: usize,
    col: usize,
) {
    let total: usize = state_count.iter().sum();
    let center_j = center_from_end(state_count, col);
    let Some(center_i) = cross_check(image, row, center_j as usize, state_count[2], total, true)
    else {
        return;
    };
    let Some(center_j) = cross_check(image, center_i as usize, center_j as usize, state_count[2], total, false)
    else {
        return;
    };
    let module_size = total as f32 / 7.0;

    for candidate in candidates.iter_mut() {
        if candidate.about_equals(module_size, center_i, center_j) {
            candidate.combine(center_i, center_j, module_size);
            return;
        }
    }
    candidates.push(FinderPattern {
        x: center_j,
        y: center_i,
        estimated_module_size: module_size,
        count: 1,
    });
}

/// Re-count the five runs through (start_i, center_j) along one axis.
/// Returns the refined center coordinate along that axis.
fn cross_check(
    image: &BitMatrix,
    center_i: usize,
    center_j: usize,
    max_count: usize,
    original_total: usize,
    vertical: bool,
) -> Option<f32> {
    let limit = if vertical {
        image.height()
    } else {
        image.width()
    };
    let at = |pos: usize| {
        if vertical {
            image.get(center_j, pos)
        } else {
            image.get(pos, center_i)
        }
    };
    let start = if vertical { center_i } else { center_j };
    let mut state_count = [0usize; 5];

    // Walk outward from the center: dark core, light ring, dark ring.
    let mut pos = start as i64;
    while pos >= 0 && at(pos as usize) {
        state_count[2] += 1;
        pos -= 1;
    }
    if pos < 0 {
        return None;
    }
    while pos >= 0 && !at(pos as usize) && state_count[1] <= max_count {
        state_count[1] += 1;
        pos -= 1;
    }
    if pos < 0 || state_count[1] > max_count {
        return None;
    }
    while pos >= 0 && at(pos as usize) && state_count[0] <= max_count {
        state_count[0] += 1;
        pos -= 1;
    }
    if state_count[0] > max_count {
        return None;
    }

    let mut pos = start + 1;
    while pos < limit && at(pos) {
        state_count[2] += 1;
        pos += 1;
    }
    if pos == limit {
        return None;
    }
    while pos < limit && !at(pos) && state_count[3] < max_count {
        state_count[3] += 1;
        pos += 1;
    }
    if pos == limit || state_count[3] >= max_count {
        return None;
    }
    while pos < limit && at(pos) && state_count[4] < max_count {
        state_count[4] += 1;
        pos += 1;
    }
    if state_count[4] >= max_count {
        return None;
    }

    // Reject if the run total drifted more than 40% from the row scan.
    let total: usize = state_count.iter().sum();
    if 5 * total.abs_diff(original_total) >= 2 * original_total {
        return None;
    }
    found_pattern_cross(&state_count).then(|| center_from_end(&state_count, pos))
}

/// Keep the three most-seen candidates, preferring consistent module sizes.
fn select_best_patterns(mut candidates: Vec<FinderPattern>) -> Result<[FinderPattern; 3]> {
    candidates.retain(|c| c.count >= CENTER_QUORUM);
    if candidates.len() < 3 {
        return Err(Error::NotFound);
    }
    if candidates.len() > 3 {
        // Throw out the outliers by module size.
        let average: f32 = candidates
            .iter()
            .map(|c| c.estimated_module_size)
            .sum::<f32>()
            / candidates.len() as f32;
        candidates.sort_by(|a, b| {
            let da = (a.estimated_module_size - average).abs();
            let db = (b.estimated_module_size - average).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(3);
    }
    Ok([candidates[0], candidates[1], candidates[2]])
}

/// Order as bottom-left, top-left, top-right. The top-left corner is the
/// one off the hypotenuse; the cross product settles which of the other
/// two is which.
fn order_patterns(mut patterns: [FinderPattern; 3]) -> FinderPatternInfo {
    let d01 = patterns[0].point().distance(patterns[1].point());
    let d12 = patterns[1].point().distance(patterns[2].point());
    let d02 = patterns[0].point().distance(patterns[2].point());

    let (mut a, b, mut c) = if d12 >= d01 && d12 >= d02 {
        (patterns[1], patterns[0], patterns[2])
    } else if d02 >= d12 && d02 >= d01 {
        (patterns[0], patterns[1], patterns[2])
    } else {
        (patterns[0], patterns[2], patterns[1])
    };

    if cross_product_z(a.point(), b.point(), c.point()) < 0.0 {
        std::mem::swap(&mut a, &mut c);
    }

    patterns = [a, b, c];
    FinderPatternInfo {
        bottom_left: patterns[0],
        top_left: patterns[1],
        top_right: patterns[2],
    }
}

fn cross_product_z(a: Point, b: Point, c: Point) -> f32 {
    (c.x - b.x) * (a.y - b.y) - (c.y - b.y) * (a.x - b.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Paint a finder pattern with its top-left module corner at (left, top).
    fn paint_finder(image: &mut BitMatrix, left: usize, top: usize, scale: usize) {
        for dy in 0..7 {
            for dx in 0..7 {
                let ring = dx == 0 || dx == 6 || dy == 0 || dy == 6;
                let core = (2..=4).contains(&dx) && (2..=4).contains(&dy);
                if ring || core {
                    for sy in 0..scale {
                        for sx in 0..scale {
                            image.set(left + dx * scale + sx, top + dy * scale + sy);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn ratio_check_accepts_scaled_patterns() {
        assert!(found_pattern_cross(&[1, 1, 3, 1, 1]));
        assert!(found_pattern_cross(&[4, 4, 12, 4, 4]));
        assert!(found_pattern_cross(&[4, 5, 11, 4, 4]));
        assert!(!found_pattern_cross(&[1, 1, 1, 1, 1]));
        assert!(!found_pattern_cross(&[4, 4, 4, 4, 12]));
        assert!(!found_pattern_cross(&[0, 1, 3, 1, 1]));
    }

    #[test]
    fn locates_three_painted_finders() {
        let mut image = BitMatrix::new(200, 200);
        // 4 px/module; patterns at the usual three corners of a notional
        // symbol occupying the image.
        paint_finder(&mut image, 20, 20, 4);
        paint_finder(&mut image, 150, 20, 4);
        paint_finder(&mut image, 20, 150, 4);

        let info = find(&image, false).unwrap();
        // Centers sit 3.5 modules in: 20 + 14 = 34.
        assert!((info.top_left.x - 34.0).abs() < 1.5);
        assert!((info.top_left.y - 34.0).abs() < 1.5);
        assert!((info.top_right.x - 164.0).abs() < 1.5);
        assert!((info.top_right.y - 34.0).abs() < 1.5);
        assert!((info.bottom_left.x - 34.0).abs() < 1.5);
        assert!((info.bottom_left.y - 164.0).abs() < 1.5);
        assert!((info.top_left.estimated_module_size - 4.0).abs() < 0.5);
    }

    #[test]
    fn empty_image_is_not_found() {
        let image = BitMatrix::new(100, 100);
        assert!(matches!(find(&image, true), Err(Error::NotFound)));
    }
}
