//! Estimation of a per-pixel depth field from a normalized intensity grid
//!
//! The depth estimator is a cheap, fully deterministic stand-in for a real
//! monocular depth model. It blends two cues with fixed weights: the Euclidean
//! distance to the nearest detected edge (regions far away from any outline
//! are pushed "deeper" than the outlines themselves) and the smoothed image
//! brightness. All constants below are design constants of the pipeline and
//! intentionally not part of the public parameters.

use log::debug;

use crate::grid::ScalarGrid2d;
use crate::Real;

/// Weight of the edge-distance term in the final depth value
const STRUCTURAL_WEIGHT: f64 = 0.7;
/// Weight of the brightness term in the final depth value
const BRIGHTNESS_WEIGHT: f64 = 0.3;
/// Sobel gradient magnitude (on the `0..=255` intensity scale) above which a pixel counts as an edge
const EDGE_GRADIENT_THRESHOLD: f64 = 100.0;
/// Largest representable intensity value, used to normalize the brightness term
const MAX_INTENSITY: f64 = 255.0;
/// Separable 5-tap binomial kernel used to suppress quantization and resize noise
const BLUR_KERNEL: [f64; 5] = [
    1.0 / 16.0,
    4.0 / 16.0,
    6.0 / 16.0,
    4.0 / 16.0,
    1.0 / 16.0,
];

/// Large finite sentinel for "no edge reachable" in the distance transform
const DISTANCE_INF: f64 = 1.0e20;

/// Derives a normalized depth grid in `[0, 1]` from an intensity grid
///
/// The resulting grid has the same dimensions as the input. All values are
/// finite; a degenerate (e.g. all-zero) input yields an all-zero depth grid.
pub fn estimate_depth<R: Real>(intensity: &ScalarGrid2d<R>) -> ScalarGrid2d<R> {
    let width = intensity.width();
    let height = intensity.height();

    let raw: Vec<f64> = intensity
        .data()
        .iter()
        .map(|v| v.to_f64_unchecked())
        .collect();

    let blurred = blur_separable(&raw, width, height);
    let edge_mask = detect_edges(&blurred, width, height);
    let structural = structural_term(&edge_mask, width, height);

    debug!(
        "Depth estimation: {} of {} pixels classified as edges.",
        edge_mask.iter().filter(|&&e| e).count(),
        edge_mask.len()
    );

    let depth_values = blurred
        .iter()
        .zip(structural.iter())
        .map(|(&brightness, &distance)| {
            let depth = STRUCTURAL_WEIGHT * distance
                + BRIGHTNESS_WEIGHT * (brightness / MAX_INTENSITY);
            R::from_f64_unchecked(depth.clamp(0.0, 1.0))
        })
        .collect();

    ScalarGrid2d::from_vec(width, height, depth_values)
}

/// Applies the separable binomial blur kernel with clamped borders
fn blur_separable(values: &[f64], width: usize, height: usize) -> Vec<f64> {
    let radius = BLUR_KERNEL.len() as isize / 2;
    let clamp = |i: isize, len: usize| i.clamp(0, len as isize - 1) as usize;

    // Horizontal pass
    let mut horizontal = vec![0.0; values.len()];
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0;
            for (k, weight) in BLUR_KERNEL.iter().enumerate() {
                let sx = clamp(x as isize + k as isize - radius, width);
                sum += weight * values[y * width + sx];
            }
            horizontal[y * width + x] = sum;
        }
    }

    // Vertical pass
    let mut blurred = vec![0.0; values.len()];
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0;
            for (k, weight) in BLUR_KERNEL.iter().enumerate() {
                let sy = clamp(y as isize + k as isize - radius, height);
                sum += weight * horizontal[sy * width + x];
            }
            blurred[y * width + x] = sum;
        }
    }

    blurred
}

/// Computes a binary edge mask by thresholding the Sobel gradient magnitude
fn detect_edges(values: &[f64], width: usize, height: usize) -> Vec<bool> {
    let clamp = |i: isize, len: usize| i.clamp(0, len as isize - 1) as usize;
    let sample = |x: isize, y: isize| values[clamp(y, height) * width + clamp(x, width)];

    let mut edge_mask = vec![false; values.len()];
    for y in 0..height as isize {
        for x in 0..width as isize {
            let gx = (sample(x + 1, y - 1) + 2.0 * sample(x + 1, y) + sample(x + 1, y + 1))
                - (sample(x - 1, y - 1) + 2.0 * sample(x - 1, y) + sample(x - 1, y + 1));
            let gy = (sample(x - 1, y + 1) + 2.0 * sample(x, y + 1) + sample(x + 1, y + 1))
                - (sample(x - 1, y - 1) + 2.0 * sample(x, y - 1) + sample(x + 1, y - 1));

            let magnitude = (gx * gx + gy * gy).sqrt();
            edge_mask[(y as usize) * width + x as usize] = magnitude >= EDGE_GRADIENT_THRESHOLD;
        }
    }

    edge_mask
}

/// Computes the normalized edge-distance field in `[0, 1]`
///
/// Per pixel this is the Euclidean distance to the nearest edge pixel, divided
/// by the largest such distance of the grid. A mask without any edge pixels
/// (one edge-free region) and a mask where every pixel is an edge (maximum
/// distance zero) both yield an all-zero field instead of a division by zero.
fn structural_term(edge_mask: &[bool], width: usize, height: usize) -> Vec<f64> {
    if !edge_mask.iter().any(|&e| e) {
        return vec![0.0; edge_mask.len()];
    }

    let distances = distance_transform(edge_mask, width, height);
    let max_distance = distances.iter().copied().fold(0.0, f64::max);
    if max_distance <= 0.0 {
        return vec![0.0; edge_mask.len()];
    }

    distances.iter().map(|d| d / max_distance).collect()
}

/// Exact Euclidean distance transform of the inverted edge mask
/// (Felzenszwalb/Huttenlocher separable lower-envelope algorithm)
fn distance_transform(edge_mask: &[bool], width: usize, height: usize) -> Vec<f64> {
    // Squared-distance seed: zero at edge pixels, "infinite" elsewhere
    let mut squared: Vec<f64> = edge_mask
        .iter()
        .map(|&is_edge| if is_edge { 0.0 } else { DISTANCE_INF })
        .collect();

    // Transform along columns
    let mut column = vec![0.0; height];
    let mut transformed = vec![0.0; height];
    for x in 0..width {
        for y in 0..height {
            column[y] = squared[y * width + x];
        }
        distance_transform_1d(&column, &mut transformed);
        for y in 0..height {
            squared[y * width + x] = transformed[y];
        }
    }

    // Transform along rows
    let mut row_transformed = vec![0.0; width];
    for y in 0..height {
        let row = &squared[y * width..(y + 1) * width];
        distance_transform_1d(row, &mut row_transformed);
        squared[y * width..(y + 1) * width].copy_from_slice(&row_transformed);
    }

    squared.into_iter().map(f64::sqrt).collect()
}

/// One-dimensional squared Euclidean distance transform of a sampled function
fn distance_transform_1d(f: &[f64], d: &mut [f64]) {
    let n = f.len();
    debug_assert_eq!(n, d.len());
    if n == 0 {
        return;
    }

    // Indices of the parabolas forming the lower envelope
    let mut v = vec![0usize; n];
    // Boundaries between adjacent envelope parabolas
    let mut z = vec![0.0f64; n + 1];

    let mut k = 0usize;
    z[0] = -DISTANCE_INF;
    z[1] = DISTANCE_INF;

    for q in 1..n {
        let mut s = intersection(f, q, v[k]);
        while s <= z[k] && k > 0 {
            k -= 1;
            s = intersection(f, q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = DISTANCE_INF;
    }

    k = 0;
    for q in 0..n {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let p = v[k] as f64;
        d[q] = (q as f64 - p) * (q as f64 - p) + f[v[k]];
    }
}

/// Horizontal position where the parabolas rooted at `q` and `p` intersect
#[inline]
fn intersection(f: &[f64], q: usize, p: usize) -> f64 {
    let (fq, fp) = (f[q], f[p]);
    let (q, p) = (q as f64, p as f64);
    ((fq + q * q) - (fp + p * p)) / (2.0 * q - 2.0 * p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_grid_has_constant_brightness_only_depth() {
        // A constant image is one edge-free region: the structural term has to
        // vanish and only the weighted brightness term remains
        let intensity = ScalarGrid2d::from_vec(4, 4, vec![127.5; 16]);
        let depth = estimate_depth::<f64>(&intensity);

        let expected = BRIGHTNESS_WEIGHT * 127.5 / MAX_INTENSITY;
        for &value in depth.data() {
            assert!((value - expected).abs() < 1.0e-12);
        }
    }

    #[test]
    fn test_all_zero_grid_yields_all_zero_depth() {
        let intensity = ScalarGrid2d::from_vec(8, 8, vec![0.0; 64]);
        let depth = estimate_depth::<f64>(&intensity);

        assert!(depth.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_depth_values_are_finite_and_normalized() {
        // Hard vertical step, strong edge response in the middle
        let mut values = vec![0.0; 16 * 16];
        for y in 0..16 {
            for x in 8..16 {
                values[y * 16 + x] = 255.0;
            }
        }
        let intensity = ScalarGrid2d::from_vec(16, 16, values);
        let depth = estimate_depth::<f64>(&intensity);

        for &value in depth.data() {
            assert!(value.is_finite());
            assert!((0.0..=1.0).contains(&value));
        }
        // The step has to produce at least one pixel with a structural contribution
        assert!(depth.max_value() > BRIGHTNESS_WEIGHT);
    }

    #[test]
    fn test_detect_edges_on_step() {
        let mut values = vec![0.0; 8 * 8];
        for y in 0..8 {
            for x in 4..8 {
                values[y * 8 + x] = 255.0;
            }
        }
        let edges = detect_edges(&values, 8, 8);

        assert!(edges.iter().any(|&e| e));
        // Columns far away from the step stay edge-free
        for y in 0..8 {
            assert!(!edges[y * 8]);
            assert!(!edges[y * 8 + 7]);
        }
    }

    #[test]
    fn test_distance_transform_single_edge_pixel() {
        let mut mask = vec![false; 5 * 5];
        mask[2 * 5 + 2] = true;
        let distances = distance_transform(&mask, 5, 5);

        assert_eq!(distances[2 * 5 + 2], 0.0);
        assert!((distances[2 * 5 + 3] - 1.0).abs() < 1.0e-12);
        assert!((distances[3 * 5 + 3] - 2.0f64.sqrt()).abs() < 1.0e-12);
        assert!((distances[0] - 8.0f64.sqrt()).abs() < 1.0e-12);
    }

    #[test]
    fn test_distance_transform_is_exact_euclidean() {
        // Compare against brute force on a small random-ish mask
        let width = 7;
        let height = 6;
        let mut mask = vec![false; width * height];
        for (i, cell) in mask.iter_mut().enumerate() {
            *cell = (i * 7 + 3) % 11 == 0;
        }
        assert!(mask.iter().any(|&e| e));

        let distances = distance_transform(&mask, width, height);
        for y in 0..height {
            for x in 0..width {
                let mut best = f64::INFINITY;
                for ey in 0..height {
                    for ex in 0..width {
                        if mask[ey * width + ex] {
                            let dx = x as f64 - ex as f64;
                            let dy = y as f64 - ey as f64;
                            best = best.min((dx * dx + dy * dy).sqrt());
                        }
                    }
                }
                assert!((distances[y * width + x] - best).abs() < 1.0e-9);
            }
        }
    }
}
