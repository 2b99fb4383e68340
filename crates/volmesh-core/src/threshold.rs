//! Global thresholding: Otsu's method and fixed cut-offs.

use crate::error::{Result, VolmeshError};
use crate::grid::{BinaryGrid, ScalarGrid};

/// Default histogram resolution for [`otsu_threshold`].
pub const DEFAULT_OTSU_BINS: usize = 128;

/// Otsu's method for automatic threshold selection.
///
/// Builds a histogram of `bins` equal-width bins over `[min, max]` and picks the
/// split that maximizes the between-class variance, which is the same split that
/// minimizes the summed within-class variance. The first maximum wins on ties.
///
/// Returns the upper edge of the last background bin, so that classifying
/// `value >= threshold` as foreground agrees with the histogram split. Returns
/// `0.0` for empty input and the common value for a constant input.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn otsu_threshold(values: &[f32], bins: usize) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let bins = bins.max(2);

    let (min, max) = values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if max <= min {
        return min;
    }

    let width = f64::from(max - min) / bins as f64;
    let mut histogram = vec![0_u64; bins];
    for &v in values {
        let bin = ((f64::from(v - min) / width).floor() as usize).min(bins - 1);
        histogram[bin] += 1;
    }

    let total = values.len() as f64;
    let sum_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum();

    let mut weight_background = 0.0;
    let mut sum_background = 0.0;
    let mut best_variance = -1.0;
    let mut best_bin = 0;

    for (t, &count) in histogram.iter().enumerate() {
        weight_background += count as f64;
        if weight_background == 0.0 {
            continue;
        }
        let weight_foreground = total - weight_background;
        if weight_foreground == 0.0 {
            break;
        }

        sum_background += t as f64 * count as f64;
        let mean_background = sum_background / weight_background;
        let mean_foreground = (sum_total - sum_background) / weight_foreground;

        let variance =
            weight_background * weight_foreground * (mean_background - mean_foreground).powi(2);
        if variance > best_variance {
            best_variance = variance;
            best_bin = t;
        }
    }

    (f64::from(min) + (best_bin + 1) as f64 * width) as f32
}

/// Result of binarizing a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    /// Foreground/background mask.
    pub mask: BinaryGrid,
    /// The threshold that produced the mask (computed or supplied).
    pub threshold: f32,
    /// Whether the threshold was chosen automatically.
    pub automatic: bool,
}

/// Converts a scalar grid into a binary grid, keeping the threshold it used.
///
/// * `threshold == None`: Otsu's method over `bins` histogram bins; a voxel is
///   foreground if its value is at or above the computed threshold.
/// * `threshold == Some(t)`: a voxel is foreground if its value is strictly greater
///   than `t`. `t` must be finite.
///
/// Empty or full masks are valid results.
pub fn segment(grid: &ScalarGrid, threshold: Option<f32>, bins: usize) -> Result<Segmentation> {
    match threshold {
        None => {
            let t = otsu_threshold(grid.values(), bins);
            log::debug!("otsu threshold {t} over {bins} bins");
            Ok(Segmentation {
                mask: BinaryGrid::from_predicate(grid, |v| v >= t),
                threshold: t,
                automatic: true,
            })
        }
        Some(t) if t.is_finite() => Ok(Segmentation {
            mask: BinaryGrid::from_predicate(grid, |v| v > t),
            threshold: t,
            automatic: false,
        }),
        Some(t) => Err(VolmeshError::InvalidArgument(format!(
            "threshold must be finite, got {t}"
        ))),
    }
}

/// Converts a scalar grid into a binary grid, using [`DEFAULT_OTSU_BINS`] when
/// no threshold is given.
pub fn binarize(grid: &ScalarGrid, threshold: Option<f32>) -> Result<BinaryGrid> {
    segment(grid, threshold, DEFAULT_OTSU_BINS).map(|segmentation| segmentation.mask)
}
