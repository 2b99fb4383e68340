//! Min/max intensity rescaling.

use crate::error::{Result, VolmeshError};
use crate::grid::ScalarGrid;

/// Rescales every sample into `[0, 1]` using the grid's own minimum and maximum.
///
/// The minimum maps to exactly `0.0` and the maximum to exactly `1.0`. A constant
/// volume has no range to rescale and yields [`VolmeshError::DegenerateVolume`].
#[allow(clippy::float_cmp)]
pub fn normalize(grid: &ScalarGrid) -> Result<ScalarGrid> {
    let Some((min, max)) = grid.min_max() else {
        return Err(VolmeshError::InvalidArgument(
            "cannot normalize an empty volume".to_string(),
        ));
    };
    if grid.values().iter().any(|v| !v.is_finite()) {
        return Err(VolmeshError::InvalidArgument(
            "volume contains non-finite samples".to_string(),
        ));
    }
    if max == min {
        return Err(VolmeshError::DegenerateVolume { value: min });
    }

    let range = max - min;
    log::debug!("normalizing {} samples over [{min}, {max}]", grid.len());
    Ok(grid.map(|v| {
        // Pin the extremes so rounding cannot push them off 0 and 1.
        if v == max {
            1.0
        } else {
            ((v - min) / range).clamp(0.0, 1.0)
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Dims;
    use proptest::prelude::*;

    #[test]
    fn test_extremes_map_to_unit_interval() {
        let grid = ScalarGrid::new(Dims::new(4, 1, 1), vec![-50.0, 0.0, 150.0, 100.0]).unwrap();
        let out = normalize(&grid).unwrap();
        assert_eq!(out.values(), &[0.0, 0.25, 1.0, 0.75]);
        assert_eq!(out.dims(), grid.dims());
    }

    #[test]
    fn test_constant_volume_is_degenerate() {
        let grid = ScalarGrid::new(Dims::new(2, 2, 2), vec![7.0; 8]).unwrap();
        let err = normalize(&grid).unwrap_err();
        assert!(matches!(err, VolmeshError::DegenerateVolume { value } if value == 7.0));
    }

    #[test]
    fn test_empty_volume_is_rejected() {
        let grid = ScalarGrid::new(Dims::new(0, 0, 0), vec![]).unwrap();
        assert!(matches!(
            normalize(&grid),
            Err(VolmeshError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_non_finite_is_rejected() {
        let nan = ScalarGrid::new(Dims::new(2, 1, 1), vec![0.0, f32::NAN]).unwrap();
        let inf = ScalarGrid::new(Dims::new(2, 1, 1), vec![0.0, f32::INFINITY]).unwrap();
        assert!(matches!(normalize(&nan), Err(VolmeshError::InvalidArgument(_))));
        assert!(matches!(normalize(&inf), Err(VolmeshError::InvalidArgument(_))));
    }

    proptest! {
        #[test]
        fn prop_output_in_unit_range(values in prop::collection::vec(-1.0e4_f32..1.0e4, 2..64)) {
            let n = values.len();
            let grid = ScalarGrid::new(Dims::new(n, 1, 1), values.clone()).unwrap();
            let (min, max) = grid.min_max().unwrap();
            prop_assume!(max > min);

            let out = normalize(&grid).unwrap();
            for (&o, &v) in out.values().iter().zip(&values) {
                prop_assert!((0.0..=1.0).contains(&o));
                if v == min {
                    prop_assert_eq!(o, 0.0);
                }
                if v == max {
                    prop_assert_eq!(o, 1.0);
                }
            }
        }
    }
}
