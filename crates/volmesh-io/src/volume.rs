//! Loading intensity volumes from disk.

use std::path::Path;

use glam::Vec3;
use ndarray::Array3;
use ndarray_npy::{read_npy, ReadNpyError, ReadableElement};
use nifti::{NiftiObject, NiftiVolume, RandomAccessNiftiVolume, ReaderOptions};
use volmesh_core::{Dims, Result, ScalarGrid, VolmeshError};

use crate::unsupported;

/// Volume file formats understood by [`load_volume`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeFormat {
    /// NIfTI-1, optionally gzip-compressed (`.nii`, `.nii.gz`).
    Nifti,
    /// NumPy array file (`.npy`).
    Npy,
}

impl VolumeFormat {
    /// Picks a format from the file name, `None` if the extension is unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".nii") || name.ends_with(".nii.gz") {
            Some(Self::Nifti)
        } else if name.ends_with(".npy") {
            Some(Self::Npy)
        } else {
            None
        }
    }
}

/// Loads a 3D intensity volume.
///
/// The format is chosen from the file extension. Samples come back x-fastest
/// with the voxel spacing recorded in the file (unit spacing for `.npy`).
pub fn load_volume(path: impl AsRef<Path>) -> Result<ScalarGrid> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(VolmeshError::FileNotFound(path.to_path_buf()));
    }

    let grid = match VolumeFormat::from_path(path) {
        Some(VolumeFormat::Nifti) => load_nifti(path)?,
        Some(VolumeFormat::Npy) => load_npy(path)?,
        None => {
            return Err(unsupported(
                path,
                "expected a .nii, .nii.gz or .npy file",
            ))
        }
    };

    log::info!(
        "loaded {} volume {} with spacing {:?}",
        grid.dims(),
        path.display(),
        grid.spacing()
    );
    Ok(grid)
}

fn load_nifti(path: &Path) -> Result<ScalarGrid> {
    let object = ReaderOptions::new()
        .read_file(path)
        .map_err(|e| unsupported(path, e.to_string()))?;

    let pixdim = object.header().pixdim;
    let spacing = Vec3::from_array([pixdim[1], pixdim[2], pixdim[3]].map(|d| {
        // Unset or bogus pixdim falls back to unit voxels
        if d.is_finite() && d > 0.0 {
            d
        } else {
            1.0
        }
    }));

    let volume = object.into_volume();
    let shape = volume.dim();
    if shape.is_empty() || (shape.len() > 4 && shape[4..].iter().any(|&d| d > 1)) {
        return Err(unsupported(
            path,
            format!("expected a 3D or 4D volume, got shape {shape:?}"),
        ));
    }
    if shape.len() == 4 && shape[3] > 1 {
        log::warn!(
            "{} has {} frames, using the first",
            path.display(),
            shape[3]
        );
    }

    let extent = |axis: usize| shape.get(axis).map_or(1, |&d| usize::from(d));
    let dims = Dims::new(extent(0), extent(1), extent(2));

    let mut coords = vec![0_u16; shape.len()];
    let mut values = Vec::with_capacity(dims.len());
    for z in 0..dims.nz {
        for y in 0..dims.ny {
            for x in 0..dims.nx {
                for (c, v) in coords.iter_mut().zip([x, y, z]) {
                    *c = u16::try_from(v).unwrap_or(u16::MAX);
                }
                let value = volume
                    .get_f32(&coords)
                    .map_err(|e| unsupported(path, e.to_string()))?;
                values.push(value);
            }
        }
    }

    Ok(ScalarGrid::new(dims, values)?.with_spacing(spacing))
}

fn load_npy(path: &Path) -> Result<ScalarGrid> {
    // Tried in order until one matches the file's dtype.
    let readers: [fn(&Path) -> std::result::Result<Array3<f32>, ReadNpyError>; 6] = [
        read_npy_as::<f32>,
        read_npy_as::<f64>,
        read_npy_as::<u8>,
        read_npy_as::<i16>,
        read_npy_as::<u16>,
        read_npy_as::<i32>,
    ];

    let mut last_error = None;
    for read in readers {
        match read(path) {
            Ok(array) => {
                let (nz, ny, nx) = array.dim();
                // Logical iteration order of a (z, y, x) array is x-fastest.
                return ScalarGrid::from_zyx(
                    [nz, ny, nx],
                    array.iter().copied().collect(),
                    Vec3::ONE,
                );
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(unsupported(
        path,
        last_error.map_or_else(
            || "no readable array".to_string(),
            |e| format!("expected a 3D f32, f64, u8, i16, u16 or i32 array ({e})"),
        ),
    ))
}

/// Reads a 3D array of `T`, widening the samples to `f32`.
#[allow(clippy::cast_possible_truncation)]
fn read_npy_as<T>(path: &Path) -> std::result::Result<Array3<f32>, ReadNpyError>
where
    T: ReadableElement + Copy + Into<f64>,
{
    let array: Array3<T> = read_npy(path)?;
    Ok(array.mapv(|v| v.into() as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_path() {
        let f = |s: &str| VolumeFormat::from_path(&PathBuf::from(s));
        assert_eq!(f("scan.nii"), Some(VolumeFormat::Nifti));
        assert_eq!(f("scan.NII.GZ"), Some(VolumeFormat::Nifti));
        assert_eq!(f("dir/vol.npy"), Some(VolumeFormat::Npy));
        assert_eq!(f("mesh.ply"), None);
        assert_eq!(f("archive.gz"), None);
    }
}
