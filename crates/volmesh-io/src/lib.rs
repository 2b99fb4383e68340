//! File I/O for volmesh.
//!
//! - [`load_volume`] reads NIfTI-1 (`.nii`, `.nii.gz`) and NumPy (`.npy`) volumes
//! - [`write_ply`] / [`read_ply`] store and load triangle meshes as PLY
//!
//! Errors are reported as [`volmesh_core::VolmeshError`].

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod ply;
pub mod volume;

use std::path::Path;

use volmesh_core::VolmeshError;

pub use ply::{read_ply, write_ply};
pub use volume::{load_volume, VolumeFormat};

pub(crate) fn unsupported(path: &Path, reason: impl Into<String>) -> VolmeshError {
    VolmeshError::UnsupportedFormat {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}
