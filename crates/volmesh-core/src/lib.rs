//! Core pipeline for volmesh.
//!
//! Turns a 3D intensity volume into a triangle mesh:
//! - [`normalize`](normalize::normalize) rescales intensities into `[0, 1]`
//! - [`binarize`](threshold::binarize) separates foreground with Otsu's method or a fixed cut
//! - [`extract`](marching_cubes::extract) runs marching cubes at an isovalue
//! - [`IsosurfaceSession`] re-extracts interactively as the isovalue changes
//!
//! All grids are stored x-fastest, see [`grid`].

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Accessors return plain values; must_use on every getter is noise
#![allow(clippy::must_use_candidate)]
// Voxel counts and grid coordinates are converted to f32 throughout
#![allow(clippy::cast_precision_loss)]

pub mod error;
pub mod grid;
pub mod marching_cubes;
pub mod mesh;
pub mod normalize;
pub mod options;
pub mod pipeline;
pub mod session;
pub mod threshold;

pub use error::{Result, VolmeshError};
pub use grid::{BinaryGrid, Dims, ScalarField, ScalarGrid};
pub use marching_cubes::extract;
pub use mesh::TriangleMesh;
pub use normalize::normalize;
pub use options::{PipelineOptions, PlyEncoding};
pub use pipeline::Pipeline;
pub use session::{IsosurfaceSession, RedrawHook};
pub use threshold::{binarize, otsu_threshold, segment, Segmentation, DEFAULT_OTSU_BINS};

// Re-export glam types for convenience
pub use glam::Vec3;
