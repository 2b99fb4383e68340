//! volmesh: turn a 3D scan into a triangle mesh.
//!
//! Loads a NIfTI or `.npy` volume, rescales it into `[0, 1]`, separates the
//! foreground with Otsu's method (or a fixed threshold), extracts an
//! isosurface with marching cubes and writes it as PLY. [`show`] then opens a
//! viewer whose slider re-extracts the surface live.
//!
//! # Quick Start
//!
//! ```no_run
//! use volmesh::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let pipeline = Pipeline::new(PipelineOptions::default())?;
//!     let output = run(&pipeline, "scan.nii.gz", "mesh.ply")?;
//!
//!     let session = pipeline.session(output.binary);
//!     show(session, output.threshold_used)?;
//!     Ok(())
//! }
//! ```

mod app;
pub mod cli;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use volmesh_core::{
    extract, BinaryGrid, Dims, IsosurfaceSession, Pipeline, PipelineOptions, PlyEncoding,
    ScalarField, ScalarGrid, TriangleMesh, Vec3, VolmeshError,
};
pub use volmesh_io::{load_volume, read_ply, write_ply};
pub use volmesh_render::RenderError;

/// A step of the batch pipeline, used to say where a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Normalize,
    Binarize,
    Write,
    Verify,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Load => "load",
            Self::Normalize => "normalize",
            Self::Binarize => "binarize",
            Self::Write => "write",
            Self::Verify => "verify",
        })
    }
}

/// A pipeline failure tagged with the stage it happened in.
#[derive(Error, Debug)]
#[error("{stage} stage failed")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: VolmeshError,
}

trait StageContext<T> {
    fn stage(self, stage: Stage) -> Result<T, StageError>;
}

impl<T> StageContext<T> for volmesh_core::Result<T> {
    fn stage(self, stage: Stage) -> Result<T, StageError> {
        self.map_err(|source| StageError { stage, source })
    }
}

/// Errors from the interactive viewer.
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// What a batch run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Foreground mask the mesh was extracted from.
    pub binary: BinaryGrid,
    /// Mesh at the configured isovalue.
    pub mesh: TriangleMesh,
    /// Threshold applied to the normalized intensities.
    pub threshold_used: f32,
    /// Where the mesh was written.
    pub output_path: PathBuf,
}

/// Runs load → normalize → binarize → extract → write.
///
/// `output_file` is placed inside the pipeline's output directory, which is
/// created if needed.
pub fn run(
    pipeline: &Pipeline,
    input: impl AsRef<Path>,
    output_file: impl AsRef<Path>,
) -> Result<RunOutput, StageError> {
    let grid = load_volume(input).stage(Stage::Load)?;
    let normalized = pipeline.normalize(&grid).stage(Stage::Normalize)?;
    let segmentation = pipeline.binarize(&normalized).stage(Stage::Binarize)?;

    let mesh = pipeline.extract(&segmentation.mask);

    let output_path = pipeline.output_path(output_file);
    write_ply(&mesh, &output_path, pipeline.options().ply_encoding).stage(Stage::Write)?;

    Ok(RunOutput {
        binary: segmentation.mask,
        mesh,
        threshold_used: segmentation.threshold,
        output_path,
    })
}

/// Re-reads the written mesh and checks it has the expected counts.
pub fn verify(output: &RunOutput) -> Result<(), StageError> {
    let written = read_ply(&output.output_path).stage(Stage::Verify)?;
    let check = |expected: usize, actual: usize| {
        if expected == actual {
            Ok(())
        } else {
            Err(VolmeshError::SizeMismatch { expected, actual })
        }
    };
    check(output.mesh.num_vertices(), written.num_vertices()).stage(Stage::Verify)?;
    check(output.mesh.num_triangles(), written.num_triangles()).stage(Stage::Verify)?;
    log::info!(
        "verified {}: {} vertices, {} triangles",
        output.output_path.display(),
        written.num_vertices(),
        written.num_triangles()
    );
    Ok(())
}

/// Shows the viewer window for `session`.
///
/// Blocks until the window is closed or `Esc` is pressed.
pub fn show<F: ScalarField>(
    session: IsosurfaceSession<F>,
    threshold_used: f32,
) -> Result<(), ViewerError> {
    let _ = env_logger::try_init();
    app::run_app(session, threshold_used)
}
