//! The batch pipeline: normalize, threshold, extract.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::grid::{ScalarField, ScalarGrid};
use crate::marching_cubes;
use crate::mesh::TriangleMesh;
use crate::normalize;
use crate::options::PipelineOptions;
use crate::session::IsosurfaceSession;
use crate::threshold::{self, Segmentation};

/// A validated pipeline configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    /// Validates `options` and creates a pipeline.
    pub fn new(options: PipelineOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Rescales intensities into `[0, 1]`.
    pub fn normalize(&self, grid: &ScalarGrid) -> Result<ScalarGrid> {
        normalize::normalize(grid)
    }

    /// Thresholds an already normalized grid.
    pub fn binarize(&self, normalized: &ScalarGrid) -> Result<Segmentation> {
        let segmentation =
            threshold::segment(normalized, self.options.threshold, self.options.otsu_bins)?;
        log::info!(
            "threshold {:.4} ({}), {} of {} voxels foreground",
            segmentation.threshold,
            if segmentation.automatic { "otsu" } else { "fixed" },
            segmentation.mask.foreground_count(),
            normalized.len()
        );
        Ok(segmentation)
    }

    /// Normalizes `grid` and thresholds the normalized values.
    pub fn segment(&self, grid: &ScalarGrid) -> Result<Segmentation> {
        let normalized = self.normalize(grid)?;
        self.binarize(&normalized)
    }

    /// Extracts the isosurface at the configured isovalue.
    pub fn extract<F: ScalarField + ?Sized>(&self, field: &F) -> TriangleMesh {
        let isovalue = self.options.isovalue;
        let mesh = marching_cubes::extract(field, isovalue);
        if mesh.is_empty() {
            match field.value_range() {
                Some((lo, hi)) => log::warn!(
                    "no surface at isovalue {isovalue} in a {} field spanning [{lo}, {hi}]",
                    field.dims()
                ),
                None => log::warn!("no surface at isovalue {isovalue}, the field is empty"),
            }
        } else {
            log::info!(
                "extracted {} vertices, {} triangles",
                mesh.num_vertices(),
                mesh.num_triangles()
            );
        }
        mesh
    }

    /// Opens an interactive session over `field`, starting at the configured
    /// isovalue and spanning the configured slider range.
    pub fn session<F: ScalarField>(&self, field: F) -> IsosurfaceSession<F> {
        IsosurfaceSession::new(
            field,
            self.options.isovalue,
            self.options.slider_min..=self.options.slider_max,
        )
    }

    /// Location of an output file named `file_name` inside the output directory.
    pub fn output_path(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.options.output_dir.join(file_name)
    }
}
