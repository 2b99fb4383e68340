//! Configuration options for the volmesh pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VolmeshError};
use crate::threshold::DEFAULT_OTSU_BINS;

/// Pipeline configuration.
///
/// Every field has a default, so a JSON config file only needs to name the
/// settings it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Fixed threshold on normalized intensities. Otsu's method when absent.
    pub threshold: Option<f32>,

    /// Histogram bins used by Otsu's method.
    pub otsu_bins: usize,

    /// Isovalue used for the saved mesh.
    pub isovalue: f32,

    /// Lower bound of the interactive isovalue slider.
    pub slider_min: f32,

    /// Upper bound of the interactive isovalue slider.
    pub slider_max: f32,

    /// Directory the output mesh is written into.
    pub output_dir: PathBuf,

    /// Encoding of the written PLY file.
    pub ply_encoding: PlyEncoding,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            threshold: None,
            otsu_bins: DEFAULT_OTSU_BINS,
            isovalue: 1.0,
            slider_min: 0.0,
            slider_max: 1.0,
            output_dir: PathBuf::from("generated_mesh"),
            ply_encoding: PlyEncoding::default(),
        }
    }
}

impl PipelineOptions {
    /// Loads options from a JSON file, filling unspecified fields with defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => VolmeshError::FileNotFound(path.to_path_buf()),
            _ => VolmeshError::Io(e),
        })?;
        let options: Self = serde_json::from_str(&text)?;
        options.validate()?;
        Ok(options)
    }

    /// Checks that the options describe a runnable pipeline.
    pub fn validate(&self) -> Result<()> {
        if let Some(t) = self.threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(VolmeshError::InvalidArgument(format!(
                    "threshold must lie in [0, 1] (it applies to normalized intensities), got {t}"
                )));
            }
        }
        if self.otsu_bins < 2 {
            return Err(VolmeshError::InvalidArgument(format!(
                "otsu_bins must be at least 2, got {}",
                self.otsu_bins
            )));
        }
        if !self.isovalue.is_finite() {
            return Err(VolmeshError::InvalidArgument(format!(
                "isovalue must be finite, got {}",
                self.isovalue
            )));
        }
        if !(self.slider_min.is_finite()
            && self.slider_max.is_finite()
            && self.slider_min < self.slider_max)
        {
            return Err(VolmeshError::InvalidArgument(format!(
                "slider range [{}, {}] is empty",
                self.slider_min, self.slider_max
            )));
        }
        // The saved mesh and the viewer's first frame must show the same surface
        if !(self.slider_min..=self.slider_max).contains(&self.isovalue) {
            return Err(VolmeshError::InvalidArgument(format!(
                "isovalue {} lies outside the slider range [{}, {}]",
                self.isovalue, self.slider_min, self.slider_max
            )));
        }
        Ok(())
    }
}

/// Encoding of written PLY files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlyEncoding {
    /// Binary little endian.
    #[default]
    Binary,
    /// Human-readable ASCII.
    Ascii,
}
