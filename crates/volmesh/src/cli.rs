//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use volmesh_core::{PipelineOptions, PlyEncoding, Result};

#[derive(Parser, Debug, Clone)]
#[command(name = "volmesh")]
#[command(version, about = "Extract an isosurface mesh from a 3D volume", long_about = None)]
pub struct Args {
    /// Input volume (.nii, .nii.gz or .npy)
    pub input_file: PathBuf,

    /// Output PLY file name, written inside the output directory
    pub output_file: PathBuf,

    /// Fixed threshold in [0, 1] on normalized intensities (default: Otsu)
    #[arg(long, allow_negative_numbers = true)]
    pub threshold: Option<f32>,

    /// Isovalue for the initial extraction
    #[arg(long, allow_negative_numbers = true)]
    pub isovalue: Option<f32>,

    /// Directory the mesh is written to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// JSON file with pipeline options; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write ASCII PLY instead of binary
    #[arg(long)]
    pub ascii: bool,

    /// Skip the interactive viewer
    #[arg(long)]
    pub no_view: bool,

    /// Re-read the written mesh and check its counts
    #[arg(long)]
    pub verify: bool,
}

impl Args {
    /// Builds pipeline options: the config file (or defaults) with flags on top.
    pub fn options(&self) -> Result<PipelineOptions> {
        let mut options = match &self.config {
            Some(path) => PipelineOptions::from_json_file(path)?,
            None => PipelineOptions::default(),
        };

        if self.threshold.is_some() {
            options.threshold = self.threshold;
        }
        if let Some(isovalue) = self.isovalue {
            options.isovalue = isovalue;
        }
        if let Some(dir) = &self.output_dir {
            options.output_dir.clone_from(dir);
        }
        if self.ascii {
            options.ply_encoding = PlyEncoding::Ascii;
        }

        options.validate()?;
        Ok(options)
    }
}
