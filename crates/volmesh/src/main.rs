//! volmesh CLI - volume to isosurface mesh.
//!
//! Loads a scan, thresholds it, writes the marching-cubes mesh as PLY and
//! opens the interactive viewer unless `--no-view` is given.

use anyhow::{Context, Result};
use clap::Parser;

use volmesh::cli::Args;
use volmesh::Pipeline;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let options = args.options().context("Invalid options")?;
    let pipeline = Pipeline::new(options).context("Invalid options")?;

    let output = volmesh::run(&pipeline, &args.input_file, &args.output_file).with_context(|| {
        format!("Failed to mesh {}", args.input_file.display())
    })?;

    if args.verify {
        volmesh::verify(&output).context("Written mesh does not match")?;
    }

    if args.no_view {
        return Ok(());
    }

    let threshold_used = output.threshold_used;
    let session = pipeline.session(output.binary);
    volmesh::show(session, threshold_used).context("Viewer failed")?;

    Ok(())
}
