//! Batch runs through the facade: load, mesh, write and verify.
//!
//! The viewer needs a window and is not exercised here.

use std::path::{Path, PathBuf};

use ndarray::Array3;
use tempfile::TempDir;
use volmesh::{run, verify, Pipeline, PipelineOptions, Stage, VolmeshError};

/// Writes a 4x4x4 `.npy` volume: background 10 with a centred 2x2x2 cube of 200.
fn write_cube_volume(dir: &Path) -> PathBuf {
    let path = dir.join("cube.npy");
    let inside = |c: usize| (1..=2).contains(&c);
    let array = Array3::from_shape_fn((4, 4, 4), |(z, y, x)| {
        if inside(x) && inside(y) && inside(z) {
            200_u16
        } else {
            10
        }
    });
    ndarray_npy::write_npy(&path, &array).unwrap();
    path
}

fn pipeline(output_dir: PathBuf, threshold: Option<f32>) -> Pipeline {
    Pipeline::new(PipelineOptions {
        threshold,
        isovalue: 0.5,
        output_dir,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn test_run_writes_watertight_cube() {
    let dir = TempDir::new().unwrap();
    let input = write_cube_volume(dir.path());
    let pipeline = pipeline(dir.path().join("generated_mesh"), Some(0.5));

    let output = run(&pipeline, &input, "cube.ply").unwrap();

    assert_eq!(output.output_path, dir.path().join("generated_mesh").join("cube.ply"));
    assert!(output.output_path.is_file());
    assert_eq!(output.binary.foreground_count(), 8);
    assert!(!output.mesh.is_empty());
    assert!(output.mesh.is_watertight());
    assert!((output.threshold_used - 0.5).abs() < f32::EPSILON);

    verify(&output).unwrap();
}

#[test]
fn test_run_with_otsu_threshold() {
    let dir = TempDir::new().unwrap();
    let input = write_cube_volume(dir.path());
    let pipeline = pipeline(dir.path().to_path_buf(), None);

    let output = run(&pipeline, &input, "otsu.ply").unwrap();
    assert_eq!(output.binary.foreground_count(), 8);
    assert!(output.threshold_used > 0.0 && output.threshold_used <= 1.0);
}

#[test]
fn test_verify_detects_mismatch() {
    let dir = TempDir::new().unwrap();
    let input = write_cube_volume(dir.path());
    let pipeline = pipeline(dir.path().to_path_buf(), Some(0.5));

    let mut output = run(&pipeline, &input, "cube.ply").unwrap();
    output.mesh.triangles.pop();

    let err = verify(&output).unwrap_err();
    assert_eq!(err.stage, Stage::Verify);
    assert!(matches!(err.source, VolmeshError::SizeMismatch { .. }));
}

#[test]
fn test_missing_input_fails_at_load() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(dir.path().to_path_buf(), None);

    let err = run(&pipeline, dir.path().join("absent.nii.gz"), "mesh.ply").unwrap_err();
    assert_eq!(err.stage, Stage::Load);
    assert!(matches!(err.source, VolmeshError::FileNotFound(_)));
    assert_eq!(err.to_string(), "load stage failed");
    assert!(!dir.path().join("mesh.ply").exists());
}

#[test]
fn test_constant_volume_fails_at_normalize() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("flat.npy");
    ndarray_npy::write_npy(&input, &Array3::<f32>::from_elem((3, 3, 3), 7.0)).unwrap();
    let pipeline = pipeline(dir.path().to_path_buf(), None);

    let err = run(&pipeline, &input, "mesh.ply").unwrap_err();
    assert_eq!(err.stage, Stage::Normalize);
    assert!(matches!(err.source, VolmeshError::DegenerateVolume { .. }));
    assert!(!dir.path().join("mesh.ply").exists());
}

#[test]
fn test_session_from_run_output() {
    let dir = TempDir::new().unwrap();
    let input = write_cube_volume(dir.path());
    let pipeline = pipeline(dir.path().to_path_buf(), Some(0.5));

    let output = run(&pipeline, &input, "cube.ply").unwrap();
    let mut session = pipeline.session(output.binary.clone());
    assert_eq!(session.mesh(), &output.mesh);

    session.on_isovalue_changed(0.25);
    session.on_isovalue_changed(0.5);
    assert_eq!(session.mesh(), &output.mesh);
}
