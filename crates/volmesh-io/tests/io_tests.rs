//! Round-trip and error tests for volume loading and PLY output.

use std::fs;
use std::path::Path;

use ndarray::Array3;
use tempfile::TempDir;
use volmesh_core::{extract, Dims, PlyEncoding, ScalarGrid, TriangleMesh, Vec3, VolmeshError};
use volmesh_io::{load_volume, read_ply, write_ply};

/// Writes an uncompressed single-file NIfTI-1 volume of little-endian `f32`
/// samples. `dim` lists the extents in file order (x first).
fn write_nifti(path: &Path, dim: &[u16], pixdim: [f32; 3], samples: &[f32]) {
    let mut bytes = vec![0_u8; 352];
    let mut put = |offset: usize, field: &[u8]| {
        bytes[offset..offset + field.len()].copy_from_slice(field);
    };

    put(0, &348_i32.to_le_bytes());
    let mut dims = [1_i16; 8];
    dims[0] = i16::try_from(dim.len()).unwrap();
    for (slot, &d) in dims[1..].iter_mut().zip(dim) {
        *slot = i16::try_from(d).unwrap();
    }
    for (i, d) in dims.iter().enumerate() {
        put(40 + 2 * i, &d.to_le_bytes());
    }
    put(70, &16_i16.to_le_bytes()); // datatype: float32
    put(72, &32_i16.to_le_bytes()); // bitpix
    let pixdims = [1.0, pixdim[0], pixdim[1], pixdim[2], 1.0, 1.0, 1.0, 1.0];
    for (i, p) in pixdims.iter().enumerate() {
        put(76 + 4 * i, &p.to_le_bytes());
    }
    put(108, &352.0_f32.to_le_bytes()); // vox_offset
    put(112, &1.0_f32.to_le_bytes()); // scl_slope
    put(344, b"n+1\0");

    for v in samples {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    fs::write(path, bytes).unwrap();
}

fn sphere_mesh() -> TriangleMesh {
    let n = 10;
    let center = Vec3::splat(4.5);
    let grid = ScalarGrid::from_fn(Dims::new(n, n, n), |x, y, z| {
        (Vec3::new(x as f32, y as f32, z as f32) - center).length()
    });
    extract(&grid, 3.0)
}

fn assert_same_mesh(a: &TriangleMesh, b: &TriangleMesh) {
    assert_eq!(a.num_vertices(), b.num_vertices());
    assert_eq!(a.triangles, b.triangles);
    for (p, q) in a.vertices.iter().zip(&b.vertices) {
        assert!((*p - *q).length() < 1e-4, "{p:?} != {q:?}");
    }
    for (p, q) in a.normals.iter().zip(&b.normals) {
        assert!((*p - *q).length() < 1e-4, "{p:?} != {q:?}");
    }
}

#[test]
fn test_ply_round_trip_binary() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sphere.ply");
    let mesh = sphere_mesh();
    assert!(!mesh.is_empty());

    write_ply(&mesh, &path, PlyEncoding::Binary).unwrap();
    let back = read_ply(&path).unwrap();
    assert_same_mesh(&mesh, &back);
    assert!(!dir.path().join("sphere.ply.partial").exists());
}

#[test]
fn test_ply_round_trip_ascii() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sphere.ply");
    let mesh = sphere_mesh();

    write_ply(&mesh, &path, PlyEncoding::Ascii).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("ply\nformat ascii 1.0"));
    assert!(text.contains("property list uchar int vertex_indices"));

    assert_same_mesh(&mesh, &read_ply(&path).unwrap());
}

#[test]
fn test_write_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("generated_mesh").join("deeper").join("mesh.ply");
    write_ply(&sphere_mesh(), &path, PlyEncoding::Binary).unwrap();
    assert!(path.is_file());
}

#[test]
fn test_empty_mesh_is_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.ply");
    write_ply(&TriangleMesh::default(), &path, PlyEncoding::Ascii).unwrap();
    let back = read_ply(&path).unwrap();
    assert!(back.is_empty());
    assert_eq!(back.num_vertices(), 0);
}

#[test]
fn test_write_failure_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    // A regular file where a directory is needed
    let blocker = dir.path().join("not_a_dir");
    fs::write(&blocker, b"x").unwrap();
    let path = blocker.join("mesh.ply");

    let err = write_ply(&sphere_mesh(), &path, PlyEncoding::Binary).unwrap_err();
    assert!(matches!(err, VolmeshError::Write { .. }), "{err:?}");
    assert!(!path.exists());
}

#[test]
fn test_load_missing_file() {
    let err = load_volume("/nonexistent/scan.nii.gz").unwrap_err();
    assert!(matches!(err, VolmeshError::FileNotFound(_)));
}

#[test]
fn test_load_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scan.txt");
    fs::write(&path, b"not a volume").unwrap();
    let err = load_volume(&path).unwrap_err();
    assert!(matches!(err, VolmeshError::UnsupportedFormat { .. }), "{err:?}");
}

#[test]
fn test_load_corrupt_files() {
    let dir = TempDir::new().unwrap();
    for name in ["scan.nii", "scan.npy"] {
        let path = dir.path().join(name);
        fs::write(&path, b"garbage bytes").unwrap();
        let err = load_volume(&path).unwrap_err();
        assert!(
            matches!(err, VolmeshError::UnsupportedFormat { .. }),
            "{name}: {err:?}"
        );
    }
}

#[test]
fn test_load_npy_is_zyx() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("volume.npy");
    // Shape (z, y, x) = (2, 3, 4), value encodes its coordinates
    let array = Array3::from_shape_fn((2, 3, 4), |(z, y, x)| (100 * z + 10 * y + x) as f32);
    ndarray_npy::write_npy(&path, &array).unwrap();

    let grid = load_volume(&path).unwrap();
    assert_eq!(grid.dims(), Dims::new(4, 3, 2));
    assert_eq!(grid.spacing(), Vec3::ONE);
    assert_eq!(grid.get(3, 2, 1), 123.0);
    assert_eq!(grid.get(1, 0, 0), 1.0);
}

#[test]
fn test_load_npy_integer_dtype() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mask.npy");
    let array = Array3::from_shape_fn((2, 2, 2), |(z, _, _)| if z == 1 { 255_u8 } else { 0 });
    ndarray_npy::write_npy(&path, &array).unwrap();

    let grid = load_volume(&path).unwrap();
    assert_eq!(grid.min_max(), Some((0.0, 255.0)));
    assert_eq!(grid.get(0, 0, 1), 255.0);
}

#[test]
fn test_load_npy_wrong_rank() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("slice.npy");
    let array = ndarray::Array2::<f32>::zeros((3, 3));
    ndarray_npy::write_npy(&path, &array).unwrap();

    let err = load_volume(&path).unwrap_err();
    assert!(matches!(err, VolmeshError::UnsupportedFormat { .. }), "{err:?}");
}

#[test]
fn test_load_nifti_is_x_fastest_with_pixdim_spacing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scan.nii");
    // Extents (x, y, z) = (4, 3, 2); each sample encodes its coordinates
    let mut samples = Vec::new();
    for z in 0..2 {
        for y in 0..3 {
            for x in 0..4 {
                samples.push((100 * z + 10 * y + x) as f32);
            }
        }
    }
    write_nifti(&path, &[4, 3, 2], [0.5, 2.0, 3.0], &samples);

    let grid = load_volume(&path).unwrap();
    assert_eq!(grid.dims(), Dims::new(4, 3, 2));
    assert_eq!(grid.spacing(), Vec3::new(0.5, 2.0, 3.0));
    assert_eq!(grid.values(), samples.as_slice());
    assert_eq!(grid.get(3, 2, 1), 123.0);
    assert_eq!(grid.get(1, 0, 0), 1.0);
    assert_eq!(grid.get(0, 1, 0), 10.0);
}

#[test]
fn test_load_nifti_4d_uses_first_frame() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("series.nii");
    // Three 2x2x2 frames, frame t filled with 1000 * t + voxel index
    let samples: Vec<f32> = (0..3)
        .flat_map(|t| (0..8).map(move |i| (1000 * t + i) as f32))
        .collect();
    write_nifti(&path, &[2, 2, 2, 3], [1.0, 1.0, 1.0], &samples);

    let grid = load_volume(&path).unwrap();
    assert_eq!(grid.dims(), Dims::new(2, 2, 2));
    assert_eq!(grid.values(), &samples[..8]);
}

#[test]
fn test_load_nifti_bad_pixdim_falls_back_to_unit_spacing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flat.nii");
    write_nifti(&path, &[2, 2, 2], [0.0, -1.0, f32::NAN], &[0.0; 8]);

    let grid = load_volume(&path).unwrap();
    assert_eq!(grid.spacing(), Vec3::ONE);
}
