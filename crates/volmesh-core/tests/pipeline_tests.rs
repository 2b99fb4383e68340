//! End-to-end tests for the volmesh core pipeline.

use volmesh_core::{
    extract, BinaryGrid, Dims, IsosurfaceSession, Pipeline, PipelineOptions, ScalarGrid, Vec3,
};

/// 4x4x4 zeros with a centred 2x2x2 cube of ones.
fn centred_cube() -> ScalarGrid {
    ScalarGrid::from_fn(Dims::new(4, 4, 4), |x, y, z| {
        let inside = |c: usize| (1..=2).contains(&c);
        if inside(x) && inside(y) && inside(z) {
            1.0
        } else {
            0.0
        }
    })
}

fn fixed_threshold_pipeline() -> Pipeline {
    Pipeline::new(PipelineOptions {
        threshold: Some(0.5),
        isovalue: 0.5,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn test_cube_scenario_binarizes_to_the_cube() {
    let grid = centred_cube();
    let segmentation = fixed_threshold_pipeline().segment(&grid).unwrap();

    assert_eq!(segmentation.mask.foreground_count(), 8);
    for (i, (&m, &v)) in segmentation
        .mask
        .mask()
        .iter()
        .zip(grid.values())
        .enumerate()
    {
        assert_eq!(f32::from(m), v, "voxel {i}");
    }
}

#[test]
fn test_cube_scenario_produces_closed_mesh() {
    let pipeline = fixed_threshold_pipeline();
    let segmentation = pipeline.segment(&centred_cube()).unwrap();
    let mesh = &pipeline.extract(&segmentation.mask);

    assert!(mesh.num_vertices() > 0);
    assert!(mesh.num_triangles() > 0);
    assert!(mesh.validate().is_ok());
    assert!(mesh.is_watertight(), "every edge must be shared by two triangles");
    assert_eq!(segmentation.threshold, 0.5);

    let (lo, hi) = mesh.bounding_box().unwrap();
    assert!((lo - Vec3::splat(0.5)).length() < 1e-6, "min corner {lo:?}");
    assert!((hi - Vec3::splat(2.5)).length() < 1e-6, "max corner {hi:?}");
}

#[test]
fn test_cube_scenario_with_otsu() {
    let pipeline = Pipeline::new(PipelineOptions {
        isovalue: 0.5,
        ..Default::default()
    })
    .unwrap();
    let segmentation = pipeline.segment(&centred_cube()).unwrap();
    assert!(segmentation.automatic);
    assert_eq!(segmentation.mask.foreground_count(), 8);
    assert!(pipeline.extract(&segmentation.mask).is_watertight());
}

#[test]
fn test_default_isovalue_gives_valid_mesh() {
    // At the default isovalue of 1.0 every crossing lands exactly on a
    // foreground voxel; the mesh is degenerate but still well formed.
    let pipeline = Pipeline::new(PipelineOptions::default()).unwrap();
    let mask = pipeline.segment(&centred_cube()).unwrap().mask;
    assert!(pipeline.extract(&mask).validate().is_ok());
}

#[test]
fn test_saved_mesh_matches_initial_session_mesh() {
    let pipeline = Pipeline::new(PipelineOptions {
        threshold: Some(0.5),
        isovalue: 0.3,
        ..Default::default()
    })
    .unwrap();
    let mask = pipeline.segment(&centred_cube()).unwrap().mask;
    let saved = pipeline.extract(&mask);
    let session = pipeline.session(mask);
    assert_eq!(session.isovalue(), 0.3);
    assert_eq!(session.mesh(), &saved);
}

#[test]
fn test_reextraction_is_independent() {
    let mask = fixed_threshold_pipeline()
        .segment(&centred_cube())
        .unwrap()
        .mask;
    let mut session: IsosurfaceSession<BinaryGrid> =
        IsosurfaceSession::new(mask.clone(), 0.5, 0.0..=1.0);

    let first = session.on_isovalue_changed(0.2).clone();
    let other = session.on_isovalue_changed(0.8).clone();
    let again = session.on_isovalue_changed(0.2).clone();

    assert_eq!(first, again);
    assert_ne!(first, other);
    assert_eq!(first, extract(&mask, 0.2));
    // The field itself is never modified by re-extraction.
    assert_eq!(session.field(), &mask);
}

#[test]
fn test_extract_is_idempotent() {
    let grid = centred_cube();
    assert_eq!(extract(&grid, 0.5), extract(&grid, 0.5));
}
