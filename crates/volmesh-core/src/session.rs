//! Interactive re-extraction of an isosurface as the isovalue changes.

use std::ops::RangeInclusive;

use crate::grid::{BinaryGrid, ScalarField};
use crate::marching_cubes::extract;
use crate::mesh::TriangleMesh;

/// Called with the fresh mesh after every re-extraction.
pub type RedrawHook = Box<dyn FnMut(&TriangleMesh)>;

/// Holds a scalar field and the mesh extracted from it at the current isovalue.
///
/// The session lives on the event-loop thread. Each call to
/// [`IsosurfaceSession::on_isovalue_changed`] re-extracts synchronously, swaps in
/// the new mesh and then notifies the redraw hook, so a viewer never observes a
/// mesh that does not match [`IsosurfaceSession::isovalue`].
pub struct IsosurfaceSession<F: ScalarField = BinaryGrid> {
    field: F,
    isovalue: f32,
    range: RangeInclusive<f32>,
    mesh: TriangleMesh,
    generation: u64,
    redraw: Option<RedrawHook>,
}

impl<F: ScalarField> IsosurfaceSession<F> {
    /// Creates a session and extracts the initial mesh.
    ///
    /// The starting isovalue is clamped into `range`.
    pub fn new(field: F, isovalue: f32, range: RangeInclusive<f32>) -> Self {
        let isovalue = clamp_to(&range, isovalue).unwrap_or(*range.start());
        let mesh = extract(&field, isovalue);
        log::debug!(
            "session start: isovalue {isovalue}, {} triangles",
            mesh.num_triangles()
        );
        Self {
            field,
            isovalue,
            range,
            mesh,
            generation: 0,
            redraw: None,
        }
    }

    /// Installs the callback invoked after each re-extraction.
    pub fn set_redraw_hook(&mut self, hook: impl FnMut(&TriangleMesh) + 'static) {
        self.redraw = Some(Box::new(hook));
    }

    /// Re-extracts the mesh at `value` and notifies the redraw hook.
    ///
    /// Values outside the slider range are clamped into it. Non-finite values are
    /// ignored and the current mesh is kept.
    pub fn on_isovalue_changed(&mut self, value: f32) -> &TriangleMesh {
        let Some(isovalue) = clamp_to(&self.range, value) else {
            log::warn!("ignoring non-finite isovalue {value}");
            return &self.mesh;
        };
        #[allow(clippy::float_cmp)]
        if isovalue != value {
            log::warn!("isovalue {value} clamped to {isovalue}");
        }

        self.mesh = extract(&self.field, isovalue);
        self.isovalue = isovalue;
        self.generation += 1;
        log::debug!(
            "re-extracted at isovalue {isovalue}: {} vertices, {} triangles",
            self.mesh.num_vertices(),
            self.mesh.num_triangles()
        );

        if let Some(redraw) = self.redraw.as_mut() {
            redraw(&self.mesh);
        }
        &self.mesh
    }

    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    pub fn isovalue(&self) -> f32 {
        self.isovalue
    }

    pub fn range(&self) -> RangeInclusive<f32> {
        self.range.clone()
    }

    /// Incremented on every re-extraction; renderers compare it to decide when
    /// to re-upload GPU buffers.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    /// Consumes the session, returning the current mesh.
    pub fn into_mesh(self) -> TriangleMesh {
        self.mesh
    }
}

impl<F: ScalarField> std::fmt::Debug for IsosurfaceSession<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IsosurfaceSession")
            .field("dims", &self.field.dims())
            .field("isovalue", &self.isovalue)
            .field("range", &self.range)
            .field("triangles", &self.mesh.num_triangles())
            .field("generation", &self.generation)
            .field("has_redraw_hook", &self.redraw.is_some())
            .finish()
    }
}

fn clamp_to(range: &RangeInclusive<f32>, value: f32) -> Option<f32> {
    value
        .is_finite()
        .then(|| value.clamp(*range.start(), *range.end()))
}
