//! Indexed triangle meshes produced by isosurface extraction.

use std::collections::HashMap;

use glam::Vec3;

use crate::error::{Result, VolmeshError};

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions in physical (spacing-scaled) coordinates.
    pub vertices: Vec<Vec3>,
    /// Per-vertex unit normals, same length as `vertices`.
    pub normals: Vec<Vec3>,
    /// Triangles as triples of vertex indices.
    pub triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Returns the number of vertices.
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles.
    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Axis-aligned bounding box of the vertices, `None` for an empty mesh.
    #[must_use]
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }

    /// Checks that every triangle index refers to an existing vertex.
    pub fn validate(&self) -> Result<()> {
        let n = self.vertices.len();
        if self.normals.len() != n {
            return Err(VolmeshError::SizeMismatch {
                expected: n,
                actual: self.normals.len(),
            });
        }
        for (face, tri) in self.triangles.iter().enumerate() {
            if let Some(&bad) = tri.iter().find(|&&i| i as usize >= n) {
                return Err(VolmeshError::InvalidArgument(format!(
                    "triangle {face} references vertex {bad} but mesh has {n} vertices"
                )));
            }
        }
        Ok(())
    }

    /// Returns true if every undirected edge is shared by exactly two triangles.
    ///
    /// An empty mesh is not considered watertight.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        if self.triangles.is_empty() {
            return false;
        }
        let mut edge_uses: HashMap<(u32, u32), u32> = HashMap::new();
        for tri in &self.triangles {
            for k in 0..3 {
                let a = tri[k];
                let b = tri[(k + 1) % 3];
                *edge_uses.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        edge_uses.values().all(|&uses| uses == 2)
    }

    /// Total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f32 {
        self.triangles
            .iter()
            .map(|&[a, b, c]| {
                let (a, b, c) = (
                    self.vertices[a as usize],
                    self.vertices[b as usize],
                    self.vertices[c as usize],
                );
                (b - a).cross(c - a).length() * 0.5
            })
            .sum()
    }

    /// Triangle indices flattened for GPU index buffers.
    #[must_use]
    pub fn flat_indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}
