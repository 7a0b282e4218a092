//! Triangle meshes.
//!
//! A mesh is a flat list of triangles plus the box that bounds them. The
//! renderer treats each contained triangle exactly like a hand-specified
//! one; the mesh only adds the linear nearest-hit scan over its faces.

use rtr_math::{Aabb, Vec3};
use serde::Deserialize;

use crate::primitive::Triangle;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "MeshDef")]
pub struct Mesh {
    triangles: Vec<Triangle>,
    bounds: Aabb,
}

#[derive(Deserialize)]
struct MeshDef {
    triangles: Vec<Triangle>,
}

impl From<MeshDef> for Mesh {
    fn from(def: MeshDef) -> Self {
        Mesh::new(def.triangles)
    }
}

impl Mesh {
    /// Create a mesh, computing its bounding box.
    pub fn new(triangles: Vec<Triangle>) -> Self {
        let bounds = Self::compute_bounds(&triangles);
        Self { triangles, bounds }
    }

    /// Build a mesh from indexed geometry (every 3 indices form a triangle).
    ///
    /// Faces referencing a missing vertex are skipped with a warning.
    pub fn from_indexed(positions: &[Vec3], indices: &[u32]) -> Self {
        let mut triangles = Vec::with_capacity(indices.len() / 3);

        for face in indices.chunks_exact(3) {
            let corners = [face[0], face[1], face[2]].map(|i| positions.get(i as usize));
            match corners {
                [Some(&a), Some(&b), Some(&c)] => triangles.push(Triangle::new(a, b, c)),
                _ => log::warn!(
                    "Invalid triangle indices: [{}, {}, {}], vertex count: {}",
                    face[0],
                    face[1],
                    face[2],
                    positions.len()
                ),
            }
        }

        Self::new(triangles)
    }

    fn compute_bounds(triangles: &[Triangle]) -> Aabb {
        Aabb::enclosing(triangles.iter().flat_map(Triangle::vertices))
    }

    /// Scale every vertex about the origin, then translate by `shift`.
    pub fn transformed(&self, shift: Vec3, scale: f64) -> Self {
        let place = |v: Vec3| v * scale + shift;
        let triangles = self
            .triangles
            .iter()
            .map(|t| Triangle::new(place(t.a), place(t.b), place(t.c)))
            .collect();
        Self::new(triangles)
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Axis-aligned bounding box of all vertices (empty for an empty mesh).
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Get the mesh size (diagonal length of bounding box).
    pub fn size(&self) -> f64 {
        self.bounds.extent().length()
    }
}
