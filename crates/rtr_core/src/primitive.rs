//! Geometric primitives.
//!
//! Every scene object wraps exactly one [`Primitive`]. The hit tests and
//! normals live with the renderer; this module only describes shape.

use rtr_math::{unit, Vec3};
use serde::Deserialize;

use crate::mesh::Mesh;
use crate::SceneError;

/// A sphere.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// An infinite plane through `point` with unit `normal`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "PlaneDef")]
pub struct Plane {
    point: Vec3,
    normal: Vec3,
}

#[derive(Deserialize)]
struct PlaneDef {
    point: Vec3,
    normal: Vec3,
}

impl TryFrom<PlaneDef> for Plane {
    type Error = SceneError;

    fn try_from(def: PlaneDef) -> Result<Self, Self::Error> {
        Plane::new(def.point, def.normal)
    }
}

impl Plane {
    /// Create a plane; `normal` is normalized and must not be zero.
    pub fn new(point: Vec3, normal: Vec3) -> Result<Self, SceneError> {
        Ok(Self {
            point,
            normal: unit(normal)?,
        })
    }

    pub fn point(&self) -> Vec3 {
        self.point
    }

    /// Unit normal.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

/// A triangle given by its three vertices.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.a, self.b, self.c]
    }

    /// Unit face normal `(b - a) x (c - b)`, or zero for a degenerate triangle.
    pub fn face_normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.b).normalize_or_zero()
    }
}

/// The shape carried by a scene object.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Primitive {
    Sphere(Sphere),
    Plane(Plane),
    Triangle(Triangle),
    Mesh(Mesh),
}

impl Primitive {
    /// Short name of the variant, for logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Sphere(_) => "sphere",
            Primitive::Plane(_) => "plane",
            Primitive::Triangle(_) => "triangle",
            Primitive::Mesh(_) => "mesh",
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Self {
        Primitive::Sphere(sphere)
    }
}

impl From<Plane> for Primitive {
    fn from(plane: Plane) -> Self {
        Primitive::Plane(plane)
    }
}

impl From<Triangle> for Primitive {
    fn from(triangle: Triangle) -> Self {
        Primitive::Triangle(triangle)
    }
}

impl From<Mesh> for Primitive {
    fn from(mesh: Mesh) -> Self {
        Primitive::Mesh(mesh)
    }
}
