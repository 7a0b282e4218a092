//! Ray-primitive intersection and nearest-hit search.
//!
//! Every test expects a unit-length ray direction and only reports forward
//! hits (`t >= 0`). There is no acceleration structure: a scene is searched
//! by testing each of its objects in order. A mesh skips its faces when the
//! ray misses its bounding box.

use rtr_core::{Mesh, Plane, Primitive, Scene, ScenePack, Sphere, Triangle};
use rtr_math::{Interval, Ray, Vec3};

/// Determinant magnitude below which a ray counts as parallel to a triangle.
pub const TRIANGLE_EPSILON: f64 = 1e-5;

/// Denominator magnitude below which a ray counts as parallel to a plane.
const PLANE_EPSILON: f64 = 1e-12;

/// A raw hit on a single primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimitiveHit {
    /// Distance along the ray
    pub t: f64,
    /// Index of the triangle hit, for meshes
    pub face: Option<usize>,
}

impl PrimitiveHit {
    fn at(t: f64) -> Self {
        Self { t, face: None }
    }
}

/// The nearest hit in a scene, resolved to a point and a shading normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub point: Vec3,
    /// Unit normal; faces the incoming ray for planes and triangles
    pub normal: Vec3,
    pub t: f64,
    /// Pack index of the object hit
    pub object: usize,
    /// Pack index of its material
    pub material: usize,
}

/// Shapes a ray can hit.
pub trait Intersect {
    /// Test the ray against this shape, returning the nearest forward hit.
    fn intersect(&self, ray: &Ray) -> Option<PrimitiveHit>;

    /// Unit normal at `point`, which came from `hit` along `direction`.
    fn normal_at(&self, hit: &PrimitiveHit, point: Vec3, direction: Vec3) -> Vec3;
}

/// Flip `normal` so it faces against `direction`.
fn facing(normal: Vec3, direction: Vec3) -> Vec3 {
    if direction.dot(normal) > 0.0 {
        -normal
    } else {
        normal
    }
}

impl Intersect for Sphere {
    fn intersect(&self, ray: &Ray) -> Option<PrimitiveHit> {
        let to_center = self.center - ray.origin();
        let along = to_center.dot(ray.direction());
        let discriminant = self.radius * self.radius - to_center.length_squared() + along * along;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let mut t = along - root;
        if t < 0.0 {
            // Origin is inside the sphere
            t = along + root;
        }
        if t < 0.0 {
            return None;
        }

        Some(PrimitiveHit::at(t))
    }

    /// Always the outward normal, even when the ray starts inside.
    fn normal_at(&self, _hit: &PrimitiveHit, point: Vec3, _direction: Vec3) -> Vec3 {
        (point - self.center).normalize_or_zero()
    }
}

impl Intersect for Plane {
    fn intersect(&self, ray: &Ray) -> Option<PrimitiveHit> {
        let denom = ray.direction().dot(self.normal());
        if denom.abs() < PLANE_EPSILON {
            return None;
        }

        let t = (self.point() - ray.origin()).dot(self.normal()) / denom;
        if t.is_nan() || t < 0.0 {
            return None;
        }

        Some(PrimitiveHit::at(t))
    }

    fn normal_at(&self, _hit: &PrimitiveHit, _point: Vec3, direction: Vec3) -> Vec3 {
        facing(self.normal(), direction)
    }
}

impl Intersect for Triangle {
    /// Möller-Trumbore intersection.
    fn intersect(&self, ray: &Ray) -> Option<PrimitiveHit> {
        let ab = self.b - self.a;
        let ac = self.c - self.a;

        let p = ray.direction().cross(ac);
        let det = ab.dot(p);
        if det.abs() < TRIANGLE_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let offset = ray.origin() - self.a;
        let u = offset.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = offset.cross(ab);
        let v = ray.direction().dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = ac.dot(q) * inv_det;
        if t < 0.0 {
            return None;
        }

        Some(PrimitiveHit::at(t))
    }

    fn normal_at(&self, _hit: &PrimitiveHit, _point: Vec3, direction: Vec3) -> Vec3 {
        facing(self.face_normal(), direction)
    }
}

impl Intersect for Mesh {
    fn intersect(&self, ray: &Ray) -> Option<PrimitiveHit> {
        if !self.bounds().hit(ray, Interval::new(0.0, f64::INFINITY)) {
            return None;
        }
        let mut closest: Option<PrimitiveHit> = None;

        for (face, triangle) in self.triangles().iter().enumerate() {
            if let Some(hit) = triangle.intersect(ray) {
                if closest.map_or(true, |c| hit.t < c.t) {
                    closest = Some(PrimitiveHit {
                        t: hit.t,
                        face: Some(face),
                    });
                }
            }
        }

        closest
    }

    fn normal_at(&self, hit: &PrimitiveHit, point: Vec3, direction: Vec3) -> Vec3 {
        match hit.face.and_then(|f| self.triangles().get(f)) {
            Some(triangle) => triangle.normal_at(hit, point, direction),
            None => Vec3::ZERO,
        }
    }
}

impl Intersect for Primitive {
    fn intersect(&self, ray: &Ray) -> Option<PrimitiveHit> {
        match self {
            Primitive::Sphere(s) => s.intersect(ray),
            Primitive::Plane(p) => p.intersect(ray),
            Primitive::Triangle(t) => t.intersect(ray),
            Primitive::Mesh(m) => m.intersect(ray),
        }
    }

    fn normal_at(&self, hit: &PrimitiveHit, point: Vec3, direction: Vec3) -> Vec3 {
        match self {
            Primitive::Sphere(s) => s.normal_at(hit, point, direction),
            Primitive::Plane(p) => p.normal_at(hit, point, direction),
            Primitive::Triangle(t) => t.normal_at(hit, point, direction),
            Primitive::Mesh(m) => m.normal_at(hit, point, direction),
        }
    }
}

/// Find the nearest object of `scene` hit by `ray`.
///
/// Objects are tested in scene order and a later object only wins with a
/// strictly smaller distance.
pub fn scene_intersect(pack: &ScenePack, scene: &Scene, ray: &Ray) -> Option<Intersection> {
    let mut closest = None;
    let mut closest_t = f64::INFINITY;

    for (index, object) in pack.scene_objects(scene) {
        if let Some(hit) = object.primitive.intersect(ray) {
            if hit.t < closest_t {
                closest_t = hit.t;
                closest = Some((index, object, hit));
            }
        }
    }

    let (index, object, hit) = closest?;
    let point = ray.at(hit.t);
    Some(Intersection {
        point,
        normal: object.primitive.normal_at(&hit, point, ray.direction()),
        t: hit.t,
        object: index,
        material: object.material,
    })
}
