use crate::Vec3;

/// Bias applied along the surface normal before casting secondary rays,
/// so they do not immediately re-hit the surface they start on.
pub const EPSILON: f64 = 0.001;

/// A ray in 3D space with an origin and a direction.
///
/// Intersection routines expect `direction` to be unit length.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Create a secondary ray leaving a surface at `point`.
    ///
    /// The origin is pushed [`EPSILON`] along `normal`, onto the side of the
    /// surface that `direction` travels into.
    pub fn offset_from(point: Vec3, normal: Vec3, direction: Vec3) -> Self {
        let origin = if direction.dot(normal) < 0.0 {
            point - normal * EPSILON
        } else {
            point + normal * EPSILON
        };
        Self::new(origin, direction)
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }
}
