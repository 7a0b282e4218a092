//! Math primitives shared by the rtr crates.
//!
//! Vectors come from glam (double precision); this crate adds the ray,
//! interval and bounding-box types plus the two color precisions used by
//! the shader.

// Re-export glam for convenience
pub use glam;

/// Vector type used for all scene geometry.
pub type Vec3 = glam::DVec3;

mod aabb;
mod color;
mod interval;
mod ray;
mod vector;

pub use aabb::Aabb;
pub use color::{Color16, Color8};
pub use interval::Interval;
pub use ray::{Ray, EPSILON};
pub use vector::{reflect, refract, unit, MathError, REFRACT_SENTINEL};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(a.dot(b), 32.0);
        assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
        assert!((Vec3::new(3.0, 4.0, 0.0).length() - 5.0).abs() < 1e-12);
    }
}
