//! Vector helpers on top of glam: checked normalization and the two optics
//! operations the shader needs.

use crate::Vec3;
use thiserror::Error;

/// Errors produced by vector math.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MathError {
    #[error("cannot normalize degenerate vector ({0}, {1}, {2})")]
    DegenerateVector(f64, f64, f64),
}

/// Direction returned by [`refract`] under total internal reflection.
pub const REFRACT_SENTINEL: Vec3 = Vec3::new(1.0, 0.0, 0.0);

/// Normalize `v`, failing when it has zero (or non-finite) length.
pub fn unit(v: Vec3) -> Result<Vec3, MathError> {
    v.try_normalize()
        .ok_or(MathError::DegenerateVector(v.x, v.y, v.z))
}

/// Mirror `incident` about `normal`.
#[inline]
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - normal * (2.0 * incident.dot(normal))
}

/// Refract `incident` through a surface with outward `normal`.
///
/// `eta_t` is the index on the far side of the surface and `eta_i` the index
/// the ray travels in. A ray leaving the surface (incident along the normal)
/// swaps both the indices and the normal. Under total internal reflection
/// [`REFRACT_SENTINEL`] is returned. The result is not normalized.
pub fn refract(incident: Vec3, normal: Vec3, eta_t: f64, eta_i: f64) -> Vec3 {
    let mut cos_i = -incident.dot(normal).clamp(-1.0, 1.0);
    let (normal, eta_t, eta_i) = if cos_i < 0.0 {
        cos_i = -cos_i;
        (-normal, eta_i, eta_t)
    } else {
        (normal, eta_t, eta_i)
    };

    let eta = eta_i / eta_t;
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return REFRACT_SENTINEL;
    }
    incident * eta + normal * (eta * cos_i - k.sqrt())
}
