//! Primary ray generation.

use rtr_core::Scene;
use rtr_math::{unit, Ray, Vec3};

/// Pinhole camera for one scene.
///
/// Pixel `(i, j)` maps to the direction `(i - w/2, h/2 - j, -h / (2 tan(fov/2)))`,
/// normalized, offset by the scene's view direction and normalized again.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    origin: Vec3,
    view_dir: Vec3,
    half_width: f64,
    half_height: f64,
    focal_z: f64,
}

impl Camera {
    pub fn new(scene: &Scene) -> Self {
        let height = scene.height as f64;
        Self {
            origin: scene.view_point,
            view_dir: scene.view_dir,
            half_width: scene.width as f64 / 2.0,
            half_height: height / 2.0,
            focal_z: -height / (2.0 * (scene.fov / 2.0).tan()),
        }
    }

    /// Generate the ray through pixel `(i, j)`, or `None` if its direction
    /// degenerates to zero.
    pub fn ray(&self, i: u32, j: u32) -> Option<Ray> {
        let x = i as f64 - self.half_width;
        let y = self.half_height - j as f64;

        let dir = unit(Vec3::new(x, y, self.focal_z)).ok()?;
        let dir = unit(dir + self.view_dir).ok()?;
        Some(Ray::new(self.origin, dir))
    }
}
