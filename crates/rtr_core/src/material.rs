//! Surface materials and point lights.

use rtr_math::{Color16, Vec3};
use serde::Deserialize;

/// Weights of the four shading contributions.
///
/// The weights are independent and need not sum to one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Albedo {
    /// Lambertian term
    pub diffuse: f64,
    /// Phong highlight term
    pub specular: f64,
    /// Mirror reflection term
    pub reflective: f64,
    /// Transmission term
    pub refractive: f64,
}

impl Albedo {
    pub fn new(diffuse: f64, specular: f64, reflective: f64, refractive: f64) -> Self {
        Self {
            diffuse,
            specular,
            reflective,
            refractive,
        }
    }
}

impl From<[f64; 4]> for Albedo {
    fn from([diffuse, specular, reflective, refractive]: [f64; 4]) -> Self {
        Self::new(diffuse, specular, reflective, refractive)
    }
}

/// A Whitted-style material.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Material {
    /// Surface color at accumulation precision
    pub color: Color16,

    /// Contribution weights
    pub albedo: Albedo,

    /// Phong exponent; larger means a tighter highlight
    pub specular_exponent: f64,

    /// Index of refraction of the material's interior
    pub refractive_index: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color16::new(0x80, 0x80, 0x80, 0xff), // Grey default
            albedo: Albedo::new(1.0, 0.0, 0.0, 0.0),
            specular_exponent: 1.0,
            refractive_index: 1.0,
        }
    }
}

impl Material {
    /// Create a purely diffuse material of the given color.
    pub fn new(color: Color16) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn with_albedo(mut self, albedo: impl Into<Albedo>) -> Self {
        self.albedo = albedo.into();
        self
    }

    pub fn with_specular_exponent(mut self, exponent: f64) -> Self {
        self.specular_exponent = exponent;
        self
    }

    pub fn with_refractive_index(mut self, index: f64) -> Self {
        self.refractive_index = index;
        self
    }
}

/// A point light.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Light {
    pub position: Vec3,
    pub intensity: f64,
}

impl Light {
    pub fn new(position: Vec3, intensity: f64) -> Self {
        Self {
            position,
            intensity,
        }
    }
}
