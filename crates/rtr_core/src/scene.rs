//! Scene graph types for rtr.
//!
//! A [`ScenePack`] owns every object, material and light; scenes refer to
//! objects and lights by index so several scenes can share one pool. A pack
//! is validated when it is built and never mutated afterwards, so renderer
//! workers can share it freely.

use rtr_math::{MathError, Vec3};
use serde::Deserialize;
use thiserror::Error;

use crate::material::{Light, Material};
use crate::primitive::Primitive;

/// Errors in the structure of a scene pack.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("object {object} uses material {material}, but only {count} materials exist")]
    MissingMaterial {
        object: usize,
        material: usize,
        count: usize,
    },

    #[error("scene {scene} references object {object}, but only {count} objects exist")]
    MissingObject {
        scene: usize,
        object: usize,
        count: usize,
    },

    #[error("scene {scene} references light {light}, but only {count} lights exist")]
    MissingLight {
        scene: usize,
        light: usize,
        count: usize,
    },

    #[error("scene {scene} has an empty image ({width}x{height})")]
    EmptyImage { scene: usize, width: u32, height: u32 },

    #[error("degenerate geometry: {0}")]
    Degenerate(#[from] MathError),
}

/// A primitive together with the index of its material.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Object {
    pub primitive: Primitive,
    pub material: usize,
}

impl Object {
    pub fn new(primitive: impl Into<Primitive>, material: usize) -> Self {
        Self {
            primitive: primitive.into(),
            material,
        }
    }
}

/// One renderable view over the shared pools.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Scene {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Camera position
    pub view_point: Vec3,

    /// Offset added to every normalized pixel direction
    pub view_dir: Vec3,

    /// Vertical field of view in radians
    pub fov: f64,

    /// Maximum number of reflection/refraction bounces
    pub depth: i32,

    /// Object indices, in intersection order
    pub objects: Vec<usize>,

    /// Light indices
    pub lights: Vec<usize>,
}

impl Scene {
    /// Create a scene looking down -Z from the origin with no objects.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            view_point: Vec3::ZERO,
            view_dir: Vec3::ZERO,
            fov: std::f64::consts::FRAC_PI_3,
            depth: 4,
            objects: Vec::new(),
            lights: Vec::new(),
        }
    }

    pub fn with_camera(mut self, view_point: Vec3, view_dir: Vec3, fov: f64) -> Self {
        self.view_point = view_point;
        self.view_dir = view_dir;
        self.fov = fov;
        self
    }

    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_objects(mut self, objects: impl IntoIterator<Item = usize>) -> Self {
        self.objects = objects.into_iter().collect();
        self
    }

    pub fn with_lights(mut self, lights: impl IntoIterator<Item = usize>) -> Self {
        self.lights = lights.into_iter().collect();
        self
    }

    /// Number of pixels in the output image.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// The root aggregate owning all objects, materials, lights and scenes.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(try_from = "ScenePackDef")]
pub struct ScenePack {
    objects: Vec<Object>,
    materials: Vec<Material>,
    lights: Vec<Light>,
    scenes: Vec<Scene>,
}

#[derive(Deserialize)]
struct ScenePackDef {
    #[serde(default)]
    objects: Vec<Object>,
    #[serde(default)]
    materials: Vec<Material>,
    #[serde(default)]
    lights: Vec<Light>,
    #[serde(default)]
    scenes: Vec<Scene>,
}

impl TryFrom<ScenePackDef> for ScenePack {
    type Error = SceneError;

    fn try_from(def: ScenePackDef) -> Result<Self, Self::Error> {
        ScenePack::new(def.objects, def.materials, def.lights, def.scenes)
    }
}

impl ScenePack {
    /// Assemble a pack, checking that every index it contains resolves.
    pub fn new(
        objects: Vec<Object>,
        materials: Vec<Material>,
        lights: Vec<Light>,
        scenes: Vec<Scene>,
    ) -> Result<Self, SceneError> {
        let pack = Self {
            objects,
            materials,
            lights,
            scenes,
        };
        pack.validate()?;

        log::debug!(
            "Scene pack: {} objects, {} materials, {} lights, {} scenes",
            pack.objects.len(),
            pack.materials.len(),
            pack.lights.len(),
            pack.scenes.len()
        );
        Ok(pack)
    }

    /// Parse and validate a pack from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn validate(&self) -> Result<(), SceneError> {
        for (index, object) in self.objects.iter().enumerate() {
            if object.material >= self.materials.len() {
                return Err(SceneError::MissingMaterial {
                    object: index,
                    material: object.material,
                    count: self.materials.len(),
                });
            }
        }

        for (index, scene) in self.scenes.iter().enumerate() {
            if scene.pixel_count() == 0 {
                return Err(SceneError::EmptyImage {
                    scene: index,
                    width: scene.width,
                    height: scene.height,
                });
            }
            if let Some(&object) = scene.objects.iter().find(|&&o| o >= self.objects.len()) {
                return Err(SceneError::MissingObject {
                    scene: index,
                    object,
                    count: self.objects.len(),
                });
            }
            if let Some(&light) = scene.lights.iter().find(|&&l| l >= self.lights.len()) {
                return Err(SceneError::MissingLight {
                    scene: index,
                    light,
                    count: self.lights.len(),
                });
            }
        }

        Ok(())
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    /// Number of scenes in the pack.
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Objects of `scene` paired with their pack index, in scene order.
    pub fn scene_objects<'a>(
        &'a self,
        scene: &'a Scene,
    ) -> impl Iterator<Item = (usize, &'a Object)> + 'a {
        scene.objects.iter().map(|&i| (i, &self.objects[i]))
    }

    /// Lights of `scene`, in scene order.
    pub fn scene_lights<'a>(&'a self, scene: &'a Scene) -> impl Iterator<Item = &'a Light> + 'a {
        scene.lights.iter().map(|&i| &self.lights[i])
    }
}
