//! Whitted-style shading.
//!
//! Every surface hit combines four terms with equal weight: diffuse and
//! specular light from the scene's point lights, plus a mirror reflection and
//! a refraction ray, each traced one level deeper. Rays that miss or run out
//! of depth see the background.
//!
//! The ray tree is walked post-order on an explicit stack of frames instead
//! of recursion. A frame holds one surface hit and the colors of whichever
//! secondary rays have already come back, so the stack never grows past the
//! trace depth.

use rtr_core::{Material, Scene, ScenePack};
use rtr_math::{reflect, refract, unit, Color16, Color8, Ray, Vec3, REFRACT_SENTINEL};

use crate::intersect::{scene_intersect, Intersection};

/// Albedo weight below which a reflection or refraction ray is not cast.
const BRANCH_THRESHOLD: f64 = 0.001;

/// Shades rays against one scene of a pack.
#[derive(Debug, Clone, Copy)]
pub struct Shader<'a> {
    pack: &'a ScenePack,
    scene: &'a Scene,
    background: Color16,
}

/// A surface hit waiting on its reflection and refraction colors.
struct Frame<'a> {
    material: &'a Material,
    diffuse: Color16,
    specular: Color16,
    depth: i32,
    /// Reflection then refraction; `None` when the albedo weight is too small to cast.
    rays: [Option<Ray>; 2],
    colors: [Option<Color16>; 2],
    /// Slot of the secondary ray being traced next.
    cursor: usize,
}

impl Frame<'_> {
    /// The next secondary ray still to trace, skipping uncast slots.
    fn next_ray(&mut self) -> Option<Ray> {
        while let Some(slot) = self.rays.get(self.cursor) {
            if slot.is_some() {
                return *slot;
            }
            self.cursor += 1;
        }
        None
    }

    /// Record the color of the ray returned by the last `next_ray`.
    fn receive(&mut self, color: Color16) {
        if let Some(slot) = self.colors.get_mut(self.cursor) {
            *slot = Some(color);
        }
        self.cursor += 1;
    }
}

impl<'a> Shader<'a> {
    pub fn new(pack: &'a ScenePack, scene: &'a Scene) -> Self {
        Self {
            pack,
            scene,
            background: Color16::BACKGROUND,
        }
    }

    pub fn with_background(mut self, background: Color16) -> Self {
        self.background = background;
        self
    }

    pub fn background(&self) -> Color16 {
        self.background
    }

    /// Trace `ray` and narrow the result to 8 bits.
    pub fn cast_ray(&self, ray: &Ray, depth: i32) -> Color8 {
        self.cast_ray16(ray, depth).to_color8()
    }

    /// Trace `ray` with `depth` bounces left, at 16-bit precision.
    ///
    /// A negative depth returns the background without testing the scene.
    pub fn cast_ray16(&self, ray: &Ray, depth: i32) -> Color16 {
        let mut frames: Vec<Frame<'a>> = Vec::new();
        let (mut ray, mut depth) = (*ray, depth);

        loop {
            let mut finished = match self.expand(&ray, depth) {
                Some(frame) => {
                    frames.push(frame);
                    None
                }
                None => Some(self.background),
            };

            // Unwind until some frame still has a secondary ray to cast
            loop {
                let Some(frame) = frames.last_mut() else {
                    return finished.unwrap_or(self.background);
                };
                if let Some(color) = finished.take() {
                    frame.receive(color);
                }
                if let Some(next) = frame.next_ray() {
                    ray = next;
                    depth = frame.depth - 1;
                    break;
                }
                finished = frames.pop().map(|done| self.composite(&done));
            }
        }
    }

    /// Shade the local terms of one ray's hit; `None` means the ray sees the background.
    fn expand(&self, ray: &Ray, depth: i32) -> Option<Frame<'a>> {
        if depth < 0 {
            return None;
        }
        let hit = scene_intersect(self.pack, self.scene, ray)?;

        let material = &self.pack.materials()[hit.material];
        let direction = ray.direction();
        let secondary = |dir: Vec3| Ray::offset_from(hit.point, hit.normal, dir);

        let reflection = (material.albedo.reflective > BRANCH_THRESHOLD)
            .then(|| secondary(reflect(direction, hit.normal)));

        let refraction = (material.albedo.refractive > BRANCH_THRESHOLD).then(|| {
            let bent = refract(direction, hit.normal, material.refractive_index, 1.0);
            secondary(unit(bent).unwrap_or(REFRACT_SENTINEL))
        });

        let (diffuse, specular) = self.direct_light(&hit, material, direction);

        Some(Frame {
            material,
            diffuse: material.color.with_brightness(diffuse * material.albedo.diffuse),
            specular: Color16::WHITE.with_brightness(specular * material.albedo.specular),
            depth,
            rays: [reflection, refraction],
            colors: [None, None],
            cursor: 0,
        })
    }

    /// Sum diffuse and specular intensity over the scene's unshadowed lights.
    fn direct_light(&self, hit: &Intersection, material: &Material, direction: Vec3) -> (f64, f64) {
        let mut diffuse = 0.0;
        let mut specular = 0.0;

        for light in self.pack.scene_lights(self.scene) {
            let to_light = light.position - hit.point;
            let distance = to_light.length();
            // A light sitting on the surface has no direction
            let Ok(light_dir) = unit(to_light) else {
                continue;
            };

            let shadow = Ray::offset_from(hit.point, hit.normal, light_dir);
            if self.occluded(&shadow, distance) {
                continue;
            }

            diffuse += light.intensity * light_dir.dot(hit.normal).max(0.0);
            let highlight = reflect(light_dir, hit.normal).dot(direction).max(0.0);
            specular += highlight.powf(material.specular_exponent) * light.intensity;
        }

        (diffuse, specular)
    }

    /// Whether something lies between the shadow ray origin and the light.
    fn occluded(&self, shadow: &Ray, light_distance: f64) -> bool {
        scene_intersect(self.pack, self.scene, shadow)
            .is_some_and(|blocker| (blocker.point - shadow.origin()).length() < light_distance)
    }

    fn composite(&self, frame: &Frame<'_>) -> Color16 {
        let albedo = frame.material.albedo;
        // Terms whose ray was never cast fall back to the surface color,
        // which their sub-threshold weight then scales to black.
        let traced = |slot: usize| frame.colors[slot].unwrap_or(frame.material.color);

        Color16::mix(&[
            frame.diffuse,
            frame.specular,
            traced(0).with_brightness(albedo.reflective),
            traced(1).with_brightness(albedo.refractive),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtr_core::{Light, Object, Plane, Sphere};

    fn pack(objects: Vec<Object>, materials: Vec<Material>, lights: Vec<Light>, scene: Scene) -> ScenePack {
        ScenePack::new(objects, materials, lights, vec![scene]).unwrap()
    }

    fn white_diffuse() -> Material {
        Material::new(Color16::WHITE).with_albedo([1.0, 0.0, 0.0, 0.0])
    }

    #[test]
    fn test_miss_returns_background() {
        let pack = pack(vec![], vec![], vec![], Scene::new(1, 1));
        let shader = Shader::new(&pack, pack.scene(0).unwrap());

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        assert_eq!(shader.cast_ray16(&ray, 4), Color16::BACKGROUND);
        assert_eq!(shader.cast_ray(&ray, 4), Color8::new(0x33, 0xb2, 0xcc, 0xff));

        let custom = shader.with_background(Color16::WHITE);
        assert_eq!(custom.cast_ray16(&ray, 4), Color16::WHITE);
    }

    #[test]
    fn test_negative_depth_returns_background() {
        let pack = pack(
            vec![Object::new(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0), 0)],
            vec![white_diffuse()],
            vec![],
            Scene::new(1, 1).with_objects([0]),
        );
        let shader = Shader::new(&pack, pack.scene(0).unwrap());
        assert_eq!(shader.cast_ray16(&Ray::new(Vec3::ZERO, -Vec3::Z), -1), Color16::BACKGROUND);
    }

    #[test]
    fn test_depth_zero_mirror_terminates() {
        let mirror = Material::new(Color16::new(255, 0, 0, 255)).with_albedo([0.0, 0.0, 1.0, 0.0]);
        let pack = pack(
            vec![Object::new(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0), 0)],
            vec![mirror],
            vec![],
            Scene::new(1, 1).with_objects([0]),
        );
        let shader = Shader::new(&pack, pack.scene(0).unwrap());
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);

        // The reflected ray is out of depth and sees only the background
        let expected = Color16::mix(&[Color16::BLACK, Color16::BLACK, Color16::BACKGROUND, Color16::BLACK]);
        assert_eq!(shader.cast_ray16(&ray, 0), expected);
        assert_eq!(shader.cast_ray16(&ray, 0), shader.cast_ray16(&ray, 0));
    }

    #[test]
    fn test_diffuse_facing_light() {
        let pack = pack(
            vec![Object::new(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0), 0)],
            vec![white_diffuse()],
            vec![Light::new(Vec3::ZERO, 1.0)],
            Scene::new(1, 1).with_objects([0]).with_lights([0]),
        );
        let shader = Shader::new(&pack, pack.scene(0).unwrap());

        // Full diffuse term averaged with three black terms
        let color = shader.cast_ray16(&Ray::new(Vec3::ZERO, -Vec3::Z), 4);
        assert_eq!(color, Color16::new(63, 63, 63, 255));
    }

    #[test]
    fn test_lights_follow_scene_list() {
        let lights = vec![
            // Behind the sphere: contributes nothing to the visible side
            Light::new(Vec3::new(0.0, 0.0, -20.0), 1.0),
            Light::new(Vec3::ZERO, 1.0),
        ];
        let pack = pack(
            vec![Object::new(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0), 0)],
            vec![white_diffuse()],
            lights,
            Scene::new(1, 1).with_objects([0]).with_lights([1]),
        );
        let shader = Shader::new(&pack, pack.scene(0).unwrap());

        let color = shader.cast_ray16(&Ray::new(Vec3::ZERO, -Vec3::Z), 4);
        assert_eq!(color, Color16::new(63, 63, 63, 255));
    }

    #[test]
    fn test_hard_shadow() {
        let floor = Object::new(Plane::new(Vec3::new(0.0, -1.0, 0.0), Vec3::Y).unwrap(), 0);
        let blocker = Object::new(Sphere::new(Vec3::new(0.0, 2.0, -3.0), 0.5), 0);
        let light = Light::new(Vec3::new(0.0, 5.0, -5.0), 1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, -1.0).normalize());

        let lit = pack(
            vec![floor.clone(), blocker.clone()],
            vec![white_diffuse()],
            vec![light],
            Scene::new(1, 1).with_objects([0]).with_lights([0]),
        );
        let color = Shader::new(&lit, lit.scene(0).unwrap()).cast_ray16(&ray, 4);
        assert!(color.r > 0);

        let shadowed = pack(
            vec![floor, blocker],
            vec![white_diffuse()],
            vec![light],
            Scene::new(1, 1).with_objects([0, 1]).with_lights([0]),
        );
        let color = Shader::new(&shadowed, shadowed.scene(0).unwrap()).cast_ray16(&ray, 4);
        assert_eq!(color, Color16::BLACK);
    }

    #[test]
    fn test_refraction_sees_through_sphere() {
        let glass = Material::new(Color16::WHITE)
            .with_albedo([0.0, 0.0, 0.0, 1.0])
            .with_refractive_index(1.0);
        let red = Material::new(Color16::new(255, 0, 0, 255)).with_albedo([1.0, 0.0, 0.0, 0.0]);

        let pack = pack(
            vec![
                Object::new(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0), 0),
                Object::new(Plane::new(Vec3::new(0.0, 0.0, -20.0), Vec3::Z).unwrap(), 1),
            ],
            vec![glass, red],
            vec![Light::new(Vec3::new(10.0, 0.0, -10.0), 1.0)],
            Scene::new(1, 1).with_objects([0, 1]).with_lights([0]),
        );
        let shader = Shader::new(&pack, pack.scene(0).unwrap());

        let color = shader.cast_ray16(&Ray::new(Vec3::ZERO, -Vec3::Z), 4);
        assert!(color.r > 0);
        assert_eq!((color.g, color.b), (0, 0));

        // Without depth for both sphere walls the wall is never reached
        let shallow = shader.cast_ray16(&Ray::new(Vec3::ZERO, -Vec3::Z), 1);
        assert_ne!(shallow, color);
    }

    #[test]
    fn test_mirror_box_stays_bounded() {
        // Two facing mirrors: every hit spawns both secondary rays
        let mirror = Material::new(Color16::WHITE)
            .with_albedo([0.2, 0.2, 0.8, 0.5])
            .with_refractive_index(1.5);
        let pack = pack(
            vec![
                Object::new(Plane::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z).unwrap(), 0),
                Object::new(Plane::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z).unwrap(), 0),
            ],
            vec![mirror],
            vec![Light::new(Vec3::new(0.0, 1.0, 0.0), 1.0)],
            Scene::new(1, 1).with_objects([0, 1]).with_lights([0]),
        );
        let shader = Shader::new(&pack, pack.scene(0).unwrap());
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.1, 0.0, -1.0).normalize());

        let first = shader.cast_ray16(&ray, 7);
        assert_eq!(first, shader.cast_ray16(&ray, 7));
    }

    fn recursive(shader: &Shader<'_>, ray: &Ray, depth: i32) -> Color16 {
        let Some(mut frame) = shader.expand(ray, depth) else {
            return shader.background();
        };
        for slot in 0..2 {
            if let Some(secondary) = frame.rays[slot] {
                frame.colors[slot] = Some(recursive(shader, &secondary, depth - 1));
            }
        }
        shader.composite(&frame)
    }

    #[test]
    fn test_frame_stack_matches_recursion() {
        let glass = Material::new(Color16::new(200, 220, 255, 255))
            .with_albedo([0.1, 0.5, 0.3, 0.8])
            .with_specular_exponent(125.0)
            .with_refractive_index(1.5);
        let mirror = Material::new(Color16::WHITE).with_albedo([0.3, 0.2, 0.7, 0.0]);
        let matte = Material::new(Color16::new(255, 80, 0, 255)).with_albedo([0.9, 0.1, 0.0, 0.0]);

        let pack = pack(
            vec![
                Object::new(Sphere::new(Vec3::new(0.0, 0.0, -6.0), 1.5), 0),
                Object::new(Sphere::new(Vec3::new(2.5, -0.5, -9.0), 1.0), 2),
                Object::new(Plane::new(Vec3::new(0.0, -2.0, 0.0), Vec3::Y).unwrap(), 1),
                Object::new(Plane::new(Vec3::new(0.0, 0.0, -14.0), Vec3::Z).unwrap(), 1),
            ],
            vec![glass, mirror, matte],
            vec![Light::new(Vec3::new(-5.0, 8.0, 0.0), 1.2), Light::new(Vec3::new(6.0, 4.0, -3.0), 0.8)],
            Scene::new(1, 1).with_objects([0, 1, 2, 3]).with_lights([0, 1]),
        );
        let shader = Shader::new(&pack, pack.scene(0).unwrap());

        for dir in [
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.2, -0.3, -1.0),
            Vec3::new(0.35, -0.05, -1.0),
            Vec3::new(-0.4, -0.6, -1.0),
        ] {
            let ray = Ray::new(Vec3::ZERO, dir.normalize());
            for depth in [-1, 0, 1, 3, 6] {
                assert_eq!(shader.cast_ray16(&ray, depth), recursive(&shader, &ray, depth), "{:?} at depth {}", dir, depth);
            }
        }
    }
}
