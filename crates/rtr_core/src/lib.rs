//! rtr Core - Scene description for the rtr ray tracer.
//!
//! This crate provides:
//!
//! - **Scene types**: `ScenePack`, `Scene`, `Object`, `Primitive`, `Material`, `Light`
//! - **Loading**: the `.rtr` text format, JSON packs and OBJ meshes
//!
//! # Example
//!
//! ```ignore
//! use rtr_core::load_scene_pack;
//!
//! let pack = load_scene_pack("scenes.rtr")?;
//! for scene in pack.scenes() {
//!     println!("{}x{}, {} objects", scene.width, scene.height, scene.objects.len());
//! }
//! ```

pub mod material;
pub mod mesh;
pub mod obj;
pub mod primitive;
pub mod rtr;
pub mod scene;

// Re-export commonly used types
pub use material::{Albedo, Light, Material};
pub use mesh::Mesh;
pub use primitive::{Plane, Primitive, Sphere, Triangle};
pub use rtr::{load_rtr, load_rtr_from_string, load_scene_pack, LoadError};
pub use scene::{Object, Scene, SceneError, ScenePack};
