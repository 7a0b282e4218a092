//! rtr Renderer - CPU Whitted-style ray tracing.
//!
//! One primary ray per pixel, hard shadows from point lights, and mirror
//! reflection plus refraction traced to a per-scene depth. Pixels are
//! rendered either sequentially or by a fixed number of rayon workers, each
//! owning a contiguous range of the image; both paths produce identical
//! bytes.
//!
//! # Example
//!
//! ```ignore
//! use rtr_core::load_scene_pack;
//! use rtr_renderer::{render, RenderConfig};
//!
//! let pack = load_scene_pack("scenes.rtr")?;
//! let image = render(&pack, 0, &RenderConfig::default().with_workers(8))?;
//! println!("{}x{}", image.width, image.height);
//! ```

mod camera;
mod intersect;
mod partition;
mod renderer;
mod shading;

pub use camera::Camera;
pub use intersect::{scene_intersect, Intersect, Intersection, PrimitiveHit, TRIANGLE_EPSILON};
pub use partition::{partition, PixelRange};
pub use renderer::{render, render_range, ImageBuffer, ImageGather, RenderConfig, RenderError};
pub use shading::Shader;

/// Re-export the math types renderer callers need
pub use rtr_math::{Color16, Color8, Ray, Vec3};
