//! Image rendering and the parallel gather.
//!
//! A render partitions the scene's pixels into one range per worker,
//! shades every range independently against the shared read-only pack, and
//! hands the finished chunks to an [`ImageGather`] that stitches them into
//! a single row-major buffer. The gather checks every chunk against its
//! running offset and the image capacity, so a misbehaving worker aborts the
//! render instead of writing past the image.

use std::time::Instant;

use rayon::prelude::*;
use rtr_core::{Scene, ScenePack};
use rtr_math::{Color16, Color8};
use thiserror::Error;

use crate::camera::Camera;
use crate::partition::{partition, PixelRange};
use crate::shading::Shader;

/// Errors that abort a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("scene {index} does not exist (pack has {count} scenes)")]
    NoSuchScene { index: usize, count: usize },

    #[error("rendering needs at least one worker")]
    ZeroWorkers,

    #[error("chunk of {len} pixels at offset {offset} overflows an image of {capacity} pixels")]
    ChunkOverflow {
        offset: usize,
        len: usize,
        capacity: usize,
    },

    #[error("chunk starting at pixel {start} arrived while the gather expected pixel {expected}")]
    ChunkOutOfOrder { start: usize, expected: usize },

    #[error("image incomplete: gathered {gathered} of {expected} pixels")]
    Incomplete { gathered: usize, expected: usize },

    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Number of workers; 1 renders sequentially on the calling thread
    pub workers: usize,
    /// Color of rays that escape the scene or run out of depth
    pub background: Color16,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            background: Color16::BACKGROUND,
        }
    }
}

impl RenderConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}

/// Finished 8-bit RGBA image in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color8>,
}

impl ImageBuffer {
    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color8 {
        self.pixels[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Raw RGBA bytes, 4 per pixel.
    pub fn as_rgba_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// Collects worker chunks into one image.
#[derive(Debug)]
pub struct ImageGather {
    width: u32,
    height: u32,
    capacity: usize,
    pixels: Vec<Color8>,
}

impl ImageGather {
    pub fn new(width: u32, height: u32) -> Self {
        let capacity = width as usize * height as usize;
        Self {
            width,
            height,
            capacity,
            pixels: Vec::with_capacity(capacity),
        }
    }

    /// Index of the next pixel the gather expects.
    pub fn offset(&self) -> usize {
        self.pixels.len()
    }

    /// Pixels still missing.
    pub fn remaining(&self) -> usize {
        self.capacity - self.pixels.len()
    }

    /// Append the chunk that starts at pixel `start`.
    pub fn receive(&mut self, start: usize, chunk: &[Color8]) -> Result<(), RenderError> {
        let offset = self.offset();
        if start != offset {
            return Err(RenderError::ChunkOutOfOrder {
                start,
                expected: offset,
            });
        }
        if chunk.len() > self.remaining() {
            return Err(RenderError::ChunkOverflow {
                offset,
                len: chunk.len(),
                capacity: self.capacity,
            });
        }

        self.pixels.extend_from_slice(chunk);
        log::debug!(
            "Gathered pixels {}..{} of {}",
            offset,
            self.pixels.len(),
            self.capacity
        );
        Ok(())
    }

    /// Finish the image, failing unless every pixel has arrived.
    pub fn finish(self) -> Result<ImageBuffer, RenderError> {
        if self.pixels.len() != self.capacity {
            return Err(RenderError::Incomplete {
                gathered: self.pixels.len(),
                expected: self.capacity,
            });
        }

        Ok(ImageBuffer {
            width: self.width,
            height: self.height,
            pixels: self.pixels,
        })
    }
}

/// Shade every pixel of `range`.
///
/// Pixels whose camera ray degenerates get the background color.
pub fn render_range(scene: &Scene, shader: &Shader<'_>, range: PixelRange) -> Vec<Color8> {
    let camera = Camera::new(scene);
    let background = shader.background().to_color8();

    range
        .pixels(scene.width)
        .map(|(i, j)| match camera.ray(i, j) {
            Some(ray) => shader.cast_ray(&ray, scene.depth),
            None => background,
        })
        .collect()
}

/// Render scene `scene_index` of `pack`.
///
/// With one worker the image is swept sequentially on the calling thread;
/// otherwise a dedicated rayon pool of `config.workers` threads renders one
/// range per worker. Either way the output is identical.
pub fn render(pack: &ScenePack, scene_index: usize, config: &RenderConfig) -> Result<ImageBuffer, RenderError> {
    let scene = pack.scene(scene_index).ok_or(RenderError::NoSuchScene {
        index: scene_index,
        count: pack.scene_count(),
    })?;
    let ranges = partition(scene.pixel_count(), config.workers)?;
    let shader = Shader::new(pack, scene).with_background(config.background);

    log::info!(
        "Rendering scene {} ({}x{}, depth {}) with {} worker(s)",
        scene_index,
        scene.width,
        scene.height,
        scene.depth,
        config.workers
    );
    let start = Instant::now();

    let chunks: Vec<(PixelRange, Vec<Color8>)> = if config.workers == 1 {
        ranges
            .iter()
            .map(|&range| (range, render_range(scene, &shader, range)))
            .collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .build()?;
        pool.install(|| {
            ranges
                .par_iter()
                .map(|&range| {
                    log::debug!("Worker {} rendering pixels {}..{}", range.worker, range.start, range.end());
                    (range, render_range(scene, &shader, range))
                })
                .collect()
        })
    };

    let mut gather = ImageGather::new(scene.width, scene.height);
    for (range, pixels) in &chunks {
        gather.receive(range.start, pixels)?;
    }
    let image = gather.finish()?;

    log::info!("Scene {} rendered in {:.2?}", scene_index, start.elapsed());
    Ok(image)
}
