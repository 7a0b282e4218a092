//! ray_tracer - render every scene of an rtr scene pack to PNG files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rtr_core::load_scene_pack;
use rtr_renderer::{render, ImageBuffer, RenderConfig};

mod output;

use output::OutputTemplate;

#[derive(Parser, Debug)]
#[command(name = "ray_tracer")]
#[command(about = "Whitted-style ray tracer for .rtr scene packs", long_about = None)]
struct Cli {
    /// Scene pack to render (.rtr text or .json)
    #[arg(default_value = "scenes.rtr")]
    scenes: PathBuf,

    /// Output file template; '#' is replaced with the scene number
    #[arg(short, long, default_value = "output#.png")]
    output: OutputTemplate,

    /// Number of render workers
    #[arg(short = 'j', long, default_value_t = 1)]
    workers: usize,

    /// Render only this scene (default: every scene in the pack)
    #[arg(short, long)]
    scene: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let pack = load_scene_pack(&cli.scenes)
        .with_context(|| format!("Failed to load scenes from {}", cli.scenes.display()))?;

    let scenes: Vec<usize> = match cli.scene {
        Some(index) if index >= pack.scene_count() => anyhow::bail!(
            "Scene {} requested, but {} has only {} scenes",
            index,
            cli.scenes.display(),
            pack.scene_count()
        ),
        Some(index) => vec![index],
        None => (0..pack.scene_count()).collect(),
    };
    if scenes.is_empty() {
        log::warn!("{} contains no scenes; nothing to render", cli.scenes.display());
    }

    let config = RenderConfig::default().with_workers(cli.workers);
    for index in scenes {
        let image = render(&pack, index, &config)
            .with_context(|| format!("Failed to render scene {}", index))?;

        let path = cli.output.path_for(index);
        write_png(&path, &image)?;
        log::info!("Saved scene {} to {}", index, path.display());
    }

    Ok(())
}

fn write_png(path: &Path, image: &ImageBuffer) -> Result<()> {
    image::save_buffer_with_format(
        path,
        image.as_rgba_bytes(),
        image.width,
        image.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("Failed to write {}", path.display()))
}
