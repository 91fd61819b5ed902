mod cli;

use std::fs;

use anyhow::{Context, Result};
use plasma::{AnimationClock, EffectManifest, Paint, PlasmaConfig};
use renderer::{EffectPipeline, GpuContext, ProgramCache};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = cli::parse();
    initialise_tracing();

    let (config, paint) = match &cli.manifest {
        Some(path) => {
            let manifest = EffectManifest::load(path)
                .with_context(|| format!("failed to load manifest at {}", path.display()))?;
            (manifest.config(), manifest.paint())
        }
        None => (
            PlasmaConfig::new(cli.tile.0, cli.tile.1),
            Paint::new(cli.color),
        ),
    };

    fs::create_dir_all(&cli.output)
        .with_context(|| format!("failed to create output directory {}", cli.output.display()))?;

    let context = GpuContext::acquire()?;
    tracing::info!(adapter = %context.adapter_name, "acquired GPU context");

    let (width, height) = cli.size;
    let mut cache = ProgramCache::new();
    let mut clock = AnimationClock::new();

    for frame in 0..cli.frames {
        let effect = config.realize(&paint, None, &mut clock)?;
        let pipeline =
            cache.get_or_insert_with(effect.program_key(), || EffectPipeline::new(&context))?;
        let pixels = pipeline
            .render(&context, &effect, &paint, width, height)
            .with_context(|| format!("failed to render frame {frame}"))?;

        let image = image::RgbaImage::from_raw(width, height, pixels)
            .context("rendered frame has unexpected length")?;
        let path = cli.output.join(format!("frame_{frame:04}.png"));
        image
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(frame, path = %path.display(), time = effect.time(), "wrote frame");
    }

    Ok(())
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
