use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use pathtracer::renderer::render;
use pathtracer::scene::{select_scene, SCENE_NAMES};
use pathtracer::worker_pool::WorkerPool;
use pathtracer::{output, perlin, RenderConfig};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RenderConfig::from_env().context("reading render configuration")?;
    let start_time = Instant::now();

    let mut rng = match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    perlin::initialize(&mut rng);
    let scene = select_scene(config.scene, config.aspect_ratio(), &mut rng)
        .with_context(|| format!("building scene {}", config.scene))?;
    info!(
        "scene {} ({})",
        config.scene,
        SCENE_NAMES.get(config.scene).copied().unwrap_or("?")
    );

    let pool = WorkerPool::new(config.workers, config.seed)?;
    let bar = ProgressBar::new(0);
    bar.set_style(ProgressStyle::default_bar().template("{elapsed_precise} {bar:40} {pos}/{len} tiles"));

    let ray_tracing_start_time = Instant::now();
    let image = render(Arc::new(scene), &config, &pool, Some(&bar))?;
    bar.finish();

    output::save(&image, &config.output)
        .with_context(|| format!("saving {}", config.output.display()))?;
    info!(
        "Total: {:.2}s, RT: {:.2}s, wrote {}",
        start_time.elapsed().as_secs_f64(),
        ray_tracing_start_time.elapsed().as_secs_f64(),
        config.output.display()
    );
    Ok(())
}
