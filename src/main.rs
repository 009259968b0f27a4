use line_particles::config::EngineConfig;
use line_particles::core::{Engine, EngineResult};
use line_particles::render::particles::CountingRenderer;

/// 默认运行帧数
const DEFAULT_FRAMES: u32 = 600;
/// 帧间隔（60 FPS）
const FRAME_DELTA: f32 = 1.0 / 60.0;

fn main() {
    if let Err(e) = run() {
        eprintln!("line_particles failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> EngineResult<()> {
    let (mut config, source) = EngineConfig::load_or_default()?;
    config.apply_env_overrides()?;
    Engine::initialize_logging(&config.logging);
    tracing::info!(target: "engine", ?source, "configuration loaded");

    let frames = std::env::var("LINE_PARTICLES_FRAMES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let mut engine = Engine::new(config)?;
    let mut renderer = CountingRenderer::default();
    let stats = engine.run_frames(frames, FRAME_DELTA, &mut renderer)?;

    tracing::info!(
        target: "engine",
        alive = stats.alive_count,
        max_instance_index = stats.max_instance_index,
        update_ms = stats.update_time_ms,
        draw_calls = renderer.draw_calls,
        lines = renderer.lines_drawn,
        "final statistics"
    );
    Ok(())
}
