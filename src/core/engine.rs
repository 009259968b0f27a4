//! 引擎主入口
//!
//! 定义无窗口的帧循环：时钟 → 固定步发射 → 粒子更新 → 提交绘制

use crate::config::{EngineConfig, LoggingConfig};
use crate::render::particles::{LineParticleDriver, LineRenderer, ParticleSpreader, ParticleSystemStats};

use super::error::EngineResult;
use super::time::FrameClock;

/// 单帧结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// 本帧时刻
    pub now: f32,
    /// 本帧发射的粒子数
    pub spawned: u32,
    /// 本帧存活粒子数
    pub live: usize,
    /// 本帧发出的绘制调用数
    pub draw_calls: usize,
}

/// 粒子引擎
///
/// `Engine` 显式持有驱动器和发射器，宿主通过 `frame` 逐帧推进：
/// 1. **时钟**：推进帧时钟，并把新时刻同步给驱动器作为生成时刻
/// 2. **发射**：发射器按固定步长生成粒子
/// 3. **更新**：驱动器推进所有粒子，得到稠密绘制批次
/// 4. **绘制**：按配置的绘制模式提交给渲染器
///
/// # 示例
///
/// ```
/// use line_particles::config::EngineConfig;
/// use line_particles::core::Engine;
/// use line_particles::render::particles::CountingRenderer;
///
/// let mut config = EngineConfig::default();
/// config.particles.capacity = 4096;
/// let mut engine = Engine::new(config).unwrap();
/// let mut renderer = CountingRenderer::default();
/// let stats = engine.run_frames(60, 1.0 / 60.0, &mut renderer).unwrap();
/// assert!(stats.total_spawned > 0);
/// ```
pub struct Engine {
    config: EngineConfig,
    driver: LineParticleDriver,
    spreader: ParticleSpreader,
    clock: FrameClock,
    effect_enabled: bool,
}

impl Engine {
    /// 验证配置并创建引擎
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let driver = LineParticleDriver::new(&config.particles);
        let spreader = ParticleSpreader::new(config.emitter.clone());
        tracing::info!(
            target: "engine",
            backend = ?config.particles.backend,
            capacity = config.particles.capacity,
            spawn_rate = config.emitter.spawn_rate,
            "engine created"
        );
        Ok(Self {
            config,
            driver,
            spreader,
            clock: FrameClock::new(),
            effect_enabled: true,
        })
    }

    /// 初始化日志系统
    ///
    /// 配置tracing日志框架；`RUST_LOG` 环境变量优先于配置中的级别。
    pub fn initialize_logging(config: &LoggingConfig) {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.level.as_str()));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        tracing::info!(target: "engine", "Engine starting");
    }

    /// 推进一帧
    pub fn frame<R: LineRenderer + ?Sized>(&mut self, delta: f32, renderer: &mut R) -> EngineResult<FrameReport> {
        let delta = self.clock.tick(delta);
        let now = self.clock.now();
        self.driver.set_time(now);

        let spawned = if self.effect_enabled {
            self.spreader.update(delta, &mut self.driver)?
        } else {
            0
        };

        let live = self.driver.advance(now, delta).len();
        let draw_calls = if self.effect_enabled {
            self.driver.draw(renderer)
        } else {
            0
        };

        Ok(FrameReport {
            now,
            spawned,
            live,
            draw_calls,
        })
    }

    /// 以固定帧间隔运行 `frames` 帧，返回最终统计
    pub fn run_frames<R: LineRenderer + ?Sized>(
        &mut self,
        frames: u32,
        delta: f32,
        renderer: &mut R,
    ) -> EngineResult<ParticleSystemStats> {
        for _ in 0..frames {
            self.frame(delta, renderer)?;
        }
        let stats = self.driver.stats();
        tracing::info!(
            target: "engine",
            frames = stats.frames,
            alive = stats.alive_count,
            spawned = stats.total_spawned,
            dropped = stats.total_dropped,
            "run finished"
        );
        Ok(stats)
    }

    /// 开关整个效果；关闭时释放所有粒子
    pub fn set_effect_enabled(&mut self, enabled: bool) {
        if self.effect_enabled == enabled {
            return;
        }
        self.effect_enabled = enabled;
        if !enabled {
            self.driver.teardown();
        }
        tracing::info!(target: "engine", enabled, "line particle effect toggled");
    }

    /// 切换发射器（对应输入触发的开关）
    pub fn toggle_spreader(&mut self) -> bool {
        self.spreader.toggle()
    }

    pub fn driver(&self) -> &LineParticleDriver {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut LineParticleDriver {
        &mut self.driver
    }

    pub fn spreader(&self) -> &ParticleSpreader {
        &self.spreader
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
