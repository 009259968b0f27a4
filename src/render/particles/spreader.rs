//! 周期发射器
//!
//! 以固定步长向驱动器发射粒子，可随时开关。

use super::driver::LineParticleDriver;
use crate::config::EmitterConfig;
use crate::core::error::ParticleResult;
use glam::Vec3;

/// 固定步长发射器
#[derive(Debug, Clone)]
pub struct ParticleSpreader {
    config: EmitterConfig,
    enabled: bool,
    /// 未消耗的时间
    accumulator: f32,
}

impl ParticleSpreader {
    pub fn new(config: EmitterConfig) -> Self {
        Self {
            enabled: config.enabled,
            config,
            accumulator: 0.0,
        }
    }

    /// 计算本帧应执行的固定步数
    ///
    /// 负的或非有限的增量被忽略；超过单帧上限的积压时间直接丢弃。
    pub fn fixed_steps(&mut self, delta_time: f32) -> u32 {
        if !self.enabled {
            return 0;
        }
        if delta_time.is_finite() && delta_time > 0.0 {
            self.accumulator += delta_time;
        }

        let step = self.config.fixed_time_step;
        let mut steps = 0;
        while self.accumulator >= step && steps < self.config.max_steps_per_frame {
            self.accumulator -= step;
            steps += 1;
        }
        if self.accumulator >= step {
            self.accumulator %= step;
        }
        steps
    }

    /// 推进发射器并向驱动器发射，返回本帧生成的粒子数
    pub fn update(&mut self, delta_time: f32, driver: &mut LineParticleDriver) -> ParticleResult<u32> {
        let steps = self.fixed_steps(delta_time);
        let origin = Vec3::from_array(self.config.origin);
        let mut spawned = 0;
        for _ in 0..steps {
            spawned += driver.spawn_many(self.config.spawn_rate, origin, self.config.gradient_index)?;
        }
        Ok(spawned)
    }

    /// 切换开关，返回切换后的状态
    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            tracing::info!(target: "particles", enabled, "particle spreader toggled");
        }
        self.enabled = enabled;
        self.accumulator = 0.0;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }
}
