//! 线段粒子驱动器
//!
//! 宿主渲染循环显式持有的入口：`spawn` / `advance` / `teardown`。
//! 驱动器独占一个后端，负责生成时钟、默认参数、耗尽策略和统计信息。

use super::backend::{create_backend, ParticleBackend};
use super::draw_batch::DrawBatch;
use super::pool::{InstancePool, SpawnRequest};
use super::renderer::{submit, LineRenderer};
use crate::config::{DrawMode, ExhaustionPolicy, ParticleConfig, SpawnDefaults};
use crate::core::error::{ParticleError, ParticleResult};
use glam::Vec3;
use std::time::Instant;

/// 粒子系统统计
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ParticleSystemStats {
    /// 当前存活粒子数
    pub alive_count: u32,
    /// 总生成数
    pub total_spawned: u64,
    /// 上一帧期间的生成数
    pub frame_spawned: u32,
    /// 因池耗尽丢弃的请求粒子数
    pub total_dropped: u64,
    /// 扫描上界
    pub max_instance_index: u32,
    /// 更新时间（ms）
    pub update_time_ms: f32,
    /// 已推进的帧数
    pub frames: u64,
}

/// 线段粒子驱动器
pub struct LineParticleDriver {
    backend: Box<dyn ParticleBackend>,
    defaults: SpawnDefaults,
    exhaustion: ExhaustionPolicy,
    draw_mode: DrawMode,
    /// 写入新粒子的生成时刻
    now: f32,
    pending_spawned: u32,
    stats: ParticleSystemStats,
}

impl LineParticleDriver {
    /// 按配置创建驱动器和后端
    pub fn new(config: &ParticleConfig) -> Self {
        Self::with_backend(create_backend(config), config)
    }

    /// 使用外部构造的后端
    pub fn with_backend(backend: Box<dyn ParticleBackend>, config: &ParticleConfig) -> Self {
        Self {
            backend,
            defaults: config.spawn,
            exhaustion: config.exhaustion,
            draw_mode: config.draw_mode,
            now: 0.0,
            pending_spawned: 0,
            stats: ParticleSystemStats::default(),
        }
    }

    /// 以默认参数构造请求
    pub fn request(&self, position: Vec3, gradient_index: u32) -> SpawnRequest {
        SpawnRequest::new(position, gradient_index)
            .with_speed_mag(self.defaults.speed_mag)
            .with_length_mag(self.defaults.length_mag)
            .with_reduction_rate(self.defaults.reduction_rate)
    }

    /// 以默认参数生成一个粒子
    pub fn spawn(&mut self, position: Vec3, gradient_index: u32) -> ParticleResult<u32> {
        let request = self.request(position, gradient_index);
        self.spawn_request(&request)
    }

    /// 以默认参数生成 `count` 个粒子
    pub fn spawn_many(&mut self, count: u32, position: Vec3, gradient_index: u32) -> ParticleResult<u32> {
        let request = self.request(position, gradient_index).with_count(count);
        self.spawn_request(&request)
    }

    /// 按请求生成，池耗尽时按配置的策略处理
    pub fn spawn_request(&mut self, request: &SpawnRequest) -> ParticleResult<u32> {
        match self.backend.spawn(request, self.now) {
            Ok(spawned) => {
                self.record_spawned(spawned);
                Ok(spawned)
            }
            Err(ParticleError::PoolExhausted {
                capacity,
                requested,
                spawned,
            }) => {
                self.record_spawned(spawned);
                let dropped = requested - spawned;
                self.stats.total_dropped += u64::from(dropped);

                match self.exhaustion {
                    ExhaustionPolicy::Drop => Ok(spawned),
                    ExhaustionPolicy::DropLogged => {
                        tracing::warn!(
                            target: "particles",
                            capacity,
                            requested,
                            dropped,
                            "particle pool exhausted, dropping spawn request"
                        );
                        Ok(spawned)
                    }
                    ExhaustionPolicy::Propagate => Err(ParticleError::PoolExhausted {
                        capacity,
                        requested,
                        spawned,
                    }),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// 推进一帧，返回稠密绘制批次
    ///
    /// 非有限的 `now` 被忽略，沿用上一个有限时刻。
    pub fn advance(&mut self, now: f32, delta_time: f32) -> DrawBatch<'_> {
        self.set_time(now);
        let now = self.now;
        let start = Instant::now();
        let live = self.backend.advance(now, delta_time).len();

        self.stats.alive_count = live as u32;
        self.stats.frame_spawned = std::mem::take(&mut self.pending_spawned);
        self.stats.max_instance_index = self.backend.pool().max_instance_index();
        self.stats.update_time_ms = start.elapsed().as_secs_f32() * 1000.0;
        self.stats.frames += 1;

        tracing::trace!(
            target: "particles",
            now,
            live,
            max_instance_index = self.stats.max_instance_index,
            "frame advanced"
        );
        self.backend.last_batch()
    }

    /// 把最近一帧的批次提交给渲染器，返回绘制调用数
    pub fn draw<R: LineRenderer + ?Sized>(&self, renderer: &mut R) -> usize {
        submit(&self.backend.last_batch(), renderer, self.draw_mode)
    }

    /// 释放全部粒子
    pub fn teardown(&mut self) {
        self.backend.teardown();
        self.pending_spawned = 0;
        self.stats.alive_count = 0;
        self.stats.max_instance_index = 0;
        tracing::debug!(target: "particles", "line particle driver torn down");
    }

    /// 设置后续生成使用的时刻
    ///
    /// 宿主在同一帧的 `advance` 之前发起生成时，用它让生成时刻与该帧一致。
    /// 非有限的时刻被忽略。
    pub fn set_time(&mut self, now: f32) {
        if now.is_finite() {
            self.now = now;
        } else {
            tracing::warn!(target: "particles", now, "ignoring non-finite particle clock");
        }
    }

    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn last_batch(&self) -> DrawBatch<'_> {
        self.backend.last_batch()
    }

    pub fn pool(&self) -> &InstancePool {
        self.backend.pool()
    }

    pub fn backend(&self) -> &dyn ParticleBackend {
        self.backend.as_ref()
    }

    pub fn stats(&self) -> ParticleSystemStats {
        self.stats
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    fn record_spawned(&mut self, spawned: u32) {
        self.pending_spawned += spawned;
        self.stats.total_spawned += u64::from(spawned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendKind;
    use crate::render::particles::renderer::CountingRenderer;

    fn config(capacity: u32, exhaustion: ExhaustionPolicy) -> ParticleConfig {
        ParticleConfig {
            capacity,
            exhaustion,
            seed: Some(21),
            ..ParticleConfig::default()
        }
    }

    #[test]
    fn test_spawn_uses_configured_defaults() {
        let mut cfg = config(8, ExhaustionPolicy::Propagate);
        cfg.spawn.length_mag = 2.0;
        let mut driver = LineParticleDriver::new(&cfg);
        driver.spawn(Vec3::ZERO, 0).unwrap();
        assert_eq!(driver.pool().particle(0).map(|p| p.length_mag), Some(2.0));
    }

    #[test]
    fn test_drop_policy_swallows_exhaustion() {
        let mut driver = LineParticleDriver::new(&config(4, ExhaustionPolicy::Drop));
        assert_eq!(driver.spawn_many(6, Vec3::ZERO, 0), Ok(4));
        assert_eq!(driver.spawn(Vec3::ZERO, 0), Ok(0));
        assert_eq!(driver.stats().total_dropped, 3);
        assert_eq!(driver.stats().total_spawned, 4);
    }

    #[test]
    fn test_propagate_policy_returns_error() {
        let mut driver = LineParticleDriver::new(&config(2, ExhaustionPolicy::Propagate));
        let err = driver.spawn_many(3, Vec3::ZERO, 0).unwrap_err();
        assert_eq!(
            err,
            ParticleError::PoolExhausted {
                capacity: 2,
                requested: 3,
                spawned: 2
            }
        );
    }

    #[test]
    fn test_advance_updates_stats_and_draws() {
        let mut cfg = config(32, ExhaustionPolicy::Propagate);
        cfg.backend = BackendKind::Parallel;
        cfg.draw_mode = DrawMode::Immediate;
        let mut driver = LineParticleDriver::new(&cfg);

        driver.spawn_many(5, Vec3::ZERO, 1).unwrap();
        assert_eq!(driver.advance(0.5, 0.5).len(), 5);

        let stats = driver.stats();
        assert_eq!(stats.alive_count, 5);
        assert_eq!(stats.frame_spawned, 5);
        assert_eq!(stats.max_instance_index, 5);
        assert_eq!(stats.frames, 1);

        let mut renderer = CountingRenderer::default();
        assert_eq!(driver.draw(&mut renderer), 5);

        driver.advance(0.6, 0.1);
        assert_eq!(driver.stats().frame_spawned, 0);
    }

    #[test]
    fn test_spawn_time_follows_clock() {
        let mut driver = LineParticleDriver::new(&config(8, ExhaustionPolicy::Propagate));
        driver.set_time(2.5);
        driver.spawn(Vec3::ZERO, 0).unwrap();
        assert_eq!(driver.pool().particle(0).map(|p| p.spawn_time), Some(2.5));
        assert_eq!(driver.now(), 2.5);
    }

    #[test]
    fn test_non_finite_clock_does_not_leak_slots() {
        let mut driver = LineParticleDriver::new(&config(8, ExhaustionPolicy::Propagate));
        driver.spawn(Vec3::ZERO, 0).unwrap();
        driver.advance(0.25, 0.25);

        assert_eq!(driver.advance(f32::NAN, 1.0 / 60.0).len(), 1);
        assert_eq!(driver.now(), 0.25);
        driver.set_time(f32::INFINITY);
        assert_eq!(driver.now(), 0.25);

        driver.spawn(Vec3::ZERO, 0).unwrap();
        assert_eq!(driver.pool().particle(1).map(|p| p.spawn_time), Some(0.25));

        let mut now = 0.25;
        for _ in 0..120 {
            now += 1.0 / 60.0;
            driver.advance(now, 1.0 / 60.0);
        }
        assert_eq!(driver.pool().occupied_slots(), 0);
        assert_eq!(driver.pool().free_slots(), 8);
    }

    #[test]
    fn test_teardown_resets() {
        let mut driver = LineParticleDriver::new(&config(8, ExhaustionPolicy::Propagate));
        driver.spawn_many(8, Vec3::ZERO, 0).unwrap();
        driver.advance(0.1, 0.1);
        driver.teardown();
        assert!(driver.last_batch().is_empty());
        assert_eq!(driver.pool().free_slots(), 8);
        assert_eq!(driver.stats().alive_count, 0);
        assert_eq!(driver.spawn_many(8, Vec3::ZERO, 0), Ok(8));
    }
}
