//! 每帧运动学更新
//!
//! 对 `[0, max_instance_index)` 内的每个占用槽位：
//! 1. `lifetime = now - spawn_time`
//! 2. `lifetime >= 1.0` 时回收槽位
//! 3. 否则按指数衰减计算当前速度、推进位置，并输出一条绘制记录
//!
//! 衰减以 60 tick/秒为基准归一化，同一个 `reduction_rate` 在不同帧率下效果一致。

use super::draw_batch::{DrawBatchBuilder, LineDrawRecord};
use super::pool::{InstancePool, LineParticle};

/// 生命周期上限（秒），达到即回收
pub const LIFETIME_CUTOFF: f32 = 1.0;
/// 衰减基准 tick 率
pub const TICKS_PER_SECOND: f32 = 60.0;
/// 位移缩放
pub const DISPLACEMENT_SCALE: f32 = 3.0;

/// 当前速度：`initial * |rate| ^ (lifetime * 60)`
///
/// `rate` 取绝对值，负值不会产生复数结果；`rate = 0` 且 `lifetime > 0` 时为 0。
#[inline]
pub fn current_speed(initial_speed_factor: f32, reduction_rate: f32, lifetime: f32) -> f32 {
    initial_speed_factor * reduction_rate.abs().powf(lifetime * TICKS_PER_SECOND)
}

/// 单个粒子的更新结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// 生命周期结束，槽位需在本帧回收
    Expired,
    /// 仍存活，附带本帧的绘制记录
    Live(LineDrawRecord),
}

/// 一帧的运动学参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicsStep {
    pub now: f32,
    pub delta_time: f32,
}

impl KinematicsStep {
    /// 负的或非有限的 `delta_time` 按 0 处理
    pub fn new(now: f32, delta_time: f32) -> Self {
        let delta_time = if delta_time.is_finite() {
            delta_time.max(0.0)
        } else {
            0.0
        };
        Self { now, delta_time }
    }

    /// 更新单个粒子，只读写该粒子自身的记录
    #[inline]
    pub fn apply(&self, particle: &mut LineParticle) -> StepOutcome {
        let lifetime = self.now - particle.spawn_time;
        if lifetime.is_nan() || lifetime >= LIFETIME_CUTOFF {
            return StepOutcome::Expired;
        }

        // 时钟回退时按刚生成处理
        let age = lifetime.max(0.0);
        let speed = current_speed(particle.initial_speed_factor, particle.reduction_rate, age);
        let displacement = speed * particle.speed_mag * DISPLACEMENT_SCALE * self.delta_time;
        particle.position += particle.forward.extend(0.0) * displacement;

        StepOutcome::Live(LineDrawRecord::new(
            particle.position,
            particle.forward,
            speed,
            particle.length_mag,
            age,
            particle.color_sampling_v,
        ))
    }

    /// 顺序扫描整个池：推进存活粒子、回收过期槽位、压缩输出到 `builder`
    pub fn run(&self, pool: &mut InstancePool, builder: &mut DrawBatchBuilder) {
        builder.begin();
        let scan_end = pool.max_instance_index();
        for slot in 0..scan_end {
            let outcome = match pool.particle_mut(slot) {
                Some(particle) => self.apply(particle),
                None => continue,
            };
            match outcome {
                StepOutcome::Expired => {
                    let released = pool.expire(slot);
                    debug_assert!(released.is_ok(), "expire: {:?}", released);
                }
                StepOutcome::Live(record) => builder.push(record),
            }
        }
    }
}
