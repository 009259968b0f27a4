//! 粒子后端接口
//!
//! 同一套生命周期契约（分配、运动学、压缩）的两种执行策略：
//! - [`SequentialBackend`]：单线程顺序循环
//! - [`ParallelBackend`]：按块并行更新，再按块顺序压缩
//!
//! 两者对相同输入产生相同的绘制批次和相同的槽位状态。

use super::draw_batch::DrawBatch;
use super::parallel::ParallelBackend;
use super::pool::{InstancePool, SpawnRequest};
use super::sequential::SequentialBackend;
use crate::config::{BackendKind, ParticleConfig};
use crate::core::error::ParticleResult;

/// 粒子后端
pub trait ParticleBackend: Send {
    fn kind(&self) -> BackendKind;

    /// 生成粒子，返回成功生成的数量
    fn spawn(&mut self, request: &SpawnRequest, now: f32) -> ParticleResult<u32>;

    /// 推进一帧并返回本帧的稠密绘制批次
    fn advance(&mut self, now: f32, delta_time: f32) -> DrawBatch<'_>;

    /// 最近一次 `advance` 的结果
    fn last_batch(&self) -> DrawBatch<'_>;

    /// 释放全部槽位
    fn teardown(&mut self);

    /// 只读访问实例池
    fn pool(&self) -> &InstancePool;
}

/// 按配置创建后端
pub fn create_backend(config: &ParticleConfig) -> Box<dyn ParticleBackend> {
    tracing::debug!(
        target: "particles",
        backend = ?config.backend,
        capacity = config.capacity,
        "creating particle backend"
    );
    match config.backend {
        BackendKind::Sequential => Box::new(SequentialBackend::new(
            config.capacity,
            config.gradient_height,
            config.seed,
        )),
        BackendKind::Parallel => Box::new(ParallelBackend::new(
            config.capacity,
            config.gradient_height,
            config.seed,
            config.parallel_chunk_size,
        )),
    }
}
