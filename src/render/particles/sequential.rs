//! 顺序后端
//!
//! 单线程按槽位顺序扫描，宿主随后逐条发出线段绘制或一次间接绘制。

use super::backend::ParticleBackend;
use super::draw_batch::{DrawBatch, DrawBatchBuilder};
use super::kinematics::KinematicsStep;
use super::pool::{InstancePool, SpawnRequest};
use crate::config::BackendKind;
use crate::core::error::ParticleResult;

pub struct SequentialBackend {
    pool: InstancePool,
    builder: DrawBatchBuilder,
}

impl SequentialBackend {
    pub fn new(capacity: u32, gradient_height: u32, seed: Option<u64>) -> Self {
        Self {
            pool: InstancePool::new(capacity, gradient_height, seed),
            builder: DrawBatchBuilder::new(capacity as usize),
        }
    }
}

impl ParticleBackend for SequentialBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Sequential
    }

    fn spawn(&mut self, request: &SpawnRequest, now: f32) -> ParticleResult<u32> {
        self.pool.spawn(request, now)
    }

    fn advance(&mut self, now: f32, delta_time: f32) -> DrawBatch<'_> {
        KinematicsStep::new(now, delta_time).run(&mut self.pool, &mut self.builder);
        self.builder.batch()
    }

    fn last_batch(&self) -> DrawBatch<'_> {
        self.builder.batch()
    }

    fn teardown(&mut self) {
        self.pool.teardown();
        self.builder.begin();
    }

    fn pool(&self) -> &InstancePool {
        &self.pool
    }
}
