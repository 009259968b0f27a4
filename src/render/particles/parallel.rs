//! 并行后端
//!
//! 对应计算单元上的执行模型，三个阶段按顺序执行：
//!
//! ```text
//! spawn    (顺序)  从最小堆取槽位并写入初始记录
//!   │
//! update   (并行)  按固定大小的块划分 [0, max_instance_index)，
//!   │              每个粒子只读写自己的记录，存活记录写入块内暂存区，
//!   │              过期槽位记入块的回收列表
//! compact  (顺序)  按块顺序拷贝暂存区前缀到稠密输出，按升序回收槽位
//! ```
//!
//! 输出顺序与高水位线的变化和顺序后端完全一致。

use super::backend::ParticleBackend;
use super::draw_batch::{DrawBatch, DrawBatchBuilder, LineDrawRecord};
use super::kinematics::{KinematicsStep, StepOutcome};
use super::pool::{InstancePool, SpawnRequest};
use super::slot_allocator::SlotId;
use crate::config::BackendKind;
use crate::core::error::ParticleResult;
use rayon::prelude::*;

/// 单个块在一帧内的结果，回收列表跨帧复用
#[derive(Debug, Default, Clone)]
struct ChunkState {
    live: usize,
    expired: Vec<SlotId>,
}

pub struct ParallelBackend {
    pool: InstancePool,
    builder: DrawBatchBuilder,
    /// 与槽位一一对应的暂存区
    scratch: Vec<LineDrawRecord>,
    chunks: Vec<ChunkState>,
    chunk_size: usize,
}

impl ParallelBackend {
    pub fn new(capacity: u32, gradient_height: u32, seed: Option<u64>, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        let chunk_count = (capacity as usize).div_ceil(chunk_size);
        Self {
            pool: InstancePool::new(capacity, gradient_height, seed),
            builder: DrawBatchBuilder::new(capacity as usize),
            scratch: vec![LineDrawRecord::default(); capacity as usize],
            chunks: (0..chunk_count)
                .map(|_| ChunkState {
                    live: 0,
                    expired: Vec::with_capacity(chunk_size),
                })
                .collect(),
            chunk_size,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl ParticleBackend for ParallelBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Parallel
    }

    fn spawn(&mut self, request: &SpawnRequest, now: f32) -> ParticleResult<u32> {
        self.pool.spawn(request, now)
    }

    fn advance(&mut self, now: f32, delta_time: f32) -> DrawBatch<'_> {
        let step = KinematicsStep::new(now, delta_time);
        let chunk_size = self.chunk_size;

        let active = self.pool.active_slots_mut();
        let chunk_count = active.len().div_ceil(chunk_size);
        let scratch = &mut self.scratch[..active.len()];
        let chunks = &mut self.chunks[..chunk_count];

        active
            .par_chunks_mut(chunk_size)
            .zip(scratch.par_chunks_mut(chunk_size))
            .zip(chunks.par_iter_mut())
            .enumerate()
            .for_each(|(index, ((slots, out), state))| {
                let base = (index * chunk_size) as SlotId;
                state.live = 0;
                state.expired.clear();

                for (offset, entry) in slots.iter_mut().enumerate() {
                    let Some(particle) = entry.as_mut() else {
                        continue;
                    };
                    match step.apply(particle) {
                        StepOutcome::Expired => state.expired.push(base + offset as SlotId),
                        StepOutcome::Live(record) => {
                            out[state.live] = record;
                            state.live += 1;
                        }
                    }
                }
            });

        self.builder.begin();
        for (index, state) in self.chunks[..chunk_count].iter().enumerate() {
            let start = index * chunk_size;
            self.builder
                .extend_from_slice(&self.scratch[start..start + state.live]);
            for &slot in &state.expired {
                let released = self.pool.expire(slot);
                debug_assert!(released.is_ok(), "expire: {:?}", released);
            }
        }

        tracing::trace!(
            target: "particles",
            live = self.builder.live_count(),
            chunks = chunk_count,
            "parallel update finished"
        );
        self.builder.batch()
    }

    fn last_batch(&self) -> DrawBatch<'_> {
        self.builder.batch()
    }

    fn teardown(&mut self) {
        self.pool.teardown();
        self.builder.begin();
        for state in &mut self.chunks {
            state.live = 0;
            state.expired.clear();
        }
    }

    fn pool(&self) -> &InstancePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::particles::sequential::SequentialBackend;
    use glam::Vec3;

    #[test]
    fn test_chunk_boundaries() {
        // 块大小 3，10 个粒子跨越 4 个块
        let mut backend = ParallelBackend::new(16, 4, Some(5), 3);
        backend
            .spawn(&SpawnRequest::new(Vec3::ZERO, 0).with_count(10), 0.0)
            .unwrap();
        assert_eq!(backend.advance(0.5, 0.016).len(), 10);
        assert_eq!(backend.advance(1.0, 0.016).len(), 0);
        assert_eq!(backend.pool().free_slots(), 16);
        assert_eq!(backend.pool().max_instance_index(), 9);
    }

    #[test]
    fn test_matches_sequential_backend() {
        let mut sequential = SequentialBackend::new(256, 8, Some(11));
        let mut parallel = ParallelBackend::new(256, 8, Some(11), 7);

        let mut now = 0.0f32;
        let delta = 1.0 / 60.0;
        for frame in 0..120 {
            let request = SpawnRequest::new(Vec3::new(1.0, -2.0, 0.5), frame % 8).with_count(3);
            sequential.spawn(&request, now).unwrap();
            parallel.spawn(&request, now).unwrap();

            now += delta;
            let a = sequential.advance(now, delta).records().to_vec();
            let b = parallel.advance(now, delta).records().to_vec();
            assert_eq!(a, b, "frame {frame}");
            assert_eq!(
                sequential.pool().max_instance_index(),
                parallel.pool().max_instance_index()
            );
            assert_eq!(sequential.pool().free_slots(), parallel.pool().free_slots());
        }
    }

    #[test]
    fn test_expired_lists_are_preallocated() {
        let backend = ParallelBackend::new(10, 4, Some(1), 4);
        assert_eq!(backend.chunks.len(), 3);
        assert!(backend.chunks.iter().all(|c| c.expired.capacity() >= 4));
    }

    #[test]
    fn test_zero_capacity() {
        let mut backend = ParallelBackend::new(0, 4, Some(1), 64);
        assert!(backend.advance(0.1, 0.1).is_empty());
        assert!(backend
            .spawn(&SpawnRequest::new(Vec3::ZERO, 0), 0.0)
            .unwrap_err()
            .is_exhausted());
    }
}
