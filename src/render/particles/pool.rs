//! 粒子实例池
//!
//! 固定容量的粒子记录数组，以槽位 ID 索引。只能通过 `spawn` / `expire` /
//! `teardown` 以及每帧更新修改。

use super::slot_allocator::{SlotAllocator, SlotId};
use crate::core::error::{ParticleError, ParticleResult};
use glam::{Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// 默认速度倍率
pub const DEFAULT_SPEED_MAG: f32 = 4.0;
/// 默认长度倍率
pub const DEFAULT_LENGTH_MAG: f32 = 6.0;
/// 默认每 tick 速度衰减底数
pub const DEFAULT_REDUCTION_RATE: f32 = 0.9375;
/// 初始速度因子的随机范围
pub const INITIAL_SPEED_FACTOR_MIN: f32 = 0.25;
pub const INITIAL_SPEED_FACTOR_MAX: f32 = 1.5;

/// 单个线段粒子
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineParticle {
    /// 齐次位置，w 恒为 1
    pub position: Vec4,
    /// 生成时确定的单位方向
    pub forward: Vec3,
    /// 初始速度因子
    pub initial_speed_factor: f32,
    /// 每 tick 的速度衰减底数
    pub reduction_rate: f32,
    pub speed_mag: f32,
    pub length_mag: f32,
    /// 生成时刻（秒）
    pub spawn_time: f32,
    /// 渐变纹理的纵向采样坐标，位于 `[0, 1]`
    pub color_sampling_v: f32,
}

/// 生成请求
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub position: Vec3,
    pub gradient_index: u32,
    pub speed_mag: f32,
    pub length_mag: f32,
    pub reduction_rate: f32,
    pub count: u32,
}

impl SpawnRequest {
    /// 使用默认参数创建单个粒子的请求
    pub fn new(position: Vec3, gradient_index: u32) -> Self {
        Self {
            position,
            gradient_index,
            speed_mag: DEFAULT_SPEED_MAG,
            length_mag: DEFAULT_LENGTH_MAG,
            reduction_rate: DEFAULT_REDUCTION_RATE,
            count: 1,
        }
    }

    pub fn with_speed_mag(mut self, speed_mag: f32) -> Self {
        self.speed_mag = speed_mag;
        self
    }

    pub fn with_length_mag(mut self, length_mag: f32) -> Self {
        self.length_mag = length_mag;
        self
    }

    pub fn with_reduction_rate(mut self, reduction_rate: f32) -> Self {
        self.reduction_rate = reduction_rate;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }
}

/// 渐变索引 -> 纹理 V 坐标（取纹素中心），结果夹在 `[0, 1]`
pub fn color_sampling_v(gradient_index: u32, gradient_height: u32) -> f32 {
    let height = gradient_height.max(1) as f32;
    ((gradient_index as f32 + 0.5) / height).clamp(0.0, 1.0)
}

/// XY 平面内角度 `theta` 对应的单位方向
pub fn forward_from_angle(theta: f32) -> Vec3 {
    Vec3::new(theta.sin(), theta.cos(), 0.0)
}

/// 粒子实例池
pub struct InstancePool {
    /// 以槽位 ID 索引的粒子记录，`None` 表示空闲
    slots: Vec<Option<LineParticle>>,
    allocator: SlotAllocator,
    /// 扫描上界（高水位线），所有占用槽位都在 `[0, max_instance_index)` 内
    max_instance_index: u32,
    gradient_height: u32,
    rng: StdRng,
}

impl InstancePool {
    /// 创建实例池
    ///
    /// `seed` 为 `None` 时使用系统熵源。
    pub fn new(capacity: u32, gradient_height: u32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        tracing::debug!(target: "particles", capacity, gradient_height, "instance pool created");
        Self {
            slots: vec![None; capacity as usize],
            allocator: SlotAllocator::new(capacity),
            max_instance_index: 0,
            gradient_height: gradient_height.max(1),
            rng,
        }
    }

    /// 按请求生成 `request.count` 个粒子，返回成功生成的数量
    ///
    /// 槽位耗尽时返回 `PoolExhausted`，其中 `spawned` 记录已生成的数量；
    /// 失败的那一次不会写入任何记录。
    pub fn spawn(&mut self, request: &SpawnRequest, now: f32) -> ParticleResult<u32> {
        let position = request.position.extend(1.0);
        let color_v = color_sampling_v(request.gradient_index, self.gradient_height);

        for spawned in 0..request.count {
            let slot = match self.allocator.acquire() {
                Ok(slot) => slot,
                Err(_) => {
                    return Err(ParticleError::PoolExhausted {
                        capacity: self.capacity(),
                        requested: request.count,
                        spawned,
                    })
                }
            };

            let theta = self.rng.gen_range(0.0..TAU);
            let initial_speed_factor = self
                .rng
                .gen_range(INITIAL_SPEED_FACTOR_MIN..=INITIAL_SPEED_FACTOR_MAX);

            self.slots[slot as usize] = Some(LineParticle {
                position,
                forward: forward_from_angle(theta),
                initial_speed_factor,
                reduction_rate: request.reduction_rate,
                speed_mag: request.speed_mag,
                length_mag: request.length_mag,
                spawn_time: now,
                color_sampling_v: color_v,
            });
            self.max_instance_index = self.max_instance_index.max(slot + 1);
        }

        Ok(request.count)
    }

    /// 回收过期槽位
    ///
    /// 只有当该槽位恰好是高水位线下的最后一个时才收缩扫描上界，内部空洞不压缩。
    /// 越界或已空闲的槽位返回 `InvalidRelease`，池状态保持不变。
    pub fn expire(&mut self, slot: SlotId) -> ParticleResult<()> {
        self.allocator.release(slot)?;
        self.slots[slot as usize] = None;

        if slot + 1 == self.max_instance_index {
            self.max_instance_index -= 1;
        }
        Ok(())
    }

    /// 释放全部槽位并重置高水位线
    pub fn teardown(&mut self) {
        self.slots.fill(None);
        self.allocator.initialize(self.capacity());
        self.max_instance_index = 0;
        tracing::debug!(target: "particles", capacity = self.capacity(), "instance pool torn down");
    }

    /// `[0, max_instance_index)` 内的槽位，供每帧更新扫描
    pub fn active_slots_mut(&mut self) -> &mut [Option<LineParticle>] {
        &mut self.slots[..self.max_instance_index as usize]
    }

    pub fn particle(&self, slot: SlotId) -> Option<&LineParticle> {
        self.slots.get(slot as usize).and_then(Option::as_ref)
    }

    pub fn particle_mut(&mut self, slot: SlotId) -> Option<&mut LineParticle> {
        self.slots.get_mut(slot as usize).and_then(Option::as_mut)
    }

    pub fn allocator(&self) -> &SlotAllocator {
        &self.allocator
    }

    pub fn capacity(&self) -> u32 {
        self.allocator.capacity()
    }

    pub fn max_instance_index(&self) -> u32 {
        self.max_instance_index
    }

    pub fn gradient_height(&self) -> u32 {
        self.gradient_height
    }

    /// 空闲槽位数
    pub fn free_slots(&self) -> usize {
        self.allocator.len()
    }

    /// 占用槽位数
    pub fn occupied_slots(&self) -> usize {
        self.capacity() as usize - self.allocator.len()
    }
}
