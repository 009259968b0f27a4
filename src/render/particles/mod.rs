//! 线段粒子系统模块
//!
//! 高频生成、短生命周期的线段粒子：从一点生成，向外飞出，逐渐缩短并淡出。
//!
//! ## 架构设计
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Line Particle Pipeline                  │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Spawn                                                │
//! │     - SlotAllocator 从最小堆取出最小空闲槽位              │
//! │     - InstancePool 写入初始状态，必要时抬高高水位线        │
//! │                                                          │
//! │  2. Kinematics                                           │
//! │     - 扫描 [0, max_instance_index)                        │
//! │     - 指数衰减速度、推进位置                              │
//! │     - lifetime >= 1.0 的槽位归还空闲列表                  │
//! │                                                          │
//! │  3. Draw Batch                                           │
//! │     - 存活粒子压缩为稠密的 LineDrawRecord 序列             │
//! │     - 逐条绘制或一次间接绘制                              │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 使用示例
//!
//! ```
//! use glam::Vec3;
//! use line_particles::config::ParticleConfig;
//! use line_particles::render::particles::LineParticleDriver;
//!
//! let mut driver = LineParticleDriver::new(&ParticleConfig {
//!     capacity: 1024,
//!     ..Default::default()
//! });
//! driver.spawn(Vec3::ZERO, 1).unwrap();
//! let batch = driver.advance(0.5, 0.5);
//! assert_eq!(batch.len(), 1);
//! ```

pub mod backend;
pub mod draw_batch;
pub mod driver;
pub mod kinematics;
pub mod parallel;
pub mod pool;
pub mod renderer;
pub mod sequential;
pub mod slot_allocator;
pub mod spreader;

pub use backend::{create_backend, ParticleBackend};
pub use draw_batch::{DrawBatch, DrawBatchBuilder, DrawIndirectArgs, LineDrawRecord};
pub use driver::{LineParticleDriver, ParticleSystemStats};
pub use kinematics::{current_speed, KinematicsStep, StepOutcome, LIFETIME_CUTOFF};
pub use parallel::ParallelBackend;
pub use pool::{color_sampling_v, InstancePool, LineParticle, SpawnRequest};
pub use renderer::{submit, CountingRenderer, LineRenderer};
pub use sequential::SequentialBackend;
pub use slot_allocator::{SlotAllocator, SlotId};
pub use spreader::ParticleSpreader;
