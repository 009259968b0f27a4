//! 线段粒子系统性能基准测试
//!
//! 测试槽位分配、稳态帧更新以及两种后端的对比

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use line_particles::render::particles::{
    ParallelBackend, ParticleBackend, SequentialBackend, SlotAllocator, SpawnRequest,
};
use std::hint::black_box;

const FRAME_DELTA: f32 = 1.0 / 60.0;

fn bench_slot_allocator(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot_allocator");

    for capacity in [1024u32, 65536, 1024 * 2048].iter() {
        group.bench_with_input(
            BenchmarkId::new("initialize", capacity),
            capacity,
            |b, &capacity| {
                let mut allocator = SlotAllocator::new(0);
                b.iter(|| {
                    allocator.initialize(capacity);
                    black_box(allocator.len())
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("churn", capacity), capacity, |b, &capacity| {
            let mut allocator = SlotAllocator::new(capacity);
            let held: Vec<_> = (0..capacity / 2).filter_map(|_| allocator.acquire().ok()).collect();
            b.iter(|| {
                let mut acquired = Vec::with_capacity(256);
                for _ in 0..256 {
                    if let Ok(slot) = allocator.acquire() {
                        acquired.push(slot);
                    }
                }
                for slot in acquired.into_iter().rev() {
                    let _ = allocator.release(slot);
                }
                black_box(allocator.peek())
            });
            black_box(held);
        });
    }

    group.finish();
}

/// 先预热到稳态（约 `per_frame * 60` 个存活粒子），再测量单帧
fn steady_state<B: ParticleBackend>(backend: &mut B, per_frame: u32) -> f32 {
    let request = SpawnRequest::new(Vec3::ZERO, 1).with_count(per_frame);
    let mut now = 0.0;
    for _ in 0..70 {
        let _ = backend.spawn(&request, now);
        now += FRAME_DELTA;
        backend.advance(now, FRAME_DELTA);
    }
    now
}

fn bench_frame_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_update");

    for per_frame in [100u32, 1000, 10000].iter() {
        let capacity = per_frame * 64;

        group.bench_with_input(
            BenchmarkId::new("sequential", per_frame),
            per_frame,
            |b, &per_frame| {
                let mut backend = SequentialBackend::new(capacity, 16, Some(1));
                let mut now = steady_state(&mut backend, per_frame);
                let request = SpawnRequest::new(Vec3::ZERO, 1).with_count(per_frame);
                b.iter(|| {
                    let _ = backend.spawn(&request, now);
                    now += FRAME_DELTA;
                    black_box(backend.advance(now, FRAME_DELTA).len())
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("parallel", per_frame),
            per_frame,
            |b, &per_frame| {
                let mut backend = ParallelBackend::new(capacity, 16, Some(1), 4096);
                let mut now = steady_state(&mut backend, per_frame);
                let request = SpawnRequest::new(Vec3::ZERO, 1).with_count(per_frame);
                b.iter(|| {
                    let _ = backend.spawn(&request, now);
                    now += FRAME_DELTA;
                    black_box(backend.advance(now, FRAME_DELTA).len())
                });
            },
        );
    }

    group.finish();
}

fn bench_draw_batch_bytes(c: &mut Criterion) {
    let mut backend = SequentialBackend::new(65536, 16, Some(2));
    steady_state(&mut backend, 1000);

    c.bench_function("draw_batch_as_bytes", |b| {
        b.iter(|| {
            let batch = backend.last_batch();
            black_box((batch.as_bytes().len(), batch.indirect_args()))
        });
    });
}

criterion_group!(
    benches,
    bench_slot_allocator,
    bench_frame_update,
    bench_draw_batch_bytes
);
criterion_main!(benches);
