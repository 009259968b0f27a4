//! # Line Particles
//!
//! Transient line particles at high volume and high spawn rate: short segments that
//! spawn at a point, fly outward, shrink and fade over a fixed one-second lifetime.
//!
//! ## Features
//!
//! - **Slot Pool**: bounded-capacity pool with an O(log n) min-heap free list
//! - **Kinematics**: framerate-independent exponential speed decay with a hard lifetime cutoff
//! - **Draw Batches**: live particles compacted into a dense, `bytemuck`-castable record buffer
//! - **Two Backends**: a sequential loop and a chunked parallel backend behind one trait
//!
//! ## Architecture Design
//!
//! One frame is strictly ordered: spawn → update → compaction → draw. The host render loop
//! owns a [`render::particles::LineParticleDriver`] (or the headless [`core::Engine`]) and
//! passes it around explicitly; there is no global particle state.
//!
//! ### Example
//!
//! ```
//! use glam::Vec3;
//! use line_particles::config::{BackendKind, ParticleConfig};
//! use line_particles::render::particles::{CountingRenderer, LineParticleDriver};
//!
//! let config = ParticleConfig {
//!     capacity: 1024,
//!     backend: BackendKind::Parallel,
//!     ..Default::default()
//! };
//! let mut driver = LineParticleDriver::new(&config);
//! driver.spawn_many(10, Vec3::ZERO, 1).unwrap();
//! driver.advance(1.0 / 60.0, 1.0 / 60.0);
//!
//! let mut renderer = CountingRenderer::default();
//! driver.draw(&mut renderer);
//! assert_eq!(renderer.lines_drawn, 10);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Engine loop, errors and frame clock
//! - [`config`]: TOML/JSON configuration
//! - [`render`]: Line particle system

/// Core engine functionality including the frame loop and error types
pub mod core;
/// Configuration system
pub mod config;
/// Line particle rendering system
pub mod render;
