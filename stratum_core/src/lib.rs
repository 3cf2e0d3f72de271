// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint volumes, matrix and clip stacks, and frustum culling for an actor
//! scene graph.
//!
//! `stratum_core` is `no_std` compatible (with `alloc`). It answers two
//! questions a retained-mode renderer asks every frame: which actors can be
//! skipped because they paint nothing on screen, and how the current clip
//! should be programmed into the GPU.
//!
//! # Architecture
//!
//! ```text
//!   ActorStore mutations ──► evaluate() ──► FrameChanges
//!                               │
//!                               ▼
//!            aggregate PaintVolumes (local space)
//!                               │
//!   StageView ──► frustum planes ──► cull() ──► CullReport
//!
//!   MatrixStack ──► MatrixEntry ──┐
//!                                 ▼
//!                            ClipStack ──► ClipFlushState::flush() ──► ClipCommands
//! ```
//!
//! **[`actor`]**: struct-of-arrays actor tree with generational handles.
//! Evaluation computes world transforms and aggregate paint volumes; culling
//! classifies each actor against the stage frustum.
//!
//! **[`paint_volume`]**: the eight-vertex [`PaintVolume`](paint_volume::PaintVolume)
//! with union, transformation, projection, and culling.
//!
//! **[`cull`]**: frustum planes built from a window-space polygon, and the
//! [`CullResult`](cull::CullResult) classification.
//!
//! **[`stage`]**: the stage camera. Projection, view, and viewport.
//!
//! **[`matrix`]** and **[`matrix_stack`]**: 4×4 matrices and a persistent
//! stack of lazily composed transform entries.
//!
//! **[`clip`]**: persistent clip stacks with scissor bounds and the flush
//! logic that turns them into scissor, clip-plane, and stencil commands.
//!
//! **[`dirty`]**: channel constants for `understory_dirty` tracking.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types,
//! with the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-actor cull
//!   and paint-box events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod actor;
pub mod clip;
pub mod cull;
pub mod dirty;
pub mod geometry;
pub mod matrix;
pub mod matrix_stack;
pub mod paint_volume;
pub mod path;
pub mod stage;
pub mod trace;
