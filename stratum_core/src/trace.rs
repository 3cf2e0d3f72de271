// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for evaluation, culling, and clip flushing.
//!
//! This module provides a [`TraceSink`] trait with one method per event.
//! Every method defaults to a no-op, so sinks only implement what they care
//! about.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. With the `trace`
//! feature **off** every `Tracer` method compiles to nothing; with it **on**
//! each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies.
//! - `trace-rich` (implies `trace`) adds the per-actor [`CullEvent`] and
//!   [`PaintBoxEvent`] plus the corresponding `TraceSink` methods.

use crate::clip::GlScissor;
#[cfg(feature = "trace-rich")]
use crate::cull::CullResult;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted at the end of each [`ActorStore::evaluate`](crate::actor::ActorStore::evaluate).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvaluateEvent {
    /// Monotonic evaluation counter of the store.
    pub pass: u64,
    /// Live actors after evaluation.
    pub actors: u32,
    /// Actors whose world transform was recomputed.
    pub transforms: u32,
    /// Actors whose paint volume was recomputed.
    pub paint_volumes: u32,
    /// Whether the traversal order was rebuilt.
    pub topology_changed: bool,
}

/// Emitted once per cull pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CullSummaryEvent {
    /// Actors whose result was decided (tested or inherited).
    pub visited: u32,
    /// Actors entirely inside the frustum.
    pub inside: u32,
    /// Actors straddling the frustum, including unbounded ones.
    pub partial: u32,
    /// Subtree roots rejected as outside.
    pub culled: u32,
    /// Actors with no paint volume, painted unconditionally.
    pub unbounded: u32,
}

/// Emitted for every [`ClipFlushState::flush`](crate::clip::ClipFlushState::flush).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipFlushEvent {
    /// Entries on the flushed stack (zero on a cache hit).
    pub entries: u32,
    /// Scissor emitted, if any.
    pub scissor: Option<GlScissor>,
    /// Fallback operations emitted.
    pub fallback_ops: u32,
    /// Whether the stencil buffer holds clip data afterwards.
    pub uses_stencil: bool,
    /// The stack matched the cached one and nothing was emitted.
    pub cache_hit: bool,
}

/// Per-actor cull decision.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CullEvent {
    /// Slot index of the actor.
    pub actor_index: u32,
    /// The decision.
    pub result: CullResult,
    /// `true` when the result was inherited from a fully visible ancestor
    /// without testing.
    pub inherited: bool,
}

/// A quantized stage paint box computed for redraw damage.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintBoxEvent {
    /// Slot index of the actor.
    pub actor_index: u32,
    /// The box in window coordinates.
    pub rect: kurbo::Rect,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// Called after an evaluation pass.
    fn on_evaluate(&mut self, e: &EvaluateEvent) {
        _ = e;
    }

    /// Called after a cull pass.
    fn on_cull_summary(&mut self, e: &CullSummaryEvent) {
        _ = e;
    }

    /// Called for every clip flush.
    fn on_clip_flush(&mut self, e: &ClipFlushEvent) {
        _ = e;
    }

    /// Called for every actor decision of a cull pass (requires
    /// `trace-rich`).
    #[cfg(feature = "trace-rich")]
    fn on_cull(&mut self, e: &CullEvent) {
        _ = e;
    }

    /// Called for every paint box computed for damage (requires
    /// `trace-rich`).
    #[cfg(feature = "trace-rich")]
    fn on_paint_box(&mut self, e: &PaintBoxEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits an [`EvaluateEvent`].
    #[inline]
    pub fn evaluate(&mut self, e: &EvaluateEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_evaluate(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CullSummaryEvent`].
    #[inline]
    pub fn cull_summary(&mut self, e: &CullSummaryEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_cull_summary(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ClipFlushEvent`].
    #[inline]
    pub fn clip_flush(&mut self, e: &ClipFlushEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_clip_flush(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CullEvent`] (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn cull(&mut self, e: &CullEvent) {
        if let Some(s) = &mut self.sink {
            s.on_cull(e);
        }
    }

    /// Emits a [`PaintBoxEvent`] (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn paint_box(&mut self, e: &PaintBoxEvent) {
        if let Some(s) = &mut self.sink {
            s.on_paint_box(e);
        }
    }
}
