// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plan: the visible actors of one frame, in paint order, with the
//! transform and clip each one is drawn with.

use alloc::vec::Vec;

use stratum_core::actor::{ActorId, ActorStore, CullReport};
use stratum_core::clip::{ClipCapabilities, ClipCommands, ClipFlushState, ClipStack, RenderTarget};
use stratum_core::cull::CullResult;
use stratum_core::matrix_stack::{MatrixEntry, MatrixStack};
use stratum_core::stage::StageView;
use stratum_core::trace::Tracer;

/// A single actor to draw.
///
/// Items are produced in back-to-front order, matching the actor tree's
/// traversal order.
#[derive(Clone, Debug)]
pub struct RenderItem {
    /// The actor this item originates from.
    pub actor: ActorId,
    /// Modelview in effect while the actor paints, mapping its local space
    /// to eye space.
    pub modelview: MatrixEntry,
    /// Clip in effect, including the actor's own allocation clip.
    pub clip: ClipStack,
    /// The actor's cull decision.
    pub cull: CullResult,
    /// The actor straddles the frustum, so primitives it draws may still
    /// need clipping against the stage.
    pub needs_clip: bool,
}

/// An ordered list of draw items for a single frame.
#[derive(Clone, Debug, Default)]
pub struct RenderPlan {
    /// Projection entry shared by every item's clip rectangles.
    pub projection: MatrixEntry,
    /// Draw items in back-to-front order.
    pub items: Vec<RenderItem>,
}

impl RenderPlan {
    /// Creates an empty render plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Builds the plan for the actors `report` found visible.
    #[must_use]
    pub fn build(store: &ActorStore, report: &CullReport, stage: &StageView) -> Self {
        let mut plan = Self::new();
        plan.build_into(store, report, stage);
        plan
    }

    /// Like [`build`](Self::build), but reuses this plan's storage.
    pub fn build_into(&mut self, store: &ActorStore, report: &CullReport, stage: &StageView) {
        self.clear();
        self.projection = MatrixEntry::from_matrix(stage.projection);

        let mut matrices = MatrixStack::new();
        matrices.load(&stage.view);
        let mut clip = ClipStack::new();

        for &idx in store.traversal_order() {
            if store.parent_at(idx).is_none() {
                self.visit(store, report, stage, idx, &mut matrices, &mut clip);
            }
        }
    }

    fn visit(
        &mut self,
        store: &ActorStore,
        report: &CullReport,
        stage: &StageView,
        idx: u32,
        matrices: &mut MatrixStack,
        clip: &mut ClipStack,
    ) {
        // Hidden, culled, and pruned actors have no visible result.
        let Some(cull) = report.result_at(idx).filter(|r| r.is_visible()) else {
            return;
        };

        matrices.push();
        let actor_matrix = store.actor_matrix_at(idx);
        if !actor_matrix.is_identity() {
            matrices.multiply(&actor_matrix);
        }
        let modelview = matrices.entry();

        let clip_box = store
            .allocation_at(idx)
            .filter(|_| store.flags_at(idx).clip_to_allocation);
        if let Some(a) = clip_box {
            clip.push_rectangle(
                0.0,
                0.0,
                a.width(),
                a.height(),
                &modelview,
                &self.projection,
                &stage.viewport,
            );
        }

        self.items.push(RenderItem {
            actor: store.id_at(idx),
            modelview,
            clip: clip.clone(),
            cull,
            needs_clip: cull == CullResult::Partial,
        });

        for child in store.children_at(idx) {
            self.visit(store, report, stage, child, matrices, clip);
        }

        if clip_box.is_some() {
            clip.pop();
        }
        matrices.pop();
    }

    /// Flushes each item's clip through `state`, in item order.
    ///
    /// An entry is `None` when the item's clip is already in effect.
    pub fn clip_commands(
        &self,
        state: &mut ClipFlushState,
        target: &RenderTarget,
        caps: &ClipCapabilities,
        tracer: &mut Tracer<'_>,
    ) -> Vec<Option<ClipCommands>> {
        self.items
            .iter()
            .map(|item| state.flush(&item.clip, target, caps, tracer))
            .collect()
    }
}
