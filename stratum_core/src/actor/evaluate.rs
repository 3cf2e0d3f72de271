// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame evaluation and change tracking.
//!
//! Evaluation follows a drain-recompute pattern for each dirty channel:
//!
//! 1. **TRANSFORM**: drain dirty indices, recompute each actor's
//!    `world_transform` as `parent_world * actor_matrix` and
//!    `effective_hidden` as `parent_effective_hidden || flags.hidden`.
//! 2. **PAINT_VOLUME**: drain dirty indices and recompute each actor's
//!    aggregate paint volume, children before parents.
//! 3. **CONTENT**: drain dirty indices (no recomputation; damage tracking
//!    reads the current values directly from the store).
//! 4. **TOPOLOGY**: drain and discard (the traversal order was already
//!    rebuilt at the start of evaluation if needed).
//!
//! [`FrameChanges`] uses raw slot indices (`u32`) rather than [`ActorId`]
//! handles so that consumers can index directly into the store's arrays via
//! the `*_at()` accessors without paying for generation checks.
//!
//! [`ActorId`]: super::ActorId

use alloc::vec;
use alloc::vec::Vec;

use super::id::INVALID;
use super::store::ActorStore;
use crate::dirty;
use crate::matrix::Matrix;
use crate::trace::{EvaluateEvent, Tracer};

/// The set of changes produced by a single [`ActorStore::evaluate`] call.
#[derive(Clone, Debug, Default)]
pub struct FrameChanges {
    /// Actors whose world transform was recomputed.
    pub transforms: Vec<u32>,
    /// Actors whose aggregate paint volume was recomputed.
    pub paint_volumes: Vec<u32>,
    /// Actors whose own painting changed.
    pub content: Vec<u32>,
    /// Actors that transitioned from visible to effectively hidden.
    pub hidden: Vec<u32>,
    /// Actors that transitioned from effectively hidden to visible.
    pub unhidden: Vec<u32>,
    /// Actors added since the last evaluate.
    pub added: Vec<u32>,
    /// Actors removed since the last evaluate.
    pub removed: Vec<u32>,
    /// Whether the tree topology changed (traversal order was rebuilt).
    pub topology_changed: bool,
}

impl FrameChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.paint_volumes.clear();
        self.content.clear();
        self.hidden.clear();
        self.unhidden.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
            && self.paint_volumes.is_empty()
            && self.content.is_empty()
            && self.hidden.is_empty()
            && self.unhidden.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl ActorStore {
    /// Evaluates the actor tree, recomputing dirty properties and returning
    /// the set of changes.
    pub fn evaluate(&mut self) -> FrameChanges {
        let mut changes = FrameChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer
    /// to avoid allocation.
    pub fn evaluate_into(&mut self, changes: &mut FrameChanges) {
        self.evaluate_traced(changes, &mut Tracer::none());
    }

    /// Like [`evaluate_into`](Self::evaluate_into), reporting a summary of the
    /// pass to `tracer`.
    pub fn evaluate_traced(&mut self, changes: &mut FrameChanges, tracer: &mut Tracer<'_>) {
        changes.clear();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        // Drain TRANSFORM channel: parents are yielded before children.
        let dirty_transforms: Vec<u32> = self
            .dirty
            .drain(dirty::TRANSFORM)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_transforms {
            let parent_idx = self.parent[idx as usize];
            let (parent_world, parent_hidden) = if parent_idx != INVALID {
                (
                    self.world_transform[parent_idx as usize],
                    self.effective_hidden[parent_idx as usize],
                )
            } else {
                (Matrix::IDENTITY, false)
            };
            self.world_transform[idx as usize] = parent_world * self.actor_matrix_at(idx);

            let new_hidden = parent_hidden || self.flags[idx as usize].hidden;
            let old_hidden = self.effective_hidden[idx as usize];
            if new_hidden != old_hidden {
                if new_hidden {
                    changes.hidden.push(idx);
                } else {
                    changes.unhidden.push(idx);
                }
                self.effective_hidden[idx as usize] = new_hidden;
            }
        }
        changes.transforms = dirty_transforms;

        // Drain PAINT_VOLUME channel. Recompute in reverse traversal order
        // so every child is current before its parent unions it.
        let mut dirty_volumes: Vec<u32> = self
            .dirty
            .drain(dirty::PAINT_VOLUME)
            .affected()
            .deterministic()
            .run()
            .collect();
        let mut position = vec![u32::MAX; self.len as usize];
        for (pos, &idx) in self.traversal_order.iter().enumerate() {
            position[idx as usize] = u32::try_from(pos).unwrap_or(u32::MAX - 1);
        }
        dirty_volumes.retain(|&idx| position[idx as usize] != u32::MAX);
        dirty_volumes.sort_unstable_by(|a, b| position[*b as usize].cmp(&position[*a as usize]));
        for &idx in &dirty_volumes {
            self.paint_volume[idx as usize] = self.compute_paint_volume(idx);
        }
        changes.paint_volumes = dirty_volumes;

        changes.content = self
            .dirty
            .drain(dirty::CONTENT)
            .deterministic()
            .run()
            .collect();
        // Destroyed slots are reported through `removed`.
        changes
            .content
            .retain(|&idx| !self.free_list.contains(&idx));

        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);

        self.evaluations += 1;
        tracer.evaluate(&EvaluateEvent {
            pass: self.evaluations,
            actors: self.live_count(),
            transforms: u32::try_from(changes.transforms.len()).unwrap_or(u32::MAX),
            paint_volumes: u32::try_from(changes.paint_volumes.len()).unwrap_or(u32::MAX),
            topology_changed: changes.topology_changed,
        });
    }

    /// Returns the current traversal order (depth-first pre-order, which is
    /// paint order).
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called at least
    /// once.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    /// Number of completed evaluation passes.
    #[must_use]
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Rebuilds the depth-first pre-order traversal of all live actors.
    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                self.dfs_collect(idx);
            }
        }
    }

    /// Depth-first pre-order collection starting from `idx`.
    fn dfs_collect(&mut self, idx: u32) {
        self.traversal_order.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.dfs_collect(child);
            child = self.next_sibling[child as usize];
        }
    }
}
