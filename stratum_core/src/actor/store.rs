// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays actor storage with allocation, topology, and property management.

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::Rect;
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::id::{ActorId, INVALID};
use super::traverse::{Ancestors, Children};
use super::volume::{AllocationVolume, PaintVolumeProvider};
use crate::dirty;
use crate::matrix::Matrix;
use crate::paint_volume::PaintVolume;

/// Per-actor boolean flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ActorFlags {
    /// The actor and its subtree are not painted and do not contribute to
    /// their parent's paint volume.
    pub hidden: bool,
    /// The actor clips itself and its subtree to its allocation, which then
    /// is its paint volume regardless of what the children paint.
    pub clip_to_allocation: bool,
}

/// Struct-of-arrays storage for all actors.
///
/// Actors are addressed by [`ActorId`] handles. Each actor occupies a slot in
/// parallel arrays; destroyed slots are recycled through a free list and
/// generation counters reject stale handles.
#[derive(Debug)]
pub struct ActorStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) local_transform: Vec<Matrix>,
    pub(crate) allocation: Vec<Option<Rect>>,
    pub(crate) flags: Vec<ActorFlags>,
    pub(crate) volume_source: Vec<Option<Box<dyn PaintVolumeProvider>>>,

    // -- Computed properties (written by evaluate) --
    pub(crate) world_transform: Vec<Matrix>,
    pub(crate) effective_hidden: Vec<bool>,
    pub(crate) paint_volume: Vec<Option<PaintVolume>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
    pub(crate) evaluations: u64,
}

impl Default for ActorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ActorStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            local_transform: Vec::new(),
            allocation: Vec::new(),
            flags: Vec::new(),
            volume_source: Vec::new(),
            world_transform: Vec::new(),
            effective_hidden: Vec::new(),
            paint_volume: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            evaluations: 0,
        }
    }

    // -- Allocation API --

    /// Creates a new actor and returns its handle.
    ///
    /// The actor starts with an identity transform, no allocation, default
    /// flags, an [`AllocationVolume`] source, and no parent.
    pub fn create_actor(&mut self) -> ActorId {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.local_transform[i] = Matrix::IDENTITY;
            self.allocation[i] = None;
            self.flags[i] = ActorFlags::default();
            self.volume_source[i] = Some(Box::new(AllocationVolume));
            self.world_transform[i] = Matrix::IDENTITY;
            self.effective_hidden[i] = false;
            self.paint_volume[i] = None;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.local_transform.push(Matrix::IDENTITY);
            self.allocation.push(None);
            self.flags.push(ActorFlags::default());
            self.volume_source.push(Some(Box::new(AllocationVolume)));
            self.world_transform.push(Matrix::IDENTITY);
            self.effective_hidden.push(false);
            self.paint_volume.push(None);
            self.generation.push(0);
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::PAINT_VOLUME, &EagerPolicy);

        self.id_at(idx)
    }

    /// Destroys an actor, freeing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the actor has children (remove them first) or if the handle
    /// is stale.
    pub fn destroy_actor(&mut self, id: ActorId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy actor with children"
        );

        if self.parent[idx as usize] != INVALID {
            let p = self.parent[idx as usize];
            self.unlink_from_parent(idx);
            self.dirty.mark_with(p, dirty::PAINT_VOLUME, &EagerPolicy);
            self.dirty.mark(p, dirty::TOPOLOGY);
        }

        self.dirty.remove_key(idx);
        self.generation[idx as usize] += 1;
        self.volume_source[idx as usize] = None;
        self.paint_volume[idx as usize] = None;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    /// Returns whether the handle refers to a live actor.
    #[must_use]
    pub fn is_alive(&self, id: ActorId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns whether raw slot `idx` holds a live actor.
    #[must_use]
    pub fn is_alive_at(&self, idx: u32) -> bool {
        idx < self.len && !self.free_list.contains(&idx)
    }

    /// Number of live actors.
    #[must_use]
    pub fn live_count(&self) -> u32 {
        let free = u32::try_from(self.free_list.len()).unwrap_or(u32::MAX);
        self.len.saturating_sub(free)
    }

    // -- Topology API --

    /// Adds `child` as the last (topmost painted) child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: ActorId, child: ActorId) {
        self.validate(parent);
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] == INVALID,
            "child already has a parent"
        );
        self.link_last(parent.idx, child.idx);
    }

    /// Removes `child` from its current parent, making it a root.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the actor has no parent.
    pub fn remove_from_parent(&mut self, child: ActorId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "actor has no parent");
        self.detach(c);
    }

    /// Moves `child` to be the last child of `new_parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `new_parent` is `child` or one
    /// of its descendants.
    pub fn reparent(&mut self, child: ActorId, new_parent: ActorId) {
        self.validate(child);
        self.validate(new_parent);
        assert!(
            child != new_parent && !self.ancestors(new_parent).any(|a| a == child),
            "cannot reparent an actor under its own subtree"
        );
        if self.parent[child.idx as usize] != INVALID {
            self.detach(child.idx);
        }
        self.link_last(new_parent.idx, child.idx);
    }

    /// Inserts `child` before `sibling`, so it paints below it.
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `child` already has a parent, or
    /// `sibling` has no parent.
    pub fn insert_before(&mut self, child: ActorId, sibling: ActorId) {
        self.validate(child);
        self.validate(sibling);
        let c = child.idx;
        let s = sibling.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        let p = self.parent[s as usize];
        assert!(p != INVALID, "sibling has no parent");

        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = self.prev_sibling[s as usize];

        if self.prev_sibling[s as usize] != INVALID {
            self.next_sibling[self.prev_sibling[s as usize] as usize] = c;
        } else {
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[s as usize] = c;

        self.after_link(p, c);
    }

    /// Returns the parent of an actor, if any.
    #[must_use]
    pub fn parent(&self, id: ActorId) -> Option<ActorId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns an iterator over the direct children of an actor.
    #[must_use]
    pub fn children(&self, id: ActorId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns an iterator from the parent of `id` up to its root.
    #[must_use]
    pub fn ancestors(&self, id: ActorId) -> Ancestors<'_> {
        self.validate(id);
        Ancestors::new(self, id.idx)
    }

    /// Returns the live actors with no parent.
    #[must_use]
    pub fn roots(&self) -> Vec<ActorId> {
        (0..self.len)
            .filter(|&idx| self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx))
            .map(|idx| self.id_at(idx))
            .collect()
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the local transform of an actor.
    #[must_use]
    pub fn local_transform(&self, id: ActorId) -> Matrix {
        self.validate(id);
        self.local_transform[id.idx as usize]
    }

    /// Returns the allocation box of an actor, in its parent's space.
    #[must_use]
    pub fn allocation(&self, id: ActorId) -> Option<Rect> {
        self.validate(id);
        self.allocation[id.idx as usize]
    }

    /// Returns the flags of an actor.
    #[must_use]
    pub fn flags(&self, id: ActorId) -> ActorFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Returns the actor's paint volume source, or `None` if its volume is
    /// unknown.
    #[must_use]
    pub fn paint_volume_source(&self, id: ActorId) -> Option<&dyn PaintVolumeProvider> {
        self.validate(id);
        self.volume_source[id.idx as usize].as_deref()
    }

    /// Returns the matrix mapping the actor's local space to its parent's:
    /// a translation to the allocation origin followed by the local
    /// transform.
    #[must_use]
    pub fn actor_matrix(&self, id: ActorId) -> Matrix {
        self.validate(id);
        self.actor_matrix_at(id.idx)
    }

    /// Returns the computed world transform of an actor.
    ///
    /// Only valid after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn world_transform(&self, id: ActorId) -> Matrix {
        self.validate(id);
        self.world_transform[id.idx as usize]
    }

    /// Returns whether the actor is hidden, by its own flag or an
    /// ancestor's.
    ///
    /// Only valid after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn effective_hidden(&self, id: ActorId) -> bool {
        self.validate(id);
        self.effective_hidden[id.idx as usize]
    }

    /// Returns the actor's paint volume in its own local space, covering its
    /// own painting and that of its visible children. `None` means the
    /// volume is unknown and the actor must be treated as unbounded.
    ///
    /// Only valid after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn paint_volume(&self, id: ActorId) -> Option<&PaintVolume> {
        self.validate(id);
        self.paint_volume[id.idx as usize].as_ref()
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the local transform of an actor.
    pub fn set_transform(&mut self, id: ActorId, transform: Matrix) {
        self.validate(id);
        self.local_transform[id.idx as usize] = transform;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(id.idx, dirty::PAINT_VOLUME, &EagerPolicy);
    }

    /// Sets the allocation box of an actor, in its parent's space.
    pub fn set_allocation(&mut self, id: ActorId, allocation: Option<Rect>) {
        self.validate(id);
        self.allocation[id.idx as usize] = allocation;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(id.idx, dirty::PAINT_VOLUME, &EagerPolicy);
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Sets the flags of an actor.
    pub fn set_flags(&mut self, id: ActorId, flags: ActorFlags) {
        self.validate(id);
        self.flags[id.idx as usize] = flags;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(id.idx, dirty::PAINT_VOLUME, &EagerPolicy);
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Sets how the actor reports its own paint volume. `None` makes the
    /// volume unknown.
    pub fn set_paint_volume_source(
        &mut self,
        id: ActorId,
        source: Option<Box<dyn PaintVolumeProvider>>,
    ) {
        self.validate(id);
        self.volume_source[id.idx as usize] = source;
        self.dirty.mark_with(id.idx, dirty::PAINT_VOLUME, &EagerPolicy);
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Records that the actor's painting changed without any geometry
    /// change, so its area is redrawn.
    pub fn queue_redraw(&mut self, id: ActorId) {
        self.validate(id);
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    // -- Raw-index accessors --
    //
    // These take raw slot indices (as found in `FrameChanges`, the traversal
    // order, or a cull report) and skip generation validation.

    /// Returns the handle for raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn id_at(&self, idx: u32) -> ActorId {
        self.check_index(idx);
        ActorId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Returns the parent slot of raw slot `idx`, if any.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn parent_at(&self, idx: u32) -> Option<u32> {
        self.check_index(idx);
        let p = self.parent[idx as usize];
        (p != INVALID).then_some(p)
    }

    /// Returns the actor matrix at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn actor_matrix_at(&self, idx: u32) -> Matrix {
        self.check_index(idx);
        let local = &self.local_transform[idx as usize];
        match self.allocation[idx as usize] {
            Some(a) if a.x0 != 0.0 || a.y0 != 0.0 => {
                Matrix::from_translation(a.x0, a.y0, 0.0) * *local
            }
            _ => *local,
        }
    }

    /// Returns the computed world transform at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn world_transform_at(&self, idx: u32) -> Matrix {
        self.check_index(idx);
        self.world_transform[idx as usize]
    }

    /// Returns whether the actor at raw slot `idx` is effectively hidden.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn effective_hidden_at(&self, idx: u32) -> bool {
        self.check_index(idx);
        self.effective_hidden[idx as usize]
    }

    /// Returns the paint volume at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn paint_volume_at(&self, idx: u32) -> Option<&PaintVolume> {
        self.check_index(idx);
        self.paint_volume[idx as usize].as_ref()
    }

    /// Returns the allocation at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn allocation_at(&self, idx: u32) -> Option<Rect> {
        self.check_index(idx);
        self.allocation[idx as usize]
    }

    /// Returns the flags at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn flags_at(&self, idx: u32) -> ActorFlags {
        self.check_index(idx);
        self.flags[idx as usize]
    }

    /// Returns the raw slots of the children of `idx`, in paint order.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    pub fn children_at(&self, idx: u32) -> impl Iterator<Item = u32> + '_ {
        self.check_index(idx);
        core::iter::successors(
            Some(self.first_child[idx as usize]).filter(|&c| c != INVALID),
            |&c| Some(self.next_sibling[c as usize]).filter(|&n| n != INVALID),
        )
    }

    // -- Internal helpers --

    fn check_index(&self, idx: u32) {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: ActorId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale ActorId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
        self.after_link(p, c);
    }

    /// Wires dependency edges for a fresh parent link and marks what the
    /// new ancestry invalidates.
    fn after_link(&mut self, p: u32, c: u32) {
        // World transforms flow down, paint volumes flow up.
        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);
        let _ = self.dirty.add_dependency(p, c, dirty::PAINT_VOLUME);

        self.dirty.mark_with(c, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(p, dirty::PAINT_VOLUME, &EagerPolicy);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Unlinks `c` from its parent and marks what the old ancestry loses.
    fn detach(&mut self, c: u32) {
        let p = self.parent[c as usize];
        self.unlink_from_parent(c);
        self.dirty.remove_dependency(c, p, dirty::TRANSFORM);
        self.dirty.remove_dependency(p, c, dirty::PAINT_VOLUME);

        self.dirty.mark_with(c, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(p, dirty::PAINT_VOLUME, &EagerPolicy);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}
