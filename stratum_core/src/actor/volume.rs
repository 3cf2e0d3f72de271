// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint volume sources and space conversions.
//!
//! Each actor reports the volume of its own painting through a
//! [`PaintVolumeProvider`]. During evaluation the store unions that with the
//! volumes of its visible children to get the actor's aggregate volume, in
//! the actor's local space. The queries here move aggregate volumes into
//! ancestor, world, eye, or window space.

use core::fmt::Debug;

use kurbo::Rect;

use super::id::ActorId;
use super::store::ActorStore;
use crate::geometry::Vertex;
use crate::matrix::Matrix;
use crate::paint_volume::PaintVolume;
use crate::stage::StageView;

/// Reports the volume an actor paints, excluding its children.
pub trait PaintVolumeProvider: Debug {
    /// Fills `volume`, which starts empty at the actor's local origin.
    ///
    /// `allocation` is the actor's allocation in its parent's space; only
    /// its size is relevant locally. Returning `false` means the volume
    /// cannot be determined and the actor must be treated as unbounded.
    fn get_paint_volume(&self, allocation: Option<&Rect>, volume: &mut PaintVolume) -> bool;
}

/// The actor paints exactly its allocation. Fails when it has none.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocationVolume;

impl PaintVolumeProvider for AllocationVolume {
    fn get_paint_volume(&self, allocation: Option<&Rect>, volume: &mut PaintVolume) -> bool {
        volume.set_from_allocation(allocation)
    }
}

/// The actor paints a fixed box in its local space, such as a shadow or
/// glow spilling past its allocation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CustomVolume {
    /// Local-space origin of the box.
    pub origin: Vertex,
    /// Extent along X.
    pub width: f64,
    /// Extent along Y.
    pub height: f64,
    /// Extent along Z; zero for flat painting.
    pub depth: f64,
}

impl PaintVolumeProvider for CustomVolume {
    fn get_paint_volume(&self, _allocation: Option<&Rect>, volume: &mut PaintVolume) -> bool {
        volume.set_origin(self.origin);
        volume.set_width(self.width.max(0.0));
        volume.set_height(self.height.max(0.0));
        volume.set_depth(self.depth.max(0.0));
        true
    }
}

/// The actor paints nothing itself; its volume is only that of its
/// children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GroupVolume;

impl PaintVolumeProvider for GroupVolume {
    fn get_paint_volume(&self, _allocation: Option<&Rect>, _volume: &mut PaintVolume) -> bool {
        true
    }
}

impl ActorStore {
    /// Returns the transform from `id`'s local space to `ancestor`'s, or to
    /// world space when `ancestor` is `None`.
    ///
    /// Uses the current actor matrices rather than the cached world
    /// transforms, so it is valid between evaluations.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale or `ancestor` is neither `id` nor one of
    /// its ancestors.
    #[must_use]
    pub fn relative_transform(&self, id: ActorId, ancestor: Option<ActorId>) -> Matrix {
        self.validate(id);
        if let Some(a) = ancestor {
            self.validate(a);
            if a == id {
                return Matrix::IDENTITY;
            }
            assert!(
                self.ancestors(id).any(|x| x == a),
                "{a:?} is not an ancestor of {id:?}"
            );
        }

        let stop = ancestor.map(ActorId::index);
        let mut result = self.actor_matrix_at(id.idx);
        let mut cur = self.parent_at(id.idx);
        while let Some(p) = cur {
            if Some(p) == stop {
                break;
            }
            result = self.actor_matrix_at(p) * result;
            cur = self.parent_at(p);
        }
        result
    }

    /// Moves `volume` from its reference actor's space to `ancestor`'s (or
    /// world space) and relabels it.
    ///
    /// # Panics
    ///
    /// Panics if the volume has no reference actor, or under the same
    /// conditions as [`relative_transform`](Self::relative_transform).
    pub fn transform_relative(&self, volume: &mut PaintVolume, ancestor: Option<ActorId>) {
        let Some(actor) = volume.actor() else {
            panic!("paint volume has no reference actor to transform from");
        };
        if ancestor == Some(actor) {
            return;
        }
        let m = self.relative_transform(actor, ancestor);
        volume.transform(&m);
        volume.set_reference_actor(ancestor);
    }

    /// Returns the aggregate paint volume of `id` in `ancestor`'s space (or
    /// world space), or `None` if it is unknown.
    ///
    /// Only valid after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn transformed_paint_volume(
        &self,
        id: ActorId,
        ancestor: Option<ActorId>,
    ) -> Option<PaintVolume> {
        let mut volume = *self.paint_volume(id)?;
        self.transform_relative(&mut volume, ancestor);
        Some(volume)
    }

    /// Returns the aggregate paint volume at raw slot `idx` in eye space,
    /// ready for culling.
    ///
    /// Only valid after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn eye_paint_volume_at(&self, idx: u32, stage: &StageView) -> Option<PaintVolume> {
        let mut volume = *self.paint_volume_at(idx)?;
        volume.transform(&stage.modelview(&self.world_transform_at(idx)));
        volume.set_reference_actor(None);
        volume.complete();
        Some(volume)
    }

    /// Returns the window-space box covering the actor's painting, or `None`
    /// if its paint volume is unknown.
    ///
    /// Only valid after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn stage_paint_box(&self, id: ActorId, stage: &StageView) -> Option<Rect> {
        self.validate(id);
        self.stage_paint_box_at(id.idx, stage)
    }

    /// Raw-index variant of [`stage_paint_box`](Self::stage_paint_box).
    #[must_use]
    pub fn stage_paint_box_at(&self, idx: u32, stage: &StageView) -> Option<Rect> {
        let volume = self.paint_volume_at(idx)?;
        let modelview = stage.modelview(&self.world_transform_at(idx));
        Some(volume.stage_paint_box(&modelview, &stage.projection, &stage.viewport))
    }

    /// Computes the aggregate volume of the actor at `idx` from its source
    /// and its children's current aggregate volumes.
    pub(crate) fn compute_paint_volume(&self, idx: u32) -> Option<PaintVolume> {
        let id = self.id_at(idx);
        let allocation = self.allocation[idx as usize];
        let mut volume = PaintVolume::new(Some(id));

        if self.flags[idx as usize].clip_to_allocation {
            return volume
                .set_from_allocation(allocation.as_ref())
                .then_some(volume);
        }

        let source = self.volume_source[idx as usize].as_deref()?;
        if !source.get_paint_volume(allocation.as_ref(), &mut volume) {
            return None;
        }

        for child in self.children_at(idx) {
            let c = child as usize;
            if self.flags[c].hidden || self.allocation[c].is_none() {
                continue;
            }
            let mut child_volume = self.paint_volume[c]?;
            child_volume.transform(&self.actor_matrix_at(child));
            child_volume.set_reference_actor(Some(id));
            volume.union(&child_volume);
        }
        Some(volume)
    }
}
