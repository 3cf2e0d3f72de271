// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint volumes: conservative 3-D bounds of what an actor draws.
//!
//! A [`PaintVolume`] is a cuboid described by eight vertices, expressed in
//! the local space of a *reference actor* (or in eye/stage space when it has
//! none). Vertices are numbered front face first, then back face:
//!
//! ```text
//!        4 ────── 5
//!       ╱│       ╱│
//!      0 ────── 1 │
//!      │ 7 ─────│ 6
//!      │╱       │╱
//!      3 ────── 2
//! ```
//!
//! Vertex 0 is the origin; 1, 3, and 4 are the *key* vertices along the
//! width, height, and depth axes. While the volume is axis-aligned only the
//! key vertices are maintained and the other four are derived on demand by
//! [`complete`](PaintVolume::complete).
//!
//! Operations that would make the derived vertices ambiguous first realign
//! the volume, so the volume never sits in a state where some vertices are
//! stale and the box is not axis-aligned.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Rect;

use crate::actor::ActorId;
use crate::cull::{CullResult, Plane};
use crate::geometry::{Vertex, Viewport};
use crate::matrix::Matrix;

/// Shape and freshness of a [`PaintVolume`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VolumeState {
    /// Encloses nothing. Only the origin is meaningful.
    Empty,
    /// Axis-aligned; only the origin and key vertices are current.
    Aligned,
    /// Axis-aligned with all eight vertices current.
    Complete,
    /// All eight vertices current but no longer axis-aligned, after a
    /// transform or projection.
    Transformed,
}

/// A conservative bounding cuboid of an actor's painting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintVolume {
    actor: Option<ActorId>,
    vertices: [Vertex; 8],
    state: VolumeState,
    is_2d: bool,
}

impl Default for PaintVolume {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PaintVolume {
    /// Creates an empty volume at the origin of `actor`'s space.
    #[must_use]
    pub const fn new(actor: Option<ActorId>) -> Self {
        Self {
            actor,
            vertices: [Vertex::ZERO; 8],
            state: VolumeState::Empty,
            is_2d: true,
        }
    }

    /// The actor whose local space the vertices are expressed in.
    #[inline]
    #[must_use]
    pub const fn actor(&self) -> Option<ActorId> {
        self.actor
    }

    /// Re-labels the space the vertices are in without touching them.
    ///
    /// Used after the caller has transformed the vertices itself.
    #[inline]
    pub fn set_reference_actor(&mut self, actor: Option<ActorId>) {
        self.actor = actor;
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> VolumeState {
        self.state
    }

    /// Returns `true` if the volume encloses nothing.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.state, VolumeState::Empty)
    }

    /// Returns `true` unless the volume has been transformed off-axis.
    #[inline]
    #[must_use]
    pub const fn is_axis_aligned(&self) -> bool {
        !matches!(self.state, VolumeState::Transformed)
    }

    /// Returns `true` if every vertex is current.
    #[inline]
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        !matches!(self.state, VolumeState::Aligned)
    }

    /// Returns `true` if the volume has zero depth, in which case only the
    /// front four vertices are meaningful.
    #[inline]
    #[must_use]
    pub const fn is_2d(&self) -> bool {
        self.is_2d
    }

    /// The eight vertices. Only valid beyond the key vertices once
    /// [`is_complete`](Self::is_complete).
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> &[Vertex; 8] {
        &self.vertices
    }

    fn vertex_count(&self) -> usize {
        if self.is_2d { 4 } else { 8 }
    }

    /// Re-derives emptiness after a key vertex moved.
    fn update_state_after_edit(&mut self) {
        let v = &self.vertices;
        self.state = if v[0].x == v[1].x && v[0].y == v[3].y && v[0].z == v[4].z {
            VolumeState::Empty
        } else {
            VolumeState::Aligned
        };
    }

    /// Before editing an edge: an empty volume's key vertices collapse onto
    /// the origin, and a transformed volume is realigned.
    fn prepare_edit(&mut self) {
        if self.is_empty() {
            let origin = self.vertices[0];
            self.vertices[1] = origin;
            self.vertices[3] = origin;
            self.vertices[4] = origin;
        } else if !self.is_axis_aligned() {
            self.axis_align();
        }
    }

    // -- Origin and extents --

    /// The origin (vertex 0).
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Vertex {
        self.vertices[0]
    }

    /// Moves the volume so its origin is `origin`, keeping its extents.
    pub fn set_origin(&mut self, origin: Vertex) {
        if !self.is_axis_aligned() {
            self.axis_align();
        }
        let delta = origin - self.vertices[0];
        for i in [0, 1, 3, 4] {
            self.vertices[i] = self.vertices[i] + delta;
        }
        if !self.is_empty() {
            self.state = VolumeState::Aligned;
        }
    }

    /// Sets the extent along X.
    ///
    /// # Panics
    ///
    /// Panics if `width` is negative.
    pub fn set_width(&mut self, width: f64) {
        assert!(width >= 0.0, "paint volume width must not be negative");
        self.prepare_edit();
        self.vertices[1].x = self.vertices[0].x + width;
        self.update_state_after_edit();
    }

    /// Sets the extent along Y.
    ///
    /// # Panics
    ///
    /// Panics if `height` is negative.
    pub fn set_height(&mut self, height: f64) {
        assert!(height >= 0.0, "paint volume height must not be negative");
        self.prepare_edit();
        self.vertices[3].y = self.vertices[0].y + height;
        self.update_state_after_edit();
    }

    /// Sets the extent along Z. A depth of zero makes the volume 2-D.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is negative.
    pub fn set_depth(&mut self, depth: f64) {
        assert!(depth >= 0.0, "paint volume depth must not be negative");
        self.prepare_edit();
        self.vertices[4].z = self.vertices[0].z + depth;
        self.is_2d = depth == 0.0;
        self.update_state_after_edit();
    }

    /// Extent along X of the axis-aligned bounds. Zero when empty.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.aligned_extent(|v| v[1].x - v[0].x)
    }

    /// Extent along Y of the axis-aligned bounds. Zero when empty.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.aligned_extent(|v| v[3].y - v[0].y)
    }

    /// Extent along Z of the axis-aligned bounds. Zero when empty.
    #[must_use]
    pub fn depth(&self) -> f64 {
        self.aligned_extent(|v| v[4].z - v[0].z)
    }

    fn aligned_extent(&self, f: impl Fn(&[Vertex; 8]) -> f64) -> f64 {
        if self.is_empty() {
            0.0
        } else if self.is_axis_aligned() {
            f(&self.vertices)
        } else {
            let mut aligned = *self;
            aligned.axis_align();
            f(&aligned.vertices)
        }
    }

    // -- Combination --

    /// Grows this volume to also enclose `other`.
    ///
    /// Empty operands are identities: unioning an empty volume changes
    /// nothing, and unioning into an empty volume copies `other`.
    ///
    /// # Panics
    ///
    /// Panics if the volumes have different reference actors.
    pub fn union(&mut self, other: &Self) {
        assert!(
            self.actor == other.actor,
            "paint volume union across different reference actors"
        );
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
            return;
        }

        if !self.is_axis_aligned() {
            self.axis_align();
        }
        let mut aligned;
        let other = if other.is_axis_aligned() {
            other
        } else {
            aligned = *other;
            aligned.axis_align();
            &aligned
        };

        let (a, b) = (&self.vertices, &other.vertices);
        let min_x = a[0].x.min(b[0].x);
        let max_x = a[1].x.max(b[1].x);
        let min_y = a[0].y.min(b[0].y);
        let max_y = a[3].y.max(b[3].y);
        let min_z = a[0].z.min(b[0].z);
        let max_z = a[4].z.max(b[4].z);

        self.set_key_vertices(min_x, max_x, min_y, max_y, min_z, max_z);
        self.is_2d = max_z == min_z;
        self.state = VolumeState::Aligned;
    }

    /// Grows this volume to also enclose a 2-D box at `z = 0`.
    pub fn union_box(&mut self, b: &Rect) {
        let b = b.abs();
        let mut other = Self::new(self.actor);
        other.set_origin(Vertex::new(b.x0, b.y0, 0.0));
        other.set_width(b.width());
        other.set_height(b.height());
        self.union(&other);
    }

    fn set_key_vertices(
        &mut self,
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
        min_z: f64,
        max_z: f64,
    ) {
        self.vertices[0] = Vertex::new(min_x, min_y, min_z);
        self.vertices[1] = Vertex::new(max_x, min_y, min_z);
        self.vertices[3] = Vertex::new(min_x, max_y, min_z);
        self.vertices[4] = Vertex::new(min_x, min_y, max_z);
    }

    // -- Derived vertices --

    /// Derives vertices 2, 5, 6, and 7 from the key vertices.
    ///
    /// No-op unless the volume is [`Aligned`](VolumeState::Aligned).
    pub fn complete(&mut self) {
        if self.state != VolumeState::Aligned {
            return;
        }
        let v = &mut self.vertices;
        let dx = v[1] - v[0];
        let dy = v[3] - v[0];
        v[2] = v[3] + dx;
        if !self.is_2d {
            v[5] = v[4] + dx;
            v[6] = v[5] + dy;
            v[7] = v[4] + dy;
        }
        self.state = VolumeState::Complete;
    }

    /// Replaces the volume with the axis-aligned box enclosing it.
    pub fn axis_align(&mut self) {
        if self.is_axis_aligned() {
            return;
        }
        let count = self.vertex_count();
        let first = self.vertices[0];
        let (mut min, mut max) = (first, first);
        for v in &self.vertices[1..count] {
            min = Vertex::new(min.x.min(v.x), min.y.min(v.y), min.z.min(v.z));
            max = Vertex::new(max.x.max(v.x), max.y.max(v.y), max.z.max(v.z));
        }
        self.set_key_vertices(min.x, max.x, min.y, max.y, min.z, max.z);
        self.is_2d = max.z == min.z;
        self.state = VolumeState::Aligned;
    }

    /// The 2-D bounding box of the (completed) vertices, ignoring Z.
    ///
    /// An empty volume yields a zero-sized box at the origin.
    #[must_use]
    pub fn bounding_box(&mut self) -> Rect {
        if self.is_empty() {
            let o = self.vertices[0];
            return Rect::new(o.x, o.y, o.x, o.y);
        }
        self.complete();
        let count = self.vertex_count();
        let first = self.vertices[0];
        let mut r = Rect::new(first.x, first.y, first.x, first.y);
        for v in &self.vertices[1..count] {
            r.x0 = r.x0.min(v.x);
            r.y0 = r.y0.min(v.y);
            r.x1 = r.x1.max(v.x);
            r.y1 = r.y1.max(v.y);
        }
        r
    }

    // -- Transformation --

    /// Transforms every vertex by `matrix`, discarding the resulting `w`.
    ///
    /// The result is generally not axis-aligned. The reference actor is left
    /// unchanged; callers moving the volume to another space relabel it with
    /// [`set_reference_actor`](Self::set_reference_actor).
    pub fn transform(&mut self, matrix: &Matrix) {
        if self.is_empty() {
            self.vertices[0] = matrix.transform_vertex(self.vertices[0]);
            return;
        }
        self.complete();
        let count = self.vertex_count();
        for v in &mut self.vertices[..count] {
            *v = matrix.transform_vertex(*v);
        }
        self.state = VolumeState::Transformed;
    }

    /// Projects every vertex to window coordinates.
    ///
    /// X and Y become window pixels (top-left origin) and Z becomes window
    /// depth in `[0, 1]`.
    pub fn project(&mut self, modelview: &Matrix, projection: &Matrix, viewport: &Viewport) {
        let mvp = *projection * *modelview;
        let to_window = |v: Vertex| {
            let [x, y, z, w] = mvp.transform_point([v.x, v.y, v.z, 1.0]);
            let (wx, wy) = viewport.ndc_to_window(x / w, y / w);
            Vertex::new(wx, wy, (z / w + 1.0) / 2.0)
        };
        if self.is_empty() {
            self.vertices[0] = to_window(self.vertices[0]);
            return;
        }
        self.complete();
        let count = self.vertex_count();
        for v in &mut self.vertices[..count] {
            *v = to_window(*v);
        }
        self.state = VolumeState::Transformed;
    }

    /// Sets the extents to the size of `allocation`, keeping the origin.
    ///
    /// Returns `false`, leaving the volume untouched, when there is no
    /// allocation.
    pub fn set_from_allocation(&mut self, allocation: Option<&Rect>) -> bool {
        let Some(a) = allocation else {
            return false;
        };
        self.set_width(a.width().max(0.0));
        self.set_height(a.height().max(0.0));
        true
    }

    // -- Culling --

    /// Classifies the volume against four eye-space planes.
    ///
    /// The volume must already be in eye space: complete, with no reference
    /// actor. An empty volume is always [`Out`](CullResult::Out).
    pub fn cull(&self, planes: &[Plane; 4]) -> CullResult {
        if self.is_empty() {
            return CullResult::Out;
        }
        debug_assert!(self.is_complete(), "culling an incomplete paint volume");
        debug_assert!(
            self.actor.is_none(),
            "culling a paint volume that is not in eye space"
        );
        let mut completed = *self;
        completed.complete();

        let vertices = &completed.vertices[..completed.vertex_count()];
        let mut partial = false;
        for plane in planes {
            let out = vertices.iter().filter(|v| plane.distance(**v) < 0.0).count();
            if out == vertices.len() {
                return CullResult::Out;
            }
            partial |= out != 0;
        }
        if partial {
            CullResult::Partial
        } else {
            CullResult::In
        }
    }

    /// Window-space box covering the volume, quantized so that its size does
    /// not depend on the sub-pixel position of the volume.
    ///
    /// `modelview` maps the volume's space to eye space. The box is padded
    /// by up to two pixels beyond the exact projection on each axis.
    #[must_use]
    pub fn stage_paint_box(
        &self,
        modelview: &Matrix,
        projection: &Matrix,
        viewport: &Viewport,
    ) -> Rect {
        let mut projected = *self;
        projected.project(modelview, projection, viewport);
        let b = projected.bounding_box();

        let width = round_ties_even(b.width());
        let height = round_ties_even(b.height());
        let x1 = (b.x1 + 0.75).ceil();
        let y1 = (b.y1 + 0.75).ceil();
        Rect::new(x1 - width - 3.0, y1 - height - 3.0, x1, y1)
    }
}

/// Rounds to the nearest integer, halfway cases to the even one.
fn round_ties_even(x: f64) -> f64 {
    let r = x.round();
    if (r - x).abs() == 0.5 {
        2.0 * (x / 2.0).round()
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn aligned(x: f64, y: f64, w: f64, h: f64) -> PaintVolume {
        let mut pv = PaintVolume::new(None);
        pv.set_origin(Vertex::new(x, y, 0.0));
        pv.set_width(w);
        pv.set_height(h);
        pv
    }

    fn square_planes() -> [Plane; 4] {
        [
            Plane::new(Vertex::new(0.0, -1.0, 0.0), Vertex::new(0.0, 1.0, 0.0)),
            Plane::new(Vertex::new(1.0, 0.0, 0.0), Vertex::new(-1.0, 0.0, 0.0)),
            Plane::new(Vertex::new(0.0, 1.0, 0.0), Vertex::new(0.0, -1.0, 0.0)),
            Plane::new(Vertex::new(-1.0, 0.0, 0.0), Vertex::new(1.0, 0.0, 0.0)),
        ]
    }

    fn eye(mut pv: PaintVolume) -> PaintVolume {
        pv.complete();
        pv
    }

    #[test]
    fn new_volume_is_empty_and_2d() {
        let pv = PaintVolume::default();
        assert!(pv.is_empty());
        assert!(pv.is_2d());
        assert!(pv.is_complete());
        assert_eq!(pv.width(), 0.0);
    }

    #[test]
    fn width_only_is_not_empty() {
        let mut pv = PaintVolume::new(None);
        pv.set_width(10.0);
        assert!(!pv.is_empty());
        assert_eq!(pv.state(), VolumeState::Aligned);
        assert_eq!(pv.width(), 10.0);
        pv.set_height(5.0);
        assert!(!pv.is_empty());
        assert_eq!(pv.state(), VolumeState::Aligned);
        assert_eq!((pv.width(), pv.height(), pv.depth()), (10.0, 5.0, 0.0));
    }

    #[test]
    fn set_origin_keeps_extents() {
        let mut pv = aligned(0.0, 0.0, 10.0, 20.0);
        pv.set_origin(Vertex::new(5.0, 6.0, 7.0));
        assert_eq!(pv.origin(), Vertex::new(5.0, 6.0, 7.0));
        assert_eq!((pv.width(), pv.height()), (10.0, 20.0));
        assert_eq!(pv.vertices()[1], Vertex::new(15.0, 6.0, 7.0));
    }

    #[test]
    #[should_panic(expected = "paint volume width must not be negative")]
    fn negative_width_panics() {
        PaintVolume::new(None).set_width(-1.0);
    }

    #[test]
    fn depth_controls_2d() {
        let mut pv = aligned(0.0, 0.0, 1.0, 1.0);
        pv.set_depth(3.0);
        assert!(!pv.is_2d());
        pv.complete();
        assert_eq!(pv.vertices()[6], Vertex::new(1.0, 1.0, 3.0));
        pv.set_depth(0.0);
        assert!(pv.is_2d());
    }

    #[test]
    fn complete_derives_front_face() {
        let mut pv = aligned(1.0, 2.0, 3.0, 4.0);
        assert!(!pv.is_complete());
        pv.complete();
        assert_eq!(pv.state(), VolumeState::Complete);
        assert_eq!(pv.vertices()[2], Vertex::new(4.0, 6.0, 0.0));
    }

    #[test]
    fn complete_twice_is_unchanged() {
        let mut pv = aligned(1.0, 2.0, 3.0, 4.0);
        pv.set_depth(5.0);
        pv.complete();
        let once = *pv.vertices();
        pv.complete();
        assert_eq!(*pv.vertices(), once);
        assert_eq!(pv.vertices()[6], Vertex::new(4.0, 6.0, 5.0));
    }

    #[test]
    fn union_with_empty_is_identity() {
        let base = aligned(0.0, 0.0, 10.0, 10.0);
        let mut a = base;
        a.union(&PaintVolume::new(None));
        assert_eq!(a, base);

        let mut empty = PaintVolume::new(None);
        empty.union(&base);
        assert_eq!(empty, base);
    }

    #[test]
    fn union_grows_to_cover_both() {
        let mut a = aligned(0.0, 0.0, 10.0, 10.0);
        let b = aligned(5.0, -5.0, 20.0, 5.0);
        a.union(&b);
        assert_eq!(a.origin(), Vertex::new(0.0, -5.0, 0.0));
        assert_eq!((a.width(), a.height()), (25.0, 15.0));
        assert!(a.is_2d());
    }

    #[test]
    fn union_keeps_sub_pixel_extents() {
        let mut a = aligned(0.25, 0.25, 0.5, 0.5);
        let b = aligned(0.5, 0.5, 0.6, 0.6);
        a.union(&b);
        assert!((a.origin().x - 0.25).abs() < EPS);
        assert!((a.width() - 0.85).abs() < EPS);
        assert!((a.height() - 0.85).abs() < EPS);
    }

    #[test]
    fn union_with_depth_is_3d() {
        let mut a = aligned(0.0, 0.0, 1.0, 1.0);
        let mut b = aligned(0.0, 0.0, 1.0, 1.0);
        b.set_depth(2.0);
        a.union(&b);
        assert!(!a.is_2d());
        assert_eq!(a.depth(), 2.0);
    }

    #[test]
    #[should_panic(expected = "paint volume union across different reference actors")]
    fn union_across_actors_panics() {
        let mut store = crate::actor::ActorStore::new();
        let actor = store.create_actor();
        let mut a = PaintVolume::new(Some(actor));
        a.union(&aligned(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn union_box_adds_rect() {
        let mut pv = aligned(0.0, 0.0, 10.0, 10.0);
        pv.union_box(&Rect::new(-5.0, 2.0, 3.0, 30.0));
        assert_eq!(pv.origin(), Vertex::new(-5.0, 0.0, 0.0));
        assert_eq!((pv.width(), pv.height()), (15.0, 30.0));
    }

    #[test]
    fn transform_then_align_encloses_rotation() {
        let mut pv = aligned(0.0, 0.0, 10.0, 10.0);
        pv.transform(&Matrix::from_rotation(45.0, 0.0, 0.0, 1.0));
        assert_eq!(pv.state(), VolumeState::Transformed);
        assert!(pv.is_complete());

        let half_diag = 10.0 / 2.0_f64.sqrt();
        assert!((pv.width() - 2.0 * half_diag).abs() < 1e-9);
        pv.axis_align();
        assert!(pv.is_axis_aligned());
        assert!((pv.origin().x + half_diag).abs() < 1e-9);
        assert!((pv.height() - 2.0 * half_diag).abs() < 1e-9);
    }

    #[test]
    fn axis_align_twice_is_unchanged() {
        let mut pv = aligned(0.0, 0.0, 10.0, 20.0);
        pv.transform(&Matrix::from_rotation(30.0, 0.0, 0.0, 1.0));
        pv.axis_align();
        let once = pv;
        pv.axis_align();
        assert_eq!(pv, once);
        assert!(pv.is_axis_aligned());
    }

    #[test]
    fn rotating_out_of_plane_gains_depth() {
        let mut pv = aligned(0.0, 0.0, 10.0, 10.0);
        pv.transform(&Matrix::from_rotation(90.0, 0.0, 1.0, 0.0));
        pv.axis_align();
        assert!(!pv.is_2d());
        assert!((pv.depth() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn edit_after_transform_realigns() {
        let mut pv = aligned(0.0, 0.0, 10.0, 10.0);
        pv.transform(&Matrix::from_translation(3.0, 4.0, 0.0));
        pv.set_width(2.0);
        assert_eq!(pv.state(), VolumeState::Aligned);
        assert_eq!(pv.origin(), Vertex::new(3.0, 4.0, 0.0));
        assert_eq!((pv.width(), pv.height()), (2.0, 10.0));
    }

    #[test]
    fn empty_transform_moves_origin_only() {
        let mut pv = PaintVolume::new(None);
        pv.set_origin(Vertex::new(1.0, 1.0, 0.0));
        pv.transform(&Matrix::from_translation(2.0, 0.0, 0.0));
        assert!(pv.is_empty());
        assert_eq!(pv.origin(), Vertex::new(3.0, 1.0, 0.0));
    }

    #[test]
    fn bounding_box_of_empty_is_point() {
        let mut pv = PaintVolume::new(None);
        pv.set_origin(Vertex::new(4.0, 5.0, 0.0));
        assert_eq!(pv.bounding_box(), Rect::new(4.0, 5.0, 4.0, 5.0));
    }

    #[test]
    fn cull_classifies_against_square() {
        let planes = square_planes();
        assert_eq!(eye(aligned(-0.5, -0.5, 1.0, 1.0)).cull(&planes), CullResult::In);
        assert_eq!(eye(aligned(0.5, 0.5, 1.0, 1.0)).cull(&planes), CullResult::Partial);
        assert_eq!(eye(aligned(2.0, 2.0, 1.0, 1.0)).cull(&planes), CullResult::Out);
        assert_eq!(eye(aligned(-3.0, -0.5, 1.0, 1.0)).cull(&planes), CullResult::Out);
        assert_eq!(PaintVolume::new(None).cull(&planes), CullResult::Out);
    }

    #[test]
    fn cull_spanning_volume_is_partial() {
        let planes = square_planes();
        assert_eq!(eye(aligned(-2.0, -2.0, 4.0, 4.0)).cull(&planes), CullResult::Partial);
    }

    #[test]
    fn project_orthographic_is_pixels() {
        let viewport = Viewport::new(0.0, 0.0, 800.0, 600.0);
        let projection = Matrix::orthographic(0.0, 0.0, 800.0, 600.0, -1.0, 1.0);
        let mut pv = aligned(10.0, 20.0, 30.0, 40.0);
        pv.project(&Matrix::IDENTITY, &projection, &viewport);
        let b = pv.bounding_box();
        assert!((b.x0 - 10.0).abs() < 1e-9);
        assert!((b.y0 - 20.0).abs() < 1e-9);
        assert!((b.x1 - 40.0).abs() < 1e-9);
        assert!((b.y1 - 60.0).abs() < 1e-9);
        assert!((pv.vertices()[0].z - 0.5).abs() < 1e-9);
    }

    #[test]
    fn stage_paint_box_size_is_position_independent() {
        let viewport = Viewport::new(0.0, 0.0, 800.0, 600.0);
        let projection = Matrix::orthographic(0.0, 0.0, 800.0, 600.0, -1.0, 1.0);
        let a = aligned(10.1, 10.1, 37.3, 52.9).stage_paint_box(
            &Matrix::IDENTITY,
            &projection,
            &viewport,
        );
        let b = aligned(10.6, 10.6, 37.3, 52.9).stage_paint_box(
            &Matrix::IDENTITY,
            &projection,
            &viewport,
        );

        assert_eq!((a.width(), a.height()), (40.0, 56.0));
        assert_eq!((b.width(), b.height()), (40.0, 56.0));
        for r in [a, b] {
            assert_eq!(r.x0, r.x0.round());
            assert_eq!(r.y1, r.y1.round());
        }
        // The exact box is always covered.
        assert!(a.x0 <= 10.1 && a.x1 >= 47.4 && a.y0 <= 10.1 && a.y1 >= 63.0);
        assert!(b.x0 <= 10.6 && b.x1 >= 47.9 && b.y0 <= 10.6 && b.y1 >= 63.5);
    }

    #[test]
    fn paint_box_sizes_round_half_to_even() {
        assert_eq!(round_ties_even(2.5), 2.0);
        assert_eq!(round_ties_even(3.5), 4.0);
        assert_eq!(round_ties_even(-2.5), -2.0);
        assert_eq!(round_ties_even(2.4), 2.0);
        assert_eq!(round_ties_even(2.6), 3.0);
        assert_eq!(round_ties_even(7.0), 7.0);
    }

    #[test]
    fn set_from_allocation_uses_size() {
        let mut pv = PaintVolume::new(None);
        assert!(!pv.set_from_allocation(None));
        assert!(pv.is_empty());
        assert!(pv.set_from_allocation(Some(&Rect::new(50.0, 50.0, 150.0, 80.0))));
        assert_eq!(pv.origin(), Vertex::ZERO);
        assert_eq!((pv.width(), pv.height()), (100.0, 30.0));
    }
}
