// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persistent clip stack.
//!
//! A [`ClipStack`] is a value: a handle to the newest [`ClipEntry`] of a
//! reference-counted, parent-linked chain. Pushing creates a new entry whose
//! parent is the old top; popping moves back to the parent. Cloning a stack
//! is O(1) and shares every entry, so a render plan can record the clip in
//! effect for each primitive without copying anything, and two stacks are
//! the same clip state exactly when they point at the same entry.
//!
//! Every entry carries an integer window-space bounding box computed when it
//! is pushed. [`ClipStack::get_bounds`] intersects those boxes to get the
//! scissor rectangle; [`ClipFlushState`] turns a stack into the scissor and
//! fallback commands a GPU backend would issue.

mod flush;

pub use flush::{ClipCapabilities, ClipCommands, ClipFlushState, ClipOp, GlScissor, RenderTarget};

use alloc::rc::Rc;
use core::fmt;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{BezPath, Rect, Shape};

use crate::geometry::{Vertex, Viewport};
use crate::matrix::Matrix;
use crate::matrix_stack::MatrixEntry;
use crate::path::as_rectangle;

/// An integer rectangle in window coordinates with a top-left origin.
///
/// `x1` and `y1` are exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScissorRect {
    /// Left edge.
    pub x0: i32,
    /// Top edge.
    pub y0: i32,
    /// Right edge (exclusive).
    pub x1: i32,
    /// Bottom edge (exclusive).
    pub y1: i32,
}

impl ScissorRect {
    /// The bounds of an empty stack: everything.
    pub const UNBOUNDED: Self = Self::new(0, 0, i32::MAX, i32::MAX);

    /// The canonical empty rectangle.
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    /// Creates a rectangle from its edges.
    #[inline]
    #[must_use]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width in pixels, zero when empty.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> i32 {
        if self.x1 > self.x0 {
            self.x1 - self.x0
        } else {
            0
        }
    }

    /// Height in pixels, zero when empty.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> i32 {
        if self.y1 > self.y0 {
            self.y1 - self.y0
        } else {
            0
        }
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Intersection of two rectangles. May be empty.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }
}

/// The geometry recorded by one clip entry.
#[derive(Clone, Debug)]
pub enum ClipShape {
    /// A rectangle given directly in window coordinates. Always handled by
    /// the scissor.
    WindowRect,
    /// A rectangle in the local space of `modelview`.
    Rect {
        /// The rectangle in local coordinates.
        rect: Rect,
        /// Transform in effect when the rectangle was pushed.
        modelview: MatrixEntry,
        /// Whether the scissor alone clips this rectangle exactly.
        can_be_scissor: bool,
    },
    /// An arbitrary path in the local space of `modelview`.
    Path {
        /// The path in local coordinates.
        path: BezPath,
        /// Transform in effect when the path was pushed.
        modelview: MatrixEntry,
    },
}

struct ClipNode {
    shape: ClipShape,
    bounds: ScissorRect,
    parent: Option<ClipEntry>,
}

impl Drop for ClipNode {
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(entry) = parent {
            match Rc::try_unwrap(entry.0) {
                Ok(mut node) => parent = node.parent.take(),
                Err(_) => break,
            }
        }
    }
}

/// One immutable entry of a clip stack.
#[derive(Clone)]
pub struct ClipEntry(Rc<ClipNode>);

impl fmt::Debug for ClipEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipEntry")
            .field("shape", &self.0.shape)
            .field("bounds", &self.0.bounds)
            .finish_non_exhaustive()
    }
}

impl ClipEntry {
    /// The recorded geometry.
    #[must_use]
    pub fn shape(&self) -> &ClipShape {
        &self.0.shape
    }

    /// Window-space bounding box computed at push time.
    #[must_use]
    pub fn bounds(&self) -> ScissorRect {
        self.0.bounds
    }

    /// The entry below this one.
    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.0.parent.as_ref()
    }

    /// Whether the scissor alone clips this entry exactly.
    #[must_use]
    pub fn can_be_scissor(&self) -> bool {
        match &self.0.shape {
            ClipShape::WindowRect => true,
            ClipShape::Rect { can_be_scissor, .. } => *can_be_scissor,
            ClipShape::Path { .. } => false,
        }
    }

    /// Returns `true` if both handles point at the same entry.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A persistent stack of clip entries.
///
/// The empty stack clips nothing.
#[derive(Clone, Debug, Default)]
pub struct ClipStack {
    top: Option<ClipEntry>,
}

impl ClipStack {
    /// Creates an empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self { top: None }
    }

    /// The newest entry, if any.
    #[must_use]
    pub fn top(&self) -> Option<&ClipEntry> {
        self.top.as_ref()
    }

    /// Returns `true` if nothing has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    /// Number of entries.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.entries().count()
    }

    /// Iterates entries from the top down to the root.
    pub fn entries(&self) -> impl Iterator<Item = &ClipEntry> {
        core::iter::successors(self.top.as_ref(), |e| e.parent())
    }

    /// Returns `true` if both stacks point at the same top entry (or are
    /// both empty).
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.top, &other.top) {
            (None, None) => true,
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    fn push(&mut self, shape: ClipShape, bounds: ScissorRect) {
        let parent = self.top.take();
        self.top = Some(ClipEntry(Rc::new(ClipNode {
            shape,
            bounds,
            parent,
        })));
    }

    /// Pushes a rectangle given in window coordinates.
    pub fn push_window_rectangle(&mut self, x: i32, y: i32, width: i32, height: i32) {
        let bounds = ScissorRect::new(x, y, x.saturating_add(width), y.saturating_add(height));
        self.push(ClipShape::WindowRect, bounds);
    }

    /// Pushes a rectangle in the local space of `modelview`.
    ///
    /// When the modelview has no rotation or shear the rectangle stays
    /// axis-aligned on screen and is marked as scissor-capable, with bounds
    /// rounded to the nearest pixel. Otherwise the bounds cover every pixel
    /// the transformed rectangle touches and the entry needs a fallback at
    /// flush time.
    pub fn push_rectangle(
        &mut self,
        x_1: f64,
        y_1: f64,
        x_2: f64,
        y_2: f64,
        modelview: &MatrixEntry,
        projection: &MatrixEntry,
        viewport: &Viewport,
    ) {
        let mv = modelview.matrix();
        let can_be_scissor = !mv.has_rotation_or_shear();
        let window = window_bounds(
            [(x_1, y_1), (x_2, y_1), (x_2, y_2), (x_1, y_2)],
            &mv,
            &projection.matrix(),
            viewport,
        );
        let bounds = if can_be_scissor {
            pixel_bounds(window, f64::round, f64::round)
        } else {
            pixel_bounds(window, f64::floor, f64::ceil)
        };
        self.push(
            ClipShape::Rect {
                rect: Rect::new(x_1, y_1, x_2, y_2),
                modelview: modelview.clone(),
                can_be_scissor,
            },
            bounds,
        );
    }

    /// Pushes a path in the local space of `modelview`.
    ///
    /// A path that is a plain axis-aligned rectangle is pushed as a
    /// rectangle instead.
    pub fn push_from_path(
        &mut self,
        path: &BezPath,
        modelview: &MatrixEntry,
        projection: &MatrixEntry,
        viewport: &Viewport,
    ) {
        if let Some(r) = as_rectangle(path) {
            self.push_rectangle(r.x0, r.y0, r.x1, r.y1, modelview, projection, viewport);
            return;
        }

        let b = path.bounding_box();
        let window = window_bounds(
            [(b.x0, b.y0), (b.x1, b.y0), (b.x1, b.y1), (b.x0, b.y1)],
            &modelview.matrix(),
            &projection.matrix(),
            viewport,
        );
        self.push(
            ClipShape::Path {
                path: path.clone(),
                modelview: modelview.clone(),
            },
            pixel_bounds(window, f64::floor, f64::ceil),
        );
    }

    /// Removes the top entry.
    ///
    /// # Panics
    ///
    /// Panics if the stack is empty.
    pub fn pop(&mut self) {
        let Some(top) = self.top.take() else {
            panic!("clip stack pop on empty stack");
        };
        self.top = top.parent().cloned();
    }

    /// Intersection of every entry's bounds.
    ///
    /// An empty stack returns [`ScissorRect::UNBOUNDED`]; an empty
    /// intersection collapses to [`ScissorRect::EMPTY`].
    #[must_use]
    pub fn get_bounds(&self) -> ScissorRect {
        let bounds = self
            .entries()
            .fold(ScissorRect::UNBOUNDED, |acc, e| acc.intersect(&e.bounds()));
        if bounds.is_empty() {
            ScissorRect::EMPTY
        } else {
            bounds
        }
    }
}

/// Projects the corners of a local quad to window space and returns the
/// floating-point bounding box.
fn window_bounds(
    corners: [(f64, f64); 4],
    modelview: &Matrix,
    projection: &Matrix,
    viewport: &Viewport,
) -> Rect {
    let mvp = *projection * *modelview;
    let mut out = Rect::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
    for (x, y) in corners {
        let ndc = mvp.project_vertex(Vertex::new(x, y, 0.0));
        let (wx, wy) = viewport.ndc_to_window(ndc.x, ndc.y);
        out.x0 = out.x0.min(wx);
        out.y0 = out.y0.min(wy);
        out.x1 = out.x1.max(wx);
        out.y1 = out.y1.max(wy);
    }
    out
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "window coordinates saturate at the i32 range"
)]
fn pixel_bounds(r: Rect, lo: fn(f64) -> f64, hi: fn(f64) -> f64) -> ScissorRect {
    ScissorRect::new(
        lo(r.x0) as i32,
        lo(r.y0) as i32,
        hi(r.x1) as i32,
        hi(r.y1) as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix_stack::MatrixStack;
    use crate::path::rect_path;

    fn screen() -> (MatrixEntry, Viewport) {
        let projection =
            MatrixEntry::from_matrix(Matrix::orthographic(0.0, 0.0, 800.0, 600.0, -1.0, 1.0));
        (projection, Viewport::new(0.0, 0.0, 800.0, 600.0))
    }

    #[test]
    fn empty_stack_is_unbounded() {
        let stack = ClipStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.get_bounds(), ScissorRect::UNBOUNDED);
    }

    #[test]
    fn window_rectangles_intersect_and_pop() {
        let mut stack = ClipStack::new();
        stack.push_window_rectangle(10, 10, 100, 100);
        stack.push_window_rectangle(50, 50, 100, 100);
        assert_eq!(stack.get_bounds(), ScissorRect::new(50, 50, 110, 110));

        stack.pop();
        let b = stack.get_bounds();
        assert_eq!(b, ScissorRect::new(10, 10, 110, 110));
        assert_eq!((b.width(), b.height()), (100, 100));
    }

    #[test]
    fn disjoint_rectangles_collapse_to_empty() {
        let mut stack = ClipStack::new();
        stack.push_window_rectangle(0, 0, 10, 10);
        stack.push_window_rectangle(20, 20, 10, 10);
        assert_eq!(stack.get_bounds(), ScissorRect::EMPTY);
    }

    #[test]
    #[should_panic(expected = "clip stack pop on empty stack")]
    fn pop_empty_panics() {
        ClipStack::new().pop();
    }

    #[test]
    fn snapshots_share_entries() {
        let mut stack = ClipStack::new();
        stack.push_window_rectangle(0, 0, 10, 10);
        let snapshot = stack.clone();
        assert!(snapshot.ptr_eq(&stack));

        stack.push_window_rectangle(2, 2, 4, 4);
        assert!(!snapshot.ptr_eq(&stack));
        assert_eq!(snapshot.depth(), 1);
        assert_eq!(stack.depth(), 2);

        stack.pop();
        assert!(snapshot.ptr_eq(&stack));
    }

    #[test]
    fn translated_rectangle_is_scissor_capable() {
        let (projection, viewport) = screen();
        let mut mv = MatrixStack::new();
        mv.translate(20.0, 30.0, 0.0);

        let mut stack = ClipStack::new();
        stack.push_rectangle(0.0, 0.0, 100.4, 50.6, mv.top(), &projection, &viewport);
        let top = stack.top().expect("pushed");
        assert!(top.can_be_scissor());
        assert_eq!(top.bounds(), ScissorRect::new(20, 30, 120, 81));
    }

    #[test]
    fn rotated_rectangle_needs_fallback() {
        let (projection, viewport) = screen();
        let mut mv = MatrixStack::new();
        mv.translate(200.0, 200.0, 0.0);
        mv.rotate(45.0, 0.0, 0.0, 1.0);

        let mut stack = ClipStack::new();
        stack.push_rectangle(-50.0, -50.0, 50.0, 50.0, mv.top(), &projection, &viewport);
        let top = stack.top().expect("pushed");
        assert!(!top.can_be_scissor());
        // Half-diagonal is 50 * sqrt(2) ~= 70.71.
        assert_eq!(top.bounds(), ScissorRect::new(129, 129, 271, 271));
    }

    #[test]
    fn rectangular_path_becomes_rectangle() {
        let (projection, viewport) = screen();
        let mv = MatrixEntry::identity();

        let mut stack = ClipStack::new();
        stack.push_from_path(&rect_path(5.0, 5.0, 25.0, 15.0), &mv, &projection, &viewport);
        let top = stack.top().expect("pushed");
        assert!(matches!(top.shape(), ClipShape::Rect { .. }));
        assert!(top.can_be_scissor());
        assert_eq!(top.bounds(), ScissorRect::new(5, 5, 25, 15));
    }

    #[test]
    fn general_path_keeps_path_and_bounds() {
        let (projection, viewport) = screen();
        let mv = MatrixEntry::identity();

        let mut tri = BezPath::new();
        tri.move_to((10.0, 10.0));
        tri.line_to((40.5, 10.0));
        tri.line_to((20.0, 30.2));
        tri.close_path();

        let mut stack = ClipStack::new();
        stack.push_from_path(&tri, &mv, &projection, &viewport);
        let top = stack.top().expect("pushed");
        assert!(matches!(top.shape(), ClipShape::Path { .. }));
        assert!(!top.can_be_scissor());
        assert_eq!(top.bounds(), ScissorRect::new(10, 10, 41, 31));
    }

    #[test]
    fn dropping_deep_stack_does_not_overflow() {
        let mut stack = ClipStack::new();
        for i in 0..200_000 {
            stack.push_window_rectangle(0, 0, i, i);
        }
        drop(stack);
    }
}
