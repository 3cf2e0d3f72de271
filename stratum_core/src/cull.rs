// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frustum side planes and visibility classification.

use crate::geometry::{Vertex, Viewport};
use crate::matrix::Matrix;

/// Outcome of testing a volume against the frustum side planes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CullResult {
    /// Entirely inside every plane.
    In,
    /// Entirely outside at least one plane.
    Out,
    /// Straddles at least one plane.
    Partial,
}

impl CullResult {
    /// Returns `true` unless the result is [`Out`](Self::Out).
    #[inline]
    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::Out)
    }
}

/// A plane through `v0` with normal `n`.
///
/// Points with `n · (p - v0) >= 0` are on the inner side.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Plane {
    /// A point on the plane.
    pub v0: Vertex,
    /// Unit normal pointing into the visible half-space.
    pub n: Vertex,
}

impl Plane {
    /// Creates a plane, normalizing `n`.
    #[must_use]
    pub fn new(v0: Vertex, n: Vertex) -> Self {
        Self {
            v0,
            n: n.normalize(),
        }
    }

    /// Signed distance of `p` from the plane.
    #[inline]
    #[must_use]
    pub fn distance(&self, p: Vertex) -> f64 {
        self.n.dot(p - self.v0)
    }
}

/// Eye-space depth of the near point sampled for each polygon corner.
const DEPTH: f64 = -50.0;

/// Computes the four eye-space planes bounding the region of the screen
/// covered by `polygon`.
///
/// `polygon` is a quadrilateral in window coordinates (top-left origin),
/// listed clockwise on screen. `inverse_projection` must be the inverse of
/// `projection`. The resulting normals point into the region.
///
/// Each corner is unprojected at two depths. The unprojected points are used
/// in homogeneous form without dividing by `w`: for a perspective projection
/// this keeps the two samples on the ray from the eye through the corner at
/// different distances, and for an orthographic one `w` stays 1.
#[must_use]
pub fn eye_planes_for_screen_poly(
    polygon: &[Vertex; 4],
    viewport: &Viewport,
    projection: &Matrix,
    inverse_projection: &Matrix,
) -> [Plane; 4] {
    let wz = projection.cols[2][3];
    let ww = projection.cols[3][3];

    let unproject = |p: &Vertex, depth: f64| -> Vertex {
        let wc = depth * wz + ww;
        let clip_x = ((p.x - viewport.x) * (2.0 / viewport.width) - 1.0) * wc;
        let clip_y = ((p.y - viewport.y) * (2.0 / viewport.height) - 1.0) * -wc;
        let [x, y, z, _] = inverse_projection.transform_point([clip_x, clip_y, depth, wc]);
        Vertex::new(x, y, z)
    };

    let near = polygon.map(|p| unproject(&p, DEPTH));
    let far = polygon.map(|p| unproject(&p, DEPTH * 2.0));

    core::array::from_fn(|i| {
        let (v0, b, c) = if i < 3 {
            (near[i], far[i], far[i + 1])
        } else {
            // Closing edge, anchored at the first corner.
            (near[0], far[3], far[0])
        };
        Plane::new(v0, (b - v0).cross(c - v0))
    })
}
