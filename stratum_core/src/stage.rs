// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The stage's camera: projection, view, and viewport.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Rect;

use crate::cull::{Plane, eye_planes_for_screen_poly};
use crate::geometry::{Vertex, Viewport};
use crate::matrix::Matrix;

/// Near clip distance of a perspective stage.
pub const PERSPECTIVE_Z_NEAR: f64 = 0.1;

/// Far clip distance of a perspective stage.
pub const PERSPECTIVE_Z_FAR: f64 = 100.0;

/// Projection, view, and viewport of the stage the actor tree is drawn to.
///
/// World space is the actor tree's root space. The view maps it to eye
/// space, the projection maps eye space to clip space, and the viewport maps
/// normalized device coordinates to window pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageView {
    /// Eye-to-clip transform.
    pub projection: Matrix,
    /// World-to-eye transform.
    pub view: Matrix,
    /// Window-space viewport.
    pub viewport: Viewport,
}

impl StageView {
    /// A flat stage where one world unit is one pixel and the view is the
    /// identity.
    #[must_use]
    pub fn orthographic(width: f64, height: f64) -> Self {
        Self {
            projection: Matrix::orthographic(0.0, 0.0, width, height, -1.0, 1.0),
            view: Matrix::IDENTITY,
            viewport: Viewport::new(0.0, 0.0, width, height),
        }
    }

    /// A perspective stage whose `z = 0` world plane maps one-to-one onto
    /// pixels, so flat scenes look the same as with
    /// [`orthographic`](Self::orthographic) while depth stays visible.
    ///
    /// `fov_y` is the vertical field of view in degrees.
    #[must_use]
    pub fn perspective(fov_y: f64, width: f64, height: f64) -> Self {
        let aspect = width / height;
        let z_2d = 0.5 / (fov_y.to_radians() / 2.0).tan();
        Self {
            projection: Matrix::perspective(fov_y, aspect, PERSPECTIVE_Z_NEAR, PERSPECTIVE_Z_FAR),
            view: Matrix::view_2d_in_perspective(
                fov_y,
                aspect,
                PERSPECTIVE_Z_NEAR,
                z_2d,
                width,
                height,
            ),
            viewport: Viewport::new(0.0, 0.0, width, height),
        }
    }

    /// The eye-space modelview for a world transform.
    #[inline]
    #[must_use]
    pub fn modelview(&self, world: &Matrix) -> Matrix {
        self.view * *world
    }

    /// The viewport as a rectangle.
    #[must_use]
    pub fn viewport_rect(&self) -> Rect {
        let v = &self.viewport;
        Rect::new(v.x, v.y, v.x + v.width, v.y + v.height)
    }

    /// Eye-space side planes of the frustum, narrowed to `clip` (a window
    /// rectangle) when given.
    ///
    /// Returns `None` if the projection is not invertible, in which case
    /// nothing can be culled.
    #[must_use]
    pub fn frustum_planes(&self, clip: Option<Rect>) -> Option<[Plane; 4]> {
        let inverse = self.projection.inverse()?;
        let r = clip.unwrap_or_else(|| self.viewport_rect());
        let polygon = [
            Vertex::new(r.x0, r.y0, 0.0),
            Vertex::new(r.x1, r.y0, 0.0),
            Vertex::new(r.x1, r.y1, 0.0),
            Vertex::new(r.x0, r.y1, 0.0),
        ];
        Some(eye_planes_for_screen_poly(
            &polygon,
            &self.viewport,
            &self.projection,
            &inverse,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn to_window(stage: &StageView, p: Vertex) -> (f64, f64) {
        let ndc = (stage.projection * stage.view).project_vertex(p);
        stage.viewport.ndc_to_window(ndc.x, ndc.y)
    }

    #[test]
    fn orthographic_maps_pixels() {
        let stage = StageView::orthographic(800.0, 600.0);
        let (x, y) = to_window(&stage, Vertex::new(123.0, 456.0, 0.0));
        assert!((x - 123.0).abs() < EPS);
        assert!((y - 456.0).abs() < EPS);
    }

    #[test]
    fn perspective_maps_z0_plane_to_pixels() {
        let stage = StageView::perspective(60.0, 800.0, 600.0);
        for (px, py) in [(0.0, 0.0), (800.0, 600.0), (200.0, 450.0)] {
            let (x, y) = to_window(&stage, Vertex::new(px, py, 0.0));
            assert!((x - px).abs() < EPS, "x {x} vs {px}");
            assert!((y - py).abs() < EPS, "y {y} vs {py}");
        }
    }

    #[test]
    fn frustum_planes_reject_offscreen_points() {
        for stage in [
            StageView::orthographic(800.0, 600.0),
            StageView::perspective(60.0, 800.0, 600.0),
        ] {
            let planes = stage.frustum_planes(None).expect("invertible");
            let inside = stage.view.transform_vertex(Vertex::new(400.0, 300.0, 0.0));
            let left = stage.view.transform_vertex(Vertex::new(-50.0, 300.0, 0.0));
            assert!(planes.iter().all(|p| p.distance(inside) > 0.0));
            assert!(planes.iter().any(|p| p.distance(left) < 0.0));
        }
    }

    #[test]
    fn clip_narrows_planes() {
        let stage = StageView::orthographic(800.0, 600.0);
        let planes = stage
            .frustum_planes(Some(Rect::new(100.0, 100.0, 200.0, 200.0)))
            .expect("invertible");
        let outside_clip = Vertex::new(300.0, 150.0, 0.0);
        assert!(planes.iter().any(|p| p.distance(outside_clip) < 0.0));
    }

    #[test]
    fn singular_projection_has_no_planes() {
        let mut stage = StageView::orthographic(800.0, 600.0);
        stage.projection = Matrix::from_scale(0.0, 1.0, 1.0);
        assert!(stage.frustum_planes(None).is_none());
    }
}
