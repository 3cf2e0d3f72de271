// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column-major 4×4 matrix math.
//!
//! [`Matrix`] covers what the matrix stack, clip stack, and paint volumes
//! need: composition, the usual rotation forms (axis-angle in degrees,
//! quaternion, Euler), projection constructors, a general inverse, and point
//! transformation. Mutating helpers such as [`Matrix::translate`]
//! post-multiply, so they apply in the object's local space.

use core::ops::Mul;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::geometry::Vertex;

/// A column-major 4×4 matrix stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix (`[x, y, z, w]`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix {
    /// Four columns.
    pub cols: [[f64; 4]; 4],
}

/// A rotation quaternion `w + xi + yj + zk`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quaternion {
    /// Scalar part.
    pub w: f64,
    /// X of the vector part.
    pub x: f64,
    /// Y of the vector part.
    pub y: f64,
    /// Z of the vector part.
    pub z: f64,
}

impl Quaternion {
    /// The identity rotation.
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Creates a quaternion rotating `angle` degrees around the axis
    /// `(x, y, z)`. The axis does not need to be normalized.
    #[must_use]
    pub fn from_angle_axis(angle: f64, x: f64, y: f64, z: f64) -> Self {
        let axis = Vertex::new(x, y, z).normalize();
        let half = angle.to_radians() / 2.0;
        let s = half.sin();
        Self {
            w: half.cos(),
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
        }
    }
}

/// A rotation expressed as heading, pitch, and roll in degrees.
///
/// Heading rotates about Y, pitch about X, and roll about Z. The combined
/// rotation is `Ry(heading) * Rx(pitch) * Rz(roll)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Euler {
    /// Rotation about the Y axis, in degrees.
    pub heading: f64,
    /// Rotation about the X axis, in degrees.
    pub pitch: f64,
    /// Rotation about the Z axis, in degrees.
    pub roll: f64,
}

impl Euler {
    /// Creates an Euler rotation.
    #[inline]
    #[must_use]
    pub const fn new(heading: f64, pitch: f64, roll: f64) -> Self {
        Self {
            heading,
            pitch,
            roll,
        }
    }
}

impl Matrix {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a matrix from four column arrays.
    #[inline]
    #[must_use]
    pub const fn from_cols(col0: [f64; 4], col1: [f64; 4], col2: [f64; 4], col3: [f64; 4]) -> Self {
        Self {
            cols: [col0, col1, col2, col3],
        }
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Returns the element at `row`, `col`.
    #[inline]
    #[must_use]
    pub const fn get(&self, row: usize, col: usize) -> f64 {
        self.cols[col][row]
    }

    /// Creates a pure translation.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation of `angle` degrees around the axis `(x, y, z)`.
    ///
    /// The axis is normalized first; a zero axis yields the identity.
    #[must_use]
    pub fn from_rotation(angle: f64, x: f64, y: f64, z: f64) -> Self {
        let axis = Vertex::new(x, y, z);
        if axis == Vertex::ZERO {
            return Self::IDENTITY;
        }
        let Vertex { x, y, z } = axis.normalize();
        let radians = angle.to_radians();
        let (s, c) = (radians.sin(), radians.cos());
        let t = 1.0 - c;
        Self {
            cols: [
                [t * x * x + c, t * x * y + s * z, t * x * z - s * y, 0.0],
                [t * x * y - s * z, t * y * y + c, t * y * z + s * x, 0.0],
                [t * x * z + s * y, t * y * z - s * x, t * z * z + c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation matrix from a quaternion.
    ///
    /// Non-unit quaternions are accounted for; a zero quaternion yields the
    /// identity.
    #[must_use]
    pub fn from_quaternion(q: &Quaternion) -> Self {
        let norm = q.w * q.w + q.x * q.x + q.y * q.y + q.z * q.z;
        let s = if norm > 0.0 { 2.0 / norm } else { 0.0 };

        let (xs, ys, zs) = (q.x * s, q.y * s, q.z * s);
        let (wx, wy, wz) = (q.w * xs, q.w * ys, q.w * zs);
        let (xx, xy, xz) = (q.x * xs, q.x * ys, q.x * zs);
        let (yy, yz, zz) = (q.y * ys, q.y * zs, q.z * zs);

        Self {
            cols: [
                [1.0 - (yy + zz), xy + wz, xz - wy, 0.0],
                [xy - wz, 1.0 - (xx + zz), yz + wx, 0.0],
                [xz + wy, yz - wx, 1.0 - (xx + yy), 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation matrix from Euler angles.
    #[must_use]
    pub fn from_euler(e: &Euler) -> Self {
        Self::from_rotation(e.heading, 0.0, 1.0, 0.0)
            * Self::from_rotation(e.pitch, 1.0, 0.0, 0.0)
            * Self::from_rotation(e.roll, 0.0, 0.0, 1.0)
    }

    /// Creates a perspective projection from the near-plane rectangle.
    #[must_use]
    pub fn frustum(left: f64, right: f64, bottom: f64, top: f64, z_near: f64, z_far: f64) -> Self {
        let x = (2.0 * z_near) / (right - left);
        let y = (2.0 * z_near) / (top - bottom);
        let a = (right + left) / (right - left);
        let b = (top + bottom) / (top - bottom);
        let c = -(z_far + z_near) / (z_far - z_near);
        let d = -(2.0 * z_far * z_near) / (z_far - z_near);
        Self {
            cols: [
                [x, 0.0, 0.0, 0.0],
                [0.0, y, 0.0, 0.0],
                [a, b, c, -1.0],
                [0.0, 0.0, d, 0.0],
            ],
        }
    }

    /// Creates a perspective projection from a vertical field of view in
    /// degrees and an aspect ratio.
    #[must_use]
    pub fn perspective(fov_y: f64, aspect: f64, z_near: f64, z_far: f64) -> Self {
        let ymax = z_near * (fov_y * core::f64::consts::PI / 360.0).tan();
        Self::frustum(-ymax * aspect, ymax * aspect, -ymax, ymax, z_near, z_far)
    }

    /// Creates an orthographic projection.
    ///
    /// `(x_1, y_1)` is the top-left and `(x_2, y_2)` the bottom-right corner
    /// of the visible region, so `orthographic(0, 0, w, h, ..)` maps a
    /// top-left-origin pixel space onto normalized device coordinates.
    #[must_use]
    pub fn orthographic(x_1: f64, y_1: f64, x_2: f64, y_2: f64, z_near: f64, z_far: f64) -> Self {
        let (left, right, top, bottom) = (x_1, x_2, y_1, y_2);
        Self {
            cols: [
                [2.0 / (right - left), 0.0, 0.0, 0.0],
                [0.0, 2.0 / (top - bottom), 0.0, 0.0],
                [0.0, 0.0, -2.0 / (z_far - z_near), 0.0],
                [
                    -(right + left) / (right - left),
                    -(top + bottom) / (top - bottom),
                    -(z_far + z_near) / (z_far - z_near),
                    1.0,
                ],
            ],
        }
    }

    /// Creates the view matrix that, combined with
    /// [`perspective(fov_y, aspect, z_near, ..)`](Self::perspective), maps
    /// the `z = 0` plane one-to-one onto a `width_2d × height_2d` pixel grid
    /// with a top-left origin. The plane sits `z_2d` units in front of the
    /// eye.
    #[must_use]
    pub fn view_2d_in_perspective(
        fov_y: f64,
        aspect: f64,
        z_near: f64,
        z_2d: f64,
        width_2d: f64,
        height_2d: f64,
    ) -> Self {
        let top = z_near * (fov_y * core::f64::consts::PI / 360.0).tan();
        let left = -top * aspect;
        let right = top * aspect;
        let bottom = -top;

        let left_2d = left / z_near * z_2d;
        let right_2d = right / z_near * z_2d;
        let bottom_2d = bottom / z_near * z_2d;
        let top_2d = top / z_near * z_2d;

        let width_scale = (right_2d - left_2d) / width_2d;
        let height_scale = (top_2d - bottom_2d) / height_2d;

        let mut m = Self::from_translation(left_2d, top_2d, -z_2d);
        m.scale(width_scale, -height_scale, width_scale);
        m
    }

    // -- In-place composition (post-multiplication) --

    /// Applies a translation in local space.
    #[inline]
    pub fn translate(&mut self, x: f64, y: f64, z: f64) {
        *self = *self * Self::from_translation(x, y, z);
    }

    /// Applies a rotation of `angle` degrees around `(x, y, z)`.
    #[inline]
    pub fn rotate(&mut self, angle: f64, x: f64, y: f64, z: f64) {
        *self = *self * Self::from_rotation(angle, x, y, z);
    }

    /// Applies a quaternion rotation.
    #[inline]
    pub fn rotate_quaternion(&mut self, q: &Quaternion) {
        *self = *self * Self::from_quaternion(q);
    }

    /// Applies an Euler rotation.
    #[inline]
    pub fn rotate_euler(&mut self, e: &Euler) {
        *self = *self * Self::from_euler(e);
    }

    /// Applies a non-uniform scale.
    #[inline]
    pub fn scale(&mut self, sx: f64, sy: f64, sz: f64) {
        *self = *self * Self::from_scale(sx, sy, sz);
    }

    /// Post-multiplies by `rhs`.
    #[inline]
    pub fn multiply(&mut self, rhs: &Self) {
        *self = *self * *rhs;
    }

    // -- Queries --

    /// Transforms a homogeneous point `[x, y, z, w]`.
    #[must_use]
    pub fn transform_point(&self, p: [f64; 4]) -> [f64; 4] {
        let c = &self.cols;
        let mut out = [0.0_f64; 4];
        for (row, o) in out.iter_mut().enumerate() {
            *o = c[0][row] * p[0] + c[1][row] * p[1] + c[2][row] * p[2] + c[3][row] * p[3];
        }
        out
    }

    /// Transforms a vertex as the point `(x, y, z, 1)`, discarding `w`.
    #[inline]
    #[must_use]
    pub fn transform_vertex(&self, v: Vertex) -> Vertex {
        let [x, y, z, _] = self.transform_point([v.x, v.y, v.z, 1.0]);
        Vertex::new(x, y, z)
    }

    /// Transforms `(x, y, z, 1)` and divides by the resulting `w`.
    #[must_use]
    pub fn project_vertex(&self, v: Vertex) -> Vertex {
        let [x, y, z, w] = self.transform_point([v.x, v.y, v.z, 1.0]);
        Vertex::new(x / w, y / w, z / w)
    }

    /// Returns the inverse, or `None` if the matrix is singular.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        // Gauss-Jordan elimination on rows, with partial pivoting.
        let mut a = [[0.0_f64; 4]; 4];
        let mut inv = [[0.0_f64; 4]; 4];
        for r in 0..4 {
            for c in 0..4 {
                a[r][c] = self.cols[c][r];
            }
            inv[r][r] = 1.0;
        }

        for col in 0..4 {
            let mut pivot = col;
            for r in (col + 1)..4 {
                if a[r][col].abs() > a[pivot][col].abs() {
                    pivot = r;
                }
            }
            let p = a[pivot][col];
            if p.abs() < 1e-12 || !p.is_finite() {
                return None;
            }
            a.swap(col, pivot);
            inv.swap(col, pivot);

            for c in 0..4 {
                a[col][c] /= p;
                inv[col][c] /= p;
            }
            for r in 0..4 {
                if r == col {
                    continue;
                }
                let f = a[r][col];
                if f == 0.0 {
                    continue;
                }
                for c in 0..4 {
                    let (ac, ic) = (a[col][c], inv[col][c]);
                    a[r][c] -= f * ac;
                    inv[r][c] -= f * ic;
                }
            }
        }

        let mut out = Self::IDENTITY;
        for r in 0..4 {
            for c in 0..4 {
                out.cols[c][r] = inv[r][c];
            }
        }
        Some(out)
    }

    /// Returns `true` if this is exactly the identity.
    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Returns `true` if any of the six off-diagonal terms of the upper 3×3
    /// block is non-zero.
    ///
    /// A matrix without rotation or shear keeps axis-aligned rectangles
    /// axis-aligned.
    #[must_use]
    pub fn has_rotation_or_shear(&self) -> bool {
        let c = &self.cols;
        c[0][1] != 0.0
            || c[0][2] != 0.0
            || c[1][0] != 0.0
            || c[1][2] != 0.0
            || c[2][0] != 0.0
            || c[2][1] != 0.0
    }

    /// Returns `true` if every element is within `eps` of `other`'s.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        self.cols
            .iter()
            .flatten()
            .zip(other.cols.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= eps)
    }

    /// Is every element [finite](f64::is_finite)?
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for Matrix {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        let mut j = 0;
        while j < 4 {
            let mut i = 0;
            while i < 4 {
                out[j][i] =
                    a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
                i += 1;
            }
            j += 1;
        }
        Self { cols: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_vertex_eq(a: Vertex, b: Vertex) {
        assert!(
            (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6 && (a.z - b.z).abs() < 1e-6,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn identity_multiply() {
        let t = Matrix::from_translation(1.0, 2.0, 3.0);
        assert_eq!(Matrix::IDENTITY * t, t);
        assert_eq!(t * Matrix::IDENTITY, t);
        assert_eq!(Matrix::default(), Matrix::IDENTITY);
    }

    #[test]
    fn translate_is_local() {
        let mut m = Matrix::from_scale(2.0, 2.0, 2.0);
        m.translate(3.0, 4.0, 0.0);
        // Translation happens before scaling, so it is doubled.
        assert_eq!(m.col(3), [6.0, 8.0, 0.0, 1.0]);
    }

    #[test]
    fn rotate_ninety_about_z() {
        let r = Matrix::from_rotation(90.0, 0.0, 0.0, 1.0);
        assert_vertex_eq(
            r.transform_vertex(Vertex::new(1.0, 0.0, 0.0)),
            Vertex::new(0.0, 1.0, 0.0),
        );
    }

    #[test]
    fn rotate_normalizes_axis() {
        let a = Matrix::from_rotation(30.0, 0.0, 0.0, 5.0);
        let b = Matrix::from_rotation(30.0, 0.0, 0.0, 1.0);
        assert!(a.approx_eq(&b, EPS));
    }

    #[test]
    fn quaternion_matches_axis_angle() {
        let q = Quaternion::from_angle_axis(40.0, 1.0, 2.0, 3.0);
        let a = Matrix::from_quaternion(&q);
        let b = Matrix::from_rotation(40.0, 1.0, 2.0, 3.0);
        assert!(a.approx_eq(&b, EPS));
        assert!(Matrix::from_quaternion(&Quaternion::IDENTITY).approx_eq(&Matrix::IDENTITY, EPS));
    }

    #[test]
    fn euler_applies_roll_first() {
        let m = Matrix::from_euler(&Euler::new(90.0, 0.0, 90.0));
        // Roll maps +X to +Y, heading leaves +Y alone.
        assert_vertex_eq(
            m.transform_vertex(Vertex::new(1.0, 0.0, 0.0)),
            Vertex::new(0.0, 1.0, 0.0),
        );
        // Roll maps +Y to -X, heading (about Y) maps -X to +Z.
        assert_vertex_eq(
            m.transform_vertex(Vertex::new(0.0, 1.0, 0.0)),
            Vertex::new(0.0, 0.0, 1.0),
        );
    }

    #[test]
    fn inverse_round_trip() {
        let mut m = Matrix::from_translation(10.0, -4.0, 2.0);
        m.rotate(33.0, 0.3, 1.0, 0.2);
        m.scale(2.0, 0.5, 3.0);
        let inv = m.inverse().expect("invertible");
        assert!((m * inv).approx_eq(&Matrix::IDENTITY, EPS));
        assert!((inv * m).approx_eq(&Matrix::IDENTITY, EPS));

        let p = Matrix::perspective(60.0, 1.5, 0.1, 100.0);
        let pinv = p.inverse().expect("projection is invertible");
        assert!((p * pinv).approx_eq(&Matrix::IDENTITY, 1e-6));
    }

    #[test]
    fn singular_has_no_inverse() {
        assert!(Matrix::from_scale(1.0, 0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn orthographic_maps_pixel_corners() {
        let p = Matrix::orthographic(0.0, 0.0, 800.0, 600.0, -1.0, 1.0);
        assert_vertex_eq(
            p.project_vertex(Vertex::new(0.0, 0.0, 0.0)),
            Vertex::new(-1.0, 1.0, 0.0),
        );
        assert_vertex_eq(
            p.project_vertex(Vertex::new(800.0, 600.0, 0.0)),
            Vertex::new(1.0, -1.0, 0.0),
        );
    }

    #[test]
    fn view_2d_maps_plane_to_pixels() {
        let (w, h) = (640.0, 480.0);
        let fov = 60.0;
        let z_2d = 0.5 / (fov * core::f64::consts::PI / 360.0).tan();
        let projection = Matrix::perspective(fov, w / h, 0.1, 100.0);
        let view = Matrix::view_2d_in_perspective(fov, w / h, 0.1, z_2d, w, h);
        let pv = projection * view;

        let tl = pv.project_vertex(Vertex::new(0.0, 0.0, 0.0));
        let br = pv.project_vertex(Vertex::new(w, h, 0.0));
        assert_vertex_eq(Vertex::new(tl.x, tl.y, 0.0), Vertex::new(-1.0, 1.0, 0.0));
        assert_vertex_eq(Vertex::new(br.x, br.y, 0.0), Vertex::new(1.0, -1.0, 0.0));
    }

    #[test]
    fn rotation_or_shear_detection() {
        assert!(!Matrix::IDENTITY.has_rotation_or_shear());
        let mut m = Matrix::from_translation(5.0, 5.0, 0.0);
        m.scale(2.0, 3.0, 1.0);
        assert!(!m.has_rotation_or_shear());
        m.rotate(45.0, 0.0, 0.0, 1.0);
        assert!(m.has_rotation_or_shear());
    }

    #[test]
    fn nan_is_not_finite() {
        let mut m = Matrix::IDENTITY;
        assert!(m.is_finite());
        m.cols[2][1] = f64::NAN;
        assert!(!m.is_finite());
    }
}
