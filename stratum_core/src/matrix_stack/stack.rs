// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Push/pop transform stack over a [`MatrixEntry`] chain.

use alloc::borrow::Cow;

use super::entry::{MatrixEntry, MatrixOp};
use crate::matrix::{Euler, Matrix, Quaternion};

/// A save/restore transform stack.
///
/// The stack only holds the current top [`MatrixEntry`]. Every mutation
/// appends one node; nothing is recomputed until [`get`](Self::get) is
/// called. Entries handed out by [`entry`](Self::entry) keep their history
/// alive independently of the stack.
#[derive(Clone, Debug, Default)]
pub struct MatrixStack {
    top: MatrixEntry,
}

impl MatrixStack {
    /// Creates a stack whose current value is the identity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            top: MatrixEntry::identity(),
        }
    }

    /// Creates a stack on top of an existing chain.
    #[must_use]
    pub fn from_entry(entry: MatrixEntry) -> Self {
        Self { top: entry }
    }

    /// Returns a shared handle to the current top of the chain.
    #[must_use]
    pub fn entry(&self) -> MatrixEntry {
        self.top.clone()
    }

    /// Borrows the current top of the chain.
    #[inline]
    #[must_use]
    pub fn top(&self) -> &MatrixEntry {
        &self.top
    }

    fn push_op(&mut self, op: MatrixOp) {
        self.top = self.top.then(op);
    }

    /// Appends a terminal operation after dropping the chain back to the most
    /// recent save marker (or the root), so repeated loads without matching
    /// pushes do not grow the chain.
    fn push_replacement(&mut self, op: MatrixOp) {
        let mut base = &self.top;
        while *base.op() != MatrixOp::Save {
            match base.parent() {
                Some(p) => base = p,
                None => break,
            }
        }
        self.top = base.then(op);
    }

    /// Saves the current value so that a later [`pop`](Self::pop) restores
    /// it.
    pub fn push(&mut self) {
        self.push_op(MatrixOp::Save);
    }

    /// Restores the value saved by the matching [`push`](Self::push).
    ///
    /// # Panics
    ///
    /// Panics if there is no outstanding push.
    pub fn pop(&mut self) {
        let mut save = &self.top;
        while *save.op() != MatrixOp::Save {
            match save.parent() {
                Some(p) => save = p,
                None => panic!("matrix stack pop without matching push"),
            }
        }
        let Some(restored) = save.parent().cloned() else {
            panic!("matrix stack save marker has no parent");
        };
        self.top = restored;
    }

    /// Replaces the current value with the identity.
    pub fn load_identity(&mut self) {
        self.push_replacement(MatrixOp::LoadIdentity);
    }

    /// Replaces the current value with `matrix`.
    pub fn load(&mut self, matrix: &Matrix) {
        self.push_replacement(MatrixOp::Load(*matrix));
    }

    /// Alias of [`load`](Self::load).
    pub fn set(&mut self, matrix: &Matrix) {
        self.load(matrix);
    }

    /// Appends a translation.
    pub fn translate(&mut self, x: f64, y: f64, z: f64) {
        self.push_op(MatrixOp::Translate { x, y, z });
    }

    /// Appends a rotation of `angle` degrees around `(x, y, z)`.
    pub fn rotate(&mut self, angle: f64, x: f64, y: f64, z: f64) {
        self.push_op(MatrixOp::Rotate { angle, x, y, z });
    }

    /// Appends a quaternion rotation.
    pub fn rotate_quaternion(&mut self, q: &Quaternion) {
        self.push_op(MatrixOp::RotateQuaternion(*q));
    }

    /// Appends an Euler rotation.
    pub fn rotate_euler(&mut self, e: &Euler) {
        self.push_op(MatrixOp::RotateEuler(*e));
    }

    /// Appends a non-uniform scale.
    pub fn scale(&mut self, x: f64, y: f64, z: f64) {
        self.push_op(MatrixOp::Scale { x, y, z });
    }

    /// Appends a post-multiplication by `matrix`.
    pub fn multiply(&mut self, matrix: &Matrix) {
        self.push_op(MatrixOp::Multiply(*matrix));
    }

    /// Multiplies by a perspective frustum.
    pub fn frustum(
        &mut self,
        left: f64,
        right: f64,
        bottom: f64,
        top: f64,
        z_near: f64,
        z_far: f64,
    ) {
        self.multiply(&Matrix::frustum(left, right, bottom, top, z_near, z_far));
    }

    /// Multiplies by a perspective projection.
    pub fn perspective(&mut self, fov_y: f64, aspect: f64, z_near: f64, z_far: f64) {
        self.multiply(&Matrix::perspective(fov_y, aspect, z_near, z_far));
    }

    /// Multiplies by an orthographic projection.
    pub fn orthographic(&mut self, x_1: f64, y_1: f64, x_2: f64, y_2: f64, near: f64, far: f64) {
        self.multiply(&Matrix::orthographic(x_1, y_1, x_2, y_2, near, far));
    }

    /// Resolves the current value.
    #[must_use]
    pub fn get(&self) -> Matrix {
        self.top.get()
    }

    /// Resolves the current value without copying when possible.
    #[must_use]
    pub fn matrix(&self) -> Cow<'_, Matrix> {
        self.top.matrix()
    }

    /// Resolves the inverse of the current value.
    #[must_use]
    pub fn get_inverse(&self) -> Option<Matrix> {
        self.top.matrix().inverse()
    }
}
