// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persistent, reference-counted operation chain.

use alloc::borrow::Cow;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::OnceCell;
use core::fmt;

use crate::geometry::Vertex;
use crate::matrix::{Euler, Matrix, Quaternion};

/// One transform operation recorded in a [`MatrixEntry`] chain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MatrixOp {
    /// Resets to the identity. Terminal.
    LoadIdentity,
    /// Translation.
    Translate {
        /// X offset.
        x: f64,
        /// Y offset.
        y: f64,
        /// Z offset.
        z: f64,
    },
    /// Rotation of `angle` degrees around `(x, y, z)`.
    Rotate {
        /// Angle in degrees.
        angle: f64,
        /// Axis X.
        x: f64,
        /// Axis Y.
        y: f64,
        /// Axis Z.
        z: f64,
    },
    /// Rotation by a quaternion.
    RotateQuaternion(Quaternion),
    /// Rotation by Euler angles.
    RotateEuler(Euler),
    /// Non-uniform scale.
    Scale {
        /// X factor.
        x: f64,
        /// Y factor.
        y: f64,
        /// Z factor.
        z: f64,
    },
    /// Post-multiplication by an arbitrary matrix.
    Multiply(Matrix),
    /// Replaces the value with a concrete matrix. Terminal.
    Load(Matrix),
    /// Save marker left by [`MatrixStack::push`](super::MatrixStack::push).
    ///
    /// The composed value is cached the first time it is resolved, after
    /// which the marker is also terminal.
    Save,
}

impl MatrixOp {
    /// Applies a non-terminal operation to `m`.
    fn apply(&self, m: &mut Matrix) {
        match self {
            Self::Translate { x, y, z } => m.translate(*x, *y, *z),
            Self::Rotate { angle, x, y, z } => m.rotate(*angle, *x, *y, *z),
            Self::RotateQuaternion(q) => m.rotate_quaternion(q),
            Self::RotateEuler(e) => m.rotate_euler(e),
            Self::Scale { x, y, z } => m.scale(*x, *y, *z),
            Self::Multiply(rhs) => m.multiply(rhs),
            Self::LoadIdentity => *m = Matrix::IDENTITY,
            Self::Load(rhs) => *m = *rhs,
            Self::Save => {}
        }
    }
}

struct Node {
    op: MatrixOp,
    parent: Option<MatrixEntry>,
    /// Composed value at a save marker, filled on first resolution.
    cache: OnceCell<Matrix>,
}

impl Drop for Node {
    fn drop(&mut self) {
        // Release uniquely owned ancestors in a loop so that dropping a long
        // chain does not recurse once per node.
        let mut parent = self.parent.take();
        while let Some(entry) = parent {
            match Rc::try_unwrap(entry.0) {
                Ok(mut node) => parent = node.parent.take(),
                Err(_) => break,
            }
        }
    }
}

/// An immutable node in a persistent chain of transform operations.
///
/// Cloning an entry is cheap and shares the chain. Entries never change
/// after creation, so a value obtained from [`get`](Self::get) stays valid
/// for as long as the entry is alive.
#[derive(Clone)]
pub struct MatrixEntry(Rc<Node>);

impl fmt::Debug for MatrixEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixEntry")
            .field("op", &self.0.op)
            .field("depth", &self.depth())
            .finish()
    }
}

impl Default for MatrixEntry {
    fn default() -> Self {
        Self::identity()
    }
}

impl MatrixEntry {
    /// Creates a root entry holding the identity.
    #[must_use]
    pub fn identity() -> Self {
        Self::with_parent(MatrixOp::LoadIdentity, None)
    }

    /// Creates a root entry holding `matrix`.
    #[must_use]
    pub fn from_matrix(matrix: Matrix) -> Self {
        Self::with_parent(MatrixOp::Load(matrix), None)
    }

    pub(crate) fn with_parent(op: MatrixOp, parent: Option<Self>) -> Self {
        Self(Rc::new(Node {
            op,
            parent,
            cache: OnceCell::new(),
        }))
    }

    /// Returns a new entry that applies `op` after this one.
    #[must_use]
    pub fn then(&self, op: MatrixOp) -> Self {
        Self::with_parent(op, Some(self.clone()))
    }

    /// The operation recorded at this node.
    #[inline]
    #[must_use]
    pub fn op(&self) -> &MatrixOp {
        &self.0.op
    }

    /// The previous node in the chain.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.0.parent.as_ref()
    }

    /// Returns `true` if both handles refer to the same node.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of ancestors of this node.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cur = self.parent();
        while let Some(e) = cur {
            depth += 1;
            cur = e.parent();
        }
        depth
    }

    /// Returns the chain's operations, root first.
    #[must_use]
    pub fn operations(&self) -> Vec<MatrixOp> {
        let mut ops: Vec<MatrixOp> = self.ancestors().map(|e| *e.op()).collect();
        ops.reverse();
        ops
    }

    /// Iterates from this entry towards the root, starting with `self`.
    pub fn ancestors(&self) -> impl Iterator<Item = &Self> {
        core::iter::successors(Some(self), |e| e.parent())
    }

    /// Resolves the composed matrix.
    #[must_use]
    pub fn get(&self) -> Matrix {
        self.matrix().into_owned()
    }

    /// Resolves the composed matrix, borrowing it when this node already
    /// stores a concrete value.
    ///
    /// Only the operations between this node and the nearest terminal node
    /// (load, load-identity, or a save marker with a cached value) are
    /// replayed. Save markers passed on the way cache their value.
    #[must_use]
    pub fn matrix(&self) -> Cow<'_, Matrix> {
        let mut pending: Vec<&Node> = Vec::new();
        let mut node: &Node = &self.0;
        let base: &Matrix = loop {
            match &node.op {
                MatrixOp::LoadIdentity => break &Matrix::IDENTITY,
                MatrixOp::Load(m) => break m,
                MatrixOp::Save => {
                    if let Some(m) = node.cache.get() {
                        break m;
                    }
                }
                _ => {}
            }
            pending.push(node);
            match &node.parent {
                Some(p) => node = &p.0,
                None => break &Matrix::IDENTITY,
            }
        };

        if pending.is_empty() {
            return Cow::Borrowed(base);
        }

        let mut m = *base;
        for node in pending.iter().rev() {
            if node.op == MatrixOp::Save {
                let _ = node.cache.set(m);
            } else {
                node.op.apply(&mut m);
            }
        }
        Cow::Owned(m)
    }

    /// Returns `true` if the chain resolves to the identity by construction
    /// (a load-identity node, possibly behind save markers).
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.skip_saves().0.op == MatrixOp::LoadIdentity
    }

    /// Structural equality.
    ///
    /// Save markers are ignored. Chains that reach a shared node compare
    /// equal; otherwise nodes are compared pairwise by operation and operands
    /// until a load or load-identity ends the comparison. Two chains may
    /// resolve to the same matrix and still compare unequal.
    #[must_use]
    pub fn equal(&self, other: &Self) -> bool {
        let mut a = Some(self);
        let mut b = Some(other);
        while let (Some(ea), Some(eb)) = (a, b) {
            let ea = ea.skip_saves();
            let eb = eb.skip_saves();
            if ea.ptr_eq(eb) {
                return true;
            }
            match (ea.op(), eb.op()) {
                (MatrixOp::LoadIdentity, MatrixOp::LoadIdentity) => return true,
                (MatrixOp::Load(ma), MatrixOp::Load(mb)) => return ma == mb,
                (oa, ob) if oa == ob => {}
                _ => return false,
            }
            a = ea.parent();
            b = eb.parent();
        }
        false
    }

    /// Computes the translation `t` such that `other` equals `self` followed
    /// by a translation by `t`.
    ///
    /// Returns `None` unless both chains consist only of translations and
    /// save markers after their closest shared node.
    #[must_use]
    pub fn calculate_translation(&self, other: &Self) -> Option<Vertex> {
        let mut chain0: Vec<&Self> = self.ancestors().collect();
        let mut chain1: Vec<&Self> = other.ancestors().collect();
        chain0.reverse();
        chain1.reverse();

        let common = chain0
            .iter()
            .zip(chain1.iter())
            .take_while(|(a, b)| a.ptr_eq(b))
            .count();

        let mut delta = Vertex::ZERO;
        for e in &chain0[common..] {
            match e.op() {
                MatrixOp::Translate { x, y, z } => delta = delta - Vertex::new(*x, *y, *z),
                MatrixOp::Save => {}
                _ => return None,
            }
        }
        for e in &chain1[common..] {
            match e.op() {
                MatrixOp::Translate { x, y, z } => delta = delta + Vertex::new(*x, *y, *z),
                MatrixOp::Save => {}
                _ => return None,
            }
        }
        Some(delta)
    }

    fn skip_saves(&self) -> &Self {
        let mut e = self;
        while e.0.op == MatrixOp::Save {
            match e.parent() {
                Some(p) => e = p,
                None => break,
            }
        }
        e
    }

    #[cfg(test)]
    pub(crate) fn has_cached_value(&self) -> bool {
        self.0.cache.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_resolves_without_copy() {
        let m = Matrix::from_translation(1.0, 2.0, 3.0);
        let e = MatrixEntry::from_matrix(m);
        assert!(matches!(e.matrix(), Cow::Borrowed(_)));
        assert_eq!(e.get(), m);
        assert!(matches!(MatrixEntry::identity().matrix(), Cow::Borrowed(_)));
    }

    #[test]
    fn replay_applies_in_order() {
        let e = MatrixEntry::identity()
            .then(MatrixOp::Translate {
                x: 10.0,
                y: 0.0,
                z: 0.0,
            })
            .then(MatrixOp::Scale {
                x: 2.0,
                y: 2.0,
                z: 1.0,
            });
        let mut expected = Matrix::from_translation(10.0, 0.0, 0.0);
        expected.scale(2.0, 2.0, 1.0);
        assert_eq!(e.get(), expected);
        assert!(matches!(e.matrix(), Cow::Owned(_)));
    }

    #[test]
    fn save_caches_on_first_resolution() {
        let save = MatrixEntry::identity()
            .then(MatrixOp::Translate {
                x: 1.0,
                y: 1.0,
                z: 0.0,
            })
            .then(MatrixOp::Save);
        let leaf = save.then(MatrixOp::Scale {
            x: 3.0,
            y: 3.0,
            z: 3.0,
        });
        assert!(!save.has_cached_value());
        let _ = leaf.get();
        assert!(save.has_cached_value());
        assert!(matches!(save.matrix(), Cow::Borrowed(_)));
        assert_eq!(save.get(), Matrix::from_translation(1.0, 1.0, 0.0));
    }

    #[test]
    fn equal_skips_saves_and_short_circuits_on_shared_node() {
        let base = MatrixEntry::identity().then(MatrixOp::Rotate {
            angle: 30.0,
            x: 0.0,
            y: 0.0,
            z: 1.0,
        });
        let a = base.then(MatrixOp::Save).then(MatrixOp::Translate {
            x: 1.0,
            y: 2.0,
            z: 0.0,
        });
        let b = base.then(MatrixOp::Translate {
            x: 1.0,
            y: 2.0,
            z: 0.0,
        });
        assert!(a.equal(&b));
        assert!(b.equal(&a));

        let c = base.then(MatrixOp::Translate {
            x: 1.0,
            y: 3.0,
            z: 0.0,
        });
        assert!(!a.equal(&c));
    }

    #[test]
    fn equal_stops_at_load() {
        let m = Matrix::from_scale(2.0, 2.0, 2.0);
        let a = MatrixEntry::identity()
            .then(MatrixOp::Translate {
                x: 5.0,
                y: 0.0,
                z: 0.0,
            })
            .then(MatrixOp::Load(m));
        let b = MatrixEntry::identity().then(MatrixOp::Load(m));
        assert!(a.equal(&b));
    }

    #[test]
    fn different_roots_with_load_identity_are_equal() {
        assert!(MatrixEntry::identity().equal(&MatrixEntry::identity()));
    }

    #[test]
    fn translation_between_siblings() {
        let base = MatrixEntry::identity().then(MatrixOp::Scale {
            x: 2.0,
            y: 2.0,
            z: 1.0,
        });
        let a = base.then(MatrixOp::Translate {
            x: 10.0,
            y: 5.0,
            z: 0.0,
        });
        let b = base.then(MatrixOp::Save).then(MatrixOp::Translate {
            x: 4.0,
            y: 8.0,
            z: 1.0,
        });
        let t = a.calculate_translation(&b).expect("pure translation");
        assert_eq!(t, Vertex::new(-6.0, 3.0, 1.0));
        assert_eq!(a.calculate_translation(&a), Some(Vertex::ZERO));
    }

    #[test]
    fn translation_fails_on_other_ops() {
        let base = MatrixEntry::identity();
        let a = base.then(MatrixOp::Translate {
            x: 1.0,
            y: 0.0,
            z: 0.0,
        });
        let b = base.then(MatrixOp::Rotate {
            angle: 10.0,
            x: 0.0,
            y: 0.0,
            z: 1.0,
        });
        assert!(a.calculate_translation(&b).is_none());
    }

    #[test]
    fn is_identity_looks_through_saves() {
        let e = MatrixEntry::identity().then(MatrixOp::Save).then(MatrixOp::Save);
        assert!(e.is_identity());
        let t = e.then(MatrixOp::Translate {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        });
        assert!(!t.is_identity());
    }

    #[test]
    fn operations_lists_root_first() {
        let e = MatrixEntry::identity().then(MatrixOp::Save).then(MatrixOp::Scale {
            x: 1.0,
            y: 2.0,
            z: 3.0,
        });
        let ops = e.operations();
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0], MatrixOp::LoadIdentity);
        assert_eq!(ops[1], MatrixOp::Save);
        assert_eq!(e.depth(), 2);
    }

    #[test]
    fn dropping_long_chain_does_not_overflow() {
        let mut e = MatrixEntry::identity();
        for _ in 0..200_000 {
            e = e.then(MatrixOp::Translate {
                x: 1.0,
                y: 0.0,
                z: 0.0,
            });
        }
        drop(e);
    }

    #[test]
    fn shared_prefix_survives_branch_drop() {
        let base = MatrixEntry::identity().then(MatrixOp::Translate {
            x: 7.0,
            y: 0.0,
            z: 0.0,
        });
        let branch = base.then(MatrixOp::Scale {
            x: 2.0,
            y: 2.0,
            z: 2.0,
        });
        drop(branch);
        assert_eq!(base.get(), Matrix::from_translation(7.0, 0.0, 0.0));
    }
}
