// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazily evaluated transform history.
//!
//! A [`MatrixEntry`] is an immutable node in a singly linked, reference
//! counted chain of transform operations. A [`MatrixStack`] is a mutable
//! handle that always points at the newest node:
//!
//! ```text
//!   LoadIdentity ─► Translate ─► Save ─► Rotate ─► Scale   ◄── stack top
//!                                  │
//!                                  └──► Translate          ◄── entry kept by
//!                                                              a clip node
//! ```
//!
//! - **Appending** (`translate`, `rotate`, `scale`, `multiply`, ...) is O(1)
//!   and never computes a matrix.
//! - **Push** appends a [`Save`](MatrixOp::Save) marker; **pop** moves the
//!   top back to the marker's parent.
//! - **Load** and **load-identity** first drop the chain back to the most
//!   recent save marker, so per-primitive "reset then transform" code does
//!   not grow the chain without bound.
//! - **Resolving** walks back to the nearest terminal node (load,
//!   load-identity, or an already resolved save marker) and replays the
//!   operations in between. Save markers cache their value on first use, so
//!   they bound the replay distance for everything pushed above them.
//!
//! Branches share their common prefix physically: many subtrees can hang
//! off one camera or projection chain without copying it.

mod entry;
mod stack;

pub use entry::{MatrixEntry, MatrixOp};
pub use stack::MatrixStack;
