// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The actor tree uses multi-channel dirty tracking (via [`understory_dirty`])
//! to propagate invalidation. Each channel is an independent category of
//! change.
//!
//! # Propagation semantics
//!
//! - **Down the tree**: [`TRANSFORM`] has dependency edges from child to
//!   parent and is marked with [`EagerPolicy`](understory_dirty::EagerPolicy),
//!   so marking an actor marks its whole subtree. World transforms and
//!   effective hidden state are inherited. Hidden-flag changes are routed
//!   through [`TRANSFORM`] so one drain recomputes both.
//!
//! - **Up the tree**: [`PAINT_VOLUME`] has dependency edges from parent to
//!   child, so marking an actor eagerly marks its ancestors. A container's
//!   paint volume is the union of its children's, so any change below it
//!   invalidates it.
//!
//! - **Local-only**: [`CONTENT`] is marked with the default policy. It
//!   records actors whose own painting changed (allocation, volume source,
//!   or an explicit redraw request) for redraw damage.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on topology mutations. It
//!   triggers a traversal-order rebuild during evaluation.
//!
//! # Consumption
//!
//! Callers never query dirty state directly. Each
//! [`ActorStore::evaluate`](crate::actor::ActorStore::evaluate) call drains
//! every channel and reports the results as
//! [`FrameChanges`](crate::actor::FrameChanges).

use understory_dirty::Channel;

/// Transform, allocation origin, or hidden flag changed. Requires world
/// transform and effective hidden recomputation for descendants.
pub const TRANSFORM: Channel = Channel::new(0);

/// Something inside the actor's subtree that bounds its painting changed.
/// Requires paint volume recomputation for ancestors.
pub const PAINT_VOLUME: Channel = Channel::new(1);

/// The actor's own painting changed. No propagation.
pub const CONTENT: Channel = Channel::new(2);

/// Tree topology changed. Triggers a traversal order rebuild.
pub const TOPOLOGY: Channel = Channel::new(3);
