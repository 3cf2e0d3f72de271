// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Actor tree data model.
//!
//! An *actor* is a node in the scene graph. Each actor has:
//!
//! - An identity ([`ActorId`]), a generational handle that becomes stale
//!   when the actor is destroyed.
//! - Topology: parent, first-child, and sibling links forming an ordered
//!   tree. Later siblings paint above earlier ones.
//! - **Local properties** set by the caller:
//!   [`transform`](ActorStore::set_transform),
//!   [`allocation`](ActorStore::set_allocation),
//!   [`flags`](ActorStore::set_flags), and the
//!   [paint volume source](ActorStore::set_paint_volume_source).
//! - **Computed properties** produced by [`evaluate`](ActorStore::evaluate):
//!   the world transform, effective hidden state, and the aggregate
//!   [`PaintVolume`](crate::paint_volume::PaintVolume) covering the actor
//!   and its visible descendants.
//!
//! # Dirty tracking
//!
//! Property mutations automatically mark the corresponding dirty channel
//! (see [`dirty`](crate::dirty)):
//!
//! - **TRANSFORM** propagates to all descendants.
//! - **PAINT_VOLUME** propagates to all ancestors.
//! - **CONTENT** is local-only.
//! - **TOPOLOGY** triggers a traversal-order rebuild.
//!
//! # Culling
//!
//! After evaluation, [`ActorStore::cull`] tests each aggregate volume
//! against the stage frustum and returns a [`CullReport`] listing the actors
//! worth painting.

mod evaluate;
mod id;
mod store;
mod traverse;
mod visibility;
mod volume;

pub use evaluate::FrameChanges;
pub use id::{ActorId, INVALID};
pub use store::{ActorFlags, ActorStore};
pub use traverse::{Ancestors, Children};
pub use visibility::CullReport;
pub use volume::{AllocationVolume, CustomVolume, GroupVolume, PaintVolumeProvider};
