// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Actor identity.

use core::fmt;

/// Sentinel value meaning "no actor" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to an actor in an [`ActorStore`](super::ActorStore).
///
/// Holds a slot index and a generation counter, so a handle kept past
/// [`destroy_actor`](super::ActorStore::destroy_actor) is detected even after
/// the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl ActorId {
    /// Returns the raw slot index, as used in
    /// [`FrameChanges`](super::FrameChanges) and the `*_at` accessors.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({}@gen{})", self.idx, self.generation)
    }
}
