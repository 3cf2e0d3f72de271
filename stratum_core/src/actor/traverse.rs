// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{ActorId, INVALID};
use super::store::ActorStore;

/// An iterator over the direct children of an actor, in paint order.
///
/// Created by [`ActorStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a ActorStore,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a ActorStore, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = ActorId;

    fn next(&mut self) -> Option<ActorId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(self.store.id_at(idx))
    }
}

/// An iterator from an actor's parent up to its root.
///
/// Created by [`ActorStore::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    store: &'a ActorStore,
    current: u32,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(store: &'a ActorStore, start: u32) -> Self {
        Self {
            store,
            current: store.parent[start as usize],
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = ActorId;

    fn next(&mut self) -> Option<ActorId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.parent[idx as usize];
        Some(self.store.id_at(idx))
    }
}
