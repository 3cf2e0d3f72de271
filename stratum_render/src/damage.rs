// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Redraw damage from stage paint boxes.

use alloc::vec::Vec;

use kurbo::Rect;
use stratum_core::actor::{ActorStore, FrameChanges};
use stratum_core::stage::StageView;
#[cfg(feature = "trace-rich")]
use stratum_core::trace::PaintBoxEvent;
use stratum_core::trace::Tracer;

/// A region of the stage that needs redrawing.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DamageRegion {
    /// The entire stage needs redrawing.
    #[default]
    Full,
    /// Window-space rectangles that need redrawing.
    Rects(Vec<Rect>),
    /// Nothing changed; the previous frame can be reused.
    None,
}

impl DamageRegion {
    /// Returns `true` if no region needs redrawing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        match (&*self, other) {
            (Self::Full, _) | (_, Self::Full) => *self = Self::Full,
            (Self::None, _) => *self = other.clone(),
            (_, Self::None) => {}
            (Self::Rects(a), Self::Rects(b)) => {
                let mut merged = a.clone();
                merged.extend_from_slice(b);
                *self = Self::Rects(merged);
            }
        }
    }

    /// A single rectangle covering the damage, suitable as the clip of a
    /// redraw pass. `None` means no clip (the whole stage) for
    /// [`Full`](Self::Full), or nothing to draw for [`None`](Self::None).
    #[must_use]
    pub fn bounding_rect(&self) -> Option<Rect> {
        match self {
            Self::Rects(rects) => rects.iter().copied().reduce(|a, b| a.union(b)),
            Self::Full | Self::None => None,
        }
    }
}

/// Turns frame changes into redraw damage.
///
/// Remembers the stage paint box every actor was last drawn with, so a
/// moved or resized actor damages both where it was and where it is now.
#[derive(Clone, Debug, Default)]
pub struct DamageTracker {
    boxes: Vec<Option<Rect>>,
    primed: bool,
}

impl DamageTracker {
    /// Creates a tracker whose first update reports full damage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every remembered box; the next update reports full damage.
    pub fn reset(&mut self) {
        self.boxes.clear();
        self.primed = false;
    }

    /// Returns the last paint box recorded for slot `idx`.
    #[must_use]
    pub fn paint_box_at(&self, idx: u32) -> Option<Rect> {
        self.boxes.get(idx as usize).copied().flatten()
    }

    /// Computes the damage of one frame.
    ///
    /// `changes` must come from the evaluation that brought `store` to its
    /// current state.
    pub fn update(
        &mut self,
        store: &ActorStore,
        changes: &FrameChanges,
        stage: &StageView,
    ) -> DamageRegion {
        self.update_traced(store, changes, stage, &mut Tracer::none())
    }

    /// Like [`update`](Self::update), reporting every recomputed box to
    /// `tracer`.
    pub fn update_traced(
        &mut self,
        store: &ActorStore,
        changes: &FrameChanges,
        stage: &StageView,
        tracer: &mut Tracer<'_>,
    ) -> DamageRegion {
        if !self.primed {
            self.boxes.clear();
            for &idx in store.traversal_order() {
                let _ = self.refresh(store, idx, stage, tracer);
            }
            self.primed = true;
            return DamageRegion::Full;
        }

        let mut touched: Vec<u32> = changes
            .transforms
            .iter()
            .chain(&changes.content)
            .chain(&changes.hidden)
            .chain(&changes.unhidden)
            .chain(&changes.added)
            .chain(&changes.removed)
            .copied()
            .collect();
        touched.sort_unstable();
        touched.dedup();

        let mut full = false;
        let mut rects = Vec::new();
        for idx in touched {
            let old = self.paint_box_at(idx);
            full |= !self.refresh(store, idx, stage, tracer);
            let new = self.paint_box_at(idx).filter(|n| Some(*n) != old);
            rects.extend(old.into_iter().chain(new).filter(|r| r.area() > 0.0));
        }

        if full {
            DamageRegion::Full
        } else if rects.is_empty() {
            DamageRegion::None
        } else {
            DamageRegion::Rects(rects)
        }
    }

    /// Recomputes the box of slot `idx`. Returns `false` if the actor is
    /// visible but has no paint volume.
    fn refresh(
        &mut self,
        store: &ActorStore,
        idx: u32,
        stage: &StageView,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        let slot = idx as usize;
        if self.boxes.len() <= slot {
            self.boxes.resize(slot + 1, None);
        }

        let painted = store.is_alive_at(idx) && !store.effective_hidden_at(idx);
        if !painted {
            self.boxes[slot] = None;
            return true;
        }

        let paint_box = store.stage_paint_box_at(idx, stage);
        #[cfg(feature = "trace-rich")]
        if let Some(rect) = paint_box {
            tracer.paint_box(&PaintBoxEvent {
                actor_index: idx,
                rect,
            });
        }
        #[cfg(not(feature = "trace-rich"))]
        {
            _ = tracer;
        }
        self.boxes[slot] = paint_box;
        paint_box.is_some()
    }
}
