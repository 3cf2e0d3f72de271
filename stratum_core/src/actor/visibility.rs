// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frustum culling of the actor tree.
//!
//! Each visible actor's aggregate paint volume is moved to eye space and
//! tested against the side planes of the stage frustum. Because aggregate
//! volumes enclose the whole subtree, an actor found
//! [`Out`](CullResult::Out) prunes its descendants, and one found
//! [`In`](CullResult::In) passes that result down without further tests.

use alloc::vec::Vec;

use kurbo::Rect;

use super::store::ActorStore;
use crate::cull::CullResult;
use crate::stage::StageView;
#[cfg(feature = "trace-rich")]
use crate::trace::CullEvent;
use crate::trace::{CullSummaryEvent, Tracer};

/// Outcome of a cull pass.
#[derive(Clone, Debug, Default)]
pub struct CullReport {
    /// Per-slot decision. `None` for actors that were not visited: hidden
    /// ones, dead slots, and descendants of culled actors.
    pub results: Vec<Option<CullResult>>,
    /// Actors to paint, in paint order.
    pub visible: Vec<u32>,
    /// Roots of the subtrees rejected as entirely outside.
    pub culled: Vec<u32>,
}

impl CullReport {
    /// Clears the report for reuse.
    pub fn clear(&mut self) {
        self.results.clear();
        self.visible.clear();
        self.culled.clear();
    }

    /// Returns the decision for slot `idx`, if the actor was visited.
    #[must_use]
    pub fn result_at(&self, idx: u32) -> Option<CullResult> {
        self.results.get(idx as usize).copied().flatten()
    }

    /// Returns whether the actor at slot `idx` is to be painted.
    #[must_use]
    pub fn is_visible_at(&self, idx: u32) -> bool {
        self.result_at(idx).is_some_and(CullResult::is_visible)
    }
}

impl ActorStore {
    /// Culls the tree against the stage frustum, narrowed to `clip` (a
    /// window rectangle) when given.
    ///
    /// Only valid after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn cull(&self, stage: &StageView, clip: Option<Rect>) -> CullReport {
        let mut report = CullReport::default();
        self.cull_into(stage, clip, &mut report, &mut Tracer::none());
        report
    }

    /// Like [`cull`](Self::cull), but reuses a caller-provided report and
    /// reports to `tracer`.
    pub fn cull_into(
        &self,
        stage: &StageView,
        clip: Option<Rect>,
        report: &mut CullReport,
        tracer: &mut Tracer<'_>,
    ) {
        report.clear();
        report.results.resize(self.len as usize, None);
        let planes = stage.frustum_planes(clip);
        let mut summary = CullSummaryEvent::default();

        // Pre-order guarantees the parent's decision is known first.
        for &idx in &self.traversal_order {
            if self.effective_hidden[idx as usize] {
                continue;
            }
            let inherited = match self.parent_at(idx) {
                None => false,
                Some(p) => match report.results[p as usize] {
                    None | Some(CullResult::Out) => continue,
                    Some(r) => r == CullResult::In,
                },
            };

            let result = if inherited {
                CullResult::In
            } else if let Some(planes) = &planes {
                match self.eye_paint_volume_at(idx, stage) {
                    Some(volume) => volume.cull(planes),
                    None => {
                        summary.unbounded += 1;
                        CullResult::Partial
                    }
                }
            } else {
                CullResult::Partial
            };

            report.results[idx as usize] = Some(result);
            summary.visited += 1;
            match result {
                CullResult::In => summary.inside += 1,
                CullResult::Partial => summary.partial += 1,
                CullResult::Out => summary.culled += 1,
            }
            if result.is_visible() {
                report.visible.push(idx);
            } else {
                report.culled.push(idx);
            }

            #[cfg(feature = "trace-rich")]
            tracer.cull(&CullEvent {
                actor_index: idx,
                result,
                inherited,
            });
        }

        tracer.cull_summary(&summary);
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec;

    use super::*;
    use crate::actor::{ActorFlags, ActorId, GroupVolume};
    use crate::matrix::Matrix;

    fn stage() -> StageView {
        StageView::orthographic(800.0, 600.0)
    }

    fn actor(store: &mut ActorStore, r: Rect) -> ActorId {
        let id = store.create_actor();
        store.set_allocation(id, Some(r));
        id
    }

    #[test]
    fn offscreen_actor_is_culled() {
        let mut store = ActorStore::new();
        let on = actor(&mut store, Rect::new(10.0, 10.0, 50.0, 50.0));
        let off = actor(&mut store, Rect::new(900.0, 10.0, 950.0, 50.0));
        let edge = actor(&mut store, Rect::new(780.0, 10.0, 850.0, 50.0));
        let _ = store.evaluate();

        let report = store.cull(&stage(), None);
        assert_eq!(report.result_at(on.index()), Some(CullResult::In));
        assert_eq!(report.result_at(off.index()), Some(CullResult::Out));
        assert_eq!(report.result_at(edge.index()), Some(CullResult::Partial));
        assert_eq!(report.visible, vec![on.index(), edge.index()]);
        assert_eq!(report.culled, vec![off.index()]);
    }

    #[test]
    fn culled_parent_prunes_subtree() {
        let mut store = ActorStore::new();
        let parent = actor(&mut store, Rect::new(-500.0, 0.0, -400.0, 100.0));
        let child = actor(&mut store, Rect::new(0.0, 0.0, 10.0, 10.0));
        store.add_child(parent, child);
        let _ = store.evaluate();

        let report = store.cull(&stage(), None);
        assert_eq!(report.result_at(parent.index()), Some(CullResult::Out));
        assert_eq!(report.result_at(child.index()), None);
        assert!(report.visible.is_empty());
    }

    #[test]
    fn inside_parent_passes_result_down() {
        let mut store = ActorStore::new();
        let parent = actor(&mut store, Rect::new(0.0, 0.0, 100.0, 100.0));
        let child = actor(&mut store, Rect::new(10.0, 10.0, 20.0, 20.0));
        store.add_child(parent, child);
        let _ = store.evaluate();

        let report = store.cull(&stage(), None);
        assert_eq!(report.result_at(child.index()), Some(CullResult::In));
        assert_eq!(report.visible, vec![parent.index(), child.index()]);
    }

    #[test]
    fn unknown_volume_is_never_culled() {
        let mut store = ActorStore::new();
        let a = store.create_actor();
        store.set_transform(a, Matrix::from_translation(5000.0, 0.0, 0.0));
        let _ = store.evaluate();

        let report = store.cull(&stage(), None);
        assert_eq!(report.result_at(a.index()), Some(CullResult::Partial));
        assert!(report.is_visible_at(a.index()));
    }

    #[test]
    fn hidden_subtree_is_skipped() {
        let mut store = ActorStore::new();
        let parent = actor(&mut store, Rect::new(0.0, 0.0, 100.0, 100.0));
        let child = actor(&mut store, Rect::new(0.0, 0.0, 10.0, 10.0));
        store.add_child(parent, child);
        store.set_flags(
            parent,
            ActorFlags {
                hidden: true,
                ..ActorFlags::default()
            },
        );
        let _ = store.evaluate();

        let report = store.cull(&stage(), None);
        assert!(report.visible.is_empty());
        assert_eq!(report.result_at(parent.index()), None);
        assert_eq!(report.result_at(child.index()), None);
    }

    #[test]
    fn clip_rect_narrows_frustum() {
        let mut store = ActorStore::new();
        let a = actor(&mut store, Rect::new(10.0, 10.0, 50.0, 50.0));
        let b = actor(&mut store, Rect::new(300.0, 300.0, 350.0, 350.0));
        let _ = store.evaluate();

        let report = store.cull(&stage(), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert!(report.is_visible_at(a.index()));
        assert_eq!(report.result_at(b.index()), Some(CullResult::Out));
    }

    #[test]
    fn group_volume_covers_offscreen_children() {
        let mut store = ActorStore::new();
        let group = actor(&mut store, Rect::new(-200.0, 0.0, -100.0, 100.0));
        store.set_paint_volume_source(group, Some(Box::new(GroupVolume)));
        let child = actor(&mut store, Rect::new(150.0, 0.0, 250.0, 100.0));
        store.add_child(group, child);
        let _ = store.evaluate();

        let report = store.cull(&stage(), None);
        assert_eq!(report.result_at(group.index()), Some(CullResult::Partial));
        assert_eq!(report.result_at(child.index()), Some(CullResult::Partial));
    }

    #[test]
    fn perspective_stage_culls_offscreen_actor() {
        let mut store = ActorStore::new();
        let on = actor(&mut store, Rect::new(100.0, 100.0, 200.0, 200.0));
        let off = actor(&mut store, Rect::new(-300.0, 100.0, -200.0, 200.0));
        let _ = store.evaluate();

        let report = store.cull(&StageView::perspective(60.0, 800.0, 600.0), None);
        assert_eq!(report.result_at(on.index()), Some(CullResult::In));
        assert_eq!(report.result_at(off.index()), Some(CullResult::Out));
    }
}
