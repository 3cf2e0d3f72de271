// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Translating a clip stack into scissor and fallback commands.

use alloc::vec::Vec;

use super::{ClipEntry, ClipShape, ClipStack};
use crate::trace::{ClipFlushEvent, Tracer};

/// The framebuffer a clip state is flushed against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RenderTarget {
    /// Height of the target in pixels.
    pub height: i32,
    /// Offscreen targets share the clip stack's top-left origin; onscreen
    /// ones use a bottom-left origin for the scissor.
    pub offscreen: bool,
}

/// Fallback mechanisms the backend supports besides the scissor and the
/// stencil buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ClipCapabilities {
    /// User clip planes are available.
    pub clip_planes: bool,
}

/// A scissor box in the target's native orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlScissor {
    /// Left edge.
    pub x: i32,
    /// Bottom edge for onscreen targets, top edge for offscreen ones.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

/// One fallback clipping step for an entry the scissor cannot express.
#[derive(Clone, Debug)]
pub enum ClipOp {
    /// Clip to the entry's rectangle with the four user clip planes.
    ClipPlanes {
        /// The rectangle entry.
        entry: ClipEntry,
    },
    /// Draw the entry's rectangle into the stencil buffer.
    StencilRect {
        /// The rectangle entry.
        entry: ClipEntry,
        /// First stencil write of this flush: replace rather than intersect.
        first: bool,
    },
    /// Fill the entry's path into the stencil buffer.
    StencilPath {
        /// The path entry.
        entry: ClipEntry,
        /// Intersect with what earlier ops left in the stencil buffer.
        merge: bool,
    },
}

/// What a backend must do to apply a clip stack.
#[derive(Clone, Debug, Default)]
pub struct ClipCommands {
    /// Scissor box to enable, or `None` to disable scissoring.
    pub scissor: Option<GlScissor>,
    /// Fallback steps, in order from the top of the stack to the root.
    pub ops: Vec<ClipOp>,
    /// Whether any op writes the stencil buffer.
    pub uses_stencil: bool,
}

/// Remembers the last flushed clip stack so unchanged state is not
/// re-emitted.
///
/// The cache compares stacks by identity. Holding the stack keeps its
/// entries alive, so a new stack can never reuse a cached entry's address.
#[derive(Debug, Default)]
pub struct ClipFlushState {
    current: Option<(ClipStack, RenderTarget)>,
    uses_stencil: bool,
}

impl ClipFlushState {
    /// Creates a state with nothing flushed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the cached stack, forcing the next flush to emit commands.
    ///
    /// Call this whenever something outside the clip stack touches the
    /// scissor, stencil, or clip-plane state.
    pub fn invalidate(&mut self) {
        self.current = None;
        self.uses_stencil = false;
    }

    /// Whether the last emitted commands left clip data in the stencil
    /// buffer.
    #[must_use]
    pub fn uses_stencil(&self) -> bool {
        self.uses_stencil
    }

    /// Computes the commands that apply `stack` to `target`.
    ///
    /// Returns `None` when `stack` is the same stack last flushed to the
    /// same target.
    pub fn flush(
        &mut self,
        stack: &ClipStack,
        target: &RenderTarget,
        caps: &ClipCapabilities,
        tracer: &mut Tracer<'_>,
    ) -> Option<ClipCommands> {
        if let Some((current, current_target)) = &self.current
            && current.ptr_eq(stack)
            && current_target == target
        {
            tracer.clip_flush(&ClipFlushEvent {
                entries: 0,
                scissor: None,
                fallback_ops: 0,
                uses_stencil: self.uses_stencil,
                cache_hit: true,
            });
            return None;
        }

        let commands = build_commands(stack, target, caps);
        tracer.clip_flush(&ClipFlushEvent {
            entries: u32::try_from(stack.depth()).unwrap_or(u32::MAX),
            scissor: commands.scissor,
            fallback_ops: u32::try_from(commands.ops.len()).unwrap_or(u32::MAX),
            uses_stencil: commands.uses_stencil,
            cache_hit: false,
        });

        self.current = Some((stack.clone(), *target));
        self.uses_stencil = commands.uses_stencil;
        Some(commands)
    }
}

fn build_commands(
    stack: &ClipStack,
    target: &RenderTarget,
    caps: &ClipCapabilities,
) -> ClipCommands {
    let mut commands = ClipCommands::default();
    if stack.is_empty() {
        return commands;
    }

    let bounds = stack.get_bounds();
    let y = if target.offscreen {
        bounds.y0
    } else {
        target.height.saturating_sub(bounds.y1)
    };
    commands.scissor = Some(GlScissor {
        x: bounds.x0,
        y,
        width: bounds.width(),
        height: bounds.height(),
    });

    let mut using_clip_planes = false;
    for entry in stack.entries() {
        match entry.shape() {
            ClipShape::WindowRect => {}
            ClipShape::Rect { can_be_scissor, .. } => {
                if *can_be_scissor {
                    continue;
                }
                if caps.clip_planes && !using_clip_planes {
                    commands.ops.push(ClipOp::ClipPlanes {
                        entry: entry.clone(),
                    });
                    using_clip_planes = true;
                } else {
                    commands.ops.push(ClipOp::StencilRect {
                        entry: entry.clone(),
                        first: !commands.uses_stencil,
                    });
                    commands.uses_stencil = true;
                }
            }
            ClipShape::Path { .. } => {
                commands.ops.push(ClipOp::StencilPath {
                    entry: entry.clone(),
                    merge: commands.uses_stencil,
                });
                commands.uses_stencil = true;
            }
        }
    }
    commands
}

#[cfg(test)]
mod tests {
    use kurbo::BezPath;

    use super::*;
    use crate::geometry::Viewport;
    use crate::matrix::Matrix;
    use crate::matrix_stack::{MatrixEntry, MatrixStack};

    const ONSCREEN: RenderTarget = RenderTarget {
        height: 600,
        offscreen: false,
    };

    fn flush(
        state: &mut ClipFlushState,
        stack: &ClipStack,
        caps: ClipCapabilities,
    ) -> Option<ClipCommands> {
        state.flush(stack, &ONSCREEN, &caps, &mut Tracer::none())
    }

    fn rotated() -> MatrixEntry {
        let mut mv = MatrixStack::new();
        mv.translate(100.0, 100.0, 0.0);
        mv.rotate(30.0, 0.0, 0.0, 1.0);
        mv.entry()
    }

    fn push_rotated(stack: &mut ClipStack) {
        let projection =
            MatrixEntry::from_matrix(Matrix::orthographic(0.0, 0.0, 800.0, 600.0, -1.0, 1.0));
        let viewport = Viewport::new(0.0, 0.0, 800.0, 600.0);
        stack.push_rectangle(0.0, 0.0, 50.0, 50.0, &rotated(), &projection, &viewport);
    }

    fn push_triangle(stack: &mut ClipStack) {
        let projection =
            MatrixEntry::from_matrix(Matrix::orthographic(0.0, 0.0, 800.0, 600.0, -1.0, 1.0));
        let viewport = Viewport::new(0.0, 0.0, 800.0, 600.0);
        let mut tri = BezPath::new();
        tri.move_to((0.0, 0.0));
        tri.line_to((60.0, 0.0));
        tri.line_to((0.0, 60.0));
        tri.close_path();
        stack.push_from_path(&tri, &MatrixEntry::identity(), &projection, &viewport);
    }

    #[test]
    fn empty_stack_disables_scissor() {
        let mut state = ClipFlushState::new();
        let commands = flush(&mut state, &ClipStack::new(), ClipCapabilities::default())
            .expect("first flush emits");
        assert!(commands.scissor.is_none());
        assert!(commands.ops.is_empty());
        assert!(!commands.uses_stencil);
    }

    #[test]
    fn onscreen_scissor_flips_y() {
        let mut stack = ClipStack::new();
        stack.push_window_rectangle(10, 20, 100, 50);
        let mut state = ClipFlushState::new();
        let commands = flush(&mut state, &stack, ClipCapabilities::default()).expect("emits");
        assert_eq!(
            commands.scissor,
            Some(GlScissor {
                x: 10,
                y: 600 - 70,
                width: 100,
                height: 50,
            })
        );
        assert!(commands.ops.is_empty());
    }

    #[test]
    fn offscreen_scissor_keeps_y() {
        let mut stack = ClipStack::new();
        stack.push_window_rectangle(10, 20, 100, 50);
        let mut state = ClipFlushState::new();
        let target = RenderTarget {
            height: 600,
            offscreen: true,
        };
        let commands = state
            .flush(&stack, &target, &ClipCapabilities::default(), &mut Tracer::none())
            .expect("emits");
        assert_eq!(commands.scissor.map(|s| s.y), Some(20));
    }

    #[test]
    fn identical_stack_is_skipped_until_invalidated() {
        let mut stack = ClipStack::new();
        stack.push_window_rectangle(0, 0, 10, 10);
        let mut state = ClipFlushState::new();
        let caps = ClipCapabilities::default();

        assert!(flush(&mut state, &stack, caps).is_some());
        assert!(flush(&mut state, &stack.clone(), caps).is_none());

        state.invalidate();
        assert!(flush(&mut state, &stack, caps).is_some());

        // Equal geometry in a different stack is not the same state.
        let mut other = ClipStack::new();
        other.push_window_rectangle(0, 0, 10, 10);
        assert!(flush(&mut state, &other, caps).is_some());
    }

    #[test]
    fn target_change_re_emits() {
        let mut stack = ClipStack::new();
        stack.push_window_rectangle(0, 0, 10, 10);
        let mut state = ClipFlushState::new();
        let caps = ClipCapabilities::default();
        assert!(flush(&mut state, &stack, caps).is_some());
        let other = RenderTarget {
            height: 300,
            offscreen: false,
        };
        assert!(state.flush(&stack, &other, &caps, &mut Tracer::none()).is_some());
    }

    #[test]
    fn rotated_rect_uses_clip_planes_once() {
        let mut stack = ClipStack::new();
        push_rotated(&mut stack);
        push_rotated(&mut stack);
        let mut state = ClipFlushState::new();
        let commands = flush(
            &mut state,
            &stack,
            ClipCapabilities { clip_planes: true },
        )
        .expect("emits");

        assert_eq!(commands.ops.len(), 2);
        assert!(matches!(commands.ops[0], ClipOp::ClipPlanes { .. }));
        assert!(matches!(commands.ops[1], ClipOp::StencilRect { first: true, .. }));
        assert!(commands.uses_stencil);
        assert!(state.uses_stencil());
    }

    #[test]
    fn without_clip_planes_rects_go_to_stencil() {
        let mut stack = ClipStack::new();
        push_rotated(&mut stack);
        push_rotated(&mut stack);
        let mut state = ClipFlushState::new();
        let commands = flush(&mut state, &stack, ClipCapabilities::default()).expect("emits");

        assert!(matches!(commands.ops[0], ClipOp::StencilRect { first: true, .. }));
        assert!(matches!(commands.ops[1], ClipOp::StencilRect { first: false, .. }));
    }

    #[test]
    fn paths_merge_after_first_stencil_write() {
        let mut stack = ClipStack::new();
        push_triangle(&mut stack);
        push_rotated(&mut stack);
        push_triangle(&mut stack);
        let mut state = ClipFlushState::new();
        let commands = flush(&mut state, &stack, ClipCapabilities::default()).expect("emits");

        // Top first: path, rect, path.
        assert!(matches!(commands.ops[0], ClipOp::StencilPath { merge: false, .. }));
        assert!(matches!(commands.ops[1], ClipOp::StencilRect { first: false, .. }));
        assert!(matches!(commands.ops[2], ClipOp::StencilPath { merge: true, .. }));
    }

    #[test]
    fn scissor_capable_rects_emit_no_ops() {
        let projection =
            MatrixEntry::from_matrix(Matrix::orthographic(0.0, 0.0, 800.0, 600.0, -1.0, 1.0));
        let viewport = Viewport::new(0.0, 0.0, 800.0, 600.0);
        let mut stack = ClipStack::new();
        stack.push_rectangle(
            10.0,
            10.0,
            90.0,
            90.0,
            &MatrixEntry::identity(),
            &projection,
            &viewport,
        );
        let mut state = ClipFlushState::new();
        let commands = flush(&mut state, &stack, ClipCapabilities { clip_planes: true })
            .expect("emits");
        assert!(commands.ops.is_empty());
        assert!(!commands.uses_stencil);
        assert_eq!(commands.scissor.map(|s| (s.width, s.height)), Some((80, 80)));
    }
}
