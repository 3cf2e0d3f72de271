// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use stratum_core::cull::CullResult;
use stratum_core::trace::{
    ClipFlushEvent, CullEvent, CullSummaryEvent, EvaluateEvent, PaintBoxEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn result_name(result: CullResult) -> &'static str {
    match result {
        CullResult::In => "in",
        CullResult::Out => "out",
        CullResult::Partial => "partial",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_evaluate(&mut self, e: &EvaluateEvent) {
        let topology = if e.topology_changed { " topology" } else { "" };
        let _ = writeln!(
            self.writer,
            "[eval] pass={} actors={} transforms={} volumes={}{topology}",
            e.pass, e.actors, e.transforms, e.paint_volumes,
        );
    }

    fn on_cull_summary(&mut self, e: &CullSummaryEvent) {
        let _ = writeln!(
            self.writer,
            "[cull] visited={} in={} partial={} out={} unbounded={}",
            e.visited, e.inside, e.partial, e.culled, e.unbounded,
        );
    }

    fn on_clip_flush(&mut self, e: &ClipFlushEvent) {
        if e.cache_hit {
            let _ = writeln!(self.writer, "[clip] unchanged");
            return;
        }
        let stencil = if e.uses_stencil { "on" } else { "off" };
        let _ = match e.scissor {
            Some(s) => writeln!(
                self.writer,
                "[clip] entries={} scissor={},{} {}x{} fallback={} stencil={stencil}",
                e.entries, s.x, s.y, s.width, s.height, e.fallback_ops,
            ),
            None => writeln!(
                self.writer,
                "[clip] entries={} scissor=off fallback={} stencil={stencil}",
                e.entries, e.fallback_ops,
            ),
        };
    }

    fn on_cull(&mut self, e: &CullEvent) {
        let inherited = if e.inherited { " inherited" } else { "" };
        let _ = writeln!(
            self.writer,
            "[cull:actor] #{} {}{inherited}",
            e.actor_index,
            result_name(e.result),
        );
    }

    fn on_paint_box(&mut self, e: &PaintBoxEvent) {
        let r = e.rect;
        let _ = writeln!(
            self.writer,
            "[paint-box] #{} ({}, {})-({}, {})",
            e.actor_index, r.x0, r.y0, r.x1, r.y1,
        );
    }
}
