// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Recorded events carry no wall-clock time. Each event is stamped with its
//! position in the recording, one microsecond apart, so the viewer shows
//! them in order; evaluation passes become counters on a separate track.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for (seq, recorded) in decode(bytes).enumerate() {
        let ts = seq;
        match recorded {
            RecordedEvent::Evaluate(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Evaluate",
                    "cat": "Evaluate",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "pass": e.pass,
                        "actors": e.actors,
                        "transforms": e.transforms,
                        "paint_volumes": e.paint_volumes,
                        "topology_changed": e.topology_changed,
                    }
                }));
                events.push(json!({
                    "ph": "C",
                    "name": "Recomputed",
                    "ts": ts,
                    "pid": 0,
                    "args": {
                        "transforms": e.transforms,
                        "paint_volumes": e.paint_volumes,
                    }
                }));
            }
            RecordedEvent::CullSummary(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "CullSummary",
                    "cat": "Cull",
                    "ts": ts,
                    "pid": 0,
                    "tid": 1,
                    "s": "t",
                    "args": {
                        "visited": e.visited,
                        "inside": e.inside,
                        "partial": e.partial,
                        "culled": e.culled,
                        "unbounded": e.unbounded,
                    }
                }));
            }
            RecordedEvent::ClipFlush(e) => {
                let scissor = e
                    .scissor
                    .map(|s| json!([s.x, s.y, s.width, s.height]));
                events.push(json!({
                    "ph": "i",
                    "name": if e.cache_hit { "ClipFlush (cached)" } else { "ClipFlush" },
                    "cat": "Clip",
                    "ts": ts,
                    "pid": 0,
                    "tid": 2,
                    "s": "t",
                    "args": {
                        "entries": e.entries,
                        "scissor": scissor,
                        "fallback_ops": e.fallback_ops,
                        "uses_stencil": e.uses_stencil,
                    }
                }));
            }
            RecordedEvent::Cull(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Cull",
                    "cat": "Rich",
                    "ts": ts,
                    "pid": 0,
                    "tid": 1,
                    "s": "t",
                    "args": {
                        "actor": e.actor_index,
                        "result": format!("{:?}", e.result),
                        "inherited": e.inherited,
                    }
                }));
            }
            RecordedEvent::PaintBox(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "PaintBox",
                    "cat": "Rich",
                    "ts": ts,
                    "pid": 0,
                    "tid": 3,
                    "s": "t",
                    "args": {
                        "actor": e.actor_index,
                        "rect": [e.rect.x0, e.rect.y0, e.rect.x1, e.rect.y1],
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}
