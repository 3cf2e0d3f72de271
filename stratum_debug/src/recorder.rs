// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use kurbo::Rect;
use stratum_core::clip::GlScissor;
use stratum_core::cull::CullResult;
use stratum_core::trace::{
    ClipFlushEvent, CullEvent, CullSummaryEvent, EvaluateEvent, PaintBoxEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_EVALUATE: u8 = 1;
const TAG_CULL_SUMMARY: u8 = 2;
const TAG_CLIP_FLUSH: u8 = 3;
const TAG_CULL: u8 = 4;
const TAG_PAINT_BOX: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_option_scissor(&mut self, v: Option<GlScissor>) {
        let s = v.unwrap_or_default();
        self.write_bool(v.is_some());
        self.write_i32(s.x);
        self.write_i32(s.y);
        self.write_i32(s.width);
        self.write_i32(s.height);
    }

    fn write_cull_result(&mut self, r: CullResult) {
        self.write_u8(match r {
            CullResult::In => 0,
            CullResult::Out => 1,
            CullResult::Partial => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_evaluate(&mut self, e: &EvaluateEvent) {
        self.write_u8(TAG_EVALUATE);
        self.write_u64(e.pass);
        self.write_u32(e.actors);
        self.write_u32(e.transforms);
        self.write_u32(e.paint_volumes);
        self.write_bool(e.topology_changed);
    }

    fn on_cull_summary(&mut self, e: &CullSummaryEvent) {
        self.write_u8(TAG_CULL_SUMMARY);
        self.write_u32(e.visited);
        self.write_u32(e.inside);
        self.write_u32(e.partial);
        self.write_u32(e.culled);
        self.write_u32(e.unbounded);
    }

    fn on_clip_flush(&mut self, e: &ClipFlushEvent) {
        self.write_u8(TAG_CLIP_FLUSH);
        self.write_u32(e.entries);
        self.write_option_scissor(e.scissor);
        self.write_u32(e.fallback_ops);
        self.write_bool(e.uses_stencil);
        self.write_bool(e.cache_hit);
    }

    fn on_cull(&mut self, e: &CullEvent) {
        self.write_u8(TAG_CULL);
        self.write_u32(e.actor_index);
        self.write_cull_result(e.result);
        self.write_bool(e.inherited);
    }

    fn on_paint_box(&mut self, e: &PaintBoxEvent) {
        self.write_u8(TAG_PAINT_BOX);
        self.write_u32(e.actor_index);
        self.write_f64(e.rect.x0);
        self.write_f64(e.rect.y0);
        self.write_f64(e.rect.x1);
        self.write_f64(e.rect.y1);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// An [`EvaluateEvent`].
    Evaluate(EvaluateEvent),
    /// A [`CullSummaryEvent`].
    CullSummary(CullSummaryEvent),
    /// A [`ClipFlushEvent`].
    ClipFlush(ClipFlushEvent),
    /// A [`CullEvent`].
    Cull(CullEvent),
    /// A [`PaintBoxEvent`].
    PaintBox(PaintBoxEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.take().map(i32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.take().map(f64::from_le_bytes)
    }

    fn read_option_scissor(&mut self) -> Option<Option<GlScissor>> {
        let present = self.read_bool()?;
        let s = GlScissor {
            x: self.read_i32()?,
            y: self.read_i32()?,
            width: self.read_i32()?,
            height: self.read_i32()?,
        };
        Some(present.then_some(s))
    }

    fn read_cull_result(&mut self) -> Option<CullResult> {
        Some(match self.read_u8()? {
            0 => CullResult::In,
            1 => CullResult::Out,
            _ => CullResult::Partial,
        })
    }

    fn decode_evaluate(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Evaluate(EvaluateEvent {
            pass: self.read_u64()?,
            actors: self.read_u32()?,
            transforms: self.read_u32()?,
            paint_volumes: self.read_u32()?,
            topology_changed: self.read_bool()?,
        }))
    }

    fn decode_cull_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CullSummary(CullSummaryEvent {
            visited: self.read_u32()?,
            inside: self.read_u32()?,
            partial: self.read_u32()?,
            culled: self.read_u32()?,
            unbounded: self.read_u32()?,
        }))
    }

    fn decode_clip_flush(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ClipFlush(ClipFlushEvent {
            entries: self.read_u32()?,
            scissor: self.read_option_scissor()?,
            fallback_ops: self.read_u32()?,
            uses_stencil: self.read_bool()?,
            cache_hit: self.read_bool()?,
        }))
    }

    fn decode_cull(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Cull(CullEvent {
            actor_index: self.read_u32()?,
            result: self.read_cull_result()?,
            inherited: self.read_bool()?,
        }))
    }

    fn decode_paint_box(&mut self) -> Option<RecordedEvent> {
        let actor_index = self.read_u32()?;
        let rect = Rect::new(
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
        );
        Some(RecordedEvent::PaintBox(PaintBoxEvent { actor_index, rect }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_EVALUATE => self.decode_evaluate(),
            TAG_CULL_SUMMARY => self.decode_cull_summary(),
            TAG_CLIP_FLUSH => self.decode_clip_flush(),
            TAG_CULL => self.decode_cull(),
            TAG_PAINT_BOX => self.decode_paint_box(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
