// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render-plan construction and redraw damage tracking for stratum.
//!
//! This crate sits between [`stratum_core`]'s evaluation and culling and a
//! backend's draw code. It defines:
//!
//! - [`RenderPlan`]: the visible actors of a frame in paint order, each
//!   with its modelview entry and the clip stack it is drawn under.
//! - [`RenderItem`]: a single entry of the plan.
//! - [`DamageTracker`]: turns [`FrameChanges`](stratum_core::actor::FrameChanges)
//!   into a [`DamageRegion`] by comparing stage paint boxes.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace-rich` (disabled by default): Reports every stage paint box the
//!   damage tracker computes.

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod damage;
mod plan;

pub use damage::{DamageRegion, DamageTracker};
pub use plan::{RenderItem, RenderPlan};
