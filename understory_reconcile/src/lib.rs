// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Reconcile: keep a retained scene in sync with a mind-map layout.
//!
//! A [`Reconciler`] holds a map from each visible node's
//! [`GKey`](understory_mind_tree::GKey) to the scene handles that draw it
//! ([`NodeHandles`]). Every pass compares that map with a fresh
//! [`Layout`](understory_mind_layout::Layout), one sibling [`Scope`] at a time:
//!
//! - **enter**: build the node's group, connector, content, hit target, label
//!   or image, and controls, then recurse into its children;
//! - **update**: animate position and connector to the new geometry, rebind the
//!   label, swap text and image, add or drop controls, then recurse;
//! - **exit**: drop the node's whole visual subtree at once.
//!
//! Scopes are keyed by parent and side, so a left and a right subtree never
//! share a diff. The scene is reached only through the
//! [`Scene`](understory_scene::Scene) trait.
//!
//! Drag previews move a node's group directly with
//! [`Reconciler::preview_offset`] and [`Reconciler::snap_back`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod diff;
mod reconciler;

pub use diff::{KeyDiff, diff};
pub use reconciler::{
    Frame, HandleMap, ImageResolver, NodeHandles, ReconcileOptions, ReconcileReport, Reconciler,
    Scope,
};
