// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Mind Tree: the canonical node tree of a mind-map.
//!
//! A mind-map is a rooted tree of labeled nodes. The root sits in the middle and
//! each of its children, together with that child's whole subtree, is drawn on
//! either the left or the right half of the map. This crate owns that tree and
//! nothing else: it does not measure text, position nodes, or talk to a renderer.
//!
//! - [`TreeStore`]: owns every node, applies structural edits, and emits the
//!   visible render-list ([`TreeStore::visible`]).
//! - [`NodeId`]: generational handle. Stable across reorders and reparents;
//!   stale after deletion.
//! - [`Side`] and [`GKey`]: which half of the map a node is on, and the
//!   side-namespaced key renderers use to match old and new nodes.
//! - [`NodeData`]: the persisted (and clipboard) shape, `{name, children?,
//!   collapsed?, left?}` plus any unknown fields, which survive a load and save.
//! - [`Label`]: a node's name is either text or a serialized [`ImageLabel`].
//!
//! ## Edits
//!
//! | Operation | Effect |
//! |---|---|
//! | [`TreeStore::add`] | append a child (or a pasted subtree) |
//! | [`TreeStore::add_sibling`] | insert next to a node |
//! | [`TreeStore::add_parent`] | splice a node between a node and its parent |
//! | [`TreeStore::del`] / [`TreeStore::del_one`] | remove a subtree / remove one node and promote its children |
//! | [`TreeStore::rename`], [`TreeStore::collapse`], [`TreeStore::expand`] | in-place changes |
//! | [`TreeStore::move_child`] / [`TreeStore::move_sibling`] | reparent / reorder |
//! | [`TreeStore::change_left`] | flip a root child to the other half |
//!
//! Every mutator is total: bad ids and illegal moves return `None`/`false` and
//! leave the tree as it was.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod data;
mod label;
mod store;
mod types;

pub use data::NodeData;
pub use label::{IMAGE_SCHEMES, ImageLabel, Label};
pub use store::{NodeRef, TreeStore, Visible};
pub use types::{GKey, NodeId, Placement, Side};
