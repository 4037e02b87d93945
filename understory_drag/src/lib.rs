// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Drag: resolve a node drag into one mind-map edit.
//!
//! While a node is dragged it follows the pointer without touching the tree,
//! and the node under the pointer, if any, is highlighted as a drop target.
//! On release the gesture becomes exactly one [`DropAction`]:
//!
//! 1. a highlighted target makes the node its last child;
//! 2. otherwise, if the node passed a sibling, it is placed next to the
//!    nearest one ([`resolve_order`]);
//! 3. otherwise, a root child dragged across the root's center switches sides
//!    ([`resolve_side`]);
//! 4. otherwise the node snaps back.
//!
//! Side and order are decided by separate functions; [`resolve_release`]
//! chains them. [`DragController`] is the state machine around them and
//! [`drop_candidate`] the hit test.
//!
//! Everything here reads a [`Layout`](understory_mind_layout::Layout); the tree
//! is only changed by [`DropAction::apply`].
//!
//! This crate is `no_std`.

#![no_std]

mod controller;
mod hit;
mod resolve;

pub use controller::{ActiveDrag, DragController, DragPhase, DragUpdate};
pub use hit::{DEFAULT_HIT_PADDING, candidate_rect, drop_candidate};
pub use resolve::{DropAction, resolve_order, resolve_release, resolve_side};

#[cfg(test)]
pub(crate) mod tests {
    use understory_mind_layout::{Layout, LayoutConfig, MonospaceMeasure, project};
    use understory_mind_tree::{NodeData, TreeStore};

    pub(crate) fn layout_of(json: &str) -> (TreeStore, Layout) {
        let store = TreeStore::from_data(NodeData::from_json(json).unwrap());
        let layout = project(&store, &LayoutConfig::default(), &MonospaceMeasure::default());
        (store, layout)
    }
}
