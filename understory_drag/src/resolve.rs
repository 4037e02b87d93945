// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolution of a released drag into one tree edit.

use kurbo::Vec2;
use understory_mind_layout::{Layout, LayoutNode};
use understory_mind_tree::{NodeId, Placement, TreeStore};

/// The tree edit a drag release asks for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DropAction {
    /// Make `node` the last child of `new_parent`.
    Reparent {
        /// Dragged node.
        node: NodeId,
        /// Highlighted drop target.
        new_parent: NodeId,
    },
    /// Move `node` next to its sibling `target`, adopting `target`'s side.
    Reorder {
        /// Dragged node.
        node: NodeId,
        /// Bracketing sibling.
        target: NodeId,
        /// Before or after `target`.
        placement: Placement,
    },
    /// Move a root child to the other half, order unchanged.
    FlipSide {
        /// Dragged node.
        node: NodeId,
    },
    /// Leave the tree alone and animate the node home.
    Revert {
        /// Dragged node.
        node: NodeId,
    },
}

impl DropAction {
    /// The dragged node.
    pub fn node(&self) -> NodeId {
        match *self {
            Self::Reparent { node, .. }
            | Self::Reorder { node, .. }
            | Self::FlipSide { node }
            | Self::Revert { node } => node,
        }
    }

    /// Commit the edit. Returns true if the tree changed.
    pub fn apply(&self, store: &mut TreeStore) -> bool {
        match *self {
            Self::Reparent { node, new_parent } => store.move_child(new_parent, node),
            Self::Reorder {
                node,
                target,
                placement,
            } => store.move_sibling(node, target, placement),
            Self::FlipSide { node } => store.change_left(node),
            Self::Revert { .. } => false,
        }
    }
}

/// Whether a release with displacement `offset` moves `node` to the other half.
///
/// Only root children can switch sides, and only when the horizontal
/// displacement carries their anchor across the root's horizontal center.
pub fn resolve_side(layout: &Layout, node: &LayoutNode, offset: Vec2) -> bool {
    if node.depth != 1 {
        return false;
    }
    let to_center = node.position.x - layout.root_center_x();
    to_center * (to_center + offset.x) < 0.0
}

/// The sibling a released node should be placed next to.
///
/// The candidates are the node's visible siblings on the same side, or on the
/// opposite side when `flip` is set. The nearest candidate below the dropped
/// position wins and the node goes before it; failing that, the nearest one
/// above it wins and the node goes after it. Without a flip, only siblings the
/// node actually passed count: one that was already above it cannot be "below
/// the drop point". Distances are compared strictly, so of two equally near
/// siblings the first in sibling order wins.
pub fn resolve_order(
    layout: &Layout,
    node: &LayoutNode,
    offset: Vec2,
    flip: bool,
) -> Option<(NodeId, Placement)> {
    let parent = layout.get(node.parent?)?;
    let y = node.position.y;
    let end_y = y + offset.y;
    let (start_up, start_down) = if flip {
        (f64::NEG_INFINITY, f64::INFINITY)
    } else {
        (y, y)
    };

    let mut up: Option<(NodeId, f64)> = None;
    let mut down: Option<(NodeId, f64)> = None;
    let siblings = parent
        .children
        .iter()
        .filter_map(|&c| layout.get(c))
        .filter(|s| s.id != node.id && (s.side == node.side) != flip);
    for sibling in siblings {
        let sy = sibling.position.y;
        let up_y = up.map_or(start_up, |(_, v)| v);
        if (flip || sy > y) && sy < end_y && sy > up_y {
            up = Some((sibling.id, sy));
        }
        let down_y = down.map_or(start_down, |(_, v)| v);
        if (flip || sy < y) && sy > end_y && sy < down_y {
            down = Some((sibling.id, sy));
        }
    }

    match (down, up) {
        (Some((target, _)), _) => Some((target, Placement::Before)),
        (None, Some((target, _))) => Some((target, Placement::After)),
        (None, None) => None,
    }
}

/// Resolve a release with no drop target highlighted.
///
/// The side is decided first, then the order given that side: a bracketing
/// sibling yields a reorder (which also carries the side change), a side
/// change alone yields a flip, and anything else reverts.
pub fn resolve_release(layout: &Layout, node: &LayoutNode, offset: Vec2) -> DropAction {
    let flip = resolve_side(layout, node, offset);
    match resolve_order(layout, node, offset, flip) {
        Some((target, placement)) => DropAction::Reorder {
            node: node.id,
            target,
            placement,
        },
        None if flip => DropAction::FlipSide { node: node.id },
        None => DropAction::Revert { node: node.id },
    }
}
