// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drop-target hit testing.

use kurbo::{Point, Rect};
use understory_mind_layout::{Layout, LayoutNode};
use understory_mind_tree::NodeId;

/// Margin added around a label box when testing it as a drop target.
pub const DEFAULT_HIT_PADDING: f64 = 6.0;

/// Drop-target area of a node: its label box grown by `pad` on every side.
///
/// Left-side nodes grow leftwards from their anchor, so the box is mirrored
/// for them. The root always grows rightwards.
pub fn candidate_rect(node: &LayoutNode, pad: f64) -> Rect {
    let Point { x, y } = node.position;
    let width = node.size.width;
    let (before, after) = if node.extends_left() {
        (width + pad, pad)
    } else {
        (pad, width + pad)
    };
    Rect::new(x - before, y - pad, x + after, y + node.size.height + pad)
}

/// The node a dragged node would be reparented to if released at `point`.
///
/// Candidates are tested in pre-order and the first one whose
/// [`candidate_rect`] strictly contains `point` wins. The dragged node, its
/// current parent and its descendants are never candidates. Points outside
/// every box, including non-finite ones, find nothing.
pub fn drop_candidate(layout: &Layout, dragged: NodeId, point: Point, pad: f64) -> Option<NodeId> {
    let parent = layout.get(dragged).and_then(|n| n.parent);
    layout
        .iter()
        .filter(|other| other.id != dragged && Some(other.id) != parent)
        .filter(|other| !layout.is_ancestor(dragged, other.id))
        .find(|other| strictly_contains(candidate_rect(other, pad), point))
        .map(|other| other.id)
}

fn strictly_contains(rect: Rect, p: Point) -> bool {
    p.x > rect.x0 && p.x < rect.x1 && p.y > rect.y0 && p.y < rect.y1
}
