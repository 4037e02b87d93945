// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the mind-map tree: node identifiers, sides, and render keys.

use core::fmt;

/// Identifier for a node in the tree (generational).
///
/// A `NodeId` never changes while its node is alive, whatever the node is
/// moved to. Once a node is deleted its slot may be reused, but with a new
/// generation, so the old identifier stops resolving instead of aliasing the
/// new node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.0, self.1)
    }
}

/// Which half of the map a node is drawn in.
///
/// Only the root is [`Side::Root`]. Every other node inherits the side of its
/// depth-1 ancestor.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    /// The root itself.
    Root,
    /// Drawn to the left of the root.
    Left,
    /// Drawn to the right of the root.
    Right,
}

impl Side {
    /// Side for a depth-1 node with the given `left` flag.
    pub const fn from_left(left: bool) -> Self {
        if left { Self::Left } else { Self::Right }
    }

    /// Returns true for [`Side::Left`].
    pub const fn is_left(self) -> bool {
        matches!(self, Self::Left)
    }

    /// The opposite half. The root has no opposite and maps to itself.
    pub const fn flipped(self) -> Self {
        match self {
            Self::Root => Self::Root,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Render-identity key.
///
/// Equal to the node id, namespaced by side so that a subtree moved from one
/// half of the map to the other is a different visual identity. Keys are
/// derived from the tree on demand and are therefore always current after a
/// structural edit.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct GKey {
    /// Side of the node's branch.
    pub side: Side,
    /// Logical node.
    pub id: NodeId,
}

impl fmt::Display for GKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.side {
            Side::Root => 'C',
            Side::Left => 'L',
            Side::Right => 'R',
        };
        write!(f, "{prefix}:{}", self.id)
    }
}

/// Where a node lands relative to a sibling in a reorder.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Placement {
    /// Immediately before the target.
    Before,
    /// Immediately after the target.
    After,
}

bitflags::bitflags! {
    /// Optional persisted fields that were present when a node was loaded.
    ///
    /// A present field is always written back, an absent one only once its
    /// value differs from the default.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub(crate) struct Present: u8 {
        const CHILDREN  = 0b0000_0001;
        const COLLAPSED = 0b0000_0010;
        const LEFT      = 0b0000_0100;
        const NAME      = 0b0000_1000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn gkey_namespaces_by_side() {
        let id = NodeId::new(3, 1);
        let left = GKey { side: Side::Left, id };
        let right = GKey { side: Side::Right, id };
        assert_ne!(left, right, "same id on two sides must not collide");
        assert_eq!(left.to_string(), "L:3v1");
        assert_eq!(right.to_string(), "R:3v1");
    }

    #[test]
    fn flipping_sides() {
        assert_eq!(Side::Left.flipped(), Side::Right);
        assert_eq!(Side::Right.flipped(), Side::Left);
        assert_eq!(Side::Root.flipped(), Side::Root);
        assert!(Side::from_left(true).is_left());
    }
}
