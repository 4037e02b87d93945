// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene graph: handles, elements, and interaction flags.

use alloc::string::String;
use alloc::vec::Vec;
use kurbo::{Point, Rect, Size, Vec2};

/// Identifier for an element in a [`SceneTree`](crate::SceneTree) (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SceneId(pub(crate) u32, pub(crate) u32);

impl SceneId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Input handlers bound to an element.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Interactions: u8 {
        /// Click selects the node.
        const SELECT = 0b0000_0001;
        /// The node can be dragged.
        const DRAG   = 0b0000_0010;
        /// Double click edits the label.
        const EDIT   = 0b0000_0100;
        /// Click toggles collapse.
        const EXPAND = 0b0000_1000;
        /// Click adds a child.
        const ADD    = 0b0001_0000;
        /// Hover shows affordances.
        const HOVER  = 0b0010_0000;
    }
}

/// One drawable or grouping element.
///
/// Coordinates of every element are relative to the accumulated translation of
/// its ancestor [`Element::Group`]s.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    /// Translates its children. The scene root is a group at the origin.
    Group {
        /// Offset applied to the children.
        translate: Vec2,
    },
    /// The line from a parent's edge to a node.
    Connector {
        /// Start, on the parent.
        from: Point,
        /// End, on the node.
        to: Point,
    },
    /// Container for everything interactive about a node. Stacked above the
    /// connector.
    Content,
    /// Pointer target of a node.
    HitRect {
        /// Target area.
        rect: Rect,
    },
    /// Wrapped label text.
    Label {
        /// Top-left of the first line.
        origin: Point,
        /// Lines, top to bottom.
        lines: Vec<String>,
    },
    /// Inline picture.
    Image {
        /// Displayable source.
        src: String,
        /// Top-left corner.
        origin: Point,
        /// Display size.
        size: Size,
    },
    /// "Add child" control.
    AddButton {
        /// Center of the control.
        center: Point,
    },
    /// Expand/collapse control.
    ExpandButton {
        /// Center of the control.
        center: Point,
        /// Whether it currently shows the collapsed state.
        collapsed: bool,
    },
}

impl Element {
    /// A group with no translation.
    pub const fn group() -> Self {
        Self::Group {
            translate: Vec2::ZERO,
        }
    }
}
