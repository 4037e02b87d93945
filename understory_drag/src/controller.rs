// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag gesture state machine.

use kurbo::{Point, Vec2};
use understory_mind_layout::Layout;
use understory_mind_tree::NodeId;

use crate::hit::{DEFAULT_HIT_PADDING, drop_candidate};
use crate::resolve::{DropAction, resolve_release};

/// Where the controller is in a gesture.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DragPhase {
    /// No gesture.
    Idle,
    /// A node follows the pointer.
    Dragging,
    /// Released; the resolved action is being committed.
    Resolving,
}

/// The gesture in progress.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveDrag {
    /// Dragged node.
    pub node: NodeId,
    /// Pointer position at the press, in tree space.
    pub start: Point,
    /// Cumulative displacement since the press.
    pub offset: Vec2,
    /// Current drop target, if any.
    pub highlight: Option<NodeId>,
}

/// What a pointer move changed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragUpdate {
    /// New displacement of the dragged node.
    pub offset: Vec2,
    /// Drop target under the pointer.
    pub highlight: Option<NodeId>,
    /// The target before this move, when it differs from `highlight`.
    pub cleared: Option<NodeId>,
    /// Whether the highlight changed.
    pub highlight_changed: bool,
}

/// Turns pointer input on a node into a [`DropAction`].
///
/// One gesture at a time: `Idle → Dragging → Resolving → Idle`. While
/// dragging, [`DragController::on_move`] reports the node's displacement and
/// the drop target under the pointer. [`DragController::release`] resolves the
/// gesture and enters `Resolving` until the caller has committed the action
/// and calls [`DragController::finish`].
///
/// All points are in tree space; convert screen coordinates through the view
/// transform first.
#[derive(Clone, Debug)]
pub struct DragController {
    phase: DragPhase,
    drag: Option<ActiveDrag>,
    /// Margin around label boxes for drop targets.
    pub hit_padding: f64,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    /// An idle controller with the default hit padding.
    pub fn new() -> Self {
        Self::with_padding(DEFAULT_HIT_PADDING)
    }

    /// An idle controller with a custom hit padding.
    pub fn with_padding(hit_padding: f64) -> Self {
        Self {
            phase: DragPhase::Idle,
            drag: None,
            hit_padding,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// The gesture in progress, if any.
    pub fn active(&self) -> Option<&ActiveDrag> {
        self.drag.as_ref()
    }

    /// Current drop target.
    pub fn highlight(&self) -> Option<NodeId> {
        self.drag.as_ref().and_then(|d| d.highlight)
    }

    /// Start dragging `node` from `pointer`.
    ///
    /// Rejected while another gesture is active, for the root, and for nodes
    /// that are not visible in `layout`.
    pub fn begin(&mut self, layout: &Layout, node: NodeId, pointer: Point) -> bool {
        if self.phase != DragPhase::Idle {
            tracing::debug!(%node, phase = ?self.phase, "drag rejected: gesture in progress");
            return false;
        }
        let Some(n) = layout.get(node) else {
            return false;
        };
        if n.parent.is_none() {
            tracing::debug!(%node, "drag rejected: the root does not move");
            return false;
        }
        self.drag = Some(ActiveDrag {
            node,
            start: pointer,
            offset: Vec2::ZERO,
            highlight: None,
        });
        self.phase = DragPhase::Dragging;
        tracing::debug!(%node, "drag started");
        true
    }

    /// Track the pointer.
    ///
    /// Returns `None` when no drag is in progress. If the dragged node has left
    /// the layout (deleted mid-drag), the gesture is cancelled.
    pub fn on_move(&mut self, layout: &Layout, pointer: Point) -> Option<DragUpdate> {
        if self.phase != DragPhase::Dragging {
            return None;
        }
        let node = self.drag.as_ref()?.node;
        if !layout.contains(node) {
            tracing::debug!(%node, "dragged node vanished, cancelling");
            self.cancel();
            return None;
        }
        let highlight = drop_candidate(layout, node, pointer, self.hit_padding);
        let drag = self.drag.as_mut()?;
        drag.offset = pointer - drag.start;
        let previous = drag.highlight;
        drag.highlight = highlight;
        let highlight_changed = previous != highlight;
        Some(DragUpdate {
            offset: drag.offset,
            highlight,
            cleared: if highlight_changed { previous } else { None },
            highlight_changed,
        })
    }

    /// Release the pointer and resolve the gesture.
    ///
    /// With a drop target highlighted the node is reparented to it; otherwise
    /// the side and order are resolved from the displacement. The controller
    /// stays in [`DragPhase::Resolving`] until [`DragController::finish`].
    /// Returns `None` when no drag is in progress or the dragged node is gone.
    ///
    /// # Panics
    ///
    /// Panics if the highlighted target is no longer in `layout`: the
    /// highlight and the committed target have desynchronized.
    pub fn release(&mut self, layout: &Layout) -> Option<DropAction> {
        if self.phase != DragPhase::Dragging {
            return None;
        }
        self.phase = DragPhase::Resolving;
        let drag = self.drag.take()?;
        let Some(node) = layout.get(drag.node) else {
            tracing::debug!(node = %drag.node, "dragged node vanished before release");
            self.phase = DragPhase::Idle;
            return None;
        };

        let action = match drag.highlight {
            Some(target) => {
                assert!(
                    layout.contains(target),
                    "drop target {target} no longer resolves"
                );
                DropAction::Reparent {
                    node: drag.node,
                    new_parent: target,
                }
            }
            None => resolve_release(layout, node, drag.offset),
        };
        tracing::debug!(?action, offset = ?drag.offset, "drag resolved");
        Some(action)
    }

    /// Return to idle after the released action has been committed.
    pub fn finish(&mut self) {
        self.phase = DragPhase::Idle;
        self.drag = None;
    }

    /// Abandon the gesture. Returns the node that was being dragged.
    pub fn cancel(&mut self) -> Option<NodeId> {
        self.phase = DragPhase::Idle;
        self.drag.take().map(|d| d.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::layout_of;
    use understory_mind_tree::Placement;

    const TWO: &str =
        r#"{"name":"root","children":[{"name":"A","left":false},{"name":"B","left":false},{"name":"L","left":true}]}"#;

    #[test]
    fn phases_and_rejections() {
        let (store, layout) = layout_of(TWO);
        let root = store.root();
        let a = store.children_of(root)[0];
        let b = store.children_of(root)[1];
        let mut drag = DragController::new();
        assert_eq!(drag.phase(), DragPhase::Idle);
        assert!(!drag.begin(&layout, root, Point::ZERO), "root");
        assert!(drag.begin(&layout, a, Point::ZERO));
        assert_eq!(drag.phase(), DragPhase::Dragging);
        assert!(!drag.begin(&layout, b, Point::ZERO), "second drag");

        let action = drag.release(&layout).unwrap();
        assert_eq!(action, DropAction::Revert { node: a });
        assert_eq!(drag.phase(), DragPhase::Resolving);
        assert!(!drag.begin(&layout, b, Point::ZERO), "still resolving");
        drag.finish();
        assert_eq!(drag.phase(), DragPhase::Idle);
        assert_eq!(drag.release(&layout), None);
    }

    #[test]
    fn zero_displacement_reverts() {
        let (store, layout) = layout_of(TWO);
        let a = store.children_of(store.root())[0];
        let start = layout.get(a).unwrap().rect().center();
        let mut drag = DragController::new();
        drag.begin(&layout, a, start);
        let update = drag.on_move(&layout, start).unwrap();
        assert_eq!(update.offset, Vec2::ZERO);
        assert_eq!(update.highlight, None);
        assert_eq!(drag.release(&layout), Some(DropAction::Revert { node: a }));
    }

    #[test]
    fn highlight_tracks_the_pointer_and_reparents() {
        let (mut store, layout) = layout_of(TWO);
        let root = store.root();
        let (a, l) = (store.children_of(root)[0], store.children_of(root)[2]);
        let start = layout.get(a).unwrap().rect().center();
        let over_l = layout.get(l).unwrap().rect().center();

        let mut drag = DragController::new();
        drag.begin(&layout, a, start);
        let update = drag.on_move(&layout, over_l).unwrap();
        assert_eq!(update.highlight, Some(l));
        assert!(update.highlight_changed);
        assert_eq!(update.offset, over_l - start);
        let update = drag.on_move(&layout, over_l + Vec2::new(1.0, 0.0)).unwrap();
        assert!(!update.highlight_changed);

        // Moving off clears it.
        let update = drag.on_move(&layout, Point::new(1000.0, 1000.0)).unwrap();
        assert_eq!(update.highlight, None);
        assert_eq!(update.cleared, Some(l));
        drag.on_move(&layout, over_l);

        let action = drag.release(&layout).unwrap();
        assert_eq!(action, DropAction::Reparent { node: a, new_parent: l });
        assert!(action.apply(&mut store));
        drag.finish();
        assert_eq!(store.parent_of(a), Some(l));
    }

    #[test]
    fn release_without_target_reorders() {
        let (store, layout) = layout_of(TWO);
        let root = store.root();
        let (a, b) = (store.children_of(root)[0], store.children_of(root)[1]);
        let start = layout.get(a).unwrap().rect().center();
        let dy = layout.get(b).unwrap().position.y - layout.get(a).unwrap().position.y;
        let mut drag = DragController::new();
        drag.begin(&layout, a, start);
        // Well right of every label, so nothing is highlighted.
        drag.on_move(&layout, start + Vec2::new(100.0, dy + 50.0));
        assert_eq!(
            drag.release(&layout),
            Some(DropAction::Reorder {
                node: a,
                target: b,
                placement: Placement::After
            })
        );
    }

    #[test]
    #[should_panic(expected = "no longer resolves")]
    fn desynchronized_highlight_is_fatal() {
        let (mut store, layout) = layout_of(TWO);
        let root = store.root();
        let (a, l) = (store.children_of(root)[0], store.children_of(root)[2]);
        let mut drag = DragController::new();
        drag.begin(&layout, a, layout.get(a).unwrap().rect().center());
        drag.on_move(&layout, layout.get(l).unwrap().rect().center());

        store.del(l);
        let relaid = understory_mind_layout::project(
            &store,
            &understory_mind_layout::LayoutConfig::default(),
            &understory_mind_layout::MonospaceMeasure::default(),
        );
        drag.release(&relaid);
    }

    #[test]
    fn vanished_node_cancels() {
        let (mut store, layout) = layout_of(TWO);
        let a = store.children_of(store.root())[0];
        let mut drag = DragController::new();
        drag.begin(&layout, a, Point::ZERO);
        store.del(a);
        let relaid = understory_mind_layout::project(
            &store,
            &understory_mind_layout::LayoutConfig::default(),
            &understory_mind_layout::MonospaceMeasure::default(),
        );
        assert_eq!(drag.on_move(&relaid, Point::new(5.0, 5.0)), None);
        assert_eq!(drag.phase(), DragPhase::Idle);
        assert_eq!(drag.cancel(), None);
    }
}
