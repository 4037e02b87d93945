// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Projection of the visible tree into positioned, measured nodes.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::{Point, Rect, Size, Vec2};
use smallvec::SmallVec;
use understory_mind_tree::{GKey, ImageLabel, NodeId, Side, TreeStore};

use crate::config::LayoutConfig;
use crate::measure::TextMeasure;
use crate::wrap::wrap;

/// One wrapped line of a laid-out label.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    /// Text of the line.
    pub text: String,
    /// Measured advance.
    pub width: f64,
}

/// Geometry of one visible node.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutNode {
    /// Logical node.
    pub id: NodeId,
    /// Render key.
    pub gkey: GKey,
    /// Parent, `None` for the root.
    pub parent: Option<NodeId>,
    /// Distance from the root.
    pub depth: usize,
    /// Half of the map.
    pub side: Side,
    /// Inner top corner of the label box: the left edge for the root and
    /// right-side nodes, the right edge for left-side nodes.
    pub position: Point,
    /// Measured label box, padding included.
    pub size: Size,
    /// Wrapped label text. Image labels carry one empty line.
    pub lines: SmallVec<[Line; 1]>,
    /// Image payload, if the label is one.
    pub image: Option<ImageLabel>,
    /// Whether the node owns children, hidden or not.
    pub has_children: bool,
    /// Whether the children are hidden.
    pub collapsed: bool,
    /// Visible children in sibling order.
    pub children: SmallVec<[NodeId; 4]>,
    /// Transient displacement while the node is dragged.
    pub offset: Vec2,
}

impl LayoutNode {
    /// Whether the box grows leftwards from `position`.
    pub fn extends_left(&self) -> bool {
        self.side == Side::Left
    }

    /// The label box at its laid-out position.
    pub fn rect(&self) -> Rect {
        let Point { x, y } = self.position;
        let Size { width, height } = self.size;
        if self.extends_left() {
            Rect::new(x - width, y, x, y + height)
        } else {
            Rect::new(x, y, x + width, y + height)
        }
    }

    /// The label box including the drag offset.
    pub fn displaced_rect(&self) -> Rect {
        self.rect() + self.offset
    }

    /// Vertical center of the label box.
    pub fn center_y(&self) -> f64 {
        self.position.y + self.size.height / 2.0
    }

    /// Where a connector to this node ends: the inner edge, vertically centered.
    pub fn connector_end(&self) -> Point {
        Point::new(self.position.x, self.center_y())
    }

    /// Where connectors to children on `child_side` start.
    pub fn connector_start(&self, child_side: Side) -> Point {
        let rect = self.rect();
        let x = match (self.side, child_side) {
            (Side::Root, Side::Left) | (Side::Left, _) => rect.x0,
            _ => rect.x1,
        };
        Point::new(x, self.center_y())
    }
}

/// Result of [`project`]: every visible node, in pre-order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
    nodes: Vec<LayoutNode>,
    index: HashMap<NodeId, usize>,
    root_center_x: f64,
    revision: u64,
}

impl Layout {
    /// Nodes in pre-order; the root comes first.
    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    /// Iterate the nodes in pre-order.
    pub fn iter(&self) -> core::slice::Iter<'_, LayoutNode> {
        self.nodes.iter()
    }

    /// Number of visible nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true for a layout with no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root's geometry.
    pub fn root(&self) -> Option<&LayoutNode> {
        self.nodes.first()
    }

    /// Geometry of a visible node.
    pub fn get(&self, id: NodeId) -> Option<&LayoutNode> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    /// Whether `id` is visible in this layout.
    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Set a node's transient drag offset. Returns false if it is not visible.
    pub fn set_offset(&mut self, id: NodeId, offset: Vec2) -> bool {
        match self.index.get(&id) {
            Some(&i) => {
                self.nodes[i].offset = offset;
                true
            }
            None => false,
        }
    }

    /// Horizontal center of the root label; depth-1 nodes switch sides across it.
    pub fn root_center_x(&self) -> f64 {
        self.root_center_x
    }

    /// Store revision this layout was projected from.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether `ancestor` is a strict ancestor of `node`, following the
    /// layout's parent links.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = self.get(node).and_then(|n| n.parent);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// Union of every label box.
    pub fn bounds(&self) -> Rect {
        self.nodes
            .iter()
            .map(LayoutNode::rect)
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO)
    }
}

/// Lay out the visible part of `store`.
///
/// The root sits at the origin. Each depth-1 subtree is stacked on its own
/// side, and every subtree is vertically centered on its parent. Horizontal
/// position only depends on depth: `cx ± depth × pitch`, where `cx` is the
/// horizontal center of the root. The result is a pure function of the tree,
/// the config and the measure.
pub fn project<M: TextMeasure + ?Sized>(
    store: &TreeStore,
    config: &LayoutConfig,
    measure: &M,
) -> Layout {
    let mut nodes: Vec<LayoutNode> = Vec::new();
    let mut index = HashMap::new();
    for (id, depth) in store.visible() {
        let Some(node) = store.find(id) else {
            continue;
        };
        let label = node.label();
        let lines: SmallVec<[Line; 1]> = wrap(&label, config.max_text_width, measure)
            .map(|fragment| Line {
                text: fragment.text.into(),
                width: fragment.width,
            })
            .collect();
        let image = label.image().cloned();
        let size = measure_box(&lines, image.as_ref(), config, measure);
        let collapsed = node.is_collapsed();
        let children = if collapsed {
            SmallVec::new()
        } else {
            node.children().iter().copied().collect()
        };
        index.insert(id, nodes.len());
        nodes.push(LayoutNode {
            id,
            gkey: node.gkey(),
            parent: node.parent(),
            depth,
            side: node.side(),
            position: Point::ZERO,
            size,
            lines,
            image,
            has_children: node.has_children(),
            collapsed,
            children,
            offset: Vec2::ZERO,
        });
    }

    let Some(root) = nodes.first() else {
        return Layout::default();
    };
    let root_center_x = root.size.width / 2.0;
    let root_center_y = root.size.height / 2.0;

    // Pass 1: subtree extents, children before parents.
    let mut extents = vec![0.0; nodes.len()];
    for i in (0..nodes.len()).rev() {
        let block = block_extent(&nodes[i].children, &index, &extents, config.y_gap);
        extents[i] = nodes[i].size.height.max(block);
    }

    // Pass 2: positions, parents before children.
    let mut placer = Placer {
        nodes: &mut nodes,
        index: &index,
        extents: &extents,
        center_x: root_center_x,
        pitch: config.pitch(),
        y_gap: config.y_gap,
    };
    for side in [Side::Left, Side::Right] {
        let block: SmallVec<[usize; 8]> = placer.nodes[0]
            .children
            .iter()
            .filter_map(|c| index.get(c).copied())
            .filter(|&i| placer.nodes[i].side == side)
            .collect();
        placer.place_block(&block, root_center_y);
    }

    Layout {
        nodes,
        index,
        root_center_x,
        revision: store.revision(),
    }
}

fn measure_box<M: TextMeasure + ?Sized>(
    lines: &[Line],
    image: Option<&ImageLabel>,
    config: &LayoutConfig,
    measure: &M,
) -> Size {
    let line_height = measure.line_height();
    let content = match image {
        Some(image) => Size::new(
            image.width.max(0.0),
            if image.height > 0.0 {
                image.height
            } else {
                line_height
            },
        ),
        None => {
            let width = lines.iter().map(|l| l.width).fold(0.0, f64::max);
            #[allow(
                clippy::cast_precision_loss,
                reason = "line counts are far below 2^52."
            )]
            let count = lines.len().max(1) as f64;
            Size::new(width, count * line_height)
        }
    };
    let pad = 2.0 * config.text_padding;
    Size::new(content.width + pad, content.height + pad)
}

fn block_extent(
    children: &[NodeId],
    index: &HashMap<NodeId, usize>,
    extents: &[f64],
    y_gap: f64,
) -> f64 {
    let mut total = 0.0;
    let mut count = 0_usize;
    for &i in children.iter().filter_map(|c| index.get(c)) {
        total += extents[i];
        count += 1;
    }
    if count > 1 {
        #[allow(clippy::cast_precision_loss, reason = "sibling counts are small.")]
        let gaps = (count - 1) as f64;
        total += gaps * y_gap;
    }
    total
}

struct Placer<'a> {
    nodes: &'a mut [LayoutNode],
    index: &'a HashMap<NodeId, usize>,
    extents: &'a [f64],
    center_x: f64,
    pitch: f64,
    y_gap: f64,
}

impl Placer<'_> {
    /// Stack `block` (sibling indices) centered on `center_y`.
    fn place_block(&mut self, block: &[usize], center_y: f64) {
        let gaps = block.len().saturating_sub(1);
        #[allow(clippy::cast_precision_loss, reason = "sibling counts are small.")]
        let total = block.iter().map(|&i| self.extents[i]).sum::<f64>() + gaps as f64 * self.y_gap;
        let mut top = center_y - total / 2.0;
        for &i in block {
            let span_center = top + self.extents[i] / 2.0;
            top += self.extents[i] + self.y_gap;

            let node = &mut self.nodes[i];
            let sign = if node.side == Side::Left { -1.0 } else { 1.0 };
            #[allow(clippy::cast_precision_loss, reason = "tree depth is small.")]
            let depth = node.depth as f64;
            node.position = Point::new(
                self.center_x + sign * depth * self.pitch,
                span_center - node.size.height / 2.0,
            );

            let children: SmallVec<[usize; 8]> = node
                .children
                .iter()
                .filter_map(|c| self.index.get(c).copied())
                .collect();
            self.place_block(&children, span_center);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MonospaceMeasure;
    use understory_mind_tree::NodeData;

    fn layout_of(json: &str) -> (TreeStore, Layout) {
        let store = TreeStore::from_data(NodeData::from_json(json).unwrap());
        let layout = project(&store, &LayoutConfig::default(), &MonospaceMeasure::default());
        (store, layout)
    }

    fn child(store: &TreeStore, parent: NodeId, i: usize) -> NodeId {
        store.children_of(parent)[i]
    }

    #[test]
    fn root_at_origin_and_siblings_centered() {
        let (store, layout) = layout_of(
            r#"{"name":"root","children":[{"name":"a","left":false},{"name":"b","left":false}]}"#,
        );
        let root = layout.root().unwrap();
        assert_eq!(root.position, Point::ZERO);
        assert_eq!(root.size, Size::new(32.0, 20.0));
        assert_eq!(layout.root_center_x(), 16.0);

        let a = layout.get(child(&store, store.root(), 0)).unwrap();
        let b = layout.get(child(&store, store.root(), 1)).unwrap();
        // pitch = 200 + 84; block = 20 + 18 + 20 centered on the root's middle.
        assert_eq!(a.position, Point::new(300.0, -19.0));
        assert_eq!(b.position, Point::new(300.0, 19.0));
        assert_eq!(a.connector_end(), Point::new(300.0, -9.0));
        assert_eq!(root.connector_start(Side::Right), Point::new(32.0, 10.0));
    }

    #[test]
    fn left_side_is_mirrored() {
        let (store, layout) = layout_of(
            r#"{"name":"root","children":[{"name":"a","left":true,"children":[{"name":"a1"}]}]}"#,
        );
        let a_id = child(&store, store.root(), 0);
        let a = layout.get(a_id).unwrap();
        assert_eq!(a.side, Side::Left);
        assert_eq!(a.position, Point::new(16.0 - 284.0, 0.0));
        assert_eq!(a.rect(), Rect::new(-276.0, 0.0, -268.0, 20.0));
        let a1 = layout.get(child(&store, a_id, 0)).unwrap();
        assert_eq!(a1.position.x, 16.0 - 2.0 * 284.0);
        assert_eq!(a.connector_start(Side::Left).x, -276.0);
    }

    #[test]
    fn parent_is_centered_on_its_children() {
        let (store, layout) = layout_of(
            r#"{"name":"r","children":[{"name":"a","left":false,"children":[{"name":"1"},{"name":"2"},{"name":"3"}]}]}"#,
        );
        let a_id = child(&store, store.root(), 0);
        let a = layout.get(a_id).unwrap();
        let middle = layout.get(child(&store, a_id, 1)).unwrap();
        assert_eq!(a.center_y(), middle.center_y());
        let first = layout.get(child(&store, a_id, 0)).unwrap();
        let last = layout.get(child(&store, a_id, 2)).unwrap();
        assert_eq!(middle.position.y - first.position.y, 38.0);
        assert_eq!(last.position.y - middle.position.y, 38.0);
    }

    #[test]
    fn collapsed_children_are_not_laid_out() {
        let (mut store, _) = layout_of(
            r#"{"name":"r","children":[{"name":"a","children":[{"name":"a1"}]}]}"#,
        );
        let a = child(&store, store.root(), 0);
        let a1 = child(&store, a, 0);
        assert!(store.collapse(a));
        let layout = project(&store, &LayoutConfig::default(), &MonospaceMeasure::default());
        assert!(!layout.contains(a1));
        let a_node = layout.get(a).unwrap();
        assert!(a_node.has_children);
        assert!(a_node.collapsed);
        assert!(a_node.children.is_empty());
        assert_eq!(layout.len(), 2);
    }

    #[test]
    fn projection_is_idempotent() {
        let json = r#"{"name":"root","children":[{"name":"a long label that wraps past the width limit"},{"name":"b","children":[{"name":"b1"}]},{"name":"c"}]}"#;
        let (store, first) = layout_of(json);
        let second = project(&store, &LayoutConfig::default(), &MonospaceMeasure::default());
        assert_eq!(first, second);
        assert_eq!(first.revision(), store.revision());
    }

    #[test]
    fn image_labels_use_their_own_size() {
        let (store, layout) = layout_of(
            r#"{"name":"r","children":[{"name":"{\"src\":\"https://x/y.png\",\"width\":50,\"height\":30}"}]}"#,
        );
        let node = layout.get(child(&store, store.root(), 0)).unwrap();
        assert_eq!(node.size, Size::new(50.0, 30.0));
        assert_eq!(node.lines.len(), 1);
        assert_eq!(node.lines[0].text, "");
        assert!(node.image.is_some());
    }

    #[test]
    fn ancestry_and_offsets() {
        let (store, mut layout) = layout_of(
            r#"{"name":"r","children":[{"name":"a","children":[{"name":"a1"}]}]}"#,
        );
        let a = child(&store, store.root(), 0);
        let a1 = child(&store, a, 0);
        assert!(layout.is_ancestor(a, a1));
        assert!(layout.is_ancestor(store.root(), a1));
        assert!(!layout.is_ancestor(a1, a));
        assert!(layout.set_offset(a, Vec2::new(5.0, 7.0)));
        let node = layout.get(a).unwrap();
        assert_eq!(node.displaced_rect(), node.rect() + Vec2::new(5.0, 7.0));
    }
}
