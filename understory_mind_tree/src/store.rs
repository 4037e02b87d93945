// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core store implementation: structure, edits, queries, and persistence.

use alloc::string::String;
use alloc::vec::Vec;
use serde_json::{Map, Value};

use crate::data::NodeData;
use crate::label::Label;
use crate::types::{GKey, NodeId, Placement, Present, Side};

/// Owner of the canonical mind-map tree.
///
/// The store always has exactly one root. Every other node is reachable from
/// it, and a node's children keep their insertion order until an explicit
/// reorder. Collapsing a node only hides its subtree from [`TreeStore::visible`];
/// the subtree stays owned and [`TreeStore::find`] still resolves it.
///
/// Mutators never panic on bad input. A stale id, an edit on the root that the
/// root does not support, or a move that would make a node its own ancestor
/// leaves the tree untouched and reports failure through the return value
/// (`None` or `false`). The caller is a live UI that may act on references
/// deleted a moment earlier.
///
/// ## Example
///
/// ```rust
/// use understory_mind_tree::TreeStore;
///
/// let mut store = TreeStore::new("Plan");
/// let root = store.root();
/// let a = store.add(root, "Research").unwrap();
/// let b = store.add(root, "Build").unwrap();
/// assert_eq!(store.children_of(root), &[a, b]);
///
/// // Cycles are rejected.
/// assert!(!store.move_child(a, root));
/// ```
#[derive(Clone, PartialEq)]
pub struct TreeStore {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: NodeId,
    revision: u64,
}

impl core::fmt::Debug for TreeStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("TreeStore")
            .field("root", &self.root)
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    name: String,
    collapsed: bool,
    left: bool,
    present: Present,
    extra: Map<String, Value>,
}

/// Read-only view of a live node.
#[derive(Clone, Copy, Debug)]
pub struct NodeRef<'a> {
    store: &'a TreeStore,
    id: NodeId,
    node: &'a Node,
}

impl<'a> NodeRef<'a> {
    /// The node's identifier.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Raw label string.
    pub fn name(&self) -> &'a str {
        &self.node.name
    }

    /// Classified label.
    pub fn label(&self) -> Label<'a> {
        Label::classify(&self.node.name)
    }

    /// Parent, or `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.node.parent
    }

    /// Ordered children, including hidden ones.
    pub fn children(&self) -> &'a [NodeId] {
        &self.node.children
    }

    /// Whether the node owns any children.
    pub fn has_children(&self) -> bool {
        !self.node.children.is_empty()
    }

    /// Whether the children are hidden from the render-list.
    pub fn is_collapsed(&self) -> bool {
        self.node.collapsed
    }

    /// The stored `left` flag. Only meaningful for children of the root.
    pub fn left(&self) -> bool {
        self.node.left
    }

    /// Distance from the root.
    pub fn depth(&self) -> usize {
        self.store.depth(self.id).unwrap_or_default()
    }

    /// Side of the node's branch.
    pub fn side(&self) -> Side {
        self.store.side(self.id).unwrap_or(Side::Root)
    }

    /// Render-identity key.
    pub fn gkey(&self) -> GKey {
        GKey {
            side: self.side(),
            id: self.id,
        }
    }

    /// Unknown persisted fields.
    pub fn extra(&self) -> &'a Map<String, Value> {
        &self.node.extra
    }
}

impl TreeStore {
    /// Create a store holding only a root with the given label.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self::from_data(NodeData::leaf(root_name))
    }

    /// Build a store from persisted data. `data` becomes the root.
    ///
    /// Root children without a stored `left` flag are spread over both sides
    /// by subtree weight.
    pub fn from_data(data: NodeData) -> Self {
        let mut store = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: NodeId::new(0, 1),
            revision: 0,
        };
        store.root = store.insert_data(None, data, None);
        store.balance_implicit_sides();
        tracing::debug!(nodes = store.len(), "tree loaded");
        store
    }

    /// Export the whole tree in its persisted shape.
    pub fn to_data(&self) -> NodeData {
        self.export(self.root)
    }

    /// Export one subtree (for the clipboard). `None` if `id` is stale.
    pub fn subtree_data(&self, id: NodeId) -> Option<NodeData> {
        self.is_alive(id).then(|| self.export(id))
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Counter bumped by every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of live nodes, hidden ones included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// A store always holds its root, so it is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is live if its slot exists and its generation matches the
    /// generation stored in that slot.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.generation == id.1)
    }

    /// Look up a node.
    pub fn find(&self, id: NodeId) -> Option<NodeRef<'_>> {
        let node = self.node_opt(id)?;
        Some(NodeRef {
            store: self,
            id,
            node,
        })
    }

    /// Every live id, in slot order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().enumerate().filter_map(|(i, n)| {
            n.as_ref().map(|n| {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "NodeId uses 32-bit indices by design."
                )]
                NodeId::new(i as u32, n.generation)
            })
        })
    }

    /// Returns the parent of a node, or `None` for the root or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Get the children of a node, or an empty slice if the node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Distance from the root.
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        let mut node = self.node_opt(id)?;
        let mut depth = 0;
        while let Some(parent) = node.parent {
            depth += 1;
            node = self.node(parent);
        }
        Some(depth)
    }

    /// Side of the branch `id` belongs to.
    pub fn side(&self, id: NodeId) -> Option<Side> {
        let mut current = id;
        let mut node = self.node_opt(id)?;
        while let Some(parent) = node.parent {
            if parent == self.root {
                return Some(Side::from_left(self.node(current).left));
            }
            current = parent;
            node = self.node(parent);
        }
        Some(Side::Root)
    }

    /// Render-identity key of a live node.
    pub fn gkey(&self, id: NodeId) -> Option<GKey> {
        Some(GKey {
            side: self.side(id)?,
            id,
        })
    }

    /// Returns true if `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent_of(node);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent_of(p);
        }
        false
    }

    /// The render-list: visible nodes in pre-order with their depth.
    ///
    /// Children of a collapsed node are skipped.
    pub fn visible(&self) -> Visible<'_> {
        Visible {
            store: self,
            stack: alloc::vec![(self.root, 0)],
        }
    }

    // --- mutations ---

    /// Append a new child under `parent`.
    ///
    /// `payload` may carry a whole subtree (for example a paste). A collapsed
    /// parent is expanded so the new node is visible. New children of the root
    /// without a stored side go to the lighter side.
    pub fn add(&mut self, parent: NodeId, payload: impl Into<NodeData>) -> Option<NodeId> {
        if !self.is_alive(parent) {
            tracing::debug!(%parent, "add rejected: stale parent");
            return None;
        }
        let data = payload.into();
        let explicit_side = data.left.is_some();
        let id = self.insert_data(Some(parent), data, None);
        self.node_mut(parent).collapsed = false;
        if parent == self.root && !explicit_side {
            let left = self.lighter_side_is_left(id);
            self.set_side(id, left);
        }
        self.touch();
        tracing::debug!(%parent, %id, "added child");
        Some(id)
    }

    /// Insert a new sibling next to `id`, after it unless `before` is set.
    ///
    /// Not available on the root.
    pub fn add_sibling(
        &mut self,
        id: NodeId,
        payload: impl Into<NodeData>,
        before: bool,
    ) -> Option<NodeId> {
        let Some(parent) = self.parent_of(id) else {
            tracing::debug!(%id, "add_sibling rejected: stale id or root");
            return None;
        };
        let pos = self.position_in_parent(id)?;
        let at = if before { pos } else { pos + 1 };
        let sibling = self.insert_data(Some(parent), payload.into(), Some(at));
        if parent == self.root {
            let left = self.node(id).left;
            self.set_side(sibling, left);
        }
        self.touch();
        tracing::debug!(%id, %sibling, before, "added sibling");
        Some(sibling)
    }

    /// Splice a new node between `id` and its parent.
    ///
    /// The new node takes `id`'s place among its siblings and `id` becomes its
    /// only child. Children carried by `payload` are ignored. Not available on
    /// the root.
    pub fn add_parent(&mut self, id: NodeId, payload: impl Into<NodeData>) -> Option<NodeId> {
        let Some(parent) = self.parent_of(id) else {
            tracing::debug!(%id, "add_parent rejected: stale id or root");
            return None;
        };
        let pos = self.position_in_parent(id)?;
        let mut data = payload.into();
        data.children = None;
        let spliced = self.insert_data(Some(parent), data, Some(pos));
        self.unlink_parent(id, parent);
        self.link_parent(id, spliced, None);
        if parent == self.root {
            let left = self.node(id).left;
            self.set_side(spliced, left);
        }
        self.touch();
        tracing::debug!(%id, %spliced, "added parent");
        Some(spliced)
    }

    /// Remove a node and its whole subtree. Not available on the root.
    pub fn del(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent_of(id) else {
            tracing::debug!(%id, "del rejected: stale id or root");
            return false;
        };
        self.unlink_parent(id, parent);
        self.free_subtree(id);
        self.touch();
        tracing::debug!(%id, "deleted subtree");
        true
    }

    /// Remove only `id`; its children take its place in its parent, in order.
    ///
    /// Not available on the root.
    pub fn del_one(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent_of(id) else {
            tracing::debug!(%id, "del_one rejected: stale id or root");
            return false;
        };
        let Some(pos) = self.position_in_parent(id) else {
            return false;
        };
        let (children, left) = {
            let n = self.node_mut(id);
            (core::mem::take(&mut n.children), n.left)
        };
        for &child in &children {
            self.node_mut(child).parent = Some(parent);
            if parent == self.root {
                self.set_side(child, left);
            }
        }
        let siblings = &mut self.node_mut(parent).children;
        siblings.remove(pos);
        for (offset, child) in children.into_iter().enumerate() {
            siblings.insert(pos + offset, child);
        }
        self.free_slot(id);
        self.touch();
        tracing::debug!(%id, "deleted node, children promoted");
        true
    }

    /// Replace a node's label.
    pub fn rename(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        let Some(n) = self.node_opt_mut(id) else {
            tracing::debug!(%id, "rename rejected: stale id");
            return false;
        };
        n.name = text.into();
        self.touch();
        true
    }

    /// Hide a node's children. Returns false for leaves and stale ids, and when
    /// the node is already collapsed.
    pub fn collapse(&mut self, id: NodeId) -> bool {
        match self.node_opt_mut(id) {
            Some(n) if !n.children.is_empty() && !n.collapsed => {
                n.collapsed = true;
                self.touch();
                true
            }
            _ => false,
        }
    }

    /// Show a collapsed node's children again.
    pub fn expand(&mut self, id: NodeId) -> bool {
        match self.node_opt_mut(id) {
            Some(n) if n.collapsed => {
                n.collapsed = false;
                self.touch();
                true
            }
            _ => false,
        }
    }

    /// Reparent `id` (with its subtree) as the last child of `new_parent`.
    ///
    /// Rejected when either id is stale, when `id` is the root, and when
    /// `new_parent` is `id` itself or one of its descendants.
    pub fn move_child(&mut self, new_parent: NodeId, id: NodeId) -> bool {
        if !self.is_alive(new_parent) || id == new_parent {
            tracing::debug!(%id, %new_parent, "move_child rejected: stale or self");
            return false;
        }
        let Some(old_parent) = self.parent_of(id) else {
            tracing::debug!(%id, "move_child rejected: stale id or root");
            return false;
        };
        if self.is_ancestor(id, new_parent) {
            tracing::debug!(%id, %new_parent, "move_child rejected: would create a cycle");
            return false;
        }
        self.unlink_parent(id, old_parent);
        self.link_parent(id, new_parent, None);
        self.node_mut(new_parent).collapsed = false;
        if new_parent == self.root && old_parent != self.root {
            let left = self.lighter_side_is_left(id);
            self.set_side(id, left);
        }
        self.touch();
        tracing::debug!(%id, %new_parent, "moved child");
        true
    }

    /// Move `id` next to its sibling `target`.
    ///
    /// Children of the root may be moved next to a root child on the other
    /// side; `id` then adopts the target's side. Rejected when the two nodes
    /// do not share a parent.
    pub fn move_sibling(&mut self, id: NodeId, target: NodeId, placement: Placement) -> bool {
        if id == target {
            return false;
        }
        let (Some(parent), Some(target_parent)) = (self.parent_of(id), self.parent_of(target))
        else {
            tracing::debug!(%id, %target, "move_sibling rejected: stale id or root");
            return false;
        };
        if parent != target_parent {
            tracing::debug!(%id, %target, "move_sibling rejected: not siblings");
            return false;
        }
        if parent == self.root && self.node(id).left != self.node(target).left {
            let left = self.node(target).left;
            self.set_side(id, left);
        }
        let siblings = &mut self.node_mut(parent).children;
        siblings.retain(|c| *c != id);
        let Some(target_pos) = siblings.iter().position(|c| *c == target) else {
            unreachable!("target is a child of the shared parent");
        };
        let at = match placement {
            Placement::Before => target_pos,
            Placement::After => target_pos + 1,
        };
        siblings.insert(at, id);
        self.touch();
        tracing::debug!(%id, %target, ?placement, "moved sibling");
        true
    }

    /// Flip a root child to the other side of the map.
    pub fn change_left(&mut self, id: NodeId) -> bool {
        if self.parent_of(id) != Some(self.root) {
            tracing::debug!(%id, "change_left rejected: not a child of the root");
            return false;
        }
        let left = !self.node(id).left;
        self.set_side(id, left);
        self.touch();
        tracing::debug!(%id, left, "changed side");
        true
    }

    // --- internals ---

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn alloc(&mut self, node_for: impl FnOnce(u32) -> Node) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(node_for(generation));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(node_for(generation)));
            self.generations.push(generation);
            (self.nodes.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        NodeId::new(idx as u32, generation)
    }

    fn free_slot(&mut self, id: NodeId) {
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = alloc::vec![id];
        while let Some(id) = stack.pop() {
            stack.extend_from_slice(&self.node(id).children);
            self.free_slot(id);
        }
    }

    fn insert_data(&mut self, parent: Option<NodeId>, data: NodeData, at: Option<usize>) -> NodeId {
        let NodeData {
            name,
            children,
            collapsed,
            left,
            extra,
        } = data;
        let mut present = Present::empty();
        present.set(Present::NAME, name.is_some());
        present.set(Present::CHILDREN, children.is_some());
        present.set(Present::COLLAPSED, collapsed.is_some());
        present.set(Present::LEFT, left.is_some());
        let id = self.alloc(|generation| Node {
            generation,
            parent: None,
            children: Vec::new(),
            name: name.unwrap_or_default(),
            collapsed: collapsed.unwrap_or(false),
            left: left.unwrap_or(false),
            present,
            extra,
        });
        if let Some(p) = parent {
            self.link_parent(id, p, at);
        }
        for child in children.unwrap_or_default() {
            self.insert_data(Some(id), child, None);
        }
        id
    }

    fn export(&self, id: NodeId) -> NodeData {
        let n = self.node(id);
        let children = (n.present.contains(Present::CHILDREN) || !n.children.is_empty())
            .then(|| n.children.iter().map(|&c| self.export(c)).collect());
        let collapsed =
            (n.present.contains(Present::COLLAPSED) || n.collapsed).then_some(n.collapsed);
        // Sides balanced at load time are not stored.
        let left = n.present.contains(Present::LEFT).then_some(n.left);
        let name = (n.present.contains(Present::NAME) || !n.name.is_empty())
            .then(|| n.name.clone());
        let mut extra = n.extra.clone();
        if children.is_some() {
            extra.remove("children");
        }
        NodeData {
            name,
            children,
            collapsed,
            left,
            extra,
        }
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId, at: Option<usize>) {
        let siblings = &mut self.node_mut(parent).children;
        match at {
            Some(at) if at <= siblings.len() => siblings.insert(at, id),
            _ => siblings.push(id),
        }
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        let p = self.node_mut(parent);
        p.children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }

    fn position_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent_of(id)?;
        self.node(parent).children.iter().position(|c| *c == id)
    }

    /// Record a side chosen by an edit. It is persisted from now on so the
    /// node stays where the user saw it after a reload.
    fn set_side(&mut self, id: NodeId, left: bool) {
        let n = self.node_mut(id);
        n.left = left;
        n.present |= Present::LEFT;
    }

    /// Number of visible leaves under `id`, used to balance the two sides.
    fn weight(&self, id: NodeId) -> usize {
        let n = self.node(id);
        if n.collapsed || n.children.is_empty() {
            return 1;
        }
        n.children.iter().map(|&c| self.weight(c)).sum()
    }

    /// Whether the left side is strictly lighter, ignoring `exclude`.
    fn lighter_side_is_left(&self, exclude: NodeId) -> bool {
        let (mut left, mut right) = (0, 0);
        for &c in &self.node(self.root).children {
            if c == exclude {
                continue;
            }
            if self.node(c).left {
                left += self.weight(c);
            } else {
                right += self.weight(c);
            }
        }
        left < right
    }

    /// Greedy split of root children that carry no stored side.
    ///
    /// Stored sides are fixed and count toward their side's weight. The rest
    /// are taken in order, each going to the currently lighter side (ties go
    /// right). This does not mark the side as stored.
    fn balance_implicit_sides(&mut self) {
        let children = self.node(self.root).children.clone();
        let (mut left, mut right) = (0, 0);
        for &c in &children {
            if self.node(c).present.contains(Present::LEFT) {
                if self.node(c).left {
                    left += self.weight(c);
                } else {
                    right += self.weight(c);
                }
            }
        }
        for &c in &children {
            if self.node(c).present.contains(Present::LEFT) {
                continue;
            }
            let w = self.weight(c);
            let go_left = left < right;
            self.node_mut(c).left = go_left;
            if go_left {
                left += w;
            } else {
                right += w;
            }
        }
    }
}

/// Pre-order iterator over the visible nodes of a [`TreeStore`].
#[derive(Clone, Debug)]
pub struct Visible<'a> {
    store: &'a TreeStore,
    stack: Vec<(NodeId, usize)>,
}

impl Iterator for Visible<'_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        let n = self.store.node(id);
        if !n.collapsed {
            // Reversed so children come out in sibling order.
            for &child in n.children.iter().rev() {
                self.stack.push((child, depth + 1));
            }
        }
        Some((id, depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn names(store: &TreeStore, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|&id| String::from(store.find(id).unwrap().name()))
            .collect()
    }

    /// root -> [a -> [a1, a2], b]
    fn sample() -> (TreeStore, NodeId, NodeId, NodeId, NodeId) {
        let mut store = TreeStore::new("root");
        let root = store.root();
        let a = store.add(root, "a").unwrap();
        let b = store.add(root, "b").unwrap();
        let a1 = store.add(a, "a1").unwrap();
        let a2 = store.add(a, "a2").unwrap();
        (store, a, b, a1, a2)
    }

    #[test]
    fn add_appends_in_order() {
        let (store, a, b, a1, a2) = sample();
        assert_eq!(store.children_of(store.root()), &[a, b]);
        assert_eq!(store.children_of(a), &[a1, a2]);
        assert_eq!(store.depth(a2), Some(2));
        assert_eq!(store.find(a1).unwrap().parent(), Some(a));
    }

    #[test]
    fn add_to_stale_parent_is_none() {
        let (mut store, a, ..) = sample();
        assert!(store.del(a));
        assert!(store.add(a, "x").is_none());
        assert!(store.find(a).is_none());
    }

    #[test]
    fn stale_ids_do_not_alias_reused_slots() {
        let (mut store, _, b, ..) = sample();
        assert!(store.del(b));
        let c = store.add(store.root(), "c").unwrap();
        assert_eq!(c.idx(), b.idx(), "slot is reused");
        assert!(store.find(b).is_none());
        assert!(!store.rename(b, "ghost"));
        assert_eq!(store.find(c).unwrap().name(), "c");
    }

    #[test]
    fn add_sibling_before_and_after() {
        let (mut store, a, _, a1, a2) = sample();
        let before = store.add_sibling(a2, "before", true).unwrap();
        let after = store.add_sibling(a1, "after", false).unwrap();
        assert_eq!(store.children_of(a), &[a1, after, before, a2]);
        assert!(store.add_sibling(store.root(), "x", false).is_none());
    }

    #[test]
    fn add_sibling_of_root_child_keeps_side() {
        let (mut store, a, ..) = sample();
        assert!(store.change_left(a));
        let s = store.add_sibling(a, "s", false).unwrap();
        assert_eq!(store.side(s), Some(Side::Left));
    }

    #[test]
    fn add_parent_splices() {
        let (mut store, a, b, a1, a2) = sample();
        let p = store.add_parent(a1, "p").unwrap();
        assert_eq!(store.children_of(a), &[p, a2]);
        assert_eq!(store.children_of(p), &[a1]);
        assert_eq!(store.depth(a1), Some(3));

        let left_before = store.side(b);
        let pb = store.add_parent(b, "pb").unwrap();
        assert_eq!(store.side(pb), left_before);
        assert_eq!(store.side(b), left_before);
        assert!(store.add_parent(store.root(), "x").is_none());
    }

    #[test]
    fn del_removes_subtree() {
        let (mut store, a, b, a1, a2) = sample();
        assert!(store.del(a));
        assert_eq!(store.children_of(store.root()), &[b]);
        assert!(store.find(a1).is_none() && store.find(a2).is_none());
        assert_eq!(store.len(), 2);
        assert!(!store.del(store.root()));
    }

    #[test]
    fn del_one_promotes_children_in_place() {
        let (mut store, a, b, a1, a2) = sample();
        let root = store.root();
        assert!(store.del_one(a));
        assert_eq!(store.children_of(root), &[a1, a2, b]);
        assert_eq!(store.parent_of(a1), Some(root));
        assert_eq!(store.side(a1), store.side(a2));
        assert!(!store.del_one(root));
    }

    #[test]
    fn collapse_hides_but_keeps() {
        let (mut store, a, b, a1, a2) = sample();
        assert!(store.collapse(a));
        let visible: Vec<_> = store.visible().map(|(id, _)| id).collect();
        assert_eq!(visible, vec![store.root(), a, b]);
        assert!(store.find(a1).is_some());
        assert_eq!(store.find(a2).unwrap().depth(), 2);
        assert!(!store.collapse(b), "leaves cannot collapse");
        assert!(!store.collapse(a), "already collapsed");
        assert!(store.expand(a));
        assert_eq!(store.visible().count(), 5);
    }

    #[test]
    fn visible_is_preorder_with_depth() {
        let (store, a, b, a1, a2) = sample();
        let visible: Vec<_> = store.visible().collect();
        assert_eq!(
            visible,
            vec![(store.root(), 0), (a, 1), (a1, 2), (a2, 2), (b, 1)]
        );
    }

    #[test]
    fn add_expands_collapsed_parent() {
        let (mut store, a, ..) = sample();
        store.collapse(a);
        store.add(a, "new").unwrap();
        assert!(!store.find(a).unwrap().is_collapsed());
    }

    #[test]
    fn move_child_appends_and_rejects_cycles() {
        let (mut store, a, b, a1, _) = sample();
        assert!(store.move_child(b, a1));
        assert_eq!(store.children_of(b), &[a1]);

        let before = store.clone();
        assert!(!store.move_child(a, a), "self");
        assert!(!store.move_child(a1, a), "into descendant of moved node");
        assert!(!store.move_child(a, store.root()), "root cannot move");
        assert_eq!(store, before, "rejected moves leave the tree untouched");
    }

    #[test]
    fn move_sibling_reorders() {
        let (mut store, a, _, a1, a2) = sample();
        assert!(store.move_sibling(a1, a2, Placement::After));
        assert_eq!(names(&store, store.children_of(a)), ["a2", "a1"]);
        assert!(store.move_sibling(a1, a2, Placement::Before));
        assert_eq!(names(&store, store.children_of(a)), ["a1", "a2"]);
    }

    #[test]
    fn move_sibling_requires_shared_parent() {
        let (mut store, a, b, a1, _) = sample();
        let before = store.clone();
        assert!(!store.move_sibling(a1, b, Placement::Before));
        assert!(!store.move_sibling(a, a, Placement::Before));
        assert_eq!(store, before);
    }

    #[test]
    fn move_sibling_across_sides_adopts_target_side() {
        let (mut store, a, b, ..) = sample();
        store.change_left(a);
        let side_a = store.side(a).unwrap();
        assert_ne!(store.side(b), Some(side_a));
        assert!(store.move_sibling(b, a, Placement::After));
        assert_eq!(store.side(b), Some(side_a));
    }

    #[test]
    fn change_left_only_for_root_children() {
        let (mut store, a, _, a1, _) = sample();
        let side = store.side(a).unwrap();
        assert!(store.change_left(a));
        assert_eq!(store.side(a), Some(side.flipped()));
        assert_eq!(store.side(a1), Some(side.flipped()), "subtree follows");
        assert_eq!(store.gkey(a1).unwrap().side, side.flipped());
        assert!(!store.change_left(a1));
        assert!(!store.change_left(store.root()));
    }

    #[test]
    fn new_root_children_balance_sides() {
        let mut store = TreeStore::new("root");
        let root = store.root();
        let a = store.add(root, "a").unwrap();
        let b = store.add(root, "b").unwrap();
        let c = store.add(root, "c").unwrap();
        assert_eq!(store.side(a), Some(Side::Right), "ties go right");
        assert_eq!(store.side(b), Some(Side::Left));
        assert_eq!(store.side(c), Some(Side::Right));
    }

    #[test]
    fn load_balances_by_weight_and_honours_stored_sides() {
        let data = NodeData::leaf("root")
            .with_child(
                NodeData::leaf("heavy")
                    .with_child("x".into())
                    .with_child("y".into())
                    .with_child("z".into()),
            )
            .with_child("p".into())
            .with_child("q".into())
            .with_child(NodeData {
                left: Some(false),
                ..NodeData::leaf("pinned")
            });
        let store = TreeStore::from_data(data);
        let kids = store.children_of(store.root()).to_vec();
        // pinned (right, 1) is counted first: heavy goes left, p and q fill the right.
        assert_eq!(store.side(kids[0]), Some(Side::Left));
        assert_eq!(store.side(kids[1]), Some(Side::Right));
        assert_eq!(store.side(kids[2]), Some(Side::Right));
        assert_eq!(store.side(kids[3]), Some(Side::Right));
    }

    #[test]
    fn round_trip_preserves_fields() {
        let text = r#"{"name":"root","theme":"dark","children":[
            {"name":"a","collapsed":true,"children":[{"name":"a1","x":[1,2]}]},
            {"name":"b","left":true,"children":[]},
            {"name":"c","collapsed":false}
        ]}"#;
        let store = TreeStore::from_data(NodeData::from_json(text).unwrap());
        let out: Value = serde_json::from_str(&store.to_data().to_json().unwrap()).unwrap();
        let expected: Value = serde_json::from_str(text).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn balanced_sides_are_not_written_back() {
        let text = r#"{"name":"root","children":[{"name":"a"},{"name":"b"}]}"#;
        let store = TreeStore::from_data(NodeData::from_json(text).unwrap());
        let b = store.children_of(store.root())[1];
        assert_eq!(store.side(b), Some(Side::Left));
        let out: Value = serde_json::from_str(&store.to_data().to_json().unwrap()).unwrap();
        let expected: Value = serde_json::from_str(text).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn edited_side_is_written_back() {
        let text = r#"{"name":"root","children":[{"name":"a"},{"name":"b"}]}"#;
        let mut store = TreeStore::from_data(NodeData::from_json(text).unwrap());
        let b = store.children_of(store.root())[1];
        assert!(store.change_left(b));
        let json = store.to_data().to_json().unwrap();
        assert_eq!(json, r#"{"name":"root","children":[{"name":"a"},{"name":"b","left":false}]}"#);
    }

    #[test]
    fn absent_name_and_null_children_round_trip() {
        let text = r#"{"name":"root","children":[{"note":1},{"name":"b","children":null}]}"#;
        let store = TreeStore::from_data(NodeData::from_json(text).unwrap());
        let first = store.children_of(store.root())[0];
        assert_eq!(store.find(first).unwrap().name(), "");
        let out: Value = serde_json::from_str(&store.to_data().to_json().unwrap()).unwrap();
        let expected: Value = serde_json::from_str(text).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn null_children_give_way_to_real_ones() {
        let text = r#"{"name":"root","children":[{"name":"b","children":null}]}"#;
        let mut store = TreeStore::from_data(NodeData::from_json(text).unwrap());
        let b = store.children_of(store.root())[0];
        store.add(b, "b1").unwrap();
        let json = store.subtree_data(b).unwrap().to_json().unwrap();
        assert_eq!(json, r#"{"name":"b","children":[{"name":"b1"}]}"#);
    }

    #[test]
    fn subtree_export_has_no_ids() {
        let (store, a, ..) = sample();
        let data = store.subtree_data(a).unwrap();
        let json = data.to_json().unwrap();
        assert_eq!(json, r#"{"name":"a","children":[{"name":"a1"},{"name":"a2"}],"left":false}"#);
    }

    #[test]
    fn paste_payload_carries_subtree() {
        let (mut store, _, b, ..) = sample();
        let payload = NodeData::leaf("p").with_child("p1".into());
        let p = store.add(b, payload).unwrap();
        assert_eq!(names(&store, store.children_of(p)), ["p1"]);
    }

    #[test]
    fn revision_only_moves_on_success() {
        let (mut store, a, ..) = sample();
        let r = store.revision();
        assert!(!store.change_left(store.root()));
        assert_eq!(store.revision(), r);
        assert!(store.rename(a, "renamed"));
        assert_eq!(store.revision(), r + 1);
    }
}
