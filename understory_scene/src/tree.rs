// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core scene implementation: structure, stacking, animation, and picking.

use alloc::vec::Vec;
use kurbo::{Point, Vec2};

use crate::transition::{Motion, Transition, Tween};
use crate::types::{Element, Interactions, SceneId};

/// A retained scene graph.
///
/// Elements live in a generational arena. Children are painted in order, so
/// the last child is on top; [`SceneTree::raise`] moves an element to the top
/// of its siblings. Group translations and connector endpoints can be
/// animated: the displayed value moves toward its target as
/// [`SceneTree::advance`] is called with the compositor clock.
///
/// ## Example
///
/// ```rust
/// use kurbo::Vec2;
/// use understory_scene::{Element, SceneTree, Transition};
///
/// let mut scene = SceneTree::new();
/// let group = scene.append(scene.root(), Element::group()).unwrap();
/// scene.translate_to(group, Vec2::new(100.0, 0.0), Transition::ease_out(500.0));
///
/// scene.advance(500.0);
/// assert_eq!(scene.translation(group), Some(Vec2::new(100.0, 0.0)));
/// ```
#[derive(Clone)]
pub struct SceneTree {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: SceneId,
    now_ms: f64,
}

impl core::fmt::Debug for SceneTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let animating = self
            .nodes
            .iter()
            .flatten()
            .filter(|n| n.motion.is_some())
            .count();
        f.debug_struct("SceneTree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("animating", &animating)
            .field("now_ms", &self.now_ms)
            .finish_non_exhaustive()
    }
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<SceneId>,
    children: Vec<SceneId>,
    element: Element,
    interactions: Interactions,
    motion: Option<Motion>,
}

impl Node {
    fn new(generation: u32, element: Element) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            element,
            interactions: Interactions::empty(),
            motion: None,
        }
    }
}

impl SceneTree {
    /// Create a scene holding only its root group.
    pub fn new() -> Self {
        let mut scene = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: SceneId::new(0, 1),
            now_ms: 0.0,
        };
        scene.root = scene.alloc(Element::group());
        scene
    }

    /// The root group.
    pub fn root(&self) -> SceneId {
        self.root
    }

    /// Number of live elements, the root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// A scene always holds its root, so it is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns `true` if `id` refers to a live element.
    pub fn is_alive(&self, id: SceneId) -> bool {
        self.node_opt(id).is_some()
    }

    /// Append `element` as the topmost child of `parent`.
    ///
    /// Returns `None` if `parent` is stale.
    pub fn append(&mut self, parent: SceneId, element: Element) -> Option<SceneId> {
        if !self.is_alive(parent) {
            return None;
        }
        let id = self.alloc(element);
        self.node_mut(parent).children.push(id);
        self.node_mut(id).parent = Some(parent);
        Some(id)
    }

    /// Remove an element and everything below it. The root cannot be removed.
    pub fn remove(&mut self, id: SceneId) -> bool {
        if id == self.root || !self.is_alive(id) {
            return false;
        }
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|c| *c != id);
        }
        self.free_subtree(id);
        true
    }

    /// Move an element to the top of its siblings.
    pub fn raise(&mut self, id: SceneId) -> bool {
        let Some(parent) = self.node_opt(id).and_then(|n| n.parent) else {
            return false;
        };
        let siblings = &mut self.node_mut(parent).children;
        siblings.retain(|c| *c != id);
        siblings.push(id);
        true
    }

    /// The element as currently displayed.
    pub fn element(&self, id: SceneId) -> Option<&Element> {
        self.node_opt(id).map(|n| &n.element)
    }

    /// Replace an element outright. Any animation on it is dropped.
    pub fn replace(&mut self, id: SceneId, element: Element) -> bool {
        match self.node_opt_mut(id) {
            Some(n) => {
                n.element = element;
                n.motion = None;
                true
            }
            None => false,
        }
    }

    /// Interactions bound to an element.
    pub fn interactions(&self, id: SceneId) -> Option<Interactions> {
        self.node_opt(id).map(|n| n.interactions)
    }

    /// Bind input handlers, replacing the previous set.
    pub fn bind(&mut self, id: SceneId, interactions: Interactions) -> bool {
        match self.node_opt_mut(id) {
            Some(n) => {
                n.interactions = interactions;
                true
            }
            None => false,
        }
    }

    /// Parent of a live element.
    pub fn parent_of(&self, id: SceneId) -> Option<SceneId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Children of a live element in paint order (bottom first).
    pub fn children_of(&self, id: SceneId) -> &[SceneId] {
        self.node_opt(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Current time of the compositor clock.
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Whether any element is still moving.
    pub fn is_animating(&self) -> bool {
        self.nodes.iter().flatten().any(|n| n.motion.is_some())
    }

    /// Displayed translation of a group.
    pub fn translation(&self, id: SceneId) -> Option<Vec2> {
        match self.element(id)? {
            Element::Group { translate } => Some(*translate),
            _ => None,
        }
    }

    /// Where a group is heading: the animation target, or the displayed value
    /// if it is at rest.
    pub fn target_translation(&self, id: SceneId) -> Option<Vec2> {
        let n = self.node_opt(id)?;
        match (&n.motion, &n.element) {
            (Some(Motion::Translate(tween)), _) => Some(tween.to),
            (_, Element::Group { translate }) => Some(*translate),
            _ => None,
        }
    }

    /// Move a group to `target`.
    ///
    /// The animation starts from the displayed value, so a move issued while
    /// another is in flight retargets it without a jump. Returns false if `id`
    /// is stale or not a group.
    pub fn translate_to(&mut self, id: SceneId, target: Vec2, transition: Transition) -> bool {
        let now_ms = self.now_ms;
        let Some(n) = self.node_opt_mut(id) else {
            return false;
        };
        let Element::Group { translate } = &mut n.element else {
            return false;
        };
        if transition.is_immediate() {
            *translate = target;
            n.motion = None;
        } else {
            n.motion = Some(Motion::Translate(Tween {
                from: *translate,
                to: target,
                start_ms: now_ms,
                transition,
            }));
        }
        true
    }

    /// Move a connector's endpoints, animated like [`SceneTree::translate_to`].
    pub fn connect(
        &mut self,
        id: SceneId,
        from: Point,
        to: Point,
        transition: Transition,
    ) -> bool {
        let now_ms = self.now_ms;
        let Some(n) = self.node_opt_mut(id) else {
            return false;
        };
        let Element::Connector {
            from: cur_from,
            to: cur_to,
        } = &mut n.element
        else {
            return false;
        };
        if transition.is_immediate() {
            *cur_from = from;
            *cur_to = to;
            n.motion = None;
        } else {
            n.motion = Some(Motion::Connect(Tween {
                from: (*cur_from, *cur_to),
                to: (from, to),
                start_ms: now_ms,
                transition,
            }));
        }
        true
    }

    /// Advance the compositor clock and update every animated element.
    ///
    /// Returns true while anything is still moving.
    pub fn advance(&mut self, now_ms: f64) -> bool {
        self.now_ms = now_ms;
        let mut moving = false;
        for n in self.nodes.iter_mut().flatten() {
            let Some(motion) = n.motion else {
                continue;
            };
            let done = match (motion, &mut n.element) {
                (Motion::Translate(tween), Element::Group { translate }) => {
                    let (value, done) = tween.sample(now_ms);
                    *translate = value;
                    done
                }
                (Motion::Connect(tween), Element::Connector { from, to }) => {
                    let ((f, t), done) = tween.sample(now_ms);
                    *from = f;
                    *to = t;
                    done
                }
                _ => true,
            };
            if done {
                n.motion = None;
            } else {
                moving = true;
            }
        }
        moving
    }

    /// Sum of the displayed translations of `id` and its ancestor groups.
    pub fn world_offset(&self, id: SceneId) -> Vec2 {
        let mut offset = Vec2::ZERO;
        let mut cur = Some(id);
        while let Some(c) = cur {
            let Some(n) = self.node_opt(c) else {
                break;
            };
            if let Element::Group { translate } = n.element {
                offset += translate;
            }
            cur = n.parent;
        }
        offset
    }

    /// Every live element in paint order, bottom first.
    pub fn paint_order(&self) -> Vec<SceneId> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = alloc::vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children_of(id).iter().rev().copied());
        }
        out
    }

    /// Topmost interactive [`Element::HitRect`] under `point` (scene space).
    pub fn hit_test(&self, point: Point) -> Option<SceneId> {
        self.paint_order().into_iter().rev().find(|&id| {
            let n = self.node(id);
            match n.element {
                Element::HitRect { rect } if !n.interactions.is_empty() => {
                    (rect + self.world_offset(id)).contains(point)
                }
                _ => false,
            }
        })
    }

    fn alloc(&mut self, element: Element) -> SceneId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, element));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "SceneId uses 32-bit indices."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, element)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "SceneId uses 32-bit indices."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        SceneId::new(idx, generation)
    }

    fn free_subtree(&mut self, id: SceneId) {
        let children = core::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.free_subtree(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Panics if `id` is stale.
    fn node(&self, id: SceneId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling SceneId")
    }

    /// Panics if `id` is stale.
    fn node_mut(&mut self, id: SceneId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling SceneId")
    }

    fn node_opt(&self, id: SceneId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: SceneId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }
}
