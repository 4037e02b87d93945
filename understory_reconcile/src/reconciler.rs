// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The keyed scene reconciler.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use kurbo::{Point, Rect, Size, Vec2};
use understory_mind_layout::{Layout, LayoutNode};
use understory_mind_tree::{GKey, ImageLabel, NodeId, Side};
use understory_scene::{Element, Interactions, Scene, Transition};

use crate::diff::diff;

/// Distance from a node's outer edge to the expand control.
const EXPAND_SLOT: f64 = 10.0;
/// Distance from a node's outer edge to the add-child control.
const ADD_SLOT: f64 = 28.0;

/// Behavior switches for a [`Reconciler`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReconcileOptions {
    /// Give every node an add-child control. Hosts reveal it while the
    /// node's hit rect is hovered.
    pub add_button: bool,
    /// Bind drag handlers on non-root nodes.
    pub drag: bool,
    /// Bind label editing.
    pub edit: bool,
    /// Transition for position and connector updates.
    pub transition: Transition,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            add_button: true,
            drag: true,
            edit: true,
            transition: Transition::default(),
        }
    }
}

/// What one [`Reconciler::reconcile`] pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Keys given new visuals.
    pub entered: usize,
    /// Keys whose visuals changed.
    pub updated: usize,
    /// Keys whose visuals were dropped.
    pub exited: usize,
}

/// A sibling group: the children of one parent that sit on one side.
///
/// The root is alone in the scope with no parent and [`Side::Root`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Scope {
    /// Key of the parent, `None` for the root's scope.
    pub parent: Option<GKey>,
    /// Side of the members.
    pub side: Side,
}

impl Scope {
    /// The scope holding only the root.
    pub const ROOT: Self = Self {
        parent: None,
        side: Side::Root,
    };
}

/// Maps an image label to a displayable source, typically by resolving its
/// asset id. Returning `None` falls back to the label's own `src`.
pub type ImageResolver<'a> = &'a dyn Fn(&ImageLabel) -> Option<String>;

/// Input of one pass.
pub struct Frame<'a> {
    /// Geometry to show.
    pub layout: &'a Layout,
    /// Source resolution for image labels.
    pub resolve_image: Option<ImageResolver<'a>>,
}

impl fmt::Debug for Frame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("nodes", &self.layout.len())
            .field("resolve_image", &self.resolve_image.is_some())
            .finish()
    }
}

impl<'a> Frame<'a> {
    /// A frame with no image resolver.
    pub fn new(layout: &'a Layout) -> Self {
        Self {
            layout,
            resolve_image: None,
        }
    }

    /// Set the image resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolve: ImageResolver<'a>) -> Self {
        self.resolve_image = Some(resolve);
        self
    }
}

/// Scene handles making up one node's visuals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeHandles<H> {
    /// Group translated to the node's position, relative to the parent's group.
    pub group: H,
    /// Line from the parent; `None` for the root.
    pub connector: Option<H>,
    /// Container for the interactive parts, stacked above the connector.
    pub content: H,
    /// Pointer target.
    pub hit: H,
    /// Text, for text labels.
    pub label: Option<H>,
    /// Picture, for image labels.
    pub image: Option<H>,
    /// Add-child control.
    pub add: Option<H>,
    /// Expand/collapse control.
    pub expand: Option<H>,
}

/// What was last pushed to the scene for a node, in the node's local space.
#[derive(Clone, Debug, PartialEq)]
struct Visual {
    rel: Vec2,
    offset: Vec2,
    connector: Option<(Point, Point)>,
    rect: Rect,
    left: bool,
    lines: Vec<String>,
    image: Option<(String, Size)>,
    expand: Option<bool>,
    add: bool,
    interactions: Interactions,
}

impl Visual {
    fn of(node: &LayoutNode, frame: &Frame<'_>, options: &ReconcileOptions) -> Self {
        let parent = node.parent.and_then(|p| frame.layout.get(p));
        let origin = node.position.to_vec2();
        let rel = origin - parent.map_or(Vec2::ZERO, |p| p.position.to_vec2());
        let connector =
            parent.map(|p| (p.connector_start(node.side) - origin, node.connector_end() - origin));
        let image = node.image.as_ref().map(|image| {
            let src = frame
                .resolve_image
                .and_then(|resolve| resolve(image))
                .unwrap_or_else(|| image.src.clone());
            (src, node.size)
        });
        let lines = if image.is_some() {
            Vec::new()
        } else {
            node.lines.iter().map(|l| l.text.clone()).collect()
        };

        let mut interactions = Interactions::SELECT | Interactions::HOVER;
        if options.drag && node.parent.is_some() {
            interactions |= Interactions::DRAG;
        }
        if options.edit {
            interactions |= Interactions::EDIT;
        }

        Self {
            rel,
            offset: node.offset,
            connector,
            rect: node.rect() - origin,
            left: node.extends_left(),
            lines,
            image,
            expand: node.has_children.then_some(node.collapsed),
            add: options.add_button,
            interactions,
        }
    }

    fn translate(&self) -> Vec2 {
        self.rel + self.offset
    }

    fn button_center(&self, slot: f64) -> Point {
        let x = if self.left {
            self.rect.x0 - slot
        } else {
            self.rect.x1 + slot
        };
        Point::new(x, self.rect.center().y)
    }
}

#[derive(Clone, Debug)]
struct Entry<H> {
    handles: NodeHandles<H>,
    visual: Visual,
    scope: Scope,
}

/// Key → handles, plus the membership of every sibling scope as of the last
/// pass.
#[derive(Clone, Debug)]
pub struct HandleMap<H> {
    entries: HashMap<GKey, Entry<H>>,
    scopes: HashMap<Scope, Vec<GKey>>,
}

impl<H> Default for HandleMap<H> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            scopes: HashMap::new(),
        }
    }
}

impl<H> HandleMap<H> {
    /// Handles of a key that is on screen.
    pub fn get(&self, key: GKey) -> Option<&NodeHandles<H>> {
        self.entries.get(&key).map(|e| &e.handles)
    }

    /// Whether `key` has visuals.
    pub fn contains(&self, key: GKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Scope a key was last reconciled in.
    pub fn scope_of(&self, key: GKey) -> Option<Scope> {
        self.entries.get(&key).map(|e| e.scope)
    }

    /// Members of a scope, in sibling order.
    pub fn keys_in(&self, scope: Scope) -> &[GKey] {
        self.scopes.get(&scope).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of keys with visuals.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is on screen.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Keeps a [`Scene`] in sync with successive [`Layout`]s.
///
/// Each pass walks the layout top-down. Within every sibling [`Scope`] the old
/// and new keys are [`diff`]ed: exiting keys lose their visuals at once,
/// updated keys animate to their new geometry, and entering keys get fresh
/// visuals. A node's children are reconciled only after its own group exists.
#[derive(Clone, Debug)]
pub struct Reconciler<H> {
    map: HandleMap<H>,
    options: ReconcileOptions,
}

impl<H: Copy + Eq + fmt::Debug> Reconciler<H> {
    /// An empty reconciler.
    pub fn new(options: ReconcileOptions) -> Self {
        Self {
            map: HandleMap::default(),
            options,
        }
    }

    /// Current options.
    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Change options. They take effect on the next pass.
    pub fn set_options(&mut self, options: ReconcileOptions) {
        self.options = options;
    }

    /// Everything currently on screen.
    pub fn handles(&self) -> &HandleMap<H> {
        &self.map
    }

    /// Bring `scene` in line with `frame`.
    pub fn reconcile<S: Scene<Handle = H>>(
        &mut self,
        scene: &mut S,
        frame: &Frame<'_>,
    ) -> ReconcileReport {
        let root_group = scene.root();
        let mut pass = Pass {
            scene,
            frame,
            options: &self.options,
            report: ReconcileReport::default(),
        };
        let ids = frame
            .layout
            .root()
            .map(|root| core::slice::from_ref(&root.id))
            .unwrap_or(&[]);
        let map = core::mem::take(&mut self.map);
        self.map = reconcile_scope(&mut pass, map, Scope::ROOT, root_group, ids);
        tracing::trace!(
            entered = pass.report.entered,
            updated = pass.report.updated,
            exited = pass.report.exited,
            "reconciled"
        );
        pass.report
    }

    /// Displace a node's group at once, without touching the tree.
    pub fn preview_offset<S: Scene<Handle = H>>(
        &mut self,
        scene: &mut S,
        key: GKey,
        offset: Vec2,
    ) -> bool {
        let Some(entry) = self.map.entries.get_mut(&key) else {
            return false;
        };
        entry.visual.offset = offset;
        scene.translate(entry.handles.group, entry.visual.translate(), Transition::IMMEDIATE);
        true
    }

    /// Animate a displaced node back to its laid-out position.
    pub fn snap_back<S: Scene<Handle = H>>(&mut self, scene: &mut S, key: GKey) -> bool {
        let Some(entry) = self.map.entries.get_mut(&key) else {
            return false;
        };
        entry.visual.offset = Vec2::ZERO;
        scene.translate(
            entry.handles.group,
            entry.visual.translate(),
            self.options.transition,
        );
        true
    }

    /// Drop every visual.
    pub fn clear<S: Scene<Handle = H>>(&mut self, scene: &mut S) {
        for key in self.map.keys_in(Scope::ROOT).to_vec() {
            if let Some(entry) = self.map.entries.get(&key) {
                scene.remove(entry.handles.group);
            }
        }
        self.map = HandleMap::default();
    }
}

struct Pass<'p, 'f, S: Scene> {
    scene: &'p mut S,
    frame: &'p Frame<'f>,
    options: &'p ReconcileOptions,
    report: ReconcileReport,
}

type Map<S> = HandleMap<<S as Scene>::Handle>;

fn reconcile_scope<S: Scene>(
    pass: &mut Pass<'_, '_, S>,
    mut map: Map<S>,
    scope: Scope,
    parent_group: S::Handle,
    ids: &[NodeId],
) -> Map<S> {
    let layout = pass.frame.layout;
    let new_keys: Vec<GKey> = ids
        .iter()
        .filter_map(|&id| layout.get(id))
        .map(|n| n.gkey)
        .collect();
    let old_keys = map.scopes.remove(&scope).unwrap_or_default();
    let d = diff(&old_keys, &new_keys);

    map = exit(pass, map, scope, &d.exit);
    map = update(pass, map, scope, &d.update);
    map = enter(pass, map, scope, parent_group, &d.enter);
    if !new_keys.is_empty() {
        map.scopes.insert(scope, new_keys);
    }
    map
}

fn reconcile_children<S: Scene>(
    pass: &mut Pass<'_, '_, S>,
    mut map: Map<S>,
    key: GKey,
    group: S::Handle,
) -> Map<S> {
    let layout = pass.frame.layout;
    let Some(node) = layout.get(key.id) else {
        return map;
    };
    for side in [Side::Left, Side::Right] {
        let ids: Vec<NodeId> = node
            .children
            .iter()
            .copied()
            .filter(|&c| layout.get(c).is_some_and(|n| n.side == side))
            .collect();
        map = reconcile_scope(pass, map, Scope { parent: Some(key), side }, group, &ids);
    }
    map
}

fn exit<S: Scene>(
    pass: &mut Pass<'_, '_, S>,
    mut map: Map<S>,
    scope: Scope,
    keys: &[GKey],
) -> Map<S> {
    for &key in keys {
        // A key that already entered another scope this pass is not ours to drop.
        if map.entries.get(&key).is_some_and(|e| e.scope == scope) {
            map = exit_one(pass, map, key);
        }
    }
    map
}

fn exit_one<S: Scene>(pass: &mut Pass<'_, '_, S>, mut map: Map<S>, key: GKey) -> Map<S> {
    if let Some(entry) = map.entries.remove(&key) {
        pass.scene.remove(entry.handles.group);
        pass.report.exited += 1;
        map = forget_descendants(pass, map, key);
    }
    map
}

/// Drop the entries below `key`. Their visuals went with its group.
fn forget_descendants<S: Scene>(
    pass: &mut Pass<'_, '_, S>,
    mut map: Map<S>,
    key: GKey,
) -> Map<S> {
    for side in [Side::Left, Side::Right] {
        let scope = Scope {
            parent: Some(key),
            side,
        };
        let Some(children) = map.scopes.remove(&scope) else {
            continue;
        };
        for child in children {
            if map.entries.get(&child).is_some_and(|e| e.scope == scope) {
                map.entries.remove(&child);
                pass.report.exited += 1;
                map = forget_descendants(pass, map, child);
            }
        }
    }
    map
}

fn update<S: Scene>(
    pass: &mut Pass<'_, '_, S>,
    mut map: Map<S>,
    scope: Scope,
    keys: &[GKey],
) -> Map<S> {
    let layout = pass.frame.layout;
    for &key in keys {
        let Some(node) = layout.get(key.id) else {
            continue;
        };
        let Some(entry) = map.entries.get_mut(&key) else {
            continue;
        };
        if entry.scope != scope {
            continue;
        }
        let visual = Visual::of(node, pass.frame, pass.options);
        if visual != entry.visual {
            apply_update(
                &mut *pass.scene,
                &mut entry.handles,
                &entry.visual,
                &visual,
                pass.options.transition,
            );
            entry.visual = visual;
            pass.report.updated += 1;
        }
        let group = entry.handles.group;
        map = reconcile_children(pass, map, key, group);
    }
    map
}

fn enter<S: Scene>(
    pass: &mut Pass<'_, '_, S>,
    mut map: Map<S>,
    scope: Scope,
    parent_group: S::Handle,
    keys: &[GKey],
) -> Map<S> {
    let layout = pass.frame.layout;
    for &key in keys {
        let Some(node) = layout.get(key.id) else {
            continue;
        };
        // Moved here from a scope that has not been visited yet.
        if map.entries.contains_key(&key) {
            map = exit_one(pass, map, key);
        }
        let visual = Visual::of(node, pass.frame, pass.options);
        let Some(handles) = build(&mut *pass.scene, parent_group, &visual) else {
            tracing::warn!(%key, "parent group is gone, skipping subtree");
            continue;
        };
        let group = handles.group;
        map.entries.insert(
            key,
            Entry {
                handles,
                visual,
                scope,
            },
        );
        pass.report.entered += 1;
        map = reconcile_children(pass, map, key, group);
    }
    map
}

fn build<S: Scene>(
    scene: &mut S,
    parent_group: S::Handle,
    visual: &Visual,
) -> Option<NodeHandles<S::Handle>> {
    let group = scene.append(
        parent_group,
        Element::Group {
            translate: visual.translate(),
        },
    )?;
    let connector = match visual.connector {
        Some((from, to)) => scene.append(group, Element::Connector { from, to }),
        None => None,
    };
    let content = scene.append(group, Element::Content)?;
    let hit = scene.append(content, Element::HitRect { rect: visual.rect })?;
    scene.bind(hit, visual.interactions);
    let mut handles = NodeHandles {
        group,
        connector,
        content,
        hit,
        label: None,
        image: None,
        add: None,
        expand: None,
    };
    sync_body(scene, &mut handles, visual);
    scene.raise(content);
    Some(handles)
}

fn apply_update<S: Scene>(
    scene: &mut S,
    handles: &mut NodeHandles<S::Handle>,
    old: &Visual,
    new: &Visual,
    transition: Transition,
) {
    if new.translate() != old.translate() {
        scene.translate(handles.group, new.translate(), transition);
    }
    if new.connector != old.connector
        && let (Some(connector), Some((from, to))) = (handles.connector, new.connector)
    {
        scene.connect(connector, from, to, transition);
    }
    if new.rect != old.rect {
        scene.replace(handles.hit, Element::HitRect { rect: new.rect });
    }
    if new.interactions != old.interactions {
        scene.bind(handles.hit, new.interactions);
    }
    sync_body(scene, handles, new);
    scene.raise(handles.content);
}

/// Label or image, then the affordances.
fn sync_body<S: Scene>(scene: &mut S, handles: &mut NodeHandles<S::Handle>, visual: &Visual) {
    let origin = visual.rect.origin();
    match &visual.image {
        Some((src, size)) => {
            if let Some(label) = handles.label.take() {
                scene.remove(label);
            }
            let element = Element::Image {
                src: src.clone(),
                origin,
                size: *size,
            };
            sync_slot(scene, handles.content, &mut handles.image, Some(element));
        }
        None => {
            if let Some(image) = handles.image.take() {
                scene.remove(image);
            }
            let element = Element::Label {
                origin,
                lines: visual.lines.clone(),
            };
            sync_slot(scene, handles.content, &mut handles.label, Some(element));
        }
    }

    let add = visual.add.then(|| Element::AddButton {
        center: visual.button_center(ADD_SLOT),
    });
    if sync_slot(scene, handles.content, &mut handles.add, add)
        && let Some(add) = handles.add
    {
        scene.bind(add, Interactions::ADD);
    }

    let expand = visual.expand.map(|collapsed| Element::ExpandButton {
        center: visual.button_center(EXPAND_SLOT),
        collapsed,
    });
    if sync_slot(scene, handles.content, &mut handles.expand, expand)
        && let Some(expand) = handles.expand
    {
        scene.bind(expand, Interactions::EXPAND);
    }
}

/// Make `slot` hold `element`. Returns true if a new element was appended.
fn sync_slot<S: Scene>(
    scene: &mut S,
    content: S::Handle,
    slot: &mut Option<S::Handle>,
    element: Option<Element>,
) -> bool {
    match (*slot, element) {
        (None, Some(element)) => {
            *slot = scene.append(content, element);
            slot.is_some()
        }
        (Some(handle), Some(element)) => {
            scene.replace(handle, element);
            false
        }
        (Some(handle), None) => {
            scene.remove(handle);
            *slot = None;
            false
        }
        (None, None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use understory_mind_layout::{LayoutConfig, MonospaceMeasure, project};
    use understory_mind_tree::{NodeData, TreeStore};
    use understory_scene::{SceneId, SceneTree};

    struct Rig {
        store: TreeStore,
        scene: SceneTree,
        rec: Reconciler<SceneId>,
    }

    impl Rig {
        /// root r -> [a, b -> [b1]], both on the right.
        fn new() -> Self {
            let json = r#"{"name":"r","children":[{"name":"a","left":false},{"name":"b","left":false,"children":[{"name":"b1"}]}]}"#;
            Self {
                store: TreeStore::from_data(NodeData::from_json(json).unwrap()),
                scene: SceneTree::new(),
                rec: Reconciler::new(ReconcileOptions::default()),
            }
        }

        fn pass(&mut self) -> ReconcileReport {
            let layout = project(
                &self.store,
                &LayoutConfig::default(),
                &MonospaceMeasure::default(),
            );
            let frame = Frame::new(&layout);
            self.rec.reconcile(&mut self.scene, &frame)
        }

        fn child(&self, parent: NodeId, i: usize) -> NodeId {
            self.store.children_of(parent)[i]
        }

        fn handles(&self, id: NodeId) -> NodeHandles<SceneId> {
            *self.rec.handles().get(self.store.gkey(id).unwrap()).unwrap()
        }
    }

    #[test]
    fn first_pass_enters_every_visible_node() {
        let mut rig = Rig::new();
        let report = rig.pass();
        assert_eq!(
            report,
            ReconcileReport {
                entered: 4,
                updated: 0,
                exited: 0
            }
        );
        let root = rig.handles(rig.store.root());
        assert_eq!(root.connector, None);
        assert_eq!(rig.scene.parent_of(root.group), Some(rig.scene.root()));

        let b = rig.child(rig.store.root(), 1);
        let bh = rig.handles(b);
        assert_eq!(rig.scene.parent_of(bh.group), Some(root.group));
        assert!(bh.expand.is_some());
        let b1 = rig.handles(rig.child(b, 0));
        assert_eq!(rig.scene.parent_of(b1.group), Some(bh.group));
        // Content is stacked above the connector.
        assert_eq!(rig.scene.children_of(b1.group), &[b1.connector.unwrap(), b1.content]);
    }

    #[test]
    fn unchanged_layout_is_a_quiet_pass() {
        let mut rig = Rig::new();
        rig.pass();
        assert_eq!(rig.pass(), ReconcileReport::default());
        assert!(!rig.scene.is_animating());
    }

    #[test]
    fn rename_updates_the_label_in_place() {
        let mut rig = Rig::new();
        rig.pass();
        let a = rig.child(rig.store.root(), 0);
        let before = rig.handles(a);
        assert!(rig.store.rename(a, "renamed"));
        let report = rig.pass();
        assert_eq!(report.entered, 0);
        assert_eq!(report.exited, 0);
        assert!(report.updated >= 1);
        let after = rig.handles(a);
        assert_eq!(before.group, after.group);
        assert_eq!(
            rig.scene.element(after.label.unwrap()),
            Some(&Element::Label {
                origin: Point::ZERO,
                lines: vec!["renamed".into()],
            })
        );
    }

    #[test]
    fn deleting_a_subtree_exits_it_at_once() {
        let mut rig = Rig::new();
        rig.pass();
        let b = rig.child(rig.store.root(), 1);
        let group = rig.handles(b).group;
        let b1_key = rig.store.gkey(rig.child(b, 0)).unwrap();
        assert!(rig.store.del(b));
        let report = rig.pass();
        assert_eq!(report.exited, 2);
        assert!(!rig.scene.is_alive(group));
        assert!(!rig.rec.handles().contains(b1_key));
        assert_eq!(rig.rec.handles().len(), 2);
    }

    #[test]
    fn collapse_hides_children_and_flips_the_control() {
        let mut rig = Rig::new();
        rig.pass();
        let b = rig.child(rig.store.root(), 1);
        assert!(rig.store.collapse(b));
        let report = rig.pass();
        assert_eq!(report.exited, 1);
        let expand = rig.handles(b).expand.unwrap();
        assert!(matches!(
            rig.scene.element(expand),
            Some(Element::ExpandButton {
                collapsed: true,
                ..
            })
        ));
        assert_eq!(rig.scene.interactions(expand), Some(Interactions::EXPAND));
    }

    #[test]
    fn side_flip_is_a_new_identity() {
        let mut rig = Rig::new();
        rig.pass();
        let a = rig.child(rig.store.root(), 0);
        let old_key = rig.store.gkey(a).unwrap();
        let old_group = rig.handles(a).group;
        assert!(rig.store.change_left(a));
        let report = rig.pass();
        assert_eq!(report.entered, 1);
        assert_eq!(report.exited, 1);
        assert!(!rig.rec.handles().contains(old_key));
        assert!(!rig.scene.is_alive(old_group));
        let new_key = rig.store.gkey(a).unwrap();
        assert_eq!(new_key.side, Side::Left);
        assert_eq!(
            rig.rec.handles().scope_of(new_key),
            Some(Scope {
                parent: rig.store.gkey(rig.store.root()),
                side: Side::Left,
            })
        );
    }

    #[test]
    fn reparent_moves_visuals_under_the_new_parent() {
        let mut rig = Rig::new();
        rig.pass();
        let a = rig.child(rig.store.root(), 0);
        let b = rig.child(rig.store.root(), 1);
        assert!(rig.store.move_child(b, a));
        let report = rig.pass();
        assert_eq!(report.exited, 1);
        assert_eq!(report.entered, 1);
        assert_eq!(
            rig.scene.parent_of(rig.handles(a).group),
            Some(rig.handles(b).group)
        );
        let b_key = rig.store.gkey(b).unwrap();
        assert_eq!(rig.rec.handles().keys_in(Scope { parent: Some(b_key), side: Side::Right }).len(), 2);
    }

    #[test]
    fn image_labels_swap_the_text_element() {
        let mut rig = Rig::new();
        rig.pass();
        let a = rig.child(rig.store.root(), 0);
        rig.store
            .rename(a, r#"{"src":"https://x/y.png","width":40,"height":30}"#);
        rig.pass();
        let h = rig.handles(a);
        assert_eq!(h.label, None);
        assert!(matches!(
            rig.scene.element(h.image.unwrap()),
            Some(Element::Image { src, size, .. }) if src == "https://x/y.png" && *size == Size::new(40.0, 30.0)
        ));

        rig.store.rename(a, "text again");
        rig.pass();
        let h = rig.handles(a);
        assert_eq!(h.image, None);
        assert!(h.label.is_some());
    }

    #[test]
    fn add_control_is_on_every_node_and_follows_the_option() {
        let mut rig = Rig::new();
        rig.pass();
        let a = rig.child(rig.store.root(), 0);
        let root = rig.handles(rig.store.root());
        assert!(root.add.is_some(), "the root gets one too");
        let add = rig.handles(a).add.unwrap();
        assert_eq!(rig.scene.interactions(add), Some(Interactions::ADD));
        let hit = rig.scene.interactions(rig.handles(a).hit).unwrap();
        assert!(hit.contains(Interactions::HOVER), "hover reveals the control");

        rig.rec.set_options(ReconcileOptions {
            add_button: false,
            ..ReconcileOptions::default()
        });
        rig.pass();
        assert_eq!(rig.handles(a).add, None);
        assert!(!rig.scene.is_alive(add));
    }

    #[test]
    fn root_is_never_draggable() {
        let mut rig = Rig::new();
        rig.pass();
        let root = rig.handles(rig.store.root());
        let a = rig.handles(rig.child(rig.store.root(), 0));
        let root_i = rig.scene.interactions(root.hit).unwrap();
        let a_i = rig.scene.interactions(a.hit).unwrap();
        assert!(!root_i.contains(Interactions::DRAG));
        assert!(a_i.contains(Interactions::DRAG | Interactions::EDIT | Interactions::SELECT));

        rig.rec.set_options(ReconcileOptions {
            drag: false,
            edit: false,
            ..ReconcileOptions::default()
        });
        rig.pass();
        let a_i = rig.scene.interactions(a.hit).unwrap();
        assert!(!a_i.intersects(Interactions::DRAG | Interactions::EDIT));
    }

    #[test]
    fn preview_then_snap_back() {
        let mut rig = Rig::new();
        rig.pass();
        let a = rig.child(rig.store.root(), 0);
        let key = rig.store.gkey(a).unwrap();
        let group = rig.handles(a).group;
        let home = rig.scene.translation(group).unwrap();

        assert!(rig.rec.preview_offset(&mut rig.scene, key, Vec2::new(10.0, 5.0)));
        assert_eq!(rig.scene.translation(group), Some(home + Vec2::new(10.0, 5.0)));
        assert!(rig.rec.snap_back(&mut rig.scene, key));
        assert!(rig.scene.is_animating());
        assert_eq!(rig.scene.target_translation(group), Some(home));
        rig.scene.advance(500.0);
        assert_eq!(rig.scene.translation(group), Some(home));
    }

    #[test]
    fn clear_drops_everything() {
        let mut rig = Rig::new();
        rig.pass();
        rig.rec.clear(&mut rig.scene);
        assert!(rig.rec.handles().is_empty());
        assert_eq!(rig.scene.len(), 1);
        assert_eq!(rig.pass().entered, 4);
    }
}
