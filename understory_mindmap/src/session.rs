// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The editing session.

use core::fmt;

use kurbo::{Point, Vec2};
use understory_drag::{DragController, DragPhase, DragUpdate, DropAction};
use understory_mind_layout::{Layout, LayoutConfig, MonospaceMeasure, project};
use understory_mind_tree::{ImageLabel, NodeData, NodeId, Placement, TreeStore};
use understory_reconcile::{Frame, ReconcileReport, Reconciler};
use understory_scene::{Scene, SceneTree};

use crate::assets::{
    AssetCollaborator, AssetTable, IMAGE_THRESHOLD, MAX_ASSETS, scale_to_threshold,
};
use crate::clipboard;
use crate::document::Document;
use crate::error::{MindMapError, Result};
use crate::settings::Settings;
use crate::view::ViewTransform;

/// Receives the document after every change.
pub trait PersistenceSink {
    /// Store `document`. Its asset table is already pruned.
    fn save(&mut self, document: &Document);
}

/// One open mind map: the tree, what it looks like, and the gesture in
/// progress.
///
/// Every edit is a single step: the store changes, the layout is projected
/// again, the scene is reconciled, and the persistence sink is told. Edits
/// that do not apply (stale ids, cycles, root-only restrictions) change
/// nothing and return `false` or `None`.
pub struct MindMap<S: Scene> {
    store: TreeStore,
    settings: Settings,
    config: LayoutConfig,
    measure: MonospaceMeasure,
    layout: Layout,
    scene: S,
    reconciler: Reconciler<S::Handle>,
    drag: DragController,
    selected: Option<NodeId>,
    view: ViewTransform,
    assets: AssetTable,
    collaborator: Option<Box<dyn AssetCollaborator>>,
    sink: Option<Box<dyn PersistenceSink>>,
    last_report: ReconcileReport,
}

impl<S: Scene> fmt::Debug for MindMap<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MindMap")
            .field("nodes", &self.store.len())
            .field("revision", &self.store.revision())
            .field("selected", &self.selected)
            .field("drag", &self.drag.phase())
            .field("view", &self.view)
            .field("assets", &self.assets.len())
            .finish_non_exhaustive()
    }
}

impl<S: Scene> MindMap<S> {
    /// Open `document`, drawing it into `scene`.
    pub fn new(scene: S, document: Document, settings: Settings) -> Self {
        let store = TreeStore::from_data(document.tree);
        let config = settings.layout_config();
        let measure = settings.measure();
        let layout = project(&store, &config, &measure);
        let mut map = Self {
            store,
            reconciler: Reconciler::new(settings.reconcile_options()),
            settings,
            config,
            measure,
            layout,
            scene,
            drag: DragController::new(),
            selected: None,
            view: ViewTransform::IDENTITY,
            assets: document.assets,
            collaborator: None,
            sink: None,
            last_report: ReconcileReport::default(),
        };
        map.redraw();
        tracing::debug!(nodes = map.store.len(), "mind map opened");
        map
    }

    /// Report every change to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: impl PersistenceSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Resolve and import images through `collaborator`.
    #[must_use]
    pub fn with_assets(mut self, collaborator: impl AssetCollaborator + 'static) -> Self {
        self.collaborator = Some(Box::new(collaborator));
        self.redraw();
        self
    }

    /// The tree.
    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    /// The current geometry.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The scene being driven.
    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// The scene, for host-side changes outside the mind map's own elements.
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Handles of the visuals currently on screen.
    pub fn reconciler(&self) -> &Reconciler<S::Handle> {
        &self.reconciler
    }

    /// What the latest reconciliation pass did.
    pub fn last_report(&self) -> ReconcileReport {
        self.last_report
    }

    /// Current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings and redraw with them.
    pub fn set_settings(&mut self, settings: Settings) {
        self.config = settings.layout_config();
        self.measure = settings.measure();
        self.reconciler.set_options(settings.reconcile_options());
        self.settings = settings;
        self.refresh();
    }

    /// The image side-table, unpruned.
    pub fn assets(&self) -> &AssetTable {
        &self.assets
    }

    /// Pan and zoom.
    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    /// Pan and zoom, for the host's gesture handling.
    pub fn view_mut(&mut self) -> &mut ViewTransform {
        &mut self.view
    }

    /// The document as it would be saved now.
    pub fn document(&self) -> Document {
        let tree = self.store.to_data();
        let mut assets = self.assets.clone();
        assets.retain_referenced(&tree);
        assets.truncate_oldest(MAX_ASSETS);
        Document::new(tree, assets)
    }

    /// The selected node.
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Select a visible node.
    pub fn select(&mut self, id: NodeId) -> bool {
        if !self.layout.contains(id) {
            return false;
        }
        self.selected = Some(id);
        true
    }

    /// Drop the selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Add a child under `parent` and select it.
    pub fn add(&mut self, parent: NodeId, payload: impl Into<NodeData>) -> Option<NodeId> {
        let id = self.store.add(parent, payload)?;
        self.selected = Some(id);
        self.commit("add");
        Some(id)
    }

    /// Add a sibling next to `id` and select it.
    pub fn add_sibling(
        &mut self,
        id: NodeId,
        payload: impl Into<NodeData>,
        before: bool,
    ) -> Option<NodeId> {
        let new = self.store.add_sibling(id, payload, before)?;
        self.selected = Some(new);
        self.commit("add_sibling");
        Some(new)
    }

    /// Insert a new parent above `id` and select it.
    pub fn add_parent(&mut self, id: NodeId, payload: impl Into<NodeData>) -> Option<NodeId> {
        let new = self.store.add_parent(id, payload)?;
        self.selected = Some(new);
        self.commit("add_parent");
        Some(new)
    }

    /// Delete `id` and its subtree. A deleted selection passes to the parent.
    pub fn del(&mut self, id: NodeId) -> bool {
        let parent = self.store.parent_of(id);
        if !self.store.del(id) {
            return false;
        }
        self.reselect(parent);
        self.commit("del")
    }

    /// Delete `id` alone, promoting its children.
    pub fn del_one(&mut self, id: NodeId) -> bool {
        let parent = self.store.parent_of(id);
        if !self.store.del_one(id) {
            return false;
        }
        self.reselect(parent);
        self.commit("del_one")
    }

    /// Change a label.
    pub fn rename(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        self.store.rename(id, text) && self.commit("rename")
    }

    /// Hide the children of `id`.
    pub fn collapse(&mut self, id: NodeId) -> bool {
        self.store.collapse(id) && self.commit("collapse")
    }

    /// Show the children of `id`.
    pub fn expand(&mut self, id: NodeId) -> bool {
        self.store.expand(id) && self.commit("expand")
    }

    /// Expand a collapsed node or collapse an expanded one.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        match self.store.find(id) {
            Some(node) if node.is_collapsed() => self.expand(id),
            Some(_) => self.collapse(id),
            None => false,
        }
    }

    /// Make `id` the last child of `new_parent`.
    pub fn move_child(&mut self, new_parent: NodeId, id: NodeId) -> bool {
        self.store.move_child(new_parent, id) && self.commit("move_child")
    }

    /// Place `id` next to its sibling `target`.
    pub fn move_sibling(&mut self, id: NodeId, target: NodeId, placement: Placement) -> bool {
        self.store.move_sibling(id, target, placement) && self.commit("move_sibling")
    }

    /// Move a root child to the other half.
    pub fn change_left(&mut self, id: NodeId) -> bool {
        self.store.change_left(id) && self.commit("change_left")
    }

    /// Clipboard text for the subtree at `id`.
    pub fn copy(&self, id: NodeId) -> Option<String> {
        clipboard::encode(&self.store, id)
    }

    /// Copy the subtree at `id`, then delete it. The root cannot be cut.
    pub fn cut(&mut self, id: NodeId) -> Option<String> {
        if self.store.parent_of(id).is_none() {
            return None;
        }
        let text = self.copy(id)?;
        self.del(id).then_some(text)
    }

    /// Add clipboard text under `parent`: a copied subtree, or a plain label.
    pub fn paste(&mut self, parent: NodeId, text: &str) -> Option<NodeId> {
        self.add(parent, clipboard::decode(text))
    }

    /// Store an image through the asset collaborator and show it as the label
    /// of `id`.
    ///
    /// Returns `Ok(false)` when `id` is stale.
    pub fn insert_image(&mut self, id: NodeId, bytes: &[u8], file_name: &str) -> Result<bool> {
        if !self.store.is_alive(id) {
            return Ok(false);
        }
        let collaborator = self
            .collaborator
            .as_mut()
            .ok_or_else(|| MindMapError::asset("no asset collaborator"))?;
        let image = collaborator.import(bytes, file_name, &self.assets)?;
        if self.assets.contains(&image.asset_id) {
            return Err(MindMapError::asset(format!(
                "asset id {} is already in use",
                image.asset_id
            )));
        }
        let size = scale_to_threshold(image.size, IMAGE_THRESHOLD);
        tracing::debug!(%id, asset = %image.asset_id, file_name, "image inserted");
        self.assets.insert(image.asset_id.clone(), image.value);
        let label = ImageLabel {
            src: image.src,
            width: size.width,
            height: size.height,
            file_id: Some(image.asset_id),
        };
        Ok(self.rename(id, label.to_json()))
    }

    /// The topmost node whose label box contains a tree-space point.
    pub fn node_at(&self, point: Point) -> Option<NodeId> {
        self.layout
            .iter()
            .rev()
            .find(|n| n.displaced_rect().contains(point))
            .map(|n| n.id)
    }

    /// Phase of the drag gesture.
    pub fn drag_phase(&self) -> DragPhase {
        self.drag.phase()
    }

    /// The node a drag would currently drop onto.
    pub fn drag_highlight(&self) -> Option<NodeId> {
        self.drag.highlight()
    }

    /// Press at a screen position: select the node there and, if dragging is
    /// enabled, start dragging it.
    pub fn pointer_down(&mut self, screen: Point) -> Option<NodeId> {
        let point = self.view.to_tree(screen);
        let hit = self.node_at(point)?;
        self.select(hit);
        if self.settings.drag {
            self.drag.begin(&self.layout, hit, point);
        }
        Some(hit)
    }

    /// Move the pointer. While dragging, the node follows it at once.
    pub fn pointer_move(&mut self, screen: Point) -> Option<DragUpdate> {
        let point = self.view.to_tree(screen);
        let update = self.drag.on_move(&self.layout, point)?;
        let node = self.drag.active()?.node;
        self.displace(node, update.offset);
        Some(update)
    }

    /// Release the pointer, committing the drag as one edit.
    ///
    /// Returns the resolved action. A revert, or an action the tree refuses,
    /// animates the node back home.
    pub fn pointer_up(&mut self, screen: Point) -> Option<DropAction> {
        self.pointer_move(screen);
        let action = self.drag.release(&self.layout)?;
        let node = action.node();
        let applied = action.apply(&mut self.store);
        self.drag.finish();
        if applied {
            self.commit("drop");
        } else {
            self.snap_back(node);
        }
        Some(action)
    }

    /// Abandon the drag in progress and animate the node home.
    pub fn cancel_drag(&mut self) -> Option<NodeId> {
        let node = self.drag.cancel()?;
        self.snap_back(node);
        Some(node)
    }

    fn displace(&mut self, node: NodeId, offset: Vec2) {
        self.layout.set_offset(node, offset);
        if let Some(key) = self.layout.get(node).map(|n| n.gkey) {
            self.reconciler.preview_offset(&mut self.scene, key, offset);
        }
    }

    fn snap_back(&mut self, node: NodeId) {
        self.layout.set_offset(node, Vec2::ZERO);
        if let Some(key) = self.layout.get(node).map(|n| n.gkey) {
            self.reconciler.snap_back(&mut self.scene, key);
        }
    }

    fn reselect(&mut self, fallback: Option<NodeId>) {
        if self.selected.is_some_and(|id| !self.store.is_alive(id)) {
            self.selected = fallback;
        }
    }

    /// Follow a successful store mutation through layout, scene and sink.
    fn commit(&mut self, op: &'static str) -> bool {
        tracing::debug!(op, revision = self.store.revision(), "tree edited");
        self.refresh();
        if self.sink.is_some() {
            let document = self.document();
            if let Some(sink) = self.sink.as_mut() {
                sink.save(&document);
            }
        }
        true
    }

    fn refresh(&mut self) {
        self.layout = project(&self.store, &self.config, &self.measure);
        if self.selected.is_some_and(|id| !self.layout.contains(id)) {
            self.selected = None;
        }
        if let Some((node, offset)) = self.drag.active().map(|d| (d.node, d.offset)) {
            self.layout.set_offset(node, offset);
        }
        self.redraw();
    }

    fn redraw(&mut self) {
        let collaborator = self.collaborator.as_deref();
        let resolve = |image: &ImageLabel| -> Option<String> {
            collaborator?.resolve(image.file_id.as_deref()?)
        };
        let frame = Frame::new(&self.layout).with_resolver(&resolve);
        self.last_report = self.reconciler.reconcile(&mut self.scene, &frame);
    }
}

impl MindMap<SceneTree> {
    /// Drive the scene's animations to `now_ms`. Returns true while any are
    /// still running.
    pub fn advance(&mut self, now_ms: f64) -> bool {
        self.scene.advance(now_ms)
    }
}
