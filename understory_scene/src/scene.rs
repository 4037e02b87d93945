// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The renderer seam.

use kurbo::{Point, Vec2};

use crate::transition::Transition;
use crate::tree::SceneTree;
use crate::types::{Element, Interactions, SceneId};

/// A retained renderer the reconciler can drive.
///
/// Handles are opaque to callers. Every method tolerates a stale handle by
/// doing nothing; [`Scene::append`] returns `None` instead.
pub trait Scene {
    /// Opaque element handle.
    type Handle: Copy + Eq + core::fmt::Debug;

    /// The group everything else hangs off.
    fn root(&self) -> Self::Handle;

    /// Append a child on top of its siblings.
    fn append(&mut self, parent: Self::Handle, element: Element) -> Option<Self::Handle>;

    /// Replace an element's content without animation.
    fn replace(&mut self, handle: Self::Handle, element: Element);

    /// Move a group.
    fn translate(&mut self, handle: Self::Handle, to: Vec2, transition: Transition);

    /// Move a connector's endpoints.
    fn connect(&mut self, handle: Self::Handle, from: Point, to: Point, transition: Transition);

    /// Remove an element and its subtree at once.
    fn remove(&mut self, handle: Self::Handle);

    /// Stack an element above its siblings.
    fn raise(&mut self, handle: Self::Handle);

    /// Bind input handlers.
    fn bind(&mut self, handle: Self::Handle, interactions: Interactions);
}

impl Scene for SceneTree {
    type Handle = SceneId;

    fn root(&self) -> SceneId {
        Self::root(self)
    }

    fn append(&mut self, parent: SceneId, element: Element) -> Option<SceneId> {
        Self::append(self, parent, element)
    }

    fn replace(&mut self, handle: SceneId, element: Element) {
        Self::replace(self, handle, element);
    }

    fn translate(&mut self, handle: SceneId, to: Vec2, transition: Transition) {
        self.translate_to(handle, to, transition);
    }

    fn connect(&mut self, handle: SceneId, from: Point, to: Point, transition: Transition) {
        Self::connect(self, handle, from, to, transition);
    }

    fn remove(&mut self, handle: SceneId) {
        Self::remove(self, handle);
    }

    fn raise(&mut self, handle: SceneId) {
        Self::raise(self, handle);
    }

    fn bind(&mut self, handle: SceneId, interactions: Interactions) {
        Self::bind(self, handle, interactions);
    }
}
