// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pan and zoom between screen space and tree space.

use kurbo::{Affine, Point, Vec2};

/// Smallest zoom factor [`ViewTransform::zoom_at`] allows.
pub const MIN_SCALE: f64 = 0.1;
/// Largest zoom factor [`ViewTransform::zoom_at`] allows.
pub const MAX_SCALE: f64 = 8.0;

/// A uniform scale followed by a translation: `screen = tree * scale + translate`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    /// Zoom factor.
    pub scale: f64,
    /// Screen position of the tree origin.
    pub translate: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    /// No pan, no zoom.
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        translate: Vec2::ZERO,
    };

    /// Tree space to screen space.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.translate) * Affine::scale(self.scale)
    }

    /// Map a pointer position into tree space.
    pub fn to_tree(&self, screen: Point) -> Point {
        self.affine().inverse() * screen
    }

    /// Map a tree-space point onto the screen.
    pub fn to_screen(&self, tree: Point) -> Point {
        self.affine() * tree
    }

    /// Shift the view by a screen-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.translate += delta;
    }

    /// Multiply the zoom by `factor`, keeping the tree point under `anchor`
    /// (in screen space) where it is. The result is clamped to
    /// [`MIN_SCALE`]..=[`MAX_SCALE`].
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let pinned = self.to_tree(anchor);
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.translate = anchor.to_vec2() - pinned.to_vec2() * self.scale;
    }
}
