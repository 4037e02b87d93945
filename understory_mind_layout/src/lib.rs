// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Mind Layout: geometry for a two-sided mind-map.
//!
//! [`project`] turns the visible part of a
//! [`TreeStore`](understory_mind_tree::TreeStore) into a [`Layout`]: one
//! [`LayoutNode`] per visible node with its depth, side, wrapped label lines,
//! measured size and position.
//!
//! - The root is at the origin. Depth-1 subtrees are stacked on the side the
//!   tree assigned them and every subtree is vertically centered on its parent.
//! - Horizontal position only depends on depth and is mirrored around the
//!   root's horizontal center for the left half.
//! - Labels are wrapped lazily by [`wrap`] against a [`TextMeasure`]. Image
//!   labels take their declared size and a single blank line.
//!
//! Layout is recomputed in full after every edit. It is a pure function of the
//! tree, the [`LayoutConfig`] and the measure, so an unchanged tree yields an
//! identical layout.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod layout;
mod measure;
mod wrap;

pub use config::LayoutConfig;
pub use layout::{Layout, LayoutNode, Line, project};
pub use measure::{MonospaceMeasure, TextMeasure};
pub use wrap::{Fragments, LineFragment, wrap};
