// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Scene: a small retained scene graph for mind-map rendering.
//!
//! - [`SceneTree`]: a generational arena of [`Element`]s with ordered children.
//!   Later children paint on top, and [`SceneTree::raise`] restacks.
//! - [`Transition`]: group translations and connector endpoints animate toward
//!   their targets as [`SceneTree::advance`] moves the compositor clock. A new
//!   target issued mid-flight starts from the displayed value.
//! - [`Interactions`]: which input handlers an element carries.
//! - [`Scene`]: the trait a reconciler drives. [`SceneTree`] implements it;
//!   other renderers (immediate-mode canvases, DOM bridges) can too.
//!
//! The graph knows nothing about mind-map nodes. It is fed by a reconciler that
//! maps node keys to element handles.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod scene;
mod transition;
mod tree;
mod types;

pub use scene::Scene;
pub use transition::{Easing, Transition};
pub use tree::SceneTree;
pub use types::{Element, Interactions, SceneId};
