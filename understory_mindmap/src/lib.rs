// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Mind Map: an editing session over the mind-map engine crates.
//!
//! [`MindMap`] owns one open map. It wires the pieces together:
//!
//! - [`understory_mind_tree`] holds the nodes and applies structural edits,
//! - [`understory_mind_layout`] projects them into two-sided geometry,
//! - [`understory_reconcile`] keeps a [`Scene`](understory_scene::Scene) in
//!   step with that geometry,
//! - [`understory_drag`] turns pointer gestures into edits.
//!
//! Around that core sit the host-facing pieces: [`Settings`], the markdown
//! [`Document`] a map is saved in together with its image [`AssetTable`],
//! clipboard payloads, and the [`ViewTransform`] pointer positions are mapped
//! through.
//!
//! ## Example
//!
//! ```
//! use kurbo::Point;
//! use understory_mindmap::{Document, MindMap, Settings};
//! use understory_scene::SceneTree;
//!
//! let doc = Document::parse("```json\n{\"name\":\"Plans\"}\n```\n").unwrap();
//! let mut map = MindMap::new(SceneTree::new(), doc, Settings::default());
//! let root = map.store().root();
//!
//! let idea = map.add(root, "Idea").unwrap();
//! assert_eq!(map.selected(), Some(idea));
//! assert_eq!(map.pointer_down(Point::new(4.0, 4.0)), Some(root));
//!
//! let saved = map.document().render().unwrap();
//! assert!(saved.contains("\"Idea\""));
//! ```

mod assets;
pub mod clipboard;
mod document;
mod error;
mod session;
mod settings;
mod view;

pub use assets::{
    AssetCollaborator, AssetEntry, AssetTable, IMAGE_THRESHOLD, ImportedImage, MAX_ASSETS,
    scale_to_threshold,
};
pub use document::Document;
pub use error::{MindMapError, Result};
pub use session::{MindMap, PersistenceSink};
pub use settings::Settings;
pub use view::{MAX_SCALE, MIN_SCALE, ViewTransform};
