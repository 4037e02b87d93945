// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The persisted node shape.

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One node as it is stored on disk and on the clipboard.
///
/// Ids are never part of this shape; they are assigned when the data enters a
/// [`TreeStore`](crate::TreeStore). Fields this crate does not know about are
/// kept in [`NodeData::extra`] and written back untouched.
///
/// A `"children": null` is kept in `extra` so it is written back as loaded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNodeData")]
pub struct NodeData {
    /// Label text or a serialized [`ImageLabel`](crate::ImageLabel); `None`
    /// when the field was absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Ordered children.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeData>>,
    /// Whether the children are hidden.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    /// Side of a depth-1 node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<bool>,
    /// Unknown fields, preserved across a load and save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawNodeData {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    children: Option<Option<Vec<NodeData>>>,
    #[serde(default)]
    collapsed: Option<bool>,
    #[serde(default)]
    left: Option<bool>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Absent is `None`, `null` is `Some(None)`.
fn nullable<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Option<Vec<NodeData>>>, D::Error> {
    Option::<Vec<NodeData>>::deserialize(deserializer).map(Some)
}

impl From<RawNodeData> for NodeData {
    fn from(raw: RawNodeData) -> Self {
        let mut extra = raw.extra;
        let children = match raw.children {
            Some(None) => {
                extra.insert("children".into(), Value::Null);
                None
            }
            Some(children) => children,
            None => None,
        };
        Self {
            name: raw.name,
            children,
            collapsed: raw.collapsed,
            left: raw.left,
            extra,
        }
    }
}

impl NodeData {
    /// A leaf with the given label.
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// The label, empty when the node has none.
    pub fn label_text(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Builder-style helper that appends a child.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    /// Parse clipboard or file text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&str> for NodeData {
    fn from(name: &str) -> Self {
        Self::leaf(name)
    }
}

impl From<String> for NodeData {
    fn from(name: String) -> Self {
        Self::leaf(name)
    }
}
