// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clipboard payloads: one subtree as persisted JSON, never carrying ids.

use serde_json::Value;
use understory_mind_tree::{NodeData, NodeId, TreeStore};

/// Serialize the subtree rooted at `id`.
pub fn encode(store: &TreeStore, id: NodeId) -> Option<String> {
    let data = store.subtree_data(id)?;
    match data.to_json() {
        Ok(text) => Some(text),
        Err(err) => {
            tracing::warn!(%id, %err, "subtree did not serialize");
            None
        }
    }
}

/// Turn clipboard text into a subtree.
///
/// A JSON object with a string `name` is taken as a copied subtree. Anything
/// else becomes a single node labelled with the text.
pub fn decode(text: &str) -> NodeData {
    let is_subtree = serde_json::from_str::<Value>(text)
        .ok()
        .is_some_and(|v| v.get("name").is_some_and(Value::is_string));
    if is_subtree && let Ok(data) = NodeData::from_json(text) {
        return data;
    }
    NodeData::leaf(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copied_subtree_pastes_back() {
        let store = TreeStore::from_data(
            NodeData::from_json(r#"{"name":"r","children":[{"name":"a","collapsed":true,"children":[{"name":"a1"}]}]}"#)
                .unwrap(),
        );
        let a = store.children_of(store.root())[0];
        let text = encode(&store, a).unwrap();
        let data = decode(&text);
        assert_eq!(data.label_text(), "a");
        assert_eq!(data.collapsed, Some(true));
        assert_eq!(data.children.map(|c| c.len()), Some(1));
    }

    #[test]
    fn other_text_becomes_a_leaf() {
        for text in ["plain words", "42", r#"{"title":"x"}"#, r#"{"name":7}"#, "{oops"] {
            assert_eq!(decode(text), NodeData::leaf(text), "{text:?}");
        }
    }

    #[test]
    fn stale_id_copies_nothing() {
        let mut store = TreeStore::new("r");
        let a = store.add(store.root(), "a").unwrap();
        assert!(store.del(a), "delete a");
        assert_eq!(encode(&store, a), None);
    }
}
