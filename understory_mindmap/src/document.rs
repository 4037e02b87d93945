// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The markdown file a mind map is saved in.
//!
//! ```text
//! ---
//! type: mindmap-plugin
//! tags:
//!   - mindmap
//! ---
//!
//! <%%
//! <asset id>: [[<host reference>]]
//! %%>
//!
//! ```json
//! {"name":"Title","children":[...]}
//! ```
//! ```

use understory_mind_tree::NodeData;

use crate::assets::{AssetTable, MAX_ASSETS};
use crate::error::{MindMapError, Result};

const FRONT_MATTER: &str = "---\ntype: mindmap-plugin\ntags:\n  - mindmap\n---\n";

/// A parsed mind-map file.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// The tree, exactly as stored.
    pub tree: NodeData,
    /// Image assets referenced from labels.
    pub assets: AssetTable,
}

impl Document {
    /// A document from its parts.
    pub fn new(tree: NodeData, assets: AssetTable) -> Self {
        Self { tree, assets }
    }

    /// The content of a newly created file: a title and one primary node.
    pub fn untitled() -> Self {
        Self::new(
            NodeData::leaf("Title").with_child(NodeData::leaf("Primary Node")),
            AssetTable::new(),
        )
    }

    /// Read a file.
    ///
    /// The tree block is required. An absent or empty asset block reads as an
    /// empty table.
    pub fn parse(text: &str) -> Result<Self> {
        let json = fenced(text, "```json", "```")
            .filter(|body| !body.is_empty())
            .ok_or(MindMapError::MissingTreeBlock)?;
        let tree = NodeData::from_json(json)?;
        let assets = match fenced(text, "<%%", "%%>") {
            Some(body) => AssetTable::parse_block(body),
            None => {
                tracing::debug!("document has no asset block");
                AssetTable::new()
            }
        };
        Ok(Self { tree, assets })
    }

    /// Write the file.
    ///
    /// Assets no label refers to are left out, and at most the
    /// [`MAX_ASSETS`] most recent ones are kept.
    pub fn render(&self) -> Result<String> {
        let json = self.tree.to_json()?;
        let mut assets = self.assets.clone();
        assets.retain_referenced(&self.tree);
        assets.truncate_oldest(MAX_ASSETS);
        Ok(format!(
            "{FRONT_MATTER}\n<%%\n{}\n%%>\n\n```json\n{json}\n```\n",
            assets.render_block()
        ))
    }
}

/// The text between `open` and `close`, each separated from the body by one
/// line break. The first complete block wins and the body is matched lazily.
fn fenced<'a>(text: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let mut from = 0;
    while let Some(found) = text[from..].find(open) {
        let start = from + found + open.len();
        from = start;
        let Some(body) = text[start..].strip_prefix(['\r', '\n']) else {
            continue;
        };
        for (end, _) in body.match_indices(close) {
            if end > 0 && body[..end].ends_with(['\r', '\n']) {
                return Some(&body[..end - 1]);
            }
        }
    }
    None
}
