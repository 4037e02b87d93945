// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The image asset side-table and the collaborator that stores images.

use kurbo::Size;
use understory_mind_tree::{Label, NodeData};

use crate::error::Result;

/// Longest side, in tree units, of a freshly inserted image.
pub const IMAGE_THRESHOLD: f64 = 100.0;

/// Most entries a saved document keeps. Older entries are dropped first.
pub const MAX_ASSETS: usize = 9999;

/// One side-table row: an asset id and the host's reference for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetEntry {
    /// Id stored in image labels as `fileId`.
    pub id: String,
    /// Host reference, typically a vault path.
    pub value: String,
}

/// Insertion-ordered asset side-table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetTable {
    entries: Vec<AssetEntry>,
}

impl AssetTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, oldest first.
    pub fn iter(&self) -> core::slice::Iter<'_, AssetEntry> {
        self.entries.iter()
    }

    /// The host reference for `id`.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.value.as_str())
    }

    /// Returns true if `id` has an entry.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Add an entry, or update the value of an existing one in place.
    pub fn insert(&mut self, id: impl Into<String>, value: impl Into<String>) {
        let id = id.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.value = value;
        } else {
            self.entries.push(AssetEntry { id, value });
        }
    }

    /// Keep only entries whose id some image label in `tree` refers to.
    pub fn retain_referenced(&mut self, tree: &NodeData) {
        let mut referenced = Vec::new();
        collect_file_ids(tree, &mut referenced);
        let before = self.entries.len();
        self.entries.retain(|e| referenced.contains(&e.id));
        if self.entries.len() != before {
            tracing::debug!(dropped = before - self.entries.len(), "pruned unused assets");
        }
    }

    /// Keep at most the `max` most recent entries.
    pub fn truncate_oldest(&mut self, max: usize) {
        if self.entries.len() > max {
            let excess = self.entries.len() - max;
            self.entries.drain(..excess);
        }
    }

    /// Parse the body of an asset block: one `<id>: [[<value>]]` per line.
    ///
    /// Lines of any other shape are skipped.
    pub fn parse_block(text: &str) -> Self {
        let mut table = Self::new();
        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            match parse_line(line) {
                Some((id, value)) => table.entries.push(AssetEntry {
                    id: id.into(),
                    value: value.into(),
                }),
                None if !line.trim().is_empty() => {
                    tracing::debug!(line, "skipping malformed asset line");
                }
                None => {}
            }
        }
        table
    }

    /// The body of an asset block, without a trailing newline.
    pub fn render_block(&self) -> String {
        let lines: Vec<String> = self
            .entries
            .iter()
            .map(|e| format!("{}: [[{}]]", e.id, e.value))
            .collect();
        lines.join("\n")
    }
}

impl<'a> IntoIterator for &'a AssetTable {
    type Item = &'a AssetEntry;
    type IntoIter = core::slice::Iter<'a, AssetEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Split `id: [[value]]`. The id ends at the first colon that is followed
/// (after optional whitespace) by `[[`, and the value runs to the final `]]`.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let body = line.strip_suffix("]]")?;
    for (colon, _) in line.match_indices(':') {
        let rest = line[colon + 1..].trim_start();
        if rest.starts_with("[[") && rest.len() >= 4 {
            let start = line.len() - rest.len() + 2;
            if start <= body.len() {
                return Some((&line[..colon], &body[start..]));
            }
        }
    }
    None
}

fn collect_file_ids(node: &NodeData, out: &mut Vec<String>) {
    if let Label::Image(image) = Label::classify(node.label_text())
        && let Some(id) = image.file_id
        && !out.contains(&id)
    {
        out.push(id);
    }
    for child in node.children.iter().flatten() {
        collect_file_ids(child, out);
    }
}

/// Scale an image so its longer side is `threshold`, keeping the aspect ratio.
///
/// Square images (and degenerate ones) are scaled by height.
pub fn scale_to_threshold(size: Size, threshold: f64) -> Size {
    if size.width > size.height {
        Size::new(threshold, size.height / size.width * threshold)
    } else if size.height > 0.0 {
        Size::new(size.width / size.height * threshold, threshold)
    } else {
        Size::new(0.0, threshold)
    }
}

/// An image stored by the host.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportedImage {
    /// Displayable source.
    pub src: String,
    /// Natural size in pixels.
    pub size: Size,
    /// Id under which the image is recorded in the side-table.
    pub asset_id: String,
    /// Host reference to record for `asset_id`.
    pub value: String,
}

/// Where image binaries live.
pub trait AssetCollaborator {
    /// A displayable source for an asset id, if the host knows it.
    fn resolve(&self, asset_id: &str) -> Option<String>;

    /// Persist an image and describe it.
    ///
    /// `existing` holds the asset ids already in use; the returned id must not
    /// be one of them.
    fn import(
        &mut self,
        bytes: &[u8],
        file_name: &str,
        existing: &AssetTable,
    ) -> Result<ImportedImage>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use understory_mind_tree::ImageLabel;

    fn image_node(id: &str) -> NodeData {
        NodeData::leaf(
            ImageLabel {
                src: "app://local/a.png".into(),
                width: 10.0,
                height: 10.0,
                file_id: Some(id.into()),
            }
            .to_json(),
        )
    }

    #[test]
    fn parses_asset_lines() {
        let table = AssetTable::parse_block(
            "a1: [[img/one.png]]\nnot an entry\n\nb2:[[two: the sequel.png]]\r\nc3: [[]]",
        );
        let rows: Vec<(&str, &str)> = table
            .iter()
            .map(|e| (e.id.as_str(), e.value.as_str()))
            .collect();
        assert_eq!(
            rows,
            [
                ("a1", "img/one.png"),
                ("b2", "two: the sequel.png"),
                ("c3", ""),
            ]
        );
        assert_eq!(
            table.render_block(),
            "a1: [[img/one.png]]\nb2: [[two: the sequel.png]]\nc3: [[]]"
        );
    }

    #[test]
    fn insert_updates_in_place() {
        let mut table = AssetTable::new();
        table.insert("a", "1");
        table.insert("b", "2");
        table.insert("a", "3");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("a"), Some("3"));
        assert_eq!(table.iter().next().map(|e| e.id.as_str()), Some("a"));
    }

    #[test]
    fn prunes_to_referenced_ids() {
        let mut table = AssetTable::new();
        table.insert("keep", "k.png");
        table.insert("gone", "g.png");
        table.insert("deep", "d.png");
        let tree = NodeData::leaf("root")
            .with_child(image_node("keep"))
            .with_child(NodeData::leaf("text mentioning gone").with_child(image_node("deep")));
        table.retain_referenced(&tree);
        assert!(table.contains("keep"));
        assert!(table.contains("deep"));
        assert!(!table.contains("gone"), "plain text does not count as a reference");
    }

    #[test]
    fn truncation_keeps_newest() {
        let mut table = AssetTable::new();
        for i in 0..5 {
            table.insert(format!("id{i}"), "v");
        }
        table.truncate_oldest(2);
        let ids: Vec<&str> = table.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["id3", "id4"]);
    }

    #[test]
    fn scaling_fits_longer_side() {
        assert_eq!(
            scale_to_threshold(Size::new(400.0, 200.0), IMAGE_THRESHOLD),
            Size::new(100.0, 50.0)
        );
        assert_eq!(
            scale_to_threshold(Size::new(30.0, 60.0), IMAGE_THRESHOLD),
            Size::new(50.0, 100.0)
        );
        assert_eq!(
            scale_to_threshold(Size::new(8.0, 8.0), IMAGE_THRESHOLD),
            Size::new(100.0, 100.0)
        );
    }
}
