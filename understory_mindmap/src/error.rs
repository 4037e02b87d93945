// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors of the host-facing layer.

use thiserror::Error;

/// Result alias for this crate.
pub type Result<T, E = MindMapError> = core::result::Result<T, E>;

/// Failures at the edges of a session: documents, settings, and assets.
///
/// Structural edits never fail with an error; they report `false` or `None`
/// and leave the tree alone.
#[derive(Debug, Error)]
pub enum MindMapError {
    /// Tree, settings, or clipboard JSON did not parse.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document has no fenced `json` block holding the tree.
    #[error("document has no tree block")]
    MissingTreeBlock,

    /// The asset collaborator could not store or describe an image.
    #[error("asset error: {0}")]
    Asset(String),
}

impl MindMapError {
    /// An asset failure with the given message.
    pub fn asset(message: impl Into<String>) -> Self {
        Self::Asset(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(
            MindMapError::MissingTreeBlock.to_string(),
            "document has no tree block"
        );
        assert_eq!(
            MindMapError::asset("disk full").to_string(),
            "asset error: disk full"
        );
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(
            MindMapError::from(json).to_string().starts_with("JSON error: "),
            "serde errors convert with a prefix"
        );
    }
}
