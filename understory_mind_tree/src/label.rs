// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node labels: plain text or an inline image descriptor.
//!
//! A node's `name` is always a string. When that string is a JSON object whose
//! `src` uses one of the [`IMAGE_SCHEMES`], the node renders as a picture
//! instead of text. Everything else, including malformed JSON, is text.

use alloc::string::{String, ToString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// URL schemes an image `src` may use.
pub const IMAGE_SCHEMES: [&str; 3] = ["http://", "https://", "app://"];

/// Structured image payload stored (serialized) in a node's name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageLabel {
    /// Displayable source reference.
    pub src: String,
    /// Display width.
    #[serde(default)]
    pub width: f64,
    /// Display height.
    #[serde(default)]
    pub height: f64,
    /// Asset id in the document's side-table, if the image was imported.
    #[serde(default, rename = "fileId", skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
}

impl ImageLabel {
    /// Serialize back into the string form stored in a node's name.
    pub fn to_json(&self) -> String {
        let mut map = Map::new();
        map.insert("src".into(), Value::from(self.src.clone()));
        map.insert("width".into(), Value::from(self.width));
        map.insert("height".into(), Value::from(self.height));
        if let Some(id) = &self.file_id {
            map.insert("fileId".into(), Value::from(id.clone()));
        }
        Value::Object(map).to_string()
    }
}

/// A classified label.
#[derive(Clone, Debug, PartialEq)]
pub enum Label<'a> {
    /// Plain text, rendered through the text wrapper.
    Text(&'a str),
    /// An inline image.
    Image(ImageLabel),
}

impl<'a> Label<'a> {
    /// Classify a raw node name.
    ///
    /// ```
    /// use understory_mind_tree::Label;
    ///
    /// assert!(Label::classify(r#"{"src":"https://x/y.png","width":10,"height":10}"#).is_image());
    /// assert!(!Label::classify(r#"{"src":"ftp://x"}"#).is_image());
    /// assert!(!Label::classify("not json").is_image());
    /// ```
    pub fn classify(raw: &'a str) -> Self {
        if !raw.trim_start().starts_with('{') {
            return Self::Text(raw);
        }
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            return Self::Text(raw);
        };
        let has_image_src = value
            .get("src")
            .and_then(Value::as_str)
            .is_some_and(|src| IMAGE_SCHEMES.iter().any(|s| src.starts_with(s)));
        if !has_image_src {
            return Self::Text(raw);
        }
        match serde_json::from_value::<ImageLabel>(value) {
            Ok(image) => Self::Image(image),
            Err(err) => {
                tracing::debug!(%err, "image-like label did not match the image shape");
                Self::Text(raw)
            }
        }
    }

    /// Returns true for image payloads.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }

    /// The image payload, if any.
    pub fn image(&self) -> Option<&ImageLabel> {
        match self {
            Self::Image(image) => Some(image),
            Self::Text(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_source_is_an_image() {
        let label = Label::classify(r#"{"src":"https://x/y.png","width":10,"height":10}"#);
        let image = label.image().expect("classified as image");
        assert_eq!(image.src, "https://x/y.png");
        assert_eq!(image.width, 10.0);
        assert_eq!(image.height, 10.0);
        assert_eq!(image.file_id, None);
    }

    #[test]
    fn app_scheme_and_file_id() {
        let label = Label::classify(r#"{"src":"app://local/a.png","width":1,"height":2,"fileId":"abc"}"#);
        assert_eq!(label.image().and_then(|i| i.file_id.as_deref()), Some("abc"));
    }

    #[test]
    fn other_content_is_text() {
        for raw in [
            r#"{"src":"ftp://x"}"#,
            "not json",
            "{broken",
            r#"{"src":42}"#,
            r#"{"href":"https://x"}"#,
            r#"{"src":"https://x","width":"wide"}"#,
            "",
        ] {
            assert_eq!(Label::classify(raw), Label::Text(raw), "{raw:?} should be text");
        }
    }

    #[test]
    fn to_json_classifies_back() {
        let image = ImageLabel {
            src: "https://x/y.png".into(),
            width: 100.0,
            height: 50.0,
            file_id: Some("f1".into()),
        };
        let json = image.to_json();
        assert_eq!(Label::classify(&json), Label::Image(image));
    }
}
