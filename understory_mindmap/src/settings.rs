// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! User-facing settings and their translation into engine parameters.

use serde::{Deserialize, Serialize};
use understory_mind_layout::{LayoutConfig, MonospaceMeasure};
use understory_reconcile::ReconcileOptions;
use understory_scene::Transition;

use crate::error::Result;

/// Settings that affect editing and layout.
///
/// Stored as a camelCase JSON object. Every field has a default, so a partial
/// object (or one carrying fields for other parts of the host) loads fine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Give nodes an add-child control, revealed on hover.
    pub add_node_btn: bool,
    /// Allow dragging nodes.
    pub drag: bool,
    /// Allow editing labels.
    pub edit: bool,
    /// Horizontal gap between levels.
    pub x_gap: f64,
    /// Vertical gap between sibling subtrees.
    pub y_gap: f64,
    /// Width at which labels wrap.
    pub max_text_width: f64,
    /// Space around label text.
    pub text_padding: f64,
    /// Height of one label line.
    pub line_height: f64,
    /// Width of one terminal column of label text.
    pub char_width: f64,
    /// Duration of position animations, in milliseconds. Zero disables them.
    pub transition_ms: f64,
}

impl Default for Settings {
    fn default() -> Self {
        let layout = LayoutConfig::default();
        let measure = MonospaceMeasure::default();
        Self {
            add_node_btn: true,
            drag: true,
            edit: true,
            x_gap: layout.x_gap,
            y_gap: layout.y_gap,
            max_text_width: layout.max_text_width,
            text_padding: layout.text_padding,
            line_height: measure.line_height,
            char_width: measure.cell_width,
            transition_ms: 500.0,
        }
    }
}

impl Settings {
    /// Overlay a (possibly partial) JSON object on the defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize every field.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Spacing for the layout projector.
    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            max_text_width: self.max_text_width,
            x_gap: self.x_gap,
            y_gap: self.y_gap,
            text_padding: self.text_padding,
        }
    }

    /// Text measure for the layout projector.
    pub fn measure(&self) -> MonospaceMeasure {
        MonospaceMeasure {
            cell_width: self.char_width,
            line_height: self.line_height,
        }
    }

    /// The animation used for position and connector updates.
    pub fn transition(&self) -> Transition {
        if self.transition_ms > 0.0 {
            Transition::ease_out(self.transition_ms)
        } else {
            Transition::IMMEDIATE
        }
    }

    /// Behavior switches for the reconciler.
    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            add_button: self.add_node_btn,
            drag: self.drag,
            edit: self.edit,
            transition: self.transition(),
        }
    }
}
