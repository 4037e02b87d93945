// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout parameters.

/// Spacing and wrapping parameters for [`project`](crate::project).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Labels wrap once a line would exceed this width.
    pub max_text_width: f64,
    /// Horizontal gap between the widest possible label of one level and the
    /// next level.
    pub x_gap: f64,
    /// Vertical gap between adjacent sibling subtrees.
    pub y_gap: f64,
    /// Extra space around a label's text, added to its measured size.
    pub text_padding: f64,
}

impl LayoutConfig {
    /// Horizontal distance between consecutive depths.
    pub fn pitch(&self) -> f64 {
        self.max_text_width + self.x_gap
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_text_width: 200.0,
            x_gap: 84.0,
            y_gap: 18.0,
            text_padding: 0.0,
        }
    }
}
