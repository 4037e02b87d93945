// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement.

use unicode_width::UnicodeWidthChar;

/// Measures label text for wrapping and sizing.
///
/// Hosts with a real font stack implement this over their shaper. The
/// layout only needs per-character advances and a uniform line height.
pub trait TextMeasure {
    /// Horizontal advance of one character.
    fn char_width(&self, ch: char) -> f64;

    /// Height of one wrapped line.
    fn line_height(&self) -> f64;

    /// Advance of a whole string.
    fn text_width(&self, text: &str) -> f64 {
        text.chars().map(|ch| self.char_width(ch)).sum()
    }
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn char_width(&self, ch: char) -> f64 {
        (**self).char_width(ch)
    }

    fn line_height(&self) -> f64 {
        (**self).line_height()
    }
}

/// A fixed-cell measure: every terminal column is `cell_width` wide.
///
/// Wide characters (CJK, most emoji) take two columns and control characters
/// take none.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMeasure {
    /// Width of one column.
    pub cell_width: f64,
    /// Height of one line.
    pub line_height: f64,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self {
            cell_width: 8.0,
            line_height: 20.0,
        }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn char_width(&self, ch: char) -> f64 {
        let columns = ch.width().unwrap_or(0);
        #[allow(
            clippy::cast_precision_loss,
            reason = "column counts are 0, 1 or 2."
        )]
        let columns = columns as f64;
        columns * self.cell_width
    }

    fn line_height(&self) -> f64 {
        self.line_height
    }
}
