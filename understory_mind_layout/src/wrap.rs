// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy line wrapping of label text.

use core::fmt;
use core::str::Split;

use understory_mind_tree::Label;

use crate::measure::TextMeasure;

/// One wrapped line, borrowed from the label.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineFragment<'a> {
    /// The text of the line, without its line break.
    pub text: &'a str,
    /// Measured advance of `text`.
    pub width: f64,
}

/// Lazy iterator over the wrapped lines of a label.
///
/// Created by [`wrap`].
pub struct Fragments<'a, M: ?Sized> {
    lines: Split<'a, char>,
    pending: Option<&'a str>,
    measure: &'a M,
    max_width: f64,
}

impl<M: ?Sized> fmt::Debug for Fragments<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragments")
            .field("pending", &self.pending)
            .field("max_width", &self.max_width)
            .finish_non_exhaustive()
    }
}

/// Wrap a label to `max_width`.
///
/// Explicit line breaks always start a new line. Within a line, characters are
/// taken greedily until the next one would overflow; a line always holds at
/// least one character, so a single glyph wider than `max_width` still makes
/// progress. Empty text and image labels produce exactly one empty line, which
/// keeps every node at least one line tall.
///
/// ```
/// use understory_mind_layout::{MonospaceMeasure, wrap};
/// use understory_mind_tree::Label;
///
/// let m = MonospaceMeasure { cell_width: 10.0, line_height: 20.0 };
/// let lines: Vec<_> = wrap(&Label::Text("abcdef"), 40.0, &m).map(|l| l.text).collect();
/// assert_eq!(lines, ["abcd", "ef"]);
/// ```
pub fn wrap<'a, M: TextMeasure + ?Sized>(
    label: &Label<'a>,
    max_width: f64,
    measure: &'a M,
) -> Fragments<'a, M> {
    let text = match label {
        Label::Text(text) => *text,
        Label::Image(_) => "",
    };
    Fragments {
        lines: text.split('\n'),
        pending: None,
        measure,
        max_width,
    }
}

impl<'a, M: TextMeasure + ?Sized> Iterator for Fragments<'a, M> {
    type Item = LineFragment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = match self.pending.take() {
            Some(rest) => rest,
            None => {
                let line = self.lines.next()?;
                line.strip_suffix('\r').unwrap_or(line)
            }
        };

        let mut width = 0.0;
        let mut cut = line.len();
        for (i, ch) in line.char_indices() {
            let advance = self.measure.char_width(ch);
            if i > 0 && width + advance > self.max_width {
                cut = i;
                break;
            }
            width += advance;
        }

        let (head, tail) = line.split_at(cut);
        if !tail.is_empty() {
            self.pending = Some(tail);
        }
        Some(LineFragment { text: head, width })
    }
}
