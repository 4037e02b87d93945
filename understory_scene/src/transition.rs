// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timed interpolation of element geometry.

use kurbo::{Point, Vec2};

/// Easing curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Polynomial ease-out, `1 - (1 - t)^n`.
    PolyOut(u8),
}

impl Easing {
    /// Map linear progress in `[0, 1]` to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::PolyOut(exponent) => {
                let inv = 1.0 - t;
                let mut p = 1.0;
                for _ in 0..exponent {
                    p *= inv;
                }
                1.0 - p
            }
        }
    }
}

/// How a geometry change reaches its target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    /// Duration in milliseconds. Zero applies the change at once.
    pub duration_ms: f64,
    /// Curve applied to the progress.
    pub easing: Easing,
}

impl Transition {
    /// Apply the change immediately.
    pub const IMMEDIATE: Self = Self {
        duration_ms: 0.0,
        easing: Easing::Linear,
    };

    /// Cubic ease-out over `duration_ms`.
    pub const fn ease_out(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            easing: Easing::PolyOut(3),
        }
    }

    pub(crate) fn is_immediate(&self) -> bool {
        self.duration_ms <= 0.0
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::ease_out(500.0)
    }
}

/// An in-flight animation of one element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Motion {
    Translate(Tween<Vec2>),
    Connect(Tween<(Point, Point)>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Tween<T> {
    pub(crate) from: T,
    pub(crate) to: T,
    pub(crate) start_ms: f64,
    pub(crate) transition: Transition,
}

impl<T> Tween<T> {
    /// Eased progress at `now_ms`, and whether the tween has finished.
    pub(crate) fn progress(&self, now_ms: f64) -> (f64, bool) {
        let t = (now_ms - self.start_ms) / self.transition.duration_ms;
        let done = t >= 1.0;
        (self.transition.easing.apply(t), done)
    }
}

impl Tween<Vec2> {
    pub(crate) fn sample(&self, now_ms: f64) -> (Vec2, bool) {
        let (t, done) = self.progress(now_ms);
        (self.from.lerp(self.to, t), done)
    }
}

impl Tween<(Point, Point)> {
    pub(crate) fn sample(&self, now_ms: f64) -> ((Point, Point), bool) {
        let (t, done) = self.progress(now_ms);
        let from = self.from.0.lerp(self.to.0, t);
        let to = self.from.1.lerp(self.to.1, t);
        ((from, to), done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_ease_out_shape() {
        let e = Easing::PolyOut(3);
        assert_eq!(e.apply(0.0), 0.0);
        assert_eq!(e.apply(0.5), 0.875);
        assert_eq!(e.apply(1.0), 1.0);
        assert_eq!(e.apply(2.0), 1.0, "progress is clamped");
        assert_eq!(Easing::Linear.apply(0.25), 0.25);
    }

    #[test]
    fn default_transition() {
        let t = Transition::default();
        assert_eq!(t.duration_ms, 500.0);
        assert_eq!(t.easing, Easing::PolyOut(3));
        assert!(Transition::IMMEDIATE.is_immediate());
    }
}
