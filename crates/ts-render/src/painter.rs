//! Transform stack over a [`DrawTarget`].
//!
//! `push()` returns a [`Frame`] guard that restores the previous transform
//! when dropped, so a routine that returns early (or panics) cannot leave
//! the stack unbalanced. Transform calls compose in the current frame, the
//! same order a canvas context uses: `translate` then `rotate` rotates about
//! the translated origin.

use crate::target::{Brush, DrawTarget, Shadow, StrokeStyle};
use kurbo::{Affine, BezPath, Rect, Vec2};
use std::ops::{Deref, DerefMut};

pub struct Painter<'t, T: DrawTarget + ?Sized> {
    target: &'t mut T,
    current: Affine,
    saved: Vec<Affine>,
}

impl<'t, T: DrawTarget + ?Sized> Painter<'t, T> {
    /// Start at `base`, typically the device-pixel-ratio scale.
    pub fn new(target: &'t mut T, base: Affine) -> Self {
        Self {
            target,
            current: base,
            saved: Vec::new(),
        }
    }

    pub fn transform(&self) -> Affine {
        self.current
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Open a frame. Transforms applied through the guard are undone when it
    /// goes out of scope.
    pub fn push(&mut self) -> Frame<'_, 't, T> {
        self.saved.push(self.current);
        Frame { painter: self }
    }

    fn pop(&mut self) {
        match self.saved.pop() {
            Some(previous) => self.current = previous,
            None => log::warn!("transform stack underflow"),
        }
    }

    // ─── Transforms ──────────────────────────────────────────────────────

    pub fn translate(&mut self, offset: impl Into<Vec2>) -> &mut Self {
        self.concat(Affine::translate(offset))
    }

    pub fn rotate(&mut self, radians: f64) -> &mut Self {
        self.concat(Affine::rotate(radians))
    }

    /// Non-uniform scale; a negative factor mirrors that axis.
    pub fn scale(&mut self, sx: f64, sy: f64) -> &mut Self {
        self.concat(Affine::scale_non_uniform(sx, sy))
    }

    /// Post-multiply: `transform` is interpreted in the current frame.
    pub fn concat(&mut self, transform: Affine) -> &mut Self {
        self.current = self.current * transform;
        self
    }

    // ─── Primitives ──────────────────────────────────────────────────────

    pub fn clear_rect(&mut self, rect: Rect) {
        self.target.clear_rect(self.current, rect);
    }

    pub fn fill_rect(&mut self, rect: Rect, brush: &Brush) {
        self.target.fill_rect(self.current, rect, brush);
    }

    pub fn fill_path(&mut self, path: &BezPath, brush: &Brush) {
        self.target.fill_path(self.current, path, brush);
    }

    pub fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle) {
        self.target.stroke_path(self.current, path, style);
    }

    /// Run `draw` with `shadow` applied to its fills.
    pub fn with_shadow(&mut self, shadow: &Shadow, draw: impl FnOnce(&mut Self)) {
        self.target.set_shadow(Some(shadow));
        draw(self);
        self.target.set_shadow(None);
    }
}

/// Scope guard returned by [`Painter::push`].
pub struct Frame<'p, 't, T: DrawTarget + ?Sized> {
    painter: &'p mut Painter<'t, T>,
}

impl<'t, T: DrawTarget + ?Sized> Deref for Frame<'_, 't, T> {
    type Target = Painter<'t, T>;

    fn deref(&self) -> &Self::Target {
        self.painter
    }
}

impl<T: DrawTarget + ?Sized> DerefMut for Frame<'_, '_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.painter
    }
}

impl<T: DrawTarget + ?Sized> Drop for Frame<'_, '_, T> {
    fn drop(&mut self) {
        self.painter.pop();
    }
}
