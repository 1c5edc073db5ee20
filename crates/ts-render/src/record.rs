//! Headless target that records every primitive.
//!
//! Used by tests to assert on what a draw pass emitted without a real
//! surface.

use crate::target::{Brush, DrawTarget, Shadow, StrokeStyle};
use kurbo::{Affine, BezPath, Rect};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Clear {
        transform: Affine,
        rect: Rect,
    },
    FillRect {
        transform: Affine,
        rect: Rect,
        brush: Brush,
    },
    FillPath {
        transform: Affine,
        path: BezPath,
        brush: Brush,
    },
    StrokePath {
        transform: Affine,
        path: BezPath,
        style: StrokeStyle,
    },
    Shadow(Option<Shadow>),
}

#[derive(Debug, Default)]
pub struct RecordingTarget {
    commands: Vec<Command>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn take(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// All strokes, in emit order.
    pub fn strokes(&self) -> impl Iterator<Item = (&Affine, &BezPath, &StrokeStyle)> {
        self.commands.iter().filter_map(|command| match command {
            Command::StrokePath {
                transform,
                path,
                style,
            } => Some((transform, path, style)),
            _ => None,
        })
    }

    /// Number of rectangle fills painted with `brush`.
    pub fn rect_fills_with(&self, brush: &Brush) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, Command::FillRect { brush: b, .. } if b == brush))
            .count()
    }
}

impl DrawTarget for RecordingTarget {
    fn clear_rect(&mut self, transform: Affine, rect: Rect) {
        self.commands.push(Command::Clear { transform, rect });
    }

    fn fill_rect(&mut self, transform: Affine, rect: Rect, brush: &Brush) {
        self.commands.push(Command::FillRect {
            transform,
            rect,
            brush: brush.clone(),
        });
    }

    fn fill_path(&mut self, transform: Affine, path: &BezPath, brush: &Brush) {
        self.commands.push(Command::FillPath {
            transform,
            path: path.clone(),
            brush: brush.clone(),
        });
    }

    fn stroke_path(&mut self, transform: Affine, path: &BezPath, style: &StrokeStyle) {
        self.commands.push(Command::StrokePath {
            transform,
            path: path.clone(),
            style: style.clone(),
        });
    }

    fn set_shadow(&mut self, shadow: Option<&Shadow>) {
        self.commands.push(Command::Shadow(shadow.copied()));
    }
}
