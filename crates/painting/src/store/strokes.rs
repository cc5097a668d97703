//! Ordered log of brush strokes, replayed on every full repaint

use glam::Vec2;

use crate::types::{clamp_uv, Brush};

/// One continuous press-drag-release of the brush
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub id: u64,
    pub brush: Brush,
    /// Dab centers in UV space, in paint order
    pub dabs: Vec<Vec2>,
}

/// Append-only brush history owned by the session.
///
/// Dabs are stored individually rather than interpolated, so a stroke that
/// crosses a UV seam never paints the gap between islands.
#[derive(Debug, Clone, Default)]
pub struct StrokeLog {
    strokes: Vec<Stroke>,
    next_id: u64,
    open: bool,
    changed: bool,
}

impl StrokeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new stroke, closing any open one. Returns the stroke id.
    pub fn begin_stroke(&mut self, brush: Brush) -> u64 {
        self.end_stroke();
        let id = self.next_id;
        self.next_id += 1;
        self.strokes.push(Stroke {
            id,
            brush,
            dabs: Vec::new(),
        });
        self.open = true;
        id
    }

    /// Record a dab on the open stroke. Returns false when no stroke is open.
    pub fn add_dab(&mut self, uv: Vec2) -> bool {
        if !self.open {
            return false;
        }
        let Some(stroke) = self.strokes.last_mut() else {
            return false;
        };
        stroke.dabs.push(clamp_uv(uv));
        self.changed = true;
        true
    }

    /// Close the open stroke; empty strokes are dropped
    pub fn end_stroke(&mut self) {
        if self.open && self.strokes.last().is_some_and(|s| s.dabs.is_empty()) {
            self.strokes.pop();
        }
        self.open = false;
    }

    #[inline]
    pub fn is_stroke_open(&self) -> bool {
        self.open
    }

    /// Forget every stroke
    pub fn clear(&mut self) {
        if !self.strokes.is_empty() {
            self.changed = true;
        }
        self.strokes.clear();
        self.open = false;
    }

    #[inline]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Total number of recorded dabs
    pub fn dab_count(&self) -> usize {
        self.strokes.iter().map(|s| s.dabs.len()).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dab_count() == 0
    }

    #[inline]
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}
