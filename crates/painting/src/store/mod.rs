//! Editable design state: control points, text elements and brush strokes.
//!
//! Stores never repaint anything themselves. Every mutation raises a change
//! flag that the session observes once per frame.

mod strokes;
mod texts;

use glam::{Vec2, Vec3};
use tracing::debug;

use crate::color::Rgb;
use crate::error::StoreError;
use crate::types::{ControlPoint, ControlPointPatch};

pub use strokes::{Stroke, StrokeLog};
pub use texts::TextStore;

/// Ordered collection of control points plus the selected index.
#[derive(Debug, Clone, Default)]
pub struct ControlPointStore {
    points: Vec<ControlPoint>,
    selected: Option<usize>,
    changed: bool,
    revision: u64,
}

impl ControlPointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a point. Out-of-range UVs are clamped, never rejected.
    pub fn add(&mut self, uv: Vec2, world_position: Vec3, color: Rgb, radius: f32) -> usize {
        self.push(ControlPoint::new(uv, world_position, color, radius))
    }

    /// Append an existing point, re-applying clamps
    pub fn push(&mut self, point: ControlPoint) -> usize {
        let point = ControlPoint::new(point.uv, point.world_position, point.color, point.radius);
        self.points.push(point);
        self.mark_changed();
        let index = self.points.len() - 1;
        debug!("Added control point {} at uv={:?}", index, self.points[index].uv);
        index
    }

    /// Apply a partial update in place
    pub fn update(&mut self, index: usize, patch: ControlPointPatch) -> Result<(), StoreError> {
        let len = self.points.len();
        let point = self
            .points
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        if patch.is_empty() {
            return Ok(());
        }
        patch.apply(point);
        self.mark_changed();
        Ok(())
    }

    /// Remove a point. A selection on it is cleared; selections after it shift down.
    pub fn remove(&mut self, index: usize) -> Result<ControlPoint, StoreError> {
        self.check(index)?;
        let point = self.points.remove(index);
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        self.mark_changed();
        debug!("Removed control point {}", index);
        Ok(point)
    }

    /// Append a copy of the point at `index`, returning the new index
    pub fn duplicate(&mut self, index: usize) -> Result<usize, StoreError> {
        self.check(index)?;
        let copy = self.points[index].clone();
        Ok(self.push(copy))
    }

    /// Select a point for handle emphasis, or clear the selection
    pub fn select(&mut self, index: Option<usize>) -> Result<(), StoreError> {
        if let Some(index) = index {
            self.check(index)?;
        }
        self.selected = index;
        Ok(())
    }

    #[inline]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Remove every point
    pub fn clear(&mut self) {
        if self.points.is_empty() {
            return;
        }
        self.points.clear();
        self.selected = None;
        self.mark_changed();
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&ControlPoint> {
        self.points.get(index)
    }

    #[inline]
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of mutations so far
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Return and reset the change flag
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Snapshot for handle rendering on the host
    pub fn views(&self) -> Vec<dzyn_ipc::PointView> {
        self.points
            .iter()
            .enumerate()
            .map(|(index, p)| dzyn_ipc::PointView {
                index,
                uv: p.uv.to_array(),
                world_position: p.world_position.to_array(),
                color: p.color.to_array(),
                radius: p.radius,
                selected: self.selected == Some(index),
            })
            .collect()
    }

    fn check(&self, index: usize) -> Result<(), StoreError> {
        if index < self.points.len() {
            Ok(())
        } else {
            Err(StoreError::IndexOutOfRange {
                index,
                len: self.points.len(),
            })
        }
    }

    fn mark_changed(&mut self) {
        self.changed = true;
        self.revision += 1;
    }
}
