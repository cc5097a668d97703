//! Text elements placed on the design

use glam::Vec2;

use crate::error::StoreError;
use crate::types::{clamp_uv, TextElement};

/// Ordered text elements plus the text tool's current target.
#[derive(Debug, Clone, Default)]
pub struct TextStore {
    elements: Vec<TextElement>,
    target: Option<usize>,
    changed: bool,
}

impl TextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, element: TextElement) -> usize {
        let element = TextElement {
            uv: clamp_uv(element.uv),
            color: element.color.clamped(),
            ..element
        };
        self.elements.push(element);
        self.changed = true;
        self.elements.len() - 1
    }

    /// Replace the element at `index`
    pub fn update(&mut self, index: usize, element: TextElement) -> Result<(), StoreError> {
        let len = self.elements.len();
        let slot = self
            .elements
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        *slot = TextElement {
            uv: clamp_uv(element.uv),
            color: element.color.clamped(),
            ..element
        };
        self.changed = true;
        Ok(())
    }

    /// Move the element at `index` to a new UV anchor
    pub fn set_uv(&mut self, index: usize, uv: Vec2) -> Result<(), StoreError> {
        let len = self.elements.len();
        let element = self
            .elements
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        element.uv = clamp_uv(uv);
        self.changed = true;
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<TextElement, StoreError> {
        if index >= self.elements.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.elements.len(),
            });
        }
        let element = self.elements.remove(index);
        self.target = match self.target {
            Some(t) if t == index => None,
            Some(t) if t > index => Some(t - 1),
            other => other,
        };
        self.changed = true;
        Ok(element)
    }

    /// Set the text tool's target
    pub fn set_target(&mut self, index: Option<usize>) -> Result<(), StoreError> {
        match index {
            Some(index) if index >= self.elements.len() => {
                return Err(StoreError::IndexOutOfRange {
                    index,
                    len: self.elements.len(),
                });
            }
            _ => {}
        }
        self.target = index;
        Ok(())
    }

    #[inline]
    pub fn target(&self) -> Option<usize> {
        self.target
    }

    /// The current target, falling back to the most recently added element
    pub fn target_or_last(&self) -> Option<usize> {
        self.target.or_else(|| self.elements.len().checked_sub(1))
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&TextElement> {
        self.elements.get(index)
    }

    #[inline]
    pub fn elements(&self) -> &[TextElement] {
        &self.elements
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline]
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}
