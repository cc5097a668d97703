//! Pointer gesture state machine.
//!
//! Turns pointer down/move/up events carrying ranked intersections into
//! design edits. Handles and text targets shadow the surface on pointer-down
//! but are ignored while dragging, so a grabbed handle slides along the
//! garment instead of re-hitting its own widget.

use std::cmp::Ordering;

use glam::{Vec2, Vec3};
use tracing::debug;

use dzyn_ipc::{HitKind, Intersection, PointerEvent, ToolMode};

/// Router state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouterState {
    /// No tool, waiting for a handle grab
    #[default]
    Idle,
    /// Point tool armed; each press on the surface adds a point
    PlacingPoints,
    /// Brush held down
    Painting,
    /// Text tool armed
    PlacingText,
    DraggingHandle(usize),
    DraggingText(usize),
}

impl RouterState {
    /// State the router rests in between gestures for `tool`
    pub fn resting(tool: ToolMode) -> Self {
        match tool {
            ToolMode::None | ToolMode::Brush => Self::Idle,
            ToolMode::Point => Self::PlacingPoints,
            ToolMode::Text => Self::PlacingText,
        }
    }

    /// Whether a press-drag gesture is in progress
    pub fn is_gesture(self) -> bool {
        matches!(
            self,
            Self::Painting | Self::DraggingHandle(_) | Self::DraggingText(_)
        )
    }
}

/// Edit requested by a pointer event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouterAction {
    /// Place a new control point at a surface hit
    AddPoint { uv: Vec2, world_position: Vec3 },
    /// A handle was picked up
    GrabPoint { index: usize },
    /// Move a dragged point to a new surface hit
    MovePoint {
        index: usize,
        uv: Vec2,
        world_position: Vec3,
    },
    /// Start a brush stroke, with its first dab if the press hit the surface
    BeginStroke { uv: Option<Vec2> },
    /// Continue the open stroke
    Paint { uv: Vec2 },
    /// Select a text element and move it to the press location, if any
    GrabText { index: usize, uv: Option<Vec2> },
    /// Move a dragged text element
    MoveText { index: usize, uv: Vec2 },
    /// The gesture ended; the state it was in is reported
    Release { from: RouterState },
}

/// UV and world position of a surface hit
fn surface_target(hit: &Intersection) -> Option<(Vec2, Vec3)> {
    let uv = hit.uv?;
    Some((Vec2::from(uv), Vec3::from(hit.point)))
}

/// Interaction Router
#[derive(Debug, Clone, Default)]
pub struct InteractionRouter {
    state: RouterState,
    tool: ToolMode,
}

impl InteractionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> RouterState {
        self.state
    }

    #[inline]
    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    /// Switch tools. A gesture in progress keeps going until release.
    pub fn set_tool(&mut self, tool: ToolMode) {
        self.tool = tool;
        if !self.state.is_gesture() {
            self.state = RouterState::resting(tool);
        }
    }

    /// Handle a press. `text_target` is the element the text tool acts on:
    /// the current target, else the most recently added text.
    pub fn pointer_down(
        &mut self,
        event: &PointerEvent,
        text_target: Option<usize>,
    ) -> Option<RouterAction> {
        // A press without a release in between ends the previous gesture
        if self.state.is_gesture() {
            debug!("pointer_down during {:?}, resetting", self.state);
        }
        self.set_tool(event.tool);
        self.state = RouterState::resting(event.tool);

        // Pick proxies shadow the surface regardless of tool
        if let Some(nearest) = event.nearest() {
            match nearest.kind {
                HitKind::Handle(index) => {
                    self.state = RouterState::DraggingHandle(index);
                    return Some(RouterAction::GrabPoint { index });
                }
                HitKind::TextTarget(index) => {
                    self.state = RouterState::DraggingText(index);
                    let uv = event.nearest_surface().and_then(surface_target).map(|(uv, _)| uv);
                    return Some(RouterAction::GrabText { index, uv });
                }
                HitKind::Surface => {}
            }
        }

        let surface = event.nearest_surface().and_then(surface_target);
        match event.tool {
            ToolMode::None => None,
            ToolMode::Point => {
                let (uv, world_position) = surface?;
                Some(RouterAction::AddPoint { uv, world_position })
            }
            ToolMode::Brush => {
                self.state = RouterState::Painting;
                Some(RouterAction::BeginStroke {
                    uv: surface.map(|(uv, _)| uv),
                })
            }
            ToolMode::Text => {
                let index = text_target?;
                let (uv, _) = surface?;
                self.state = RouterState::DraggingText(index);
                Some(RouterAction::GrabText {
                    index,
                    uv: Some(uv),
                })
            }
        }
    }

    /// Handle a move. Only true surface hits are considered.
    pub fn pointer_move(&mut self, event: &PointerEvent) -> Option<RouterAction> {
        if !self.state.is_gesture() {
            return None;
        }
        let (uv, world_position) = event.nearest_surface().and_then(surface_target)?;
        match self.state {
            RouterState::DraggingHandle(index) => Some(RouterAction::MovePoint {
                index,
                uv,
                world_position,
            }),
            RouterState::DraggingText(index) => Some(RouterAction::MoveText { index, uv }),
            RouterState::Painting => Some(RouterAction::Paint { uv }),
            _ => None,
        }
    }

    /// Handle a release; the dragged element stays where it was last moved
    pub fn pointer_up(&mut self) -> Option<RouterAction> {
        let from = self.state;
        self.state = RouterState::resting(self.tool);
        from.is_gesture().then_some(RouterAction::Release { from })
    }

    /// Lost pointer capture; identical to a release
    pub fn pointer_cancel(&mut self) -> Option<RouterAction> {
        self.pointer_up()
    }

    /// Drop a gesture that targets an element which no longer exists
    pub fn abort(&mut self) {
        self.state = RouterState::resting(self.tool);
    }

    /// Control point `index` was removed; later indices shift down by one
    pub fn point_removed(&mut self, index: usize) {
        if let RouterState::DraggingHandle(dragged) = self.state {
            match dragged.cmp(&index) {
                Ordering::Equal => self.abort(),
                Ordering::Greater => self.state = RouterState::DraggingHandle(dragged - 1),
                Ordering::Less => {}
            }
        }
    }

    /// Text element `index` was removed; later indices shift down by one
    pub fn text_removed(&mut self, index: usize) {
        if let RouterState::DraggingText(dragged) = self.state {
            match dragged.cmp(&index) {
                Ordering::Equal => self.abort(),
                Ordering::Greater => self.state = RouterState::DraggingText(dragged - 1),
                Ordering::Less => {}
            }
        }
    }
}
