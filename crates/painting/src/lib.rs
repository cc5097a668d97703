//! dzyn painting engine - UV-space decoration of 3D garments
//!
//! This crate provides:
//! - [`store`] - Control points, text elements and the brush stroke log
//! - [`painter`] - Raster painter that replays the design into one texture
//! - [`generator`] / [`ramp`] - Alternative texture strategies
//! - [`material`] - Non-destructive PBR patch blending the texture into base color
//! - [`router`] - Pointer gesture state machine
//! - [`raycast`] - Picking helpers for hosts that do not resolve rays themselves
//! - [`session`] - The owned engine instance tying it all together

pub mod color;
pub mod constants;
pub mod error;
pub mod generator;
pub mod material;
pub mod mesh;
pub mod painter;
pub mod ramp;
pub mod raycast;
pub mod router;
pub mod session;
pub mod store;
pub mod strategy;
pub mod surface;
pub mod text;
pub mod texture;
pub mod tiles;
pub mod types;

#[cfg(feature = "bevy")]
pub mod bevy_image;

pub use color::Rgb;
pub use error::{PaintError, StoreError};
pub use generator::{generate, GradientGenerator};
pub use material::{patch, PatchOutcome, PatchReport, SceneMaterial, ShadingModel};
pub use mesh::SceneMesh;
pub use painter::RasterPainter;
pub use ramp::{GradientRamp, GradientStop, RampGenerator, RampInterpolation};
pub use router::{InteractionRouter, RouterAction, RouterState};
pub use session::DecorSession;
pub use store::{ControlPointStore, Stroke, StrokeLog, TextStore};
pub use strategy::{Design, PaintStrategy, StrategyKind};
pub use text::TextRenderer;
pub use texture::{Texture, TextureHandle};
pub use types::*;
