//! IPC message protocol for dzyn
//!
//! Defines the message types exchanged between the scene host (which owns the
//! camera, the loaded garment and the pointer) and the decorating engine.
//! Pointer events arrive already resolved to ray intersections; the engine
//! answers with control point and texture notifications.

mod commands;
mod error;
mod input;
mod messages;
mod types;

pub use commands::*;
pub use error::IpcError;
pub use input::*;
pub use messages::*;
pub use types::*;
