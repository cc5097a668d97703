//! Command types for IPC messages.

mod design;
mod paint;

pub use design::*;
pub use paint::*;
