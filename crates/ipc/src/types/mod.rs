//! Type definitions for IPC messages.

mod design;

pub use design::*;
