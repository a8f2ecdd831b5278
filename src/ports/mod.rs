//! Port traits defining external boundaries.
//!
//! The only boundary is the command-dispatch engine. Implementations live in
//! `src/adapters/`.

pub mod engine;

pub use engine::{in_channel, DispatchEngine, DispatchStatus, ENGINE_CHANNEL};
