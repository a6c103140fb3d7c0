//! Shared task state.
//!
//! # Module Structure
//!
//! - `model`: [`TaskState`], [`Message`], [`MessageKind`] and the
//!   [`StateUpdate`] fragments merged into the state after each step

mod model;

pub use model::{Message, MessageKind, SUPERVISOR, StateUpdate, TaskState};
