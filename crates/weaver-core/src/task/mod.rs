//! Task run reporting.
//!
//! # Module Structure
//!
//! - `model`: [`TaskStatus`] and the serialisable [`RunReport`] returned to
//!   the service layer

mod model;

pub use model::{RunReport, TaskStatus};
