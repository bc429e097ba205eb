//! Task module - the inbound exam task, its validation, and the accepted-task store.

pub mod task;
mod store;

pub use store::{AcceptedTask, MemoryTaskStore, SharedTaskStore, TaskStore};
pub use task::{Attachments, Round, Task, TaskValidationError, REQUIRED_FIELDS};
