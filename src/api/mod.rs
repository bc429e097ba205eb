//! HTTP API for receiving exam tasks.

mod auth;
mod error;
pub mod routes;
pub mod types;

pub use error::ApiError;
pub use routes::{router, serve, AppState};
