//! # Task Receiver
//!
//! A webhook that accepts exam tasks and builds a single-page HTML app for each one.
//!
//! This library provides:
//! - An HTTP API that validates, authenticates and acknowledges task submissions
//! - Prompt composition and reply cleanup for HTML generation
//! - Anthropic and OpenAI backends, picked per call from the configured credentials
//!
//! ## Task Flow
//!
//! ```text
//!  POST /api/receive-task
//!          │  validate fields, check secret
//!          ▼
//!   200 {"status":"accepted"} ──► TaskRunner (spawned, not awaited)
//!                                      │
//!                                      ▼
//!                               CodeGenerator ──► LLM provider
//!                                      │
//!                                      ▼
//!                                  Deployer
//! ```
//!
//! Failures after the acknowledgement are only logged.
//!
//! ## Modules
//! - `api`: HTTP routes and error responses
//! - `task`: task payload, validation and the accepted-task store
//! - `generator`: prompt composer, response sanitizer and `CodeGenerator`
//! - `llm`: provider clients and provider selection
//! - `runner`: fire-and-forget build pipeline
//! - `deploy`: hand-off of generated apps

pub mod api;
pub mod config;
pub mod deploy;
pub mod generator;
pub mod llm;
pub mod runner;
pub mod task;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
