//! API request/response types.

use serde::{Deserialize, Serialize};

use crate::task::Round;

/// Acknowledgement for an accepted task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AcceptedResponse {
    pub status: String,
    pub task: String,
    pub round: Round,
}

impl AcceptedResponse {
    pub fn new(task: String, round: Round) -> Self {
        Self {
            status: "accepted".to_string(),
            task,
            round,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// RFC 3339 time of the probe
    pub timestamp: String,
    pub version: String,
    /// Tasks accepted since start; completion is not tracked
    pub tasks_accepted: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
