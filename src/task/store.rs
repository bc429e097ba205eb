//! Record of accepted tasks.
//!
//! The only implementation today is [`MemoryTaskStore`]: append-only, unbounded, and lost on
//! restart. The trait is the seam for swapping in a durable queue.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Round, Task};

/// An accepted task as seen by the store.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedTask {
    pub job_id: Uuid,
    pub task: String,
    pub round: Round,
    pub email: String,
    pub accepted_at: DateTime<Utc>,
}

impl AcceptedTask {
    pub fn new(job_id: Uuid, task: &Task) -> Self {
        Self {
            job_id,
            task: task.task.clone(),
            round: task.round.clone(),
            email: task.email.clone(),
            accepted_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn record(&self, entry: AcceptedTask) -> Result<(), String>;

    /// Number of tasks accepted so far. Completion is not tracked.
    async fn count(&self) -> usize;
}

pub type SharedTaskStore = Arc<dyn TaskStore>;

#[derive(Clone, Default)]
pub struct MemoryTaskStore {
    entries: Arc<RwLock<Vec<AcceptedTask>>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn record(&self, entry: AcceptedTask) -> Result<(), String> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn count(&self) -> usize {
        self.entries.read().await.len()
    }
}
