//! Deferred build-and-deploy of accepted tasks.
//!
//! The receiver hands a [`BuildJob`] to a [`TaskRunner`] after responding and never looks at
//! the outcome. Success and failure are reported only through logs.

use anyhow::Context;
use std::sync::Arc;
use uuid::Uuid;

use crate::deploy::{DeployReceipt, Deployer};
use crate::generator::CodeGenerator;
use crate::task::Task;

/// One accepted task waiting to be built.
#[derive(Debug, Clone)]
pub struct BuildJob {
    pub job_id: Uuid,
    pub task: Task,
}

impl BuildJob {
    pub fn new(task: Task) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            task,
        }
    }
}

/// Fire-and-forget submission boundary.
pub trait TaskRunner: Send + Sync {
    /// Schedule the job and return immediately.
    fn submit(&self, job: BuildJob);
}

pub type SharedTaskRunner = Arc<dyn TaskRunner>;

/// Runs each job on its own tokio task. No concurrency limit.
#[derive(Clone)]
pub struct SpawnRunner {
    generator: Arc<dyn CodeGenerator>,
    deployer: Arc<dyn Deployer>,
}

impl SpawnRunner {
    pub fn new(generator: Arc<dyn CodeGenerator>, deployer: Arc<dyn Deployer>) -> Self {
        Self {
            generator,
            deployer,
        }
    }

    /// Generate the app and deploy it. A generation failure skips the deploy.
    pub async fn run(&self, job: &BuildJob) -> anyhow::Result<DeployReceipt> {
        let task = &job.task;
        let artifact = self
            .generator
            .generate(&task.brief, &task.checks, &task.attachments)
            .await
            .context("Code generation failed")?;

        tracing::debug!(
            job_id = %job.job_id,
            provider = %artifact.provider,
            well_formed = artifact.is_well_formed(),
            "Generated {} bytes of HTML",
            artifact.html.len()
        );

        let receipt = self
            .deployer
            .deploy(task, &artifact)
            .await
            .context("Deploy failed")?;
        Ok(receipt)
    }

    async fn run_logged(&self, job: BuildJob) {
        match self.run(&job).await {
            Ok(receipt) => tracing::info!(
                job_id = %job.job_id,
                task = %job.task.task,
                round = %job.task.round,
                "Task completed: {}",
                receipt
            ),
            Err(e) => tracing::error!(
                job_id = %job.job_id,
                task = %job.task.task,
                round = %job.task.round,
                "Processing error: {:#}",
                e
            ),
        }
    }
}

impl TaskRunner for SpawnRunner {
    fn submit(&self, job: BuildJob) {
        let runner = self.clone();
        tokio::spawn(async move {
            runner.run_logged(job).await;
        });
    }
}
