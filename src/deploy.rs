//! Hand-off of generated apps.
//!
//! [`Deployer`] is the boundary to whatever publishes the app and notifies the evaluator.
//! [`FileDeployer`] is the local implementation: it writes the page and task metadata to disk.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::generator::GeneratedArtifact;
use crate::llm::ProviderChoice;
use crate::task::Task;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode task metadata: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result of a deploy. Only logged by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReceipt {
    pub location: String,
    pub bytes: usize,
}

impl fmt::Display for DeployReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.location, self.bytes)
    }
}

#[async_trait]
pub trait Deployer: Send + Sync {
    async fn deploy(
        &self,
        task: &Task,
        artifact: &GeneratedArtifact,
    ) -> Result<DeployReceipt, DeployError>;
}

/// Writes `{root}/{task}/round-{round}/index.html` plus `task.json`.
pub struct FileDeployer {
    root: PathBuf,
}

#[derive(Serialize)]
struct DeployManifest<'a> {
    #[serde(flatten)]
    task: &'a Task,
    provider: ProviderChoice,
    model: &'a str,
    well_formed: bool,
    deployed_at: chrono::DateTime<chrono::Utc>,
}

impl FileDeployer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn target_dir(&self, task: &Task) -> PathBuf {
        self.root
            .join(path_segment(&task.task))
            .join(format!("round-{}", path_segment(&task.round.to_string())))
    }
}

#[async_trait]
impl Deployer for FileDeployer {
    async fn deploy(
        &self,
        task: &Task,
        artifact: &GeneratedArtifact,
    ) -> Result<DeployReceipt, DeployError> {
        let dir = self.target_dir(task);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| DeployError::Io {
                path: dir.clone(),
                source,
            })?;

        let page = dir.join("index.html");
        write_file(&page, artifact.html.as_bytes()).await?;

        let manifest = DeployManifest {
            task,
            provider: artifact.provider,
            model: &artifact.model,
            well_formed: artifact.is_well_formed(),
            deployed_at: chrono::Utc::now(),
        };
        let manifest_json = serde_json::to_vec_pretty(&manifest)?;
        write_file(&dir.join("task.json"), &manifest_json).await?;

        tracing::debug!("Wrote {} bytes to {}", artifact.html.len(), page.display());

        Ok(DeployReceipt {
            location: page.display().to_string(),
            bytes: artifact.html.len(),
        })
    }
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), DeployError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| DeployError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Make a caller-supplied identifier safe to use as one directory name.
fn path_segment(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    match cleaned.trim_matches('.') {
        "" => "_".to_string(),
        s => s.to_string(),
    }
}
