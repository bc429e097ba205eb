//! Fakes shared by unit tests.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::CredentialSource;
use crate::deploy::{DeployError, DeployReceipt, Deployer};
use crate::generator::{CodeGenerator, GeneratedArtifact};
use crate::llm::{
    ChatMessage, ChatOptions, ChatResponse, ClientFactory, LlmClient, LlmError, ProviderChoice,
};
use crate::runner::{BuildJob, TaskRunner};
use crate::task::{AcceptedTask, Attachments, Task, TaskStore};

/// The request body from the canonical accept scenario.
pub fn valid_body() -> Value {
    json!({
        "email": "a@b.com",
        "secret": "S",
        "task": "t1",
        "round": 1,
        "nonce": "n1",
        "brief": "Build a todo list",
        "checks": ["#add-button exists"],
        "evaluation_url": "http://x"
    })
}

pub fn sample_task() -> Task {
    Task::from_value(valid_body()).expect("valid body")
}

pub fn sample_artifact(html: &str) -> GeneratedArtifact {
    GeneratedArtifact {
        html: html.to_string(),
        provider: ProviderChoice::Anthropic,
        model: "test-model".to_string(),
        usage: None,
    }
}

/// Poll `cond` until it holds, panicking after `timeout`.
pub async fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + timeout;
    while !cond() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within {:?}",
            timeout
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Credentials held in memory. Empty values count as unset.
#[derive(Default)]
pub struct MapCredentials {
    values: Mutex<HashMap<String, String>>,
}

impl MapCredentials {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        let values = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }

    pub fn set(&self, name: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }
}

impl CredentialSource for MapCredentials {
    fn credential(&self, name: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap()
            .get(name)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub options: ChatOptions,
}

/// LLM client with a canned reply that records every request.
pub struct ScriptedClient {
    reply: Result<ChatResponse, LlmError>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    fn with(reply: Result<ChatResponse, LlmError>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::with(Ok(ChatResponse {
            content: Some(text.to_string()),
            ..ChatResponse::default()
        }))
    }

    /// A successful response whose body carried no text at all.
    pub fn without_content(finish_reason: Option<&str>) -> Arc<Self> {
        Self::with(Ok(ChatResponse {
            finish_reason: finish_reason.map(str::to_string),
            ..ChatResponse::default()
        }))
    }

    pub fn failing(error: LlmError) -> Arc<Self> {
        Self::with(Err(error))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> Result<ChatResponse, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            messages: messages.to_vec(),
            options,
        });
        match &self.reply {
            Ok(response) => Ok(response.clone()),
            Err(e) => Err(LlmError::new(e.kind, e.status_code, e.message.clone())),
        }
    }
}

/// Hands out one scripted client and remembers which backend was asked for.
pub struct ScriptedFactory {
    client: Arc<ScriptedClient>,
    choices: Mutex<Vec<(ProviderChoice, String)>>,
}

impl ScriptedFactory {
    pub fn new(client: Arc<ScriptedClient>) -> Self {
        Self {
            client,
            choices: Mutex::new(Vec::new()),
        }
    }

    pub fn choices(&self) -> Vec<(ProviderChoice, String)> {
        self.choices.lock().unwrap().clone()
    }
}

impl ClientFactory for ScriptedFactory {
    fn client_for(&self, choice: ProviderChoice, api_key: String) -> Arc<dyn LlmClient> {
        self.choices.lock().unwrap().push((choice, api_key));
        Arc::clone(&self.client) as Arc<dyn LlmClient>
    }
}

enum FakeOutcome {
    Html(String),
    Fail(String),
    Block,
}

/// Code generator with a fixed outcome.
pub struct FakeGenerator {
    outcome: FakeOutcome,
    briefs: Mutex<Vec<String>>,
}

impl FakeGenerator {
    fn with(outcome: FakeOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            briefs: Mutex::new(Vec::new()),
        })
    }

    pub fn html(html: &str) -> Arc<Self> {
        Self::with(FakeOutcome::Html(html.to_string()))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::with(FakeOutcome::Fail(message.to_string()))
    }

    /// Never completes.
    pub fn blocking() -> Arc<Self> {
        Self::with(FakeOutcome::Block)
    }

    pub fn briefs(&self) -> Vec<String> {
        self.briefs.lock().unwrap().clone()
    }

    pub async fn wait_for_calls(&self, n: usize, timeout: Duration) {
        wait_until(timeout, || self.briefs.lock().unwrap().len() >= n).await;
    }
}

#[async_trait]
impl CodeGenerator for FakeGenerator {
    async fn generate(
        &self,
        brief: &str,
        _checks: &[String],
        _attachments: &Attachments,
    ) -> anyhow::Result<GeneratedArtifact> {
        self.briefs.lock().unwrap().push(brief.to_string());
        match &self.outcome {
            FakeOutcome::Html(html) => Ok(sample_artifact(html)),
            FakeOutcome::Fail(message) => Err(anyhow::anyhow!("{}", message)),
            FakeOutcome::Block => std::future::pending().await,
        }
    }
}

/// Deployer that keeps `(task, html)` pairs in memory.
pub struct RecordingDeployer {
    fail: bool,
    deployed: Mutex<Vec<(String, String)>>,
}

impl RecordingDeployer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            deployed: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            deployed: Mutex::new(Vec::new()),
        })
    }

    pub fn deployed(&self) -> Vec<(String, String)> {
        self.deployed.lock().unwrap().clone()
    }

    pub async fn wait_for_deploys(&self, n: usize, timeout: Duration) {
        wait_until(timeout, || self.deployed.lock().unwrap().len() >= n).await;
    }
}

#[async_trait]
impl Deployer for RecordingDeployer {
    async fn deploy(
        &self,
        task: &Task,
        artifact: &GeneratedArtifact,
    ) -> Result<DeployReceipt, DeployError> {
        if self.fail {
            return Err(DeployError::Io {
                path: "memory".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        self.deployed
            .lock()
            .unwrap()
            .push((task.task.clone(), artifact.html.clone()));
        Ok(DeployReceipt {
            location: format!("memory://{}", task.task),
            bytes: artifact.html.len(),
        })
    }
}

/// Runner that only records submissions.
#[derive(Default)]
pub struct RecordingRunner {
    jobs: Mutex<Vec<BuildJob>>,
}

impl RecordingRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn jobs(&self) -> Vec<BuildJob> {
        self.jobs.lock().unwrap().clone()
    }
}

impl TaskRunner for RecordingRunner {
    fn submit(&self, job: BuildJob) {
        self.jobs.lock().unwrap().push(job);
    }
}

/// Store whose writes always fail.
pub struct FailingStore;

#[async_trait]
impl TaskStore for FailingStore {
    async fn record(&self, _entry: AcceptedTask) -> Result<(), String> {
        Err("store unavailable".to_string())
    }

    async fn count(&self) -> usize {
        0
    }
}
