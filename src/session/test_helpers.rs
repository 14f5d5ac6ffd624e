//! Scripted collaborators shared by the session tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::Notify;

use super::{ActivityLog, Context, Mode, ProgressTracker};
use crate::agents::{
    AgentDirectory, AgentEnvelope, AgentInvoker, AgentKind, AgentRequest, AssetFile,
    AssetUploader, Clipboard, UploadReceipt,
};
use crate::error::AgentError;

/// Owns the session state a [`Context`] borrows.
pub(crate) struct Harness {
    pub agents: AgentDirectory,
    pub log: ActivityLog,
    pub progress: ProgressTracker,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            agents: AgentDirectory::default(),
            log: ActivityLog::default(),
            progress: ProgressTracker::default(),
        }
    }

    pub fn ctx(&mut self) -> Context<'_> {
        Context {
            mode: Mode::Valentine,
            agents: &self.agents,
            log: &mut self.log,
            progress: &mut self.progress,
        }
    }
}

/// Replies from per-agent queues and records every request.
/// An empty queue answers with a transport error.
#[derive(Default)]
pub(crate) struct MockInvoker {
    script: Mutex<HashMap<AgentKind, VecDeque<Result<AgentEnvelope, AgentError>>>>,
    requests: Mutex<Vec<AgentRequest>>,
}

impl MockInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, agent: AgentKind, outcome: Result<AgentEnvelope, AgentError>) {
        self.script
            .lock()
            .unwrap()
            .entry(agent)
            .or_default()
            .push_back(outcome);
    }

    /// Queue a structured reply wrapped under `response.result`.
    pub fn reply(&self, agent: AgentKind, payload: Value) {
        self.push(agent, Ok(AgentEnvelope::wrap(payload)));
    }

    pub fn requests(&self) -> Vec<AgentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentInvoker for MockInvoker {
    async fn invoke(&self, request: AgentRequest) -> Result<AgentEnvelope, AgentError> {
        let agent = request.agent;
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .get_mut(&agent)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(AgentError::http(format!("no scripted reply for {agent}"))))
    }
}

/// Holds every reply until [`GatedInvoker::release`] is called.
pub(crate) struct GatedInvoker {
    inner: MockInvoker,
    gate: Notify,
}

impl GatedInvoker {
    pub fn new(inner: MockInvoker) -> Self {
        Self {
            inner,
            gate: Notify::new(),
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl AgentInvoker for GatedInvoker {
    async fn invoke(&self, request: AgentRequest) -> Result<AgentEnvelope, AgentError> {
        self.gate.notified().await;
        self.inner.invoke(request).await
    }
}

pub(crate) struct MockUploader {
    receipt: Result<UploadReceipt, AgentError>,
    calls: Mutex<usize>,
}

impl MockUploader {
    pub fn with_assets(ids: &[&str]) -> Self {
        Self {
            receipt: Ok(UploadReceipt {
                success: true,
                asset_ids: ids.iter().map(|id| id.to_string()).collect(),
            }),
            calls: Mutex::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            receipt: Err(AgentError::Status {
                status: 413,
                body: "payload too large".into(),
            }),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl AssetUploader for MockUploader {
    async fn upload(&self, _files: &[AssetFile]) -> Result<UploadReceipt, AgentError> {
        *self.calls.lock().unwrap() += 1;
        self.receipt.clone()
    }
}

#[derive(Default)]
pub(crate) struct RecordingClipboard {
    copied: Mutex<Vec<String>>,
}

impl RecordingClipboard {
    pub fn copied(&self) -> Vec<String> {
        self.copied.lock().unwrap().clone()
    }
}

impl Clipboard for RecordingClipboard {
    fn copy(&self, text: &str) -> bool {
        self.copied.lock().unwrap().push(text.to_string());
        true
    }
}
