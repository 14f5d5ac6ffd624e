//! Agent collaborator data types.
//!
//! The envelope is the raw, untrusted reply of an agent invocation. Nothing
//! past [`crate::session::normalizer`] looks at it directly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

use crate::error::AgentError;

// ─── Agent Identity ──────────────────────────────────────────

/// The four logical agents a session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Chat analysis.
    Analyst,
    /// Two-debater showdown.
    Debate,
    /// Interview-driven content creation.
    Creator,
    /// Finale aggregation.
    Orchestrator,
}

impl AgentKind {
    pub const ALL: [AgentKind; 4] = [
        AgentKind::Analyst,
        AgentKind::Debate,
        AgentKind::Creator,
        AgentKind::Orchestrator,
    ];

    /// Name used in activity notes and error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Analyst => "Analyst Agent",
            Self::Debate => "Debate Coordinator",
            Self::Creator => "Creator Agent",
            Self::Orchestrator => "Vibe Orchestrator",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Opaque agent identifiers, one per logical agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDirectory {
    pub analyst: String,
    pub debate: String,
    pub creator: String,
    pub orchestrator: String,
}

impl AgentDirectory {
    pub fn id_for(&self, kind: AgentKind) -> &str {
        match kind {
            AgentKind::Analyst => &self.analyst,
            AgentKind::Debate => &self.debate,
            AgentKind::Creator => &self.creator,
            AgentKind::Orchestrator => &self.orchestrator,
        }
    }
}

impl Default for AgentDirectory {
    fn default() -> Self {
        Self {
            analyst: "69899b7050cb2c0172eaeccd".to_string(),
            debate: "69899b70157bf43b98dd6213".to_string(),
            creator: "69899b4d9bf633d1a4f366a3".to_string(),
            orchestrator: "69899b87fbaecdb527a56dad".to_string(),
        }
    }
}

// ─── Requests ────────────────────────────────────────────────

/// One invocation of an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRequest {
    pub agent: AgentKind,
    pub agent_id: String,
    pub message: String,
    /// Uploaded asset identifiers to attach instead of raw text.
    pub assets: Vec<String>,
    /// Lets the agent recall earlier turns of the same conversation.
    pub correlation_id: Option<String>,
}

impl AgentRequest {
    pub fn new(agent: AgentKind, agent_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            agent,
            agent_id: agent_id.into(),
            message: message.into(),
            assets: Vec::new(),
            correlation_id: None,
        }
    }

    pub fn with_assets(mut self, assets: Vec<String>) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }
}

// ─── Envelope ────────────────────────────────────────────────

/// Raw agent reply: an outer success indicator around an agent-defined payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentEnvelope {
    /// Successful envelope carrying a structured payload under `response.result`.
    pub fn wrap(payload: Value) -> Self {
        Self {
            success: Some(true),
            response: Some(serde_json::json!({ "result": payload })),
            error: None,
        }
    }

    /// Successful envelope carrying a plain text message.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            success: Some(true),
            response: Some(serde_json::json!({ "message": text.into() })),
            error: None,
        }
    }

    /// Failed envelope.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            response: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success == Some(true)
    }
}

// ─── Uploads ─────────────────────────────────────────────────

/// A file handed to the asset uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub media_type: Option<String>,
}

impl AssetFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            media_type: None,
        }
    }

    /// Read a file from disk, guessing the media type from its extension.
    pub async fn from_path(path: &Path) -> Result<Self, AgentError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| AgentError::File {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        let media_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(media_type_for_extension)
            .map(str::to_string);
        Ok(Self {
            name,
            bytes,
            media_type,
        })
    }
}

fn media_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "txt" => Some("text/plain"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// Reply of the asset uploader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub asset_ids: Vec<String>,
}
