//! HTTP implementation of the agent collaborators.
//!
//! ```text
//! POST {base_url}/agent   {"message", "agent_id", "assets"?, "session_id"?} -> envelope
//! POST {base_url}/upload  multipart "files"                               -> {"success", "asset_ids"}
//! ```

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use super::{AgentEnvelope, AgentInvoker, AgentRequest, AssetFile, AssetUploader, UploadReceipt};
use crate::config::AgentsConfig;
use crate::error::AgentError;

#[derive(Debug, Serialize)]
struct InvokeBody<'a> {
    message: &'a str,
    agent_id: &'a str,
    #[serde(skip_serializing_if = "no_assets")]
    assets: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
}

fn no_assets(assets: &&[String]) -> bool {
    assets.is_empty()
}

/// Agent gateway client over reqwest.
#[derive(Debug, Clone)]
pub struct HttpAgentClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAgentClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AgentError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AgentsConfig) -> Result<Self, AgentError> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, AgentError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(AgentError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl AgentInvoker for HttpAgentClient {
    async fn invoke(&self, request: AgentRequest) -> Result<AgentEnvelope, AgentError> {
        let body = InvokeBody {
            message: &request.message,
            agent_id: &request.agent_id,
            assets: &request.assets,
            session_id: request.correlation_id.as_deref(),
        };

        tracing::debug!(
            "Invoking {} ({} chars, {} assets)",
            request.agent,
            request.message.len(),
            request.assets.len()
        );

        let resp = self
            .client
            .post(self.endpoint("agent"))
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::http(format!("{}: {}", request.agent, e)))?;

        Self::check_status(resp)
            .await?
            .json::<AgentEnvelope>()
            .await
            .map_err(|e| AgentError::decode(e.to_string()))
    }
}

#[async_trait]
impl AssetUploader for HttpAgentClient {
    async fn upload(&self, files: &[AssetFile]) -> Result<UploadReceipt, AgentError> {
        let mut form = reqwest::multipart::Form::new();
        for file in files {
            let mut part =
                reqwest::multipart::Part::bytes(file.bytes.clone()).file_name(file.name.clone());
            if let Some(ref media_type) = file.media_type {
                part = part
                    .mime_str(media_type)
                    .map_err(|e| AgentError::http(e.to_string()))?;
            }
            form = form.part("files", part);
        }

        tracing::debug!("Uploading {} file(s)", files.len());

        let resp = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AgentError::http(e.to_string()))?;

        Self::check_status(resp)
            .await?
            .json::<UploadReceipt>()
            .await
            .map_err(|e| AgentError::decode(e.to_string()))
    }
}
