//! Agent collaborators.
//!
//! The session engine reaches the outside world only through these traits:
//! - [`AgentInvoker`] sends a message to one of the four agents
//! - [`AssetUploader`] turns local files into asset identifiers
//! - [`Clipboard`] copies shareable text, best-effort
//!
//! [`HttpAgentClient`] and [`CommandClipboard`] are the stock implementations.

pub mod client;
pub mod clipboard;
pub mod types;

use async_trait::async_trait;

use crate::error::AgentError;

pub use client::HttpAgentClient;
pub use clipboard::CommandClipboard;
pub use types::*;

/// Invokes an agent by identity.
///
/// Both an `Err` and an envelope with a false success flag mean the request
/// failed; callers must not distinguish them.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    async fn invoke(&self, request: AgentRequest) -> Result<AgentEnvelope, AgentError>;
}

/// Uploads files and returns their asset identifiers.
#[async_trait]
pub trait AssetUploader: Send + Sync {
    async fn upload(&self, files: &[AssetFile]) -> Result<UploadReceipt, AgentError>;
}

/// Best-effort clipboard sink. Failure is never fatal.
pub trait Clipboard {
    fn copy(&self, text: &str) -> bool;
}
