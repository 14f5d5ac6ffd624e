//! Error types for the VibeSplit session engine.
//!
//! Library code returns these typed errors; the CLI edge wraps them in
//! `anyhow` with context.

use crate::agents::AgentKind;
use crate::session::Screen;
use thiserror::Error;

/// Failure while talking to an agent or the asset uploader.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// Network-level failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered with a non-success status code.
    #[error("agent service returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The reply could not be decoded as an envelope.
    #[error("invalid reply: {0}")]
    Decode(String),

    /// A local file could not be read for upload.
    #[error("cannot read {path}: {message}")]
    File { path: String, message: String },
}

impl AgentError {
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

/// Outcome of a rejected or failed interaction step.
///
/// `InputRejected` and `Busy` leave the interaction untouched. Every other
/// variant is also recorded as the interaction's visible error message so
/// the user can retry from the same screen.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InteractionError {
    /// Empty or whitespace-only input, refused before any request.
    #[error("input rejected: {0}")]
    InputRejected(&'static str),

    /// The interaction already has a request in flight.
    #[error("{} is still working on the previous request", .0.display_name())]
    Busy(AgentKind),

    /// The collaborator raised or returned a failed envelope.
    #[error("{message}")]
    Transport { agent: AgentKind, message: String },

    /// The agent answered in prose instead of structured data.
    #[error("{message}")]
    Unstructured { agent: AgentKind, message: String },

    /// The agent answered with a shape this interaction does not recognize.
    #[error("{message}")]
    Unrecognized { agent: AgentKind, message: String },

    /// Asset upload failed; the analysis agent was not contacted.
    #[error("{0}")]
    UploadFailed(String),

    /// The finale was requested before all three sub-tasks completed.
    #[error("finale locked: {completed}/3 experiences complete")]
    FinaleLocked { completed: usize },
}

impl InteractionError {
    /// Whether this error should be shown on the interaction's screen.
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::InputRejected(_) | Self::Busy(_))
    }
}

/// Refused screen transition.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationError {
    #[error("cannot open {target:?}: {completed}/3 experiences complete")]
    Locked { target: Screen, completed: usize },
}
