//! Multi-turn creative interview.
//!
//! The agent asks questions until it decides it has enough, then replies
//! with generated content. Every turn of one interview carries the same
//! correlation id so the agent can recall earlier answers.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::models::{CreatorContent, CreatorPayload, InterviewPrompt};
use super::normalizer::text_of;
use super::progress::SubTask;
use super::request::{RequestSlot, RequestTicket};
use super::{
    AgentOutcome, Applied, Context, InteractionStatus, PendingRequest, Step, lenient, payload_of,
    prompt,
};
use crate::agents::{AgentKind, AgentRequest};
use crate::error::InteractionError;

const AGENT: AgentKind = AgentKind::Creator;

pub const FIRST_QUESTION: &str = "Tell me about yourself and what you would like me to create.";
pub const FOLLOW_UP: &str = "Tell me more...";
pub const ACKNOWLEDGEMENT: &str = "Thank you! Let me create something special for you.";
pub const CONTENT_FIRST_TURN: &str = "Here is your creative content!";
pub const CONTENT_READY: &str = "Your creative content is ready!";

pub const MSG_START_FAILED: &str = "Failed to start creative interview.";
pub const MSG_SEND_FAILED: &str = "Failed to send response.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    Agent,
    User,
}

/// One line of the interview transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    fn agent(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Agent,
            text: text.into(),
        }
    }

    fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }
}

/// A creator reply classified by phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatorReply {
    Interview(InterviewPrompt),
    Generation(CreatorContent),
    /// Neither a question nor content; the agent's prose, if any.
    Acknowledgement(Option<String>),
}

impl CreatorReply {
    /// Classify a follow-up reply. An explicit generation tag wins over a
    /// question; untagged content or title still counts as generation.
    pub fn classify(payload: Option<&Value>) -> Self {
        let Some(payload) = payload else {
            return Self::Acknowledgement(None);
        };
        let text = text_of(payload).map(str::to_string);
        let parsed: CreatorPayload = lenient::decode(payload);
        if parsed.is_generation() {
            Self::Generation(parsed.into_content())
        } else if parsed.is_interview() {
            Self::Interview(parsed.into_prompt())
        } else if parsed.has_content() {
            Self::Generation(parsed.into_content())
        } else {
            Self::Acknowledgement(text)
        }
    }
}

fn correlation_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "creator-{}-{}",
        chrono::Utc::now().timestamp_millis(),
        &suffix[..6]
    )
}

#[derive(Debug, Clone, Default)]
pub struct CreatorInteraction {
    slot: RequestSlot,
    correlation_id: Option<String>,
    transcript: Vec<Turn>,
    prompt: Option<InterviewPrompt>,
    result: Option<CreatorContent>,
    error: Option<String>,
}

impl CreatorInteraction {
    pub fn is_started(&self) -> bool {
        self.correlation_id.is_some()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// The most recent question, with its position in the interview.
    pub fn current_prompt(&self) -> Option<&InterviewPrompt> {
        self.prompt.as_ref()
    }

    pub fn result(&self) -> Option<&CreatorContent> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.slot.is_busy()
    }

    pub fn status(&self) -> InteractionStatus {
        InteractionStatus::of(self.is_running(), self.error.is_some(), self.result.is_some())
    }

    pub fn begin_start(&mut self, ctx: &mut Context<'_>) -> Result<PendingRequest, InteractionError> {
        let ticket = self.slot.begin().ok_or(InteractionError::Busy(AGENT))?;
        let id = correlation_id();
        self.correlation_id = Some(id.clone());
        self.transcript.clear();
        self.prompt = None;
        self.result = None;
        self.error = None;
        ctx.log.push("Creator Agent: Starting creative interview...");
        info!("Creative interview started ({})", id);

        let message = prompt(
            ctx.mode,
            "Start the creative content interview. Ask me your first question.",
        );
        Ok(PendingRequest {
            step: Step::CreatorStart,
            ticket,
            request: AgentRequest::new(AGENT, ctx.agents.id_for(AGENT), message)
                .with_correlation_id(id),
        })
    }

    /// Record the user's answer and prepare it for the agent.
    pub fn begin_send(
        &mut self,
        text: &str,
        ctx: &mut Context<'_>,
    ) -> Result<PendingRequest, InteractionError> {
        if text.trim().is_empty() {
            return Err(InteractionError::InputRejected("answer is empty"));
        }
        let Some(id) = self.correlation_id.clone() else {
            return Err(InteractionError::InputRejected("interview has not started"));
        };
        let ticket = self.slot.begin().ok_or(InteractionError::Busy(AGENT))?;
        self.transcript.push(Turn::user(text));
        self.error = None;
        ctx.log.push("Creator Agent: Processing your response...");

        let message = prompt(ctx.mode, text);
        Ok(PendingRequest {
            step: Step::CreatorReply,
            ticket,
            request: AgentRequest::new(AGENT, ctx.agents.id_for(AGENT), message)
                .with_correlation_id(id),
        })
    }

    pub fn apply_start(
        &mut self,
        ticket: RequestTicket,
        outcome: AgentOutcome,
        ctx: &mut Context<'_>,
    ) -> Result<Applied, InteractionError> {
        if !self.slot.finish(ticket) {
            debug!("Discarding stale interview opening");
            return Ok(Applied::Stale);
        }

        let payload = match payload_of(outcome) {
            Ok(payload) => payload,
            Err(reason) => return Err(self.transport(&reason, MSG_START_FAILED, ctx)),
        };
        let parsed: CreatorPayload = payload
            .as_ref()
            .map(lenient::decode::<CreatorPayload>)
            .unwrap_or_default();

        if parsed.is_interview() {
            let question = parsed.into_prompt();
            ctx.log.push(format!(
                "Creator Agent: Interview started. Question {} of {}",
                question.question_number.unwrap_or(1),
                question.total_questions.unwrap_or(3)
            ));
            self.ask(question, FIRST_QUESTION);
        } else if parsed.is_generation() {
            self.accept(parsed.into_content(), CONTENT_FIRST_TURN, ctx);
            ctx.log.push("Creator Agent: Content generated!");
        } else {
            ctx.log
                .push("Creator Agent: Interview started with default question.");
            self.ask(InterviewPrompt::default(), FIRST_QUESTION);
        }
        Ok(Applied::Accepted)
    }

    pub fn apply_send(
        &mut self,
        ticket: RequestTicket,
        outcome: AgentOutcome,
        ctx: &mut Context<'_>,
    ) -> Result<Applied, InteractionError> {
        if !self.slot.finish(ticket) {
            debug!("Discarding stale interview reply");
            return Ok(Applied::Stale);
        }

        let payload = match payload_of(outcome) {
            Ok(payload) => payload,
            Err(reason) => return Err(self.transport(&reason, MSG_SEND_FAILED, ctx)),
        };

        match CreatorReply::classify(payload.as_ref()) {
            CreatorReply::Generation(content) => {
                ctx.log.push(format!(
                    "Creator Agent: Content generated -- \"{}\"",
                    content.title.as_deref().unwrap_or("Untitled")
                ));
                self.accept(content, CONTENT_READY, ctx);
            }
            CreatorReply::Interview(question) => {
                ctx.log.push(format!(
                    "Creator Agent: Question {} of {}",
                    question
                        .question_number
                        .map_or_else(|| "?".to_string(), |n| n.to_string()),
                    question.total_questions.unwrap_or(3)
                ));
                self.ask(question, FOLLOW_UP);
            }
            CreatorReply::Acknowledgement(text) => {
                ctx.log.push("Creator Agent: Response processed.");
                self.transcript
                    .push(Turn::agent(text.unwrap_or_else(|| ACKNOWLEDGEMENT.to_string())));
            }
        }
        Ok(Applied::Accepted)
    }

    fn ask(&mut self, question: InterviewPrompt, fallback: &str) {
        let text = question.question.clone().unwrap_or_else(|| fallback.to_string());
        self.transcript.push(Turn::agent(text));
        self.prompt = Some(question);
    }

    fn accept(&mut self, content: CreatorContent, turn: &str, ctx: &mut Context<'_>) {
        info!("Creator content accepted: {:?}", content.title);
        self.transcript.push(Turn::agent(turn));
        self.result = Some(content);
        self.error = None;
        ctx.progress.complete(SubTask::Creator);
    }

    fn transport(&mut self, reason: &str, message: &str, ctx: &mut Context<'_>) -> InteractionError {
        warn!("Creator request failed: {}", reason);
        ctx.log.push("Creator Agent: Connection error.");
        let err = InteractionError::Transport {
            agent: AGENT,
            message: message.to_string(),
        };
        self.error = Some(err.to_string());
        err
    }

    /// Forget the interview; the next start gets a fresh correlation id.
    pub fn reset(&mut self) {
        self.slot.invalidate();
        self.correlation_id = None;
        self.transcript.clear();
        self.prompt = None;
        self.result = None;
        self.error = None;
    }

    pub(crate) fn load_reference(&mut self, content: CreatorContent) {
        self.slot.invalidate();
        self.result = Some(content);
        self.error = None;
    }
}
