//! Multi-round debate accumulation.
//!
//! ```text
//! start(topic)     ──► round r (reply index, else 1)   rounds = [r]
//! continue_round() ──► round last+1                     rounds += [last+1]
//! ```
//!
//! Rounds are append-only and strictly increasing in index. The index of a
//! continued round is the one requested, not the one echoed by the agent.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::models::DebateRound;
use super::normalizer::{has_any, looks_unstructured};
use super::progress::SubTask;
use super::request::{RequestSlot, RequestTicket};
use super::{
    AgentOutcome, Applied, Context, InteractionStatus, PendingRequest, Step, lenient, payload_of,
    prompt,
};
use crate::agents::{AgentKind, AgentRequest};
use crate::error::InteractionError;

const AGENT: AgentKind = AgentKind::Debate;

/// Keys that make a reply a usable opening round.
const START_KEYS: [&str; 4] = ["debater_a", "debater_b", "introduction", "topic"];
/// Keys that make a reply a usable follow-up round.
const CONTINUE_KEYS: [&str; 3] = ["debater_a", "debater_b", "round_summary"];

pub const MSG_UNSTRUCTURED: &str =
    "Debate Coordinator returned unstructured response. Please try again.";
pub const MSG_START_FAILED: &str = "Could not start the debate. Please try again.";
pub const MSG_CONTINUE_FAILED: &str = "Could not continue the debate.";
pub const MSG_TRANSPORT: &str = "Failed to connect to the Debate Coordinator.";

/// Highest opening index taken from a reply; anything above reads as round 1.
const MAX_OPENING_ROUND: u32 = 100;

/// A round accepted into the debate, with the index it was accepted under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptedRound {
    pub index: u32,
    pub round: DebateRound,
}

#[derive(Debug, Clone, Default)]
pub struct DebateInteraction {
    slot: RequestSlot,
    topic: Option<String>,
    rounds: Vec<AcceptedRound>,
    error: Option<String>,
}

impl DebateInteraction {
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn rounds(&self) -> &[AcceptedRound] {
        &self.rounds
    }

    pub fn latest(&self) -> Option<&AcceptedRound> {
        self.rounds.last()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.slot.is_busy()
    }

    pub fn status(&self) -> InteractionStatus {
        InteractionStatus::of(self.is_running(), self.error.is_some(), !self.rounds.is_empty())
    }

    /// Whether another round may be requested under a cap of `max_rounds`.
    ///
    /// The cap is a presentation choice; `begin_continue` does not check it.
    pub fn can_continue(&self, max_rounds: u32) -> bool {
        !self.is_running() && self.rounds.last().is_some_and(|r| r.index < max_rounds)
    }

    fn next_index(&self) -> Option<u32> {
        self.rounds.last().map_or(0, |r| r.index).checked_add(1)
    }

    pub fn begin_start(
        &mut self,
        topic: &str,
        ctx: &mut Context<'_>,
    ) -> Result<PendingRequest, InteractionError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(InteractionError::InputRejected("debate topic is empty"));
        }
        let ticket = self.slot.begin().ok_or(InteractionError::Busy(AGENT))?;
        self.error = None;
        self.rounds.clear();
        self.topic = Some(topic.to_string());
        ctx.log
            .push(format!("Debate Coordinator: Setting up debate on \"{topic}\"..."));
        info!("Debate started on {:?}", topic);

        let message = prompt(
            ctx.mode,
            format_args!(
                "Topic: {topic}. Debate this topic with both debaters arguing their positions."
            ),
        );
        Ok(PendingRequest {
            step: Step::DebateStart,
            ticket,
            request: AgentRequest::new(AGENT, ctx.agents.id_for(AGENT), message),
        })
    }

    pub fn begin_continue(
        &mut self,
        ctx: &mut Context<'_>,
    ) -> Result<PendingRequest, InteractionError> {
        let Some(index) = self.next_index() else {
            return Err(InteractionError::InputRejected("no rounds left to request"));
        };
        let topic = self.topic.clone().unwrap_or_default();
        let ticket = self.slot.begin().ok_or(InteractionError::Busy(AGENT))?;
        self.error = None;
        ctx.log
            .push(format!("Debate Coordinator: Starting round {index}..."));

        let message = prompt(
            ctx.mode,
            format_args!(
                "Topic: {topic}. Continue the debate to round {index}. Provide the next round of arguments."
            ),
        );
        Ok(PendingRequest {
            step: Step::DebateContinue(index),
            ticket,
            request: AgentRequest::new(AGENT, ctx.agents.id_for(AGENT), message),
        })
    }

    pub fn apply_start(
        &mut self,
        ticket: RequestTicket,
        outcome: AgentOutcome,
        ctx: &mut Context<'_>,
    ) -> Result<Applied, InteractionError> {
        if !self.slot.finish(ticket) {
            debug!("Discarding stale debate opening");
            return Ok(Applied::Stale);
        }

        let payload = match payload_of(outcome) {
            Ok(payload) => payload,
            Err(reason) => return Err(self.transport(&reason, ctx)),
        };

        match payload {
            Some(p) if has_any(&p, &START_KEYS) => {
                let round: DebateRound = lenient::decode(&p);
                let index = match round.round {
                    Some(r) if (1..=MAX_OPENING_ROUND).contains(&r) => r,
                    Some(r) => {
                        warn!("Debate Coordinator opened at round {}; using 1", r);
                        1
                    }
                    None => 1,
                };
                ctx.log
                    .push(format!("Debate Coordinator: Round {index} complete!"));
                self.rounds = vec![AcceptedRound { index, round }];
                self.error = None;
                ctx.progress.complete(SubTask::Duelist);
                Ok(Applied::Accepted)
            }
            Some(p) if looks_unstructured(&p) => {
                ctx.log.push("Debate Coordinator: Unexpected format.");
                Err(self.fail(InteractionError::Unstructured {
                    agent: AGENT,
                    message: MSG_UNSTRUCTURED.to_string(),
                }))
            }
            _ => {
                ctx.log.push("Debate Coordinator: Error starting debate.");
                Err(self.fail(InteractionError::Unrecognized {
                    agent: AGENT,
                    message: MSG_START_FAILED.to_string(),
                }))
            }
        }
    }

    pub fn apply_continue(
        &mut self,
        ticket: RequestTicket,
        index: u32,
        outcome: AgentOutcome,
        ctx: &mut Context<'_>,
    ) -> Result<Applied, InteractionError> {
        if !self.slot.finish(ticket) {
            debug!("Discarding stale reply for debate round {}", index);
            return Ok(Applied::Stale);
        }

        let payload = match payload_of(outcome) {
            Ok(payload) => payload,
            Err(reason) => return Err(self.transport(&reason, ctx)),
        };

        match payload {
            Some(p) if has_any(&p, &CONTINUE_KEYS) => {
                let round: DebateRound = lenient::decode(&p);
                if let Some(echoed) = round.round.filter(|r| *r != index) {
                    warn!(
                        "Debate Coordinator labelled round {} as {}; keeping {}",
                        index, echoed, index
                    );
                }
                ctx.log
                    .push(format!("Debate Coordinator: Round {index} complete!"));
                self.rounds.push(AcceptedRound { index, round });
                self.error = None;
                Ok(Applied::Accepted)
            }
            Some(p) if looks_unstructured(&p) => {
                ctx.log.push("Debate Coordinator: Unexpected format.");
                Err(self.fail(InteractionError::Unstructured {
                    agent: AGENT,
                    message: MSG_UNSTRUCTURED.to_string(),
                }))
            }
            _ => {
                ctx.log.push("Debate Coordinator: Error continuing.");
                Err(self.fail(InteractionError::Unrecognized {
                    agent: AGENT,
                    message: MSG_CONTINUE_FAILED.to_string(),
                }))
            }
        }
    }

    fn transport(&mut self, reason: &str, ctx: &mut Context<'_>) -> InteractionError {
        warn!("Debate request failed: {}", reason);
        ctx.log.push("Debate Coordinator: Connection error.");
        self.fail(InteractionError::Transport {
            agent: AGENT,
            message: MSG_TRANSPORT.to_string(),
        })
    }

    fn fail(&mut self, err: InteractionError) -> InteractionError {
        if err.is_visible() {
            self.error = Some(err.to_string());
        }
        err
    }

    pub(crate) fn load_reference(&mut self, round: DebateRound) {
        self.slot.invalidate();
        self.topic = round.topic.clone();
        self.rounds = vec![AcceptedRound { index: 1, round }];
        self.error = None;
    }

    pub(crate) fn clear(&mut self) {
        self.slot.invalidate();
        self.topic = None;
        self.rounds.clear();
        self.error = None;
    }
}
