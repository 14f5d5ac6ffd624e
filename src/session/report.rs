//! Finale aggregation.
//!
//! Gated on all three experiences being complete (or replay mode). The
//! orchestrator receives a compact JSON summary of the other results, not the
//! results themselves.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::debate::AcceptedRound;
use super::models::{AnalystResult, CreatorContent, VibeReport};
use super::normalizer::has_number;
use super::request::{RequestSlot, RequestTicket};
use super::screen::FinaleGate;
use super::{
    AgentOutcome, Applied, Context, InteractionStatus, Mode, PendingRequest, Step, fixtures,
    lenient, payload_of, prompt,
};
use crate::agents::{AgentKind, AgentRequest};
use crate::error::InteractionError;

const AGENT: AgentKind = AgentKind::Orchestrator;

pub const MSG_UNRECOGNIZED: &str = "Could not generate the Vibe Report. Please try again.";
pub const MSG_TRANSPORT: &str = "Failed to connect to the Vibe Orchestrator.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub mode: Mode,
    pub analyst: Option<AnalystSummary>,
    pub debate: Option<DebateSummary>,
    pub creator: Option<CreatorSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalystSummary {
    pub score: Option<f64>,
    pub label: Option<String>,
    pub verdict: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebateSummary {
    pub topic: Option<String>,
    pub rounds: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatorSummary {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

impl ReportSummary {
    pub fn collect(
        mode: Mode,
        analyst: Option<&AnalystResult>,
        rounds: &[AcceptedRound],
        creator: Option<&CreatorContent>,
    ) -> Self {
        Self {
            mode,
            analyst: analyst.map(|a| AnalystSummary {
                score: a.overall_score,
                label: a.score_label.clone(),
                verdict: a.verdict.clone(),
            }),
            debate: rounds.first().map(|first| DebateSummary {
                topic: first.round.topic.clone(),
                rounds: rounds.len(),
            }),
            creator: creator.map(|c| CreatorSummary {
                title: c.title.clone(),
                content_type: c.content_type.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportInteraction {
    slot: RequestSlot,
    report: Option<VibeReport>,
    error: Option<String>,
}

impl ReportInteraction {
    pub fn report(&self) -> Option<&VibeReport> {
        self.report.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.slot.is_busy()
    }

    pub fn status(&self) -> InteractionStatus {
        InteractionStatus::of(self.is_running(), self.error.is_some(), self.report.is_some())
    }

    /// Prepare the finale request.
    ///
    /// Returns `Ok(None)` in replay mode: the reference report is installed
    /// directly and nothing needs to be sent.
    pub fn begin(
        &mut self,
        gate: FinaleGate,
        summary: &ReportSummary,
        ctx: &mut Context<'_>,
    ) -> Result<Option<PendingRequest>, InteractionError> {
        if !gate.is_open() {
            let err = InteractionError::FinaleLocked {
                completed: gate.completed,
            };
            self.error = Some(err.to_string());
            return Err(err);
        }
        if gate.replay {
            debug!("Replay mode: using the reference report");
            self.report = Some(fixtures::report());
            self.error = None;
            return Ok(None);
        }

        let ticket = self.slot.begin().ok_or(InteractionError::Busy(AGENT))?;
        self.error = None;
        ctx.log
            .push("Vibe Orchestrator: Generating Ultimate Vibe Report...");
        info!("Generating finale report");

        let summary = serde_json::to_string(summary).unwrap_or_default();
        let message = prompt(
            ctx.mode,
            format_args!(
                "Generate the Ultimate Vibe Report. All 3 apps are complete. Summary: {summary}"
            ),
        );
        Ok(Some(PendingRequest {
            step: Step::Report,
            ticket,
            request: AgentRequest::new(AGENT, ctx.agents.id_for(AGENT), message),
        }))
    }

    pub fn apply(
        &mut self,
        ticket: RequestTicket,
        outcome: AgentOutcome,
        ctx: &mut Context<'_>,
    ) -> Result<Applied, InteractionError> {
        if !self.slot.finish(ticket) {
            debug!("Discarding stale report reply");
            return Ok(Applied::Stale);
        }

        let payload = match payload_of(outcome) {
            Ok(payload) => payload,
            Err(reason) => {
                warn!("Report request failed: {}", reason);
                ctx.log.push("Vibe Orchestrator: Connection error.");
                return Err(self.fail(InteractionError::Transport {
                    agent: AGENT,
                    message: MSG_TRANSPORT.to_string(),
                }));
            }
        };

        let nested = payload
            .as_ref()
            .and_then(|p| p.get("vibe_report"))
            .filter(|r| r.is_object());
        if let Some(nested) = nested {
            let report: VibeReport = lenient::decode(nested);
            let thoughts = payload
                .as_ref()
                .and_then(|p| p.get("terminal_thoughts"))
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(Value::as_str);
            ctx.log.extend(thoughts);
            ctx.log.push("Vibe Orchestrator: Ultimate Vibe Report ready!");
            return Ok(self.accept(report));
        }

        match payload {
            Some(p) if has_number(&p, "vibe_score") => {
                ctx.log.push("Vibe Orchestrator: Report generated!");
                Ok(self.accept(lenient::decode(&p)))
            }
            _ => {
                ctx.log.push("Vibe Orchestrator: Error generating report.");
                Err(self.fail(InteractionError::Unrecognized {
                    agent: AGENT,
                    message: MSG_UNRECOGNIZED.to_string(),
                }))
            }
        }
    }

    fn accept(&mut self, report: VibeReport) -> Applied {
        info!("Vibe report accepted: score={:?}", report.vibe_score);
        self.report = Some(report);
        self.error = None;
        Applied::Accepted
    }

    fn fail(&mut self, err: InteractionError) -> InteractionError {
        if err.is_visible() {
            self.error = Some(err.to_string());
        }
        err
    }

    pub(crate) fn load_reference(&mut self, report: VibeReport) {
        self.slot.invalidate();
        self.report = Some(report);
        self.error = None;
    }

    pub(crate) fn clear(&mut self) {
        self.slot.invalidate();
        self.report = None;
        self.error = None;
    }
}
