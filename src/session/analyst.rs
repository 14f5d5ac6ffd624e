//! Single-shot chat analysis.
//!
//! ```text
//! begin_submit ──► invoke ──► apply
//! begin_upload ──► upload ──► apply_upload ──► invoke ──► apply
//! ```
//!
//! A rejected or failed step never discards a previously accepted result.

use tracing::{debug, info, warn};

use super::models::AnalystResult;
use super::normalizer::{has_number, has_truthy, looks_unstructured};
use super::progress::SubTask;
use super::request::{RequestSlot, RequestTicket};
use super::{
    AgentOutcome, Applied, Context, InteractionStatus, PendingRequest, Step, lenient, payload_of,
    prompt, score_text,
};
use crate::agents::{AgentKind, AgentRequest, UploadReceipt};
use crate::error::{AgentError, InteractionError};

const AGENT: AgentKind = AgentKind::Analyst;

pub const MSG_UNSTRUCTURED: &str =
    "Agent returned text instead of structured analysis. Please try again.";
pub const MSG_UNPARSEABLE: &str = "Could not parse analysis results. Please try again.";
pub const MSG_TRANSPORT: &str = "Failed to connect to the Analyst Agent.";
pub const MSG_UPLOAD: &str = "File upload failed. Please try pasting text instead.";

#[derive(Debug, Clone, Default)]
pub struct AnalystInteraction {
    slot: RequestSlot,
    result: Option<AnalystResult>,
    error: Option<String>,
}

impl AnalystInteraction {
    pub fn result(&self) -> Option<&AnalystResult> {
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

    /// Prepare an analysis of pasted conversation text.
    pub fn begin_submit(
        &mut self,
        text: &str,
        ctx: &mut Context<'_>,
    ) -> Result<PendingRequest, InteractionError> {
        if text.trim().is_empty() {
            return Err(InteractionError::InputRejected("conversation text is empty"));
        }
        let ticket = self.slot.begin().ok_or(InteractionError::Busy(AGENT))?;
        self.error = None;
        ctx.log.push("Analyst Agent: Scanning conversation for vibes...");
        info!("Analyst request started ({} chars)", text.chars().count());

        let message = prompt(
            ctx.mode,
            format_args!("Analyze this chat conversation: {text}"),
        );
        Ok(PendingRequest {
            step: Step::Analysis,
            ticket,
            request: AgentRequest::new(AGENT, ctx.agents.id_for(AGENT), message),
        })
    }

    /// Reserve the slot for an upload of `file_count` files.
    pub fn begin_upload(
        &mut self,
        file_count: usize,
        ctx: &mut Context<'_>,
    ) -> Result<RequestTicket, InteractionError> {
        if file_count == 0 {
            return Err(InteractionError::InputRejected("no files selected"));
        }
        let ticket = self.slot.begin().ok_or(InteractionError::Busy(AGENT))?;
        self.error = None;
        ctx.log.push("Uploading file for analysis...");
        info!("Uploading {} file(s) for analysis", file_count);
        Ok(ticket)
    }

    /// Turn an upload receipt into the analysis request, or fail without
    /// contacting the agent. `Ok(None)` means the upload was superseded.
    pub fn apply_upload(
        &mut self,
        ticket: RequestTicket,
        receipt: Result<UploadReceipt, AgentError>,
        ctx: &mut Context<'_>,
    ) -> Result<Option<PendingRequest>, InteractionError> {
        if !self.slot.is_current(ticket) {
            debug!("Discarding stale upload receipt");
            return Ok(None);
        }

        let asset_ids = match receipt {
            Ok(receipt) if receipt.success && !receipt.asset_ids.is_empty() => receipt.asset_ids,
            Ok(receipt) => {
                warn!(
                    "Upload rejected: success={}, {} asset id(s)",
                    receipt.success,
                    receipt.asset_ids.len()
                );
                return Err(self.upload_failed(ticket, ctx));
            }
            Err(e) => {
                warn!("Upload failed: {}", e);
                return Err(self.upload_failed(ticket, ctx));
            }
        };

        ctx.log.push("Analyst Agent: Processing uploaded file...");
        let message = prompt(
            ctx.mode,
            "Analyze the uploaded chat screenshot for relationship insights.",
        );
        Ok(Some(PendingRequest {
            step: Step::Analysis,
            ticket,
            request: AgentRequest::new(AGENT, ctx.agents.id_for(AGENT), message)
                .with_assets(asset_ids),
        }))
    }

    fn upload_failed(&mut self, ticket: RequestTicket, ctx: &mut Context<'_>) -> InteractionError {
        self.slot.finish(ticket);
        ctx.log.push("Upload failed.");
        let err = InteractionError::UploadFailed(MSG_UPLOAD.to_string());
        self.error = Some(err.to_string());
        err
    }

    pub fn apply(
        &mut self,
        ticket: RequestTicket,
        outcome: AgentOutcome,
        ctx: &mut Context<'_>,
    ) -> Result<Applied, InteractionError> {
        if !self.slot.finish(ticket) {
            debug!("Discarding stale analyst reply");
            return Ok(Applied::Stale);
        }

        let payload = match payload_of(outcome) {
            Ok(payload) => payload,
            Err(reason) => {
                warn!("Analyst request failed: {}", reason);
                ctx.log.push("Analyst Agent: Connection error.");
                return Err(self.fail(InteractionError::Transport {
                    agent: AGENT,
                    message: MSG_TRANSPORT.to_string(),
                }));
            }
        };

        match payload {
            Some(p) if has_number(&p, "overall_score") || has_truthy(&p, "findings") => {
                let result: AnalystResult = lenient::decode(&p);
                ctx.log.push(format!(
                    "Analyst Agent: Analysis complete! Score: {}/100",
                    score_text(result.overall_score)
                ));
                info!(
                    "Analyst result accepted: score={:?}, {} finding(s)",
                    result.overall_score,
                    result.findings.len()
                );
                self.result = Some(result);
                self.error = None;
                ctx.progress.complete(SubTask::Analyst);
                Ok(Applied::Accepted)
            }
            Some(p) if looks_unstructured(&p) => {
                ctx.log.push("Analyst Agent: Unexpected response format.");
                Err(self.fail(InteractionError::Unstructured {
                    agent: AGENT,
                    message: MSG_UNSTRUCTURED.to_string(),
                }))
            }
            _ => {
                ctx.log.push("Analyst Agent: Error parsing response.");
                Err(self.fail(InteractionError::Unrecognized {
                    agent: AGENT,
                    message: MSG_UNPARSEABLE.to_string(),
                }))
            }
        }
    }

    fn fail(&mut self, err: InteractionError) -> InteractionError {
        if err.is_visible() {
            self.error = Some(err.to_string());
        }
        err
    }

    pub(crate) fn load_reference(&mut self, result: AnalystResult) {
        self.slot.invalidate();
        self.result = Some(result);
        self.error = None;
    }

    pub(crate) fn clear(&mut self) {
        self.slot.invalidate();
        self.result = None;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentEnvelope;
    use crate::session::test_helpers::Harness as Fixture;
    use serde_json::json;

    #[test]
    fn test_blank_input_rejected_without_request() {
        let mut fx = Fixture::new();
        let mut analyst = AnalystInteraction::default();
        let err = analyst.begin_submit("   \n", &mut fx.ctx()).unwrap_err();
        assert!(matches!(err, InteractionError::InputRejected(_)));
        assert!(!analyst.is_running());
        assert!(fx.log.is_empty());
    }

    #[test]
    fn test_submit_builds_prompt() {
        let mut fx = Fixture::new();
        let mut analyst = AnalystInteraction::default();
        let pending = analyst.begin_submit("A: hi\nB: hey", &mut fx.ctx()).unwrap();
        assert_eq!(
            pending.request.message,
            "Mode: valentine. Analyze this chat conversation: A: hi\nB: hey"
        );
        assert_eq!(pending.request.agent_id, fx.agents.analyst);
        assert_eq!(analyst.status(), InteractionStatus::Running);
        assert!(matches!(
            analyst.begin_submit("again", &mut fx.ctx()),
            Err(InteractionError::Busy(AgentKind::Analyst))
        ));
    }

    #[test]
    fn test_accepts_findings_without_score() {
        let mut fx = Fixture::new();
        let mut analyst = AnalystInteraction::default();
        let pending = analyst.begin_submit("chat", &mut fx.ctx()).unwrap();
        let outcome = Ok(AgentEnvelope::wrap(json!({"findings": [{"type": "red_flag"}]})));
        assert_eq!(
            analyst.apply(pending.ticket, outcome, &mut fx.ctx()),
            Ok(Applied::Accepted)
        );
        assert!(fx.progress.analyst);
        assert_eq!(
            fx.log.last().unwrap().text,
            "Analyst Agent: Analysis complete! Score: N/A/100"
        );
    }

    #[test]
    fn test_failure_keeps_previous_result() {
        let mut fx = Fixture::new();
        let mut analyst = AnalystInteraction::default();
        let first = analyst.begin_submit("chat", &mut fx.ctx()).unwrap();
        analyst
            .apply(
                first.ticket,
                Ok(AgentEnvelope::wrap(json!({"overall_score": 64}))),
                &mut fx.ctx(),
            )
            .unwrap();

        let second = analyst.begin_submit("chat", &mut fx.ctx()).unwrap();
        let err = analyst
            .apply(
                second.ticket,
                Err(AgentError::http("connection refused")),
                &mut fx.ctx(),
            )
            .unwrap_err();
        assert_eq!(err.to_string(), MSG_TRANSPORT);
        assert_eq!(analyst.error(), Some(MSG_TRANSPORT));
        assert_eq!(analyst.result().unwrap().overall_score, Some(64.0));
        assert_eq!(analyst.status(), InteractionStatus::Failed);
    }

    #[test]
    fn test_string_score_is_not_numeric() {
        let mut fx = Fixture::new();
        let mut analyst = AnalystInteraction::default();
        let pending = analyst.begin_submit("chat", &mut fx.ctx()).unwrap();
        let err = analyst
            .apply(
                pending.ticket,
                Ok(AgentEnvelope::wrap(json!({"overall_score": "90"}))),
                &mut fx.ctx(),
            )
            .unwrap_err();
        assert_eq!(err.to_string(), MSG_UNPARSEABLE);
        assert!(!fx.progress.analyst);
    }

    #[test]
    fn test_upload_failure_skips_agent() {
        let mut fx = Fixture::new();
        let mut analyst = AnalystInteraction::default();
        assert!(matches!(
            analyst.begin_upload(0, &mut fx.ctx()),
            Err(InteractionError::InputRejected(_))
        ));

        let ticket = analyst.begin_upload(1, &mut fx.ctx()).unwrap();
        let receipt = Ok(UploadReceipt {
            success: true,
            asset_ids: vec![],
        });
        let err = analyst.apply_upload(ticket, receipt, &mut fx.ctx()).unwrap_err();
        assert_eq!(err, InteractionError::UploadFailed(MSG_UPLOAD.to_string()));
        assert!(!analyst.is_running());
        assert_eq!(analyst.error(), Some(MSG_UPLOAD));
    }

    #[test]
    fn test_upload_success_attaches_assets() {
        let mut fx = Fixture::new();
        let mut analyst = AnalystInteraction::default();
        let ticket = analyst.begin_upload(1, &mut fx.ctx()).unwrap();
        let receipt = Ok(UploadReceipt {
            success: true,
            asset_ids: vec!["asset-1".into()],
        });
        let pending = analyst
            .apply_upload(ticket, receipt, &mut fx.ctx())
            .unwrap()
            .unwrap();
        assert_eq!(pending.ticket, ticket);
        assert_eq!(pending.request.assets, vec!["asset-1"]);
        assert_eq!(
            pending.request.message,
            "Mode: valentine. Analyze the uploaded chat screenshot for relationship insights."
        );
        assert!(analyst.is_running());
    }
}
