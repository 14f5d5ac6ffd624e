//! Session orchestration.
//!
//! [`AppSession`] owns everything one user session needs: the current screen,
//! the three progress flags, the activity log, replay mode and the four agent
//! interactions. Agent traffic is split in two phases so the session never has
//! to be held across an await:
//!
//! ```text
//! begin_*  (validate, take ticket, log, build request)
//!    │
//!    ▼
//! AgentInvoker::invoke  (no session borrow)
//!    │
//!    ▼
//! apply    (stale check, normalize, accept or record error)
//! ```
//!
//! The `async fn` wrappers on [`AppSession`] run both phases for callers that
//! own the session outright; [`SessionHandle`] does the same for a shared one.

pub mod activity;
pub mod analyst;
pub mod creator;
pub mod debate;
pub mod fixtures;
pub mod handle;
pub mod lenient;
pub mod models;
pub mod normalizer;
pub mod progress;
pub mod report;
pub mod request;
pub mod screen;

#[cfg(test)]
pub(crate) mod test_helpers;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::agents::{
    AgentDirectory, AgentEnvelope, AgentInvoker, AgentKind, AgentRequest, AssetFile,
    AssetUploader, Clipboard,
};
use crate::config::Config;
use crate::error::{AgentError, InteractionError, NavigationError};

pub use activity::{ActivityEntry, ActivityLog, DEFAULT_LOG_CAPACITY};
pub use analyst::AnalystInteraction;
pub use creator::{CreatorInteraction, CreatorReply, Turn, TurnRole};
pub use debate::{AcceptedRound, DebateInteraction};
pub use handle::SessionHandle;
pub use models::*;
pub use normalizer::normalize;
pub use progress::{ProgressTracker, SubTask};
pub use report::{ReportInteraction, ReportSummary};
pub use request::{RequestSlot, RequestTicket};
pub use screen::{FinaleGate, Screen, ScreenEvent, transition};

// ─── Mode ────────────────────────────────────────────────────

/// Presentation variant, echoed to every agent prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Valentine,
    AntiValentine,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valentine => "valentine",
            Self::AntiValentine => "anti-valentine",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "valentine" => Ok(Self::Valentine),
            "anti-valentine" | "anti_valentine" | "antivalentine" => Ok(Self::AntiValentine),
            other => Err(format!(
                "unknown mode '{}', expected 'valentine' or 'anti-valentine'",
                other
            )),
        }
    }
}

/// Every agent prompt starts with the mode.
pub(crate) fn prompt(mode: Mode, body: impl fmt::Display) -> String {
    format!("Mode: {mode}. {body}")
}

/// Score for log notes: whole numbers without a fraction, `N/A` when absent.
pub(crate) fn score_text(score: Option<f64>) -> String {
    match score {
        Some(s) if s.fract() == 0.0 => format!("{}", s as i64),
        Some(s) => format!("{s}"),
        None => "N/A".to_string(),
    }
}

// ─── Interaction Plumbing ────────────────────────────────────

/// What one agent invocation produced.
pub type AgentOutcome = Result<AgentEnvelope, AgentError>;

/// Normalized payload, or the reason the request failed.
pub(crate) fn payload_of(outcome: AgentOutcome) -> Result<Option<Value>, String> {
    match outcome {
        Ok(envelope) if envelope.is_success() => Ok(normalize(&envelope)),
        Ok(envelope) => Err(envelope
            .error
            .unwrap_or_else(|| "agent reported failure".to_string())),
        Err(e) => Err(e.to_string()),
    }
}

/// Session state an interaction may touch besides its own.
pub struct Context<'a> {
    pub mode: Mode,
    pub agents: &'a AgentDirectory,
    pub log: &'a mut ActivityLog,
    pub progress: &'a mut ProgressTracker,
}

/// Which interaction operation a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Analysis,
    DebateStart,
    /// Carries the round index that was requested.
    DebateContinue(u32),
    CreatorStart,
    CreatorReply,
    Report,
}

impl Step {
    pub fn agent(self) -> AgentKind {
        match self {
            Self::Analysis => AgentKind::Analyst,
            Self::DebateStart | Self::DebateContinue(_) => AgentKind::Debate,
            Self::CreatorStart | Self::CreatorReply => AgentKind::Creator,
            Self::Report => AgentKind::Orchestrator,
        }
    }
}

/// A request that has been admitted and awaits its reply.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub step: Step,
    pub ticket: RequestTicket,
    pub request: AgentRequest,
}

/// How a reply was taken in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Accepted,
    /// Superseded by a reset or replay toggle; nothing changed.
    Stale,
}

/// Coarse state of one interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    Idle,
    Running,
    Ready,
    Failed,
}

impl InteractionStatus {
    pub(crate) fn of(running: bool, failed: bool, has_result: bool) -> Self {
        if running {
            Self::Running
        } else if failed {
            Self::Failed
        } else if has_result {
            Self::Ready
        } else {
            Self::Idle
        }
    }
}

// ─── Views ───────────────────────────────────────────────────

/// Report screen content. Never shows a report the gate does not allow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportView<'a> {
    Locked { completed: usize },
    NotGenerated,
    Ready(&'a VibeReport),
}

/// What the active screen should render.
#[derive(Debug, Clone, Copy)]
pub enum ScreenView<'a> {
    Dashboard(ProgressTracker),
    Analyst(&'a AnalystInteraction),
    Duelist(&'a DebateInteraction),
    Creator(&'a CreatorInteraction),
    Report(ReportView<'a>),
}

/// Which result to copy to the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareTarget {
    Analysis,
    Debate,
    Creation,
    Report,
}

// ─── Session ─────────────────────────────────────────────────

/// Construction parameters for [`AppSession`].
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub mode: Mode,
    pub agents: AgentDirectory,
    pub log_capacity: usize,
    pub max_debate_rounds: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            agents: AgentDirectory::default(),
            log_capacity: DEFAULT_LOG_CAPACITY,
            max_debate_rounds: 3,
        }
    }
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            mode: config.session.mode,
            agents: config.agents.directory(),
            log_capacity: config.session.log_capacity,
            max_debate_rounds: config.session.max_debate_rounds,
        }
    }
}

#[derive(Debug)]
pub struct AppSession {
    mode: Mode,
    screen: Screen,
    progress: ProgressTracker,
    active_agent: Option<AgentKind>,
    log: ActivityLog,
    replay: bool,
    analyst: AnalystInteraction,
    debate: DebateInteraction,
    creator: CreatorInteraction,
    report: ReportInteraction,
    agents: AgentDirectory,
    max_debate_rounds: u32,
}

impl Default for AppSession {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

/// Split borrow of the session into one interaction plus its context.
macro_rules! with_ctx {
    ($session:expr, $field:ident, |$interaction:ident, $ctx:ident| $body:expr) => {{
        let AppSession {
            mode,
            agents,
            log,
            progress,
            $field: $interaction,
            ..
        } = $session;
        let mut $ctx = Context {
            mode: *mode,
            agents: &*agents,
            log,
            progress,
        };
        $body
    }};
}

impl AppSession {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            mode: settings.mode,
            screen: Screen::Dashboard,
            progress: ProgressTracker::default(),
            active_agent: None,
            log: ActivityLog::with_capacity(settings.log_capacity),
            replay: false,
            analyst: AnalystInteraction::default(),
            debate: DebateInteraction::default(),
            creator: CreatorInteraction::default(),
            report: ReportInteraction::default(),
            agents: settings.agents,
            max_debate_rounds: settings.max_debate_rounds.max(1),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn progress(&self) -> ProgressTracker {
        self.progress
    }

    /// Agent whose request is currently shown as in flight.
    pub fn active_agent(&self) -> Option<AgentKind> {
        self.active_agent
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn is_replay(&self) -> bool {
        self.replay
    }

    pub fn analyst(&self) -> &AnalystInteraction {
        &self.analyst
    }

    pub fn debate(&self) -> &DebateInteraction {
        &self.debate
    }

    pub fn creator(&self) -> &CreatorInteraction {
        &self.creator
    }

    pub fn report(&self) -> &ReportInteraction {
        &self.report
    }

    pub fn max_debate_rounds(&self) -> u32 {
        self.max_debate_rounds
    }

    /// Whether the debate screen should offer another round.
    pub fn can_continue_debate(&self) -> bool {
        self.debate.can_continue(self.max_debate_rounds)
    }

    pub fn gate(&self) -> FinaleGate {
        FinaleGate {
            completed: self.progress.completed_count(),
            replay: self.replay,
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            info!("Mode switched to {}", mode);
            self.mode = mode;
        }
    }

    // ─── Navigation ──────────────────────────────────────────

    pub fn navigate(&mut self, target: Screen) -> Result<Screen, NavigationError> {
        self.apply_event(ScreenEvent::Navigate(target))
    }

    pub fn back(&mut self) -> Screen {
        // Back never targets the report screen, so it cannot be refused.
        self.apply_event(ScreenEvent::Back).unwrap_or(self.screen)
    }

    fn apply_event(&mut self, event: ScreenEvent) -> Result<Screen, NavigationError> {
        match transition(self.screen, event, self.gate()) {
            Ok(next) => {
                self.screen = next;
                Ok(next)
            }
            Err(e) => {
                debug!("Navigation refused: {}", e);
                Err(e)
            }
        }
    }

    pub fn view(&self) -> ScreenView<'_> {
        match self.screen {
            Screen::Dashboard => ScreenView::Dashboard(self.progress),
            Screen::Analyst => ScreenView::Analyst(&self.analyst),
            Screen::Duelist => ScreenView::Duelist(&self.debate),
            Screen::Creator => ScreenView::Creator(&self.creator),
            Screen::Report => {
                let gate = self.gate();
                ScreenView::Report(if !gate.is_open() {
                    ReportView::Locked {
                        completed: gate.completed,
                    }
                } else {
                    match self.report.report() {
                        Some(report) => ReportView::Ready(report),
                        None => ReportView::NotGenerated,
                    }
                })
            }
        }
    }

    // ─── Replay & Reset ──────────────────────────────────────

    /// Switch replay mode. Idempotent; a repeated value changes nothing.
    pub fn set_replay(&mut self, on: bool) {
        if self.replay == on {
            return;
        }
        self.replay = on;
        if on {
            info!("Replay mode on");
            self.analyst.load_reference(fixtures::analyst());
            self.debate.load_reference(fixtures::debate_round());
            self.creator.load_reference(fixtures::creator());
            self.report.load_reference(fixtures::report());
            self.progress.complete_all();
            self.active_agent = None;
            self.log.clear();
            self.log.extend(fixtures::REPLAY_NARRATION);
        } else {
            info!("Replay mode off");
            self.clear_results();
            if self.screen == Screen::Report {
                self.screen = Screen::Dashboard;
            }
        }
    }

    /// Return to a fresh session, keeping mode and settings.
    pub fn reset(&mut self) {
        info!("Session reset");
        self.replay = false;
        self.clear_results();
        self.screen = Screen::Dashboard;
    }

    fn clear_results(&mut self) {
        self.analyst.clear();
        self.debate.clear();
        self.creator.reset();
        self.report.clear();
        self.progress.reset();
        self.active_agent = None;
        self.log.clear();
    }

    // ─── Share ───────────────────────────────────────────────

    pub fn share_text(&self, target: ShareTarget) -> Option<&str> {
        match target {
            ShareTarget::Analysis => self.analyst.result()?.receipts.as_deref(),
            ShareTarget::Debate => self.debate.latest()?.round.shareable_receipt.as_deref(),
            ShareTarget::Creation => self.creator.result()?.shareable_quote.as_deref(),
            ShareTarget::Report => self.report.report()?.viral_caption.as_deref(),
        }
        .filter(|text| !text.is_empty())
    }

    /// Copy a result's shareable text. Best-effort.
    pub fn share(&self, target: ShareTarget, clipboard: &dyn Clipboard) -> bool {
        let Some(text) = self.share_text(target) else {
            debug!("Nothing to share for {:?}", target);
            return false;
        };
        let copied = clipboard.copy(text);
        if copied {
            info!("Copied {:?} share text ({} chars)", target, text.chars().count());
        } else {
            tracing::warn!("Clipboard copy failed for {:?}", target);
        }
        copied
    }

    // ─── Begin ───────────────────────────────────────────────

    fn admitted(
        &mut self,
        pending: Result<PendingRequest, InteractionError>,
    ) -> Result<PendingRequest, InteractionError> {
        let pending = pending?;
        self.active_agent = Some(pending.step.agent());
        Ok(pending)
    }

    pub fn begin_analysis(&mut self, text: &str) -> Result<PendingRequest, InteractionError> {
        let pending = with_ctx!(self, analyst, |analyst, ctx| analyst
            .begin_submit(text, &mut ctx));
        self.admitted(pending)
    }

    pub fn begin_upload(&mut self, file_count: usize) -> Result<RequestTicket, InteractionError> {
        with_ctx!(self, analyst, |analyst, ctx| analyst
            .begin_upload(file_count, &mut ctx))
    }

    /// `Ok(None)`: the upload was superseded and nothing is left to do.
    pub fn apply_upload(
        &mut self,
        ticket: RequestTicket,
        receipt: Result<crate::agents::UploadReceipt, AgentError>,
    ) -> Result<Option<PendingRequest>, InteractionError> {
        let pending = with_ctx!(self, analyst, |analyst, ctx| analyst
            .apply_upload(ticket, receipt, &mut ctx))?;
        match pending {
            Some(pending) => self.admitted(Ok(pending)).map(Some),
            None => Ok(None),
        }
    }

    pub fn begin_debate(&mut self, topic: &str) -> Result<PendingRequest, InteractionError> {
        let pending = with_ctx!(self, debate, |debate, ctx| debate
            .begin_start(topic, &mut ctx));
        self.admitted(pending)
    }

    pub fn begin_debate_round(&mut self) -> Result<PendingRequest, InteractionError> {
        let pending = with_ctx!(self, debate, |debate, ctx| debate.begin_continue(&mut ctx));
        self.admitted(pending)
    }

    pub fn begin_interview(&mut self) -> Result<PendingRequest, InteractionError> {
        let pending = with_ctx!(self, creator, |creator, ctx| creator.begin_start(&mut ctx));
        self.admitted(pending)
    }

    pub fn begin_answer(&mut self, text: &str) -> Result<PendingRequest, InteractionError> {
        let pending = with_ctx!(self, creator, |creator, ctx| creator
            .begin_send(text, &mut ctx));
        self.admitted(pending)
    }

    /// `Ok(None)` in replay mode: the reference report is already shown.
    pub fn begin_report(&mut self) -> Result<Option<PendingRequest>, InteractionError> {
        let gate = self.gate();
        let summary = ReportSummary::collect(
            self.mode,
            self.analyst.result(),
            self.debate.rounds(),
            self.creator.result(),
        );
        let pending = with_ctx!(self, report, |report, ctx| report
            .begin(gate, &summary, &mut ctx))?;
        match pending {
            Some(pending) => self.admitted(Ok(pending)).map(Some),
            None => {
                self.report_ready();
                Ok(None)
            }
        }
    }

    // ─── Apply ───────────────────────────────────────────────

    /// Take in the outcome of a request admitted by one of the `begin_*` calls.
    pub fn apply(
        &mut self,
        step: Step,
        ticket: RequestTicket,
        outcome: AgentOutcome,
    ) -> Result<Applied, InteractionError> {
        let applied = match step {
            Step::Analysis => {
                with_ctx!(self, analyst, |analyst, ctx| analyst
                    .apply(ticket, outcome, &mut ctx))
            }
            Step::DebateStart => {
                with_ctx!(self, debate, |debate, ctx| debate
                    .apply_start(ticket, outcome, &mut ctx))
            }
            Step::DebateContinue(index) => {
                with_ctx!(self, debate, |debate, ctx| debate
                    .apply_continue(ticket, index, outcome, &mut ctx))
            }
            Step::CreatorStart => {
                with_ctx!(self, creator, |creator, ctx| creator
                    .apply_start(ticket, outcome, &mut ctx))
            }
            Step::CreatorReply => {
                with_ctx!(self, creator, |creator, ctx| creator
                    .apply_send(ticket, outcome, &mut ctx))
            }
            Step::Report => {
                with_ctx!(self, report, |report, ctx| report
                    .apply(ticket, outcome, &mut ctx))
            }
        };

        if applied != Ok(Applied::Stale) && self.active_agent == Some(step.agent()) {
            self.active_agent = None;
        }
        if step == Step::Report && applied == Ok(Applied::Accepted) {
            self.report_ready();
        }
        applied
    }

    fn report_ready(&mut self) {
        if let Err(e) = self.apply_event(ScreenEvent::ReportReady) {
            debug!("Report accepted but screen not switched: {}", e);
        }
    }

    // ─── Async Drivers ───────────────────────────────────────

    async fn run(
        &mut self,
        invoker: &dyn AgentInvoker,
        pending: PendingRequest,
    ) -> Result<Applied, InteractionError> {
        let PendingRequest {
            step,
            ticket,
            request,
        } = pending;
        let outcome = invoker.invoke(request).await;
        self.apply(step, ticket, outcome)
    }

    pub async fn analyze(
        &mut self,
        invoker: &dyn AgentInvoker,
        text: &str,
    ) -> Result<Applied, InteractionError> {
        let pending = self.begin_analysis(text)?;
        self.run(invoker, pending).await
    }

    pub async fn upload_and_analyze(
        &mut self,
        invoker: &dyn AgentInvoker,
        uploader: &dyn AssetUploader,
        files: &[AssetFile],
    ) -> Result<Applied, InteractionError> {
        let ticket = self.begin_upload(files.len())?;
        let receipt = uploader.upload(files).await;
        match self.apply_upload(ticket, receipt)? {
            Some(pending) => self.run(invoker, pending).await,
            None => Ok(Applied::Stale),
        }
    }

    pub async fn start_debate(
        &mut self,
        invoker: &dyn AgentInvoker,
        topic: &str,
    ) -> Result<Applied, InteractionError> {
        let pending = self.begin_debate(topic)?;
        self.run(invoker, pending).await
    }

    pub async fn continue_debate(
        &mut self,
        invoker: &dyn AgentInvoker,
    ) -> Result<Applied, InteractionError> {
        let pending = self.begin_debate_round()?;
        self.run(invoker, pending).await
    }

    pub async fn start_interview(
        &mut self,
        invoker: &dyn AgentInvoker,
    ) -> Result<Applied, InteractionError> {
        let pending = self.begin_interview()?;
        self.run(invoker, pending).await
    }

    pub async fn answer(
        &mut self,
        invoker: &dyn AgentInvoker,
        text: &str,
    ) -> Result<Applied, InteractionError> {
        let pending = self.begin_answer(text)?;
        self.run(invoker, pending).await
    }

    pub async fn generate_report(
        &mut self,
        invoker: &dyn AgentInvoker,
    ) -> Result<Applied, InteractionError> {
        match self.begin_report()? {
            Some(pending) => self.run(invoker, pending).await,
            None => Ok(Applied::Accepted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_helpers::{MockInvoker, MockUploader, RecordingClipboard};
    use serde_json::json;

    fn analysis_reply(score: u32) -> Value {
        json!({
            "overall_score": score,
            "score_label": "Warm",
            "verdict": "Promising",
            "findings": [{"type": "green_flag", "title": "Effort"}]
        })
    }

    fn debate_reply(round: u32) -> Value {
        json!({
            "topic": "Texting first",
            "round": round,
            "debater_a": {"name": "Romantic"},
            "debater_b": {"name": "Realist"},
            "round_summary": "Sparks flew",
            "shareable_receipt": format!("Round {round} receipt")
        })
    }

    fn creation_reply() -> Value {
        json!({
            "phase": "generation",
            "title": "Ode to Sam",
            "content_type": "poem",
            "content": "Roses...",
            "shareable_quote": "You are my favourite notification."
        })
    }

    async fn complete_all(session: &mut AppSession, invoker: &MockInvoker) {
        invoker.reply(AgentKind::Analyst, analysis_reply(88));
        invoker.reply(AgentKind::Debate, debate_reply(1));
        invoker.reply(AgentKind::Creator, json!({"question": "Who is it for?"}));
        invoker.reply(AgentKind::Creator, creation_reply());

        session.analyze(invoker, "A: hi\nB: hey").await.unwrap();
        session.start_debate(invoker, "Texting first").await.unwrap();
        session.start_interview(invoker).await.unwrap();
        session.answer(invoker, "Sam").await.unwrap();
    }

    #[test]
    fn test_mode_parsing_and_display() {
        assert_eq!("Anti-Valentine".parse::<Mode>(), Ok(Mode::AntiValentine));
        assert_eq!("valentine".parse::<Mode>(), Ok(Mode::Valentine));
        assert!("romcom".parse::<Mode>().is_err());
        assert_eq!(Mode::AntiValentine.to_string(), "anti-valentine");
        assert_eq!(prompt(Mode::Valentine, "Hello"), "Mode: valentine. Hello");
    }

    #[test]
    fn test_score_text() {
        assert_eq!(score_text(Some(90.0)), "90");
        assert_eq!(score_text(Some(87.5)), "87.5");
        assert_eq!(score_text(None), "N/A");
    }

    // Scenario 1: empty submission
    #[tokio::test]
    async fn test_empty_analysis_changes_nothing() {
        let invoker = MockInvoker::new();
        let mut session = AppSession::default();

        let err = session.analyze(&invoker, "  \n ").await.unwrap_err();
        assert!(matches!(err, InteractionError::InputRejected(_)));
        assert!(invoker.requests().is_empty());
        assert!(session.log().is_empty());
        assert_eq!(session.active_agent(), None);
        assert_eq!(session.analyst().status(), InteractionStatus::Idle);
        assert_eq!(session.analyst().error(), None);
    }

    // Scenario 2: structured analysis serialized inside the message text
    #[tokio::test]
    async fn test_analysis_from_json_message_text() {
        let invoker = MockInvoker::new();
        let mut session = AppSession::default();
        invoker.push(
            AgentKind::Analyst,
            Ok(AgentEnvelope::message(
                r#"{"overall_score":90,"score_label":"Strong Connection","findings":[{"type":"green_flag","title":"Effort"}]}"#,
            )),
        );

        let applied = session.analyze(&invoker, "A: hi\nB: hey").await;
        assert_eq!(applied, Ok(Applied::Accepted));
        let result = session.analyst().result().unwrap();
        assert_eq!(result.overall_score, Some(90.0));
        assert_eq!(result.findings.len(), 1);
        assert!(session.progress().analyst);
        assert_eq!(session.analyst().error(), None);
    }

    #[tokio::test]
    async fn test_analyst_happy_path() {
        let invoker = MockInvoker::new();
        let mut session = AppSession::default();
        session.navigate(Screen::Analyst).unwrap();
        invoker.reply(AgentKind::Analyst, analysis_reply(90));

        let applied = session.analyze(&invoker, "A: hi\nB: hey").await;
        assert_eq!(applied, Ok(Applied::Accepted));
        assert!(session.progress().analyst);
        assert_eq!(session.progress().completed_count(), 1);
        assert_eq!(session.active_agent(), None);
        assert_eq!(
            session.log().texts(),
            vec![
                "Analyst Agent: Scanning conversation for vibes...",
                "Analyst Agent: Analysis complete! Score: 90/100"
            ]
        );
        let requests = invoker.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].agent_id, AgentDirectory::default().analyst);
    }

    // Scenario 3: prose reply
    #[tokio::test]
    async fn test_unstructured_analyst_reply() {
        let invoker = MockInvoker::new();
        let mut session = AppSession::default();
        invoker.push(
            AgentKind::Analyst,
            Ok(AgentEnvelope::message("They seem to like each other a lot!")),
        );

        let err = session.analyze(&invoker, "chat").await.unwrap_err();
        assert_eq!(err.to_string(), analyst::MSG_UNSTRUCTURED);
        assert_eq!(session.analyst().error(), Some(analyst::MSG_UNSTRUCTURED));
        assert!(!session.progress().analyst);
        assert!(!session.analyst().is_running());
    }

    // debate ordering
    #[tokio::test]
    async fn test_debate_accumulates_rounds() {
        let invoker = MockInvoker::new();
        let mut session = AppSession::default();
        invoker.reply(AgentKind::Debate, debate_reply(1));
        invoker.reply(AgentKind::Debate, debate_reply(2));
        invoker.reply(AgentKind::Debate, debate_reply(3));

        session.start_debate(&invoker, "Texting first").await.unwrap();
        assert!(session.progress().duelist);
        assert!(session.can_continue_debate());
        session.continue_debate(&invoker).await.unwrap();
        session.continue_debate(&invoker).await.unwrap();

        let indices: Vec<u32> = session.debate().rounds().iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert!(!session.can_continue_debate());
        assert!(
            invoker.requests()[2]
                .message
                .contains("Continue the debate to round 3.")
        );
    }

    // Scenario 4: continuing a debate that was never started
    #[tokio::test]
    async fn test_continue_without_start_begins_at_round_one() {
        let invoker = MockInvoker::new();
        let mut session = AppSession::default();
        invoker.reply(AgentKind::Debate, json!({"round_summary": "First"}));

        assert_eq!(session.continue_debate(&invoker).await, Ok(Applied::Accepted));
        let indices: Vec<u32> = session.debate().rounds().iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1]);
        assert!(
            invoker.requests()[0]
                .message
                .contains("Continue the debate to round 1.")
        );

        invoker.reply(AgentKind::Debate, json!({"round_summary": "Second"}));
        invoker.reply(AgentKind::Debate, json!({"round_summary": "Third"}));
        session.continue_debate(&invoker).await.unwrap();
        session.continue_debate(&invoker).await.unwrap();
        let indices: Vec<u32> = session.debate().rounds().iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert!(!session.progress().duelist);
    }

    // finale gate exactness
    #[tokio::test]
    async fn test_finale_gated_on_three_completions() {
        let invoker = MockInvoker::new();
        let mut session = AppSession::default();
        invoker.reply(AgentKind::Analyst, analysis_reply(70));
        invoker.reply(AgentKind::Debate, debate_reply(1));
        session.analyze(&invoker, "chat").await.unwrap();
        session.start_debate(&invoker, "topic").await.unwrap();

        assert_eq!(
            session.navigate(Screen::Report),
            Err(NavigationError::Locked {
                target: Screen::Report,
                completed: 2
            })
        );
        assert_eq!(
            session.generate_report(&invoker).await,
            Err(InteractionError::FinaleLocked { completed: 2 })
        );
        assert_eq!(invoker.requests().len(), 2);

        invoker.reply(AgentKind::Creator, creation_reply());
        session.start_interview(&invoker).await.unwrap();
        assert!(session.progress().finale_unlocked());

        invoker.reply(
            AgentKind::Orchestrator,
            json!({"vibe_report": {"vibe_score": 81}, "terminal_thoughts": ["Mixing"]}),
        );
        assert_eq!(session.generate_report(&invoker).await, Ok(Applied::Accepted));
        assert_eq!(session.screen(), Screen::Report);
        assert!(matches!(
            session.view(),
            ScreenView::Report(ReportView::Ready(r)) if r.vibe_score == Some(81.0)
        ));
        let summary = &invoker.requests()[3].message;
        assert!(summary.contains("\"topic\":\"Texting first\""));
        assert!(summary.contains("\"type\":\"poem\""));
    }

    // Scenario 5: replay toggle
    #[test]
    fn test_replay_toggle_round_trip() {
        let mut session = AppSession::default();
        session.set_replay(true);
        assert!(session.progress().finale_unlocked());
        assert_eq!(session.log().texts(), fixtures::REPLAY_NARRATION.to_vec());
        assert_eq!(session.navigate(Screen::Report), Ok(Screen::Report));
        assert!(matches!(session.view(), ScreenView::Report(ReportView::Ready(_))));

        session.set_replay(true);
        assert_eq!(session.log().len(), fixtures::REPLAY_NARRATION.len());

        session.set_replay(false);
        assert_eq!(session.screen(), Screen::Dashboard);
        assert_eq!(session.progress().completed_count(), 0);
        assert!(session.log().is_empty());
        assert!(session.analyst().result().is_none());
        assert!(session.debate().rounds().is_empty());
        assert!(session.creator().result().is_none());
        assert!(session.report().report().is_none());
    }

    #[tokio::test]
    async fn test_replay_report_short_circuits() {
        let invoker = MockInvoker::new();
        let mut session = AppSession::default();
        session.set_replay(true);
        assert_eq!(session.generate_report(&invoker).await, Ok(Applied::Accepted));
        assert_eq!(session.screen(), Screen::Report);
        assert!(invoker.requests().is_empty());
    }

    #[tokio::test]
    async fn test_replay_matches_live_completion() {
        let invoker = MockInvoker::new();
        let mut live = AppSession::default();
        complete_all(&mut live, &invoker).await;
        invoker.reply(AgentKind::Orchestrator, json!({"vibe_score": 70}));
        live.generate_report(&invoker).await.unwrap();

        let mut replay = AppSession::default();
        replay.set_replay(true);

        for session in [&live, &replay] {
            assert!(session.progress().finale_unlocked());
            assert!(session.analyst().result().is_some());
            assert_eq!(session.debate().rounds().len(), 1);
            assert!(session.creator().result().is_some());
            assert!(session.report().report().is_some());
        }
        assert_eq!(replay.navigate(Screen::Report), Ok(Screen::Report));
        assert_eq!(live.navigate(Screen::Report), Ok(Screen::Report));
        for target in [ShareTarget::Debate, ShareTarget::Creation] {
            assert!(live.share_text(target).is_some());
            assert!(replay.share_text(target).is_some());
        }
    }

    #[tokio::test]
    async fn test_stale_reply_after_replay_toggle_is_discarded() {
        let mut session = AppSession::default();
        let pending = session.begin_analysis("chat").unwrap();
        assert_eq!(session.active_agent(), Some(AgentKind::Analyst));

        session.set_replay(true);
        session.set_replay(false);
        assert_eq!(session.active_agent(), None);

        let applied = session.apply(
            pending.step,
            pending.ticket,
            Ok(AgentEnvelope::wrap(analysis_reply(10))),
        );
        assert_eq!(applied, Ok(Applied::Stale));
        assert!(session.analyst().result().is_none());
        assert!(!session.progress().analyst);
    }

    #[tokio::test]
    async fn test_active_agent_tracks_latest_request() {
        let mut session = AppSession::default();
        let analysis = session.begin_analysis("chat").unwrap();
        let debate = session.begin_debate("topic").unwrap();
        assert_eq!(session.active_agent(), Some(AgentKind::Debate));

        session
            .apply(
                analysis.step,
                analysis.ticket,
                Ok(AgentEnvelope::wrap(analysis_reply(50))),
            )
            .unwrap();
        assert_eq!(session.active_agent(), Some(AgentKind::Debate));

        let _ = session.apply(debate.step, debate.ticket, Err(AgentError::http("down")));
        assert_eq!(session.active_agent(), None);
    }

    #[tokio::test]
    async fn test_upload_and_analyze() {
        let invoker = MockInvoker::new();
        let mut session = AppSession::default();
        let files = vec![AssetFile::new("chat.png", vec![1, 2, 3])];

        let uploader = MockUploader::failing();
        let err = session
            .upload_and_analyze(&invoker, &uploader, &files)
            .await
            .unwrap_err();
        assert_eq!(err, InteractionError::UploadFailed(analyst::MSG_UPLOAD.into()));
        assert!(invoker.requests().is_empty());

        let uploader = MockUploader::with_assets(&["asset-9"]);
        invoker.reply(AgentKind::Analyst, analysis_reply(77));
        let applied = session.upload_and_analyze(&invoker, &uploader, &files).await;
        assert_eq!(applied, Ok(Applied::Accepted));
        assert_eq!(invoker.requests()[0].assets, vec!["asset-9"]);
        assert_eq!(uploader.calls(), 1);
    }

    #[tokio::test]
    async fn test_share_copies_available_text() {
        let invoker = MockInvoker::new();
        let mut session = AppSession::default();
        let clipboard = RecordingClipboard::default();
        assert!(!session.share(ShareTarget::Creation, &clipboard));

        complete_all(&mut session, &invoker).await;
        assert!(session.share(ShareTarget::Creation, &clipboard));
        assert!(session.share(ShareTarget::Debate, &clipboard));
        assert_eq!(
            clipboard.copied(),
            vec!["You are my favourite notification.", "Round 1 receipt"]
        );
        assert!(!session.share(ShareTarget::Analysis, &clipboard));
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let invoker = MockInvoker::new();
        let mut session = AppSession::default();
        complete_all(&mut session, &invoker).await;
        session.set_mode(Mode::AntiValentine);
        session.navigate(Screen::Creator).unwrap();

        session.reset();
        assert_eq!(session.screen(), Screen::Dashboard);
        assert_eq!(session.mode(), Mode::AntiValentine);
        assert_eq!(session.progress().completed_count(), 0);
        assert!(!session.creator().is_started());
        assert!(session.creator().transcript().is_empty());
        assert!(session.log().is_empty());
        assert!(!session.is_replay());
    }

    #[test]
    fn test_report_view_locked_and_not_generated() {
        let mut session = AppSession::default();
        assert!(matches!(session.view(), ScreenView::Dashboard(_)));
        assert!(session.navigate(Screen::Report).is_err());

        session.progress.complete_all();
        session.navigate(Screen::Report).unwrap();
        assert!(matches!(
            session.view(),
            ScreenView::Report(ReportView::NotGenerated)
        ));

        session.progress.reset();
        assert!(matches!(
            session.view(),
            ScreenView::Report(ReportView::Locked { completed: 0 })
        ));
        assert_eq!(session.back(), Screen::Dashboard);
    }
}
