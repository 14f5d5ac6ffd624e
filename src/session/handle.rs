//! Shared session driver.
//!
//! The session lock is held only for `begin_*` and `apply`, never across the
//! agent call, so navigation and the other interactions stay usable while a
//! request is outstanding.

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use super::{AppSession, Applied, PendingRequest, Screen, ShareTarget};
use crate::agents::{AgentInvoker, AssetFile, AssetUploader, Clipboard};
use crate::error::{InteractionError, NavigationError};

#[derive(Clone)]
pub struct SessionHandle {
    session: Arc<Mutex<AppSession>>,
    invoker: Arc<dyn AgentInvoker>,
}

impl SessionHandle {
    pub fn new(session: AppSession, invoker: Arc<dyn AgentInvoker>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            invoker,
        }
    }

    /// Direct access for reads and synchronous operations.
    pub async fn lock(&self) -> MutexGuard<'_, AppSession> {
        self.session.lock().await
    }

    pub async fn navigate(&self, target: Screen) -> Result<Screen, NavigationError> {
        self.session.lock().await.navigate(target)
    }

    pub async fn set_replay(&self, on: bool) {
        self.session.lock().await.set_replay(on);
    }

    pub async fn reset(&self) {
        self.session.lock().await.reset();
    }

    pub async fn share(&self, target: ShareTarget, clipboard: &dyn Clipboard) -> bool {
        self.session.lock().await.share(target, clipboard)
    }

    async fn run(&self, pending: PendingRequest) -> Result<Applied, InteractionError> {
        let PendingRequest {
            step,
            ticket,
            request,
        } = pending;
        let outcome = self.invoker.invoke(request).await;
        self.session.lock().await.apply(step, ticket, outcome)
    }

    pub async fn analyze(&self, text: &str) -> Result<Applied, InteractionError> {
        let pending = self.session.lock().await.begin_analysis(text)?;
        self.run(pending).await
    }

    pub async fn upload_and_analyze(
        &self,
        uploader: &dyn AssetUploader,
        files: &[AssetFile],
    ) -> Result<Applied, InteractionError> {
        let ticket = self.session.lock().await.begin_upload(files.len())?;
        let receipt = uploader.upload(files).await;
        let pending = self.session.lock().await.apply_upload(ticket, receipt)?;
        match pending {
            Some(pending) => self.run(pending).await,
            None => Ok(Applied::Stale),
        }
    }

    pub async fn start_debate(&self, topic: &str) -> Result<Applied, InteractionError> {
        let pending = self.session.lock().await.begin_debate(topic)?;
        self.run(pending).await
    }

    pub async fn continue_debate(&self) -> Result<Applied, InteractionError> {
        let pending = self.session.lock().await.begin_debate_round()?;
        self.run(pending).await
    }

    pub async fn start_interview(&self) -> Result<Applied, InteractionError> {
        let pending = self.session.lock().await.begin_interview()?;
        self.run(pending).await
    }

    pub async fn answer(&self, text: &str) -> Result<Applied, InteractionError> {
        let pending = self.session.lock().await.begin_answer(text)?;
        self.run(pending).await
    }

    pub async fn generate_report(&self) -> Result<Applied, InteractionError> {
        let pending = self.session.lock().await.begin_report()?;
        match pending {
            Some(pending) => self.run(pending).await,
            None => Ok(Applied::Accepted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentKind;
    use crate::session::test_helpers::{GatedInvoker, MockInvoker};
    use serde_json::json;

    async fn until_active(handle: &SessionHandle, agent: AgentKind) {
        while handle.lock().await.active_agent() != Some(agent) {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_session_usable_while_request_outstanding() {
        let mock = MockInvoker::new();
        mock.reply(AgentKind::Analyst, json!({"overall_score": 55}));
        let invoker = Arc::new(GatedInvoker::new(mock));
        let handle = SessionHandle::new(AppSession::default(), invoker.clone());

        let worker = handle.clone();
        let task = tokio::spawn(async move { worker.analyze("A: hey").await });
        until_active(&handle, AgentKind::Analyst).await;

        assert_eq!(handle.navigate(Screen::Duelist).await, Ok(Screen::Duelist));
        assert_eq!(
            handle.analyze("again").await,
            Err(InteractionError::Busy(AgentKind::Analyst))
        );

        invoker.release();
        assert_eq!(task.await.unwrap(), Ok(Applied::Accepted));
        let session = handle.lock().await;
        assert!(session.progress().analyst);
        assert_eq!(session.active_agent(), None);
        assert_eq!(session.screen(), Screen::Duelist);
    }

    #[tokio::test]
    async fn test_reply_after_reset_is_stale() {
        let mock = MockInvoker::new();
        mock.reply(AgentKind::Debate, json!({"introduction": "Welcome"}));
        let invoker = Arc::new(GatedInvoker::new(mock));
        let handle = SessionHandle::new(AppSession::default(), invoker.clone());

        let worker = handle.clone();
        let task = tokio::spawn(async move { worker.start_debate("Texting first").await });
        until_active(&handle, AgentKind::Debate).await;

        handle.reset().await;
        invoker.release();
        assert_eq!(task.await.unwrap(), Ok(Applied::Stale));
        let session = handle.lock().await;
        assert!(session.debate().rounds().is_empty());
        assert!(!session.progress().duelist);
    }

    #[tokio::test]
    async fn test_replay_report_without_agent() {
        let handle = SessionHandle::new(AppSession::default(), Arc::new(MockInvoker::new()));
        handle.set_replay(true).await;
        assert_eq!(handle.generate_report().await, Ok(Applied::Accepted));
        assert_eq!(handle.lock().await.screen(), Screen::Report);
    }
}
