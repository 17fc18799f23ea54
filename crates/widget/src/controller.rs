//! Widget controller state machine
//!
//! The controller is the single mutator of a [`Session`]. A submit appends
//! the visitor's entry immediately and hands back a [`PendingRequest`]; the
//! caller runs it against an [`InferenceClient`] and feeds the resulting
//! [`Completion`] back through [`WidgetController::apply`].

use std::sync::Arc;

use mealchat_core::WidgetConfig;
use mealchat_core::logging::{PrivacyConfig, redact_message};
use mealchat_providers::{InferenceClient, InferenceRequest, InferenceResult};

use crate::session::{Session, SessionId};
use crate::transcript::TranscriptEntry;

/// Observable controller state, derived from the busy latch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Idle,
    AwaitingResponse,
}

/// Why a submit did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejection {
    #[error("message is empty")]
    Blank,
    #[error("a reply is still pending")]
    Busy,
    #[error("widget is not mounted")]
    Unmounted,
}

/// What [`WidgetController::apply`] did with a completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Bot reply appended
    Replied,
    /// Inference failed and the fallback message was appended
    FellBack,
    /// Completion belonged to a session that no longer exists
    Discarded,
}

/// An accepted submission waiting for the client call
#[derive(Debug, Clone)]
pub struct PendingRequest {
    session_id: SessionId,
    request_id: u64,
    prompt: String,
}

impl PendingRequest {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Run the single client call for this request
    pub async fn dispatch(self, client: &dyn InferenceClient) -> Completion {
        let outcome = client.generate(InferenceRequest::new(self.prompt)).await;
        Completion { session_id: self.session_id, request_id: self.request_id, outcome }
    }
}

/// Result of a dispatched request, tagged with the session that issued it
#[derive(Debug, Clone)]
pub struct Completion {
    session_id: SessionId,
    request_id: u64,
    outcome: InferenceResult,
}

impl Completion {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn outcome(&self) -> &InferenceResult {
        &self.outcome
    }
}

pub struct WidgetController {
    client: Arc<dyn InferenceClient>,
    settings: WidgetConfig,
    privacy: PrivacyConfig,
    session: Option<Session>,
    next_request_id: u64,
    in_flight: Option<u64>,
}

impl WidgetController {
    /// Mounted controller with a fresh, closed session
    pub fn new(client: Arc<dyn InferenceClient>, settings: WidgetConfig) -> Self {
        let mut controller = Self {
            client,
            settings,
            privacy: PrivacyConfig::default(),
            session: None,
            next_request_id: 0,
            in_flight: None,
        };
        controller.mount();
        controller
    }

    pub fn with_privacy(mut self, privacy: PrivacyConfig) -> Self {
        self.privacy = privacy;
        self
    }

    pub fn client(&self) -> Arc<dyn InferenceClient> {
        Arc::clone(&self.client)
    }

    pub fn settings(&self) -> &WidgetConfig {
        &self.settings
    }

    /// Create the session if none exists. Mounting twice keeps the live session.
    pub fn mount(&mut self) {
        if self.session.is_none() {
            let session = Session::with_transcript_limit(self.settings.transcript_limit());
            tracing::debug!(session = %session.id(), "widget mounted");
            self.session = Some(session);
        }
    }

    /// Dispose of the session. Replies still in flight will be discarded.
    pub fn unmount(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!(session = %session.id(), pending = self.in_flight.is_some(), "widget unmounted");
        }
        self.in_flight = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn state(&self) -> WidgetState {
        match &self.session {
            Some(session) if session.is_busy() => WidgetState::AwaitingResponse,
            _ => WidgetState::Idle,
        }
    }

    pub fn open(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.open();
        }
    }

    pub fn close(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.close();
        }
    }

    /// Flip the panel; `None` when unmounted
    pub fn toggle(&mut self) -> Option<bool> {
        self.session.as_mut().map(Session::toggle)
    }

    /// Edit the input field. Allowed while a reply is pending.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if let Some(session) = self.session.as_mut() {
            session.set_draft(text);
        }
    }

    /// Submit the current draft
    ///
    /// On acceptance the visitor's entry is already in the transcript, the
    /// draft is cleared and the busy latch is set. Rejections change nothing.
    pub fn submit(&mut self) -> Result<PendingRequest, SubmitRejection> {
        let session = self.session.as_mut().ok_or(SubmitRejection::Unmounted)?;

        if session.draft().trim().is_empty() {
            return Err(SubmitRejection::Blank);
        }
        if session.is_busy() {
            tracing::debug!(session = %session.id(), "submit ignored while awaiting reply");
            return Err(SubmitRejection::Busy);
        }

        let prompt = session.take_draft();
        session.append_entry(TranscriptEntry::user(prompt.clone()));
        session.set_busy(true);

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.in_flight = Some(request_id);

        tracing::info!(
            session = %session.id(),
            request = request_id,
            text = %redact_message(&prompt, &self.privacy),
            "message submitted"
        );

        Ok(PendingRequest { session_id: session.id(), request_id, prompt })
    }

    /// Fold a completion into the session and return to idle
    pub fn apply(&mut self, completion: Completion) -> ApplyOutcome {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!(session = %completion.session_id, "reply for unmounted widget discarded");
            return ApplyOutcome::Discarded;
        };
        if session.id() != completion.session_id || self.in_flight != Some(completion.request_id) {
            tracing::debug!(session = %completion.session_id, "stale reply discarded");
            return ApplyOutcome::Discarded;
        }

        let outcome = match completion.outcome {
            Ok(reply) => {
                let text = if reply.trim().is_empty() {
                    self.settings.not_understood_message.clone()
                } else {
                    reply
                };
                tracing::info!(
                    session = %session.id(),
                    request = completion.request_id,
                    text = %redact_message(&text, &self.privacy),
                    "reply received"
                );
                session.append_entry(TranscriptEntry::bot(text));
                ApplyOutcome::Replied
            }
            Err(err) => {
                tracing::warn!(
                    session = %session.id(),
                    request = completion.request_id,
                    error = %err,
                    "inference failed; showing fallback reply"
                );
                session.append_entry(TranscriptEntry::bot(self.settings.fallback_message.clone()));
                ApplyOutcome::FellBack
            }
        };

        session.set_busy(false);
        self.in_flight = None;
        outcome
    }

    /// Submit, wait for the client, and apply the reply in one step
    pub async fn submit_and_wait(&mut self) -> Result<ApplyOutcome, SubmitRejection> {
        let pending = self.submit()?;
        let client = self.client();
        let completion = pending.dispatch(client.as_ref()).await;
        Ok(self.apply(completion))
    }
}
