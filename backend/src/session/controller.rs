//! Session controller
//!
//! Holds the session-local turn list and the active image, and admits at
//! most one submission at a time. A submission appends its user turn when
//! it begins and exactly one response turn when it completes.

use crate::error::AppError;
use crate::orchestrator::{ImagePayload, Intent, IntentOutcome, Orchestrator};
use crate::session::models::{ConversationTurn, Submission};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// In-memory conversation state
#[derive(Debug, Default)]
pub struct Session {
    turns: Vec<ConversationTurn>,
    active_image: Option<ImagePayload>,
}

impl Session {
    /// Turns in insertion order
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Image used by follow-up edits and analyses
    pub fn active_image(&self) -> Option<&ImagePayload> {
        self.active_image.as_ref()
    }

    fn push(&mut self, turn: ConversationTurn) {
        if let Some(image) = &turn.image {
            self.active_image = Some(image.clone());
        }
        self.turns.push(turn);
    }

    fn clear(&mut self) {
        self.turns.clear();
        self.active_image = None;
    }
}

/// Shared session plus the single-submission gate
#[derive(Debug, Default, Clone)]
pub struct SessionController {
    session: Arc<RwLock<Session>>,
    gate: Arc<Mutex<()>>,
}

impl SessionController {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the turns in insertion order
    pub async fn turns(&self) -> Vec<ConversationTurn> {
        self.session.read().await.turns().to_vec()
    }

    /// Current active image
    pub async fn active_image(&self) -> Option<ImagePayload> {
        self.session.read().await.active_image().cloned()
    }

    /// Whether a submission is currently outstanding
    pub fn is_busy(&self) -> bool {
        self.gate.try_lock().is_err()
    }

    /// Drop all turns and the active image
    ///
    /// # Errors
    /// * `AppError::SubmissionInFlight` while a submission is outstanding
    pub async fn clear(&self) -> Result<(), AppError> {
        let _guard = self
            .gate
            .try_lock()
            .map_err(|_| AppError::SubmissionInFlight)?;
        self.session.write().await.clear();
        Ok(())
    }

    /// Start a submission
    ///
    /// Resolves the intent, appends the user turn and returns it together
    /// with the pending submission that must be completed.
    ///
    /// # Errors
    /// * `AppError::SubmissionInFlight` if another submission is outstanding
    /// * `AppError::InvalidRequest` / `AppError::PayloadTooLarge` if the
    ///   submission cannot be turned into an intent (nothing is appended)
    pub async fn begin(
        &self,
        submission: Submission,
    ) -> Result<(ConversationTurn, PendingSubmission), AppError> {
        let guard = self
            .gate
            .clone()
            .try_lock_owned()
            .map_err(|_| AppError::SubmissionInFlight)?;

        let mut session = self.session.write().await;
        let intent = submission.resolve(session.active_image())?;
        let user_turn = ConversationTurn::user(submission.text, submission.image);
        session.push(user_turn.clone());
        drop(session);

        tracing::info!(
            turn_id = %user_turn.id,
            intent = intent.kind().as_str(),
            "Submission started"
        );

        Ok((
            user_turn,
            PendingSubmission {
                session: self.session.clone(),
                intent,
                _guard: guard,
            },
        ))
    }
}

/// A submission whose user turn is recorded but whose response is not
///
/// Holds the submission gate until it completes.
#[derive(Debug)]
pub struct PendingSubmission {
    session: Arc<RwLock<Session>>,
    intent: Intent,
    _guard: OwnedMutexGuard<()>,
}

impl PendingSubmission {
    /// Run the intent and append exactly one response turn
    pub async fn complete(
        self,
        orchestrator: &Orchestrator,
        cancel: &CancellationToken,
    ) -> ConversationTurn {
        let turn = match orchestrator.run(&self.intent, cancel).await {
            Ok(IntentOutcome::Text(text)) => ConversationTurn::assistant(text, None),
            Ok(IntentOutcome::Image(result)) => ConversationTurn::assistant(result.text, result.image),
            Err(err) => {
                tracing::warn!(
                    intent = self.intent.kind().as_str(),
                    error = %err,
                    "Submission failed"
                );
                ConversationTurn::error(&err)
            }
        };

        self.session.write().await.push(turn.clone());
        tracing::info!(turn_id = %turn.id, is_error = turn.is_error, "Submission completed");
        turn
    }

    /// Complete on a background task so the response turn is recorded even
    /// if the caller stops waiting
    pub fn spawn(self, orchestrator: Arc<Orchestrator>) -> JoinHandle<ConversationTurn> {
        tokio::spawn(async move {
            let cancel = orchestrator.intent_token();
            self.complete(&orchestrator, &cancel).await
        })
    }
}
