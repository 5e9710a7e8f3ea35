//! Attempt-with-policy routine
//!
//! The single control flow shared by every intent kind: dispatch, classify
//! the failure once, then either surface it or sleep and try again. The
//! four public operations only differ in candidate list, policy, request
//! and extractor.
//!
//! Suspension points are the backend call and the inter-attempt delay;
//! both honour the cancellation token and the optional total deadline.

use crate::orchestrator::api_client::GenerativeBackend;
use crate::orchestrator::classify::{classify, ClassifiedError, ErrorKind};
use crate::orchestrator::error::OrchestratorError;
use crate::orchestrator::gemini_types::{GeminiApiRequest, GeminiApiResponse};
use crate::orchestrator::policy::RetryPolicy;
use serde_json::json;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Everything that varies between intent kinds
pub struct CallPlan<'a> {
    /// Intent label for logs
    pub label: &'static str,
    /// Candidate models in order
    pub candidates: &'a [String],
    /// Retry policy
    pub policy: RetryPolicy,
    /// Total elapsed-time budget
    pub deadline: Option<Duration>,
}

fn budget_ms(deadline: Option<Duration>) -> u64 {
    deadline
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

async fn sleep_until_deadline(deadline_at: Option<Instant>) {
    match deadline_at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

/// Run `plan` against `backend` until success, a terminal failure, or the
/// attempt budget runs out
///
/// # Returns
/// * `Ok(T)` - Extracted result of the first successful call
/// * `Err(OrchestratorError)` - Classified failure of the last attempt,
///   extraction failure, cancellation, or deadline exhaustion
pub async fn attempt_with_policy<T, X>(
    backend: &dyn GenerativeBackend,
    plan: CallPlan<'_>,
    request: &GeminiApiRequest,
    extract: X,
    cancel: &CancellationToken,
) -> Result<T, OrchestratorError>
where
    X: Fn(&str, GeminiApiResponse) -> Result<T, ClassifiedError>,
{
    // A budget too large to represent as an instant never fires.
    let deadline_at = plan.deadline.and_then(|d| Instant::now().checked_add(d));
    let max_attempts = plan.policy.attempt_budget(plan.candidates.len());
    let mut last_error: Option<ClassifiedError> = None;

    for attempt in 0..max_attempts {
        let Some(model) = plan.policy.model_for_attempt(plan.candidates, attempt) else {
            break;
        };

        tracing::debug!(
            intent = plan.label,
            model = %model,
            attempt = attempt + 1,
            max_attempts = max_attempts,
            "Dispatching backend call"
        );

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(OrchestratorError::Cancelled),
            _ = sleep_until_deadline(deadline_at) => {
                return Err(OrchestratorError::DeadlineExceeded {
                    budget_ms: budget_ms(plan.deadline),
                    last: last_error,
                });
            }
            result = backend.generate_content(model, request) => result,
        };

        let failure = match outcome {
            Ok(response) => {
                let extracted = extract(model, response);
                match &extracted {
                    Ok(_) => tracing::info!(
                        intent = plan.label,
                        model = %model,
                        attempt = attempt + 1,
                        "Backend call succeeded"
                    ),
                    Err(e) => tracing::warn!(
                        intent = plan.label,
                        model = %model,
                        kind = %e.kind,
                        "Backend response unusable"
                    ),
                }
                return extracted.map_err(OrchestratorError::from);
            }
            Err(failure) => failure,
        };

        let classification = classify(&failure);
        let has_more_attempts = attempt + 1 < max_attempts;
        if !classification.retriable || !has_more_attempts {
            tracing::warn!(
                intent = plan.label,
                model = %model,
                attempt = attempt + 1,
                kind = %classification.error.kind,
                status = ?failure.status,
                error = %failure.message,
                "Backend call failed"
            );
            return Err(classification.error.into());
        }

        let delay = plan.policy.backoff.delay_after(attempt);
        if let Some(at) = deadline_at {
            let resumes_at = Instant::now().checked_add(delay);
            if resumes_at.map_or(true, |resume| resume > at) {
                tracing::warn!(
                    intent = plan.label,
                    model = %model,
                    delay_ms = delay.as_millis() as u64,
                    "Retry delay would exceed request deadline"
                );
                return Err(OrchestratorError::DeadlineExceeded {
                    budget_ms: budget_ms(plan.deadline),
                    last: Some(classification.error),
                });
            }
        }

        tracing::info!(
            intent = plan.label,
            model = %model,
            attempt = attempt + 1,
            delay_ms = delay.as_millis() as u64,
            "Rate limited, retrying after delay"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(OrchestratorError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
        last_error = Some(classification.error);
    }

    Err(last_error
        .unwrap_or_else(|| ClassifiedError {
            message: format!("No candidate models configured for {}", plan.label),
            kind: ErrorKind::UnknownError,
            raw_details: json!({ "intent": plan.label }),
        })
        .into())
}
