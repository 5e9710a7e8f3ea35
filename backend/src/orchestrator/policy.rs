//! Retry policies
//!
//! A policy decides how many attempts an intent gets, how long to wait
//! after a retriable failure, and whether the next attempt moves on to the
//! next candidate model or stays on the same one.

use serde::Serialize;
use std::time::Duration;

/// Delay schedule between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Backoff {
    /// Same delay after every failed attempt
    Flat(Duration),
    /// Delay grows by `step` with every failed attempt (step, 2*step, ...)
    Linear {
        /// Increment per failed attempt
        step: Duration,
    },
}

impl Backoff {
    /// Delay to wait after the failed attempt at 0-based index `attempt`
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Flat(delay) => *delay,
            Backoff::Linear { step } => step.saturating_mul(attempt.saturating_add(1)),
        }
    }
}

/// What the next attempt targets after a retriable failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Advance {
    /// Move to the next model in the candidate list
    NextCandidate,
    /// Retry the first candidate again
    SameModel,
}

/// Retry policy for one call kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryPolicy {
    /// Upper bound on attempts, including the first one
    pub max_attempts: u32,
    /// Delay schedule between attempts
    pub backoff: Backoff,
    /// Fallback-vs-same-model semantics
    pub advance: Advance,
}

impl RetryPolicy {
    /// One attempt per candidate, flat delay between them
    pub fn model_fallback(candidate_count: usize, delay: Duration) -> Self {
        Self {
            max_attempts: u32::try_from(candidate_count).unwrap_or(u32::MAX),
            backoff: Backoff::Flat(delay),
            advance: Advance::NextCandidate,
        }
    }

    /// Bounded attempts against a single model
    pub fn same_model(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            backoff,
            advance: Advance::SameModel,
        }
    }

    /// Attempts actually available given the candidate list
    pub fn attempt_budget(&self, candidate_count: usize) -> u32 {
        if candidate_count == 0 {
            return 0;
        }
        match self.advance {
            Advance::NextCandidate => self
                .max_attempts
                .min(u32::try_from(candidate_count).unwrap_or(u32::MAX)),
            Advance::SameModel => self.max_attempts,
        }
    }

    /// Model targeted by the 0-based `attempt`
    pub fn model_for_attempt<'a>(&self, candidates: &'a [String], attempt: u32) -> Option<&'a str> {
        let index = match self.advance {
            Advance::NextCandidate => usize::try_from(attempt).ok()?,
            Advance::SameModel => 0,
        };
        candidates.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_linear_backoff_matches_generation_schedule() {
        let backoff = Backoff::Linear {
            step: Duration::from_millis(2000),
        };
        let delays: Vec<u128> = (0..5).map(|i| backoff.delay_after(i).as_millis()).collect();
        assert_eq!(delays, vec![2000, 4000, 6000, 8000, 10000]);
    }

    #[test]
    fn test_flat_backoff_is_constant() {
        let backoff = Backoff::Flat(Duration::from_millis(1000));
        assert_eq!(backoff.delay_after(0), backoff.delay_after(7));
    }

    #[test]
    fn test_fallback_walks_candidates() {
        let candidates = models(&["a", "b", "c"]);
        let policy = RetryPolicy::model_fallback(candidates.len(), Duration::from_millis(1000));
        assert_eq!(policy.attempt_budget(candidates.len()), 3);
        assert_eq!(policy.model_for_attempt(&candidates, 0), Some("a"));
        assert_eq!(policy.model_for_attempt(&candidates, 2), Some("c"));
        assert_eq!(policy.model_for_attempt(&candidates, 3), None);
    }

    #[test]
    fn test_same_model_stays_put() {
        let candidates = models(&["only"]);
        let policy = RetryPolicy::same_model(2, Backoff::Flat(Duration::from_millis(2000)));
        assert_eq!(policy.attempt_budget(candidates.len()), 2);
        assert_eq!(policy.model_for_attempt(&candidates, 1), Some("only"));
    }

    #[test]
    fn test_empty_candidates_have_no_budget() {
        let policy = RetryPolicy::same_model(6, Backoff::Flat(Duration::ZERO));
        assert_eq!(policy.attempt_budget(0), 0);
    }
}
