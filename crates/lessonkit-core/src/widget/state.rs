//! Per-instance grading state.

use crate::element::Element;
use serde::Serialize;

/// Phase of a widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "phase")]
pub enum GradingPhase {
    /// Waiting for a response.
    Unanswered,
    /// A response was graded; a retry may reset the instance.
    Answered { correct: bool },
    /// No further responses are accepted for this instance.
    Locked,
}

/// Retry configuration read from an element's properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub allow_retry: bool,
    /// 0 means unlimited.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            allow_retry: true,
            max_attempts: 0,
        }
    }
}

impl RetryPolicy {
    pub fn from_element(element: &Element) -> Self {
        let max_attempts = element
            .number_prop("maxAttempts")
            .filter(|n| n.is_finite() && *n > 0.0)
            .map(|n| n as u32)
            .unwrap_or(0);
        Self {
            allow_retry: element.bool_prop("allowRetry") != Some(false),
            max_attempts,
        }
    }

    /// Whether a retry after `attempts_used` retries would still leave the
    /// instance open.
    pub fn permits_retry(&self, attempts_used: u32) -> bool {
        self.allow_retry && (self.max_attempts == 0 || attempts_used + 1 < self.max_attempts)
    }
}

/// Why a submission or retry was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectReason {
    AlreadyAnswered,
    Locked,
    NotAnswered,
}

/// Result of submitting a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Graded { correct: bool, locked: bool },
    Rejected(RejectReason),
}

/// Result of a retry trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    /// The instance is open for a new response.
    Reset { attempts_used: u32 },
    /// The retry budget is spent.
    Locked { attempts_used: u32 },
    Rejected(RejectReason),
}

/// Transient attempt state of one rendered widget instance.
///
/// Never stored in the element's property bag and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetRuntimeState {
    pub attempts_used: u32,
    pub answered: bool,
    pub last_correct: Option<bool>,
    pub locked: bool,
    /// The learner asked to see the result of the current answer.
    pub revealed: bool,
}

impl WidgetRuntimeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GradingPhase {
        if self.locked {
            GradingPhase::Locked
        } else if self.answered {
            GradingPhase::Answered {
                correct: self.last_correct.unwrap_or(false),
            }
        } else {
            GradingPhase::Unanswered
        }
    }

    /// Why a new response would be ignored right now, if it would.
    pub fn submit_rejection(&self) -> Option<RejectReason> {
        if self.locked {
            Some(RejectReason::Locked)
        } else if self.answered {
            Some(RejectReason::AlreadyAnswered)
        } else {
            None
        }
    }

    /// Record a graded response.
    pub fn submit(&mut self, correct: bool, policy: RetryPolicy) -> SubmitOutcome {
        if let Some(reason) = self.submit_rejection() {
            return SubmitOutcome::Rejected(reason);
        }
        self.answered = true;
        self.last_correct = Some(correct);
        if !policy.allow_retry {
            self.locked = true;
        }
        SubmitOutcome::Graded {
            correct,
            locked: self.locked,
        }
    }

    /// Spend one attempt and reopen the instance, or lock it when the
    /// budget is exhausted.
    pub fn retry(&mut self, policy: RetryPolicy) -> RetryOutcome {
        if self.locked {
            return RetryOutcome::Rejected(RejectReason::Locked);
        }
        if !self.answered {
            return RetryOutcome::Rejected(RejectReason::NotAnswered);
        }
        let exhausted = !policy.permits_retry(self.attempts_used);
        self.attempts_used += 1;
        if exhausted {
            self.locked = true;
            RetryOutcome::Locked {
                attempts_used: self.attempts_used,
            }
        } else {
            self.answered = false;
            self.revealed = false;
            RetryOutcome::Reset {
                attempts_used: self.attempts_used,
            }
        }
    }

    /// Show the result of the current answer when feedback is deferred.
    /// Returns false if there is no answer to show.
    pub fn reveal(&mut self) -> bool {
        if self.answered {
            self.revealed = true;
        }
        self.answered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(allow_retry: bool, max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            allow_retry,
            max_attempts,
        }
    }

    #[test]
    fn test_initial_phase() {
        assert_eq!(WidgetRuntimeState::new().phase(), GradingPhase::Unanswered);
    }

    #[test]
    fn test_answer_then_retry() {
        let mut state = WidgetRuntimeState::new();
        let p = policy(true, 0);

        assert_eq!(state.submit(false, p), SubmitOutcome::Graded { correct: false, locked: false });
        assert_eq!(state.phase(), GradingPhase::Answered { correct: false });
        // Submitting again without a retry is ignored.
        assert_eq!(state.submit(true, p), SubmitOutcome::Rejected(RejectReason::AlreadyAnswered));
        // The answer itself does not spend an attempt.
        assert_eq!(state.attempts_used, 0);

        assert_eq!(state.retry(p), RetryOutcome::Reset { attempts_used: 1 });
        assert_eq!(state.phase(), GradingPhase::Unanswered);
    }

    #[test]
    fn test_budget_locks_on_retry() {
        let mut state = WidgetRuntimeState::new();
        let p = policy(true, 2);

        state.submit(false, p);
        assert_eq!(state.retry(p), RetryOutcome::Reset { attempts_used: 1 });
        state.submit(false, p);
        assert_eq!(state.retry(p), RetryOutcome::Locked { attempts_used: 2 });

        assert_eq!(state.phase(), GradingPhase::Locked);
        assert_eq!(state.submit(true, p), SubmitOutcome::Rejected(RejectReason::Locked));
        assert_eq!(state.retry(p), RetryOutcome::Rejected(RejectReason::Locked));
        assert_eq!(state.last_correct, Some(false));
    }

    #[test]
    fn test_no_retry_locks_on_answer() {
        let mut state = WidgetRuntimeState::new();
        let p = policy(false, 0);

        assert_eq!(state.submit(true, p), SubmitOutcome::Graded { correct: true, locked: true });
        assert_eq!(state.phase(), GradingPhase::Locked);
        assert_eq!(state.retry(p), RetryOutcome::Rejected(RejectReason::Locked));
    }

    #[test]
    fn test_retry_before_answer_is_rejected() {
        let mut state = WidgetRuntimeState::new();
        assert_eq!(
            state.retry(RetryPolicy::default()),
            RetryOutcome::Rejected(RejectReason::NotAnswered)
        );
        assert_eq!(state.attempts_used, 0);
    }

    #[test]
    fn test_reveal_lasts_until_retry() {
        let mut state = WidgetRuntimeState::new();
        let p = policy(true, 0);

        assert!(!state.reveal());
        assert!(!state.revealed);

        state.submit(false, p);
        assert!(state.reveal());
        assert!(state.revealed);

        state.retry(p);
        assert!(!state.revealed);
    }

    #[test]
    fn test_submit_rejection_reasons() {
        let mut state = WidgetRuntimeState::new();
        assert_eq!(state.submit_rejection(), None);
        state.submit(true, policy(true, 0));
        assert_eq!(state.submit_rejection(), Some(RejectReason::AlreadyAnswered));
        state.locked = true;
        assert_eq!(state.submit_rejection(), Some(RejectReason::Locked));
    }

    #[test]
    fn test_permits_retry() {
        assert!(policy(true, 0).permits_retry(1000));
        assert!(policy(true, 3).permits_retry(1));
        assert!(!policy(true, 3).permits_retry(2));
        assert!(!policy(false, 0).permits_retry(0));
    }
}
