//! Feedback visibility derived from runtime state and configuration.

use super::state::{RetryPolicy, WidgetRuntimeState};
use crate::element::Element;
use serde::Serialize;

/// What the rendering layer should show for a widget instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    /// Correct/incorrect highlighting is visible.
    pub show_result: bool,
    /// Result of the last response, when visible.
    pub correct: Option<bool>,
    /// The configured message is visible.
    pub show_feedback: bool,
    pub message: Option<String>,
    /// A retry would reopen the instance.
    pub can_retry: bool,
    pub attempts_used: u32,
    /// `None` when attempts are unlimited.
    pub attempts_remaining: Option<u32>,
    pub locked: bool,
    /// Play the wrong-answer shake animation.
    pub shake: bool,
}

/// Compute feedback as a pure function of state and properties.
///
/// With `instantFeedback` disabled the result stays hidden until the
/// learner reveals it or the instance locks.
pub fn feedback_for(element: &Element, state: &WidgetRuntimeState) -> Feedback {
    let policy = RetryPolicy::from_element(element);
    let instant = element.bool_prop("instantFeedback").unwrap_or(true);
    let show_result = state.answered && (instant || state.locked || state.revealed);
    let correct = show_result.then_some(state.last_correct).flatten();
    let show_feedback = show_result && element.bool_prop("showFeedback").unwrap_or(true);

    let message = show_feedback
        .then(|| {
            let key = if correct == Some(true) {
                "correctMessage"
            } else {
                "incorrectMessage"
            };
            element.text_prop(key).map(str::to_string)
        })
        .flatten();

    Feedback {
        show_result,
        correct,
        show_feedback,
        message,
        can_retry: state.answered && !state.locked && policy.permits_retry(state.attempts_used),
        attempts_used: state.attempts_used,
        attempts_remaining: (policy.max_attempts > 0)
            .then(|| policy.max_attempts.saturating_sub(state.attempts_used)),
        locked: state.locked,
        shake: show_result
            && correct == Some(false)
            && element.bool_prop("shakeOnWrong").unwrap_or(false),
    }
}
