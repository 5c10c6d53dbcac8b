//! Widget runtime: grading state for rendered interactive elements.
//!
//! - Correctness evaluation per variant
//! - Attempt/retry state machine per instance
//! - Feedback derived from state and configuration
//!
//! Elements remain pure configuration. Runtime state lives beside them.

mod feedback;
mod grading;
mod manager;
mod state;

pub use feedback::{Feedback, feedback_for};
pub use grading::{Response, TextMatcher, evaluate};
pub use manager::RuntimeManager;
pub use state::{GradingPhase, RejectReason, RetryOutcome, RetryPolicy, SubmitOutcome, WidgetRuntimeState};
