//! Runtime manager for tracking grading state of rendered widgets.

use super::feedback::{Feedback, feedback_for};
use super::grading::{Response, evaluate};
use super::state::{RetryOutcome, RetryPolicy, SubmitOutcome, WidgetRuntimeState};
use crate::element::{Element, ElementId};
use crate::error::{BuilderError, BuilderResult};
use std::collections::HashMap;

/// Manages runtime state for all mounted widget instances.
///
/// This keeps attempt counters and answers out of the element data, so
/// the document stays pure authoring configuration.
#[derive(Debug, Clone, Default)]
pub struct RuntimeManager {
    states: HashMap<ElementId, WidgetRuntimeState>,
}

impl RuntimeManager {
    /// Create a new runtime manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state for an instance if it does not exist yet.
    pub fn mount(&mut self, element: &Element) -> BuilderResult<&WidgetRuntimeState> {
        if !element.kind().is_interactive() {
            return Err(BuilderError::NotInteractive(element.kind()));
        }
        let state = self.states.entry(element.id()).or_default();
        Ok(&*state)
    }

    /// Drop the state of an instance that is no longer rendered.
    pub fn unmount(&mut self, id: ElementId) -> Option<WidgetRuntimeState> {
        self.states.remove(&id)
    }

    /// Get the state of a mounted instance.
    pub fn state(&self, id: ElementId) -> Option<&WidgetRuntimeState> {
        self.states.get(&id)
    }

    /// Grade a response, creating the instance lazily.
    ///
    /// A locked or already answered instance rejects the response before it
    /// is evaluated, whatever its shape.
    pub fn submit(&mut self, element: &Element, response: &Response) -> BuilderResult<SubmitOutcome> {
        if let Some(reason) = self.states.get(&element.id()).and_then(|s| s.submit_rejection()) {
            log::debug!("{} {}: rejected {:?}", element.kind(), element.id(), reason);
            return Ok(SubmitOutcome::Rejected(reason));
        }
        let correct = evaluate(element, response)?;
        let policy = RetryPolicy::from_element(element);
        let state = self.states.entry(element.id()).or_default();
        let outcome = state.submit(correct, policy);
        log::debug!("{} {}: {:?}", element.kind(), element.id(), outcome);
        Ok(outcome)
    }

    /// Handle the retry trigger of an instance.
    pub fn retry(&mut self, element: &Element) -> BuilderResult<RetryOutcome> {
        if !element.kind().is_interactive() {
            return Err(BuilderError::NotInteractive(element.kind()));
        }
        let policy = RetryPolicy::from_element(element);
        let state = self.states.entry(element.id()).or_default();
        let outcome = state.retry(policy);
        log::debug!("{} {} retry: {:?}", element.kind(), element.id(), outcome);
        Ok(outcome)
    }

    /// Reveal the result of an answered instance whose feedback is
    /// deferred. Returns false if it has not been answered.
    pub fn reveal(&mut self, element: &Element) -> BuilderResult<bool> {
        if !element.kind().is_interactive() {
            return Err(BuilderError::NotInteractive(element.kind()));
        }
        let revealed = self.states.entry(element.id()).or_default().reveal();
        log::debug!("{} {} reveal: {}", element.kind(), element.id(), revealed);
        Ok(revealed)
    }

    /// Feedback for an instance; unmounted instances read as unanswered.
    pub fn feedback(&self, element: &Element) -> Feedback {
        match self.states.get(&element.id()) {
            Some(state) => feedback_for(element, state),
            None => feedback_for(element, &WidgetRuntimeState::default()),
        }
    }

    /// Remove state for a deleted element.
    pub fn remove(&mut self, id: ElementId) {
        self.states.remove(&id);
    }

    pub fn states(&self) -> &HashMap<ElementId, WidgetRuntimeState> {
        &self.states
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}
