//! Error taxonomy for the page-builder core.

use crate::element::ElementId;
use crate::registry::ElementKind;
use thiserror::Error;

/// Errors raised by document, ownership, pipeline and grading operations.
///
/// Every rejection is all-or-nothing: when an operation returns an error the
/// model is exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuilderError {
    /// The id does not resolve to an element (or the ticket was already consumed).
    #[error("Element not found: {0}")]
    NotFound(ElementId),
    /// The change would break the containment tree or ownership invariants.
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
    /// The owner already holds `max_items` elements.
    #[error("Owner {owner} is full ({max_items} items)")]
    CapacityExceeded { owner: ElementId, max_items: usize },
    /// The element's standalone type is not accepted by the owner.
    #[error("Owner {owner} does not accept {standalone_type:?}")]
    TypeNotAllowed {
        owner: ElementId,
        standalone_type: Option<String>,
    },
    /// A variant name outside the closed enumeration.
    #[error("Unknown element variant: {0}")]
    UnknownVariant(String),
    /// Grading was requested for a variant without an answer model.
    #[error("{0} does not accept answers")]
    NotInteractive(ElementKind),
    /// The response shape does not fit the widget variant.
    #[error("Response does not match {0}")]
    ResponseMismatch(ElementKind),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BuilderError {
    /// Stale or dangling references are recovered locally by the caller.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<serde_json::Error> for BuilderError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias used throughout the crate.
pub type BuilderResult<T> = Result<T, BuilderError>;
