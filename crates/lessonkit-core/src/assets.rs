//! Request/response bridge for asynchronous asset pickers.
//!
//! Each picker invocation gets its own request id, so concurrent pickers
//! never overwrite each other's target. A request is consumed exactly once.

use crate::element::ElementId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Identifier of one picker invocation.
pub type RequestId = Uuid;

/// Handed to the picker collaborator; returned with the chosen asset.
#[derive(Debug, PartialEq, Eq)]
pub struct PickerTicket {
    request_id: RequestId,
    element_id: ElementId,
}

impl PickerTicket {
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn element_id(&self) -> ElementId {
        self.element_id
    }
}

/// The asset chosen by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSelection {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
}

impl AssetSelection {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: None,
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }
}

/// Target of an outstanding picker request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPick {
    pub element_id: ElementId,
    pub key: String,
}

/// Outstanding picker requests keyed by request id.
#[derive(Debug, Clone, Default)]
pub struct AssetPickers {
    pending: HashMap<RequestId, PendingPick>,
}

impl AssetPickers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a picker invocation that will write into `element_id.key`.
    pub fn request(&mut self, element_id: ElementId, key: impl Into<String>) -> PickerTicket {
        let request_id = Uuid::new_v4();
        self.pending.insert(
            request_id,
            PendingPick {
                element_id,
                key: key.into(),
            },
        );
        PickerTicket {
            request_id,
            element_id,
        }
    }

    /// Consume a request. Returns `None` if it was already used or dropped.
    pub fn take(&mut self, request_id: RequestId) -> Option<PendingPick> {
        self.pending.remove(&request_id)
    }

    /// Drop every request targeting a deleted element.
    pub fn forget_element(&mut self, element_id: ElementId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, p| p.element_id != element_id);
        before - self.pending.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
