//! Single-element selection focus.

use crate::element::ElementId;

/// The element the property panel is editing, if any.
///
/// Holds only ids that resolved when they were selected; the editor clears
/// it when the element is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<ElementId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected == Some(id)
    }

    pub(crate) fn set(&mut self, id: Option<ElementId>) {
        self.selected = id;
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Clear the selection if it points at `id`. Returns true if cleared.
    pub fn forget(&mut self, id: ElementId) -> bool {
        if self.is_selected(id) {
            self.selected = None;
            true
        } else {
            false
        }
    }
}
