//! Ownership of standalone elements by composite widgets.
//!
//! Ownership is a second relation over the same id space as the containment
//! tree. A standalone element can sit anywhere in the tree (or at the root)
//! while a drag-drop widget holds it logically.

use crate::element::{Element, ElementId};
use crate::error::{BuilderError, BuilderResult};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// `element_id` is currently held by `owner_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipRecord {
    pub owner_id: ElementId,
    pub element_id: ElementId,
    /// Where the element sat before it was first attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_position: Option<Point>,
}

/// All current ownership records, in attach order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnershipMap {
    records: Vec<OwnershipRecord>,
}

impl OwnershipMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `element` to `owner`, transferring it from any previous owner.
    ///
    /// The first recorded original position survives transfers. Constraint
    /// violations leave the map untouched.
    pub fn attach(
        &mut self,
        owner: &Element,
        element: &Element,
        position: Option<Point>,
    ) -> BuilderResult<()> {
        let owner_id = owner.id();
        let element_id = element.id();
        admits(owner, element)?;

        if self.owner_of(element_id) == Some(owner_id) {
            if let Some(record) = self.record_mut(element_id) {
                record.original_position = record.original_position.or(position);
            }
            return Ok(());
        }

        let max_items = max_items(owner);
        if max_items > 0 && self.items_of(owner_id).len() >= max_items {
            return Err(BuilderError::CapacityExceeded {
                owner: owner_id,
                max_items,
            });
        }

        let previous = self.detach_record(element_id);
        if let Some(prev) = &previous {
            log::debug!(
                "Transferring {element_id} from {} to {owner_id}",
                prev.owner_id
            );
        }
        self.records.push(OwnershipRecord {
            owner_id,
            element_id,
            original_position: previous.and_then(|p| p.original_position).or(position),
        });
        Ok(())
    }

    /// Remove the record for `element_id` and return its original position.
    pub fn detach(&mut self, element_id: ElementId) -> Option<Point> {
        self.detach_record(element_id)
            .and_then(|r| r.original_position)
    }

    /// Remove and return the whole record for `element_id`.
    pub fn detach_record(&mut self, element_id: ElementId) -> Option<OwnershipRecord> {
        let idx = self.records.iter().position(|r| r.element_id == element_id)?;
        Some(self.records.remove(idx))
    }

    pub fn owner_of(&self, element_id: ElementId) -> Option<ElementId> {
        self.record(element_id).map(|r| r.owner_id)
    }

    /// Elements currently attached to `owner_id`, in attach order.
    pub fn items_of(&self, owner_id: ElementId) -> Vec<ElementId> {
        self.records
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .map(|r| r.element_id)
            .collect()
    }

    /// Drop every record held by `owner_id`, returning the released records.
    pub fn release_owner(&mut self, owner_id: ElementId) -> Vec<OwnershipRecord> {
        let (released, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|r| r.owner_id == owner_id);
        self.records = kept;
        released
    }

    /// Drop every record that mentions `id` as owner or element.
    pub fn forget(&mut self, id: ElementId) {
        self.records
            .retain(|r| r.owner_id != id && r.element_id != id);
    }

    pub fn record(&self, element_id: ElementId) -> Option<&OwnershipRecord> {
        self.records.iter().find(|r| r.element_id == element_id)
    }

    fn record_mut(&mut self, element_id: ElementId) -> Option<&mut OwnershipRecord> {
        self.records.iter_mut().find(|r| r.element_id == element_id)
    }

    pub fn records(&self) -> impl Iterator<Item = &OwnershipRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Check that `owner` may hold `element`, ignoring capacity.
pub(crate) fn admits(owner: &Element, element: &Element) -> BuilderResult<()> {
    let owner_id = owner.id();
    let element_id = element.id();

    if owner_id == element_id {
        return Err(BuilderError::InvalidStructure(format!(
            "{element_id} cannot own itself"
        )));
    }
    if !owner.kind().can_own() {
        return Err(BuilderError::InvalidStructure(format!(
            "{} {owner_id} cannot own elements",
            owner.kind()
        )));
    }

    let Some(standalone) = element.standalone_type() else {
        return Err(BuilderError::TypeNotAllowed {
            owner: owner_id,
            standalone_type: None,
        });
    };
    let allowed: Vec<&str> = owner
        .list_prop("allowedTypes")
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    if !allowed.is_empty() && !allowed.contains(&standalone) {
        return Err(BuilderError::TypeNotAllowed {
            owner: owner_id,
            standalone_type: Some(standalone.to_string()),
        });
    }
    Ok(())
}

/// Capacity of an owner; 0 means unlimited.
fn max_items(owner: &Element) -> usize {
    owner
        .number_prop("maxItems")
        .filter(|n| n.is_finite() && *n > 0.0)
        .map(|n| n as usize)
        .unwrap_or(0)
}
