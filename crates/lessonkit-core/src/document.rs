//! Lesson document: the element forest and the ownership relation.

use crate::element::{Element, ElementId};
use crate::error::{BuilderError, BuilderResult};
use crate::ownership::{OwnershipMap, OwnershipRecord, admits};
use crate::properties::PropertyBag;
use crate::registry::ElementKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// A lesson page: an ordered forest of elements plus ownership records.
///
/// Every public method either succeeds with all invariants intact or fails
/// without touching the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonDocument {
    /// Unique document identifier.
    pub id: String,
    /// Document name.
    pub name: String,
    /// All elements, keyed by id.
    elements: HashMap<ElementId, Element>,
    /// Top-level elements in display order.
    roots: Vec<ElementId>,
    /// Which composite widget holds which standalone element.
    #[serde(default)]
    ownership: OwnershipMap,
}

impl Default for LessonDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl LessonDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            elements: HashMap::new(),
            roots: Vec::new(),
            ownership: OwnershipMap::new(),
        }
    }

    /// Create an element with registry defaults and append it as a root.
    pub fn create_element(&mut self, kind: ElementKind, initial: PropertyBag) -> ElementId {
        let element = Element::new(kind, initial);
        let id = element.id();
        self.roots.push(id);
        self.elements.insert(id, element);
        id
    }

    /// Insert a prebuilt childless element as a root.
    pub fn insert_element(&mut self, element: Element) -> BuilderResult<ElementId> {
        let id = element.id();
        if self.elements.contains_key(&id) {
            return Err(BuilderError::InvalidStructure(format!("duplicate id {id}")));
        }
        if !element.children.is_empty() {
            return Err(BuilderError::InvalidStructure(format!(
                "{id} must be inserted without children"
            )));
        }
        self.roots.push(id);
        self.elements.insert(id, element);
        Ok(id)
    }

    pub fn get_element(&self, id: ElementId) -> BuilderResult<&Element> {
        self.elements.get(&id).ok_or(BuilderError::NotFound(id))
    }

    pub(crate) fn get_element_mut(&mut self, id: ElementId) -> BuilderResult<&mut Element> {
        self.elements.get_mut(&id).ok_or(BuilderError::NotFound(id))
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Top-level elements in display order.
    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    /// The container holding `id`, or `None` for roots and unknown ids.
    pub fn parent_of(&self, id: ElementId) -> Option<ElementId> {
        self.elements
            .values()
            .find(|e| e.children.contains(&id))
            .map(|e| e.id)
    }

    /// Whether `ancestor` contains `id` somewhere above it.
    pub fn is_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent_of(parent);
        }
        false
    }

    /// `id` followed by all of its descendants, depth first.
    pub fn subtree(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(el) = self.elements.get(&next) {
                out.push(next);
                stack.extend(el.children.iter().rev());
            }
        }
        out
    }

    /// Elements in document order (roots first, depth first).
    pub fn elements_ordered(&self) -> impl Iterator<Item = &Element> {
        self.roots
            .iter()
            .flat_map(|&root| self.subtree(root))
            .filter_map(|id| self.elements.get(&id))
    }

    /// Replace the children of a container.
    ///
    /// Elements dropped from the list become roots again.
    pub fn set_children(&mut self, container_id: ElementId, child_ids: Vec<ElementId>) -> BuilderResult<()> {
        let container = self.get_element(container_id)?;
        if !container.is_container() {
            return Err(BuilderError::InvalidStructure(format!(
                "{} {container_id} cannot hold children",
                container.kind()
            )));
        }

        let mut seen = HashSet::new();
        for &child in &child_ids {
            self.get_element(child)?;
            if child == container_id || self.is_ancestor(child, container_id) {
                return Err(BuilderError::InvalidStructure(format!(
                    "placing {child} under {container_id} would create a cycle"
                )));
            }
            if !seen.insert(child) {
                return Err(BuilderError::InvalidStructure(format!(
                    "{child} listed twice under {container_id}"
                )));
            }
            if let Some(parent) = self.parent_of(child) {
                if parent != container_id {
                    return Err(BuilderError::InvalidStructure(format!(
                        "{child} already belongs to {parent}"
                    )));
                }
            }
        }

        let previous = std::mem::take(&mut self.get_element_mut(container_id)?.children);
        let orphaned = previous.into_iter().filter(|id| !seen.contains(id));
        self.roots.retain(|id| !seen.contains(id));
        self.roots.extend(orphaned);
        self.get_element_mut(container_id)?.children = child_ids;
        Ok(())
    }

    /// Move an element under `new_parent` (or to the root list) at `index`.
    ///
    /// The index is clamped to the target list length.
    pub fn move_element(
        &mut self,
        id: ElementId,
        new_parent: Option<ElementId>,
        index: usize,
    ) -> BuilderResult<()> {
        self.get_element(id)?;
        if let Some(parent_id) = new_parent {
            let parent = self.get_element(parent_id)?;
            if !parent.is_container() {
                return Err(BuilderError::InvalidStructure(format!(
                    "{} {parent_id} cannot hold children",
                    parent.kind()
                )));
            }
            if parent_id == id || self.is_ancestor(id, parent_id) {
                return Err(BuilderError::InvalidStructure(format!(
                    "moving {id} under {parent_id} would create a cycle"
                )));
            }
        }

        self.unlink(id);
        let target = match new_parent {
            Some(parent_id) => &mut self.get_element_mut(parent_id)?.children,
            None => &mut self.roots,
        };
        let index = index.min(target.len());
        target.insert(index, id);
        Ok(())
    }

    /// Delete an element and its whole subtree.
    ///
    /// Ownership records naming any removed id are dropped. Returns the
    /// removed ids.
    pub fn delete_element(&mut self, id: ElementId) -> BuilderResult<Vec<ElementId>> {
        self.get_element(id)?;
        let removed = self.subtree(id);
        self.unlink(id);
        for &gone in &removed {
            self.elements.remove(&gone);
            self.ownership.forget(gone);
        }
        Ok(removed)
    }

    /// Remove `id` from its parent's children or from the root list.
    fn unlink(&mut self, id: ElementId) {
        match self.parent_of(id) {
            Some(parent) => {
                if let Some(el) = self.elements.get_mut(&parent) {
                    el.children.retain(|&c| c != id);
                }
            }
            None => self.roots.retain(|&r| r != id),
        }
    }

    /// Attach a standalone element to a composite owner.
    pub fn attach(
        &mut self,
        owner_id: ElementId,
        element_id: ElementId,
        position: Option<Point>,
    ) -> BuilderResult<()> {
        let owner = self.elements.get(&owner_id).ok_or(BuilderError::NotFound(owner_id))?;
        let element = self
            .elements
            .get(&element_id)
            .ok_or(BuilderError::NotFound(element_id))?;
        self.ownership.attach(owner, element, position)
    }

    /// Release an element from its owner, returning its original position.
    pub fn detach(&mut self, element_id: ElementId) -> Option<Point> {
        self.ownership.detach(element_id)
    }

    pub fn owner_of(&self, element_id: ElementId) -> Option<ElementId> {
        self.ownership.owner_of(element_id)
    }

    pub fn items_of(&self, owner_id: ElementId) -> Vec<ElementId> {
        self.ownership.items_of(owner_id)
    }

    /// Release every record involving `id` that its current properties no
    /// longer admit. Called after a property write; returns the released
    /// records.
    pub(crate) fn prune_ownership(&mut self, id: ElementId) -> Vec<OwnershipRecord> {
        let stale: Vec<ElementId> = self
            .ownership
            .records()
            .filter(|r| r.owner_id == id || r.element_id == id)
            .filter(|r| {
                match (self.elements.get(&r.owner_id), self.elements.get(&r.element_id)) {
                    (Some(owner), Some(element)) => admits(owner, element).is_err(),
                    _ => true,
                }
            })
            .map(|r| r.element_id)
            .collect();
        stale
            .into_iter()
            .filter_map(|element_id| self.ownership.detach_record(element_id))
            .collect()
    }

    pub fn ownership(&self) -> &OwnershipMap {
        &self.ownership
    }

    /// Audit every structural invariant.
    pub fn check_integrity(&self) -> BuilderResult<()> {
        let mut placed: HashSet<ElementId> = HashSet::new();
        let mut stack: Vec<ElementId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let el = self.get_element(id)?;
            if el.id != id {
                return Err(BuilderError::InvalidStructure(format!(
                    "element stored under {id} carries id {}",
                    el.id
                )));
            }
            if !placed.insert(id) {
                return Err(BuilderError::InvalidStructure(format!(
                    "{id} appears more than once in the tree"
                )));
            }
            if !el.children.is_empty() && !el.is_container() {
                return Err(BuilderError::InvalidStructure(format!(
                    "{} {id} has children",
                    el.kind()
                )));
            }
            stack.extend(el.children.iter().rev());
        }
        if let Some(stray) = self.elements.keys().find(|id| !placed.contains(id)) {
            return Err(BuilderError::InvalidStructure(format!(
                "{stray} is not reachable from any root"
            )));
        }

        let mut owned = HashSet::new();
        for record in self.ownership.records() {
            let owner = self.get_element(record.owner_id)?;
            let element = self.get_element(record.element_id)?;
            if let Err(err) = admits(owner, element) {
                return Err(BuilderError::InvalidStructure(format!(
                    "invalid ownership {} -> {}: {err}",
                    record.owner_id, record.element_id
                )));
            }
            if !owned.insert(record.element_id) {
                return Err(BuilderError::InvalidStructure(format!(
                    "{} has more than one owner",
                    record.element_id
                )));
            }
        }
        Ok(())
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get the number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from JSON and verify its invariants.
    pub fn from_json(json: &str) -> BuilderResult<Self> {
        let doc: Self = serde_json::from_str(json)?;
        doc.check_integrity()?;
        Ok(doc)
    }
}
